use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Embed provider {name:?} in {config_path} has no patterns")]
    EmptyEmbedProvider { config_path: PathBuf, name: String },
}

/// An embeddable URL provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedProvider {
    pub name: String,
    /// Regular expressions matched against the pasted URL
    pub patterns: Vec<String>,
}

/// Paste handling configuration
///
/// ```toml
/// languages = ["rust", "python", "zig"]
/// internal_marker = "data-pm-slice"
/// image_paste = true
/// max_image_bytes = 5242880
///
/// [[embeds]]
/// name = "gist"
/// patterns = ['^https://gist\.github\.com/[\w-]+/[0-9a-f]+']
/// ```
///
/// Every field is optional. `languages = []` disables language tagging of
/// pasted code; leaving it out keeps the built-in set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasteConfig {
    /// Recognized code language modes; `None` keeps the built-in set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,

    /// Keep the built-in embed providers alongside `embeds`
    pub default_embeds: bool,

    /// Extra embed providers, consulted before the built-in ones
    pub embeds: Vec<EmbedProvider>,

    /// Marker identifying HTML copied from this editor
    pub internal_marker: String,

    /// Turn image-only pastes into image blocks
    pub image_paste: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_image_bytes: Option<usize>,
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            languages: None,
            default_embeds: true,
            embeds: Vec::new(),
            internal_marker: "data-pm-slice".to_string(),
            image_paste: true,
            max_image_bytes: None,
        }
    }
}

impl PasteConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: PasteConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if let Some(provider) = config.embeds.iter().find(|p| p.patterns.is_empty()) {
            return Err(ConfigError::EmptyEmbedProvider {
                config_path: config_path.to_path_buf(),
                name: provider.name.clone(),
            });
        }

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load from `config_path`, falling back to the user config file
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let loaded = match config_path {
            Some(path) => Self::load_from_path(Self::expand_path(path).unwrap_or(path.to_path_buf()))?,
            None => Self::load()?,
        };
        Ok(loaded.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/paste-router");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
