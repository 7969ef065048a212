//! Embeddable URL matching
//!
//! A pasted URL that points at embeddable media (a video, a design file, a
//! shared document) becomes an embed block instead of a link. Matchers are
//! consulted in registration order and the first match wins.

use regex::Regex;

/// What to embed for a matched URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedAction {
    /// Provider name, e.g. "youtube"
    pub provider: String,
    pub href: String,
}

/// Predicate over pasted text producing an embed action
pub trait EmbedMatcher {
    fn matches(&self, text: &str) -> Option<EmbedAction>;
}

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("invalid pattern {pattern:?} for embed provider {provider}: {source}")]
    InvalidPattern {
        provider: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("embed provider {0} has no patterns")]
    NoPatterns(String),
}

/// Matches URLs against a provider's regex patterns
#[derive(Debug, Clone)]
pub struct RegexEmbedMatcher {
    provider: String,
    patterns: Vec<Regex>,
}

impl RegexEmbedMatcher {
    pub fn new<S: AsRef<str>>(provider: impl Into<String>, patterns: &[S]) -> Result<Self, EmbedError> {
        let provider = provider.into();
        if patterns.is_empty() {
            return Err(EmbedError::NoPatterns(provider));
        }

        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| EmbedError::InvalidPattern {
                    provider: provider.clone(),
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { provider, patterns })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

impl EmbedMatcher for RegexEmbedMatcher {
    fn matches(&self, text: &str) -> Option<EmbedAction> {
        self.patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
            .then(|| EmbedAction {
                provider: self.provider.clone(),
                href: text.to_string(),
            })
    }
}

/// Built-in providers as `(name, patterns)`
pub const DEFAULT_PROVIDERS: &[(&str, &[&str])] = &[
    (
        "youtube",
        &[
            r"^https?://(?:www\.|m\.)?youtube\.com/watch\?(?:.*&)?v=[\w-]{11}",
            r"^https?://youtu\.be/[\w-]{11}",
        ],
    ),
    ("vimeo", &[r"^https?://(?:www\.|player\.)?vimeo\.com/(?:video/)?\d+"]),
    (
        "figma",
        &[r"^https://(?:www\.)?figma\.com/(?:file|proto|design|board)/[0-9a-zA-Z]{22,128}"],
    ),
    (
        "google-docs",
        &[r"^https?://docs\.google\.com/(?:document|spreadsheets|presentation)/d/[\w-]+"],
    ),
    ("loom", &[r"^https?://(?:www\.)?loom\.com/(?:share|embed)/[a-f0-9]+"]),
];

/// Ordered collection of embed matchers
#[derive(Default)]
pub struct EmbedRegistry {
    matchers: Vec<Box<dyn EmbedMatcher>>,
}

impl EmbedRegistry {
    /// A registry that never matches
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in providers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (provider, patterns) in DEFAULT_PROVIDERS {
            let matcher = RegexEmbedMatcher::new(*provider, *patterns)
                .expect("Invalid built-in embed pattern");
            registry.register(matcher);
        }
        registry
    }

    /// Build a registry from provider names and their patterns
    pub fn from_providers<'a, I, S>(providers: I) -> Result<Self, EmbedError>
    where
        I: IntoIterator<Item = (&'a str, &'a [S])>,
        S: AsRef<str> + 'a,
    {
        let mut registry = Self::new();
        for (provider, patterns) in providers {
            registry.register(RegexEmbedMatcher::new(provider, patterns)?);
        }
        Ok(registry)
    }

    pub fn register(&mut self, matcher: impl EmbedMatcher + 'static) {
        self.matchers.push(Box::new(matcher));
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl EmbedMatcher for EmbedRegistry {
    fn matches(&self, text: &str) -> Option<EmbedAction> {
        self.matchers.iter().find_map(|matcher| matcher.matches(text))
    }
}

impl std::fmt::Debug for EmbedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedRegistry")
            .field("matchers", &self.matchers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "youtube")]
    #[case("https://youtu.be/dQw4w9WgXcQ", "youtube")]
    #[case("https://vimeo.com/76979871", "vimeo")]
    #[case("https://www.figma.com/file/LKQ4FJ4bTnCSjedbRpk931/Sample-File", "figma")]
    #[case("https://docs.google.com/document/d/1a2B3c4D5e6F/edit", "google-docs")]
    #[case("https://www.loom.com/share/0281766fa2d04bb788eaf19e65135184", "loom")]
    fn test_default_providers_match(#[case] url: &str, #[case] provider: &str) {
        let action = EmbedRegistry::with_defaults().matches(url).unwrap();
        assert_eq!(action.provider, provider);
        assert_eq!(action.href, url);
    }

    #[rstest]
    #[case("https://example.com")]
    #[case("https://www.youtube.com/feed/subscriptions")]
    #[case("https://notyoutube.com/watch?v=dQw4w9WgXcQ")]
    fn test_default_providers_ignore_other_urls(#[case] url: &str) {
        assert_eq!(EmbedRegistry::with_defaults().matches(url), None);
    }

    #[test]
    fn test_empty_registry_never_matches() {
        let registry = EmbedRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.matches("https://youtu.be/dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_first_registered_matcher_wins() {
        let patterns = [r"^https://example\.com/"];
        let registry =
            EmbedRegistry::from_providers([("first", &patterns[..]), ("second", &patterns[..])])
                .unwrap();

        let action = registry.matches("https://example.com/video").unwrap();
        assert_eq!(action.provider, "first");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = RegexEmbedMatcher::new("broken", &["(unclosed"]).unwrap_err();
        assert!(matches!(
            err,
            EmbedError::InvalidPattern { ref provider, ref pattern, .. }
                if provider == "broken" && pattern == "(unclosed"
        ));
    }

    #[test]
    fn test_provider_without_patterns_is_rejected() {
        let patterns: [&str; 0] = [];
        let err = RegexEmbedMatcher::new("empty", &patterns).unwrap_err();
        assert!(matches!(err, EmbedError::NoPatterns(name) if name == "empty"));
    }
}
