use std::collections::BTreeMap;

/// Code languages the editor can highlight, keyed by mode identifier
pub const DEFAULT_LANGUAGES: &[(&str, &str)] = &[
    ("none", "Plain text"),
    ("bash", "Bash"),
    ("css", "CSS"),
    ("clike", "C"),
    ("csharp", "C#"),
    ("go", "Go"),
    ("markup", "HTML"),
    ("objectivec", "Objective-C"),
    ("java", "Java"),
    ("javascript", "JavaScript"),
    ("json", "JSON"),
    ("perl", "Perl"),
    ("php", "PHP"),
    ("powershell", "Powershell"),
    ("python", "Python"),
    ("ruby", "Ruby"),
    ("rust", "Rust"),
    ("sql", "SQL"),
    ("typescript", "TypeScript"),
    ("yaml", "YAML"),
];

/// Registry of recognized code languages
///
/// A foreign editor's language mode is only carried onto a code fence when
/// it names a language in this set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet {
    languages: BTreeMap<String, String>,
}

impl LanguageSet {
    pub fn empty() -> Self {
        Self {
            languages: BTreeMap::new(),
        }
    }

    /// Build from mode identifiers, using the identifier as display name
    /// where no built-in name exists
    pub fn from_modes<I, S>(modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::empty();
        for mode in modes {
            let mode = mode.into();
            let display = DEFAULT_LANGUAGES
                .iter()
                .find(|(id, _)| *id == mode)
                .map_or_else(|| mode.clone(), |(_, name)| name.to_string());
            set.insert(mode, display);
        }
        set
    }

    pub fn insert(&mut self, mode: impl Into<String>, display_name: impl Into<String>) {
        self.languages.insert(mode.into(), display_name.into());
    }

    pub fn contains(&self, mode: &str) -> bool {
        self.languages.contains_key(mode)
    }

    /// `Some(mode)` when recognized, `None` otherwise
    pub fn recognize(&self, mode: &str) -> Option<String> {
        self.contains(mode).then(|| mode.to_string())
    }

    pub fn display_name(&self, mode: &str) -> Option<&str> {
        self.languages.get(mode).map(String::as_str)
    }

    pub fn modes(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        let mut set = Self::empty();
        for (mode, name) in DEFAULT_LANGUAGES {
            set.insert(*mode, *name);
        }
        set
    }
}
