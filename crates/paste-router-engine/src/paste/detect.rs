//! Content detectors consulted by the classifier
//!
//! Each detector is a trait so hosts can swap in their own heuristics; the
//! defaults here cover what browsers and desktop clipboards typically carry.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Decides whether pasted text is a single URL
pub trait UrlDetector {
    fn is_url(&self, text: &str) -> bool;
}

/// Decides whether pasted text should be treated as Markdown source
pub trait MarkdownDetector {
    fn looks_like_markdown(&self, text: &str) -> bool;
}

/// Recognizes HTML produced by this editor's own serializer
pub trait InternalFormatDetector {
    fn is_internal(&self, html: &str) -> bool;
}

/// Accepts text that is exactly one absolute URL with a host
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUrlDetector;

impl UrlDetector for DefaultUrlDetector {
    fn is_url(&self, text: &str) -> bool {
        if text.is_empty() || text.chars().any(char::is_whitespace) {
            return false;
        }

        match Url::parse(text) {
            Ok(url) => url.host_str().is_some_and(|host| !host.is_empty()),
            Err(_) => false,
        }
    }
}

/// Pattern-based Markdown heuristics
///
/// Text counts as Markdown when it has a fenced code block, a link with an
/// absolute or root-relative target, an ATX heading, or at least two list
/// items.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexMarkdownDetector;

fn fence_regex() -> &'static Regex {
    static FENCE_REGEX: OnceLock<Regex> = OnceLock::new();
    FENCE_REGEX.get_or_init(|| Regex::new(r"(?m)^```").expect("Invalid fence regex"))
}

fn link_regex() -> &'static Regex {
    static LINK_REGEX: OnceLock<Regex> = OnceLock::new();
    LINK_REGEX.get_or_init(|| {
        Regex::new(r"\[[^\]]+\]\((?:https?://|/)\S+\)").expect("Invalid link regex")
    })
}

fn heading_regex() -> &'static Regex {
    static HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
    HEADING_REGEX.get_or_init(|| Regex::new(r"(?m)^#{1,6}\s+\S+").expect("Invalid heading regex"))
}

fn list_item_regex() -> &'static Regex {
    static LIST_ITEM_REGEX: OnceLock<Regex> = OnceLock::new();
    LIST_ITEM_REGEX
        .get_or_init(|| Regex::new(r"(?m)^[\d*-].?\s\S+").expect("Invalid list item regex"))
}

impl MarkdownDetector for RegexMarkdownDetector {
    fn looks_like_markdown(&self, text: &str) -> bool {
        // an opening and a closing fence
        if fence_regex().find_iter(text).nth(1).is_some() {
            return true;
        }

        link_regex().is_match(text)
            || heading_regex().is_match(text)
            || list_item_regex().find_iter(text).nth(1).is_some()
    }
}

/// Attribute the editor's HTML serializer stamps on copied slices
pub const DEFAULT_INTERNAL_MARKER: &str = "data-pm-slice";

/// Looks for a fixed marker string in the HTML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerDetector {
    marker: String,
}

impl MarkerDetector {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl Default for MarkerDetector {
    fn default() -> Self {
        Self::new(DEFAULT_INTERNAL_MARKER)
    }
}

impl InternalFormatDetector for MarkerDetector {
    fn is_internal(&self, html: &str) -> bool {
        !self.marker.is_empty() && html.contains(&self.marker)
    }
}
