//! Clipboard event model
//!
//! A paste event carries one clipboard snapshot offered in several
//! representations, each identified by its MIME type (`text/plain`,
//! `text/html`, `image/png`, ...). Some editors add private representations;
//! VS Code, for one, puts JSON describing the copied code under
//! `vscode-editor-data`.
//!
//! [`ClipboardEvent::payload`] reduces an event to the three text
//! representations paste classification looks at.

use serde::{Deserialize, Serialize};

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";
/// Private representation VS Code adds when copying from an editor pane
pub const VSCODE_EDITOR_DATA: &str = "vscode-editor-data";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClipboardData {
    /// UTF-8 text
    Text { text: String },

    /// raw bytes (images, files)
    Bytes { bytes: Vec<u8> },
}

/// One representation of the clipboard contents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClipboardItem {
    /// MIME type, e.g. "text/plain", "image/png"
    pub mime: String,
    pub data: ClipboardData,
}

impl ClipboardItem {
    pub fn text(mime: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            data: ClipboardData::Text { text: text.into() },
        }
    }

    pub fn bytes(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data: ClipboardData::Bytes { bytes },
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/") && matches!(self.data, ClipboardData::Bytes { .. })
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            ClipboardData::Text { text } => Some(text),
            ClipboardData::Bytes { .. } => None,
        }
    }
}

/// A paste event as delivered by the host
///
/// `items` is `None` when the event carries no clipboard data at all, which
/// is distinct from a clipboard that holds only empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClipboardEvent {
    pub items: Option<Vec<ClipboardItem>>,
}

impl ClipboardEvent {
    /// An event without clipboard data
    pub fn empty() -> Self {
        Self { items: None }
    }

    pub fn new(items: Vec<ClipboardItem>) -> Self {
        Self { items: Some(items) }
    }

    pub fn with_text(self, mime: &str, text: impl Into<String>) -> Self {
        self.with_item(ClipboardItem::text(mime, text))
    }

    pub fn with_item(mut self, item: ClipboardItem) -> Self {
        self.items.get_or_insert_with(Vec::new).push(item);
        self
    }

    /// First text representation of the given MIME type
    pub fn get_data(&self, mime: &str) -> Option<&str> {
        self.items
            .as_deref()?
            .iter()
            .filter(|item| item.mime == mime)
            .find_map(ClipboardItem::as_text)
    }

    /// First image representation, if any
    pub fn image(&self) -> Option<&ClipboardItem> {
        self.items.as_deref()?.iter().find(|item| item.is_image())
    }

    /// Reduce the event to the representations classification needs.
    /// Returns `None` when the event carries no clipboard data.
    pub fn payload(&self) -> Option<ClipboardPayload> {
        self.items.as_ref()?;

        Some(ClipboardPayload {
            plain_text: self.get_data(TEXT_PLAIN).unwrap_or_default().to_string(),
            html: self.get_data(TEXT_HTML).unwrap_or_default().to_string(),
            app_metadata: self
                .get_data(VSCODE_EDITOR_DATA)
                .filter(|meta| !meta.is_empty())
                .map(str::to_string),
        })
    }
}

/// The text representations of one paste
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub plain_text: String,
    /// Empty when the clipboard offered no HTML
    pub html: String,
    /// Opaque metadata from the source application, conventionally JSON
    pub app_metadata: Option<String>,
}

impl ClipboardPayload {
    pub fn new(plain_text: impl Into<String>) -> Self {
        Self {
            plain_text: plain_text.into(),
            ..Self::default()
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    pub fn with_app_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.app_metadata = Some(metadata.into());
        self
    }

    /// Nothing to paste: no text and no HTML
    pub fn is_empty(&self) -> bool {
        self.plain_text.is_empty() && self.html.is_empty()
    }

    /// Parse the source application's metadata.
    ///
    /// Metadata that isn't valid JSON of the expected shape is treated as if
    /// the clipboard carried none.
    pub fn editor_metadata(&self) -> Option<EditorMetadata> {
        let raw = self.app_metadata.as_deref()?;
        match serde_json::from_str::<EditorMetadata>(raw) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                log::debug!("Ignoring unparsable clipboard metadata: {e}");
                None
            }
        }
    }
}

/// Metadata a code editor attaches to copied text
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EditorMetadata {
    /// Language mode of the pane the text was copied from
    #[serde(default)]
    pub mode: Option<String>,
}

impl EditorMetadata {
    /// The language mode, treating an empty string as absent
    pub fn language_mode(&self) -> Option<&str> {
        self.mode.as_deref().filter(|mode| !mode.is_empty())
    }
}
