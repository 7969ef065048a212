pub mod clipboard;
pub mod editing;
pub mod parsing;
pub mod paste;

// Re-export key types for easier usage
pub use clipboard::{ClipboardEvent, ClipboardItem, ClipboardPayload};
pub use editing::{Cmd, Document, EditError, Fragment, Patch, Snapshot, Transaction};
pub use parsing::{MarkdownParser, PulldownParser};
pub use paste::{Classification, ClipboardClassifier, EditorContext, PasteDispatcher, PasteResult};
