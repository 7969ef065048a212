use std::fmt;
use std::ops::Range;

use crate::editing::{BlockSpan, Document, Mark, MarkSpan};

/// Immutable, ordered view of a document's text and formatting
///
/// Blocks and marks are sorted by position so two documents with the same
/// content render identically regardless of edit history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub text: String,
    pub selection: Range<usize>,
    pub blocks: Vec<BlockSpan>,
    pub marks: Vec<MarkSpan>,
    pub version: u64,
}

impl Snapshot {
    pub(crate) fn new(doc: &Document) -> Self {
        let mut blocks = doc.blocks.clone();
        blocks.sort_by_key(|block| (block.range.start, block.range.end));

        let mut marks = doc.marks.clone();
        marks.sort_by(|a, b| {
            (a.range.start, a.range.end, a.mark.name()).cmp(&(b.range.start, b.range.end, b.mark.name()))
        });

        Self {
            text: doc.text(),
            selection: doc.selection.clone(),
            blocks,
            marks,
            version: doc.version,
        }
    }

    /// Text covered by `range`
    pub fn slice(&self, range: &Range<usize>) -> &str {
        &self.text[range.clone()]
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Link { href } => write!(f, "link({href})"),
            other => f.write_str(other.name()),
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "text: {:?}", self.text)?;
        writeln!(f, "selection: {:?}", self.selection)?;
        for block in &self.blocks {
            writeln!(
                f,
                "block {:?} {} {:?}",
                block.range,
                block.kind.label(),
                self.slice(&block.range)
            )?;
        }
        for span in &self.marks {
            writeln!(
                f,
                "mark {:?} {} {:?}",
                span.range,
                span.mark,
                self.slice(&span.range)
            )?;
        }
        Ok(())
    }
}
