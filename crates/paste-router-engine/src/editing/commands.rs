use std::ops::Range;

use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::{BlockKind, BlockSpan, Fragment, Mark, MarkSpan};

/// Edits that can be applied to a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Replace a byte range with plain text (empty range inserts)
    ReplaceRange { range: Range<usize>, text: String },
    /// Apply a mark, replacing marks of the same family over the range
    AddMark { range: Range<usize>, mark: Mark },
    /// Strip every mark over the range
    ClearMarks { range: Range<usize> },
    /// Replace a byte range with structured content
    InsertFragment {
        range: Range<usize>,
        fragment: Fragment,
    },
}

impl Cmd {
    /// The range the command addresses in the document it is applied to
    pub fn range(&self) -> &Range<usize> {
        match self {
            Cmd::ReplaceRange { range, .. }
            | Cmd::AddMark { range, .. }
            | Cmd::ClearMarks { range }
            | Cmd::InsertFragment { range, .. } => range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("range {start}..{end} is outside the document (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("range {start}..{end} is inverted")]
    Inverted { start: usize, end: usize },
    #[error("offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
    #[error("document is read-only")]
    ReadOnly,
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// An ordered group of commands applied as one unit.
///
/// Each command addresses the document as left by the previous one. Either
/// every command applies or the document is left exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    cmds: Vec<Cmd>,
    selection: Option<Range<usize>>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(cmd: Cmd) -> Self {
        Self::new().then(cmd)
    }

    /// Append a command
    pub fn then(mut self, cmd: Cmd) -> Self {
        self.cmds.push(cmd);
        self
    }

    /// Selection to set once every command has applied
    pub fn select(mut self, selection: Range<usize>) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn cmds(&self) -> &[Cmd] {
        &self.cmds
    }

    pub fn selection(&self) -> Option<&Range<usize>> {
        self.selection.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }
}

/// Compile a text replacement into a delta over a buffer of `base_len` bytes
pub(crate) fn compile_replace(base_len: usize, range: Range<usize>, text: &str) -> Delta<RopeInfo> {
    let mut builder = Builder::new(base_len);
    if range.is_empty() {
        builder.replace(range.start..range.start, Rope::from(text));
    } else if text.is_empty() {
        builder.delete(range);
    } else {
        builder.replace(range, Rope::from(text));
    }
    builder.build()
}

/// Where a fragment's text, blocks and marks land relative to the insertion point
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FragmentLayout {
    pub text: String,
    pub blocks: Vec<BlockSpan>,
    pub marks: Vec<MarkSpan>,
}

/// Lay out a fragment for insertion between `before` and `after`.
///
/// Block fragments always start and end on their own line, so a separating
/// newline is added on each side that doesn't already have one. Paragraphs
/// carry no block span: untagged text is a paragraph.
pub(crate) fn layout_fragment(
    fragment: &Fragment,
    before: Option<char>,
    after: Option<char>,
) -> FragmentLayout {
    let inline = fragment.is_inline();
    let mut text = String::new();
    let mut blocks = Vec::new();
    let mut marks = Vec::new();

    if !inline && before.is_some_and(|c| c != '\n') {
        text.push('\n');
    }

    for (index, block) in fragment.blocks.iter().enumerate() {
        if index > 0 {
            text.push('\n');
        }
        let start = text.len();
        text.push_str(&block.text);

        if block.kind != BlockKind::Paragraph {
            blocks.push(BlockSpan {
                range: start..text.len(),
                kind: block.kind.clone(),
            });
        }
        marks.extend(block.marks.iter().map(|span| span.offset_by(start)));
    }

    if !inline && after.is_some_and(|c| c != '\n') {
        text.push('\n');
    }

    FragmentLayout {
        text,
        blocks,
        marks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::Block;

    #[test]
    fn test_compile_replace_insertion() {
        let base = Rope::from("Hello World");
        let delta = compile_replace(base.len(), 5..5, ",");
        assert_eq!(delta.apply(&base).to_string(), "Hello, World");
    }

    #[test]
    fn test_compile_replace_deletion() {
        let base = Rope::from("Hello World");
        let delta = compile_replace(base.len(), 5..11, "");
        assert_eq!(delta.apply(&base).to_string(), "Hello");
    }

    #[test]
    fn test_compile_replace_replacement() {
        let base = Rope::from("Hello World");
        let delta = compile_replace(base.len(), 6..11, "Rust");
        assert_eq!(delta.apply(&base).to_string(), "Hello Rust");
    }

    #[test]
    fn test_layout_inline_fragment_has_no_separators() {
        let fragment = Fragment::single(Block::paragraph("pasted"));
        let layout = layout_fragment(&fragment, Some('a'), Some('b'));

        assert_eq!(layout.text, "pasted");
        assert!(layout.blocks.is_empty());
    }

    #[test]
    fn test_layout_block_fragment_mid_line() {
        let fragment = Fragment::single(Block::code_fence(Some("rust".into()), "fn main() {}"));
        let layout = layout_fragment(&fragment, Some('a'), Some('b'));

        assert_eq!(layout.text, "\nfn main() {}\n");
        assert_eq!(layout.blocks.len(), 1);
        assert_eq!(layout.blocks[0].range, 1..13);
    }

    #[test]
    fn test_layout_block_fragment_on_own_line() {
        let fragment = Fragment::single(Block::code_fence(None, "x"));
        let layout = layout_fragment(&fragment, Some('\n'), None);

        assert_eq!(layout.text, "x");
        assert_eq!(layout.blocks[0].range, 0..1);
    }

    #[test]
    fn test_layout_offsets_marks_per_block() {
        let fragment = Fragment::new(vec![
            Block::new(BlockKind::Heading { level: 2 }, "Title"),
            Block::paragraph("see docs").with_marks(vec![MarkSpan::new(4..8, Mark::Strong)]),
        ]);
        let layout = layout_fragment(&fragment, None, None);

        assert_eq!(layout.text, "Title\nsee docs");
        assert_eq!(layout.blocks.len(), 1);
        assert_eq!(layout.marks, vec![MarkSpan::new(10..14, Mark::Strong)]);
    }
}
