use std::ops::Range;

use xi_rope::Rope;

use crate::editing::commands::{compile_replace, layout_fragment};
use crate::editing::marks::{Stickiness, remove_marks_in, transform_blocks, transform_marks};
use crate::editing::{
    BlockKind, BlockSpan, Cmd, EditError, Fragment, Mark, MarkSpan, Patch, Snapshot, Transaction,
};
use crate::paste::EditorContext;

/// In-memory rich-text document
///
/// Text lives in a single `xi_rope::Rope` buffer. Formatting is kept beside
/// it as byte ranges:
///
/// - **Marks**: inline formatting (strong, emphasis, code, links)
/// - **Blocks**: structural spans (headings, list items, code fences, tables,
///   atoms such as embeds and images). Text outside any block span is a
///   paragraph.
///
/// Edits arrive as a [`Transaction`] of [`Cmd`]s. Every command compiles to a
/// rope `Delta`; marks and blocks are transformed through the same delta so
/// their ranges keep pointing at the same text.
///
/// ## Atomicity
///
/// [`Document::apply`] runs the commands against a draft copy and only
/// replaces `self` once all of them succeed. A transaction that fails half way
/// leaves no trace.
///
/// ```rust
/// # use paste_router_engine::editing::{Cmd, Document, Mark, Transaction};
/// let mut doc = Document::new("see docs").with_selection(4..8);
/// let tx = Transaction::single(Cmd::AddMark {
///     range: 4..8,
///     mark: Mark::Link { href: "https://docs.rs".to_string() },
/// });
/// doc.apply(&tx).unwrap();
/// assert_eq!(doc.text(), "see docs");
/// assert_eq!(doc.marks().len(), 1);
/// ```
#[derive(Clone)]
pub struct Document {
    pub(crate) buffer: Rope,
    pub(crate) marks: Vec<MarkSpan>,
    pub(crate) blocks: Vec<BlockSpan>,
    /// Current selection as byte offsets into the buffer
    pub(crate) selection: Range<usize>,
    /// Incremented on every applied transaction
    pub(crate) version: u64,
    pub(crate) editable: bool,
}

impl Document {
    /// Create an editable document holding `text`, cursor at the end
    pub fn new(text: &str) -> Self {
        let buffer = Rope::from(text);
        let len = buffer.len();

        Self {
            buffer,
            marks: Vec::new(),
            blocks: Vec::new(),
            selection: len..len,
            version: 0,
            editable: true,
        }
    }

    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EditError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::new(text))
    }

    /// Set the selection; a backwards range is stored start-first
    pub fn with_selection(mut self, selection: Range<usize>) -> Self {
        self.selection = forward_range(selection);
        self
    }

    pub fn with_block(mut self, range: Range<usize>, kind: BlockKind) -> Self {
        self.blocks.push(BlockSpan { range, kind });
        self
    }

    pub fn with_mark(mut self, range: Range<usize>, mark: Mark) -> Self {
        self.marks.push(MarkSpan::new(range, mark));
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Apply a transaction atomically
    ///
    /// ## Return Value
    ///
    /// - `Ok(Patch)` with the changed ranges, new selection and version
    /// - `Err(EditError)` when any command is rejected; the document is untouched
    pub fn apply(&mut self, tx: &Transaction) -> Result<Patch, EditError> {
        if !self.editable {
            return Err(EditError::ReadOnly);
        }

        let mut draft = self.clone();
        let mut changed = Vec::new();
        for cmd in tx.cmds() {
            changed.extend(draft.apply_cmd(cmd)?);
        }

        if let Some(selection) = tx.selection() {
            draft.check_range(selection)?;
            draft.selection = selection.clone();
        }

        draft.version += 1;
        let patch = Patch {
            changed,
            new_selection: draft.selection.clone(),
            version: draft.version,
        };

        *self = draft;
        Ok(patch)
    }

    fn apply_cmd(&mut self, cmd: &Cmd) -> Result<Vec<Range<usize>>, EditError> {
        self.check_range(cmd.range())?;

        match cmd {
            Cmd::ReplaceRange { range, text } => {
                Ok(vec![self.replace(range.clone(), text, Stickiness::Inclusive)])
            }
            Cmd::AddMark { range, mark } => {
                if range.is_empty() {
                    return Ok(Vec::new());
                }
                remove_marks_in(&mut self.marks, range, |existing| existing.same_family(mark));
                self.marks.push(MarkSpan::new(range.clone(), mark.clone()));
                Ok(vec![range.clone()])
            }
            Cmd::ClearMarks { range } => {
                remove_marks_in(&mut self.marks, range, |_| true);
                Ok(vec![range.clone()])
            }
            Cmd::InsertFragment { range, fragment } => Ok(vec![self.insert_fragment(range, fragment)]),
        }
    }

    /// Replace `range` with `text`, carrying marks and blocks through the edit
    fn replace(&mut self, range: Range<usize>, text: &str, stickiness: Stickiness) -> Range<usize> {
        let delta = compile_replace(self.len(), range.clone(), text);
        self.buffer = delta.apply(&self.buffer);

        let new_len = self.len();
        transform_marks(&mut self.marks, &delta, new_len);
        transform_blocks(&mut self.blocks, &delta, new_len, stickiness);

        let inserted = range.start..range.start + text.len();
        self.selection = inserted.end..inserted.end;
        inserted
    }

    fn insert_fragment(&mut self, range: &Range<usize>, fragment: &Fragment) -> Range<usize> {
        let layout = layout_fragment(
            fragment,
            self.char_before(range.start),
            self.char_at(range.end),
        );
        let inserted = self.replace(range.clone(), &layout.text, Stickiness::Exclusive);

        if !fragment.is_inline() {
            self.split_blocks_around(&inserted);
        }

        let base = inserted.start;
        self.blocks.extend(layout.blocks.into_iter().map(|block| BlockSpan {
            range: (block.range.start + base)..(block.range.end + base),
            kind: block.kind,
        }));
        self.marks
            .extend(layout.marks.iter().map(|span| span.offset_by(base)));
        self.blocks.sort_by_key(|block| block.range.start);

        inserted
    }

    /// Pasted blocks own the inserted range. Existing blocks reaching into it
    /// are cut back to its edges; one spanning it splits in two.
    fn split_blocks_around(&mut self, inserted: &Range<usize>) {
        let mut split = Vec::with_capacity(self.blocks.len());

        for block in self.blocks.drain(..) {
            let overlaps =
                block.range.start < inserted.end && inserted.start < block.range.end;
            if !overlaps {
                split.push(block);
                continue;
            }

            if block.range.start < inserted.start {
                split.push(BlockSpan {
                    range: block.range.start..inserted.start,
                    kind: block.kind.clone(),
                });
            }
            if inserted.end < block.range.end {
                split.push(BlockSpan {
                    range: inserted.end..block.range.end,
                    kind: block.kind,
                });
            }
        }

        self.blocks = split;
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), EditError> {
        let len = self.len();
        if range.start > range.end {
            return Err(EditError::Inverted {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > len {
            return Err(EditError::OutOfBounds {
                start: range.start,
                end: range.end,
                len,
            });
        }

        let text = self.text();
        for offset in [range.start, range.end] {
            if !text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary(offset));
            }
        }
        Ok(())
    }

    /// Snapshot the facts paste classification depends on
    pub fn context(&self) -> EditorContext {
        let at = self.selection.start;

        let inside_block = |wanted: fn(&BlockKind) -> bool| {
            self.blocks
                .iter()
                .any(|block| wanted(&block.kind) && block.range.start <= at && at <= block.range.end)
        };

        let in_code_mark = self
            .marks
            .iter()
            .any(|span| span.mark == Mark::Code && span.range.start < at && at < span.range.end);

        EditorContext {
            editable: self.editable,
            selection: self.selection.clone(),
            in_code_block: in_code_mark
                || inside_block(|kind| matches!(kind, BlockKind::CodeFence { .. })),
            in_table: inside_block(|kind| matches!(kind, BlockKind::Table)),
        }
    }

    /// Immutable view for rendering and assertions
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self)
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn set_selection(&mut self, selection: Range<usize>) {
        self.selection = forward_range(selection);
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn marks(&self) -> &[MarkSpan] {
        &self.marks
    }

    pub fn blocks(&self) -> &[BlockSpan] {
        &self.blocks
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Marks covering the byte at `offset`
    pub fn marks_at(&self, offset: usize) -> Vec<&Mark> {
        self.marks
            .iter()
            .filter(|span| span.range.start <= offset && offset < span.range.end)
            .map(|span| &span.mark)
            .collect()
    }

    fn char_before(&self, offset: usize) -> Option<char> {
        if offset == 0 {
            return None;
        }
        self.buffer.slice_to_cow(0..offset).chars().next_back()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.len() {
            return None;
        }
        self.buffer.slice_to_cow(offset..self.len()).chars().next()
    }
}

/// A selection made right to left arrives with `start > end`
pub(crate) fn forward_range(range: Range<usize>) -> Range<usize> {
    if range.start <= range.end {
        range
    } else {
        range.end..range.start
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.buffer.to_string() == other.buffer.to_string()
            && self.marks == other.marks
            && self.blocks == other.blocks
            && self.selection == other.selection
            && self.version == other.version
            && self.editable == other.editable
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.text())
            .field("marks", &self.marks)
            .field("blocks", &self.blocks)
            .field("selection", &self.selection)
            .field("version", &self.version)
            .field("editable", &self.editable)
            .finish()
    }
}
