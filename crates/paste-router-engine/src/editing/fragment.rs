use std::ops::Range;

use crate::editing::MarkSpan;

/// Placeholder text held by atom blocks (embeds, images, rules) in the buffer
pub const ATOM_PLACEHOLDER: &str = "\u{FFFC}";

/// Structural kind of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading {
        level: u8,
    },
    ListItem {
        ordered: bool,
        depth: usize,
        /// `Some` for task list items
        checked: Option<bool>,
    },
    BlockQuote,
    CodeFence {
        language: Option<String>,
    },
    Table,
    ThematicBreak,
    Embed {
        provider: String,
        href: String,
    },
    Image {
        src: String,
        mime: String,
    },
}

impl BlockKind {
    /// Atoms have no editable text of their own
    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            BlockKind::ThematicBreak | BlockKind::Embed { .. } | BlockKind::Image { .. }
        )
    }

    /// Short label used in snapshots
    pub fn label(&self) -> String {
        match self {
            BlockKind::Paragraph => "paragraph".to_string(),
            BlockKind::Heading { level } => format!("heading({level})"),
            BlockKind::ListItem {
                ordered,
                depth,
                checked,
            } => {
                let marker = if *ordered { "ordered" } else { "bullet" };
                match checked {
                    Some(true) => format!("list_item({marker}, depth {depth}, [x])"),
                    Some(false) => format!("list_item({marker}, depth {depth}, [ ])"),
                    None => format!("list_item({marker}, depth {depth})"),
                }
            }
            BlockKind::BlockQuote => "blockquote".to_string(),
            BlockKind::CodeFence { language } => match language {
                Some(lang) => format!("code_fence({lang})"),
                None => "code_fence".to_string(),
            },
            BlockKind::Table => "table".to_string(),
            BlockKind::ThematicBreak => "rule".to_string(),
            BlockKind::Embed { provider, href } => format!("embed({provider}, {href})"),
            BlockKind::Image { mime, .. } => format!("image({mime})"),
        }
    }
}

/// A block positioned in a document buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    pub range: Range<usize>,
    pub kind: BlockKind,
}

/// A detached block: its text plus marks relative to the start of that text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
    pub marks: Vec<MarkSpan>,
}

impl Block {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }

    /// Raw code, never parsed
    pub fn code_fence(language: Option<String>, code: impl Into<String>) -> Self {
        Self::new(BlockKind::CodeFence { language }, code)
    }

    pub fn atom(kind: BlockKind) -> Self {
        Self::new(kind, ATOM_PLACEHOLDER)
    }

    pub fn with_marks(mut self, marks: Vec<MarkSpan>) -> Self {
        self.marks = marks;
        self
    }
}

/// Structured content ready to be spliced into a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub blocks: Vec<Block>,
}

impl Fragment {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn single(block: Block) -> Self {
        Self {
            blocks: vec![block],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// A lone paragraph is spliced into the surrounding line instead of
    /// opening a block of its own.
    pub fn is_inline(&self) -> bool {
        matches!(self.blocks.as_slice(), [block] if block.kind == BlockKind::Paragraph)
    }

    /// Text of the fragment as it lands in the buffer: blocks joined by newlines
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
