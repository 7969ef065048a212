use std::ops::Range;

use crate::editing::document::forward_range;

/// Editor state at the moment a paste arrives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorContext {
    pub editable: bool,
    /// Byte range of the current selection; empty for a bare cursor
    pub selection: Range<usize>,
    /// Cursor sits inside a code fence or inline code span
    pub in_code_block: bool,
    pub in_table: bool,
}

impl EditorContext {
    /// Editable context with a bare cursor at `at`
    pub fn at(at: usize) -> Self {
        Self {
            editable: true,
            selection: at..at,
            in_code_block: false,
            in_table: false,
        }
    }

    pub fn with_selection(mut self, selection: Range<usize>) -> Self {
        self.selection = forward_range(selection);
        self
    }

    pub fn inside_code(mut self) -> Self {
        self.in_code_block = true;
        self
    }

    pub fn inside_table(mut self) -> Self {
        self.in_table = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn selection_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// Insertion point for pastes that don't replace the selection
    pub fn cursor(&self) -> usize {
        self.selection.start
    }
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::at(0)
    }
}
