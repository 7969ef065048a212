/*!
 * # Editing Core Module
 *
 * The document model paste transactions are applied to.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: xi-rope Buffer
 * - All text lives in one **`xi_rope::Rope`** buffer
 * - Edits compile to **Deltas**; nothing rewrites the buffer wholesale
 *
 * ### 2. Formatting Beside the Text
 * - **Marks** (strong, emphasis, code, links) and **blocks** (headings, list
 *   items, code fences, tables, embeds, images) are byte ranges into the buffer
 * - Ranges are carried through every Delta with xi-rope's `Transformer`
 *
 * ### 3. Transactions
 * - A **`Transaction`** is an ordered list of **`Cmd`**s
 * - Applied to a draft and committed only when every command succeeds, so a
 *   rejected transaction is never partially visible
 *
 * ### 4. Read API: Immutable Snapshots
 * - **`Snapshot`** gives a position-ordered view for rendering and tests
 *
 * ## Module Structure
 *
 * - **`document`**: `Document` with the rope buffer, marks, blocks and selection
 * - **`commands`**: `Cmd`, `Transaction`, `EditError` and delta compilation
 * - **`marks`**: `Mark`, `MarkSpan` and range transformation through deltas
 * - **`fragment`**: `Block`, `BlockKind`, `Fragment` for structured insertions
 * - **`snapshot`**: ordered read-only view
 * - **`patch`**: changed ranges and new selection after a transaction
 *
 * ## Usage Pattern
 *
 * ```rust
 * use paste_router_engine::editing::*;
 *
 * let mut doc = Document::new("Hello").with_selection(5..5);
 * let tx = Transaction::single(Cmd::ReplaceRange { range: 5..5, text: " World".to_string() });
 * let patch = doc.apply(&tx).unwrap();
 *
 * assert_eq!(doc.text(), "Hello World");
 * assert_eq!(patch.new_selection, 11..11);
 * ```
 */

pub mod commands;
pub mod document;
pub mod fragment;
pub mod marks;
pub mod patch;
pub mod snapshot;

// Public API re-exports
pub use commands::{Cmd, EditError, Transaction};
pub use document::Document;
pub use fragment::{ATOM_PLACEHOLDER, Block, BlockKind, BlockSpan, Fragment};
pub use marks::{Mark, MarkSpan};
pub use patch::Patch;
pub use snapshot::Snapshot;
