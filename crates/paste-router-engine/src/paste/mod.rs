/*!
 * # Paste Routing
 *
 * Decides what a paste does to the document and does it exactly once.
 *
 * ## Pipeline
 *
 * ```text
 * ClipboardEvent ──> PasteDispatcher ──> ClipboardClassifier ──> Classification
 *                          │                                          │
 *                          │             TransactionBuilder <─────────┘
 *                          │                    │ (normalize + parse for Markdown)
 *                          │                    v
 *                          └──── apply <── MutationOutcome
 * ```
 *
 * - **`ClipboardClassifier`**: pure; a ranked table of rules, first match wins
 * - **`TransactionBuilder`**: turns a classification into one transaction, a
 *   handled no-op, or a defer signal
 * - **`PasteDispatcher`**: the only component that touches the document
 *
 * Deferring means the host runs its own clipboard handling (its HTML
 * importer, or nothing for read-only documents).
 *
 * ## Collaborators
 *
 * Everything the rules consult sits behind a trait: [`UrlDetector`],
 * [`MarkdownDetector`], [`InternalFormatDetector`], [`EmbedMatcher`],
 * [`ImagePasteHandler`], [`MediaUiInitializer`] and the
 * [`MarkdownParser`](crate::parsing::MarkdownParser).
 */

mod classify;
mod context;
mod detect;
mod dispatcher;
mod embeds;
mod image;
mod languages;
mod normalize;
mod transaction;

pub use classify::{
    Classification, ClassifierRule, ClipboardClassifier, DeferReason, LinkTarget, PasteKind,
};
pub use context::EditorContext;
pub use detect::{
    DEFAULT_INTERNAL_MARKER, DefaultUrlDetector, InternalFormatDetector, MarkdownDetector,
    MarkerDetector, RegexMarkdownDetector, UrlDetector,
};
pub use dispatcher::{IMAGE_RULE, PasteDispatcher, PasteResult, PasteTarget};
pub use embeds::{
    DEFAULT_PROVIDERS, EmbedAction, EmbedError, EmbedMatcher, EmbedRegistry, RegexEmbedMatcher,
};
pub use image::{DataUrlImageHandler, ImageDescriptor, ImagePasteHandler, MediaUiInitializer, NoMediaUi};
pub use languages::{DEFAULT_LANGUAGES, LanguageSet};
pub use normalize::normalize;
pub use transaction::{MutationOutcome, TransactionBuilder};
