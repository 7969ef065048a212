use log::{debug, warn};

use crate::clipboard::{ClipboardEvent, ClipboardPayload};
use crate::editing::{Cmd, Document, EditError, Fragment, Patch, Transaction};
use crate::parsing::MarkdownParser;
use crate::paste::{
    ClipboardClassifier, DataUrlImageHandler, DeferReason, EditorContext, EmbedMatcher,
    EmbedRegistry, ImagePasteHandler, LanguageSet, MediaUiInitializer, MutationOutcome, NoMediaUi,
    TransactionBuilder,
};

/// The document a paste lands in
pub trait PasteTarget {
    /// Facts about the current selection
    fn context(&self) -> EditorContext;

    /// Apply a transaction atomically; on error the document is untouched
    fn apply(&mut self, tx: &Transaction) -> Result<Patch, EditError>;
}

impl PasteTarget for Document {
    fn context(&self) -> EditorContext {
        Document::context(self)
    }

    fn apply(&mut self, tx: &Transaction) -> Result<Patch, EditError> {
        Document::apply(self, tx)
    }
}

/// Name reported for pastes handled by the image handler
pub const IMAGE_RULE: &str = "image";

/// How one paste event ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteResult {
    /// A transaction was applied
    Applied { rule: &'static str, patch: Patch },
    /// Handled without touching the document
    Suppressed { rule: &'static str },
    /// Left to the host's default handling
    Deferred {
        rule: &'static str,
        reason: DeferReason,
    },
    /// The document rejected the transaction and was left as it was
    Rejected {
        rule: &'static str,
        error: EditError,
    },
    /// The dispatcher isn't mounted
    Unmounted,
}

impl PasteResult {
    /// Whether the host should consider the event consumed
    pub fn is_handled(&self) -> bool {
        matches!(
            self,
            PasteResult::Applied { .. } | PasteResult::Suppressed { .. }
        )
    }

    pub fn rule(&self) -> Option<&'static str> {
        match self {
            PasteResult::Applied { rule, .. }
            | PasteResult::Suppressed { rule }
            | PasteResult::Deferred { rule, .. }
            | PasteResult::Rejected { rule, .. } => Some(*rule),
            PasteResult::Unmounted => None,
        }
    }
}

/// Routes paste events into a document
///
/// One dispatcher serves one editor instance. It is inert until
/// [`mount`](PasteDispatcher::mount)ed; each [`handle`](PasteDispatcher::handle)
/// call is independent of the previous ones.
///
/// ```rust
/// use paste_router_engine::clipboard::{ClipboardEvent, TEXT_PLAIN};
/// use paste_router_engine::editing::Document;
/// use paste_router_engine::paste::PasteDispatcher;
///
/// let mut dispatcher = PasteDispatcher::new();
/// dispatcher.mount();
///
/// let mut doc = Document::new("docs").with_selection(0..4);
/// let event = ClipboardEvent::default().with_text(TEXT_PLAIN, "https://docs.rs");
///
/// assert!(dispatcher.handle(&mut doc, &event));
/// assert_eq!(doc.text(), "docs");
/// assert_eq!(doc.marks().len(), 1);
/// ```
pub struct PasteDispatcher {
    classifier: ClipboardClassifier,
    builder: TransactionBuilder,
    embeds: Box<dyn EmbedMatcher>,
    languages: LanguageSet,
    images: Option<Box<dyn ImagePasteHandler>>,
    media_ui: Box<dyn MediaUiInitializer>,
    mounted: bool,
}

impl PasteDispatcher {
    /// Dispatcher with the default detectors, embed providers, languages,
    /// Markdown parser and image handler
    pub fn new() -> Self {
        Self {
            classifier: ClipboardClassifier::new(),
            builder: TransactionBuilder::new(),
            embeds: Box::new(EmbedRegistry::with_defaults()),
            languages: LanguageSet::default(),
            images: Some(Box::new(DataUrlImageHandler::new())),
            media_ui: Box::new(NoMediaUi),
            mounted: false,
        }
    }

    pub fn with_classifier(mut self, classifier: ClipboardClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_parser(mut self, parser: impl MarkdownParser + 'static) -> Self {
        self.builder = TransactionBuilder::with_parser(parser);
        self
    }

    pub fn with_embeds(mut self, embeds: impl EmbedMatcher + 'static) -> Self {
        self.embeds = Box::new(embeds);
        self
    }

    pub fn with_languages(mut self, languages: LanguageSet) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_image_handler(mut self, handler: impl ImagePasteHandler + 'static) -> Self {
        self.images = Some(Box::new(handler));
        self
    }

    /// Leave image-only pastes to the host
    pub fn without_image_paste(mut self) -> Self {
        self.images = None;
        self
    }

    pub fn with_media_ui(mut self, media_ui: impl MediaUiInitializer + 'static) -> Self {
        self.media_ui = Box::new(media_ui);
        self
    }

    /// Attach to the editor. Runs the media UI initializer unless already mounted.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.media_ui.initialize();
        self.mounted = true;
        debug!("Paste dispatcher mounted");
    }

    /// Detach from the editor, tearing down the media UI
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.media_ui.teardown();
        self.mounted = false;
        debug!("Paste dispatcher unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Handle one paste event. Returns `true` when the paste was consumed and
    /// `false` when the host should run its default handling.
    pub fn handle<T: PasteTarget + ?Sized>(&self, target: &mut T, event: &ClipboardEvent) -> bool {
        self.dispatch(target, event).is_handled()
    }

    /// Handle one paste event, reporting how it ended
    pub fn dispatch<T: PasteTarget + ?Sized>(
        &self,
        target: &mut T,
        event: &ClipboardEvent,
    ) -> PasteResult {
        if !self.mounted {
            debug!("Ignoring paste on unmounted dispatcher");
            return PasteResult::Unmounted;
        }

        let context = target.context();
        let payload = event.payload();

        if let Some(tx) = self.image_transaction(&context, event, payload.as_ref()) {
            return Self::apply(target, IMAGE_RULE, tx);
        }

        let (rule, classification) = self.classifier.classify_traced(
            payload.as_ref(),
            &context,
            &*self.embeds,
            &self.languages,
        );

        match self.builder.build(&classification) {
            MutationOutcome::Apply(tx) => Self::apply(target, rule, tx),
            MutationOutcome::Suppress => PasteResult::Suppressed { rule },
            MutationOutcome::Defer(reason) => {
                debug!("Deferring paste to host ({reason})");
                PasteResult::Deferred { rule, reason }
            }
        }
    }

    /// An image-only paste into an editable document becomes an image block
    fn image_transaction(
        &self,
        context: &EditorContext,
        event: &ClipboardEvent,
        payload: Option<&ClipboardPayload>,
    ) -> Option<Transaction> {
        let handler = self.images.as_ref()?;
        let has_text = payload.is_some_and(|payload| !payload.plain_text.is_empty());
        if !context.editable || has_text {
            return None;
        }

        let image = handler.read_image(event.image()?)?;
        debug!("Pasting {} image ({} bytes)", image.mime, image.byte_len);

        Some(Transaction::single(Cmd::InsertFragment {
            range: context.selection.clone(),
            fragment: Fragment::single(image.to_block()),
        }))
    }

    fn apply<T: PasteTarget + ?Sized>(
        target: &mut T,
        rule: &'static str,
        tx: Transaction,
    ) -> PasteResult {
        match target.apply(&tx) {
            Ok(patch) => PasteResult::Applied { rule, patch },
            Err(error) => {
                warn!("Paste transaction rejected by document: {error}");
                PasteResult::Rejected { rule, error }
            }
        }
    }
}

impl Default for PasteDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PasteDispatcher {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for PasteDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasteDispatcher")
            .field("languages", &self.languages.len())
            .field("image_paste", &self.images.is_some())
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ClipboardItem, TEXT_HTML, TEXT_PLAIN, VSCODE_EDITOR_DATA};
    use crate::editing::{BlockKind, Mark, MarkSpan};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn mounted() -> PasteDispatcher {
        let mut dispatcher = PasteDispatcher::new();
        dispatcher.mount();
        dispatcher
    }

    fn text_event(text: &str) -> ClipboardEvent {
        ClipboardEvent::default().with_text(TEXT_PLAIN, text)
    }

    #[derive(Default, Clone)]
    struct CountingMediaUi {
        initialized: Rc<Cell<u32>>,
        torn_down: Rc<Cell<u32>>,
    }

    impl MediaUiInitializer for CountingMediaUi {
        fn initialize(&mut self) {
            self.initialized.set(self.initialized.get() + 1);
        }

        fn teardown(&mut self) {
            self.torn_down.set(self.torn_down.get() + 1);
        }
    }

    // ============ Lifecycle ============

    #[test]
    fn test_mount_initializes_media_ui_once() {
        let media_ui = CountingMediaUi::default();
        let mut dispatcher = PasteDispatcher::new().with_media_ui(media_ui.clone());

        dispatcher.mount();
        dispatcher.mount();
        assert_eq!(media_ui.initialized.get(), 1);

        dispatcher.unmount();
        dispatcher.unmount();
        assert_eq!(media_ui.torn_down.get(), 1);

        dispatcher.mount();
        assert_eq!(media_ui.initialized.get(), 2);
    }

    #[test]
    fn test_drop_tears_down_mounted_dispatcher() {
        let media_ui = CountingMediaUi::default();
        {
            let mut dispatcher = PasteDispatcher::new().with_media_ui(media_ui.clone());
            dispatcher.mount();
        }
        assert_eq!(media_ui.torn_down.get(), 1);
    }

    #[test]
    fn test_unmounted_dispatcher_declines() {
        let dispatcher = PasteDispatcher::new();
        let mut doc = Document::new("");

        assert_eq!(
            dispatcher.dispatch(&mut doc, &text_event("hello")),
            PasteResult::Unmounted
        );
        assert_eq!(doc.text(), "");
    }

    // ============ Outcomes ============

    #[test]
    fn test_url_over_selection_is_handled() {
        let dispatcher = mounted();
        let mut doc = Document::new("see docs").with_selection(4..8);

        let handled = dispatcher.handle(&mut doc, &text_event("https://docs.rs"));

        assert!(handled);
        assert_eq!(
            doc.marks(),
            &[MarkSpan::new(
                4..8,
                Mark::Link {
                    href: "https://docs.rs".to_string()
                }
            )]
        );
    }

    #[test]
    fn test_foreign_html_is_deferred_untouched() {
        let dispatcher = mounted();
        let mut doc = Document::new("keep");
        let before = doc.clone();
        let event = text_event("words").with_text(TEXT_HTML, "<p><i>words</i></p>");

        let result = dispatcher.dispatch(&mut doc, &event);

        assert_eq!(
            result,
            PasteResult::Deferred {
                rule: "foreign_html",
                reason: DeferReason::ForeignHtml,
            }
        );
        assert!(!result.is_handled());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_empty_markdown_is_suppressed() {
        let dispatcher = mounted();
        let mut doc = Document::new("keep");
        let before = doc.clone();

        let result = dispatcher.dispatch(&mut doc, &text_event("\n\n"));

        assert_eq!(result, PasteResult::Suppressed { rule: "markdown" });
        assert!(result.is_handled());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_read_only_document_defers() {
        let dispatcher = mounted();
        let mut doc = Document::new("locked").with_editable(false);

        assert!(!dispatcher.handle(&mut doc, &text_event("# Title")));
        assert_eq!(doc.text(), "locked");
    }

    #[test]
    fn test_rejected_transaction_leaves_document_and_declines() {
        struct StaleTarget(Document);

        impl PasteTarget for StaleTarget {
            fn context(&self) -> EditorContext {
                // selection reported past the end of the document
                EditorContext::at(50)
            }

            fn apply(&mut self, tx: &Transaction) -> Result<Patch, EditError> {
                self.0.apply(tx)
            }
        }

        let dispatcher = mounted();
        let mut target = StaleTarget(Document::new("short"));
        let before = target.0.clone();

        let result = dispatcher.dispatch(&mut target, &text_event("plain"));

        assert!(matches!(
            result,
            PasteResult::Rejected {
                rule: "markdown",
                error: EditError::OutOfBounds { .. }
            }
        ));
        assert!(!result.is_handled());
        assert_eq!(target.0, before);
    }

    #[test]
    fn test_vscode_paste_becomes_code_fence() {
        let dispatcher = mounted();
        let mut doc = Document::new("");
        let event = text_event("print(1)")
            .with_text(TEXT_HTML, "<div>print(1)</div>")
            .with_text(VSCODE_EDITOR_DATA, r#"{"version":1,"mode":"python"}"#);

        assert!(dispatcher.handle(&mut doc, &event));
        assert_eq!(doc.text(), "print(1)");
        assert_eq!(
            doc.blocks()[0].kind,
            BlockKind::CodeFence {
                language: Some("python".to_string())
            }
        );
    }

    // ============ Images ============

    #[test]
    fn test_image_only_paste_inserts_image_block() {
        let dispatcher = mounted();
        let mut doc = Document::new("");
        let event = ClipboardEvent::new(vec![ClipboardItem::bytes(
            "image/png",
            vec![0x89, b'P', b'N', b'G'],
        )]);

        let result = dispatcher.dispatch(&mut doc, &event);

        assert_eq!(result.rule(), Some(IMAGE_RULE));
        assert_eq!(
            doc.blocks()[0].kind,
            BlockKind::Image {
                src: "data:image/png;base64,iVBORw==".to_string(),
                mime: "image/png".to_string(),
            }
        );
    }

    #[test]
    fn test_image_with_text_is_classified_as_text() {
        let dispatcher = mounted();
        let mut doc = Document::new("");
        let event = text_event("caption").with_item(ClipboardItem::bytes("image/png", vec![1]));

        let result = dispatcher.dispatch(&mut doc, &event);

        assert_eq!(result.rule(), Some("markdown"));
        assert_eq!(doc.text(), "caption");
    }

    #[test]
    fn test_image_paste_disabled_defers() {
        let dispatcher = {
            let mut dispatcher = PasteDispatcher::new().without_image_paste();
            dispatcher.mount();
            dispatcher
        };
        let mut doc = Document::new("");
        let event = ClipboardEvent::new(vec![ClipboardItem::bytes("image/png", vec![1, 2])]);

        assert_eq!(
            dispatcher.dispatch(&mut doc, &event),
            PasteResult::Deferred {
                rule: "empty_payload",
                reason: DeferReason::EmptyPayload,
            }
        );
    }
}
