use std::fmt;
use std::ops::Range;

use log::debug;

use crate::clipboard::{ClipboardPayload, EditorMetadata};
use crate::paste::detect::{
    DefaultUrlDetector, InternalFormatDetector, MarkdownDetector, MarkerDetector,
    RegexMarkdownDetector, UrlDetector,
};
use crate::paste::{EditorContext, EmbedAction, EmbedMatcher, LanguageSet};

/// Language mode foreign editors report for Markdown source
const MARKDOWN_MODE: &str = "markdown";

/// The handling strategy chosen for a paste
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasteKind {
    UrlLink,
    UrlEmbed,
    CodeContext,
    ForeignCodeBlock,
    /// Left to the host's own clipboard handling
    NativeFormat,
    MarkdownText,
    /// Left to the host's HTML importer
    GenericHtml,
}

/// Why a paste was handed back to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferReason {
    NotEditable,
    EmptyPayload,
    /// HTML written by this editor's own serializer
    InternalFormat,
    ForeignHtml,
}

impl fmt::Display for DeferReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeferReason::NotEditable => "not editable",
            DeferReason::EmptyPayload => "empty payload",
            DeferReason::InternalFormat => "internal format",
            DeferReason::ForeignHtml => "foreign html",
        })
    }
}

/// Where a pasted URL becomes a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Link the selected text; the text itself is kept
    Selection(Range<usize>),
    /// Insert the URL at the cursor as linked text
    InsertAt(usize),
}

/// Outcome of classifying one paste, with the data its handling needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    UrlLink {
        href: String,
        target: LinkTarget,
    },
    UrlEmbed {
        href: String,
        action: EmbedAction,
        at: usize,
    },
    /// Literal text pasted into code
    CodeContext {
        text: String,
        range: Range<usize>,
    },
    ForeignCodeBlock {
        /// `None` when the source language isn't recognized
        language: Option<String>,
        text: String,
        range: Range<usize>,
    },
    MarkdownText {
        raw_text: String,
        range: Range<usize>,
    },
    Defer {
        kind: PasteKind,
        reason: DeferReason,
    },
}

impl Classification {
    pub fn kind(&self) -> PasteKind {
        match self {
            Classification::UrlLink { .. } => PasteKind::UrlLink,
            Classification::UrlEmbed { .. } => PasteKind::UrlEmbed,
            Classification::CodeContext { .. } => PasteKind::CodeContext,
            Classification::ForeignCodeBlock { .. } => PasteKind::ForeignCodeBlock,
            Classification::MarkdownText { .. } => PasteKind::MarkdownText,
            Classification::Defer { kind, .. } => *kind,
        }
    }
}

/// Facts about one paste, derived once and shared by every rule
struct ClassifyInput<'a> {
    payload: &'a ClipboardPayload,
    context: &'a EditorContext,
    metadata: Option<EditorMetadata>,
    is_url: bool,
    /// Embed for a URL pasted at a bare cursor outside a table
    embed: Option<EmbedAction>,
    classifier: &'a ClipboardClassifier,
    languages: &'a LanguageSet,
}

impl ClassifyInput<'_> {
    fn text(&self) -> String {
        self.payload.plain_text.clone()
    }

    fn range(&self) -> Range<usize> {
        self.context.selection.clone()
    }

    fn language_mode(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(EditorMetadata::language_mode)
    }
}

/// One entry of the ranked rule table
///
/// `decide` is both predicate and builder: it returns the classification
/// when the rule applies and `None` to pass to the next rule.
pub struct ClassifierRule {
    name: &'static str,
    decide: fn(&ClassifyInput<'_>) -> Option<Classification>,
}

impl ClassifierRule {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ClassifierRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierRule").field("name", &self.name).finish()
    }
}

const FOREIGN_HTML: ClassifierRule = ClassifierRule {
    name: "foreign_html",
    decide: |_| Some(foreign_html()),
};

fn foreign_html() -> Classification {
    Classification::Defer {
        kind: PasteKind::GenericHtml,
        reason: DeferReason::ForeignHtml,
    }
}

/// Ranked rules, first match wins. The last rule always matches.
static RULES: &[ClassifierRule] = &[
    ClassifierRule {
        name: "not_editable",
        decide: |input| {
            (!input.context.editable).then_some(Classification::Defer {
                kind: PasteKind::NativeFormat,
                reason: DeferReason::NotEditable,
            })
        },
    },
    ClassifierRule {
        name: "empty_payload",
        decide: |input| {
            input.payload.is_empty().then_some(Classification::Defer {
                kind: PasteKind::NativeFormat,
                reason: DeferReason::EmptyPayload,
            })
        },
    },
    ClassifierRule {
        name: "url_over_selection",
        decide: |input| {
            (input.is_url && !input.context.selection_empty()).then(|| Classification::UrlLink {
                href: input.text(),
                target: LinkTarget::Selection(input.range()),
            })
        },
    },
    ClassifierRule {
        name: "url_embed",
        decide: |input| {
            let action = input.embed.as_ref().filter(|_| input.is_url)?;
            Some(Classification::UrlEmbed {
                href: input.text(),
                action: action.clone(),
                at: input.context.cursor(),
            })
        },
    },
    ClassifierRule {
        name: "url_insert",
        decide: |input| {
            input.is_url.then(|| Classification::UrlLink {
                href: input.text(),
                target: LinkTarget::InsertAt(input.context.cursor()),
            })
        },
    },
    ClassifierRule {
        name: "code_context",
        decide: |input| {
            input.context.in_code_block.then(|| Classification::CodeContext {
                text: input.text(),
                range: input.range(),
            })
        },
    },
    ClassifierRule {
        name: "foreign_code",
        decide: |input| {
            let mode = input.language_mode().filter(|mode| *mode != MARKDOWN_MODE)?;
            Some(Classification::ForeignCodeBlock {
                language: input.languages.recognize(mode),
                text: input.text(),
                range: input.range(),
            })
        },
    },
    ClassifierRule {
        name: "internal_html",
        decide: |input| {
            input
                .classifier
                .internal
                .is_internal(&input.payload.html)
                .then_some(Classification::Defer {
                    kind: PasteKind::NativeFormat,
                    reason: DeferReason::InternalFormat,
                })
        },
    },
    ClassifierRule {
        name: "markdown",
        decide: |input| {
            let markdown = input
                .classifier
                .markdown
                .looks_like_markdown(&input.payload.plain_text)
                || input.payload.html.is_empty()
                || input.language_mode() == Some(MARKDOWN_MODE);
            markdown.then(|| Classification::MarkdownText {
                raw_text: input.text(),
                range: input.range(),
            })
        },
    },
    FOREIGN_HTML,
];

/// Decides how a paste is handled
///
/// Classification is a pure function of the payload, the editor context and
/// the registries passed in. The detectors are pluggable; [`ClipboardClassifier::new`]
/// uses the defaults.
pub struct ClipboardClassifier {
    url: Box<dyn UrlDetector>,
    markdown: Box<dyn MarkdownDetector>,
    internal: Box<dyn InternalFormatDetector>,
}

impl ClipboardClassifier {
    pub fn new() -> Self {
        Self {
            url: Box::new(DefaultUrlDetector),
            markdown: Box::new(RegexMarkdownDetector),
            internal: Box::new(MarkerDetector::default()),
        }
    }

    pub fn with_url_detector(mut self, detector: impl UrlDetector + 'static) -> Self {
        self.url = Box::new(detector);
        self
    }

    pub fn with_markdown_detector(mut self, detector: impl MarkdownDetector + 'static) -> Self {
        self.markdown = Box::new(detector);
        self
    }

    pub fn with_internal_detector(
        mut self,
        detector: impl InternalFormatDetector + 'static,
    ) -> Self {
        self.internal = Box::new(detector);
        self
    }

    /// The ranked rules in evaluation order
    pub fn rules() -> &'static [ClassifierRule] {
        RULES
    }

    /// Classify a paste. A missing payload is treated as empty.
    pub fn classify(
        &self,
        payload: Option<&ClipboardPayload>,
        context: &EditorContext,
        embeds: &dyn EmbedMatcher,
        languages: &LanguageSet,
    ) -> Classification {
        self.classify_traced(payload, context, embeds, languages).1
    }

    /// Classify a paste, also returning the name of the rule that fired
    pub fn classify_traced(
        &self,
        payload: Option<&ClipboardPayload>,
        context: &EditorContext,
        embeds: &dyn EmbedMatcher,
        languages: &LanguageSet,
    ) -> (&'static str, Classification) {
        let empty = ClipboardPayload::default();
        let payload = payload.unwrap_or(&empty);

        let is_url = self.url.is_url(&payload.plain_text);
        let embed = if is_url && context.selection_empty() && !context.in_table {
            embeds.matches(&payload.plain_text)
        } else {
            None
        };

        let input = ClassifyInput {
            payload,
            context,
            metadata: payload.editor_metadata(),
            is_url,
            embed,
            classifier: self,
            languages,
        };

        let (name, classification) = RULES
            .iter()
            .find_map(|rule| (rule.decide)(&input).map(|found| (rule.name, found)))
            .unwrap_or_else(|| (FOREIGN_HTML.name, foreign_html()));

        debug!(
            "Paste classified as {:?} by rule {}",
            classification.kind(),
            name
        );
        (name, classification)
    }
}

impl Default for ClipboardClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClipboardClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipboardClassifier").finish_non_exhaustive()
    }
}
