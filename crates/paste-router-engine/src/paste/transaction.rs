use log::debug;

use crate::editing::{Block, BlockKind, Cmd, Fragment, Mark, Transaction};
use crate::parsing::{MarkdownParser, PulldownParser};
use crate::paste::{Classification, DeferReason, LinkTarget, normalize};

/// What a paste does to the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Apply this transaction atomically
    Apply(Transaction),
    /// The paste is handled but leaves the document untouched
    Suppress,
    /// Hand the paste back to the host's default handling
    Defer(DeferReason),
}

/// Turns a [`Classification`] into at most one transaction
pub struct TransactionBuilder {
    parser: Box<dyn MarkdownParser>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::with_parser(PulldownParser::new())
    }

    pub fn with_parser(parser: impl MarkdownParser + 'static) -> Self {
        Self {
            parser: Box::new(parser),
        }
    }

    pub fn build(&self, classification: &Classification) -> MutationOutcome {
        match classification {
            Classification::UrlLink {
                href,
                target: LinkTarget::Selection(range),
            } => MutationOutcome::Apply(Transaction::single(Cmd::AddMark {
                range: range.clone(),
                mark: link(href),
            })),

            Classification::UrlLink {
                href,
                target: LinkTarget::InsertAt(cursor),
            } => {
                let at = *cursor;
                MutationOutcome::Apply(
                    Transaction::new()
                        .then(Cmd::ReplaceRange {
                            range: at..at,
                            text: href.clone(),
                        })
                        .then(Cmd::AddMark {
                            range: at..at + href.len(),
                            mark: link(href),
                        }),
                )
            }

            Classification::UrlEmbed { action, at, .. } => {
                let embed = Block::atom(BlockKind::Embed {
                    provider: action.provider.clone(),
                    href: action.href.clone(),
                });
                MutationOutcome::Apply(Transaction::single(Cmd::InsertFragment {
                    range: *at..*at,
                    fragment: Fragment::single(embed),
                }))
            }

            Classification::CodeContext { text, range } => MutationOutcome::Apply(
                Transaction::new()
                    .then(Cmd::ReplaceRange {
                        range: range.clone(),
                        text: text.clone(),
                    })
                    .then(Cmd::ClearMarks {
                        range: range.start..range.start + text.len(),
                    }),
            ),

            Classification::ForeignCodeBlock {
                language,
                text,
                range,
            } => MutationOutcome::Apply(Transaction::single(Cmd::InsertFragment {
                range: range.clone(),
                fragment: Fragment::single(Block::code_fence(language.clone(), text.clone())),
            })),

            Classification::MarkdownText { raw_text, range } => {
                let normalized = normalize(raw_text);
                match self.parser.parse(&normalized) {
                    Some(fragment) if !fragment.is_empty() => {
                        MutationOutcome::Apply(Transaction::single(Cmd::InsertFragment {
                            range: range.clone(),
                            fragment,
                        }))
                    }
                    _ => {
                        debug!("Pasted Markdown produced no content");
                        MutationOutcome::Suppress
                    }
                }
            }

            Classification::Defer { reason, .. } => MutationOutcome::Defer(*reason),
        }
    }
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransactionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionBuilder").finish_non_exhaustive()
    }
}

fn link(href: &str) -> Mark {
    Mark::Link {
        href: href.to_string(),
    }
}
