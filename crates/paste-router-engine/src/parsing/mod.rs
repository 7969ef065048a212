//! Markdown parsing for pasted text.
//!
//! Pasted Markdown is converted into a [`Fragment`]: a flat list of blocks
//! whose text is what lands in the document buffer (syntax stripped) and
//! whose marks are relative to each block's own text.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use crate::editing::{Block, BlockKind, Fragment, Mark, MarkSpan};

/// Converts Markdown source into insertable content
pub trait MarkdownParser {
    /// `None` when the source produces no content
    fn parse(&self, text: &str) -> Option<Fragment>;
}

/// [`MarkdownParser`] backed by `pulldown-cmark`
///
/// Task lists, tables and strikethrough are enabled on top of CommonMark.
#[derive(Debug, Clone, Copy)]
pub struct PulldownParser {
    options: Options,
}

impl PulldownParser {
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TASKLISTS
                | Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH,
        }
    }

    pub fn with_options(options: Options) -> Self {
        Self { options }
    }
}

impl Default for PulldownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownParser for PulldownParser {
    fn parse(&self, text: &str) -> Option<Fragment> {
        let mut processor = FragmentProcessor::new();
        for event in Parser::new_ext(text, self.options) {
            processor.process_event(event);
        }

        let fragment = processor.finalize();
        (!fragment.is_empty()).then_some(fragment)
    }
}

/// What an `End` event closes
///
/// `End` carries less information than the matching `Start`, so every
/// `Start` pushes a frame and every `End` pops one.
#[derive(Debug)]
enum Frame {
    /// Closes the block being filled
    Block,
    /// Closes an inline mark opened at this byte offset of the block text
    Mark(usize, Mark),
    List,
    Quote,
    Table,
    /// Containers with nothing to close
    Transparent,
}

/// Builds a [`Fragment`] from `pulldown-cmark` events.
///
/// # Event flow
///
/// Tight list items carry their text directly; loose ones wrap it in a
/// paragraph:
///
/// ```text
/// - tight            Start(Item) Text("tight") End(Item)
///
/// - loose            Start(Item) Start(Paragraph) Text("loose") End(Paragraph) End(Item)
/// ```
///
/// A nested list arrives between the parent item's text and its `End(Item)`,
/// so the parent block is flushed when the child item starts. Items become
/// one block each with their nesting depth; paragraphs inside block quotes
/// become quote blocks.
struct FragmentProcessor {
    blocks: Vec<Block>,
    /// Block currently receiving text
    current: Option<Block>,
    frames: Vec<Frame>,
    /// One entry per open list, `true` when ordered
    lists: Vec<bool>,
    quote_depth: usize,
    /// Cells written in the current table row
    cells_in_row: usize,
}

impl FragmentProcessor {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            current: None,
            frames: Vec::new(),
            lists: Vec::new(),
            quote_depth: 0,
            cells_in_row: 0,
        }
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => {
                let frame = self.start_tag(tag);
                self.frames.push(frame);
            }
            Event::End(_) => {
                if let Some(frame) = self.frames.pop() {
                    self.end_frame(frame);
                }
            }
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.push_text(&text);
            }
            Event::Code(code) => {
                let start = self.text_len();
                self.push_text(&code);
                self.add_mark(start, Mark::Code);
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => self.push_text(&math),
            Event::FootnoteReference(label) => self.push_text(&format!("[^{}]", &*label)),
            Event::SoftBreak | Event::HardBreak => self.push_text("\n"),
            Event::Rule => {
                self.flush_block();
                self.blocks.push(Block::atom(BlockKind::ThematicBreak));
            }
            Event::TaskListMarker(checked) => {
                if let Some(Block {
                    kind: BlockKind::ListItem { checked: state, .. },
                    ..
                }) = self.current.as_mut()
                {
                    *state = Some(checked);
                }
            }
        }
    }

    fn start_tag(&mut self, tag: Tag) -> Frame {
        match tag {
            Tag::Paragraph => {
                if let Some(item) = self
                    .current
                    .as_mut()
                    .filter(|block| matches!(block.kind, BlockKind::ListItem { .. }))
                {
                    // second paragraph of a loose list item stays in the item
                    if !item.text.is_empty() {
                        item.text.push('\n');
                    }
                    return Frame::Transparent;
                }
                self.open_block(self.paragraph_kind());
                Frame::Block
            }
            Tag::Heading { level, .. } => {
                self.open_block(BlockKind::Heading { level: level as u8 });
                Frame::Block
            }
            Tag::BlockQuote(_) => {
                self.flush_block();
                self.quote_depth += 1;
                Frame::Quote
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_string)
                    }
                    CodeBlockKind::Indented => None,
                };
                self.open_block(BlockKind::CodeFence { language });
                Frame::Block
            }
            Tag::HtmlBlock => {
                self.open_block(self.paragraph_kind());
                Frame::Block
            }
            Tag::List(first_number) => {
                self.flush_block();
                self.lists.push(first_number.is_some());
                Frame::List
            }
            Tag::Item => {
                let ordered = self.lists.last().copied().unwrap_or(false);
                self.open_block(BlockKind::ListItem {
                    ordered,
                    depth: self.lists.len().saturating_sub(1),
                    checked: None,
                });
                Frame::Block
            }
            Tag::Table(_) => {
                self.open_block(BlockKind::Table);
                Frame::Table
            }
            Tag::TableHead | Tag::TableRow => {
                if self.text_len() > 0 {
                    self.push_text("\n");
                }
                self.cells_in_row = 0;
                Frame::Transparent
            }
            Tag::TableCell => {
                if self.cells_in_row > 0 {
                    self.push_text(" | ");
                }
                self.cells_in_row += 1;
                Frame::Transparent
            }
            Tag::Emphasis => Frame::Mark(self.text_len(), Mark::Emphasis),
            Tag::Strong => Frame::Mark(self.text_len(), Mark::Strong),
            Tag::Strikethrough => Frame::Mark(self.text_len(), Mark::Strikethrough),
            Tag::Link { dest_url, .. } => Frame::Mark(
                self.text_len(),
                Mark::Link {
                    href: dest_url.to_string(),
                },
            ),
            _ => Frame::Transparent,
        }
    }

    fn end_frame(&mut self, frame: Frame) {
        match frame {
            Frame::Block | Frame::Table => self.flush_block(),
            Frame::Mark(start, mark) => self.add_mark(start, mark),
            Frame::List => {
                self.flush_block();
                self.lists.pop();
            }
            Frame::Quote => {
                self.flush_block();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            Frame::Transparent => {}
        }
    }

    fn paragraph_kind(&self) -> BlockKind {
        if self.quote_depth > 0 {
            BlockKind::BlockQuote
        } else {
            BlockKind::Paragraph
        }
    }

    fn open_block(&mut self, kind: BlockKind) {
        self.flush_block();
        self.current = Some(Block::new(kind, ""));
    }

    fn text_len(&self) -> usize {
        self.current.as_ref().map_or(0, |block| block.text.len())
    }

    /// Append text to the current block, opening a paragraph for stray inline content
    fn push_text(&mut self, text: &str) {
        let kind = self.paragraph_kind();
        self.current
            .get_or_insert_with(|| Block::new(kind, ""))
            .text
            .push_str(text);
    }

    fn add_mark(&mut self, start: usize, mark: Mark) {
        if let Some(block) = self.current.as_mut() {
            let end = block.text.len();
            if start < end {
                block.marks.push(MarkSpan::new(start..end, mark));
            }
        }
    }

    fn flush_block(&mut self) {
        let Some(mut block) = self.current.take() else {
            return;
        };

        match block.kind {
            BlockKind::CodeFence { .. } => {
                if block.text.ends_with('\n') {
                    block.text.pop();
                }
            }
            _ => {
                let end = block.text.trim_end().len();
                let start = end - block.text[..end].trim_start().len();
                block.text = block.text[start..end].to_string();
                block.marks.retain_mut(|span| {
                    span.range.start = span.range.start.clamp(start, end) - start;
                    span.range.end = span.range.end.clamp(start, end) - start;
                    span.range.start < span.range.end
                });
            }
        }

        let empty_text_block = matches!(block.kind, BlockKind::Paragraph | BlockKind::BlockQuote)
            && block.text.is_empty();
        if !empty_text_block {
            self.blocks.push(block);
        }
    }

    fn finalize(mut self) -> Fragment {
        self.flush_block();
        Fragment::new(self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(text: &str) -> Vec<Block> {
        PulldownParser::new()
            .parse(text)
            .map(|fragment| fragment.blocks)
            .unwrap_or_default()
    }

    fn kinds(text: &str) -> Vec<String> {
        parse(text).iter().map(|block| block.kind.label()).collect()
    }

    #[rstest]
    #[case("")]
    #[case("   \n\n  ")]
    fn test_blank_source_is_none(#[case] text: &str) {
        assert_eq!(PulldownParser::new().parse(text), None);
    }

    #[test]
    fn test_heading() {
        assert_eq!(
            parse("## Title"),
            vec![Block::new(BlockKind::Heading { level: 2 }, "Title")]
        );
    }

    #[test]
    fn test_single_paragraph_is_inline() {
        let fragment = PulldownParser::new().parse("just words").unwrap();
        assert!(fragment.is_inline());
        assert_eq!(fragment.text(), "just words");
    }

    #[test]
    fn test_inline_marks_relative_to_block() {
        let blocks = parse("see **bold** and [docs](https://docs.rs)");

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "see bold and docs");
        assert_eq!(
            blocks[0].marks,
            vec![
                MarkSpan::new(4..8, Mark::Strong),
                MarkSpan::new(
                    13..17,
                    Mark::Link {
                        href: "https://docs.rs".to_string()
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_inline_code_and_strikethrough() {
        let blocks = parse("use `ls` not ~~dir~~");

        assert_eq!(blocks[0].text, "use ls not dir");
        assert_eq!(
            blocks[0].marks,
            vec![
                MarkSpan::new(4..6, Mark::Code),
                MarkSpan::new(11..14, Mark::Strikethrough),
            ]
        );
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            parse("- [x] buy milk\n- [ ] call mom"),
            vec![
                Block::new(
                    BlockKind::ListItem {
                        ordered: false,
                        depth: 0,
                        checked: Some(true)
                    },
                    "buy milk"
                ),
                Block::new(
                    BlockKind::ListItem {
                        ordered: false,
                        depth: 0,
                        checked: Some(false)
                    },
                    "call mom"
                ),
            ]
        );
    }

    #[test]
    fn test_nested_and_ordered_lists() {
        assert_eq!(
            kinds("1. one\n2. two\n   - inner"),
            vec![
                "list_item(ordered, depth 0)",
                "list_item(ordered, depth 0)",
                "list_item(bullet, depth 1)",
            ]
        );
        assert_eq!(parse("1. one\n2. two\n   - inner")[1].text, "two");
    }

    #[test]
    fn test_loose_list_item_keeps_paragraphs_together() {
        let blocks = parse("- first\n\n  second\n- next");

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "first\nsecond");
        assert_eq!(blocks[1].text, "next");
    }

    #[test]
    fn test_fenced_code_keeps_content_raw() {
        assert_eq!(
            parse("```python title=x\nprint(1)\n# not a heading\n```"),
            vec![Block::code_fence(
                Some("python".to_string()),
                "print(1)\n# not a heading"
            )]
        );
    }

    #[test]
    fn test_indented_code_has_no_language() {
        assert_eq!(
            parse("    let x = 1;"),
            vec![Block::code_fence(None, "let x = 1;")]
        );
    }

    #[test]
    fn test_blockquote_and_rule() {
        assert_eq!(
            kinds("> quoted\n\n---\n\nafter"),
            vec!["blockquote", "rule", "paragraph"]
        );
    }

    #[test]
    fn test_table_rows_and_cells() {
        let blocks = parse("| a | b |\n|---|---|\n| 1 | 2 |");

        assert_eq!(blocks, vec![Block::new(BlockKind::Table, "a | b\n1 | 2")]);
    }

    #[test]
    fn test_soft_breaks_keep_lines() {
        assert_eq!(parse("line one\nline two")[0].text, "line one\nline two");
    }
}
