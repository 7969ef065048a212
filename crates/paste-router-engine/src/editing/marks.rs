use std::ops::Range;

use xi_rope::delta::Transformer;
use xi_rope::{Delta, RopeInfo};

use crate::editing::BlockSpan;

/// Inline formatting carried by a byte range of the buffer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mark {
    Strong,
    Emphasis,
    Strikethrough,
    Code,
    Link { href: String },
}

impl Mark {
    /// Marks of the same family exclude each other over a range.
    /// Two links can't overlap, but a link can sit inside a strong span.
    pub fn same_family(&self, other: &Mark) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Short name used in snapshots and logs
    pub fn name(&self) -> &'static str {
        match self {
            Mark::Strong => "strong",
            Mark::Emphasis => "em",
            Mark::Strikethrough => "strike",
            Mark::Code => "code",
            Mark::Link { .. } => "link",
        }
    }
}

/// A mark applied to a byte range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkSpan {
    pub range: Range<usize>,
    pub mark: Mark,
}

impl MarkSpan {
    pub fn new(range: Range<usize>, mark: Mark) -> Self {
        Self { range, mark }
    }

    /// The same mark shifted right by `offset` bytes
    pub fn offset_by(&self, offset: usize) -> Self {
        Self {
            range: (self.range.start + offset)..(self.range.end + offset),
            mark: self.mark.clone(),
        }
    }
}

/// How a span's edges react to text inserted exactly on them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stickiness {
    /// Insertions on either edge land inside the span
    Inclusive,
    /// Insertions on either edge land outside the span
    Exclusive,
}

impl Stickiness {
    fn edges(self) -> (bool, bool) {
        match self {
            // (start moves past the insertion, end moves past the insertion)
            Stickiness::Inclusive => (false, true),
            Stickiness::Exclusive => (true, false),
        }
    }
}

/// Transform mark ranges through a delta, dropping marks whose text was removed.
///
/// Marks never grow on their edges: typing right after a link doesn't extend it.
pub(crate) fn transform_marks(marks: &mut Vec<MarkSpan>, delta: &Delta<RopeInfo>, new_len: usize) {
    let mut transformer = Transformer::new(delta);
    let (start_after, end_after) = Stickiness::Exclusive.edges();

    for span in marks.iter_mut() {
        let start = transformer.transform(span.range.start, start_after);
        let end = transformer.transform(span.range.end, end_after);
        span.range = clamp(start, end, new_len);
    }

    marks.retain(|span| span.range.start < span.range.end);
}

/// Transform block ranges through a delta.
///
/// Plain text typed at a block edge belongs to that block (`Inclusive`); blocks
/// inserted next to an existing block stay outside it (`Exclusive`).
pub(crate) fn transform_blocks(
    blocks: &mut Vec<BlockSpan>,
    delta: &Delta<RopeInfo>,
    new_len: usize,
    stickiness: Stickiness,
) {
    let mut transformer = Transformer::new(delta);
    let (start_after, end_after) = stickiness.edges();

    // Blocks with no text (an empty code fence) survive edits elsewhere;
    // blocks whose text is deleted go away with it.
    blocks.retain_mut(|block| {
        let was_empty = block.range.is_empty();
        // The transformer always places inserts at offset 0 before the copied
        // text, so an inclusive block anchored at 0 is pinned explicitly.
        let start = if !start_after && block.range.start == 0 {
            0
        } else {
            transformer.transform(block.range.start, start_after)
        };
        let end = transformer.transform(block.range.end, end_after);
        block.range = clamp(start, end, new_len);
        was_empty || !block.range.is_empty()
    });
}

/// Remove `range` from every mark matching `filter`, splitting marks that straddle it
pub(crate) fn remove_marks_in(
    marks: &mut Vec<MarkSpan>,
    range: &Range<usize>,
    filter: impl Fn(&Mark) -> bool,
) {
    let mut kept = Vec::with_capacity(marks.len());

    for span in marks.drain(..) {
        if !filter(&span.mark) || !overlaps(&span.range, range) {
            kept.push(span);
            continue;
        }

        if span.range.start < range.start {
            kept.push(MarkSpan::new(span.range.start..range.start, span.mark.clone()));
        }
        if span.range.end > range.end {
            kept.push(MarkSpan::new(range.end..span.range.end, span.mark));
        }
    }

    *marks = kept;
}

/// Whether two half-open ranges share at least one byte
pub(crate) fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn clamp(start: usize, end: usize, len: usize) -> Range<usize> {
    let start = start.min(len);
    let end = end.min(len).max(start);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use xi_rope::Rope;
    use xi_rope::delta::Builder;

    fn insert_delta(base_len: usize, at: usize, text: &str) -> Delta<RopeInfo> {
        let mut builder = Builder::new(base_len);
        builder.replace(at..at, Rope::from(text));
        builder.build()
    }

    fn delete_delta(base_len: usize, range: Range<usize>) -> Delta<RopeInfo> {
        let mut builder = Builder::new(base_len);
        builder.delete(range);
        builder.build()
    }

    #[test]
    fn test_insert_before_mark_shifts_it() {
        let mut marks = vec![MarkSpan::new(5..10, Mark::Strong)];
        transform_marks(&mut marks, &insert_delta(20, 0, "abc"), 23);
        assert_eq!(marks[0].range, 8..13);
    }

    #[test]
    fn test_insert_on_mark_edges_does_not_grow_it() {
        let mut marks = vec![MarkSpan::new(5..10, Mark::Code)];
        transform_marks(&mut marks, &insert_delta(20, 10, "zz"), 22);
        assert_eq!(marks[0].range, 5..10);

        transform_marks(&mut marks, &insert_delta(22, 5, "zz"), 24);
        assert_eq!(marks[0].range, 7..12);
    }

    #[test]
    fn test_insert_inside_mark_grows_it() {
        let mut marks = vec![MarkSpan::new(5..10, Mark::Emphasis)];
        transform_marks(&mut marks, &insert_delta(20, 7, "xyz"), 23);
        assert_eq!(marks[0].range, 5..13);
    }

    #[test]
    fn test_deleting_marked_text_drops_mark() {
        let mut marks = vec![MarkSpan::new(5..10, Mark::Strong)];
        transform_marks(&mut marks, &delete_delta(20, 4..12), 12);
        assert!(marks.is_empty());
    }

    #[test]
    fn test_remove_marks_splits_straddling_span() {
        let mut marks = vec![
            MarkSpan::new(0..10, Mark::Strong),
            MarkSpan::new(2..4, Mark::Emphasis),
        ];
        remove_marks_in(&mut marks, &(3..6), |m| matches!(m, Mark::Strong));

        assert_eq!(
            marks,
            vec![
                MarkSpan::new(0..3, Mark::Strong),
                MarkSpan::new(6..10, Mark::Strong),
                MarkSpan::new(2..4, Mark::Emphasis),
            ]
        );
    }

    #[test]
    fn test_same_family_ignores_href() {
        let a = Mark::Link {
            href: "https://a.example".to_string(),
        };
        let b = Mark::Link {
            href: "https://b.example".to_string(),
        };
        assert!(a.same_family(&b));
        assert!(!a.same_family(&Mark::Strong));
    }
}
