//! Logical-text view over a run-fragmented paragraph.
//!
//! A paragraph's logical text is the ordered concatenation of its text
//! runs. Normalization passes are computed on the logical string and
//! written back as span edits: a replacement lands in the run containing
//! the match start; runs covered further right only lose the covered
//! portion. Images, math blocks, and hyperlinks are boundaries: they are
//! never part of the view and never edited.

use crate::model::{InlineContent, Paragraph};
use std::ops::Range;

/// One text run's byte range inside the logical string.
#[derive(Debug, Clone, Copy)]
struct Span {
    /// Index into `Paragraph::content`
    content_index: usize,
    /// Start byte offset in the logical text
    start: usize,
    /// End byte offset in the logical text
    end: usize,
}

/// A single replacement of a logical-text byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Byte range in the logical text; must be non-empty and lie on char
    /// boundaries
    pub range: Range<usize>,
    /// Replacement string
    pub replacement: String,
}

impl Edit {
    /// Create an edit.
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }
}

/// Materialized logical text with a position → (run, offset) map.
#[derive(Debug)]
pub struct LogicalView {
    text: String,
    spans: Vec<Span>,
}

impl LogicalView {
    /// Build the view from a paragraph's text runs.
    pub fn of(paragraph: &Paragraph) -> Self {
        let mut text = String::new();
        let mut spans = Vec::new();

        for (content_index, item) in paragraph.content.iter().enumerate() {
            if let InlineContent::Text(run) = item {
                let start = text.len();
                text.push_str(&run.text);
                spans.push(Span {
                    content_index,
                    start,
                    end: text.len(),
                });
            }
        }

        Self { text, spans }
    }

    /// The logical text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the paragraph has no run text at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Apply edits to the paragraph's runs.
    ///
    /// Edits must not overlap. They are applied right-to-left so earlier
    /// offsets stay valid; the view itself is consumed and must be rebuilt
    /// afterwards.
    pub fn apply(self, paragraph: &mut Paragraph, mut edits: Vec<Edit>) -> usize {
        edits.sort_by_key(|e| e.range.start);
        let applied = edits.len();

        for edit in edits.into_iter().rev() {
            self.apply_one(paragraph, &edit);
        }

        applied
    }

    fn apply_one(&self, paragraph: &mut Paragraph, edit: &Edit) {
        debug_assert!(edit.range.start < edit.range.end);

        // Runs that intersect the edited range, in order.
        let touched: Vec<Span> = self
            .spans
            .iter()
            .filter(|s| s.start < edit.range.end && s.end > edit.range.start && s.start < s.end)
            .copied()
            .collect();

        for (i, span) in touched.iter().enumerate() {
            let local_start = edit.range.start.saturating_sub(span.start);
            let local_end = (edit.range.end.min(span.end)) - span.start;

            if let Some(InlineContent::Text(run)) = paragraph.content.get_mut(span.content_index) {
                if i == 0 {
                    // The run holding the match start receives the whole
                    // replacement.
                    run.text
                        .replace_range(local_start..local_end, &edit.replacement);
                } else {
                    // Trailing runs only lose the covered portion.
                    run.text.replace_range(local_start..local_end, "");
                }
            }
        }
    }
}
