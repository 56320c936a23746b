//! Paragraph and run-level types.

use serde::{Deserialize, Serialize};

/// A paragraph of text content.
///
/// The visible text of a paragraph is partitioned contiguously and in order
/// across its text runs; empty runs are legal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Inline content in document order
    pub content: Vec<InlineContent>,

    /// Paragraph-level formatting
    pub style: ParagraphStyle,

    /// Native list-numbering metadata (w:numPr), if any
    pub numbering: Option<ListNumbering>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with a single plain-text run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Append a plain-text run.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.content.push(InlineContent::Text(Run::new(text)));
    }

    /// Append a styled run.
    pub fn add_run(&mut self, run: Run) {
        self.content.push(InlineContent::Text(run));
    }

    /// Logical text: the ordered concatenation of run and hyperlink text.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                InlineContent::Text(run) => run.text.as_str(),
                InlineContent::Hyperlink { text, .. } => text.as_str(),
                _ => "",
            })
            .collect()
    }

    /// Check whether the paragraph carries an embedded image.
    pub fn has_image(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, InlineContent::Image { .. }))
    }

    /// Check whether the paragraph carries a math block.
    pub fn has_math(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, InlineContent::Math { .. }))
    }

    /// A blank paragraph has no visible text, no image, and no math.
    pub fn is_blank(&self) -> bool {
        self.plain_text().trim().is_empty() && !self.has_image() && !self.has_math()
    }

    /// Check if this paragraph is a native list item (w:numPr present).
    pub fn has_numbering(&self) -> bool {
        self.numbering.is_some()
    }

    /// Iterate over the text runs in order.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().filter_map(|c| match c {
            InlineContent::Text(run) => Some(run),
            _ => None,
        })
    }

    /// Iterate mutably over the text runs in order.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.content.iter_mut().filter_map(|c| match c {
            InlineContent::Text(run) => Some(run),
            _ => None,
        })
    }

    /// Index of the last inline element, if any.
    pub fn last_content(&self) -> Option<&InlineContent> {
        self.content.last()
    }
}

/// Inline content within a paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineContent {
    /// A text run with styling
    Text(Run),

    /// An embedded image; the OOXML subtree is kept verbatim for round-trip
    Image {
        /// Raw `w:drawing`/`w:pict` markup
        raw_xml: String,
    },

    /// An OMML math block, kept verbatim
    Math {
        /// Raw `m:oMath`/`m:oMathPara` markup
        raw_xml: String,
    },

    /// A hyperlink; the subtree is kept verbatim, its visible text exposed
    /// read-only for classification
    Hyperlink {
        /// Raw `w:hyperlink` markup including attributes and inner runs
        raw_xml: String,
        /// Concatenated inner run text
        text: String,
    },

    /// An explicit page break (`w:br w:type="page"`)
    PageBreak,

    /// Any other inline element (bookmarks, fields, comments), kept verbatim
    Raw {
        /// Raw markup
        raw_xml: String,
    },
}

/// A run of text with one style record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    /// The text content
    pub text: String,

    /// Run styling
    pub style: RunStyle,
}

impl Run {
    /// Create a new run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::default(),
        }
    }

    /// Create a run with an explicit style.
    pub fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Check if this run has no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Run styling properties.
///
/// `None` means "inherited / not set in the source"; the style applicator
/// always writes concrete values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    /// Font name
    pub font_name: Option<String>,

    /// Font size in points
    pub size_pt: Option<f32>,

    /// Bold text
    pub bold: Option<bool>,

    /// Remaining run properties (italic, color, ...) as raw `w:rPr` inner
    /// markup, re-emitted verbatim
    pub extra_props_xml: Option<String>,
}

/// Paragraph styling properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    /// Text alignment
    pub alignment: Option<Alignment>,

    /// First-line indent in centimeters; negative values are hanging indents
    pub first_line_indent_cm: Option<f32>,

    /// Left indent in centimeters
    pub left_indent_cm: Option<f32>,

    /// Right indent in centimeters
    pub right_indent_cm: Option<f32>,

    /// Space before the paragraph in points
    pub space_before_pt: Option<f32>,

    /// Space after the paragraph in points
    pub space_after_pt: Option<f32>,

    /// Line spacing multiplier (1.0 = single)
    pub line_spacing: Option<f32>,

    /// Force a page break before this paragraph
    pub page_break_before: bool,

    /// Named style id (w:pStyle), preserved on write
    pub style_id: Option<String>,
}

/// Text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
}

/// Native list-numbering metadata (w:numPr).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListNumbering {
    /// Numbering definition id (w:numId)
    pub num_id: i32,

    /// Indentation level (w:ilvl)
    pub level: i32,
}
