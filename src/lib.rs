//! # gostfmt
//!
//! GOST-compliant reformatting of `.docx` documents.
//!
//! The library loads a document into a structured paragraph/run/table
//! model, infers the role of every paragraph from plain-text heuristics,
//! applies the GOST style rules deterministically, reconciles figure and
//! table captions, enforces list punctuation, and normalizes punctuation
//! at the text level. Text transforms stay correct even when the visible
//! text is fragmented across independently-styled runs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gostfmt::{format_file, FormatConfig};
//!
//! fn main() -> gostfmt::Result<()> {
//!     let config = FormatConfig::default();
//!     let report = format_file("report.docx", "report_formatted.docx", &config)?;
//!     println!("formatted {} paragraphs", report.categories.total());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Classification**: headings, captions, formulas, list items,
//!   bibliography entries from text heuristics
//! - **Deterministic styling**: style is a pure function of category and
//!   configuration; running the pipeline twice is a no-op
//! - **Run-aware normalization**: dashes, quotes, colons, abbreviations,
//!   non-breaking spaces across run boundaries
//! - **Surgical writing**: only `word/document.xml` and the page-number
//!   footer are rewritten; media and styles are preserved byte-for-byte

pub mod config;
pub mod detect;
pub mod docx;
pub mod error;
pub mod format;
pub mod model;
pub mod normalize;

// Re-export commonly used types
pub use config::{FormatConfig, Margins};
pub use error::{Error, Result};
pub use format::{
    classify_document, format_document, Category, CategoryCounts, Classifier, FormatReport,
    FormulaKind, StructuralEditor, StyleApplicator,
};
pub use model::{
    Alignment, Block, Document, InlineContent, ListNumbering, Metadata, Paragraph,
    ParagraphStyle, Run, RunStyle, Section, Table, TableCell, TableRow,
};
pub use normalize::{NormalizeStats, Normalizer};

use std::fs;
use std::path::Path;

/// Format a `.docx` file and write the result to another path.
///
/// Fails before any stage runs when the input is missing or not a DOCX
/// archive; nothing is written unless the whole pipeline succeeds.
///
/// # Example
///
/// ```no_run
/// use gostfmt::{format_file, FormatConfig};
///
/// let report = format_file("in.docx", "out.docx", &FormatConfig::default()).unwrap();
/// println!("{} figures", report.figure_count);
/// ```
pub fn format_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    config: &FormatConfig,
) -> Result<FormatReport> {
    let data = fs::read(input)?;
    let (bytes, report) = format_bytes(&data, config)?;
    fs::write(output, bytes)?;
    Ok(report)
}

/// Format a `.docx` document held in memory.
///
/// Returns the new archive bytes together with the advisory report.
pub fn format_bytes(data: &[u8], config: &FormatConfig) -> Result<(Vec<u8>, FormatReport)> {
    detect::detect_format_from_bytes(data)?;
    let mut document = docx::read_document(data)?;
    let report = format::format_document(&mut document, config)?;
    let bytes = docx::write_document(&document, data)?;
    Ok((bytes, report))
}

/// Builder for configuring and running the formatter.
///
/// # Example
///
/// ```no_run
/// use gostfmt::Gostfmt;
///
/// let report = Gostfmt::new()
///     .with_font_name("Times New Roman")
///     .with_font_size(14.0)
///     .with_line_spacing(1.5)
///     .format_file("in.docx", "out.docx")?;
/// # Ok::<(), gostfmt::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Gostfmt {
    config: FormatConfig,
}

impl Gostfmt {
    /// Create a builder with the GOST defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: FormatConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the base font name.
    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_font_name(name);
        self
    }

    /// Set the base font size in points.
    pub fn with_font_size(mut self, size_pt: f32) -> Self {
        self.config = self.config.with_font_size(size_pt);
        self
    }

    /// Set the line spacing multiplier.
    pub fn with_line_spacing(mut self, multiplier: f32) -> Self {
        self.config = self.config.with_line_spacing(multiplier);
        self
    }

    /// Set the first-line indent in centimeters.
    pub fn with_first_line_indent(mut self, cm: f32) -> Self {
        self.config = self.config.with_first_line_indent(cm);
        self
    }

    /// Set the page margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.config = self.config.with_margins(margins);
        self
    }

    /// The configuration assembled so far.
    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Format a file on disk.
    pub fn format_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<FormatReport> {
        format_file(input, output, &self.config)
    }

    /// Format in-memory bytes.
    pub fn format_bytes(&self, data: &[u8]) -> Result<(Vec<u8>, FormatReport)> {
        format_bytes(data, &self.config)
    }
}
