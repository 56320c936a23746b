//! Document model types for word-processing content.
//!
//! This module defines the intermediate representation that bridges the
//! DOCX adapter and the formatting pipeline: an ordered block sequence of
//! paragraphs and tables, paragraphs made of styled runs, and section
//! records for page geometry.

mod document;
mod paragraph;
mod section;
mod table;

pub use document::{Block, Document, Metadata};
pub use paragraph::{
    Alignment, InlineContent, ListNumbering, Paragraph, ParagraphStyle, Run, RunStyle,
};
pub use section::Section;
pub use table::{Table, TableCell, TableRow};
