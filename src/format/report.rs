//! Formatting report with diagnostic counters.

use super::classify::Category;
use crate::normalize::NormalizeStats;
use serde::{Deserialize, Serialize};

/// Advisory summary of one pipeline invocation. Not part of the
/// functional contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatReport {
    /// Final category counts over in-scope paragraphs
    pub categories: CategoryCounts,

    /// Image-bearing paragraphs found
    pub figure_count: u32,

    /// Tables found
    pub table_count: u32,

    /// Formula lines found
    pub formula_count: u32,

    /// Captions inserted next to images/tables
    pub captions_inserted: u32,

    /// Existing captions renumbered
    pub captions_renumbered: u32,

    /// Headings that received a page break
    pub page_breaks_set: u32,

    /// Blank paragraphs removed
    pub blanks_removed: u32,

    /// List terminals rewritten
    pub list_terminals_fixed: u32,

    /// Normalizer pass counters
    pub normalize: NormalizeStats,
}

impl FormatReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Paragraph counts per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    /// Blank paragraphs
    pub empty: u32,
    /// Fixed section headings
    pub section_headings: u32,
    /// Appendix headings
    pub appendix_headings: u32,
    /// Numbered headings, all levels
    pub numbered_headings: u32,
    /// Figure captions
    pub figure_captions: u32,
    /// Table captions
    pub table_captions: u32,
    /// Formula lines, both kinds
    pub formula_lines: u32,
    /// List items
    pub list_items: u32,
    /// Bibliography entries
    pub bibliography_entries: u32,
    /// Everything else
    pub regular: u32,
}

impl CategoryCounts {
    /// Record one classified paragraph.
    pub fn add(&mut self, category: Category) {
        match category {
            Category::Empty => self.empty += 1,
            Category::SectionHeading => self.section_headings += 1,
            Category::AppendixHeading => self.appendix_headings += 1,
            Category::NumberedHeading(_) => self.numbered_headings += 1,
            Category::FigureCaption => self.figure_captions += 1,
            Category::TableCaption => self.table_captions += 1,
            Category::FormulaLine(_) => self.formula_lines += 1,
            Category::ListItem => self.list_items += 1,
            Category::BibliographyEntry => self.bibliography_entries += 1,
            Category::Regular => self.regular += 1,
        }
    }

    /// Total classified paragraphs.
    pub fn total(&self) -> u32 {
        self.empty
            + self.section_headings
            + self.appendix_headings
            + self.numbered_headings
            + self.figure_captions
            + self.table_captions
            + self.formula_lines
            + self.list_items
            + self.bibliography_entries
            + self.regular
    }
}
