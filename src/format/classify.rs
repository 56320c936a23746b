//! Paragraph classification.
//!
//! `classify` is a pure function of one paragraph; it is recomputed fresh
//! whenever the block sequence changes and never cached across a
//! structural edit. Bibliography membership needs document context and is
//! resolved by the equally pure [`classify_document`].

use crate::model::{Block, Document, Paragraph};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Closed set of section headings (trimmed, upper-cased comparison).
const SECTION_HEADINGS: [&str; 9] = [
    "ВВЕДЕНИЕ",
    "ЗАКЛЮЧЕНИЕ",
    "СПИСОК ИСПОЛЬЗОВАННЫХ ИСТОЧНИКОВ",
    "БИБЛИОГРАФИЧЕСКИЙ СПИСОК",
    "СПИСОК ЛИТЕРАТУРЫ",
    "СОДЕРЖАНИЕ",
    "ОГЛАВЛЕНИЕ",
    "АННОТАЦИЯ",
    "РЕФЕРАТ",
];

/// Markers that open the bibliography range (substring match).
const BIBLIOGRAPHY_MARKERS: [&str; 3] = [
    "СПИСОК ИСПОЛЬЗОВАННЫХ ИСТОЧНИКОВ",
    "БИБЛИОГРАФИЧЕСКИЙ СПИСОК",
    "СПИСОК ЛИТЕРАТУРЫ",
];

/// Flavor of a formula line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaKind {
    /// A numbered equation line, e.g. "E = mc² (1.2)"
    Equation,
    /// A "где ..." explanation clause following an equation
    WhereClause,
}

/// Mutually exclusive paragraph categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// No text and no embedded object
    Empty,
    /// One of the fixed section headings (Введение, Заключение, ...)
    SectionHeading,
    /// "ПРИЛОЖЕНИЕ А" style heading
    AppendixHeading,
    /// Numbered heading, level 1–3
    NumberedHeading(u8),
    /// "Рисунок N – ..." caption
    FigureCaption,
    /// "Таблица N – ..." caption
    TableCaption,
    /// Equation line or its "где" clause
    FormulaLine(FormulaKind),
    /// List item (native numbering or a textual marker)
    ListItem,
    /// Entry inside the bibliography range
    BibliographyEntry,
    /// Anything else
    Regular,
}

impl Category {
    /// Headings that start a new page.
    pub fn takes_page_break(&self) -> bool {
        matches!(
            self,
            Category::SectionHeading | Category::NumberedHeading(1) | Category::AppendixHeading
        )
    }
}

/// Paragraph classifier with patterns compiled once.
pub struct Classifier {
    appendix: Regex,
    heading_l3: Regex,
    heading_l2: Regex,
    heading_l1: Regex,
    figure_caption: Regex,
    table_caption: Regex,
    formula_ref: Regex,
    where_clause: Regex,
    list_number: Regex,
    list_letter: Regex,
    list_bullet: Regex,
}

impl Classifier {
    /// Create a classifier.
    pub fn new() -> Self {
        Self {
            appendix: Regex::new(r"^ПРИЛОЖЕНИЕ\s+[А-ЯЁA-Z]\b").unwrap(),
            heading_l3: Regex::new(r"^\d+\.\d+\.\d+").unwrap(),
            heading_l2: Regex::new(r"^\d+\.\d+").unwrap(),
            heading_l1: Regex::new(r"^\d+\.?\s+(\S.*)$").unwrap(),
            figure_caption: Regex::new(r"^Рисунок\s*\d*\s*[-–—]").unwrap(),
            table_caption: Regex::new(r"^Таблица\s+\d+\s*[-–—]").unwrap(),
            formula_ref: Regex::new(r"\(\d+(\.\d+)?\)$").unwrap(),
            where_clause: Regex::new(r"^где\b").unwrap(),
            list_number: Regex::new(r"^\d+[.)]\s").unwrap(),
            list_letter: Regex::new(r"^[a-zа-яё][.)]\s").unwrap(),
            list_bullet: Regex::new(r"^[-–—•]\s").unwrap(),
        }
    }

    /// Classify one paragraph. Pure; first match wins.
    pub fn classify(&self, paragraph: &Paragraph) -> Category {
        let text = paragraph.plain_text();
        let trimmed = text.trim();

        if trimmed.is_empty() && !paragraph.has_image() && !paragraph.has_math() {
            return Category::Empty;
        }

        let upper = trimmed.to_uppercase();
        if SECTION_HEADINGS.contains(&upper.as_str()) {
            return Category::SectionHeading;
        }
        if self.appendix.is_match(&upper) {
            return Category::AppendixHeading;
        }

        if self.heading_l3.is_match(trimmed) {
            return Category::NumberedHeading(3);
        }
        if self.heading_l2.is_match(trimmed) {
            return Category::NumberedHeading(2);
        }
        if let Some(caps) = self.heading_l1.captures(trimmed) {
            // "1 ОБЗОР ЛИТЕРАТУРЫ" is a heading; "1. Первый пункт" is a
            // list item. The remainder must be entirely upper-case.
            let rest = &caps[1];
            if rest.chars().any(char::is_alphabetic) && rest == rest.to_uppercase() {
                return Category::NumberedHeading(1);
            }
        }

        if self.figure_caption.is_match(trimmed) {
            return Category::FigureCaption;
        }
        if self.table_caption.is_match(trimmed) {
            return Category::TableCaption;
        }

        if self.formula_ref.is_match(trimmed) {
            return Category::FormulaLine(FormulaKind::Equation);
        }
        if self.where_clause.is_match(trimmed) {
            return Category::FormulaLine(FormulaKind::WhereClause);
        }

        if paragraph.has_numbering()
            || self.list_number.is_match(trimmed)
            || self.list_letter.is_match(&trimmed.to_lowercase())
            || self.list_bullet.is_match(trimmed)
        {
            return Category::ListItem;
        }

        Category::Regular
    }

    /// Check if a paragraph opens the bibliography range.
    pub fn is_bibliography_start(&self, paragraph: &Paragraph) -> bool {
        let upper = paragraph.plain_text().trim().to_uppercase();
        BIBLIOGRAPHY_MARKERS.iter().any(|m| upper.contains(m))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify every block of the document from the boundary on.
///
/// Entries below the boundary and table blocks receive [`Category::Regular`]
/// as a placeholder; callers dispatch on block type and index first.
/// Paragraphs lying between a bibliography marker and the next appendix
/// heading (or document end) that would otherwise be regular become
/// [`Category::BibliographyEntry`].
pub fn classify_document(
    document: &Document,
    boundary: usize,
    classifier: &Classifier,
) -> Vec<Category> {
    let mut categories = vec![Category::Regular; document.block_count()];
    let mut in_bibliography = false;

    for (i, block) in document.blocks.iter().enumerate().skip(boundary) {
        let Block::Paragraph(paragraph) = block else {
            continue;
        };

        let category = classifier.classify(paragraph);

        if classifier.is_bibliography_start(paragraph) {
            in_bibliography = true;
            categories[i] = category;
            continue;
        }
        if in_bibliography && category == Category::AppendixHeading {
            in_bibliography = false;
        }

        categories[i] = if in_bibliography && category == Category::Regular {
            Category::BibliographyEntry
        } else {
            category
        };
    }

    categories
}

/// The block-index range of bibliography content: right after the marker,
/// up to the next appendix heading or the end of the document.
pub fn bibliography_range(
    document: &Document,
    boundary: usize,
    classifier: &Classifier,
) -> Option<Range<usize>> {
    let mut start = None;

    for (i, block) in document.blocks.iter().enumerate().skip(boundary) {
        let Block::Paragraph(paragraph) = block else {
            continue;
        };
        match start {
            None => {
                if classifier.is_bibliography_start(paragraph) {
                    start = Some(i + 1);
                }
            }
            Some(s) => {
                if classifier.classify(paragraph) == Category::AppendixHeading {
                    return Some(s..i);
                }
            }
        }
    }

    start.map(|s| s..document.block_count())
}
