//! The formatting pipeline.
//!
//! Stages run in a fixed order because later stages depend on the index
//! and category stability established by earlier ones: page setup → title
//! boundary → classify + style → structural edits → normalization →
//! statistics. Classification is recomputed after every structural change,
//! never cached.

pub mod boundary;
pub mod classify;
pub mod report;
pub mod structure;
pub mod style;

pub use classify::{classify_document, Category, Classifier, FormulaKind};
pub use report::{CategoryCounts, FormatReport};
pub use structure::StructuralEditor;
pub use style::StyleApplicator;

use crate::config::FormatConfig;
use crate::model::{Block, Document};
use crate::normalize::Normalizer;
use crate::Result;
use log::info;

/// Run the whole pipeline over one document, in place.
///
/// The document either passes through every stage or the call fails with
/// nothing persisted; persistence itself is the adapter's job.
pub fn format_document(document: &mut Document, config: &FormatConfig) -> Result<FormatReport> {
    let mut report = FormatReport::new();

    info!("applying page setup");
    apply_page_setup(document, config);

    let boundary = boundary::title_boundary(document);
    info!("title boundary at block {boundary}");

    let classifier = Classifier::new();
    let applicator = StyleApplicator::new(config);

    info!("classifying and styling paragraphs");
    apply_styles(document, boundary, &classifier, &applicator);

    info!("reconciling captions, breaks, lists and blanks");
    let editor = StructuralEditor::new(config);
    editor.run(document, boundary, &mut report);

    // Structural edits moved blocks around; restyle from a fresh
    // classification.
    apply_styles(document, boundary, &classifier, &applicator);

    info!("normalizing run text");
    let normalizer = Normalizer::new();
    let categories = classify_document(document, boundary, &classifier);
    // Numbered bibliography entries classify as list items; their leading
    // capitals (surnames) must survive, same as their punctuation does.
    let bibliography = classify::bibliography_range(document, boundary, &classifier);
    for (i, block) in document.blocks.iter_mut().enumerate().skip(boundary) {
        if let Block::Paragraph(p) = block {
            let in_bibliography = bibliography.as_ref().is_some_and(|r| r.contains(&i));
            let is_list = categories[i] == Category::ListItem && !in_bibliography;
            let stats = normalizer.normalize_paragraph(p, is_list);
            report.normalize.merge(&stats);
        }
    }

    collect_statistics(document, boundary, &classifier, &mut report);
    info!(
        "formatted {} paragraph(s), {} figure(s), {} table(s)",
        report.categories.total(),
        report.figure_count,
        report.table_count
    );

    Ok(report)
}

/// Classify every in-scope paragraph and apply the style rule table.
fn apply_styles(
    document: &mut Document,
    boundary: usize,
    classifier: &Classifier,
    applicator: &StyleApplicator,
) {
    let categories = classify_document(document, boundary, classifier);
    for (i, block) in document.blocks.iter_mut().enumerate().skip(boundary) {
        if let Block::Paragraph(p) = block {
            applicator.apply(p, categories[i]);
        }
    }
}

/// Margins and the page-number footer on every section.
fn apply_page_setup(document: &mut Document, config: &FormatConfig) {
    for section in &mut document.sections {
        section.margins = config.margins;
        section.footer_page_field = true;
    }
}

/// Read-only category counts over the final paragraph set.
fn collect_statistics(
    document: &Document,
    boundary: usize,
    classifier: &Classifier,
    report: &mut FormatReport,
) {
    let categories = classify_document(document, boundary, classifier);
    for (i, block) in document.blocks.iter().enumerate().skip(boundary) {
        if block.is_paragraph() {
            report.categories.add(categories[i]);
            if matches!(categories[i], Category::FormulaLine(_)) {
                report.formula_count += 1;
            }
        }
    }
}
