//! Structural edits: caption reconciliation, page-break placement, list
//! punctuation, blank-paragraph pruning.
//!
//! Every operation recomputes classification from the current block
//! sequence; nothing is cached across an insert or remove. All operations
//! renumber/overwrite existing matches rather than unconditionally insert,
//! so a second run changes nothing.

use super::classify::{bibliography_range, classify_document, Category, Classifier};
use super::report::FormatReport;
use super::style::StyleApplicator;
use crate::config::FormatConfig;
use crate::model::{Block, Document, InlineContent, Paragraph};
use log::debug;
use regex::Regex;

/// Terminal characters that a list item may already carry.
const TERMINALS: [char; 5] = ['.', ';', ',', ':', '!'];

/// Mutates document structure after classification and styling.
pub struct StructuralEditor<'a> {
    config: &'a FormatConfig,
    classifier: Classifier,
    figure_rewrite: Regex,
    table_rewrite: Regex,
}

impl<'a> StructuralEditor<'a> {
    /// Create an editor over one immutable configuration.
    pub fn new(config: &'a FormatConfig) -> Self {
        Self {
            config,
            classifier: Classifier::new(),
            figure_rewrite: Regex::new(r"^Рисунок\s*\d*\s*[-–—]\s*(.*)$").unwrap(),
            table_rewrite: Regex::new(r"^Таблица\s+\d+\s*[-–—]\s*(.*)$").unwrap(),
        }
    }

    /// Run all structural operations in order.
    pub fn run(&self, document: &mut Document, boundary: usize, report: &mut FormatReport) {
        self.reconcile_captions(document, boundary, report);
        self.place_page_breaks(document, boundary, report);
        self.enforce_list_punctuation(document, boundary, report);
        self.prune_blanks(document, boundary, report);
    }

    /// Number figures and tables in reading order; fix the adjacent
    /// caption when one exists, insert a fresh one otherwise. Figure
    /// captions sit below the image, table captions above the table.
    fn reconcile_captions(
        &self,
        document: &mut Document,
        boundary: usize,
        report: &mut FormatReport,
    ) {
        let applicator = StyleApplicator::new(self.config);
        let mut figures = 0u32;
        let mut tables = 0u32;

        let mut i = boundary;
        while i < document.block_count() {
            let is_figure = document
                .paragraph(i)
                .is_some_and(|p| p.has_image());
            let is_table = document.blocks[i].is_table();

            if is_figure {
                figures += 1;
                let rewritten = document
                    .paragraph_mut(i + 1)
                    .map(|next| rewrite_caption(next, &self.figure_rewrite, "Рисунок", figures))
                    .unwrap_or(false);
                if rewritten {
                    report.captions_renumbered += 1;
                    debug!("renumbered figure caption {} at block {}", figures, i + 1);
                } else {
                    let mut caption = Paragraph::with_text(format!("Рисунок {figures} – "));
                    applicator.apply(&mut caption, Category::FigureCaption);
                    document.insert_block(i + 1, Block::Paragraph(caption));
                    report.captions_inserted += 1;
                    debug!("inserted figure caption {} at block {}", figures, i + 1);
                }
            } else if is_table {
                tables += 1;
                let rewritten = i > boundary
                    && document
                        .paragraph_mut(i - 1)
                        .map(|prev| rewrite_caption(prev, &self.table_rewrite, "Таблица", tables))
                        .unwrap_or(false);
                if rewritten {
                    report.captions_renumbered += 1;
                    debug!("renumbered table caption {} at block {}", tables, i - 1);
                } else {
                    let mut caption = Paragraph::with_text(format!("Таблица {tables} – "));
                    applicator.apply(&mut caption, Category::TableCaption);
                    document.insert_block(i, Block::Paragraph(caption));
                    report.captions_inserted += 1;
                    debug!("inserted table caption {} at block {}", tables, i);
                    // The table moved one slot to the right.
                    i += 1;
                }
            }
            i += 1;
        }

        report.figure_count = figures;
        report.table_count = tables;
    }

    /// Delete blank paragraphs directly above page-starting headings, then
    /// set page-break-before on the heading itself.
    fn place_page_breaks(
        &self,
        document: &mut Document,
        boundary: usize,
        report: &mut FormatReport,
    ) {
        let mut i = boundary;
        while i < document.block_count() {
            let takes_break = document
                .paragraph(i)
                .map(|p| self.classifier.classify(p).takes_page_break())
                .unwrap_or(false);

            if takes_break {
                while i > boundary
                    && document
                        .paragraph(i - 1)
                        .is_some_and(|p| p.is_blank())
                {
                    document.remove_block(i - 1);
                    report.blanks_removed += 1;
                    i -= 1;
                }
                if let Some(p) = document.paragraph_mut(i) {
                    p.style.page_break_before = true;
                    report.page_breaks_set += 1;
                }
            }
            i += 1;
        }
    }

    /// Maximal runs of consecutive list items (blank paragraphs do not
    /// break a run) end item N with '.' and the rest with ';'. The
    /// bibliography range keeps its own punctuation.
    fn enforce_list_punctuation(
        &self,
        document: &mut Document,
        boundary: usize,
        report: &mut FormatReport,
    ) {
        let categories = classify_document(document, boundary, &self.classifier);
        let bibliography = bibliography_range(document, boundary, &self.classifier);

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        for i in boundary..document.block_count() {
            let is_paragraph = document.blocks[i].is_paragraph();
            match categories[i] {
                Category::ListItem if is_paragraph => current.push(i),
                Category::Empty if is_paragraph => {}
                _ => {
                    if !current.is_empty() {
                        groups.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            groups.push(current);
        }

        for group in groups {
            if let Some(range) = &bibliography {
                if group.iter().any(|i| range.contains(i)) {
                    continue;
                }
            }

            let last = group.len() - 1;
            for (k, &index) in group.iter().enumerate() {
                let terminal = if k == last { '.' } else { ';' };
                if let Some(p) = document.paragraph_mut(index) {
                    if apply_terminal(p, terminal) {
                        report.list_terminals_fixed += 1;
                    }
                }
            }
        }
    }

    /// Collapse 2+ consecutive blank paragraphs to one. Image-carrying
    /// paragraphs are never blank and never removed.
    fn prune_blanks(&self, document: &mut Document, boundary: usize, report: &mut FormatReport) {
        let mut i = boundary;
        while i < document.block_count() {
            if document.paragraph(i).is_some_and(|p| p.is_blank()) {
                while i + 1 < document.block_count()
                    && document.paragraph(i + 1).is_some_and(|p| p.is_blank())
                {
                    document.remove_block(i + 1);
                    report.blanks_removed += 1;
                }
            }
            i += 1;
        }
    }
}

/// Rewrite an existing caption to the given number, normalizing the dash.
/// Returns false when the paragraph is not a caption of this kind.
fn rewrite_caption(paragraph: &mut Paragraph, re: &Regex, prefix: &str, number: u32) -> bool {
    let text = paragraph.plain_text();
    let trimmed = text.trim();
    let Some(caps) = re.captures(trimmed) else {
        return false;
    };

    let rest = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let new_text = if rest.is_empty() {
        format!("{prefix} {number} – ")
    } else {
        format!("{prefix} {number} – {rest}")
    };

    let mut runs = paragraph.runs_mut();
    match runs.next() {
        Some(first) => {
            first.text = new_text;
            for run in runs {
                run.text.clear();
            }
        }
        None => {
            drop(runs);
            paragraph.add_text(new_text);
        }
    }
    true
}

/// Put the required terminal on a list item. The last non-empty text run
/// is edited in place; a non-text tail gets a fresh run appended instead.
/// Returns false when the terminal was already correct.
fn apply_terminal(paragraph: &mut Paragraph, terminal: char) -> bool {
    enum Tail {
        Mutate(usize),
        Append,
    }

    let mut tail = Tail::Append;
    for (idx, item) in paragraph.content.iter().enumerate().rev() {
        match item {
            InlineContent::Text(run) if !run.text.trim().is_empty() => {
                tail = Tail::Mutate(idx);
                break;
            }
            InlineContent::Text(_) | InlineContent::PageBreak => continue,
            _ => {
                tail = Tail::Append;
                break;
            }
        }
    }

    match tail {
        Tail::Mutate(idx) => {
            let Some(InlineContent::Text(run)) = paragraph.content.get_mut(idx) else {
                return false;
            };
            run.text.truncate(run.text.trim_end().len());
            match run.text.chars().next_back() {
                Some(c) if c == terminal => false,
                Some(c) if TERMINALS.contains(&c) => {
                    run.text.pop();
                    run.text.push(terminal);
                    true
                }
                _ => {
                    run.text.push(terminal);
                    true
                }
            }
        }
        Tail::Append => {
            paragraph.add_text(terminal.to_string());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_paragraph() -> Paragraph {
        let mut p = Paragraph::new();
        p.content.push(InlineContent::Image {
            raw_xml: "<w:drawing/>".to_string(),
        });
        p
    }

    fn run_editor(doc: &mut Document) -> FormatReport {
        let config = FormatConfig::default();
        let editor = StructuralEditor::new(&config);
        let mut report = FormatReport::new();
        editor.run(doc, 0, &mut report);
        report
    }

    #[test]
    fn test_existing_figure_caption_renumbered() {
        // Scenario A: the first image's caption gets number 1 and an
        // en-dash regardless of what it said before.
        let mut doc = Document::new();
        doc.add_paragraph(image_paragraph());
        doc.add_paragraph(Paragraph::with_text("Рисунок 5 - старое"));

        let report = run_editor(&mut doc);

        assert_eq!(doc.paragraph(1).unwrap().plain_text(), "Рисунок 1 – старое");
        assert_eq!(report.captions_renumbered, 1);
        assert_eq!(report.captions_inserted, 0);
        assert_eq!(report.figure_count, 1);
    }

    #[test]
    fn test_missing_figure_caption_inserted() {
        let mut doc = Document::new();
        doc.add_paragraph(image_paragraph());
        doc.add_paragraph(Paragraph::with_text("Обычный текст после."));

        let report = run_editor(&mut doc);

        assert_eq!(doc.paragraph(1).unwrap().plain_text(), "Рисунок 1 – ");
        assert_eq!(
            doc.paragraph(2).unwrap().plain_text(),
            "Обычный текст после."
        );
        assert_eq!(report.captions_inserted, 1);
    }

    #[test]
    fn test_figures_numbered_in_order() {
        let mut doc = Document::new();
        doc.add_paragraph(image_paragraph());
        doc.add_paragraph(Paragraph::with_text("Рисунок 9 – первая"));
        doc.add_paragraph(image_paragraph());
        doc.add_paragraph(Paragraph::with_text("Рисунок 3 – вторая"));

        run_editor(&mut doc);

        assert_eq!(doc.paragraph(1).unwrap().plain_text(), "Рисунок 1 – первая");
        assert_eq!(doc.paragraph(3).unwrap().plain_text(), "Рисунок 2 – вторая");
    }

    #[test]
    fn test_table_caption_above_table() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("Таблица 7 - данные"));
        doc.add_table(crate::model::Table::new());
        doc.add_table(crate::model::Table::new());

        let report = run_editor(&mut doc);

        assert_eq!(doc.paragraph(0).unwrap().plain_text(), "Таблица 1 – данные");
        // The second table had no caption; one is inserted above it.
        assert_eq!(doc.paragraph(2).unwrap().plain_text(), "Таблица 2 – ");
        assert_eq!(report.table_count, 2);
        assert_eq!(report.captions_renumbered, 1);
        assert_eq!(report.captions_inserted, 1);
    }

    #[test]
    fn test_page_break_and_blank_deletion() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("Текст"));
        doc.add_paragraph(Paragraph::new());
        doc.add_paragraph(Paragraph::new());
        doc.add_paragraph(Paragraph::with_text("ВВЕДЕНИЕ"));

        let report = run_editor(&mut doc);

        assert_eq!(doc.block_count(), 2);
        let heading = doc.paragraph(1).unwrap();
        assert_eq!(heading.plain_text(), "ВВЕДЕНИЕ");
        assert!(heading.style.page_break_before);
        assert_eq!(report.page_breaks_set, 1);
        assert_eq!(report.blanks_removed, 2);
    }

    #[test]
    fn test_list_punctuation_scenario_b() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("1. Первый пункт"));
        doc.add_paragraph(Paragraph::with_text("2. Второй пункт."));

        run_editor(&mut doc);

        assert_eq!(doc.paragraph(0).unwrap().plain_text(), "1. Первый пункт;");
        assert_eq!(doc.paragraph(1).unwrap().plain_text(), "2. Второй пункт.");
    }

    #[test]
    fn test_single_list_item_ends_with_period() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("– единственный пункт"));

        run_editor(&mut doc);

        assert_eq!(
            doc.paragraph(0).unwrap().plain_text(),
            "– единственный пункт."
        );
    }

    #[test]
    fn test_list_run_continues_across_blanks() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("1. Первый"));
        doc.add_paragraph(Paragraph::new());
        doc.add_paragraph(Paragraph::with_text("2. Второй"));
        doc.add_paragraph(Paragraph::with_text("Обычный текст."));

        run_editor(&mut doc);

        assert_eq!(doc.paragraph(0).unwrap().plain_text(), "1. Первый;");
        // The single blank at index 1 stays; only runs of 2+ collapse.
        assert_eq!(doc.paragraph(2).unwrap().plain_text(), "2. Второй.");
    }

    #[test]
    fn test_existing_terminal_replaced() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("1. Первый,"));
        doc.add_paragraph(Paragraph::with_text("2. Второй:"));

        run_editor(&mut doc);

        assert_eq!(doc.paragraph(0).unwrap().plain_text(), "1. Первый;");
        assert_eq!(doc.paragraph(1).unwrap().plain_text(), "2. Второй.");
    }

    #[test]
    fn test_hyperlink_tail_gets_appended_run() {
        let mut item = Paragraph::with_text("1. См. ");
        item.content.push(InlineContent::Hyperlink {
            raw_xml: "<w:hyperlink/>".to_string(),
            text: "ссылку".to_string(),
        });
        let mut doc = Document::new();
        doc.add_paragraph(item);

        run_editor(&mut doc);

        let p = doc.paragraph(0).unwrap();
        assert_eq!(p.plain_text(), "1. См. ссылку.");
        assert!(matches!(
            p.content.last(),
            Some(InlineContent::Text(run)) if run.text == "."
        ));
    }

    #[test]
    fn test_bibliography_range_skipped() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("СПИСОК ИСПОЛЬЗОВАННЫХ ИСТОЧНИКОВ"));
        doc.add_paragraph(Paragraph::with_text("1. Иванов И.И. Труды"));
        doc.add_paragraph(Paragraph::with_text("2. Петров П.П. Статья"));

        run_editor(&mut doc);

        assert_eq!(doc.paragraph(1).unwrap().plain_text(), "1. Иванов И.И. Труды");
        assert_eq!(doc.paragraph(2).unwrap().plain_text(), "2. Петров П.П. Статья");
    }

    #[test]
    fn test_blank_pruning() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("Текст."));
        doc.add_paragraph(Paragraph::new());
        doc.add_paragraph(Paragraph::new());
        doc.add_paragraph(Paragraph::new());
        doc.add_paragraph(Paragraph::with_text("Дальше."));

        let report = run_editor(&mut doc);

        assert_eq!(doc.block_count(), 3);
        assert_eq!(report.blanks_removed, 2);
    }

    #[test]
    fn test_empty_image_paragraph_survives_pruning() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::new());
        doc.add_paragraph(image_paragraph());
        doc.add_paragraph(Paragraph::new());

        run_editor(&mut doc);

        assert!(doc.blocks.iter().any(|b| match b {
            Block::Paragraph(p) => p.has_image(),
            _ => false,
        }));
    }

    #[test]
    fn test_editor_is_reentrant() {
        let mut doc = Document::new();
        doc.add_paragraph(image_paragraph());
        doc.add_paragraph(Paragraph::with_text("Рисунок 5 - схема"));
        doc.add_paragraph(Paragraph::with_text("1. Первый"));
        doc.add_paragraph(Paragraph::with_text("2. Второй"));

        run_editor(&mut doc);
        let once: Vec<String> = doc.paragraphs().map(|p| p.plain_text()).collect();
        let count = doc.block_count();

        let report = run_editor(&mut doc);
        let twice: Vec<String> = doc.paragraphs().map(|p| p.plain_text()).collect();

        assert_eq!(once, twice);
        assert_eq!(doc.block_count(), count);
        assert_eq!(report.captions_inserted, 0);
        assert_eq!(report.list_terminals_fixed, 0);
    }
}
