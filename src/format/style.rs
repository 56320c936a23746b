//! Style rules and the uniform applicator.
//!
//! Style is a total, pure function of (Category, FormatConfig), never of
//! the paragraph's prior formatting, so reapplying it is a no-op.

use super::classify::{Category, FormulaKind};
use crate::config::FormatConfig;
use crate::model::{Alignment, Paragraph};

/// Applies the category rule table to paragraphs.
pub struct StyleApplicator<'a> {
    config: &'a FormatConfig,
}

impl<'a> StyleApplicator<'a> {
    /// Create an applicator over one immutable configuration.
    pub fn new(config: &'a FormatConfig) -> Self {
        Self { config }
    }

    /// Apply the rule for `category` to the paragraph and every one of its
    /// runs. `Category::Empty` paragraphs are left untouched.
    pub fn apply(&self, paragraph: &mut Paragraph, category: Category) {
        if category == Category::Empty {
            return;
        }

        let rule = self.rule_for(category);

        let style = &mut paragraph.style;
        style.alignment = Some(rule.alignment);
        style.first_line_indent_cm = Some(rule.first_line_indent_cm);
        style.left_indent_cm = Some(rule.left_indent_cm);
        style.space_before_pt = Some(0.0);
        style.space_after_pt = Some(0.0);
        style.line_spacing = Some(self.config.line_spacing);
        style.page_break_before = rule.page_break_before;

        for run in paragraph.runs_mut() {
            run.style.font_name = Some(self.config.font_name.clone());
            run.style.size_pt = Some(rule.font_size_pt);
            run.style.bold = Some(rule.bold);
        }
    }

    fn rule_for(&self, category: Category) -> StyleRule {
        let config = self.config;
        let body = StyleRule {
            alignment: Alignment::Justify,
            first_line_indent_cm: config.first_line_indent_cm,
            left_indent_cm: 0.0,
            bold: false,
            font_size_pt: config.font_size_pt,
            page_break_before: false,
        };
        let centered_heading = StyleRule {
            alignment: Alignment::Center,
            first_line_indent_cm: 0.0,
            bold: true,
            font_size_pt: config.heading_size_pt,
            page_break_before: true,
            ..body
        };

        match category {
            Category::SectionHeading | Category::NumberedHeading(1) => centered_heading,
            Category::NumberedHeading(_) => StyleRule { bold: true, ..body },
            Category::AppendixHeading => StyleRule {
                font_size_pt: config.font_size_pt,
                ..centered_heading
            },
            Category::FigureCaption => StyleRule {
                alignment: Alignment::Center,
                first_line_indent_cm: 0.0,
                ..body
            },
            Category::TableCaption => StyleRule {
                alignment: Alignment::Left,
                first_line_indent_cm: 0.0,
                ..body
            },
            Category::FormulaLine(FormulaKind::Equation) => StyleRule {
                alignment: Alignment::Center,
                first_line_indent_cm: 0.0,
                ..body
            },
            Category::FormulaLine(FormulaKind::WhereClause) => body,
            Category::ListItem => body,
            Category::BibliographyEntry => StyleRule {
                // Hanging indent: the first line outdents into the margin.
                first_line_indent_cm: -config.first_line_indent_cm,
                left_indent_cm: config.first_line_indent_cm,
                ..body
            },
            Category::Regular => body,
            Category::Empty => body,
        }
    }
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy)]
struct StyleRule {
    alignment: Alignment,
    first_line_indent_cm: f32,
    left_indent_cm: f32,
    bold: bool,
    font_size_pt: f32,
    page_break_before: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Run;

    fn styled(text: &str, category: Category) -> Paragraph {
        let config = FormatConfig::default();
        let mut p = Paragraph::with_text(text);
        StyleApplicator::new(&config).apply(&mut p, category);
        p
    }

    #[test]
    fn test_section_heading_rule() {
        let p = styled("ВВЕДЕНИЕ", Category::SectionHeading);
        assert_eq!(p.style.alignment, Some(Alignment::Center));
        assert_eq!(p.style.first_line_indent_cm, Some(0.0));
        assert!(p.style.page_break_before);
        let run = p.runs().next().unwrap();
        assert_eq!(run.style.bold, Some(true));
        assert_eq!(run.style.size_pt, Some(16.0));
    }

    #[test]
    fn test_subheading_rule() {
        let p = styled("1.1 Задача", Category::NumberedHeading(2));
        assert_eq!(p.style.alignment, Some(Alignment::Justify));
        assert_eq!(p.style.first_line_indent_cm, Some(1.25));
        assert!(!p.style.page_break_before);
        let run = p.runs().next().unwrap();
        assert_eq!(run.style.bold, Some(true));
        assert_eq!(run.style.size_pt, Some(14.0));
    }

    #[test]
    fn test_appendix_keeps_base_size() {
        let p = styled("ПРИЛОЖЕНИЕ А", Category::AppendixHeading);
        assert!(p.style.page_break_before);
        assert_eq!(p.runs().next().unwrap().style.size_pt, Some(14.0));
    }

    #[test]
    fn test_caption_rules() {
        let fig = styled("Рисунок 1 – схема", Category::FigureCaption);
        assert_eq!(fig.style.alignment, Some(Alignment::Center));
        assert_eq!(fig.runs().next().unwrap().style.bold, Some(false));

        let tbl = styled("Таблица 1 – данные", Category::TableCaption);
        assert_eq!(tbl.style.alignment, Some(Alignment::Left));
    }

    #[test]
    fn test_formula_rules() {
        let eq = styled("E = mc2 (1)", Category::FormulaLine(FormulaKind::Equation));
        assert_eq!(eq.style.alignment, Some(Alignment::Center));

        let wh = styled(
            "где m – масса",
            Category::FormulaLine(FormulaKind::WhereClause),
        );
        assert_eq!(wh.style.alignment, Some(Alignment::Justify));
        assert_eq!(wh.style.first_line_indent_cm, Some(1.25));
    }

    #[test]
    fn test_bibliography_hanging_indent() {
        let p = styled("Иванов И.И. Труды.", Category::BibliographyEntry);
        assert_eq!(p.style.first_line_indent_cm, Some(-1.25));
        assert_eq!(p.style.left_indent_cm, Some(1.25));
        assert_eq!(p.style.alignment, Some(Alignment::Justify));
    }

    #[test]
    fn test_empty_untouched() {
        let config = FormatConfig::default();
        let mut p = Paragraph::new();
        p.style.alignment = Some(Alignment::Right);
        StyleApplicator::new(&config).apply(&mut p, Category::Empty);
        assert_eq!(p.style.alignment, Some(Alignment::Right));
    }

    #[test]
    fn test_applies_to_every_run_uniformly() {
        let config = FormatConfig::default();
        let mut p = Paragraph::new();
        p.add_run(Run::new("обычный "));
        p.add_run(Run::styled(
            "жирный",
            crate::model::RunStyle {
                bold: Some(true),
                size_pt: Some(10.0),
                ..Default::default()
            },
        ));
        StyleApplicator::new(&config).apply(&mut p, Category::Regular);

        for run in p.runs() {
            assert_eq!(run.style.bold, Some(false));
            assert_eq!(run.style.size_pt, Some(14.0));
            assert_eq!(run.style.font_name.as_deref(), Some("Times New Roman"));
        }
    }

    #[test]
    fn test_idempotent() {
        let config = FormatConfig::default();
        let applicator = StyleApplicator::new(&config);
        let mut p = Paragraph::with_text("Обычный абзац");
        applicator.apply(&mut p, Category::Regular);
        let once = p.clone();
        applicator.apply(&mut p, Category::Regular);

        assert_eq!(p.style, once.style);
        assert_eq!(
            p.runs().next().unwrap().style,
            once.runs().next().unwrap().style
        );
    }
}
