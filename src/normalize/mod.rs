//! Run-fragmented text normalization.
//!
//! Transforms are specified over a paragraph's logical text (the ordered
//! concatenation of its runs) and realized as span edits through
//! [`LogicalView`], so they stay correct no matter how the text is split
//! across independently-styled runs. Passes run in a fixed order and are
//! not commutative; each is best-effort and leaves text unchanged when the
//! evidence is ambiguous. Running the normalizer twice on its own output
//! is a no-op.

mod dict;
mod logical;

pub use logical::{Edit, LogicalView};

use crate::model::{InlineContent, Paragraph};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

const NBSP: char = '\u{A0}';

/// Per-pass change counters, advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeStats {
    /// Collapsed space sequences
    pub spaces: u32,

    /// Dash glyph rewrites
    pub dashes: u32,

    /// Colon spacing/case fixes
    pub colons: u32,

    /// Expanded abbreviations
    pub abbreviations: u32,

    /// Inserted non-breaking spaces
    pub nbsp: u32,

    /// Unified quote glyphs
    pub quotes: u32,

    /// Lower-cased list leads
    pub decapitalized: u32,
}

impl NormalizeStats {
    /// Total number of edits across all passes.
    pub fn total(&self) -> u32 {
        self.spaces
            + self.dashes
            + self.colons
            + self.abbreviations
            + self.nbsp
            + self.quotes
            + self.decapitalized
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &NormalizeStats) {
        self.spaces += other.spaces;
        self.dashes += other.dashes;
        self.colons += other.colons;
        self.abbreviations += other.abbreviations;
        self.nbsp += other.nbsp;
        self.quotes += other.quotes;
        self.decapitalized += other.decapitalized;
    }
}

/// Text normalizer with patterns compiled once.
pub struct Normalizer {
    flanked_hyphen: Regex,
    space_before_colon: Regex,
    nbsp_sign: Regex,
    nbsp_head: Regex,
    nbsp_initial_pair: Regex,
    nbsp_initial: Regex,
    nbsp_unit: Regex,
    nbsp_year: Regex,
    nbsp_date: Regex,
}

impl Normalizer {
    /// Create a normalizer with the fixed rule tables.
    pub fn new() -> Self {
        let heads = dict::alternation(dict::NBSP_HEADS);
        let units = dict::alternation(dict::UNITS);
        let months = dict::alternation(dict::MONTHS);

        Self {
            flanked_hyphen: Regex::new("[ \u{A0}]+-[ \u{A0}]+").unwrap(),
            space_before_colon: Regex::new("[ \u{A0}]+:").unwrap(),
            nbsp_sign: Regex::new("([§№]) +").unwrap(),
            nbsp_head: Regex::new(&format!("(^|[\\s(«])({heads}) +")).unwrap(),
            nbsp_initial_pair: Regex::new(
                "([А-ЯЁA-Z]\\.\\s?[А-ЯЁA-Z]\\.) ([А-ЯЁA-Z][а-яёa-z])",
            )
            .unwrap(),
            nbsp_initial: Regex::new("([А-ЯЁA-Z]\\.) ([А-ЯЁA-Z][а-яёa-z])").unwrap(),
            nbsp_unit: Regex::new(&format!("(\\d) ((?:{units})\\b|%)")).unwrap(),
            nbsp_year: Regex::new("(\\d{4}) (гг?\\.)").unwrap(),
            nbsp_date: Regex::new(&format!("\\b(\\d{{1,2}}) ({months})\\b")).unwrap(),
        }
    }

    /// Run all passes, in order, over one paragraph.
    ///
    /// `is_list_item` enables the leading-letter decapitalization pass; the
    /// caller supplies it from a fresh classification.
    pub fn normalize_paragraph(
        &self,
        paragraph: &mut Paragraph,
        is_list_item: bool,
    ) -> NormalizeStats {
        let mut stats = NormalizeStats::default();

        stats.spaces = self.collapse_spaces(paragraph) as u32;
        stats.dashes = self.normalize_dashes(paragraph) as u32;
        stats.colons = self.normalize_colons(paragraph) as u32;
        stats.abbreviations = self.expand_abbreviations(paragraph) as u32;
        stats.nbsp = self.insert_nbsp(paragraph) as u32;
        stats.quotes = self.unify_quotes(paragraph) as u32;
        if is_list_item {
            stats.decapitalized = self.decapitalize_lead(paragraph) as u32;
        }

        if stats.total() > 0 {
            debug!(
                "normalized paragraph: {} edit(s) ({:?})",
                stats.total(),
                stats
            );
        }

        stats
    }

    /// Pass 1: collapse repeated spaces inside runs, then strip a leading
    /// space from a run whose predecessor already ends with one. A run
    /// reduced to whitespace-only is blanked.
    fn collapse_spaces(&self, paragraph: &mut Paragraph) -> usize {
        let mut changes = 0;

        for run in paragraph.runs_mut() {
            let mut collapsed = String::with_capacity(run.text.len());
            let mut prev_space = false;
            for c in run.text.chars() {
                if c == ' ' {
                    if prev_space {
                        continue;
                    }
                    prev_space = true;
                } else {
                    prev_space = false;
                }
                collapsed.push(c);
            }
            if collapsed != run.text {
                run.text = collapsed;
                changes += 1;
            }
        }

        let mut prev_ends_space = false;
        for item in &mut paragraph.content {
            match item {
                InlineContent::Text(run) => {
                    if prev_ends_space && run.text.starts_with(' ') {
                        run.text = run.text.trim_start_matches(' ').to_string();
                        changes += 1;
                    }
                    if let Some(last) = run.text.chars().next_back() {
                        prev_ends_space = last == ' ';
                    }
                    // An empty run carries the previous state through.
                }
                InlineContent::Hyperlink { text, .. } => {
                    prev_ends_space = text.ends_with(' ');
                }
                _ => prev_ends_space = false,
            }
        }

        changes
    }

    /// Pass 2: em-dash → en-dash everywhere; a hyphen flanked by
    /// spaces/NBSP becomes " – ". Hyphens without whitespace evidence on
    /// both sides are left as word hyphens.
    fn normalize_dashes(&self, paragraph: &mut Paragraph) -> usize {
        let view = LogicalView::of(paragraph);
        let text = view.text();
        let mut edits = Vec::new();

        for (i, c) in text.char_indices() {
            if c == '—' {
                edits.push(Edit::new(i..i + c.len_utf8(), "–"));
            } else if c == '-' {
                let prev = text[..i].chars().next_back();
                let next = text[i + 1..].chars().next();
                let prev_ws = prev.is_some_and(|p| p == ' ' || p == NBSP);
                let next_ws = next.is_some_and(|n| n == ' ' || n == NBSP);
                if prev.is_some() && next.is_some() && prev_ws != next_ws {
                    debug!("leaving one-sided hyphen at byte {i} unchanged");
                }
            }
        }
        for m in self.flanked_hyphen.find_iter(text) {
            edits.push(Edit::new(m.range(), " – "));
        }

        view.apply(paragraph, edits)
    }

    /// Pass 3: no space before a colon; after ": " the next word loses its
    /// capital unless the second letter is also uppercase (acronym guard).
    /// Both halves cross run boundaries.
    fn normalize_colons(&self, paragraph: &mut Paragraph) -> usize {
        let view = LogicalView::of(paragraph);
        let edits: Vec<Edit> = self
            .space_before_colon
            .find_iter(view.text())
            .map(|m| Edit::new(m.range(), ":"))
            .collect();
        let mut changes = view.apply(paragraph, edits);

        let view = LogicalView::of(paragraph);
        let text = view.text();
        let mut edits = Vec::new();
        let mut search = 0;
        while let Some(rel) = text[search..].find(": ") {
            let word_start = search + rel + 2;
            let mut chars = text[word_start..].chars();
            if let Some(first) = chars.next() {
                if first.is_uppercase() && !chars.next().is_some_and(|c| c.is_uppercase()) {
                    edits.push(Edit::new(
                        word_start..word_start + first.len_utf8(),
                        first.to_lowercase().to_string(),
                    ));
                }
            }
            search = word_start;
        }
        changes += view.apply(paragraph, edits);

        changes
    }

    /// Pass 4: fixed abbreviation expansions, matched within a single run
    /// only. Skipped after a comma or a capitalized initial.
    fn expand_abbreviations(&self, paragraph: &mut Paragraph) -> usize {
        let mut changes = 0;

        for run in paragraph.runs_mut() {
            let mut replacements: Vec<(usize, usize, &str)> = Vec::new();

            for &(abbr, expansion) in dict::ABBREVIATIONS {
                let mut from = 0;
                while let Some(rel) = run.text[from..].find(abbr) {
                    let start = from + rel;
                    let end = start + abbr.len();
                    from = end;

                    if !abbreviation_boundaries_ok(&run.text, start, end) {
                        continue;
                    }
                    if blocked_by_context(&run.text[..start]) {
                        continue;
                    }
                    if replacements
                        .iter()
                        .any(|&(s, e, _)| s < end && e > start)
                    {
                        continue;
                    }
                    replacements.push((start, end, expansion));
                }
            }

            replacements.sort_by_key(|&(s, _, _)| s);
            for &(start, end, expansion) in replacements.iter().rev() {
                run.text.replace_range(start..end, expansion);
                changes += 1;
            }
        }

        changes
    }

    /// Pass 5: non-breaking spaces after §/№ and abbreviation heads,
    /// between initials and a name, a numeral and a unit, a year and
    /// г./гг., a day and a month. Single-run scope.
    fn insert_nbsp(&self, paragraph: &mut Paragraph) -> usize {
        let mut changes = 0;
        let nbsp = NBSP.to_string();

        for run in paragraph.runs_mut() {
            for (re, replacement) in [
                (&self.nbsp_sign, format!("${{1}}{nbsp}")),
                (&self.nbsp_head, format!("${{1}}${{2}}{nbsp}")),
                (&self.nbsp_initial_pair, format!("${{1}}{nbsp}${{2}}")),
                (&self.nbsp_initial, format!("${{1}}{nbsp}${{2}}")),
                (&self.nbsp_unit, format!("${{1}}{nbsp}${{2}}")),
                (&self.nbsp_year, format!("${{1}}{nbsp}${{2}}")),
                (&self.nbsp_date, format!("${{1}}{nbsp}${{2}}")),
            ] {
                // A match consumes the whitespace that would anchor the
                // next one ("см. рис. 5"), so repeat until the text is
                // stable; every replacement turns a matched space into
                // NBSP, which bounds the loop.
                loop {
                    let matched = re.find_iter(&run.text).count();
                    if matched == 0 {
                        break;
                    }
                    run.text = re.replace_all(&run.text, replacement.as_str()).into_owned();
                    changes += matched;
                }
            }
        }

        changes
    }

    /// Pass 6: unify straight/curly/low quote glyphs into guillemets. One
    /// "open" flag persists across the whole paragraph; neighboring
    /// whitespace and brackets disambiguate, evaluated across run
    /// boundaries.
    fn unify_quotes(&self, paragraph: &mut Paragraph) -> usize {
        let view = LogicalView::of(paragraph);
        let text = view.text();
        let mut edits = Vec::new();
        let mut open = false;

        for (i, c) in text.char_indices() {
            if !dict::QUOTE_GLYPHS.contains(&c) {
                continue;
            }
            let prev = text[..i].chars().next_back();
            let next = text[i + c.len_utf8()..].chars().next();

            let opening = match (prev, next) {
                (None, _) => true,
                (Some(p), _) if p.is_whitespace() || matches!(p, '(' | '[' | '{' | '«') => true,
                (_, None) => false,
                (_, Some(n)) if n.is_whitespace() || is_closing_context(n) => false,
                _ => !open,
            };

            edits.push(Edit::new(
                i..i + c.len_utf8(),
                if opening { "«" } else { "»" },
            ));
            open = opening;
        }

        view.apply(paragraph, edits)
    }

    /// Pass 7: list items lose a leading capital unless the word is an
    /// acronym.
    fn decapitalize_lead(&self, paragraph: &mut Paragraph) -> usize {
        let view = LogicalView::of(paragraph);
        let text = view.text();

        if let Some((i, c)) = text.char_indices().find(|(_, c)| c.is_alphabetic()) {
            if c.is_uppercase() {
                let next = text[i + c.len_utf8()..].chars().next();
                if !next.is_some_and(|n| n.is_uppercase()) {
                    let edits = vec![Edit::new(
                        i..i + c.len_utf8(),
                        c.to_lowercase().to_string(),
                    )];
                    return view.apply(paragraph, edits);
                }
            }
        }

        0
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// The abbreviation must start and end at word boundaries.
fn abbreviation_boundaries_ok(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| c.is_whitespace() || matches!(c, '(' | '«'));
    let after_ok = text[end..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric());
    before_ok && after_ok
}

/// Expansion is blocked after a comma or a capitalized initial ("А.").
fn blocked_by_context(before: &str) -> bool {
    let trimmed = before.trim_end();
    if trimmed.ends_with(',') {
        return true;
    }
    let mut rev = trimmed.chars().rev();
    matches!(
        (rev.next(), rev.next()),
        (Some('.'), Some(c)) if c.is_uppercase()
    )
}

/// Characters that suggest a closing quote when they follow the glyph.
fn is_closing_context(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | ']' | '}' | '»')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Paragraph;

    fn normalize(parts: &[&str]) -> String {
        let mut p = Paragraph::new();
        for part in parts {
            p.add_text(*part);
        }
        Normalizer::new().normalize_paragraph(&mut p, false);
        p.plain_text()
    }

    fn normalize_list(parts: &[&str]) -> String {
        let mut p = Paragraph::new();
        for part in parts {
            p.add_text(*part);
        }
        Normalizer::new().normalize_paragraph(&mut p, true);
        p.plain_text()
    }

    #[test]
    fn test_space_collapse_within_run() {
        assert_eq!(normalize(&["слово   слово"]), "слово слово");
    }

    #[test]
    fn test_space_collapse_across_runs() {
        assert_eq!(normalize(&["слово ", "  слово"]), "слово слово");
    }

    #[test]
    fn test_space_collapse_blanks_whitespace_run() {
        let mut p = Paragraph::new();
        p.add_text("слово ");
        p.add_text("   ");
        p.add_text(" слово");
        Normalizer::new().normalize_paragraph(&mut p, false);

        assert_eq!(p.plain_text(), "слово слово");
        let texts: Vec<String> = p.runs().map(|r| r.text.clone()).collect();
        assert_eq!(texts, vec!["слово ", "", "слово"]);
    }

    #[test]
    fn test_em_dash_to_en_dash() {
        // Scenario: "слово  —  слово" → "слово – слово"
        assert_eq!(normalize(&["слово  —  слово"]), "слово – слово");
    }

    #[test]
    fn test_flanked_hyphen() {
        assert_eq!(normalize(&["слово - слово"]), "слово – слово");
    }

    #[test]
    fn test_word_hyphen_untouched() {
        assert_eq!(normalize(&["кто-то"]), "кто-то");
    }

    #[test]
    fn test_lone_hyphen_run_with_whitespace_evidence() {
        assert_eq!(normalize(&["слово ", "-", " слово"]), "слово – слово");
    }

    #[test]
    fn test_lone_hyphen_run_ambiguous() {
        // Whitespace on one side only: left unchanged.
        assert_eq!(normalize(&["слово ", "-", "слово"]), "слово -слово");
    }

    #[test]
    fn test_colon_space_stripped() {
        assert_eq!(normalize(&["слово :"]), "слово:");
        assert_eq!(normalize(&["слово\u{A0}:"]), "слово:");
    }

    #[test]
    fn test_colon_decapitalization() {
        assert_eq!(normalize(&["итог: Провал"]), "итог: провал");
    }

    #[test]
    fn test_colon_acronym_guard() {
        assert_eq!(normalize(&["стандарт: ГОСТ 7.32"]), "стандарт: ГОСТ 7.32");
    }

    #[test]
    fn test_colon_decap_across_run_boundary() {
        assert_eq!(normalize(&["итог:", " Провал"]), "итог: провал");
    }

    #[test]
    fn test_abbreviation_expansion() {
        // Scenario D
        assert_eq!(normalize(&["т.к. он ушёл"]), "так как он ушёл");
        assert_eq!(normalize(&["здесь и т.д. дальше"]), "здесь и так далее дальше");
    }

    #[test]
    fn test_abbreviation_comma_guard() {
        // Scenario D: comma blocks expansion
        assert_eq!(normalize(&["Иванов, т.к. опоздал"]), "Иванов, т.к. опоздал");
    }

    #[test]
    fn test_abbreviation_initial_guard() {
        // "А." keeps "и др." unexpanded; the NBSP head rule still binds
        // "др." to the following word.
        assert_eq!(
            normalize(&["Иванов А. и др. писали"]),
            "Иванов А. и др.\u{A0}писали"
        );
    }

    #[test]
    fn test_abbreviation_not_across_runs() {
        // Fragmented across runs: single-run scope leaves it alone.
        assert_eq!(normalize(&["т.", "к. он ушёл"]), "т.к. он ушёл");
    }

    #[test]
    fn test_nbsp_after_number_sign() {
        assert_eq!(normalize(&["приказ № 5"]), "приказ №\u{A0}5");
    }

    #[test]
    fn test_nbsp_after_head() {
        assert_eq!(normalize(&["см. рис. 3"]), "см.\u{A0}рис.\u{A0}3");
    }

    #[test]
    fn test_nbsp_initials() {
        assert_eq!(normalize(&["поэт А.С. Пушкин"]), "поэт А.С.\u{A0}Пушкин");
    }

    #[test]
    fn test_nbsp_unit() {
        assert_eq!(normalize(&["длина 5 см ровно"]), "длина 5\u{A0}см ровно");
        assert_eq!(normalize(&["рост на 7 %"]), "рост на 7\u{A0}%");
    }

    #[test]
    fn test_nbsp_year() {
        assert_eq!(normalize(&["в 1999 г. вышел"]), "в 1999\u{A0}г. вышел");
    }

    #[test]
    fn test_nbsp_date() {
        assert_eq!(normalize(&["с 9 мая 1945"]), "с 9\u{A0}мая 1945");
    }

    #[test]
    fn test_quote_unification() {
        assert_eq!(normalize(&["он сказал \"привет\" и ушёл"]), "он сказал «привет» и ушёл");
        assert_eq!(normalize(&["„низкие" , "“ кавычки"]), "«низкие» кавычки");
    }

    #[test]
    fn test_quote_across_run_boundary() {
        assert_eq!(normalize(&["\"сло", "во\""]), "«слово»");
    }

    #[test]
    fn test_quote_balance_even_count() {
        let out = normalize(&["\"а\" и \"б\""]);
        assert_eq!(out.matches('«').count(), out.matches('»').count());
        assert_eq!(out, "«а» и «б»");
    }

    #[test]
    fn test_quote_odd_count_does_not_panic() {
        let out = normalize(&["осталась \"одна"]);
        assert_eq!(out, "осталась «одна");
    }

    #[test]
    fn test_list_decapitalization() {
        assert_eq!(normalize_list(&["1. Первый пункт"]), "1. первый пункт");
    }

    #[test]
    fn test_list_decap_acronym_guard() {
        assert_eq!(normalize_list(&["1. ГОСТ требует"]), "1. ГОСТ требует");
    }

    #[test]
    fn test_decap_skipped_for_regular_paragraphs() {
        assert_eq!(normalize(&["Обычный абзац"]), "Обычный абзац");
    }

    #[test]
    fn test_normalizer_is_idempotent() {
        let samples: Vec<Vec<&str>> = vec![
            vec!["слово  —  слово, \"цитата\" и т.к. причина: Вот рис. 5"],
            vec!["а ", "-", " б"],
            vec!["итог:", " Провал №", " 7"],
        ];

        for parts in samples {
            let mut p = Paragraph::new();
            for part in &parts {
                p.add_text(*part);
            }
            let n = Normalizer::new();
            n.normalize_paragraph(&mut p, false);
            let once = p.plain_text();
            let stats = n.normalize_paragraph(&mut p, false);
            assert_eq!(p.plain_text(), once);
            assert_eq!(stats.total(), 0, "second pass edited: {:?}", stats);
        }
    }

    #[test]
    fn test_run_split_invariance() {
        let text = "итог: Вот \"цитата\" — и т.к. всё";
        let splits: Vec<Vec<&str>> = vec![
            vec![text],
            vec!["итог: Вот \"цита", "та\" — и т.к. всё"],
            vec!["итог:", " Вот \"цитата\" —", " и т.к. всё"],
        ];

        let mut outputs = Vec::new();
        for parts in splits {
            let mut p = Paragraph::new();
            for part in &parts {
                p.add_text(*part);
            }
            Normalizer::new().normalize_paragraph(&mut p, false);
            outputs.push(p.plain_text());
        }

        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[0], outputs[2]);
    }
}
