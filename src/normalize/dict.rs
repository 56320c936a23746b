//! Fixed phrase tables for the normalization passes.

/// Abbreviation expansions, longest match first.
///
/// Matched within a single run only; expansion is skipped after a comma or
/// a capitalized initial.
pub const ABBREVIATIONS: &[(&str, &str)] = &[
    ("и т.д.", "и так далее"),
    ("и т.п.", "и тому подобное"),
    ("и др.", "и другие"),
    ("т.к.", "так как"),
    ("т.е.", "то есть"),
];

/// Abbreviation heads that bind to the following token with a
/// non-breaking space.
pub const NBSP_HEADS: &[&str] = &[
    "рис.", "табл.", "гл.", "стр.", "см.", "п.", "с.", "гг.", "др.", "руб.",
];

/// Unit-of-measure tokens that bind to a preceding numeral.
pub const UNITS: &[&str] = &[
    "мм", "см", "дм", "м", "км", "мг", "г", "кг", "т", "мл", "л", "с", "мин", "ч", "сут", "шт",
    "руб", "коп", "Вт", "кВт", "МВт", "Гц", "кГц", "МГц", "ГГц", "%",
];

/// Month names in the genitive, as used in dates ("5 мая 2024").
pub const MONTHS: &[&str] = &[
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// Quote glyphs unified into guillemets.
pub const QUOTE_GLYPHS: &[char] = &['"', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}'];

/// Build an alternation fragment for a regex from a token list.
pub fn alternation(tokens: &[&str]) -> String {
    tokens
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|")
}
