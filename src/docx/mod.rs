//! DOCX container adapter.
//!
//! DOCX files are ZIP archives; the content lives in `word/document.xml`
//! with styles, numbering, media, and metadata in sibling parts. The
//! reader parses the OOXML event stream into the document model, keeping
//! opaque subtrees (drawings, math, hyperlinks) verbatim; the writer
//! regenerates `word/document.xml` plus the page-number footer and copies
//! every other part of the source archive untouched. Load and save are the
//! only I/O in the crate.

mod reader;
mod writer;

pub use reader::read_document;
pub use writer::{write_document, write_standalone};

/// Twips (1/20 pt) per centimeter.
const TWIPS_PER_CM: f32 = 567.0;

/// Twentieths of a point per line in "auto" line spacing.
const LINE_UNITS_PER_LINE: f32 = 240.0;

fn twips_to_cm(twips: f32) -> f32 {
    twips / TWIPS_PER_CM
}

fn cm_to_twips(cm: f32) -> i64 {
    (cm * TWIPS_PER_CM).round() as i64
}

fn half_points_to_pt(half: f32) -> f32 {
    half / 2.0
}

fn pt_to_half_points(pt: f32) -> i64 {
    (pt * 2.0).round() as i64
}

fn line_units_to_multiplier(units: f32) -> f32 {
    units / LINE_UNITS_PER_LINE
}

fn multiplier_to_line_units(multiplier: f32) -> i64 {
    (multiplier * LINE_UNITS_PER_LINE).round() as i64
}

/// Twentieths of a point per point, used by w:spacing before/after.
fn twentieths_to_pt(val: f32) -> f32 {
    val / 20.0
}

fn pt_to_twentieths(pt: f32) -> i64 {
    (pt * 20.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cm_twips_round_trip() {
        assert_eq!(cm_to_twips(1.25), 709);
        assert!((twips_to_cm(709.0) - 1.25).abs() < 0.01);
        assert_eq!(cm_to_twips(3.0), 1701);
    }

    #[test]
    fn test_point_conversions() {
        assert_eq!(pt_to_half_points(14.0), 28);
        assert_eq!(half_points_to_pt(28.0), 14.0);
        assert_eq!(multiplier_to_line_units(1.5), 360);
        assert_eq!(pt_to_twentieths(12.0), 240);
        assert_eq!(twentieths_to_pt(240.0), 12.0);
    }
}
