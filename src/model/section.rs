//! Section types: page geometry and the footer record.

use crate::config::Margins;
use serde::{Deserialize, Serialize};

/// A section record: margins, page size, footer.
///
/// Page dimensions are kept in twips (1/20 pt) as they appear in `w:pgSz`;
/// margins are modeled in centimeters and converted by the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Page margins in centimeters
    pub margins: Margins,

    /// Page width in twips (w:pgSz w:w)
    pub page_width_twips: i64,

    /// Page height in twips (w:pgSz w:h)
    pub page_height_twips: i64,

    /// Whether the section footer carries a centered page-number field
    pub footer_page_field: bool,
}

impl Section {
    /// A4 portrait page with GOST margins and no footer.
    pub fn a4() -> Self {
        Self::default()
    }
}

impl Default for Section {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            // A4 portrait: 210 x 297 mm
            page_width_twips: 11906,
            page_height_twips: 16838,
            footer_page_field: false,
        }
    }
}
