//! Title boundary detection.
//!
//! Everything before the contents marker is the cover page and must stay
//! untouched; the boundary is computed once per pipeline invocation and
//! never revisited.

use crate::model::{Block, Document};

/// Contents markers that end the cover page.
const CONTENTS_MARKERS: [&str; 2] = ["СОДЕРЖАНИЕ", "ОГЛАВЛЕНИЕ"];

/// Block index of the first paragraph whose trimmed, upper-cased text is a
/// contents marker; 0 when the document has none (nothing excluded).
pub fn title_boundary(document: &Document) -> usize {
    document
        .blocks
        .iter()
        .position(|block| match block {
            Block::Paragraph(p) => {
                let upper = p.plain_text().trim().to_uppercase();
                CONTENTS_MARKERS.contains(&upper.as_str())
            }
            _ => false,
        })
        .unwrap_or(0)
}
