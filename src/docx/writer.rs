//! DOCX writing: regenerate `word/document.xml` and the page-number
//! footer, copy every other part of the source archive verbatim.

use super::{cm_to_twips, multiplier_to_line_units, pt_to_half_points, pt_to_twentieths};
use crate::error::{Error, Result};
use crate::model::{
    Alignment, Block, Document, InlineContent, Paragraph, Run, RunStyle, Section, Table,
};
use quick_xml::escape::escape;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const FOOTER_PART: &str = "word/footer-page.xml";
const FOOTER_REL_ID: &str = "rIdPageFooter";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

const DOCUMENT_OPEN: &str = concat!(
    "<w:document",
    " xmlns:wpc=\"http://schemas.microsoft.com/office/word/2010/wordprocessingCanvas\"",
    " xmlns:mc=\"http://schemas.openxmlformats.org/markup-compatibility/2006\"",
    " xmlns:o=\"urn:schemas-microsoft-com:office:office\"",
    " xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\"",
    " xmlns:m=\"http://schemas.openxmlformats.org/officeDocument/2006/math\"",
    " xmlns:v=\"urn:schemas-microsoft-com:vml\"",
    " xmlns:wp14=\"http://schemas.microsoft.com/office/word/2010/wordprocessingDrawing\"",
    " xmlns:wp=\"http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing\"",
    " xmlns:w10=\"urn:schemas-microsoft-com:office:word\"",
    " xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"",
    " xmlns:w14=\"http://schemas.microsoft.com/office/word/2010/wordml\"",
    " xmlns:w15=\"http://schemas.microsoft.com/office/word/2012/wordml\"",
    " xmlns:wpg=\"http://schemas.microsoft.com/office/word/2010/wordprocessingGroup\"",
    " xmlns:wpi=\"http://schemas.microsoft.com/office/word/2010/wordprocessingInk\"",
    " xmlns:wne=\"http://schemas.microsoft.com/office/word/2006/wordml\"",
    " xmlns:wps=\"http://schemas.microsoft.com/office/word/2010/wordprocessingShape\"",
    " mc:Ignorable=\"w14 w15 wp14\">",
);

const FOOTER_XML: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n",
    "<w:ftr xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">",
    "<w:p><w:pPr><w:jc w:val=\"center\"/></w:pPr>",
    "<w:r><w:fldChar w:fldCharType=\"begin\"/></w:r>",
    "<w:r><w:instrText xml:space=\"preserve\">PAGE</w:instrText></w:r>",
    "<w:r><w:fldChar w:fldCharType=\"end\"/></w:r>",
    "</w:p></w:ftr>",
);

const MINIMAL_CONTENT_TYPES: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n",
    "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
    "<Default Extension=\"rels\" ",
    "ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
    "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    "<Override PartName=\"/word/document.xml\" ",
    "ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>",
    "</Types>",
);

const MINIMAL_ROOT_RELS: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    "<Relationship Id=\"rId1\" ",
    "Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" ",
    "Target=\"word/document.xml\"/>",
    "</Relationships>",
);

const MINIMAL_DOCUMENT_RELS: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    "</Relationships>",
);

/// Serialize the document into a copy of its source archive.
///
/// Only `word/document.xml`, the footer part, and the two parts that must
/// reference the footer are (re)written; media, styles, numbering and
/// everything else is copied byte-for-byte.
pub fn write_document(document: &Document, source: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(source)).map_err(|_| Error::UnknownFormat)?;
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let wants_footer = document.sections.iter().any(|s| s.footer_page_field);
    let mut wrote_document = false;
    let mut wrote_rels = false;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();

        match name.as_str() {
            "word/document.xml" => {
                zip.start_file(name.as_str(), options)?;
                zip.write_all(render_document_xml(document).as_bytes())?;
                wrote_document = true;
            }
            CONTENT_TYPES_PART if wants_footer => {
                let mut xml = String::new();
                entry.read_to_string(&mut xml)?;
                zip.start_file(name.as_str(), options)?;
                zip.write_all(patch_content_types(&xml).as_bytes())?;
            }
            DOCUMENT_RELS_PART if wants_footer => {
                let mut xml = String::new();
                entry.read_to_string(&mut xml)?;
                zip.start_file(name.as_str(), options)?;
                zip.write_all(patch_document_rels(&xml).as_bytes())?;
                wrote_rels = true;
            }
            FOOTER_PART => {} // regenerated below
            _ => {
                let mut bytes = Vec::new();
                entry.read_to_end(&mut bytes)?;
                zip.start_file(name.as_str(), options)?;
                zip.write_all(&bytes)?;
            }
        }
    }

    if !wrote_document {
        return Err(Error::MissingPart("word/document.xml".to_string()));
    }
    if wants_footer {
        if !wrote_rels {
            zip.start_file(DOCUMENT_RELS_PART, options)?;
            zip.write_all(patch_document_rels(MINIMAL_DOCUMENT_RELS).as_bytes())?;
        }
        zip.start_file(FOOTER_PART, options)?;
        zip.write_all(FOOTER_XML.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Serialize the document into a fresh minimal archive (no source file).
pub fn write_standalone(document: &Document) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let wants_footer = document.sections.iter().any(|s| s.footer_page_field);

    let content_types = if wants_footer {
        patch_content_types(MINIMAL_CONTENT_TYPES)
    } else {
        MINIMAL_CONTENT_TYPES.to_string()
    };
    zip.start_file(CONTENT_TYPES_PART, options)?;
    zip.write_all(content_types.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(MINIMAL_ROOT_RELS.as_bytes())?;

    let document_rels = if wants_footer {
        patch_document_rels(MINIMAL_DOCUMENT_RELS)
    } else {
        MINIMAL_DOCUMENT_RELS.to_string()
    };
    zip.start_file(DOCUMENT_RELS_PART, options)?;
    zip.write_all(document_rels.as_bytes())?;

    zip.start_file("word/document.xml", options)?;
    zip.write_all(render_document_xml(document).as_bytes())?;

    if wants_footer {
        zip.start_file(FOOTER_PART, options)?;
        zip.write_all(FOOTER_XML.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn patch_content_types(xml: &str) -> String {
    if xml.contains(FOOTER_PART) {
        return xml.to_string();
    }
    let override_entry = format!(
        "<Override PartName=\"/{FOOTER_PART}\" \
         ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml\"/>\
         </Types>"
    );
    xml.replace("</Types>", &override_entry)
}

fn patch_document_rels(xml: &str) -> String {
    if xml.contains(FOOTER_REL_ID) {
        return xml.to_string();
    }
    let relationship = format!(
        "<Relationship Id=\"{FOOTER_REL_ID}\" \
         Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer\" \
         Target=\"footer-page.xml\"/></Relationships>"
    );
    xml.replace("</Relationships>", &relationship)
}

fn render_document_xml(document: &Document) -> String {
    let mut xml = String::with_capacity(16 * 1024);
    xml.push_str(XML_DECL);
    xml.push_str(DOCUMENT_OPEN);
    xml.push_str("<w:body>");

    for block in &document.blocks {
        match block {
            Block::Paragraph(p) => render_paragraph(&mut xml, p),
            Block::Table(t) => render_table(&mut xml, t),
        }
    }

    let fallback = Section::default();
    let section = document.sections.last().unwrap_or(&fallback);
    render_sect_pr(&mut xml, section);

    xml.push_str("</w:body></w:document>");
    xml
}

fn render_paragraph(xml: &mut String, paragraph: &Paragraph) {
    xml.push_str("<w:p>");
    render_ppr(xml, paragraph);

    for item in &paragraph.content {
        match item {
            InlineContent::Text(run) => render_run(xml, run),
            // Drawings are run content; the captured subtree gets a plain
            // run wrapper back.
            InlineContent::Image { raw_xml } => {
                xml.push_str("<w:r>");
                xml.push_str(raw_xml);
                xml.push_str("</w:r>");
            }
            InlineContent::Math { raw_xml }
            | InlineContent::Hyperlink { raw_xml, .. }
            | InlineContent::Raw { raw_xml } => xml.push_str(raw_xml),
            InlineContent::PageBreak => xml.push_str("<w:r><w:br w:type=\"page\"/></w:r>"),
        }
    }

    xml.push_str("</w:p>");
}

fn render_ppr(xml: &mut String, paragraph: &Paragraph) {
    let style = &paragraph.style;
    let has_props = style.style_id.is_some()
        || style.page_break_before
        || paragraph.numbering.is_some()
        || style.space_before_pt.is_some()
        || style.space_after_pt.is_some()
        || style.line_spacing.is_some()
        || style.first_line_indent_cm.is_some()
        || style.left_indent_cm.is_some()
        || style.right_indent_cm.is_some()
        || style.alignment.is_some();
    if !has_props {
        return;
    }

    xml.push_str("<w:pPr>");

    if let Some(id) = &style.style_id {
        xml.push_str("<w:pStyle w:val=\"");
        xml.push_str(&escape(id));
        xml.push_str("\"/>");
    }
    if style.page_break_before {
        xml.push_str("<w:pageBreakBefore/>");
    }
    if let Some(numbering) = &paragraph.numbering {
        xml.push_str(&format!(
            "<w:numPr><w:ilvl w:val=\"{}\"/><w:numId w:val=\"{}\"/></w:numPr>",
            numbering.level, numbering.num_id
        ));
    }

    if style.space_before_pt.is_some()
        || style.space_after_pt.is_some()
        || style.line_spacing.is_some()
    {
        xml.push_str("<w:spacing");
        if let Some(v) = style.space_before_pt {
            xml.push_str(&format!(" w:before=\"{}\"", pt_to_twentieths(v)));
        }
        if let Some(v) = style.space_after_pt {
            xml.push_str(&format!(" w:after=\"{}\"", pt_to_twentieths(v)));
        }
        if let Some(v) = style.line_spacing {
            xml.push_str(&format!(
                " w:line=\"{}\" w:lineRule=\"auto\"",
                multiplier_to_line_units(v)
            ));
        }
        xml.push_str("/>");
    }

    if style.first_line_indent_cm.is_some()
        || style.left_indent_cm.is_some()
        || style.right_indent_cm.is_some()
    {
        xml.push_str("<w:ind");
        if let Some(v) = style.left_indent_cm {
            xml.push_str(&format!(" w:left=\"{}\"", cm_to_twips(v)));
        }
        if let Some(v) = style.right_indent_cm {
            xml.push_str(&format!(" w:right=\"{}\"", cm_to_twips(v)));
        }
        if let Some(v) = style.first_line_indent_cm {
            if v < 0.0 {
                xml.push_str(&format!(" w:hanging=\"{}\"", cm_to_twips(-v)));
            } else {
                xml.push_str(&format!(" w:firstLine=\"{}\"", cm_to_twips(v)));
            }
        }
        xml.push_str("/>");
    }

    if let Some(alignment) = style.alignment {
        xml.push_str("<w:jc w:val=\"");
        xml.push_str(alignment_value(alignment));
        xml.push_str("\"/>");
    }

    xml.push_str("</w:pPr>");
}

fn alignment_value(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

fn render_run(xml: &mut String, run: &Run) {
    xml.push_str("<w:r>");
    render_rpr(xml, &run.style);

    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                xml.push_str("<w:tab/>");
            }
            xml.push_str("<w:t xml:space=\"preserve\">");
            xml.push_str(&escape(piece));
            xml.push_str("</w:t>");
        }
    }

    xml.push_str("</w:r>");
}

fn render_rpr(xml: &mut String, style: &RunStyle) {
    if style.font_name.is_none()
        && style.size_pt.is_none()
        && style.bold.is_none()
        && style.extra_props_xml.is_none()
    {
        return;
    }

    xml.push_str("<w:rPr>");

    if let Some(font) = &style.font_name {
        let font = escape(font);
        xml.push_str(&format!(
            "<w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\" w:cs=\"{font}\"/>"
        ));
    }
    match style.bold {
        Some(true) => xml.push_str("<w:b/><w:bCs/>"),
        Some(false) => xml.push_str("<w:b w:val=\"0\"/><w:bCs w:val=\"0\"/>"),
        None => {}
    }
    if let Some(extra) = &style.extra_props_xml {
        xml.push_str(extra);
    }
    if let Some(size) = style.size_pt {
        let half = pt_to_half_points(size);
        xml.push_str(&format!("<w:sz w:val=\"{half}\"/><w:szCs w:val=\"{half}\"/>"));
    }

    xml.push_str("</w:rPr>");
}

fn render_table(xml: &mut String, table: &Table) {
    xml.push_str("<w:tbl>");
    if let Some(props) = &table.props_xml {
        xml.push_str(props);
    }
    if let Some(grid) = &table.grid_xml {
        xml.push_str(grid);
    }

    for row in &table.rows {
        xml.push_str("<w:tr>");
        if let Some(props) = &row.props_xml {
            xml.push_str(props);
        }
        for cell in &row.cells {
            xml.push_str("<w:tc>");
            if let Some(props) = &cell.props_xml {
                xml.push_str(props);
            }
            if cell.content.is_empty() {
                // A cell must contain at least one paragraph.
                xml.push_str("<w:p/>");
            } else {
                for paragraph in &cell.content {
                    render_paragraph(xml, paragraph);
                }
            }
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }

    xml.push_str("</w:tbl>");
}

fn render_sect_pr(xml: &mut String, section: &Section) {
    xml.push_str("<w:sectPr>");
    if section.footer_page_field {
        xml.push_str(&format!(
            "<w:footerReference w:type=\"default\" r:id=\"{FOOTER_REL_ID}\"/>"
        ));
    }
    xml.push_str(&format!(
        "<w:pgSz w:w=\"{}\" w:h=\"{}\"/>",
        section.page_width_twips, section.page_height_twips
    ));
    xml.push_str(&format!(
        "<w:pgMar w:top=\"{}\" w:right=\"{}\" w:bottom=\"{}\" w:left=\"{}\" \
         w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/>",
        cm_to_twips(section.margins.top_cm),
        cm_to_twips(section.margins.right_cm),
        cm_to_twips(section.margins.bottom_cm),
        cm_to_twips(section.margins.left_cm),
    ));
    xml.push_str("</w:sectPr>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::read_document;
    use crate::model::{Paragraph, RunStyle};

    fn doc_with_text(text: &str) -> Document {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text(text));
        doc
    }

    #[test]
    fn test_standalone_round_trip() {
        let doc = doc_with_text("Привет, мир");
        let bytes = write_standalone(&doc).unwrap();
        let reread = read_document(&bytes).unwrap();
        assert_eq!(reread.paragraph(0).unwrap().plain_text(), "Привет, мир");
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = doc_with_text("a < b & c");
        let bytes = write_standalone(&doc).unwrap();
        let reread = read_document(&bytes).unwrap();
        assert_eq!(reread.paragraph(0).unwrap().plain_text(), "a < b & c");
    }

    #[test]
    fn test_styles_round_trip() {
        let mut doc = Document::new();
        let mut p = Paragraph::new();
        p.add_run(crate::model::Run::styled(
            "текст",
            RunStyle {
                font_name: Some("Times New Roman".to_string()),
                size_pt: Some(14.0),
                bold: Some(true),
                extra_props_xml: None,
            },
        ));
        p.style.alignment = Some(Alignment::Justify);
        p.style.first_line_indent_cm = Some(1.25);
        p.style.line_spacing = Some(1.5);
        p.style.page_break_before = true;
        doc.add_paragraph(p);

        let bytes = write_standalone(&doc).unwrap();
        let reread = read_document(&bytes).unwrap();
        let rp = reread.paragraph(0).unwrap();
        assert_eq!(rp.style.alignment, Some(Alignment::Justify));
        assert!((rp.style.first_line_indent_cm.unwrap() - 1.25).abs() < 0.01);
        assert_eq!(rp.style.line_spacing, Some(1.5));
        assert!(rp.style.page_break_before);
        let run = rp.runs().next().unwrap();
        assert_eq!(run.style.bold, Some(true));
        assert_eq!(run.style.size_pt, Some(14.0));
        assert_eq!(run.style.font_name.as_deref(), Some("Times New Roman"));
    }

    #[test]
    fn test_hanging_indent_round_trip() {
        let mut doc = Document::new();
        let mut p = Paragraph::with_text("Иванов И.И. Труды.");
        p.style.first_line_indent_cm = Some(-1.25);
        p.style.left_indent_cm = Some(1.25);
        doc.add_paragraph(p);

        let bytes = write_standalone(&doc).unwrap();
        let reread = read_document(&bytes).unwrap();
        let style = &reread.paragraph(0).unwrap().style;
        assert!((style.first_line_indent_cm.unwrap() + 1.25).abs() < 0.01);
        assert!((style.left_indent_cm.unwrap() - 1.25).abs() < 0.01);
    }

    #[test]
    fn test_footer_parts_written() {
        let mut doc = doc_with_text("текст");
        doc.sections[0].footer_page_field = true;

        let bytes = write_standalone(&doc).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();

        let mut footer = String::new();
        archive
            .by_name(FOOTER_PART)
            .unwrap()
            .read_to_string(&mut footer)
            .unwrap();
        assert!(footer.contains("PAGE"));
        assert!(footer.contains("w:fldChar"));

        let mut rels = String::new();
        archive
            .by_name(DOCUMENT_RELS_PART)
            .unwrap()
            .read_to_string(&mut rels)
            .unwrap();
        assert!(rels.contains(FOOTER_REL_ID));

        let mut types = String::new();
        archive
            .by_name(CONTENT_TYPES_PART)
            .unwrap()
            .read_to_string(&mut types)
            .unwrap();
        assert!(types.contains("footer+xml"));
    }

    #[test]
    fn test_rewrite_preserves_unknown_parts() {
        // Build a source archive with an extra media part, then rewrite.
        let doc = doc_with_text("исходный");
        let base = write_standalone(&doc).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(base.as_slice())).unwrap();
        let mut with_media = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let name = entry.name().to_string();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).unwrap();
            with_media.start_file(name.as_str(), options).unwrap();
            with_media.write_all(&bytes).unwrap();
        }
        with_media
            .start_file("word/media/image1.png", options)
            .unwrap();
        with_media.write_all(b"PNGDATA").unwrap();
        let source = with_media.finish().unwrap().into_inner();

        let doc2 = doc_with_text("изменённый");
        let bytes = write_document(&doc2, &source).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut media = Vec::new();
        archive
            .by_name("word/media/image1.png")
            .unwrap()
            .read_to_end(&mut media)
            .unwrap();
        assert_eq!(media, b"PNGDATA");

        let reread = read_document(&bytes).unwrap();
        assert_eq!(reread.paragraph(0).unwrap().plain_text(), "изменённый");
    }

    #[test]
    fn test_patching_is_idempotent() {
        let once = patch_content_types(MINIMAL_CONTENT_TYPES);
        assert_eq!(patch_content_types(&once), once);

        let once = patch_document_rels(MINIMAL_DOCUMENT_RELS);
        assert_eq!(patch_document_rels(&once), once);
    }

    #[test]
    fn test_table_round_trip() {
        let mut doc = Document::new();
        let mut table = Table::new();
        table.add_row(crate::model::TableRow::from_strings(["A", "B"]));
        doc.add_table(table);

        let bytes = write_standalone(&doc).unwrap();
        let reread = read_document(&bytes).unwrap();
        let table = reread.tables().next().unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.plain_text(), "A\tB");
    }

    #[test]
    fn test_raw_content_spliced_verbatim() {
        let mut doc = Document::new();
        let mut p = Paragraph::with_text("до ");
        p.content.push(InlineContent::Image {
            raw_xml: "<w:drawing><wp:inline><a:blip r:embed=\"rId7\"/></wp:inline></w:drawing>"
                .to_string(),
        });
        doc.add_paragraph(p);

        let bytes = write_standalone(&doc).unwrap();
        let reread = read_document(&bytes).unwrap();
        let rp = reread.paragraph(0).unwrap();
        assert!(rp.has_image());
        assert!(rp.content.iter().any(|c| matches!(
            c,
            InlineContent::Image { raw_xml } if raw_xml.contains("rId7")
        )));
    }
}
