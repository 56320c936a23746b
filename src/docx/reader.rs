//! DOCX reading: ZIP + event-driven OOXML parsing into the model.
//!
//! Only `word/document.xml` and `docProps/core.xml` are interpreted.
//! Subtrees the pipeline treats as opaque (drawings, math, hyperlinks,
//! bookmarks, fields) are captured verbatim so the writer can splice them
//! back unchanged.

use super::{half_points_to_pt, line_units_to_multiplier, twentieths_to_pt, twips_to_cm};
use crate::config::Margins;
use crate::error::{Error, Result};
use crate::model::{
    Alignment, Document, InlineContent, ListNumbering, Metadata, Paragraph, Run, RunStyle,
    Section, Table, TableCell, TableRow,
};
use chrono::{DateTime, Utc};
use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Parse a DOCX archive into a document model.
pub fn read_document(data: &[u8]) -> Result<Document> {
    let mut archive = ZipArchive::new(Cursor::new(data)).map_err(|_| Error::UnknownFormat)?;

    let document_xml = read_part(&mut archive, "word/document.xml")
        .map_err(|_| Error::MissingPart("word/document.xml".to_string()))?;

    let metadata = read_part(&mut archive, "docProps/core.xml")
        .map(|xml| parse_core_xml(&xml))
        .unwrap_or_default();

    let mut document = parse_document_xml(&document_xml)?;
    document.metadata = metadata;
    Ok(document)
}

fn read_part<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut part = archive.by_name(name)?;
    let mut content = String::new();
    part.read_to_string(&mut content)?;
    Ok(content)
}

/// Extract an attribute value by key from an element.
fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(std::result::Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract an attribute value by key and parse it as a number.
fn get_attr_f32(e: &BytesStart, key: &[u8]) -> Option<f32> {
    get_attr(e, key).and_then(|s| s.parse().ok())
}

fn get_attr_i32(e: &BytesStart, key: &[u8]) -> Option<i32> {
    get_attr(e, key).and_then(|s| s.parse().ok())
}

fn get_attr_i64(e: &BytesStart, key: &[u8]) -> Option<i64> {
    get_attr(e, key).and_then(|s| s.parse().ok())
}

/// Check if w:val is explicitly "0" or "false" (formatting off).
fn check_val_off(e: &BytesStart) -> bool {
    get_attr(e, b"w:val").is_some_and(|v| v == "0" || v == "false")
}

/// In-flight table state while walking the body.
#[derive(Default)]
struct TableBuilder {
    table: Table,
    row: Option<TableRow>,
    cell: Option<TableCell>,
}

/// Collected per-paragraph numbering fragments from w:numPr.
#[derive(Default)]
struct PendingNumbering {
    num_id: Option<i32>,
    level: Option<i32>,
}

fn parse_document_xml(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut document = Document {
        metadata: Metadata::default(),
        blocks: Vec::new(),
        sections: Vec::new(),
    };

    let mut paragraph: Option<Paragraph> = None;
    let mut numbering = PendingNumbering::default();
    let mut in_ppr = false;
    let mut in_rpr = false;
    let mut in_run = false;
    let mut in_text = false;
    let mut run_style = RunStyle::default();
    let mut run_text = String::new();
    let mut run_has_text = false;
    let mut tables: Vec<TableBuilder> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    paragraph = Some(Paragraph::new());
                    numbering = PendingNumbering::default();
                }
                b"w:pPr" => in_ppr = true,
                b"w:rPr" if in_run => in_rpr = true,
                b"w:rPr" if in_ppr => {
                    // Paragraph-mark run properties; not modeled.
                    skip_subtree(&mut reader)?;
                }
                b"w:r" => {
                    in_run = true;
                    run_style = RunStyle::default();
                    run_text = String::new();
                    run_has_text = false;
                }
                b"w:t" if in_run => in_text = true,
                b"w:tbl" => {
                    if tables.last().is_some_and(|tb| tb.cell.is_none()) {
                        warn!("table outside a cell inside another table; flattening");
                    }
                    tables.push(TableBuilder::default());
                }
                b"w:tblPr" => {
                    let (raw, _) = capture_subtree(&mut reader, &e)?;
                    if let Some(tb) = tables.last_mut() {
                        tb.table.props_xml = Some(raw);
                    }
                }
                b"w:tblGrid" => {
                    let (raw, _) = capture_subtree(&mut reader, &e)?;
                    if let Some(tb) = tables.last_mut() {
                        tb.table.grid_xml = Some(raw);
                    }
                }
                b"w:tr" => {
                    if let Some(tb) = tables.last_mut() {
                        tb.row = Some(TableRow::default());
                    }
                }
                b"w:trPr" => {
                    let (raw, _) = capture_subtree(&mut reader, &e)?;
                    if let Some(row) = tables.last_mut().and_then(|tb| tb.row.as_mut()) {
                        row.props_xml = Some(raw);
                    }
                }
                b"w:tc" => {
                    if let Some(tb) = tables.last_mut() {
                        tb.cell = Some(TableCell::default());
                    }
                }
                b"w:tcPr" => {
                    let (raw, _) = capture_subtree(&mut reader, &e)?;
                    if let Some(cell) = tables.last_mut().and_then(|tb| tb.cell.as_mut()) {
                        cell.props_xml = Some(raw);
                    }
                }
                b"w:hyperlink" => {
                    let (raw, text) = capture_subtree(&mut reader, &e)?;
                    if let Some(p) = paragraph.as_mut() {
                        p.content.push(InlineContent::Hyperlink { raw_xml: raw, text });
                    }
                }
                b"w:drawing" | b"w:pict" | b"w:object" | b"mc:AlternateContent" => {
                    let (raw, _) = capture_subtree(&mut reader, &e)?;
                    flush_run_text(
                        paragraph.as_mut(),
                        &mut run_text,
                        &mut run_has_text,
                        &run_style,
                    );
                    if let Some(p) = paragraph.as_mut() {
                        p.content.push(InlineContent::Image { raw_xml: raw });
                    }
                }
                b"m:oMath" | b"m:oMathPara" => {
                    let (raw, _) = capture_subtree(&mut reader, &e)?;
                    flush_run_text(
                        paragraph.as_mut(),
                        &mut run_text,
                        &mut run_has_text,
                        &run_style,
                    );
                    if let Some(p) = paragraph.as_mut() {
                        p.content.push(InlineContent::Math { raw_xml: raw });
                    }
                }
                b"w:sectPr" => {
                    let section = parse_sect_pr(&mut reader)?;
                    document.sections.push(section);
                }
                b"w:body" | b"w:document" | b"w:numPr" => {}
                _ => {
                    let (raw, _) = capture_subtree(&mut reader, &e)?;
                    if in_rpr {
                        append_extra_prop(&mut run_style, &raw);
                    } else if in_ppr {
                        // Unmodeled paragraph property; dropped.
                    } else if in_run {
                        // Run-level content we don't model (instrText,
                        // sym, ruby): keep it as its own run so the
                        // writer can splice it at paragraph level.
                        flush_run_text(
                            paragraph.as_mut(),
                            &mut run_text,
                            &mut run_has_text,
                            &run_style,
                        );
                        push_raw(paragraph.as_mut(), format!("<w:r>{raw}</w:r>"));
                    } else if paragraph.is_some() {
                        push_raw(paragraph.as_mut(), raw);
                    } else {
                        warn!(
                            "dropping unmodeled body-level element <{}>",
                            String::from_utf8_lossy(&e)
                        );
                    }
                }
            },

            Event::Empty(e) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    // Self-closed empty paragraph
                    b"w:p" => {
                        push_paragraph(&mut document, &mut tables, Paragraph::new());
                    }

                    // Paragraph properties
                    b"w:jc" if in_ppr => {
                        if let Some(p) = paragraph.as_mut() {
                            p.style.alignment = get_attr(&e, b"w:val").and_then(parse_alignment);
                        }
                    }
                    b"w:ind" if in_ppr => {
                        if let Some(p) = paragraph.as_mut() {
                            if let Some(v) = get_attr_f32(&e, b"w:firstLine") {
                                p.style.first_line_indent_cm = Some(twips_to_cm(v));
                            }
                            if let Some(v) = get_attr_f32(&e, b"w:hanging") {
                                p.style.first_line_indent_cm = Some(-twips_to_cm(v));
                            }
                            if let Some(v) = get_attr_f32(&e, b"w:left")
                                .or_else(|| get_attr_f32(&e, b"w:start"))
                            {
                                p.style.left_indent_cm = Some(twips_to_cm(v));
                            }
                            if let Some(v) = get_attr_f32(&e, b"w:right")
                                .or_else(|| get_attr_f32(&e, b"w:end"))
                            {
                                p.style.right_indent_cm = Some(twips_to_cm(v));
                            }
                        }
                    }
                    b"w:spacing" if in_ppr => {
                        if let Some(p) = paragraph.as_mut() {
                            if let Some(v) = get_attr_f32(&e, b"w:before") {
                                p.style.space_before_pt = Some(twentieths_to_pt(v));
                            }
                            if let Some(v) = get_attr_f32(&e, b"w:after") {
                                p.style.space_after_pt = Some(twentieths_to_pt(v));
                            }
                            let auto = get_attr(&e, b"w:lineRule")
                                .map_or(true, |r| r == "auto");
                            if auto {
                                if let Some(v) = get_attr_f32(&e, b"w:line") {
                                    p.style.line_spacing = Some(line_units_to_multiplier(v));
                                }
                            }
                        }
                    }
                    b"w:pageBreakBefore" if in_ppr => {
                        if let Some(p) = paragraph.as_mut() {
                            p.style.page_break_before = !check_val_off(&e);
                        }
                    }
                    b"w:pStyle" if in_ppr => {
                        if let Some(p) = paragraph.as_mut() {
                            p.style.style_id = get_attr(&e, b"w:val");
                        }
                    }
                    b"w:ilvl" if in_ppr => numbering.level = get_attr_i32(&e, b"w:val"),
                    b"w:numId" if in_ppr => numbering.num_id = get_attr_i32(&e, b"w:val"),

                    // Run properties
                    b"w:rFonts" if in_rpr => {
                        run_style.font_name = get_attr(&e, b"w:ascii")
                            .or_else(|| get_attr(&e, b"w:hAnsi"));
                    }
                    b"w:sz" if in_rpr => {
                        run_style.size_pt = get_attr_f32(&e, b"w:val").map(half_points_to_pt);
                    }
                    b"w:szCs" | b"w:bCs" if in_rpr => {}
                    b"w:b" if in_rpr => run_style.bold = Some(!check_val_off(&e)),
                    _ if in_rpr => {
                        let raw = format!("<{}/>", String::from_utf8_lossy(&e));
                        append_extra_prop(&mut run_style, &raw);
                    }

                    // Run content
                    b"w:br" if in_run => {
                        if get_attr(&e, b"w:type").as_deref() == Some("page") {
                            flush_run_text(
                                paragraph.as_mut(),
                                &mut run_text,
                                &mut run_has_text,
                                &run_style,
                            );
                            if let Some(p) = paragraph.as_mut() {
                                p.content.push(InlineContent::PageBreak);
                            }
                        } else {
                            run_text.push('\n');
                            run_has_text = true;
                        }
                    }
                    b"w:tab" if in_run => {
                        run_text.push('\t');
                        run_has_text = true;
                    }
                    b"w:t" if in_run => run_has_text = true,
                    b"w:drawing" | b"w:pict" if in_run => {
                        flush_run_text(
                            paragraph.as_mut(),
                            &mut run_text,
                            &mut run_has_text,
                            &run_style,
                        );
                        if let Some(p) = paragraph.as_mut() {
                            p.content.push(InlineContent::Image {
                                raw_xml: format!("<{}/>", String::from_utf8_lossy(&e)),
                            });
                        }
                    }
                    b"w:lastRenderedPageBreak" | b"w:proofErr" | b"w:noProof" => {}

                    _ if in_ppr => {}
                    _ if in_run => {
                        // Field characters and similar markers survive as
                        // single-element runs.
                        flush_run_text(
                            paragraph.as_mut(),
                            &mut run_text,
                            &mut run_has_text,
                            &run_style,
                        );
                        push_raw(
                            paragraph.as_mut(),
                            format!("<w:r><{}/></w:r>", String::from_utf8_lossy(&e)),
                        );
                    }
                    _ => {
                        if paragraph.is_some() {
                            push_raw(
                                paragraph.as_mut(),
                                format!("<{}/>", String::from_utf8_lossy(&e)),
                            );
                        }
                    }
                }
            }

            Event::Text(t) => {
                if in_text {
                    run_text.push_str(&t.unescape()?);
                    run_has_text = true;
                }
            }

            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:rPr" => in_rpr = false,
                b"w:pPr" => {
                    in_ppr = false;
                    if let (Some(p), Some(num_id)) = (paragraph.as_mut(), numbering.num_id) {
                        if num_id > 0 {
                            p.numbering = Some(ListNumbering {
                                num_id,
                                level: numbering.level.unwrap_or(0),
                            });
                        }
                    }
                }
                b"w:r" => {
                    in_run = false;
                    if run_has_text {
                        if let Some(p) = paragraph.as_mut() {
                            p.add_run(Run::styled(
                                std::mem::take(&mut run_text),
                                run_style.clone(),
                            ));
                        }
                    }
                    run_has_text = false;
                    run_text = String::new();
                }
                b"w:p" => {
                    if let Some(p) = paragraph.take() {
                        push_paragraph(&mut document, &mut tables, p);
                    }
                }
                b"w:tc" => {
                    if let Some(tb) = tables.last_mut() {
                        if let (Some(row), Some(cell)) = (tb.row.as_mut(), tb.cell.take()) {
                            row.cells.push(cell);
                        }
                    }
                }
                b"w:tr" => {
                    if let Some(tb) = tables.last_mut() {
                        if let Some(row) = tb.row.take() {
                            tb.table.rows.push(row);
                        }
                    }
                }
                b"w:tbl" => {
                    if let Some(tb) = tables.pop() {
                        push_table(&mut document, &mut tables, tb.table);
                    }
                }
                _ => {}
            },

            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if document.sections.is_empty() {
        document.sections.push(Section::default());
    }

    Ok(document)
}

/// Close out buffered run text as a run, preserving content order around
/// embedded objects.
fn flush_run_text(
    paragraph: Option<&mut Paragraph>,
    run_text: &mut String,
    run_has_text: &mut bool,
    run_style: &RunStyle,
) {
    if *run_has_text {
        if let Some(p) = paragraph {
            p.add_run(Run::styled(std::mem::take(run_text), run_style.clone()));
        }
    }
    *run_has_text = false;
}

fn push_raw(paragraph: Option<&mut Paragraph>, raw: String) {
    if let Some(p) = paragraph {
        p.content.push(InlineContent::Raw { raw_xml: raw });
    }
}

fn push_paragraph(document: &mut Document, tables: &mut [TableBuilder], p: Paragraph) {
    if let Some(cell) = tables.last_mut().and_then(|tb| tb.cell.as_mut()) {
        cell.content.push(p);
    } else {
        document.add_paragraph(p);
    }
}

fn push_table(document: &mut Document, tables: &mut [TableBuilder], table: Table) {
    if let Some(cell) = tables.last_mut().and_then(|tb| tb.cell.as_mut()) {
        // A nested table cannot be represented inside a cell; keep its
        // text by flattening the cell paragraphs.
        warn!("flattening nested table into parent cell");
        for row in table.rows {
            for nested_cell in row.cells {
                cell.content.extend(nested_cell.content);
            }
        }
    } else {
        document.add_table(table);
    }
}

fn append_extra_prop(style: &mut RunStyle, raw: &str) {
    match style.extra_props_xml.as_mut() {
        Some(existing) => existing.push_str(raw),
        None => style.extra_props_xml = Some(raw.to_string()),
    }
}

fn parse_alignment(val: String) -> Option<Alignment> {
    match val.as_str() {
        "left" | "start" => Some(Alignment::Left),
        "center" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "both" | "justify" | "distribute" => Some(Alignment::Justify),
        _ => None,
    }
}

/// Capture a whole element subtree verbatim, also collecting the visible
/// text of any w:t descendants (used for hyperlinks).
fn capture_subtree<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> Result<(String, String)> {
    let mut xml = format!("<{}>", String::from_utf8_lossy(start));
    let mut text = String::new();
    let mut t_depth = 0usize;
    let mut depth = 1usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if e.name().as_ref() == b"w:t" {
                    t_depth += 1;
                }
                depth += 1;
                xml.push('<');
                xml.push_str(&String::from_utf8_lossy(&e));
                xml.push('>');
            }
            Event::Empty(e) => {
                xml.push('<');
                xml.push_str(&String::from_utf8_lossy(&e));
                xml.push_str("/>");
            }
            Event::Text(t) => {
                xml.push_str(&String::from_utf8_lossy(&t));
                if t_depth > 0 {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                xml.push_str("<![CDATA[");
                xml.push_str(&String::from_utf8_lossy(&c));
                xml.push_str("]]>");
            }
            Event::End(e) => {
                if e.name().as_ref() == b"w:t" && t_depth > 0 {
                    t_depth -= 1;
                }
                xml.push_str("</");
                xml.push_str(&String::from_utf8_lossy(e.name().as_ref()));
                xml.push('>');
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => {
                return Err(Error::Malformed(
                    "unexpected end of document.xml inside element".to_string(),
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok((xml, text))
}

/// Skip a subtree without keeping it.
fn skip_subtree<R: std::io::BufRead>(reader: &mut Reader<R>) -> Result<()> {
    let mut depth = 1usize;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(Error::Malformed(
                    "unexpected end of document.xml inside element".to_string(),
                ))
            }
            _ => {}
        }
        buf.clear();
    }
}

fn parse_sect_pr<R: std::io::BufRead>(reader: &mut Reader<R>) -> Result<Section> {
    let mut section = Section::default();
    let mut depth = 1usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => match e.name().as_ref() {
                b"w:pgSz" => {
                    if let Some(w) = get_attr_i64(&e, b"w:w") {
                        section.page_width_twips = w;
                    }
                    if let Some(h) = get_attr_i64(&e, b"w:h") {
                        section.page_height_twips = h;
                    }
                }
                b"w:pgMar" => {
                    section.margins = Margins {
                        left_cm: get_attr_f32(&e, b"w:left")
                            .map(twips_to_cm)
                            .unwrap_or(section.margins.left_cm),
                        right_cm: get_attr_f32(&e, b"w:right")
                            .map(twips_to_cm)
                            .unwrap_or(section.margins.right_cm),
                        top_cm: get_attr_f32(&e, b"w:top")
                            .map(twips_to_cm)
                            .unwrap_or(section.margins.top_cm),
                        bottom_cm: get_attr_f32(&e, b"w:bottom")
                            .map(twips_to_cm)
                            .unwrap_or(section.margins.bottom_cm),
                    };
                }
                _ => {}
            },
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => {
                return Err(Error::Malformed("unexpected end of w:sectPr".to_string()))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(section)
}

fn parse_core_xml(xml: &str) -> Metadata {
    let mut metadata = Metadata::default();
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut current: Option<Vec<u8>> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                current = match name.as_slice() {
                    b"dc:title" | b"dc:creator" | b"cp:lastModifiedBy" | b"dcterms:created"
                    | b"dcterms:modified" => Some(name),
                    _ => None,
                };
            }
            Ok(Event::Text(t)) => {
                if let (Some(field), Ok(value)) = (current.as_deref(), t.unescape()) {
                    let value = value.to_string();
                    match field {
                        b"dc:title" => metadata.title = Some(value),
                        b"dc:creator" => metadata.author = Some(value),
                        b"cp:lastModifiedBy" => metadata.last_modified_by = Some(value),
                        b"dcterms:created" => metadata.created = parse_w3c_date(&value),
                        b"dcterms:modified" => metadata.modified = parse_w3c_date(&value),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("ignoring malformed docProps/core.xml: {e}");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    metadata
}

fn parse_w3c_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_body(body: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        )
    }

    #[test]
    fn test_parse_simple_paragraph() {
        let xml = wrap_body("<w:p><w:r><w:t>Привет, мир</w:t></w:r></w:p>");
        let doc = parse_document_xml(&xml).unwrap();
        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.paragraph(0).unwrap().plain_text(), "Привет, мир");
    }

    #[test]
    fn test_parse_run_styles() {
        let xml = wrap_body(
            "<w:p><w:r><w:rPr><w:rFonts w:ascii=\"Arial\"/><w:b/><w:sz w:val=\"28\"/>\
             <w:i/></w:rPr><w:t>текст</w:t></w:r></w:p>",
        );
        let doc = parse_document_xml(&xml).unwrap();
        let run = doc.paragraph(0).unwrap().runs().next().unwrap();
        assert_eq!(run.style.font_name.as_deref(), Some("Arial"));
        assert_eq!(run.style.bold, Some(true));
        assert_eq!(run.style.size_pt, Some(14.0));
        assert_eq!(run.style.extra_props_xml.as_deref(), Some("<w:i/>"));
    }

    #[test]
    fn test_parse_paragraph_properties() {
        let xml = wrap_body(
            "<w:p><w:pPr><w:jc w:val=\"both\"/>\
             <w:ind w:firstLine=\"709\" w:left=\"0\"/>\
             <w:spacing w:before=\"0\" w:after=\"200\" w:line=\"360\" w:lineRule=\"auto\"/>\
             <w:pageBreakBefore/></w:pPr>\
             <w:r><w:t>абзац</w:t></w:r></w:p>",
        );
        let doc = parse_document_xml(&xml).unwrap();
        let style = &doc.paragraph(0).unwrap().style;
        assert_eq!(style.alignment, Some(Alignment::Justify));
        assert!((style.first_line_indent_cm.unwrap() - 1.25).abs() < 0.01);
        assert_eq!(style.space_after_pt, Some(10.0));
        assert_eq!(style.line_spacing, Some(1.5));
        assert!(style.page_break_before);
    }

    #[test]
    fn test_parse_numbering() {
        let xml = wrap_body(
            "<w:p><w:pPr><w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"3\"/></w:numPr></w:pPr>\
             <w:r><w:t>пункт</w:t></w:r></w:p>",
        );
        let doc = parse_document_xml(&xml).unwrap();
        assert_eq!(
            doc.paragraph(0).unwrap().numbering,
            Some(ListNumbering { num_id: 3, level: 0 })
        );
    }

    #[test]
    fn test_parse_drawing_as_image() {
        let xml = wrap_body(
            "<w:p><w:r><w:t>до </w:t></w:r>\
             <w:r><w:drawing><wp:inline><a:blip r:embed=\"rId4\"/></wp:inline></w:drawing></w:r>\
             </w:p>",
        );
        let doc = parse_document_xml(&xml).unwrap();
        let p = doc.paragraph(0).unwrap();
        assert!(p.has_image());
        let raw = p
            .content
            .iter()
            .find_map(|c| match c {
                InlineContent::Image { raw_xml } => Some(raw_xml.as_str()),
                _ => None,
            })
            .unwrap();
        assert!(raw.starts_with("<w:drawing>"));
        assert!(raw.contains("r:embed=\"rId4\""));
        assert!(raw.ends_with("</w:drawing>"));
    }

    #[test]
    fn test_parse_hyperlink_keeps_text() {
        let xml = wrap_body(
            "<w:p><w:hyperlink r:id=\"rId5\"><w:r><w:t>ссылка</w:t></w:r></w:hyperlink></w:p>",
        );
        let doc = parse_document_xml(&xml).unwrap();
        let p = doc.paragraph(0).unwrap();
        assert_eq!(p.plain_text(), "ссылка");
        assert!(matches!(
            p.content.first(),
            Some(InlineContent::Hyperlink { raw_xml, .. }) if raw_xml.contains("rId5")
        ));
    }

    #[test]
    fn test_parse_table() {
        let xml = wrap_body(
            "<w:tbl><w:tblPr><w:tblW w:w=\"0\"/></w:tblPr>\
             <w:tr><w:tc><w:p><w:r><w:t>A1</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>B1</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
        );
        let doc = parse_document_xml(&xml).unwrap();
        let table = doc.tables().next().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.plain_text(), "A1\tB1");
        assert!(table.props_xml.as_deref().unwrap().contains("w:tblW"));
    }

    #[test]
    fn test_parse_section() {
        let xml = wrap_body(
            "<w:p><w:r><w:t>текст</w:t></w:r></w:p>\
             <w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/>\
             <w:pgMar w:top=\"1134\" w:right=\"850\" w:bottom=\"1134\" w:left=\"1701\"/>\
             </w:sectPr>",
        );
        let doc = parse_document_xml(&xml).unwrap();
        assert_eq!(doc.sections.len(), 1);
        let section = &doc.sections[0];
        assert_eq!(section.page_width_twips, 11906);
        assert!((section.margins.left_cm - 3.0).abs() < 0.01);
        assert!((section.margins.right_cm - 1.5).abs() < 0.01);
    }

    #[test]
    fn test_page_break_inside_run() {
        let xml = wrap_body(
            "<w:p><w:r><w:t>до</w:t><w:br w:type=\"page\"/><w:t>после</w:t></w:r></w:p>",
        );
        let doc = parse_document_xml(&xml).unwrap();
        let p = doc.paragraph(0).unwrap();
        assert!(p
            .content
            .iter()
            .any(|c| matches!(c, InlineContent::PageBreak)));
        assert_eq!(p.plain_text(), "допосле");
    }

    #[test]
    fn test_escaped_text_unescaped() {
        let xml = wrap_body("<w:p><w:r><w:t>a &lt; b &amp; c</w:t></w:r></w:p>");
        let doc = parse_document_xml(&xml).unwrap();
        assert_eq!(doc.paragraph(0).unwrap().plain_text(), "a < b & c");
    }

    #[test]
    fn test_parse_core_metadata() {
        let xml = "<?xml version=\"1.0\"?><cp:coreProperties \
                   xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
                   xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
                   xmlns:dcterms=\"http://purl.org/dc/terms/\">\
                   <dc:title>Отчёт</dc:title><dc:creator>Иванов</dc:creator>\
                   <dcterms:created>2024-03-01T10:00:00Z</dcterms:created>\
                   </cp:coreProperties>";
        let metadata = parse_core_xml(xml);
        assert_eq!(metadata.title.as_deref(), Some("Отчёт"));
        assert_eq!(metadata.author.as_deref(), Some("Иванов"));
        assert!(metadata.created.is_some());
    }
}
