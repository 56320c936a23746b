//! DOCX format detection and validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

/// ZIP local-file-header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect whether bytes are a DOCX archive.
///
/// A DOCX file is a ZIP container holding `word/document.xml`. The check
/// opens the archive index, so it rejects plain ZIPs and other OOXML
/// packages (xlsx, pptx) as well as non-ZIP data.
///
/// # Returns
/// * `Ok(())` if the data is a DOCX archive
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<()> {
    if !data.starts_with(ZIP_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|_| Error::UnknownFormat)?;
    if archive.by_name("word/document.xml").is_err() {
        return Err(Error::UnknownFormat);
    }

    Ok(())
}

/// Detect DOCX format from a file path.
///
/// # Example
/// ```no_run
/// use gostfmt::detect::detect_format_from_path;
///
/// detect_format_from_path("report.docx").expect("not a docx file");
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    detect_format_from_bytes(&data)
}

/// Check if a file is a valid DOCX archive.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes represent a valid DOCX archive.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
