//! Error types for the gostfmt library.

use std::io;
use thiserror::Error;

/// Result type alias for gostfmt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document processing.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as DOCX.
    #[error("Unknown file format: not a valid DOCX archive")]
    UnknownFormat,

    /// A required archive part is missing (e.g., word/document.xml).
    #[error("Missing archive part: {0}")]
    MissingPart(String),

    /// Error reading the ZIP container.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Error parsing OOXML markup.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// The document structure is corrupted or malformed.
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// Error serializing the document back to OOXML.
    #[error("Write error: {0}")]
    Write(String),

    /// A block index is out of range for the document.
    #[error("Block {0} is out of range (document has {1} blocks)")]
    BlockOutOfRange(usize, usize),

    /// Encoding error.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => {
                Error::MissingPart("file not found in archive".to_string())
            }
            _ => Error::Archive(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
