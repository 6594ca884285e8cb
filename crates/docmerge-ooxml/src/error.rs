//! Error types for package editing operations

use thiserror::Error;

/// Errors that can occur while editing a docx package
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute inside an XML part
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// A part is not valid UTF-8
    #[error("Part is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Required part not found in the package
    #[error("Required part not found: {0}")]
    MissingPart(String),

    /// Caller-supplied replacement fragment could not be parsed
    #[error("Malformed XML fragment: {0}")]
    MalformedFragment(String),

    /// Invalid document structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),
}

/// Result type for package editing operations
pub type Result<T> = std::result::Result<T, TemplateError>;
