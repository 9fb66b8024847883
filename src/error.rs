//! Error types for the pptxdom library.

use std::io;
use thiserror::Error;

/// Result type alias for pptxdom operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding a presentation.
///
/// Only [`Error::PackageCorrupt`] and a missing or unreadable presentation
/// part abort a whole decode. Everything else is caught at the part or
/// element boundary and reported as a warning.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The byte stream is not a readable ZIP archive.
    #[error("Package is corrupt: {0}")]
    PackageCorrupt(String),

    /// A part requested from the package does not exist.
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// XML content could not be parsed.
    #[error("Malformed XML at byte {offset}: {message}")]
    MalformedXml {
        /// Byte offset into the part where the parser stopped
        offset: u64,
        /// Parser message
        message: String,
    },

    /// The part parsed as XML but its root or layout is not what the
    /// part kind requires.
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// Invalid or malformed attribute data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required package component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Import settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Error while rendering the model to an output format.
    #[error("Render error: {0}")]
    Render(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::FileNotFound => Error::PartNotFound(err.to_string()),
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::PackageCorrupt(other.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedXml {
            offset: 0,
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(format!("JSON serialization error: {}", err))
    }
}
