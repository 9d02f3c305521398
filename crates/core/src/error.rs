//! Error types for building slide decks from question records.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading records or writing a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The question records could not be decoded.
    #[error("Invalid question records: {0}")]
    InvalidInput(String),

    /// Failed to parse a PPTX package while verifying it.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// No usable output location could be chosen.
    #[error("Output path error: {0}")]
    OutputPath(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML reading or writing error.
    #[error("XML error: {0}")]
    XmlError(String),
}
