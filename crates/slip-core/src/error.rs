//! Error types for the slip-core library.
//!
//! Only the collaborators around the extraction core can fail: loading a
//! document, reading configuration, writing the export. Segmentation and
//! field extraction never return errors; unmatched fields degrade to
//! `None` or zero instead.

use thiserror::Error;

/// Main error type for the slip library.
#[derive(Error, Debug)]
pub enum SlipError {
    /// Page text extraction error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Writing the delimited export failed.
    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to turning a document into per-page text.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// A page was requested before any document was loaded.
    #[error("no document loaded")]
    NotLoaded,
}

/// Result type for the slip library.
pub type Result<T> = std::result::Result<T, SlipError>;
