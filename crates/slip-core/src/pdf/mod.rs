//! Page text sources.
//!
//! A source turns a document into one plain-text string per page, in page
//! order. Order segmentation works on that sequence and never looks at the
//! document itself.

mod extractor;
mod text;

pub use extractor::PdfPageSource;
pub use text::{TextPageSource, PAGE_SEPARATOR};

use crate::error::PdfError;

/// Result type for page text operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for page text implementations.
pub trait PageTextSource {
    /// Load a document from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the document.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Extract the text of every page, in page order.
    fn extract_pages(&self) -> Result<Vec<String>> {
        (1..=self.page_count())
            .map(|page| self.extract_page_text(page))
            .collect()
    }
}
