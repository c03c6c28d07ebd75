//! Pre-extracted text with form-feed page breaks.

use tracing::debug;

use super::{PageTextSource, Result};
use crate::error::PdfError;

/// Page separator written by `pdftotext` and similar tools.
pub const PAGE_SEPARATOR: char = '\u{000C}';

/// Page source over plain UTF-8 text, one page per form-feed separated part.
#[derive(Debug, Clone, Default)]
pub struct TextPageSource {
    pages: Vec<String>,
}

impl TextPageSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source directly from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            pages: split_pages(text),
        }
    }
}

impl PageTextSource for TextPageSource {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(data)
            .map_err(|e| PdfError::TextExtraction(format!("input is not UTF-8: {}", e)))?;
        self.pages = split_pages(text);
        debug!("Loaded {} text pages", self.pages.len());
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .cloned()
            .ok_or(PdfError::InvalidPage(page))
    }

    fn extract_pages(&self) -> Result<Vec<String>> {
        Ok(self.pages.clone())
    }
}

/// Split on form feeds. A single trailing separator ends the last page
/// rather than opening an empty one; empty input has no pages.
fn split_pages(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text.strip_suffix(PAGE_SEPARATOR).unwrap_or(text);
    body.split(PAGE_SEPARATOR).map(str::to_string).collect()
}
