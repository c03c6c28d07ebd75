//! PDF page text extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use lopdf::Document;
use tracing::{debug, warn};

use super::{PageTextSource, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Per-page PDF text source.
///
/// Text comes from `pdf-extract`, which keeps the reading order of text
/// runs; pages it cannot handle fall back to lopdf's content-stream text.
/// pdf-extract always reads the whole document, so its per-page output is
/// computed once per loaded document and reused.
pub struct PdfPageSource {
    config: PdfConfig,
    document: Option<Document>,
    raw_data: Vec<u8>,
    extracted: OnceLock<Option<Vec<String>>>,
}

impl PdfPageSource {
    /// Create a new PDF page source with default settings.
    pub fn new() -> Self {
        Self::with_config(PdfConfig::default())
    }

    /// Create a new PDF page source.
    pub fn with_config(config: PdfConfig) -> Self {
        Self {
            config,
            document: None,
            raw_data: Vec::new(),
            extracted: OnceLock::new(),
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document.as_ref().ok_or(PdfError::NotLoaded)
    }

    /// Number of pages that will be read, after `max_pages`.
    fn pages_to_read(&self) -> u32 {
        let total = self.page_count();
        match self.config.max_pages {
            0 => total,
            max => total.min(max as u32),
        }
    }

    /// pdf-extract pages of the loaded document, `None` if it failed.
    fn extracted_pages(&self) -> Option<&[String]> {
        self.extracted
            .get_or_init(|| match extract_pages_with_pdf_extract(&self.raw_data) {
                Ok(pages) => Some(pages),
                Err(e) => {
                    warn!("pdf-extract failed ({}), using lopdf", e);
                    None
                }
            })
            .as_deref()
    }

    fn extract_page_with_lopdf(&self, page: u32) -> Result<String> {
        self.document()?
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

impl Default for PdfPageSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Run pdf-extract over the whole document, one string per page.
///
/// pdf-extract panics on some malformed input instead of returning an
/// error; the panic is converted into [`PdfError::TextExtraction`].
fn extract_pages_with_pdf_extract(data: &[u8]) -> Result<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
        Err(_) => Err(PdfError::TextExtraction(
            "pdf-extract panicked on malformed document".to_string(),
        )),
    }
}

impl PageTextSource for PdfPageSource {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        self.extracted = OnceLock::new();
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if !self.config.try_empty_password || doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the bytes itself, hand it the decrypted copy
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }

        match self.extracted_pages() {
            Some(pages) if (page as usize) <= pages.len() => Ok(pages[page as usize - 1].clone()),
            _ => self.extract_page_with_lopdf(page),
        }
    }

    fn extract_pages(&self) -> Result<Vec<String>> {
        let wanted = self.pages_to_read();
        self.document()?;

        let pages = match self.extracted_pages() {
            Some(pages) if pages.len() >= wanted as usize => pages[..wanted as usize].to_vec(),
            extracted => {
                if let Some(pages) = extracted {
                    warn!(
                        "pdf-extract returned {} pages for a {} page document, using lopdf",
                        pages.len(),
                        wanted
                    );
                }
                (1..=wanted)
                    .map(|page| self.extract_page_with_lopdf(page))
                    .collect::<Result<Vec<_>>>()?
            }
        };

        debug!(
            "Extracted {} pages, {} chars of text",
            pages.len(),
            pages.iter().map(String::len).sum::<usize>()
        );
        Ok(pages)
    }
}
