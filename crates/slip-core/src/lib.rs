//! Core library for packing-slip order extraction.
//!
//! This crate provides:
//! - Page text sources (PDF via lopdf/pdf-extract, form-feed separated text)
//! - Order segmentation across pages by the `Order Number:` marker
//! - Rule-based order field extraction (number, date, items, totals)
//! - Flat tabular export of orders and their items

pub mod error;
pub mod export;
pub mod models;
pub mod order;
pub mod pdf;
pub mod pipeline;

pub use error::{PdfError, Result, SlipError};
pub use export::{suggested_filename, to_delimited_string, to_rows, write_delimited, ExportRow, EXPORT_HEADER};
pub use models::config::SlipConfig;
pub use models::order::{ItemRecord, OrderRecord};
pub use order::{extract, segment, OrderExtractor, OrderParser, OrderSegmenter, ParsedOrder, RawOrderBlock};
pub use pdf::{PageTextSource, PdfPageSource, TextPageSource};
pub use pipeline::{parse_document, parse_pages, process_pages, DocumentResult};
