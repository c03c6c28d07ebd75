//! Order segmentation and field extraction.

mod parser;
mod segmenter;
pub mod patterns;

pub use parser::{extract_items, normalize_description, OrderParser, ParsedOrder};
pub use segmenter::{segment, OrderSegmenter, RawOrderBlock};

use crate::models::order::OrderRecord;

/// Trait for order field extractors.
pub trait OrderExtractor {
    /// Extract an order record from the text of one order block.
    fn extract(&self, text: &str) -> OrderRecord;

    /// Extract one record per block, preserving block order.
    fn extract_all(&self, blocks: &[RawOrderBlock]) -> Vec<OrderRecord> {
        blocks.iter().map(|b| self.extract(b.as_str())).collect()
    }
}

/// Extract an order record from one block with the default parser.
pub fn extract(block: &RawOrderBlock) -> OrderRecord {
    OrderParser::new().extract(block.as_str())
}
