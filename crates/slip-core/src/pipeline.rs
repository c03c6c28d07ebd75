//! End-to-end document processing: page text, segmentation, extraction.

use std::time::Instant;

use tracing::{info, warn};

use crate::error::Result;
use crate::models::config::ExtractionConfig;
use crate::models::order::OrderRecord;
use crate::order::{segment, OrderParser, RawOrderBlock};
use crate::pdf::PageTextSource;

/// Orders extracted from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentResult {
    /// Extracted orders, in document order.
    pub orders: Vec<OrderRecord>,
    /// Per-order warnings, prefixed with the order's page span.
    pub warnings: Vec<String>,
    /// Number of pages read.
    pub page_count: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl DocumentResult {
    /// Total number of line items across all orders.
    pub fn item_count(&self) -> usize {
        self.orders.iter().map(|o| o.items.len()).sum()
    }
}

/// Segment and extract already materialized page text.
pub fn parse_pages<S: AsRef<str>>(pages: &[S]) -> Vec<OrderRecord> {
    process_pages(pages, &ExtractionConfig::default()).orders
}

/// Segment and extract page text, collecting warnings.
pub fn process_pages<S: AsRef<str>>(pages: &[S], config: &ExtractionConfig) -> DocumentResult {
    let start = Instant::now();
    let parser = OrderParser::new();

    let blocks = segment(pages);
    let mut orders = Vec::with_capacity(blocks.len());
    let mut warnings = Vec::new();

    for block in &blocks {
        let parsed = parser.parse(block.as_str());

        for warning in parsed.warnings {
            warnings.push(format!("{}: {}", page_span(block), warning));
        }
        if config.validate_totals {
            for issue in parsed.order.validate() {
                warnings.push(format!("{}: {}", page_span(block), issue));
            }
        }

        orders.push(parsed.order);
    }

    if config.report_warnings {
        for warning in &warnings {
            warn!("{}", warning);
        }
    }

    info!(
        "Extracted {} orders from {} pages",
        orders.len(),
        pages.len()
    );

    DocumentResult {
        orders,
        warnings,
        page_count: pages.len(),
        processing_time_ms: start.elapsed().as_millis() as u64,
    }
}

/// Read every page from a loaded source, then segment and extract.
pub fn parse_document<P: PageTextSource + ?Sized>(
    source: &P,
    config: &ExtractionConfig,
) -> Result<DocumentResult> {
    let pages = source.extract_pages()?;
    Ok(process_pages(&pages, config))
}

fn page_span(block: &RawOrderBlock) -> String {
    match (block.pages.first(), block.pages.last()) {
        (Some(first), Some(last)) if first == last => format!("page {}", first),
        (Some(first), Some(last)) => format!("pages {}-{}", first, last),
        _ => "empty block".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::TextPageSource;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const PAGE_123: &str = "Order Number: 123\nOrder Date: Shipping Method: Buyer Name: Seller Name: 01/02/2023\nQuantity Description Price Total Price\n2 Widget $5.00 $10.00\n2 Total $10.00 Total";

    #[test]
    fn test_single_page_order() {
        let orders = parse_pages(&[PAGE_123]);
        assert_eq!(orders.len(), 1);

        let order = &orders[0];
        assert_eq!(order.order_number.as_deref(), Some("123"));
        assert_eq!(order.order_date.as_deref(), Some("01/02/2023"));
        assert_eq!(order.declared_total_quantity, 2);
        assert_eq!(order.declared_total_price, Decimal::from_str("10.00").unwrap());
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].description, "Widget");
    }

    #[test]
    fn test_order_spanning_pages() {
        let pages = [
            "Order Number: 77\nOrder Date: Shipping Method: Buyer Name: Seller Name: 05/06/2024\nQuantity Description Price Total Price\n1 Lamp $9.99 $9.99",
            "Order Number: 77\nQuantity Description Price Total Price\n2 Shade $3.00 $6.00\n3 Total $15.99",
            "Order Number: 78\nQuantity Description Price Total Price\n1 Bulb $1.50 $1.50\n1 Total $1.50",
        ];
        let result = process_pages(&pages, &ExtractionConfig::default());

        assert_eq!(result.orders.len(), 2);
        assert_eq!(result.page_count, 3);
        assert_eq!(result.item_count(), 3);

        let first = &result.orders[0];
        assert_eq!(first.order_number.as_deref(), Some("77"));
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.declared_total_quantity, 3);
        assert!(first.validate().is_empty());

        let second = &result.orders[1];
        assert_eq!(second.order_number.as_deref(), Some("78"));
        assert_eq!(second.order_date, None);
        assert_eq!(result.warnings, vec!["page 3: Could not extract order date".to_string()]);
    }

    #[test]
    fn test_validation_warnings_are_opt_in() {
        let pages = ["Order Number: 5\nOrder Date: Shipping Method: Buyer Name: Seller Name: 01/01/2024\nQuantity Description Price Total Price\n2 Cup $1.00 $2.00\n9 Total $2.00"];

        let quiet = process_pages(&pages, &ExtractionConfig::default());
        assert!(quiet.warnings.is_empty());

        let config = ExtractionConfig {
            validate_totals: true,
            ..ExtractionConfig::default()
        };
        let checked = process_pages(&pages, &config);
        assert_eq!(checked.warnings.len(), 1);
        assert!(checked.warnings[0].starts_with("page 1: Item quantities"));
    }

    #[test]
    fn test_validation_survives_huge_values() {
        let pages = [
            "Order Number: 1\nQuantity Description Price Total Price\n99999999999 Crate $99999999999999999999.00 $1.00\n1 Total $1.00",
            "Order Number: 2\nQuantity Description Price Total Price\n10000000000000000000 Box $1.00 $1.00\n10000000000000000000 Box $1.00 $1.00\n2 Total $2.00",
        ];
        let config = ExtractionConfig {
            validate_totals: true,
            ..ExtractionConfig::default()
        };

        let result = process_pages(&pages, &config);
        assert_eq!(result.item_count(), 3);
        assert!(result.warnings.iter().any(|w| w.starts_with("page 1: Item 1 (Crate)") && w.ends_with("overflows")));
        assert!(result.warnings.contains(&"page 2: Item quantity sum overflows".to_string()));
    }

    #[test]
    fn test_empty_document() {
        let pages: Vec<String> = Vec::new();
        let result = process_pages(&pages, &ExtractionConfig::default());
        assert!(result.orders.is_empty());
        assert_eq!(result.item_count(), 0);
    }

    #[test]
    fn test_parse_document_from_text_source() {
        let source = TextPageSource::from_text(&format!(
            "{}\u{c}Order Number: 999\nno item table\u{c}",
            PAGE_123
        ));
        let result = parse_document(&source, &ExtractionConfig::default()).unwrap();
        assert_eq!(result.orders.len(), 2);
        assert_eq!(result.orders[1], OrderRecord::new());
    }
}
