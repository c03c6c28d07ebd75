//! Field extraction from a raw order block.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::order::{zero_amount, ItemRecord, OrderRecord};

use super::patterns::*;
use super::OrderExtractor;

/// Extracted order plus the fields that fell back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOrder {
    /// The extracted record.
    pub order: OrderRecord,
    /// Extraction warnings.
    pub warnings: Vec<String>,
}

/// Rule-based parser for the packing-slip layout.
#[derive(Debug, Clone, Default)]
pub struct OrderParser;

impl OrderParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one order block. Never fails; unmatched fields keep their
    /// defaults and are listed in `warnings`.
    pub fn parse(&self, text: &str) -> ParsedOrder {
        let Some(anchor) = ITEMS_ANCHOR.find(text) else {
            debug!("No item table header in {} chars of order text", text.len());
            return ParsedOrder {
                order: OrderRecord::new(),
                warnings: vec!["Could not find item table header".to_string()],
            };
        };

        let items_section = text[anchor.end()..].trim();
        let mut warnings = Vec::new();

        let order_number = ORDER_START.captures(text).map(|c| c[1].to_string());
        if order_number.is_none() {
            warnings.push("Could not extract order number".to_string());
        }

        let order_date = ORDER_DATE.captures(text).map(|c| c[1].to_string());
        if order_date.is_none() {
            warnings.push("Could not extract order date".to_string());
        }

        let items = extract_items(items_section);
        if items.is_empty() {
            warnings.push("Could not extract line items".to_string());
        }

        let declared_total_quantity = TOTAL_QUANTITY
            .captures(text)
            .and_then(|c| c[1].parse::<u64>().ok())
            .unwrap_or(0);

        let declared_total_price = TOTAL_PRICE
            .captures(text)
            .and_then(|c| Decimal::from_str(&c[1]).ok())
            .unwrap_or_else(zero_amount);

        let order = OrderRecord {
            order_number,
            order_date,
            declared_total_quantity,
            declared_total_price,
            items,
        };

        debug!(
            "Extracted order {:?} with {} items",
            order.order_number,
            order.items.len()
        );

        ParsedOrder { order, warnings }
    }
}

impl OrderExtractor for OrderParser {
    fn extract(&self, text: &str) -> OrderRecord {
        self.parse(text).order
    }
}

/// Extract every item line from an items section, in order of appearance.
pub fn extract_items(items_section: &str) -> Vec<ItemRecord> {
    anchor_free_segments(items_section)
        .flat_map(|segment| ITEM_LINE.captures_iter(segment))
        .filter_map(|caps| {
            let item = parse_item(&caps[1], &caps[2], &caps[3], &caps[4]);
            if item.is_none() {
                trace!("Dropping unparseable item line {:?}", &caps[0]);
            }
            item
        })
        .collect()
}

/// Parts of `text` between occurrences of the item table header.
///
/// An item description must never run across a table header, otherwise a
/// single match can swallow the header of a following order that was not
/// split off by the segmenter. Item lines start and end with digits and the
/// header has none, so matching inside each segment independently gives
/// exactly the matches that avoid header text.
fn anchor_free_segments(text: &str) -> impl Iterator<Item = &str> {
    ITEMS_ANCHOR.split(text)
}

fn parse_item(quantity: &str, description: &str, price: &str, total: &str) -> Option<ItemRecord> {
    Some(ItemRecord {
        quantity: quantity.parse().ok()?,
        description: normalize_description(description),
        unit_price: Decimal::from_str(price).ok()?,
        line_total_price: Decimal::from_str(total).ok()?,
    })
}

/// Collapse line breaks to single spaces and trim.
pub fn normalize_description(raw: &str) -> String {
    LINE_BREAK.replace_all(raw.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(quantity: u64, description: &str, price: &str, total: &str) -> ItemRecord {
        ItemRecord {
            quantity,
            description: description.to_string(),
            unit_price: dec(price),
            line_total_price: dec(total),
        }
    }

    const SINGLE_ORDER: &str = "\nOrder Number: 123\nOrder Date: Shipping Method: Buyer Name: Seller Name: 01/02/2023\nQuantity Description Price Total Price\n2 Widget $5.00 $10.00\n2 Total $10.00 Total";

    #[test]
    fn test_single_order() {
        let parsed = OrderParser::new().parse(SINGLE_ORDER);
        assert_eq!(
            parsed.order,
            OrderRecord {
                order_number: Some("123".to_string()),
                order_date: Some("01/02/2023".to_string()),
                declared_total_quantity: 2,
                declared_total_price: dec("10.00"),
                items: vec![item(2, "Widget", "5.00", "10.00")],
            }
        );
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let parser = OrderParser::new();
        assert_eq!(parser.extract(SINGLE_ORDER), parser.extract(SINGLE_ORDER));
    }

    #[test]
    fn test_missing_anchor_gives_defaults() {
        let text = "Order Number: 123\nOrder Date: Shipping Method: Buyer Name: Seller Name: 01/02/2023\n2 Widget $5.00 $10.00\n2 Total $10.00";
        let parsed = OrderParser::new().parse(text);
        assert_eq!(parsed.order, OrderRecord::new());
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_wrapped_description() {
        let text = "Quantity Description Price Total Price\n2 Deluxe\nWidget $5.00 $10.00";
        let order = OrderParser::new().extract(text);
        assert_eq!(order.items, vec![item(2, "Deluxe Widget", "5.00", "10.00")]);
    }

    #[test]
    fn test_multiple_items_keep_order() {
        let text = "Quantity\nDescription\nPrice\nTotal Price\n1\nBlue\nMug\n$4.50\n$4.50\n3\nRed Plate\n$2.00\n$6.00\n4\nTotal\n$10.50";
        let order = OrderParser::new().extract(text);
        assert_eq!(
            order.items,
            vec![
                item(1, "Blue Mug", "4.50", "4.50"),
                item(3, "Red Plate", "2.00", "6.00"),
            ]
        );
        assert_eq!(order.declared_total_quantity, 4);
        assert_eq!(order.declared_total_price, dec("10.50"));
    }

    #[test]
    fn test_description_never_crosses_table_header() {
        // Two orders that were not split apart: the first item line has no
        // prices before the second order's header.
        let text = "Order Number: 1\nQuantity Description Price Total Price\n5 Dangling note\nOrder Number: 2\nQuantity Description Price Total Price\n1 Lamp $9.99 $9.99";
        let order = OrderParser::new().extract(text);
        assert_eq!(order.items, vec![item(1, "Lamp", "9.99", "9.99")]);
        assert!(order
            .items
            .iter()
            .all(|i| !ITEMS_ANCHOR.is_match(&i.description)));
    }

    #[test]
    fn test_items_on_continuation_page_after_repeated_header() {
        let text = "\nOrder Number: 9\nQuantity Description Price Total Price\n1 Chair $20.00 $20.00\n\nOrder Number: 9\nQuantity Description Price Total Price\n2 Table $50.00 $100.00\n3 Total $120.00";
        let order = OrderParser::new().extract(text);
        assert_eq!(
            order.items,
            vec![
                item(1, "Chair", "20.00", "20.00"),
                item(2, "Table", "50.00", "100.00"),
            ]
        );
        assert_eq!(order.order_number.as_deref(), Some("9"));
    }

    #[test]
    fn test_missing_header_fields_default() {
        let text = "Quantity Description Price Total Price\n1 Thing $1.00 $1.00";
        let parsed = OrderParser::new().parse(text);
        assert_eq!(parsed.order.order_number, None);
        assert_eq!(parsed.order.order_date, None);
        assert_eq!(parsed.order.declared_total_quantity, 0);
        assert_eq!(parsed.order.declared_total_price, zero_amount());
        assert_eq!(parsed.order.items.len(), 1);
        assert_eq!(parsed.warnings.len(), 2);
    }

    #[test]
    fn test_item_needs_both_prices() {
        let text = "Quantity Description Price Total Price\n2 Widget $5.00\nno second price here";
        let parsed = OrderParser::new().parse(text);
        assert!(parsed.order.items.is_empty());
        assert!(parsed
            .warnings
            .contains(&"Could not extract line items".to_string()));
    }

    #[test]
    fn test_oversized_quantity_drops_item() {
        let text = "Quantity Description Price Total Price\n99999999999999999999999 Huge $1.00 $1.00\n1 Small $2.00 $2.00";
        let order = OrderParser::new().extract(text);
        assert_eq!(order.items, vec![item(1, "Small", "2.00", "2.00")]);
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("  Deluxe \n  Widget\r\n\nXL "), "Deluxe Widget XL");
        assert_eq!(normalize_description("Plain"), "Plain");
        assert_eq!(normalize_description(""), "");
    }
}
