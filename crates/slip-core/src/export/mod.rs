//! Flat tabular export of extracted orders.
//!
//! Each (order, item) pair becomes one row of eight fields. Orders without
//! items produce no rows, so their header data does not appear in the
//! export.
//!
//! Fields are written as-is, separated by commas, with no quoting. A
//! description that contains a comma therefore shifts the following columns
//! for that row. Consumers relying on this format must not be broken by a
//! change to RFC 4180 quoting, so the behaviour is kept.

use std::io;

use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Result;
use crate::models::order::{ItemRecord, OrderRecord};

/// Fixed header row of the export.
pub const EXPORT_HEADER: [&str; 8] = [
    "order.orderNumber",
    "order.orderDate",
    "order.totalQty",
    "order.totalPrice",
    "item.quantity",
    "item.description",
    "item.price",
    "item.totalPrice",
];

/// Default prefix of suggested export file names.
pub const DEFAULT_FILE_PREFIX: &str = "parsedPackingSlip";

/// One flattened (order header, item) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub order_number: Option<String>,
    pub order_date: Option<String>,
    pub total_quantity: u64,
    pub total_price: Decimal,
    pub quantity: u64,
    pub description: String,
    pub unit_price: Decimal,
    pub line_total_price: Decimal,
}

impl ExportRow {
    fn new(order: &OrderRecord, item: &ItemRecord) -> Self {
        Self {
            order_number: order.order_number.clone(),
            order_date: order.order_date.clone(),
            total_quantity: order.declared_total_quantity,
            total_price: order.declared_total_price,
            quantity: item.quantity,
            description: item.description.clone(),
            unit_price: item.unit_price,
            line_total_price: item.line_total_price,
        }
    }

    /// Field values in header order; missing values are empty strings.
    pub fn fields(&self) -> [String; 8] {
        [
            self.order_number.clone().unwrap_or_default(),
            self.order_date.clone().unwrap_or_default(),
            self.total_quantity.to_string(),
            self.total_price.to_string(),
            self.quantity.to_string(),
            self.description.clone(),
            self.unit_price.to_string(),
            self.line_total_price.to_string(),
        ]
    }
}

/// Flatten orders into rows, orders first, then items, both in stored order.
pub fn to_rows(orders: &[OrderRecord]) -> Vec<ExportRow> {
    orders
        .iter()
        .flat_map(|order| order.items.iter().map(move |item| ExportRow::new(order, item)))
        .collect()
}

/// Write the header and one line per row.
pub fn write_delimited<W: io::Write>(writer: W, orders: &[OrderRecord]) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(EXPORT_HEADER)?;
    for row in to_rows(orders) {
        wtr.write_record(row.fields())?;
    }

    wtr.flush()?;
    Ok(())
}

/// Render the export into a string.
pub fn to_delimited_string(orders: &[OrderRecord]) -> Result<String> {
    let mut buf = Vec::new();
    write_delimited(&mut buf, orders)?;
    // Every field came from a &str or a number
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// File name for an export created at `timestamp`.
pub fn suggested_filename(prefix: &str, timestamp: DateTime<Utc>) -> String {
    format!("{}-{}.csv", prefix, timestamp.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

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

    fn orders() -> Vec<OrderRecord> {
        vec![
            OrderRecord {
                order_number: Some("123".to_string()),
                order_date: Some("01/02/2023".to_string()),
                declared_total_quantity: 3,
                declared_total_price: dec("12.50"),
                items: vec![
                    item(2, "Widget", "5.00", "10.00"),
                    item(1, "Gadget", "2.50", "2.50"),
                ],
            },
            OrderRecord {
                order_number: Some("456".to_string()),
                ..OrderRecord::new()
            },
            OrderRecord {
                items: vec![item(4, "Bolt", "0.25", "1.00")],
                ..OrderRecord::new()
            },
        ]
    }

    #[test]
    fn test_row_count_is_item_count() {
        let orders = orders();
        let rows = to_rows(&orders);
        let expected: usize = orders.iter().map(|o| o.items.len()).sum();
        assert_eq!(rows.len(), expected);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_rows_follow_order_then_item() {
        let rows = to_rows(&orders());
        let descriptions: Vec<&str> = rows.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Widget", "Gadget", "Bolt"]);
        assert_eq!(rows[0].order_number.as_deref(), Some("123"));
        assert_eq!(rows[2].order_number, None);
    }

    #[test]
    fn test_delimited_output() {
        let out = to_delimited_string(&orders()).unwrap();
        assert_eq!(
            out,
            "order.orderNumber,order.orderDate,order.totalQty,order.totalPrice,item.quantity,item.description,item.price,item.totalPrice\n\
             123,01/02/2023,3,12.50,2,Widget,5.00,10.00\n\
             123,01/02/2023,3,12.50,1,Gadget,2.50,2.50\n\
             ,,0,0.00,4,Bolt,0.25,1.00\n"
        );
    }

    #[test]
    fn test_empty_orders_give_header_only() {
        let out = to_delimited_string(&[]).unwrap();
        assert_eq!(out, format!("{}\n", EXPORT_HEADER.join(",")));
    }

    #[test]
    fn test_commas_are_not_escaped() {
        let order = OrderRecord {
            items: vec![item(1, "Bolts, assorted", "3.00", "3.00")],
            ..OrderRecord::new()
        };
        let out = to_delimited_string(&[order]).unwrap();
        let row = out.lines().nth(1).unwrap();
        assert_eq!(row, ",,0,0.00,1,Bolts, assorted,3.00,3.00");
        assert_eq!(row.split(',').count(), 9);
    }

    #[test]
    fn test_suggested_filename() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            suggested_filename(DEFAULT_FILE_PREFIX, ts),
            "parsedPackingSlip-1709294400000.csv"
        );
    }
}
