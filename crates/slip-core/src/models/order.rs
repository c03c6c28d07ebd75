//! Order data models produced by the field extractor.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Format of the order date token on a packing slip.
pub const ORDER_DATE_FORMAT: &str = "%m/%d/%Y";

/// Tolerance used when comparing declared totals against item sums.
const TOTAL_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One order reconstructed from a packing slip.
///
/// Fields that could not be matched keep their documented defaults:
/// `None` for the order number and date, zero for the declared totals, and
/// an empty item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Token following `Order Number:`.
    pub order_number: Option<String>,

    /// Date token from the order header, as printed (`MM/DD/YYYY`).
    pub order_date: Option<String>,

    /// Quantity printed on the `Total` line.
    #[serde(rename = "totalQty")]
    pub declared_total_quantity: u64,

    /// Price printed after the `Total` label.
    #[serde(rename = "totalPrice")]
    pub declared_total_price: Decimal,

    /// Line items in order of appearance.
    pub items: Vec<ItemRecord>,
}

/// A single line item of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Ordered quantity.
    pub quantity: u64,

    /// Item description with line breaks collapsed to single spaces.
    pub description: String,

    /// Unit price.
    #[serde(rename = "price")]
    pub unit_price: Decimal,

    /// Line total.
    #[serde(rename = "totalPrice")]
    pub line_total_price: Decimal,
}

impl OrderRecord {
    /// Create an order record with every field at its default.
    pub fn new() -> Self {
        Self {
            order_number: None,
            order_date: None,
            declared_total_quantity: 0,
            declared_total_price: zero_amount(),
            items: Vec::new(),
        }
    }

    /// Interpret the order date as `MM/DD/YYYY`.
    ///
    /// The stored string is positional only; a token that is not a valid
    /// calendar date in that order yields `None`.
    pub fn parsed_order_date(&self) -> Option<NaiveDate> {
        self.order_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, ORDER_DATE_FORMAT).ok())
    }

    /// Sum of item quantities, or `None` if it does not fit in a `u64`.
    pub fn item_quantity(&self) -> Option<u64> {
        self.items
            .iter()
            .try_fold(0u64, |acc, i| acc.checked_add(i.quantity))
    }

    /// Sum of item line totals, or `None` if it overflows a `Decimal`.
    pub fn item_total(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |acc, i| acc.checked_add(i.line_total_price))
    }

    /// Check the extracted values against each other and return any issues.
    ///
    /// Nothing is corrected. Comparisons against a declared total are skipped
    /// when that total was not found on the slip. Sums or products too large
    /// to compute are reported as issues.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.declared_total_quantity != 0 {
            match self.item_quantity() {
                Some(counted) if counted != self.declared_total_quantity => {
                    issues.push(format!(
                        "Item quantities ({}) differ from declared total quantity ({})",
                        counted, self.declared_total_quantity
                    ));
                }
                Some(_) => {}
                None => issues.push("Item quantity sum overflows".to_string()),
            }
        }

        if !self.declared_total_price.is_zero() {
            match self.item_total() {
                // Both sides are non-negative, so the difference cannot overflow
                Some(summed) if (summed - self.declared_total_price).abs() > TOTAL_TOLERANCE => {
                    issues.push(format!(
                        "Item totals ({}) differ from declared total price ({})",
                        summed, self.declared_total_price
                    ));
                }
                Some(_) => {}
                None => issues.push("Item price sum overflows".to_string()),
            }
        }

        for (idx, item) in self.items.iter().enumerate() {
            let Some(expected) = item.unit_price.checked_mul(Decimal::from(item.quantity)) else {
                issues.push(format!(
                    "Item {} ({}): {} x {} overflows",
                    idx + 1,
                    item.description,
                    item.quantity,
                    item.unit_price
                ));
                continue;
            };
            if (expected - item.line_total_price).abs() > TOTAL_TOLERANCE {
                issues.push(format!(
                    "Item {} ({}): {} x {} = {}, slip shows {}",
                    idx + 1,
                    item.description,
                    item.quantity,
                    item.unit_price,
                    expected,
                    item.line_total_price
                ));
            }
        }

        issues
    }
}

impl Default for OrderRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero with two fractional digits, the default for unmatched prices.
pub fn zero_amount() -> Decimal {
    Decimal::new(0, 2)
}
