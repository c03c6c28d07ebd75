//! Fixed text patterns of the packing-slip layout.
//!
//! Digits are matched as ASCII so every captured number parses.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Order-start marker; the token after the label identifies the order
    pub static ref ORDER_START: Regex = Regex::new(
        r"Order Number:\s*(\S+)"
    ).unwrap();

    // Header of the item table; everything after it is the items section
    pub static ref ITEMS_ANCHOR: Regex = Regex::new(
        r"Quantity\s+Description\s+Price\s+Total Price"
    ).unwrap();

    // The header labels are printed in one run, the values follow them
    pub static ref ORDER_DATE: Regex = Regex::new(
        r"Order Date:\s*Shipping Method:\s*Buyer Name:\s*Seller Name:\s*([0-9]{2}/[0-9]{2}/[0-9]{4})"
    ).unwrap();

    // quantity, description (lazy, may wrap lines), unit price, line total.
    // Must only be run on text that contains no ITEMS_ANCHOR; see
    // `parser::anchor_free_segments`.
    pub static ref ITEM_LINE: Regex = Regex::new(
        r"([0-9]+)\s+((?s:.)*?)\s*\$([0-9]+\.[0-9]{2})\s*\$([0-9]+\.[0-9]{2})"
    ).unwrap();

    pub static ref TOTAL_QUANTITY: Regex = Regex::new(
        r"([0-9]+)\s+Total"
    ).unwrap();

    pub static ref TOTAL_PRICE: Regex = Regex::new(
        r"Total\s+\$([0-9]+\.[0-9]{2})"
    ).unwrap();

    // Line breaks (and the whitespace around them) inside a description
    pub static ref LINE_BREAK: Regex = Regex::new(
        r"[ \t]*(?:\r\n|\r|\n)\s*"
    ).unwrap();
}
