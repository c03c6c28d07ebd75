//! Grouping of per-page text into per-order blocks.
//!
//! A page opens a new order only when it carries an order number different
//! from the one currently being accumulated. Pages without a marker, and
//! pages repeating the current number, continue the current order.

use tracing::debug;

use super::patterns::ORDER_START;

/// Text of all pages belonging to one order, each page prefixed by `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOrderBlock {
    /// Concatenated page text.
    pub text: String,
    /// 1-based numbers of the pages in this block.
    pub pages: Vec<u32>,
    /// First order number seen while accumulating this block.
    pub order_number: Option<String>,
}

impl RawOrderBlock {
    /// Block text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for RawOrderBlock {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Incremental segmenter; feed pages in order, then call [`finish`].
///
/// [`finish`]: OrderSegmenter::finish
#[derive(Debug, Default)]
pub struct OrderSegmenter {
    current_text: String,
    current_pages: Vec<u32>,
    current_order_number: Option<String>,
    block_order_number: Option<String>,
    pages_seen: u32,
    blocks_emitted: usize,
}

impl OrderSegmenter {
    /// Create an empty segmenter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next page. Returns the previous order's block when this page
    /// starts a different order.
    pub fn push_page(&mut self, page: &str) -> Option<RawOrderBlock> {
        self.pages_seen += 1;
        let mut completed = None;

        if let Some(caps) = ORDER_START.captures(page) {
            let found = &caps[1];

            if let Some(current) = &self.current_order_number {
                if current != found {
                    completed = self.take_block();
                }
            }

            if self.block_order_number.is_none() {
                self.block_order_number = Some(found.to_string());
            }
            self.current_order_number = Some(found.to_string());
        }

        self.current_text.push('\n');
        self.current_text.push_str(page);
        self.current_pages.push(self.pages_seen);

        completed
    }

    /// Flush the order being accumulated, if any page was added since the
    /// last emitted block.
    pub fn finish(mut self) -> Option<RawOrderBlock> {
        self.take_block()
    }

    fn take_block(&mut self) -> Option<RawOrderBlock> {
        if self.current_text.is_empty() {
            return None;
        }

        let block = RawOrderBlock {
            text: std::mem::take(&mut self.current_text),
            pages: std::mem::take(&mut self.current_pages),
            order_number: self.block_order_number.take(),
        };

        debug!(
            "Order block {}: pages {:?}, order number {:?}",
            self.blocks_emitted, block.pages, block.order_number
        );
        self.blocks_emitted += 1;

        Some(block)
    }
}

/// Split an ordered page sequence into per-order blocks.
pub fn segment<S: AsRef<str>>(pages: &[S]) -> Vec<RawOrderBlock> {
    let mut segmenter = OrderSegmenter::new();
    let mut blocks: Vec<RawOrderBlock> = pages
        .iter()
        .filter_map(|page| segmenter.push_page(page.as_ref()))
        .collect();

    blocks.extend(segmenter.finish());
    blocks
}
