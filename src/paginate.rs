//! Splits line items into fixed-size printed pages.
//!
//! The first page carries the opening block (recipient, subject, greeting,
//! message) and the last page carries the closing block (totals, terms,
//! signatory). A single page does both. Row numbers run on across pages.

use tracing::debug;

use crate::model::LineItem;

/// Item rows per printed page.
pub const ROWS_PER_PAGE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a> {
    pub index: usize,
    pub items: &'a [LineItem],
    capacity: usize,
    page_count: usize,
}

impl<'a> Page<'a> {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.page_count
    }

    /// Zero-based position of a row in the whole item list.
    pub fn global_index(&self, local: usize) -> usize {
        self.index * self.capacity + local
    }

    /// Items paired with their 1-based serial numbers.
    pub fn numbered_rows(&self) -> impl Iterator<Item = (usize, &'a LineItem)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(move |(local, item)| (self.global_index(local) + 1, item))
    }
}

/// Partitions `items` into consecutive pages of at most `capacity` rows.
///
/// Always yields at least one page, so an empty quotation still prints
/// its header, table head and totals. A capacity of 0 is treated as 1.
pub fn paginate(items: &[LineItem], capacity: usize) -> Vec<Page<'_>> {
    let capacity = capacity.max(1);
    let page_count = items.len().div_ceil(capacity).max(1);

    let pages: Vec<Page<'_>> = if items.is_empty() {
        vec![Page {
            index: 0,
            items,
            capacity,
            page_count,
        }]
    } else {
        items
            .chunks(capacity)
            .enumerate()
            .map(|(index, chunk)| Page {
                index,
                items: chunk,
                capacity,
                page_count,
            })
            .collect()
    };

    debug!(items = items.len(), pages = pages.len(), capacity, "paginated items");
    pages
}
