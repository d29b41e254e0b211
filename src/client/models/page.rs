//! Paginated product list response and page navigation

use serde::{Deserialize, Serialize};

use super::Product;

/// One page of products from a list, search or category endpoint.
///
/// All four fields are required; a response missing any of them is
/// rejected when decoding rather than defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    /// Products on this page
    pub products: Vec<Product>,

    /// Total products matching the query across all pages
    pub total: u64,

    /// Offset of the first product on this page
    pub skip: u64,

    /// Page size that was applied
    pub limit: u64,
}

impl ProductPage {
    fn page_size(&self) -> u64 {
        self.limit.max(1)
    }

    /// Number of pages needed to show `total` products
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size())
    }

    /// 1-based page number of this page
    pub fn current_page(&self) -> u64 {
        (self.skip / self.page_size()).saturating_add(1)
    }

    pub fn has_next(&self) -> bool {
        self.current_page() < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.skip > 0
    }

    /// "Showing 11 to 20 of 25 products"
    pub fn range_label(&self) -> String {
        if self.total == 0 {
            return "No products found".to_string();
        }
        let first = self.skip.saturating_add(1);
        let last = self.skip.saturating_add(self.page_size()).min(self.total);
        format!("Showing {} to {} of {} products", first, last, self.total)
    }
}

/// Page position within a product listing (1-based page numbers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub page: u64,
    pub limit: u64,
}

impl PageCursor {
    pub fn new(limit: u64) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
        }
    }

    /// Cursor positioned at a given 1-based page
    pub fn at(limit: u64, page: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Offset sent to the service
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Advance one page, clamped to `total_pages`
    pub fn next(&mut self, total_pages: u64) {
        self.page = self.page.saturating_add(1).min(total_pages.max(1));
    }

    pub fn previous(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Back to the first page (after a search or filter change)
    pub fn reset(&mut self) {
        self.page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(count: usize, total: u64, skip: u64, limit: u64) -> ProductPage {
        let products = (0..count)
            .map(|i| Product {
                id: skip + i as u64 + 1,
                title: format!("Product {}", skip + i as u64 + 1),
                description: String::new(),
                category: "misc".to_string(),
                price: 1.0,
                stock: 1,
                brand: None,
                thumbnail: String::new(),
            })
            .collect();
        ProductPage {
            products,
            total,
            skip,
            limit,
        }
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(page(10, 25, 0, 10).total_pages(), 3);
        assert_eq!(page(10, 30, 0, 10).total_pages(), 3);
        assert_eq!(page(0, 0, 0, 10).total_pages(), 0);
        assert_eq!(page(1, 1, 0, 0).total_pages(), 1);
    }

    #[test]
    fn test_navigation_flags() {
        let first = page(10, 25, 0, 10);
        assert_eq!(first.current_page(), 1);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = page(5, 25, 20, 10);
        assert_eq!(last.current_page(), 3);
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn test_range_label() {
        assert_eq!(
            page(5, 25, 20, 10).range_label(),
            "Showing 21 to 25 of 25 products"
        );
        assert_eq!(page(0, 0, 0, 10).range_label(), "No products found");
    }

    #[test]
    fn test_missing_total_is_rejected() {
        let result: std::result::Result<ProductPage, _> =
            serde_json::from_str(r#"{"products": [], "skip": 0, "limit": 10}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_cursor_movement() {
        let mut cursor = PageCursor::new(10);
        assert_eq!(cursor.skip(), 0);

        cursor.next(3);
        cursor.next(3);
        cursor.next(3);
        assert_eq!(cursor.page, 3);
        assert_eq!(cursor.skip(), 20);

        cursor.previous();
        assert_eq!(cursor.page, 2);

        cursor.reset();
        cursor.previous();
        assert_eq!(cursor.page, 1);
    }

    #[test]
    fn test_cursor_next_with_no_pages() {
        let mut cursor = PageCursor::new(10);
        cursor.next(0);
        assert_eq!(cursor.page, 1);
    }

    #[test]
    fn test_cursor_far_page_saturates() {
        let mut cursor = PageCursor::at(10, u64::MAX);
        assert_eq!(cursor.skip(), u64::MAX);

        cursor.next(u64::MAX);
        assert_eq!(cursor.page, u64::MAX);
    }

    #[test]
    fn test_range_label_near_offset_limit() {
        let last = page(0, u64::MAX, u64::MAX - 1, 10);
        assert_eq!(
            last.range_label(),
            format!("Showing {} to {} of {} products", u64::MAX, u64::MAX, u64::MAX)
        );
        assert_eq!(page(0, 5, u64::MAX, 10).current_page(), u64::MAX / 10 + 1);
    }
}
