//! Product list parameters and endpoint routing
//!
//! A product listing is described by page size, offset, free-text search
//! and category filter. The combination picks one of three endpoints.

use serde::Serialize;

/// Default number of products per page
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Parameters for a product list request.
///
/// Use the builder methods to configure:
/// ```ignore
/// let params = ListParams::new(10).skip(20).search("phone");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ListParams {
    /// Products per page
    pub limit: u64,
    /// Offset of the first product
    pub skip: u64,
    /// Free-text search; takes precedence over `category`
    pub search: String,
    /// Category slug filter
    pub category: String,
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Endpoint a list request is sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRoute<'a> {
    /// `/products`
    All,
    /// `/products/search?q=`
    Search(&'a str),
    /// `/products/category/{category}`
    Category(&'a str),
}

impl ListParams {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            skip: 0,
            search: String::new(),
            category: String::new(),
        }
    }

    /// Set the offset.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Set the search text.
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Set the category filter.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Search wins over category; category wins over the plain listing.
    pub fn route(&self) -> ListRoute<'_> {
        if !self.search.is_empty() {
            ListRoute::Search(&self.search)
        } else if !self.category.is_empty() {
            ListRoute::Category(&self.category)
        } else {
            ListRoute::All
        }
    }

    /// Query string pairs for the request, `delay` included.
    pub fn to_query_params(&self, delay_ms: u64) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);

        if let ListRoute::Search(q) = self.route() {
            params.push(("q", q.to_string()));
        }
        params.push(("limit", self.limit.to_string()));
        params.push(("skip", self.skip.to_string()));
        params.push(("delay", delay_ms.to_string()));

        params
    }

    /// Whether any filter narrows the listing
    pub fn is_filtered(&self) -> bool {
        !self.search.is_empty() || !self.category.is_empty()
    }
}
