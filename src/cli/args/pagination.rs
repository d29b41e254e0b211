//! Product list argument types

use clap::Args;

use crate::client::ListParams;
use crate::client::models::PageCursor;

/// Paging and filtering arguments for `product list`.
#[derive(Args, Debug, Default, Clone)]
pub struct ListArgs {
    /// Products per page (defaults to the configured page size)
    #[arg(long, short = 'n')]
    pub limit: Option<u64>,

    /// Page number (1-indexed)
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: u64,

    /// Free-text search over titles and descriptions
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Category slug filter (ignored when --search is given)
    #[arg(long, short = 'c')]
    pub category: Option<String>,
}

impl ListArgs {
    /// Convert CLI args to list parameters.
    pub fn to_params(&self, default_limit: u64) -> ListParams {
        let cursor = PageCursor::at(self.limit.unwrap_or(default_limit), self.page);
        let mut params = ListParams::new(cursor.limit).skip(cursor.skip());

        if let Some(ref search) = self.search {
            params = params.search(search.trim());
        }
        if let Some(ref category) = self.category {
            params = params.category(category.trim());
        }
        params
    }
}
