//! Display model implementations for table and JSON output
//!
//! Display models transform catalog and cache types into CLI-friendly
//! formats with column names and serialization.

mod cache;
mod category;
mod common;
mod product;

pub use cache::{CacheEntryDisplay, CachePolicyDisplay};
pub use category::CategoryDisplay;
pub use product::{ProductDisplay, product_fields};
