//! Catalog API data models
//!
//! Domain types exchanged with the catalog service, validated at the
//! client boundary.

mod category;
mod page;
mod product;

pub use category::{CategoryRecord, category_label, normalize_categories};
pub use page::{PageCursor, ProductPage};
pub use product::{Product, ProductFormData, ProductPatch, format_price};
