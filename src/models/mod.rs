//! Display models for CLI output

pub mod display;

pub use display::{
    CacheEntryDisplay, CachePolicyDisplay, CategoryDisplay, ProductDisplay, product_fields,
};
