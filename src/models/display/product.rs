//! Product display models

use serde::Serialize;
use tabled::Tabled;

use super::common::truncate_string;
use crate::client::models::{Product, category_label, format_price};

/// One table row per product.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ProductDisplay {
    #[tabled(rename = "ID")]
    pub id: u64,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "CATEGORY")]
    pub category: String,

    #[tabled(rename = "PRICE")]
    pub price: String,

    #[tabled(rename = "STOCK")]
    pub stock: String,

    #[tabled(rename = "BRAND")]
    pub brand: String,
}

impl From<&Product> for ProductDisplay {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: truncate_string(&product.title, 40),
            category: category_label(&product.category),
            price: format_price(product.price),
            stock: product.stock_status(),
            brand: product.brand.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Labelled fields for the single-product view
pub fn product_fields(product: &Product) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("ID", product.id.to_string()),
        ("Title", product.title.clone()),
        ("Description", product.description.clone()),
        ("Category", category_label(&product.category)),
        ("Price", format_price(product.price)),
        ("Stock", product.stock_status()),
    ];
    if let Some(ref brand) = product.brand {
        fields.push(("Brand", brand.clone()));
    }
    if !product.thumbnail.is_empty() {
        fields.push(("Thumbnail", product.thumbnail.clone()));
    }
    fields
}
