//! Test fixtures and builders for catalog model types
//!
//! Import via `use crate::client::fixtures::*` in test modules.

#![allow(dead_code)]

use super::models::{Product, ProductFormData};

/// Builder for creating test Product instances.
///
/// # Example
/// ```ignore
/// let product = ProductBuilder::new(7)
///     .title("Mascara")
///     .category("beauty")
///     .price(9.99)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ProductBuilder {
    id: u64,
    title: String,
    description: String,
    category: String,
    price: f64,
    stock: u32,
    brand: Option<String>,
}

impl ProductBuilder {
    /// Create a new builder with the given ID.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            title: format!("Product {}", id),
            description: format!("Description of product {}", id),
            category: "misc".to_string(),
            price: 10.0,
            stock: 20,
            brand: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Build the Product.
    pub fn build(self) -> Product {
        Product {
            thumbnail: format!("https://cdn.example.com/products/{}.png", self.id),
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            price: self.price,
            stock: self.stock,
            brand: self.brand,
        }
    }
}

/// Create a minimal test product.
pub fn test_product(id: u64) -> Product {
    ProductBuilder::new(id).build()
}

/// Products 1..=count, alternating between two categories.
pub fn test_catalog(count: u64) -> Vec<Product> {
    (1..=count)
        .map(|id| {
            let category = if id % 2 == 0 { "laptops" } else { "beauty" };
            ProductBuilder::new(id).category(category).build()
        })
        .collect()
}

/// A form that passes validation.
pub fn valid_form() -> ProductFormData {
    ProductFormData {
        title: "Desk Lamp".to_string(),
        description: "Warm white LED lamp".to_string(),
        category: "home-decoration".to_string(),
        price: 24.5,
        stock: 12,
        brand: Some("Lumen".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_builder_defaults() {
        let product = test_product(3);
        assert_eq!(product.id, 3);
        assert_eq!(product.title, "Product 3");
        assert!(product.check().is_ok());
    }

    #[test]
    fn test_catalog_alternates_categories() {
        let catalog = test_catalog(4);
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog[0].category, "beauty");
        assert_eq!(catalog[1].category, "laptops");
    }

    #[test]
    fn test_valid_form_is_valid() {
        assert!(valid_form().validate().is_ok());
    }
}
