//! Product, form and patch models

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, ValidationError};

/// Catalog product as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID (assigned by the service)
    pub id: u64,

    /// Product title
    pub title: String,

    /// Long description
    #[serde(default)]
    pub description: String,

    /// Category slug
    #[serde(default)]
    pub category: String,

    /// Unit price in US dollars
    #[serde(default)]
    pub price: f64,

    /// Units in stock
    #[serde(default)]
    pub stock: u32,

    /// Brand name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Thumbnail image URL
    #[serde(default)]
    pub thumbnail: String,
}

impl Product {
    /// Check invariants serde cannot express.
    pub fn check(&self) -> std::result::Result<(), String> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("product {} has invalid price {}", self.id, self.price));
        }
        Ok(())
    }

    /// Stock label shown in listings
    pub fn stock_status(&self) -> String {
        match self.stock {
            0 => "Out of Stock".to_string(),
            n if n < 10 => format!("Low Stock ({})", n),
            n => format!("In Stock ({})", n),
        }
    }
}

/// Editable product fields, used for create and as the base of an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFormData {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl Default for ProductFormData {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: String::new(),
            price: 0.0,
            stock: 0,
            brand: None,
        }
    }
}

impl From<&Product> for ProductFormData {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price,
            stock: i64::from(product.stock),
            brand: product.brand.clone(),
        }
    }
}

impl ProductFormData {
    /// Validate every field, reporting all violations at once.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut fields = Vec::new();
        check_required(&mut fields, "title", &self.title, "Title is required");
        check_required(
            &mut fields,
            "description",
            &self.description,
            "Description is required",
        );
        check_required(&mut fields, "category", &self.category, "Category is required");
        check_price(&mut fields, self.price);
        check_stock(&mut fields, self.stock);

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { fields })
        }
    }

    /// Fields of `self` that differ from `original`.
    pub fn changes_from(&self, original: &Product) -> ProductPatch {
        let mut patch = ProductPatch::default();

        if self.title != original.title {
            patch.title = Some(self.title.clone());
        }
        if self.description != original.description {
            patch.description = Some(self.description.clone());
        }
        if self.category != original.category {
            patch.category = Some(self.category.clone());
        }
        if self.price != original.price {
            patch.price = Some(self.price);
        }
        if self.stock != i64::from(original.stock) {
            patch.stock = Some(self.stock);
        }
        let brand = normalize_brand(self.brand.as_deref());
        if brand != normalize_brand(original.brand.as_deref()) {
            patch.brand = Some(brand.unwrap_or_default());
        }

        patch
    }

    /// Set the brand, treating blank input as "no brand"
    pub fn set_brand(&mut self, brand: &str) {
        self.brand = normalize_brand(Some(brand));
    }
}

/// Partial update body; absent fields are left untouched by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.brand.is_none()
    }

    /// Names of the fields carried by this patch
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.title.is_some() {
            names.push("title");
        }
        if self.description.is_some() {
            names.push("description");
        }
        if self.category.is_some() {
            names.push("category");
        }
        if self.price.is_some() {
            names.push("price");
        }
        if self.stock.is_some() {
            names.push("stock");
        }
        if self.brand.is_some() {
            names.push("brand");
        }
        names
    }

    /// Validate the fields present in the patch. An empty patch is rejected.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::single("form", "No changes to submit"));
        }

        let mut fields = Vec::new();
        if let Some(ref title) = self.title {
            check_required(&mut fields, "title", title, "Title is required");
        }
        if let Some(ref description) = self.description {
            check_required(
                &mut fields,
                "description",
                description,
                "Description is required",
            );
        }
        if let Some(ref category) = self.category {
            check_required(&mut fields, "category", category, "Category is required");
        }
        if let Some(price) = self.price {
            check_price(&mut fields, price);
        }
        if let Some(stock) = self.stock {
            check_stock(&mut fields, stock);
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { fields })
        }
    }
}

fn check_required(fields: &mut Vec<FieldError>, name: &'static str, value: &str, msg: &str) {
    if value.trim().is_empty() {
        fields.push(FieldError::new(name, msg));
    }
}

fn check_price(fields: &mut Vec<FieldError>, price: f64) {
    if !price.is_finite() || price < 0.0 {
        fields.push(FieldError::new("price", "Price must be positive"));
    }
}

fn check_stock(fields: &mut Vec<FieldError>, stock: i64) {
    if stock < 0 {
        fields.push(FieldError::new("stock", "Stock must be positive"));
    } else if stock > i64::from(u32::MAX) {
        fields.push(FieldError::new("stock", "Stock is too large"));
    }
}

fn normalize_brand(brand: Option<&str>) -> Option<String> {
    brand
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
}

/// Format a price as US dollars, e.g. `$1,234.50`
pub fn format_price(price: f64) -> String {
    let cents = (price * 100.0).round() as i64;
    let negative = cents < 0;
    let cents = cents.abs();
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents % 100
    )
}
