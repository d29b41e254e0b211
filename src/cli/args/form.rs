//! Product form arguments for `product create` and `product update`

use clap::Args;

use crate::client::ProductFormData;

/// Every field of a new product. Values are checked by form validation,
/// not by the argument parser, so the messages match the interactive form.
#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Product title
    #[arg(long)]
    pub title: String,

    /// Product description
    #[arg(long)]
    pub description: String,

    /// Category slug (see `category list`)
    #[arg(long)]
    pub category: String,

    /// Price in US dollars
    #[arg(long, allow_negative_numbers = true)]
    pub price: f64,

    /// Units in stock
    #[arg(long, allow_negative_numbers = true)]
    pub stock: i64,

    /// Brand name
    #[arg(long)]
    pub brand: Option<String>,
}

impl CreateArgs {
    pub fn to_form(&self) -> ProductFormData {
        let mut form = ProductFormData {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            price: self.price,
            stock: self.stock,
            brand: None,
        };
        if let Some(ref brand) = self.brand {
            form.set_brand(brand);
        }
        form
    }
}

/// Fields to change on an existing product. Omitted flags keep the current
/// value; `--brand ""` clears the brand.
#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub price: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub stock: Option<i64>,

    #[arg(long)]
    pub brand: Option<String>,
}

impl UpdateArgs {
    /// Apply the given flags on top of a form prefilled from the product.
    pub fn apply(&self, form: &mut ProductFormData) {
        if let Some(ref title) = self.title {
            form.title = title.clone();
        }
        if let Some(ref description) = self.description {
            form.description = description.clone();
        }
        if let Some(ref category) = self.category {
            form.category = category.clone();
        }
        if let Some(price) = self.price {
            form.price = price;
        }
        if let Some(stock) = self.stock {
            form.stock = stock;
        }
        if let Some(ref brand) = self.brand {
            form.set_brand(brand);
        }
    }
}
