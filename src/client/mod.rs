//! Remote catalog API client

use async_trait::async_trait;

use crate::error::Result;

pub mod catalog;
#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;

pub use catalog::CatalogClient;
#[cfg(test)]
pub use mock::MockCatalogClient;
pub use models::{Product, ProductFormData, ProductPage, ProductPatch};
pub use pagination::{DEFAULT_PAGE_SIZE, ListParams, ListRoute};

/// Operations offered by the remote catalog service.
///
/// None of these retry on their own; retry policy belongs to the caller.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// List, search or filter products (see [`ListParams::route`])
    async fn list_products(&self, params: &ListParams) -> Result<ProductPage>;

    /// Fetch a single product; `ApiError::NotFound` if it does not exist
    async fn get_product(&self, id: u64) -> Result<Product>;

    /// Category slugs for filter and form selection
    async fn list_categories(&self) -> Result<Vec<String>>;

    /// Validate and create a product, returning it with its new ID
    async fn create_product(&self, form: &ProductFormData) -> Result<Product>;

    /// Send only the changed fields of a product
    async fn update_product(&self, id: u64, patch: &ProductPatch) -> Result<Product>;

    /// Delete a product, returning its last-known representation
    async fn delete_product(&self, id: u64) -> Result<Product>;
}
