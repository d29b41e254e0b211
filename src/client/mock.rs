//! Mock catalog client for testing
//!
//! An in-memory catalog implementing [`CatalogApi`] so the cache and
//! mutation layers can be tested without HTTP. Supports per-call latency,
//! injected failures and call counting.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::models::{Product, ProductFormData, ProductPage, ProductPatch};
use super::{CatalogApi, ListParams, ListRoute};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockCatalogClient::new()
///     .with_products(test_catalog(25))
///     .await
///     .with_latency(Duration::from_millis(20));
///
/// let page = mock.list_products(&ListParams::new(10)).await?;
/// assert_eq!(page.total, 25);
/// ```
pub struct MockCatalogClient {
    /// Backing catalog
    products: Arc<Mutex<Vec<Product>>>,
    /// Categories to return from list_categories
    categories: Arc<Mutex<Vec<String>>>,
    /// Errors to return, one per call, before succeeding again
    errors: Arc<Mutex<VecDeque<ApiError>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// List parameters received, in order
    captured_lists: Arc<Mutex<Vec<ListParams>>>,
    /// Simulated service latency
    latency: Duration,
}

impl Default for MockCatalogClient {
    fn default() -> Self {
        Self {
            products: Arc::new(Mutex::new(Vec::new())),
            categories: Arc::new(Mutex::new(Vec::new())),
            errors: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
            captured_lists: Arc::new(Mutex::new(Vec::new())),
            latency: Duration::ZERO,
        }
    }
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_products: usize,
    pub get_product: usize,
    pub list_categories: usize,
    pub create_product: usize,
    pub update_product: usize,
    pub delete_product: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.list_products
            + self.get_product
            + self.list_categories
            + self.create_product
            + self.update_product
            + self.delete_product
    }
}

impl MockCatalogClient {
    /// Create a new mock client with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the backing catalog.
    pub async fn with_products(self, products: Vec<Product>) -> Self {
        *self.products.lock().await = products;
        self
    }

    /// Configure categories to return from list_categories.
    pub async fn with_categories(self, categories: Vec<&str>) -> Self {
        *self.categories.lock().await = categories.into_iter().map(String::from).collect();
        self
    }

    /// Sleep this long inside every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue an error for the next API call. Each queued error is
    /// consumed by exactly one call.
    pub async fn push_error(&self, error: ApiError) {
        self.errors.lock().await.push_back(error);
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Get all list parameters received.
    pub async fn captured_lists(&self) -> Vec<ListParams> {
        self.captured_lists.lock().await.clone()
    }

    /// Snapshot of the backing catalog.
    pub async fn products(&self) -> Vec<Product> {
        self.products.lock().await.clone()
    }

    /// Count the call, wait out the latency, then surface a queued error.
    async fn begin(&self, count: impl FnOnce(&mut CallCounts)) -> Result<()> {
        count(&mut *self.call_count.lock().await);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(e) = self.errors.lock().await.pop_front() {
            return Err(e.into());
        }
        Ok(())
    }

    fn not_found(id: u64) -> ApiError {
        ApiError::NotFound(format!("product {} (Product with id '{}' not found)", id, id))
    }
}

fn matches_search(product: &Product, q: &str) -> bool {
    let q = q.to_lowercase();
    product.title.to_lowercase().contains(&q) || product.description.to_lowercase().contains(&q)
}

#[async_trait]
impl CatalogApi for MockCatalogClient {
    async fn list_products(&self, params: &ListParams) -> Result<ProductPage> {
        self.captured_lists.lock().await.push(params.clone());
        self.begin(|c| c.list_products += 1).await?;

        let products = self.products.lock().await;
        let matching: Vec<&Product> = products
            .iter()
            .filter(|p| match params.route() {
                ListRoute::All => true,
                ListRoute::Search(q) => matches_search(p, q),
                ListRoute::Category(c) => p.category == c,
            })
            .collect();

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(params.skip as usize)
            .take(params.limit as usize)
            .cloned()
            .collect();

        Ok(ProductPage {
            products: page,
            total,
            skip: params.skip,
            limit: params.limit,
        })
    }

    async fn get_product(&self, id: u64) -> Result<Product> {
        self.begin(|c| c.get_product += 1).await?;

        let products = self.products.lock().await;
        products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id).into())
    }

    async fn list_categories(&self) -> Result<Vec<String>> {
        self.begin(|c| c.list_categories += 1).await?;
        Ok(self.categories.lock().await.clone())
    }

    async fn create_product(&self, form: &ProductFormData) -> Result<Product> {
        form.validate()?;
        self.begin(|c| c.create_product += 1).await?;

        let mut products = self.products.lock().await;
        let id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let product = Product {
            id,
            title: form.title.clone(),
            description: form.description.clone(),
            category: form.category.clone(),
            price: form.price,
            stock: form.stock as u32,
            brand: form.brand.clone(),
            thumbnail: String::new(),
        };
        products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: u64, patch: &ProductPatch) -> Result<Product> {
        patch.validate()?;
        self.begin(|c| c.update_product += 1).await?;

        let mut products = self.products.lock().await;
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Self::not_found(id))?;

        if let Some(ref title) = patch.title {
            product.title = title.clone();
        }
        if let Some(ref description) = patch.description {
            product.description = description.clone();
        }
        if let Some(ref category) = patch.category {
            product.category = category.clone();
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock as u32;
        }
        if let Some(ref brand) = patch.brand {
            product.brand = Some(brand.clone()).filter(|b| !b.is_empty());
        }

        Ok(product.clone())
    }

    async fn delete_product(&self, id: u64) -> Result<Product> {
        self.begin(|c| c.delete_product += 1).await?;

        let mut products = self.products.lock().await;
        let index = products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        Ok(products.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::test_catalog;
    use crate::error::Error;

    #[tokio::test]
    async fn test_mock_pagination() {
        let mock = MockCatalogClient::new().with_products(test_catalog(25)).await;

        let first = mock.list_products(&ListParams::new(10)).await.unwrap();
        assert_eq!(first.products.len(), 10);
        assert_eq!(first.total, 25);

        let last = mock
            .list_products(&ListParams::new(10).skip(20))
            .await
            .unwrap();
        assert_eq!(last.products.len(), 5);
        assert_eq!(last.total, 25);
    }

    #[tokio::test]
    async fn test_mock_category_filter() {
        let mock = MockCatalogClient::new().with_products(test_catalog(10)).await;

        let page = mock
            .list_products(&ListParams::new(10).category("laptops"))
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert!(page.products.iter().all(|p| p.category == "laptops"));
    }

    #[tokio::test]
    async fn test_mock_error_consumed_once() {
        let mock = MockCatalogClient::new();
        mock.push_error(ApiError::Network("down".to_string())).await;

        assert!(matches!(
            mock.list_categories().await,
            Err(Error::Api(ApiError::Network(_)))
        ));
        assert!(mock.list_categories().await.is_ok());
        assert_eq!(mock.call_counts().await.list_categories, 2);
    }

    #[tokio::test]
    async fn test_mock_delete_then_get_not_found() {
        let mock = MockCatalogClient::new().with_products(test_catalog(3)).await;

        let deleted = mock.delete_product(2).await.unwrap();
        assert_eq!(deleted.id, 2);
        assert!(matches!(
            mock.get_product(2).await,
            Err(Error::Api(ApiError::NotFound(_)))
        ));
    }
}
