//! Cached read side of the catalog API
//!
//! Routes the three catalog reads through a [`QueryCache`], one key per
//! distinct request.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;

use super::key::QueryKey;
use super::query::{Fetcher, QueryCache, QueryData, QueryState};
use crate::client::{CatalogApi, ListParams, Product, ProductPage};
use crate::error::{ApiError, Error, Result};

/// Cached reads over any [`CatalogApi`] implementation.
///
/// Clones share the same API client and cache.
#[derive(Clone)]
pub struct CatalogQueries {
    api: Arc<dyn CatalogApi>,
    cache: QueryCache,
}

impl CatalogQueries {
    pub fn new(api: Arc<dyn CatalogApi>, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    #[allow(dead_code)]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// One page of products, searched or filtered per `params`
    pub async fn products(&self, params: &ListParams) -> Result<Arc<ProductPage>> {
        let key = QueryKey::from(params);
        let data = self
            .cache
            .fetch(key.clone(), self.products_fetcher(params))
            .await?;
        data.as_page().ok_or_else(|| unexpected(&key))
    }

    pub async fn product(&self, id: u64) -> Result<Arc<Product>> {
        let key = QueryKey::Product(id);
        let data = self
            .cache
            .fetch(key.clone(), self.product_fetcher(id))
            .await?;
        data.as_product().ok_or_else(|| unexpected(&key))
    }

    pub async fn categories(&self) -> Result<Arc<Vec<String>>> {
        let key = QueryKey::Categories;
        let data = self
            .cache
            .fetch(key.clone(), self.categories_fetcher())
            .await?;
        data.as_categories().ok_or_else(|| unexpected(&key))
    }

    /// Explicit retry of a product page, bypassing freshness
    pub async fn refetch_products(&self, params: &ListParams) -> Result<Arc<ProductPage>> {
        let key = QueryKey::from(params);
        let data = self
            .cache
            .refetch_with(key.clone(), self.products_fetcher(params))
            .await?;
        data.as_page().ok_or_else(|| unexpected(&key))
    }

    /// Observe a product page. While the receiver is alive, invalidating
    /// the page refreshes it immediately.
    pub fn watch_products(&self, params: &ListParams) -> watch::Receiver<QueryState> {
        self.cache
            .subscribe_with(QueryKey::from(params), self.products_fetcher(params))
    }

    pub fn watch_product(&self, id: u64) -> watch::Receiver<QueryState> {
        self.cache
            .subscribe_with(QueryKey::Product(id), self.product_fetcher(id))
    }

    fn products_fetcher(&self, params: &ListParams) -> Fetcher {
        let api = Arc::clone(&self.api);
        let params = params.clone();
        Arc::new(move || {
            let api = Arc::clone(&api);
            let params = params.clone();
            async move {
                api.list_products(&params)
                    .await
                    .map(|page| QueryData::Page(Arc::new(page)))
                    .map_err(read_error)
            }
            .boxed()
        })
    }

    fn product_fetcher(&self, id: u64) -> Fetcher {
        let api = Arc::clone(&self.api);
        Arc::new(move || {
            let api = Arc::clone(&api);
            async move {
                api.get_product(id)
                    .await
                    .map(|product| QueryData::Product(Arc::new(product)))
                    .map_err(read_error)
            }
            .boxed()
        })
    }

    fn categories_fetcher(&self) -> Fetcher {
        let api = Arc::clone(&self.api);
        Arc::new(move || {
            let api = Arc::clone(&api);
            async move {
                api.list_categories()
                    .await
                    .map(|categories| QueryData::Categories(Arc::new(categories)))
                    .map_err(read_error)
            }
            .boxed()
        })
    }
}

/// Reads only fail with service or transport errors; anything else is
/// reported as a bad response so it can be stored on the entry.
fn read_error(err: Error) -> ApiError {
    match err {
        Error::Api(api) => api,
        other => ApiError::InvalidResponse(other.to_string()),
    }
}

fn unexpected(key: &QueryKey) -> Error {
    ApiError::InvalidResponse(format!("Cached data for {} has the wrong shape", key)).into()
}
