//! Catalog writes and the cache invalidation that follows them
//!
//! A write is sent once. Only after the service confirms it are the
//! affected keys marked stale; failures leave the cache untouched and are
//! handed back to the caller together with whatever it submitted.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use serde::Serialize;

use super::key::{QueryKey, ResourceKind};
use super::query::QueryCache;
use crate::client::{CatalogApi, Product, ProductFormData, ProductPatch};
use crate::error::{Error, Result};

/// The three catalog writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    fn index(self) -> usize {
        match self {
            MutationKind::Create => 0,
            MutationKind::Update => 1,
            MutationKind::Delete => 2,
        }
    }

    /// Past-tense verb used in notifications
    pub fn past_tense(self) -> &'static str {
        match self {
            MutationKind::Create => "added",
            MutationKind::Update => "updated",
            MutationKind::Delete => "deleted",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Decrements the pending counter when the write finishes, fails, or is
/// dropped mid-flight.
struct PendingGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> PendingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Writes to the catalog, invalidating cached reads on success.
#[derive(Clone)]
pub struct CatalogMutations {
    api: Arc<dyn CatalogApi>,
    cache: QueryCache,
    pending: Arc<[AtomicUsize; 3]>,
}

impl CatalogMutations {
    pub fn new(api: Arc<dyn CatalogApi>, cache: QueryCache) -> Self {
        Self {
            api,
            cache,
            pending: Arc::new([AtomicUsize::new(0), AtomicUsize::new(0), AtomicUsize::new(0)]),
        }
    }

    /// Whether a write of `kind` is currently running
    #[allow(dead_code)]
    pub fn is_pending(&self, kind: MutationKind) -> bool {
        self.pending[kind.index()].load(Ordering::SeqCst) > 0
    }

    /// Create a product. Every cached listing may now be missing it.
    pub async fn create(&self, form: &ProductFormData) -> Result<Product> {
        let _guard = PendingGuard::enter(&self.pending[MutationKind::Create.index()]);

        let product = self.api.create_product(form).await?;
        debug!("Created product {}", product.id);
        self.invalidate_lists();
        Ok(product)
    }

    /// Send changed fields of product `id`. Listings and the product itself
    /// go stale.
    pub async fn update(&self, id: u64, patch: &ProductPatch) -> Result<Product> {
        let _guard = PendingGuard::enter(&self.pending[MutationKind::Update.index()]);

        let product = self.api.update_product(id, patch).await?;
        debug!("Updated product {} ({})", id, patch.changed_fields().join(", "));
        self.invalidate_lists();
        self.cache.invalidate_key(&QueryKey::Product(id));
        Ok(product)
    }

    /// Delete product `id`. Listings go stale and the product's own entry
    /// is dropped.
    pub async fn delete(&self, id: u64) -> Result<Product> {
        let _guard = PendingGuard::enter(&self.pending[MutationKind::Delete.index()]);

        let product = self.api.delete_product(id).await?;
        debug!("Deleted product {}", id);
        self.invalidate_lists();
        self.cache.remove(&QueryKey::Product(id));
        Ok(product)
    }

    // Any page may shift after a write, so every listing is refreshed
    // rather than just the pages that held the product.
    fn invalidate_lists(&self) {
        self.cache.invalidate_kind(ResourceKind::ProductList);
    }
}

/// Severity of a [`Notification`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient message shown after a write completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(kind: MutationKind) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: "Success".to_string(),
            description: format!("Product {} successfully", kind.past_tense()),
        }
    }

    pub fn failure(error: &Error) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: "Error".to_string(),
            description: error.to_string(),
        }
    }

    /// Notification for a finished write. Validation failures get none;
    /// they belong next to the offending fields.
    pub fn for_result<T>(kind: MutationKind, result: &Result<T>) -> Option<Self> {
        match result {
            Ok(_) => Some(Self::success(kind)),
            Err(Error::Validation(_)) => None,
            Err(e) => Some(Self::failure(e)),
        }
    }
}
