//! In-process query cache for catalog reads
//!
//! Reads go through [`CatalogQueries`], which deduplicates concurrent
//! requests per [`QueryKey`] and serves stale data while refreshing it in
//! the background. Writes go through [`CatalogMutations`], which invalidates
//! the affected keys once the service confirms the change.

pub mod client;
pub mod key;
pub mod mutation;
pub mod query;

use std::time::Duration;

use log::warn;

use crate::config::CacheConfig;
use crate::error::ApiError;

/// Default staleness windows per resource kind
pub struct StaleTime;

impl StaleTime {
    // Listings change whenever anyone edits the catalog
    pub const PRODUCT_LIST: Duration = Duration::from_secs(5 * 60); // 5 min

    // Category set is nearly static
    pub const CATEGORIES: Duration = Duration::from_secs(10 * 60); // 10 min

    // Single products refresh on every read
    pub const PRODUCT: Duration = Duration::ZERO;

    // Unobserved entries are dropped after this long without access
    pub const GC: Duration = Duration::from_secs(5 * 60); // 5 min
}

/// How many times a read is attempted before its error is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Pause before each retry
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    #[allow(dead_code)]
    pub fn none() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Whether a failed attempt is worth repeating. A missing resource
    /// stays missing.
    fn should_retry(error: &ApiError) -> bool {
        !matches!(error, ApiError::NotFound(_))
    }

    /// Run `attempt` until it succeeds or the attempts are used up.
    pub async fn run<T, F, Fut>(&self, label: &str, mut attempt: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ApiError>>,
    {
        let attempts = self.attempts.max(1);
        let mut tried = 1;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if tried < attempts && Self::should_retry(&e) => {
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying",
                        label, tried, attempts, e
                    );
                    tried += 1;
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Staleness, eviction and retry settings for a [`QueryCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub product_list_stale: Duration,
    pub categories_stale: Duration,
    pub product_stale: Duration,
    pub gc_time: Duration,
    pub retry: RetryPolicy,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            product_list_stale: StaleTime::PRODUCT_LIST,
            categories_stale: StaleTime::CATEGORIES,
            product_stale: StaleTime::PRODUCT,
            gc_time: StaleTime::GC,
            retry: RetryPolicy::default(),
        }
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            product_list_stale: Duration::from_secs(config.product_list_stale_secs),
            categories_stale: Duration::from_secs(config.categories_stale_secs),
            product_stale: Duration::from_secs(config.product_stale_secs),
            gc_time: Duration::from_secs(config.gc_secs),
            retry: RetryPolicy {
                attempts: config.read_attempts,
                delay: config.retry_delay(),
            },
        }
    }
}

impl CachePolicy {
    /// How long a completed read of `kind` stays fresh
    pub fn stale_time(&self, kind: ResourceKind) -> Duration {
        match kind {
            ResourceKind::ProductList => self.product_list_stale,
            ResourceKind::Categories => self.categories_stale,
            ResourceKind::Product => self.product_stale,
        }
    }

    /// How long an unobserved entry of `kind` survives without access
    pub fn gc_time(&self, _kind: ResourceKind) -> Duration {
        self.gc_time
    }
}

// Re-export main types
pub use client::CatalogQueries;
pub use key::{QueryKey, ResourceKind};
pub use mutation::{CatalogMutations, MutationKind, Notification, NotificationLevel};
pub use query::{CacheStats, EntrySummary, QueryCache, QueryData, QueryState};
