//! Keyed query cache with request deduplication
//!
//! Each [`QueryKey`] owns one entry holding its last result, the time it was
//! fetched, its last error, and at most one in-flight request. Consumers
//! that ask for the same key while a request is running join that request
//! instead of issuing another.
//!
//! In-flight requests run on spawned tasks. A consumer that stops awaiting
//! (or an observer that drops its receiver) never cancels the request; the
//! result still lands in the cache for whoever asks next.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::debug;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;

use super::CachePolicy;
use super::key::{QueryKey, ResourceKind};
use crate::client::{Product, ProductPage};
use crate::error::ApiError;

/// Result of one read, as stored in the cache and shared between consumers
pub type FetchResult = Result<QueryData, ApiError>;

/// Issues the request behind a key. Stored on the entry so invalidation and
/// explicit refetches can repeat it.
pub type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchResult> + Send + Sync>;

type InFlight = Shared<BoxFuture<'static, FetchResult>>;

/// Payload of a successful read
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Page(Arc<ProductPage>),
    Product(Arc<Product>),
    Categories(Arc<Vec<String>>),
}

impl QueryData {
    pub fn as_page(&self) -> Option<Arc<ProductPage>> {
        match self {
            QueryData::Page(page) => Some(Arc::clone(page)),
            _ => None,
        }
    }

    pub fn as_product(&self) -> Option<Arc<Product>> {
        match self {
            QueryData::Product(product) => Some(Arc::clone(product)),
            _ => None,
        }
    }

    pub fn as_categories(&self) -> Option<Arc<Vec<String>>> {
        match self {
            QueryData::Categories(categories) => Some(Arc::clone(categories)),
            _ => None,
        }
    }
}

/// What an observer of a key sees.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    /// No data yet
    Loading,
    /// Data present; it may be stale and a refresh may be running
    Success {
        data: QueryData,
        is_stale: bool,
        is_fetching: bool,
    },
    /// The last attempt failed; `previous` is the last good value, if any
    Error {
        error: ApiError,
        previous: Option<QueryData>,
    },
}

impl QueryState {
    /// Data to render, including the last good value behind an error
    pub fn data(&self) -> Option<&QueryData> {
        match self {
            QueryState::Loading => None,
            QueryState::Success { data, .. } => Some(data),
            QueryState::Error { previous, .. } => previous.as_ref(),
        }
    }

    #[allow(dead_code)]
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self, QueryState::Success { is_fetching: true, .. })
    }

    #[allow(dead_code)]
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            QueryState::Error { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Counts over all entries, for `cache status`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total: usize,
    pub fresh: usize,
    pub stale: usize,
    pub fetching: usize,
    pub errored: usize,
}

/// One entry as shown by `cache status`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySummary {
    pub key: String,
    pub kind: ResourceKind,
    pub status: &'static str,
    pub age: Option<Duration>,
    pub fetching: bool,
    pub observers: usize,
    pub error: Option<String>,
}

struct Pending {
    id: u64,
    /// Invalidation epoch when the request started
    epoch: u64,
    future: InFlight,
}

struct Entry {
    data: Option<QueryData>,
    updated_at: Option<Instant>,
    error: Option<ApiError>,
    invalidated: bool,
    epoch: u64,
    pending: Option<Pending>,
    fetcher: Option<Fetcher>,
    last_access: Instant,
    state: watch::Sender<QueryState>,
}

impl Entry {
    fn new(now: Instant) -> Self {
        let (state, _) = watch::channel(QueryState::Loading);
        Self {
            data: None,
            updated_at: None,
            error: None,
            invalidated: false,
            epoch: 0,
            pending: None,
            fetcher: None,
            last_access: now,
            state,
        }
    }

    fn is_stale(&self, now: Instant, stale_time: Duration) -> bool {
        if self.invalidated {
            return true;
        }
        match self.updated_at {
            Some(at) => now.saturating_duration_since(at) >= stale_time,
            None => true,
        }
    }

    fn is_observed(&self) -> bool {
        self.state.receiver_count() > 0
    }

    fn snapshot(&self, now: Instant, stale_time: Duration) -> QueryState {
        match (&self.data, &self.error) {
            (previous, Some(error)) => QueryState::Error {
                error: error.clone(),
                previous: previous.clone(),
            },
            (Some(data), None) => QueryState::Success {
                data: data.clone(),
                is_stale: self.is_stale(now, stale_time),
                is_fetching: self.pending.is_some(),
            },
            (None, None) => QueryState::Loading,
        }
    }

    fn publish(&self, now: Instant, stale_time: Duration) {
        // Replaces the value even with no receivers, so late subscribers
        // start from the current state.
        self.state.send_replace(self.snapshot(now, stale_time));
    }

    fn status(&self, now: Instant, stale_time: Duration) -> &'static str {
        if self.error.is_some() {
            "error"
        } else if self.data.is_none() {
            "loading"
        } else if self.is_stale(now, stale_time) {
            "stale"
        } else {
            "fresh"
        }
    }
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    policy: CachePolicy,
    next_request: AtomicU64,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        // Entries stay consistent between statements, so a panic elsewhere
        // does not leave the map unusable.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a request for `key` on a spawned task and record it on the
    /// entry. The caller holds the map lock and checked there is no request
    /// in flight.
    fn start(self: &Arc<Self>, key: &QueryKey, entry: &mut Entry) -> Option<InFlight> {
        let fetcher = entry.fetcher.clone()?;
        let id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let epoch = entry.epoch;
        let retry = self.policy.retry;

        debug!("Fetching {}", key);

        let weak: Weak<Inner> = Arc::downgrade(self);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let label = task_key.label();
            let result = retry.run(&label, || fetcher()).await;
            if let Some(inner) = weak.upgrade() {
                inner.complete(&task_key, id, &result);
            }
            result
        });

        let weak: Weak<Inner> = Arc::downgrade(self);
        let join_key = key.clone();
        let future = async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    let result = Err(ApiError::Network(format!("Request task failed: {}", e)));
                    if let Some(inner) = weak.upgrade() {
                        inner.complete(&join_key, id, &result);
                    }
                    result
                }
            }
        }
        .boxed()
        .shared();

        if entry.data.is_none() {
            entry.error = None;
        }
        entry.pending = Some(Pending {
            id,
            epoch,
            future: future.clone(),
        });
        entry.publish(Instant::now(), self.policy.stale_time(key.kind()));

        Some(future)
    }

    /// Store the outcome of request `id` if it is still the entry's
    /// current request.
    fn complete(self: &Arc<Self>, key: &QueryKey, id: u64, result: &FetchResult) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            debug!("Dropping result for removed entry {}", key);
            return;
        };
        let started_epoch = match entry.pending {
            Some(ref pending) if pending.id == id => pending.epoch,
            _ => return,
        };
        entry.pending = None;

        let now = Instant::now();
        let superseded = entry.epoch != started_epoch;
        match result {
            Ok(data) => {
                entry.data = Some(data.clone());
                entry.updated_at = Some(now);
                entry.error = None;
                entry.invalidated = superseded;
            }
            Err(e) => {
                debug!("Fetch failed for {}: {}", key, e);
                entry.error = Some(e.clone());
            }
        }

        if superseded && entry.is_observed() {
            debug!("{} was invalidated while fetching; refetching", key);
            if self.start(key, entry).is_some() {
                return;
            }
        }
        entry.publish(now, self.policy.stale_time(key.kind()));
    }
}

/// Shared handle to the query cache. Clones refer to the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl QueryCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                policy,
                next_request: AtomicU64::new(0),
            }),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.inner.policy
    }

    /// Read `key`, using `fetcher` on a miss.
    ///
    /// Fresh data is returned without a request. Stale data is returned
    /// immediately and one background refresh is started unless one is
    /// already running. Without data the caller joins the in-flight
    /// request for the key, or starts it.
    pub async fn fetch(&self, key: QueryKey, fetcher: Fetcher) -> FetchResult {
        let pending = {
            let mut entries = self.inner.lock();
            let now = Instant::now();
            let stale_time = self.inner.policy.stale_time(key.kind());
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(now));
            entry.fetcher = Some(fetcher);
            entry.last_access = now;

            if let Some(data) = entry.data.clone() {
                if !entry.is_stale(now, stale_time) {
                    debug!("Cache hit: {}", key);
                    return Ok(data);
                }
                if entry.pending.is_none() {
                    debug!("Cache stale: {}; refreshing in background", key);
                    self.inner.start(&key, entry);
                }
                return Ok(data);
            }

            match entry.pending {
                Some(ref pending) => {
                    debug!("Joining in-flight request for {}", key);
                    pending.future.clone()
                }
                None => {
                    debug!("Cache miss: {}", key);
                    match self.inner.start(&key, entry) {
                        Some(future) => future,
                        None => return Err(missing_fetcher(&key)),
                    }
                }
            }
        };

        pending.await
    }

    /// Issue a new request for `key` even if its data is fresh, joining one
    /// already in flight. This is the explicit retry path.
    pub async fn refetch_with(&self, key: QueryKey, fetcher: Fetcher) -> FetchResult {
        {
            let mut entries = self.inner.lock();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(Instant::now()));
            entry.fetcher = Some(fetcher);
        }
        self.refetch(&key).await
    }

    /// Repeat the last request made for `key`.
    pub async fn refetch(&self, key: &QueryKey) -> FetchResult {
        let pending = {
            let mut entries = self.inner.lock();
            let Some(entry) = entries.get_mut(key) else {
                return Err(missing_fetcher(key));
            };
            entry.last_access = Instant::now();
            match entry.pending {
                Some(ref pending) => pending.future.clone(),
                None => {
                    debug!("Refetching {}", key);
                    self.inner
                        .start(key, entry)
                        .ok_or_else(|| missing_fetcher(key))?
                }
            }
        };

        pending.await
    }

    /// Observe state changes for `key`. Dropping the receiver is enough to
    /// stop observing.
    #[allow(dead_code)]
    pub fn subscribe(&self, key: QueryKey) -> watch::Receiver<QueryState> {
        self.observe(key, None)
    }

    /// Observe `key` and register the request behind it, so invalidation
    /// refreshes it while observed.
    pub fn subscribe_with(&self, key: QueryKey, fetcher: Fetcher) -> watch::Receiver<QueryState> {
        self.observe(key, Some(fetcher))
    }

    fn observe(&self, key: QueryKey, fetcher: Option<Fetcher>) -> watch::Receiver<QueryState> {
        let mut entries = self.inner.lock();
        let now = Instant::now();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(now));
        if fetcher.is_some() {
            entry.fetcher = fetcher;
        }
        entry.last_access = now;
        entry.publish(now, self.inner.policy.stale_time(key.kind()));
        entry.state.subscribe()
    }

    /// Current state of `key`, if it has an entry
    pub fn state(&self, key: &QueryKey) -> Option<QueryState> {
        let entries = self.inner.lock();
        let entry = entries.get(key)?;
        Some(entry.snapshot(
            Instant::now(),
            self.inner.policy.stale_time(key.kind()),
        ))
    }

    /// Whether `key` has data that would be served without a request
    #[allow(dead_code)]
    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        let entries = self.inner.lock();
        entries.get(key).is_some_and(|entry| {
            entry.data.is_some()
                && !entry.is_stale(
                    Instant::now(),
                    self.inner.policy.stale_time(key.kind()),
                )
        })
    }

    /// Mark every entry matching `predicate` stale. Observed entries
    /// refetch right away. A request already in flight stores its result
    /// but leaves the entry stale. Returns the number of entries marked.
    pub fn invalidate<P>(&self, predicate: P) -> usize
    where
        P: Fn(&QueryKey) -> bool,
    {
        let mut entries = self.inner.lock();
        let now = Instant::now();
        let mut marked = 0;

        for (key, entry) in entries.iter_mut().filter(|(key, _)| predicate(key)) {
            entry.invalidated = true;
            entry.epoch += 1;
            marked += 1;

            if entry.pending.is_none() && entry.is_observed() {
                debug!("Invalidated observed {}; refetching", key);
                if self.inner.start(key, entry).is_some() {
                    continue;
                }
            }
            entry.publish(now, self.inner.policy.stale_time(key.kind()));
        }

        if marked > 0 {
            debug!("Invalidated {} cache entries", marked);
        }
        marked
    }

    pub fn invalidate_kind(&self, kind: ResourceKind) -> usize {
        self.invalidate(|key| key.kind() == kind)
    }

    pub fn invalidate_key(&self, key: &QueryKey) -> usize {
        self.invalidate(|k| k == key)
    }

    /// Drop the entry for `key`. A request still in flight for it finishes
    /// without storing anything.
    pub fn remove(&self, key: &QueryKey) -> bool {
        let removed = self.inner.lock().remove(key).is_some();
        if removed {
            debug!("Removed cache entry {}", key);
        }
        removed
    }

    pub fn clear(&self) {
        let mut entries = self.inner.lock();
        debug!("Clearing {} cache entries", entries.len());
        entries.clear();
    }

    /// Evict entries that nobody observes, have no request in flight, and
    /// were last accessed longer ago than their kind's gc window. Returns
    /// the number evicted.
    pub fn collect_garbage(&self) -> usize {
        let mut entries = self.inner.lock();
        let now = Instant::now();
        let policy = &self.inner.policy;
        let before = entries.len();

        entries.retain(|key, entry| {
            entry.is_observed()
                || entry.pending.is_some()
                || now.saturating_duration_since(entry.last_access) < policy.gc_time(key.kind())
        });

        let evicted = before - entries.len();
        if evicted > 0 {
            debug!("Evicted {} idle cache entries", evicted);
        }
        evicted
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.inner.lock();
        let now = Instant::now();
        let mut stats = CacheStats {
            total: entries.len(),
            ..CacheStats::default()
        };

        for (key, entry) in entries.iter() {
            match entry.status(now, self.inner.policy.stale_time(key.kind())) {
                "fresh" => stats.fresh += 1,
                "stale" => stats.stale += 1,
                "error" => stats.errored += 1,
                _ => {}
            }
            if entry.pending.is_some() {
                stats.fetching += 1;
            }
        }
        stats
    }

    /// Summaries of every entry, sorted by key label
    pub fn entries(&self) -> Vec<EntrySummary> {
        let entries = self.inner.lock();
        let now = Instant::now();

        let mut summaries: Vec<EntrySummary> = entries
            .iter()
            .map(|(key, entry)| EntrySummary {
                key: key.label(),
                kind: key.kind(),
                status: entry.status(now, self.inner.policy.stale_time(key.kind())),
                age: entry
                    .updated_at
                    .map(|at| now.saturating_duration_since(at)),
                fetching: entry.pending.is_some(),
                observers: entry.state.receiver_count(),
                error: entry.error.as_ref().map(ToString::to_string),
            })
            .collect();

        summaries.sort_by(|a, b| a.key.cmp(&b.key));
        summaries
    }
}

fn missing_fetcher(key: &QueryKey) -> ApiError {
    ApiError::InvalidResponse(format!("No request registered for {}", key))
}
