//! Server-state query cache
//!
//! Results of remote reads are stored per [`QueryKey`]. A read serves a
//! fresh entry directly, joins a fetch already in flight for the same key,
//! or starts one. Writes elsewhere in the console call `invalidate`, which
//! marks entries stale and immediately refetches keys that are being watched.
//!
//! Every fetch is stamped with a generation taken from a global counter when
//! it starts. A result is only applied if no later fetch has started for the
//! same key, so a slow response can never overwrite a newer one.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::query_key::QueryKey;
use crate::config::CacheConfig;
use crate::utils::errors::{ApiError, ApiResult};
use crate::utils::logging::log_cache_event;

type AnyValue = Arc<dyn Any + Send + Sync>;
type FetchOutcome = ApiResult<AnyValue>;
type InFlight = Shared<BoxFuture<'static, FetchOutcome>>;
type ErasedFetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchOutcome> + Send + Sync>;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Tri-state outcome of a read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Loading,
    Success,
    Error,
}

/// Snapshot of one query as seen by a caller
///
/// An `Error` result may still carry the last successfully fetched data.
#[derive(Debug)]
pub struct QueryResult<T> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<ApiError>,
}

impl<T> Clone for QueryResult<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

impl<T> QueryResult<T> {
    pub fn loading() -> Self {
        Self {
            status: QueryStatus::Loading,
            data: None,
            error: None,
        }
    }

    pub fn success(data: Arc<T>) -> Self {
        Self {
            status: QueryStatus::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: ApiError, data: Option<Arc<T>>) -> Self {
        Self {
            status: QueryStatus::Error,
            data,
            error: Some(error),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.error, Some(ApiError::NotFound { .. }))
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// The data of a successful read, or the error that prevented it
    pub fn into_result(self, key: &QueryKey) -> ApiResult<Arc<T>> {
        match (self.status, self.data, self.error) {
            (QueryStatus::Success, Some(data), _) => Ok(data),
            (_, _, Some(error)) => Err(error),
            _ => Err(ApiError::request_failed(
                key.resource(),
                key.operation(),
                "query has not resolved yet",
            )),
        }
    }
}

/// Notifications published to watchers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Fetching(QueryKey),
    Updated(QueryKey),
    Failed(QueryKey),
    Invalidated(QueryKey),
}

impl CacheEvent {
    pub fn key(&self) -> &QueryKey {
        match self {
            CacheEvent::Fetching(key)
            | CacheEvent::Updated(key)
            | CacheEvent::Failed(key)
            | CacheEvent::Invalidated(key) => key,
        }
    }
}

/// Cache statistics structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub stale: usize,
    pub fetching: usize,
    pub observed: usize,
}

#[derive(Default)]
struct CacheEntry {
    data: Option<AnyValue>,
    error: Option<ApiError>,
    updated_at: Option<Instant>,
    /// Generation of the most recently started fetch
    latest_fetch: u64,
    /// Fetches with a generation at or below this started before the last invalidation
    invalidated_at: u64,
    stale: bool,
    in_flight: Option<(u64, InFlight)>,
    fetcher: Option<ErasedFetcher>,
    observers: usize,
}

struct CacheInner {
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
    config: CacheConfig,
    generation: AtomicU64,
    events: broadcast::Sender<CacheEvent>,
}

/// Process-wide cache of remote query results; clones share the same state
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                config,
                generation: AtomicU64::new(0),
                events,
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Read `key`, fetching with `fetcher` when there is no fresh entry
    ///
    /// Concurrent readers of one key share a single fetch. Failures are
    /// returned as data; this never panics or propagates past the cache.
    pub async fn read<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> QueryResult<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let in_flight = {
            let mut entries = self.inner.entries.lock();
            let entry = entries.entry(key.clone()).or_default();

            if self.inner.is_fresh(entry) {
                log_cache_event(&key.to_string(), "hit", None);
                return typed_snapshot(&key, entry);
            }

            let joined = entry
                .in_flight
                .as_ref()
                .map(|(generation, in_flight)| (*generation, in_flight.clone()));

            match joined {
                Some((generation, in_flight)) => {
                    log_cache_event(&key.to_string(), "joined", Some(generation));
                    in_flight
                }
                None => {
                    entry.fetcher = Some(erase(fetcher));
                    match CacheInner::start_fetch(&self.inner, &key, entry) {
                        Some(in_flight) => in_flight,
                        None => return QueryResult::loading(),
                    }
                }
            }
        };

        let outcome = in_flight.await;

        let entries = self.inner.entries.lock();
        match entries.get(&key) {
            Some(entry) if entry.data.is_some() || entry.error.is_some() => typed_snapshot(&key, entry),
            _ => outcome_snapshot(&key, outcome),
        }
    }

    /// Current state of `key` without fetching
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryResult<T> {
        let entries = self.inner.entries.lock();
        entries
            .get(key)
            .map_or_else(QueryResult::loading, |entry| typed_snapshot(key, entry))
    }

    /// Mark one key stale
    pub fn invalidate(&self, key: &QueryKey) -> usize {
        self.invalidate_where(|candidate| candidate == key)
    }

    /// Mark every listed key stale
    pub fn invalidate_many(&self, keys: &[QueryKey]) -> usize {
        self.invalidate_where(|candidate| keys.contains(candidate))
    }

    pub fn invalidate_all(&self) -> usize {
        self.invalidate_where(|_| true)
    }

    /// Mark every key matching `predicate` stale
    ///
    /// Watched keys refetch right away; the rest refetch on their next read.
    /// A fetch already in flight is detached: its result can still land but
    /// leaves the entry stale. Returns the number of entries marked.
    pub fn invalidate_where(&self, predicate: impl Fn(&QueryKey) -> bool) -> usize {
        let mut entries = self.inner.entries.lock();
        let mut marked = 0;

        for (key, entry) in entries.iter_mut() {
            if !predicate(key) {
                continue;
            }

            entry.stale = true;
            entry.invalidated_at = entry.latest_fetch;
            entry.in_flight = None;
            marked += 1;

            log_cache_event(&key.to_string(), "invalidated", None);
            let _ = self.inner.events.send(CacheEvent::Invalidated(key.clone()));

            if entry.observers > 0 {
                CacheInner::start_fetch(&self.inner, key, entry);
            }
        }

        marked
    }

    /// Window focus hook; only refetches when `refetch_on_focus` is enabled
    pub fn on_focus(&self) -> usize {
        if self.inner.config.refetch_on_focus {
            self.invalidate_all()
        } else {
            debug!("Refetch on focus disabled, ignoring focus change");
            0
        }
    }

    /// Watch a key. While any watch is alive the key counts as rendered and
    /// is refetched eagerly on invalidation.
    pub fn watch(&self, key: QueryKey) -> QueryWatch {
        let receiver = self.inner.events.subscribe();
        self.inner.entries.lock().entry(key.clone()).or_default().observers += 1;

        QueryWatch {
            key,
            receiver,
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner
            .entries
            .lock()
            .get(key)
            .map_or(false, |entry| entry.in_flight.is_some())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.inner
            .entries
            .lock()
            .get(key)
            .map_or(true, |entry| !self.inner.is_fresh(entry))
    }

    pub fn remove(&self, key: &QueryKey) -> bool {
        self.inner.entries.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.inner.entries.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.inner.entries.lock();
        CacheStats {
            entries: entries.len(),
            stale: entries.values().filter(|e| !self.inner.is_fresh(e)).count(),
            fetching: entries.values().filter(|e| e.in_flight.is_some()).count(),
            observed: entries.values().filter(|e| e.observers > 0).count(),
        }
    }
}

impl CacheInner {
    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        if entry.stale || entry.error.is_some() || entry.data.is_none() {
            return false;
        }
        let stale_time = Duration::from_secs(self.config.stale_time_seconds);
        entry.updated_at.map_or(false, |at| at.elapsed() < stale_time)
    }

    /// Start a fetch for `key` using the entry's last fetcher.
    /// Must be called with the entries lock held.
    fn start_fetch(inner: &Arc<CacheInner>, key: &QueryKey, entry: &mut CacheEntry) -> Option<InFlight> {
        let fetcher = entry.fetcher.clone()?;
        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let retry = inner.config.retry;
        let retry_delay = Duration::from_millis(inner.config.retry_delay_ms);
        let cache: Weak<CacheInner> = Arc::downgrade(inner);
        let fetch_key = key.clone();

        let in_flight = async move {
            let mut attempt = 0u32;
            let outcome = loop {
                match fetcher().await {
                    Ok(value) => break Ok(value),
                    Err(err) if attempt < retry && err.is_retryable() => {
                        attempt += 1;
                        warn!(key = %fetch_key, attempt = attempt, error = %err, "Query fetch failed, retrying");
                        if !retry_delay.is_zero() {
                            tokio::time::sleep(retry_delay).await;
                        }
                    }
                    Err(err) => break Err(err),
                }
            };

            if let Some(cache) = cache.upgrade() {
                cache.settle(&fetch_key, generation, &outcome);
            }
            outcome
        }
        .boxed()
        .shared();

        entry.latest_fetch = generation;
        entry.in_flight = Some((generation, in_flight.clone()));
        log_cache_event(&key.to_string(), "fetch", Some(generation));
        let _ = inner.events.send(CacheEvent::Fetching(key.clone()));

        // run to completion even if every reader is dropped
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let _ = handle.spawn(in_flight.clone().map(|_| ()));
        }

        Some(in_flight)
    }

    fn settle(&self, key: &QueryKey, generation: u64, outcome: &FetchOutcome) {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            debug!(key = %key, generation = generation, "Entry removed before fetch completed");
            return;
        };

        if entry.in_flight.as_ref().map_or(false, |(g, _)| *g == generation) {
            entry.in_flight = None;
        }

        if generation < entry.latest_fetch {
            debug!(
                key = %key,
                generation = generation,
                latest = entry.latest_fetch,
                "Discarding result of superseded fetch"
            );
            return;
        }

        let event = match outcome {
            Ok(value) => {
                entry.data = Some(Arc::clone(value));
                entry.error = None;
                entry.updated_at = Some(Instant::now());
                CacheEvent::Updated(key.clone())
            }
            Err(err) => {
                entry.error = Some(err.clone());
                CacheEvent::Failed(key.clone())
            }
        };
        entry.stale = generation <= entry.invalidated_at;

        log_cache_event(&key.to_string(), "settled", Some(generation));
        let _ = self.events.send(event);
    }
}

/// Handle on a watched key; dropping it stops counting the key as rendered
pub struct QueryWatch {
    key: QueryKey,
    receiver: broadcast::Receiver<CacheEvent>,
    inner: Arc<CacheInner>,
}

impl QueryWatch {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Wait for the next event concerning the watched key
    pub async fn changed(&mut self) -> Option<CacheEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.key() == &self.key => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(key = %self.key, skipped = skipped, "Query watch lagged behind cache events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for QueryWatch {
    fn drop(&mut self) {
        if let Some(entry) = self.inner.entries.lock().get_mut(&self.key) {
            entry.observers = entry.observers.saturating_sub(1);
        }
    }
}

fn erase<T, F, Fut>(fetcher: F) -> ErasedFetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
{
    Arc::new(move || {
        fetcher()
            .map(|result| result.map(|value| Arc::new(value) as AnyValue))
            .boxed()
    })
}

fn type_mismatch(key: &QueryKey) -> ApiError {
    warn!(key = %key, "Cached value has a different type than requested");
    ApiError::request_failed(key.resource(), key.operation(), "cached value has an unexpected type")
}

fn typed_snapshot<T: Send + Sync + 'static>(key: &QueryKey, entry: &CacheEntry) -> QueryResult<T> {
    let data = match entry.data.clone().map(|value| value.downcast::<T>()) {
        Some(Ok(data)) => Some(data),
        Some(Err(_)) => return QueryResult::failure(type_mismatch(key), None),
        None => None,
    };

    match (&entry.error, data) {
        (Some(error), data) => QueryResult::failure(error.clone(), data),
        (None, Some(data)) => QueryResult::success(data),
        (None, None) => QueryResult::loading(),
    }
}

fn outcome_snapshot<T: Send + Sync + 'static>(key: &QueryKey, outcome: FetchOutcome) -> QueryResult<T> {
    match outcome {
        Ok(value) => match value.downcast::<T>() {
            Ok(data) => QueryResult::success(data),
            Err(_) => QueryResult::failure(type_mismatch(key), None),
        },
        Err(error) => QueryResult::failure(error, None),
    }
}
