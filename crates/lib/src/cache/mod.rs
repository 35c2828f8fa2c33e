//! Read-through fetch cache.
//!
//! [`FetchCache`] keeps one slot per key. A slot holds the last good value,
//! the last failure, and a fetch lock that makes concurrent misses for the
//! same key share a single underlying fetch.
//!
//! Staleness is measured with the injected [`Clock`]. A stale entry is either
//! refetched in the caller's task or, with `serve_stale`, returned as is while
//! one background task refreshes it. A failed refresh never discards the last
//! good value.
//!
//! Slots live in the map only while they hold a value or someone is using
//! them. Invalidation and failed first fetches evict idle slots, so keys that
//! never succeed do not accumulate.

mod errors;
mod retry;


pub use errors::CacheError;
pub use retry::{RetryPolicy, Retryable};

use std::{
    collections::HashMap,
    fmt::{self, Debug},
    hash::Hash,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{clock::Clock, config::CacheConfig};

/// Source of values for a [`FetchCache`].
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    type Key: Clone + Eq + Hash + Debug + Send + Sync + 'static;
    type Value: Clone + Send + Sync + 'static;
    type Error: std::error::Error + Retryable + Send + Sync + 'static;

    async fn fetch(&self, key: &Self::Key) -> Result<Self::Value, Self::Error>;
}

/// A cached value with its fetch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<K, V> {
    pub key: K,
    pub value: V,
    /// Milliseconds since epoch when the fetch completed.
    pub fetched_at: u64,
    /// Milliseconds since epoch after which the entry is stale.
    pub stale_after: u64,
}

impl<K, V> CacheEntry<K, V> {
    pub fn is_stale(&self, now_millis: u64) -> bool {
        now_millis >= self.stale_after
    }
}

struct SlotState<F: Fetcher> {
    entry: Option<CacheEntry<F::Key, F::Value>>,
    /// Bumped on every completed fetch, successful or not.
    generation: u64,
    last_error: Option<CacheError<F::Error>>,
}

struct Slot<F: Fetcher> {
    state: Mutex<SlotState<F>>,
    fetch: Arc<tokio::sync::Mutex<()>>,
}

impl<F: Fetcher> Slot<F> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                entry: None,
                generation: 0,
                last_error: None,
            }),
            fetch: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

struct Inner<F: Fetcher> {
    fetcher: F,
    slots: Mutex<HashMap<F::Key, Arc<Slot<F>>>>,
    clock: Arc<dyn Clock>,
    stale_after: Duration,
    serve_stale: bool,
    retry: RetryPolicy,
    fetches: AtomicU64,
}

/// Single-flight, staleness-aware cache in front of a [`Fetcher`].
///
/// Cloning is cheap and clones share state.
pub struct FetchCache<F: Fetcher> {
    inner: Arc<Inner<F>>,
}

impl<F: Fetcher> Clone for FetchCache<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: Fetcher> Debug for FetchCache<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchCache")
            .field("stale_after", &self.inner.stale_after)
            .field("serve_stale", &self.inner.serve_stale)
            .field("retry", &self.inner.retry)
            .field("entries", &self.len())
            .finish()
    }
}

impl<F: Fetcher> FetchCache<F> {
    pub fn new(fetcher: F, config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                slots: Mutex::new(HashMap::new()),
                clock,
                stale_after: config.stale_after,
                serve_stale: config.serve_stale,
                retry: config.retry,
                fetches: AtomicU64::new(0),
            }),
        }
    }

    /// Return the value for `key`, fetching it if missing or stale.
    ///
    /// Concurrent calls for the same key wait on one fetch and all receive
    /// its outcome.
    pub async fn get(&self, key: &F::Key) -> Result<F::Value, CacheError<F::Error>> {
        let slot = self.inner.slot(key);

        let (observed, stale) = {
            let state = lock(&slot.state);
            let now = self.inner.clock.now_millis();
            match state.entry.as_ref() {
                Some(entry) if !entry.is_stale(now) => return Ok(entry.value.clone()),
                Some(entry) if self.inner.serve_stale => {
                    (state.generation, Some(entry.value.clone()))
                }
                _ => (state.generation, None),
            }
        };

        if let Some(value) = stale {
            self.inner.spawn_refresh(key, &slot);
            return Ok(value);
        }

        let _fetching = slot.fetch.lock().await;

        // Someone else finished a fetch while we waited.
        {
            let state = lock(&slot.state);
            if state.generation != observed {
                if let Some(error) = &state.last_error {
                    return Err(error.clone());
                }
                if let Some(entry) = &state.entry {
                    return Ok(entry.value.clone());
                }
            }
        }

        let result = self.inner.fetch_and_store(key, &slot).await;
        if result.is_err() {
            self.inner.evict_if_empty(key, &slot);
        }
        result
    }

    /// Drop any cached value for `key` and fetch it again.
    pub async fn refresh(&self, key: &F::Key) -> Result<F::Value, CacheError<F::Error>> {
        self.invalidate(key);
        self.get(key).await
    }

    /// The current entry for `key`, fresh or stale, without fetching.
    pub fn peek(&self, key: &F::Key) -> Option<CacheEntry<F::Key, F::Value>> {
        let slots = lock(&self.inner.slots);
        let entry = lock(&slots.get(key)?.state).entry.clone();
        entry
    }

    /// Forget the value for `key`. The next read fetches.
    ///
    /// An idle slot is removed outright. A slot with a fetch in flight or
    /// waiters attached is only emptied, so they keep sharing one fetch.
    pub fn invalidate(&self, key: &F::Key) {
        let mut slots = lock(&self.inner.slots);
        let idle = match slots.get(key) {
            Some(slot) => {
                reset(slot);
                is_idle(slot)
            }
            None => false,
        };
        if idle {
            slots.remove(key);
        }
        tracing::debug!(key = ?key, evicted = idle, "Invalidated cache entry");
    }

    /// Forget every cached value and drop every idle slot.
    pub fn clear(&self) {
        let mut slots = lock(&self.inner.slots);
        let before = slots.len();
        slots.retain(|_, slot| {
            reset(slot);
            !is_idle(slot)
        });
        tracing::debug!(
            evicted = before - slots.len(),
            busy = slots.len(),
            "Cleared cache"
        );
    }

    /// Number of keys currently holding a value.
    pub fn len(&self) -> usize {
        lock(&self.inner.slots)
            .values()
            .filter(|slot| lock(&slot.state).entry.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys tracked, including ones with no value yet.
    pub fn slot_count(&self) -> usize {
        lock(&self.inner.slots).len()
    }

    /// Total fetch attempts issued, retries included.
    pub fn fetch_count(&self) -> u64 {
        self.inner.fetches.load(Ordering::Relaxed)
    }

    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }
}

impl<F: Fetcher> Inner<F> {
    fn slot(&self, key: &F::Key) -> Arc<Slot<F>> {
        let mut slots = lock(&self.slots);
        Arc::clone(
            slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Slot::new())),
        )
    }

    /// Drop the slot for `key` if it is still `slot` and never got a value.
    ///
    /// Waiters hold their own handle on the slot and still see the failure.
    fn evict_if_empty(&self, key: &F::Key, slot: &Arc<Slot<F>>) {
        let mut slots = lock(&self.slots);
        let evict = slots.get(key).is_some_and(|current| {
            Arc::ptr_eq(current, slot) && lock(&slot.state).entry.is_none()
        });
        if evict {
            slots.remove(key);
        }
    }

    /// Start a background refresh unless one is already running.
    fn spawn_refresh(self: &Arc<Self>, key: &F::Key, slot: &Arc<Slot<F>>) {
        let Ok(guard) = Arc::clone(&slot.fetch).try_lock_owned() else {
            return;
        };

        let inner = Arc::clone(self);
        let slot = Arc::clone(slot);
        let key = key.clone();
        tokio::spawn(async move {
            let _guard = guard;
            tracing::debug!(key = ?key, "Refreshing stale cache entry");
            // Failures are recorded on the slot and the stale value is kept.
            let _ = inner.fetch_and_store(&key, &slot).await;
        });
    }

    /// Fetch with retries and record the outcome. Caller holds the fetch lock.
    async fn fetch_and_store(
        &self,
        key: &F::Key,
        slot: &Slot<F>,
    ) -> Result<F::Value, CacheError<F::Error>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            self.fetches.fetch_add(1, Ordering::Relaxed);

            match self.fetcher.fetch(key).await {
                Ok(value) => {
                    let now = self.clock.now_millis();
                    let mut state = lock(&slot.state);
                    state.entry = Some(CacheEntry {
                        key: key.clone(),
                        value: value.clone(),
                        fetched_at: now,
                        stale_after: now.saturating_add(self.stale_after.as_millis() as u64),
                    });
                    state.last_error = None;
                    state.generation += 1;
                    tracing::debug!(key = ?key, attempts = attempt, "Fetched cache entry");
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt <= self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        key = ?key,
                        attempt,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "Fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::warn!(key = ?key, attempts = attempt, error = %err, "Fetch failed");
                    let error = CacheError::new(format!("{key:?}"), attempt, err);
                    let mut state = lock(&slot.state);
                    state.last_error = Some(error.clone());
                    state.generation += 1;
                    return Err(error);
                }
            }
        }
    }
}

fn reset<F: Fetcher>(slot: &Slot<F>) {
    let mut state = lock(&slot.state);
    state.entry = None;
    state.last_error = None;
}

/// Only the map holds the slot: no fetch, waiter or background refresh.
fn is_idle<F: Fetcher>(slot: &Arc<Slot<F>>) -> bool {
    Arc::strong_count(slot) == 1
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
