use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, error, warn};

use super::{
    clock::Clock,
    key::{CacheKey, CacheOperation},
    store::CacheStore,
};
use crate::config::DEFAULT_DATE_FORMAT;
use crate::shared::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub computations: u64,
}

/// Read-through cache in front of expensive computations.
///
/// For one key, at most one computation runs at a time in this process: callers racing
/// on a key queue behind a per-key lock and pick up the value the first caller stored.
/// Failed computations are never cached.
pub struct Memoizer {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    default_ttl: Option<Duration>,
    date_format: String,
    key_locks: Arc<RwLock<HashMap<String, Arc<AsyncMutex<()>>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
}

impl Memoizer {
    pub fn new(
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        default_ttl: Option<Duration>,
    ) -> Self {
        Self {
            store,
            clock,
            default_ttl,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            key_locks: Arc::new(RwLock::new(HashMap::new())),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            computations: AtomicU64::new(0),
        }
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::SeqCst),
            misses: self.misses.load(Ordering::SeqCst),
            computations: self.computations.load(Ordering::SeqCst),
        }
    }

    /// Expiry for a new entry. Day-scoped entries never live past local midnight.
    pub fn ttl_for(&self, operation: CacheOperation) -> Option<Duration> {
        if !operation.is_day_scoped() {
            return self.default_ttl;
        }
        let until_midnight = self.clock.until_midnight().max(Duration::from_secs(1));
        Some(match self.default_ttl {
            Some(ttl) => ttl.min(until_midnight),
            None => until_midnight,
        })
    }

    pub async fn get_or_compute<T, F, Fut>(
        &self,
        key: &CacheKey,
        expected: CacheOperation,
        compute: F,
    ) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, AppError>> + Send,
    {
        if let Err(err) = key.validate(expected, &self.date_format) {
            error!(key = %key, expected = %expected, "Rejecting malformed cache key");
            return Err(err);
        }
        let raw_key = key.to_string();

        if let Some(value) = self.lookup::<T>(&raw_key).await? {
            self.hits.fetch_add(1, Ordering::SeqCst);
            debug!(key = %raw_key, "Cache hit");
            return Ok(value);
        }

        let key_lock = self.key_lock(&raw_key).await;
        let _guard = key_lock.lock().await;

        // Someone else may have filled the entry while we waited
        let filled = self.lookup::<T>(&raw_key).await;
        if !matches!(filled, Ok(None)) {
            self.release_key_lock(&raw_key, &key_lock).await;
        }
        if let Some(value) = filled? {
            self.hits.fetch_add(1, Ordering::SeqCst);
            debug!(key = %raw_key, "Cache filled by concurrent caller");
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::SeqCst);
        self.computations.fetch_add(1, Ordering::SeqCst);
        debug!(key = %raw_key, "Cache miss, computing");

        let result = self.compute_and_store(&raw_key, expected, compute).await;
        self.release_key_lock(&raw_key, &key_lock).await;
        result
    }

    pub async fn invalidate(&self, key: &CacheKey) -> Result<(), AppError> {
        debug!(key = %key, "Invalidating cache entry");
        self.store.invalidate(&key.to_string()).await
    }

    async fn compute_and_store<T, F, Fut>(
        &self,
        raw_key: &str,
        operation: CacheOperation,
        compute: F,
    ) -> Result<T, AppError>
    where
        T: Serialize + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, AppError>> + Send,
    {
        let value = compute().await?;
        let encoded = serde_json::to_string(&value)
            .map_err(|e| AppError::CacheUnavailable(format!("encode {}: {}", raw_key, e)))?;
        self.store
            .put(raw_key, encoded, self.ttl_for(operation))
            .await?;
        Ok(value)
    }

    async fn lookup<T: DeserializeOwned>(&self, raw_key: &str) -> Result<Option<T>, AppError> {
        let Some(encoded) = self.store.get(raw_key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&encoded) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // Written by a build with a different layout; recompute
                warn!(key = raw_key, error = %e, "Discarding undecodable cache entry");
                self.store.invalidate(raw_key).await?;
                Ok(None)
            }
        }
    }

    async fn key_lock(&self, raw_key: &str) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.key_locks.read().await;
            if let Some(lock) = guard.get(raw_key) {
                return lock.clone();
            }
        }

        let mut guard = self.key_locks.write().await;
        guard
            .entry(raw_key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Drops the map entry once no other caller holds or waits on the lock. Callers
    /// clone the lock under the map lock, so the count cannot grow while we check it.
    async fn release_key_lock(&self, raw_key: &str, key_lock: &Arc<AsyncMutex<()>>) {
        let mut guard = self.key_locks.write().await;
        let shared = guard
            .get(raw_key)
            .is_some_and(|current| Arc::ptr_eq(current, key_lock));
        // one reference in the map, one held by this caller
        if shared && Arc::strong_count(key_lock) <= 2 {
            guard.remove(raw_key);
        }
    }
}
