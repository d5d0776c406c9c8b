//! Get-or-compute memoization for signed link generation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::store::CacheStore;

/// How much shorter a cached entry lives than the signed link it holds, so a
/// cache hit never returns an already-expired link.
pub const LINK_TTL_SAFETY_MARGIN: Duration = Duration::from_secs(30);

/// Memoizes link generation against a TTL'd key-value store.
///
/// The get-or-compute path is serialized by one process-wide mutex rather
/// than a per-key lock: concurrent misses on *different* keys block each
/// other. That trades throughput under miss storms for simplicity and is
/// acceptable at this workload's miss concurrency; replace the single mutex
/// with a per-key lock table if that changes.
pub struct LinkCache {
    store: Arc<dyn CacheStore>,
    prefix: String,
    lock: Mutex<()>,
}

impl LinkCache {
    pub fn new(store: Arc<dyn CacheStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            lock: Mutex::new(()),
        }
    }

    /// Return the cached link for `key`, or invoke `compute` exactly once,
    /// store its result with a TTL safely below `link_expires_in`, and return
    /// it.
    ///
    /// Store failures degrade to computing a fresh link; they are logged and
    /// never fail the call.
    pub async fn cached_link<E, F, Fut>(
        &self,
        key: &str,
        link_expires_in: Duration,
        compute: F,
    ) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let cache_key = format!("{}{}", self.prefix, key);
        let ttl = link_expires_in
            .saturating_sub(LINK_TTL_SAFETY_MARGIN)
            .max(Duration::from_secs(1));

        let _guard = self.lock.lock().await;

        match self.store.get(&cache_key).await {
            Ok(Some(link)) => return Ok(link),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, key = %cache_key, "Cache read failed; computing link");
            }
        }

        let link = compute().await?;

        if let Err(e) = self.store.set_ex(&cache_key, &link, ttl).await {
            tracing::warn!(error = %e, key = %cache_key, "Cache write failed; serving uncached link");
        }

        Ok(link)
    }
}
