//! Coalescing, bounded cache for external data-source calls.
//!
//! The reference behaviour memoised every upstream response for the life of
//! the process; this cache keeps the memoisation but bounds it with a TTL
//! and a capacity limit, and guarantees at most one in-flight call per
//! request key: concurrent requesters for the same key await the first
//! caller's result instead of issuing duplicate expensive calls.
//!
//! Errors are deliberately not cached — a failed fetch may be retried by
//! the next scoring request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use heliosite_core::SourceError;

/// Configuration for [`FetchCache`].
#[derive(Debug, Clone)]
pub struct FetchCacheConfig {
    /// How long a cached response stays valid.
    pub time_to_live: Duration,
    /// Maximum number of cached responses.
    pub max_capacity: u64,
}

impl Default for FetchCacheConfig {
    fn default() -> Self {
        Self {
            time_to_live: Duration::from_secs(600),
            max_capacity: 1024,
        }
    }
}

/// Memoises upstream response bodies by request key.
///
/// Keys are the full request URL plus, for POST queries, the normalised
/// request body. Values are shared response bodies.
#[derive(Debug, Clone)]
pub struct FetchCache {
    inner: Cache<String, Arc<String>>,
}

impl Default for FetchCache {
    fn default() -> Self {
        Self::new(FetchCacheConfig::default())
    }
}

impl FetchCache {
    /// Build a cache with the given bounds.
    #[must_use]
    pub fn new(config: FetchCacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.time_to_live)
            .build();
        Self { inner }
    }

    /// Return the cached body for `key`, or run `fetch` to produce it.
    ///
    /// Concurrent callers with the same key are coalesced onto a single
    /// execution of `fetch`; the others await its outcome.
    ///
    /// # Errors
    /// Propagates the fetch error to every coalesced caller. Errors are not
    /// cached.
    pub async fn get_or_fetch<F>(&self, key: String, fetch: F) -> Result<Arc<String>, SourceError>
    where
        F: Future<Output = Result<String, SourceError>>,
    {
        self.inner
            .try_get_with(key, async move { fetch.await.map(Arc::new) })
            .await
            .map_err(|err: Arc<SourceError>| (*err).clone())
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn transient_error() -> SourceError {
        SourceError::Network {
            url: "http://example.com".to_owned(),
            message: "connection refused".to_owned(),
        }
    }

    #[tokio::test]
    async fn second_lookup_hits_the_cache() {
        let cache = FetchCache::default();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let body = cache
                .get_or_fetch("key".to_owned(), async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("body".to_owned())
                })
                .await
                .expect("fetch should succeed");
            assert_eq!(body.as_str(), "body");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_same_key_requests_coalesce() {
        let cache = FetchCache::default();
        let calls = AtomicUsize::new(0);

        let fetch = || {
            cache.get_or_fetch("key".to_owned(), async {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok("body".to_owned())
            })
        };

        let (a, b) = tokio::join!(fetch(), fetch());

        assert_eq!(a.expect("first").as_str(), "body");
        assert_eq!(b.expect("second").as_str(), "body");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_fetch_independently() {
        let cache = FetchCache::default();
        let calls = AtomicUsize::new(0);

        for key in ["a", "b"] {
            cache
                .get_or_fetch(key.to_owned(), async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(key.to_owned())
                })
                .await
                .expect("fetch should succeed");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = FetchCache::default();
        let calls = AtomicUsize::new(0);

        let err = cache
            .get_or_fetch("key".to_owned(), async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(transient_error())
            })
            .await
            .expect_err("first fetch should fail");
        assert!(matches!(err, SourceError::Network { .. }));

        let body = cache
            .get_or_fetch("key".to_owned(), async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("recovered".to_owned())
            })
            .await
            .expect("retry should succeed");

        assert_eq!(body.as_str(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let cache = FetchCache::new(FetchCacheConfig {
            time_to_live: Duration::from_millis(50),
            max_capacity: 16,
        });
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_fetch("key".to_owned(), async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("body".to_owned())
                })
                .await
                .expect("fetch should succeed");
            tokio::time::sleep(Duration::from_millis(80)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
