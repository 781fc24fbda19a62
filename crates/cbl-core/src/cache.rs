// Time-bounded cache for remote fetches.
//
// One slot per cached source. A stored value is reused while it is younger
// than the TTL; after that the next caller re-fetches synchronously. The slot
// lock is held across the fetch so callers racing within one window share a
// single fetch.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
struct Entry<T> {
    value: T,
    fetched_at: DateTime<Utc>,
}

/// A single cached value with a time-to-live.
#[derive(Debug)]
pub struct TtlCache<T> {
    name: &'static str,
    ttl: Duration,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Build a cache whose window is `secs` seconds long.
    pub fn with_ttl_secs(name: &'static str, secs: u64) -> Self {
        let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1000);
        Self::new(name, Duration::seconds(secs))
    }

    /// Return the cached value if it is still fresh at `now`, otherwise run
    /// `fetch`, store its value stamped with `now` and return it.
    ///
    /// A failed fetch leaves the slot untouched and returns the error.
    pub async fn get_or_refresh<F, Fut, E>(&self, now: DateTime<Utc>, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.as_ref() {
            if now - entry.fetched_at < self.ttl {
                debug!(cache = self.name, fetched_at = %entry.fetched_at, "cache hit");
                return Ok(entry.value.clone());
            }
            debug!(cache = self.name, fetched_at = %entry.fetched_at, "cache entry expired");
        }

        let value = fetch().await?;
        *slot = Some(Entry {
            value: value.clone(),
            fetched_at: now,
        });
        Ok(value)
    }

    /// Timestamp of the stored value, if any.
    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.slot.lock().await.as_ref().map(|e| e.fetched_at)
    }

    /// Drop the stored value so the next call fetches.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}
