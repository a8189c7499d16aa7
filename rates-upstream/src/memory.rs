//! Process-local TTL cache backed by `DashMap`.
//!
//! Entries carry an absolute expiry set at insert time; a read after expiry
//! behaves as a miss. Per-key atomicity comes from the underlying map, with
//! last-writer-wins on same-key races.

use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::Instant;

use rates_types::RateCache;

/// In-memory implementation of the [`RateCache`] port.
///
/// Payloads are stored as `serde_json::Value`, mirroring how a remote cache
/// would hold them serialized. Uses `tokio::time::Instant` so expiry
/// participates in paused-time tests.
#[derive(Default)]
pub struct InMemoryRateCache {
    entries: DashMap<String, CacheEntry>,
}

struct CacheEntry {
    payload: serde_json::Value,
    expires_at: Instant,
}

impl InMemoryRateCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RateCache for InMemoryRateCache {
    async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if entry.expires_at > now {
                return match serde_json::from_value(entry.payload.clone()) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::warn!(key, error = %e, "cache payload failed to deserialize, treating as miss");
                        None
                    }
                };
            }
        }
        // Expired entries behave as a miss; drop the stale payload on the way out.
        self.entries.remove(key);
        None
    }

    async fn set<T>(&self, key: &str, value: &T, ttl: Duration)
    where
        T: Serialize + Sync,
    {
        match serde_json::to_value(value) {
            Ok(payload) => {
                self.entries.insert(
                    key.to_string(),
                    CacheEntry {
                        payload,
                        expires_at: Instant::now() + ttl,
                    },
                );
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache payload, skipping store");
            }
        }
    }
}
