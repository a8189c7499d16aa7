//! Cache port.
//!
//! A narrow {get, set} capability so alternate backends (in-memory,
//! distributed) satisfy it without the core depending on a concrete store.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Port trait for a process-local (or remote) key-value cache with
/// per-entry expiration.
///
/// `set` overwrites any prior entry for the key with an absolute expiry of
/// `now + ttl`. `get` returns the stored value only while unexpired; an
/// expired or missing entry is "absent", never an error. Values are typed
/// per call site - payloads cross the port serialized, which is what lets a
/// remote backend satisfy the same contract.
#[async_trait::async_trait]
pub trait RateCache: Send + Sync + 'static {
    /// Returns the unexpired value stored under `key`, if any.
    async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Send;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set<T>(&self, key: &str, value: &T, ttl: Duration)
    where
        T: Serialize + Sync;
}
