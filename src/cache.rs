//! Short-lived cache for the last IPPure lookup.
//!
//! The cache holds a single record in two store slots: the response body as
//! received and the epoch-millisecond timestamp of the fetch. Both slots are read and
//! written independently.

use crate::config::CacheConfig;
use crate::record::InfoRecord;
use crate::store::{KeyValueStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Raw cache entry as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Response body, decoded into an [`InfoRecord`] on read.
    pub value: String,
    /// When the record was fetched (epoch milliseconds).
    pub timestamp_ms: u64,
}

impl CacheEntry {
    /// Check if this entry is older than `ttl` at `now_ms`.
    ///
    /// A timestamp ahead of `now_ms` counts as age zero.
    pub fn is_expired(&self, now_ms: u64, ttl: Duration) -> bool {
        u128::from(now_ms.saturating_sub(self.timestamp_ms)) >= ttl.as_millis()
    }
}

/// Single-record TTL cache over a [`KeyValueStore`].
pub struct InfoCache {
    store: Arc<dyn KeyValueStore>,
    value_key: String,
    timestamp_key: String,
    ttl: Duration,
}

impl InfoCache {
    /// Create a cache using the given store slots.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        value_key: impl Into<String>,
        timestamp_key: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            value_key: value_key.into(),
            timestamp_key: timestamp_key.into(),
            ttl,
        }
    }

    /// Create a cache from configuration.
    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &CacheConfig) -> Self {
        Self::new(
            store,
            config.value_key.clone(),
            config.timestamp_key.clone(),
            Duration::from_millis(config.ttl_ms),
        )
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Read both slots. Returns `None` unless both are present and the
    /// timestamp is a positive integer.
    pub fn entry(&self) -> Option<CacheEntry> {
        let timestamp_ms = self
            .store
            .get(&self.timestamp_key)
            .and_then(|ts| ts.trim().parse::<u64>().ok())
            .filter(|ts| *ts > 0)?;
        let value = self.store.get(&self.value_key).filter(|v| !v.is_empty())?;

        Some(CacheEntry {
            value,
            timestamp_ms,
        })
    }

    /// Get the cached record if present, fresh at `now_ms`, and decodable.
    pub fn get(&self, now_ms: u64) -> Option<InfoRecord> {
        let entry = self.entry()?;

        if entry.is_expired(now_ms, self.ttl) {
            debug!(
                age_ms = now_ms.saturating_sub(entry.timestamp_ms),
                "Cached record expired"
            );
            return None;
        }

        match InfoRecord::from_json(&entry.value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "Cached record unreadable, treating as miss");
                None
            }
        }
    }

    /// Store a freshly fetched response body as received, then its timestamp.
    pub fn set(&self, body: &str, now_ms: u64) -> Result<(), StoreError> {
        self.store.set(&self.value_key, body)?;
        self.store.set(&self.timestamp_key, &now_ms.to_string())?;
        Ok(())
    }
}
