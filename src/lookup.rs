//! Cache-gated IP information lookup.

use crate::cache::InfoCache;
use crate::record::InfoRecord;
use crate::source::{InfoSource, LookupError};
use crate::store::Clock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fetches the IP information record, serving bursts of calls from a
/// short-lived cache.
///
/// The cache check and the write after a fetch are not atomic. Concurrent
/// callers may each fetch once; the record is idempotent so the last write
/// wins.
pub struct InfoLookup {
    source: Box<dyn InfoSource>,
    cache: Option<InfoCache>,
    clock: Arc<dyn Clock>,
}

impl InfoLookup {
    /// Create a lookup that consults `cache` before `source`.
    pub fn new(source: Box<dyn InfoSource>, cache: InfoCache, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache: Some(cache),
            clock,
        }
    }

    /// Create a lookup that always fetches.
    pub fn uncached(source: Box<dyn InfoSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache: None,
            clock,
        }
    }

    /// Get the record, from cache when fresh, otherwise from the source.
    pub async fn get_info(&self) -> Result<InfoRecord, LookupError> {
        let now = self.clock.now_ms();

        if let Some(ref cache) = self.cache {
            if let Some(record) = cache.get(now) {
                debug!(source = self.source.name(), "Info cache hit");
                return Ok(record);
            }
            debug!(source = self.source.name(), "Info cache miss");
        }

        let body = self.source.fetch().await?;
        let record = InfoRecord::from_json(&body)?;

        if let Some(ref cache) = self.cache {
            // The record is still usable when persisting fails
            if let Err(e) = cache.set(&body, now) {
                warn!(error = %e, "Failed to cache info record");
            }
        }

        debug!(
            source = self.source.name(),
            fraud_score = ?record.fraud_score,
            residential = ?record.is_residential,
            broadcast = ?record.is_broadcast,
            "Info lookup complete"
        );

        Ok(record)
    }
}
