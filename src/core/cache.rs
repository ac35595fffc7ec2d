//! Quote cache seam

use crate::core::quote::Quote;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Validity window for cached quotes. Entries older than this are treated
/// as missing at read time.
pub const QUOTE_TTL: Duration = Duration::from_secs(5 * 60);

/// Persisted wrapper around a quote. One entry per ticker; writes overwrite
/// the prior entry, no history retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub quote: Quote,
    pub stored_at_ms: i64,
}

impl CacheEntry {
    pub fn new(quote: Quote) -> Self {
        CacheEntry {
            quote,
            stored_at_ms: Utc::now().timestamp_millis(),
        }
    }

    /// Age comparison happens at read time; a stale entry is simply ignored
    /// until the next successful resolution overwrites it.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        let age = Utc::now().timestamp_millis() - self.stored_at_ms;
        age <= ttl.as_millis() as i64
    }
}

/// Durable ticker -> quote store with a fixed validity window.
///
/// `get` returns `None` both when no entry exists and when the stored entry
/// is older than the window; callers cannot distinguish the two and need
/// not, since both trigger the same upstream fallback.
///
/// The cache is a performance optimization, not a correctness dependency:
/// implementations log their own read/write failures and surface them as a
/// miss (reads) or a no-op (writes).
#[async_trait]
pub trait QuoteCache: Send + Sync {
    async fn get(&self, ticker: &str) -> Option<Quote>;

    /// Upsert keyed by ticker. Last writer wins.
    async fn put(&self, ticker: &str, quote: &Quote);
}
