use crate::core::cache::{CacheEntry, QUOTE_TTL, QuoteCache};
use crate::core::quote::Quote;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory quote cache. Used by tests and as the fallback when the disk
/// store cannot be opened.
pub struct MemoryQuoteCache {
    inner: Arc<Mutex<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl MemoryQuoteCache {
    pub fn new() -> Self {
        Self::with_ttl(QUOTE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }
}

impl Default for MemoryQuoteCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteCache for MemoryQuoteCache {
    async fn get(&self, ticker: &str) -> Option<Quote> {
        let cache = self.inner.lock().await;
        if let Some(entry) = cache.get(ticker) {
            if !entry.is_fresh(self.ttl) {
                debug!("Cache entry stale for ticker: {}", ticker);
                return None;
            }
            debug!("Cache HIT for ticker: {}", ticker);
            return Some(entry.quote.clone());
        }
        debug!("Cache MISS for ticker: {}", ticker);
        None
    }

    async fn put(&self, ticker: &str, quote: &Quote) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for ticker: {}", ticker);
        cache.insert(ticker.to_string(), CacheEntry::new(quote.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quote::QuoteSource;
    use chrono::Utc;
    use tokio::time::sleep;

    fn quote(ticker: &str, price: f64) -> Quote {
        Quote {
            ticker: ticker.to_string(),
            price,
            change: 0.1,
            change_percent: 0.5,
            volume: None,
            retrieved_at: Utc::now(),
            source: QuoteSource::Brapi,
        }
    }

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = MemoryQuoteCache::new();

        // Initially, cache is empty
        assert!(cache.get("PETR4").await.is_none());

        cache.put("PETR4", &quote("PETR4", 38.45)).await;

        let cached = cache.get("PETR4").await.unwrap();
        assert_eq!(cached.price, 38.45);
        assert_eq!(cached.source, QuoteSource::Brapi);

        // Get a non-existent ticker
        assert!(cache.get("VALE3").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_ttl_expiration() {
        let cache = MemoryQuoteCache::with_ttl(Duration::from_millis(10));

        cache.put("PETR4", &quote("PETR4", 38.45)).await;
        assert!(cache.get("PETR4").await.is_some());

        // Wait for the validity window to pass
        sleep(Duration::from_millis(20)).await;
        assert!(cache.get("PETR4").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_upsert_overwrites() {
        let cache = MemoryQuoteCache::new();

        cache.put("PETR4", &quote("PETR4", 38.45)).await;
        cache.put("PETR4", &quote("PETR4", 39.10)).await;

        let cached = cache.get("PETR4").await.unwrap();
        assert_eq!(cached.price, 39.10);
    }
}
