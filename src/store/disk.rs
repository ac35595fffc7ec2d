use crate::core::cache::{CacheEntry, QUOTE_TTL, QuoteCache};
use crate::core::quote::Quote;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Durable quote cache backed by a fjall partition.
///
/// Values are serde_json-encoded [`CacheEntry`] records keyed by ticker.
/// Stale entries are not removed at read time; the next successful
/// resolution overwrites them.
pub struct FjallQuoteCache {
    _keyspace: Keyspace,
    partition: PartitionHandle,
    ttl: Duration,
}

impl FjallQuoteCache {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_ttl(path, QUOTE_TTL)
    }

    pub fn open_with_ttl(path: &Path, ttl: Duration) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let keyspace = fjall::Config::new(path).open()?;
        let partition = keyspace.open_partition("quotes", PartitionCreateOptions::default())?;
        Ok(Self {
            _keyspace: keyspace,
            partition,
            ttl,
        })
    }
}

#[async_trait]
impl QuoteCache for FjallQuoteCache {
    async fn get(&self, ticker: &str) -> Option<Quote> {
        let res: Result<Option<Quote>> = (|| {
            if let Some(value) = self.partition.get(ticker.as_bytes())? {
                let entry: CacheEntry = serde_json::from_slice(&value)?;
                if !entry.is_fresh(self.ttl) {
                    debug!("Cache entry stale for ticker: {}", ticker);
                    return Ok(None);
                }
                debug!("Cache HIT for ticker: {}", ticker);
                return Ok(Some(entry.quote));
            }
            debug!("Cache MISS for ticker: {}", ticker);
            Ok(None)
        })();

        match res {
            Ok(val) => val,
            Err(e) => {
                // A broken store is a miss, never a failed resolution
                warn!("Quote cache read error for {}: {}", ticker, e);
                None
            }
        }
    }

    async fn put(&self, ticker: &str, quote: &Quote) {
        let res: Result<()> = (|| {
            let entry = CacheEntry::new(quote.clone());
            self.partition
                .insert(ticker.as_bytes(), serde_json::to_vec(&entry)?)?;
            debug!("Cache PUT for ticker: {}", ticker);
            Ok(())
        })();
        if let Err(e) = res {
            warn!("Quote cache write error for {}: {}", ticker, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quote::QuoteSource;
    use chrono::Utc;
    use tempfile::tempdir;
    use tokio::time::sleep;

    fn quote(ticker: &str, price: f64) -> Quote {
        Quote {
            ticker: ticker.to_string(),
            price,
            change: 0.2,
            change_percent: 0.8,
            volume: Some(42),
            retrieved_at: Utc::now(),
            source: QuoteSource::YahooFinance,
        }
    }

    #[tokio::test]
    async fn test_disk_cache_get_put() {
        let dir = tempdir().unwrap();
        let cache = FjallQuoteCache::open(dir.path()).unwrap();

        assert!(cache.get("PETR4").await.is_none());

        cache.put("PETR4", &quote("PETR4", 38.45)).await;

        let cached = cache.get("PETR4").await.unwrap();
        assert_eq!(cached.price, 38.45);
        assert_eq!(cached.volume, Some(42));
        assert_eq!(cached.source, QuoteSource::YahooFinance);

        assert!(cache.get("VALE3").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_ttl_expiration() {
        let dir = tempdir().unwrap();
        let cache = FjallQuoteCache::open_with_ttl(dir.path(), Duration::from_millis(10)).unwrap();

        cache.put("PETR4", &quote("PETR4", 38.45)).await;
        assert!(cache.get("PETR4").await.is_some());

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get("PETR4").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let cache = FjallQuoteCache::open(dir.path()).unwrap();
            cache.put("PETR4", &quote("PETR4", 38.45)).await;
        }

        let cache = FjallQuoteCache::open(dir.path()).unwrap();
        let cached = cache.get("PETR4").await.unwrap();
        assert_eq!(cached.price, 38.45);
    }

    #[tokio::test]
    async fn test_disk_cache_upsert_overwrites() {
        let dir = tempdir().unwrap();
        let cache = FjallQuoteCache::open(dir.path()).unwrap();

        cache.put("PETR4", &quote("PETR4", 38.45)).await;
        cache.put("PETR4", &quote("PETR4", 39.10)).await;

        assert_eq!(cache.get("PETR4").await.unwrap().price, 39.10);
    }
}
