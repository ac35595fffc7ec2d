use crate::core::asset::Asset;
use anyhow::Error;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Per-request timeout for upstream calls. One unresponsive provider must
/// not stall a resolution; on timeout the adapter reports not-found and the
/// fallback chain proceeds.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client shared by the provider adapters.
pub fn http_client() -> Result<reqwest::Client, Error> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("carteira/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(anyhow::Error::from) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Provider-local whole-listing cache.
///
/// Independent of the shared quote cache: it only smooths repeated catalog
/// browses against upstreams that return their full set on every call.
pub struct ListingCache {
    inner: Mutex<Option<(Instant, Vec<Asset>)>>,
    ttl: Duration,
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(None),
            ttl,
        }
    }

    pub async fn get(&self) -> Option<Vec<Asset>> {
        let cached = self.inner.lock().await;
        match cached.as_ref() {
            Some((stored_at, assets)) if stored_at.elapsed() <= self.ttl => {
                debug!("Listing cache HIT");
                Some(assets.clone())
            }
            _ => {
                debug!("Listing cache MISS");
                None
            }
        }
    }

    pub async fn put(&self, assets: Vec<Asset>) {
        let mut cached = self.inner.lock().await;
        debug!("Listing cache PUT ({} assets)", assets.len());
        *cached = Some((Instant::now(), assets));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::AssetType;

    fn asset(ticker: &str) -> Asset {
        Asset {
            ticker: ticker.to_string(),
            display_name: ticker.to_string(),
            price: 10.0,
            change_percent: 0.0,
            asset_type: AssetType::Crypto,
            logo_url: None,
        }
    }

    #[tokio::test]
    async fn test_listing_cache_round_trip() {
        let cache = ListingCache::new(Duration::from_secs(60));
        assert!(cache.get().await.is_none());

        cache.put(vec![asset("BTC"), asset("ETH")]).await;

        let cached = cache.get().await.unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].ticker, "BTC");
    }

    #[tokio::test]
    async fn test_listing_cache_expires() {
        let cache = ListingCache::new(Duration::from_millis(10));
        cache.put(vec![asset("BTC")]).await;
        assert!(cache.get().await.is_some());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.get().await.is_none());
    }
}
