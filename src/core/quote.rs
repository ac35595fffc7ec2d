//! Quote abstractions and the provider seam

use crate::core::asset::PagedAssets;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifies where a quote came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuoteSource {
    Cache,
    YahooFinance,
    Brapi,
    Binance,
    Treasury,
    Fallback,
}

impl Display for QuoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                QuoteSource::Cache => "cache",
                QuoteSource::YahooFinance => "yahoo-finance",
                QuoteSource::Brapi => "brapi",
                QuoteSource::Binance => "binance",
                QuoteSource::Treasury => "treasury",
                QuoteSource::Fallback => "fallback",
            }
        )
    }
}

/// Normalized market snapshot for one ticker.
///
/// `retrieved_at` is when the value was obtained from an upstream provider,
/// not when it was last read from the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: Option<u64>,
    pub retrieved_at: DateTime<Utc>,
    pub source: QuoteSource,
}

impl Quote {
    /// Best-effort quote built from a caller-supplied reference price after
    /// every source has been exhausted.
    pub fn degraded(ticker: &str, reference_price: f64) -> Self {
        Quote {
            ticker: ticker.to_string(),
            price: reference_price,
            change: 0.0,
            change_percent: 0.0,
            volume: None,
            retrieved_at: Utc::now(),
            source: QuoteSource::Fallback,
        }
    }
}

/// One upstream data source, specialized to an asset category.
///
/// Implementations convert every failure mode (network, timeout, non-2xx,
/// malformed payload, unknown ticker) into `None` / an empty page plus a
/// logged diagnostic. Transport errors never cross this boundary.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn id(&self) -> QuoteSource;

    async fn fetch_quote(&self, ticker: &str) -> Option<Quote>;

    async fn fetch_listing(&self, page: u32) -> PagedAssets;
}
