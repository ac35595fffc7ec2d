//! Binance adapter for crypto quotes and listings.
//!
//! Quotes come from the single-symbol 24h ticker endpoint; the catalog is
//! a fixed set of liquid USDT pairs filtered out of the bulk 24h feed,
//! behind a provider-local 30-minute listing cache. Pair suffixes are
//! appended for the request and stripped again on output, so callers only
//! ever see bare symbols like "BTC".

use crate::core::asset::{Asset, AssetType, PagedAssets};
use crate::core::quote::{Quote, QuoteProvider, QuoteSource};
use crate::providers::util::{ListingCache, http_client};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const LISTING_TTL: Duration = Duration::from_secs(30 * 60);

/// Liquid USDT pairs served by the catalog.
const POPULAR_PAIRS: [&str; 14] = [
    "BTCUSDT", "ETHUSDT", "BNBUSDT", "ADAUSDT", "DOGEUSDT", "XRPUSDT", "DOTUSDT", "UNIUSDT",
    "LTCUSDT", "LINKUSDT", "MATICUSDT", "SOLUSDT", "AVAXUSDT", "ATOMUSDT",
];

pub struct BinanceProvider {
    base_url: String,
    listing_cache: ListingCache,
}

impl BinanceProvider {
    pub fn new(base_url: &str) -> Self {
        BinanceProvider {
            base_url: base_url.to_string(),
            listing_cache: ListingCache::new(LISTING_TTL),
        }
    }

    fn pair_symbol(ticker: &str) -> String {
        if ticker.ends_with("USDT") {
            ticker.to_string()
        } else {
            format!("{ticker}USDT")
        }
    }

    async fn quote_inner(&self, ticker: &str) -> Result<Quote> {
        let symbol = Self::pair_symbol(ticker);
        let url = format!("{}/ticker/24hr?symbol={}", self.base_url, symbol);
        debug!("Requesting quote from {}", url);

        let client = http_client()?;
        let response = client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request error for pair: {symbol}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for pair: {}",
                response.status(),
                symbol
            ));
        }

        let ticker_data: BinanceTicker = response
            .json()
            .await
            .with_context(|| format!("Failed to parse Binance response for {symbol}"))?;

        ticker_data
            .into_quote()
            .ok_or_else(|| anyhow!("Missing or non-positive price for pair: {}", symbol))
    }

    async fn listing_inner(&self) -> Result<Vec<Asset>> {
        let url = format!("{}/ticker/24hr", self.base_url);
        debug!("Requesting 24h tickers from {}", url);

        let client = http_client()?;
        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for 24h tickers", response.status()));
        }

        let tickers: Vec<BinanceTicker> = response.json().await?;
        let assets = tickers
            .into_iter()
            .filter(|t| POPULAR_PAIRS.contains(&t.symbol.as_str()))
            .filter_map(BinanceTicker::into_asset)
            .collect();
        Ok(assets)
    }
}

/// Binance reports numbers as strings on the 24h endpoint.
#[derive(Debug, Deserialize)]
struct BinanceTicker {
    symbol: String,
    #[serde(alias = "lastPrice")]
    last_price: String,
    #[serde(alias = "priceChangePercent")]
    price_change_percent: String,
    #[serde(alias = "priceChange")]
    price_change: Option<String>,
    volume: Option<String>,
}

impl BinanceTicker {
    fn bare_symbol(&self) -> String {
        self.symbol.trim_end_matches("USDT").to_uppercase()
    }

    fn price(&self) -> Option<f64> {
        self.last_price.parse::<f64>().ok().filter(|p| *p > 0.0)
    }

    fn into_quote(self) -> Option<Quote> {
        let price = self.price()?;
        Some(Quote {
            ticker: self.bare_symbol(),
            price,
            change: self
                .price_change
                .as_deref()
                .and_then(|c| c.parse().ok())
                .unwrap_or(0.0),
            change_percent: self.price_change_percent.parse().unwrap_or(0.0),
            volume: self
                .volume
                .as_deref()
                .and_then(|v| v.parse::<f64>().ok())
                .map(|v| v as u64),
            retrieved_at: Utc::now(),
            source: QuoteSource::Binance,
        })
    }

    fn into_asset(self) -> Option<Asset> {
        let price = self.price()?;
        let name = self.bare_symbol();
        Some(Asset {
            ticker: name.clone(),
            display_name: name,
            price,
            change_percent: self.price_change_percent.parse().unwrap_or(0.0),
            asset_type: AssetType::Crypto,
            logo_url: None,
        })
    }
}

#[async_trait]
impl QuoteProvider for BinanceProvider {
    fn id(&self) -> QuoteSource {
        QuoteSource::Binance
    }

    #[instrument(name = "BinanceQuoteFetch", skip(self), fields(ticker = %ticker))]
    async fn fetch_quote(&self, ticker: &str) -> Option<Quote> {
        match self.quote_inner(ticker).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!("binance quote lookup failed for {}: {:#}", ticker, e);
                None
            }
        }
    }

    async fn fetch_listing(&self, page: u32) -> PagedAssets {
        // Small fixed set: the page number is ignored.
        let _ = page;
        if let Some(assets) = self.listing_cache.get().await {
            return PagedAssets {
                total_pages: 1,
                total_count: assets.len() as u64,
                current_page: 1,
                assets,
            };
        }

        match self.listing_inner().await {
            Ok(assets) => {
                self.listing_cache.put(assets.clone()).await;
                PagedAssets {
                    total_pages: 1,
                    total_count: assets.len() as u64,
                    current_page: 1,
                    assets,
                }
            }
            Err(e) => {
                warn!("binance listing failed: {:#}", e);
                PagedAssets::empty(1)
            }
        }
    }
}
