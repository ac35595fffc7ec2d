//! Yahoo Finance adapter, the secondary quote source for B3 equities.
//!
//! Quote-only: Yahoo has no usable B3 catalog, so `fetch_listing` returns
//! an empty page. Tickers are normalized to the `.SA` exchange suffix
//! before querying; the suffix never appears in the returned quote.

use crate::core::asset::PagedAssets;
use crate::core::quote::{Quote, QuoteProvider, QuoteSource};
use crate::providers::util::http_client;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

pub struct YahooProvider {
    base_url: String,
}

impl YahooProvider {
    pub fn new(base_url: &str) -> Self {
        YahooProvider {
            base_url: base_url.to_string(),
        }
    }

    fn exchange_symbol(ticker: &str) -> String {
        if ticker.ends_with(".SA") {
            ticker.to_string()
        } else {
            format!("{ticker}.SA")
        }
    }

    async fn quote_inner(&self, ticker: &str) -> Result<Quote> {
        let symbol = Self::exchange_symbol(ticker);
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        debug!("Requesting quote from {}", url);

        let client = http_client()?;
        let response = client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request error for symbol: {symbol}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse Yahoo response for {symbol}"))?;

        let item = data
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No quote data found for symbol: {}", symbol))?;

        let price = item.meta.regular_market_price;
        if price <= 0.0 {
            return Err(anyhow!("Non-positive price for symbol: {}", symbol));
        }

        // Daily change is derived from the previous close when present.
        let (change, change_percent) = match item.meta.previous_close.filter(|p| *p > 0.0) {
            Some(prev) => (price - prev, ((price - prev) / prev) * 100.0),
            None => (0.0, 0.0),
        };

        Ok(Quote {
            ticker: ticker.trim_end_matches(".SA").to_uppercase(),
            price,
            change,
            change_percent,
            volume: item.meta.regular_market_volume,
            retrieved_at: Utc::now(),
            source: QuoteSource::YahooFinance,
        })
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    result: Vec<ChartItem>,
}

#[derive(Debug, Deserialize)]
struct ChartItem {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
    #[serde(alias = "chartPreviousClose")]
    previous_close: Option<f64>,
    #[serde(alias = "regularMarketVolume")]
    regular_market_volume: Option<u64>,
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> QuoteSource {
        QuoteSource::YahooFinance
    }

    #[instrument(name = "YahooQuoteFetch", skip(self), fields(ticker = %ticker))]
    async fn fetch_quote(&self, ticker: &str) -> Option<Quote> {
        match self.quote_inner(ticker).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!("yahoo quote lookup failed for {}: {:#}", ticker, e);
                None
            }
        }
    }

    async fn fetch_listing(&self, page: u32) -> PagedAssets {
        // Quote-only source
        PagedAssets::empty(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_chart_server(symbol: &str, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{symbol}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_successful_quote_with_sa_suffix() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": 38.45,
                        "chartPreviousClose": 38.0,
                        "regularMarketVolume": 1000000
                    }
                }]
            }
        }"#;
        let server = mock_chart_server("PETR4.SA", body).await;

        let provider = YahooProvider::new(&server.uri());
        let quote = provider.fetch_quote("PETR4").await.unwrap();

        assert_eq!(quote.ticker, "PETR4");
        assert_eq!(quote.price, 38.45);
        assert!((quote.change - 0.45).abs() < 1e-9);
        assert!((quote.change_percent - (0.45 / 38.0 * 100.0)).abs() < 1e-9);
        assert_eq!(quote.volume, Some(1_000_000));
        assert_eq!(quote.source, QuoteSource::YahooFinance);
    }

    #[tokio::test]
    async fn test_missing_previous_close_means_zero_change() {
        let body = r#"{
            "chart": {
                "result": [{"meta": {"regularMarketPrice": 38.45}}]
            }
        }"#;
        let server = mock_chart_server("PETR4.SA", body).await;

        let provider = YahooProvider::new(&server.uri());
        let quote = provider.fetch_quote("PETR4").await.unwrap();
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.change_percent, 0.0);
    }

    #[tokio::test]
    async fn test_empty_chart_result_is_not_found() {
        let server = mock_chart_server("ZZZZ3.SA", r#"{"chart": {"result": []}}"#).await;
        let provider = YahooProvider::new(&server.uri());
        assert!(provider.fetch_quote("ZZZZ3").await.is_none());
    }

    #[tokio::test]
    async fn test_non_positive_price_is_not_found() {
        let body = r#"{"chart": {"result": [{"meta": {"regularMarketPrice": 0.0}}]}}"#;
        let server = mock_chart_server("PETR4.SA", body).await;
        let provider = YahooProvider::new(&server.uri());
        assert!(provider.fetch_quote("PETR4").await.is_none());
    }

    #[tokio::test]
    async fn test_http_error_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/PETR4.SA"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = YahooProvider::new(&server.uri());
        assert!(provider.fetch_quote("PETR4").await.is_none());
    }

    #[tokio::test]
    async fn test_listing_is_empty() {
        let provider = YahooProvider::new("http://localhost:1");
        let listing = provider.fetch_listing(3).await;
        assert!(listing.assets.is_empty());
        assert_eq!(listing.current_page, 3);
    }
}
