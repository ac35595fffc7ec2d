//! brapi.dev adapter for B3 equities and listed funds.
//!
//! One struct serves either the equity or the fund segment of the same
//! upstream: the listing endpoint is shared, segments split on the B3
//! convention that listed funds carry the "11" ticker suffix. Only the
//! equity listing has true server-side pagination; the fund view returns a
//! bounded set of liquid FIIs on every call, behind a provider-local
//! 30-minute cache with a static fallback table.

use crate::core::asset::{Asset, AssetType, PagedAssets};
use crate::core::dividend::{Dividend, DividendHistory};
use crate::core::quote::{Quote, QuoteProvider, QuoteSource};
use crate::providers::util::{ListingCache, http_client, with_retry};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const LISTING_PAGE_SIZE: u32 = 50;
const FUND_LISTING_LIMIT: usize = 30;
const FUND_LISTING_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment {
    Equities,
    Funds,
}

pub struct BrapiProvider {
    base_url: String,
    api_key: Option<String>,
    segment: Segment,
    listing_cache: Option<ListingCache>,
}

impl BrapiProvider {
    /// Equity segment: paginated listing, quote-by-ticker.
    pub fn equities(base_url: &str, api_key: Option<&str>) -> Self {
        BrapiProvider {
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
            segment: Segment::Equities,
            listing_cache: None,
        }
    }

    /// Fund segment: bounded FII set with a provider-local listing cache.
    pub fn funds(base_url: &str, api_key: Option<&str>) -> Self {
        BrapiProvider {
            base_url: base_url.to_string(),
            api_key: api_key.map(str::to_string),
            segment: Segment::Funds,
            listing_cache: Some(ListingCache::new(FUND_LISTING_TTL)),
        }
    }

    fn with_token(&self, url: String) -> String {
        match &self.api_key {
            Some(key) if url.contains('?') => format!("{url}&token={key}"),
            Some(key) => format!("{url}?token={key}"),
            None => url,
        }
    }

    async fn quote_inner(&self, ticker: &str) -> Result<Quote> {
        let url = self.with_token(format!("{}/quote/{}", self.base_url, ticker));
        debug!("Requesting quote from {}", url);

        let client = http_client()?;
        let response = with_retry(|| async { client.get(&url).send().await }, 2, 500)
            .await
            .with_context(|| format!("Failed to send quote request for {ticker}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for ticker: {}",
                response.status(),
                ticker
            ));
        }

        let text = response.text().await?;
        let data: BrapiQuoteResponse = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse brapi response for {ticker}"))?;

        let result = data
            .results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No quote data found for ticker: {}", ticker))?;

        let price = result
            .regular_market_price
            .filter(|p| *p > 0.0)
            .ok_or_else(|| anyhow!("Missing or non-positive price for ticker: {}", ticker))?;

        Ok(Quote {
            ticker: result.symbol.to_uppercase(),
            price,
            change: result.regular_market_change.unwrap_or(0.0),
            change_percent: result.regular_market_change_percent.unwrap_or(0.0),
            volume: result.regular_market_volume,
            retrieved_at: Utc::now(),
            source: QuoteSource::Brapi,
        })
    }

    async fn equity_listing(&self, page: u32) -> Result<PagedAssets> {
        let url = self.with_token(format!(
            "{}/quote/list?page={}&limit={}&sortBy=volume&sortOrder=desc",
            self.base_url, page, LISTING_PAGE_SIZE
        ));
        debug!("Requesting equity listing from {}", url);

        let client = http_client()?;
        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for equity listing", response.status()));
        }

        let data: BrapiListResponse = response.json().await?;
        let assets: Vec<Asset> = data
            .stocks
            .into_iter()
            .filter(|item| !item.stock.ends_with("11"))
            .filter_map(|item| item.into_asset(AssetType::Equity))
            .collect();

        Ok(PagedAssets {
            // An upstream totalPages of 0 would make every page "past the
            // end"; clamp to 1.
            total_pages: data.total_pages.unwrap_or(1).max(1),
            total_count: data.total_count.unwrap_or(assets.len() as u64),
            current_page: page,
            assets,
        })
    }

    async fn fund_listing(&self) -> Result<Vec<Asset>> {
        let url = self.with_token(format!(
            "{}/quote/list?limit=100&sortBy=volume&sortOrder=desc&type=fund",
            self.base_url
        ));
        debug!("Requesting fund listing from {}", url);

        let client = http_client()?;
        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for fund listing", response.status()));
        }

        let data: BrapiListResponse = response.json().await?;
        let funds: Vec<Asset> = data
            .stocks
            .into_iter()
            .filter(|item| item.stock.ends_with("11"))
            .take(FUND_LISTING_LIMIT)
            .filter_map(|item| item.into_asset(AssetType::Fund))
            .collect();

        if funds.is_empty() {
            return Err(anyhow!("Fund listing came back empty"));
        }
        Ok(funds)
    }

    /// Payment history for a ticker, for dividend summaries and projections.
    #[instrument(name = "BrapiDividends", skip(self), fields(ticker = %ticker))]
    pub async fn fetch_dividends(&self, ticker: &str) -> Option<DividendHistory> {
        match self.dividends_inner(ticker).await {
            Ok(history) => Some(history),
            Err(e) => {
                warn!("brapi dividend lookup failed for {}: {:#}", ticker, e);
                None
            }
        }
    }

    async fn dividends_inner(&self, ticker: &str) -> Result<DividendHistory> {
        let url = self.with_token(format!(
            "{}/quote/{}?dividends=true",
            self.base_url, ticker
        ));
        debug!("Requesting dividend data from {}", url);

        let client = http_client()?;
        let response = with_retry(|| async { client.get(&url).send().await }, 2, 500)
            .await
            .with_context(|| format!("Failed to send dividend request for {ticker}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for ticker: {}",
                response.status(),
                ticker
            ));
        }

        let data: BrapiQuoteResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse dividend response for {ticker}"))?;

        let result = data
            .results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No dividend data found for ticker: {}", ticker))?;

        let mut dividends: Vec<Dividend> = result
            .dividends_data
            .unwrap_or_default()
            .cash_dividends
            .into_iter()
            .filter_map(|div| {
                let date = parse_payment_date(div.payment_date.as_deref()?)?;
                let amount = div.rate?;
                (amount > 0.0).then_some(Dividend { date, amount })
            })
            .collect();
        // Most recent first
        dividends.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(DividendHistory {
            ticker: result.symbol.to_uppercase(),
            current_price: result.regular_market_price.unwrap_or(0.0),
            dividends,
        })
    }
}

/// brapi reports payment dates either as full RFC 3339 timestamps or as
/// bare dates.
fn parse_payment_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[derive(Debug, Deserialize)]
struct BrapiQuoteResponse {
    #[serde(default)]
    results: Vec<BrapiQuoteResult>,
}

#[derive(Debug, Deserialize)]
struct BrapiQuoteResult {
    symbol: String,
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(alias = "regularMarketChange")]
    regular_market_change: Option<f64>,
    #[serde(alias = "regularMarketChangePercent")]
    regular_market_change_percent: Option<f64>,
    #[serde(alias = "regularMarketVolume")]
    regular_market_volume: Option<u64>,
    #[serde(alias = "dividendsData")]
    dividends_data: Option<BrapiDividendsData>,
}

#[derive(Debug, Deserialize, Default)]
struct BrapiDividendsData {
    #[serde(alias = "cashDividends", default)]
    cash_dividends: Vec<BrapiCashDividend>,
}

#[derive(Debug, Deserialize)]
struct BrapiCashDividend {
    #[serde(alias = "paymentDate")]
    payment_date: Option<String>,
    rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BrapiListResponse {
    #[serde(default)]
    stocks: Vec<BrapiListItem>,
    #[serde(alias = "totalPages")]
    total_pages: Option<u32>,
    #[serde(alias = "totalCount")]
    total_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BrapiListItem {
    stock: String,
    name: String,
    close: Option<f64>,
    change: Option<f64>,
    logo: Option<String>,
}

impl BrapiListItem {
    fn into_asset(self, asset_type: AssetType) -> Option<Asset> {
        let price = self.close.filter(|p| *p > 0.0)?;
        Some(Asset {
            ticker: self.stock.to_uppercase(),
            display_name: self.name,
            price,
            change_percent: self.change.unwrap_or(0.0),
            asset_type,
            logo_url: self.logo,
        })
    }
}

/// Liquid FIIs served when the fund listing upstream is down.
fn fallback_funds() -> Vec<Asset> {
    [
        ("HGLG11", "CSHG Logística FII", 160.00, 0.5),
        ("VISC11", "Vinci Shopping Centers FII", 115.00, 0.3),
        ("KNRI11", "Kinea Renda Imobiliária FII", 145.00, -0.2),
        ("XPML11", "XP Malls FII", 105.00, 0.8),
        ("BTLG11", "BTG Pactual Logística FII", 98.00, 0.4),
        ("MXRF11", "Maxi Renda FII", 10.50, 0.1),
        ("HGRE11", "CSHG Real Estate FII", 125.00, 0.6),
        ("RECT11", "Recebíveis Imobiliários FII", 95.00, -0.1),
    ]
    .into_iter()
    .map(|(ticker, name, price, change)| Asset {
        ticker: ticker.to_string(),
        display_name: name.to_string(),
        price,
        change_percent: change,
        asset_type: AssetType::Fund,
        logo_url: None,
    })
    .collect()
}

#[async_trait]
impl QuoteProvider for BrapiProvider {
    fn id(&self) -> QuoteSource {
        QuoteSource::Brapi
    }

    #[instrument(name = "BrapiQuoteFetch", skip(self), fields(ticker = %ticker))]
    async fn fetch_quote(&self, ticker: &str) -> Option<Quote> {
        match self.quote_inner(ticker).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!("brapi quote lookup failed for {}: {:#}", ticker, e);
                None
            }
        }
    }

    async fn fetch_listing(&self, page: u32) -> PagedAssets {
        match self.segment {
            Segment::Equities => match self.equity_listing(page).await {
                Ok(listing) => listing,
                Err(e) => {
                    warn!("brapi equity listing failed: {:#}", e);
                    PagedAssets::empty(page)
                }
            },
            Segment::Funds => {
                // The fund set is small and static-ish; the page number is
                // ignored and the whole set returns on every call.
                if let Some(cache) = &self.listing_cache {
                    if let Some(assets) = cache.get().await {
                        return PagedAssets {
                            total_pages: 1,
                            total_count: assets.len() as u64,
                            current_page: 1,
                            assets,
                        };
                    }
                }

                let assets = match self.fund_listing().await {
                    Ok(funds) => {
                        if let Some(cache) = &self.listing_cache {
                            cache.put(funds.clone()).await;
                        }
                        funds
                    }
                    Err(e) => {
                        warn!("brapi fund listing failed, using reference set: {:#}", e);
                        fallback_funds()
                    }
                };

                PagedAssets {
                    total_pages: 1,
                    total_count: assets.len() as u64,
                    current_page: 1,
                    assets,
                }
            }
        }
    }
}
