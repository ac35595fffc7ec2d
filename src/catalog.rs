//! Asset catalog aggregation.
//!
//! A browse-only read path: one asset type delegates straight to that
//! type's provider, the "all" view is an approximate union of every
//! category fetched concurrently. Listings never touch the quote cache
//! and may run minutes staler than a direct resolution for the same
//! ticker.

use crate::core::asset::{AssetType, PagedAssets};
use crate::core::quote::QuoteProvider;
use anyhow::anyhow;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFilter {
    All,
    Only(AssetType),
}

impl std::fmt::Display for CatalogFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogFilter::All => write!(f, "all"),
            CatalogFilter::Only(t) => write!(f, "{t}"),
        }
    }
}

impl FromStr for CatalogFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(CatalogFilter::All);
        }
        s.parse::<AssetType>()
            .map(CatalogFilter::Only)
            .map_err(|_| anyhow!("Invalid catalog filter: {}", s))
    }
}

pub struct AssetCatalog {
    equity: Arc<dyn QuoteProvider>,
    fund: Arc<dyn QuoteProvider>,
    fixed_income: Arc<dyn QuoteProvider>,
    crypto: Arc<dyn QuoteProvider>,
}

impl AssetCatalog {
    pub fn new(
        equity: Arc<dyn QuoteProvider>,
        fund: Arc<dyn QuoteProvider>,
        fixed_income: Arc<dyn QuoteProvider>,
        crypto: Arc<dyn QuoteProvider>,
    ) -> Self {
        AssetCatalog {
            equity,
            fund,
            fixed_income,
            crypto,
        }
    }

    fn provider_for(&self, asset_type: AssetType) -> &dyn QuoteProvider {
        match asset_type {
            AssetType::Equity => self.equity.as_ref(),
            AssetType::Fund => self.fund.as_ref(),
            AssetType::FixedIncome => self.fixed_income.as_ref(),
            AssetType::Crypto => self.crypto.as_ref(),
        }
    }

    /// Lists assets for browsing.
    ///
    /// The "all" union is approximate: the page number only drives the
    /// equity provider (the one real server-side pagination); the other
    /// categories return their full, small sets on every call. "Page N of
    /// all types" is therefore not a strict global ordinal window, and a
    /// category whose upstream fails contributes an empty set.
    #[instrument(name = "ListAssets", skip(self), fields(filter = %filter, page = page))]
    pub async fn list(&self, filter: CatalogFilter, page: u32) -> PagedAssets {
        match filter {
            CatalogFilter::Only(asset_type) => {
                self.provider_for(asset_type).fetch_listing(page).await
            }
            CatalogFilter::All => {
                let (equities, funds, fixed_income, crypto) = tokio::join!(
                    self.equity.fetch_listing(page),
                    self.fund.fetch_listing(page),
                    self.fixed_income.fetch_listing(page),
                    self.crypto.fetch_listing(page),
                );

                debug!(
                    "Union sizes: {} equities, {} funds, {} fixed income, {} crypto",
                    equities.assets.len(),
                    funds.assets.len(),
                    fixed_income.assets.len(),
                    crypto.assets.len()
                );

                let total_count = equities.total_count
                    + funds.total_count
                    + fixed_income.total_count
                    + crypto.total_count;

                let mut assets = equities.assets;
                assets.extend(funds.assets);
                assets.extend(fixed_income.assets);
                assets.extend(crypto.assets);

                PagedAssets {
                    assets,
                    total_pages: equities.total_pages,
                    total_count,
                    current_page: page,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::Asset;
    use crate::core::quote::{Quote, QuoteSource};
    use async_trait::async_trait;

    struct StubListing {
        source: QuoteSource,
        asset_type: AssetType,
        count: usize,
        total_pages: u32,
        total_count: u64,
    }

    #[async_trait]
    impl QuoteProvider for StubListing {
        fn id(&self) -> QuoteSource {
            self.source
        }

        async fn fetch_quote(&self, _ticker: &str) -> Option<Quote> {
            None
        }

        async fn fetch_listing(&self, page: u32) -> PagedAssets {
            let assets = (0..self.count)
                .map(|i| Asset {
                    ticker: format!("{}{}", self.source, i),
                    display_name: format!("Asset {i}"),
                    price: 10.0 + i as f64,
                    change_percent: 0.0,
                    asset_type: self.asset_type,
                    logo_url: None,
                })
                .collect();
            PagedAssets {
                assets,
                total_pages: self.total_pages,
                total_count: self.total_count,
                current_page: page,
            }
        }
    }

    fn catalog() -> AssetCatalog {
        AssetCatalog::new(
            Arc::new(StubListing {
                source: QuoteSource::Brapi,
                asset_type: AssetType::Equity,
                count: 3,
                total_pages: 7,
                total_count: 312,
            }),
            Arc::new(StubListing {
                source: QuoteSource::Brapi,
                asset_type: AssetType::Fund,
                count: 2,
                total_pages: 1,
                total_count: 2,
            }),
            Arc::new(StubListing {
                source: QuoteSource::Treasury,
                asset_type: AssetType::FixedIncome,
                count: 4,
                total_pages: 1,
                total_count: 4,
            }),
            Arc::new(StubListing {
                source: QuoteSource::Binance,
                asset_type: AssetType::Crypto,
                count: 1,
                total_pages: 1,
                total_count: 1,
            }),
        )
    }

    #[tokio::test]
    async fn test_single_type_delegates_to_its_provider() {
        let listing = catalog().list(CatalogFilter::Only(AssetType::Crypto), 1).await;
        assert_eq!(listing.assets.len(), 1);
        assert_eq!(listing.assets[0].asset_type, AssetType::Crypto);
    }

    #[tokio::test]
    async fn test_all_union_concatenates_and_sums_counts() {
        let listing = catalog().list(CatalogFilter::All, 2).await;

        assert_eq!(listing.assets.len(), 3 + 2 + 4 + 1);
        assert_eq!(listing.total_count, 312 + 2 + 4 + 1);
        // total_pages comes from the equity provider, the only real
        // server-side pagination.
        assert_eq!(listing.total_pages, 7);
        assert_eq!(listing.current_page, 2);
    }

    #[tokio::test]
    async fn test_failed_category_contributes_empty_set() {
        let mut catalog = catalog();
        catalog.crypto = Arc::new(StubListing {
            source: QuoteSource::Binance,
            asset_type: AssetType::Crypto,
            count: 0,
            total_pages: 1,
            total_count: 0,
        });

        let listing = catalog.list(CatalogFilter::All, 1).await;
        assert_eq!(listing.assets.len(), 3 + 2 + 4);
        assert_eq!(listing.total_count, 312 + 2 + 4);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<CatalogFilter>().unwrap(), CatalogFilter::All);
        assert_eq!(
            "crypto".parse::<CatalogFilter>().unwrap(),
            CatalogFilter::Only(AssetType::Crypto)
        );
        assert!("everything".parse::<CatalogFilter>().is_err());
    }
}
