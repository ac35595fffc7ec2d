//! Fixed-income reference provider.
//!
//! There is no live public feed for this category; the provider serves a
//! static table of Tesouro Direto titles and benchmark private bonds
//! through the same `QuoteProvider` trait, so the resolver and the catalog
//! cannot tell it from a live source. The `change_percent` column carries
//! the annual rate, which is how the listing presents fixed income.

use crate::core::asset::{Asset, AssetType, PagedAssets};
use crate::core::quote::{Quote, QuoteProvider, QuoteSource};
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

struct ReferenceBond {
    code: &'static str,
    name: &'static str,
    rate: f64,
    price: f64,
}

static TESOURO_DIRETO_REFERENCE: [ReferenceBond; 10] = [
    ReferenceBond { code: "TD-SELIC-2027", name: "Tesouro Selic 2027", rate: 13.65, price: 145.50 },
    ReferenceBond { code: "TD-SELIC-2029", name: "Tesouro Selic 2029", rate: 13.65, price: 139.20 },
    ReferenceBond { code: "TD-IPCA-2029", name: "Tesouro IPCA+ 2029", rate: 6.45, price: 3250.80 },
    ReferenceBond { code: "TD-IPCA-2035", name: "Tesouro IPCA+ 2035", rate: 6.52, price: 2180.45 },
    ReferenceBond { code: "TD-IPCA-2045", name: "Tesouro IPCA+ 2045", rate: 6.58, price: 1420.30 },
    ReferenceBond { code: "TD-IPCA-JS-2032", name: "Tesouro IPCA+ Juros Semestrais 2032", rate: 6.55, price: 3890.20 },
    ReferenceBond { code: "TD-IPCA-JS-2040", name: "Tesouro IPCA+ Juros Semestrais 2040", rate: 6.62, price: 3650.15 },
    ReferenceBond { code: "TD-PREF-2027", name: "Tesouro Prefixado 2027", rate: 12.80, price: 820.45 },
    ReferenceBond { code: "TD-PREF-2031", name: "Tesouro Prefixado 2031", rate: 12.95, price: 520.30 },
    ReferenceBond { code: "TD-PREF-JS-2033", name: "Tesouro Prefixado Juros Semestrais 2033", rate: 13.10, price: 910.20 },
];

// Market-average benchmarks, not live offers
static PRIVATE_BONDS_REFERENCE: [ReferenceBond; 4] = [
    ReferenceBond { code: "CDB-REF", name: "CDB - Média de Mercado (~110-120% CDI)", rate: 115.0, price: 1000.0 },
    ReferenceBond { code: "LCI-REF", name: "LCI - Média de Mercado (~90-100% CDI)", rate: 95.0, price: 1000.0 },
    ReferenceBond { code: "LCA-REF", name: "LCA - Média de Mercado (~90-95% CDI)", rate: 92.5, price: 1000.0 },
    ReferenceBond { code: "DEB-REF", name: "Debêntures - Média de Mercado (IPCA + 5-7%)", rate: 6.0, price: 1000.0 },
];

pub struct TreasuryProvider;

impl TreasuryProvider {
    pub fn new() -> Self {
        TreasuryProvider
    }

    fn bonds() -> impl Iterator<Item = &'static ReferenceBond> {
        TESOURO_DIRETO_REFERENCE
            .iter()
            .chain(PRIVATE_BONDS_REFERENCE.iter())
    }
}

impl Default for TreasuryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceBond {
    fn to_asset(&self) -> Asset {
        Asset {
            ticker: self.code.to_string(),
            display_name: self.name.to_string(),
            price: self.price,
            change_percent: self.rate,
            asset_type: AssetType::FixedIncome,
            logo_url: None,
        }
    }

    fn to_quote(&self) -> Quote {
        Quote {
            ticker: self.code.to_string(),
            price: self.price,
            change: 0.0,
            change_percent: self.rate,
            volume: None,
            retrieved_at: Utc::now(),
            source: QuoteSource::Treasury,
        }
    }
}

#[async_trait]
impl QuoteProvider for TreasuryProvider {
    fn id(&self) -> QuoteSource {
        QuoteSource::Treasury
    }

    async fn fetch_quote(&self, ticker: &str) -> Option<Quote> {
        let quote = Self::bonds()
            .find(|bond| bond.code.eq_ignore_ascii_case(ticker))
            .map(ReferenceBond::to_quote);
        if quote.is_none() {
            debug!("Unknown fixed-income code: {}", ticker);
        }
        quote
    }

    async fn fetch_listing(&self, page: u32) -> PagedAssets {
        let _ = page;
        let assets: Vec<Asset> = Self::bonds().map(ReferenceBond::to_asset).collect();
        PagedAssets {
            total_pages: 1,
            total_count: assets.len() as u64,
            current_page: 1,
            assets,
        }
    }
}
