//! Quote resolution orchestration.
//!
//! Answers "what is this asset worth right now": cache first, then the
//! providers registered for the asset type in a fixed order, then a
//! degraded quote built from the caller's reference price. Resolution
//! never fails toward the caller; quality degrades instead
//! (cache -> upstream -> last known price).

use crate::core::asset::AssetType;
use crate::core::cache::QuoteCache;
use crate::core::quote::{Quote, QuoteProvider, QuoteSource};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub struct QuoteResolver {
    cache: Arc<dyn QuoteCache>,
    equity_primary: Arc<dyn QuoteProvider>,
    equity_secondary: Arc<dyn QuoteProvider>,
    fund: Arc<dyn QuoteProvider>,
    fixed_income: Arc<dyn QuoteProvider>,
    crypto: Arc<dyn QuoteProvider>,
}

impl QuoteResolver {
    pub fn new(
        cache: Arc<dyn QuoteCache>,
        equity_primary: Arc<dyn QuoteProvider>,
        equity_secondary: Arc<dyn QuoteProvider>,
        fund: Arc<dyn QuoteProvider>,
        fixed_income: Arc<dyn QuoteProvider>,
        crypto: Arc<dyn QuoteProvider>,
    ) -> Self {
        QuoteResolver {
            cache,
            equity_primary,
            equity_secondary,
            fund,
            fixed_income,
            crypto,
        }
    }

    /// Fallback order per asset type. Fixed, not load-based: equities get a
    /// primary and a secondary source, every other type has exactly one.
    fn chain(&self, asset_type: AssetType) -> Vec<&dyn QuoteProvider> {
        match asset_type {
            AssetType::Equity => vec![
                self.equity_primary.as_ref(),
                self.equity_secondary.as_ref(),
            ],
            AssetType::Fund => vec![self.fund.as_ref()],
            AssetType::FixedIncome => vec![self.fixed_income.as_ref()],
            AssetType::Crypto => vec![self.crypto.as_ref()],
        }
    }

    /// Resolves one ticker to a best-effort quote.
    ///
    /// `reference_price` is the caller's last known price (typically the
    /// recorded purchase price); it backs the degraded result when every
    /// source fails and is never written to the cache, so the next request
    /// retries upstream instead of being pinned to a stale guess.
    #[instrument(name = "ResolveQuote", skip(self), fields(ticker = %ticker, asset_type = %asset_type))]
    pub async fn resolve(
        &self,
        ticker: &str,
        asset_type: AssetType,
        reference_price: f64,
    ) -> Quote {
        let ticker = ticker.trim().to_uppercase();

        if let Some(mut quote) = self.cache.get(&ticker).await {
            debug!("Serving {} from cache", ticker);
            quote.source = QuoteSource::Cache;
            return quote;
        }

        for provider in self.chain(asset_type) {
            let Some(quote) = provider.fetch_quote(&ticker).await else {
                debug!("Provider {} had no quote for {}", provider.id(), ticker);
                continue;
            };
            // Providers already fail closed on bad payloads; this guard is
            // the invariant that a non-positive price is never cached.
            if quote.price <= 0.0 {
                warn!(
                    "Provider {} returned non-positive price for {}, treating as not-found",
                    provider.id(),
                    ticker
                );
                continue;
            }
            self.cache.put(&ticker, &quote).await;
            return quote;
        }

        debug!("All providers exhausted for {}, serving reference price", ticker);
        Quote::degraded(&ticker, reference_price)
    }
}
