pub mod catalog;
pub mod cli;
pub mod core;
pub mod providers;
pub mod resolver;
pub mod store;

use crate::catalog::{AssetCatalog, CatalogFilter};
use crate::core::asset::AssetType;
use crate::core::cache::QuoteCache;
use crate::core::config::AppConfig;
use crate::providers::{BinanceProvider, BrapiProvider, TreasuryProvider, YahooProvider};
use crate::resolver::QuoteResolver;
use crate::store::{FjallQuoteCache, MemoryQuoteCache};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Quote { ticker: String, asset_type: String },
    Assets { filter: String, page: u32 },
    Dividends,
    Summary,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Carteira starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let brapi_base = config
        .providers
        .brapi
        .as_ref()
        .map_or("https://brapi.dev/api", |p| p.base_url.as_str());
    let brapi_key = config
        .providers
        .brapi
        .as_ref()
        .and_then(|p| p.api_key.as_deref());
    let yahoo_base = config
        .providers
        .yahoo
        .as_ref()
        .map_or("https://query1.finance.yahoo.com", |p| p.base_url.as_str());
    let binance_base = config
        .providers
        .binance
        .as_ref()
        .map_or("https://api.binance.com/api/v3", |p| p.base_url.as_str());

    let brapi_equities = Arc::new(BrapiProvider::equities(brapi_base, brapi_key));
    let brapi_funds = Arc::new(BrapiProvider::funds(brapi_base, brapi_key));
    let yahoo = Arc::new(YahooProvider::new(yahoo_base));
    let binance = Arc::new(BinanceProvider::new(binance_base));
    let treasury = Arc::new(TreasuryProvider::new());

    // Disk cache when the data directory is usable; a broken store is not
    // a reason to fail quote resolution.
    let cache: Arc<dyn QuoteCache> = match config
        .default_data_path()
        .and_then(|path| FjallQuoteCache::open(&path.join("cache")))
    {
        Ok(disk) => Arc::new(disk),
        Err(e) => {
            warn!("Quote cache unavailable, using in-memory store: {e:#}");
            Arc::new(MemoryQuoteCache::new())
        }
    };

    let resolver = QuoteResolver::new(
        cache,
        yahoo,
        brapi_equities.clone(),
        brapi_funds.clone(),
        treasury.clone(),
        binance.clone(),
    );
    let catalog = AssetCatalog::new(brapi_equities.clone(), brapi_funds, treasury, binance);

    match command {
        AppCommand::Quote { ticker, asset_type } => {
            let asset_type: AssetType = asset_type.parse()?;
            cli::quote::run(&config, &resolver, &ticker, asset_type).await
        }
        AppCommand::Assets { filter, page } => {
            let filter: CatalogFilter = filter.parse()?;
            cli::assets::run(&catalog, filter, page).await
        }
        AppCommand::Dividends => cli::dividends::run(&config, brapi_equities.as_ref()).await,
        AppCommand::Summary => cli::summary::run(&config, &resolver).await,
    }
}
