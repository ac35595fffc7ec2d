//! Catalog listing types

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetType {
    Equity,
    Fund,
    FixedIncome,
    Crypto,
}

impl Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AssetType::Equity => "equity",
                AssetType::Fund => "fund",
                AssetType::FixedIncome => "fixed-income",
                AssetType::Crypto => "crypto",
            }
        )
    }
}

impl FromStr for AssetType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equity" | "stock" => Ok(AssetType::Equity),
            "fund" | "fii" => Ok(AssetType::Fund),
            "fixed-income" | "fixed" => Ok(AssetType::FixedIncome),
            "crypto" => Ok(AssetType::Crypto),
            _ => Err(anyhow::anyhow!("Invalid asset type: {}", s)),
        }
    }
}

/// A catalog entry for browsing. The price is whatever the listing fetch
/// returned and is not guaranteed fresh; use the resolver for pricing at
/// decision time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub ticker: String,
    pub display_name: String,
    pub price: f64,
    pub change_percent: f64,
    pub asset_type: AssetType,
    pub logo_url: Option<String>,
}

/// One page of catalog results.
#[derive(Debug, Clone, Default)]
pub struct PagedAssets {
    pub assets: Vec<Asset>,
    pub total_pages: u32,
    pub total_count: u64,
    pub current_page: u32,
}

impl PagedAssets {
    pub fn empty(page: u32) -> Self {
        PagedAssets {
            assets: Vec::new(),
            total_pages: 1,
            total_count: 0,
            current_page: page,
        }
    }
}
