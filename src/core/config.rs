use crate::core::asset::AssetType;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Holding {
    pub ticker: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub units: f64,
    /// Recorded purchase price per unit. Doubles as the reference price for
    /// degraded quotes when every upstream source fails.
    pub purchase_price: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Portfolio {
    pub name: String,
    pub holdings: Vec<Holding>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BrapiProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BinanceProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub brapi: Option<BrapiProviderConfig>,
    pub yahoo: Option<YahooProviderConfig>,
    pub binance: Option<BinanceProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            brapi: Some(BrapiProviderConfig {
                base_url: "https://brapi.dev/api".to_string(),
                api_key: None,
            }),
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
            binance: Some(BinanceProviderConfig {
                base_url: "https://api.binance.com/api/v3".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub portfolios: Vec<Portfolio>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("br", "carteira", "carteira")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("br", "carteira", "carteira")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// All holdings across every portfolio, for commands that operate on the
    /// whole position set.
    pub fn all_holdings(&self) -> impl Iterator<Item = &Holding> {
        self.portfolios.iter().flat_map(|p| p.holdings.iter())
    }

    /// Looks up the recorded purchase price for a ticker, used as the
    /// degraded-quote reference when no provider answers.
    pub fn reference_price(&self, ticker: &str) -> Option<f64> {
        self.all_holdings()
            .find(|h| h.ticker.eq_ignore_ascii_case(ticker))
            .map(|h| h.purchase_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
portfolios:
  - name: "Renda Variável"
    holdings:
      - ticker: "PETR4"
        type: equity
        units: 100
        purchase_price: 36.50
      - ticker: "HGLG11"
        type: fund
        units: 25
        purchase_price: 158.00
  - name: "Reserva"
    holdings:
      - ticker: "TD-SELIC-2027"
        type: fixed-income
        units: 2
        purchase_price: 145.50
      - ticker: "BTC"
        type: crypto
        units: 0.01
        purchase_price: 350000.0
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.portfolios.len(), 2);
        assert_eq!(config.portfolios[0].holdings.len(), 2);
        assert_eq!(
            config.portfolios[0].holdings[1].asset_type,
            AssetType::Fund
        );
        assert_eq!(config.all_holdings().count(), 4);
        assert_eq!(config.reference_price("petr4"), Some(36.50));
        assert_eq!(config.reference_price("MGLU3"), None);

        // Providers fall back to defaults when absent
        let brapi = config.providers.brapi.expect("default brapi config");
        assert_eq!(brapi.base_url, "https://brapi.dev/api");
        assert!(brapi.api_key.is_none());
    }

    #[test]
    fn test_config_provider_overrides() {
        let yaml_str = r#"
portfolios: []
providers:
  brapi:
    base_url: "http://localhost:9999"
    api_key: "secret"
  yahoo:
    base_url: "http://localhost:9998"
  binance: ~
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        let brapi = config.providers.brapi.unwrap();
        assert_eq!(brapi.base_url, "http://localhost:9999");
        assert_eq!(brapi.api_key.as_deref(), Some("secret"));
        assert!(config.providers.binance.is_none());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = AppConfig::load_from_path("/definitely/not/a/config.yaml");
        assert!(result.is_err());
    }
}
