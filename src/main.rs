use anyhow::Result;
use carteira::core::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for carteira::AppCommand {
    fn from(cmd: Commands) -> carteira::AppCommand {
        match cmd {
            Commands::Quote { ticker, asset_type } => {
                carteira::AppCommand::Quote { ticker, asset_type }
            }
            Commands::Assets { asset_type, page } => carteira::AppCommand::Assets {
                filter: asset_type,
                page,
            },
            Commands::Dividends => carteira::AppCommand::Dividends,
            Commands::Summary => carteira::AppCommand::Summary,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Resolve the current quote for one ticker
    Quote {
        ticker: String,
        /// Asset type: equity, fund, fixed-income or crypto
        #[arg(short = 't', long = "type", default_value = "equity")]
        asset_type: String,
    },
    /// Browse the asset catalog
    Assets {
        /// Asset type filter: all, equity, fund, fixed-income or crypto
        #[arg(short = 't', long = "type", default_value = "all")]
        asset_type: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Dividend history and projected payments for your holdings
    Dividends,
    /// Display portfolio summary
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => carteira::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = carteira::core::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
portfolios:
  - name: "Minha Carteira"
    holdings:
      - ticker: "PETR4"
        type: equity
        units: 100
        purchase_price: 36.50

providers:
  brapi:
    base_url: "https://brapi.dev/api"
    api_key: ~
  yahoo:
    base_url: "https://query1.finance.yahoo.com"
  binance:
    base_url: "https://api.binance.com/api/v3"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
