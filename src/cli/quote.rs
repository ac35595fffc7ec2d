use super::ui;
use crate::core::asset::AssetType;
use crate::core::config::AppConfig;
use crate::core::quote::QuoteSource;
use crate::resolver::QuoteResolver;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(
    config: &AppConfig,
    resolver: &QuoteResolver,
    ticker: &str,
    asset_type: AssetType,
) -> Result<()> {
    // The recorded purchase price, when the ticker is held, backs the
    // degraded result if every source fails.
    let reference_price = config.reference_price(ticker).unwrap_or(0.0);

    let quote = resolver.resolve(ticker, asset_type, reference_price).await;

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Price"),
        ui::header_cell("Change"),
        ui::header_cell("Change (%)"),
        ui::header_cell("Volume"),
        ui::header_cell("Source"),
    ]);
    table.add_row(vec![
        Cell::new(&quote.ticker),
        ui::money_cell(quote.price),
        Cell::new(format!("{:+.2}", quote.change)),
        ui::change_cell(quote.change_percent),
        Cell::new(
            quote
                .volume
                .map_or("N/A".to_string(), |v| v.to_string()),
        ),
        ui::source_cell(quote.source),
    ]);

    println!("{table}");
    println!(
        "Retrieved at: {}",
        ui::style_text(
            &quote.retrieved_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ui::StyleType::Subtle
        )
    );

    if quote.source == QuoteSource::Fallback {
        println!(
            "{}",
            ui::style_text(
                "No source answered; showing your recorded reference price.",
                ui::StyleType::Error
            )
        );
    }

    Ok(())
}
