use super::ui;
use crate::core::config::{AppConfig, Holding, Portfolio};
use crate::core::quote::{Quote, QuoteSource};
use crate::resolver::QuoteResolver;
use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;
use indicatif::ProgressBar;

struct PositionSummary {
    holding: Holding,
    quote: Quote,
}

impl PositionSummary {
    fn current_value(&self) -> f64 {
        self.holding.units * self.quote.price
    }

    fn invested(&self) -> f64 {
        self.holding.units * self.holding.purchase_price
    }

    fn gain_percent(&self) -> Option<f64> {
        let invested = self.invested();
        (invested > 0.0).then(|| (self.current_value() - invested) / invested * 100.0)
    }
}

pub async fn run(config: &AppConfig, resolver: &QuoteResolver) -> Result<()> {
    if config.portfolios.is_empty() {
        println!("No portfolios configured. Run `carteira setup` to create one.");
        return Ok(());
    }

    let total_holdings: u64 = config.all_holdings().count() as u64;
    let pb = ui::new_progress_bar(total_holdings, true);
    pb.set_message("Resolving quotes...");

    for portfolio in &config.portfolios {
        let positions = resolve_positions(portfolio, resolver, &pb).await;
        render_portfolio(portfolio, &positions);
    }
    pb.finish_and_clear();

    Ok(())
}

async fn resolve_positions(
    portfolio: &Portfolio,
    resolver: &QuoteResolver,
    pb: &ProgressBar,
) -> Vec<PositionSummary> {
    let futures = portfolio.holdings.iter().map(|holding| {
        let pb = pb.clone();
        async move {
            let quote = resolver
                .resolve(&holding.ticker, holding.asset_type, holding.purchase_price)
                .await;
            pb.inc(1);
            PositionSummary {
                holding: holding.clone(),
                quote,
            }
        }
    });
    join_all(futures).await
}

fn render_portfolio(portfolio: &Portfolio, positions: &[PositionSummary]) {
    println!(
        "\nPortfolio: {}",
        ui::style_text(&portfolio.name, ui::StyleType::Title)
    );

    if positions.is_empty() {
        println!("  (no holdings)");
        return;
    }

    let total_value: f64 = positions.iter().map(PositionSummary::current_value).sum();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Type"),
        ui::header_cell("Units"),
        ui::header_cell("Price"),
        ui::header_cell("Value"),
        ui::header_cell("Gain (%)"),
        ui::header_cell("Weight (%)"),
        ui::header_cell("Source"),
    ]);

    for position in positions {
        let weight = if total_value > 0.0 {
            position.current_value() / total_value * 100.0
        } else {
            0.0
        };
        let gain = position
            .gain_percent()
            .map_or("N/A".to_string(), |g| format!("{g:+.2}%"));

        table.add_row(vec![
            Cell::new(&position.holding.ticker),
            Cell::new(position.holding.asset_type.to_string()),
            Cell::new(format!("{:.2}", position.holding.units)),
            ui::money_cell(position.quote.price),
            ui::money_cell(position.current_value()),
            Cell::new(gain),
            Cell::new(format!("{weight:.2}%")),
            ui::source_cell(position.quote.source),
        ]);
    }

    println!("{table}");
    println!(
        "Total Value: {}",
        ui::style_text(&ui::money(total_value), ui::StyleType::TotalValue)
    );

    let degraded = positions
        .iter()
        .filter(|p| p.quote.source == QuoteSource::Fallback)
        .count();
    if degraded > 0 {
        println!(
            "{}",
            ui::style_text(
                &format!("{degraded} position(s) are valued at their recorded purchase price."),
                ui::StyleType::Error
            )
        );
    }
}
