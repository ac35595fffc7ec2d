use super::ui;
use crate::core::asset::AssetType;
use crate::core::config::{AppConfig, Holding};
use crate::core::dividend::{self, DividendProjection};
use crate::providers::brapi::BrapiProvider;
use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;

/// Quarterly projections over the next twelve months.
const QUARTERS_AHEAD: u32 = 4;

pub async fn run(config: &AppConfig, brapi: &BrapiProvider) -> Result<()> {
    // Only B3-listed holdings pay dividends the feed knows about.
    let holdings: Vec<&Holding> = config
        .all_holdings()
        .filter(|h| matches!(h.asset_type, AssetType::Equity | AssetType::Fund))
        .collect();

    if holdings.is_empty() {
        println!("No equity or fund holdings to project dividends for.");
        return Ok(());
    }

    let pb = ui::new_progress_bar(holdings.len() as u64, true);
    pb.set_message("Fetching dividend history...");

    let histories = join_all(holdings.iter().map(|holding| {
        let pb = pb.clone();
        async move {
            let history = brapi.fetch_dividends(&holding.ticker).await;
            pb.inc(1);
            (*holding, history)
        }
    }))
    .await;
    pb.finish_and_clear();

    let mut projections: Vec<DividendProjection> = Vec::new();
    let mut summary_table = ui::new_styled_table();
    summary_table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Last 12m / unit"),
        ui::header_cell("Trailing Yield"),
        ui::header_cell("Monthly Avg"),
    ]);

    for (holding, history) in &histories {
        let Some(history) = history else {
            summary_table.add_row(vec![
                Cell::new(&holding.ticker),
                Cell::new(ui::style_text("unavailable", ui::StyleType::Error)),
                Cell::new("N/A"),
                Cell::new("N/A"),
            ]);
            continue;
        };

        let summary = dividend::summarize(&history.dividends, history.current_price);
        summary_table.add_row(vec![
            Cell::new(&holding.ticker),
            ui::money_cell(summary.last_twelve_months),
            Cell::new(format!("{:.2}%", summary.trailing_yield_percent)),
            ui::money_cell(summary.monthly_average),
        ]);

        projections.extend(dividend::project(
            &holding.ticker,
            summary.trailing_yield_percent,
            history.current_price,
            holding.units,
            QUARTERS_AHEAD,
        ));
    }

    println!(
        "\n{}",
        ui::style_text("Dividend history (trailing 12 months)", ui::StyleType::Title)
    );
    println!("{summary_table}");

    if projections.is_empty() {
        println!("\nNo projections: no holding has a positive trailing yield.");
        return Ok(());
    }

    projections.sort_by(|a, b| a.estimated_date.cmp(&b.estimated_date));
    let total_projected: f64 = projections.iter().map(|p| p.total_estimated).sum();

    let mut projection_table = ui::new_styled_table();
    projection_table.set_header(vec![
        ui::header_cell("Estimated Date"),
        ui::header_cell("Ticker"),
        ui::header_cell("Per Unit"),
        ui::header_cell("Units"),
        ui::header_cell("Total"),
    ]);
    for projection in &projections {
        projection_table.add_row(vec![
            Cell::new(projection.estimated_date.format("%Y-%m-%d").to_string()),
            Cell::new(&projection.ticker),
            ui::money_cell(projection.per_unit_amount),
            Cell::new(format!("{:.2}", projection.units_held)),
            ui::money_cell(projection.total_estimated),
        ]);
    }

    println!(
        "\n{}",
        ui::style_text(
            "Projected payments (quarterly-split estimate, next 12 months)",
            ui::StyleType::Title
        )
    );
    println!("{projection_table}");
    println!(
        "Total projected: {}",
        ui::style_text(&ui::money(total_projected), ui::StyleType::TotalValue)
    );

    Ok(())
}
