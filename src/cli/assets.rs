use super::ui;
use crate::catalog::{AssetCatalog, CatalogFilter};
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(catalog: &AssetCatalog, filter: CatalogFilter, page: u32) -> Result<()> {
    let listing = catalog.list(filter, page).await;

    if listing.assets.is_empty() {
        println!("No assets found for '{filter}' (page {page}).");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Name"),
        ui::header_cell("Price"),
        ui::header_cell("Change (%)"),
        ui::header_cell("Type"),
    ]);

    for asset in &listing.assets {
        table.add_row(vec![
            Cell::new(&asset.ticker),
            Cell::new(&asset.display_name),
            ui::money_cell(asset.price),
            ui::change_cell(asset.change_percent),
            Cell::new(asset.asset_type.to_string()),
        ]);
    }

    println!("{table}");
    println!(
        "Page {} of {}, {} assets in total",
        listing.current_page,
        listing.total_pages,
        ui::style_text(&listing.total_count.to_string(), ui::StyleType::TotalLabel)
    );

    Ok(())
}
