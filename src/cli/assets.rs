use super::ui;
use crate::core::access::can_see_asset;
use crate::core::asset::{Asset, SortField, matches_search, sort_assets};
use crate::core::role::Role;
use crate::store::AssetStore;
use anyhow::Result;
use comfy_table::Cell;

/// Lists unassigned assets visible to the session role.
///
/// Assets already in a fund never appear here, whatever the role; the
/// visibility predicate then narrows the remainder.
pub async fn run(
    store: &dyn AssetStore,
    role: &Role,
    search: Option<&str>,
    sort_by: SortField,
    ascending: bool,
) -> Result<()> {
    let assets = store.list_assets().await?;
    let fetched = assets.len();

    let mut visible: Vec<Asset> = assets
        .into_iter()
        .filter(Asset::is_unassigned)
        .filter(|a| can_see_asset(role, a.fund_id))
        .filter(|a| matches_search(a, search.unwrap_or_default()))
        .collect();
    sort_assets(&mut visible, sort_by, ascending);

    println!(
        "{}",
        ui::style_text("Unassigned Assets", ui::StyleType::Title)
    );
    println!(
        "{}",
        ui::style_text(
            &format!("Fetched assets: {fetched}, after filter: {}", visible.len()),
            ui::StyleType::Subtle
        )
    );

    if visible.is_empty() {
        println!("No assets found. Please check your database or filter settings.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("VIN"),
        ui::header_cell("Year"),
        ui::header_cell("Make"),
        ui::header_cell("Model"),
        ui::header_cell("Total Cost"),
        ui::header_cell("Sales Price"),
    ]);

    for asset in &visible {
        table.add_row(vec![
            Cell::new(&asset.vin),
            Cell::new(asset.year),
            Cell::new(&asset.make),
            Cell::new(&asset.model),
            ui::format_optional_cell(asset.total_cost, ui::format_currency),
            ui::format_optional_cell(asset.sales_price, ui::format_currency),
        ]);
    }

    println!("{table}");
    Ok(())
}
