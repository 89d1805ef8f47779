use super::ui;
use crate::core::access::can_see_fund;
use crate::core::fund::FundCatalog;
use crate::core::role::Role;
use crate::core::stats::compute_fund_stats;
use crate::store::AssetStore;
use anyhow::Result;
use comfy_table::{Attribute, Cell, CellAlignment};

/// Displays per-fund statistics for the funds the session role may see.
pub async fn run(store: &dyn AssetStore, catalog: &FundCatalog, role: &Role) -> Result<()> {
    let assignments = store.list_assignments().await?;
    let stats = compute_fund_stats(catalog, &assignments);

    let visible: Vec<_> = stats
        .into_iter()
        .filter(|s| can_see_fund(role, &s.fund))
        .collect();

    println!("{}", ui::style_text("Fund Management", ui::StyleType::Title));

    if visible.is_empty() {
        println!("No funds are visible for role '{role}'.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Fund"),
        ui::header_cell("Owner"),
        ui::header_cell("Fee (%)"),
        ui::header_cell("Assets"),
        ui::header_cell("Total Value"),
        ui::header_cell("Average Value"),
    ]);

    let mut total_assets = 0;
    let mut total_value = 0.0;
    for entry in &visible {
        total_assets += entry.asset_count;
        total_value += entry.total_value;
        table.add_row(vec![
            Cell::new(entry.fund.name),
            Cell::new(entry.fund.owner.to_string()),
            ui::format_percentage_cell(entry.fund.fee_percentage, |v| format!("{v:.0}")),
            Cell::new(entry.asset_count).set_alignment(CellAlignment::Right),
            Cell::new(ui::format_currency(entry.total_value)).set_alignment(CellAlignment::Right),
            Cell::new(ui::format_currency(entry.average_value()))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    table.add_row(vec![
        Cell::new("All Funds").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(total_assets)
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right),
        Cell::new(ui::format_currency(total_value))
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right),
        Cell::new(""),
    ]);

    println!("{table}");
    println!(
        "\n{} {}",
        ui::style_text("Total Value:", ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_currency(total_value), ui::StyleType::TotalValue)
    );
    Ok(())
}
