use super::ui;
use crate::core::role::Role;
use crate::store::{AssetStore, PriceUpdate};
use anyhow::{Result, bail};

/// Sets every assigned asset's disposition price to its total cost in one
/// bulk upsert. Unassigned assets are untouched.
pub async fn run(store: &dyn AssetStore, role: &Role) -> Result<()> {
    if *role != Role::Admin {
        bail!("Only Admin can initialize disposition prices");
    }

    let assets = store.list_assets().await?;
    let updates: Vec<PriceUpdate> = assets
        .iter()
        .filter_map(|asset| {
            asset.fund_id.map(|fund_id| PriceUpdate {
                asset_id: asset.id.clone(),
                fund_id,
                disposition_price: asset.total_cost,
            })
        })
        .collect();

    if updates.is_empty() {
        println!("No assets are assigned to a fund; nothing to initialize.");
        return Ok(());
    }

    let count = updates.len();
    store.upsert_disposition_prices(updates).await?;

    println!(
        "{}",
        ui::style_text(
            &format!("Initialized disposition prices for {count} assets to their total cost"),
            ui::StyleType::TotalValue
        )
    );
    Ok(())
}
