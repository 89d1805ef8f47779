use super::ui;
use crate::core::asset::VIN_LENGTH;
use crate::core::assign::{AssignOutcome, assign_to_fund};
use crate::core::fund::FundId;
use crate::store::AssetStore;
use anyhow::{Result, anyhow};

/// Assigns an asset, addressed by id or by 17-character VIN, to a fund.
pub async fn run(
    store: &dyn AssetStore,
    asset: &str,
    fund: &str,
    price: Option<f64>,
) -> Result<()> {
    let fund_id: FundId = fund.parse()?;

    let resolved = if asset.chars().count() == VIN_LENGTH {
        store.find_asset_by_vin(asset).await?
    } else {
        store.find_asset(asset).await?
    };
    let target = resolved.ok_or_else(|| anyhow!("No asset matching '{asset}'"))?;

    let result = assign_to_fund(store, &target.id, fund_id, price).await?;

    let summary = match result.outcome {
        AssignOutcome::Assigned => format!(
            "Assigned {} (VIN {}) to {}",
            result.asset.description(),
            result.asset.vin,
            fund_id
        ),
        AssignOutcome::PriceUpdated => format!(
            "Updated disposition price for {} (VIN {}) in {}",
            result.asset.description(),
            result.asset.vin,
            fund_id
        ),
        AssignOutcome::Moved { from } => format!(
            "Moved {} (VIN {}) from {} to {}",
            result.asset.description(),
            result.asset.vin,
            from,
            fund_id
        ),
    };
    println!("{}", ui::style_text(&summary, ui::StyleType::TotalLabel));

    match result.asset.disposition_price {
        Some(price) => println!("Disposition price: {}", ui::format_currency(price)),
        None => println!(
            "{}",
            ui::style_text(
                "No disposition price set (asset has no total cost)",
                ui::StyleType::Subtle
            )
        ),
    }
    Ok(())
}
