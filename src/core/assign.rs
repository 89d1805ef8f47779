//! Fund assignment workflow.
//!
//! An asset belongs to at most one fund at a time. The write is a single
//! conditional upsert on the store's `asset_id` conflict key, so the
//! invariant holds in the storage layer; the read beforehand only resolves
//! the price fallback and classifies the outcome.

use crate::core::asset::Asset;
use crate::core::error::StoreError;
use crate::core::fund::FundId;
use crate::store::{AssetStore, AssignmentUpsert};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The asset had no fund and now has one.
    Assigned,
    /// The asset was already in the target fund; only the price changed.
    PriceUpdated,
    /// The asset moved from another fund.
    Moved { from: FundId },
}

#[derive(Debug)]
pub struct AssignmentResult {
    /// The asset view after the write, fund and disposition price included.
    pub asset: Asset,
    pub outcome: AssignOutcome,
}

/// Assigns `asset_id` to `fund_id`, recording the effective disposition
/// price: the explicit override when given, else the asset's total cost,
/// else none.
///
/// The returned view reflects the new state only because persistence
/// succeeded; any store error propagates and nothing is reported as changed.
pub async fn assign_to_fund(
    store: &dyn AssetStore,
    asset_id: &str,
    fund_id: FundId,
    price_override: Option<f64>,
) -> Result<AssignmentResult, StoreError> {
    let asset = store
        .find_asset(asset_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("asset {asset_id}")))?;

    let disposition_price = price_override.or(asset.total_cost);

    store
        .upsert_assignment(AssignmentUpsert {
            asset_id: asset.id.clone(),
            fund_id,
            display_order: 0,
            disposition_price,
        })
        .await?;

    let outcome = match asset.fund_id {
        None => AssignOutcome::Assigned,
        Some(current) if current == fund_id => AssignOutcome::PriceUpdated,
        Some(current) => AssignOutcome::Moved { from: current },
    };
    info!(
        asset_id = %asset.id,
        fund_id = %fund_id,
        ?outcome,
        "Assignment persisted"
    );

    let mut updated = asset;
    updated.fund_id = Some(fund_id);
    updated.disposition_price = disposition_price;

    Ok(AssignmentResult {
        asset: updated,
        outcome,
    })
}
