//! Access to the hosted table store.
//!
//! The store exposes two logical tables: `assets` and the `fund_assets`
//! join table. A unique constraint on `fund_assets.asset_id` is the source
//! of truth for the at-most-one-fund invariant; assignment writes go through
//! a conditional upsert keyed on it rather than a lookup-then-write.

pub mod memory;
pub mod rest;

use crate::core::asset::Asset;
use crate::core::error::StoreError;
use crate::core::fund::FundId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fields for a brand-new asset row. The store mints the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    pub vin: String,
    pub year: i32,
    pub make: String,
    pub model: String,
    pub purchase_price: Option<f64>,
}

/// Fields refreshed on an existing asset when a document re-imports its VIN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetPatch {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub purchase_price: Option<f64>,
}

/// One fund-assignment write, applied as an upsert on the `asset_id`
/// conflict key: an existing row is moved or updated in place, never
/// duplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentUpsert {
    pub asset_id: String,
    pub fund_id: FundId,
    pub display_order: i32,
    pub disposition_price: Option<f64>,
}

/// A disposition-price change for an already assigned asset, used by the
/// bulk price-initialization operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub asset_id: String,
    pub fund_id: FundId,
    pub disposition_price: Option<f64>,
}

/// An assignment joined with the sales price of its asset, as consumed by
/// the fund statistics aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub asset_id: String,
    pub fund_id: FundId,
    pub disposition_price: Option<f64>,
    pub sales_price: Option<f64>,
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// All assets joined with their fund association, if any.
    async fn list_assets(&self) -> Result<Vec<Asset>, StoreError>;

    async fn find_asset(&self, id: &str) -> Result<Option<Asset>, StoreError>;

    async fn find_asset_by_vin(&self, vin: &str) -> Result<Option<Asset>, StoreError>;

    /// Inserts a new asset and returns the stored row, id included.
    async fn insert_asset(&self, asset: NewAsset) -> Result<Asset, StoreError>;

    async fn update_asset_by_vin(&self, vin: &str, patch: AssetPatch) -> Result<(), StoreError>;

    async fn delete_asset(&self, id: &str) -> Result<(), StoreError>;

    /// Inserts or updates the single assignment row for the asset.
    async fn upsert_assignment(&self, change: AssignmentUpsert) -> Result<(), StoreError>;

    /// All assignment rows joined with their asset's sales price.
    async fn list_assignments(&self) -> Result<Vec<AssignmentRow>, StoreError>;

    /// Applies many disposition-price changes in one round-trip.
    async fn upsert_disposition_prices(&self, changes: Vec<PriceUpdate>)
    -> Result<(), StoreError>;
}
