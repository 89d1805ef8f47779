//! In-process store used by unit tests and the workflow tests.

use super::{AssetPatch, AssetStore, AssignmentRow, AssignmentUpsert, NewAsset, PriceUpdate};
use crate::core::asset::Asset;
use crate::core::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone)]
struct AssetRecord {
    id: String,
    vin: String,
    year: i32,
    make: String,
    model: String,
    purchase_price: Option<f64>,
    total_cost: Option<f64>,
    sales_price: Option<f64>,
}

#[derive(Default)]
struct Tables {
    assets: Vec<AssetRecord>,
    // Keyed by asset id, so an asset can never hold two assignment rows.
    assignments: HashMap<String, AssignmentUpsert>,
}

/// A `HashMap`-backed [`AssetStore`]. The assignment table is keyed by asset
/// id, which makes the at-most-one-fund invariant structural.
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Tables::default()),
        }
    }

    /// Seeds an asset with cost and sales figures, returning its id.
    pub async fn seed_asset(
        &self,
        vin: &str,
        year: i32,
        make: &str,
        model: &str,
        total_cost: Option<f64>,
        sales_price: Option<f64>,
    ) -> String {
        let mut tables = self.inner.lock().await;
        let id = uuid::Uuid::new_v4().to_string();
        tables.assets.push(AssetRecord {
            id: id.clone(),
            vin: vin.to_string(),
            year,
            make: make.to_string(),
            model: model.to_string(),
            purchase_price: None,
            total_cost,
            sales_price,
        });
        id
    }

    pub async fn assignment_count(&self, asset_id: &str) -> usize {
        let tables = self.inner.lock().await;
        usize::from(tables.assignments.contains_key(asset_id))
    }

    pub async fn asset_count(&self) -> usize {
        self.inner.lock().await.assets.len()
    }

    fn to_asset(record: &AssetRecord, assignment: Option<&AssignmentUpsert>) -> Asset {
        Asset {
            id: record.id.clone(),
            vin: record.vin.clone(),
            year: record.year,
            make: record.make.clone(),
            model: record.model.clone(),
            purchase_price: record.purchase_price,
            total_cost: record.total_cost,
            sales_price: record.sales_price,
            fund_id: assignment.map(|a| a.fund_id),
            disposition_price: assignment.and_then(|a| a.disposition_price),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn list_assets(&self) -> Result<Vec<Asset>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .assets
            .iter()
            .map(|r| Self::to_asset(r, tables.assignments.get(&r.id)))
            .collect())
    }

    async fn find_asset(&self, id: &str) -> Result<Option<Asset>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .assets
            .iter()
            .find(|r| r.id == id)
            .map(|r| Self::to_asset(r, tables.assignments.get(&r.id))))
    }

    async fn find_asset_by_vin(&self, vin: &str) -> Result<Option<Asset>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .assets
            .iter()
            .find(|r| r.vin == vin)
            .map(|r| Self::to_asset(r, tables.assignments.get(&r.id))))
    }

    async fn insert_asset(&self, asset: NewAsset) -> Result<Asset, StoreError> {
        let mut tables = self.inner.lock().await;
        if tables.assets.iter().any(|r| r.vin == asset.vin) {
            return Err(StoreError::Backend(format!(
                "duplicate key value violates unique constraint on vin: {}",
                asset.vin
            )));
        }
        let record = AssetRecord {
            id: uuid::Uuid::new_v4().to_string(),
            vin: asset.vin,
            year: asset.year,
            make: asset.make,
            model: asset.model,
            purchase_price: asset.purchase_price,
            total_cost: None,
            sales_price: None,
        };
        debug!(id = %record.id, vin = %record.vin, "Inserted asset");
        let stored = Self::to_asset(&record, None);
        tables.assets.push(record);
        Ok(stored)
    }

    async fn update_asset_by_vin(&self, vin: &str, patch: AssetPatch) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        let record = tables
            .assets
            .iter_mut()
            .find(|r| r.vin == vin)
            .ok_or_else(|| StoreError::NotFound(format!("asset with vin {vin}")))?;
        record.year = patch.year;
        record.make = patch.make;
        record.model = patch.model;
        record.purchase_price = patch.purchase_price;
        Ok(())
    }

    async fn delete_asset(&self, id: &str) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        tables.assets.retain(|r| r.id != id);
        tables.assignments.remove(id);
        Ok(())
    }

    async fn upsert_assignment(&self, change: AssignmentUpsert) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        debug!(asset_id = %change.asset_id, fund_id = %change.fund_id, "Upserted assignment");
        tables.assignments.insert(change.asset_id.clone(), change);
        Ok(())
    }

    async fn list_assignments(&self) -> Result<Vec<AssignmentRow>, StoreError> {
        let tables = self.inner.lock().await;
        Ok(tables
            .assets
            .iter()
            .filter_map(|r| {
                tables.assignments.get(&r.id).map(|a| AssignmentRow {
                    asset_id: r.id.clone(),
                    fund_id: a.fund_id,
                    disposition_price: a.disposition_price,
                    sales_price: r.sales_price,
                })
            })
            .collect())
    }

    async fn upsert_disposition_prices(
        &self,
        changes: Vec<PriceUpdate>,
    ) -> Result<(), StoreError> {
        let mut tables = self.inner.lock().await;
        for change in changes {
            let entry = tables
                .assignments
                .entry(change.asset_id.clone())
                .or_insert_with(|| AssignmentUpsert {
                    asset_id: change.asset_id.clone(),
                    fund_id: change.fund_id,
                    display_order: 0,
                    disposition_price: None,
                });
            entry.fund_id = change.fund_id;
            entry.disposition_price = change.disposition_price;
        }
        Ok(())
    }
}
