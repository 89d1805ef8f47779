//! Vehicle asset model and listing helpers

use crate::core::error::ValidationError;
use crate::core::fund::FundId;
use serde::{Deserialize, Serialize};

pub const VIN_LENGTH: usize = 17;

/// A vehicle asset joined with its fund association. `fund_id` and
/// `disposition_price` come from the `fund_assets` row when one exists; an
/// asset has at most one such row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub vin: String,
    pub year: i32,
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub sales_price: Option<f64>,
    #[serde(default)]
    pub fund_id: Option<FundId>,
    #[serde(default)]
    pub disposition_price: Option<f64>,
}

impl Asset {
    pub fn is_unassigned(&self) -> bool {
        self.fund_id.is_none()
    }

    /// Short human-readable description, e.g. "2008 GMC Yukon".
    pub fn description(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }
}

/// VINs are exactly 17 characters; anything else is rejected before the
/// store is touched.
pub fn validate_vin(vin: &str) -> Result<(), ValidationError> {
    if vin.chars().count() != VIN_LENGTH {
        return Err(ValidationError::InvalidVin(vin.to_string()));
    }
    Ok(())
}

/// Case-insensitive match over VIN, make, model and year. An empty search
/// term matches every asset.
pub fn matches_search(asset: &Asset, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    asset.vin.to_lowercase().contains(&term)
        || asset.make.to_lowercase().contains(&term)
        || asset.model.to_lowercase().contains(&term)
        || asset.year.to_string().contains(&term)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Year,
    Make,
    Model,
}

impl From<&str> for SortField {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "make" => SortField::Make,
            "model" => SortField::Model,
            _ => SortField::Year,
        }
    }
}

/// Sorts the listing in place. Year compares numerically, make and model
/// lexicographically.
pub fn sort_assets(assets: &mut [Asset], field: SortField, ascending: bool) {
    match field {
        SortField::Year => assets.sort_by_key(|a| a.year),
        SortField::Make => assets.sort_by(|a, b| a.make.cmp(&b.make)),
        SortField::Model => assets.sort_by(|a, b| a.model.cmp(&b.model)),
    }
    if !ascending {
        assets.reverse();
    }
}
