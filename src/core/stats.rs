//! Fund statistics aggregation

use crate::core::fund::{Fund, FundCatalog};
use crate::store::AssignmentRow;

/// Per-fund rollup of the assignment table.
#[derive(Debug, Clone)]
pub struct FundStats {
    pub fund: Fund,
    pub asset_count: usize,
    pub total_value: f64,
}

impl FundStats {
    pub fn average_value(&self) -> f64 {
        if self.asset_count > 0 {
            self.total_value / self.asset_count as f64
        } else {
            0.0
        }
    }
}

/// Rolls the assignment rows up per catalog fund.
///
/// Every fund appears in the result, funds with no assets included. An
/// assignment contributes its disposition price to the fund's total, falling
/// back to the asset's sales price, then to zero; a missing price is never
/// an error. The result is sorted by descending asset count; the sort is
/// stable, so ties keep catalog order.
pub fn compute_fund_stats(catalog: &FundCatalog, assignments: &[AssignmentRow]) -> Vec<FundStats> {
    let mut stats: Vec<FundStats> = catalog
        .iter()
        .map(|fund| FundStats {
            fund: fund.clone(),
            asset_count: 0,
            total_value: 0.0,
        })
        .collect();

    for row in assignments {
        if let Some(entry) = stats.iter_mut().find(|s| s.fund.id == row.fund_id) {
            entry.asset_count += 1;
            entry.total_value += row.disposition_price.or(row.sales_price).unwrap_or(0.0);
        }
    }

    stats.sort_by(|a, b| b.asset_count.cmp(&a.asset_count));
    stats
}
