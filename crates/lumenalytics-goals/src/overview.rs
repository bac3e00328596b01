//! Cross-goal overview composition.

use std::collections::BTreeMap;

use lumenalytics_core::goal::GoalId;
use lumenalytics_core::record::DistributionTable;

/// Merges per-goal distribution tables for one dimension into the overview
/// table, keeping only standard goals. Ecommerce-class goals (per the
/// supplied predicate) keep their per-goal records but never contribute here.
pub fn compose_overview<F>(
    tables: &BTreeMap<GoalId, DistributionTable>,
    is_ecommerce_class: F,
) -> DistributionTable
where
    F: Fn(GoalId) -> bool,
{
    let mut overview = DistributionTable::default();
    for (goal, table) in tables {
        if !is_ecommerce_class(*goal) {
            overview.merge(table);
        }
    }
    overview
}
