//! Goal-conversion archiving engine.
//!
//! Consumes conversion rows from an injected log-query layer and produces
//! the per-period record set: overall totals, per-goal metric scalars, and
//! range-bucketed "visits until conversion" / "days until conversion"
//! distribution tables, plus the cross-goal overview tables.

pub mod aggregator;
pub mod builder;
pub mod eligibility;
pub mod overview;
pub mod records;

pub use aggregator::{ConversionAggregates, RowAggregator};
pub use builder::GoalRecordBuilder;
