//! Row-level aggregation into per-goal metric sums and bucketed
//! distributions.

use std::collections::BTreeMap;

use lumenalytics_core::error::CoreError;
use lumenalytics_core::goal::{GoalId, GOAL_CART_ABANDONED};
use lumenalytics_core::metrics::ConversionMetric;
use lumenalytics_core::ranges::{elapsed_days, RangeTable};
use lumenalytics_core::record::DistributionTable;
use lumenalytics_core::source::ConversionRow;

/// Everything one pass over the conversion rows produces.
#[derive(Debug, Default)]
pub struct ConversionAggregates {
    /// Per-goal sums of every catalog metric.
    pub metrics_by_goal: BTreeMap<GoalId, BTreeMap<ConversionMetric, f64>>,
    /// Per-goal "visits until conversion" histograms.
    pub visits_to_conversion: BTreeMap<GoalId, DistributionTable>,
    /// Per-goal "days until conversion" histograms.
    pub days_to_conversion: BTreeMap<GoalId, DistributionTable>,
    /// Conversions across all goals except the abandoned cart.
    pub total_conversions: i64,
    /// Revenue across all goals except the abandoned cart.
    pub total_revenue: f64,
}

/// Single-pass accumulator over conversion rows.
///
/// Rows for the same goal are summed into the existing accumulators. The
/// abandoned-cart pseudo-goal accumulates its own per-goal records but never
/// contributes to the overall totals, since it records negative conversions.
pub struct RowAggregator {
    visit_ranges: RangeTable,
    day_ranges: RangeTable,
    aggregates: ConversionAggregates,
}

impl RowAggregator {
    pub fn new() -> Self {
        Self::with_tables(RangeTable::visit_counts(), RangeTable::days_to_conversion())
    }

    pub fn with_tables(visit_ranges: RangeTable, day_ranges: RangeTable) -> Self {
        Self {
            visit_ranges,
            day_ranges,
            aggregates: ConversionAggregates::default(),
        }
    }

    /// Folds one row into the accumulators.
    ///
    /// The full metric catalog and both bucket lookups are validated before
    /// any state changes, so a malformed row fails without leaving a goal
    /// half-applied.
    pub fn consume(&mut self, row: &ConversionRow) -> Result<(), CoreError> {
        let mut values = [0.0f64; ConversionMetric::ALL.len()];
        for (slot, metric) in values.iter_mut().zip(ConversionMetric::ALL) {
            *slot = row.metric(metric)?;
        }
        let conversions = row.conversions()?;
        let revenue = row.metric(ConversionMetric::Revenue)?;
        let visit_label = self.visit_ranges.bucket_label(row.visit_count)?;
        let day_label = self
            .day_ranges
            .bucket_label(elapsed_days(row.seconds_since_first_visit))?;

        let goal_metrics = self.aggregates.metrics_by_goal.entry(row.goal_id).or_default();
        for (value, metric) in values.iter().zip(ConversionMetric::ALL) {
            *goal_metrics.entry(metric).or_insert(0.0) += value;
        }

        self.aggregates
            .visits_to_conversion
            .entry(row.goal_id)
            .or_default()
            .add(visit_label, conversions);
        self.aggregates
            .days_to_conversion
            .entry(row.goal_id)
            .or_default()
            .add(day_label, conversions);

        if row.goal_id != GOAL_CART_ABANDONED {
            self.aggregates.total_conversions += conversions;
            self.aggregates.total_revenue += revenue;
        }
        Ok(())
    }

    pub fn finish(self) -> ConversionAggregates {
        self.aggregates
    }
}

impl Default for RowAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumenalytics_core::goal::GOAL_ORDER;

    fn row(goal: GoalId, conversions: f64, revenue: f64, visits: u64, seconds: u64) -> ConversionRow {
        let mut metrics = BTreeMap::new();
        for metric in ConversionMetric::ALL {
            metrics.insert(metric, 0.0);
        }
        metrics.insert(ConversionMetric::Conversions, conversions);
        metrics.insert(ConversionMetric::Revenue, revenue);
        metrics.insert(ConversionMetric::VisitsConverted, conversions);
        ConversionRow {
            goal_id: goal,
            metrics,
            visit_count: visits,
            seconds_since_first_visit: seconds,
        }
    }

    #[test]
    fn same_goal_rows_are_summed_not_overwritten() {
        let mut aggregator = RowAggregator::new();
        aggregator.consume(&row(GoalId(1), 2.0, 10.0, 1, 0)).expect("row");
        aggregator.consume(&row(GoalId(1), 3.0, 5.0, 12, 0)).expect("row");

        let aggregates = aggregator.finish();
        let metrics = &aggregates.metrics_by_goal[&GoalId(1)];
        assert_eq!(metrics[&ConversionMetric::Conversions], 5.0);
        assert_eq!(metrics[&ConversionMetric::Revenue], 15.0);

        let visits = &aggregates.visits_to_conversion[&GoalId(1)];
        assert_eq!(visits.get("1"), 2);
        assert_eq!(visits.get("9-14"), 3);
    }

    #[test]
    fn distribution_totals_match_conversion_sums() {
        let mut aggregator = RowAggregator::new();
        aggregator.consume(&row(GoalId(1), 4.0, 0.0, 2, 86_400)).expect("row");
        aggregator.consume(&row(GoalId(1), 1.0, 0.0, 30, 86_399)).expect("row");
        aggregator.consume(&row(GoalId(2), 7.0, 0.0, 1, 0)).expect("row");

        let aggregates = aggregator.finish();
        for (goal, table) in &aggregates.visits_to_conversion {
            let conversion_sum =
                aggregates.metrics_by_goal[goal][&ConversionMetric::Conversions] as i64;
            assert_eq!(table.total_conversions(), conversion_sum);
        }
        for (goal, table) in &aggregates.days_to_conversion {
            let conversion_sum =
                aggregates.metrics_by_goal[goal][&ConversionMetric::Conversions] as i64;
            assert_eq!(table.total_conversions(), conversion_sum);
        }
    }

    #[test]
    fn abandoned_cart_is_excluded_from_totals_but_keeps_its_records() {
        let mut aggregator = RowAggregator::new();
        aggregator
            .consume(&row(GOAL_CART_ABANDONED, 6.0, 120.0, 1, 0))
            .expect("row");
        aggregator.consume(&row(GOAL_ORDER, 2.0, 80.0, 1, 0)).expect("row");
        aggregator.consume(&row(GoalId(1), 1.0, 10.0, 1, 0)).expect("row");

        let aggregates = aggregator.finish();
        assert_eq!(aggregates.total_conversions, 3);
        assert_eq!(aggregates.total_revenue, 90.0);
        // The cart still archives its own per-goal records.
        assert_eq!(
            aggregates.metrics_by_goal[&GOAL_CART_ABANDONED][&ConversionMetric::Conversions],
            6.0
        );
        assert_eq!(
            aggregates.visits_to_conversion[&GOAL_CART_ABANDONED].total_conversions(),
            6
        );
    }

    #[test]
    fn missing_catalog_metric_fails_before_mutating() {
        let mut aggregator = RowAggregator::new();
        let mut bad = row(GoalId(1), 1.0, 0.0, 1, 0);
        bad.metrics.remove(&ConversionMetric::RevenueTax);

        let err = aggregator.consume(&bad).expect_err("drifted row");
        assert!(matches!(err, CoreError::MissingMetric { .. }));

        let aggregates = aggregator.finish();
        assert!(aggregates.metrics_by_goal.is_empty());
        assert!(aggregates.visits_to_conversion.is_empty());
        assert_eq!(aggregates.total_conversions, 0);
    }

    #[test]
    fn out_of_domain_visit_count_fails_loudly() {
        let mut aggregator = RowAggregator::new();
        let err = aggregator
            .consume(&row(GoalId(1), 1.0, 0.0, 0, 0))
            .expect_err("0 visits is below the visit-count domain");
        assert!(matches!(err, CoreError::ValueOutOfRange { .. }));
    }

    #[test]
    fn zero_rows_is_a_valid_empty_aggregation() {
        let aggregates = RowAggregator::new().finish();
        assert!(aggregates.metrics_by_goal.is_empty());
        assert!(aggregates.visits_to_conversion.is_empty());
        assert!(aggregates.days_to_conversion.is_empty());
        assert_eq!(aggregates.total_conversions, 0);
        assert_eq!(aggregates.total_revenue, 0.0);
    }
}
