//! Orchestration of one goal-archiving run.

use anyhow::Result;
use tracing::debug;

use lumenalytics_core::ranges::RangeTable;
use lumenalytics_core::record::{RecordMetadata, RecordSet};
use lumenalytics_core::source::{
    ArchiveContext, BucketedColumn, BucketedField, ConversionRowSource, EligibilitySource,
    GoalCatalog,
};

use crate::aggregator::RowAggregator;
use crate::eligibility::site_needs_goal_archiving;
use crate::overview::compose_overview;
use crate::records::{assemble_records, record_metadata};

/// Builds the goal-conversion record set for one site and period.
///
/// Collaborators are injected; the builder performs no I/O of its own and
/// keeps no state across invocations.
pub struct GoalRecordBuilder<'a> {
    rows: &'a dyn ConversionRowSource,
    catalog: &'a dyn GoalCatalog,
    eligibility: &'a dyn EligibilitySource,
}

impl<'a> GoalRecordBuilder<'a> {
    pub fn new(
        rows: &'a dyn ConversionRowSource,
        catalog: &'a dyn GoalCatalog,
        eligibility: &'a dyn EligibilitySource,
    ) -> Self {
        Self {
            rows,
            catalog,
            eligibility,
        }
    }

    /// Runs the full pipeline: eligibility gate, row query, aggregation,
    /// overview composition, record assembly.
    ///
    /// An ineligible site and a row source reporting data unavailable both
    /// degrade to the empty aggregation; the mandatory records are still
    /// emitted with zero/empty values.
    pub async fn build(&self, ctx: &ArchiveContext) -> Result<RecordSet> {
        let mut aggregator = RowAggregator::new();

        if site_needs_goal_archiving(self.eligibility, ctx).await? {
            let selections = [
                BucketedColumn {
                    field: BucketedField::VisitCount,
                    ranges: RangeTable::visit_counts(),
                },
                BucketedColumn {
                    field: BucketedField::SecondsSinceFirstVisit,
                    ranges: RangeTable::days_to_conversion(),
                },
            ];
            match self
                .rows
                .query_conversions(&ctx.site_id, &ctx.period, &selections)
                .await?
            {
                Some(rows) => {
                    debug!(site_id = %ctx.site_id, rows = rows.len(), "aggregating conversion rows");
                    for row in &rows {
                        aggregator.consume(row)?;
                    }
                }
                None => {
                    debug!(site_id = %ctx.site_id, "conversion data unavailable, archiving empty records");
                }
            }
        } else {
            debug!(site_id = %ctx.site_id, "site has no goals or ecommerce, archiving empty records");
        }

        let aggregates = aggregator.finish();
        let visits_overview = compose_overview(&aggregates.visits_to_conversion, |goal| {
            self.catalog.is_ecommerce_class(goal)
        });
        let days_overview = compose_overview(&aggregates.days_to_conversion, |goal| {
            self.catalog.is_ecommerce_class(goal)
        });

        Ok(assemble_records(
            aggregates,
            visits_overview,
            days_overview,
            ctx.converted_visits,
        ))
    }

    /// Expected record schema for the site, independent of aggregated data.
    pub async fn record_metadata(&self, ctx: &ArchiveContext) -> Result<Vec<RecordMetadata>> {
        let goal_ids = self.catalog.goal_ids(&ctx.site_id).await?;
        Ok(record_metadata(&goal_ids, ctx.ecommerce_module_active))
    }
}
