//! Boundary types and traits between the archiving core and its
//! collaborators: the log-query layer, the goal catalog, and the
//! eligibility lookup.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::CoreError;
use crate::goal::GoalId;
use crate::metrics::ConversionMetric;
use crate::ranges::RangeTable;

/// One reporting period, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Parameters of one archiving invocation for one site and period.
#[derive(Debug, Clone)]
pub struct ArchiveContext {
    pub site_id: String,
    pub period: ReportingPeriod,
    /// Constituent site ids when archiving a rollup site; empty otherwise.
    pub rollup_site_ids: Vec<String>,
    /// Number of visits that converted at least once in the period, computed
    /// upstream of this core.
    pub converted_visits: i64,
    /// Whether the ecommerce module is active, which adds the reserved
    /// pseudo-goal ids to the expected record schema.
    pub ecommerce_module_active: bool,
}

/// One aggregated conversion row as delivered by the log-query layer.
///
/// Rows arrive per goal but a goal may span several rows (paging, multiple
/// queries); consumers must sum, never overwrite.
#[derive(Debug, Clone)]
pub struct ConversionRow {
    pub goal_id: GoalId,
    pub metrics: BTreeMap<ConversionMetric, f64>,
    /// Visit count of the converting visitor, bucketed into the
    /// visits-until-conversion distribution.
    pub visit_count: u64,
    /// Seconds between the visitor's first visit and the conversion,
    /// floored to whole days for the days-until-conversion distribution.
    pub seconds_since_first_visit: u64,
}

impl ConversionRow {
    /// Value of a catalog metric, failing on catalog/query drift.
    pub fn metric(&self, metric: ConversionMetric) -> Result<f64, CoreError> {
        self.metrics
            .get(&metric)
            .copied()
            .ok_or(CoreError::MissingMetric {
                goal: self.goal_id,
                metric,
            })
    }

    /// The row's conversion count. Integral by construction in the query
    /// layer; truncation only guards against float noise.
    pub fn conversions(&self) -> Result<i64, CoreError> {
        self.metric(ConversionMetric::Conversions)
            .map(|v| v as i64)
    }
}

/// Which raw row field a bucketed-column selection applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketedField {
    VisitCount,
    SecondsSinceFirstVisit,
}

/// A ranged-column selection the row source is asked to produce, driven by
/// one of the built-in range tables.
#[derive(Debug, Clone)]
pub struct BucketedColumn {
    pub field: BucketedField,
    pub ranges: RangeTable,
}

/// Log-query layer yielding conversion rows for a site and period.
#[async_trait]
pub trait ConversionRowSource: Send + Sync {
    /// Returns `Ok(None)` when the query layer reports conversion data as
    /// unavailable for the period; callers treat that the same as zero rows.
    /// An empty `Vec` is the normal result for a site without conversions.
    async fn query_conversions(
        &self,
        site_id: &str,
        period: &ReportingPeriod,
        selections: &[BucketedColumn],
    ) -> anyhow::Result<Option<Vec<ConversionRow>>>;
}

/// Goal configuration lookup for a site.
#[async_trait]
pub trait GoalCatalog: Send + Sync {
    /// Ids of the user-defined goals configured for a site. Absence of goals
    /// is a valid empty result.
    async fn goal_ids(&self, site_id: &str) -> anyhow::Result<Vec<GoalId>>;

    /// Whether a goal id belongs to the ecommerce subsystem. Reserved
    /// pseudo-goal ids are ecommerce-class by definition; catalog goals are
    /// standard unless an implementation marks them otherwise.
    fn is_ecommerce_class(&self, goal: GoalId) -> bool {
        goal.is_ecommerce()
    }
}

/// Site configuration lookup deciding whether conversion archiving is
/// worth running at all.
#[async_trait]
pub trait EligibilitySource: Send + Sync {
    /// Whether the site has ecommerce enabled or at least one goal.
    async fn has_ecommerce_or_goals(&self, site_id: &str) -> anyhow::Result<bool>;
}
