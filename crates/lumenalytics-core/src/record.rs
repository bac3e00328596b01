//! Archive record naming and values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::goal::GoalId;

/// Prefix namespacing every goal-conversion archive record.
pub const RECORD_NAME_PREFIX: &str = "Goal";

/// Base name of the "visits until conversion" distribution records.
pub const VISITS_UNTIL_CONVERSION_RECORD: &str = "visits_until_conv";

/// Base name of the "days until conversion" distribution records.
pub const DAYS_UNTIL_CONVERSION_RECORD: &str = "days_until_conv";

/// Derives an archive record name from a base metric/dimension name.
///
/// Per-goal records append the goal id; the goal-less form names the
/// cross-goal totals and overview records.
pub fn record_name(base: &str, goal: Option<GoalId>) -> String {
    match goal {
        Some(goal) => format!("{RECORD_NAME_PREFIX}_{base}_{goal}"),
        None => format!("{RECORD_NAME_PREFIX}_{base}"),
    }
}

/// Histogram of conversion counts keyed by bucket label, for one goal and
/// one dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistributionTable {
    buckets: BTreeMap<String, i64>,
}

impl DistributionTable {
    pub fn add(&mut self, label: &str, conversions: i64) {
        if conversions == 0 {
            return;
        }
        *self.buckets.entry(label.to_string()).or_insert(0) += conversions;
    }

    /// Label-wise additive merge of another table into this one.
    pub fn merge(&mut self, other: &DistributionTable) {
        for (label, conversions) in &other.buckets {
            *self.buckets.entry(label.clone()).or_insert(0) += conversions;
        }
    }

    pub fn get(&self, label: &str) -> i64 {
        self.buckets.get(label).copied().unwrap_or(0)
    }

    pub fn total_conversions(&self) -> i64 {
        self.buckets.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.buckets.iter().map(|(label, v)| (label.as_str(), *v))
    }
}

/// A single archived value: scalar metric or serialized-as-blob table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordValue {
    Numeric(f64),
    Blob(DistributionTable),
}

/// The final output of one archiving invocation, keyed by record name.
pub type RecordSet = BTreeMap<String, RecordValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Numeric,
    Blob,
}

/// Schema entry for a record that an archiving run can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordMetadata {
    pub name: String,
    pub record_type: RecordType,
}

impl RecordMetadata {
    pub fn numeric(name: String) -> Self {
        Self {
            name,
            record_type: RecordType::Numeric,
        }
    }

    pub fn blob(name: String) -> Self {
        Self {
            name,
            record_type: RecordType::Blob,
        }
    }
}
