use thiserror::Error;

use crate::goal::GoalId;
use crate::metrics::ConversionMetric;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A value fell outside every range of a bucket table. Range tables must
    /// start at the domain minimum, so this indicates a malformed table or an
    /// out-of-domain input, never missing data.
    #[error("{dimension} value {value} is outside every configured range")]
    ValueOutOfRange { dimension: String, value: u64 },

    /// A conversion row did not carry a metric from the closed catalog. The
    /// query layer and the catalog have drifted; dropping the metric silently
    /// would corrupt the archived totals.
    #[error("conversion row for goal {goal} is missing metric {metric}")]
    MissingMetric {
        goal: GoalId,
        metric: ConversionMetric,
    },

    #[error("invalid range table for {dimension}: {reason}")]
    InvalidRangeSpec {
        dimension: String,
        reason: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
