//! Bucket range tables for the "visits until conversion" and
//! "days until conversion" distributions.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// One inclusive bucket of a range table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketRange {
    Closed { lo: u64, hi: u64 },
    /// Catch-all "lo or greater" bucket; only valid as the last range.
    OpenEnded { lo: u64 },
}

impl BucketRange {
    fn contains(&self, value: u64) -> bool {
        match *self {
            BucketRange::Closed { lo, hi } => value >= lo && value <= hi,
            BucketRange::OpenEnded { lo } => value >= lo,
        }
    }

    fn label(&self) -> String {
        match *self {
            BucketRange::Closed { lo, hi } if lo == hi => lo.to_string(),
            BucketRange::Closed { lo, hi } => format!("{lo}-{hi}"),
            BucketRange::OpenEnded { lo } => format!("{lo}+"),
        }
    }
}

const VISIT_COUNT_RANGES: &[BucketRange] = &[
    BucketRange::Closed { lo: 1, hi: 1 },
    BucketRange::Closed { lo: 2, hi: 2 },
    BucketRange::Closed { lo: 3, hi: 3 },
    BucketRange::Closed { lo: 4, hi: 4 },
    BucketRange::Closed { lo: 5, hi: 5 },
    BucketRange::Closed { lo: 6, hi: 6 },
    BucketRange::Closed { lo: 7, hi: 7 },
    BucketRange::Closed { lo: 8, hi: 8 },
    BucketRange::Closed { lo: 9, hi: 14 },
    BucketRange::Closed { lo: 15, hi: 25 },
    BucketRange::Closed { lo: 26, hi: 50 },
    BucketRange::Closed { lo: 51, hi: 100 },
    BucketRange::OpenEnded { lo: 100 },
];

const DAYS_TO_CONVERSION_RANGES: &[BucketRange] = &[
    BucketRange::Closed { lo: 0, hi: 0 },
    BucketRange::Closed { lo: 1, hi: 1 },
    BucketRange::Closed { lo: 2, hi: 2 },
    BucketRange::Closed { lo: 3, hi: 3 },
    BucketRange::Closed { lo: 4, hi: 4 },
    BucketRange::Closed { lo: 5, hi: 5 },
    BucketRange::Closed { lo: 6, hi: 6 },
    BucketRange::Closed { lo: 7, hi: 7 },
    BucketRange::Closed { lo: 8, hi: 14 },
    BucketRange::Closed { lo: 15, hi: 30 },
    BucketRange::Closed { lo: 31, hi: 60 },
    BucketRange::Closed { lo: 61, hi: 120 },
    BucketRange::Closed { lo: 121, hi: 364 },
    BucketRange::OpenEnded { lo: 364 },
];

/// Immutable, ordered bucket table mapping numeric values to range labels.
///
/// Lookup scans in ascending order and the first matching range wins, so at a
/// boundary shared by the last closed range and the open-ended catch-all
/// (e.g. 364 days, 100 visits) the closed range takes the value.
#[derive(Debug, Clone)]
pub struct RangeTable {
    dimension: &'static str,
    buckets: Vec<(BucketRange, String)>,
}

impl RangeTable {
    /// Builds a validated table from caller-supplied ranges.
    pub fn new(dimension: &'static str, ranges: Vec<BucketRange>) -> Result<Self, CoreError> {
        let invalid = |reason: String| CoreError::InvalidRangeSpec {
            dimension: dimension.to_string(),
            reason,
        };

        if ranges.is_empty() {
            return Err(invalid("no ranges defined".to_string()));
        }
        let mut prev_hi: Option<u64> = None;
        for (idx, range) in ranges.iter().enumerate() {
            match *range {
                BucketRange::Closed { lo, hi } => {
                    if lo > hi {
                        return Err(invalid(format!("range {lo}-{hi} has lo > hi")));
                    }
                    if let Some(prev) = prev_hi {
                        if lo <= prev {
                            return Err(invalid(format!(
                                "range starting at {lo} overlaps previous range ending at {prev}"
                            )));
                        }
                    }
                    prev_hi = Some(hi);
                }
                BucketRange::OpenEnded { lo } => {
                    if idx != ranges.len() - 1 {
                        return Err(invalid(format!(
                            "open-ended range {lo}+ must be last"
                        )));
                    }
                    // May share its lo with the previous range's hi; the
                    // closed range shadows it at that boundary.
                    if let Some(prev) = prev_hi {
                        if lo > prev + 1 {
                            return Err(invalid(format!(
                                "gap between {prev} and open-ended range {lo}+"
                            )));
                        }
                    }
                }
            }
        }

        Ok(Self::from_ranges(dimension, &ranges))
    }

    fn from_ranges(dimension: &'static str, ranges: &[BucketRange]) -> Self {
        let buckets = ranges.iter().map(|r| (*r, r.label())).collect();
        Self { dimension, buckets }
    }

    /// Built-in table for the "visits until conversion" dimension.
    pub fn visit_counts() -> Self {
        Self::from_ranges("visits_until_conversion", VISIT_COUNT_RANGES)
    }

    /// Built-in table for the "days until conversion" dimension.
    pub fn days_to_conversion() -> Self {
        Self::from_ranges("days_until_conversion", DAYS_TO_CONVERSION_RANGES)
    }

    pub fn dimension(&self) -> &'static str {
        self.dimension
    }

    /// Label of the first range containing `value`.
    ///
    /// A miss means the table does not cover the domain minimum or the input
    /// is out of domain; both are configuration errors and fail loudly.
    pub fn bucket_label(&self, value: u64) -> Result<&str, CoreError> {
        self.buckets
            .iter()
            .find(|(range, _)| range.contains(value))
            .map(|(_, label)| label.as_str())
            .ok_or_else(|| CoreError::ValueOutOfRange {
                dimension: self.dimension.to_string(),
                value,
            })
    }

    /// All bucket labels in range order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(_, label)| label.as_str())
    }
}

/// Whole days elapsed for a seconds-since-first-visit value.
pub fn elapsed_days(seconds_since_first_visit: u64) -> u64 {
    seconds_since_first_visit / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_and_span_labels() {
        let table = RangeTable::visit_counts();
        let labels: Vec<&str> = table.labels().collect();
        assert_eq!(
            labels,
            vec![
                "1", "2", "3", "4", "5", "6", "7", "8", "9-14", "15-25", "26-50", "51-100",
                "100+"
            ]
        );
    }

    #[test]
    fn day_labels_include_open_ended_bucket() {
        let table = RangeTable::days_to_conversion();
        let labels: Vec<&str> = table.labels().collect();
        assert_eq!(labels.first(), Some(&"0"));
        assert_eq!(labels.last(), Some(&"364+"));
    }

    #[test]
    fn values_in_the_same_range_share_a_label() {
        let table = RangeTable::visit_counts();
        for v in 9..=14 {
            assert_eq!(table.bucket_label(v).expect("in domain"), "9-14");
        }
    }

    #[test]
    fn closed_range_wins_at_shared_boundary() {
        let visits = RangeTable::visit_counts();
        assert_eq!(visits.bucket_label(100).expect("in domain"), "51-100");
        assert_eq!(visits.bucket_label(101).expect("in domain"), "100+");

        let days = RangeTable::days_to_conversion();
        assert_eq!(days.bucket_label(364).expect("in domain"), "121-364");
        assert_eq!(days.bucket_label(365).expect("in domain"), "364+");
    }

    #[test]
    fn seconds_floor_to_whole_days() {
        assert_eq!(elapsed_days(0), 0);
        assert_eq!(elapsed_days(86_399), 0);
        assert_eq!(elapsed_days(86_400), 1);
        // 365 full days lands in the open-ended bucket.
        let days = RangeTable::days_to_conversion();
        let label = days
            .bucket_label(elapsed_days(31_536_000))
            .expect("in domain");
        assert_eq!(label, "364+");
    }

    #[test]
    fn below_domain_value_is_an_error() {
        let table = RangeTable::visit_counts();
        let err = table.bucket_label(0).expect_err("0 visits is out of domain");
        assert!(matches!(err, CoreError::ValueOutOfRange { value: 0, .. }));
    }

    #[test]
    fn validation_rejects_misordered_ranges() {
        let err = RangeTable::new(
            "test",
            vec![
                BucketRange::Closed { lo: 1, hi: 5 },
                BucketRange::Closed { lo: 4, hi: 8 },
            ],
        )
        .expect_err("overlap");
        assert!(matches!(err, CoreError::InvalidRangeSpec { .. }));
    }

    #[test]
    fn validation_rejects_open_range_not_last() {
        let err = RangeTable::new(
            "test",
            vec![
                BucketRange::OpenEnded { lo: 0 },
                BucketRange::Closed { lo: 1, hi: 2 },
            ],
        )
        .expect_err("open range must be last");
        assert!(matches!(err, CoreError::InvalidRangeSpec { .. }));
    }

    #[test]
    fn builtin_tables_pass_their_own_validation() {
        RangeTable::new("visits", VISIT_COUNT_RANGES.to_vec()).expect("valid");
        RangeTable::new("days", DAYS_TO_CONVERSION_RANGES.to_vec()).expect("valid");
    }
}
