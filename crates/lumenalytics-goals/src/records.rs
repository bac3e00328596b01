//! Assembly of the final record set and enumeration of the expected schema.

use lumenalytics_core::goal::{GoalId, ECOMMERCE_GOAL_IDS};
use lumenalytics_core::metrics::ConversionMetric;
use lumenalytics_core::record::{
    record_name, DistributionTable, RecordMetadata, RecordSet, RecordValue,
    DAYS_UNTIL_CONVERSION_RECORD, VISITS_UNTIL_CONVERSION_RECORD,
};

use crate::aggregator::ConversionAggregates;

/// Builds the flat record set for one archiving run.
///
/// The three cross-goal scalars and the two overview blobs are always
/// emitted, as zeros and empty tables when nothing was aggregated, so
/// downstream storage never sees absent mandatory records.
pub fn assemble_records(
    aggregates: ConversionAggregates,
    visits_overview: DistributionTable,
    days_overview: DistributionTable,
    converted_visits: i64,
) -> RecordSet {
    let mut records = RecordSet::new();

    records.insert(
        record_name(ConversionMetric::Conversions.record_base(), None),
        RecordValue::Numeric(aggregates.total_conversions as f64),
    );
    records.insert(
        record_name(ConversionMetric::VisitsConverted.record_base(), None),
        RecordValue::Numeric(converted_visits as f64),
    );
    records.insert(
        record_name(ConversionMetric::Revenue.record_base(), None),
        RecordValue::Numeric(aggregates.total_revenue),
    );

    for (goal, metrics) in aggregates.metrics_by_goal {
        for (metric, value) in metrics {
            records.insert(
                record_name(metric.record_base(), Some(goal)),
                RecordValue::Numeric(value),
            );
        }
    }

    for (goal, table) in aggregates.visits_to_conversion {
        records.insert(
            record_name(VISITS_UNTIL_CONVERSION_RECORD, Some(goal)),
            RecordValue::Blob(table),
        );
    }
    records.insert(
        record_name(VISITS_UNTIL_CONVERSION_RECORD, None),
        RecordValue::Blob(visits_overview),
    );

    for (goal, table) in aggregates.days_to_conversion {
        records.insert(
            record_name(DAYS_UNTIL_CONVERSION_RECORD, Some(goal)),
            RecordValue::Blob(table),
        );
    }
    records.insert(
        record_name(DAYS_UNTIL_CONVERSION_RECORD, None),
        RecordValue::Blob(days_overview),
    );

    records
}

/// Enumerates every record an archiving run for these goals could produce,
/// independent of actual data. Storage layers use this to declare the
/// expected schema ahead of archiving.
pub fn record_metadata(goal_ids: &[GoalId], ecommerce_active: bool) -> Vec<RecordMetadata> {
    let mut records = vec![
        RecordMetadata::blob(record_name(VISITS_UNTIL_CONVERSION_RECORD, None)),
        RecordMetadata::blob(record_name(DAYS_UNTIL_CONVERSION_RECORD, None)),
        RecordMetadata::numeric(record_name(ConversionMetric::Conversions.record_base(), None)),
        RecordMetadata::numeric(record_name(
            ConversionMetric::VisitsConverted.record_base(),
            None,
        )),
        RecordMetadata::numeric(record_name(ConversionMetric::Revenue.record_base(), None)),
    ];

    let mut goals: Vec<GoalId> = goal_ids.to_vec();
    if ecommerce_active {
        goals.extend(ECOMMERCE_GOAL_IDS);
    }

    for goal in goals {
        for metric in ConversionMetric::ALL {
            records.push(RecordMetadata::numeric(record_name(
                metric.record_base(),
                Some(goal),
            )));
        }
        records.push(RecordMetadata::blob(record_name(
            VISITS_UNTIL_CONVERSION_RECORD,
            Some(goal),
        )));
        records.push(RecordMetadata::blob(record_name(
            DAYS_UNTIL_CONVERSION_RECORD,
            Some(goal),
        )));
    }

    records
}
