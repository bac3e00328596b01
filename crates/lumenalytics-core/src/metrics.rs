use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed catalog of per-goal conversion metrics.
///
/// Every conversion row must carry a value for each of these; the aggregator
/// treats an absent metric as query-layer drift and fails rather than
/// guessing. The ecommerce revenue breakdown metrics are zero for
/// non-ecommerce goals but still present.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMetric {
    Conversions,
    VisitsConverted,
    Revenue,
    RevenueSubtotal,
    RevenueTax,
    RevenueShipping,
    RevenueDiscount,
    ItemsPurchased,
}

impl ConversionMetric {
    pub const ALL: [ConversionMetric; 8] = [
        ConversionMetric::Conversions,
        ConversionMetric::VisitsConverted,
        ConversionMetric::Revenue,
        ConversionMetric::RevenueSubtotal,
        ConversionMetric::RevenueTax,
        ConversionMetric::RevenueShipping,
        ConversionMetric::RevenueDiscount,
        ConversionMetric::ItemsPurchased,
    ];

    /// Base name used when deriving archive record names for this metric.
    pub fn record_base(self) -> &'static str {
        match self {
            ConversionMetric::Conversions => "nb_conversions",
            ConversionMetric::VisitsConverted => "nb_visits_converted",
            ConversionMetric::Revenue => "revenue",
            ConversionMetric::RevenueSubtotal => "revenue_subtotal",
            ConversionMetric::RevenueTax => "revenue_tax",
            ConversionMetric::RevenueShipping => "revenue_shipping",
            ConversionMetric::RevenueDiscount => "revenue_discount",
            ConversionMetric::ItemsPurchased => "items",
        }
    }
}

impl fmt::Display for ConversionMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record_base())
    }
}
