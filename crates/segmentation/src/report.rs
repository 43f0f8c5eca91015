//! One-pass segment report over a customer population.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use crm_core::{Customer, RfmConfig, ScoredCustomer, Segment};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::{segment_counts, segment_stats, SegmentStats};
use crate::engine::RfmEngine;
use crate::insights::{dominant_segment, segment_insights, SegmentInsight};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentReport {
    pub computed_at: DateTime<Utc>,
    pub config: RfmConfig,
    pub total: u64,
    pub dominant_segment: Option<Segment>,
    pub counts: BTreeMap<Segment, u64>,
    pub stats: BTreeMap<Segment, SegmentStats>,
    pub insights: Vec<SegmentInsight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customers: Vec<ScoredCustomer>,
}

impl SegmentReport {
    pub fn build(customers: &[Customer], config: &RfmConfig) -> Self {
        let scored = RfmEngine::new(config).score_all(customers);
        Self::from_scored(scored, config)
    }

    pub fn from_scored(scored: Vec<ScoredCustomer>, config: &RfmConfig) -> Self {
        let counts = segment_counts(&scored);
        let stats = segment_stats(&scored);
        let insights = segment_insights(&counts);
        let dominant = dominant_segment(&counts);

        info!(
            total = scored.len(),
            dominant = ?dominant,
            "Segment report computed"
        );

        Self {
            computed_at: Utc::now(),
            config: *config,
            total: scored.len() as u64,
            dominant_segment: dominant,
            counts,
            stats,
            insights,
            customers: scored,
        }
    }

    /// Drop the per-customer rows, keeping only aggregates.
    pub fn without_customers(mut self) -> Self {
        self.customers.clear();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core::RfmSignal;

    fn population() -> Vec<Customer> {
        vec![
            Customer::new("C001", "Champion")
                .with_rfm(RfmSignal::new(1, 20, 10_000_000))
                .with_balance(50_000_000)
                .with_points(5_000)
                .with_transaction_count(20),
            Customer::new("C002", "Dormant")
                .with_rfm(RfmSignal::new(200, 0, 0))
                .with_balance(10_000)
                .with_transaction_count(0),
            Customer::new("C003", "Unscored"),
        ]
    }

    #[test]
    fn test_report_aggregates_population() {
        let report = SegmentReport::build(&population(), &RfmConfig::default());
        assert_eq!(report.total, 3);
        assert_eq!(report.counts[&Segment::Champions], 1);
        assert_eq!(report.counts[&Segment::AtRisk], 1);
        assert_eq!(report.counts[&Segment::Potential], 1);
        assert_eq!(report.stats[&Segment::Champions].avg_balance, 50_000_000.0);
        assert_eq!(report.insights.len(), 5);
        assert_eq!(report.dominant_segment, Some(Segment::Champions));
        assert_eq!(report.customers.len(), 3);
    }

    #[test]
    fn test_without_customers_omits_rows_from_json() {
        let report = SegmentReport::build(&population(), &RfmConfig::default()).without_customers();
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("customers").is_none());
        assert_eq!(value["counts"]["At Risk"], 1);
        assert_eq!(value["stats"]["Hibernating"]["avgBalance"], 0.0);
        assert_eq!(value["config"]["recencyThresholds"], serde_json::json!([7, 30, 90]));
    }
}
