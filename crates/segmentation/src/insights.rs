//! Segment insights — population share and the recommended CRM action for
//! each segment.

use std::collections::BTreeMap;

use crm_core::Segment;
use serde::{Deserialize, Serialize};

use crate::aggregate::retention_for;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentInsight {
    pub segment: Segment,
    pub count: u64,
    /// Percent of the scored population, one decimal place.
    pub share: f64,
    pub retention: u32,
    pub action: String,
}

pub fn recommended_action(segment: Segment) -> &'static str {
    match segment {
        Segment::Champions => "Reward with VIP benefits and upsell premium products",
        Segment::Loyal => "Cross-sell complementary products and grow share of wallet",
        Segment::Potential => "Nurture with onboarding offers to build transaction habits",
        Segment::AtRisk => "Run win-back outreach before the relationship lapses",
        Segment::Hibernating => "Send a reactivation campaign or review account status",
    }
}

/// One insight per segment, best segment first.
pub fn segment_insights(counts: &BTreeMap<Segment, u64>) -> Vec<SegmentInsight> {
    let total: u64 = counts.values().sum();
    Segment::ALL
        .iter()
        .map(|segment| {
            let count = counts.get(segment).copied().unwrap_or(0);
            SegmentInsight {
                segment: *segment,
                count,
                share: share_percent(count, total),
                retention: retention_for(*segment),
                action: recommended_action(*segment).to_string(),
            }
        })
        .collect()
}

/// The most populated segment; ties go to the better segment.
pub fn dominant_segment(counts: &BTreeMap<Segment, u64>) -> Option<Segment> {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .fold(None, |best: Option<(Segment, u64)>, (segment, count)| match best {
            Some((_, best_count)) if best_count >= *count => best,
            _ => Some((*segment, *count)),
        })
        .map(|(segment, _)| segment)
}

fn share_percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}
