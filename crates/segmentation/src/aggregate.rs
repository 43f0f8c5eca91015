//! Reducers over a scored customer set: per-segment counts, averages and the
//! retention lookup.

use std::collections::BTreeMap;

use crm_core::{ScoredCustomer, Segment};
use serde::{Deserialize, Serialize};

/// Illustrative retention rate (percent) per segment. Fixed, not measured.
pub fn retention_for(segment: Segment) -> u32 {
    match segment {
        Segment::Champions => 95,
        Segment::Loyal => 88,
        Segment::Potential => 72,
        Segment::AtRisk => 45,
        Segment::Hibernating => 25,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStats {
    pub count: u64,
    pub avg_balance: f64,
    pub avg_transaction_count: f64,
    pub avg_points: f64,
    pub retention: u32,
}

/// Member count per segment. Every segment is present, zero when empty.
pub fn segment_counts(scored: &[ScoredCustomer]) -> BTreeMap<Segment, u64> {
    let mut counts: BTreeMap<Segment, u64> = Segment::ALL.iter().map(|s| (*s, 0)).collect();
    for customer in scored {
        *counts.entry(customer.segment).or_insert(0) += 1;
    }
    counts
}

/// Per-segment averages of balance, transaction count and points.
///
/// Balance, points and transaction count are read from the customer record
/// carried inside each scored entry. Empty segments average to zero.
pub fn segment_stats(scored: &[ScoredCustomer]) -> BTreeMap<Segment, SegmentStats> {
    Segment::ALL
        .iter()
        .map(|segment| {
            let members: Vec<&ScoredCustomer> =
                scored.iter().filter(|c| c.segment == *segment).collect();
            let stats = SegmentStats {
                count: members.len() as u64,
                avg_balance: mean(&members, |c| c.customer.balance as f64),
                avg_transaction_count: mean(&members, |c| f64::from(c.customer.transaction_count)),
                avg_points: mean(&members, |c| c.customer.points as f64),
                retention: retention_for(*segment),
            };
            (*segment, stats)
        })
        .collect()
}

/// Members of one segment, in input order. Used for campaign targeting.
pub fn customers_in_segment(scored: &[ScoredCustomer], segment: Segment) -> Vec<&ScoredCustomer> {
    scored.iter().filter(|c| c.segment == segment).collect()
}

fn mean<F>(members: &[&ScoredCustomer], value: F) -> f64
where
    F: Fn(&ScoredCustomer) -> f64,
{
    if members.is_empty() {
        return 0.0;
    }
    members.iter().map(|&c| value(c)).sum::<f64>() / members.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core::Customer;

    fn scored(id: &str, segment: Segment, balance: i64, txns: u32, points: u64) -> ScoredCustomer {
        ScoredCustomer {
            customer: Customer::new(id, id)
                .with_balance(balance)
                .with_transaction_count(txns)
                .with_points(points),
            segment,
            calculated_score: "0.00".to_string(),
        }
    }

    #[test]
    fn test_counts_include_every_segment() {
        let counts = segment_counts(&[]);
        assert_eq!(counts.len(), 5);
        assert!(counts.values().all(|c| *c == 0));
    }

    #[test]
    fn test_counts_sum_to_input_length() {
        let input = vec![
            scored("a", Segment::Champions, 0, 0, 0),
            scored("b", Segment::Champions, 0, 0, 0),
            scored("c", Segment::AtRisk, 0, 0, 0),
        ];
        let counts = segment_counts(&input);
        assert_eq!(counts.values().sum::<u64>(), 3);
        assert_eq!(counts[&Segment::Champions], 2);
        assert_eq!(counts[&Segment::AtRisk], 1);
        assert_eq!(counts[&Segment::Hibernating], 0);
    }

    #[test]
    fn test_stats_average_member_fields() {
        let input = vec![
            scored("a", Segment::Loyal, 1_000, 10, 100),
            scored("b", Segment::Loyal, 3_000, 20, 300),
            scored("c", Segment::Potential, -500, 1, 5),
        ];
        let stats = segment_stats(&input);

        let loyal = &stats[&Segment::Loyal];
        assert_eq!(loyal.count, 2);
        assert_eq!(loyal.avg_balance, 2_000.0);
        assert_eq!(loyal.avg_transaction_count, 15.0);
        assert_eq!(loyal.avg_points, 200.0);
        assert_eq!(loyal.retention, 88);

        assert_eq!(stats[&Segment::Potential].avg_balance, -500.0);
    }

    #[test]
    fn test_empty_segment_stats_are_zero_not_nan() {
        let stats = segment_stats(&[scored("a", Segment::Champions, 10, 1, 1)]);
        let hibernating = &stats[&Segment::Hibernating];
        assert_eq!(hibernating.count, 0);
        assert_eq!(hibernating.avg_balance, 0.0);
        assert_eq!(hibernating.avg_transaction_count, 0.0);
        assert_eq!(hibernating.avg_points, 0.0);
        assert!(stats.values().all(|s| s.avg_balance.is_finite()));
    }

    #[test]
    fn test_retention_table_is_fixed() {
        let expected = [95, 88, 72, 45, 25];
        for (segment, retention) in Segment::ALL.iter().zip(expected) {
            assert_eq!(retention_for(*segment), retention);
        }
        let stats = segment_stats(&[]);
        for (segment, retention) in Segment::ALL.iter().zip(expected) {
            assert_eq!(stats[segment].retention, retention);
        }
    }

    #[test]
    fn test_customers_in_segment_preserves_order() {
        let input = vec![
            scored("a", Segment::AtRisk, 0, 0, 0),
            scored("b", Segment::Loyal, 0, 0, 0),
            scored("c", Segment::AtRisk, 0, 0, 0),
        ];
        let at_risk: Vec<&str> = customers_in_segment(&input, Segment::AtRisk)
            .iter()
            .map(|c| c.customer.id.as_str())
            .collect();
        assert_eq!(at_risk, vec!["a", "c"]);
        assert!(customers_in_segment(&input, Segment::Champions).is_empty());
    }
}
