//! RFM segmentation engine — maps a customer's recency, frequency and
//! monetary signals to a segment and a blended score.
//!
//! The engine is pure: it holds a copy of the thresholds it was built with,
//! never mutates its inputs, and returns identical output for identical
//! input. Callers rebuild or re-run it whenever customers or thresholds change.

use crm_core::{Customer, RfmConfig, RfmSignal, ScoredCustomer, Segment};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Record keys owned by the scored output; stale copies on the input record
/// are dropped.
const DERIVED_KEYS: [&str; 2] = ["segment", "calculatedScore"];

/// Segment assigned to customers that carry no RFM signal.
pub const FALLBACK_SEGMENT: Segment = Segment::Potential;

/// Average-score floors, checked in order. Anything below the last floor is
/// Hibernating.
const SEGMENT_FLOORS: [(f64, Segment); 4] = [
    (2.5, Segment::Champions),
    (2.0, Segment::Loyal),
    (1.5, Segment::Potential),
    (1.0, Segment::AtRisk),
];

/// Per-dimension ratings, each in `1..=3`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubScores {
    pub recency: u8,
    pub frequency: u8,
    pub monetary: u8,
}

impl SubScores {
    pub fn average(&self) -> f64 {
        (f64::from(self.recency) + f64::from(self.frequency) + f64::from(self.monetary)) / 3.0
    }
}

/// Outcome of classifying one signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RfmScore {
    pub segment: Segment,
    /// `None` when the customer had no signal.
    pub sub_scores: Option<SubScores>,
    pub average: f64,
}

impl RfmScore {
    fn fallback() -> Self {
        Self {
            segment: FALLBACK_SEGMENT,
            sub_scores: None,
            average: 0.0,
        }
    }

    /// Average rendered with exactly two decimals.
    pub fn formatted(&self) -> String {
        format!("{:.2}", self.average)
    }
}

/// Lower recency is better: 3 at or under the first boundary, 2 at or under
/// the second, otherwise 1.
pub fn recency_score(recency: u32, thresholds: &[u32; 3]) -> u8 {
    if recency <= thresholds[0] {
        3
    } else if recency <= thresholds[1] {
        2
    } else {
        1
    }
}

/// Higher frequency is better: 3 at or over the top boundary, 2 at or over
/// the middle one, otherwise 1.
pub fn frequency_score(frequency: u32, thresholds: &[u32; 3]) -> u8 {
    if frequency >= thresholds[2] {
        3
    } else if frequency >= thresholds[1] {
        2
    } else {
        1
    }
}

/// Same shape as [`frequency_score`].
pub fn monetary_score(monetary: u64, thresholds: &[u64; 3]) -> u8 {
    if monetary >= thresholds[2] {
        3
    } else if monetary >= thresholds[1] {
        2
    } else {
        1
    }
}

pub fn segment_for_average(average: f64) -> Segment {
    SEGMENT_FLOORS
        .iter()
        .find(|(floor, _)| average >= *floor)
        .map(|(_, segment)| *segment)
        .unwrap_or(Segment::Hibernating)
}

/// Stateless scorer bound to one threshold configuration.
#[derive(Debug, Clone)]
pub struct RfmEngine {
    config: RfmConfig,
}

impl RfmEngine {
    pub fn new(config: &RfmConfig) -> Self {
        debug!(
            recency = ?config.recency_thresholds,
            frequency = ?config.frequency_thresholds,
            monetary = ?config.monetary_thresholds,
            "RFM engine initialized"
        );
        Self { config: *config }
    }

    pub fn config(&self) -> &RfmConfig {
        &self.config
    }

    pub fn sub_scores(&self, signal: &RfmSignal) -> SubScores {
        SubScores {
            recency: recency_score(signal.recency, &self.config.recency_thresholds),
            frequency: frequency_score(signal.frequency, &self.config.frequency_thresholds),
            monetary: monetary_score(signal.monetary, &self.config.monetary_thresholds),
        }
    }

    /// Classify a signal. An absent signal yields the fallback: Potential
    /// with a score of zero.
    pub fn classify(&self, signal: Option<&RfmSignal>) -> RfmScore {
        let Some(signal) = signal else {
            return RfmScore::fallback();
        };
        let sub_scores = self.sub_scores(signal);
        let average = sub_scores.average();
        RfmScore {
            segment: segment_for_average(average),
            sub_scores: Some(sub_scores),
            average,
        }
    }

    /// Annotate one customer with its segment and calculated score.
    pub fn score_customer(&self, customer: &Customer) -> ScoredCustomer {
        if customer.rfm.is_none() {
            debug!(customer_id = %customer.id, "No RFM signal, assigning fallback segment");
            metrics::counter!("rfm.signal_missing").increment(1);
        }
        let score = self.classify(customer.rfm.as_ref());
        let mut customer = customer.clone();
        for key in DERIVED_KEYS {
            customer.attributes.remove(key);
        }
        ScoredCustomer {
            customer,
            segment: score.segment,
            calculated_score: score.formatted(),
        }
    }

    /// Score every customer, preserving input order.
    pub fn score_all(&self, customers: &[Customer]) -> Vec<ScoredCustomer> {
        let scored: Vec<ScoredCustomer> =
            customers.iter().map(|c| self.score_customer(c)).collect();

        let missing = customers.iter().filter(|c| c.rfm.is_none()).count();
        if missing > 0 {
            warn!(
                missing,
                total = customers.len(),
                "Customers without RFM signal assigned fallback segment"
            );
        }
        metrics::counter!("rfm.customers_scored").increment(customers.len() as u64);
        debug!(total = customers.len(), "Scored customers");

        scored
    }
}

impl Default for RfmEngine {
    fn default() -> Self {
        Self::new(&RfmConfig::default())
    }
}
