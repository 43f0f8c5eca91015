//! Customer domain types shared by the segmentation engine and its consumers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CrmError;

// ─── Segments ───────────────────────────────────────────────────────────────

/// RFM customer segment. Declaration order is best-first, so `Ord` and
/// `BTreeMap<Segment, _>` iterate Champions → Hibernating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Best on all three dimensions.
    Champions,
    /// Strong repeat engagement.
    Loyal,
    /// Emerging, upside opportunity.
    Potential,
    /// Declining engagement, needs intervention.
    #[serde(rename = "At Risk")]
    AtRisk,
    /// Long-dormant.
    Hibernating,
}

impl Segment {
    pub const ALL: [Segment; 5] = [
        Segment::Champions,
        Segment::Loyal,
        Segment::Potential,
        Segment::AtRisk,
        Segment::Hibernating,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Segment::Champions => "Champions",
            Segment::Loyal => "Loyal",
            Segment::Potential => "Potential",
            Segment::AtRisk => "At Risk",
            Segment::Hibernating => "Hibernating",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Segment {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Segment::ALL
            .into_iter()
            .find(|segment| segment.label() == s)
            .ok_or_else(|| CrmError::UnknownSegment(s.to_string()))
    }
}

// ─── Customers ──────────────────────────────────────────────────────────────

/// Transaction-derived signals for one scoring run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RfmSignal {
    /// Days since last qualifying activity. Lower is better.
    pub recency: u32,
    /// Qualifying transactions in the observation window. Higher is better.
    pub frequency: u32,
    /// Transacted value in the observation window, in whole currency units.
    pub monetary: u64,
}

impl RfmSignal {
    pub fn new(recency: u32, frequency: u32, monetary: u64) -> Self {
        Self {
            recency,
            frequency,
            monetary,
        }
    }
}

/// A bank customer record as supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub transaction_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rfm: Option<RfmSignal>,
    /// Any other fields of the record, carried through scoring untouched.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Customer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_rfm(mut self, signal: RfmSignal) -> Self {
        self.rfm = Some(signal);
        self
    }

    pub fn with_balance(mut self, balance: i64) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_points(mut self, points: u64) -> Self {
        self.points = points;
        self
    }

    pub fn with_transaction_count(mut self, count: u32) -> Self {
        self.transaction_count = count;
        self
    }
}

/// A customer annotated with its segment and blended score. Derived on every
/// recompute and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCustomer {
    #[serde(flatten)]
    pub customer: Customer,
    pub segment: Segment,
    /// Mean of the three sub-scores with exactly two decimals, `"0.00"` for
    /// customers without a signal.
    pub calculated_score: String,
}
