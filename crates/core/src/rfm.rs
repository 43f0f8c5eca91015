//! RFM scoring thresholds.
//!
//! Each dimension has an ascending triple of boundaries. Recency is compared
//! low-is-better against the first two entries; frequency and monetary are
//! compared high-is-better against the last two. The first entry of the
//! frequency and monetary triples is carried for the settings surface but
//! does not take part in scoring.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CrmError, CrmResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Recency,
    Frequency,
    Monetary,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Recency => f.write_str("recency"),
            Dimension::Frequency => f.write_str("frequency"),
            Dimension::Monetary => f.write_str("monetary"),
        }
    }
}

/// Scoring thresholds. Persisted as an opaque, versionless JSON blob.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RfmConfig {
    pub recency_thresholds: [u32; 3],
    pub frequency_thresholds: [u32; 3],
    pub monetary_thresholds: [u64; 3],
}

pub const DEFAULT_RECENCY_THRESHOLDS: [u32; 3] = [7, 30, 90];
pub const DEFAULT_FREQUENCY_THRESHOLDS: [u32; 3] = [2, 5, 10];
pub const DEFAULT_MONETARY_THRESHOLDS: [u64; 3] = [500_000, 2_000_000, 5_000_000];

impl Default for RfmConfig {
    fn default() -> Self {
        Self {
            recency_thresholds: DEFAULT_RECENCY_THRESHOLDS,
            frequency_thresholds: DEFAULT_FREQUENCY_THRESHOLDS,
            monetary_thresholds: DEFAULT_MONETARY_THRESHOLDS,
        }
    }
}

impl RfmConfig {
    pub fn new(recency: [u32; 3], frequency: [u32; 3], monetary: [u64; 3]) -> Self {
        Self {
            recency_thresholds: recency,
            frequency_thresholds: frequency,
            monetary_thresholds: monetary,
        }
    }

    /// Rejects any triple that is not non-decreasing.
    ///
    /// The engine scores unvalidated configurations too; this check is applied
    /// when a configuration is written through the settings surface or read
    /// back from storage.
    pub fn validate(&self) -> CrmResult<()> {
        check_triple(Dimension::Recency, widen(self.recency_thresholds))?;
        check_triple(Dimension::Frequency, widen(self.frequency_thresholds))?;
        check_triple(Dimension::Monetary, self.monetary_thresholds)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn from_json(blob: &str) -> CrmResult<Self> {
        Ok(serde_json::from_str(blob)?)
    }

    pub fn to_json(&self) -> CrmResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn widen(triple: [u32; 3]) -> [u64; 3] {
    triple.map(u64::from)
}

fn check_triple(dimension: Dimension, thresholds: [u64; 3]) -> CrmResult<()> {
    if thresholds.windows(2).all(|pair| pair[0] <= pair[1]) {
        Ok(())
    } else {
        Err(CrmError::InvalidThresholds {
            dimension,
            thresholds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = RfmConfig::default();
        assert_eq!(config.recency_thresholds, [7, 30, 90]);
        assert_eq!(config.frequency_thresholds, [2, 5, 10]);
        assert_eq!(config.monetary_thresholds, [500_000, 2_000_000, 5_000_000]);
        assert!(config.is_valid());
    }

    #[test]
    fn test_equal_boundaries_are_valid() {
        let config = RfmConfig::new([5, 5, 5], [0, 0, 0], [1, 1, 2]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_descending_triple_is_rejected() {
        let config = RfmConfig::new([7, 30, 90], [10, 5, 2], [1, 2, 3]);
        match config.validate() {
            Err(CrmError::InvalidThresholds {
                dimension,
                thresholds,
            }) => {
                assert_eq!(dimension, Dimension::Frequency);
                assert_eq!(thresholds, [10, 5, 2]);
            }
            other => panic!("expected InvalidThresholds, got {other:?}"),
        }
    }

    #[test]
    fn test_first_invalid_dimension_is_reported() {
        let config = RfmConfig::new([30, 7, 90], [2, 5, 10], [3, 2, 1]);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            CrmError::InvalidThresholds {
                dimension: Dimension::Recency,
                ..
            }
        ));
    }

    #[test]
    fn test_json_blob_uses_camel_case_keys() {
        let json = RfmConfig::default().to_json().unwrap();
        assert!(json.contains("\"recencyThresholds\":[7,30,90]"));
        assert!(json.contains("\"monetaryThresholds\":[500000,2000000,5000000]"));
        assert_eq!(RfmConfig::from_json(&json).unwrap(), RfmConfig::default());
    }

    #[test]
    fn test_wrong_shape_fails_to_parse() {
        assert!(RfmConfig::from_json("{\"recencyThresholds\":[1,2]}").is_err());
        assert!(RfmConfig::from_json("not json").is_err());
    }
}
