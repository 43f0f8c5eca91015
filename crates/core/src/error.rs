use thiserror::Error;

use crate::rfm::Dimension;

pub type CrmResult<T> = Result<T, CrmError>;

#[derive(Error, Debug)]
pub enum CrmError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid {dimension} thresholds {thresholds:?}: must be non-decreasing")]
    InvalidThresholds {
        dimension: Dimension,
        thresholds: [u64; 3],
    },

    #[error("Unknown segment: {0}")]
    UnknownSegment(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
