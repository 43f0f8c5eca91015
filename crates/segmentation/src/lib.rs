//! RFM customer segmentation — threshold scoring, per-segment aggregates,
//! insights and the persisted threshold settings.

pub mod aggregate;
pub mod engine;
pub mod insights;
pub mod report;
pub mod settings;
pub mod store;

pub use aggregate::{customers_in_segment, retention_for, segment_counts, segment_stats, SegmentStats};
pub use engine::{RfmEngine, RfmScore, SubScores};
pub use insights::{segment_insights, SegmentInsight};
pub use report::SegmentReport;
pub use settings::{RfmSettings, RFM_CONFIG_KEY};
pub use store::{ConfigStore, FileStore, MemoryStore};
