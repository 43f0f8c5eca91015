pub mod config;
pub mod error;
pub mod rfm;
pub mod types;

pub use config::AppConfig;
pub use error::{CrmError, CrmResult};
pub use rfm::{Dimension, RfmConfig};
pub use types::{Customer, RfmSignal, ScoredCustomer, Segment};
