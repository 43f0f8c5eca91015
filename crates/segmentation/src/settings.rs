//! Settings surface for the scoring thresholds.
//!
//! Holds the working configuration alongside the last-saved one and persists
//! through an injected [`ConfigStore`]. Reads happen once on load, writes only
//! on [`RfmSettings::save`].

use std::sync::Arc;

use crm_core::{CrmResult, RfmConfig};
use tracing::{info, warn};

use crate::engine::RfmEngine;
use crate::store::ConfigStore;

/// Storage key of the persisted threshold blob.
pub const RFM_CONFIG_KEY: &str = "rfm_config";

pub struct RfmSettings {
    store: Arc<dyn ConfigStore>,
    key: String,
    current: RfmConfig,
    saved: RfmConfig,
}

impl RfmSettings {
    /// Load the saved configuration. A missing, unreadable, malformed or
    /// non-monotonic blob falls back to the defaults.
    pub fn load(store: Arc<dyn ConfigStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let saved = read_saved(store.as_ref(), &key);
        Self {
            store,
            key,
            current: saved,
            saved,
        }
    }

    pub fn current(&self) -> &RfmConfig {
        &self.current
    }

    pub fn saved(&self) -> &RfmConfig {
        &self.saved
    }

    /// Whether the working configuration differs from the last save.
    pub fn is_dirty(&self) -> bool {
        self.current != self.saved
    }

    /// Engine bound to the working configuration.
    pub fn engine(&self) -> RfmEngine {
        RfmEngine::new(&self.current)
    }

    /// Replace the working configuration. Non-monotonic triples are rejected
    /// and leave the settings untouched.
    pub fn update(&mut self, config: RfmConfig) -> CrmResult<()> {
        if let Err(e) = config.validate() {
            warn!(error = %e, "Rejected RFM threshold update");
            return Err(e);
        }
        self.current = config;
        Ok(())
    }

    pub fn set_recency_thresholds(&mut self, thresholds: [u32; 3]) -> CrmResult<()> {
        self.update(RfmConfig {
            recency_thresholds: thresholds,
            ..self.current
        })
    }

    pub fn set_frequency_thresholds(&mut self, thresholds: [u32; 3]) -> CrmResult<()> {
        self.update(RfmConfig {
            frequency_thresholds: thresholds,
            ..self.current
        })
    }

    pub fn set_monetary_thresholds(&mut self, thresholds: [u64; 3]) -> CrmResult<()> {
        self.update(RfmConfig {
            monetary_thresholds: thresholds,
            ..self.current
        })
    }

    /// Persist the working configuration and clear the dirty flag.
    pub fn save(&mut self) -> CrmResult<()> {
        let blob = self.current.to_json()?;
        self.store.set(&self.key, &blob)?;
        self.saved = self.current;
        info!(key = %self.key, config = %blob, "RFM config saved");
        Ok(())
    }

    /// Revert unsaved edits.
    pub fn discard(&mut self) {
        self.current = self.saved;
    }

    /// Working configuration back to defaults. Not persisted until saved.
    pub fn reset_to_defaults(&mut self) {
        self.current = RfmConfig::default();
    }

    /// Delete the saved blob so the next load starts from the defaults.
    pub fn clear(&mut self) -> CrmResult<()> {
        self.store.remove(&self.key)?;
        self.current = RfmConfig::default();
        self.saved = RfmConfig::default();
        info!(key = %self.key, "RFM config cleared");
        Ok(())
    }
}

fn read_saved(store: &dyn ConfigStore, key: &str) -> RfmConfig {
    let blob = match store.get(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            info!(key, "No saved RFM config, using defaults");
            return RfmConfig::default();
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read RFM config, using defaults");
            metrics::counter!("rfm.config_fallback").increment(1);
            return RfmConfig::default();
        }
    };

    match RfmConfig::from_json(&blob).and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => {
            info!(key, "RFM config loaded");
            config
        }
        Err(e) => {
            warn!(key, error = %e, "Stored RFM config unusable, using defaults");
            metrics::counter!("rfm.config_fallback").increment(1);
            RfmConfig::default()
        }
    }
}
