//! Engine configuration
//!
//! Every field has a default, so `{}` is a valid configuration. Values can
//! come from JSON or be overlaid from `HANDSIGN_*` environment variables.

use serde::{Deserialize, Serialize};

use crate::error::{GestureError, Result};
use crate::estimator::EstimatorConfig;
use crate::geometry::ExtractorConfig;
use crate::session::SessionConfig;

pub const ENV_ACCEPTANCE_THRESHOLD: &str = "HANDSIGN_ACCEPTANCE_THRESHOLD";
pub const ENV_SMOOTHING: &str = "HANDSIGN_SMOOTHING";
pub const ENV_SMOOTHING_WINDOW: &str = "HANDSIGN_SMOOTHING_WINDOW";
pub const ENV_SMOOTHING_DECAY: &str = "HANDSIGN_SMOOTHING_DECAY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub extractor: ExtractorConfig,
    pub estimator: EstimatorConfig,
    pub session: SessionConfig,
    /// Run frames through a classification session
    pub smoothing: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            estimator: EstimatorConfig::default(),
            session: SessionConfig::default(),
            smoothing: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| GestureError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with `HANDSIGN_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`; unparseable values are ignored
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(threshold) = lookup(ENV_ACCEPTANCE_THRESHOLD).and_then(|v| v.trim().parse::<f64>().ok()) {
            config.estimator.acceptance_threshold = threshold;
            config.session.acceptance_threshold = threshold;
        }
        if let Some(smoothing) = lookup(ENV_SMOOTHING).and_then(|v| parse_bool(&v)) {
            config.smoothing = smoothing;
        }
        if let Some(window) = lookup(ENV_SMOOTHING_WINDOW).and_then(|v| v.trim().parse::<usize>().ok()) {
            config.session.window_size = window;
        }
        if let Some(decay) = lookup(ENV_SMOOTHING_DECAY).and_then(|v| v.trim().parse::<f64>().ok()) {
            config.session.decay = decay;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        self.estimator.validate()?;
        if self.smoothing {
            self.session.validate()?;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
