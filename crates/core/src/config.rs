//! Selector configuration
//!
//! Thresholds the selector uses internally. These are not user preferences
//! (those live in [`crate::parameters::Parameters`]) but tuning constants a
//! host may want to adjust per device family.
//!
//! Configuration can be loaded from a TOML file and/or environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// Tuning constants for the selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Video groups whose frame rate is known and below this value rank
    /// below groups with a reasonable frame rate.
    #[serde(default = "default_min_reasonable_frame_rate")]
    pub min_reasonable_frame_rate: f32,

    /// Fraction of the viewport a video must cover in both dimensions to be
    /// treated as filling it. Larger videos than the smallest such video are
    /// excluded from viewport-constrained selection.
    #[serde(default = "default_fullscreen_viewport_fraction")]
    pub fullscreen_viewport_fraction: f32,
}

fn default_min_reasonable_frame_rate() -> f32 {
    10.0
}

fn default_fullscreen_viewport_fraction() -> f32 {
    0.98
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_reasonable_frame_rate: default_min_reasonable_frame_rate(),
            fullscreen_viewport_fraction: default_fullscreen_viewport_fraction(),
        }
    }
}

impl SelectorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: SelectorConfig =
            toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = SelectorConfig::default();

        if let Ok(rate) = std::env::var("TRACKSELECT_MIN_REASONABLE_FRAME_RATE") {
            if let Ok(r) = rate.parse() {
                config.min_reasonable_frame_rate = r;
            }
        }
        if let Ok(fraction) = std::env::var("TRACKSELECT_FULLSCREEN_VIEWPORT_FRACTION") {
            if let Ok(f) = fraction.parse::<f32>() {
                if f > 0.0 && f <= 1.0 {
                    config.fullscreen_viewport_fraction = f;
                }
            }
        }

        config
    }

    /// Load configuration from file if it exists, otherwise from environment
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        if let Some(p) = path {
            if p.as_ref().exists() {
                return Self::from_file(p);
            }
        }
        Ok(Self::from_env())
    }

    fn validate(&self) -> Result<()> {
        if !(self.fullscreen_viewport_fraction > 0.0 && self.fullscreen_viewport_fraction <= 1.0) {
            return Err(Error::Config(format!(
                "fullscreen_viewport_fraction must be in (0, 1], got {}",
                self.fullscreen_viewport_fraction
            )));
        }
        if self.min_reasonable_frame_rate < 0.0 {
            return Err(Error::Config(format!(
                "min_reasonable_frame_rate must not be negative, got {}",
                self.min_reasonable_frame_rate
            )));
        }
        Ok(())
    }
}
