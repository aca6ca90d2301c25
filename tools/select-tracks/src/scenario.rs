//! Scenario files
//!
//! A scenario declares everything one selection call needs: the renderers
//! with their decoders, the track groups on offer and optionally the
//! device, parameters and period.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use trackselect_core::capabilities::{DeclaredRendererCapabilities, RendererCapabilities};
use trackselect_core::{DeviceProfile, MediaPeriodId, Parameters, SelectorConfig, TrackGroupArray};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub renderers: Vec<DeclaredRendererCapabilities>,
    pub groups: TrackGroupArray,
    /// Used unless parameters are given on the command line
    #[serde(default)]
    pub parameters: Option<Parameters>,
    #[serde(default)]
    pub device: DeviceProfile,
    #[serde(default)]
    pub period: MediaPeriodId,
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scenario: {}", path.display()))
    }

    pub fn renderers(&self) -> Vec<&dyn RendererCapabilities> {
        self.renderers
            .iter()
            .map(|r| r as &dyn RendererCapabilities)
            .collect()
    }
}

/// Load parameters from a JSON or TOML file, chosen by extension.
pub fn load_parameters(path: &Path) -> Result<Parameters> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameters: {}", path.display()))?;
    let parameters = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Parameters::from_toml(&content),
        _ => Parameters::from_json(&content),
    };
    parameters.with_context(|| format!("Failed to parse parameters: {}", path.display()))
}

/// Load the selector configuration. A path given on the command line must
/// exist; without one the `TRACKSELECT_*` environment variables apply.
pub fn load_config(path: Option<&Path>) -> Result<SelectorConfig> {
    match path {
        Some(path) => SelectorConfig::from_file(path)
            .with_context(|| format!("Failed to load selector configuration: {}", path.display())),
        None => Ok(SelectorConfig::from_env()),
    }
}
