//! Error types for trackselect-core

use thiserror::Error;

/// Result type alias for trackselect-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for trackselect-core
///
/// Track selection itself never fails: a renderer either gets a selection or
/// it does not. These errors surface while *building* inputs (track groups,
/// overrides, parameters, configuration) so that malformed input is rejected
/// before it reaches the selector.
#[derive(Debug, Error)]
pub enum Error {
    /// A track group could not be constructed
    #[error("Invalid track group: {0}")]
    InvalidTrackGroup(String),

    /// A track selection override references tracks that do not exist
    #[error("Invalid override: {0}")]
    InvalidOverride(String),

    /// A renderer failed to report its capabilities for a format
    #[error("Capability query failed for renderer {renderer}: {reason}")]
    CapabilityQuery {
        /// Index of the renderer whose query failed
        renderer: usize,
        /// Renderer-provided failure description
        reason: String,
    },

    /// Configuration loading error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
