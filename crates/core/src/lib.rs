//! Trackselect Core - track selection engine
//!
//! Given the track groups a media source offers for one playback period and
//! the capabilities of each renderer (audio, video, text, image, metadata),
//! this crate decides which tracks every renderer plays.
//!
//! # Architecture
//!
//! - [`format`], [`track_group`]: the immutable description of what is on offer
//! - [`capabilities`]: per-(format, renderer) support classification
//! - [`parameters`]: the user preference snapshot, including overrides
//! - [`selector`]: track mapping, per-type ranking, adaptive sets, overrides
//!   and result assembly
//! - [`result`]: selections, renderer configurations and the tracks view
//! - [`config`], [`device`]: tuning constants and facts about the device
//!
//! Selection is a synchronous, side-effect free call. It never fails;
//! malformed inputs are rejected when they are built.
//!
//! # Example
//!
//! ```rust
//! use trackselect_core::capabilities::{DeclaredDecoder, DeclaredRendererCapabilities, RendererCapabilities};
//! use trackselect_core::format::{Format, TrackType};
//! use trackselect_core::{mime, DefaultTrackSelector, MediaPeriodId, Parameters, TrackGroup, TrackGroupArray, TrackSelector};
//!
//! let video = DeclaredRendererCapabilities::new("video", TrackType::Video)
//!     .with_decoder(DeclaredDecoder::new(mime::VIDEO_H264));
//! let renderers: Vec<&dyn RendererCapabilities> = vec![&video];
//!
//! let ladder = TrackGroup::new(
//!     "ladder",
//!     vec![
//!         Format::builder().sample_mime_type(mime::VIDEO_H264).size(640, 360).bitrate(800_000).build(),
//!         Format::builder().sample_mime_type(mime::VIDEO_H264).size(1280, 720).bitrate(2_500_000).build(),
//!     ],
//! )
//! .unwrap();
//!
//! let selector = DefaultTrackSelector::new(Parameters::default());
//! let result = selector.select_tracks(&renderers, &TrackGroupArray::new(vec![ladder]), &MediaPeriodId::new("p0"));
//!
//! let selection = result.selection(0).unwrap();
//! assert!(selection.is_adaptive());
//! assert_eq!(selection.tracks(), &[1, 0]);
//! ```

#![warn(clippy::all)]

pub mod capabilities;
pub mod comparator;
pub mod config;
pub mod device;
pub mod format;
pub mod language;
pub mod mime;
pub mod parameters;
pub mod result;
pub mod selector;
pub mod track_group;

// Error types
mod error;
pub use error::{Error, Result};

pub use config::SelectorConfig;
pub use device::DeviceProfile;
pub use format::{Format, RoleFlags, SelectionFlags, TrackType};
pub use parameters::{Parameters, ParametersBuilder};
pub use result::{MediaPeriodId, RendererConfiguration, TrackSelection, TrackSelectorResult, Tracks};
pub use selector::{DefaultTrackSelector, MappedTrackInfo, TrackSelector};
pub use track_group::{TrackGroup, TrackGroupArray};

/// Initialize logging
///
/// Installs a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
/// Call once at startup; later calls return an error.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialized: {}", e)))?;

    tracing::info!("Trackselect core initialized");
    Ok(())
}
