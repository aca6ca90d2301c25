//! Track selector
//!
//! [`DefaultTrackSelector`] maps the offered track groups onto renderers,
//! runs one ranking algorithm per track type, applies overrides and
//! disablement, and assembles a [`TrackSelectorResult`]. A call holds no
//! state beyond its inputs, so repeating it with equal inputs yields an equal
//! result.
//!
//! # Example
//!
//! ```rust
//! use trackselect_core::capabilities::{DeclaredDecoder, DeclaredRendererCapabilities, RendererCapabilities};
//! use trackselect_core::format::{Format, TrackType};
//! use trackselect_core::mime;
//! use trackselect_core::result::MediaPeriodId;
//! use trackselect_core::selector::{DefaultTrackSelector, TrackSelector};
//! use trackselect_core::track_group::{TrackGroup, TrackGroupArray};
//! use trackselect_core::Parameters;
//!
//! let audio = DeclaredRendererCapabilities::new("audio", TrackType::Audio)
//!     .with_decoder(DeclaredDecoder::new(mime::AUDIO_AAC));
//! let renderers: Vec<&dyn RendererCapabilities> = vec![&audio];
//!
//! let groups = TrackGroupArray::new(vec![
//!     TrackGroup::new("en", vec![Format::builder().sample_mime_type(mime::AUDIO_AAC).language("en").build()]).unwrap(),
//!     TrackGroup::new("de", vec![Format::builder().sample_mime_type(mime::AUDIO_AAC).language("de").build()]).unwrap(),
//! ]);
//!
//! let selector = DefaultTrackSelector::new(Parameters::builder().preferred_audio_languages(["de"]).build());
//! let result = selector.select_tracks(&renderers, &groups, &MediaPeriodId::new("period-0"));
//!
//! assert_eq!(result.selection(0).map(|s| s.group().id()), Some("de"));
//! ```

mod assembly;
mod audio;
mod candidate;
mod image;
pub mod mapping;
mod other;
mod overrides;
mod text;
mod video;

use crate::capabilities::RendererCapabilities;
use crate::config::SelectorConfig;
use crate::device::DeviceProfile;
use crate::parameters::Parameters;
use crate::result::{MediaPeriodId, TrackSelectorResult};
use crate::track_group::TrackGroupArray;

pub use mapping::MappedTrackInfo;

// =============================================================================
// Selection Context
// =============================================================================

/// Inputs shared by every per-type selector during one call.
pub(crate) struct Context<'a> {
    pub mapped: &'a MappedTrackInfo,
    pub params: &'a Parameters,
    pub config: &'a SelectorConfig,
    pub device: &'a DeviceProfile,
}

impl Context<'_> {
    /// Effective viewport size; `u32::MAX` in both dimensions when
    /// unconstrained.
    pub fn viewport(&self) -> (u32, u32) {
        if self.params.viewport_size_limited_by_physical_display {
            return self
                .device
                .display_size
                .map_or((u32::MAX, u32::MAX), |display| (display.width, display.height));
        }
        (self.params.viewport_width, self.params.viewport_height)
    }
}

// =============================================================================
// Track Selector
// =============================================================================

/// Chooses tracks for a set of renderers.
pub trait TrackSelector {
    /// Select tracks for `renderers` from `groups`.
    ///
    /// Never fails: renderers that cannot or should not play anything get no
    /// selection. Capability query failures only affect the renderer that
    /// reported them.
    fn select_tracks(
        &self,
        renderers: &[&dyn RendererCapabilities],
        groups: &TrackGroupArray,
        period: &MediaPeriodId,
    ) -> TrackSelectorResult;

    /// Current preference snapshot.
    fn parameters(&self) -> &Parameters;

    /// Replace the preference snapshot. Callers re-run selection afterwards.
    fn set_parameters(&mut self, parameters: Parameters);
}

/// The standard ranking-based track selector.
#[derive(Debug, Clone, Default)]
pub struct DefaultTrackSelector {
    parameters: Parameters,
    config: SelectorConfig,
    device: DeviceProfile,
}

impl DefaultTrackSelector {
    pub fn new(parameters: Parameters) -> Self {
        Self {
            parameters,
            config: SelectorConfig::default(),
            device: DeviceProfile::default(),
        }
    }

    /// Use tuning constants other than the defaults.
    pub fn with_config(mut self, config: SelectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Describe the playback device.
    pub fn with_device(mut self, device: DeviceProfile) -> Self {
        self.device = device;
        self
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn device(&self) -> &DeviceProfile {
        &self.device
    }

    /// Update the device description (for example after the spatializer was
    /// switched on). Callers re-run selection afterwards.
    pub fn set_device(&mut self, device: DeviceProfile) {
        self.device = device;
    }
}

impl TrackSelector for DefaultTrackSelector {
    fn select_tracks(
        &self,
        renderers: &[&dyn RendererCapabilities],
        groups: &TrackGroupArray,
        period: &MediaPeriodId,
    ) -> TrackSelectorResult {
        let span = tracing::debug_span!("select_tracks", period = %period);
        let _enter = span.enter();

        let mapped = MappedTrackInfo::build(renderers, groups);
        let ctx = Context {
            mapped: &mapped,
            params: &self.parameters,
            config: &self.config,
            device: &self.device,
        };

        let mut selections = assembly::resolve_selections(&ctx);
        let renderer_configurations = assembly::configure_renderers(&ctx, &mut selections);
        let tracks = assembly::build_tracks(&mapped, &selections);

        tracing::debug!(
            "Selected tracks for {} of {} renderers",
            selections.iter().filter(|s| s.is_some()).count(),
            renderers.len()
        );

        TrackSelectorResult {
            renderer_configurations,
            selections,
            tracks,
            mapped_track_info: mapped,
            period_id: period.clone(),
        }
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn set_parameters(&mut self, parameters: Parameters) {
        if parameters != self.parameters {
            tracing::debug!("Track selection parameters changed");
        }
        self.parameters = parameters;
    }
}
