//! Track selection parameters
//!
//! [`Parameters`] is the complete preference snapshot the selector works
//! from. It is a plain value: build one with [`Parameters::builder`], derive
//! a changed copy with [`Parameters::build_upon`], and compare snapshots with
//! `==`. Every field serializes, and absent fields deserialize to their
//! defaults, so a snapshot survives a JSON or TOML round trip unchanged.
//!
//! # Example
//!
//! ```rust
//! use trackselect_core::parameters::Parameters;
//! use trackselect_core::format::TrackType;
//!
//! let params = Parameters::builder()
//!     .preferred_audio_languages(["fra", "en"])
//!     .max_video_size_sd()
//!     .set_track_type_disabled(TrackType::Text, true)
//!     .build();
//!
//! assert_eq!(params.preferred_audio_languages, vec!["fr", "en"]);
//! assert!(params.disabled_track_types.contains(&TrackType::Text));
//!
//! let json = params.to_json().unwrap();
//! assert_eq!(Parameters::from_json(&json).unwrap(), params);
//! ```

pub mod offload;
pub mod overrides;

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::format::{RoleFlags, SelectionFlags, TrackType};
use crate::track_group::{TrackGroup, TrackGroupArray};
use crate::{language, Error, Result};

pub use offload::{AudioOffloadMode, AudioOffloadPreferences};
pub use overrides::{SelectionOverride, SelectionOverrides, TrackSelectionOverride};

/// Largest size treated as standard definition by [`ParametersBuilder::max_video_size_sd`].
const SD_MAX_WIDTH: u32 = 1279;
const SD_MAX_HEIGHT: u32 = 719;

fn normalize_languages<I, S>(languages: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    languages
        .into_iter()
        .filter_map(|l| language::normalize(l.as_ref()))
        .collect()
}

fn unlimited() -> u32 {
    u32::MAX
}

// =============================================================================
// Parameters
// =============================================================================

/// Preference snapshot for track selection.
///
/// Numeric limits use `u32::MAX` for "no maximum" and `0` for "no minimum".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    // ---- Video ----
    pub max_video_width: u32,
    pub max_video_height: u32,
    pub max_video_frame_rate: u32,
    pub max_video_bitrate: u32,
    pub min_video_width: u32,
    pub min_video_height: u32,
    pub min_video_frame_rate: u32,
    pub min_video_bitrate: u32,
    /// Viewport the video is shown in; `u32::MAX` when unconstrained
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// The viewport may rotate, so both orientations count as fitting
    pub viewport_orientation_may_change: bool,
    /// Use the device's physical display size as the viewport
    pub viewport_size_limited_by_physical_display: bool,
    pub preferred_video_languages: Vec<String>,
    pub preferred_video_role_flags: RoleFlags,
    pub preferred_video_labels: Vec<String>,
    pub preferred_video_mime_types: Vec<String>,
    pub exceed_video_constraints_if_necessary: bool,
    pub allow_video_mixed_mime_type_adaptiveness: bool,
    pub allow_video_non_seamless_adaptiveness: bool,
    pub allow_video_mixed_decoder_support_adaptiveness: bool,

    // ---- Audio ----
    pub preferred_audio_languages: Vec<String>,
    pub preferred_audio_role_flags: RoleFlags,
    pub preferred_audio_labels: Vec<String>,
    pub preferred_audio_mime_types: Vec<String>,
    pub max_audio_channel_count: u32,
    pub min_audio_channel_count: u32,
    pub max_audio_bitrate: u32,
    pub min_audio_bitrate: u32,
    pub max_audio_sample_rate: u32,
    pub min_audio_sample_rate: u32,
    pub exceed_audio_constraints_if_necessary: bool,
    pub allow_audio_mixed_mime_type_adaptiveness: bool,
    pub allow_audio_mixed_sample_rate_adaptiveness: bool,
    pub allow_audio_mixed_channel_count_adaptiveness: bool,
    pub allow_audio_mixed_decoder_support_adaptiveness: bool,
    pub allow_audio_non_seamless_adaptiveness: bool,
    /// Rank tracks the device cannot render natively below those it can
    pub constrain_audio_channel_count_to_device_capabilities: bool,
    pub audio_offload_preferences: AudioOffloadPreferences,

    // ---- Text ----
    pub preferred_text_languages: Vec<String>,
    pub preferred_text_role_flags: RoleFlags,
    pub preferred_text_labels: Vec<String>,
    /// Selection flags on text tracks that are treated as absent
    pub ignored_text_selection_flags: SelectionFlags,
    /// Accept text tracks of undetermined language when nothing else matches
    pub select_undetermined_text_language: bool,
    /// Select some supported text track even when no rule matches
    pub select_text_by_default: bool,

    // ---- Image ----
    pub prioritize_image_over_video: bool,

    // ---- General ----
    pub force_lowest_bitrate: bool,
    pub force_highest_supported_bitrate: bool,
    pub exceed_renderer_capabilities_if_necessary: bool,
    pub tunneling_enabled: bool,
    pub allow_multiple_adaptive_selections: bool,
    pub disabled_track_types: BTreeSet<TrackType>,
    pub disabled_renderers: BTreeSet<usize>,
    #[serde(with = "overrides::override_map")]
    pub overrides: HashMap<TrackGroup, TrackSelectionOverride>,
    #[serde(with = "overrides::selection_override_map")]
    pub selection_overrides: SelectionOverrides,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            max_video_width: unlimited(),
            max_video_height: unlimited(),
            max_video_frame_rate: unlimited(),
            max_video_bitrate: unlimited(),
            min_video_width: 0,
            min_video_height: 0,
            min_video_frame_rate: 0,
            min_video_bitrate: 0,
            viewport_width: unlimited(),
            viewport_height: unlimited(),
            viewport_orientation_may_change: true,
            viewport_size_limited_by_physical_display: false,
            preferred_video_languages: Vec::new(),
            preferred_video_role_flags: RoleFlags::empty(),
            preferred_video_labels: Vec::new(),
            preferred_video_mime_types: Vec::new(),
            exceed_video_constraints_if_necessary: true,
            allow_video_mixed_mime_type_adaptiveness: false,
            allow_video_non_seamless_adaptiveness: true,
            allow_video_mixed_decoder_support_adaptiveness: false,

            preferred_audio_languages: Vec::new(),
            preferred_audio_role_flags: RoleFlags::empty(),
            preferred_audio_labels: Vec::new(),
            preferred_audio_mime_types: Vec::new(),
            max_audio_channel_count: unlimited(),
            min_audio_channel_count: 0,
            max_audio_bitrate: unlimited(),
            min_audio_bitrate: 0,
            max_audio_sample_rate: unlimited(),
            min_audio_sample_rate: 0,
            exceed_audio_constraints_if_necessary: true,
            allow_audio_mixed_mime_type_adaptiveness: false,
            allow_audio_mixed_sample_rate_adaptiveness: false,
            allow_audio_mixed_channel_count_adaptiveness: false,
            allow_audio_mixed_decoder_support_adaptiveness: false,
            allow_audio_non_seamless_adaptiveness: true,
            constrain_audio_channel_count_to_device_capabilities: true,
            audio_offload_preferences: AudioOffloadPreferences::default(),

            preferred_text_languages: Vec::new(),
            preferred_text_role_flags: RoleFlags::empty(),
            preferred_text_labels: Vec::new(),
            ignored_text_selection_flags: SelectionFlags::empty(),
            select_undetermined_text_language: false,
            select_text_by_default: false,

            prioritize_image_over_video: false,

            force_lowest_bitrate: false,
            force_highest_supported_bitrate: false,
            exceed_renderer_capabilities_if_necessary: true,
            tunneling_enabled: false,
            allow_multiple_adaptive_selections: true,
            disabled_track_types: BTreeSet::new(),
            disabled_renderers: BTreeSet::new(),
            overrides: HashMap::new(),
            selection_overrides: SelectionOverrides::new(),
        }
    }
}

impl Parameters {
    /// Builder starting from the defaults.
    pub fn builder() -> ParametersBuilder {
        Parameters::default().build_upon()
    }

    /// Builder starting from this snapshot.
    pub fn build_upon(&self) -> ParametersBuilder {
        ParametersBuilder {
            params: self.clone(),
        }
    }

    /// Whether the renderer at `renderer_index` is disabled.
    pub fn is_renderer_disabled(&self, renderer_index: usize) -> bool {
        self.disabled_renderers.contains(&renderer_index)
    }

    /// Whether a renderer or its track type is disabled.
    pub fn is_renderer_or_type_disabled(&self, renderer_index: usize, track_type: TrackType) -> bool {
        self.is_renderer_disabled(renderer_index) || self.disabled_track_types.contains(&track_type)
    }

    /// Whether a per-renderer override exists for exactly these groups.
    pub fn has_selection_override(&self, renderer_index: usize, groups: &TrackGroupArray) -> bool {
        self.selection_overrides
            .get(&renderer_index)
            .is_some_and(|by_groups| by_groups.contains_key(groups))
    }

    /// The per-renderer override for these groups.
    ///
    /// `None` both when there is no override and when the override selects
    /// nothing; use [`Parameters::has_selection_override`] to tell them apart.
    pub fn selection_override(
        &self,
        renderer_index: usize,
        groups: &TrackGroupArray,
    ) -> Option<&SelectionOverride> {
        self.selection_overrides
            .get(&renderer_index)
            .and_then(|by_groups| by_groups.get(groups))
            .and_then(Option::as_ref)
    }

    /// The per-group override for `group`, if any.
    pub fn track_selection_override(&self, group: &TrackGroup) -> Option<&TrackSelectionOverride> {
        self.overrides.get(group)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from TOML; absent fields take their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Serialization(e.to_string()))
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Copy-on-write builder for [`Parameters`].
#[derive(Debug, Clone)]
pub struct ParametersBuilder {
    params: Parameters,
}

macro_rules! setters {
    ($($(#[$meta:meta])* $name:ident: $ty:ty),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(mut self, value: $ty) -> Self {
                self.params.$name = value;
                self
            }
        )*
    };
}

impl ParametersBuilder {
    setters! {
        max_video_frame_rate: u32,
        max_video_bitrate: u32,
        min_video_frame_rate: u32,
        min_video_bitrate: u32,
        preferred_video_role_flags: RoleFlags,
        exceed_video_constraints_if_necessary: bool,
        allow_video_mixed_mime_type_adaptiveness: bool,
        allow_video_non_seamless_adaptiveness: bool,
        allow_video_mixed_decoder_support_adaptiveness: bool,

        preferred_audio_role_flags: RoleFlags,
        max_audio_channel_count: u32,
        min_audio_channel_count: u32,
        max_audio_bitrate: u32,
        min_audio_bitrate: u32,
        max_audio_sample_rate: u32,
        min_audio_sample_rate: u32,
        exceed_audio_constraints_if_necessary: bool,
        allow_audio_mixed_mime_type_adaptiveness: bool,
        allow_audio_mixed_sample_rate_adaptiveness: bool,
        allow_audio_mixed_channel_count_adaptiveness: bool,
        allow_audio_mixed_decoder_support_adaptiveness: bool,
        allow_audio_non_seamless_adaptiveness: bool,
        constrain_audio_channel_count_to_device_capabilities: bool,
        audio_offload_preferences: AudioOffloadPreferences,

        preferred_text_role_flags: RoleFlags,
        ignored_text_selection_flags: SelectionFlags,
        select_undetermined_text_language: bool,
        select_text_by_default: bool,

        prioritize_image_over_video: bool,

        /// Select only the lowest bitrate track; disables adaptive selections.
        force_lowest_bitrate: bool,
        /// Select only the highest supported bitrate track; disables adaptive selections.
        force_highest_supported_bitrate: bool,
        exceed_renderer_capabilities_if_necessary: bool,
        tunneling_enabled: bool,
        allow_multiple_adaptive_selections: bool,
    }

    pub fn max_video_size(mut self, width: u32, height: u32) -> Self {
        self.params.max_video_width = width;
        self.params.max_video_height = height;
        self
    }

    /// Limit video to standard definition (below 1280x720).
    pub fn max_video_size_sd(self) -> Self {
        self.max_video_size(SD_MAX_WIDTH, SD_MAX_HEIGHT)
    }

    pub fn min_video_size(mut self, width: u32, height: u32) -> Self {
        self.params.min_video_width = width;
        self.params.min_video_height = height;
        self
    }

    /// Remove all video size limits.
    pub fn clear_video_size_constraints(self) -> Self {
        self.max_video_size(unlimited(), unlimited()).min_video_size(0, 0)
    }

    pub fn viewport_size(mut self, width: u32, height: u32, orientation_may_change: bool) -> Self {
        self.params.viewport_width = width;
        self.params.viewport_height = height;
        self.params.viewport_orientation_may_change = orientation_may_change;
        self.params.viewport_size_limited_by_physical_display = false;
        self
    }

    /// Use the device display as the viewport at selection time.
    pub fn viewport_size_to_physical_display(mut self, orientation_may_change: bool) -> Self {
        self.params.viewport_size_limited_by_physical_display = true;
        self.params.viewport_orientation_may_change = orientation_may_change;
        self
    }

    pub fn clear_viewport_size_constraints(self) -> Self {
        self.viewport_size(unlimited(), unlimited(), true)
    }

    pub fn preferred_video_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.params.preferred_video_languages = normalize_languages(languages);
        self
    }

    pub fn preferred_audio_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.params.preferred_audio_languages = normalize_languages(languages);
        self
    }

    pub fn preferred_text_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.params.preferred_text_languages = normalize_languages(languages);
        self
    }

    pub fn preferred_video_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.preferred_video_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn preferred_audio_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.preferred_audio_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn preferred_text_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.preferred_text_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn preferred_video_mime_types<I, S>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.preferred_video_mime_types = mime_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn preferred_audio_mime_types<I, S>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.preferred_audio_mime_types = mime_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_track_type_disabled(mut self, track_type: TrackType, disabled: bool) -> Self {
        if disabled {
            self.params.disabled_track_types.insert(track_type);
        } else {
            self.params.disabled_track_types.remove(&track_type);
        }
        self
    }

    pub fn set_renderer_disabled(mut self, renderer_index: usize, disabled: bool) -> Self {
        if disabled {
            self.params.disabled_renderers.insert(renderer_index);
        } else {
            self.params.disabled_renderers.remove(&renderer_index);
        }
        self
    }

    /// Add an override, replacing any existing override for the same group.
    pub fn add_override(mut self, override_: TrackSelectionOverride) -> Self {
        self.params
            .overrides
            .insert(override_.group().clone(), override_);
        self
    }

    /// Replace every override of the override's track type with this one.
    pub fn set_override_for_type(self, override_: TrackSelectionOverride) -> Self {
        let track_type = override_.track_type();
        self.clear_overrides_of_type(track_type).add_override(override_)
    }

    pub fn clear_override(mut self, group: &TrackGroup) -> Self {
        self.params.overrides.remove(group);
        self
    }

    pub fn clear_overrides_of_type(mut self, track_type: TrackType) -> Self {
        self.params
            .overrides
            .retain(|group, _| group.track_type() != track_type);
        self
    }

    pub fn clear_overrides(mut self) -> Self {
        self.params.overrides.clear();
        self
    }

    /// Override the selection of the renderer at `renderer_index` while it is
    /// mapped to exactly `groups`. `None` selects nothing.
    ///
    /// Fails if the override references a group or track outside `groups`.
    pub fn set_selection_override(
        mut self,
        renderer_index: usize,
        groups: TrackGroupArray,
        selection: Option<SelectionOverride>,
    ) -> Result<Self> {
        if let Some(selection) = &selection {
            selection.validate_against(&groups)?;
        }
        self.params
            .selection_overrides
            .entry(renderer_index)
            .or_default()
            .insert(groups, selection);
        Ok(self)
    }

    pub fn clear_selection_override(mut self, renderer_index: usize, groups: &TrackGroupArray) -> Self {
        if let Some(by_groups) = self.params.selection_overrides.get_mut(&renderer_index) {
            by_groups.remove(groups);
            if by_groups.is_empty() {
                self.params.selection_overrides.remove(&renderer_index);
            }
        }
        self
    }

    pub fn clear_selection_overrides_for_renderer(mut self, renderer_index: usize) -> Self {
        self.params.selection_overrides.remove(&renderer_index);
        self
    }

    pub fn clear_selection_overrides(mut self) -> Self {
        self.params.selection_overrides.clear();
        self
    }

    pub fn build(self) -> Parameters {
        self.params
    }
}
