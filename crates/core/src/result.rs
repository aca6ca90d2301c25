//! Selection results
//!
//! The selector produces a fresh [`TrackSelectorResult`] per call: one
//! optional [`TrackSelection`] and one optional [`RendererConfiguration`] per
//! renderer, plus an aggregated [`Tracks`] view over every offered group.

use serde::{Deserialize, Serialize};

use crate::capabilities::FormatSupport;
use crate::format::{Format, TrackType};
use crate::selector::mapping::MappedTrackInfo;
use crate::track_group::TrackGroup;

// =============================================================================
// Track Selection
// =============================================================================

/// Whether a selection may switch between tracks during playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    /// Exactly one track
    Fixed,
    /// Several tracks of one group the renderer may switch among
    Adaptive,
}

/// The tracks chosen for one renderer.
///
/// Adaptive selections list their tracks from highest to lowest bitrate;
/// tracks of equal bitrate keep their group order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TrackSelection {
    group: TrackGroup,
    tracks: Vec<usize>,
    kind: SelectionKind,
}

impl TrackSelection {
    /// A single-track selection.
    pub fn fixed(group: TrackGroup, track: usize) -> Self {
        Self {
            group,
            tracks: vec![track],
            kind: SelectionKind::Fixed,
        }
    }

    /// A multi-track selection ordered by descending bitrate.
    pub fn adaptive(group: TrackGroup, mut tracks: Vec<usize>) -> Self {
        tracks.sort_by(|&a, &b| group.format(b).bitrate.cmp(&group.format(a).bitrate));
        Self {
            group,
            tracks,
            kind: SelectionKind::Adaptive,
        }
    }

    /// Fixed for one track, adaptive for more.
    pub(crate) fn from_tracks(group: TrackGroup, tracks: Vec<usize>) -> Option<Self> {
        match tracks.as_slice() {
            [] => None,
            [track] => Some(Self::fixed(group, *track)),
            _ => Some(Self::adaptive(group, tracks)),
        }
    }

    pub fn group(&self) -> &TrackGroup {
        &self.group
    }

    /// Selected track indices within the group.
    pub fn tracks(&self) -> &[usize] {
        &self.tracks
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    pub fn is_adaptive(&self) -> bool {
        self.kind == SelectionKind::Adaptive
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always false; selections hold at least one track.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Whether the track at `index` of the group is selected.
    pub fn contains(&self, index: usize) -> bool {
        self.tracks.contains(&index)
    }

    /// Format of the first (highest bitrate) selected track.
    pub fn selected_format(&self) -> &Format {
        self.group.format(self.tracks[0])
    }

    /// Formats of all selected tracks, in selection order.
    pub fn formats(&self) -> impl Iterator<Item = &Format> + '_ {
        self.tracks.iter().map(|&index| self.group.format(index))
    }
}

// =============================================================================
// Renderer Configuration
// =============================================================================

/// Audio offload mode of a renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffloadMode {
    #[default]
    Disabled,
    EnabledGaplessNotRequired,
    EnabledGaplessRequired,
}

/// Output configuration of an enabled renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RendererConfiguration {
    /// Tunneled playback
    pub tunneling: bool,
    /// Audio offload
    pub offload_mode: OffloadMode,
}

// =============================================================================
// Tracks
// =============================================================================

/// One offered group with per-track support and selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackGroupInfo {
    pub group: TrackGroup,
    /// The mapped renderer can adapt between the group's handled tracks
    pub adaptive_supported: bool,
    pub track_support: Vec<FormatSupport>,
    pub track_selected: Vec<bool>,
}

impl TrackGroupInfo {
    pub fn track_type(&self) -> TrackType {
        self.group.track_type()
    }

    /// Whether any track of the group is selected.
    pub fn is_selected(&self) -> bool {
        self.track_selected.iter().any(|&selected| selected)
    }

    /// Whether any track of the group is supported.
    pub fn is_supported(&self, allow_exceeds_capabilities: bool) -> bool {
        self.track_support
            .iter()
            .any(|support| support.is_supported(allow_exceeds_capabilities))
    }

    pub fn is_track_selected(&self, index: usize) -> bool {
        self.track_selected.get(index).copied().unwrap_or(false)
    }

    pub fn is_track_supported(&self, index: usize, allow_exceeds_capabilities: bool) -> bool {
        self.track_support
            .get(index)
            .is_some_and(|support| support.is_supported(allow_exceeds_capabilities))
    }
}

/// Aggregated view over every offered group: mapped groups in renderer
/// order, then unmapped groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tracks {
    groups: Vec<TrackGroupInfo>,
}

impl Tracks {
    pub fn new(groups: Vec<TrackGroupInfo>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[TrackGroupInfo] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Whether any group of `track_type` is offered.
    pub fn contains_type(&self, track_type: TrackType) -> bool {
        self.groups.iter().any(|g| g.track_type() == track_type)
    }

    /// Whether any track of `track_type` is selected.
    pub fn is_type_selected(&self, track_type: TrackType) -> bool {
        self.groups
            .iter()
            .any(|g| g.track_type() == track_type && g.is_selected())
    }

    /// Whether any track of `track_type` is supported.
    pub fn is_type_supported(&self, track_type: TrackType, allow_exceeds_capabilities: bool) -> bool {
        self.groups
            .iter()
            .any(|g| g.track_type() == track_type && g.is_supported(allow_exceeds_capabilities))
    }
}

// =============================================================================
// Selector Result
// =============================================================================

/// Identifies the playback period a selection was made for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaPeriodId {
    pub period_uid: String,
    pub window_sequence_number: i64,
}

impl MediaPeriodId {
    pub fn new(period_uid: impl Into<String>) -> Self {
        Self {
            period_uid: period_uid.into(),
            window_sequence_number: 0,
        }
    }
}

impl std::fmt::Display for MediaPeriodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.period_uid, self.window_sequence_number)
    }
}

/// Outcome of one selection call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSelectorResult {
    /// Per renderer: `None` when the renderer is disabled
    pub renderer_configurations: Vec<Option<RendererConfiguration>>,
    /// Per renderer: the chosen tracks, if any
    pub selections: Vec<Option<TrackSelection>>,
    pub tracks: Tracks,
    pub mapped_track_info: MappedTrackInfo,
    pub period_id: MediaPeriodId,
}

impl TrackSelectorResult {
    pub fn renderer_count(&self) -> usize {
        self.selections.len()
    }

    pub fn is_renderer_enabled(&self, renderer_index: usize) -> bool {
        self.renderer_configurations
            .get(renderer_index)
            .is_some_and(Option::is_some)
    }

    pub fn selection(&self, renderer_index: usize) -> Option<&TrackSelection> {
        self.selections.get(renderer_index).and_then(Option::as_ref)
    }

    pub fn configuration(&self, renderer_index: usize) -> Option<&RendererConfiguration> {
        self.renderer_configurations
            .get(renderer_index)
            .and_then(Option::as_ref)
    }

    /// Whether `other` selects the same tracks with the same configuration
    /// for `renderer_index`.
    pub fn is_equivalent(&self, other: &TrackSelectorResult, renderer_index: usize) -> bool {
        self.selection(renderer_index) == other.selection(renderer_index)
            && self.configuration(renderer_index) == other.configuration(renderer_index)
    }
}
