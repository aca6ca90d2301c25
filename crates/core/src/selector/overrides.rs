//! Overrides and disablement
//!
//! Applied in order after automatic selection: per-group overrides (one
//! winner per track type), then per-renderer overrides, then disabled
//! renderers and track types.

use std::collections::HashMap;

use crate::capabilities::AdaptiveSupport;
use crate::format::TrackType;
use crate::parameters::{Parameters, TrackSelectionOverride};
use crate::selector::candidate::Definition;
use crate::selector::mapping::MappedTrackInfo;
use crate::track_group::TrackGroupArray;

/// The override each track type resolves to.
///
/// Groups are scanned mapped-first in renderer order, then unmapped. The
/// first override of a type wins, except that a later non-empty override
/// replaces an earlier empty one.
fn collect_overrides<'p>(mapped: &MappedTrackInfo, params: &'p Parameters) -> HashMap<TrackType, &'p TrackSelectionOverride> {
    let mut by_type: HashMap<TrackType, &TrackSelectionOverride> = HashMap::new();
    let mut collect = |groups: &TrackGroupArray| {
        for group in groups {
            let Some(override_) = params.track_selection_override(group) else {
                continue;
            };
            let replace = match by_type.get(&override_.track_type()) {
                None => true,
                Some(existing) => existing.is_empty() && !override_.is_empty(),
            };
            if replace {
                by_type.insert(override_.track_type(), override_);
            }
        }
    };
    for renderer_index in 0..mapped.renderer_count() {
        collect(mapped.track_groups(renderer_index));
    }
    collect(mapped.unmapped_track_groups());
    by_type
}

/// Tracks an override selects on a renderer: all listed indices when the
/// renderer can adapt between them, otherwise the first one.
fn override_tracks(mapped: &MappedTrackInfo, renderer_index: usize, group_index: usize, tracks: &[usize]) -> Vec<usize> {
    if tracks.len() > 1 && mapped.adaptive_support(renderer_index, group_index, tracks) == AdaptiveSupport::NotSupported {
        tracing::debug!(
            "Renderer {} cannot adapt between override tracks {:?}; using track {}",
            renderer_index,
            tracks,
            tracks[0]
        );
        return vec![tracks[0]];
    }
    tracks.to_vec()
}

/// Replace automatic selections with per-group overrides.
///
/// For every track type with an override, the renderer holding the
/// overridden group selects the override's tracks; every other renderer of
/// the type selects nothing. An empty override, or one whose group is not
/// mapped to any renderer, leaves all renderers of the type without a
/// selection.
pub(crate) fn apply_track_selection_overrides(
    mapped: &MappedTrackInfo,
    params: &Parameters,
    definitions: &mut [Option<Definition>],
) {
    if params.overrides.is_empty() {
        return;
    }
    let by_type = collect_overrides(mapped, params);

    for (renderer_index, definition) in definitions.iter_mut().enumerate() {
        let Some(override_) = by_type.get(&mapped.renderer_type(renderer_index)) else {
            continue;
        };
        let group_index = mapped.track_groups(renderer_index).index_of(override_.group());
        *definition = match group_index {
            Some(group_index) if !override_.is_empty() => Some(Definition {
                renderer_index,
                group_index,
                tracks: override_tracks(mapped, renderer_index, group_index, override_.track_indices()),
            }),
            _ => None,
        };
        tracing::debug!(
            "Override for group '{}' sets renderer {} to {:?}",
            override_.group().id(),
            renderer_index,
            definition.as_ref().map(|d| &d.tracks)
        );
    }
}

/// Replace selections with per-renderer overrides keyed by the renderer's
/// current groups.
pub(crate) fn apply_legacy_overrides(
    mapped: &MappedTrackInfo,
    params: &Parameters,
    definitions: &mut [Option<Definition>],
) {
    for (renderer_index, definition) in definitions.iter_mut().enumerate() {
        let groups = mapped.track_groups(renderer_index);
        if !params.has_selection_override(renderer_index, groups) {
            continue;
        }
        *definition = params
            .selection_override(renderer_index, groups)
            .filter(|override_| {
                let valid = override_.validate_against(groups).is_ok();
                if !valid {
                    tracing::warn!(
                        "Ignoring out of range selection override on renderer {}: {:?}",
                        renderer_index,
                        override_
                    );
                }
                valid
            })
            .map(|override_| Definition {
                renderer_index,
                group_index: override_.group_index(),
                tracks: override_tracks(mapped, renderer_index, override_.group_index(), override_.tracks()),
            });
    }
}

/// Clear selections of disabled renderers and track types.
pub(crate) fn clear_disabled(mapped: &MappedTrackInfo, params: &Parameters, definitions: &mut [Option<Definition>]) {
    for (renderer_index, definition) in definitions.iter_mut().enumerate() {
        if params.is_renderer_or_type_disabled(renderer_index, mapped.renderer_type(renderer_index))
            && definition.take().is_some()
        {
            tracing::debug!("Renderer {} is disabled; dropping its selection", renderer_index);
        }
    }
}
