//! Candidate enumeration and adaptive-set building
//!
//! All per-type selectors share one shape: build a track info per track of
//! every group mapped to a renderer of the type, turn eligible tracks into
//! candidate selections (a single track, or an adaptive set of compatible
//! tracks of one group), and keep the first best candidate.

use std::cmp::Ordering;

use crate::capabilities::Capabilities;
use crate::format::TrackType;
use crate::selector::mapping::MappedTrackInfo;
use crate::track_group::TrackGroup;

/// How a track may take part in a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Eligibility {
    /// Never selected automatically
    No,
    /// Selected on its own only
    Fixed,
    /// May be combined with compatible tracks of its group
    Adaptive,
}

/// Per-track information a type selector ranks.
pub(crate) trait TrackInfo {
    fn track_index(&self) -> usize;

    fn eligibility(&self) -> Eligibility;

    /// Whether `other` may join an adaptive set started by `self`.
    fn is_compatible_for_adaptation_with(&self, other: &Self) -> bool;
}

/// A chosen group and track subset for one renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Definition {
    pub renderer_index: usize,
    /// Index into the renderer's mapped groups
    pub group_index: usize,
    pub tracks: Vec<usize>,
}

/// Context handed to a track info factory for one group.
pub(crate) struct GroupContext<'m> {
    pub renderer_index: usize,
    pub group: &'m TrackGroup,
    pub capabilities: &'m [Capabilities],
}

/// Find the best selection among every group mapped to renderers of
/// `track_type`.
///
/// `compare_selections` ranks two candidate selections (each non-empty, in
/// group order); the first maximal candidate wins. A track that joined an
/// adaptive set does not start a set of its own but may still join later
/// sets of the same group.
pub(crate) fn select_tracks_for_type<'m, T, F, C>(
    track_type: TrackType,
    mapped: &'m MappedTrackInfo,
    mut create: F,
    compare_selections: C,
) -> Option<Definition>
where
    T: TrackInfo,
    F: FnMut(&GroupContext<'m>) -> Vec<T>,
    C: Fn(&[&T], &[&T]) -> Ordering,
{
    // One entry per group: (renderer, group index, track infos)
    let mut arena: Vec<(usize, usize, Vec<T>)> = Vec::new();
    // One entry per candidate: (arena index, track positions)
    let mut candidates: Vec<(usize, Vec<usize>)> = Vec::new();

    for renderer_index in 0..mapped.renderer_count() {
        if mapped.renderer_type(renderer_index) != track_type {
            continue;
        }
        let groups = mapped.track_groups(renderer_index);
        for (group_index, group) in groups.iter().enumerate() {
            let context = GroupContext {
                renderer_index,
                group,
                capabilities: &mapped.renderer_capabilities(renderer_index)[group_index],
            };
            let infos = create(&context);
            let mut used = vec![false; infos.len()];

            for (position, info) in infos.iter().enumerate() {
                if used[position] {
                    continue;
                }
                match info.eligibility() {
                    Eligibility::No => {}
                    Eligibility::Fixed => candidates.push((arena.len(), vec![position])),
                    Eligibility::Adaptive => {
                        let mut selection = vec![position];
                        for (other_position, other) in infos.iter().enumerate().skip(position + 1) {
                            if other.eligibility() == Eligibility::Adaptive
                                && info.is_compatible_for_adaptation_with(other)
                            {
                                selection.push(other_position);
                                used[other_position] = true;
                            }
                        }
                        candidates.push((arena.len(), selection));
                    }
                }
            }
            arena.push((renderer_index, group_index, infos));
        }
    }

    let resolved: Vec<Vec<&T>> = candidates
        .iter()
        .map(|(entry, positions)| positions.iter().map(|&p| &arena[*entry].2[p]).collect())
        .collect();

    let mut best: Option<usize> = None;
    for (index, selection) in resolved.iter().enumerate() {
        match best {
            Some(current)
                if compare_selections(selection.as_slice(), resolved[current].as_slice())
                    != Ordering::Greater => {}
            _ => best = Some(index),
        }
    }

    best.map(|index| {
        let (renderer_index, group_index, _) = &arena[candidates[index].0];
        let definition = Definition {
            renderer_index: *renderer_index,
            group_index: *group_index,
            tracks: resolved[index].iter().map(|info| info.track_index()).collect(),
        };
        tracing::debug!(
            "Selected {} tracks {:?} of group {} on renderer {} ({} candidates)",
            track_type,
            definition.tracks,
            definition.group_index,
            definition.renderer_index,
            candidates.len()
        );
        definition
    })
}

/// Position of `value` in an ordered preference list, `usize::MAX` if absent.
pub(crate) fn preference_index(value: Option<&str>, preferences: &[String]) -> usize {
    value
        .and_then(|value| preferences.iter().position(|p| p == value))
        .unwrap_or(usize::MAX)
}
