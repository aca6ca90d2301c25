//! Explicit track selection overrides
//!
//! Two override forms exist side by side:
//!
//! - [`TrackSelectionOverride`]: keyed by the content of one [`TrackGroup`].
//!   It applies to whichever renderer the group is mapped to. An override with
//!   no indices disables selection for the group's track type.
//! - [`SelectionOverride`]: the older per-renderer form, keyed by renderer
//!   index and the exact [`TrackGroupArray`] mapped to that renderer.
//!
//! Both validate their indices at construction so that selection never sees
//! an out-of-range track.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::format::TrackType;
use crate::track_group::{TrackGroup, TrackGroupArray};
use crate::{Error, Result};

fn check_indices(indices: &[usize], len: usize, what: &str) -> Result<()> {
    for (position, &index) in indices.iter().enumerate() {
        if index >= len {
            return Err(Error::InvalidOverride(format!(
                "{} track index {} out of range (group has {} tracks)",
                what, index, len
            )));
        }
        if indices[..position].contains(&index) {
            return Err(Error::InvalidOverride(format!(
                "{} track index {} listed twice",
                what, index
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Per-group override
// =============================================================================

/// Forces the selection of specific tracks of one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TrackSelectionOverrideRepr")]
pub struct TrackSelectionOverride {
    group: TrackGroup,
    track_indices: Vec<usize>,
}

#[derive(Deserialize)]
struct TrackSelectionOverrideRepr {
    group: TrackGroup,
    #[serde(default)]
    track_indices: Vec<usize>,
}

impl TryFrom<TrackSelectionOverrideRepr> for TrackSelectionOverride {
    type Error = Error;

    fn try_from(repr: TrackSelectionOverrideRepr) -> Result<Self> {
        TrackSelectionOverride::new(repr.group, repr.track_indices)
    }
}

impl TrackSelectionOverride {
    /// Override selecting `track_indices` of `group`.
    ///
    /// Fails if an index is out of range or listed twice. An empty index list
    /// is valid and means "select nothing of this type".
    pub fn new(group: TrackGroup, track_indices: Vec<usize>) -> Result<Self> {
        check_indices(&track_indices, group.len(), "override")?;
        Ok(Self {
            group,
            track_indices,
        })
    }

    /// Override selecting a single track.
    pub fn single(group: TrackGroup, track_index: usize) -> Result<Self> {
        Self::new(group, vec![track_index])
    }

    /// Override selecting nothing of the group's type.
    pub fn empty(group: TrackGroup) -> Self {
        Self {
            group,
            track_indices: Vec::new(),
        }
    }

    pub fn group(&self) -> &TrackGroup {
        &self.group
    }

    pub fn track_indices(&self) -> &[usize] {
        &self.track_indices
    }

    /// Whether the override selects nothing.
    pub fn is_empty(&self) -> bool {
        self.track_indices.is_empty()
    }

    pub fn track_type(&self) -> TrackType {
        self.group.track_type()
    }
}

// =============================================================================
// Per-renderer override
// =============================================================================

/// Selects tracks of one group among those mapped to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SelectionOverrideRepr")]
pub struct SelectionOverride {
    group_index: usize,
    tracks: Vec<usize>,
}

#[derive(Deserialize)]
struct SelectionOverrideRepr {
    group_index: usize,
    tracks: Vec<usize>,
}

impl TryFrom<SelectionOverrideRepr> for SelectionOverride {
    type Error = Error;

    fn try_from(repr: SelectionOverrideRepr) -> Result<Self> {
        SelectionOverride::new(repr.group_index, repr.tracks)
    }
}

impl SelectionOverride {
    /// Override selecting `tracks` of the group at `group_index`.
    ///
    /// Fails if `tracks` is empty or lists an index twice. Ranges are
    /// checked when the override is attached to a [`TrackGroupArray`].
    pub fn new(group_index: usize, tracks: Vec<usize>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(Error::InvalidOverride(
                "selection override must name at least one track".to_string(),
            ));
        }
        check_indices(&tracks, usize::MAX, "selection override")?;
        Ok(Self {
            group_index,
            tracks,
        })
    }

    pub fn group_index(&self) -> usize {
        self.group_index
    }

    pub fn tracks(&self) -> &[usize] {
        &self.tracks
    }

    /// Check the override against the groups it will be applied to.
    pub fn validate_against(&self, groups: &TrackGroupArray) -> Result<()> {
        let group = groups.get(self.group_index).ok_or_else(|| {
            Error::InvalidOverride(format!(
                "selection override group index {} out of range ({} groups)",
                self.group_index,
                groups.len()
            ))
        })?;
        check_indices(&self.tracks, group.len(), "selection override")
    }
}

/// Per-renderer overrides: renderer index, then mapped groups, then the
/// override (`None` means "select nothing").
pub type SelectionOverrides = BTreeMap<usize, HashMap<TrackGroupArray, Option<SelectionOverride>>>;

// =============================================================================
// Serde helpers: maps keyed by track groups serialize as lists
// =============================================================================

pub(crate) mod override_map {
    use super::*;

    pub fn serialize<S: Serializer>(
        map: &HashMap<TrackGroup, TrackSelectionOverride>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<HashMap<TrackGroup, TrackSelectionOverride>, D::Error> {
        let entries = Vec::<TrackSelectionOverride>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|entry| (entry.group.clone(), entry))
            .collect())
    }
}

#[derive(Serialize, Deserialize)]
struct SelectionOverrideEntry {
    renderer: usize,
    groups: TrackGroupArray,
    #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
    selection: Option<SelectionOverride>,
}

pub(crate) mod selection_override_map {
    use super::*;

    pub fn serialize<S: Serializer>(
        map: &SelectionOverrides,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let entries: Vec<SelectionOverrideEntry> = map
            .iter()
            .flat_map(|(&renderer, by_groups)| {
                by_groups
                    .iter()
                    .map(move |(groups, selection)| SelectionOverrideEntry {
                        renderer,
                        groups: groups.clone(),
                        selection: selection.clone(),
                    })
            })
            .collect();
        serializer.collect_seq(entries)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<SelectionOverrides, D::Error> {
        let entries = Vec::<SelectionOverrideEntry>::deserialize(deserializer)?;
        let mut map = SelectionOverrides::new();
        for entry in entries {
            if let Some(selection) = &entry.selection {
                selection
                    .validate_against(&entry.groups)
                    .map_err(serde::de::Error::custom)?;
            }
            map.entry(entry.renderer)
                .or_default()
                .insert(entry.groups, entry.selection);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use crate::mime;

    fn ladder() -> TrackGroup {
        TrackGroup::new(
            "video",
            vec![
                Format::builder().sample_mime_type(mime::VIDEO_H264).bitrate(1_000).build(),
                Format::builder().sample_mime_type(mime::VIDEO_H264).bitrate(2_000).build(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_override_rejects_bad_indices() {
        assert!(TrackSelectionOverride::new(ladder(), vec![0, 1]).is_ok());
        assert!(matches!(
            TrackSelectionOverride::new(ladder(), vec![2]),
            Err(Error::InvalidOverride(_))
        ));
        assert!(matches!(
            TrackSelectionOverride::new(ladder(), vec![1, 1]),
            Err(Error::InvalidOverride(_))
        ));
        assert!(TrackSelectionOverride::empty(ladder()).is_empty());
    }

    #[test]
    fn test_selection_override_validation() {
        assert!(SelectionOverride::new(0, vec![]).is_err());
        let groups = TrackGroupArray::new(vec![ladder()]);
        assert!(SelectionOverride::new(0, vec![1]).unwrap().validate_against(&groups).is_ok());
        assert!(SelectionOverride::new(1, vec![0]).unwrap().validate_against(&groups).is_err());
        assert!(SelectionOverride::new(0, vec![5]).unwrap().validate_against(&groups).is_err());
    }

    #[test]
    fn test_override_deserialization_validates() {
        let json = r#"{"group": {"formats": [{"sample_mime_type": "video/avc"}]}, "track_indices": [3]}"#;
        assert!(serde_json::from_str::<TrackSelectionOverride>(json).is_err());
    }
}
