//! Track groups
//!
//! A [`TrackGroup`] is an ordered list of mutually exclusive formats carrying
//! the same logical content (for example a bitrate ladder). A
//! [`TrackGroupArray`] is the full set of groups a source offers for one
//! playback period.
//!
//! Both types compare and hash by content, so an override recorded against
//! one snapshot of a group keeps applying to an equal snapshot delivered later.

use serde::{Deserialize, Serialize};

use crate::format::{Format, RoleFlags, TrackType};
use crate::{language, Error, Result};

/// Mutually exclusive alternatives for one logical stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TrackGroupRepr", into = "TrackGroupRepr")]
pub struct TrackGroup {
    id: String,
    track_type: TrackType,
    formats: Vec<Format>,
}

#[derive(Serialize, Deserialize)]
struct TrackGroupRepr {
    #[serde(default)]
    id: String,
    formats: Vec<Format>,
}

impl TryFrom<TrackGroupRepr> for TrackGroup {
    type Error = Error;

    fn try_from(repr: TrackGroupRepr) -> Result<Self> {
        TrackGroup::new(repr.id, repr.formats)
    }
}

impl From<TrackGroup> for TrackGroupRepr {
    fn from(group: TrackGroup) -> Self {
        TrackGroupRepr {
            id: group.id,
            formats: group.formats,
        }
    }
}

impl TrackGroup {
    /// Create a track group.
    ///
    /// Fails if `formats` is empty. Languages are normalized. Groups whose
    /// formats disagree on language or role flags are accepted but logged,
    /// since the source should never produce them.
    pub fn new(id: impl Into<String>, formats: Vec<Format>) -> Result<Self> {
        let id = id.into();
        if formats.is_empty() {
            return Err(Error::InvalidTrackGroup(format!(
                "track group '{}' has no formats",
                id
            )));
        }
        let formats: Vec<Format> = formats
            .into_iter()
            .map(|mut format| {
                format.language = format.language.as_deref().and_then(language::normalize);
                format
            })
            .collect();
        let track_type = formats[0].track_type();
        let group = Self {
            id,
            track_type,
            formats,
        };
        group.check_consistency();
        Ok(group)
    }

    /// Group identifier (may be empty).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Track type of the group, derived from its first format.
    pub fn track_type(&self) -> TrackType {
        self.track_type
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Always false; groups are never empty.
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Format at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn format(&self, index: usize) -> &Format {
        &self.formats[index]
    }

    /// All formats in order.
    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    /// Index of a format equal to `format`, if any.
    pub fn index_of(&self, format: &Format) -> Option<usize> {
        self.formats.iter().position(|f| f == format)
    }

    fn check_consistency(&self) {
        let first = &self.formats[0];
        let first_language = language::undetermined_to_none(first.language.as_deref());
        let first_roles = first.role_flags | RoleFlags::MAIN;
        for (index, format) in self.formats.iter().enumerate().skip(1) {
            if language::undetermined_to_none(format.language.as_deref()) != first_language {
                tracing::warn!(
                    "Track group '{}' has inconsistent languages: {:?} (track 0) vs {:?} (track {})",
                    self.id,
                    first.language,
                    format.language,
                    index
                );
                return;
            }
            if (format.role_flags | RoleFlags::MAIN) != first_roles {
                tracing::warn!(
                    "Track group '{}' has inconsistent role flags: {:?} (track 0) vs {:?} (track {})",
                    self.id,
                    first.role_flags,
                    format.role_flags,
                    index
                );
                return;
            }
        }
    }
}

/// All track groups offered for one playback period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackGroupArray {
    groups: Vec<TrackGroup>,
}

impl TrackGroupArray {
    /// Create an array from groups, preserving order.
    pub fn new(groups: Vec<TrackGroup>) -> Self {
        Self { groups }
    }

    /// The empty array.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group at `index`.
    pub fn get(&self, index: usize) -> Option<&TrackGroup> {
        self.groups.get(index)
    }

    /// All groups in order.
    pub fn groups(&self) -> &[TrackGroup] {
        &self.groups
    }

    /// Position of a group equal to `group`.
    pub fn index_of(&self, group: &TrackGroup) -> Option<usize> {
        self.groups.iter().position(|g| g == group)
    }

    /// Iterate groups in order.
    pub fn iter(&self) -> std::slice::Iter<'_, TrackGroup> {
        self.groups.iter()
    }

    /// Track types present in the array, without duplicates, in first-seen order.
    pub fn track_types(&self) -> Vec<TrackType> {
        let mut types = Vec::new();
        for group in &self.groups {
            if !types.contains(&group.track_type()) {
                types.push(group.track_type());
            }
        }
        types
    }
}

impl FromIterator<TrackGroup> for TrackGroupArray {
    fn from_iter<I: IntoIterator<Item = TrackGroup>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TrackGroupArray {
    type Item = &'a TrackGroup;
    type IntoIter = std::slice::Iter<'a, TrackGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime;
    use std::collections::HashMap;

    fn audio(bitrate: u32) -> Format {
        Format::builder()
            .sample_mime_type(mime::AUDIO_AAC)
            .bitrate(bitrate)
            .build()
    }

    #[test]
    fn test_empty_group_is_rejected() {
        let result = TrackGroup::new("empty", vec![]);
        assert!(matches!(result, Err(Error::InvalidTrackGroup(_))));
    }

    #[test]
    fn test_groups_compare_by_content() {
        let a = TrackGroup::new("1", vec![audio(64_000), audio(128_000)]).unwrap();
        let b = TrackGroup::new("1", vec![audio(64_000), audio(128_000)]).unwrap();
        let c = TrackGroup::new("2", vec![audio(64_000), audio(128_000)]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut map = HashMap::new();
        map.insert(a, "override");
        assert_eq!(map.get(&b), Some(&"override"));
        assert_eq!(map.get(&c), None);
    }

    #[test]
    fn test_deserialize_normalizes_and_validates() {
        let json = r#"{"id":"a","formats":[{"sample_mime_type":"audio/opus","language":"fre"}]}"#;
        let group: TrackGroup = serde_json::from_str(json).unwrap();
        assert_eq!(group.track_type(), TrackType::Audio);
        assert_eq!(group.format(0).language.as_deref(), Some("fr"));

        let empty = r#"{"id":"a","formats":[]}"#;
        assert!(serde_json::from_str::<TrackGroup>(empty).is_err());
    }

    #[test]
    fn test_array_index_of() {
        let a = TrackGroup::new("a", vec![audio(1)]).unwrap();
        let b = TrackGroup::new("b", vec![audio(2)]).unwrap();
        let array = TrackGroupArray::new(vec![a.clone(), b.clone()]);
        assert_eq!(array.index_of(&b), Some(1));
        assert_eq!(array.track_types(), vec![TrackType::Audio]);
    }
}
