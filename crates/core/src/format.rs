//! Format model
//!
//! A [`Format`] describes one alternative encoding of a stream. Formats are
//! produced by the media source and are read-only inputs to selection.

use std::hash::{Hash, Hasher};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{language, mime};

// =============================================================================
// Track Type
// =============================================================================

/// Media type handled by a renderer or carried by a track.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    /// A renderer that consumes no sample data (null output pipeline)
    None,
    /// Audio
    Audio,
    /// Video
    Video,
    /// Subtitles and captions
    Text,
    /// Still images
    Image,
    /// Timed metadata
    Metadata,
    /// Anything the selector has no dedicated algorithm for
    Unknown,
}

impl std::fmt::Display for TrackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TrackType::None => "none",
            TrackType::Audio => "audio",
            TrackType::Video => "video",
            TrackType::Text => "text",
            TrackType::Image => "image",
            TrackType::Metadata => "metadata",
            TrackType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Flags
// =============================================================================

bitflags! {
    /// Track selection flags signalled by the media.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SelectionFlags: u32 {
        /// The track should be selected when no user preference applies.
        const DEFAULT = 1;
        /// The track must be displayed (e.g. forced subtitles for foreign dialogue).
        const FORCED = 1 << 1;
        /// The track may be selected automatically.
        const AUTOSELECT = 1 << 2;
    }
}

bitflags! {
    /// Track role flags signalled by the media.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RoleFlags: u32 {
        const MAIN = 1;
        const ALTERNATE = 1 << 1;
        const SUPPLEMENTARY = 1 << 2;
        const COMMENTARY = 1 << 3;
        const DUB = 1 << 4;
        const EMERGENCY = 1 << 5;
        const CAPTION = 1 << 6;
        const SUBTITLE = 1 << 7;
        const SIGN = 1 << 8;
        const DESCRIBES_VIDEO = 1 << 9;
        const DESCRIBES_MUSIC_AND_SOUND = 1 << 10;
        const ENHANCED_DIALOG_INTELLIGIBILITY = 1 << 11;
        const TRANSCRIBES_DIALOG = 1 << 12;
        const EASY_TO_READ = 1 << 13;
        const TRICK_PLAY = 1 << 14;
        const AUXILIARY = 1 << 15;
    }
}

impl Default for SelectionFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl Default for RoleFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl RoleFlags {
    /// Score how well these track roles match the preferred roles.
    ///
    /// An exact, non-empty match scores above any partial overlap; partial
    /// overlaps score by the number of shared roles.
    pub fn match_score(self, preferred: RoleFlags) -> u32 {
        if !self.is_empty() && self == preferred {
            return u32::MAX;
        }
        (self & preferred).bits().count_ones()
    }
}

// =============================================================================
// Format
// =============================================================================

/// One alternative encoding of a stream.
///
/// Numeric attributes are `None` when unknown. The language is normalized on
/// construction (see [`crate::language::normalize`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Format {
    /// Stable identifier within the source
    pub id: Option<String>,
    /// Human readable label
    pub label: Option<String>,
    /// Normalized language tag
    pub language: Option<String>,
    /// Selection flags
    pub selection_flags: SelectionFlags,
    /// Role flags
    pub role_flags: RoleFlags,
    /// Average bitrate in bits per second
    pub bitrate: Option<u32>,
    /// RFC 6381 codecs string
    pub codecs: Option<String>,
    /// MIME type of the container
    pub container_mime_type: Option<String>,
    /// MIME type of the elementary samples
    pub sample_mime_type: Option<String>,
    /// Video width in pixels
    pub width: Option<u32>,
    /// Video height in pixels
    pub height: Option<u32>,
    /// Video frame rate in frames per second
    pub frame_rate: Option<f32>,
    /// Audio channel count
    pub channel_count: Option<u32>,
    /// Audio sample rate in Hz
    pub sample_rate: Option<u32>,
}

impl Format {
    /// Start building a format.
    pub fn builder() -> FormatBuilder {
        FormatBuilder::default()
    }

    /// Copy this format into a builder.
    pub fn build_upon(&self) -> FormatBuilder {
        FormatBuilder {
            format: self.clone(),
        }
    }

    /// Track type implied by the sample MIME type (or container MIME type).
    pub fn track_type(&self) -> TrackType {
        match mime::track_type(self.sample_mime_type.as_deref()) {
            TrackType::Unknown => mime::track_type(self.container_mime_type.as_deref()),
            track_type => track_type,
        }
    }

    /// Pixel count, if both dimensions are known.
    pub fn pixel_count(&self) -> Option<u64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(u64::from(w) * u64::from(h)),
            _ => None,
        }
    }

    /// Whether the default selection flag is set.
    pub fn is_default(&self) -> bool {
        self.selection_flags.contains(SelectionFlags::DEFAULT)
    }

    /// Whether the forced selection flag is set.
    pub fn is_forced(&self) -> bool {
        self.selection_flags.contains(SelectionFlags::FORCED)
    }
}

// Formats are hashed so that track groups can key override maps by content.
impl Eq for Format {}

impl Hash for Format {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.label.hash(state);
        self.language.hash(state);
        self.selection_flags.hash(state);
        self.role_flags.hash(state);
        self.bitrate.hash(state);
        self.codecs.hash(state);
        self.container_mime_type.hash(state);
        self.sample_mime_type.hash(state);
        self.width.hash(state);
        self.height.hash(state);
        self.frame_rate.map(f32::to_bits).hash(state);
        self.channel_count.hash(state);
        self.sample_rate.hash(state);
    }
}

/// Builder for [`Format`].
#[derive(Debug, Clone, Default)]
pub struct FormatBuilder {
    format: Format,
}

impl FormatBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.format.id = Some(id.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.format.label = Some(label.into());
        self
    }

    pub fn language(mut self, language: impl AsRef<str>) -> Self {
        self.format.language = language::normalize(language.as_ref());
        self
    }

    pub fn selection_flags(mut self, flags: SelectionFlags) -> Self {
        self.format.selection_flags = flags;
        self
    }

    pub fn role_flags(mut self, flags: RoleFlags) -> Self {
        self.format.role_flags = flags;
        self
    }

    pub fn bitrate(mut self, bitrate: u32) -> Self {
        self.format.bitrate = Some(bitrate);
        self
    }

    pub fn codecs(mut self, codecs: impl Into<String>) -> Self {
        self.format.codecs = Some(codecs.into());
        self
    }

    pub fn container_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.format.container_mime_type = Some(mime_type.into());
        self
    }

    pub fn sample_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.format.sample_mime_type = Some(mime_type.into());
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.format.width = Some(width);
        self.format.height = Some(height);
        self
    }

    pub fn frame_rate(mut self, frame_rate: f32) -> Self {
        self.format.frame_rate = Some(frame_rate);
        self
    }

    pub fn channel_count(mut self, channel_count: u32) -> Self {
        self.format.channel_count = Some(channel_count);
        self
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.format.sample_rate = Some(sample_rate);
        self
    }

    pub fn build(self) -> Format {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_normalizes_language() {
        let format = Format::builder()
            .sample_mime_type(mime::AUDIO_AAC)
            .language("ENG")
            .build();
        assert_eq!(format.language.as_deref(), Some("en"));
        assert_eq!(format.track_type(), TrackType::Audio);
    }

    #[test]
    fn test_track_type_falls_back_to_container() {
        let format = Format::builder().container_mime_type(mime::VIDEO_MP4).build();
        assert_eq!(format.track_type(), TrackType::Video);
    }

    #[test]
    fn test_role_flag_match_score() {
        let main = RoleFlags::MAIN;
        assert_eq!(main.match_score(RoleFlags::MAIN), u32::MAX);
        let both = RoleFlags::MAIN | RoleFlags::DUB;
        assert_eq!(both.match_score(RoleFlags::MAIN), 1);
        assert_eq!(RoleFlags::empty().match_score(RoleFlags::empty()), 0);
        assert_eq!(RoleFlags::COMMENTARY.match_score(RoleFlags::MAIN), 0);
    }

    #[test]
    fn test_flags_serialize_round_trip() {
        let format = Format::builder()
            .selection_flags(SelectionFlags::DEFAULT | SelectionFlags::FORCED)
            .role_flags(RoleFlags::CAPTION)
            .build();
        let json = serde_json::to_string(&format).unwrap();
        let back: Format = serde_json::from_str(&json).unwrap();
        assert_eq!(back, format);
    }
}
