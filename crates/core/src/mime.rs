//! MIME type constants and classification helpers
//!
//! Track groups are routed to renderers by the media type encoded in their
//! sample MIME type. Only the types the selector reasons about are listed here.

use crate::format::TrackType;

pub const VIDEO_H264: &str = "video/avc";
pub const VIDEO_H265: &str = "video/hevc";
pub const VIDEO_VP8: &str = "video/x-vnd.on2.vp8";
pub const VIDEO_VP9: &str = "video/x-vnd.on2.vp9";
pub const VIDEO_AV1: &str = "video/av01";
pub const VIDEO_DOLBY_VISION: &str = "video/dolby-vision";
pub const VIDEO_MP4: &str = "video/mp4";

pub const AUDIO_AAC: &str = "audio/mp4a-latm";
pub const AUDIO_MPEG: &str = "audio/mpeg";
pub const AUDIO_OPUS: &str = "audio/opus";
pub const AUDIO_FLAC: &str = "audio/flac";
pub const AUDIO_RAW: &str = "audio/raw";
pub const AUDIO_AC3: &str = "audio/ac3";
pub const AUDIO_E_AC3: &str = "audio/eac3";
pub const AUDIO_E_AC3_JOC: &str = "audio/eac3-joc";
pub const AUDIO_AC4: &str = "audio/ac4";
pub const AUDIO_MPEGH_MHA1: &str = "audio/mha1";
pub const AUDIO_MPEGH_MHM1: &str = "audio/mhm1";
pub const AUDIO_MP4: &str = "audio/mp4";

pub const TEXT_VTT: &str = "text/vtt";
pub const TEXT_SSA: &str = "text/x-ssa";
pub const APPLICATION_TTML: &str = "application/ttml+xml";
pub const APPLICATION_SUBRIP: &str = "application/x-subrip";
pub const APPLICATION_MP4VTT: &str = "application/x-mp4-vtt";
pub const APPLICATION_CEA608: &str = "application/cea-608";
pub const APPLICATION_CEA708: &str = "application/cea-708";
pub const APPLICATION_TX3G: &str = "application/x-quicktime-tx3g";
pub const APPLICATION_PGS: &str = "application/pgs";
pub const APPLICATION_DVBSUBS: &str = "application/dvbsubs";
pub const APPLICATION_VOBSUB: &str = "application/vobsub";

pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_HEIF: &str = "image/heif";

pub const APPLICATION_ID3: &str = "application/id3";
pub const APPLICATION_EMSG: &str = "application/x-emsg";
pub const APPLICATION_SCTE35: &str = "application/x-scte35";
pub const APPLICATION_ICY: &str = "application/x-icy";
pub const APPLICATION_CAMERA_MOTION: &str = "application/x-camera-motion";

const TEXT_APPLICATION_TYPES: &[&str] = &[
    APPLICATION_TTML,
    APPLICATION_SUBRIP,
    APPLICATION_MP4VTT,
    APPLICATION_CEA608,
    APPLICATION_CEA708,
    APPLICATION_TX3G,
    APPLICATION_PGS,
    APPLICATION_DVBSUBS,
    APPLICATION_VOBSUB,
];

const METADATA_APPLICATION_TYPES: &[&str] = &[
    APPLICATION_ID3,
    APPLICATION_EMSG,
    APPLICATION_SCTE35,
    APPLICATION_ICY,
    APPLICATION_CAMERA_MOTION,
];

/// Top-level type of a MIME string (`"video"` for `"video/avc"`).
pub fn top_level_type(mime_type: &str) -> Option<&str> {
    mime_type.split_once('/').map(|(top, _)| top)
}

/// Classify a MIME type into the renderer track type that can play it.
pub fn track_type(mime_type: Option<&str>) -> TrackType {
    let Some(mime_type) = mime_type else {
        return TrackType::Unknown;
    };
    let mime_type = mime_type.trim().to_ascii_lowercase();
    match top_level_type(&mime_type) {
        Some("audio") => TrackType::Audio,
        Some("video") => TrackType::Video,
        Some("image") => TrackType::Image,
        Some("text") => TrackType::Text,
        _ if TEXT_APPLICATION_TYPES.contains(&mime_type.as_str()) => TrackType::Text,
        _ if METADATA_APPLICATION_TYPES.contains(&mime_type.as_str()) => TrackType::Metadata,
        _ => TrackType::Unknown,
    }
}

/// Whether the MIME type is one of the Dolby audio codecs.
pub fn is_dolby_audio(mime_type: Option<&str>) -> bool {
    matches!(
        mime_type,
        Some(AUDIO_AC3) | Some(AUDIO_E_AC3) | Some(AUDIO_E_AC3_JOC) | Some(AUDIO_AC4)
    )
}

/// Whether the MIME type carries object-based (immersive) audio.
pub fn is_object_based_audio(mime_type: Option<&str>) -> bool {
    matches!(
        mime_type,
        Some(AUDIO_E_AC3_JOC) | Some(AUDIO_AC4) | Some(AUDIO_MPEGH_MHA1) | Some(AUDIO_MPEGH_MHM1)
    )
}

/// Preference score of a video codec when it runs on a primary hardware decoder.
///
/// Higher is better.
pub fn video_codec_preference_score(mime_type: Option<&str>) -> u8 {
    match mime_type {
        Some(VIDEO_DOLBY_VISION) => 5,
        Some(VIDEO_H265) => 4,
        Some(VIDEO_AV1) => 3,
        Some(VIDEO_VP9) => 2,
        Some(VIDEO_H264) => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_type_classification() {
        assert_eq!(track_type(Some(VIDEO_H264)), TrackType::Video);
        assert_eq!(track_type(Some("Audio/Opus")), TrackType::Audio);
        assert_eq!(track_type(Some(TEXT_VTT)), TrackType::Text);
        assert_eq!(track_type(Some(APPLICATION_TTML)), TrackType::Text);
        assert_eq!(track_type(Some(APPLICATION_ID3)), TrackType::Metadata);
        assert_eq!(track_type(Some(IMAGE_JPEG)), TrackType::Image);
        assert_eq!(track_type(Some("application/octet-stream")), TrackType::Unknown);
        assert_eq!(track_type(None), TrackType::Unknown);
    }

    #[test]
    fn test_codec_preference_ordering() {
        assert!(video_codec_preference_score(Some(VIDEO_H265)) > video_codec_preference_score(Some(VIDEO_H264)));
        assert_eq!(video_codec_preference_score(Some(VIDEO_VP8)), 0);
    }

    #[test]
    fn test_object_based_audio() {
        assert!(is_object_based_audio(Some(AUDIO_E_AC3_JOC)));
        assert!(!is_object_based_audio(Some(AUDIO_AC3)));
        assert!(is_dolby_audio(Some(AUDIO_AC3)));
    }
}
