//! Shared fixtures for selector integration tests

#![allow(dead_code)]

use trackselect_core::capabilities::{DeclaredDecoder, DeclaredRendererCapabilities, RendererCapabilities};
use trackselect_core::format::{Format, FormatBuilder, TrackType};
use trackselect_core::{mime, DefaultTrackSelector, MediaPeriodId, Parameters, TrackGroup, TrackGroupArray, TrackSelector, TrackSelectorResult};

pub fn aac() -> FormatBuilder {
    Format::builder()
        .sample_mime_type(mime::AUDIO_AAC)
        .channel_count(2)
        .sample_rate(48_000)
}

pub fn h264(width: u32, height: u32, bitrate: u32) -> Format {
    Format::builder()
        .sample_mime_type(mime::VIDEO_H264)
        .size(width, height)
        .frame_rate(30.0)
        .bitrate(bitrate)
        .build()
}

pub fn group(id: &str, formats: Vec<Format>) -> TrackGroup {
    TrackGroup::new(id, formats).expect("non-empty group")
}

pub fn audio_renderer() -> DeclaredRendererCapabilities {
    DeclaredRendererCapabilities::new("audio", TrackType::Audio).with_decoder(DeclaredDecoder::new(mime::AUDIO_AAC))
}

pub fn video_renderer() -> DeclaredRendererCapabilities {
    DeclaredRendererCapabilities::new("video", TrackType::Video).with_decoder(DeclaredDecoder::new(mime::VIDEO_H264))
}

pub fn text_renderer() -> DeclaredRendererCapabilities {
    DeclaredRendererCapabilities::new("text", TrackType::Text).with_decoder(DeclaredDecoder::new(mime::TEXT_VTT))
}

pub fn image_renderer() -> DeclaredRendererCapabilities {
    DeclaredRendererCapabilities::new("image", TrackType::Image).with_decoder(DeclaredDecoder::new(mime::IMAGE_JPEG))
}

/// Run one selection with the default selector configuration.
pub fn select(
    renderers: &[&dyn RendererCapabilities],
    groups: &TrackGroupArray,
    params: Parameters,
) -> TrackSelectorResult {
    DefaultTrackSelector::new(params).select_tracks(renderers, groups, &MediaPeriodId::new("period"))
}
