//! Video track selection
//!
//! Video candidates are ranked in two passes. Non-quality preferences
//! (capabilities, viewport, roles, labels, languages, MIME types, decoder
//! tier, frame rate) compare the best track of each candidate first; the
//! candidate with more tracks wins next; quality (resolution, then bitrate)
//! breaks remaining ties.

use std::cmp::Ordering;

use crate::comparator::Lexicographic;
use crate::format::{Format, RoleFlags, TrackType};
use crate::selector::candidate::{
    preference_index, select_tracks_for_type, Definition, Eligibility, GroupContext, TrackInfo,
};
use crate::selector::Context;
use crate::track_group::TrackGroup;
use crate::{language, mime};

/// Ranking data for one video track.
pub(crate) struct VideoTrackInfo<'a> {
    track_index: usize,
    format: &'a Format,
    eligibility: Eligibility,
    within_renderer_capabilities: bool,
    within_viewport: bool,
    within_max_constraints: bool,
    within_min_constraints: bool,
    preferred_role_flags_score: u32,
    preferred_label_index: usize,
    preferred_language_index: usize,
    preferred_language_score: u8,
    audio_language_score: u8,
    preferred_mime_type_index: usize,
    uses_primary_decoder: bool,
    uses_hardware_acceleration: bool,
    codec_preference_score: u8,
    has_reasonable_frame_rate: bool,
    allow_mixed_mime_types: bool,
    allow_mixed_decoder_support: bool,
}

impl<'a> VideoTrackInfo<'a> {
    fn for_group(ctx: &Context<'a>, group: &GroupContext<'a>, selected_audio_language: Option<&str>) -> Vec<Self> {
        let params = ctx.params;
        let allow_mixed_mime_types = params.allow_video_mixed_mime_type_adaptiveness
            && ctx
                .mapped
                .mixed_mime_type_adaptation_support(group.renderer_index)
                .allows(params.allow_video_non_seamless_adaptiveness);
        let (viewport_width, viewport_height) = ctx.viewport();
        let max_pixels = max_video_pixels_to_retain(
            group.group,
            viewport_width,
            viewport_height,
            params.viewport_orientation_may_change,
            ctx.config.fullscreen_viewport_fraction,
        );
        let audio_language = language::undetermined_to_none(selected_audio_language);

        group
            .group
            .formats()
            .iter()
            .zip(group.capabilities)
            .enumerate()
            .map(|(track_index, (format, capabilities))| {
                let within_viewport = max_pixels == u64::MAX
                    || format.pixel_count().is_some_and(|pixels| pixels <= max_pixels);
                let frame_rate = format.frame_rate;
                let within_max_constraints = within_viewport
                    && format.width.map_or(true, |w| w <= params.max_video_width)
                    && format.height.map_or(true, |h| h <= params.max_video_height)
                    && frame_rate.map_or(true, |f| f <= params.max_video_frame_rate as f32)
                    && format.bitrate.map_or(true, |b| b <= params.max_video_bitrate);
                let within_min_constraints = within_viewport
                    && format.width.map_or(true, |w| w >= params.min_video_width)
                    && format.height.map_or(true, |h| h >= params.min_video_height)
                    && frame_rate.map_or(true, |f| f >= params.min_video_frame_rate as f32)
                    && format.bitrate.map_or(true, |b| b >= params.min_video_bitrate);
                let within_renderer_capabilities = capabilities.format_support.is_supported(false);
                let (preferred_language_index, preferred_language_score) = if params.preferred_video_languages.is_empty() {
                    (usize::MAX, 0)
                } else {
                    language::best_preference_match(format.language.as_deref(), &params.preferred_video_languages, false)
                };
                let audio_language_score = audio_language
                    .map_or(0, |audio| language::match_score(format.language.as_deref(), Some(audio), false));

                let eligibility = if format.role_flags.contains(RoleFlags::TRICK_PLAY)
                    || !capabilities
                        .format_support
                        .is_supported(params.exceed_renderer_capabilities_if_necessary)
                    || (!within_max_constraints && !params.exceed_video_constraints_if_necessary)
                {
                    Eligibility::No
                } else if within_renderer_capabilities
                    && within_min_constraints
                    && within_max_constraints
                    && format.bitrate.is_some()
                    && !params.force_highest_supported_bitrate
                    && !params.force_lowest_bitrate
                    && capabilities
                        .adaptive_support
                        .allows(params.allow_video_non_seamless_adaptiveness)
                {
                    Eligibility::Adaptive
                } else {
                    Eligibility::Fixed
                };

                VideoTrackInfo {
                    track_index,
                    format,
                    eligibility,
                    within_renderer_capabilities,
                    within_viewport,
                    within_max_constraints,
                    within_min_constraints,
                    preferred_role_flags_score: format.role_flags.match_score(params.preferred_video_role_flags),
                    preferred_label_index: preference_index(format.label.as_deref(), &params.preferred_video_labels),
                    preferred_language_index,
                    preferred_language_score,
                    audio_language_score,
                    preferred_mime_type_index: preference_index(
                        format.sample_mime_type.as_deref(),
                        &params.preferred_video_mime_types,
                    ),
                    uses_primary_decoder: capabilities.uses_primary_decoder(),
                    uses_hardware_acceleration: capabilities.hardware_accelerated,
                    codec_preference_score: mime::video_codec_preference_score(format.sample_mime_type.as_deref()),
                    has_reasonable_frame_rate: frame_rate.map_or(true, |f| f >= ctx.config.min_reasonable_frame_rate),
                    allow_mixed_mime_types,
                    allow_mixed_decoder_support: params.allow_video_mixed_decoder_support_adaptiveness,
                }
            })
            .collect()
    }

    fn quality_ordering(&self, ordering: Ordering) -> Ordering {
        if self.within_max_constraints && self.within_renderer_capabilities {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

impl TrackInfo for VideoTrackInfo<'_> {
    fn track_index(&self) -> usize {
        self.track_index
    }

    fn eligibility(&self) -> Eligibility {
        self.eligibility
    }

    fn is_compatible_for_adaptation_with(&self, other: &Self) -> bool {
        (self.allow_mixed_mime_types || self.format.sample_mime_type == other.format.sample_mime_type)
            && (self.allow_mixed_decoder_support
                || (self.uses_primary_decoder == other.uses_primary_decoder
                    && self.uses_hardware_acceleration == other.uses_hardware_acceleration))
    }
}

/// Preferences unrelated to picture quality.
pub(crate) fn non_quality_comparator<'a>() -> Lexicographic<'a, VideoTrackInfo<'a>> {
    Lexicographic::new()
        .then_prefer("within_renderer_capabilities", |t: &VideoTrackInfo| t.within_renderer_capabilities)
        .then_prefer("within_viewport", |t: &VideoTrackInfo| t.within_viewport)
        .then_by_key("preferred_role_flags", |t: &VideoTrackInfo| t.preferred_role_flags_score)
        .then_by_key_reversed("preferred_label_index", |t: &VideoTrackInfo| t.preferred_label_index)
        .then_by_key_reversed("preferred_language_index", |t: &VideoTrackInfo| t.preferred_language_index)
        .then_by_key("preferred_language_score", |t: &VideoTrackInfo| t.preferred_language_score)
        .then_by_key("audio_language_match", |t: &VideoTrackInfo| t.audio_language_score)
        .then_by_key_reversed("preferred_mime_type_index", |t: &VideoTrackInfo| t.preferred_mime_type_index)
        .then_prefer("within_max_constraints", |t: &VideoTrackInfo| t.within_max_constraints)
        .then_prefer("within_min_constraints", |t: &VideoTrackInfo| t.within_min_constraints)
        .then_prefer("primary_decoder", |t: &VideoTrackInfo| t.uses_primary_decoder)
        .then_prefer("hardware_acceleration", |t: &VideoTrackInfo| t.uses_hardware_acceleration)
        .then_with("codec_preference", |a: &VideoTrackInfo, b: &VideoTrackInfo| {
            if a.uses_primary_decoder && a.uses_hardware_acceleration {
                a.codec_preference_score.cmp(&b.codec_preference_score)
            } else {
                Ordering::Equal
            }
        })
        .then_prefer("reasonable_frame_rate", |t: &VideoTrackInfo| t.has_reasonable_frame_rate)
}

/// Picture quality preferences.
pub(crate) fn quality_comparator<'a>(force_lowest_bitrate: bool) -> Lexicographic<'a, VideoTrackInfo<'a>> {
    Lexicographic::new()
        .when(force_lowest_bitrate, |c| {
            c.then_with("force_lowest_bitrate", |a: &VideoTrackInfo, b: &VideoTrackInfo| {
                b.format.bitrate.cmp(&a.format.bitrate)
            })
        })
        .then_with("pixel_count", |a: &VideoTrackInfo, b: &VideoTrackInfo| {
            a.quality_ordering(a.format.pixel_count().cmp(&b.format.pixel_count()))
        })
        .then_with("bitrate", |a: &VideoTrackInfo, b: &VideoTrackInfo| {
            a.quality_ordering(a.format.bitrate.cmp(&b.format.bitrate))
        })
}

/// Pick the best video selection across all video renderers.
pub(crate) fn select_video(ctx: &Context<'_>, selected_audio_language: Option<&str>) -> Option<Definition> {
    if ctx.params.audio_offload_preferences.is_required() {
        return None;
    }
    let non_quality = non_quality_comparator();
    let quality = quality_comparator(ctx.params.force_lowest_bitrate);

    select_tracks_for_type(
        TrackType::Video,
        ctx.mapped,
        |group| VideoTrackInfo::for_group(ctx, group, selected_audio_language),
        |a, b| {
            let (Some(a_best), Some(b_best)) = (
                non_quality.max_by(a.iter().copied()),
                non_quality.max_by(b.iter().copied()),
            ) else {
                return a.len().cmp(&b.len());
            };
            if let Some((step, ordering)) = non_quality.deciding_step(a_best, b_best) {
                tracing::trace!("Video candidates differ by {}: {:?}", step, ordering);
                return ordering;
            }
            match a.len().cmp(&b.len()) {
                Ordering::Equal => {}
                ordering => return ordering,
            }
            match (quality.max_by(a.iter().copied()), quality.max_by(b.iter().copied())) {
                (Some(a_best), Some(b_best)) => quality.compare(a_best, b_best),
                _ => Ordering::Equal,
            }
        },
    )
}

/// Smallest pixel count among the group's videos that fill the viewport,
/// `u64::MAX` when the viewport is unconstrained or no video fills it.
///
/// Videos larger than this add nothing visible and are ranked as outside the
/// viewport.
pub(crate) fn max_video_pixels_to_retain(
    group: &TrackGroup,
    viewport_width: u32,
    viewport_height: u32,
    orientation_may_change: bool,
    fullscreen_fraction: f32,
) -> u64 {
    if viewport_width == u32::MAX || viewport_height == u32::MAX {
        return u64::MAX;
    }
    let mut max_pixels = u64::MAX;
    for format in group.formats() {
        let (Some(width), Some(height)) = (format.width, format.height) else {
            continue;
        };
        if width == 0 || height == 0 {
            continue;
        }
        let (fit_width, fit_height) =
            max_video_size_in_viewport(orientation_may_change, viewport_width, viewport_height, width, height);
        let pixels = u64::from(width) * u64::from(height);
        if width >= (fit_width as f32 * fullscreen_fraction) as u32
            && height >= (fit_height as f32 * fullscreen_fraction) as u32
            && pixels < max_pixels
        {
            max_pixels = pixels;
        }
    }
    max_pixels
}

/// Largest size a `width` x `height` video can be shown at in the viewport
/// while keeping its aspect ratio.
fn max_video_size_in_viewport(
    orientation_may_change: bool,
    viewport_width: u32,
    viewport_height: u32,
    width: u32,
    height: u32,
) -> (u64, u64) {
    let (viewport_width, viewport_height) =
        if orientation_may_change && ((width > height) != (viewport_width > viewport_height)) {
            (u64::from(viewport_height), u64::from(viewport_width))
        } else {
            (u64::from(viewport_width), u64::from(viewport_height))
        };
    let (width, height) = (u64::from(width), u64::from(height));
    if width * viewport_height >= height * viewport_width {
        // Letterboxed top and bottom
        (viewport_width, (viewport_width * height).div_ceil(width))
    } else {
        // Pillarboxed left and right
        ((viewport_height * width).div_ceil(height), viewport_height)
    }
}
