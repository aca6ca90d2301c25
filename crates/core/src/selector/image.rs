//! Image track selection

use crate::comparator::Lexicographic;
use crate::format::TrackType;
use crate::selector::candidate::{select_tracks_for_type, Definition, Eligibility, GroupContext, TrackInfo};
use crate::selector::Context;

pub(crate) struct ImageTrackInfo {
    track_index: usize,
    eligibility: Eligibility,
    within_renderer_capabilities: bool,
    pixel_count: u64,
}

impl ImageTrackInfo {
    fn for_group(ctx: &Context<'_>, group: &GroupContext<'_>) -> Vec<Self> {
        let exceed = ctx.params.exceed_renderer_capabilities_if_necessary;
        group
            .group
            .formats()
            .iter()
            .zip(group.capabilities)
            .enumerate()
            .map(|(track_index, (format, capabilities))| ImageTrackInfo {
                track_index,
                eligibility: if capabilities.format_support.is_supported(exceed) {
                    Eligibility::Fixed
                } else {
                    Eligibility::No
                },
                within_renderer_capabilities: capabilities.format_support.is_supported(false),
                pixel_count: format.pixel_count().unwrap_or(0),
            })
            .collect()
    }
}

impl TrackInfo for ImageTrackInfo {
    fn track_index(&self) -> usize {
        self.track_index
    }

    fn eligibility(&self) -> Eligibility {
        self.eligibility
    }

    fn is_compatible_for_adaptation_with(&self, _other: &Self) -> bool {
        false
    }
}

/// Pick the largest supported image, unless audio offload is required.
pub(crate) fn select_image(ctx: &Context<'_>) -> Option<Definition> {
    if ctx.params.audio_offload_preferences.is_required() {
        return None;
    }
    let comparator: Lexicographic<'_, ImageTrackInfo> = Lexicographic::new()
        .then_prefer("within_renderer_capabilities", |t: &ImageTrackInfo| t.within_renderer_capabilities)
        .then_by_key("pixel_count", |t: &ImageTrackInfo| t.pixel_count);
    select_tracks_for_type(
        TrackType::Image,
        ctx.mapped,
        |group| ImageTrackInfo::for_group(ctx, group),
        |a, b| comparator.compare(a[0], b[0]),
    )
}
