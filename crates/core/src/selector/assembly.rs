//! Result assembly
//!
//! Runs the per-type selectors in dependency order, applies overrides and
//! disablement, then derives renderer configurations (tunneling, audio
//! offload) and the aggregated tracks view.

use crate::capabilities::{AdaptiveSupport, FormatSupport};
use crate::format::TrackType;
use crate::result::{OffloadMode, RendererConfiguration, TrackGroupInfo, TrackSelection, Tracks};
use crate::selector::audio::select_audio;
use crate::selector::candidate::Definition;
use crate::selector::image::select_image;
use crate::selector::mapping::MappedTrackInfo;
use crate::selector::other::select_other;
use crate::selector::overrides::{apply_legacy_overrides, apply_track_selection_overrides, clear_disabled};
use crate::selector::text::select_text;
use crate::selector::video::select_video;
use crate::selector::Context;

/// Automatic selection for every renderer.
///
/// Audio goes first so that video and text can follow its language. An
/// image selection replaces video when images are prioritized or no video
/// was found.
pub(crate) fn select_all(ctx: &Context<'_>) -> Vec<Option<Definition>> {
    let mapped = ctx.mapped;
    let mut definitions: Vec<Option<Definition>> = vec![None; mapped.renderer_count()];
    let mut place = |definition: Option<Definition>| {
        if let Some(definition) = definition {
            let renderer_index = definition.renderer_index;
            definitions[renderer_index] = Some(definition);
        }
    };

    let audio = select_audio(ctx);
    let audio_language = audio.as_ref().and_then(|definition| {
        let group = mapped.track_groups(definition.renderer_index).get(definition.group_index)?;
        group.format(definition.tracks[0]).language.clone()
    });
    place(audio);

    let video = select_video(ctx, audio_language.as_deref());
    let image = if ctx.params.prioritize_image_over_video || video.is_none() {
        select_image(ctx)
    } else {
        None
    };
    if image.is_some() {
        place(image);
    } else {
        place(video);
    }

    place(select_text(ctx, audio_language.as_deref()));

    for renderer_index in 0..mapped.renderer_count() {
        if matches!(mapped.renderer_type(renderer_index), TrackType::Metadata | TrackType::Unknown) {
            place(select_other(ctx, renderer_index));
        }
    }
    definitions
}

/// Selections after overrides and disablement, one per renderer.
pub(crate) fn resolve_selections(ctx: &Context<'_>) -> Vec<Option<TrackSelection>> {
    let mut definitions = select_all(ctx);
    apply_track_selection_overrides(ctx.mapped, ctx.params, &mut definitions);
    apply_legacy_overrides(ctx.mapped, ctx.params, &mut definitions);
    clear_disabled(ctx.mapped, ctx.params, &mut definitions);

    definitions
        .into_iter()
        .map(|definition| {
            definition.and_then(|definition| {
                let group = ctx.mapped.track_groups(definition.renderer_index).get(definition.group_index)?;
                TrackSelection::from_tracks(group.clone(), definition.tracks)
            })
        })
        .collect()
}

/// Renderer configurations for the given selections.
///
/// A renderer is enabled when it is not disabled and either has a selection
/// or consumes no sample data.
pub(crate) fn configure_renderers(
    ctx: &Context<'_>,
    selections: &mut [Option<TrackSelection>],
) -> Vec<Option<RendererConfiguration>> {
    let mapped = ctx.mapped;
    let params = ctx.params;

    let mut configurations: Vec<Option<RendererConfiguration>> = selections
        .iter()
        .enumerate()
        .map(|(renderer_index, selection)| {
            let renderer_type = mapped.renderer_type(renderer_index);
            // No-sample renderers ignore per-index disabling.
            let enabled = if renderer_type == TrackType::None {
                !params.disabled_track_types.contains(&TrackType::None)
            } else {
                !params.is_renderer_or_type_disabled(renderer_index, renderer_type)
                    && selection.is_some()
            };
            enabled.then(RendererConfiguration::default)
        })
        .collect();

    if params.tunneling_enabled {
        configure_tunneling(mapped, selections, &mut configurations);
    }
    if params.audio_offload_preferences.is_enabled() {
        configure_offload(ctx, selections, &mut configurations);
    }

    if params.audio_offload_preferences.is_required() {
        for renderer_index in 0..selections.len() {
            let offloaded = configurations[renderer_index]
                .is_some_and(|configuration| configuration.offload_mode != OffloadMode::Disabled);
            if mapped.renderer_type(renderer_index) == TrackType::Audio
                && selections[renderer_index].is_some()
                && !offloaded
            {
                tracing::debug!(
                    "Dropping audio selection on renderer {}: offload required but unavailable",
                    renderer_index
                );
                selections[renderer_index] = None;
                configurations[renderer_index] = None;
            }
        }
    }
    configurations
}

/// Whether every selected track reports tunneling support.
fn supports_tunneling(mapped: &MappedTrackInfo, renderer_index: usize, selection: &TrackSelection) -> bool {
    let Some(group_index) = mapped.track_groups(renderer_index).index_of(selection.group()) else {
        return false;
    };
    selection
        .tracks()
        .iter()
        .all(|&track| mapped.capabilities(renderer_index, group_index, track).tunneling_supported)
}

/// Enable tunneling when exactly one audio and one video renderer have
/// tunneling-capable selections.
fn configure_tunneling(
    mapped: &MappedTrackInfo,
    selections: &[Option<TrackSelection>],
    configurations: &mut [Option<RendererConfiguration>],
) {
    let mut audio_renderer = None;
    let mut video_renderer = None;
    for (renderer_index, selection) in selections.iter().enumerate() {
        let Some(selection) = selection else {
            continue;
        };
        let slot = match mapped.renderer_type(renderer_index) {
            TrackType::Audio => &mut audio_renderer,
            TrackType::Video => &mut video_renderer,
            _ => continue,
        };
        if supports_tunneling(mapped, renderer_index, selection) {
            if slot.is_some() {
                tracing::debug!("Tunneling disabled: several renderers of one type support it");
                return;
            }
            *slot = Some(renderer_index);
        }
    }

    let (Some(audio), Some(video)) = (audio_renderer, video_renderer) else {
        return;
    };
    for renderer_index in [audio, video] {
        if let Some(configuration) = configurations[renderer_index].as_mut() {
            configuration.tunneling = true;
        }
    }
    tracing::debug!("Tunneling enabled for renderers {} and {}", audio, video);
}

/// Configure audio offload when the only selection is a single audio track
/// whose renderer satisfies the offload preferences.
fn configure_offload(
    ctx: &Context<'_>,
    selections: &[Option<TrackSelection>],
    configurations: &mut [Option<RendererConfiguration>],
) {
    let mapped = ctx.mapped;
    let preferences = &ctx.params.audio_offload_preferences;
    let mut offload_renderer = None;
    let mut offload_candidates = 0;

    for (renderer_index, selection) in selections.iter().enumerate() {
        let Some(selection) = selection else {
            continue;
        };
        match mapped.renderer_type(renderer_index) {
            TrackType::Audio => {}
            TrackType::Video | TrackType::Text | TrackType::Image => {
                tracing::debug!(
                    "Audio offload unavailable: renderer {} has a {} selection",
                    renderer_index,
                    mapped.renderer_type(renderer_index)
                );
                return;
            }
            _ => continue,
        }
        if selection.len() != 1 {
            continue;
        }
        let Some(group_index) = mapped.track_groups(renderer_index).index_of(selection.group()) else {
            continue;
        };
        let capabilities = mapped.capabilities(renderer_index, group_index, selection.tracks()[0]);
        if preferences.accepts(&capabilities.offload) {
            offload_renderer = Some(renderer_index);
            offload_candidates += 1;
        }
    }

    if offload_candidates != 1 {
        return;
    }
    let Some(renderer_index) = offload_renderer else {
        return;
    };
    if let Some(configuration) = configurations[renderer_index].as_mut() {
        configuration.offload_mode = if preferences.gapless_required {
            OffloadMode::EnabledGaplessRequired
        } else {
            OffloadMode::EnabledGaplessNotRequired
        };
        tracing::debug!("Audio offload enabled for renderer {} ({:?})", renderer_index, configuration.offload_mode);
    }
}

/// Aggregated tracks view: mapped groups in renderer order, then unmapped
/// groups (never supported, never selected).
pub(crate) fn build_tracks(mapped: &MappedTrackInfo, selections: &[Option<TrackSelection>]) -> Tracks {
    let mut infos = Vec::new();
    for renderer_index in 0..mapped.renderer_count() {
        let selection = selections.get(renderer_index).and_then(Option::as_ref);
        for (group_index, group) in mapped.track_groups(renderer_index).iter().enumerate() {
            let selected = selection.filter(|selection| selection.group() == group);
            infos.push(TrackGroupInfo {
                group: group.clone(),
                adaptive_supported: group.len() > 1
                    && mapped.adaptive_support_for_group(renderer_index, group_index, false)
                        != AdaptiveSupport::NotSupported,
                track_support: (0..group.len())
                    .map(|track| mapped.track_support(renderer_index, group_index, track))
                    .collect(),
                track_selected: (0..group.len())
                    .map(|track| selected.is_some_and(|selection| selection.contains(track)))
                    .collect(),
            });
        }
    }
    for group in mapped.unmapped_track_groups() {
        infos.push(TrackGroupInfo {
            group: group.clone(),
            adaptive_supported: false,
            track_support: vec![FormatSupport::UnsupportedType; group.len()],
            track_selected: vec![false; group.len()],
        });
    }
    Tracks::new(infos)
}
