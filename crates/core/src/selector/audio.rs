//! Audio track selection

use std::cmp::Ordering;

use crate::comparator::Lexicographic;
use crate::format::{Format, TrackType};
use crate::language;
use crate::selector::candidate::{
    preference_index, select_tracks_for_type, Definition, Eligibility, GroupContext, TrackInfo,
};
use crate::selector::Context;

/// Ranking data for one audio track.
pub(crate) struct AudioTrackInfo<'a> {
    track_index: usize,
    format: &'a Format,
    /// Language with "undetermined" folded to `None`
    language: Option<&'a str>,
    eligibility: Eligibility,
    within_renderer_capabilities: bool,
    within_constraints: bool,
    preferred_language_index: usize,
    preferred_language_score: u8,
    preferred_role_flags_score: u32,
    preferred_label_index: usize,
    is_default: bool,
    preferred_mime_type_index: usize,
    uses_primary_decoder: bool,
    uses_hardware_acceleration: bool,
    within_device_channel_layout: bool,
    is_object_based: bool,
    allow_mixed_mime_types: bool,
    allow_mixed_channel_counts: bool,
    allow_mixed_sample_rates: bool,
    allow_mixed_decoder_support: bool,
}

impl<'a> AudioTrackInfo<'a> {
    fn for_group(ctx: &Context<'a>, group: &GroupContext<'a>, has_mapped_video: bool) -> Vec<Self> {
        let params = ctx.params;
        let allow_mixed_mime_types = params.allow_audio_mixed_mime_type_adaptiveness
            && ctx
                .mapped
                .mixed_mime_type_adaptation_support(group.renderer_index)
                .allows(params.allow_audio_non_seamless_adaptiveness);

        group
            .group
            .formats()
            .iter()
            .zip(group.capabilities)
            .enumerate()
            .map(|(track_index, (format, capabilities))| {
                let within_renderer_capabilities = capabilities.format_support.is_supported(false);
                let within_constraints = within(format.bitrate, params.min_audio_bitrate, params.max_audio_bitrate)
                    && within(format.channel_count, params.min_audio_channel_count, params.max_audio_channel_count)
                    && within(format.sample_rate, params.min_audio_sample_rate, params.max_audio_sample_rate);
                let (preferred_language_index, preferred_language_score) = if params.preferred_audio_languages.is_empty() {
                    (usize::MAX, 0)
                } else {
                    language::best_preference_match(
                        format.language.as_deref(),
                        &params.preferred_audio_languages,
                        false,
                    )
                };
                let offload_required = params.audio_offload_preferences.is_required();

                let eligibility = if !capabilities
                    .format_support
                    .is_supported(params.exceed_renderer_capabilities_if_necessary)
                    || (!within_constraints && !params.exceed_audio_constraints_if_necessary)
                    || (offload_required && !params.audio_offload_preferences.accepts(&capabilities.offload))
                {
                    Eligibility::No
                } else if within_renderer_capabilities
                    && within_constraints
                    && format.bitrate.is_some()
                    && !params.force_highest_supported_bitrate
                    && !params.force_lowest_bitrate
                    && (params.allow_multiple_adaptive_selections || !has_mapped_video)
                    && !offload_required
                    && capabilities
                        .adaptive_support
                        .allows(params.allow_audio_non_seamless_adaptiveness)
                {
                    Eligibility::Adaptive
                } else {
                    Eligibility::Fixed
                };

                AudioTrackInfo {
                    track_index,
                    format,
                    language: language::undetermined_to_none(format.language.as_deref()),
                    eligibility,
                    within_renderer_capabilities,
                    within_constraints,
                    preferred_language_index,
                    preferred_language_score,
                    preferred_role_flags_score: format.role_flags.match_score(params.preferred_audio_role_flags),
                    preferred_label_index: preference_index(format.label.as_deref(), &params.preferred_audio_labels),
                    is_default: format.is_default(),
                    preferred_mime_type_index: preference_index(
                        format.sample_mime_type.as_deref(),
                        &params.preferred_audio_mime_types,
                    ),
                    uses_primary_decoder: capabilities.uses_primary_decoder(),
                    uses_hardware_acceleration: capabilities.hardware_accelerated,
                    within_device_channel_layout: !params.constrain_audio_channel_count_to_device_capabilities
                        || ctx.device.supports_channel_layout(format),
                    is_object_based: crate::mime::is_object_based_audio(format.sample_mime_type.as_deref()),
                    allow_mixed_mime_types,
                    allow_mixed_channel_counts: params.allow_audio_mixed_channel_count_adaptiveness,
                    allow_mixed_sample_rates: params.allow_audio_mixed_sample_rate_adaptiveness,
                    allow_mixed_decoder_support: params.allow_audio_mixed_decoder_support_adaptiveness,
                }
            })
            .collect()
    }

    /// Higher quality ranks higher for tracks that play as intended; once a
    /// track is already out of bounds, lower values are the safer choice.
    fn quality_ordering(&self, ordering: Ordering) -> Ordering {
        if self.within_constraints && self.within_renderer_capabilities {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

impl TrackInfo for AudioTrackInfo<'_> {
    fn track_index(&self) -> usize {
        self.track_index
    }

    fn eligibility(&self) -> Eligibility {
        self.eligibility
    }

    fn is_compatible_for_adaptation_with(&self, other: &Self) -> bool {
        (self.allow_mixed_channel_counts
            || (self.format.channel_count.is_some() && self.format.channel_count == other.format.channel_count))
            && (self.allow_mixed_mime_types
                || (self.format.sample_mime_type.is_some()
                    && self.format.sample_mime_type == other.format.sample_mime_type))
            && (self.allow_mixed_sample_rates
                || (self.format.sample_rate.is_some() && self.format.sample_rate == other.format.sample_rate))
            && (self.allow_mixed_decoder_support
                || (self.uses_primary_decoder == other.uses_primary_decoder
                    && self.uses_hardware_acceleration == other.uses_hardware_acceleration))
    }
}

fn within(value: Option<u32>, min: u32, max: u32) -> bool {
    value.map_or(true, |v| v >= min && v <= max)
}

/// Ranking of audio tracks, best last.
pub(crate) fn audio_comparator<'a>(
    force_lowest_bitrate: bool,
    force_highest_bitrate: bool,
    object_based_preferred: bool,
) -> Lexicographic<'a, AudioTrackInfo<'a>> {
    Lexicographic::new()
        .then_prefer("within_renderer_capabilities", |t: &AudioTrackInfo| t.within_renderer_capabilities)
        .then_by_key_reversed("preferred_language_index", |t: &AudioTrackInfo| t.preferred_language_index)
        .then_by_key("preferred_language_score", |t: &AudioTrackInfo| t.preferred_language_score)
        .then_by_key("preferred_role_flags", |t: &AudioTrackInfo| t.preferred_role_flags_score)
        .then_by_key_reversed("preferred_label_index", |t: &AudioTrackInfo| t.preferred_label_index)
        .then_prefer("default_flag", |t: &AudioTrackInfo| t.is_default)
        .then_prefer("within_constraints", |t: &AudioTrackInfo| t.within_constraints)
        .then_by_key_reversed("preferred_mime_type_index", |t: &AudioTrackInfo| t.preferred_mime_type_index)
        .when(force_lowest_bitrate, |c| {
            c.then_with("force_lowest_bitrate", |a: &AudioTrackInfo, b: &AudioTrackInfo| {
                b.format.bitrate.cmp(&a.format.bitrate)
            })
        })
        .when(force_highest_bitrate, |c| {
            c.then_by_key("force_highest_bitrate", |t: &AudioTrackInfo| t.format.bitrate)
        })
        .then_prefer("primary_decoder", |t: &AudioTrackInfo| t.uses_primary_decoder)
        .then_prefer("hardware_acceleration", |t: &AudioTrackInfo| t.uses_hardware_acceleration)
        .then_prefer("device_channel_layout", |t: &AudioTrackInfo| t.within_device_channel_layout)
        .when(object_based_preferred, |c| {
            c.then_prefer("object_based_audio", |t: &AudioTrackInfo| t.is_object_based)
        })
        .then_with("channel_count", |a: &AudioTrackInfo, b: &AudioTrackInfo| {
            a.quality_ordering(a.format.channel_count.cmp(&b.format.channel_count))
        })
        .then_with("sample_rate", |a: &AudioTrackInfo, b: &AudioTrackInfo| {
            a.quality_ordering(a.format.sample_rate.cmp(&b.format.sample_rate))
        })
        .then_with("bitrate_within_language", |a: &AudioTrackInfo, b: &AudioTrackInfo| {
            if a.language == b.language {
                a.quality_ordering(a.format.bitrate.cmp(&b.format.bitrate))
            } else {
                Ordering::Equal
            }
        })
}

/// Pick the best audio selection across all audio renderers.
pub(crate) fn select_audio(ctx: &Context<'_>) -> Option<Definition> {
    let params = ctx.params;
    let has_mapped_video = ctx.mapped.has_mapped_tracks(TrackType::Video);
    let comparator = audio_comparator(
        params.force_lowest_bitrate,
        params.force_highest_supported_bitrate,
        !params.constrain_audio_channel_count_to_device_capabilities,
    );

    select_tracks_for_type(
        TrackType::Audio,
        ctx.mapped,
        |group| AudioTrackInfo::for_group(ctx, group, has_mapped_video),
        |a, b| {
            let (Some(best_a), Some(best_b)) =
                (comparator.max_by(a.iter().copied()), comparator.max_by(b.iter().copied()))
            else {
                return a.len().cmp(&b.len());
            };
            if let Some((step, ordering)) = comparator.deciding_step(best_a, best_b) {
                tracing::trace!(
                    "Audio track {} vs {}: {:?} by {}",
                    best_a.track_index,
                    best_b.track_index,
                    ordering,
                    step
                );
                ordering
            } else {
                Ordering::Equal
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{AdaptiveSupport, DeclaredDecoder, DeclaredRendererCapabilities, RendererCapabilities};
    use crate::format::SelectionFlags;
    use crate::mime;
    use crate::capabilities::DecoderSupport;
    use crate::format::RoleFlags;
    use crate::parameters::Parameters;
    use crate::selector::mapping::MappedTrackInfo;
    use crate::selector::test_support::{context, groups, map};
    use crate::track_group::TrackGroup;

    fn aac(bitrate: u32) -> Format {
        Format::builder()
            .sample_mime_type(mime::AUDIO_AAC)
            .channel_count(2)
            .sample_rate(44_100)
            .bitrate(bitrate)
            .build()
    }

    fn renderer() -> DeclaredRendererCapabilities {
        DeclaredRendererCapabilities::new("audio", TrackType::Audio)
            .with_decoder(DeclaredDecoder::new(mime::AUDIO_AAC))
            .with_decoder(DeclaredDecoder::new(mime::AUDIO_E_AC3_JOC))
    }

    /// Track infos for the first group of the first renderer.
    fn track_infos<'a>(mapped: &'a MappedTrackInfo, params: &'a Parameters) -> Vec<AudioTrackInfo<'a>> {
        let ctx = context(mapped, params);
        AudioTrackInfo::for_group(
            &ctx,
            &GroupContext {
                renderer_index: 0,
                group: &mapped.track_groups(0).groups()[0],
                capabilities: &mapped.renderer_capabilities(0)[0],
            },
            false,
        )
    }

    fn select(groups_: Vec<TrackGroup>, params: &Parameters) -> Option<Definition> {
        let renderer = renderer();
        let renderers: Vec<&dyn RendererCapabilities> = vec![&renderer];
        let mapped = map(&renderers, groups(groups_));
        select_audio(&context(&mapped, params))
    }

    #[test]
    fn test_ladder_forms_adaptive_selection() {
        let group = TrackGroup::new("a", vec![aac(64_000), aac(128_000)]).unwrap();
        let definition = select(vec![group], &Parameters::default()).unwrap();
        assert_eq!(definition.tracks, vec![0, 1]);
    }

    #[test]
    fn test_non_adaptive_renderer_picks_highest_bitrate() {
        let renderer = DeclaredRendererCapabilities::new("audio", TrackType::Audio)
            .with_decoder(DeclaredDecoder::new(mime::AUDIO_AAC).with_adaptive(AdaptiveSupport::NotSupported));
        let renderers: Vec<&dyn RendererCapabilities> = vec![&renderer];
        let group = TrackGroup::new("a", vec![aac(64_000), aac(128_000), aac(96_000)]).unwrap();
        let mapped = map(&renderers, groups(vec![group]));
        let params = Parameters::default();
        let definition = select_audio(&context(&mapped, &params)).unwrap();
        assert_eq!(definition.tracks, vec![1]);
    }

    #[test]
    fn test_preferred_language_beats_default_flag() {
        let fra = TrackGroup::new(
            "fra",
            vec![aac(128_000)
                .build_upon()
                .language("fra")
                .selection_flags(SelectionFlags::DEFAULT)
                .build()],
        )
        .unwrap();
        let eng = TrackGroup::new("eng", vec![aac(64_000).build_upon().language("eng").build()]).unwrap();
        let params = Parameters::builder().preferred_audio_languages(["eng"]).build();
        let definition = select(vec![fra.clone(), eng.clone()], &params).unwrap();
        assert_eq!(definition.group_index, 1);

        let definition = select(vec![fra, eng], &Parameters::default()).unwrap();
        assert_eq!(definition.group_index, 0);
    }

    #[test]
    fn test_force_lowest_bitrate_selects_single_track() {
        let group = TrackGroup::new("a", vec![aac(96_000), aac(32_000), aac(64_000)]).unwrap();
        let params = Parameters::builder().force_lowest_bitrate(true).build();
        let definition = select(vec![group], &params).unwrap();
        assert_eq!(definition.tracks, vec![1]);
    }

    #[test]
    fn test_constraints_exceeded_tracks_rank_low() {
        let stereo = aac(128_000);
        let surround = aac(384_000).build_upon().channel_count(6).build();
        let group = TrackGroup::new("a", vec![surround, stereo]).unwrap();
        let params = Parameters::builder()
            .max_audio_channel_count(2)
            .allow_audio_mixed_channel_count_adaptiveness(false)
            .build();
        let definition = select(vec![group.clone()], &params).unwrap();
        assert_eq!(definition.tracks, vec![1]);

        let strict = params
            .build_upon()
            .max_audio_channel_count(1)
            .exceed_audio_constraints_if_necessary(false)
            .build();
        assert!(select(vec![group], &strict).is_none());
    }

    #[test]
    fn test_object_based_audio_preferred_without_channel_constraint() {
        let joc = Format::builder()
            .sample_mime_type(mime::AUDIO_E_AC3_JOC)
            .channel_count(2)
            .sample_rate(48_000)
            .bitrate(256_000)
            .build();
        let plain = aac(256_000).build_upon().channel_count(6).sample_rate(48_000).build();
        let groups_ = vec![
            TrackGroup::new("plain", vec![plain]).unwrap(),
            TrackGroup::new("joc", vec![joc]).unwrap(),
        ];
        let params = Parameters::builder()
            .constrain_audio_channel_count_to_device_capabilities(false)
            .build();
        let definition = select(groups_, &params).unwrap();
        assert_eq!(definition.group_index, 1);
    }

    #[test]
    fn test_deciding_step_names_rule() {
        let a = aac(64_000).build_upon().language("en").build();
        let b = aac(128_000).build_upon().language("en").build();
        let group = TrackGroup::new("a", vec![a, b]).unwrap();
        let renderer = renderer();
        let renderers: Vec<&dyn RendererCapabilities> = vec![&renderer];
        let mapped = map(&renderers, groups(vec![group]));
        let params = Parameters::default();
        let ctx = context(&mapped, &params);
        let infos = AudioTrackInfo::for_group(
            &ctx,
            &GroupContext {
                renderer_index: 0,
                group: &mapped.track_groups(0).groups()[0],
                capabilities: &mapped.renderer_capabilities(0)[0],
            },
            false,
        );
        let comparator = audio_comparator(false, false, false);
        assert_eq!(
            comparator.deciding_step(&infos[1], &infos[0]),
            Some(("bitrate_within_language", Ordering::Greater))
        );
    }

    #[test]
    fn test_unnormalized_preferred_language_matches() {
        let fra = TrackGroup::new("fra", vec![aac(128_000).build_upon().language("fr").build()]).unwrap();
        let eng = TrackGroup::new("eng", vec![aac(64_000).build_upon().language("en").build()]).unwrap();
        let params = Parameters {
            preferred_audio_languages: vec!["ENG".into()],
            ..Default::default()
        };
        let definition = select(vec![fra, eng], &params).unwrap();
        assert_eq!(definition.group_index, 1);
    }

    #[test]
    fn test_preferred_label_order() {
        let group = TrackGroup::new(
            "a",
            vec![
                aac(128_000).build_upon().label("Commentary").build(),
                aac(128_000).build_upon().label("Main").build(),
                aac(128_000).build_upon().label("Karaoke").build(),
            ],
        )
        .unwrap();
        let renderer = renderer();
        let renderers: Vec<&dyn RendererCapabilities> = vec![&renderer];
        let mapped = map(&renderers, groups(vec![group]));
        let params = Parameters::builder().preferred_audio_labels(["Main", "Commentary"]).build();
        let infos = track_infos(&mapped, &params);
        let comparator = audio_comparator(false, false, false);
        assert_eq!(
            comparator.deciding_step(&infos[1], &infos[0]),
            Some(("preferred_label_index", Ordering::Greater))
        );
        assert_eq!(
            comparator.deciding_step(&infos[2], &infos[0]),
            Some(("preferred_label_index", Ordering::Less))
        );
    }

    #[test]
    fn test_role_flags_exact_beats_superset_beats_none() {
        let with_roles = |roles: RoleFlags| aac(128_000).build_upon().role_flags(roles).build();
        let group = TrackGroup::new(
            "a",
            vec![
                with_roles(RoleFlags::MAIN),
                with_roles(RoleFlags::MAIN | RoleFlags::DESCRIBES_VIDEO),
                with_roles(RoleFlags::DESCRIBES_VIDEO),
            ],
        )
        .unwrap();
        let renderer = renderer();
        let renderers: Vec<&dyn RendererCapabilities> = vec![&renderer];
        let mapped = map(&renderers, groups(vec![group]));
        let params = Parameters::builder()
            .preferred_audio_role_flags(RoleFlags::DESCRIBES_VIDEO)
            .build();
        let infos = track_infos(&mapped, &params);
        let comparator = audio_comparator(false, false, false);
        assert_eq!(
            comparator.deciding_step(&infos[2], &infos[1]),
            Some(("preferred_role_flags", Ordering::Greater))
        );
        assert_eq!(
            comparator.deciding_step(&infos[1], &infos[0]),
            Some(("preferred_role_flags", Ordering::Greater))
        );
    }

    #[test]
    fn test_preferred_mime_type_order() {
        let renderer = renderer().with_decoder(DeclaredDecoder::new(mime::AUDIO_OPUS));
        let with_mime = |mime_type: &str| aac(128_000).build_upon().sample_mime_type(mime_type).build();
        let group = TrackGroup::new(
            "a",
            vec![aac(128_000), with_mime(mime::AUDIO_E_AC3_JOC), with_mime(mime::AUDIO_OPUS)],
        )
        .unwrap();
        let renderers: Vec<&dyn RendererCapabilities> = vec![&renderer];
        let mapped = map(&renderers, groups(vec![group]));
        let params = Parameters::builder()
            .preferred_audio_mime_types([mime::AUDIO_E_AC3_JOC, mime::AUDIO_AAC])
            .build();
        let infos = track_infos(&mapped, &params);
        let comparator = audio_comparator(false, false, false);
        assert_eq!(
            comparator.deciding_step(&infos[1], &infos[0]),
            Some(("preferred_mime_type_index", Ordering::Greater))
        );
        assert_eq!(
            comparator.deciding_step(&infos[2], &infos[0]),
            Some(("preferred_mime_type_index", Ordering::Less))
        );
    }

    #[test]
    fn test_mixed_sample_rates_split_adaptive_sets() {
        let group = TrackGroup::new(
            "a",
            vec![aac(128_000), aac(64_000).build_upon().sample_rate(48_000).build()],
        )
        .unwrap();
        let renderer = renderer();
        let renderers: Vec<&dyn RendererCapabilities> = vec![&renderer];
        let mapped = map(&renderers, groups(vec![group]));

        let params = Parameters::default();
        let infos = track_infos(&mapped, &params);
        assert!(!infos[0].is_compatible_for_adaptation_with(&infos[1]));
        let definition = select_audio(&context(&mapped, &params)).unwrap();
        assert_eq!(definition.tracks, vec![1]);

        let params = Parameters::builder()
            .allow_audio_mixed_sample_rate_adaptiveness(true)
            .build();
        let infos = track_infos(&mapped, &params);
        assert!(infos[0].is_compatible_for_adaptation_with(&infos[1]));
        let definition = select_audio(&context(&mapped, &params)).unwrap();
        assert_eq!(definition.tracks, vec![0, 1]);
    }

    #[test]
    fn test_mixed_decoder_support_splits_adaptive_sets() {
        let renderer = DeclaredRendererCapabilities::new("audio", TrackType::Audio)
            .with_decoder(DeclaredDecoder::new(mime::AUDIO_AAC))
            .with_decoder(DeclaredDecoder::new(mime::AUDIO_E_AC3).with_decoder(DecoderSupport::Fallback))
            .with_mixed_mime_type_adaptation(AdaptiveSupport::Seamless);
        let eac3 = aac(256_000).build_upon().sample_mime_type(mime::AUDIO_E_AC3).build();
        let group = TrackGroup::new("a", vec![aac(128_000), eac3]).unwrap();
        let renderers: Vec<&dyn RendererCapabilities> = vec![&renderer];
        let mapped = map(&renderers, groups(vec![group]));

        let params = Parameters::builder().allow_audio_mixed_mime_type_adaptiveness(true).build();
        let infos = track_infos(&mapped, &params);
        assert!(!infos[0].is_compatible_for_adaptation_with(&infos[1]));
        assert_eq!(
            audio_comparator(false, false, false).deciding_step(&infos[0], &infos[1]),
            Some(("primary_decoder", Ordering::Greater))
        );

        let params = params
            .build_upon()
            .allow_audio_mixed_decoder_support_adaptiveness(true)
            .build();
        let infos = track_infos(&mapped, &params);
        assert!(infos[0].is_compatible_for_adaptation_with(&infos[1]));
        let definition = select_audio(&context(&mapped, &params)).unwrap();
        assert_eq!(definition.tracks, vec![0, 1]);
    }
}
