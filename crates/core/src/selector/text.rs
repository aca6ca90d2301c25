//! Text track selection
//!
//! A text track is only selected when some rule asks for it: a preferred
//! language, a preferred role (without language preferences), the default
//! flag, or the forced flag together with a track language matching the
//! selected audio. With `select_undetermined_text_language` a track without
//! a determined language also qualifies, ranked below every other rule. With
//! `select_text_by_default` any supported track qualifies as a fallback,
//! ranked below rule-matched tracks.

use std::cmp::Ordering;

use crate::comparator::Lexicographic;
use crate::format::{RoleFlags, SelectionFlags, TrackType};
use crate::language;
use crate::selector::candidate::{
    preference_index, select_tracks_for_type, Definition, Eligibility, GroupContext, TrackInfo,
};
use crate::selector::Context;

pub(crate) struct TextTrackInfo {
    track_index: usize,
    eligibility: Eligibility,
    within_renderer_capabilities: bool,
    matched_by_rule: bool,
    preferred_language_index: usize,
    preferred_language_score: u8,
    preferred_role_flags_score: u32,
    preferred_label_index: usize,
    is_default: bool,
    is_forced: bool,
    undetermined_fallback: bool,
    audio_language_score: u8,
    has_caption_role_flags: bool,
}

impl TextTrackInfo {
    fn for_group(ctx: &Context<'_>, group: &GroupContext<'_>, selected_audio_language: Option<&str>) -> Vec<Self> {
        let params = ctx.params;
        let audio_language_undetermined = language::undetermined_to_none(selected_audio_language).is_none();

        group
            .group
            .formats()
            .iter()
            .zip(group.capabilities)
            .enumerate()
            .map(|(track_index, (format, capabilities))| {
                let flags = format.selection_flags & !params.ignored_text_selection_flags;
                let is_default = flags.contains(SelectionFlags::DEFAULT);
                let is_forced = flags.contains(SelectionFlags::FORCED);
                let (preferred_language_index, preferred_language_score) = language::best_preference_match(
                    format.language.as_deref(),
                    &params.preferred_text_languages,
                    false,
                );
                let undetermined_fallback = params.select_undetermined_text_language
                    && preferred_language_score == 0
                    && language::undetermined_to_none(format.language.as_deref()).is_none();
                let preferred_role_flags_score = format.role_flags.match_score(params.preferred_text_role_flags);
                let audio_language_score = language::match_score(
                    format.language.as_deref(),
                    selected_audio_language,
                    audio_language_undetermined,
                );
                let matched_by_rule = preferred_language_score > 0
                    || (params.preferred_text_languages.is_empty() && preferred_role_flags_score > 0)
                    || is_default
                    || (is_forced && audio_language_score > 0)
                    || undetermined_fallback;
                let eligibility = if capabilities
                    .format_support
                    .is_supported(params.exceed_renderer_capabilities_if_necessary)
                    && (matched_by_rule || params.select_text_by_default)
                {
                    Eligibility::Fixed
                } else {
                    Eligibility::No
                };

                TextTrackInfo {
                    track_index,
                    eligibility,
                    within_renderer_capabilities: capabilities.format_support.is_supported(false),
                    matched_by_rule,
                    preferred_language_index,
                    preferred_language_score,
                    preferred_role_flags_score,
                    preferred_label_index: preference_index(format.label.as_deref(), &params.preferred_text_labels),
                    is_default,
                    is_forced,
                    undetermined_fallback,
                    audio_language_score,
                    has_caption_role_flags: format
                        .role_flags
                        .intersects(RoleFlags::CAPTION | RoleFlags::DESCRIBES_MUSIC_AND_SOUND),
                }
            })
            .collect()
    }
}

impl TrackInfo for TextTrackInfo {
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

pub(crate) fn text_comparator<'a>() -> Lexicographic<'a, TextTrackInfo> {
    Lexicographic::new()
        .then_prefer("within_renderer_capabilities", |t: &TextTrackInfo| t.within_renderer_capabilities)
        .then_prefer("matched_by_rule", |t: &TextTrackInfo| t.matched_by_rule)
        .then_by_key_reversed("preferred_language_index", |t: &TextTrackInfo| t.preferred_language_index)
        .then_by_key("preferred_language_score", |t: &TextTrackInfo| t.preferred_language_score)
        .then_prefer("default_flag", |t: &TextTrackInfo| t.is_default)
        .then_by_key("preferred_role_flags", |t: &TextTrackInfo| t.preferred_role_flags_score)
        .then_by_key_reversed("preferred_label_index", |t: &TextTrackInfo| t.preferred_label_index)
        .then_prefer("undetermined_fallback", |t: &TextTrackInfo| t.undetermined_fallback)
        // Forced tracks only win when no language preference matched; they
        // usually duplicate content already burned into the video.
        .then_with("forced_flag", |a: &TextTrackInfo, b: &TextTrackInfo| {
            let ordering = a.is_forced.cmp(&b.is_forced);
            if a.preferred_language_score == 0 && !a.undetermined_fallback && a.matched_by_rule {
                ordering
            } else {
                ordering.reverse()
            }
        })
        .then_by_key("audio_language_match", |t: &TextTrackInfo| t.audio_language_score)
        .then_with("caption_role", |a: &TextTrackInfo, b: &TextTrackInfo| {
            if a.preferred_role_flags_score == 0 {
                b.has_caption_role_flags.cmp(&a.has_caption_role_flags)
            } else {
                Ordering::Equal
            }
        })
}

/// Pick the best text selection across all text renderers.
pub(crate) fn select_text(ctx: &Context<'_>, selected_audio_language: Option<&str>) -> Option<Definition> {
    if ctx.params.audio_offload_preferences.is_required() {
        return None;
    }
    let comparator = text_comparator();
    select_tracks_for_type(
        TrackType::Text,
        ctx.mapped,
        |group| TextTrackInfo::for_group(ctx, group, selected_audio_language),
        |a, b| comparator.compare(a[0], b[0]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{DeclaredDecoder, DeclaredRendererCapabilities, RendererCapabilities};
    use crate::format::Format;
    use crate::mime;
    use crate::parameters::Parameters;
    use crate::selector::test_support::{context, groups, map};
    use crate::track_group::TrackGroup;

    fn vtt(id: &str, language: Option<&str>, flags: SelectionFlags) -> TrackGroup {
        let mut builder = Format::builder()
            .id(id)
            .sample_mime_type(mime::TEXT_VTT)
            .selection_flags(flags);
        if let Some(language) = language {
            builder = builder.language(language);
        }
        TrackGroup::new(id, vec![builder.build()]).unwrap()
    }

    fn vtt_format(id: &str, language: Option<&str>, flags: SelectionFlags) -> Format {
        vtt(id, language, flags).format(0).clone()
    }

    /// Track infos for one group holding `formats`.
    fn text_infos(formats: Vec<Format>, params: &Parameters) -> Vec<TextTrackInfo> {
        let renderer = DeclaredRendererCapabilities::new("text", TrackType::Text)
            .with_decoder(DeclaredDecoder::new(mime::TEXT_VTT));
        let renderers: Vec<&dyn RendererCapabilities> = vec![&renderer];
        let mapped = map(&renderers, groups(vec![TrackGroup::new("text", formats).unwrap()]));
        let ctx = context(&mapped, params);
        TextTrackInfo::for_group(
            &ctx,
            &GroupContext {
                renderer_index: 0,
                group: &mapped.track_groups(0).groups()[0],
                capabilities: &mapped.renderer_capabilities(0)[0],
            },
            None,
        )
    }

    fn select(group_list: Vec<TrackGroup>, params: &Parameters, audio_language: Option<&str>) -> Option<usize> {
        let renderer = DeclaredRendererCapabilities::new("text", TrackType::Text)
            .with_decoder(DeclaredDecoder::new(mime::TEXT_VTT));
        let renderers: Vec<&dyn RendererCapabilities> = vec![&renderer];
        let mapped = map(&renderers, groups(group_list));
        select_text(&context(&mapped, params), audio_language).map(|d| d.group_index)
    }

    #[test]
    fn test_no_rule_no_selection() {
        let tracks = vec![vtt("plain", Some("en"), SelectionFlags::empty())];
        assert_eq!(select(tracks.clone(), &Parameters::default(), None), None);

        let params = Parameters::builder().select_text_by_default(true).build();
        assert_eq!(select(tracks, &params, None), Some(0));
    }

    #[test]
    fn test_forced_default_wins_without_preferences() {
        let tracks = vec![
            vtt("none", None, SelectionFlags::empty()),
            vtt("default", None, SelectionFlags::DEFAULT),
            vtt("forced", None, SelectionFlags::FORCED),
            vtt("forced_default", None, SelectionFlags::FORCED | SelectionFlags::DEFAULT),
        ];
        assert_eq!(select(tracks, &Parameters::default(), None), Some(3));
    }

    #[test]
    fn test_forced_track_follows_audio_language() {
        let tracks = vec![
            vtt("forced_en", Some("en"), SelectionFlags::FORCED),
            vtt("forced_de", Some("de"), SelectionFlags::FORCED),
        ];
        assert_eq!(select(tracks.clone(), &Parameters::default(), Some("de")), Some(1));
        assert_eq!(select(tracks, &Parameters::default(), Some("fr")), None);
    }

    #[test]
    fn test_preferred_language_prefers_non_forced() {
        let tracks = vec![
            vtt("forced", Some("fr"), SelectionFlags::FORCED),
            vtt("full", Some("fr"), SelectionFlags::empty()),
        ];
        let params = Parameters::builder().preferred_text_languages(["fr"]).build();
        assert_eq!(select(tracks, &params, None), Some(1));
    }

    #[test]
    fn test_ignored_flags_mask_default() {
        let tracks = vec![vtt("default", Some("en"), SelectionFlags::DEFAULT)];
        let params = Parameters::builder()
            .ignored_text_selection_flags(SelectionFlags::DEFAULT)
            .build();
        assert_eq!(select(tracks, &params, None), None);
    }

    #[test]
    fn test_undetermined_language_fallback() {
        let tracks = vec![vtt("und", Some("und"), SelectionFlags::empty())];
        let params = Parameters::builder().preferred_text_languages(["ja"]).build();
        assert_eq!(select(tracks.clone(), &params, None), None);

        let params = params.build_upon().select_undetermined_text_language(true).build();
        assert_eq!(select(tracks, &params, None), Some(0));
    }

    #[test]
    fn test_default_track_beats_undetermined_fallback() {
        let tracks = vec![
            vtt("und", None, SelectionFlags::empty()),
            vtt("default", Some("en"), SelectionFlags::DEFAULT),
        ];
        let params = Parameters::builder()
            .preferred_text_languages(["ja"])
            .select_undetermined_text_language(true)
            .build();
        assert_eq!(select(tracks.clone(), &params, None), Some(1));

        let params = Parameters::builder().select_undetermined_text_language(true).build();
        assert_eq!(select(tracks, &params, None), Some(1));
    }

    #[test]
    fn test_undetermined_fallback_ranks_below_default_flag() {
        let infos = text_infos(
            vec![
                vtt_format("und", Some("und"), SelectionFlags::empty()),
                vtt_format("default", Some("en"), SelectionFlags::DEFAULT),
            ],
            &Parameters::builder().select_undetermined_text_language(true).build(),
        );
        assert!(infos[0].matched_by_rule);
        assert_eq!(infos[0].preferred_language_score, 0);
        assert_eq!(
            text_comparator().deciding_step(&infos[1], &infos[0]),
            Some(("default_flag", Ordering::Greater))
        );
    }

    #[test]
    fn test_preferred_label_order() {
        let formats = vec![
            vtt_format("b", Some("en"), SelectionFlags::empty()).build_upon().label("Signs").build(),
            vtt_format("a", Some("en"), SelectionFlags::empty()).build_upon().label("Full").build(),
            vtt_format("c", Some("en"), SelectionFlags::empty()).build_upon().label("SDH").build(),
        ];
        let params = Parameters::builder().preferred_text_labels(["Full", "Signs"]).build();
        let infos = text_infos(formats, &params);
        let comparator = text_comparator();
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
    fn test_rule_matched_beats_fallback() {
        let tracks = vec![
            vtt("plain", Some("en"), SelectionFlags::empty()),
            vtt("default", Some("en"), SelectionFlags::DEFAULT),
        ];
        let params = Parameters::builder().select_text_by_default(true).build();
        assert_eq!(select(tracks, &params, None), Some(1));
    }
}
