//! Mapping of track groups to renderers
//!
//! Every group is assigned to at most one renderer before selection runs:
//! the renderer with the best support for any of the group's tracks. An
//! earlier renderer wins ties, except that metadata groups prefer a renderer
//! that has no group yet so that several metadata streams can be consumed in
//! parallel. Groups no renderer supports at all stay unmapped.

use serde::Serialize;

use crate::capabilities::{classify, AdaptiveSupport, Capabilities, FormatSupport, RendererCapabilities};
use crate::format::TrackType;
use crate::track_group::{TrackGroup, TrackGroupArray};

/// Groups and per-track capabilities, per renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedTrackInfo {
    renderer_names: Vec<String>,
    renderer_types: Vec<TrackType>,
    renderer_track_groups: Vec<TrackGroupArray>,
    /// `[renderer][group][track]`
    renderer_capabilities: Vec<Vec<Vec<Capabilities>>>,
    renderer_mixed_mime_type_adaptation: Vec<AdaptiveSupport>,
    unmapped_track_groups: TrackGroupArray,
}

impl MappedTrackInfo {
    /// Map `groups` onto `renderers`, querying each renderer once per track.
    pub fn build(renderers: &[&dyn RendererCapabilities], groups: &TrackGroupArray) -> Self {
        let renderer_count = renderers.len();
        let mut assigned: Vec<Vec<TrackGroup>> = vec![Vec::new(); renderer_count];
        let mut assigned_capabilities: Vec<Vec<Vec<Capabilities>>> = vec![Vec::new(); renderer_count];
        let mut unmapped = Vec::new();

        for group in groups {
            // [renderer][track]
            let capabilities: Vec<Vec<Capabilities>> = renderers
                .iter()
                .enumerate()
                .map(|(renderer_index, renderer)| {
                    group
                        .formats()
                        .iter()
                        .map(|format| classify(format, *renderer, renderer_index))
                        .collect()
                })
                .collect();

            let prefer_unassociated = group.track_type() == TrackType::Metadata;
            let mut best: Option<usize> = None;
            let mut best_support = FormatSupport::UnsupportedType;
            let mut best_is_unassociated = true;
            for (renderer_index, per_track) in capabilities.iter().enumerate() {
                let support = per_track
                    .iter()
                    .map(|c| c.format_support)
                    .max()
                    .unwrap_or(FormatSupport::UnsupportedType);
                let is_unassociated = assigned[renderer_index].is_empty();
                if support > best_support
                    || (support == best_support
                        && best.is_some()
                        && prefer_unassociated
                        && !best_is_unassociated
                        && is_unassociated)
                {
                    best = Some(renderer_index);
                    best_support = support;
                    best_is_unassociated = is_unassociated;
                }
            }

            match best {
                Some(renderer_index) => {
                    tracing::debug!(
                        "Mapped group '{}' ({}) to renderer {} ({})",
                        group.id(),
                        group.track_type(),
                        renderer_index,
                        renderers[renderer_index].name()
                    );
                    assigned[renderer_index].push(group.clone());
                    assigned_capabilities[renderer_index]
                        .push(capabilities.into_iter().nth(renderer_index).unwrap_or_default());
                }
                None => {
                    tracing::debug!("Group '{}' ({}) is unmapped", group.id(), group.track_type());
                    unmapped.push(group.clone());
                }
            }
        }

        Self {
            renderer_names: renderers.iter().map(|r| r.name().to_string()).collect(),
            renderer_types: renderers.iter().map(|r| r.track_type()).collect(),
            renderer_track_groups: assigned.into_iter().map(TrackGroupArray::new).collect(),
            renderer_capabilities: assigned_capabilities,
            renderer_mixed_mime_type_adaptation: renderers
                .iter()
                .map(|r| r.supports_mixed_mime_type_adaptation())
                .collect(),
            unmapped_track_groups: TrackGroupArray::new(unmapped),
        }
    }

    pub fn renderer_count(&self) -> usize {
        self.renderer_types.len()
    }

    pub fn renderer_name(&self, renderer_index: usize) -> &str {
        &self.renderer_names[renderer_index]
    }

    pub fn renderer_type(&self, renderer_index: usize) -> TrackType {
        self.renderer_types[renderer_index]
    }

    /// Groups mapped to the renderer at `renderer_index`.
    pub fn track_groups(&self, renderer_index: usize) -> &TrackGroupArray {
        &self.renderer_track_groups[renderer_index]
    }

    /// Per-track capabilities of every group mapped to a renderer.
    pub fn renderer_capabilities(&self, renderer_index: usize) -> &[Vec<Capabilities>] {
        &self.renderer_capabilities[renderer_index]
    }

    pub fn capabilities(&self, renderer_index: usize, group_index: usize, track_index: usize) -> &Capabilities {
        &self.renderer_capabilities[renderer_index][group_index][track_index]
    }

    pub fn track_support(&self, renderer_index: usize, group_index: usize, track_index: usize) -> FormatSupport {
        self.capabilities(renderer_index, group_index, track_index).format_support
    }

    pub fn mixed_mime_type_adaptation_support(&self, renderer_index: usize) -> AdaptiveSupport {
        self.renderer_mixed_mime_type_adaptation[renderer_index]
    }

    pub fn unmapped_track_groups(&self) -> &TrackGroupArray {
        &self.unmapped_track_groups
    }

    /// Whether any renderer of `track_type` has groups mapped to it.
    pub fn has_mapped_tracks(&self, track_type: TrackType) -> bool {
        (0..self.renderer_count())
            .any(|r| self.renderer_type(r) == track_type && !self.track_groups(r).is_empty())
    }

    /// Adaptive support for switching among the group's handled tracks
    /// (and tracks exceeding capabilities, if `include_exceeding`).
    pub fn adaptive_support_for_group(
        &self,
        renderer_index: usize,
        group_index: usize,
        include_exceeding: bool,
    ) -> AdaptiveSupport {
        let tracks: Vec<usize> = self.renderer_capabilities[renderer_index][group_index]
            .iter()
            .enumerate()
            .filter(|(_, c)| c.format_support.is_supported(include_exceeding))
            .map(|(index, _)| index)
            .collect();
        self.adaptive_support(renderer_index, group_index, &tracks)
    }

    /// Adaptive support for switching among `tracks` of one group: the
    /// weakest per-track tier, further limited by the renderer's mixed MIME
    /// type support when the tracks differ in MIME type.
    pub fn adaptive_support(&self, renderer_index: usize, group_index: usize, tracks: &[usize]) -> AdaptiveSupport {
        let group = &self.renderer_track_groups[renderer_index].groups()[group_index];
        let capabilities = &self.renderer_capabilities[renderer_index][group_index];
        let mut support = AdaptiveSupport::Seamless;
        let mut first_mime_type: Option<Option<&str>> = None;
        let mut multiple_mime_types = false;
        for &track in tracks {
            let mime_type = group.format(track).sample_mime_type.as_deref();
            match first_mime_type {
                None => first_mime_type = Some(mime_type),
                Some(first) => multiple_mime_types |= first != mime_type,
            }
            support = support.min(capabilities[track].adaptive_support);
        }
        if multiple_mime_types {
            support.min(self.renderer_mixed_mime_type_adaptation[renderer_index])
        } else {
            support
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{DeclaredDecoder, DeclaredRendererCapabilities};
    use crate::format::Format;
    use crate::mime;

    fn group(id: &str, mime_type: &str) -> TrackGroup {
        TrackGroup::new(id, vec![Format::builder().sample_mime_type(mime_type).build()]).unwrap()
    }

    #[test]
    fn test_groups_map_to_matching_renderers() {
        let video = DeclaredRendererCapabilities::new("video", TrackType::Video)
            .with_decoder(DeclaredDecoder::new(mime::VIDEO_H264));
        let audio = DeclaredRendererCapabilities::new("audio", TrackType::Audio)
            .with_decoder(DeclaredDecoder::new(mime::AUDIO_AAC));
        let renderers: Vec<&dyn RendererCapabilities> = vec![&video, &audio];
        let groups = TrackGroupArray::new(vec![
            group("a", mime::AUDIO_AAC),
            group("v", mime::VIDEO_H264),
            group("t", mime::TEXT_VTT),
        ]);

        let mapped = MappedTrackInfo::build(&renderers, &groups);
        assert_eq!(mapped.track_groups(0).len(), 1);
        assert_eq!(mapped.track_groups(0).groups()[0].id(), "v");
        assert_eq!(mapped.track_groups(1).groups()[0].id(), "a");
        assert_eq!(mapped.unmapped_track_groups().len(), 1);
        assert!(mapped.has_mapped_tracks(TrackType::Video));
    }

    #[test]
    fn test_unsupported_subtype_still_maps() {
        let audio = DeclaredRendererCapabilities::new("audio", TrackType::Audio)
            .with_decoder(DeclaredDecoder::new(mime::AUDIO_AAC));
        let renderers: Vec<&dyn RendererCapabilities> = vec![&audio];
        let groups = TrackGroupArray::new(vec![group("opus", mime::AUDIO_OPUS)]);
        let mapped = MappedTrackInfo::build(&renderers, &groups);
        assert_eq!(mapped.track_groups(0).len(), 1);
        assert_eq!(mapped.track_support(0, 0, 0), FormatSupport::UnsupportedSubtype);
    }

    #[test]
    fn test_metadata_prefers_unassociated_renderer() {
        let first = DeclaredRendererCapabilities::new("metadata-0", TrackType::Metadata)
            .with_decoder(DeclaredDecoder::new(mime::APPLICATION_ID3));
        let second = DeclaredRendererCapabilities::new("metadata-1", TrackType::Metadata)
            .with_decoder(DeclaredDecoder::new(mime::APPLICATION_ID3));
        let renderers: Vec<&dyn RendererCapabilities> = vec![&first, &second];
        let groups = TrackGroupArray::new(vec![
            group("id3-a", mime::APPLICATION_ID3),
            group("id3-b", mime::APPLICATION_ID3),
        ]);
        let mapped = MappedTrackInfo::build(&renderers, &groups);
        assert_eq!(mapped.track_groups(0).len(), 1);
        assert_eq!(mapped.track_groups(1).len(), 1);
    }

    #[test]
    fn test_mixed_mime_types_limit_adaptive_support() {
        let video = DeclaredRendererCapabilities::new("video", TrackType::Video)
            .with_decoder(DeclaredDecoder::new(mime::VIDEO_H264))
            .with_decoder(DeclaredDecoder::new(mime::VIDEO_H265));
        let renderers: Vec<&dyn RendererCapabilities> = vec![&video];
        let groups = TrackGroupArray::new(vec![TrackGroup::new(
            "v",
            vec![
                Format::builder().sample_mime_type(mime::VIDEO_H264).build(),
                Format::builder().sample_mime_type(mime::VIDEO_H265).build(),
            ],
        )
        .unwrap()]);
        let mapped = MappedTrackInfo::build(&renderers, &groups);
        assert_eq!(mapped.adaptive_support(0, 0, &[0]), AdaptiveSupport::Seamless);
        assert_eq!(mapped.adaptive_support(0, 0, &[0, 1]), AdaptiveSupport::NotSupported);
    }
}
