//! Renderer capabilities declared as data
//!
//! Hosts that probe their decoders up front (and the `select-tracks` CLI)
//! describe renderers declaratively: a track type plus one entry per decoder
//! the renderer can use. The first decoder whose MIME type matches a format
//! decides how that format is classified.

use serde::{Deserialize, Serialize};

use super::constraints::DecoderLimits;
use super::{
    AdaptiveSupport, AudioOffloadSupport, Capabilities, DecoderSupport, FormatSupport,
    RendererCapabilities,
};
use crate::format::{Format, TrackType};
use crate::Error;

/// One decoder available to a declared renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredDecoder {
    /// Sample MIME type the decoder handles
    pub mime_type: String,

    /// Limits beyond which formats exceed the decoder's capabilities
    #[serde(default)]
    pub limits: DecoderLimits,

    /// Adaptive switching support
    #[serde(default = "default_adaptive_support")]
    pub adaptive: AdaptiveSupport,

    /// Decoder tier
    #[serde(default = "default_decoder_support")]
    pub decoder: DecoderSupport,

    /// Hardware acceleration
    #[serde(default)]
    pub hardware_accelerated: bool,

    /// Tunneling support
    #[serde(default)]
    pub tunneling: bool,

    /// Audio offload support
    #[serde(default)]
    pub offload: AudioOffloadSupport,
}

fn default_adaptive_support() -> AdaptiveSupport {
    AdaptiveSupport::Seamless
}

fn default_decoder_support() -> DecoderSupport {
    DecoderSupport::Primary
}

impl DeclaredDecoder {
    /// A primary, seamless, software decoder without limits.
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            limits: DecoderLimits::default(),
            adaptive: default_adaptive_support(),
            decoder: default_decoder_support(),
            hardware_accelerated: false,
            tunneling: false,
            offload: AudioOffloadSupport::default(),
        }
    }

    pub fn with_limits(mut self, limits: DecoderLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_adaptive(mut self, adaptive: AdaptiveSupport) -> Self {
        self.adaptive = adaptive;
        self
    }

    pub fn with_decoder(mut self, decoder: DecoderSupport) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_hardware_acceleration(mut self, hardware_accelerated: bool) -> Self {
        self.hardware_accelerated = hardware_accelerated;
        self
    }

    pub fn with_tunneling(mut self, tunneling: bool) -> Self {
        self.tunneling = tunneling;
        self
    }

    pub fn with_offload(mut self, offload: AudioOffloadSupport) -> Self {
        self.offload = offload;
        self
    }

    fn matches(&self, format: &Format) -> bool {
        format
            .sample_mime_type
            .as_deref()
            .is_some_and(|mime| mime.eq_ignore_ascii_case(&self.mime_type))
    }

    fn classify(&self, format: &Format) -> Capabilities {
        let format_support = if self.limits.admits(format) {
            FormatSupport::Handled
        } else {
            FormatSupport::ExceedsCapabilities
        };
        Capabilities::with_support(format_support)
            .adaptive(self.adaptive)
            .decoder(self.decoder)
            .hardware(self.hardware_accelerated)
            .tunneling(self.tunneling)
            .offload(self.offload)
    }
}

/// A renderer whose capabilities are fully described by data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredRendererCapabilities {
    /// Renderer name
    pub name: String,

    /// Track type the renderer plays
    pub track_type: TrackType,

    /// Decoders in priority order
    #[serde(default)]
    pub decoders: Vec<DeclaredDecoder>,

    /// Support for adapting across MIME types
    #[serde(default = "default_mixed_mime_type_adaptation")]
    pub mixed_mime_type_adaptation: AdaptiveSupport,
}

fn default_mixed_mime_type_adaptation() -> AdaptiveSupport {
    AdaptiveSupport::NotSupported
}

impl DeclaredRendererCapabilities {
    /// A renderer with no decoders.
    pub fn new(name: impl Into<String>, track_type: TrackType) -> Self {
        Self {
            name: name.into(),
            track_type,
            decoders: Vec::new(),
            mixed_mime_type_adaptation: default_mixed_mime_type_adaptation(),
        }
    }

    pub fn with_decoder(mut self, decoder: DeclaredDecoder) -> Self {
        self.decoders.push(decoder);
        self
    }

    pub fn with_mixed_mime_type_adaptation(mut self, support: AdaptiveSupport) -> Self {
        self.mixed_mime_type_adaptation = support;
        self
    }
}

impl RendererCapabilities for DeclaredRendererCapabilities {
    fn name(&self) -> &str {
        &self.name
    }

    fn track_type(&self) -> TrackType {
        self.track_type
    }

    fn supports_format(&self, format: &Format) -> Result<Capabilities, Error> {
        Ok(self
            .decoders
            .iter()
            .find(|decoder| decoder.matches(format))
            .map(|decoder| decoder.classify(format))
            .unwrap_or_else(|| Capabilities::with_support(FormatSupport::UnsupportedSubtype)))
    }

    fn supports_mixed_mime_type_adaptation(&self) -> AdaptiveSupport {
        self.mixed_mime_type_adaptation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{classify, ConstraintValue};
    use crate::mime;

    fn stereo_aac_renderer() -> DeclaredRendererCapabilities {
        DeclaredRendererCapabilities::new("audio", TrackType::Audio).with_decoder(
            DeclaredDecoder::new(mime::AUDIO_AAC).with_limits(DecoderLimits {
                channels: Some(ConstraintValue::at_most(2)),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn test_declared_renderer_classification() {
        let renderer = stereo_aac_renderer();
        let stereo = Format::builder()
            .sample_mime_type(mime::AUDIO_AAC)
            .channel_count(2)
            .build();
        let surround = Format::builder()
            .sample_mime_type(mime::AUDIO_AAC)
            .channel_count(6)
            .build();
        let opus = Format::builder().sample_mime_type(mime::AUDIO_OPUS).build();

        assert_eq!(classify(&stereo, &renderer, 0).format_support, FormatSupport::Handled);
        assert_eq!(
            classify(&surround, &renderer, 0).format_support,
            FormatSupport::ExceedsCapabilities
        );
        assert_eq!(
            classify(&opus, &renderer, 0).format_support,
            FormatSupport::UnsupportedSubtype
        );
    }

    #[test]
    fn test_declared_renderer_from_json_uses_defaults() {
        let json = r#"{
            "name": "video",
            "track_type": "video",
            "decoders": [{"mime_type": "video/avc", "hardware_accelerated": true}]
        }"#;
        let renderer: DeclaredRendererCapabilities = serde_json::from_str(json).unwrap();
        assert_eq!(renderer.decoders[0].adaptive, AdaptiveSupport::Seamless);
        assert_eq!(renderer.decoders[0].decoder, DecoderSupport::Primary);
        assert_eq!(
            renderer.supports_mixed_mime_type_adaptation(),
            AdaptiveSupport::NotSupported
        );
    }
}
