//! Renderer capability model
//!
//! Every `(format, renderer)` pair is classified into a [`Capabilities`]
//! value before selection runs. Renderers report what they can do through
//! the [`RendererCapabilities`] trait; [`classify`] wraps those reports so
//! that type mismatches and query failures become ordinary support levels.
//!
//! # Support levels
//!
//! [`FormatSupport`] is ordered from worst to best:
//!
//! `UnsupportedType < UnsupportedSubtype < ExceedsCapabilities < Handled`
//!
//! Only `Handled` tracks (and `ExceedsCapabilities` tracks when the
//! parameters allow exceeding renderer capabilities) are ever selected
//! automatically.

pub mod constraints;
pub mod declared;

use serde::{Deserialize, Serialize};

use crate::format::{Format, TrackType};
use crate::Error;

pub use constraints::{ConstraintValue, DecoderLimits};
pub use declared::{DeclaredDecoder, DeclaredRendererCapabilities};

// =============================================================================
// Support Tiers
// =============================================================================

/// How well a renderer supports a format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FormatSupport {
    /// The renderer does not handle this media type at all
    UnsupportedType,
    /// The renderer handles the media type but not this codec/subtype
    UnsupportedSubtype,
    /// The renderer handles the codec but the format exceeds its limits
    /// (resolution, channel count, ...). Playback may still work.
    ExceedsCapabilities,
    /// The renderer handles the format
    Handled,
}

impl FormatSupport {
    /// Whether a track with this support may be selected.
    pub fn is_supported(self, allow_exceeds_capabilities: bool) -> bool {
        self == FormatSupport::Handled
            || (allow_exceeds_capabilities && self == FormatSupport::ExceedsCapabilities)
    }
}

/// Whether a renderer can switch between formats of one group during playback.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveSupport {
    /// No adaptation
    NotSupported,
    /// Adaptation with a visible or audible discontinuity
    NotSeamless,
    /// Seamless adaptation
    Seamless,
}

impl AdaptiveSupport {
    /// Whether this tier satisfies the adaptiveness the parameters require.
    ///
    /// Seamless support always qualifies; non-seamless support qualifies only
    /// when non-seamless adaptation is allowed.
    pub fn allows(self, allow_non_seamless: bool) -> bool {
        match self {
            AdaptiveSupport::Seamless => true,
            AdaptiveSupport::NotSeamless => allow_non_seamless,
            AdaptiveSupport::NotSupported => false,
        }
    }
}

/// Which decoder would play a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoderSupport {
    /// The renderer's primary decoder for the MIME type
    Primary,
    /// A fallback decoder
    Fallback,
    /// A fallback decoder chosen for a related MIME type (for example a
    /// Dolby Vision stream decoded as its base-layer codec)
    FallbackMimeType,
}

/// Offload playback support reported for an audio format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioOffloadSupport {
    /// Offloaded playback is possible
    pub supported: bool,
    /// Offloaded playback preserves gapless transitions
    pub gapless_supported: bool,
    /// Offloaded playback supports playback speed changes
    pub speed_change_supported: bool,
}

// =============================================================================
// Capabilities
// =============================================================================

/// Classification of one format on one renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    /// Support level
    pub format_support: FormatSupport,
    /// Adaptive switching support for this format
    pub adaptive_support: AdaptiveSupport,
    /// Decoder tier
    pub decoder_support: DecoderSupport,
    /// Whether decoding is hardware accelerated
    pub hardware_accelerated: bool,
    /// Whether tunneled playback is supported
    pub tunneling_supported: bool,
    /// Audio offload support (always unsupported for non-audio formats)
    pub offload: AudioOffloadSupport,
}

impl Capabilities {
    /// Capabilities for a format the renderer handles, with default tiers.
    pub fn handled() -> Self {
        Self::with_support(FormatSupport::Handled)
    }

    /// Capabilities for a format of a type the renderer does not handle.
    pub fn unsupported_type() -> Self {
        Self::with_support(FormatSupport::UnsupportedType)
    }

    /// Capabilities with the given support level and default tiers: seamless
    /// adaptation, primary software decoder, no tunneling, no offload.
    pub fn with_support(format_support: FormatSupport) -> Self {
        Self {
            format_support,
            adaptive_support: AdaptiveSupport::Seamless,
            decoder_support: DecoderSupport::Primary,
            hardware_accelerated: false,
            tunneling_supported: false,
            offload: AudioOffloadSupport::default(),
        }
    }

    pub fn adaptive(mut self, adaptive_support: AdaptiveSupport) -> Self {
        self.adaptive_support = adaptive_support;
        self
    }

    pub fn decoder(mut self, decoder_support: DecoderSupport) -> Self {
        self.decoder_support = decoder_support;
        self
    }

    pub fn hardware(mut self, hardware_accelerated: bool) -> Self {
        self.hardware_accelerated = hardware_accelerated;
        self
    }

    pub fn tunneling(mut self, tunneling_supported: bool) -> Self {
        self.tunneling_supported = tunneling_supported;
        self
    }

    pub fn offload(mut self, offload: AudioOffloadSupport) -> Self {
        self.offload = offload;
        self
    }

    /// Whether the primary decoder would be used.
    pub fn uses_primary_decoder(&self) -> bool {
        self.decoder_support == DecoderSupport::Primary
    }
}

// =============================================================================
// Renderer Capabilities Trait
// =============================================================================

/// Capability provider for one renderer.
///
/// Implementations are queried fresh on every selection call and must not
/// cache answers across capability changes.
pub trait RendererCapabilities {
    /// Human readable renderer name, used in logs.
    fn name(&self) -> &str;

    /// Media type this renderer plays.
    fn track_type(&self) -> TrackType;

    /// Classify a format.
    ///
    /// Errors (for example a failed codec query) are treated as "no
    /// candidate" for this renderer only.
    fn supports_format(&self, format: &Format) -> Result<Capabilities, Error>;

    /// Support for adapting between formats with different MIME types.
    fn supports_mixed_mime_type_adaptation(&self) -> AdaptiveSupport {
        AdaptiveSupport::NotSupported
    }
}

/// Classify `format` on `renderer`.
///
/// A format whose track type differs from the renderer's type is always
/// [`FormatSupport::UnsupportedType`]. Query failures are logged and also
/// yield `UnsupportedType`.
pub fn classify(
    format: &Format,
    renderer: &dyn RendererCapabilities,
    renderer_index: usize,
) -> Capabilities {
    if format.track_type() != renderer.track_type() {
        return Capabilities::unsupported_type();
    }
    match renderer.supports_format(format) {
        Ok(capabilities) => capabilities,
        Err(e) => {
            tracing::warn!(
                "Capability query failed on renderer {} ({}) for {:?}: {}",
                renderer_index,
                renderer.name(),
                format.sample_mime_type,
                e
            );
            Capabilities::unsupported_type()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime;

    struct FailingRenderer;

    impl RendererCapabilities for FailingRenderer {
        fn name(&self) -> &str {
            "failing"
        }

        fn track_type(&self) -> TrackType {
            TrackType::Audio
        }

        fn supports_format(&self, _format: &Format) -> Result<Capabilities, Error> {
            Err(Error::CapabilityQuery {
                renderer: 0,
                reason: "codec list unavailable".to_string(),
            })
        }
    }

    struct AcceptAllAudio;

    impl RendererCapabilities for AcceptAllAudio {
        fn name(&self) -> &str {
            "audio"
        }

        fn track_type(&self) -> TrackType {
            TrackType::Audio
        }

        fn supports_format(&self, _format: &Format) -> Result<Capabilities, Error> {
            Ok(Capabilities::handled())
        }
    }

    #[test]
    fn test_support_level_ordering() {
        assert!(FormatSupport::Handled > FormatSupport::ExceedsCapabilities);
        assert!(FormatSupport::ExceedsCapabilities > FormatSupport::UnsupportedSubtype);
        assert!(FormatSupport::UnsupportedSubtype > FormatSupport::UnsupportedType);
    }

    #[test]
    fn test_is_supported() {
        assert!(FormatSupport::Handled.is_supported(false));
        assert!(!FormatSupport::ExceedsCapabilities.is_supported(false));
        assert!(FormatSupport::ExceedsCapabilities.is_supported(true));
        assert!(!FormatSupport::UnsupportedSubtype.is_supported(true));
    }

    #[test]
    fn test_adaptive_allows() {
        assert!(AdaptiveSupport::Seamless.allows(false));
        assert!(!AdaptiveSupport::NotSeamless.allows(false));
        assert!(AdaptiveSupport::NotSeamless.allows(true));
        assert!(!AdaptiveSupport::NotSupported.allows(true));
    }

    #[test]
    fn test_classify_type_mismatch_is_unsupported_type() {
        let video = Format::builder().sample_mime_type(mime::VIDEO_H264).build();
        let caps = classify(&video, &AcceptAllAudio, 0);
        assert_eq!(caps.format_support, FormatSupport::UnsupportedType);

        let audio = Format::builder().sample_mime_type(mime::AUDIO_AAC).build();
        let caps = classify(&audio, &AcceptAllAudio, 0);
        assert_eq!(caps.format_support, FormatSupport::Handled);
    }

    #[test]
    fn test_classify_query_failure_is_unsupported_type() {
        let audio = Format::builder().sample_mime_type(mime::AUDIO_AAC).build();
        let caps = classify(&audio, &FailingRenderer, 3);
        assert_eq!(caps.format_support, FormatSupport::UnsupportedType);
    }
}
