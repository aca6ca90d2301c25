//! Device profile
//!
//! Facts about the playback device that influence selection but are not
//! renderer capabilities: the physical display size (for viewport limiting)
//! and the audio output's ability to spatialize multichannel audio.

use serde::{Deserialize, Serialize};

use crate::format::Format;
use crate::mime;

/// Physical display size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

/// Audio spatializer state of the output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spatializer {
    /// The device can spatialize at all
    pub available: bool,
    /// Spatialization is switched on
    pub enabled: bool,
    /// Largest channel count the spatializer accepts
    pub max_channel_count: u32,
}

impl Spatializer {
    /// Whether the spatializer is usable for any content.
    pub fn is_active(&self) -> bool {
        self.available && self.enabled
    }

    /// Whether this format can be spatialized.
    pub fn can_spatialize(&self, format: &Format) -> bool {
        self.is_active()
            && format
                .channel_count
                .is_some_and(|count| count <= self.max_channel_count)
    }
}

/// Facts about the playback device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    /// Physical display size, if the device has a display
    pub display_size: Option<DisplaySize>,
    /// Televisions pass multichannel audio through to external receivers
    pub is_television: bool,
    /// Spatializer state, if the platform exposes one
    pub spatializer: Option<Spatializer>,
}

impl DeviceProfile {
    /// Whether the device can render `format`'s channel layout natively.
    ///
    /// Stereo and mono always qualify, as does everything on a television.
    /// Dolby formats qualify when no spatializer is active (the decoder
    /// downmixes them); other multichannel formats need an active spatializer
    /// that accepts their channel count.
    pub fn supports_channel_layout(&self, format: &Format) -> bool {
        if self.is_television || format.channel_count.map_or(true, |count| count <= 2) {
            return true;
        }
        let spatializer_active = self.spatializer.is_some_and(|s| s.is_active());
        if mime::is_dolby_audio(format.sample_mime_type.as_deref()) && !spatializer_active {
            return true;
        }
        self.spatializer.is_some_and(|s| s.can_spatialize(format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(mime_type: &str, channels: u32) -> Format {
        Format::builder()
            .sample_mime_type(mime_type)
            .channel_count(channels)
            .build()
    }

    #[test]
    fn test_stereo_always_supported() {
        let device = DeviceProfile::default();
        assert!(device.supports_channel_layout(&audio(mime::AUDIO_AAC, 2)));
        assert!(!device.supports_channel_layout(&audio(mime::AUDIO_AAC, 6)));
    }

    #[test]
    fn test_dolby_without_spatializer_is_supported() {
        let device = DeviceProfile::default();
        assert!(device.supports_channel_layout(&audio(mime::AUDIO_E_AC3, 6)));
    }

    #[test]
    fn test_active_spatializer_limits_channels() {
        let device = DeviceProfile {
            spatializer: Some(Spatializer {
                available: true,
                enabled: true,
                max_channel_count: 6,
            }),
            ..Default::default()
        };
        assert!(device.supports_channel_layout(&audio(mime::AUDIO_AAC, 6)));
        assert!(!device.supports_channel_layout(&audio(mime::AUDIO_AAC, 8)));
        assert!(!device.supports_channel_layout(&audio(mime::AUDIO_E_AC3, 8)));
    }

    #[test]
    fn test_television_passes_everything() {
        let device = DeviceProfile {
            is_television: true,
            ..Default::default()
        };
        assert!(device.supports_channel_layout(&audio(mime::AUDIO_AAC, 8)));
    }
}
