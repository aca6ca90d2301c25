//! Audio offload preferences

use serde::{Deserialize, Serialize};

use crate::capabilities::AudioOffloadSupport;

/// Whether audio offload should be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioOffloadMode {
    /// Never offload
    #[default]
    Disabled,
    /// Offload when the selection allows it
    Enabled,
    /// Only play audio that can be offloaded; video, image and text are not
    /// selected automatically
    Required,
}

/// Audio offload preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioOffloadPreferences {
    pub mode: AudioOffloadMode,
    /// Offloaded playback must preserve gapless transitions
    pub gapless_required: bool,
    /// Offloaded playback must support speed changes
    pub speed_change_required: bool,
}

impl AudioOffloadPreferences {
    pub fn is_enabled(&self) -> bool {
        self.mode != AudioOffloadMode::Disabled
    }

    pub fn is_required(&self) -> bool {
        self.mode == AudioOffloadMode::Required
    }

    /// Whether a track with this offload support satisfies the preferences.
    pub fn accepts(&self, support: &AudioOffloadSupport) -> bool {
        support.supported
            && (!self.speed_change_required || support.speed_change_supported)
            && (!self.gapless_required || support.gapless_supported)
    }
}
