//! Declared decoder limits
//!
//! Renderers built from configuration describe what each decoder can play
//! with constraint values. A format whose attributes fall outside a limit is
//! classified as exceeding the renderer's capabilities rather than unsupported.

use serde::{Deserialize, Serialize};

use crate::format::Format;

// =============================================================================
// Constraint Value
// =============================================================================

/// Constraint expression supporting exact values, ranges, or sets.
///
/// # JSON Representations
///
/// - **Exact**: `48000`
/// - **Set**: `[16000, 44100, 48000]`
/// - **Range**: `{"min": 16000, "max": 48000}` (inclusive)
/// - **Any**: `null` or field omitted
///
/// # Example
///
/// ```rust
/// use trackselect_core::capabilities::ConstraintValue;
///
/// let range = ConstraintValue::Range { min: 1u32, max: 6 };
/// assert!(range.satisfies(&2));
/// assert!(!range.satisfies(&8));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstraintValue<T> {
    /// Single exact value required
    Exact(T),
    /// List of discrete acceptable values
    ///
    /// Listed before `Range` so a two-element array is not read as a range.
    Set(Vec<T>),
    /// Inclusive range of acceptable values
    Range {
        /// Minimum value (inclusive)
        min: T,
        /// Maximum value (inclusive)
        max: T,
    },
}

impl<T: PartialOrd + PartialEq> ConstraintValue<T> {
    /// Check if a value satisfies this constraint.
    pub fn satisfies(&self, value: &T) -> bool {
        match self {
            ConstraintValue::Exact(exact) => value == exact,
            ConstraintValue::Range { min, max } => value >= min && value <= max,
            ConstraintValue::Set(set) => set.iter().any(|v| v == value),
        }
    }

    /// Upper bound convenience constructor (`0..=max` for unsigned values).
    pub fn at_most(max: T) -> Self
    where
        T: Default,
    {
        ConstraintValue::Range {
            min: T::default(),
            max,
        }
    }
}

/// Optional constraint check: a missing constraint or an unknown value passes.
fn within<T: PartialOrd>(constraint: &Option<ConstraintValue<T>>, value: Option<T>) -> bool {
    match (constraint, value) {
        (Some(constraint), Some(value)) => constraint.satisfies(&value),
        _ => true,
    }
}

// =============================================================================
// Decoder Limits
// =============================================================================

/// Limits of one decoder, per format attribute. `None` means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderLimits {
    /// Video width in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<ConstraintValue<u32>>,

    /// Video height in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<ConstraintValue<u32>>,

    /// Video frame rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<ConstraintValue<f32>>,

    /// Audio channel count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<ConstraintValue<u32>>,

    /// Audio sample rate in Hz
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<ConstraintValue<u32>>,

    /// Bitrate in bits per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<ConstraintValue<u32>>,
}

impl DecoderLimits {
    /// Whether every known attribute of `format` is within these limits.
    pub fn admits(&self, format: &Format) -> bool {
        within(&self.width, format.width)
            && within(&self.height, format.height)
            && within(&self.frame_rate, format.frame_rate)
            && within(&self.channels, format.channel_count)
            && within(&self.sample_rate, format.sample_rate)
            && within(&self.bitrate, format.bitrate)
    }
}
