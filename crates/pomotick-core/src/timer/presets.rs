use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Preset durations shipped by default, in minutes.
pub const DEFAULT_PRESETS: [u32; 4] = [25, 45, 60, 90];

/// Index into [`DEFAULT_PRESETS`] selected at startup (45 minutes).
pub const DEFAULT_PRESET_INDEX: usize = 1;

/// Ordered, cyclic list of preset durations.
///
/// Deserialization goes through [`PresetCycle::new`], so a decoded cycle
/// holds the same invariants as a constructed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPresetCycle")]
pub struct PresetCycle {
    minutes: Vec<u32>,
    index: usize,
}

#[derive(Deserialize)]
struct RawPresetCycle {
    minutes: Vec<u32>,
    index: usize,
}

impl TryFrom<RawPresetCycle> for PresetCycle {
    type Error = ValidationError;

    fn try_from(raw: RawPresetCycle) -> Result<Self, Self::Error> {
        Self::new(raw.minutes, raw.index)
    }
}

impl PresetCycle {
    /// Build a cycle positioned at `index`.
    ///
    /// # Errors
    ///
    /// Rejects an empty list, zero-minute presets and an out-of-range index.
    pub fn new(minutes: Vec<u32>, index: usize) -> Result<Self, ValidationError> {
        if minutes.is_empty() {
            return Err(ValidationError::EmptyPresets);
        }
        if let Some(pos) = minutes.iter().position(|&m| m == 0) {
            return Err(ValidationError::ZeroPreset { index: pos });
        }
        if index >= minutes.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "presets".into(),
                index,
                len: minutes.len(),
            });
        }
        Ok(Self { minutes, index })
    }

    pub fn current(&self) -> u32 {
        self.minutes[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.minutes.len()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.minutes
    }

    /// Step to the next preset, wrapping from last to first.
    pub fn advance(&mut self) -> u32 {
        self.index = (self.index + 1) % self.minutes.len();
        self.current()
    }
}

impl Default for PresetCycle {
    fn default() -> Self {
        Self {
            minutes: DEFAULT_PRESETS.to_vec(),
            index: DEFAULT_PRESET_INDEX,
        }
    }
}
