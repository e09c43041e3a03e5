//! Preset slots: a fixed set of named storage locations for a complete
//! playback configuration, grouped into one bank per media file.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::loop_markers::LoopRegion;
use crate::timecode::TimeCode;

mod bank;
pub mod store;

pub use bank::{LoadedSlots, PresetBank};

/// Default tempo factor for a fresh slot.
pub const DEFAULT_TEMPO: f32 = 1.0;
/// Default pitch shift for a fresh slot.
pub const DEFAULT_PITCH: f32 = 0.0;
/// Default volume for a fresh slot.
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Slot identifiers of a standard bank.
pub const DEFAULT_SLOT_IDS: [&str; 4] = ["1", "2", "3", "4"];

/// Identifier of one preset slot within a bank.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetId(String);

impl PresetId {
    /// Wrap a slot identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PresetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Lifecycle state of a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PresetState {
    /// Not selected, not displayed as active.
    #[default]
    Off,
    /// The one currently-applied preset.
    Selected,
    /// Offered as an overwrite target while the bank is in write mode.
    WaitForSave,
}

/// The complete playback configuration a slot stores.
#[derive(Clone, Debug, PartialEq)]
pub struct PresetData {
    /// Tempo factor, `1.0` = original speed.
    pub tempo: f32,
    /// Pitch shift in semitones, `0.0` = original pitch.
    pub pitch: f32,
    /// Output volume, `0.0..=1.0`.
    pub volume: f32,
    /// Saved play position.
    pub play_time: TimeCode,
    /// Saved loop region.
    pub loop_region: LoopRegion,
    /// Saved cue offset.
    pub cue: TimeCode,
    /// Whether loop playback was on.
    pub loop_enabled: bool,
    /// User-entered label, may be empty.
    pub description: String,
}

impl Default for PresetData {
    fn default() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            pitch: DEFAULT_PITCH,
            volume: DEFAULT_VOLUME,
            play_time: TimeCode::ZERO,
            loop_region: LoopRegion::default(),
            cue: TimeCode::ZERO,
            loop_enabled: false,
            description: String::new(),
        }
    }
}

/// One slot of a bank: identifier, state and stored payload.
#[derive(Clone, Debug)]
pub struct PresetSlot {
    id: PresetId,
    state: PresetState,
    data: PresetData,
}

impl PresetSlot {
    fn empty(id: PresetId) -> Self {
        Self {
            id,
            state: PresetState::Off,
            data: PresetData::default(),
        }
    }

    /// The slot identifier.
    pub fn id(&self) -> &PresetId {
        &self.id
    }

    /// The slot lifecycle state.
    pub fn state(&self) -> PresetState {
        self.state
    }

    /// The stored payload.
    pub fn data(&self) -> &PresetData {
        &self.data
    }
}
