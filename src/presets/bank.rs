//! The per-file preset bank and its slot state machine.
//!
//! A bank owns a fixed slot sequence and enforces the two global rules: at
//! most one slot is `Selected` at any time, and `WaitForSave` is an
//! all-slots-simultaneous mode, never partial. Calling a transition outside
//! its valid state is a contract violation: fatal in debug builds, a logged
//! no-op in release builds, and never mutates unrelated state either way.

use tracing::warn;

use crate::engine::{EngineStatus, PracticeEngine};
use crate::loop_markers::LoopRegion;

use super::{PresetData, PresetId, PresetSlot, PresetState};

/// All preset slots bound to one media file.
#[derive(Clone, Debug)]
pub struct PresetBank {
    media_file_key: String,
    slots: Vec<PresetSlot>,
    active: Option<usize>,
    resume_after_save: bool,
    pending_description: Option<PresetId>,
}

/// Slot payloads recovered from a bank file.
#[derive(Clone, Debug, Default)]
pub struct LoadedSlots {
    /// Identifier of the slot that was active when the bank was written.
    pub active_preset: Option<PresetId>,
    /// Per-slot payloads, in file order.
    pub slots: Vec<(PresetId, PresetData)>,
}

impl PresetBank {
    /// An empty bank with the standard four slots.
    pub fn with_default_slots(media_file_key: impl Into<String>) -> Self {
        Self::with_slots(media_file_key, super::DEFAULT_SLOT_IDS)
    }

    /// An empty bank with the given slot identifiers.
    pub fn with_slots(
        media_file_key: impl Into<String>,
        ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            media_file_key: media_file_key.into(),
            slots: ids
                .into_iter()
                .map(|id| PresetSlot::empty(PresetId::new(id)))
                .collect(),
            active: None,
            resume_after_save: false,
            pending_description: None,
        }
    }

    /// Key derived from the media file name this bank belongs to.
    pub fn media_file_key(&self) -> &str {
        &self.media_file_key
    }

    /// The slot sequence in bank order.
    pub fn slots(&self) -> &[PresetSlot] {
        &self.slots
    }

    /// Look up a slot by identifier.
    pub fn slot(&self, id: &PresetId) -> Option<&PresetSlot> {
        self.slots.iter().find(|slot| &slot.id == id)
    }

    /// Identifier of the currently `Selected` slot, if any.
    pub fn selected_id(&self) -> Option<&PresetId> {
        self.active.map(|idx| &self.slots[idx].id)
    }

    /// Whether the bank is in write mode (all slots offered for overwrite).
    pub fn is_write_mode(&self) -> bool {
        self.slots
            .first()
            .is_some_and(|slot| slot.state == PresetState::WaitForSave)
    }

    /// Slot whose empty description still needs to be filled in by the user.
    ///
    /// Set by [`PresetBank::save_into`] when the target slot had no
    /// description; the embedding UI drains it and prompts.
    pub fn take_pending_description(&mut self) -> Option<PresetId> {
        self.pending_description.take()
    }

    /// Overwrite slot payloads from a loaded bank file.
    ///
    /// Unknown identifiers in the file are skipped. The recorded active slot
    /// is not applied to the engine here; callers follow up with
    /// [`PresetBank::select`].
    pub fn adopt(&mut self, loaded: LoadedSlots) {
        for (id, data) in loaded.slots {
            if let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == id) {
                slot.data = data;
            } else {
                warn!("Bank file for {} names unknown slot {id}", self.media_file_key);
            }
        }
    }

    /// Select a slot: it becomes `Selected`, every other slot `Off`, and its
    /// stored payload is pushed into the live engine state.
    ///
    /// This is the only transition that pushes stored data into live state.
    /// Not valid while in write mode — a slot activation there is a save, so
    /// it must go through [`PresetBank::save_into`], which also releases the
    /// forced pause.
    pub fn select<E: PracticeEngine>(&mut self, id: &PresetId, engine: &mut E) -> bool {
        if self.is_write_mode() {
            return contract_violation(format!("select of {id} while in write mode"));
        }
        let Some(index) = self.slots.iter().position(|slot| &slot.id == id) else {
            return contract_violation(format!("select of unknown preset {id}"));
        };
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.state = if i == index {
                PresetState::Selected
            } else {
                PresetState::Off
            };
        }
        self.active = Some(index);
        let data = self.slots[index].data.clone();
        apply_to_engine(&data, engine);
        true
    }

    /// Enter write mode: every slot becomes an overwrite target.
    ///
    /// Playback is paused for the duration of the save and resumed by
    /// [`PresetBank::save_into`] or [`PresetBank::cancel_write_mode`].
    pub fn enter_write_mode<E: PracticeEngine>(&mut self, engine: &mut E) -> bool {
        if self.is_write_mode() {
            return contract_violation("enter_write_mode while already in write mode".into());
        }
        if engine.status() == EngineStatus::Playing {
            self.resume_after_save = true;
            engine.pause();
        }
        for slot in &mut self.slots {
            slot.state = PresetState::WaitForSave;
        }
        true
    }

    /// Leave write mode without saving, restoring the previous selection.
    pub fn cancel_write_mode<E: PracticeEngine>(&mut self, engine: &mut E) -> bool {
        if !self.is_write_mode() {
            return contract_violation("cancel_write_mode outside write mode".into());
        }
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.state = if Some(i) == self.active {
                PresetState::Selected
            } else {
                PresetState::Off
            };
        }
        self.release_forced_pause(engine);
        true
    }

    /// Save the live engine state into a slot and select it.
    ///
    /// Valid only while in write mode. A slot with an empty description
    /// raises the pending-description request for the embedding UI. The
    /// caller persists the bank afterwards.
    pub fn save_into<E: PracticeEngine>(&mut self, id: &PresetId, engine: &mut E) -> bool {
        if !self.is_write_mode() {
            return contract_violation(format!("save_into {id} outside write mode"));
        }
        let Some(index) = self.slots.iter().position(|slot| &slot.id == id) else {
            return contract_violation(format!("save_into unknown preset {id}"));
        };
        let captured = capture_from_engine(engine, &self.slots[index].data.description);
        if captured.description.is_empty() {
            self.pending_description = Some(self.slots[index].id.clone());
        }
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if i == index {
                slot.state = PresetState::Selected;
                slot.data = captured.clone();
            } else {
                slot.state = PresetState::Off;
            }
        }
        self.active = Some(index);
        self.release_forced_pause(engine);
        true
    }

    /// Reset the currently selected slot to defaults and re-apply them.
    ///
    /// The caller persists the bank afterwards.
    pub fn reset<E: PracticeEngine>(&mut self, id: &PresetId, engine: &mut E) -> bool {
        let Some(index) = self.active.filter(|idx| &self.slots[*idx].id == id) else {
            return contract_violation(format!("reset of non-selected preset {id}"));
        };
        self.slots[index].data = PresetData::default();
        apply_to_engine(&self.slots[index].data, engine);
        true
    }

    /// Update a slot description. Returns whether anything changed; the
    /// caller persists the bank when it did.
    pub fn set_description(&mut self, id: &PresetId, description: impl Into<String>) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|slot| &slot.id == id) else {
            return contract_violation(format!("description change for unknown preset {id}"));
        };
        let description = description.into();
        if slot.data.description == description {
            return false;
        }
        slot.data.description = description;
        true
    }

    fn release_forced_pause<E: PracticeEngine>(&mut self, engine: &mut E) {
        if self.resume_after_save {
            self.resume_after_save = false;
            engine.play();
        }
    }
}

fn apply_to_engine<E: PracticeEngine>(data: &PresetData, engine: &mut E) {
    let duration = engine.file_play_duration();
    let region = LoopRegion::clamped(data.loop_region.start(), data.loop_region.end(), duration);
    engine.set_tempo(data.tempo);
    engine.set_pitch(data.pitch);
    engine.set_volume(data.volume);
    engine.set_start_marker(region.start());
    engine.set_end_marker(region.end());
    engine.set_current_play_time(data.play_time.clamp(crate::timecode::TimeCode::ZERO, duration));
    engine.set_cue(data.cue);
    engine.set_loop_enabled(data.loop_enabled);
}

fn capture_from_engine<E: PracticeEngine>(engine: &E, description: &str) -> PresetData {
    PresetData {
        tempo: engine.tempo(),
        pitch: engine.pitch(),
        volume: engine.volume(),
        play_time: engine.current_play_time(),
        loop_region: LoopRegion::clamped(
            engine.start_marker(),
            engine.end_marker(),
            engine.file_play_duration(),
        ),
        cue: engine.cue(),
        loop_enabled: engine.loop_enabled(),
        description: description.to_string(),
    }
}

fn contract_violation(message: String) -> bool {
    debug_assert!(false, "preset state machine contract violation: {message}");
    warn!("Ignoring invalid preset transition: {message}");
    false
}
