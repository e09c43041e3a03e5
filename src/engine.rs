//! Contract for the external playback engine.
//!
//! The engine runs on its own threads; everything it tells the control core
//! arrives as an [`EngineEvent`] over a channel and is acted on from the
//! UI-affine context. Position pulses carry no payload — the consumer
//! re-reads [`PracticeEngine::current_play_time`] when it gets around to it.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};

use thiserror::Error;

use crate::timecode::TimeCode;

/// Engine transport states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    /// Engine is up but no file is loaded or playback never started.
    Initialized,
    /// Actively producing audio.
    Playing,
    /// Paused mid-file.
    Pausing,
    /// Playback ran to completion or was stopped.
    Stopped,
    /// The engine failed; playback is dead until a reload.
    Error,
}

/// Asynchronous notifications pushed by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// Transport state changed.
    StatusChanged(EngineStatus),
    /// The play position advanced; no payload, re-read the engine.
    PositionChanged,
    /// The configured cue offset fired; the UI blinks its indicator.
    CueWaitPulsed,
}

/// Sending half handed to an engine implementation.
pub type EngineEventSender = Sender<EngineEvent>;
/// Receiving half owned by the session.
pub type EngineEventReceiver = Receiver<EngineEvent>;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine could not open the given media file.
    #[error("Failed to load {path}: {reason}")]
    Load {
        /// File that failed to open.
        path: PathBuf,
        /// Engine-reported reason.
        reason: String,
    },
}

/// Capability set the control core consumes from the playback engine.
///
/// Property setters are fire-and-forget from the caller's perspective; an
/// engine that fails afterwards reports through
/// [`EngineEvent::StatusChanged`] with [`EngineStatus::Error`].
pub trait PracticeEngine {
    /// Current transport state.
    fn status(&self) -> EngineStatus;

    /// Playback tempo factor, `1.0` = original speed.
    fn tempo(&self) -> f32;
    /// Set the playback tempo factor.
    fn set_tempo(&mut self, tempo: f32);

    /// Pitch shift in semitone units, `0.0` = original pitch.
    fn pitch(&self) -> f32;
    /// Set the pitch shift.
    fn set_pitch(&mut self, pitch: f32);

    /// Output volume, `0.0..=1.0`.
    fn volume(&self) -> f32;
    /// Set the output volume.
    fn set_volume(&mut self, volume: f32);

    /// Current play position.
    fn current_play_time(&self) -> TimeCode;
    /// Seek to a position.
    fn set_current_play_time(&mut self, position: TimeCode);

    /// Loop start marker.
    fn start_marker(&self) -> TimeCode;
    /// Set the loop start marker.
    fn set_start_marker(&mut self, marker: TimeCode);

    /// Loop end marker.
    fn end_marker(&self) -> TimeCode;
    /// Set the loop end marker.
    fn set_end_marker(&mut self, marker: TimeCode);

    /// Total play duration of the loaded file.
    fn file_play_duration(&self) -> TimeCode;

    /// Whether loop playback is on.
    fn loop_enabled(&self) -> bool;
    /// Toggle loop playback.
    fn set_loop_enabled(&mut self, enabled: bool);

    /// Configured cue offset.
    fn cue(&self) -> TimeCode;
    /// Set the cue offset.
    fn set_cue(&mut self, cue: TimeCode);

    /// Load a media file, replacing any current one.
    fn load_file(&mut self, path: &Path) -> Result<(), EngineError>;
    /// Start or resume playback.
    fn play(&mut self);
    /// Pause playback, keeping the position.
    fn pause(&mut self);
    /// Stop playback.
    fn stop(&mut self);
}

pub mod fake {
    //! Scripted in-process engine used by tests.

    use super::*;

    /// An engine double that records transport calls and emits events on the
    /// session channel like a real engine would, minus the audio.
    pub struct FakeEngine {
        status: EngineStatus,
        tempo: f32,
        pitch: f32,
        volume: f32,
        position: TimeCode,
        start_marker: TimeCode,
        end_marker: TimeCode,
        duration: TimeCode,
        loop_enabled: bool,
        cue: TimeCode,
        loaded: Option<PathBuf>,
        events: EngineEventSender,
        /// Paths `load_file` rejects, to exercise failure handling.
        pub fail_loads: Vec<PathBuf>,
        /// Every `load_file` target in call order.
        pub load_history: Vec<PathBuf>,
    }

    impl FakeEngine {
        /// Build a fake that reports the given file duration once loaded.
        pub fn new(events: EngineEventSender, duration: TimeCode) -> Self {
            Self {
                status: EngineStatus::Initialized,
                tempo: 1.0,
                pitch: 0.0,
                volume: 1.0,
                position: TimeCode::ZERO,
                start_marker: TimeCode::ZERO,
                end_marker: TimeCode::ZERO,
                duration,
                loop_enabled: false,
                cue: TimeCode::ZERO,
                loaded: None,
                events,
                fail_loads: Vec::new(),
                load_history: Vec::new(),
            }
        }

        /// The file currently loaded, if any.
        pub fn loaded(&self) -> Option<&Path> {
            self.loaded.as_deref()
        }

        /// Simulate the engine advancing to `position` and pulsing.
        pub fn advance_to(&mut self, position: TimeCode) {
            self.position = position;
            let _ = self.events.send(EngineEvent::PositionChanged);
        }

        /// Simulate an engine-side failure.
        pub fn fail(&mut self) {
            self.set_status(EngineStatus::Error);
        }

        fn set_status(&mut self, status: EngineStatus) {
            self.status = status;
            let _ = self.events.send(EngineEvent::StatusChanged(status));
        }
    }

    impl PracticeEngine for FakeEngine {
        fn status(&self) -> EngineStatus {
            self.status
        }

        fn tempo(&self) -> f32 {
            self.tempo
        }

        fn set_tempo(&mut self, tempo: f32) {
            self.tempo = tempo;
        }

        fn pitch(&self) -> f32 {
            self.pitch
        }

        fn set_pitch(&mut self, pitch: f32) {
            self.pitch = pitch;
        }

        fn volume(&self) -> f32 {
            self.volume
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }

        fn current_play_time(&self) -> TimeCode {
            self.position
        }

        fn set_current_play_time(&mut self, position: TimeCode) {
            self.position = position;
        }

        fn start_marker(&self) -> TimeCode {
            self.start_marker
        }

        fn set_start_marker(&mut self, marker: TimeCode) {
            self.start_marker = marker;
        }

        fn end_marker(&self) -> TimeCode {
            self.end_marker
        }

        fn set_end_marker(&mut self, marker: TimeCode) {
            self.end_marker = marker;
        }

        fn file_play_duration(&self) -> TimeCode {
            if self.loaded.is_some() {
                self.duration
            } else {
                TimeCode::ZERO
            }
        }

        fn loop_enabled(&self) -> bool {
            self.loop_enabled
        }

        fn set_loop_enabled(&mut self, enabled: bool) {
            self.loop_enabled = enabled;
        }

        fn cue(&self) -> TimeCode {
            self.cue
        }

        fn set_cue(&mut self, cue: TimeCode) {
            self.cue = cue;
        }

        fn load_file(&mut self, path: &Path) -> Result<(), EngineError> {
            self.load_history.push(path.to_path_buf());
            if self.fail_loads.iter().any(|p| p == path) {
                return Err(EngineError::Load {
                    path: path.to_path_buf(),
                    reason: "unsupported format".into(),
                });
            }
            self.loaded = Some(path.to_path_buf());
            self.position = TimeCode::ZERO;
            self.end_marker = self.duration;
            self.set_status(EngineStatus::Initialized);
            Ok(())
        }

        fn play(&mut self) {
            if self.loaded.is_some() && self.status != EngineStatus::Error {
                self.set_status(EngineStatus::Playing);
            }
        }

        fn pause(&mut self) {
            if self.status == EngineStatus::Playing {
                self.set_status(EngineStatus::Pausing);
            }
        }

        fn stop(&mut self) {
            if self.loaded.is_some() {
                self.set_status(EngineStatus::Stopped);
            }
        }
    }
}
