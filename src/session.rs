//! The owning session: one engine, one bank, one ledger.
//!
//! All session methods run on the UI-affine context. The engine talks back
//! exclusively through the event channel drained by [`PracticeSession::tick`];
//! nothing engine-originated mutates session state directly.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::app_dirs;
use crate::engine::{EngineError, EngineEvent, EngineEventReceiver, EngineStatus, PracticeEngine};
use crate::loop_markers::{LoopMarkerController, LoopRegion};
use crate::mru::{LedgerError, RecentFilesLedger};
use crate::position_sync::{PlayPositionSynchronizer, PositionDisplay};
use crate::presets::store::{self, BankError};
use crate::presets::{PresetBank, PresetId};
use crate::settings::{self, AppSettings, SettingsError};
use crate::timecode::{TimeCode, TimeField};

/// Where the session keeps its persisted files.
#[derive(Clone, Debug)]
pub struct SessionPaths {
    /// Settings TOML file.
    pub settings: PathBuf,
    /// Flat recent-files list.
    pub recent_files: PathBuf,
    /// Directory holding one bank file per media file.
    pub banks_dir: PathBuf,
}

impl SessionPaths {
    /// Resolve the standard locations under the `.woodshed` app root.
    pub fn resolve() -> Result<Self, SessionError> {
        Ok(Self {
            settings: settings::settings_path()?,
            recent_files: settings::recent_files_path()?,
            banks_dir: app_dirs::banks_dir().map_err(SettingsError::from)?,
        })
    }

    /// Keep everything under one directory; used by tests.
    pub fn in_dir(root: &Path) -> Self {
        Self {
            settings: root.join(settings::SETTINGS_FILE_NAME),
            recent_files: root.join(settings::RECENT_FILES_FILE_NAME),
            banks_dir: root.join("banks"),
        }
    }
}

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The media file to open does not exist.
    #[error("File does not exist: {path}")]
    MissingFile {
        /// The absent path.
        path: PathBuf,
    },
    /// The engine rejected an operation.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Bank file persistence failed.
    #[error(transparent)]
    Bank(#[from] BankError),
    /// Recent-files persistence failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// Settings persistence failed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// One practice session owning the engine handle and all persisted state.
pub struct PracticeSession<E: PracticeEngine> {
    engine: E,
    events: EngineEventReceiver,
    sync: PlayPositionSynchronizer,
    markers: LoopMarkerController,
    bank: PresetBank,
    recent: RecentFilesLedger,
    settings: AppSettings,
    paths: SessionPaths,
    current_file: Option<PathBuf>,
    status: EngineStatus,
    engine_failure: bool,
    cue_blink: bool,
}

impl<E: PracticeEngine> PracticeSession<E> {
    /// Build a session around an engine and its event channel.
    ///
    /// Unreadable settings or ledger files are logged and replaced with
    /// defaults; startup never aborts over them.
    pub fn new(engine: E, events: EngineEventReceiver, paths: SessionPaths) -> Self {
        let settings = settings::load_or_default(&paths.settings).unwrap_or_else(|err| {
            warn!("Using default settings: {err}");
            AppSettings::default()
        });
        let recent = RecentFilesLedger::load(&paths.recent_files, settings.recent_capacity)
            .unwrap_or_else(|err| {
                warn!("Starting with an empty recent-files list: {err}");
                RecentFilesLedger::new(settings.recent_capacity)
            });
        Self {
            engine,
            events,
            sync: PlayPositionSynchronizer::new(),
            markers: LoopMarkerController::default(),
            bank: PresetBank::with_default_slots(String::new()),
            recent,
            settings,
            paths,
            current_file: None,
            status: EngineStatus::Initialized,
            engine_failure: false,
            cue_blink: false,
        }
    }

    /// Open a media file: load it into the engine, promote it in the recent
    /// list, remember it as the last file and pull in its preset bank.
    ///
    /// A file that fails to open is evicted from the recent list. A bank
    /// file that fails to parse is reported and replaced by slot defaults.
    pub fn open_file(&mut self, path: &Path, autoplay: bool) -> Result<(), SessionError> {
        if !path.exists() {
            self.evict_recent(path);
            return Err(SessionError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        if let Err(err) = self.engine.load_file(path) {
            self.evict_recent(path);
            return Err(err.into());
        }
        info!("Opened {}", path.display());
        self.engine_failure = false;
        self.current_file = Some(path.to_path_buf());

        self.recent.add(path);
        if let Err(err) = self.recent.save(&self.paths.recent_files) {
            warn!("Recent-files list not saved: {err}");
        }
        self.settings.last_file = Some(path.to_path_buf());
        self.settings.last_audio_folder = path.parent().map(Path::to_path_buf);
        if let Err(err) = settings::save(&self.settings, &self.paths.settings) {
            warn!("Settings not saved: {err}");
        }

        let duration = self.engine.file_play_duration();
        self.markers = LoopMarkerController::new(duration);
        self.markers.set_region(LoopRegion::clamped(
            self.engine.start_marker(),
            self.engine.end_marker(),
            duration,
        ));
        self.sync = PlayPositionSynchronizer::new();

        self.load_bank_for(path);

        if autoplay {
            self.engine.play();
        }
        Ok(())
    }

    /// Reopen the last session's file without autoplay, if it still exists.
    pub fn auto_open_last_file(&mut self) -> bool {
        let Some(last) = self.settings.last_file.clone() else {
            return false;
        };
        if !last.exists() {
            return false;
        }
        match self.open_file(&last, false) {
            Ok(()) => true,
            Err(err) => {
                warn!("Could not reopen last file: {err}");
                false
            }
        }
    }

    fn load_bank_for(&mut self, path: &Path) {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bank = PresetBank::with_default_slots(file_name);
        let bank_path = store::bank_path(&self.paths.banks_dir, path);
        match store::load(&bank_path) {
            Ok(Some(loaded)) => {
                let active = loaded.active_preset.clone();
                self.bank.adopt(loaded);
                match active {
                    Some(active) if self.bank.slot(&active).is_some() => {
                        if self.bank.select(&active, &mut self.engine) {
                            self.reflect_recalled_state();
                        }
                    }
                    Some(active) => warn!("Bank file names unknown active slot {active}"),
                    None => {}
                }
            }
            Ok(None) => {}
            Err(err) => warn!("Keeping preset defaults: {err}"),
        }
    }

    fn evict_recent(&mut self, path: &Path) {
        self.recent.remove(path);
        if let Err(err) = self.recent.save(&self.paths.recent_files) {
            warn!("Recent-files list not saved: {err}");
        }
    }

    /// Drain pending engine events, then refresh the position display.
    ///
    /// Called from the embedder's fixed-interval timer while playing; cheap
    /// enough to call unconditionally.
    pub fn tick(&mut self) {
        self.pump_events();
        self.sync.tick(&self.engine);
    }

    fn pump_events(&mut self) {
        let pulse = self.sync.pulse_handle();
        while let Ok(event) = self.events.try_recv() {
            match event {
                EngineEvent::PositionChanged => pulse.pulse(),
                EngineEvent::CueWaitPulsed => self.cue_blink = true,
                EngineEvent::StatusChanged(status) => {
                    self.status = status;
                    if status == EngineStatus::Error {
                        warn!("Engine reported failure; halting playback");
                        self.engine_failure = true;
                        self.sync.hide_indicator();
                    }
                }
            }
        }
    }

    /// Last engine status observed through the event channel.
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Whether the engine reported an unrecoverable failure.
    pub fn engine_failed(&self) -> bool {
        self.engine_failure
    }

    /// Take the cue-blink request raised by the last cue pulse.
    pub fn take_cue_blink(&mut self) -> bool {
        std::mem::take(&mut self.cue_blink)
    }

    /// Toggle between playing and paused; restart from a stopped engine.
    pub fn play_pause(&mut self) -> Result<(), SessionError> {
        match self.engine.status() {
            EngineStatus::Playing => self.engine.pause(),
            EngineStatus::Pausing | EngineStatus::Initialized => self.engine.play(),
            EngineStatus::Stopped => {
                // Playback ran out; the file must be reloaded before playing
                // again, and an indicator pinned at the end snaps back.
                let Some(file) = self.current_file.clone() else {
                    return Ok(());
                };
                if self.sync.display().indicator >= 1.0 {
                    self.seek_fraction(0.0);
                }
                self.engine.load_file(&file)?;
                self.engine.play();
            }
            EngineStatus::Error => {}
        }
        Ok(())
    }

    /// Stop playback.
    pub fn stop(&mut self) {
        self.engine.stop();
    }

    /// Edit one field of the play-position numeric controls.
    pub fn edit_position_field(&mut self, field: TimeField, raw: i64) {
        let duration = self.engine.file_play_duration();
        let position = self
            .engine
            .current_play_time()
            .with_field(field, raw)
            .clamp(TimeCode::ZERO, duration);
        self.engine.set_current_play_time(position);
        self.sync.note_numeric_edit(position);
    }

    /// Seek to a fraction of the file through the position indicator.
    pub fn seek_fraction(&mut self, fraction: f32) {
        let position = TimeCode::at_fraction(self.engine.file_play_duration(), fraction);
        self.engine.set_current_play_time(position);
        self.sync.note_indicator_edit(fraction);
        self.sync.note_numeric_edit(position);
    }

    /// Begin an indicator drag gesture.
    pub fn begin_scrub(&mut self) {
        self.sync.begin_indicator_drag();
    }

    /// Move an in-progress drag; the engine follows the gesture.
    pub fn scrub_to(&mut self, fraction: f32) {
        if !self.sync.is_dragging() {
            return;
        }
        let position = TimeCode::at_fraction(self.engine.file_play_duration(), fraction);
        self.engine.set_current_play_time(position);
        self.sync.drag_indicator_to(fraction);
    }

    /// Finish the drag gesture.
    pub fn end_scrub(&mut self) {
        self.sync.end_indicator_drag();
    }

    /// Jump back: to the loop start while looping, to zero otherwise.
    pub fn reset_position(&mut self) {
        let target = if self.engine.loop_enabled() {
            self.engine.start_marker()
        } else {
            TimeCode::ZERO
        };
        self.engine.set_current_play_time(target);
        self.sync.note_numeric_edit(target);
        self.sync
            .note_indicator_edit(target.fraction_of(self.engine.file_play_duration()));
    }

    /// Edit one field of the loop start marker.
    pub fn edit_loop_start(&mut self, field: TimeField, raw: i64) {
        let region = self.markers.edit_start(field, raw);
        self.apply_region(region);
    }

    /// Edit one field of the loop end marker.
    pub fn edit_loop_end(&mut self, field: TimeField, raw: i64) {
        let region = self.markers.edit_end(field, raw);
        self.apply_region(region);
    }

    /// Set the loop start marker to the current play position.
    pub fn mark_loop_start_now(&mut self) {
        let region = self.markers.mark_start_now(self.engine.current_play_time());
        self.apply_region(region);
    }

    /// Set the loop end marker to the current play position.
    pub fn mark_loop_end_now(&mut self) {
        let region = self.markers.mark_end_now(self.engine.current_play_time());
        self.apply_region(region);
    }

    fn apply_region(&mut self, region: LoopRegion) {
        self.engine.set_start_marker(region.start());
        self.engine.set_end_marker(region.end());
    }

    /// Recall a preset: apply its stored values to the live engine state.
    pub fn select_preset(&mut self, id: &PresetId) -> bool {
        if !self.bank.select(id, &mut self.engine) {
            return false;
        }
        self.reflect_recalled_state();
        true
    }

    /// Pull the engine state a recall just pushed back into the session:
    /// the loop markers, and the displayed position (a recall while paused
    /// must show its position without waiting for a pulse).
    fn reflect_recalled_state(&mut self) {
        let duration = self.engine.file_play_duration();
        self.markers.set_region(LoopRegion::clamped(
            self.engine.start_marker(),
            self.engine.end_marker(),
            duration,
        ));
        let position = self.engine.current_play_time();
        self.sync.note_numeric_edit(position);
        self.sync.note_indicator_edit(position.fraction_of(duration));
    }

    /// Enter write mode, pausing playback until save or cancel.
    pub fn begin_preset_write(&mut self) -> bool {
        self.bank.enter_write_mode(&mut self.engine)
    }

    /// Leave write mode without saving.
    pub fn cancel_preset_write(&mut self) -> bool {
        self.bank.cancel_write_mode(&mut self.engine)
    }

    /// Capture the live engine state into a slot and persist the bank.
    pub fn save_preset(&mut self, id: &PresetId) -> Result<(), SessionError> {
        if self.bank.save_into(id, &mut self.engine) {
            self.write_bank()?;
        }
        Ok(())
    }

    /// Reset the selected slot to defaults and persist the bank.
    pub fn reset_active_preset(&mut self) -> Result<(), SessionError> {
        let Some(id) = self.bank.selected_id().cloned() else {
            return Ok(());
        };
        if self.bank.reset(&id, &mut self.engine) {
            self.reflect_recalled_state();
            self.write_bank()?;
        }
        Ok(())
    }

    /// Change a slot description; the bank is rewritten when it changed.
    pub fn set_preset_description(
        &mut self,
        id: &PresetId,
        description: impl Into<String>,
    ) -> Result<(), SessionError> {
        if self.bank.set_description(id, description) {
            self.write_bank()?;
        }
        Ok(())
    }

    fn write_bank(&mut self) -> Result<(), SessionError> {
        let Some(file) = self.current_file.as_ref() else {
            return Ok(());
        };
        let bank_path = store::bank_path(&self.paths.banks_dir, file);
        store::write(&self.bank, &bank_path)?;
        Ok(())
    }

    /// The preset bank of the open file.
    pub fn bank(&self) -> &PresetBank {
        &self.bank
    }

    /// Slot awaiting a description prompt after a save, if any.
    pub fn take_pending_description(&mut self) -> Option<PresetId> {
        self.bank.take_pending_description()
    }

    /// The recent-files ledger.
    pub fn recent(&self) -> &RecentFilesLedger {
        &self.recent
    }

    /// The persisted settings.
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// The loop markers of the open file.
    pub fn loop_region(&self) -> LoopRegion {
        self.markers.region()
    }

    /// The position state the UI renders from.
    pub fn display(&self) -> PositionDisplay {
        self.sync.display()
    }

    /// The file currently open, if any.
    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Read access to the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the engine, for direct property edits.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake::FakeEngine;
    use std::fs;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn new_session(dir: &TempDir) -> PracticeSession<FakeEngine> {
        let (tx, rx) = mpsc::channel();
        let engine = FakeEngine::new(tx, TimeCode::from_seconds(100));
        PracticeSession::new(engine, rx, SessionPaths::in_dir(dir.path()))
    }

    fn media_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"riff").unwrap();
        path
    }

    #[test]
    fn open_file_records_recent_and_last_file() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);

        session.open_file(&song, false).unwrap();

        assert_eq!(session.current_file(), Some(song.as_path()));
        assert_eq!(session.recent().entries(), [song.clone()]);
        assert_eq!(session.settings().last_file.as_deref(), Some(song.as_path()));
        assert_eq!(
            session.settings().last_audio_folder.as_deref(),
            song.parent()
        );
        // Both lists also hit disk so the next session sees them.
        let recent = fs::read_to_string(dir.path().join(settings::RECENT_FILES_FILE_NAME)).unwrap();
        assert!(recent.contains("song.wav"));
    }

    #[test]
    fn open_file_with_autoplay_starts_playback() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);
        session.open_file(&song, true).unwrap();
        assert_eq!(session.engine().status(), EngineStatus::Playing);
    }

    #[test]
    fn failed_open_evicts_the_file_from_recent() {
        let dir = TempDir::new().unwrap();
        let good = media_file(&dir, "good.wav");
        let bad = media_file(&dir, "bad.wav");
        let mut session = new_session(&dir);
        session.open_file(&good, false).unwrap();

        session.engine_mut().fail_loads.push(bad.clone());
        session.recent.add(&bad);
        let err = session.open_file(&bad, false).unwrap_err();
        assert!(matches!(err, SessionError::Engine(_)));
        assert_eq!(session.recent().entries(), [good]);
    }

    #[test]
    fn missing_file_is_reported_and_evicted() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("gone.wav");
        let mut session = new_session(&dir);
        session.recent.add(&gone);
        let err = session.open_file(&gone, false).unwrap_err();
        assert!(matches!(err, SessionError::MissingFile { .. }));
        assert!(session.recent().is_empty());
    }

    #[test]
    fn auto_open_skips_a_vanished_last_file() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);
        session.open_file(&song, false).unwrap();
        fs::remove_file(&song).unwrap();

        let mut next = new_session(&dir);
        assert!(!next.auto_open_last_file());
        assert_eq!(next.current_file(), None);
    }

    #[test]
    fn auto_open_reloads_the_last_file_without_autoplay() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);
        session.open_file(&song, false).unwrap();

        let mut next = new_session(&dir);
        assert!(next.auto_open_last_file());
        assert_eq!(next.current_file(), Some(song.as_path()));
        assert_ne!(next.engine().status(), EngineStatus::Playing);
    }

    #[test]
    fn position_pulses_flow_through_tick_into_the_display() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);
        session.open_file(&song, true).unwrap();

        session.engine_mut().advance_to(TimeCode::from_seconds(25));
        session.tick();
        let display = session.display();
        assert_eq!(display.numeric, TimeCode::from_seconds(25));
        assert!((display.indicator - 0.25).abs() < 1e-6);
    }

    #[test]
    fn engine_failure_halts_the_display_and_is_surfaced() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);
        session.open_file(&song, true).unwrap();
        session.engine_mut().advance_to(TimeCode::from_seconds(10));
        session.tick();
        assert!(session.display().indicator_visible);

        session.engine_mut().fail();
        session.tick();
        assert!(session.engine_failed());
        assert!(!session.display().indicator_visible);
    }

    #[test]
    fn play_pause_from_stopped_reloads_and_snaps_a_pinned_indicator() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);
        session.open_file(&song, true).unwrap();
        session.seek_fraction(1.0);
        session.stop();

        session.play_pause().unwrap();
        assert_eq!(session.engine().status(), EngineStatus::Playing);
        assert_eq!(session.engine().load_history.len(), 2);
        assert_eq!(session.display().indicator, 0.0);
        assert_eq!(session.engine().current_play_time(), TimeCode::ZERO);
    }

    #[test]
    fn reset_position_targets_the_loop_start_while_looping() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);
        session.open_file(&song, false).unwrap();
        session.engine_mut().set_loop_enabled(true);
        session
            .engine_mut()
            .set_current_play_time(TimeCode::from_seconds(40));
        session.mark_loop_start_now();

        session
            .engine_mut()
            .set_current_play_time(TimeCode::from_seconds(70));
        session.reset_position();
        assert_eq!(session.engine().current_play_time(), TimeCode::from_seconds(40));

        session.engine_mut().set_loop_enabled(false);
        session.reset_position();
        assert_eq!(session.engine().current_play_time(), TimeCode::ZERO);
    }

    #[test]
    fn marker_edits_propagate_to_the_engine() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);
        session.open_file(&song, false).unwrap();

        session
            .engine_mut()
            .set_current_play_time(TimeCode::from_seconds(30));
        session.mark_loop_start_now();
        assert_eq!(session.engine().start_marker(), TimeCode::from_seconds(30));

        session
            .engine_mut()
            .set_current_play_time(TimeCode::from_seconds(60));
        session.mark_loop_end_now();
        assert_eq!(session.engine().end_marker(), TimeCode::from_seconds(60));
        assert_eq!(session.loop_region().start(), TimeCode::from_seconds(30));
    }

    #[test]
    fn saved_presets_survive_reopening_the_file() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);
        session.open_file(&song, false).unwrap();

        session.engine_mut().set_tempo(0.6);
        session.begin_preset_write();
        session.save_preset(&PresetId::from("2")).unwrap();
        assert_eq!(session.take_pending_description(), Some(PresetId::from("2")));

        let mut next = new_session(&dir);
        next.open_file(&song, false).unwrap();
        assert_eq!(next.bank().selected_id(), Some(&PresetId::from("2")));
        assert_eq!(next.engine().tempo(), 0.6);
    }

    #[test]
    fn recall_syncs_the_loop_markers_with_the_engine() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);
        session.open_file(&song, false).unwrap();
        session
            .engine_mut()
            .set_current_play_time(TimeCode::from_seconds(62));
        session.mark_loop_end_now();
        session
            .engine_mut()
            .set_current_play_time(TimeCode::from_seconds(45));
        session.mark_loop_start_now();
        session.begin_preset_write();
        session.save_preset(&PresetId::from("1")).unwrap();

        let mut next = new_session(&dir);
        next.open_file(&song, false).unwrap();
        assert_eq!(next.loop_region().start(), TimeCode::from_seconds(45));
        assert_eq!(next.loop_region().end(), TimeCode::from_seconds(62));

        // A field edit right after the recall builds on the recalled region
        // instead of pushing a stale one back into the engine.
        next.edit_loop_start(TimeField::Seconds, 50);
        assert_eq!(next.engine().start_marker(), TimeCode::from_seconds(50));
        assert_eq!(next.engine().end_marker(), TimeCode::from_seconds(62));
    }

    #[test]
    fn recall_while_paused_shows_the_stored_position() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);
        session.open_file(&song, false).unwrap();
        session
            .engine_mut()
            .set_current_play_time(TimeCode::from_seconds(50));
        session.begin_preset_write();
        session.save_preset(&PresetId::from("3")).unwrap();

        let mut next = new_session(&dir);
        next.open_file(&song, false).unwrap();
        // No pulse, no tick: the recalled position is visible at once.
        let display = next.display();
        assert_eq!(display.numeric, TimeCode::from_seconds(50));
        assert!((display.indicator - 0.5).abs() < 1e-6);
        assert!(display.indicator_visible);
    }

    #[test]
    fn reset_of_the_active_preset_resyncs_markers_and_display() {
        let dir = TempDir::new().unwrap();
        let song = media_file(&dir, "song.wav");
        let mut session = new_session(&dir);
        session.open_file(&song, false).unwrap();
        session
            .engine_mut()
            .set_current_play_time(TimeCode::from_seconds(62));
        session.mark_loop_end_now();
        session.begin_preset_write();
        session.save_preset(&PresetId::from("1")).unwrap();

        session.reset_active_preset().unwrap();
        assert_eq!(session.loop_region().end(), TimeCode::ZERO);
        assert_eq!(session.display().numeric, TimeCode::ZERO);
        assert_eq!(session.engine().end_marker(), TimeCode::ZERO);
    }
}
