//! Control core for an audio practice tool.
//!
//! The crate owns position synchronization, loop markers, preset banks and
//! the recent-files ledger; decoding, time-stretching and rendering live in
//! external collaborators reached through the [`engine`] contract.

/// Application directory helpers.
pub mod app_dirs;
/// Playback engine contract and event plumbing.
pub mod engine;
/// Loop region clamping and marker edits.
pub mod loop_markers;
/// Logging setup.
pub mod logging;
/// Recent-files ledger.
pub mod mru;
/// Engine/user play-position reconciliation.
pub mod position_sync;
/// Preset slots, state machine and bank persistence.
pub mod presets;
/// Owning session tying the pieces together.
pub mod session;
/// Persisted application settings.
pub mod settings;
/// Minute/second/millisecond time positions.
pub mod timecode;

mod atomic_file;
