//! Bank file persistence.
//!
//! One bank file per media file, named by appending a fixed suffix to the
//! media filename. Every value is text-serialized: floats as decimal text,
//! durations in the canonical timecode form, booleans as `True`/`False`.
//! A missing file is not an error — it means "no prior bank". A structurally
//! invalid file is a recoverable [`BankError::Parse`]; callers keep their
//! in-memory defaults. Writes go through atomic replacement, so readers see
//! either the prior file or the fully-rewritten one.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atomic_file::write_atomic;
use crate::loop_markers::LoopRegion;
use crate::timecode::TimeCode;

use super::bank::LoadedSlots;
use super::{PresetBank, PresetData, PresetId};

/// Suffix appended to a media filename to name its bank file.
pub const BANK_FILE_SUFFIX: &str = ".bank.toml";

/// Version stamp written into every bank file.
pub const BANK_FORMAT_VERSION: &str = "1";

/// Errors that may occur while loading or saving a preset bank.
#[derive(Debug, Error)]
pub enum BankError {
    /// Failed to read an existing bank file.
    #[error("Failed to read bank file {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to write the bank file.
    #[error("Failed to write bank file {path}: {source}")]
    Write {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The bank file exists but is structurally invalid.
    #[error("Invalid bank file {path}: {source}")]
    Parse {
        /// Bank file path.
        path: PathBuf,
        /// Parse error.
        source: toml::de::Error,
    },
    /// Failed to serialize the bank.
    #[error("Failed to serialize bank for {path}: {source}")]
    Serialize {
        /// Bank file path.
        path: PathBuf,
        /// Serialization error.
        source: toml::ser::Error,
    },
}

/// Bank file location for a media file inside the given banks directory.
pub fn bank_path(banks_dir: &Path, media_file: &Path) -> PathBuf {
    let file_name = media_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    banks_dir.join(format!("{file_name}{BANK_FILE_SUFFIX}"))
}

/// Load slot payloads from a bank file.
///
/// `Ok(None)` signals "no prior bank"; the caller proceeds with defaults.
pub fn load(path: &Path) -> Result<Option<LoadedSlots>, BankError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(BankError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let file: BankFile = toml::from_str(&text).map_err(|source| BankError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let active_preset = (!file.bank.active_preset.is_empty())
        .then(|| PresetId::new(file.bank.active_preset));
    let slots = file
        .bank
        .presets
        .into_iter()
        .map(|record| {
            let id = PresetId::new(record.id);
            let data = PresetData {
                tempo: record.tempo,
                pitch: record.pitch,
                volume: record.volume,
                play_time: record.play_time,
                loop_region: LoopRegion::clamped(
                    record.loop_start,
                    record.loop_end,
                    record.loop_end,
                ),
                cue: record.cue,
                loop_enabled: record.is_loop,
                description: record.description,
            };
            (id, data)
        })
        .collect();
    Ok(Some(LoadedSlots {
        active_preset,
        slots,
    }))
}

/// Serialize every slot of the bank unconditionally and replace the file.
pub fn write(bank: &PresetBank, path: &Path) -> Result<(), BankError> {
    let file = BankFile {
        version: BANK_FORMAT_VERSION.to_string(),
        bank: BankBody {
            source_file: bank.media_file_key().to_string(),
            active_preset: bank
                .selected_id()
                .map(|id| id.as_str().to_string())
                .unwrap_or_default(),
            presets: bank
                .slots()
                .iter()
                .map(|slot| {
                    let data = slot.data();
                    PresetRecord {
                        id: slot.id().as_str().to_string(),
                        tempo: data.tempo,
                        pitch: data.pitch,
                        volume: data.volume,
                        play_time: data.play_time,
                        loop_start: data.loop_region.start(),
                        loop_end: data.loop_region.end(),
                        is_loop: data.loop_enabled,
                        cue: data.cue,
                        description: data.description.clone(),
                    }
                })
                .collect(),
        },
    };
    let text = toml::to_string_pretty(&file).map_err(|source| BankError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, text.as_bytes()).map_err(|source| BankError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Serialize, Deserialize)]
struct BankFile {
    version: String,
    bank: BankBody,
}

#[derive(Serialize, Deserialize)]
struct BankBody {
    source_file: String,
    active_preset: String,
    #[serde(rename = "preset", default)]
    presets: Vec<PresetRecord>,
}

#[derive(Serialize, Deserialize)]
struct PresetRecord {
    id: String,
    #[serde(with = "text_f32")]
    tempo: f32,
    #[serde(with = "text_f32")]
    pitch: f32,
    #[serde(with = "text_f32")]
    volume: f32,
    play_time: TimeCode,
    loop_start: TimeCode,
    loop_end: TimeCode,
    #[serde(with = "text_bool")]
    is_loop: bool,
    cue: TimeCode,
    description: String,
}

mod text_f32 {
    //! Floats round-trip as decimal text, not TOML floats.

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid decimal value {text:?}")))
    }
}

mod text_bool {
    //! Booleans round-trip as `True`/`False` text.

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "True" } else { "False" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let text = String::deserialize(deserializer)?;
        match text.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(D::Error::custom(format!("invalid boolean value {text:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake::FakeEngine;
    use crate::engine::PracticeEngine;
    use crate::presets::PresetState;
    use std::sync::mpsc;
    use tempfile::tempdir;

    fn populated_bank() -> PresetBank {
        let (tx, _rx) = mpsc::channel();
        let mut engine = FakeEngine::new(tx, TimeCode::from_seconds(200));
        engine.load_file(Path::new("riff.mp3")).unwrap();
        engine.set_tempo(0.85);
        engine.set_pitch(-1.5);
        engine.set_volume(0.4);
        engine.set_current_play_time(TimeCode::from_parts(1, 2, 345));
        engine.set_start_marker(TimeCode::from_parts(0, 55, 0));
        engine.set_end_marker(TimeCode::from_parts(1, 30, 500));
        engine.set_cue(TimeCode::from_seconds(3));
        engine.set_loop_enabled(true);

        let mut bank = PresetBank::with_default_slots("riff.mp3");
        bank.enter_write_mode(&mut engine);
        bank.save_into(&PresetId::from("2"), &mut engine);
        bank.set_description(&PresetId::from("2"), "solo section");
        bank
    }

    #[test]
    fn write_then_load_reproduces_every_slot_field() {
        let dir = tempdir().unwrap();
        let path = bank_path(dir.path(), Path::new("riff.mp3"));
        let bank = populated_bank();
        write(&bank, &path).unwrap();

        let loaded = load(&path).unwrap().expect("bank file exists");
        assert_eq!(loaded.active_preset, Some(PresetId::from("2")));
        assert_eq!(loaded.slots.len(), 4);
        for slot in bank.slots() {
            let (_, data) = loaded
                .slots
                .iter()
                .find(|(id, _)| id == slot.id())
                .expect("slot round-trips");
            assert_eq!(data, slot.data());
        }
    }

    #[test]
    fn values_are_text_encoded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bank.toml");
        write(&populated_bank(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("version = \"1\""));
        assert!(text.contains("is_loop = \"True\""));
        assert!(text.contains("tempo = \"0.85\""));
        assert!(text.contains("play_time = \"0:01:02.345\""));
        assert!(text.contains("source_file = \"riff.mp3\""));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        assert!(load(&dir.path().join("absent.bank.toml")).unwrap().is_none());
    }

    #[test]
    fn invalid_file_reports_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.bank.toml");
        std::fs::write(&path, "version = \"1\"\n[bank\n").unwrap();
        assert!(matches!(load(&path), Err(BankError::Parse { .. })));
    }

    #[test]
    fn unselected_bank_writes_empty_active_preset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh.bank.toml");
        let bank = PresetBank::with_default_slots("fresh.mp3");
        write(&bank, &path).unwrap();
        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded.active_preset, None);
    }

    #[test]
    fn bank_path_appends_the_fixed_suffix() {
        let path = bank_path(Path::new("/data/banks"), Path::new("/music/song.mp3"));
        assert_eq!(path, Path::new("/data/banks/song.mp3.bank.toml"));
    }

    #[test]
    fn adopted_load_marks_nothing_selected() {
        // Adoption alone must not flip states; selection is a separate step.
        let dir = tempdir().unwrap();
        let path = dir.path().join("riff.bank.toml");
        write(&populated_bank(), &path).unwrap();
        let mut fresh = PresetBank::with_default_slots("riff.mp3");
        fresh.adopt(load(&path).unwrap().unwrap());
        assert!(fresh.slots().iter().all(|s| s.state() == PresetState::Off));
    }
}
