/// Durable data — the process-wide record of settings and lifetime
/// aggregates, persisted through an injected `Storage` so the file
/// system can be swapped for an in-memory fake in tests.
///
/// The wire shape is JSON with camelCase keys:
///
/// ```json
/// {
///   "highScores": [120, 80],
///   "totalGamesPlayed": 2,
///   "totalScore": 200,
///   "settings": { "soundEnabled": true, "difficulty": "normal", "controls": "wasd" }
/// }
/// ```
///
/// Loading merges partial or absent data over defaults; malformed JSON
/// is logged and replaced by defaults, never fatal.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::Difficulty;
use crate::input::ControlScheme;

/// Storage key for the one record this game persists.
pub const DATA_KEY: &str = "data.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Key-value persistence seam.
pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// One file per key under a dot-directory in the user's home.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> FileStorage {
        FileStorage { dir }
    }

    /// `~/.starfall`, falling back to the working directory when HOME
    /// is unset.
    pub fn in_home() -> FileStorage {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        FileStorage::new(PathBuf::from(home).join(".starfall"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.dir.join(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.dir.join(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory fake for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ── The record ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    pub sound_enabled: bool,
    pub difficulty: Difficulty,
    pub controls: ControlScheme,
}

impl Default for GameSettings {
    fn default() -> GameSettings {
        GameSettings {
            sound_enabled: true,
            difficulty: Difficulty::Normal,
            controls: ControlScheme::Wasd,
        }
    }
}

/// Everything that survives across sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameData {
    /// Descending, at most `session::MAX_HIGH_SCORES` entries.
    pub high_scores: Vec<u32>,
    pub total_games_played: u64,
    pub total_score: u64,
    pub settings: GameSettings,
}

impl GameData {
    /// Load from storage, merging over defaults.  A missing record or
    /// malformed JSON yields the defaults — the game always starts.
    pub fn load(storage: &impl Storage) -> GameData {
        let raw = match storage.read(DATA_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return GameData::default(),
            Err(e) => {
                warn!("failed to read saved data, using defaults: {e}");
                return GameData::default();
            }
        };
        match serde_json::from_str::<GameData>(&raw) {
            Ok(mut data) => {
                data.normalize();
                data
            }
            Err(e) => {
                warn!("saved data is malformed, using defaults: {e}");
                GameData::default()
            }
        }
    }

    /// Persist the whole record.  Called after every mutation.
    pub fn save(&self, storage: &mut impl Storage) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(self)?;
        storage.write(DATA_KEY, &json)
    }

    /// Pretty-printed JSON for a user-facing export file.
    pub fn export_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an imported record.  Fails without touching any existing
    /// state; the caller replaces its copy only on success.
    pub fn import_json(raw: &str) -> Result<GameData, StorageError> {
        let mut data = serde_json::from_str::<GameData>(raw)?;
        data.normalize();
        Ok(data)
    }

    /// Re-establish the high-score invariants on data from outside:
    /// descending order, capped length.
    fn normalize(&mut self) {
        self.high_scores.sort_unstable_by(|a, b| b.cmp(a));
        self.high_scores.truncate(crate::session::MAX_HIGH_SCORES);
    }
}
