//! High-score persistence.
//!
//! Loading never fails from the caller's point of view: a missing, unreadable
//! or corrupt record reads as 0.  Saving reports errors, and the engine logs
//! and discards them.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreError;

/// Environment variable overriding where the high score is kept.
pub const SCORE_PATH_ENV: &str = "SPACE_DEFENDER_SCORES";

pub trait HighScoreStore {
    fn load_high_score(&self) -> u32;

    fn save_high_score(&mut self, value: u32) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct HighScoreRecord {
    high_score: u32,
}

// ── JSON file ─────────────────────────────────────────────────────────────────

/// Keeps `{"high_score": <int>}` in a single file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$SPACE_DEFENDER_SCORES`, else `~/.space_defender_highscore.json`.
    pub fn default_path() -> PathBuf {
        if let Ok(p) = std::env::var(SCORE_PATH_ENV) {
            return PathBuf::from(p);
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".space_defender_highscore.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonFileStore {
    fn load_high_score(&self) -> u32 {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return 0,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read high score");
                return 0;
            }
        };
        match serde_json::from_str::<HighScoreRecord>(&text) {
            Ok(record) => record.high_score,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt high score record");
                0
            }
        }
    }

    fn save_high_score(&mut self, value: u32) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&HighScoreRecord { high_score: value })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

// ── In memory ─────────────────────────────────────────────────────────────────

/// Store without a backing file.  Can be told to refuse writes, to exercise
/// the save-failure path.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    value: Option<u32>,
    fail_writes: bool,
    saves: usize,
}

impl MemoryStore {
    pub fn with_value(value: u32) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn value(&self) -> Option<u32> {
        self.value
    }

    /// Successful and attempted saves alike.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl HighScoreStore for MemoryStore {
    fn load_high_score(&self) -> u32 {
        self.value.unwrap_or(0)
    }

    fn save_high_score(&mut self, value: u32) -> Result<(), StoreError> {
        self.saves += 1;
        if self.fail_writes {
            return Err(StoreError::Rejected);
        }
        self.value = Some(value);
        Ok(())
    }
}
