use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::game::GuessRecord;

pub const STORAGE_FILE: &str = "footballGuessGame.json";

/// Same-day progress, one record overwritten on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGame {
    pub date: String,
    #[serde(default)]
    pub guesses: Vec<GuessRecord>,
    #[serde(default)]
    pub hint_level: u8,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub player_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GameStore {
    path: PathBuf,
}

impl GameStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable records are treated as "no progress".
    pub fn load(&self) -> Option<StoredGame> {
        let raw = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str::<StoredGame>(&raw).ok()
    }

    pub fn save(&self, record: &StoredGame) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).context("create progress dir")?;
        }
        let json = serde_json::to_string(record).context("serialize progress")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).context("write progress")?;
        fs::rename(&tmp, &self.path).context("swap progress")?;
        Ok(())
    }
}
