//! High-score storage — a YAML file under `~/.fretfall/` or an in-memory cell.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::warn;
use serde::{Deserialize, Serialize};

/// Where the best score lives between runs.
pub trait HighScoreStore: Send {
    /// The stored record, or `None` if nothing has been saved yet.
    fn load(&self) -> Option<u64>;

    /// Replace the stored record.
    fn save(&mut self, score: u64) -> io::Result<()>;
}

/// On-disk shape of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub score: u64,
}

/// Default path for the high-score file.
pub fn default_high_score_path() -> PathBuf {
    crate::config::data_dir().join("highscore.yaml")
}

/// Read a record. A missing file is `Ok(None)`.
pub fn load_record(path: &Path) -> io::Result<Option<HighScoreRecord>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Write a record, creating parent directories as needed.
pub fn save_record(path: &Path, record: &HighScoreRecord) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(record).map_err(io::Error::other)?;
    std::fs::write(path, yaml)
}

/// High score kept in a YAML file.
#[derive(Debug, Clone)]
pub struct YamlHighScoreStore {
    path: PathBuf,
}

impl YamlHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`default_high_score_path`].
    pub fn at_default_path() -> Self {
        Self::new(default_high_score_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for YamlHighScoreStore {
    fn load(&self) -> Option<u64> {
        match load_record(&self.path) {
            Ok(record) => record.map(|r| r.score),
            Err(e) => {
                warn!("ignoring unreadable high score {}: {e}", self.path.display());
                None
            }
        }
    }

    fn save(&mut self, score: u64) -> io::Result<()> {
        save_record(&self.path, &HighScoreRecord { score })
    }
}

#[derive(Debug, Default)]
struct MemoryCell {
    score: Option<u64>,
    saves: usize,
}

/// High score held in memory. Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    cell: Arc<Mutex<MemoryCell>>,
}

impl MemoryHighScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a record.
    pub fn with_score(score: u64) -> Self {
        let store = Self::new();
        store.cell().score = Some(score);
        store
    }

    /// Number of saves performed so far.
    pub fn save_count(&self) -> usize {
        self.cell().saves
    }

    fn cell(&self) -> std::sync::MutexGuard<'_, MemoryCell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&self) -> Option<u64> {
        self.cell().score
    }

    fn save(&mut self, score: u64) -> io::Result<()> {
        let mut cell = self.cell();
        cell.score = Some(score);
        cell.saves += 1;
        Ok(())
    }
}
