//! Game configuration — lane keys, tick rate, songs directory, loaded from ~/.fretfall/config.yaml.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::engine::TICK_MS;
use crate::highscore::default_high_score_path;
use crate::input::{KeyMap, DEFAULT_LANE_KEYS};

/// Song played when nothing else is chosen.
pub const DEFAULT_SONG: &str = "IWonder";

/// The per-user data directory (`~/.fretfall`).
pub fn data_dir() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".fretfall");
    path
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    Io(PathBuf, io::Error),
    /// The file is not valid YAML for this schema.
    Parse(PathBuf, serde_yaml::Error),
    /// A value is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "cannot read {}: {e}", path.display()),
            ConfigError::Parse(path, e) => write!(f, "invalid config {}: {e}", path.display()),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// User configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Simulation step in milliseconds.
    pub tick_ms: u32,
    /// One key per lane, left to right.
    pub lane_keys: Vec<char>,
    /// Directory scanned for `*.csv` charts.
    pub songs_dir: PathBuf,
    pub default_song: String,
    /// Master volume, 0.0–1.0.
    pub volume: f32,
    /// `error`, `warn`, `info`, `debug` or `trace`. `RUST_LOG` takes precedence.
    pub log_level: String,
    /// Overrides `~/.fretfall/highscore.yaml`.
    pub high_score_path: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            lane_keys: DEFAULT_LANE_KEYS.to_vec(),
            songs_dir: PathBuf::from("songs"),
            default_song: DEFAULT_SONG.to_string(),
            volume: 0.8,
            log_level: "info".to_string(),
            high_score_path: None,
        }
    }
}

impl GameConfig {
    /// Standard location of the config file.
    pub fn default_path() -> PathBuf {
        data_dir().join("config.yaml")
    }

    /// Load from the standard location. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 || self.tick_ms > 1000 {
            return Err(ConfigError::Invalid(format!(
                "tick_ms must be 1..=1000, got {}",
                self.tick_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::Invalid(format!(
                "volume must be 0.0..=1.0, got {}",
                self.volume
            )));
        }
        self.keymap()?;
        Ok(())
    }

    /// Lane key mapping built from `lane_keys`.
    pub fn keymap(&self) -> Result<KeyMap, ConfigError> {
        KeyMap::from_chars(&self.lane_keys).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "lane_keys must be 4 distinct keys other than r, q and digits, got {:?}",
                self.lane_keys
            ))
        })
    }

    /// Log level from `log_level`, falling back to `info` for unknown names.
    pub fn log_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    /// Where the high score is stored.
    pub fn high_score_path(&self) -> PathBuf {
        self.high_score_path
            .clone()
            .unwrap_or_else(default_high_score_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = GameConfig::default();
        assert_eq!(config.tick_ms, 12);
        assert_eq!(config.lane_keys, vec!['h', 'j', 'k', 'l']);
        assert_eq!(config.default_song, "IWonder");
        assert!(config.validate().is_ok());
        assert_eq!(config.log_filter(), LevelFilter::Info);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load_from(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "lane_keys: [a, s, d, f]\nvolume: 0.3\nlog_level: debug\n").unwrap();
        let config = GameConfig::load_from(&path).unwrap();
        assert_eq!(config.lane_keys, vec!['a', 's', 'd', 'f']);
        assert!((config.volume - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.tick_ms, 12);
        assert_eq!(config.log_filter(), LevelFilter::Debug);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "tick_ms: [oops").unwrap();
        assert!(matches!(GameConfig::load_from(&path), Err(ConfigError::Parse(..))));
    }

    #[test]
    fn out_of_range_values_rejected() {
        let bad_tick = GameConfig {
            tick_ms: 0,
            ..GameConfig::default()
        };
        assert!(bad_tick.validate().is_err());

        let bad_volume = GameConfig {
            volume: 1.5,
            ..GameConfig::default()
        };
        assert!(bad_volume.validate().is_err());

        let bad_keys = GameConfig {
            lane_keys: vec!['a', 'a', 's', 'd'],
            ..GameConfig::default()
        };
        assert!(matches!(bad_keys.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_log_level_falls_back() {
        let config = GameConfig {
            log_level: "chatty".into(),
            ..GameConfig::default()
        };
        assert_eq!(config.log_filter(), LevelFilter::Info);
    }

    #[test]
    fn high_score_path_override() {
        let config = GameConfig {
            high_score_path: Some(PathBuf::from("/tmp/hs.yaml")),
            ..GameConfig::default()
        };
        assert_eq!(config.high_score_path(), PathBuf::from("/tmp/hs.yaml"));
    }
}
