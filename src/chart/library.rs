//! Song library — built-in charts plus any `*.csv` found in a songs directory.
//!
//! Song names are file stems. A chart on disk shadows a built-in one of the
//! same name. The list is sorted case-insensitively so digit shortcuts stay
//! stable between runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

use super::csv::{parse_chart, ChartError};
use super::timeline::Timeline;

const BUILTIN: &[(&str, &str)] = &[
    ("IWonder", include_str!("charts/IWonder.csv")),
    ("amongUs", include_str!("charts/amongUs.csv")),
];

/// Where a song's chart comes from.
#[derive(Debug, Clone, PartialEq)]
enum Source {
    Builtin(&'static str),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    name: String,
    source: Source,
}

/// The set of songs available to play.
#[derive(Debug, Clone)]
pub struct SongLibrary {
    entries: Vec<Entry>,
}

impl Default for SongLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SongLibrary {
    /// A library containing only the built-in charts.
    pub fn builtin() -> Self {
        let mut lib = Self {
            entries: BUILTIN
                .iter()
                .map(|(name, text)| Entry {
                    name: (*name).to_string(),
                    source: Source::Builtin(text),
                })
                .collect(),
        };
        lib.sort();
        lib
    }

    /// Built-in charts plus every `*.csv` in `dir`. A missing directory is not
    /// an error; an unreadable one is.
    pub fn scan(dir: &Path) -> Result<Self, ChartError> {
        let mut lib = Self::builtin();
        if !dir.is_dir() {
            info!("songs directory {} not found, using built-in charts", dir.display());
            return Ok(lib);
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!("skipping chart with non-UTF-8 name: {}", path.display());
                continue;
            };
            let name = name.to_string();
            lib.entries.retain(|e| e.name != name);
            lib.entries.push(Entry {
                name,
                source: Source::File(path),
            });
        }
        lib.sort();
        info!("song library: {} charts from {}", lib.len(), dir.display());
        Ok(lib)
    }

    fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    }

    /// Song names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Name at a display position.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.name.as_str())
    }

    /// Position of a song in display order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Whether a song exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The song after `current`, wrapping around. Unknown names start at the top.
    pub fn next_after(&self, current: &str) -> Option<&str> {
        let next = match self.position(current) {
            Some(i) => (i + 1) % self.len(),
            None => 0,
        };
        self.name_at(next)
    }

    /// The song before `current`, wrapping around.
    pub fn prev_before(&self, current: &str) -> Option<&str> {
        let prev = match self.position(current) {
            Some(0) | None => self.len().checked_sub(1)?,
            Some(i) => i - 1,
        };
        self.name_at(prev)
    }

    /// Read and parse a song's chart into a timeline.
    pub fn load(&self, name: &str) -> Result<Arc<Timeline>, ChartError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| ChartError::UnknownSong(name.to_string()))?;

        let rows = match &entry.source {
            Source::Builtin(text) => parse_chart(text)?,
            Source::File(path) => parse_chart(&fs::read_to_string(path)?)?,
        };
        let timeline = Timeline::from_rows(&rows);
        info!(
            "loaded '{name}': {} notes ({} to play), ends at {:.2}s",
            timeline.len(),
            timeline.interactive_count(),
            timeline.end_time()
        );
        Ok(Arc::new(timeline))
    }
}
