//! Status panel — score, multiplier, combo, best score and song name.

use crate::engine::GameState;

/// Everything the status panel shows.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusInfo {
    pub song: String,
    pub score: u64,
    pub multiplier: f64,
    pub combo: u32,
    pub high_score: u64,
    pub game_over: bool,
}

impl StatusInfo {
    pub fn new(state: &GameState, song: &str, high_score: u64) -> Self {
        Self {
            song: song.to_string(),
            score: state.score(),
            multiplier: state.multiplier(),
            combo: state.combo(),
            high_score,
            game_over: state.is_game_over(),
        }
    }

    /// Multiplier with one decimal, e.g. "x1.2".
    pub fn multiplier_display(&self) -> String {
        format!("x{:.1}", self.multiplier)
    }

    /// Best score shown to the player. A running score above the stored best counts.
    pub fn best_display(&self) -> u64 {
        self.high_score.max(self.score)
    }

    /// Whether this run has beaten the stored best.
    pub fn is_new_record(&self) -> bool {
        self.score > self.high_score
    }
}

impl Default for StatusInfo {
    fn default() -> Self {
        Self::new(&GameState::initial(), "", 0)
    }
}
