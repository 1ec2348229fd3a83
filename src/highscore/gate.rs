//! High-score gate — watches states go by and saves a beaten record once per game over.

use log::{info, warn};

use crate::engine::GameState;

use super::store::HighScoreStore;

/// Persists a new record when a finished game beats the stored one.
///
/// The record is read once at construction. A save happens only on the
/// transition into game over, so re-observing the same terminal state never
/// writes twice. Any non-terminal state re-arms the gate.
pub struct HighScoreGate {
    store: Box<dyn HighScoreStore>,
    best: Option<u64>,
    was_over: bool,
}

impl HighScoreGate {
    pub fn new(store: Box<dyn HighScoreStore>) -> Self {
        let best = store.load();
        info!("high score: {}", best.map_or("none".to_string(), |b| b.to_string()));
        Self {
            store,
            best,
            was_over: false,
        }
    }

    /// Best score known so far, 0 when none is stored.
    pub fn best(&self) -> u64 {
        self.best.unwrap_or(0)
    }

    /// Look at a state. Returns the new record when one was set.
    pub fn observe(&mut self, state: &GameState) -> Option<u64> {
        if !state.is_game_over() {
            self.was_over = false;
            return None;
        }
        if self.was_over {
            return None;
        }
        self.was_over = true;

        let score = state.score();
        if self.best.is_some_and(|best| score <= best) {
            return None;
        }
        self.best = Some(score);
        info!("new high score: {score}");
        if let Err(e) = self.store.save(score) {
            warn!("failed to save high score: {e}");
        }
        Some(score)
    }
}
