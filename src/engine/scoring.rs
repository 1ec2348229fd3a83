//! Combo, multiplier and score.
//!
//! The multiplier is a step function of the combo: `1 + floor(combo / 10) * 0.2`.
//! A credit is worth `round(multiplier)` using the multiplier in effect before
//! that credit's own combo increment. Holds finishing together on one tick are
//! scored as a batch instead: the combo grows first, then the whole batch earns
//! `round(n * multiplier)`.

/// Combo length per multiplier step.
pub const COMBO_STEP: u32 = 10;
/// Multiplier gained per step.
pub const MULTIPLIER_STEP: f64 = 0.2;

/// Multiplier for a given combo length.
pub fn multiplier(combo: u32) -> f64 {
    1.0 + f64::from(combo / COMBO_STEP) * MULTIPLIER_STEP
}

/// Points one credit is worth at a given combo length.
pub fn award(combo: u32) -> u64 {
    multiplier(combo).round() as u64
}

/// Score and combo for one playthrough.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreboard {
    score: u64,
    combo: u32,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Award one credit: score += round(multiplier), then combo + 1.
    #[must_use]
    pub fn credit(self) -> Self {
        Self {
            score: self.score.saturating_add(award(self.combo)),
            combo: self.combo.saturating_add(1),
        }
    }

    /// Award `n` credits in sequence.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn credit_n(self, n: usize) -> Self {
        (0..n).fold(self, |board, _| board.credit())
    }

    /// Award `n` holds finished on the same tick: combo += n, then
    /// score += round(n * multiplier) at the new combo.
    #[must_use]
    pub fn credit_batch(self, n: usize) -> Self {
        if n == 0 {
            return self;
        }
        let combo = self
            .combo
            .saturating_add(u32::try_from(n).unwrap_or(u32::MAX));
        let points = (n as f64 * multiplier(combo)).round() as u64;
        Self {
            score: self.score.saturating_add(points),
            combo,
        }
    }

    /// Drop the combo (and with it the multiplier). Score is kept.
    #[must_use]
    pub fn break_combo(self) -> Self {
        Self {
            score: self.score,
            combo: 0,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn multiplier(&self) -> f64 {
        multiplier(self.combo)
    }
}
