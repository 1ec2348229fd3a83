//! Game state snapshot and the note wrappers it holds.
//!
//! A [`GameState`] is never mutated in place: the reducer builds a fresh one per
//! event. Note lists are `Arc<[T]>` so renderers can keep a snapshot around
//! without copying.

use std::sync::Arc;

use crate::chart::{Lane, Note};

use super::scoring::Scoreboard;
use super::{HIT_WINDOW, HIT_ZONE_Y, INITIAL_SEED};

/// A note on its way down the highway.
#[derive(Debug, Clone, PartialEq)]
pub struct FallingNote {
    note: Note,
    y: u32,
    judged: bool,
}

impl FallingNote {
    /// A freshly spawned note at the top of the highway.
    pub fn spawn(note: Note) -> Self {
        Self {
            note,
            y: 0,
            judged: false,
        }
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    /// Distance travelled since spawn.
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Whether the current key press has already passed over this note.
    pub fn is_judged(&self) -> bool {
        self.judged
    }

    pub fn lane(&self) -> Lane {
        self.note.lane()
    }

    /// Whether the note is close enough to the hit zone to be struck.
    pub fn in_hit_window(&self) -> bool {
        self.y.abs_diff(HIT_ZONE_Y) < HIT_WINDOW
    }

    /// Whether a key press on `lane` could strike this note right now.
    pub fn strikable_in(&self, lane: Lane) -> bool {
        self.lane() == lane && self.note.is_interactive() && !self.judged && self.in_hit_window()
    }

    pub(crate) fn moved_by(&self, distance: u32) -> Self {
        Self {
            y: self.y.saturating_add(distance),
            ..self.clone()
        }
    }

    pub(crate) fn with_judged(&self, judged: bool) -> Self {
        Self {
            judged,
            ..self.clone()
        }
    }
}

/// A sustain note being held down. Only sustain notes can be held.
#[derive(Debug, Clone, PartialEq)]
pub struct HeldNote {
    note: Note,
    progress: f64,
}

impl HeldNote {
    /// Start holding a note. Returns `None` for notes that are not sustains.
    pub fn new(note: Note) -> Option<Self> {
        note.is_sustain().then_some(Self {
            note,
            progress: 0.0,
        })
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn lane(&self) -> Lane {
        self.note.lane()
    }

    /// Fraction of the note's duration held so far, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub(crate) fn with_progress(&self, progress: f64) -> Self {
        Self {
            note: self.note.clone(),
            progress: progress.clamp(0.0, 1.0),
        }
    }
}

/// The whole game at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub(crate) notes: Arc<[FallingNote]>,
    pub(crate) held: Arc<[HeldNote]>,
    pub(crate) board: Scoreboard,
    pub(crate) game_over: bool,
    pub(crate) time: f64,
    pub(crate) seed: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

impl GameState {
    /// State at process start and after every restart or song change.
    pub fn initial() -> Self {
        Self {
            notes: Arc::from(Vec::new()),
            held: Arc::from(Vec::new()),
            board: Scoreboard::new(),
            game_over: false,
            time: 0.0,
            seed: INITIAL_SEED,
        }
    }

    /// Notes currently falling, oldest first.
    pub fn notes(&self) -> &Arc<[FallingNote]> {
        &self.notes
    }

    /// Sustain notes currently held.
    pub fn held(&self) -> &Arc<[HeldNote]> {
        &self.held
    }

    /// The held note in a lane, if any.
    pub fn held_in(&self, lane: Lane) -> Option<&HeldNote> {
        self.held.iter().find(|h| h.lane() == lane)
    }

    pub fn score(&self) -> u64 {
        self.board.score()
    }

    pub fn combo(&self) -> u32 {
        self.board.combo()
    }

    pub fn multiplier(&self) -> f64 {
        self.board.multiplier()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Elapsed song time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Current pseudo-random seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartRow;

    fn note(pitch: u8, duration: f64) -> Note {
        Note::from_row(
            0,
            &ChartRow {
                user_played: true,
                instrument: "piano".into(),
                velocity: 96,
                pitch,
                start: 0.0,
                end: duration,
            },
        )
    }

    #[test]
    fn initial_state_is_empty() {
        let s = GameState::initial();
        assert!(s.notes().is_empty());
        assert!(s.held().is_empty());
        assert_eq!(s.score(), 0);
        assert_eq!(s.combo(), 0);
        assert_eq!(s.multiplier(), 1.0);
        assert_eq!(s.seed(), 42);
        assert_eq!(s.time(), 0.0);
        assert!(!s.is_game_over());
    }

    #[test]
    fn only_sustains_can_be_held() {
        assert!(HeldNote::new(note(60, 0.5)).is_none());
        let held = HeldNote::new(note(60, 1.5)).unwrap();
        assert_eq!(held.progress(), 0.0);
    }

    #[test]
    fn progress_is_clamped() {
        let held = HeldNote::new(note(60, 2.0)).unwrap();
        assert_eq!(held.with_progress(1.7).progress(), 1.0);
        assert_eq!(held.with_progress(-0.2).progress(), 0.0);
    }

    #[test]
    fn hit_window_is_exclusive() {
        let f = FallingNote::spawn(note(60, 0.5));
        assert!(!f.moved_by(320).in_hit_window());
        assert!(f.moved_by(322).in_hit_window());
        assert!(f.moved_by(348).in_hit_window());
        assert!(!f.moved_by(380).in_hit_window());
    }

    #[test]
    fn strikable_requires_lane_and_unjudged() {
        let f = FallingNote::spawn(note(60, 0.5)).moved_by(340);
        let lane = f.lane();
        assert!(f.strikable_in(lane));
        assert!(!f.with_judged(true).strikable_in(lane));
        let other = Lane::all().find(|l| *l != lane).unwrap();
        assert!(!f.strikable_in(other));
    }
}
