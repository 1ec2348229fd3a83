//! Game engine — pure reducer over game events, with scoring, sustains and miss feedback.
//!
//! Nothing in this module touches a terminal, a clock or an audio device. The
//! caller feeds [`GameEvent`]s into [`reduce`] and acts on the returned
//! [`Effect`]s, which keeps every rule testable by replaying event lists.

pub mod event;
pub mod reducer;
pub mod rng;
pub mod scoring;
pub mod state;
pub mod sustain;

pub use event::{Effect, GameEvent, NoteSound};
pub use reducer::{reduce, Transition};
pub use rng::{pseudo_random, MissSound};
pub use scoring::{multiplier, Scoreboard};
pub use state::{FallingNote, GameState, HeldNote};

/// Nominal simulation step in milliseconds.
pub const TICK_MS: u32 = 12;

/// Distance a note falls per tick.
pub const NOTE_SPEED: u32 = 2;

/// Position of the hit zone. Notes reaching it leave the highway.
pub const HIT_ZONE_Y: u32 = 350;

/// A press strikes notes strictly closer than this to the hit zone.
pub const HIT_WINDOW: u32 = 30;

/// Fraction of a sustain that must be held for a release to count.
pub const HOLD_COMPLETE_THRESHOLD: f64 = 0.8;

/// Seconds after the last note ends before the game can be over.
pub const GAME_OVER_GRACE_SECS: f64 = 5.0;

/// Seed every playthrough starts from.
pub const INITIAL_SEED: u32 = 42;
