//! Reducer inputs and the side effects it asks the game loop to perform.

use std::sync::Arc;

use crate::chart::{Lane, Note};

use super::rng::MissSound;

/// Velocity given to miss-feedback notes.
pub const MISS_VELOCITY: f32 = 1.0;

/// One input to the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Simulation step of the given length in milliseconds.
    Tick(u32),
    KeyDown(Lane),
    KeyUp(Lane),
    Restart,
    /// Switch to the named song and start over.
    ChangeSong(String),
}

/// Everything the audio collaborator needs to sound a note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteSound {
    pub instrument: Arc<str>,
    pub pitch: u8,
    /// Seconds.
    pub duration: f64,
    /// 0.0–1.0.
    pub velocity: f32,
}

impl From<&Note> for NoteSound {
    fn from(note: &Note) -> Self {
        Self {
            instrument: Arc::from(note.instrument()),
            pitch: note.pitch(),
            duration: note.duration(),
            velocity: note.velocity(),
        }
    }
}

impl From<&MissSound> for NoteSound {
    fn from(miss: &MissSound) -> Self {
        Self {
            instrument: Arc::from(miss.instrument),
            pitch: miss.pitch,
            duration: miss.duration,
            velocity: MISS_VELOCITY,
        }
    }
}

/// A side effect requested by a state transition, run after the state exists.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Sound a chart note (backing track or a successful strike).
    PlayNote(NoteSound),
    /// Sound the off-key feedback for a press that struck nothing.
    PlayMissSound(MissSound),
    /// Reload the timeline from the named song.
    LoadSong(String),
}
