//! Chart note data model — one scheduled musical event of a song.
//!
//! A [`Note`] is immutable once built. Its lane and sustain flag are derived
//! from pitch and duration in the constructor and cannot be set independently.

use std::sync::Arc;

/// Number of playable lanes.
pub const LANE_COUNT: u8 = 4;

/// Notes at least this long (seconds) must be held instead of tapped.
pub const SUSTAIN_THRESHOLD_SECS: f64 = 1.0;

/// A playable column, always in `0..LANE_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lane(u8);

impl Lane {
    /// Create a lane, returning `None` when out of range.
    pub fn new(index: u8) -> Option<Self> {
        (index < LANE_COUNT).then_some(Self(index))
    }

    /// Lane a MIDI pitch falls into.
    pub fn from_pitch(pitch: u8) -> Self {
        Self(pitch % LANE_COUNT)
    }

    /// All lanes in order.
    pub fn all() -> impl Iterator<Item = Lane> {
        (0..LANE_COUNT).map(Lane)
    }

    /// Zero-based index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One row of chart data as delivered by a chart source.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    /// Whether the player must strike this note.
    pub user_played: bool,
    pub instrument: String,
    /// MIDI velocity, 0–127.
    pub velocity: u8,
    /// MIDI pitch, 0–127.
    pub pitch: u8,
    /// Start time in seconds from the beginning of the song.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

/// A scheduled note of a song.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    id: usize,
    lane: Lane,
    instrument: Arc<str>,
    pitch: u8,
    duration: f64,
    start: f64,
    velocity: f32,
    interactive: bool,
    sustain: bool,
}

impl Note {
    /// Build a note from a chart row. `id` is the note's index within its song.
    pub fn from_row(id: usize, row: &ChartRow) -> Self {
        let duration = (row.end - row.start).max(0.0);
        Self {
            id,
            lane: Lane::from_pitch(row.pitch),
            instrument: Arc::from(row.instrument.as_str()),
            pitch: row.pitch,
            duration,
            start: row.start,
            velocity: row.velocity.min(127) as f32 / 127.0,
            interactive: row.user_played,
            sustain: duration >= SUSTAIN_THRESHOLD_SECS,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Start time in seconds.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Velocity normalized to 0.0–1.0.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Whether the player must act on this note.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Whether this note must be held rather than tapped.
    pub fn is_sustain(&self) -> bool {
        self.sustain
    }
}
