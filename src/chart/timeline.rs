//! Sorted, read-only note storage for one song.
//!
//! Notes are sorted by start time once at construction (stable, so rows that
//! share a start time keep their chart order). Window queries use binary search
//! and never consume anything: the same timeline serves every playthrough.

use std::ops::Range;

use super::note::{ChartRow, Note};

/// The immutable note catalog of the active song.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    notes: Vec<Note>,
    end_time: f64,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a timeline from chart rows. Row order determines note ids.
    pub fn from_rows(rows: &[ChartRow]) -> Self {
        let notes = rows
            .iter()
            .enumerate()
            .map(|(id, row)| Note::from_row(id, row))
            .collect();
        Self::from_notes(notes)
    }

    /// Build a timeline from already constructed notes.
    pub fn from_notes(mut notes: Vec<Note>) -> Self {
        notes.sort_by(|a, b| a.start().total_cmp(&b.start()));
        let end_time = notes.iter().map(Note::end).fold(0.0, f64::max);
        Self { notes, end_time }
    }

    /// Notes whose start time falls in `[from, to)`, in time order.
    pub fn starting_in(&self, from: f64, to: f64) -> &[Note] {
        &self.notes[self.index_range(from, to)]
    }

    /// Latest end time of any note, or 0.0 for an empty timeline.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// All notes in time order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Number of interactive notes (the most a perfect run can strike).
    pub fn interactive_count(&self) -> usize {
        self.notes.iter().filter(|n| n.is_interactive()).count()
    }

    /// Total number of notes.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether the timeline has no notes.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn index_range(&self, from: f64, to: f64) -> Range<usize> {
        let lo = self.notes.partition_point(|n| n.start() < from);
        let hi = self.notes.partition_point(|n| n.start() < to);
        lo..hi.max(lo)
    }
}
