//! Sustain tracking — hold progress per tick and release judgement.

use super::state::HeldNote;
use super::HOLD_COMPLETE_THRESHOLD;

/// Outcome of releasing a held note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Held long enough to earn credit.
    Completed,
    /// Let go too early.
    Failed,
}

/// Advance every held note by `delta_secs`.
///
/// Returns the notes still held and how many reached full progress this step.
pub fn advance_holds(held: &[HeldNote], delta_secs: f64) -> (Vec<HeldNote>, usize) {
    let mut still_held = Vec::with_capacity(held.len());
    let mut completed = 0;
    for h in held {
        let next = h.with_progress(h.progress() + delta_secs / h.note().duration());
        if next.progress() >= 1.0 {
            completed += 1;
        } else {
            still_held.push(next);
        }
    }
    (still_held, completed)
}

/// Judge a release at the note's current progress.
pub fn judge_release(held: &HeldNote) -> Release {
    if held.progress() >= HOLD_COMPLETE_THRESHOLD {
        Release::Completed
    } else {
        Release::Failed
    }
}
