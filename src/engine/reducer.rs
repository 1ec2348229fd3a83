//! The reducer: `(state, event, timeline) -> (state', effects)`.
//!
//! Pure and total. Every event yields a complete new [`GameState`]; sounds and
//! song loads come back as [`Effect`]s for the caller to run afterwards.
//!
//! Once the game is over, ticks and key events leave the state untouched until
//! a restart or song change.

use std::sync::Arc;

use log::trace;

use crate::chart::{Lane, Timeline};

use super::event::{Effect, GameEvent, NoteSound};
use super::rng::{pseudo_random, MissSound};
use super::state::{FallingNote, GameState, HeldNote};
use super::sustain::{advance_holds, judge_release, Release};
use super::{GAME_OVER_GRACE_SECS, HIT_ZONE_Y, NOTE_SPEED};

/// Result of reducing one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: GameState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(state: GameState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

/// Fold one event into the state.
pub fn reduce(state: &GameState, event: &GameEvent, timeline: &Timeline) -> Transition {
    match event {
        GameEvent::Restart => Transition::quiet(GameState::initial()),
        GameEvent::ChangeSong(name) => Transition {
            state: GameState::initial(),
            effects: vec![Effect::LoadSong(name.clone())],
        },
        _ if state.game_over => Transition::quiet(state.clone()),
        GameEvent::Tick(delta_ms) => tick(state, *delta_ms, timeline),
        GameEvent::KeyDown(lane) => key_down(state, *lane),
        GameEvent::KeyUp(lane) => key_up(state, *lane),
    }
}

fn tick(state: &GameState, delta_ms: u32, timeline: &Timeline) -> Transition {
    let delta_secs = f64::from(delta_ms) / 1000.0;
    let previous = state.time;
    let now = previous + delta_secs;

    let spawned = timeline.starting_in(previous, now);
    let effects = spawned
        .iter()
        .filter(|n| !n.is_interactive())
        .map(|n| Effect::PlayNote(NoteSound::from(n)))
        .collect();

    let mut missed = 0;
    let mut notes = Vec::with_capacity(state.notes.len() + spawned.len());
    for falling in state.notes.iter() {
        let moved = falling.moved_by(NOTE_SPEED);
        // Struck notes have already left the list, so an interactive note
        // reaching the zone was never struck, judged or not.
        if moved.y() < HIT_ZONE_Y {
            notes.push(moved);
        } else if moved.note().is_interactive() {
            missed += 1;
        }
    }
    notes.extend(spawned.iter().cloned().map(FallingNote::spawn));

    let (held, completed) = advance_holds(&state.held, delta_secs);

    let board = if missed > 0 {
        trace!("{missed} missed at t={now:.3}, combo reset");
        state.board.break_combo()
    } else if completed > 0 {
        trace!("{completed} holds completed at t={now:.3}");
        state.board.credit_batch(completed)
    } else {
        state.board
    };

    let game_over = now >= timeline.end_time() + GAME_OVER_GRACE_SECS
        && notes.is_empty()
        && held.is_empty();

    Transition {
        state: GameState {
            notes: Arc::from(notes),
            held: Arc::from(held),
            board,
            game_over,
            time: now,
            seed: state.seed,
        },
        effects,
    }
}

fn key_down(state: &GameState, lane: Lane) -> Transition {
    if state.held_in(lane).is_some() {
        return Transition::quiet(state.clone());
    }

    let Some(hit) = state.notes.iter().position(|f| f.strikable_in(lane)) else {
        let (_, seed) = pseudo_random(state.seed);
        return Transition {
            state: GameState {
                board: state.board.break_combo(),
                seed,
                ..state.clone()
            },
            effects: vec![Effect::PlayMissSound(MissSound::from_seed(seed))],
        };
    };

    let struck = state.notes[hit].note().clone();
    let notes: Vec<FallingNote> = state
        .notes
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != hit)
        .map(|(_, f)| if f.strikable_in(lane) { f.with_judged(true) } else { f.clone() })
        .collect();

    let effects = vec![Effect::PlayNote(NoteSound::from(&struck))];
    let (board, held) = match HeldNote::new(struck) {
        Some(hold) => {
            let mut held = state.held.to_vec();
            held.push(hold);
            (state.board, Arc::from(held))
        }
        None => (state.board.credit(), Arc::clone(&state.held)),
    };

    Transition {
        state: GameState {
            notes: Arc::from(notes),
            held,
            board,
            ..state.clone()
        },
        effects,
    }
}

fn key_up(state: &GameState, lane: Lane) -> Transition {
    let Some(released) = state.held_in(lane) else {
        if !state.notes.iter().any(|f| f.lane() == lane && f.is_judged()) {
            return Transition::quiet(state.clone());
        }
        let notes: Vec<FallingNote> = state
            .notes
            .iter()
            .map(|f| if f.lane() == lane { f.with_judged(false) } else { f.clone() })
            .collect();
        return Transition::quiet(GameState {
            notes: Arc::from(notes),
            ..state.clone()
        });
    };

    let board = match judge_release(released) {
        Release::Completed => state.board.credit(),
        Release::Failed => state.board.break_combo(),
    };
    let held: Vec<HeldNote> = state
        .held
        .iter()
        .filter(|h| h.lane() != lane)
        .cloned()
        .collect();

    Transition::quiet(GameState {
        held: Arc::from(held),
        board,
        ..state.clone()
    })
}
