//! Autoplay — a deterministic bot that plays a chart without a terminal.
//!
//! The bot presses a lane as soon as a note there enters the hit window. Taps
//! are released straight away; sustains are held until the tick that completes
//! them, then released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::info;

use crate::chart::{Lane, LANE_COUNT};
use crate::engine::{GameEvent, GameState};

use super::GameSession;

/// Remembers which lanes the bot is holding down.
#[derive(Debug, Default, Clone)]
pub struct Autoplayer {
    down: [bool; LANE_COUNT as usize],
}

impl Autoplayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key events the bot sends in response to `state`.
    pub fn respond(&mut self, state: &GameState) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for lane in Lane::all() {
            let i = lane.index();
            let holding = state.held_in(lane).is_some();
            if self.down[i] {
                if !holding {
                    events.push(GameEvent::KeyUp(lane));
                    self.down[i] = false;
                }
                continue;
            }
            if holding {
                continue;
            }
            let Some(target) = state.notes().iter().find(|f| f.strikable_in(lane)) else {
                continue;
            };
            events.push(GameEvent::KeyDown(lane));
            if target.note().is_sustain() {
                self.down[i] = true;
            } else {
                events.push(GameEvent::KeyUp(lane));
            }
        }
        events
    }
}

/// Play the session's song to game over, or until `stop` is set.
///
/// With `realtime` the loop sleeps one tick between steps so audio lines up;
/// otherwise it runs as fast as it can. Returns the final score.
pub fn run_autoplay(
    session: &mut GameSession,
    tick_ms: u32,
    realtime: bool,
    stop: &AtomicBool,
) -> u64 {
    let mut bot = Autoplayer::new();
    let tick = Duration::from_millis(u64::from(tick_ms));
    info!("autoplay '{}'", session.song());

    while !session.state().is_game_over() {
        if stop.load(Ordering::Relaxed) {
            info!("autoplay interrupted at {:.2}s", session.state().time());
            break;
        }
        session.dispatch(&GameEvent::Tick(tick_ms));
        for event in bot.respond(session.state()) {
            session.dispatch(&event);
        }
        if realtime {
            thread::sleep(tick);
        }
    }
    session.state().score()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentPlayer;
    use crate::chart::SongLibrary;
    use crate::engine::TICK_MS;
    use crate::game::NullRenderer;
    use crate::highscore::{HighScoreStore, MemoryHighScoreStore};

    fn session(song: &str, store: &MemoryHighScoreStore) -> GameSession {
        GameSession::new(
            SongLibrary::builtin(),
            song,
            Box::new(SilentPlayer),
            Box::new(NullRenderer),
            Box::new(store.clone()),
        )
        .unwrap()
    }

    #[test]
    fn idle_state_needs_no_input() {
        let mut bot = Autoplayer::new();
        assert!(bot.respond(&GameState::initial()).is_empty());
    }

    #[test]
    fn clears_every_note_of_a_song() {
        let store = MemoryHighScoreStore::new();
        let mut s = session("amongUs", &store);
        let stop = AtomicBool::new(false);
        let score = run_autoplay(&mut s, TICK_MS, false, &stop);
        let playable = s.timeline().interactive_count() as u64;
        assert!(s.state().is_game_over());
        assert_eq!(score, playable);
        assert_eq!(s.state().combo() as u64, playable);
        assert_eq!(store.load(), Some(score));
    }

    #[test]
    fn strikes_stacked_notes_one_after_another() {
        let store = MemoryHighScoreStore::new();
        let mut s = session("IWonder", &store);
        let stop = AtomicBool::new(false);
        run_autoplay(&mut s, TICK_MS, false, &stop);
        assert!(s.state().is_game_over());
        assert_eq!(s.state().combo() as usize, s.timeline().interactive_count());
    }

    #[test]
    fn holds_sustains_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("long.csv"),
            "user_played,instrument_name,velocity,pitch,start (s),end (s)\n\
             True,piano,90,60,0.0,1.5\n\
             True,piano,90,61,0.5,0.7\n",
        )
        .unwrap();
        let store = MemoryHighScoreStore::new();
        let mut s = GameSession::new(
            SongLibrary::scan(dir.path()).unwrap(),
            "long",
            Box::new(SilentPlayer),
            Box::new(NullRenderer),
            Box::new(store.clone()),
        )
        .unwrap();
        let stop = AtomicBool::new(false);
        let score = run_autoplay(&mut s, TICK_MS, false, &stop);
        assert_eq!(score, 2);
        assert_eq!(s.state().combo(), 2);
        assert!(s.state().held().is_empty());
    }

    #[test]
    fn stop_flag_interrupts() {
        let store = MemoryHighScoreStore::new();
        let mut s = session("IWonder", &store);
        let stop = AtomicBool::new(true);
        run_autoplay(&mut s, TICK_MS, false, &stop);
        assert!(!s.state().is_game_over());
        assert_eq!(s.state().time(), 0.0);
    }
}
