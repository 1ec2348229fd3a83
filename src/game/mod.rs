//! Game session — the single consumer that drives the reducer and runs its effects.
//!
//! For every event: reduce, swap in the new state, run effects (audio, song
//! loads), render, then let the high-score gate look at the result.
//! Collaborator failures are logged and never stop the loop.

pub mod autoplay;

use std::io;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::audio::NotePlayer;
use crate::chart::{ChartError, SongLibrary, Timeline};
use crate::engine::{reduce, Effect, GameEvent, GameState, NoteSound};
use crate::highscore::{HighScoreGate, HighScoreStore};
use crate::input::{EventSource, InputEvent, SongRequest};

pub use autoplay::{run_autoplay, Autoplayer};

/// Draws game state snapshots.
pub trait Renderer {
    fn render(&mut self, state: &GameState, high_score: u64) -> io::Result<()>;

    /// Called after a new song's chart has been loaded.
    fn song_changed(&mut self, _name: &str) {}
}

/// Draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _state: &GameState, _high_score: u64) -> io::Result<()> {
        Ok(())
    }
}

/// Whether the loop should keep going after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Owns the current state, the active song and every collaborator.
pub struct GameSession {
    state: GameState,
    timeline: Arc<Timeline>,
    library: SongLibrary,
    song: String,
    player: Box<dyn NotePlayer>,
    renderer: Box<dyn Renderer>,
    gate: HighScoreGate,
}

impl GameSession {
    /// Start a session on `song`. Fails if the song cannot be loaded.
    pub fn new(
        library: SongLibrary,
        song: &str,
        player: Box<dyn NotePlayer>,
        mut renderer: Box<dyn Renderer>,
        store: Box<dyn HighScoreStore>,
    ) -> Result<Self, ChartError> {
        let timeline = library.load(song)?;
        renderer.song_changed(song);
        Ok(Self {
            state: GameState::initial(),
            timeline,
            library,
            song: song.to_string(),
            player,
            renderer,
            gate: HighScoreGate::new(store),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn timeline(&self) -> &Arc<Timeline> {
        &self.timeline
    }

    pub fn library(&self) -> &SongLibrary {
        &self.library
    }

    /// Name of the song being played.
    pub fn song(&self) -> &str {
        &self.song
    }

    pub fn high_score(&self) -> u64 {
        self.gate.best()
    }

    /// Handle one input from the event stream.
    pub fn handle(&mut self, input: InputEvent) -> Flow {
        match input {
            InputEvent::Quit => return Flow::Quit,
            InputEvent::Game(event) => self.dispatch(&event),
            InputEvent::Song(request) => match self.resolve_song(request) {
                Some(name) => self.dispatch(&GameEvent::ChangeSong(name)),
                None => debug!("no song for {request:?}"),
            },
        }
        Flow::Continue
    }

    /// Reduce one game event and carry out its consequences.
    pub fn dispatch(&mut self, event: &GameEvent) {
        let transition = reduce(&self.state, event, &self.timeline);
        let was_over = self.state.is_game_over();
        self.state = transition.state;

        if matches!(event, GameEvent::Restart | GameEvent::ChangeSong(_)) {
            if let Err(e) = self.player.silence() {
                warn!("audio: {e}");
            }
        }
        match event {
            GameEvent::Restart => info!("restart '{}'", self.song),
            _ if self.state.is_game_over() && !was_over => {
                info!("game over on '{}': score {}", self.song, self.state.score())
            }
            _ => {}
        }

        for effect in &transition.effects {
            self.run_effect(effect);
        }

        if let Err(e) = self.renderer.render(&self.state, self.gate.best()) {
            warn!("render failed: {e}");
        }
        self.gate.observe(&self.state);
    }

    /// Consume events until a quit arrives.
    pub fn run(&mut self, source: &EventSource) {
        if let Err(e) = self.renderer.render(&self.state, self.gate.best()) {
            warn!("render failed: {e}");
        }
        while let Some(input) = source.recv() {
            if self.handle(input) == Flow::Quit {
                break;
            }
        }
    }

    fn run_effect(&mut self, effect: &Effect) {
        match effect {
            Effect::PlayNote(sound) => self.play(sound),
            Effect::PlayMissSound(miss) => self.play(&NoteSound::from(miss)),
            Effect::LoadSong(name) => match self.library.load(name) {
                Ok(timeline) => {
                    info!("now playing '{name}'");
                    self.timeline = timeline;
                    self.song = name.clone();
                    self.renderer.song_changed(name);
                }
                Err(e) => warn!("keeping '{}': failed to load '{name}': {e}", self.song),
            },
        }
    }

    fn play(&mut self, sound: &NoteSound) {
        if let Err(e) = self.player.play_note(sound) {
            warn!("audio: {e}");
        }
    }

    fn resolve_song(&self, request: SongRequest) -> Option<String> {
        let name = match request {
            SongRequest::Next => self.library.next_after(&self.song),
            SongRequest::Prev => self.library.prev_before(&self.song),
            SongRequest::Pick(index) => self.library.name_at(index),
        };
        name.map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioError;
    use crate::chart::Lane;
    use crate::engine::TICK_MS;
    use crate::highscore::MemoryHighScoreStore;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Recorder {
        played: Arc<Mutex<Vec<NoteSound>>>,
        frames: Arc<Mutex<usize>>,
        songs: Arc<Mutex<Vec<String>>>,
        silenced: Arc<Mutex<usize>>,
    }

    impl NotePlayer for Recorder {
        fn play_note(&mut self, sound: &NoteSound) -> Result<(), AudioError> {
            self.played.lock().unwrap().push(sound.clone());
            Ok(())
        }

        fn silence(&mut self) -> Result<(), AudioError> {
            *self.silenced.lock().unwrap() += 1;
            Ok(())
        }
    }

    impl Renderer for Recorder {
        fn render(&mut self, _state: &GameState, _high_score: u64) -> io::Result<()> {
            *self.frames.lock().unwrap() += 1;
            Ok(())
        }

        fn song_changed(&mut self, name: &str) {
            self.songs.lock().unwrap().push(name.to_string());
        }
    }

    struct BrokenRenderer;

    impl Renderer for BrokenRenderer {
        fn render(&mut self, _: &GameState, _: u64) -> io::Result<()> {
            Err(io::Error::other("terminal gone"))
        }
    }

    struct FullQueue;

    impl NotePlayer for FullQueue {
        fn play_note(&mut self, _: &NoteSound) -> Result<(), AudioError> {
            Err(AudioError::BufferFull)
        }
    }

    fn session(rec: &Recorder) -> GameSession {
        GameSession::new(
            SongLibrary::builtin(),
            "IWonder",
            Box::new(rec.clone()),
            Box::new(rec.clone()),
            Box::new(MemoryHighScoreStore::new()),
        )
        .unwrap()
    }

    #[test]
    fn unknown_start_song_fails() {
        let result = GameSession::new(
            SongLibrary::builtin(),
            "nope",
            Box::new(crate::audio::SilentPlayer),
            Box::new(NullRenderer),
            Box::new(MemoryHighScoreStore::new()),
        );
        assert!(matches!(result, Err(ChartError::UnknownSong(_))));
    }

    #[test]
    fn backing_notes_reach_the_player() {
        let rec = Recorder::default();
        let mut s = session(&rec);
        s.dispatch(&GameEvent::Tick(TICK_MS));
        // IWonder opens with three backing chord tones and a soft doubling
        assert_eq!(rec.played.lock().unwrap().len(), 4);
        assert_eq!(*rec.frames.lock().unwrap(), 1);
    }

    #[test]
    fn miss_press_plays_feedback() {
        let rec = Recorder::default();
        let mut s = session(&rec);
        s.dispatch(&GameEvent::KeyDown(Lane::new(1).unwrap()));
        let played = rec.played.lock().unwrap();
        assert_eq!(played.len(), 1);
        assert!((48..72).contains(&played[0].pitch));
    }

    #[test]
    fn song_request_swaps_timeline() {
        let rec = Recorder::default();
        let mut s = session(&rec);
        assert_eq!(s.handle(InputEvent::Song(SongRequest::Next)), Flow::Continue);
        assert_eq!(s.song(), "amongUs");
        assert_eq!(s.timeline().len(), 20);
        assert_eq!(*s.state(), GameState::initial());
        assert_eq!(
            *rec.songs.lock().unwrap(),
            vec!["IWonder".to_string(), "amongUs".to_string()]
        );
    }

    #[test]
    fn resets_cut_sounding_notes() {
        let rec = Recorder::default();
        let mut s = session(&rec);
        s.dispatch(&GameEvent::Tick(TICK_MS));
        assert_eq!(*rec.silenced.lock().unwrap(), 0);
        s.dispatch(&GameEvent::Restart);
        assert_eq!(*rec.silenced.lock().unwrap(), 1);
        s.handle(InputEvent::Song(SongRequest::Next));
        assert_eq!(*rec.silenced.lock().unwrap(), 2);
    }

    #[test]
    fn failed_load_keeps_current_song() {
        let rec = Recorder::default();
        let mut s = session(&rec);
        s.dispatch(&GameEvent::ChangeSong("missing".into()));
        assert_eq!(s.song(), "IWonder");
        assert!(!s.timeline().is_empty());
    }

    #[test]
    fn pick_out_of_range_is_ignored() {
        let rec = Recorder::default();
        let mut s = session(&rec);
        s.handle(InputEvent::Song(SongRequest::Pick(8)));
        assert_eq!(s.song(), "IWonder");
        assert_eq!(*rec.frames.lock().unwrap(), 0);
    }

    #[test]
    fn quit_stops() {
        let rec = Recorder::default();
        let mut s = session(&rec);
        assert_eq!(s.handle(InputEvent::Quit), Flow::Quit);
    }

    #[test]
    fn collaborator_failures_do_not_stop_the_game() {
        let mut s = GameSession::new(
            SongLibrary::builtin(),
            "IWonder",
            Box::new(FullQueue),
            Box::new(BrokenRenderer),
            Box::new(MemoryHighScoreStore::new()),
        )
        .unwrap();
        for _ in 0..10 {
            s.dispatch(&GameEvent::Tick(TICK_MS));
        }
        assert!((s.state().time() - 0.12).abs() < 1e-9);
    }

    #[test]
    fn game_over_records_high_score_once() {
        let store = MemoryHighScoreStore::new();
        let mut s = GameSession::new(
            SongLibrary::builtin(),
            "IWonder",
            Box::new(crate::audio::SilentPlayer),
            Box::new(NullRenderer),
            Box::new(store.clone()),
        )
        .unwrap();
        while !s.state().is_game_over() {
            s.dispatch(&GameEvent::Tick(TICK_MS));
        }
        for _ in 0..5 {
            s.dispatch(&GameEvent::Tick(TICK_MS));
        }
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load(), Some(0));
    }
}
