//! Event source — ticker and keyboard threads merged into one ordered mpsc stream.
//!
//! Producers run on their own threads and only ever send. The game loop is the
//! single consumer and handles events strictly in arrival order.

pub mod keymap;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use log::{debug, warn};

use crate::engine::GameEvent;

pub use keymap::{KeyMap, DEFAULT_LANE_KEYS};

/// How long the keyboard thread waits for input before rechecking the stop flag.
const KEYBOARD_POLL: Duration = Duration::from_millis(20);

/// A song-selection request, resolved against the library by the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongRequest {
    Next,
    Prev,
    /// Zero-based position in the song list.
    Pick(usize),
}

/// Everything that can arrive on the event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Goes straight to the reducer.
    Game(GameEvent),
    Song(SongRequest),
    Quit,
}

/// Sender half, cloned into each producer thread.
pub type EventSender = mpsc::Sender<InputEvent>;

/// Owns the event channel and the producer threads feeding it.
pub struct EventSource {
    tx: EventSender,
    rx: mpsc::Receiver<InputEvent>,
    stop: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl Default for EventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource {
    /// An event source with no producers attached.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            stop: Arc::new(AtomicBool::new(false)),
            workers: Vec::new(),
        }
    }

    /// A sender for injecting events from elsewhere.
    pub fn sender(&self) -> EventSender {
        self.tx.clone()
    }

    /// Start a thread that sends `Tick(tick_ms)` every `tick_ms` milliseconds.
    ///
    /// Deadlines are scheduled from the start instant, so sleep jitter does not
    /// accumulate. If the loop falls behind it sends the ticks it owes.
    pub fn spawn_ticker(&mut self, tick_ms: u32) {
        let tx = self.tx.clone();
        let stop = Arc::clone(&self.stop);
        let period = Duration::from_millis(u64::from(tick_ms.max(1)));
        let handle = thread::spawn(move || {
            let mut deadline = Instant::now() + period;
            while !stop.load(Ordering::Relaxed) {
                let now = Instant::now();
                if now < deadline {
                    thread::sleep(deadline - now);
                    continue;
                }
                if tx.send(InputEvent::Game(GameEvent::Tick(tick_ms))).is_err() {
                    break;
                }
                deadline += period;
            }
            debug!("ticker stopped");
        });
        self.workers.push(handle);
    }

    /// Start a thread that reads terminal key events and maps them through `keymap`.
    pub fn spawn_keyboard(&mut self, keymap: KeyMap) {
        let tx = self.tx.clone();
        let stop = Arc::clone(&self.stop);
        let handle = thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                match event::poll(KEYBOARD_POLL) {
                    Ok(false) => continue,
                    Ok(true) => {}
                    Err(e) => {
                        warn!("keyboard poll failed: {e}");
                        break;
                    }
                }
                let key = match event::read() {
                    Ok(Event::Key(key)) => key,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("keyboard read failed: {e}");
                        break;
                    }
                };
                if let Some(input) = keymap.map(key) {
                    if tx.send(input).is_err() {
                        break;
                    }
                }
            }
            debug!("keyboard reader stopped");
        });
        self.workers.push(handle);
    }

    /// Block until the next event.
    pub fn recv(&self) -> Option<InputEvent> {
        self.rx.recv().ok()
    }

    /// Block for at most `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<InputEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Non-blocking poll for the next event.
    pub fn poll(&self) -> Option<InputEvent> {
        self.rx.try_recv().ok()
    }

    /// Drain all pending events.
    pub fn drain(&self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Signal producers to stop and wait for them.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("input thread panicked");
            }
        }
    }
}

impl Drop for EventSource {
    fn drop(&mut self) {
        self.shutdown();
    }
}
