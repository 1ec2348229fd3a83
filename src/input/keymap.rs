//! Key bindings — maps terminal key events to game input.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::chart::{Lane, LANE_COUNT};
use crate::engine::GameEvent;

use super::{InputEvent, SongRequest};

/// Default lane keys, left to right.
pub const DEFAULT_LANE_KEYS: [char; LANE_COUNT as usize] = ['h', 'j', 'k', 'l'];

/// Keys with a fixed meaning that cannot be bound to a lane.
const RESERVED: &[char] = &['r', 'q', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

/// Lane key assignment plus the fixed control keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    lanes: [char; LANE_COUNT as usize],
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            lanes: DEFAULT_LANE_KEYS,
        }
    }
}

impl KeyMap {
    /// Build from one key per lane. Returns `None` if the count is wrong, a key
    /// repeats, or a key is reserved for controls.
    pub fn from_chars(keys: &[char]) -> Option<Self> {
        let lanes: [char; LANE_COUNT as usize] = keys
            .iter()
            .map(|c| c.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .try_into()
            .ok()?;
        for (i, c) in lanes.iter().enumerate() {
            if RESERVED.contains(c) || lanes[..i].contains(c) {
                return None;
            }
        }
        Some(Self { lanes })
    }

    /// Key bound to a lane.
    pub fn key_for(&self, lane: Lane) -> char {
        self.lanes[lane.index()]
    }

    fn lane_for(&self, c: char) -> Option<Lane> {
        let c = c.to_ascii_lowercase();
        let idx = self.lanes.iter().position(|k| *k == c)?;
        Lane::new(idx as u8)
    }

    /// Translate a key event.
    ///
    /// Lane keys produce key-down on press and key-up on release. Repeats are
    /// dropped so a held key does not fire a stream of presses on terminals that
    /// report them. Controls fire on press only.
    pub fn map(&self, key: KeyEvent) -> Option<InputEvent> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') if key.kind == KeyEventKind::Press => {
                    Some(InputEvent::Quit)
                }
                _ => None,
            };
        }

        if let KeyCode::Char(c) = key.code {
            if let Some(lane) = self.lane_for(c) {
                return match key.kind {
                    KeyEventKind::Press => Some(InputEvent::Game(GameEvent::KeyDown(lane))),
                    KeyEventKind::Release => Some(InputEvent::Game(GameEvent::KeyUp(lane))),
                    KeyEventKind::Repeat => None,
                };
            }
        }

        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(InputEvent::Quit),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(InputEvent::Game(GameEvent::Restart)),
            KeyCode::Tab => Some(InputEvent::Song(SongRequest::Next)),
            KeyCode::BackTab => Some(InputEvent::Song(SongRequest::Prev)),
            KeyCode::Char(d @ '1'..='9') => {
                let index = d as usize - '1' as usize;
                Some(InputEvent::Song(SongRequest::Pick(index)))
            }
            _ => None,
        }
    }
}
