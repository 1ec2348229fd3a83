//! Highway projection — maps falling and held notes onto a grid of terminal rows per lane.

use ratatui::style::Color;

use crate::chart::{Lane, LANE_COUNT};
use crate::engine::{GameState, HIT_WINDOW, HIT_ZONE_Y, NOTE_SPEED, TICK_MS};

/// Lane colours, left to right.
pub const LANE_COLORS: [Color; LANE_COUNT as usize] =
    [Color::Green, Color::Red, Color::Blue, Color::Yellow];

/// Game-space height shown on screen: the whole fall plus the lower half of the hit window.
pub const FIELD_HEIGHT: u32 = HIT_ZONE_Y + HIT_WINDOW;

/// Game-space distance a note covers per second of song time.
const UNITS_PER_SEC: f64 = NOTE_SPEED as f64 * 1000.0 / TICK_MS as f64;

/// What one lane shows on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    HitLine,
    /// Body of a sustain note.
    Tail,
    Head,
    /// A head that has already been passed over by the current press.
    Judged,
    /// Head of a sustain being held at the hit line.
    Held,
}

impl Cell {
    fn rank(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::HitLine => 1,
            Cell::Tail => 2,
            Cell::Judged => 3,
            Cell::Head => 4,
            Cell::Held => 5,
        }
    }
}

/// One row of the highway.
pub type Row = [Cell; LANE_COUNT as usize];

/// Screen row for a game-space `y`, given `rows` rows of highway.
pub fn row_of(y: u32, rows: usize) -> usize {
    if rows == 0 {
        return 0;
    }
    let y = u64::from(y.min(FIELD_HEIGHT));
    (y * (rows as u64 - 1) / u64::from(FIELD_HEIGHT)) as usize
}

/// Screen row of the hit line.
pub fn hit_row(rows: usize) -> usize {
    row_of(HIT_ZONE_Y, rows)
}

fn place(grid: &mut [Row], row: usize, lane: Lane, cell: Cell) {
    if let Some(slot) = grid.get_mut(row).map(|r| &mut r[lane.index()]) {
        if cell.rank() > slot.rank() {
            *slot = cell;
        }
    }
}

/// Draw a tail `length` game units long ending at `y`.
fn place_tail(grid: &mut [Row], y: u32, length: f64, lane: Lane) {
    let rows = grid.len();
    let top = (f64::from(y) - length).max(0.0) as u32;
    for row in row_of(top, rows)..row_of(y, rows) {
        place(grid, row, lane, Cell::Tail);
    }
}

/// Project a game state onto `rows` rows of highway, top row first.
pub fn project(state: &GameState, rows: usize) -> Vec<Row> {
    let mut grid = vec![[Cell::Empty; LANE_COUNT as usize]; rows];
    if rows == 0 {
        return grid;
    }

    let hit = hit_row(rows);
    for lane in Lane::all() {
        place(&mut grid, hit, lane, Cell::HitLine);
    }

    for falling in state.notes().iter() {
        let note = falling.note();
        if !note.is_interactive() {
            continue;
        }
        if note.is_sustain() {
            place_tail(&mut grid, falling.y(), note.duration() * UNITS_PER_SEC, note.lane());
        }
        let head = if falling.is_judged() {
            Cell::Judged
        } else {
            Cell::Head
        };
        place(&mut grid, row_of(falling.y(), rows), note.lane(), head);
    }

    for held in state.held().iter() {
        let remaining = (1.0 - held.progress()) * held.note().duration() * UNITS_PER_SEC;
        place_tail(&mut grid, HIT_ZONE_Y, remaining, held.lane());
        place(&mut grid, hit, held.lane(), Cell::Held);
    }

    grid
}
