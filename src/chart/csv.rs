//! CSV chart parsing.
//!
//! Expected header (column order is free, whitespace around names is ignored):
//!
//! ```text
//! user_played, instrument_name, velocity, pitch, start (s), end (s)
//! ```
//!
//! Rows that cannot be scheduled (bad start, end or pitch) are dropped with a
//! warning. Other fields fall back to defaults so one sloppy cell does not cost
//! the whole note.

use std::fmt;

use log::warn;

use super::note::ChartRow;

const COL_USER_PLAYED: &str = "user_played";
const COL_INSTRUMENT: &str = "instrument_name";
const COL_VELOCITY: &str = "velocity";
const COL_PITCH: &str = "pitch";
const COL_START: &str = "start (s)";
const COL_END: &str = "end (s)";

/// Instrument used when the cell is empty.
pub const DEFAULT_INSTRUMENT: &str = "piano";
/// Velocity used when the cell is missing or unparseable.
pub const DEFAULT_VELOCITY: u8 = 96;

/// Errors that make a whole chart unusable.
#[derive(Debug)]
pub enum ChartError {
    /// Reading the chart source failed.
    Io(std::io::Error),
    /// The input has no header line.
    MissingHeader,
    /// A required column is absent from the header.
    MissingColumn(&'static str),
    /// A song name did not match any chart.
    UnknownSong(String),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::Io(e) => write!(f, "chart i/o error: {e}"),
            ChartError::MissingHeader => write!(f, "chart has no header line"),
            ChartError::MissingColumn(c) => write!(f, "chart header lacks column '{c}'"),
            ChartError::UnknownSong(name) => write!(f, "no chart named '{name}'"),
        }
    }
}

impl std::error::Error for ChartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChartError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChartError {
    fn from(e: std::io::Error) -> Self {
        ChartError::Io(e)
    }
}

/// Column positions resolved from the header line.
struct Columns {
    user_played: Option<usize>,
    instrument: Option<usize>,
    velocity: Option<usize>,
    pitch: usize,
    start: usize,
    end: usize,
}

impl Columns {
    fn from_header(header: &str) -> Result<Self, ChartError> {
        let names: Vec<&str> = header.split(',').map(str::trim).collect();
        let find = |name: &str| names.iter().position(|n| n.eq_ignore_ascii_case(name));
        let require = |name: &'static str| find(name).ok_or(ChartError::MissingColumn(name));
        Ok(Self {
            user_played: find(COL_USER_PLAYED),
            instrument: find(COL_INSTRUMENT),
            velocity: find(COL_VELOCITY),
            pitch: require(COL_PITCH)?,
            start: require(COL_START)?,
            end: require(COL_END)?,
        })
    }
}

/// Parse CSV chart text into rows, in file order.
pub fn parse_chart(text: &str) -> Result<Vec<ChartRow>, ChartError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next().ok_or(ChartError::MissingHeader)?;
    let columns = Columns::from_header(header)?;

    let mut rows = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        match parse_row(&cells, &columns) {
            Some(row) => rows.push(row),
            // +2: one for the header, one for 1-based numbering
            None => warn!("dropping malformed chart row {}: '{line}'", line_no + 2),
        }
    }
    Ok(rows)
}

fn parse_row(cells: &[&str], columns: &Columns) -> Option<ChartRow> {
    let cell = |idx: Option<usize>| idx.and_then(|i| cells.get(i).copied()).unwrap_or("");

    let start: f64 = cell(Some(columns.start)).parse().ok()?;
    let end: f64 = cell(Some(columns.end)).parse().ok()?;
    if !start.is_finite() || !end.is_finite() || start < 0.0 {
        return None;
    }
    let pitch = parse_midi_byte(cell(Some(columns.pitch)))?;

    let instrument = match cell(columns.instrument) {
        "" => DEFAULT_INSTRUMENT.to_string(),
        name => name.to_string(),
    };

    Some(ChartRow {
        user_played: cell(columns.user_played).eq_ignore_ascii_case("true"),
        instrument,
        velocity: parse_midi_byte(cell(columns.velocity)).unwrap_or(DEFAULT_VELOCITY),
        pitch,
        start,
        end,
    })
}

/// Parse an integer MIDI value, clamping into 0..=127.
fn parse_midi_byte(s: &str) -> Option<u8> {
    let v: i64 = s.parse().ok()?;
    Some(v.clamp(0, 127) as u8)
}
