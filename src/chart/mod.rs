//! Chart layer — CSV parsing, immutable note timelines, the song library.
//!
//! Everything here is read-only once built. The engine only ever sees a
//! [`Timeline`]; malformed chart data is filtered out before it gets there.

pub mod csv;
pub mod library;
pub mod note;
pub mod timeline;

pub use csv::{parse_chart, ChartError};
pub use library::SongLibrary;
pub use note::{ChartRow, Lane, Note, LANE_COUNT, SUSTAIN_THRESHOLD_SECS};
pub use timeline::Timeline;
