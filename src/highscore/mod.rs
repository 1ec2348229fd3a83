//! High score — a single persisted scalar and the gate that updates it.

pub mod gate;
pub mod store;

pub use gate::HighScoreGate;
pub use store::{
    default_high_score_path, load_record, save_record, HighScoreRecord, HighScoreStore,
    MemoryHighScoreStore, YamlHighScoreStore,
};
