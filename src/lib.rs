//! fretfall — a terminal rhythm game: strike falling notes in time, hold sustains, chase the combo.

pub mod audio;
pub mod chart;
pub mod cli;
pub mod config;
pub mod engine;
pub mod game;
pub mod highscore;
pub mod input;
pub mod tui;
