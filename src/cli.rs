//! Command-line arguments. Flags override values from the config file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::GameConfig;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about)]
pub struct Args {
    /// Song to start with (chart file stem, e.g. IWonder)
    #[arg(long)]
    pub song: Option<String>,

    /// Directory scanned for *.csv charts
    #[arg(long, value_name = "DIR")]
    pub songs_dir: Option<PathBuf>,

    /// Path to config YAML (default ~/.fretfall/config.yaml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Let the autoplay bot play the song without a terminal UI
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Print the available songs and exit
    #[arg(long, default_value_t = false)]
    pub list_songs: bool,

    /// Run without opening an audio device
    #[arg(long, default_value_t = false)]
    pub no_audio: bool,
}

impl Args {
    /// Fold flag overrides into a loaded config.
    pub fn apply(&self, mut config: GameConfig) -> GameConfig {
        if let Some(song) = &self.song {
            config.default_song = song.clone();
        }
        if let Some(dir) = &self.songs_dir {
            config.songs_dir = dir.clone();
        }
        config
    }
}
