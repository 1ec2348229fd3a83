//! fretfall — terminal rhythm game.
//!
//! Interactive by default. `--headless` lets the autoplay bot play the song
//! and prints the final score.

use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use env_logger::Target;
use log::{info, LevelFilter};

use fretfall::audio::open_player;
use fretfall::chart::SongLibrary;
use fretfall::cli::Args;
use fretfall::config::{data_dir, GameConfig};
use fretfall::game::{run_autoplay, GameSession, NullRenderer};
use fretfall::highscore::YamlHighScoreStore;
use fretfall::tui::run_interactive;

/// Time left for the last notes to ring out after a headless run.
const AUDIO_TAIL: Duration = Duration::from_millis(500);

fn open_log_file() -> io::Result<File> {
    let dir = data_dir();
    fs::create_dir_all(&dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("fretfall.log"))
}

/// Headless logs go to stderr. Interactive logs go to a file since the
/// terminal belongs to the UI.
fn init_logging(level: LevelFilter, headless: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    if !headless {
        match open_log_file() {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!("cannot open log file, logging disabled: {e}");
                builder.filter_level(LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GameConfig::load_from(path)?,
        None => GameConfig::load()?,
    };
    let config = args.apply(config);

    init_logging(config.log_filter(), args.headless || args.list_songs);
    info!("fretfall v{}", env!("CARGO_PKG_VERSION"));

    let library = SongLibrary::scan(&config.songs_dir)?;
    if args.list_songs {
        for (i, name) in library.names().enumerate() {
            println!("{:>2}  {name}", i + 1);
        }
        return Ok(());
    }

    let song = config.default_song.clone();
    let player = open_player(!args.no_audio, config.volume);
    let store = Box::new(YamlHighScoreStore::new(config.high_score_path()));

    if !args.headless {
        run_interactive(&config, library, &song, player, store)?;
        return Ok(());
    }

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))?;

    let mut session = GameSession::new(library, &song, player, Box::new(NullRenderer), store)?;
    let score = run_autoplay(&mut session, config.tick_ms, !args.no_audio, &stop);
    println!("{song}: score {score} (best {})", session.high_score());

    if !args.no_audio {
        thread::sleep(AUDIO_TAIL);
    }
    Ok(())
}
