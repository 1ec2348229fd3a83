//! Chart loading — CSV parsing and the song library against files on disk.

use std::fs;

use tempfile::TempDir;

use fretfall::chart::{parse_chart, ChartError, Lane, SongLibrary};

const HEADER: &str = "user_played, instrument_name, velocity, pitch, start (s), end (s)\n";

#[test]
fn builtin_songs_parse_cleanly() {
    let lib = SongLibrary::builtin();
    assert_eq!(lib.names().collect::<Vec<_>>(), vec!["amongUs", "IWonder"]);
    for name in ["amongUs", "IWonder"] {
        let timeline = lib.load(name).unwrap();
        assert_eq!(timeline.len(), 20);
        assert!(timeline.interactive_count() > 0);
        assert!(timeline.end_time() > 2.0);
    }
}

#[test]
fn bad_rows_are_dropped_and_defaults_applied() {
    let text = format!(
        "{HEADER}\
         True,violin,70,62,0.5,1.8\n\
         True,,oops,60,0.0,0.4\n\
         maybe,piano,90,abc,1.0,1.2\n\
         False,piano,90,200,2.0,1.5\n"
    );
    let rows = parse_chart(&text).unwrap();
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].instrument, "violin");
    assert_eq!(rows[1].instrument, "piano");
    assert_eq!(rows[1].velocity, 96);
    assert!(!rows[2].user_played);
    assert_eq!(rows[2].pitch, 127);
}

#[test]
fn chart_without_header_is_rejected() {
    assert!(matches!(parse_chart(""), Err(ChartError::MissingHeader)));
    assert!(matches!(
        parse_chart("user_played, instrument_name\nTrue,piano\n"),
        Err(ChartError::MissingColumn(_))
    ));
}

#[test]
fn songs_directory_extends_and_shadows() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("scale.csv"),
        format!("{HEADER}True,piano,96,60,0.0,0.3\nTrue,piano,96,61,0.4,0.7\n"),
    )
    .unwrap();
    fs::write(
        dir.path().join("IWonder.csv"),
        format!("{HEADER}True,piano,96,63,0.0,1.5\n"),
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a chart").unwrap();

    let lib = SongLibrary::scan(dir.path()).unwrap();
    assert_eq!(
        lib.names().collect::<Vec<_>>(),
        vec!["amongUs", "IWonder", "scale"]
    );

    let scale = lib.load("scale").unwrap();
    assert_eq!(scale.len(), 2);
    assert_eq!(scale.notes()[1].lane(), Lane::new(1).unwrap());

    let shadowed = lib.load("IWonder").unwrap();
    assert_eq!(shadowed.len(), 1);
    assert!(shadowed.notes()[0].is_sustain());
}

#[test]
fn missing_directory_falls_back_to_builtins() {
    let dir = TempDir::new().unwrap();
    let lib = SongLibrary::scan(&dir.path().join("absent")).unwrap();
    assert_eq!(lib.len(), 2);
}

#[test]
fn song_cycling_wraps() {
    let lib = SongLibrary::builtin();
    assert_eq!(lib.next_after("IWonder"), Some("amongUs"));
    assert_eq!(lib.prev_before("amongUs"), Some("IWonder"));
    assert!(matches!(lib.load("nope"), Err(ChartError::UnknownSong(_))));
}
