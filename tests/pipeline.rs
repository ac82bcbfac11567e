use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use praisedeck::{FixedClock, Pipeline, PipelineConfig, Presentation, Request, Slide};

mod common;

/// Thursday 2026-10-15, noon in California.
fn thursday() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-10-15T19:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn config(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        staging_dir: dir.join("tmp"),
        announcements_file: dir.join("announcements.ppt"),
        ..PipelineConfig::default()
    }
}

fn pipeline(dir: &Path) -> Pipeline {
    Pipeline::new(config(dir)).with_clock(Box::new(FixedClock(thursday())))
}

fn fixture_decks(dir: &Path) -> (PathBuf, Vec<PathBuf>) {
    let title = common::write_deck(
        dir,
        "title.ppt",
        &common::deck(&[("Welcome", &["Service starts at 10"]), ("leftover", &[])]),
    );
    let songs = vec![
        common::write_deck(
            dir,
            "grace.ppt",
            &common::deck(&[
                ("Amazing Grace", &["Amazing Grace", "How sweet"]),
                ("Amazing Grace", &["I once"]),
            ]),
        ),
        common::write_deck(dir, "holy.ppt", &common::deck(&[("Holy Holy Holy", &["Lord God"])])),
    ];
    (title, songs)
}

#[test]
fn builds_thursday_deck_next_to_title_deck() {
    let dir = tempfile::tempdir().unwrap();
    let (title, songs) = fixture_decks(dir.path());

    let output = pipeline(dir.path())
        .run(&Request::new(&title, songs))
        .unwrap();

    assert!(output.is_absolute());
    assert_eq!(output.file_name().unwrap(), "TBS_2026-10-15.ppt");
    assert_eq!(
        fs::canonicalize(output.parent().unwrap()).unwrap(),
        fs::canonicalize(dir.path()).unwrap()
    );

    let deck = praisedeck::ppt::load(&output).unwrap();
    let titles: Vec<_> = deck.slides().iter().filter_map(Slide::title).collect();
    assert_eq!(
        titles,
        vec![
            "Welcome",
            "Amazing Grace",
            "Amazing Grace",
            "Holy Holy Holy",
            "Announcements",
            "Prayer Meeting"
        ]
    );

    assert!(!dir.path().join("tmp").exists());
    assert!(!dir.path().join("announcements.ppt").exists());
}

#[test]
fn zero_song_decks() {
    let dir = tempfile::tempdir().unwrap();
    let (title, _) = fixture_decks(dir.path());
    let output = pipeline(dir.path())
        .run(&Request::new(&title, Vec::new()))
        .unwrap();
    let deck = praisedeck::ppt::load(&output).unwrap();
    assert_eq!(deck.slide_count(), 3);
    assert_eq!(deck.slides()[0].title(), Some("Welcome"));
}

#[test]
fn inputs_are_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let (title, songs) = fixture_decks(dir.path());
    let before: Vec<Vec<u8>> = std::iter::once(&title)
        .chain(&songs)
        .map(|p| fs::read(p).unwrap())
        .collect();

    pipeline(dir.path())
        .run(&Request::new(&title, songs.clone()))
        .unwrap();

    let after: Vec<Vec<u8>> = std::iter::once(&title)
        .chain(&songs)
        .map(|p| fs::read(p).unwrap())
        .collect();
    assert_eq!(before, after);
    assert_eq!(Presentation::from_bytes(&after[0]).unwrap().slide_count(), 2);
}

#[test]
fn failed_run_cleans_up_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (title, _) = fixture_decks(dir.path());
    let broken = dir.path().join("broken.ppt");
    fs::write(&broken, b"this is not a deck").unwrap();

    let result = pipeline(dir.path()).run(&Request::new(&title, vec![broken]));
    assert!(result.is_err());
    assert!(!dir.path().join("tmp").exists());
    assert!(!dir.path().join("TBS_2026-10-15.ppt").exists());
}

#[test]
fn missing_song_deck_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (title, _) = fixture_decks(dir.path());
    let err = pipeline(dir.path())
        .run(&Request::new(&title, vec![dir.path().join("absent.ppt")]))
        .unwrap_err();
    assert!(err.is_io());
    assert!(!dir.path().join("tmp").exists());
}

#[test]
fn announcements_override_and_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (title, _) = fixture_decks(dir.path());
    let news = common::write_deck(dir.path(), "news.ppt", &common::deck(&[("Baptism", &[])]));
    let out = dir.path().join("out");

    let config = PipelineConfig {
        announcements_override: Some(news),
        output_dir: Some(out.clone()),
        ..config(dir.path())
    };
    let output = Pipeline::new(config)
        .with_clock(Box::new(FixedClock(thursday())))
        .run(&Request::new(&title, Vec::new()))
        .unwrap();

    assert!(output.starts_with(&out));
    let deck = praisedeck::ppt::load(&output).unwrap();
    assert_eq!(deck.slide_count(), 2);
    assert_eq!(deck.slides()[1].title(), Some("Baptism"));
}
