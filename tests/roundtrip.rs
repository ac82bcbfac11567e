use std::io::Cursor;

use praisedeck::compose::{append_slides_verbatim, append_song_slides, retain_title_slide};
use praisedeck::deck::{Group, ShapeFrame};
use praisedeck::ole::{OleFile, OleWriter};
use praisedeck::pipeline::BUNDLED_ANNOUNCEMENTS;
use praisedeck::ppt::escher::{Rect, ShapeFlags};
use praisedeck::{Color, Error, FillType, Presentation, Shape, ShapeKind, Slide};

mod common;

fn reload(deck: &Presentation) -> Presentation {
    Presentation::from_bytes(&deck.to_bytes().expect("encode")).expect("decode")
}

#[test]
fn blank_deck_round_trips() {
    let deck = reload(&Presentation::blank());
    assert_eq!(deck.slide_count(), 0);
    assert!(deck.pictures().is_empty());
}

#[test]
fn composed_deck_reloads_with_same_content() {
    let mut deck = common::deck(&[("Welcome", &["Sunday 10am"]), ("extra", &[])]);
    retain_title_slide(&mut deck);

    let mut song = Presentation::blank();
    let slide = song.create_slide();
    slide.set_title("Amazing Grace");
    slide.add_shape(common::auto_shape("Amazing Grace"));
    slide.add_shape(common::filled_auto_shape("I once was lost"));
    slide.add_shape(common::generic_shape());
    append_song_slides(&mut deck, song);
    append_slides_verbatim(&mut deck, common::deck(&[("News", &["Retreat"])]));

    let loaded = reload(&deck);
    assert_eq!(loaded.slide_count(), 3);

    let titles: Vec<_> = loaded.slides().iter().map(Slide::title).collect();
    assert_eq!(titles, vec![Some("Welcome"), Some("Amazing Grace"), Some("News")]);

    for (before, after) in deck.slides().iter().zip(loaded.slides()) {
        let kinds = |slide: &Slide| slide.shapes().iter().map(Shape::kind).collect::<Vec<_>>();
        assert_eq!(kinds(before), kinds(after));
        let texts = |slide: &Slide| {
            slide
                .shapes()
                .iter()
                .map(|s| s.text().map(str::to_string))
                .collect::<Vec<_>>()
        };
        assert_eq!(texts(before), texts(after));
    }

    let song_slide = &loaded.slides()[1];
    let title = song_slide.title_run().expect("title");
    assert!(title.char_runs().iter().all(|r| r.color() == Some(Color::CYAN)));
    let fills: Vec<_> = song_slide
        .shapes()
        .iter()
        .filter_map(|s| match s {
            Shape::Auto(auto) => Some(auto.fill().fill_type),
            _ => None,
        })
        .collect();
    assert_eq!(fills, vec![FillType::Background]);
    // new slides bind to the deck's first master when written
    assert_eq!(song_slide.layout().geometry, deck.slides()[1].layout().geometry);
    assert_eq!(song_slide.layout().master_id, 0x8000_0000);
}

#[test]
fn unicode_title_survives() {
    let mut deck = Presentation::blank();
    deck.create_slide().set_title("주 찬양 · Praise");
    let loaded = reload(&deck);
    assert_eq!(loaded.slides()[0].title(), Some("주 찬양 · Praise"));
}

#[test]
fn writing_twice_is_stable() {
    let deck = common::deck(&[("one", &["a", "b"]), ("two", &["c"])]);
    let once = reload(&deck);
    let twice = reload(&once);
    assert_eq!(once.slides(), twice.slides());
}

#[test]
fn groups_keep_their_members() {
    let mut frame = ShapeFrame::new(0);
    frame.flags |= ShapeFlags::GROUP;
    let group = Shape::from_frame(
        frame,
        None,
        Some(Group {
            bounds: Rect::new(0, 0, 1000, 500),
            children: vec![common::auto_shape("inside"), common::generic_shape()],
        }),
    );
    let mut deck = Presentation::blank();
    deck.create_slide().add_shape(group);

    let loaded = reload(&deck);
    let shape = &loaded.slides()[0].shapes()[0];
    assert_eq!(shape.kind(), ShapeKind::Generic);
    let kinds: Vec<_> = shape.children().iter().map(Shape::kind).collect();
    assert_eq!(kinds, vec![ShapeKind::Auto, ShapeKind::Generic]);
    assert_eq!(shape.children()[0].text(), Some("inside"));
}

#[test]
fn bundled_announcements_are_readable() {
    let deck = Presentation::from_bytes(BUNDLED_ANNOUNCEMENTS).expect("bundled deck");
    let titles: Vec<_> = deck.slides().iter().filter_map(Slide::title).collect();
    assert_eq!(titles, vec!["Announcements", "Prayer Meeting"]);
    for slide in deck.slides() {
        assert_eq!(slide.shape_count(), 2);
    }
}

#[test]
fn non_ole_input_is_rejected() {
    let err = Presentation::from_bytes(b"not a presentation at all").unwrap_err();
    assert!(matches!(err, Error::NotPresentation(_)));
}

#[test]
fn ole_without_document_stream_is_rejected() {
    let mut writer = OleWriter::new();
    writer.create_stream(&["WordDocument"], &[0u8; 64]).unwrap();
    let err = Presentation::from_bytes(&writer.to_bytes().unwrap()).unwrap_err();
    assert!(matches!(err, Error::NotPresentation(_)));
}

#[test]
fn encrypted_deck_is_unsupported() {
    let bytes = common::deck(&[("secret", &[])]).to_bytes().unwrap();
    let mut ole = OleFile::open(Cursor::new(bytes)).unwrap();

    let mut writer = OleWriter::new();
    for path in ole.list_streams() {
        let parts: Vec<&str> = path.iter().map(String::as_str).collect();
        let mut data = ole.open_stream(&parts).unwrap();
        if parts == ["Current User"] {
            data[12..16].copy_from_slice(&0xF3D1_C4DFu32.to_le_bytes());
        }
        writer.create_stream(&parts, &data).unwrap();
    }
    let err = Presentation::from_bytes(&writer.to_bytes().unwrap()).unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = praisedeck::ppt::load(dir.path().join("absent.ppt")).unwrap_err();
    assert!(err.is_io());
}

#[test]
fn saved_deck_loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_deck(dir.path(), "deck.ppt", &common::deck(&[("Hymn", &["verse"])]));
    let deck = praisedeck::ppt::load(&path).unwrap();
    assert_eq!(deck.slides()[0].title(), Some("Hymn"));
}
