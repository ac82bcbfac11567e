#![allow(dead_code)]

use std::path::{Path, PathBuf};

use praisedeck::deck::ShapeFrame;
use praisedeck::{FillType, Presentation, Shape, TextRun, TextType};

/// An auto shape (rectangle) holding body text.
pub fn auto_shape(text: &str) -> Shape {
    Shape::from_frame(
        ShapeFrame::new(1),
        Some(TextRun::new(TextType::Body, text)),
        None,
    )
}

/// An auto shape with a solid fill.
pub fn filled_auto_shape(text: &str) -> Shape {
    let mut shape = auto_shape(text);
    if let Shape::Auto(auto) = &mut shape {
        auto.set_fill_type(FillType::Solid);
    }
    shape
}

/// A picture frame without a picture; a generic shape.
pub fn generic_shape() -> Shape {
    Shape::from_frame(ShapeFrame::new(75), None, None)
}

/// A deck with one titled slide per entry, each carrying the given auto shapes.
pub fn deck(slides: &[(&str, &[&str])]) -> Presentation {
    let mut deck = Presentation::blank();
    for (title, bodies) in slides {
        let slide = deck.create_slide();
        slide.set_title(title);
        for body in *bodies {
            slide.add_shape(auto_shape(body));
        }
    }
    deck
}

/// Save `deck` as `name` under `dir`.
pub fn write_deck(dir: &Path, name: &str, deck: &Presentation) -> PathBuf {
    let path = dir.join(name);
    deck.save(&path).expect("write fixture deck");
    path
}
