//! The three slide-transfer policies of the weekly deck.
//!
//! The orchestrator applies them in a fixed order: [`retain_title_slide`] on the title
//! deck, [`append_song_slides`] once per song deck, then [`append_slides_verbatim`] for
//! the announcements.

use std::collections::HashMap;

use crate::deck::{Color, FillType, Presentation, Shape, Slide, SlideLayout};

/// Accent color of song titles.
pub const TITLE_ACCENT: Color = Color::CYAN;

/// Drop every slide but the first.
///
/// Removal runs from the last index down to 1 so earlier indices never shift.
pub fn retain_title_slide(deck: &mut Presentation) {
    let count = deck.slide_count();
    for index in (1..count).rev() {
        deck.remove_slide(index);
    }
    if count > 1 {
        log::debug!("dropped {} slides after the title slide", count - 1);
    }
}

/// Append one transformed slide to `dest` for each slide of `source`.
///
/// Each new slide gets the source title as its own title. Auto shapes repeating the
/// title are left out; every other auto shape is switched to a background fill. The
/// new title is colored with [`TITLE_ACCENT`] once the shapes are in place.
///
/// Every auto shape whose text equals the title is skipped, not only the first one.
/// An empty title never matches.
///
/// Returns the number of slides appended.
pub fn append_song_slides(dest: &mut Presentation, source: Presentation) -> usize {
    let (slides, pictures) = source.into_parts();
    let mut imported = HashMap::new();
    let count = slides.len();

    for source_slide in slides {
        let title = source_slide.title().unwrap_or_default().to_string();
        let mut slide = Slide::new();
        slide.set_layout(SlideLayout::title_only());
        slide.set_title(&title);

        let mut skipped = 0usize;
        for mut shape in source_slide.into_shapes() {
            if let Shape::Auto(auto) = &mut shape {
                if !title.is_empty() && auto.text.as_ref().is_some_and(|t| t.text() == title) {
                    skipped += 1;
                    continue;
                }
                auto.set_fill_type(FillType::Background);
            }
            dest.adopt_pictures(&mut shape, &pictures, &mut imported);
            slide.add_shape(shape);
        }

        if let Some(run) = slide.title_run_mut() {
            run.set_font_color(TITLE_ACCENT);
        }
        log::debug!(
            "song slide '{}': {} shapes, {} duplicate titles skipped",
            title,
            slide.shape_count(),
            skipped
        );
        dest.add_slide(slide);
    }
    count
}

/// Append every slide of `source` to `dest` with its shapes untouched.
///
/// Returns the number of slides appended.
pub fn append_slides_verbatim(dest: &mut Presentation, source: Presentation) -> usize {
    let (slides, pictures) = source.into_parts();
    let mut imported = HashMap::new();
    let count = slides.len();

    for source_slide in slides {
        let mut slide = Slide::new();
        for mut shape in source_slide.into_shapes() {
            dest.adopt_pictures(&mut shape, &pictures, &mut imported);
            slide.add_shape(shape);
        }
        dest.add_slide(slide);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{ShapeFrame, ShapeKind, TextRun, TextType};

    fn auto_shape(text: &str) -> Shape {
        let mut shape = Shape::from_frame(ShapeFrame::new(1), None, None);
        if let Shape::Auto(auto) = &mut shape {
            auto.text = Some(TextRun::new(TextType::Body, text));
        }
        shape
    }

    fn deck_with_titles(titles: &[&str]) -> Presentation {
        let mut deck = Presentation::blank();
        for title in titles {
            deck.create_slide().set_title(title);
        }
        deck
    }

    #[test]
    fn test_retain_title_slide() {
        let mut deck = deck_with_titles(&["first", "second", "third"]);
        retain_title_slide(&mut deck);
        assert_eq!(deck.slide_count(), 1);
        assert_eq!(deck.slide(0).and_then(Slide::title), Some("first"));

        let mut empty = Presentation::blank();
        retain_title_slide(&mut empty);
        assert_eq!(empty.slide_count(), 0);
    }

    #[test]
    fn test_untitled_song_slide_keeps_every_shape() {
        let mut source = Presentation::blank();
        let slide = source.create_slide();
        slide.add_shape(auto_shape(""));
        slide.add_shape(auto_shape("verse"));

        let mut dest = Presentation::blank();
        assert_eq!(append_song_slides(&mut dest, source), 1);
        let slide = dest.slide(0).unwrap();
        assert_eq!(slide.title(), Some(""));
        // new title plus both auto shapes
        assert_eq!(slide.shape_count(), 3);
    }

    #[test]
    fn test_all_duplicate_titles_are_skipped() {
        let mut source = Presentation::blank();
        let slide = source.create_slide();
        slide.set_title("Holy");
        slide.add_shape(auto_shape("Holy"));
        slide.add_shape(auto_shape("Holy"));

        let mut dest = Presentation::blank();
        append_song_slides(&mut dest, source);
        let slide = dest.slide(0).unwrap();
        let kinds: Vec<ShapeKind> = slide.shapes().iter().map(Shape::kind).collect();
        // the new title and the transferred source title text box
        assert_eq!(kinds, vec![ShapeKind::Text, ShapeKind::Text]);
    }

    #[test]
    fn test_verbatim_keeps_fill_and_title() {
        let mut source = Presentation::blank();
        let slide = source.create_slide();
        let mut shape = auto_shape("Coffee after service");
        if let Shape::Auto(auto) = &mut shape {
            auto.set_fill_type(FillType::Solid);
        }
        slide.add_shape(shape.clone());

        let mut dest = Presentation::blank();
        assert_eq!(append_slides_verbatim(&mut dest, source), 1);
        let slide = dest.slide(0).unwrap();
        assert_eq!(slide.shapes(), &[shape]);
        assert_eq!(slide.title(), None);
    }
}
