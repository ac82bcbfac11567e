use super::{Shape, ShapeFrame, ShapeKind, TextRun};
use crate::common::binary::{read_u16_le, read_u32_le};
use crate::common::Result;

/// Layout geometries of `SlideAtom`
pub mod layout_geometry {
    pub const TITLE_SLIDE: u32 = 0x00;
    pub const TITLE_BODY: u32 = 0x01;
    pub const TITLE_ONLY: u32 = 0x07;
    pub const BLANK: u32 = 0x10;
}

/// Follow master objects, scheme and background.
pub const FOLLOW_MASTER: u16 = 0x0007;

/// Layout and master binding of a slide (`SlideAtom`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideLayout {
    pub geometry: u32,
    pub placeholders: [u8; 8],
    /// Master slide id; 0 binds to the deck's first master when written
    pub master_id: u32,
    pub flags: u16,
}

impl Default for SlideLayout {
    fn default() -> Self {
        Self::blank()
    }
}

impl SlideLayout {
    pub fn blank() -> Self {
        Self {
            geometry: layout_geometry::BLANK,
            placeholders: [0; 8],
            master_id: 0,
            flags: FOLLOW_MASTER,
        }
    }

    pub fn title_only() -> Self {
        let mut placeholders = [0; 8];
        placeholders[0] = crate::ppt::escher::placeholder_id::TITLE;
        Self {
            geometry: layout_geometry::TITLE_ONLY,
            placeholders,
            master_id: 0,
            flags: FOLLOW_MASTER,
        }
    }

    /// Decode a `SlideAtom` payload.
    pub(crate) fn parse(data: &[u8]) -> Result<Self> {
        let mut placeholders = [0u8; 8];
        placeholders.copy_from_slice(crate::common::binary::read_bytes(data, 4, 8)?);
        Ok(Self {
            geometry: read_u32_le(data, 0)?,
            placeholders,
            master_id: read_u32_le(data, 12)?,
            flags: read_u16_le(data, 20)?,
        })
    }
}

/// A slide: ordered shapes plus the index of the shape holding the title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slide {
    shapes: Vec<Shape>,
    title_run: Option<usize>,
    pub(crate) layout: SlideLayout,
    pub(crate) background: Option<ShapeFrame>,
    /// Slide records between the atom and the drawing, kept verbatim
    pub(crate) leading_records: Vec<u8>,
    /// Slide records after the drawing, kept verbatim
    pub(crate) trailing_records: Vec<u8>,
}

impl Slide {
    /// An empty slide bound to the first master.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        shapes: Vec<Shape>,
        layout: SlideLayout,
        background: Option<ShapeFrame>,
        leading_records: Vec<u8>,
        trailing_records: Vec<u8>,
    ) -> Self {
        let mut slide = Self {
            shapes,
            title_run: None,
            layout,
            background,
            leading_records,
            trailing_records,
        };
        slide.title_run = slide.locate_title();
        slide
    }

    /// First text or auto shape whose block is a title or center title.
    fn locate_title(&self) -> Option<usize> {
        self.shapes.iter().position(|shape| {
            matches!(shape.kind(), ShapeKind::Text | ShapeKind::Auto)
                && shape
                    .text_run()
                    .is_some_and(|run| run.text_type().is_title())
        })
    }

    pub fn layout(&self) -> &SlideLayout {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: SlideLayout) {
        self.layout = layout;
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shapes_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Take the shapes out, consuming the slide.
    pub fn into_shapes(self) -> Vec<Shape> {
        self.shapes
    }

    /// Index of the shape holding the title.
    pub fn title_index(&self) -> Option<usize> {
        self.title_run
    }

    /// Set the title, adding a title placeholder when the slide has none.
    pub fn set_title(&mut self, text: &str) -> &mut TextRun {
        let index = match self.title_run {
            Some(index) if self.shapes[index].text_run().is_some() => index,
            _ => {
                self.shapes.push(Shape::title(text));
                self.shapes.len() - 1
            },
        };
        self.title_run = Some(index);
        let shape = &mut self.shapes[index];
        let run = match shape {
            Shape::Text(s) => &mut s.text,
            Shape::Auto(s) => &mut s.text,
            Shape::Generic(s) => &mut s.text,
        }
        .get_or_insert_with(|| TextRun::new(super::TextType::Title, text));
        if run.text() != text {
            run.set_text(text);
        }
        run
    }

    pub fn title_run(&self) -> Option<&TextRun> {
        self.title_run
            .and_then(|index| self.shapes.get(index))
            .and_then(Shape::text_run)
    }

    pub fn title_run_mut(&mut self) -> Option<&mut TextRun> {
        let index = self.title_run?;
        self.shapes.get_mut(index).and_then(Shape::text_run_mut)
    }

    /// Title text, if the slide has a title.
    pub fn title(&self) -> Option<&str> {
        self.title_run().map(TextRun::text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{ShapeFrame, TextType};

    fn body_shape(text: &str) -> Shape {
        let mut shape = Shape::from_frame(ShapeFrame::new(1), None, None);
        if let Shape::Auto(s) = &mut shape {
            s.text = Some(TextRun::new(TextType::Body, text));
        }
        shape
    }

    #[test]
    fn test_set_title_adds_placeholder_once() {
        let mut slide = Slide::new();
        slide.add_shape(body_shape("verse"));
        slide.set_title("Amazing Grace");
        slide.set_title("How Great Thou Art");
        assert_eq!(slide.shape_count(), 2);
        assert_eq!(slide.title_index(), Some(1));
        assert_eq!(slide.title(), Some("How Great Thou Art"));
    }

    #[test]
    fn test_loaded_title_is_located() {
        let mut title = body_shape("Welcome");
        if let Shape::Auto(s) = &mut title {
            s.text = Some(TextRun::new(TextType::CenterTitle, "Welcome"));
        }
        let slide = Slide::from_parts(
            vec![body_shape("verse"), title],
            SlideLayout::default(),
            None,
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(slide.title_index(), Some(1));
        assert_eq!(slide.title(), Some("Welcome"));
    }

    #[test]
    fn test_untitled_slide() {
        let slide = Slide::from_parts(
            vec![body_shape("verse")],
            SlideLayout::default(),
            None,
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(slide.title(), None);
    }

    #[test]
    fn test_layout_parse() {
        let mut data = Vec::new();
        data.extend_from_slice(&layout_geometry::TITLE_ONLY.to_le_bytes());
        data.extend_from_slice(&[13, 0, 0, 0, 0, 0, 0, 0]);
        data.extend_from_slice(&0x8000_0000u32.to_le_bytes());
        data.extend_from_slice(&0x100u32.to_le_bytes());
        data.extend_from_slice(&FOLLOW_MASTER.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        let layout = SlideLayout::parse(&data).unwrap();
        assert_eq!(layout.master_id, 0x8000_0000);
        assert_eq!(layout.placeholders[0], 13);
        assert_eq!(layout.flags, FOLLOW_MASTER);
    }
}
