//! Shapes on a slide.

use super::{Color, TextRun, TextType};
use crate::ppt::escher::{
    Anchor, Placeholder, PropertyTable, Rect, ShapeFlags, placeholder_id, prop_id, shape_type,
};

/// Where a new title sits on the slide, in master units.
pub const TITLE_ANCHOR: Rect = Rect::new(432, 384, 5328, 1104);

/// Escher data shared by every shape variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeFrame {
    /// Shape id as loaded; the writer assigns fresh ids
    pub shape_id: u32,
    /// Geometry (`Sp` instance)
    pub geometry: u16,
    pub flags: ShapeFlags,
    pub anchor: Option<Anchor>,
    pub properties: PropertyTable,
    pub placeholder: Option<Placeholder>,
    /// Escher records besides the ones modelled above
    pub escher_extras: Vec<Vec<u8>>,
    /// Client data records besides the placeholder atom
    pub client_extras: Vec<Vec<u8>>,
}

impl ShapeFrame {
    pub fn new(geometry: u16) -> Self {
        Self {
            shape_id: 0,
            geometry,
            flags: ShapeFlags::HAVE_ANCHOR | ShapeFlags::HAVE_SPT,
            anchor: None,
            properties: PropertyTable::new(),
            placeholder: None,
            escher_extras: Vec::new(),
            client_extras: Vec::new(),
        }
    }
}

/// Discriminator of [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Text,
    Auto,
    Generic,
}

impl ShapeKind {
    /// Kind of a shape with the given geometry and flags.
    pub fn classify(geometry: u16, flags: ShapeFlags) -> Self {
        if flags.intersects(ShapeFlags::GROUP | ShapeFlags::OLE_SHAPE) {
            return ShapeKind::Generic;
        }
        match geometry {
            shape_type::TEXT_BOX => ShapeKind::Text,
            shape_type::NOT_PRIMITIVE
            | shape_type::LINE
            | shape_type::PICTURE_FRAME
            | shape_type::HOST_CONTROL => ShapeKind::Generic,
            _ => ShapeKind::Auto,
        }
    }
}

/// Fill type (`fillType` property).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillType {
    Solid,
    Pattern,
    Texture,
    Picture,
    Shade,
    ShadeCenter,
    ShadeShape,
    ShadeScale,
    ShadeTitle,
    Background,
    Other(u32),
}

impl FillType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => FillType::Solid,
            1 => FillType::Pattern,
            2 => FillType::Texture,
            3 => FillType::Picture,
            4 => FillType::Shade,
            5 => FillType::ShadeCenter,
            6 => FillType::ShadeShape,
            7 => FillType::ShadeScale,
            8 => FillType::ShadeTitle,
            9 => FillType::Background,
            other => FillType::Other(other),
        }
    }

    pub fn to_u32(self) -> u32 {
        match self {
            FillType::Solid => 0,
            FillType::Pattern => 1,
            FillType::Texture => 2,
            FillType::Picture => 3,
            FillType::Shade => 4,
            FillType::ShadeCenter => 5,
            FillType::ShadeShape => 6,
            FillType::ShadeScale => 7,
            FillType::ShadeTitle => 8,
            FillType::Background => 9,
            FillType::Other(other) => other,
        }
    }
}

/// Fill of an auto shape, read from its property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub fill_type: FillType,
    pub color: Option<Color>,
}

/// A text box; the shape kind that holds slide titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextShape {
    pub frame: ShapeFrame,
    pub text: Option<TextRun>,
}

/// A geometric auto shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoShape {
    pub frame: ShapeFrame,
    pub text: Option<TextRun>,
}

impl AutoShape {
    pub fn fill(&self) -> Fill {
        let props = &self.frame.properties;
        Fill {
            fill_type: FillType::from_u32(props.get(prop_id::FILL_TYPE).unwrap_or(0)),
            color: props.get(prop_id::FILL_COLOR).map(Color::from_colorref),
        }
    }

    pub fn set_fill_type(&mut self, fill_type: FillType) {
        self.frame
            .properties
            .set(prop_id::FILL_TYPE, fill_type.to_u32());
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.frame
            .properties
            .set(prop_id::FILL_COLOR, color.to_colorref());
    }
}

/// Child shapes of a group and their coordinate space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub bounds: Rect,
    pub children: Vec<Shape>,
}

/// Pictures, lines, OLE frames, groups and anything else carried unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericShape {
    pub frame: ShapeFrame,
    pub text: Option<TextRun>,
    pub group: Option<Group>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Text(TextShape),
    Auto(AutoShape),
    Generic(GenericShape),
}

impl Shape {
    /// Build the variant matching the frame's geometry and flags.
    pub fn from_frame(frame: ShapeFrame, text: Option<TextRun>, group: Option<Group>) -> Self {
        match (ShapeKind::classify(frame.geometry, frame.flags), group) {
            (_, Some(group)) => Shape::Generic(GenericShape {
                frame,
                text,
                group: Some(group),
            }),
            (ShapeKind::Text, None) => Shape::Text(TextShape { frame, text }),
            (ShapeKind::Auto, None) => Shape::Auto(AutoShape { frame, text }),
            (ShapeKind::Generic, None) => Shape::Generic(GenericShape {
                frame,
                text,
                group: None,
            }),
        }
    }

    /// A title placeholder text box holding `text`.
    pub fn title(text: &str) -> Self {
        let mut frame = ShapeFrame::new(shape_type::TEXT_BOX);
        frame.anchor = Some(Anchor::Client(TITLE_ANCHOR));
        frame.placeholder = Some(Placeholder {
            position: 0,
            placement_id: placeholder_id::TITLE,
            size: 0,
        });
        frame.properties = [
            (prop_id::WRAP_TEXT, 0),
            (prop_id::ANCHOR_TEXT, 1),
            (prop_id::FILL_BOOLEANS, 0x0010_0000),
            (prop_id::LINE_BOOLEANS, 0x0008_0000),
        ]
        .into_iter()
        .collect();
        Shape::Text(TextShape {
            frame,
            text: Some(TextRun::new(TextType::Title, text)),
        })
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Text(_) => ShapeKind::Text,
            Shape::Auto(_) => ShapeKind::Auto,
            Shape::Generic(_) => ShapeKind::Generic,
        }
    }

    pub fn frame(&self) -> &ShapeFrame {
        match self {
            Shape::Text(s) => &s.frame,
            Shape::Auto(s) => &s.frame,
            Shape::Generic(s) => &s.frame,
        }
    }

    pub fn frame_mut(&mut self) -> &mut ShapeFrame {
        match self {
            Shape::Text(s) => &mut s.frame,
            Shape::Auto(s) => &mut s.frame,
            Shape::Generic(s) => &mut s.frame,
        }
    }

    pub fn text_run(&self) -> Option<&TextRun> {
        match self {
            Shape::Text(s) => s.text.as_ref(),
            Shape::Auto(s) => s.text.as_ref(),
            Shape::Generic(s) => s.text.as_ref(),
        }
    }

    pub fn text_run_mut(&mut self) -> Option<&mut TextRun> {
        match self {
            Shape::Text(s) => s.text.as_mut(),
            Shape::Auto(s) => s.text.as_mut(),
            Shape::Generic(s) => s.text.as_mut(),
        }
    }

    /// Text of the shape, if it has a text block.
    pub fn text(&self) -> Option<&str> {
        self.text_run().map(TextRun::text)
    }

    /// Group children, for group shapes.
    pub fn children(&self) -> &[Shape] {
        match self {
            Shape::Generic(GenericShape {
                group: Some(group),
                ..
            }) => &group.children,
            _ => &[],
        }
    }

    /// Visit this frame and every nested group child's frame.
    pub fn for_each_frame_mut(&mut self, f: &mut dyn FnMut(&mut ShapeFrame)) {
        if let Shape::Generic(GenericShape {
            group: Some(group),
            ..
        }) = self
        {
            for child in &mut group.children {
                child.for_each_frame_mut(f);
            }
        }
        f(self.frame_mut());
    }

    /// Number of escher shapes this shape writes, group members included.
    pub fn escher_shape_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Shape::escher_shape_count)
            .sum::<usize>()
    }
}
