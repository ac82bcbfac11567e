//! In-memory deck model: presentations, slides, shapes and their text.
//!
//! Shapes are owned by exactly one slide. Moving a shape into another slide moves the
//! value; composition never shares a shape between slides.

pub mod color;
pub mod presentation;
pub mod shape;
pub mod slide;
pub mod text;

pub use color::Color;
pub use presentation::Presentation;
pub use shape::{
    AutoShape, Fill, FillType, GenericShape, Group, Shape, ShapeFrame, ShapeKind, TextShape,
};
pub use slide::{Slide, SlideLayout};
pub use text::{TextRun, TextType};
