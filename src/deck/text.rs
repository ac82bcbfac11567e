//! Text blocks attached to shapes.

use super::Color;
use crate::ppt::text_prop::{CharRun, StyleTextProp, TextStyle};

/// Role of a text block (`TextHeaderAtom` value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextType {
    Title,
    Body,
    Notes,
    Other,
    CenterBody,
    CenterTitle,
    HalfBody,
    QuarterBody,
    Unknown(u32),
}

impl TextType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => TextType::Title,
            1 => TextType::Body,
            2 => TextType::Notes,
            4 => TextType::Other,
            5 => TextType::CenterBody,
            6 => TextType::CenterTitle,
            7 => TextType::HalfBody,
            8 => TextType::QuarterBody,
            other => TextType::Unknown(other),
        }
    }

    pub fn to_u32(self) -> u32 {
        match self {
            TextType::Title => 0,
            TextType::Body => 1,
            TextType::Notes => 2,
            TextType::Other => 4,
            TextType::CenterBody => 5,
            TextType::CenterTitle => 6,
            TextType::HalfBody => 7,
            TextType::QuarterBody => 8,
            TextType::Unknown(other) => other,
        }
    }

    /// Whether a block of this type names its slide.
    pub fn is_title(self) -> bool {
        matches!(self, TextType::Title | TextType::CenterTitle)
    }
}

/// A text block: its role, raw text and style runs.
///
/// Paragraphs are separated by `'\r'` as stored in the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    text_type: TextType,
    text: String,
    style: Option<StyleTextProp>,
    /// Other records of the block (rulers, special info), kept verbatim
    pub(crate) extras: Vec<Vec<u8>>,
}

impl TextRun {
    /// A block with one unstyled paragraph and character run.
    pub fn new(text_type: TextType, text: &str) -> Self {
        Self {
            text_type,
            text: text.to_string(),
            style: Some(StyleTextProp::Parsed(TextStyle::plain(utf16_len(text)))),
            extras: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        text_type: TextType,
        text: String,
        style: Option<StyleTextProp>,
        extras: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            text_type,
            text,
            style,
            extras,
        }
    }

    pub fn text_type(&self) -> TextType {
        self.text_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text; styling resets to a single plain run.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.style = Some(StyleTextProp::Parsed(TextStyle::plain(utf16_len(text))));
        self.extras.clear();
    }

    pub fn style(&self) -> Option<&StyleTextProp> {
        self.style.as_ref()
    }

    /// Styled sub-runs. Empty when the style atom could not be decoded.
    pub fn char_runs(&self) -> &[CharRun] {
        self.style.as_ref().map(StyleTextProp::char_runs).unwrap_or(&[])
    }

    pub fn char_runs_mut(&mut self) -> &mut [CharRun] {
        match self.style.as_mut() {
            Some(style) => style.char_runs_mut(),
            None => &mut [],
        }
    }

    /// Set the font color of every styled sub-run.
    pub fn set_font_color(&mut self, color: Color) {
        for run in self.char_runs_mut() {
            run.set_color(color);
        }
    }

    /// Length in UTF-16 units, as style runs count it.
    pub fn utf16_len(&self) -> usize {
        utf16_len(&self.text)
    }
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_type_codes() {
        for code in 0..=9 {
            assert_eq!(TextType::from_u32(code).to_u32(), code);
        }
        assert!(TextType::CenterTitle.is_title());
        assert!(!TextType::Body.is_title());
    }

    #[test]
    fn test_font_color_applies_to_every_run() {
        let mut run = TextRun::new(TextType::Title, "Amazing Grace");
        run.set_font_color(Color::CYAN);
        assert_eq!(run.char_runs().len(), 1);
        assert_eq!(run.char_runs()[0].color(), Some(Color::CYAN));
        assert_eq!(run.char_runs()[0].length, 14);
    }

    #[test]
    fn test_opaque_style_has_no_runs() {
        let mut run = TextRun::from_parts(
            TextType::Body,
            "x".to_string(),
            Some(StyleTextProp::Opaque(vec![1, 2, 3])),
            Vec::new(),
        );
        run.set_font_color(Color::CYAN);
        assert!(run.char_runs().is_empty());
    }
}
