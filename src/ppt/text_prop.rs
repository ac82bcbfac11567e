//! `StyleTextPropAtom`: paragraph and character style runs of a text block.
//!
//! The atom holds paragraph runs followed by character runs. Each run covers a number of
//! UTF-16 units; together the runs of one kind cover the text plus one terminating
//! character. Which fields a run carries is given by its mask, and fields appear in a
//! fixed order. Paragraph fields are kept as opaque bytes; character fields are indexed
//! so the font color can be read and replaced.

use crate::common::binary::{read_u16_le, read_u32_le};
use crate::common::{Error, Result};
use crate::deck::Color;

/// Character field masks and sizes, in storage order.
const CHAR_FIELDS: &[(u32, usize)] = &[
    (0x0000_FFFF, 2), // style flags
    (0x0001_0000, 2), // font
    (0x0020_0000, 2), // asian font
    (0x0040_0000, 2), // ansi font
    (0x0080_0000, 2), // symbol font
    (0x0002_0000, 2), // size
    (0x0004_0000, 4), // color
    (0x0008_0000, 2), // position
];

const CHAR_COLOR_MASK: u32 = 0x0004_0000;

/// Paragraph field masks and sizes, in storage order. Tab stops are variable.
const PARAGRAPH_FIELDS: &[(u32, usize)] = &[
    (0x0000_000F, 2), // bullet flags
    (0x0000_0080, 2), // bullet char
    (0x0000_0010, 2), // bullet font
    (0x0000_0040, 2), // bullet size
    (0x0000_0020, 4), // bullet color
    (0x0000_0800, 2), // alignment
    (0x0000_1000, 2), // line spacing
    (0x0000_2000, 2), // space before
    (0x0000_4000, 2), // space after
    (0x0000_0100, 2), // left margin
    (0x0000_0400, 2), // indent
    (0x0000_8000, 2), // default tab size
];

const TAB_STOPS_MASK: u32 = 0x0010_0000;

const PARAGRAPH_TRAILING_FIELDS: &[(u32, usize)] = &[
    (0x0001_0000, 2), // font alignment
    (0x000E_0000, 2), // wrap flags
    (0x0020_0000, 2), // text direction
];

/// A paragraph style run; its fields stay in storage form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphRun {
    /// Covered UTF-16 units
    pub length: u32,
    pub indent_level: u16,
    pub mask: u32,
    pub fields: Vec<u8>,
}

impl ParagraphRun {
    pub fn plain(length: u32) -> Self {
        Self {
            length,
            indent_level: 0,
            mask: 0,
            fields: Vec::new(),
        }
    }
}

/// A character style run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharRun {
    /// Covered UTF-16 units
    pub length: u32,
    mask: u32,
    fields: Vec<u8>,
}

impl CharRun {
    pub fn plain(length: u32) -> Self {
        Self {
            length,
            mask: 0,
            fields: Vec::new(),
        }
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Byte offset of the field selected by `field_mask`, present or not.
    fn field_offset(&self, field_mask: u32) -> usize {
        CHAR_FIELDS
            .iter()
            .take_while(|(mask, _)| *mask != field_mask)
            .filter(|(mask, _)| self.mask & mask != 0)
            .map(|(_, size)| size)
            .sum()
    }

    /// Font color, when the run sets one.
    pub fn color(&self) -> Option<Color> {
        if self.mask & CHAR_COLOR_MASK == 0 {
            return None;
        }
        let at = self.field_offset(CHAR_COLOR_MASK);
        let bytes: [u8; 4] = self.fields.get(at..at + 4)?.try_into().ok()?;
        Some(Color::from_text_bytes(bytes))
    }

    /// Set the font color, inserting the field when absent.
    pub fn set_color(&mut self, color: Color) {
        let at = self.field_offset(CHAR_COLOR_MASK);
        let bytes = color.to_text_bytes();
        if self.mask & CHAR_COLOR_MASK != 0 {
            self.fields[at..at + 4].copy_from_slice(&bytes);
        } else {
            self.fields.splice(at..at, bytes);
            self.mask |= CHAR_COLOR_MASK;
        }
    }
}

/// Decoded style runs of one text block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStyle {
    pub paragraphs: Vec<ParagraphRun>,
    pub characters: Vec<CharRun>,
    /// Bytes after the last character run
    pub trailer: Vec<u8>,
}

impl TextStyle {
    /// One unstyled paragraph run and one unstyled character run covering `text_len`
    /// units plus the terminator.
    pub fn plain(text_len: usize) -> Self {
        let covered = text_len as u32 + 1;
        Self {
            paragraphs: vec![ParagraphRun::plain(covered)],
            characters: vec![CharRun::plain(covered)],
            trailer: Vec::new(),
        }
    }

    /// Decode the atom payload for text of `text_len` UTF-16 units.
    pub fn parse(data: &[u8], text_len: usize) -> Result<Self> {
        let covered = text_len as u64 + 1;
        let mut pos = 0;

        let mut paragraphs = Vec::new();
        let mut total = 0u64;
        while total < covered && pos < data.len() {
            let length = read_u32_le(data, pos)?;
            let indent_level = read_u16_le(data, pos + 4)?;
            let mask = read_u32_le(data, pos + 6)?;
            pos += 10;
            let size = paragraph_fields_size(data, pos, mask)?;
            let fields = slice(data, pos, size)?.to_vec();
            pos += size;
            total += length as u64;
            paragraphs.push(ParagraphRun {
                length,
                indent_level,
                mask,
                fields,
            });
        }

        let mut characters = Vec::new();
        total = 0;
        while total < covered && pos < data.len() {
            let length = read_u32_le(data, pos)?;
            let mask = read_u32_le(data, pos + 4)?;
            pos += 8;
            let size: usize = CHAR_FIELDS
                .iter()
                .filter(|(m, _)| mask & m != 0)
                .map(|(_, s)| s)
                .sum();
            let fields = slice(data, pos, size)?.to_vec();
            pos += size;
            total += length as u64;
            characters.push(CharRun {
                length,
                mask,
                fields,
            });
        }

        Ok(Self {
            paragraphs,
            characters,
            trailer: data[pos..].to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for run in &self.paragraphs {
            out.extend_from_slice(&run.length.to_le_bytes());
            out.extend_from_slice(&run.indent_level.to_le_bytes());
            out.extend_from_slice(&run.mask.to_le_bytes());
            out.extend_from_slice(&run.fields);
        }
        for run in &self.characters {
            out.extend_from_slice(&run.length.to_le_bytes());
            out.extend_from_slice(&run.mask.to_le_bytes());
            out.extend_from_slice(&run.fields);
        }
        out.extend_from_slice(&self.trailer);
        out
    }
}

fn slice(data: &[u8], pos: usize, len: usize) -> Result<&[u8]> {
    data.get(pos..pos + len).ok_or_else(|| {
        Error::CorruptedFile(format!(
            "style run field at {pos} needs {len} bytes, {} available",
            data.len().saturating_sub(pos)
        ))
    })
}

fn paragraph_fields_size(data: &[u8], start: usize, mask: u32) -> Result<usize> {
    let fixed = |fields: &[(u32, usize)]| -> usize {
        fields
            .iter()
            .filter(|(m, _)| mask & m != 0)
            .map(|(_, s)| s)
            .sum()
    };
    let mut size = fixed(PARAGRAPH_FIELDS);
    if mask & TAB_STOPS_MASK != 0 {
        let count = read_u16_le(data, start + size)? as usize;
        size += 2 + count * 4;
    }
    size += fixed(PARAGRAPH_TRAILING_FIELDS);
    Ok(size)
}

/// Style atom content: decoded when it parses cleanly, otherwise carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleTextProp {
    Parsed(TextStyle),
    Opaque(Vec<u8>),
}

impl StyleTextProp {
    pub fn decode(data: &[u8], text_len: usize) -> Self {
        match TextStyle::parse(data, text_len) {
            Ok(style) => StyleTextProp::Parsed(style),
            Err(e) => {
                log::debug!("keeping style runs opaque: {e}");
                StyleTextProp::Opaque(data.to_vec())
            },
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            StyleTextProp::Parsed(style) => style.to_bytes(),
            StyleTextProp::Opaque(bytes) => bytes.clone(),
        }
    }

    pub fn char_runs(&self) -> &[CharRun] {
        match self {
            StyleTextProp::Parsed(style) => &style.characters,
            StyleTextProp::Opaque(_) => &[],
        }
    }

    pub fn char_runs_mut(&mut self) -> &mut [CharRun] {
        match self {
            StyleTextProp::Parsed(style) => &mut style.characters,
            StyleTextProp::Opaque(_) => &mut [],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled_bytes() -> Vec<u8> {
        let mut out = Vec::new();
        // paragraph: 6 units, alignment + tab stops (1 stop)
        out.extend_from_slice(&6u32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&(0x0800u32 | TAB_STOPS_MASK).to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&[0x40, 0x02, 0x00, 0x00]);
        // chars: 2 units bold + size, 4 units with a color
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&0x0002_0001u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&44u16.to_le_bytes());
        out.extend_from_slice(&4u32.to_le_bytes());
        out.extend_from_slice(&(0x0002_0000u32 | CHAR_COLOR_MASK).to_le_bytes());
        out.extend_from_slice(&32u16.to_le_bytes());
        out.extend_from_slice(&[0x10, 0x20, 0x30, 0xFE]);
        out
    }

    #[test]
    fn test_parse_and_reencode() {
        let bytes = styled_bytes();
        let style = TextStyle::parse(&bytes, 5).unwrap();
        assert_eq!(style.paragraphs.len(), 1);
        assert_eq!(style.characters.len(), 2);
        assert!(style.trailer.is_empty());
        assert_eq!(style.characters[0].color(), None);
        assert_eq!(
            style.characters[1].color(),
            Some(Color::Rgb(0x10, 0x20, 0x30))
        );
        assert_eq!(style.to_bytes(), bytes);
    }

    #[test]
    fn test_set_color_inserts_after_size() {
        let mut style = TextStyle::parse(&styled_bytes(), 5).unwrap();
        style.characters[0].set_color(Color::CYAN);
        let run = &style.characters[0];
        assert_eq!(run.color(), Some(Color::CYAN));
        // flags, size, then color
        assert_eq!(&run.fields[4..8], &[0x00, 0xFF, 0xFF, 0xFE]);

        style.characters[1].set_color(Color::CYAN);
        assert_eq!(style.characters[1].fields.len(), 6);
        let reparsed = TextStyle::parse(&style.to_bytes(), 5).unwrap();
        assert!(
            reparsed
                .characters
                .iter()
                .all(|run| run.color() == Some(Color::CYAN))
        );
    }

    #[test]
    fn test_truncated_runs_stay_opaque() {
        let bytes = styled_bytes();
        let cut = &bytes[..bytes.len() - 3];
        let prop = StyleTextProp::decode(cut, 5);
        assert!(matches!(prop, StyleTextProp::Opaque(_)));
        assert!(prop.char_runs().is_empty());
        assert_eq!(prop.to_bytes(), cut);
    }

    #[test]
    fn test_plain_style_covers_terminator() {
        let style = TextStyle::plain(4);
        assert_eq!(style.paragraphs[0].length, 5);
        assert_eq!(style.characters[0].length, 5);
        let parsed = TextStyle::parse(&style.to_bytes(), 4).unwrap();
        assert_eq!(parsed, style);
    }
}
