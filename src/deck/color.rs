/// A color as stored in text styles and shape properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Rgb(u8, u8, u8),
    /// Index into the slide's color scheme
    Scheme(u8),
    /// Any other OfficeArt color reference, kept as stored
    System(u32),
}

const TEXT_RGB_INDEX: u8 = 0xFE;
const COLORREF_SCHEME_FLAG: u32 = 0x0800_0000;

impl Color {
    pub const CYAN: Color = Color::Rgb(0x00, 0xFF, 0xFF);
    pub const BLACK: Color = Color::Rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::Rgb(0xFF, 0xFF, 0xFF);

    /// Decode the 4-byte color of a character run (red, green, blue, index).
    pub fn from_text_bytes(bytes: [u8; 4]) -> Self {
        match bytes[3] {
            TEXT_RGB_INDEX => Color::Rgb(bytes[0], bytes[1], bytes[2]),
            index => Color::Scheme(index),
        }
    }

    pub fn to_text_bytes(&self) -> [u8; 4] {
        match *self {
            Color::Rgb(r, g, b) => [r, g, b, TEXT_RGB_INDEX],
            Color::Scheme(index) => [0, 0, 0, index],
            Color::System(raw) => raw.to_le_bytes(),
        }
    }

    /// Decode an OfficeArt color reference (`fillColor` and friends).
    pub fn from_colorref(raw: u32) -> Self {
        let [r, g, b, flags] = raw.to_le_bytes();
        if raw & COLORREF_SCHEME_FLAG != 0 {
            Color::Scheme(r)
        } else if flags == 0 {
            Color::Rgb(r, g, b)
        } else {
            Color::System(raw)
        }
    }

    pub fn to_colorref(&self) -> u32 {
        match *self {
            Color::Rgb(r, g, b) => u32::from_le_bytes([r, g, b, 0]),
            Color::Scheme(index) => COLORREF_SCHEME_FLAG | index as u32,
            Color::System(raw) => raw,
        }
    }

    /// `#RRGGBB` for explicit colors.
    pub fn to_hex(&self) -> Option<String> {
        match self {
            Color::Rgb(r, g, b) => Some(format!("#{r:02X}{g:02X}{b:02X}")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyan_text_bytes() {
        assert_eq!(Color::CYAN.to_text_bytes(), [0x00, 0xFF, 0xFF, 0xFE]);
        assert_eq!(Color::CYAN.to_hex().as_deref(), Some("#00FFFF"));
        assert_eq!(Color::from_text_bytes([0, 0, 0, 3]), Color::Scheme(3));
    }

    #[test]
    fn test_colorref_forms() {
        assert_eq!(Color::from_colorref(0x0800_0004), Color::Scheme(4));
        assert_eq!(Color::from_colorref(0x0000_FFFF), Color::Rgb(0xFF, 0xFF, 0));
        assert_eq!(Color::from_colorref(0x1000_00F7), Color::System(0x1000_00F7));
        for color in [Color::CYAN, Color::Scheme(2), Color::System(0x1000_00F7)] {
            assert_eq!(Color::from_colorref(color.to_colorref()), color);
        }
    }
}
