use std::fmt::Write;

/// Glyph index inside one font face, as reported by the shaping engine.
///
/// The same glyph is not guaranteed to receive the same `GlyphId` across
/// different faces; it is only meaningful together with a [`FontKey`].
///
/// [`FontKey`]: crate::font_resource::FontKey
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphId(u32);

impl GlyphId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    /// Appends the glyph code used inside a show-text string.
    ///
    /// One-byte bitmap fonts use two hex digits, two-byte (CID keyed) outline
    /// fonts use four.
    pub fn write_hex(&self, out: &mut String, one_byte: bool) {
        // writing into a String cannot fail
        let _ = if one_byte {
            write!(out, "{:02x}", self.0)
        } else {
            write!(out, "{:04x}", self.0)
        };
    }

    /// Glyph code as a standalone `<..>` group.
    pub fn hex_group(&self, one_byte: bool) -> String {
        let mut out = String::with_capacity(6);
        out.push('<');
        self.write_hex(&mut out, one_byte);
        out.push('>');
        out
    }
}

impl From<u16> for GlyphId {
    fn from(value: u16) -> Self {
        Self(value as u32)
    }
}
