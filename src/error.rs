use thiserror::Error;

use crate::glyph_id::GlyphId;

/// Errors returned by [`draw_text`](crate::draw::draw_text).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DrawError {
    /// The textbox reached the encoder with a font size that layout must never
    /// produce. This is a bug in the caller, not a recoverable condition.
    #[error("non-positive font size {0} reached the text encoder")]
    InvalidFontSize(f32),
}

/// Reasons an embedded color glyph image could not be used.
///
/// These never abort a draw: the glyph keeps its outline and only the color
/// overlay is dropped.
#[derive(Debug, Error)]
pub enum ColorGlyphError {
    #[error("glyph {0:?} has no embedded image")]
    Missing(GlyphId),

    #[error("SVG document for glyph {glyph:?} is not valid UTF-8")]
    SvgEncoding { glyph: GlyphId },

    #[error("SVG document for glyph {glyph:?} could not be parsed: {source}")]
    SvgParse {
        glyph: GlyphId,
        #[source]
        source: roxmltree::Error,
    },

    #[error("PNG image for glyph {glyph:?} could not be decoded: {source}")]
    PngDecode {
        glyph: GlyphId,
        #[source]
        source: png::DecodingError,
    },

    #[error("image for glyph {0:?} has zero width or height")]
    EmptyImage(GlyphId),
}

/// Errors raised while loading font faces.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("font face {0:?} is not in the database")]
    UnknownFace(fontdb::ID),

    #[error("failed to parse font face: {0}")]
    Parse(&'static str),

    #[error("failed to parse font tables: {0}")]
    Tables(#[from] ttf_parser::FaceParsingError),
}
