//! The narrow interface between the encoder and a text-shaping engine.
//!
//! Engines hand over plain data: runs of positioned glyphs plus the byte
//! ranges of source text they cover. Anything font specific that the encoder
//! needs later (extents, embedded color images) is queried through
//! [`FontFace`].

use std::sync::Arc;

use euclid::default::Rect;

use crate::{font_resource::FontKey, glyph_id::GlyphId, textbox::TextStyle};

/// Kind of embedded color glyph data a face carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorGlyphFormat {
    #[default]
    None,
    /// OpenType `SVG ` table.
    Svg,
    /// Embedded PNG bitmaps (`sbix`, `CBDT`).
    Png,
}

/// Ink and logical extents of one glyph, in shaping units.
///
/// **Y-axis goes down**, relative to the baseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct GlyphExtents {
    pub ink: Rect<i32>,
    pub logical: Rect<i32>,
}

/// Vertical metrics used by text decorations, in points.
///
/// Positions are measured upward from the baseline, like the font tables
/// they come from.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DecorationMetrics {
    pub ascent: f32,
    pub underline_position: f32,
    pub underline_thickness: f32,
    pub strikethrough_position: f32,
    pub strikethrough_thickness: f32,
}

/// One font face as seen by the encoder.
pub trait FontFace: Send + Sync {
    /// Stable identity of the face. Two handles with the same key must
    /// describe the same glyph outlines and metrics.
    fn key(&self) -> FontKey;

    fn units_per_em(&self) -> u16;

    /// Fixed-size bitmap font addressed with one-byte glyph codes.
    fn is_bitmap(&self) -> bool {
        false
    }

    fn color_format(&self) -> ColorGlyphFormat {
        ColorGlyphFormat::None
    }

    /// Extents of `glyph` when the face is used at `font_size` points.
    fn glyph_extents(&self, glyph: GlyphId, font_size: f32) -> GlyphExtents;

    /// Raw embedded color data for `glyph`: an SVG document for
    /// [`ColorGlyphFormat::Svg`] or PNG bytes for [`ColorGlyphFormat::Png`].
    fn color_glyph_data(
        &self,
        glyph: GlyphId,
        format: ColorGlyphFormat,
        font_size: f32,
    ) -> Option<Vec<u8>>;
}

/// Advance and positioning of a single shaped glyph, in shaping units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct GlyphGeometry {
    pub width: i32,
    pub x_offset: i32,
    pub y_offset: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphInfo {
    /// `None` for glyphs that reserve space without drawing anything
    /// (empty or unknown glyphs).
    pub glyph: Option<GlyphId>,
    pub geometry: GlyphGeometry,
    /// Byte offset of the glyph's cluster, relative to [`Run::offset`].
    pub cluster: usize,
}

/// Glyphs sharing one font and direction.
#[derive(Clone)]
pub struct Run {
    pub face: Arc<dyn FontFace>,
    pub glyphs: Vec<GlyphInfo>,
    /// Byte offset of the run in the line's text.
    pub offset: usize,
    /// Byte length of the run's text.
    pub length: usize,
}

impl Run {
    /// Absolute byte offset at which the source text of glyph `index` ends.
    ///
    /// A glyph's cluster extends to the start of the next glyph's cluster, the
    /// last glyph to the end of the run.
    pub fn cluster_end(&self, index: usize) -> usize {
        match self.glyphs.get(index + 1) {
            Some(next) => self.offset + next.cluster,
            None => self.offset + self.length,
        }
    }
}

impl std::fmt::Debug for Run {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Run")
            .field("font", &self.face.key())
            .field("glyphs", &self.glyphs)
            .field("offset", &self.offset)
            .field("length", &self.length)
            .finish()
    }
}

/// First line of a shaped paragraph.
#[derive(Clone, Debug, Default)]
pub struct ShapedLine {
    /// The text the line was shaped from, including any appended ellipsis.
    pub text: String,
    pub runs: Vec<Run>,
    /// Byte index where the next line would start, `None` when everything fit
    /// on this line.
    pub overflow_index: Option<usize>,
    pub metrics: DecorationMetrics,
}

/// How the engine must break the paragraph.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LineMode {
    /// Fixed line width in points. `None` lays out on a single unbounded line.
    pub width: Option<f32>,
    /// Let the engine replace the overflowing end of the line with "…".
    pub ellipsize_end: bool,
}

/// Produces shaped lines from text and style.
///
/// Engines are always asked for a single paragraph: hard line breaks in the
/// text are treated as ordinary characters.
pub trait ShapingEngine {
    fn shape(&self, text: &str, style: &TextStyle, mode: LineMode) -> ShapedLine;

    /// Metrics for decorating `text`. Engines that can read them without
    /// shaping should override this.
    fn decoration_metrics(&self, text: &str, style: &TextStyle) -> DecorationMetrics {
        self.shape(text, style, LineMode::default()).metrics
    }
}
