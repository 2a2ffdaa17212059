//! Fixtures shared by the unit tests: a configurable font face and a shaping
//! engine that maps every character to one glyph.

use std::{cell::RefCell, collections::HashMap, sync::Arc};

use euclid::default::{Point2D, Rect, Size2D};

use crate::{
    font_resource::FontKey,
    font_storage::{FontStorage, LoadedFace},
    glyph_id::GlyphId,
    shaping::{
        ColorGlyphFormat, DecorationMetrics, FontFace, GlyphExtents, GlyphGeometry, GlyphInfo,
        LineMode, Run, ShapedLine, ShapingEngine,
    },
    textbox::TextStyle,
    units::units_from_points,
};

pub const DEFAULT_ADVANCE: i32 = 500;

pub struct FakeFace {
    key: u64,
    units_per_em: u16,
    bitmap: bool,
    color: ColorGlyphFormat,
    /// per-mille
    advances: HashMap<GlyphId, i32>,
    color_data: HashMap<GlyphId, Vec<u8>>,
}

impl FakeFace {
    pub fn new(key: u64) -> Self {
        Self {
            key,
            units_per_em: 1000,
            bitmap: false,
            color: ColorGlyphFormat::None,
            advances: HashMap::new(),
            color_data: HashMap::new(),
        }
    }

    pub fn bitmap(mut self) -> Self {
        self.bitmap = true;
        self
    }

    pub fn with_units_per_em(mut self, units_per_em: u16) -> Self {
        self.units_per_em = units_per_em;
        self
    }

    pub fn with_color(mut self, format: ColorGlyphFormat) -> Self {
        self.color = format;
        self
    }

    pub fn with_advance(mut self, glyph: GlyphId, per_mille: i32) -> Self {
        self.advances.insert(glyph, per_mille);
        self
    }

    pub fn with_color_data(mut self, glyph: GlyphId, data: Vec<u8>) -> Self {
        self.color_data.insert(glyph, data);
        self
    }

    pub fn advance(&self, glyph: GlyphId) -> i32 {
        self.advances.get(&glyph).copied().unwrap_or(DEFAULT_ADVANCE)
    }

    /// Advance of `glyph` in shaping units at `font_size`.
    pub fn advance_units(&self, glyph: GlyphId, font_size: f32) -> i32 {
        units_from_points(self.advance(glyph) as f32 * font_size / 1000.0)
    }
}

impl FontFace for FakeFace {
    fn key(&self) -> FontKey {
        FontKey::new(self.key)
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn is_bitmap(&self) -> bool {
        self.bitmap
    }

    fn color_format(&self) -> ColorGlyphFormat {
        self.color
    }

    fn glyph_extents(&self, glyph: GlyphId, font_size: f32) -> GlyphExtents {
        let rect = Rect::new(
            Point2D::new(0, units_from_points(-0.8 * font_size)),
            Size2D::new(
                self.advance_units(glyph, font_size),
                units_from_points(font_size),
            ),
        );
        GlyphExtents {
            ink: rect,
            logical: rect,
        }
    }

    fn color_glyph_data(
        &self,
        glyph: GlyphId,
        format: ColorGlyphFormat,
        _font_size: f32,
    ) -> Option<Vec<u8>> {
        if format != self.color {
            return None;
        }
        self.color_data.get(&glyph).cloned()
    }
}

pub fn glyph(index: u32, width: i32, cluster: usize) -> GlyphInfo {
    GlyphInfo {
        glyph: Some(GlyphId::new(index)),
        geometry: GlyphGeometry {
            width,
            ..Default::default()
        },
        cluster,
    }
}

pub fn run(face: &Arc<FakeFace>, offset: usize, length: usize, glyphs: Vec<GlyphInfo>) -> Run {
    Run {
        face: Arc::clone(face) as Arc<dyn FontFace>,
        glyphs,
        offset,
        length,
    }
}

pub fn line(text: &str, runs: Vec<Run>) -> ShapedLine {
    ShapedLine {
        text: text.to_string(),
        runs,
        overflow_index: None,
        metrics: DecorationMetrics::default(),
    }
}

/// A valid RGBA PNG of the given size.
#[allow(clippy::unwrap_used)]
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer
            .write_image_data(&vec![0; (width * height * 4) as usize])
            .unwrap();
    }
    data
}

pub const METRICS: DecorationMetrics = DecorationMetrics {
    ascent: 8.0,
    underline_position: -1.0,
    underline_thickness: 0.5,
    strikethrough_position: 3.0,
    strikethrough_thickness: 0.75,
};

/// Shaping engine giving every character its own glyph (the code point) with
/// the face's advance. Each call is recorded.
pub struct ScriptedEngine {
    pub face: Arc<FakeFace>,
    pub calls: RefCell<Vec<(String, LineMode)>>,
}

impl ScriptedEngine {
    pub fn new(face: FakeFace) -> Self {
        Self {
            face: Arc::new(face),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn shaped_texts(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    fn text_width(&self, text: &str, font_size: f32) -> i32 {
        text.chars()
            .map(|ch| self.face.advance_units(GlyphId::new(ch as u32), font_size))
            .sum()
    }

    fn shape_unbounded(&self, text: &str, font_size: f32) -> Vec<GlyphInfo> {
        text.char_indices()
            .map(|(index, ch)| {
                glyph(
                    ch as u32,
                    self.face.advance_units(GlyphId::new(ch as u32), font_size),
                    index,
                )
            })
            .collect()
    }
}

impl ShapingEngine for ScriptedEngine {
    fn shape(&self, text: &str, style: &TextStyle, mode: LineMode) -> ShapedLine {
        self.calls.borrow_mut().push((text.to_string(), mode));
        let font_size = style.font_size;

        let mut text = text.to_string();
        let mut overflow_index = None;
        if let Some(max_width) = mode.width.map(units_from_points) {
            if self.text_width(&text, font_size) > max_width {
                if mode.ellipsize_end {
                    let ellipsis = self.text_width("\u{2026}", font_size);
                    while !text.is_empty()
                        && self.text_width(&text, font_size) + ellipsis > max_width
                    {
                        text.pop();
                    }
                    text.push('\u{2026}');
                } else {
                    let mut width = 0;
                    for (index, ch) in text.char_indices() {
                        width += self.face.advance_units(GlyphId::new(ch as u32), font_size);
                        if width > max_width {
                            overflow_index = Some(if index == 0 { ch.len_utf8() } else { index });
                            break;
                        }
                    }
                }
            }
        }

        let shown = &text[..overflow_index.unwrap_or(text.len())];
        let glyphs = self.shape_unbounded(shown, font_size);
        ShapedLine {
            runs: vec![Run {
                face: Arc::clone(&self.face) as Arc<dyn FontFace>,
                glyphs,
                offset: 0,
                length: shown.len(),
            }],
            text,
            overflow_index,
            metrics: METRICS,
        }
    }
}

/// DejaVu Sans Mono, see `testdata/fonts/DejaVu-LICENSE`.
pub const MONO_FONT: &[u8] = include_bytes!("../testdata/fonts/DejaVuSansMono.ttf");

/// Storage holding only [`MONO_FONT`], and its loaded face.
#[allow(clippy::unwrap_used)]
pub fn mono_storage() -> (FontStorage, Arc<LoadedFace>) {
    let mut storage = FontStorage::new();
    storage.load_font_binary(MONO_FONT);
    let face = storage.all_faces().into_iter().next().unwrap();
    (storage, face)
}
