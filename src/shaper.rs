//! A small shaping engine on top of `fontdue`.
//!
//! One glyph per character, horizontal kerning from the `kern` table and a
//! face fallback chain. No ligatures, no bidi. Good enough for documents in
//! simple scripts and for exercising the encoder against real fonts.

use std::sync::Arc;

use crate::{
    font_storage::{FontStorage, LoadedFace},
    glyph_id::GlyphId,
    shaping::{
        DecorationMetrics, FontFace, GlyphGeometry, GlyphInfo, LineMode, Run, ShapedLine,
        ShapingEngine,
    },
    textbox::TextStyle,
    units::units_from_points,
};

const ELLIPSIS: &str = "\u{2026}";

#[derive(Clone, Copy, Debug)]
struct ShapedGlyph {
    /// Index in the fallback chain.
    face: usize,
    glyph: Option<GlyphId>,
    /// Absolute byte offset in the text.
    cluster: usize,
    /// In points.
    advance: f32,
}

fn measure(glyphs: &[ShapedGlyph]) -> f32 {
    glyphs.iter().map(|glyph| glyph.advance).sum()
}

/// Shapes text with the first face of the chain that has a glyph for each
/// character.
pub struct SimpleShaper {
    faces: Vec<Arc<LoadedFace>>,
}

impl SimpleShaper {
    pub fn new(faces: Vec<Arc<LoadedFace>>) -> Self {
        Self { faces }
    }

    /// Builds the fallback chain from the best match of each family, in
    /// order. Families with no match are skipped.
    pub fn from_storage(storage: &mut FontStorage, families: &[fontdb::Family<'_>]) -> Self {
        let mut faces: Vec<Arc<LoadedFace>> = Vec::with_capacity(families.len());
        for family in families {
            let query = fontdb::Query {
                families: std::slice::from_ref(family),
                ..Default::default()
            };
            match storage.query(&query) {
                Some(face) if !faces.iter().any(|f| f.key() == face.key()) => faces.push(face),
                Some(_) => {}
                None => log::debug!("No face found for family {:?}", family),
            }
        }
        Self::new(faces)
    }

    pub fn faces(&self) -> &[Arc<LoadedFace>] {
        &self.faces
    }

    fn shape_glyphs(&self, text: &str, font_size: f32) -> Vec<ShapedGlyph> {
        let mut glyphs: Vec<ShapedGlyph> = Vec::with_capacity(text.len());

        for (cluster, ch) in text.char_indices() {
            let found = if ch.is_control() {
                None
            } else {
                self.faces
                    .iter()
                    .enumerate()
                    .find_map(|(i, face)| face.lookup_glyph(ch).map(|glyph| (i, glyph)))
            };

            let (face, glyph, advance) = match found {
                Some((face, glyph)) => {
                    let metrics = self.faces[face]
                        .font()
                        .metrics_indexed(glyph.index() as u16, font_size);
                    (face, Some(glyph), metrics.advance_width)
                }
                None if ch.is_control() => (0, None, 0.0),
                None => {
                    // reserve the width of .notdef
                    let metrics = self.faces[0].font().metrics_indexed(0, font_size);
                    (0, None, metrics.advance_width)
                }
            };

            if let Some(previous) = glyphs.last_mut() {
                if let (Some(left), Some(right)) = (previous.glyph, glyph) {
                    if previous.face == face {
                        let kerning = self.faces[face]
                            .font()
                            .horizontal_kern_indexed(
                                left.index() as u16,
                                right.index() as u16,
                                font_size,
                            )
                            .unwrap_or(0.0);
                        previous.advance += kerning;
                    }
                }
            }

            glyphs.push(ShapedGlyph {
                face,
                glyph,
                cluster,
                advance,
            });
        }

        glyphs
    }

    fn build_runs(&self, glyphs: &[ShapedGlyph], end: usize) -> Vec<Run> {
        let mut runs: Vec<Run> = glyphs
            .chunk_by(|a, b| a.face == b.face)
            .map(|chunk| {
                let offset = chunk[0].cluster;
                Run {
                    face: Arc::clone(&self.faces[chunk[0].face]) as Arc<dyn FontFace>,
                    glyphs: chunk
                        .iter()
                        .map(|glyph| GlyphInfo {
                            glyph: glyph.glyph,
                            geometry: GlyphGeometry {
                                width: units_from_points(glyph.advance),
                                ..Default::default()
                            },
                            cluster: glyph.cluster - offset,
                        })
                        .collect(),
                    offset,
                    length: 0,
                }
            })
            .collect();

        let mut next = end;
        for run in runs.iter_mut().rev() {
            run.length = next - run.offset;
            next = run.offset;
        }
        runs
    }

    fn primary_metrics(&self, font_size: f32) -> DecorationMetrics {
        self.faces
            .first()
            .map(|face| face.decoration_metrics(font_size))
            .unwrap_or_default()
    }
}

impl ShapingEngine for SimpleShaper {
    fn shape(&self, text: &str, style: &TextStyle, mode: LineMode) -> ShapedLine {
        if self.faces.is_empty() {
            log::warn!("Shaping {text:?} without any font face");
            return ShapedLine {
                text: text.to_string(),
                ..Default::default()
            };
        }

        let font_size = style.font_size;
        let mut text = text.to_string();
        let mut glyphs = self.shape_glyphs(&text, font_size);
        let mut overflow_index = None;

        if let Some(max_width) = mode.width {
            if measure(&glyphs) > max_width {
                if mode.ellipsize_end {
                    let ellipsis_width = measure(&self.shape_glyphs(ELLIPSIS, font_size));
                    let mut end = glyphs.len();
                    let mut width = measure(&glyphs);
                    while end > 0 && width + ellipsis_width > max_width {
                        end -= 1;
                        width -= glyphs[end].advance;
                    }
                    let cut = glyphs.get(end).map_or(text.len(), |glyph| glyph.cluster);
                    text.truncate(cut);
                    text.push_str(ELLIPSIS);
                    glyphs = self.shape_glyphs(&text, font_size);
                } else {
                    let mut pen = 0.0;
                    let overflowing = glyphs.iter().position(|glyph| {
                        pen += glyph.advance;
                        pen > max_width
                    });
                    if let Some(index) = overflowing {
                        let cut = break_before(&text, glyphs[index].cluster);
                        if cut < text.len() {
                            overflow_index = Some(cut);
                            glyphs.retain(|glyph| glyph.cluster < cut);
                        }
                    }
                }
            }
        }

        let end = overflow_index.unwrap_or(text.len());
        let runs = self.build_runs(&glyphs, end);
        ShapedLine {
            text,
            runs,
            overflow_index,
            metrics: self.primary_metrics(font_size),
        }
    }

    fn decoration_metrics(&self, _text: &str, style: &TextStyle) -> DecorationMetrics {
        self.primary_metrics(style.font_size)
    }
}

/// Where to end a line whose character at byte `overflow` does not fit: after
/// the last whitespace up to and including that character, or before the
/// character itself. A line always keeps at least one character.
fn break_before(text: &str, overflow: usize) -> usize {
    let overflow_end = text[overflow..]
        .chars()
        .next()
        .map_or(text.len(), |ch| overflow + ch.len_utf8());

    let after_space = text[..overflow_end]
        .char_indices()
        .rev()
        .find(|(_, ch)| ch.is_whitespace())
        .map(|(i, ch)| i + ch.len_utf8());

    match after_space {
        Some(cut) => cut,
        None if overflow == 0 => overflow_end,
        None => overflow,
    }
}
