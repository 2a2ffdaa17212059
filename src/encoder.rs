//! Encoding of a shaped line into show-text operators.
//!
//! Glyphs are batched into as few show-text strings as possible. A batch is
//! cut when the font changes and around every glyph with a vertical offset
//! (rise), which has to be shown on its own between two rise operators.
//! Differences between a font's declared glyph widths and the advances chosen
//! by the shaping engine become adjustment numbers inside the batch.

use std::sync::Arc;

use crate::{
    color_glyph::{self, EmojiDescriptor},
    font_resource::FontResource,
    glyph_id::GlyphId,
    shaping::{GlyphInfo, Run, ShapedLine},
    stream::ContentStream,
    units::{MIN_FONT_SIZE, format_number, units_to_per_mille, units_to_points},
};

/// Output of [`encode_line`] besides the operators themselves.
#[derive(Clone, Debug, Default)]
pub struct EncodedLine {
    /// Color glyph images to composite, in draw order.
    pub emojis: Vec<EmojiDescriptor>,
    /// Pen position after the last glyph, in ems.
    pub x_advance: f32,
}

impl EncodedLine {
    /// Pen position after the last glyph, in text-space units.
    pub fn advance(&self, font_size: f32) -> f32 {
        self.x_advance * font_size
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Token {
    Start,
    Glyph,
    Number,
}

/// Body of one adjusted show-text array under construction.
struct ShowString {
    text: String,
    last: Token,
}

impl ShowString {
    fn new() -> Self {
        Self {
            text: String::new(),
            last: Token::Start,
        }
    }

    fn push_glyph(&mut self, glyph: GlyphId, one_byte: bool) {
        if self.last != Token::Glyph {
            self.text.push('<');
        }
        glyph.write_hex(&mut self.text, one_byte);
        self.last = Token::Glyph;
    }

    fn push_adjustment(&mut self, value: f32) {
        match self.last {
            Token::Glyph => self.text.push('>'),
            Token::Number => self.text.push(' '),
            Token::Start => {}
        }
        self.text.push_str(&format_number(value));
        self.last = Token::Number;
    }

    /// Closes the open glyph group and returns the string, or `None` if
    /// nothing was pushed.
    fn finish(&mut self) -> Option<String> {
        if self.last == Token::Glyph {
            self.text.push('>');
        }
        self.last = Token::Start;
        if self.text.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.text))
        }
    }

    fn flush(&mut self, stream: &mut (impl ContentStream + ?Sized)) {
        if let Some(text) = self.finish() {
            stream.show_text(&text);
        }
    }
}

/// Walks the runs of `line` and appends its show-text operators to `stream`.
///
/// The caller must have opened a text object and set the text matrix. Glyph
/// widths and source text mappings are recorded in the fonts' shared
/// resources the first time each glyph is met.
pub fn encode_line(
    stream: &mut (impl ContentStream + ?Sized),
    line: &ShapedLine,
    font_size: f32,
) -> EncodedLine {
    debug_assert!(font_size > 0.0, "non-positive font size {font_size}");
    if font_size < MIN_FONT_SIZE {
        return EncodedLine::default();
    }

    let mut encoder = LineEncoder {
        text: line.text.as_bytes(),
        font_size,
        string: ShowString::new(),
        last_font: None,
        previous_cluster_end: 0,
        x_advance: 0.0,
        emojis: Vec::new(),
    };
    for run in &line.runs {
        encoder.encode_run(stream, run);
    }
    encoder.string.flush(stream);

    EncodedLine {
        emojis: encoder.emojis,
        x_advance: encoder.x_advance,
    }
}

struct LineEncoder<'a> {
    text: &'a [u8],
    font_size: f32,
    string: ShowString,
    last_font: Option<Arc<FontResource>>,
    previous_cluster_end: usize,
    x_advance: f32,
    emojis: Vec<EmojiDescriptor>,
}

impl LineEncoder<'_> {
    fn encode_run(&mut self, stream: &mut (impl ContentStream + ?Sized), run: &Run) {
        let font = stream.add_font(run.face.as_ref());

        let font_changed = self
            .last_font
            .as_ref()
            .is_none_or(|last| !Arc::ptr_eq(last, &font));
        if font_changed {
            self.string.flush(stream);
            let size = if font.is_bitmap() { 1.0 } else { self.font_size };
            log::trace!("Switching to font {} at size {}", font.key(), size);
            stream.set_font_size(font.key(), size);
            self.last_font = Some(Arc::clone(&font));
        }

        for (index, info) in run.glyphs.iter().enumerate() {
            match info.glyph {
                Some(glyph) => {
                    let cluster_end = run.cluster_end(index);
                    self.encode_glyph(stream, run, &font, glyph, info, cluster_end);
                }
                None => {
                    // reserve the space, draw nothing
                    let advance = units_to_per_mille(info.geometry.width, self.font_size);
                    self.string.push_adjustment(-advance);
                    self.x_advance += advance / 1000.0;
                }
            }
        }
    }

    fn encode_glyph(
        &mut self,
        stream: &mut (impl ContentStream + ?Sized),
        run: &Run,
        font: &Arc<FontResource>,
        glyph: GlyphId,
        info: &GlyphInfo,
        cluster_end: usize,
    ) {
        let font_size = self.font_size;
        let one_byte = font.is_bitmap();
        let offset = units_to_per_mille(info.geometry.x_offset, font_size);
        let rise = units_to_points(info.geometry.y_offset);

        if rise != 0.0 {
            self.string.flush(stream);
            stream.set_text_rise(-rise);
            let mut single = ShowString::new();
            if offset != 0.0 {
                single.push_adjustment(-offset);
            }
            single.push_glyph(glyph, one_byte);
            single.flush(stream);
            stream.set_text_rise(0.0);
        } else {
            if offset != 0.0 {
                self.string.push_adjustment(-offset);
            }
            self.string.push_glyph(glyph, one_byte);
        }

        let width = font.width_or_insert_with(glyph, || {
            let logical = run.face.glyph_extents(glyph, font_size).logical;
            units_to_per_mille(logical.size.width, font_size).round() as i32
        });

        let advance = units_to_per_mille(info.geometry.width, font_size);
        let kerning = (width as f32 - advance + offset) as i32;
        if kerning != 0 {
            self.string.push_adjustment(kerning as f32);
        }

        let start = self.previous_cluster_end;
        font.insert_cmap_with(glyph, || self.source_text(start, cluster_end));
        self.previous_cluster_end = cluster_end;

        let image = color_glyph::probe(run.face.as_ref(), font, glyph, width, font_size);
        if let Some(emoji) = image.into_descriptor(Arc::clone(font), self.x_advance) {
            self.emojis.push(emoji);
        }

        self.x_advance += (width as f32 + offset - kerning as f32) / 1000.0;
    }

    fn source_text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.text.len());
        let start = start.min(end);
        String::from_utf8_lossy(&self.text[start..end]).into_owned()
    }
}
