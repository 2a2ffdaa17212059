//! Drawing one textbox: decorations, the text object, color glyph images and
//! the line-through, in that order.

use crate::{
    color_glyph::EmojiDescriptor,
    decoration::{DecorationPlacement, draw_text_decoration},
    encoder::encode_line,
    error::DrawError,
    shaping::{ShapedLine, ShapingEngine},
    stream::{ContentStream, Matrix},
    textbox::{LineOverflow, TextBox, Visibility},
    truncate::fit_line,
    units::MIN_FONT_SIZE,
};

/// Tunables of [`draw_text_with_config`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawConfig {
    /// Textboxes with a smaller font size are skipped. The output format
    /// cannot represent text matrices below this precision.
    pub min_font_size: f32,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            min_font_size: MIN_FONT_SIZE,
        }
    }
}

/// Draws `textbox` into `stream` with the default [`DrawConfig`].
///
/// Returns the color glyph images that were composited, in draw order.
pub fn draw_text<E: ShapingEngine + ?Sized>(
    stream: &mut (impl ContentStream + ?Sized),
    engine: &E,
    textbox: &TextBox,
    offset_x: f32,
    overflow: &LineOverflow,
) -> Result<Vec<EmojiDescriptor>, DrawError> {
    draw_text_with_config(
        stream,
        engine,
        textbox,
        offset_x,
        overflow,
        &DrawConfig::default(),
    )
}

pub fn draw_text_with_config<E: ShapingEngine + ?Sized>(
    stream: &mut (impl ContentStream + ?Sized),
    engine: &E,
    textbox: &TextBox,
    offset_x: f32,
    overflow: &LineOverflow,
    config: &DrawConfig,
) -> Result<Vec<EmojiDescriptor>, DrawError> {
    let style = &textbox.style;
    if style.font_size.is_nan() || style.font_size <= 0.0 {
        log::error!("Refusing to draw textbox with font size {}", style.font_size);
        return Err(DrawError::InvalidFontSize(style.font_size));
    }

    if style.visibility != Visibility::Visible {
        return Ok(Vec::new());
    }

    let line = fit_first_line(engine, textbox, overflow, config);

    let decorations = style.decoration_line;
    let decoration_color = style.decoration_color();
    let metrics = match &line {
        _ if decorations.is_none() => None,
        Some(line) => Some(line.metrics),
        None => Some(engine.decoration_metrics(&textbox.text, style)),
    };

    if let Some(metrics) = &metrics {
        if decorations.overline {
            let placement = DecorationPlacement::overline(textbox.baseline, metrics);
            draw_text_decoration(stream, textbox, offset_x, placement, decoration_color);
        }
        if decorations.underline {
            let placement = DecorationPlacement::underline(textbox.baseline, metrics);
            draw_text_decoration(stream, textbox, offset_x, placement, decoration_color);
        }
    }

    let x = textbox.position_x;
    let y = textbox.position_y + textbox.baseline;
    stream.set_color_rgb(style.color.r, style.color.g, style.color.b, false);
    stream.set_alpha(style.color.a, false);
    stream.begin_text();
    let emojis = match &line {
        Some(line) => draw_first_line(stream, line, style.font_size, x, y),
        None => Vec::new(),
    };
    stream.end_text();

    draw_emojis(stream, style.font_size, x, y, &emojis);

    if let Some(metrics) = &metrics {
        if decorations.line_through {
            let placement = DecorationPlacement::line_through(textbox.baseline, metrics);
            draw_text_decoration(stream, textbox, offset_x, placement, decoration_color);
        }
    }

    Ok(emojis)
}

/// Shapes and fits the first line of `textbox`, or `None` when there is
/// nothing to draw.
pub fn fit_first_line<E: ShapingEngine + ?Sized>(
    engine: &E,
    textbox: &TextBox,
    overflow: &LineOverflow,
    config: &DrawConfig,
) -> Option<ShapedLine> {
    // lines of spaces draw nothing
    if textbox.text.trim().is_empty() {
        return None;
    }

    let font_size = textbox.style.font_size;
    if font_size < config.min_font_size {
        log::debug!("Skipping textbox with font size {font_size}");
        return None;
    }

    Some(fit_line(
        engine,
        &textbox.text,
        &textbox.style,
        textbox.max_width,
        overflow,
    ))
}

/// Encodes `line` inside an open text object, with the line origin at
/// `(x, y)`.
pub fn draw_first_line(
    stream: &mut (impl ContentStream + ?Sized),
    line: &ShapedLine,
    font_size: f32,
    x: f32,
    y: f32,
) -> Vec<EmojiDescriptor> {
    stream.set_text_matrix(&Matrix::new(1.0, 0.0, 0.0, -1.0, x, y));
    encode_line(stream, line, font_size).emojis
}

/// Composites queued color glyph images relative to the line origin `(x, y)`.
pub fn draw_emojis(
    stream: &mut (impl ContentStream + ?Sized),
    font_size: f32,
    x: f32,
    y: f32,
    emojis: &[EmojiDescriptor],
) {
    for emoji in emojis {
        stream.push_state();
        stream.transform(&Matrix::new(
            emoji.scale_x,
            0.0,
            0.0,
            emoji.scale_y,
            x + emoji.pen_x * font_size,
            y + emoji.pen_y,
        ));
        stream.draw_image(&emoji.image, font_size, font_size);
        stream.pop_state();
    }
}
