//! Underline, overline and line-through.
//!
//! Decorations are plain stroked lines spanning the textbox, positioned from
//! the layout's font metrics. They do not depend on the glyph encoding.

use crate::{
    shaping::DecorationMetrics,
    stream::{ContentStream, LineCap},
    textbox::{DecorationStyle, Rgba, TextBox},
};

/// Vertical position (from the top of the box) and thickness of a decoration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecorationPlacement {
    pub offset_y: f32,
    pub thickness: f32,
}

impl DecorationPlacement {
    pub fn overline(baseline: f32, metrics: &DecorationMetrics) -> Self {
        let thickness = metrics.underline_thickness;
        Self {
            offset_y: baseline - metrics.ascent + thickness / 2.0,
            thickness,
        }
    }

    pub fn underline(baseline: f32, metrics: &DecorationMetrics) -> Self {
        let thickness = metrics.underline_thickness;
        Self {
            offset_y: baseline - metrics.underline_position + thickness / 2.0,
            thickness,
        }
    }

    pub fn line_through(baseline: f32, metrics: &DecorationMetrics) -> Self {
        Self {
            offset_y: baseline - metrics.strikethrough_position,
            thickness: metrics.strikethrough_thickness,
        }
    }
}

/// Draws one decoration line across `textbox`.
///
/// `offset_x` is the phase of dashes and waves, so decorations of adjacent
/// boxes line up.
pub fn draw_text_decoration(
    stream: &mut (impl ContentStream + ?Sized),
    textbox: &TextBox,
    offset_x: f32,
    placement: DecorationPlacement,
    color: Rgba,
) {
    let y = textbox.position_y + placement.offset_y;
    draw_horizontal_line(
        stream,
        textbox.position_x,
        textbox.position_x + textbox.width,
        y,
        placement.thickness,
        textbox.style.decoration_style,
        color,
        offset_x,
    );
}

/// Strokes a horizontal line from `x1` to `x2` at `y` in the given style.
pub fn draw_horizontal_line(
    stream: &mut (impl ContentStream + ?Sized),
    x1: f32,
    x2: f32,
    y: f32,
    thickness: f32,
    style: DecorationStyle,
    color: Rgba,
    offset_x: f32,
) {
    if thickness <= 0.0 || x2 <= x1 {
        return;
    }

    stream.push_state();
    stream.set_color_rgb(color.r, color.g, color.b, true);
    stream.set_alpha(color.a, true);

    match style {
        DecorationStyle::Solid => {
            stream.set_line_width(thickness);
            stream.move_to(x1, y);
            stream.line_to(x2, y);
        }
        DecorationStyle::Double => {
            stream.set_line_width(thickness / 3.0);
            stream.move_to(x1, y - thickness / 3.0);
            stream.line_to(x2, y - thickness / 3.0);
            stream.move_to(x1, y + thickness / 3.0);
            stream.line_to(x2, y + thickness / 3.0);
        }
        DecorationStyle::Dotted => {
            stream.set_line_width(thickness);
            stream.set_line_cap(LineCap::Round);
            stream.set_dash(&[0.0, 2.0 * thickness], offset_x);
            stream.move_to(x1 + thickness / 2.0, y);
            stream.line_to(x2, y);
        }
        DecorationStyle::Dashed => {
            stream.set_line_width(thickness);
            stream.set_dash(&[5.0 * thickness], offset_x);
            stream.move_to(x1, y);
            stream.line_to(x2, y);
        }
        DecorationStyle::Wavy => {
            let radius = 0.75 * thickness;
            stream.rectangle(x1, y - 2.0 * radius, x2 - x1, 4.0 * radius);
            stream.clip();
            stream.end_path();
            stream.set_line_width(thickness);

            let mut x = x1 - offset_x % (4.0 * radius);
            let mut up = 1.0;
            stream.move_to(x, y);
            while x < x2 {
                stream.curve_to(
                    x + radius / 2.0,
                    y + up * radius,
                    x + 3.0 * radius / 2.0,
                    y + up * radius,
                    x + 2.0 * radius,
                    y,
                );
                x += 2.0 * radius;
                up = -up;
            }
        }
    }

    stream.stroke();
    stream.pop_state();
}
