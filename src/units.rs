//! Conversions between the three coordinate systems a text draw touches.
//!
//! * **Shaping units**: fixed-point values reported by the shaping engine,
//!   `SHAPING_SCALE` units per point.
//! * **Points**: text-space units of the output document (`f32`).
//! * **Per-mille**: thousandths of an em, the unit of glyph widths and of the
//!   adjustment numbers inside a show-text array. These are independent of the
//!   font size.

/// Number of shaping units in one point.
pub const SHAPING_SCALE: i32 = 1024;

/// Smallest font size the output format can represent with its default
/// numeric precision.
pub const MIN_FONT_SIZE: f32 = 1e-6;

/// Converts shaping units to points.
pub fn units_to_points(units: i32) -> f32 {
    units as f32 / SHAPING_SCALE as f32
}

/// Converts points to shaping units, rounding to the nearest unit.
pub fn units_from_points(points: f32) -> i32 {
    (points * SHAPING_SCALE as f32).round() as i32
}

/// Converts a length in shaping units, measured at `font_size`, into
/// per-mille em units.
pub fn units_to_per_mille(units: i32, font_size: f32) -> f32 {
    units_to_points(units) * 1000.0 / font_size
}

/// Formats a number the way content-stream operands are written: integers
/// without a fractional part, other values with at most six decimals and no
/// trailing zeros.
pub fn format_number(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < i64::MAX as f32 {
        return format!("{}", value as i64);
    }

    let mut text = format!("{value:.6}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}
