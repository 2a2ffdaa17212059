//! The content stream that drawing operations are appended to.
//!
//! [`ContentStream`] is the seam to the output document. [`OperatorStream`]
//! is a recording implementation that keeps the operators as data, tracks the
//! resources they reference and serializes them to content-stream syntax.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

use crate::{
    color_glyph::EmojiImage,
    font_resource::{FontKey, FontRegistry, FontResource},
    shaping::FontFace,
    units::format_number,
};

/// Affine transform `[a b c d e f]` as used by `Tm` and `cm`.
pub type Matrix = euclid::default::Transform2D<f32>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Output-side operations needed to draw a textbox.
pub trait ContentStream {
    fn begin_text(&mut self);
    fn end_text(&mut self);
    fn set_text_matrix(&mut self, matrix: &Matrix);
    fn set_font_size(&mut self, font: FontKey, size: f32);
    fn set_color_rgb(&mut self, r: f32, g: f32, b: f32, stroke: bool);
    fn set_alpha(&mut self, alpha: f32, stroke: bool);
    fn set_text_rise(&mut self, rise: f32);

    /// Shows glyphs. `text` is the body of an adjusted show-text array:
    /// `<HEX>` glyph groups interleaved with numbers that move the following
    /// glyphs left by number/1000 of text-space units.
    fn show_text(&mut self, text: &str);

    /// Registers `face` in the document and returns its shared resource.
    fn add_font(&mut self, face: &dyn FontFace) -> Arc<FontResource>;

    fn push_state(&mut self);
    fn pop_state(&mut self);
    fn transform(&mut self, matrix: &Matrix);

    /// Draws `image` into a `width` x `height` box at the origin.
    fn draw_image(&mut self, image: &EmojiImage, width: f32, height: f32);

    fn set_line_width(&mut self, width: f32);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_dash(&mut self, dashes: &[f32], phase: f32);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32);
    fn rectangle(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn clip(&mut self);
    fn end_path(&mut self);
    fn stroke(&mut self);
}

/// One recorded content-stream operator.
#[derive(Clone, Debug, PartialEq)]
pub enum Operator {
    BeginText,
    EndText,
    SetTextMatrix(Matrix),
    SetFontSize { font: FontKey, size: f32 },
    SetColorRgb { r: f32, g: f32, b: f32, stroke: bool },
    SetAlpha { state: String },
    SetTextRise(f32),
    ShowText(String),
    PushState,
    PopState,
    Transform(Matrix),
    DrawImage { name: String, width: f32, height: f32 },
    SetLineWidth(f32),
    SetLineCap(LineCap),
    SetDash { dashes: Vec<f32>, phase: f32 },
    MoveTo(f32, f32),
    LineTo(f32, f32),
    CurveTo([f32; 6]),
    Rectangle([f32; 4]),
    Clip,
    EndPath,
    Stroke,
}

fn write_matrix(f: &mut fmt::Formatter<'_>, m: &Matrix) -> fmt::Result {
    write!(
        f,
        "{} {} {} {} {} {}",
        format_number(m.m11),
        format_number(m.m12),
        format_number(m.m21),
        format_number(m.m22),
        format_number(m.m31),
        format_number(m.m32)
    )
}

fn write_numbers(f: &mut fmt::Formatter<'_>, values: &[f32]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        f.write_str(&format_number(*value))?;
    }
    Ok(())
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::BeginText => f.write_str("BT"),
            Operator::EndText => f.write_str("ET"),
            Operator::SetTextMatrix(m) => {
                write_matrix(f, m)?;
                f.write_str(" Tm")
            }
            Operator::SetFontSize { font, size } => {
                write!(f, "/F{font} {} Tf", format_number(*size))
            }
            Operator::SetColorRgb { r, g, b, stroke } => {
                write_numbers(f, &[*r, *g, *b])?;
                f.write_str(if *stroke { " RG" } else { " rg" })
            }
            Operator::SetAlpha { state } => write!(f, "/{state} gs"),
            Operator::SetTextRise(rise) => write!(f, "{} Ts", format_number(*rise)),
            Operator::ShowText(text) => write!(f, "[{text}] TJ"),
            Operator::PushState => f.write_str("q"),
            Operator::PopState => f.write_str("Q"),
            Operator::Transform(m) => {
                write_matrix(f, m)?;
                f.write_str(" cm")
            }
            Operator::DrawImage {
                name,
                width,
                height,
            } => write!(
                f,
                "q {} 0 0 {} 0 0 cm /{name} Do Q",
                format_number(*width),
                format_number(*height)
            ),
            Operator::SetLineWidth(width) => write!(f, "{} w", format_number(*width)),
            Operator::SetLineCap(cap) => {
                let code = match cap {
                    LineCap::Butt => 0,
                    LineCap::Round => 1,
                    LineCap::Square => 2,
                };
                write!(f, "{code} J")
            }
            Operator::SetDash { dashes, phase } => {
                f.write_str("[")?;
                write_numbers(f, dashes)?;
                write!(f, "] {} d", format_number(*phase))
            }
            Operator::MoveTo(x, y) => {
                write_numbers(f, &[*x, *y])?;
                f.write_str(" m")
            }
            Operator::LineTo(x, y) => {
                write_numbers(f, &[*x, *y])?;
                f.write_str(" l")
            }
            Operator::CurveTo(points) => {
                write_numbers(f, points)?;
                f.write_str(" c")
            }
            Operator::Rectangle(rect) => {
                write_numbers(f, rect)?;
                f.write_str(" re")
            }
            Operator::Clip => f.write_str("W"),
            Operator::EndPath => f.write_str("n"),
            Operator::Stroke => f.write_str("S"),
        }
    }
}

/// Graphics state parameters referenced by [`Operator::SetAlpha`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlphaState {
    pub alpha: f32,
    pub stroke: bool,
}

/// Recording [`ContentStream`].
///
/// Fonts are registered in the shared [`FontRegistry`] so several streams
/// (one per page) reuse the same glyph tables.
pub struct OperatorStream {
    registry: Arc<FontRegistry>,
    operators: Vec<Operator>,
    fonts: BTreeSet<FontKey>,
    alpha_states: BTreeMap<String, AlphaState>,
    images: BTreeMap<String, EmojiImage>,
    svg_count: usize,
}

impl OperatorStream {
    pub fn new(registry: Arc<FontRegistry>) -> Self {
        Self {
            registry,
            operators: Vec::new(),
            fonts: BTreeSet::new(),
            alpha_states: BTreeMap::new(),
            images: BTreeMap::new(),
            svg_count: 0,
        }
    }

    pub fn registry(&self) -> &Arc<FontRegistry> {
        &self.registry
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Fonts selected by this stream.
    pub fn fonts(&self) -> impl Iterator<Item = FontKey> + '_ {
        self.fonts.iter().copied()
    }

    pub fn alpha_states(&self) -> &BTreeMap<String, AlphaState> {
        &self.alpha_states
    }

    /// Image resources referenced by `Do` operators, keyed by resource name.
    pub fn images(&self) -> &BTreeMap<String, EmojiImage> {
        &self.images
    }

    /// Every show-text body, in order.
    pub fn shown_text(&self) -> Vec<&str> {
        self.operators
            .iter()
            .filter_map(|op| match op {
                Operator::ShowText(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Serializes the recorded operators, one per line.
    pub fn to_content(&self) -> String {
        let mut out = String::new();
        for op in &self.operators {
            out.push_str(&op.to_string());
            out.push('\n');
        }
        out
    }

    fn image_name(&mut self, image: &EmojiImage) -> String {
        match image {
            EmojiImage::Png { id, .. } => format!("Im{id}"),
            EmojiImage::Svg { .. } => {
                self.svg_count += 1;
                format!("Svg{}", self.svg_count)
            }
        }
    }
}

impl ContentStream for OperatorStream {
    fn begin_text(&mut self) {
        self.operators.push(Operator::BeginText);
    }

    fn end_text(&mut self) {
        self.operators.push(Operator::EndText);
    }

    fn set_text_matrix(&mut self, matrix: &Matrix) {
        self.operators.push(Operator::SetTextMatrix(*matrix));
    }

    fn set_font_size(&mut self, font: FontKey, size: f32) {
        self.fonts.insert(font);
        self.operators.push(Operator::SetFontSize { font, size });
    }

    fn set_color_rgb(&mut self, r: f32, g: f32, b: f32, stroke: bool) {
        self.operators
            .push(Operator::SetColorRgb { r, g, b, stroke });
    }

    fn set_alpha(&mut self, alpha: f32, stroke: bool) {
        let state = format!(
            "{}{}",
            if stroke { "A" } else { "a" },
            format_number(alpha)
        );
        self.alpha_states
            .entry(state.clone())
            .or_insert(AlphaState { alpha, stroke });
        self.operators.push(Operator::SetAlpha { state });
    }

    fn set_text_rise(&mut self, rise: f32) {
        self.operators.push(Operator::SetTextRise(rise));
    }

    fn show_text(&mut self, text: &str) {
        self.operators.push(Operator::ShowText(text.to_string()));
    }

    fn add_font(&mut self, face: &dyn FontFace) -> Arc<FontResource> {
        self.registry.add_font(face)
    }

    fn push_state(&mut self) {
        self.operators.push(Operator::PushState);
    }

    fn pop_state(&mut self) {
        self.operators.push(Operator::PopState);
    }

    fn transform(&mut self, matrix: &Matrix) {
        self.operators.push(Operator::Transform(*matrix));
    }

    fn draw_image(&mut self, image: &EmojiImage, width: f32, height: f32) {
        let name = self.image_name(image);
        self.images
            .entry(name.clone())
            .or_insert_with(|| image.clone());
        self.operators.push(Operator::DrawImage {
            name,
            width,
            height,
        });
    }

    fn set_line_width(&mut self, width: f32) {
        self.operators.push(Operator::SetLineWidth(width));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.operators.push(Operator::SetLineCap(cap));
    }

    fn set_dash(&mut self, dashes: &[f32], phase: f32) {
        self.operators.push(Operator::SetDash {
            dashes: dashes.to_vec(),
            phase,
        });
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.operators.push(Operator::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.operators.push(Operator::LineTo(x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        self.operators
            .push(Operator::CurveTo([x1, y1, x2, y2, x3, y3]));
    }

    fn rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.operators
            .push(Operator::Rectangle([x, y, width, height]));
    }

    fn clip(&mut self) {
        self.operators.push(Operator::Clip);
    }

    fn end_path(&mut self) {
        self.operators.push(Operator::EndPath);
    }

    fn stroke(&mut self) {
        self.operators.push(Operator::Stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_text_object() {
        let mut stream = OperatorStream::new(Arc::new(FontRegistry::new()));
        stream.set_color_rgb(1.0, 0.0, 0.5, false);
        stream.set_alpha(0.5, false);
        stream.begin_text();
        stream.set_text_matrix(&Matrix::new(1.0, 0.0, 0.0, -1.0, 10.0, 20.5));
        stream.set_font_size(FontKey::new(0xab), 12.0);
        stream.show_text("<0001>-50<0002>");
        stream.set_text_rise(-1.5);
        stream.end_text();

        assert_eq!(
            stream.to_content(),
            "1 0 0.5 rg\n/a0.5 gs\nBT\n1 0 0 -1 10 20.5 Tm\n/Fab 12 Tf\n\
             [<0001>-50<0002>] TJ\n-1.5 Ts\nET\n"
        );
        assert_eq!(stream.fonts().collect::<Vec<_>>(), vec![FontKey::new(0xab)]);
        assert_eq!(stream.alpha_states().len(), 1);
    }

    #[test]
    fn test_serializes_paths() {
        let mut stream = OperatorStream::new(Arc::new(FontRegistry::new()));
        stream.set_dash(&[3.0], 0.5);
        stream.set_line_cap(LineCap::Round);
        stream.move_to(0.0, 1.0);
        stream.line_to(5.0, 1.0);
        stream.stroke();

        assert_eq!(stream.to_content(), "[3] 0.5 d\n1 J\n0 1 m\n5 1 l\nS\n");
    }

    #[test]
    fn test_png_images_are_shared_by_id() {
        let mut stream = OperatorStream::new(Arc::new(FontRegistry::new()));
        let image = EmojiImage::Png {
            id: "a7".to_string(),
            data: vec![1, 2, 3],
            width: 2,
            height: 1,
        };
        stream.draw_image(&image, 12.0, 12.0);
        stream.draw_image(&image, 12.0, 12.0);

        assert_eq!(stream.images().len(), 1);
        assert_eq!(
            stream.operators()[0].to_string(),
            "q 12 0 0 12 0 0 cm /Ima7 Do Q"
        );
    }
}
