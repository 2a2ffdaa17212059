/// RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Which decoration lines are requested for a textbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TextDecorationLine {
    pub underline: bool,
    pub overline: bool,
    pub line_through: bool,
}

impl TextDecorationLine {
    pub const NONE: Self = Self {
        underline: false,
        overline: false,
        line_through: false,
    };

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DecorationStyle {
    #[default]
    Solid,
    Double,
    Dotted,
    Dashed,
    Wavy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

/// Computed style of a textbox, limited to what drawing needs.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in points. Layout guarantees it is positive.
    pub font_size: f32,
    pub color: Rgba,
    pub decoration_line: TextDecorationLine,
    /// `None` means `currentColor`.
    pub decoration_color: Option<Rgba>,
    pub decoration_style: DecorationStyle,
    pub lang: Option<String>,
    /// Marker appended by hyphenation, removed again before truncating.
    pub hyphenate_character: String,
    pub visibility: Visibility,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            color: Rgba::BLACK,
            decoration_line: TextDecorationLine::NONE,
            decoration_color: None,
            decoration_style: DecorationStyle::Solid,
            lang: None,
            hyphenate_character: "\u{2010}".to_string(),
            visibility: Visibility::Visible,
        }
    }
}

impl TextStyle {
    pub fn decoration_color(&self) -> Rgba {
        self.decoration_color.unwrap_or(self.color)
    }
}

/// A positioned, styled line of text produced by layout.
///
/// **Y-axis goes down** in layout space.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBox {
    pub position_x: f32,
    pub position_y: f32,
    /// Distance from the top of the box to the baseline.
    pub baseline: f32,
    pub width: f32,
    pub text: String,
    pub style: TextStyle,
    /// Available width for truncation. Required when an overflow policy other
    /// than [`LineOverflow::None`] is used.
    pub max_width: Option<f32>,
}

/// What to do with text that does not fit in [`TextBox::max_width`].
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum LineOverflow {
    /// Draw the line as shaped.
    #[default]
    None,
    /// `text-overflow: ellipsis`, delegated to the shaping engine.
    Ellipsis,
    /// `block-ellipsis`: drop whole trailing words and append the string.
    Block(String),
}

impl LineOverflow {
    /// `block-ellipsis: auto`.
    pub fn block_auto() -> Self {
        Self::Block("\u{2026}".to_string())
    }
}
