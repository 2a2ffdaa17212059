//! Extraction of embedded color glyph images (emoji).
//!
//! Color glyphs are not drawn through the text operators: their image is
//! queued as an [`EmojiDescriptor`] and composited after the text object is
//! closed. The outline glyph is still shown, so a glyph whose image cannot be
//! used keeps its plain rendering.

use std::sync::Arc;

use crate::{
    error::ColorGlyphError,
    font_resource::FontResource,
    glyph_id::GlyphId,
    shaping::{ColorGlyphFormat, FontFace},
    units::units_to_points,
};

/// Image data of one color glyph, ready to be drawn by the output stream.
#[derive(Clone, Debug, PartialEq)]
pub enum EmojiImage {
    /// Self-contained SVG document showing exactly one glyph.
    Svg { document: String },
    /// PNG bitmap. `id` is unique per font and glyph so streams can share the
    /// image resource.
    Png {
        id: String,
        data: Vec<u8>,
        width: u32,
        height: u32,
    },
}

/// A color glyph image queued for the compositing pass.
///
/// Scales and offsets are relative to the font size: the image is drawn in a
/// `font_size` square, scaled by `scale_x`/`scale_y` and moved to
/// `(x + pen_x * font_size, y + pen_y)` where `(x, y)` is the line origin.
#[derive(Clone, Debug)]
pub struct EmojiDescriptor {
    pub image: EmojiImage,
    pub font: Arc<FontResource>,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Pen position of the glyph along the line, in ems.
    pub pen_x: f32,
    pub pen_y: f32,
}

/// Result of probing a glyph for embedded color data.
#[derive(Clone, Debug, PartialEq)]
pub enum GlyphImage {
    None,
    Vector {
        document: String,
        scale: f32,
    },
    Raster {
        image: EmojiImage,
        scale_x: f32,
        scale_y: f32,
        offset_y: f32,
    },
}

impl GlyphImage {
    /// Turns a found image into a descriptor placed at `pen_x`.
    pub fn into_descriptor(self, font: Arc<FontResource>, pen_x: f32) -> Option<EmojiDescriptor> {
        match self {
            GlyphImage::None => None,
            GlyphImage::Vector { document, scale } => Some(EmojiDescriptor {
                image: EmojiImage::Svg { document },
                font,
                scale_x: scale,
                scale_y: scale,
                pen_x,
                pen_y: 0.0,
            }),
            GlyphImage::Raster {
                image,
                scale_x,
                scale_y,
                offset_y,
            } => Some(EmojiDescriptor {
                image,
                font,
                scale_x,
                scale_y,
                pen_x,
                pen_y: offset_y,
            }),
        }
    }
}

/// Looks for an embedded image for `glyph`.
///
/// `width` is the glyph's declared per-mille width. Broken image data is
/// logged and reported as [`GlyphImage::None`].
pub fn probe(
    face: &dyn FontFace,
    font: &FontResource,
    glyph: GlyphId,
    width: i32,
    font_size: f32,
) -> GlyphImage {
    let result = match font.color_format() {
        ColorGlyphFormat::None => return GlyphImage::None,
        ColorGlyphFormat::Svg => vector_image(face, font, glyph, width, font_size),
        ColorGlyphFormat::Png => raster_image(face, font, glyph, width, font_size),
    };

    match result {
        Ok(image) => image,
        Err(ColorGlyphError::Missing(_)) => GlyphImage::None,
        Err(err) => {
            log::warn!("Skipping color image of font {}: {}", font.key(), err);
            GlyphImage::None
        }
    }
}

fn vector_image(
    face: &dyn FontFace,
    font: &FontResource,
    glyph: GlyphId,
    width: i32,
    font_size: f32,
) -> Result<GlyphImage, ColorGlyphError> {
    let data = face
        .color_glyph_data(glyph, ColorGlyphFormat::Svg, font_size)
        .ok_or(ColorGlyphError::Missing(glyph))?;
    let source =
        std::str::from_utf8(&data).map_err(|_| ColorGlyphError::SvgEncoding { glyph })?;
    let document = isolate_svg_glyph(source, glyph)
        .map_err(|source| ColorGlyphError::SvgParse { glyph, source })?;

    let units_per_em = font.units_per_em().max(1) as f32;
    let scale = width as f32 / 1000.0 / units_per_em * font_size;

    Ok(GlyphImage::Vector { document, scale })
}

/// Rewrites an OpenType SVG document so it shows only `glyph`.
///
/// One document may define many glyphs. All top-level children are moved
/// into `<defs>` and a `<use>` pointing at the glyph's `glyph{id}` element is
/// appended.
pub fn isolate_svg_glyph(source: &str, glyph: GlyphId) -> Result<String, roxmltree::Error> {
    let document = roxmltree::Document::parse(source)?;
    let root = document.root_element();
    let range = root.range();
    let element = &source[range.clone()];

    let use_element = format!("<use href=\"#glyph{}\"/>", glyph.index());
    let mut out = String::with_capacity(element.len() + use_element.len() + 16);

    match (root.first_child(), root.last_child()) {
        (Some(first), Some(last)) => {
            let inner_start = first.range().start;
            let inner_end = last.range().end;
            out.push_str(&source[range.start..inner_start]);
            out.push_str("<defs>");
            out.push_str(&source[inner_start..inner_end]);
            out.push_str("</defs>");
            out.push_str(&use_element);
            out.push_str(&source[inner_end..range.end]);
        }
        _ => {
            let name = root.tag_name().name();
            if let Some(open) = element.strip_suffix("/>") {
                out.push_str(open.trim_end());
                out.push('>');
            } else if let Some(close) = element.rfind("</") {
                out.push_str(&element[..close]);
            } else {
                out.push_str(element);
            }
            out.push_str("<defs></defs>");
            out.push_str(&use_element);
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }

    Ok(out)
}

fn raster_image(
    face: &dyn FontFace,
    font: &FontResource,
    glyph: GlyphId,
    width: i32,
    font_size: f32,
) -> Result<GlyphImage, ColorGlyphError> {
    let data = face
        .color_glyph_data(glyph, ColorGlyphFormat::Png, font_size)
        .ok_or(ColorGlyphError::Missing(glyph))?;

    let (image_width, image_height) = {
        let decoder = png::Decoder::new(data.as_slice());
        let reader = decoder
            .read_info()
            .map_err(|source| ColorGlyphError::PngDecode { glyph, source })?;
        let info = reader.info();
        (info.width, info.height)
    };
    if image_width == 0 || image_height == 0 {
        return Err(ColorGlyphError::EmptyImage(glyph));
    }

    let scale_y = width as f32 / 1000.0;
    let scale_x = image_width as f32 / image_height as f32 * scale_y;

    // put the bottom of the logical box on the baseline
    let logical = face.glyph_extents(glyph, font_size).logical;
    let offset_y =
        units_to_points(-logical.origin.y - logical.size.height) / font_size - font_size;

    Ok(GlyphImage::Raster {
        image: EmojiImage::Png {
            id: format!("{:016x}-{}", font.key().hash(), glyph.index()),
            data,
            width: image_width,
            height: image_height,
        },
        scale_x,
        scale_y,
        offset_y,
    })
}
