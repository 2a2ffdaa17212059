use std::{collections::HashMap, path::PathBuf, sync::Arc};

use euclid::default::{Point2D, Rect, Size2D};
use ttf_parser::Tag;

use crate::{
    error::FontError,
    font_resource::FontKey,
    glyph_id::GlyphId,
    shaping::{ColorGlyphFormat, DecorationMetrics, FontFace, GlyphExtents},
    units::units_from_points,
};

/// A font face loaded from the database, usable by the shaper and the encoder.
///
/// Holds its own copy of the face data: `fontdue` for glyph lookup and
/// advances, `ttf-parser` (parsed on demand) for the tables fontdue does not
/// expose.
pub struct LoadedFace {
    key: FontKey,
    id: fontdb::ID,
    data: Vec<u8>,
    index: u32,
    font: fontdue::Font,
    units_per_em: u16,
    color_format: ColorGlyphFormat,
    bitmap: bool,
}

impl std::fmt::Debug for LoadedFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFace")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("index", &self.index)
            .field("color_format", &self.color_format)
            .field("bitmap", &self.bitmap)
            .finish()
    }
}

impl LoadedFace {
    /// Parses face `index` of `data`.
    pub fn from_data(id: fontdb::ID, data: &[u8], index: u32) -> Result<Self, FontError> {
        let font = fontdue::Font::from_bytes(
            data,
            fontdue::FontSettings {
                collection_index: index,
                scale: 40.0,
                load_substitutions: true,
            },
        )
        .map_err(FontError::Parse)?;

        let face = ttf_parser::Face::parse(data, index)?;
        let has_table = |tag: &[u8; 4]| face.raw_face().table(Tag::from_bytes(tag)).is_some();

        let color_format = if has_table(b"SVG ") {
            ColorGlyphFormat::Svg
        } else if has_table(b"sbix") || has_table(b"CBDT") {
            ColorGlyphFormat::Png
        } else {
            ColorGlyphFormat::None
        };
        let bitmap = has_table(b"EBDT") && !has_table(b"glyf") && !has_table(b"CFF ");
        let units_per_em = face.units_per_em();

        Ok(Self {
            key: FontKey::new(fxhash::hash64(&(data, index))),
            id,
            data: data.to_vec(),
            index,
            font,
            units_per_em,
            color_format,
            bitmap,
        })
    }

    pub fn id(&self) -> fontdb::ID {
        self.id
    }

    pub fn font(&self) -> &fontdue::Font {
        &self.font
    }

    /// Glyph of `ch`, or `None` when the face has no glyph for it.
    pub fn lookup_glyph(&self, ch: char) -> Option<GlyphId> {
        match self.font.lookup_glyph_index(ch) {
            0 => None,
            index => Some(GlyphId::from(index)),
        }
    }

    fn with_tables<R>(&self, f: impl FnOnce(&ttf_parser::Face<'_>) -> R) -> Option<R> {
        match ttf_parser::Face::parse(&self.data, self.index) {
            Ok(face) => Some(f(&face)),
            Err(e) => {
                log::error!("Failed to parse font tables (key: {}): {}", self.key, e);
                None
            }
        }
    }

    /// Decoration metrics at `font_size`, in points.
    pub fn decoration_metrics(&self, font_size: f32) -> DecorationMetrics {
        self.with_tables(|face| {
            let upem = face.units_per_em().max(1) as f32;
            let scale = font_size / upem;
            let ascent = face.ascender() as f32;
            let (underline_position, underline_thickness) = match face.underline_metrics() {
                Some(metrics) => (metrics.position as f32, metrics.thickness as f32),
                None => (-upem / 10.0, upem / 20.0),
            };
            let (strikethrough_position, strikethrough_thickness) =
                match face.strikeout_metrics() {
                    Some(metrics) => (metrics.position as f32, metrics.thickness as f32),
                    None => (ascent * 0.3, underline_thickness),
                };
            DecorationMetrics {
                ascent: ascent * scale,
                underline_position: underline_position * scale,
                underline_thickness: underline_thickness * scale,
                strikethrough_position: strikethrough_position * scale,
                strikethrough_thickness: strikethrough_thickness * scale,
            }
        })
        .unwrap_or_default()
    }
}

impl FontFace for LoadedFace {
    fn key(&self) -> FontKey {
        self.key
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn is_bitmap(&self) -> bool {
        self.bitmap
    }

    fn color_format(&self) -> ColorGlyphFormat {
        self.color_format
    }

    fn glyph_extents(&self, glyph: GlyphId, font_size: f32) -> GlyphExtents {
        let Ok(gid) = u16::try_from(glyph.index()) else {
            return GlyphExtents::default();
        };
        let gid = ttf_parser::GlyphId(gid);

        self.with_tables(|face| {
            let scale = font_size / face.units_per_em().max(1) as f32;
            let units = |value: f32| units_from_points(value * scale);

            let advance = face.glyph_hor_advance(gid).unwrap_or(0) as f32;
            let ascender = face.ascender() as f32;
            let descender = face.descender() as f32;
            let logical = Rect::new(
                Point2D::new(0, units(-ascender)),
                Size2D::new(units(advance), units(ascender - descender)),
            );

            let ink = face
                .glyph_bounding_box(gid)
                .map(|bbox| {
                    Rect::new(
                        Point2D::new(units(bbox.x_min as f32), units(-(bbox.y_max as f32))),
                        Size2D::new(units(bbox.width() as f32), units(bbox.height() as f32)),
                    )
                })
                .unwrap_or_default();

            GlyphExtents { ink, logical }
        })
        .unwrap_or_default()
    }

    fn color_glyph_data(
        &self,
        glyph: GlyphId,
        format: ColorGlyphFormat,
        font_size: f32,
    ) -> Option<Vec<u8>> {
        let gid = ttf_parser::GlyphId(u16::try_from(glyph.index()).ok()?);
        self.with_tables(|face| match format {
            ColorGlyphFormat::None => None,
            ColorGlyphFormat::Svg => face.glyph_svg_image(gid).map(|svg| svg.data.to_vec()),
            ColorGlyphFormat::Png => {
                let ppem = font_size.ceil().clamp(1.0, u16::MAX as f32) as u16;
                face.glyph_raster_image(gid, ppem)
                    .filter(|image| image.format == ttf_parser::RasterImageFormat::PNG)
                    .map(|image| image.data.to_vec())
            }
        })
        .flatten()
    }
}

/// Manages font loading and retrieval using `fontdb`.
///
/// This struct combines a database of available fonts (`fontdb`) with a cache of
/// [`LoadedFace`]s. Faces are loaded lazily, the first time they are requested.
pub struct FontStorage {
    /// This is the font set that has been loaded by fontdb.
    font_db: fontdb::Database,
    /// Faces parsed so far. Not all fonts in fontdb are necessarily loaded here.
    loaded_faces: HashMap<fontdb::ID, Arc<LoadedFace>, fxhash::FxBuildHasher>,
}

impl Default for FontStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FontStorage {
    /// Creates a new empty font storage.
    pub fn new() -> Self {
        Self {
            font_db: fontdb::Database::new(),
            loaded_faces: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
        }
    }
}

/// Loading fonts into fontdb and setting up fontdb.
impl FontStorage {
    /// Loads a font from binary data.
    pub fn load_font_binary(&mut self, data: impl Into<Vec<u8>>) {
        self.font_db.load_font_data(data.into());
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&mut self, path: PathBuf) -> Result<(), std::io::Error> {
        self.font_db.load_font_file(path)
    }

    /// Loads all fonts from a directory.
    pub fn load_fonts_dir(&mut self, dir: PathBuf) {
        self.font_db.load_fonts_dir(dir)
    }

    /// Loads the system fonts.
    pub fn load_system_fonts(&mut self) {
        self.font_db.load_system_fonts();
    }

    /// Removes a face by ID.
    ///
    /// Fonts already registered in a document keep their resources.
    pub fn remove_face(&mut self, id: fontdb::ID) {
        self.font_db.remove_face(id);
        self.loaded_faces.remove(&id);
    }

    pub fn is_empty(&self) -> bool {
        self.font_db.is_empty()
    }

    pub fn len(&self) -> usize {
        self.font_db.len()
    }

    /// Sets the family name for the "serif" generic family.
    pub fn set_serif_family(&mut self, family: impl Into<String>) {
        self.font_db.set_serif_family(family);
    }

    /// Sets the family name for the "sans-serif" generic family.
    pub fn set_sans_serif_family(&mut self, family: impl Into<String>) {
        self.font_db.set_sans_serif_family(family);
    }

    /// Sets the family name for the "monospace" generic family.
    pub fn set_monospace_family(&mut self, family: impl Into<String>) {
        self.font_db.set_monospace_family(family);
    }
}

/// Get [`LoadedFace`]
impl FontStorage {
    /// Queries for a face matching the description, loading it if necessary.
    pub fn query(&mut self, query: &fontdb::Query) -> Option<Arc<LoadedFace>> {
        let id = self.font_db.query(query)?;
        self.face(id).ok()
    }

    /// Retrieves a loaded face by ID, loading it if necessary.
    pub fn face(&mut self, id: fontdb::ID) -> Result<Arc<LoadedFace>, FontError> {
        use std::collections::hash_map::Entry;

        match self.loaded_faces.entry(id) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let face_result = self
                    .font_db
                    .with_face_data(id, |data, index| LoadedFace::from_data(id, data, index))
                    .ok_or(FontError::UnknownFace(id))?;

                match face_result {
                    Ok(face) => {
                        log::debug!("Loaded font face {:?} as {}", id, face.key());
                        Ok(Arc::clone(entry.insert(Arc::new(face))))
                    }
                    Err(e) => {
                        log::error!("Failed to load font (id: {:?}): {}", id, e);
                        Err(e)
                    }
                }
            }
        }
    }

    /// Every face in the database, loaded. Faces that fail to load are
    /// skipped.
    pub fn all_faces(&mut self) -> Vec<Arc<LoadedFace>> {
        let ids: Vec<fontdb::ID> = self.font_db.faces().map(|info| info.id).collect();
        ids.into_iter().filter_map(|id| self.face(id).ok()).collect()
    }

    /// Returns face info for an ID.
    pub fn face_info(&self, id: fontdb::ID) -> Option<&fontdb::FaceInfo> {
        self.font_db.face(id)
    }
}
