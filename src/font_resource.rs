use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::{Mutex, RwLock};

use crate::{
    glyph_id::GlyphId,
    shaping::{ColorGlyphFormat, FontFace},
};

/// Stable identity hash of a font face.
///
/// Used as the key of the document-wide font registry and as the resource name
/// of the font inside content streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontKey(u64);

impl FontKey {
    pub fn new(hash: u64) -> Self {
        Self(hash)
    }

    pub fn hash(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

#[derive(Default)]
struct GlyphTables {
    widths: HashMap<GlyphId, i32, fxhash::FxBuildHasher>,
    cmap: HashMap<GlyphId, String, fxhash::FxBuildHasher>,
}

/// Per-font data shared by every textbox of a document.
///
/// The glyph tables only grow: an entry is written the first time a glyph is
/// met and is never replaced, so later draws reuse exactly the same width and
/// text mapping. Access goes through a per-font lock, which makes concurrent
/// first sightings of the same glyph safe.
pub struct FontResource {
    key: FontKey,
    units_per_em: u16,
    bitmap: bool,
    color_format: ColorGlyphFormat,
    tables: Mutex<GlyphTables>,
}

impl FontResource {
    pub fn new(face: &dyn FontFace) -> Self {
        Self {
            key: face.key(),
            units_per_em: face.units_per_em(),
            bitmap: face.is_bitmap(),
            color_format: face.color_format(),
            tables: Mutex::new(GlyphTables::default()),
        }
    }

    pub fn key(&self) -> FontKey {
        self.key
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// One-byte glyph codes, drawn at size 1 because the glyphs are already
    /// scaled.
    pub fn is_bitmap(&self) -> bool {
        self.bitmap
    }

    pub fn color_format(&self) -> ColorGlyphFormat {
        self.color_format
    }

    pub fn has_svg(&self) -> bool {
        self.color_format == ColorGlyphFormat::Svg
    }

    pub fn has_png(&self) -> bool {
        self.color_format == ColorGlyphFormat::Png
    }

    /// Declared per-mille width of `glyph`, computing it with `compute` on the
    /// first call for this glyph.
    pub fn width_or_insert_with(&self, glyph: GlyphId, compute: impl FnOnce() -> i32) -> i32 {
        *self.tables.lock().widths.entry(glyph).or_insert_with(compute)
    }

    pub fn width(&self, glyph: GlyphId) -> Option<i32> {
        self.tables.lock().widths.get(&glyph).copied()
    }

    /// Records the source text of `glyph` unless it is already known.
    ///
    /// Returns `true` when the mapping was inserted.
    pub fn insert_cmap_with(&self, glyph: GlyphId, text: impl FnOnce() -> String) -> bool {
        use std::collections::hash_map::Entry;

        match self.tables.lock().cmap.entry(glyph) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(text());
                true
            }
        }
    }

    pub fn cmap(&self, glyph: GlyphId) -> Option<String> {
        self.tables.lock().cmap.get(&glyph).cloned()
    }

    /// Sorted copy of the width table, as needed when writing the font's
    /// width array.
    pub fn widths(&self) -> Vec<(GlyphId, i32)> {
        let mut widths: Vec<_> = self
            .tables
            .lock()
            .widths
            .iter()
            .map(|(glyph, width)| (*glyph, *width))
            .collect();
        widths.sort_unstable_by_key(|(glyph, _)| *glyph);
        widths
    }

    /// Sorted copy of the glyph to text table, as needed when writing the
    /// font's `ToUnicode` map.
    pub fn cmap_entries(&self) -> Vec<(GlyphId, String)> {
        let mut cmap: Vec<_> = self
            .tables
            .lock()
            .cmap
            .iter()
            .map(|(glyph, text)| (*glyph, text.clone()))
            .collect();
        cmap.sort_unstable_by_key(|(glyph, _)| *glyph);
        cmap
    }
}

impl fmt::Debug for FontResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontResource")
            .field("key", &self.key)
            .field("units_per_em", &self.units_per_em)
            .field("bitmap", &self.bitmap)
            .field("color_format", &self.color_format)
            .finish_non_exhaustive()
    }
}

/// Document-wide registry of [`FontResource`]s keyed by [`FontKey`].
///
/// Share it with `Arc` between every stream of a document.
#[derive(Default)]
pub struct FontRegistry {
    fonts: RwLock<HashMap<FontKey, Arc<FontResource>, fxhash::FxBuildHasher>>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the resource for `face`, registering it on first use.
    pub fn add_font(&self, face: &dyn FontFace) -> Arc<FontResource> {
        let key = face.key();
        if let Some(font) = self.fonts.read().get(&key) {
            return Arc::clone(font);
        }

        let mut fonts = self.fonts.write();
        let font = fonts.entry(key).or_insert_with(|| {
            log::debug!("Registering font {key}");
            Arc::new(FontResource::new(face))
        });
        Arc::clone(font)
    }

    pub fn get(&self, key: FontKey) -> Option<Arc<FontResource>> {
        self.fonts.read().get(&key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.fonts.read().len()
    }

    /// All registered fonts, ordered by key.
    pub fn fonts(&self) -> Vec<Arc<FontResource>> {
        let mut fonts: Vec<_> = self.fonts.read().values().cloned().collect();
        fonts.sort_unstable_by_key(|font| font.key());
        fonts
    }
}
