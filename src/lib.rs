//! # Fude
//!
//! Encodes shaped lines of text into page-description content-stream
//! operators.
//!
//! ## Overview
//!
//! A [`TextBox`] produced by layout is drawn with [`draw_text`]: decorations,
//! a text object holding the glyphs of its first line, the embedded color
//! glyph images (emoji) composited on top, and the line-through. Glyphs are
//! batched into as few show-text operators as possible, and every font's
//! glyph widths and glyph-to-text mappings are recorded once in a
//! document-wide [`FontRegistry`] for later embedding.
//!
//! Shaping is behind the [`ShapingEngine`] trait. [`SimpleShaper`] is a small
//! engine over fonts loaded into a [`FontStorage`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use fude::{
//!     FontRegistry, FontStorage, LineOverflow, OperatorStream, SimpleShaper, TextBox,
//!     draw_text, textbox::TextStyle,
//! };
//!
//! // 1. Load fonts and build a shaper
//! let mut storage = FontStorage::new();
//! storage.load_system_fonts();
//! let shaper = SimpleShaper::from_storage(&mut storage, &[fude::fontdb::Family::SansSerif]);
//!
//! // 2. One registry per document, one stream per page
//! let registry = Arc::new(FontRegistry::new());
//! let mut stream = OperatorStream::new(Arc::clone(&registry));
//!
//! // 3. Draw
//! let textbox = TextBox {
//!     position_x: 72.0,
//!     position_y: 72.0,
//!     baseline: 9.0,
//!     width: 200.0,
//!     text: "Hello world".to_string(),
//!     style: TextStyle { font_size: 12.0, ..Default::default() },
//!     max_width: Some(200.0),
//! };
//! let emojis = draw_text(&mut stream, &shaper, &textbox, 0.0, &LineOverflow::None).unwrap();
//! println!("{}", stream.to_content());
//! println!("{} color glyphs", emojis.len());
//! ```
//!
//! ## Features
//!
//! *   **Minimal operators**: one show-text string per run of glyphs sharing a font and baseline.
//! *   **Truncation**: engine-side `text-overflow: ellipsis` and word-dropping `block-ellipsis`.
//! *   **Color glyphs**: SVG and PNG glyph images are extracted and placed over the text.
//! *   **Thread Safety**: the font registry can be shared by pages drawn concurrently.

pub mod color_glyph;
pub mod decoration;
pub mod draw;
pub mod encoder;
pub mod error;
pub mod font_resource;
pub mod font_storage;
pub mod glyph_id;
pub mod shaper;
pub mod shaping;
pub mod stream;
pub mod textbox;
pub mod truncate;
pub mod units;

#[cfg(test)]
mod testing;

// common re-exports
pub use draw::{DrawConfig, draw_text, draw_text_with_config};
pub use error::DrawError;
pub use font_resource::{FontKey, FontRegistry, FontResource};
pub use font_storage::{FontStorage, LoadedFace};
pub use glyph_id::GlyphId;
pub use shaper::SimpleShaper;
pub use shaping::{FontFace, ShapedLine, ShapingEngine};
pub use stream::{ContentStream, OperatorStream};
pub use textbox::{LineOverflow, TextBox};

// re-export dependencies
pub use fontdb;
pub use fontdue;
pub use parking_lot;
