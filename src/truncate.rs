//! Shrinking a line until it fits its box.
//!
//! `text-overflow: ellipsis` is left to the shaping engine. `block-ellipsis`
//! drops whole trailing words: each attempt shapes a shorter candidate text
//! followed by the ellipsis string, until the engine reports that nothing
//! overflows or no word boundary is left.

use icu_segmenter::{WordSegmenter, options::WordBreakInvariantOptions};

use crate::{
    shaping::{LineMode, ShapedLine, ShapingEngine},
    textbox::{LineOverflow, TextStyle},
};

/// Byte index of the end of the last word of `text`, not counting a word
/// ending at the very end of the text.
///
/// Returns `None` when the text has fewer than two characters or no such
/// boundary exists.
pub fn last_word_end(text: &str) -> Option<usize> {
    let mut chars = text.chars();
    if chars.next().is_none() || chars.next().is_none() {
        return None;
    }

    let segmenter = WordSegmenter::new_auto(WordBreakInvariantOptions::default());
    let mut boundaries = segmenter.segment_str(text);
    let mut last = None;
    while let Some(boundary) = boundaries.next() {
        if boundary > 0 && boundary < text.len() && boundaries.is_word_like() {
            last = Some(boundary);
        }
    }
    last
}

/// Shapes the first line of `text`, applying `overflow` within `max_width`.
///
/// With [`LineOverflow::Block`] the returned line's text is the truncated
/// candidate plus the ellipsis. When a single word is wider than the box the
/// overflowing line is returned as is.
pub fn fit_line<E: ShapingEngine + ?Sized>(
    engine: &E,
    text: &str,
    style: &TextStyle,
    max_width: Option<f32>,
    overflow: &LineOverflow,
) -> ShapedLine {
    match overflow {
        LineOverflow::None => engine.shape(
            text,
            style,
            LineMode {
                width: max_width,
                ellipsize_end: false,
            },
        ),
        LineOverflow::Ellipsis => {
            if max_width.is_none() {
                log::warn!("Ellipsis requested for a textbox without a maximum width");
            }
            engine.shape(
                text,
                style,
                LineMode {
                    width: max_width,
                    ellipsize_end: true,
                },
            )
        }
        LineOverflow::Block(ellipsis) => match max_width {
            Some(width) => {
                let mode = LineMode {
                    width: Some(width),
                    ellipsize_end: false,
                };
                fit_block_ellipsis(engine, text, style, mode, ellipsis)
            }
            None => {
                log::warn!("Block ellipsis requested for a textbox without a maximum width");
                engine.shape(text, style, LineMode::default())
            }
        },
    }
}

fn fit_block_ellipsis<E: ShapingEngine + ?Sized>(
    engine: &E,
    text: &str,
    style: &TextStyle,
    mode: LineMode,
    ellipsis: &str,
) -> ShapedLine {
    let mut candidate = text;

    // a hyphenated last word is dropped entirely
    let marker = style.hyphenate_character.as_str();
    if !marker.is_empty() {
        if let Some(stripped) = text.strip_suffix(marker) {
            if let Some(end) = last_word_end(stripped) {
                candidate = &text[..end];
            }
        }
    }

    let mut line = engine.shape(&format!("{candidate}{ellipsis}"), style, mode);
    while line.overflow_index.is_some() {
        let Some(end) = last_word_end(candidate) else {
            log::debug!("No word boundary left in {candidate:?}, keeping overflowing line");
            break;
        };
        candidate = &candidate[..end];
        log::trace!("Retrying block ellipsis with {candidate:?}");
        line = engine.shape(&format!("{candidate}{ellipsis}"), style, mode);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFace, ScriptedEngine};
    use proptest::prelude::*;

    fn style() -> TextStyle {
        TextStyle {
            font_size: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_last_word_end() {
        assert_eq!(last_word_end("The quick brown fox"), Some(15));
        assert_eq!(last_word_end("The quick brown"), Some(9));
        assert_eq!(last_word_end("The quick "), Some(9));
        assert_eq!(last_word_end("Supercalifragilistic"), None);
        assert_eq!(last_word_end("a"), None);
        assert_eq!(last_word_end(""), None);
    }

    #[test]
    fn test_block_ellipsis_drops_whole_words() {
        // 5pt per character, room for 16 characters
        let engine = ScriptedEngine::new(FakeFace::new(1));
        let overflow = LineOverflow::block_auto();

        let line = fit_line(&engine, "The quick brown fox", &style(), Some(80.0), &overflow);

        assert_eq!(line.text, "The quick brown\u{2026}");
        assert_eq!(line.overflow_index, None);
        assert_eq!(
            engine.shaped_texts(),
            vec!["The quick brown fox\u{2026}", "The quick brown\u{2026}"]
        );
    }

    #[test]
    fn test_block_ellipsis_never_readds_words() {
        let engine = ScriptedEngine::new(FakeFace::new(1));
        let overflow = LineOverflow::Block("...".to_string());

        let line = fit_line(&engine, "The quick brown fox", &style(), Some(40.0), &overflow);

        assert_eq!(line.text, "The...");
        let texts = engine.shaped_texts();
        assert_eq!(texts.len(), 4);
        assert!(texts.windows(2).all(|pair| pair[1].len() < pair[0].len()));
    }

    #[test]
    fn test_unbreakable_word_is_accepted() {
        let engine = ScriptedEngine::new(FakeFace::new(1));
        let overflow = LineOverflow::block_auto();

        let line = fit_line(&engine, "Pneumonoultramicroscopic", &style(), Some(20.0), &overflow);

        assert!(line.overflow_index.is_some());
        assert_eq!(engine.shaped_texts().len(), 1);
    }

    #[test]
    fn test_hyphenated_word_is_removed() {
        let engine = ScriptedEngine::new(FakeFace::new(1));
        let overflow = LineOverflow::block_auto();
        let text = "The quick brown fox jum\u{2010}";

        let line = fit_line(&engine, text, &style(), Some(200.0), &overflow);

        assert_eq!(line.text, "The quick brown fox\u{2026}");
    }

    #[test]
    fn test_block_ellipsis_without_width_keeps_text() {
        let engine = ScriptedEngine::new(FakeFace::new(1));
        let overflow = LineOverflow::block_auto();

        let line = fit_line(&engine, "The quick brown fox", &style(), None, &overflow);

        assert_eq!(line.text, "The quick brown fox");
        assert_eq!(line.overflow_index, None);
        let calls = engine.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, LineMode::default());
    }

    #[test]
    fn test_ellipsis_is_delegated_to_engine() {
        let engine = ScriptedEngine::new(FakeFace::new(1));

        let line = fit_line(&engine, "abcdefgh", &style(), Some(20.0), &LineOverflow::Ellipsis);

        assert_eq!(line.text, "abc\u{2026}");
        let calls = engine.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.ellipsize_end);
    }

    #[test]
    fn test_no_overflow_policy_shapes_once() {
        let engine = ScriptedEngine::new(FakeFace::new(1));

        let line = fit_line(&engine, "The quick brown fox", &style(), Some(40.0), &LineOverflow::None);

        assert_eq!(line.text, "The quick brown fox");
        assert_eq!(engine.shaped_texts().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_truncation_is_monotonic(
            words in prop::collection::vec("[a-z]{1,8}", 1..10),
            max_width in 5.0f32..200.0,
        ) {
            let text = words.join(" ");
            let engine = ScriptedEngine::new(FakeFace::new(1));

            fit_line(&engine, &text, &style(), Some(max_width), &LineOverflow::block_auto());

            let texts = engine.shaped_texts();
            prop_assert!(texts.len() <= words.len());
            prop_assert!(texts.windows(2).all(|pair| pair[1].len() < pair[0].len()));
        }
    }
}
