//! Emoji handling for display text: repair of legacy carrier-encoded glyphs
//! and scanning for emoji runs that the renderer replaces with glyph images.

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::text::{SpanKind, TextSpan};

/// Legacy Softbank private-use codepoints mapped to their Unicode emoji.
/// Messages produced by old clients on some carriers arrive with these PUA
/// characters instead of real emoji. The table covers the common pages;
/// unmapped PUA characters pass through unchanged.
static SOFTBANK_MAP: Lazy<HashMap<char, char>> = Lazy::new(|| {
    [
        ('\u{E001}', '\u{1F466}'), // boy
        ('\u{E002}', '\u{1F467}'), // girl
        ('\u{E003}', '\u{1F48B}'), // kiss mark
        ('\u{E004}', '\u{1F468}'), // man
        ('\u{E005}', '\u{1F469}'), // woman
        ('\u{E006}', '\u{1F455}'), // t-shirt
        ('\u{E007}', '\u{1F45F}'), // shoe
        ('\u{E008}', '\u{1F4F7}'), // camera
        ('\u{E009}', '\u{260E}'),  // telephone
        ('\u{E00A}', '\u{1F4F1}'), // mobile phone
        ('\u{E00B}', '\u{1F4E0}'), // fax
        ('\u{E00C}', '\u{1F4BB}'), // computer
        ('\u{E00D}', '\u{1F44A}'), // fist
        ('\u{E00E}', '\u{1F44D}'), // thumbs up
        ('\u{E00F}', '\u{261D}'),  // index up
        ('\u{E010}', '\u{270A}'),  // raised fist
        ('\u{E011}', '\u{270C}'),  // victory hand
        ('\u{E012}', '\u{270B}'),  // raised hand
        ('\u{E013}', '\u{1F3BF}'), // ski
        ('\u{E014}', '\u{26F3}'),  // golf
        ('\u{E015}', '\u{1F3BE}'), // tennis
        ('\u{E016}', '\u{26BE}'),  // baseball
        ('\u{E017}', '\u{1F3C4}'), // surfer
        ('\u{E018}', '\u{26BD}'),  // soccer ball
        ('\u{E019}', '\u{1F3A3}'), // fishing
        ('\u{E01A}', '\u{1F40E}'), // horse
        ('\u{E01B}', '\u{1F697}'), // car
        ('\u{E01C}', '\u{26F5}'),  // sailboat
        ('\u{E01D}', '\u{2708}'),  // airplane
        ('\u{E01E}', '\u{1F683}'), // train car
        ('\u{E01F}', '\u{1F687}'), // metro
        ('\u{E020}', '\u{2753}'),  // question mark
        ('\u{E021}', '\u{2757}'),  // exclamation mark
        ('\u{E022}', '\u{2764}'),  // heart
        ('\u{E023}', '\u{1F494}'), // broken heart
        ('\u{E036}', '\u{1F3E0}'), // house
        ('\u{E056}', '\u{1F60A}'), // smiling face
        ('\u{E057}', '\u{1F603}'), // grinning face
        ('\u{E058}', '\u{1F61E}'), // disappointed face
        ('\u{E059}', '\u{1F620}'), // angry face
        ('\u{E05A}', '\u{1F4A9}'), // pile of poo
        ('\u{E105}', '\u{1F61C}'), // winking tongue
        ('\u{E106}', '\u{1F60D}'), // heart eyes
        ('\u{E107}', '\u{1F631}'), // screaming face
        ('\u{E108}', '\u{1F613}'), // cold sweat
        ('\u{E401}', '\u{1F622}'), // crying face
        ('\u{E404}', '\u{1F604}'), // grinning smiling eyes
        ('\u{E405}', '\u{1F606}'), // laughing
    ]
    .into_iter()
    .collect()
});

/// Replace legacy carrier codepoints with their Unicode equivalents.
/// Returns the input untouched when no repair is needed.
pub fn repair_legacy_encoding(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| SOFTBANK_MAP.contains_key(&c)) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| SOFTBANK_MAP.get(&c).copied().unwrap_or(c))
            .collect(),
    )
}

/// Whether a character renders as an emoji glyph image.
pub fn is_emoji(c: char) -> bool {
    matches!(c as u32,
        0x1F000..=0x1FAFF        // pictographs, emoticons, transport, symbols
        | 0x2600..=0x26FF        // misc symbols
        | 0x2700..=0x27BF        // dingbats
        | 0x2B00..=0x2BFF        // arrows/stars used as emoji
        | 0x2764 | 0x2753 | 0x2757 | 0x260E | 0x261D | 0x2708
        | 0xFE0F                 // variation selector
        | 0x200D                 // zero-width joiner
    )
}

/// Scan `text` for contiguous emoji runs and produce one span per run,
/// sized to the active text style so the renderer can substitute glyph
/// images of the right dimensions.
pub fn scan_emoji_spans(text: &str, glyph_size: f32) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut run_start: Option<usize> = None;
    for (idx, c) in text.char_indices() {
        if is_emoji(c) {
            run_start.get_or_insert(idx);
        } else if let Some(start) = run_start.take() {
            spans.push(TextSpan {
                range: start..idx,
                kind: SpanKind::Emoji { size: glyph_size },
            });
        }
    }
    if let Some(start) = run_start {
        spans.push(TextSpan {
            range: start..text.len(),
            kind: SpanKind::Emoji { size: glyph_size },
        });
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_maps_legacy_codepoints() {
        assert_eq!(repair_legacy_encoding("hi \u{E022}"), "hi \u{2764}");
        assert_eq!(repair_legacy_encoding("\u{E057}\u{E05A}"), "😃💩");
    }

    #[test]
    fn test_repair_leaves_clean_text_borrowed() {
        let text = "no emoji here";
        assert!(matches!(
            repair_legacy_encoding(text),
            Cow::Borrowed(s) if s == text
        ));
    }

    #[test]
    fn test_unmapped_pua_passes_through() {
        assert_eq!(repair_legacy_encoding("\u{E700}"), "\u{E700}");
    }

    #[test]
    fn test_scan_groups_contiguous_runs() {
        let spans = scan_emoji_spans("a😃😊b☎", 20.0);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].range, 1..9);
        assert_eq!(spans[1].range.end, "a😃😊b☎".len());
    }

    #[test]
    fn test_scan_plain_text_is_empty() {
        assert!(scan_emoji_spans("plain text", 20.0).is_empty());
    }
}
