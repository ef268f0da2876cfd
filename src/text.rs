//! Plain-text display pipeline.
//!
//! Raw message text goes through a fixed sequence of repairs and
//! conversions before shaping: legacy emoji repair, space preservation,
//! inline markup extraction and emoji span scanning. The output is a plain
//! string plus styling spans; the renderer applies the spans, this crate
//! never touches glyphs.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::emoji;
use crate::layout::TextStyle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpanKind {
    /// `^text^` markup: rendered at enlarged size.
    Big,
    /// `*text*` markup: rendered in the link color.
    Link,
    /// Emoji run to be substituted with glyph images of `size` pixels.
    Emoji { size: f32 },
}

/// Byte range into the processed display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub range: Range<usize>,
    pub kind: SpanKind,
}

/// Process raw message text into display text and styling spans.
///
/// Double spaces become a space plus a non-breaking space so that runs of
/// spaces survive whitespace collapsing in the renderer while still
/// allowing the line breaker to wrap at the regular space.
pub fn build_display_text(raw: &str, style: &TextStyle) -> (String, Vec<TextSpan>) {
    let repaired = emoji::repair_legacy_encoding(raw);
    let preserved = repaired.replace("  ", " \u{00A0}").replace("\r\n", "\n");

    let (stage_one, big_spans, _) = strip_marker(&preserved, '^', SpanKind::Big);
    let (text, link_spans, removed) = strip_marker(&stage_one, '*', SpanKind::Link);

    let mut spans: Vec<TextSpan> = big_spans
        .into_iter()
        .map(|span| remap_span(span, &removed))
        .collect();
    spans.extend(link_spans);
    spans.extend(emoji::scan_emoji_spans(&text, style.emoji_size()));
    spans.sort_by_key(|span| span.range.start);

    (text, spans)
}

/// Strip paired single-character markers out of `input`, recording a span
/// over each non-empty enclosed run. Returns the stripped text, the spans
/// (ranges into the output), and the byte positions in `input` of every
/// removed marker. Unpaired and empty-pair markers stay literal.
fn strip_marker(
    input: &str,
    marker: char,
    kind: SpanKind,
) -> (String, Vec<TextSpan>, Vec<usize>) {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut out = String::with_capacity(input.len());
    let mut spans = Vec::new();
    let mut removed = Vec::new();

    let mut k = 0;
    while k < chars.len() {
        let (pos, c) = chars[k];
        if c == marker
            && let Some(offset) = chars[k + 1..].iter().position(|&(_, c2)| c2 == marker)
        {
            let close = k + 1 + offset;
            if close > k + 1 {
                removed.push(pos);
                let span_start = out.len();
                for &(_, inner) in &chars[k + 1..close] {
                    out.push(inner);
                }
                spans.push(TextSpan {
                    range: span_start..out.len(),
                    kind: kind.clone(),
                });
                removed.push(chars[close].0);
                k = close + 1;
                continue;
            }
        }
        out.push(c);
        k += 1;
    }
    (out, spans, removed)
}

/// Shift a span recorded before a strip pass by the single-byte marker
/// removals that happened at or before its boundaries.
fn remap_span(span: TextSpan, removed: &[usize]) -> TextSpan {
    let shift = |pos: usize| pos - removed.iter().filter(|&&r| r < pos).count();
    TextSpan {
        range: shift(span.range.start)..shift(span.range.end),
        kind: span.kind,
    }
}
