//! Pagination of shaped message text into bounded layout blocks.
//!
//! Long messages are split into blocks of at most [`LINES_PER_BLOCK`] lines
//! so the renderer can lay out and invalidate bounded units instead of one
//! giant text run. Shaping itself is an external service behind
//! [`TextShaper`]; this module only drives it and keeps the width/height
//! bookkeeping.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

pub const LINES_PER_BLOCK: usize = 10;

/// Explicit style value threaded into pagination and display-text
/// processing. There is deliberately no process-wide style singleton;
/// every call site passes the style it wants, which keeps pagination
/// referentially transparent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in scale-independent units.
    pub font_size: f32,
    /// Display density multiplier applied to unit sizes.
    pub density: f32,
    pub text_color: u32,
    pub link_color: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            density: 1.0,
            text_color: 0xFF00_0000,
            link_color: 0xFF31_6F9F,
        }
    }
}

impl TextStyle {
    /// Scale a unit value to pixels.
    pub fn dp(&self, units: f32) -> f32 {
        units * self.density
    }

    /// Pixel size of substituted emoji glyphs.
    pub fn emoji_size(&self) -> f32 {
        self.dp(20.0)
    }
}

/// One laid-out line produced by the shaping service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedLine {
    /// Byte offset of the line's first character in the shaped text.
    pub start: usize,
    /// Byte offset one past the line's last character.
    pub end: usize,
    pub width: f32,
    /// Left indent; non-zero for right-to-left line starts.
    pub left: f32,
    /// Top of the line relative to the top of the shaped run.
    pub top: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapedText {
    pub lines: Vec<ShapedLine>,
    pub height: f32,
}

impl ShapedText {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// External text shaping service: measures text at a style and maximum
/// width, producing per-line metrics and character offsets.
pub trait TextShaper {
    fn shape(&self, text: &str, style: &TextStyle, max_width: f32)
    -> Result<ShapedText, LayoutError>;
}

/// A bounded run of laid-out lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub shaped: ShapedText,
    /// Byte offset of the block's first character in the full text.
    pub characters_offset: usize,
    pub line_count: usize,
    /// Minimum left indent across the block's lines; zero when any line
    /// starts left-to-right.
    pub x_offset: f32,
    /// Top of the block relative to the top of the full text.
    pub y_offset: f32,
    /// Authoritative measured width of the block.
    pub width: f32,
}

/// Pagination result: the ordered blocks plus aggregate metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    pub blocks: Vec<TextBlock>,
    /// Maximum authoritative block width.
    pub text_width: f32,
    /// Width of the final line of the final block.
    pub last_line_width: f32,
    pub text_height: f32,
    /// Minimum height of a non-final block; the renderer uses it to
    /// estimate block extents before laying anything out. For a
    /// single-block text this is the full text height.
    pub block_height: f32,
}

/// Split `text` into blocks of at most [`LINES_PER_BLOCK`] lines each.
///
/// The full text is shaped once for the total line count; each further
/// block re-shapes only its own substring, which bounds per-block work by
/// the block size regardless of message length. A block whose re-shaping
/// fails is logged and skipped; pagination never aborts wholesale once the
/// initial shape succeeded.
pub fn paginate(
    text: &str,
    shaper: &dyn TextShaper,
    style: &TextStyle,
    max_width: f32,
) -> Result<TextLayout, LayoutError> {
    let full = shaper.shape(text, style, max_width)?;
    let lines_count = full.line_count();
    if lines_count == 0 {
        return Ok(TextLayout::default());
    }

    let mut layout = TextLayout {
        text_height: full.height,
        block_height: f32::MAX,
        ..Default::default()
    };

    let blocks_count = lines_count.div_ceil(LINES_PER_BLOCK);
    let mut lines_offset = 0;

    for block_index in 0..blocks_count {
        let current_lines = LINES_PER_BLOCK.min(lines_count - lines_offset);
        let is_last = block_index + 1 == blocks_count;

        let (shaped, characters_offset, y_offset) = if blocks_count == 1 {
            layout.block_height = full.height;
            (full.clone(), 0, 0.0)
        } else {
            let start = full.lines[lines_offset].start;
            let end = full.lines[lines_offset + current_lines - 1].end;
            if end <= start {
                let err = LayoutError::InvalidRange {
                    start,
                    end,
                    line: lines_offset,
                };
                log::warn!("skipping layout block: {err}");
                lines_offset += current_lines;
                continue;
            }
            match shaper.shape(&text[start..end], style, max_width) {
                Ok(shaped) => {
                    if !is_last {
                        layout.block_height = layout.block_height.min(shaped.height);
                    }
                    (shaped, start, full.lines[lines_offset].top)
                }
                Err(e) => {
                    log::warn!("skipping layout block at line {lines_offset}: {e}");
                    lines_offset += current_lines;
                    continue;
                }
            }
        };

        let mut block = TextBlock {
            characters_offset,
            line_count: current_lines,
            x_offset: 0.0,
            y_offset,
            width: 0.0,
            shaped,
        };
        measure_block(&mut block, &mut layout, is_last, max_width);
        layout.blocks.push(block);
        lines_offset += current_lines;
    }

    if layout.block_height == f32::MAX {
        layout.block_height = layout.text_height;
    }
    Ok(layout)
}

/// Width bookkeeping for one block.
///
/// Two widths are tracked per line: the bare line width and the width
/// including the left indent. If any line in the block starts at indent
/// zero (a left-to-right line), the indent-inclusive width is
/// authoritative; otherwise the bare width is, and the block keeps the
/// minimum indent as its x offset so mixed-direction text aligns.
fn measure_block(block: &mut TextBlock, layout: &mut TextLayout, is_last: bool, max_width: f32) {
    let lines = &block.shaped.lines;
    let Some(last) = lines.last() else {
        return;
    };

    let last_width = last.width.ceil();
    let last_width_with_left = (last.width + last.left).ceil();
    let mut has_ltr = last.left == 0.0;
    block.x_offset = last.left;

    let mut lines_max_width = last_width;
    let mut lines_max_width_with_left = last_width_with_left;

    if lines.len() > 1 {
        let mut real_max_width = 0.0f32;
        let mut real_max_width_with_left = 0.0f32;
        for line in lines {
            block.x_offset = block.x_offset.min(line.left);
            if line.left == 0.0 {
                has_ltr = true;
            }
            real_max_width = real_max_width.max(line.width);
            real_max_width_with_left = real_max_width_with_left.max(line.width + line.left);
            lines_max_width = lines_max_width.max(line.width.ceil());
            lines_max_width_with_left =
                lines_max_width_with_left.max((line.width + line.left).ceil());
        }
        if has_ltr {
            real_max_width = real_max_width_with_left;
            lines_max_width = lines_max_width_with_left;
        }
        layout.text_width = layout.text_width.max(real_max_width.ceil());
    } else {
        if has_ltr {
            lines_max_width = lines_max_width_with_left;
        }
        layout.text_width = layout.text_width.max(lines_max_width.min(max_width));
    }

    block.width = lines_max_width;
    if is_last {
        layout.last_line_width = if has_ltr {
            last_width_with_left
        } else {
            last_width
        };
    }
    if has_ltr {
        block.x_offset = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailOnSubstringShaper, FixedWidthShaper};

    const CHAR_W: f32 = 10.0;
    const LINE_H: f32 = 20.0;

    fn shaper() -> FixedWidthShaper {
        FixedWidthShaper::new(CHAR_W, LINE_H)
    }

    fn style() -> TextStyle {
        TextStyle::default()
    }

    #[test]
    fn test_empty_text_has_no_blocks() {
        let layout = paginate("", &shaper(), &style(), 100.0).unwrap();
        assert!(layout.blocks.is_empty());
        assert_eq!(layout.text_height, 0.0);
    }

    #[test]
    fn test_single_block_metrics() {
        // 4 chars, fits one line
        let layout = paginate("abcd", &shaper(), &style(), 100.0).unwrap();
        assert_eq!(layout.blocks.len(), 1);
        assert_eq!(layout.blocks[0].line_count, 1);
        assert_eq!(layout.text_width, 40.0);
        assert_eq!(layout.last_line_width, 40.0);
        assert_eq!(layout.text_height, LINE_H);
        assert_eq!(layout.block_height, LINE_H);
    }

    #[test]
    fn test_blocks_partition_all_lines() {
        // 25 lines of 5 chars at width 50
        let text = "abcde".repeat(25);
        let layout = paginate(&text, &shaper(), &style(), 50.0).unwrap();
        assert_eq!(layout.blocks.len(), 3);
        let total: usize = layout.blocks.iter().map(|b| b.line_count).sum();
        assert_eq!(total, 25);
        assert_eq!(
            layout.blocks.iter().map(|b| b.line_count).collect::<Vec<_>>(),
            vec![10, 10, 5]
        );
    }

    #[test]
    fn test_block_offsets_strictly_increase_without_gaps() {
        let text = "abcde".repeat(25);
        let layout = paginate(&text, &shaper(), &style(), 50.0).unwrap();
        let mut expected_offset = 0;
        for block in &layout.blocks {
            assert_eq!(block.characters_offset, expected_offset);
            let bytes: usize = block.shaped.lines.iter().map(|l| l.end - l.start).sum();
            expected_offset += bytes;
        }
        assert_eq!(expected_offset, text.len());
    }

    #[test]
    fn test_last_line_width_from_final_block() {
        // 12 chars at width 50 -> lines of 5,5,2; last line 2 chars
        let layout = paginate("abcdefghijkl", &shaper(), &style(), 50.0).unwrap();
        assert_eq!(layout.last_line_width, 2.0 * CHAR_W);
        assert_eq!(layout.text_width, 50.0);
    }

    #[test]
    fn test_multi_block_heights_and_offsets() {
        let text = "abcde".repeat(25);
        let layout = paginate(&text, &shaper(), &style(), 50.0).unwrap();
        assert_eq!(layout.text_height, 25.0 * LINE_H);
        // both full blocks are 10 lines high
        assert_eq!(layout.block_height, 10.0 * LINE_H);
        assert_eq!(layout.blocks[1].y_offset, 10.0 * LINE_H);
        assert_eq!(layout.blocks[2].y_offset, 20.0 * LINE_H);
    }

    #[test]
    fn test_failing_block_is_skipped_not_fatal() {
        // 25 distinct lines of 5 chars so each block substring is unique
        let text: String = ('a'..='y').map(|c| c.to_string().repeat(5)).collect();
        // fail re-shaping of the middle block's substring
        let inner = shaper();
        let failing = FailOnSubstringShaper::new(inner, text[50..100].to_string());
        let layout = paginate(&text, &failing, &style(), 50.0).unwrap();
        assert_eq!(layout.blocks.len(), 2);
        let offsets: Vec<_> = layout.blocks.iter().map(|b| b.characters_offset).collect();
        assert_eq!(offsets, vec![0, 100]);
    }

    #[test]
    fn test_initial_shape_failure_is_an_error() {
        let inner = shaper();
        let failing = FailOnSubstringShaper::new(inner, "boom".to_string());
        assert!(paginate("boom", &failing, &style(), 50.0).is_err());
    }

    #[test]
    fn test_rtl_block_keeps_min_indent() {
        // Shaper that indents every line by 7px simulates RTL line starts.
        let rtl = FixedWidthShaper::new(CHAR_W, LINE_H).with_indent(7.0);
        let layout = paginate("abcdefghij", &rtl, &style(), 50.0).unwrap();
        assert_eq!(layout.blocks[0].x_offset, 7.0);
        // bare width is authoritative without any LTR line
        assert_eq!(layout.last_line_width, 5.0 * CHAR_W);
    }
}
