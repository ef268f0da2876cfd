//! Shared test doubles: a deterministic monospace shaper and in-memory
//! feed/cache implementations. Compiled into the crate so integration
//! tests can use them too.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::cell::{CacheStore, DownloadFeed, ObserverTag};
use crate::error::LayoutError;
use crate::layout::{ShapedLine, ShapedText, TextShaper, TextStyle};
use crate::types::attachment::Attachment;

/// Monospace shaper: every character is `char_width` wide, every line
/// `line_height` tall, lines wrap at the widest fitting character count
/// and break hard at newlines.
pub struct FixedWidthShaper {
    char_width: f32,
    line_height: f32,
    indent: f32,
}

impl FixedWidthShaper {
    pub fn new(char_width: f32, line_height: f32) -> Self {
        Self {
            char_width,
            line_height,
            indent: 0.0,
        }
    }

    /// Indent every line start, simulating right-to-left line placement.
    pub fn with_indent(mut self, indent: f32) -> Self {
        self.indent = indent;
        self
    }
}

impl TextShaper for FixedWidthShaper {
    fn shape(
        &self,
        text: &str,
        _style: &TextStyle,
        max_width: f32,
    ) -> Result<ShapedText, LayoutError> {
        if text.is_empty() {
            return Ok(ShapedText::default());
        }
        let per_line = ((max_width / self.char_width).floor() as usize).max(1);
        let mut lines = Vec::new();

        let mut segment_base = 0;
        for segment in text.split('\n') {
            let chars: Vec<usize> = segment.char_indices().map(|(i, _)| i).collect();
            if chars.is_empty() {
                lines.push((segment_base, segment_base, 0));
            }
            let mut taken = 0;
            while taken < chars.len() {
                let count = per_line.min(chars.len() - taken);
                let start = segment_base + chars[taken];
                let end = if taken + count < chars.len() {
                    segment_base + chars[taken + count]
                } else {
                    segment_base + segment.len()
                };
                lines.push((start, end, count));
                taken += count;
            }
            segment_base += segment.len() + 1;
        }

        let shaped_lines: Vec<ShapedLine> = lines
            .into_iter()
            .enumerate()
            .map(|(index, (start, end, count))| ShapedLine {
                start,
                end,
                width: count as f32 * self.char_width,
                left: self.indent,
                top: index as f32 * self.line_height,
            })
            .collect();
        let height = shaped_lines.len() as f32 * self.line_height;
        Ok(ShapedText {
            lines: shaped_lines,
            height,
        })
    }
}

/// Delegating shaper that fails on one exact input, for exercising the
/// skip-on-error paths.
pub struct FailOnSubstringShaper<S> {
    inner: S,
    failing_text: String,
}

impl<S: TextShaper> FailOnSubstringShaper<S> {
    pub fn new(inner: S, failing_text: String) -> Self {
        Self {
            inner,
            failing_text,
        }
    }
}

impl<S: TextShaper> TextShaper for FailOnSubstringShaper<S> {
    fn shape(
        &self,
        text: &str,
        style: &TextStyle,
        max_width: f32,
    ) -> Result<ShapedText, LayoutError> {
        if text == self.failing_text {
            return Err(LayoutError::Shaping("injected shaping failure".into()));
        }
        self.inner.shape(text, style, max_width)
    }
}

/// Recording in-memory transfer feed.
#[derive(Default)]
pub struct MockFeed {
    requests: Mutex<Vec<String>>,
    cancels: Mutex<Vec<String>>,
    active: Mutex<HashSet<String>>,
    progress: Mutex<HashMap<String, f32>>,
    watchers: Mutex<HashMap<ObserverTag, String>>,
}

impl MockFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn cancels(&self) -> Vec<String> {
        self.cancels.lock().unwrap().clone()
    }

    pub fn watch_count(&self) -> usize {
        self.watchers.lock().unwrap().len()
    }

    pub fn set_progress(&self, name: &str, progress: f32) {
        self.progress.lock().unwrap().insert(name.into(), progress);
    }
}

impl DownloadFeed for MockFeed {
    fn request(&self, name: &str, _attachment: &Attachment) {
        self.requests.lock().unwrap().push(name.into());
        self.active.lock().unwrap().insert(name.into());
    }

    fn cancel(&self, name: &str) {
        self.cancels.lock().unwrap().push(name.into());
        self.active.lock().unwrap().remove(name);
    }

    fn is_active(&self, name: &str) -> bool {
        self.active.lock().unwrap().contains(name)
    }

    fn progress_of(&self, name: &str) -> Option<f32> {
        self.progress.lock().unwrap().get(name).copied()
    }

    fn watch(&self, name: &str, tag: ObserverTag) {
        self.watchers.lock().unwrap().insert(tag, name.into());
    }

    fn unwatch(&self, tag: ObserverTag) {
        self.watchers.lock().unwrap().remove(&tag);
    }
}

/// In-memory cache keyed by name, storing only sizes.
#[derive(Default)]
pub struct MemoryCache {
    sizes: Mutex<HashMap<String, u64>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, name: &str, size: u64) {
        self.sizes.lock().unwrap().insert(name.into(), size);
    }
}

impl CacheStore for MemoryCache {
    fn exists(&self, name: &str) -> bool {
        self.sizes.lock().unwrap().contains_key(name)
    }

    fn size_of(&self, name: &str) -> u64 {
        self.sizes.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    fn remove(&self, name: &str) {
        self.sizes.lock().unwrap().remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_shaper_wraps_and_offsets() {
        let shaped = FixedWidthShaper::new(10.0, 20.0)
            .shape("abcdefg", &TextStyle::default(), 50.0)
            .unwrap();
        assert_eq!(shaped.lines.len(), 2);
        assert_eq!((shaped.lines[0].start, shaped.lines[0].end), (0, 5));
        assert_eq!((shaped.lines[1].start, shaped.lines[1].end), (5, 7));
        assert_eq!(shaped.lines[1].width, 20.0);
        assert_eq!(shaped.height, 40.0);
    }

    #[test]
    fn test_fixed_width_shaper_honors_newlines() {
        let shaped = FixedWidthShaper::new(10.0, 20.0)
            .shape("ab\ncd", &TextStyle::default(), 100.0)
            .unwrap();
        assert_eq!(shaped.lines.len(), 2);
        assert_eq!((shaped.lines[1].start, shaped.lines[1].end), (3, 5));
    }
}
