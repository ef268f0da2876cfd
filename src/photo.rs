//! Thumbnail size selection.

use crate::types::attachment::{PhotoSize, PhotoSizeKind};

/// Pick the size variant closest to the target display dimensions.
///
/// Distance is tracked per axis independently: a candidate replaces the
/// current best when either axis difference is strictly smaller, or when the
/// current best is an inline cached preview. The cached-preview rule is
/// deliberate and biases the selection toward a real variant even when the
/// preview's dimensions are numerically closer; do not reduce this to a pure
/// nearest-neighbor scan.
pub fn closest_size(sizes: &[PhotoSize], width: i32, height: i32) -> Option<&PhotoSize> {
    let mut best: Option<&PhotoSize> = None;
    let mut best_w = i32::MAX;
    let mut best_h = i32::MAX;
    for size in sizes {
        let diff_w = (size.width - width).abs();
        let diff_h = (size.height - height).abs();
        let replace = match best {
            None => true,
            Some(current) => {
                best_w > diff_w || best_h > diff_h || current.kind == PhotoSizeKind::Cached
            }
        };
        if replace {
            best = Some(size);
            best_w = diff_w;
            best_h = diff_h;
        }
    }
    best
}
