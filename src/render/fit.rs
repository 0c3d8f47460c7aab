//! Shrink-to-fit typography.

use super::font::FontBook;

/// Font size search for a heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBounds {
    pub start: f32,
    pub min: f32,
    pub step: f32,
    /// Maximum number of wrapped lines.
    pub max_lines: usize,
}

impl FitBounds {
    pub const fn new(start: f32, min: f32, step: f32, max_lines: usize) -> Self {
        Self {
            start,
            min,
            step,
            max_lines,
        }
    }
}

/// Largest size from `bounds.start` downward, in `bounds.step` decrements, at
/// which `text` wraps into at most `bounds.max_lines` lines of `max_width`.
/// The last step is clamped to `bounds.min`, which is returned if even that
/// overflows.
pub fn fit_font_size(fonts: &FontBook, text: &str, bold: bool, max_width: f32, bounds: FitBounds) -> f32 {
    let step = if bounds.step > 0.0 { bounds.step } else { 1.0 };
    let mut size = bounds.start.max(bounds.min);
    loop {
        let lines = fonts.wrap(text, size, bold, max_width).len();
        if lines <= bounds.max_lines.max(1) || size <= bounds.min {
            return size;
        }
        size = (size - step).max(bounds.min);
    }
}
