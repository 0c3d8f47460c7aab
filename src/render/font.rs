//! # Text Rendering
//!
//! [`FontBook`] draws text either with TrueType fonts loaded from disk
//! (regular and bold, via `ab_glyph`) or, when none are configured, with the
//! Spleen 12×24 bitmap font scaled to the requested size. Characters the
//! active font cannot draw become a hollow box.
//!
//! Sizes are logical pixel heights; the canvas scale is applied at draw time
//! so outlines are rasterized at device resolution.

use ab_glyph::{Font, FontArc, ScaleFont, point};
use image::Rgba;
use spleen_font::{FONT_12X24, PSF2Font};
use std::path::Path;

use super::canvas::Canvas;
use crate::error::{CardNewsError, Result};

const BITMAP_W: usize = 12;
const BITMAP_H: usize = 24;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.25;

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Text style for one draw call.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub color: Rgba<u8>,
    pub align: Align,
}

impl TextStyle {
    pub fn new(size: f32, color: Rgba<u8>) -> Self {
        Self {
            size,
            bold: false,
            color,
            align: Align::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn sized(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn line_height(&self) -> f32 {
        self.size * LINE_HEIGHT
    }
}

#[derive(Clone, Default)]
pub struct FontBook {
    regular: Option<FontArc>,
    bold: Option<FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("regular", &self.regular.is_some())
            .field("bold", &self.bold.is_some())
            .finish()
    }
}

fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path)
        .map_err(|e| CardNewsError::Config(format!("cannot read font {}: {}", path.display(), e)))?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| CardNewsError::Config(format!("invalid font {}: {}", path.display(), e)))
}

impl FontBook {
    /// Bitmap-only font book.
    pub fn bitmap() -> Self {
        Self::default()
    }

    /// Load TTF/OTF fonts. A missing bold face falls back to the regular one.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Result<Self> {
        let regular = regular.map(load_font).transpose()?;
        let bold = bold.map(load_font).transpose()?;
        if regular.is_some() {
            tracing::debug!(bold = bold.is_some(), "loaded TrueType fonts");
        }
        Ok(Self { regular, bold })
    }

    pub fn has_outline_font(&self) -> bool {
        self.regular.is_some() || self.bold.is_some()
    }

    fn face(&self, bold: bool) -> Option<&FontArc> {
        if bold {
            self.bold.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref().or(self.bold.as_ref())
        }
    }

    /// Advance width of one character in logical pixels.
    fn advance(&self, ch: char, size: f32, bold: bool) -> f32 {
        match self.face(bold) {
            Some(font) => font.as_scaled(size).h_advance(font.glyph_id(ch)),
            None => {
                let cell = size * BITMAP_W as f32 / BITMAP_H as f32;
                if is_wide(ch) { cell * 2.0 } else { cell }
            }
        }
    }

    /// Width of a single line of text.
    pub fn measure(&self, text: &str, size: f32, bold: bool) -> f32 {
        text.chars().map(|ch| self.advance(ch, size, bold)).sum()
    }

    /// Break `text` into lines no wider than `max_width`.
    ///
    /// Explicit newlines always break. Lines break between words where
    /// possible and inside a word only when the word alone is too wide.
    pub fn wrap(&self, text: &str, size: f32, bold: bool, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut line = String::new();
            for word in paragraph.split(' ') {
                let candidate = if line.is_empty() {
                    word.to_string()
                } else {
                    format!("{} {}", line, word)
                };
                if self.measure(&candidate, size, bold) <= max_width {
                    line = candidate;
                    continue;
                }
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                for ch in word.chars() {
                    line.push(ch);
                    if self.measure(&line, size, bold) > max_width && line.chars().count() > 1 {
                        line.pop();
                        lines.push(std::mem::take(&mut line));
                        line.push(ch);
                    }
                }
            }
            lines.push(line);
        }
        lines
    }

    /// Draw one line with its top edge at `y`. For centered or right-aligned
    /// text, `x` and `width` describe the box to align within.
    pub fn draw_line(&self, canvas: &mut Canvas, text: &str, x: f32, y: f32, width: f32, style: &TextStyle) -> f32 {
        let w = self.measure(text, style.size, style.bold);
        let start = match style.align {
            Align::Left => x,
            Align::Center => x + (width - w) / 2.0,
            Align::Right => x + width - w,
        };
        self.draw_run(canvas, text, start, y, style);
        w
    }

    /// Draw wrapped text in a box; returns the height used.
    pub fn draw_wrapped(&self, canvas: &mut Canvas, text: &str, x: f32, y: f32, width: f32, style: &TextStyle) -> f32 {
        let lines = self.wrap(text, style.size, style.bold, width);
        let lh = style.line_height();
        for (i, line) in lines.iter().enumerate() {
            self.draw_line(canvas, line, x, y + i as f32 * lh, width, style);
        }
        lines.len() as f32 * lh
    }

    /// Draw a run of text starting at `x` with its line box top at `y`;
    /// returns the x after the last glyph.
    pub fn draw_run(&self, canvas: &mut Canvas, text: &str, x: f32, y: f32, style: &TextStyle) -> f32 {
        match self.face(style.bold) {
            Some(font) => self.draw_outline(canvas, font, text, x, y, style),
            None => self.draw_bitmap(canvas, text, x, y, style),
        }
    }

    fn draw_outline(&self, canvas: &mut Canvas, font: &FontArc, text: &str, x: f32, y: f32, style: &TextStyle) -> f32 {
        let scale = canvas.scale();
        let px_size = style.size * scale;
        let scaled = font.as_scaled(px_size);
        // Center the glyph box vertically inside the line box.
        let glyph_box = scaled.ascent() - scaled.descent();
        let baseline = y * scale + (style.line_height() * scale - glyph_box) / 2.0 + scaled.ascent();

        let mut caret = x * scale;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if id.0 == 0 && !ch.is_whitespace() {
                let adv = style.size * 0.6;
                draw_missing_box(canvas, caret / scale, y, adv, style);
                caret += adv * scale;
                continue;
            }
            let glyph = id.with_scale_and_position(px_size, point(caret, baseline));
            caret += scaled.h_advance(id);
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    canvas.blend_device(
                        bounds.min.x as i64 + gx as i64,
                        bounds.min.y as i64 + gy as i64,
                        style.color,
                        coverage,
                    );
                });
            }
        }
        caret / scale
    }

    fn draw_bitmap(&self, canvas: &mut Canvas, text: &str, x: f32, y: f32, style: &TextStyle) -> f32 {
        let scale = canvas.scale();
        let cell_h = style.size;
        let cell_w = style.size * BITMAP_W as f32 / BITMAP_H as f32;
        let top = y + (style.line_height() - cell_h) / 2.0;
        let mut caret = x;

        for ch in text.chars() {
            let advance = self.advance(ch, style.size, style.bold);
            if ch.is_whitespace() {
                caret += advance;
                continue;
            }
            match bitmap_glyph(ch) {
                Some(bits) => {
                    // Nearest-neighbour scale of the 12×24 cell to device pixels.
                    let dx0 = (caret * scale).round() as i64;
                    let dy0 = (top * scale).round() as i64;
                    let dw = (cell_w * scale).round().max(1.0) as i64;
                    let dh = (cell_h * scale).round().max(1.0) as i64;
                    let embolden = if style.bold { (scale.round() as i64).max(1) } else { 0 };
                    for dy in 0..dh {
                        let sy = (dy as usize * BITMAP_H) / dh as usize;
                        for dx in 0..dw {
                            let sx = (dx as usize * BITMAP_W) / dw as usize;
                            if bits[sy * BITMAP_W + sx] {
                                for e in 0..=embolden {
                                    canvas.blend_device(dx0 + dx + e, dy0 + dy, style.color, 1.0);
                                }
                            }
                        }
                    }
                }
                None => draw_missing_box(canvas, caret, y, advance, style),
            }
            caret += advance;
        }
        caret
    }
}

/// Hollow box standing in for a glyph the font lacks.
fn draw_missing_box(canvas: &mut Canvas, x: f32, y: f32, advance: f32, style: &TextStyle) {
    let h = style.size * 0.8;
    let w = (advance * 0.8).max(1.0);
    let top = y + (style.line_height() - h) / 2.0;
    let stroke = (style.size / 14.0).max(1.0);
    canvas.stroke_rect(
        super::canvas::Rect::new(x + (advance - w) / 2.0, top, w, h),
        stroke,
        style.color,
    );
}

/// East Asian wide characters take two bitmap cells.
fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F | 0x2E80..=0x303E | 0x3041..=0x33FF | 0x3400..=0x4DBF |
        0x4E00..=0x9FFF | 0xA960..=0xA97F | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF |
        0xFF00..=0xFF60 | 0xFFE0..=0xFFE6)
}

/// Spleen 12×24 bitmap for `ch`, row-major.
fn bitmap_glyph(ch: char) -> Option<Vec<bool>> {
    let mut font = PSF2Font::new(FONT_12X24).ok()?;
    let mut buf = [0u8; 4];
    let glyph = font.glyph_for_utf8(ch.encode_utf8(&mut buf).as_bytes())?;
    let mut bits = vec![false; BITMAP_W * BITMAP_H];
    for (row_y, row) in glyph.enumerate() {
        for (col_x, on) in row.enumerate() {
            if row_y < BITMAP_H && col_x < BITMAP_W {
                bits[row_y * BITMAP_W + col_x] = on;
            }
        }
    }
    Some(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::color::BLACK;

    #[test]
    fn test_bitmap_measure() {
        let fonts = FontBook::bitmap();
        assert_eq!(fonts.measure("ab", 24.0, false), 24.0);
        assert_eq!(fonts.measure("가", 24.0, false), 24.0);
        assert_eq!(fonts.measure("", 24.0, true), 0.0);
    }

    #[test]
    fn test_wrap_breaks_between_words() {
        let fonts = FontBook::bitmap();
        // 12px per ASCII char at size 24.
        let lines = fonts.wrap("aaa bbb ccc", 24.0, false, 90.0);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_splits_long_words_and_newlines() {
        let fonts = FontBook::bitmap();
        let lines = fonts.wrap("abcdefgh\nxy", 24.0, false, 48.0);
        assert_eq!(lines, vec!["abcd", "efgh", "xy"]);
    }

    #[test]
    fn test_wrap_empty_text_is_one_line() {
        let fonts = FontBook::bitmap();
        assert_eq!(fonts.wrap("", 24.0, false, 100.0), vec![String::new()]);
    }

    #[test]
    fn test_bitmap_draw_marks_pixels() {
        let fonts = FontBook::bitmap();
        let mut canvas = Canvas::new(60, 40, 1.0);
        let end = fonts.draw_run(&mut canvas, "Hi", 0.0, 0.0, &TextStyle::new(24.0, BLACK));
        assert_eq!(end, 24.0);
        let img = canvas.into_image();
        assert!(img.pixels().any(|p| p[0] < 128));
    }

    #[test]
    fn test_missing_glyph_draws_box() {
        let fonts = FontBook::bitmap();
        let mut canvas = Canvas::new(40, 40, 1.0);
        fonts.draw_run(&mut canvas, "한", 0.0, 0.0, &TextStyle::new(24.0, BLACK));
        let img = canvas.into_image();
        assert!(img.pixels().any(|p| p[0] == 0));
    }

    #[test]
    fn test_load_missing_font_is_config_error() {
        let err = FontBook::load(Some(Path::new("/nonexistent/font.ttf")), None).unwrap_err();
        assert!(matches!(err, CardNewsError::Config(_)));
    }
}
