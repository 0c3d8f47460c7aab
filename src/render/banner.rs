//! Copyright banner shared by every template.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ left1 (highlight)     CENTER NAME      right1        │
//! │ left2 (highlight2)                     right2 right3 │
//! └──────────────────────────────────────────────────────┘
//! ```

use image::Rgba;

use super::canvas::{Canvas, Rect};
use super::color::{ACCENT, WHITE, with_alpha};
use super::font::{Align, FontBook, TextStyle};
use crate::template::CopyrightArea;

pub const BANNER_HEIGHT: f32 = 110.0;

/// Split `line` around every occurrence of `word` into (text, highlighted)
/// segments. An empty word highlights nothing.
pub fn highlight_segments<'a>(line: &'a str, word: &str) -> Vec<(&'a str, bool)> {
    if word.is_empty() {
        return vec![(line, false)];
    }
    let mut out = Vec::new();
    let mut rest = line;
    while let Some(pos) = rest.find(word) {
        if pos > 0 {
            out.push((&rest[..pos], false));
        }
        out.push((&rest[pos..pos + word.len()], true));
        rest = &rest[pos + word.len()..];
    }
    if !rest.is_empty() {
        out.push((rest, false));
    }
    out
}

fn draw_highlighted(canvas: &mut Canvas, fonts: &FontBook, line: &str, word: &str, x: f32, y: f32, style: &TextStyle) {
    let mut caret = x;
    for (text, highlighted) in highlight_segments(line, word) {
        let seg = if highlighted {
            TextStyle { color: ACCENT, bold: true, ..*style }
        } else {
            *style
        };
        caret = fonts.draw_run(canvas, text, caret, y, &seg);
    }
}

/// Draw the banner across the bottom of the canvas. Nothing is drawn when
/// every text field is blank.
pub fn draw_copyright_banner(canvas: &mut Canvas, fonts: &FontBook, area: &CopyrightArea, bg: Rgba<u8>) {
    if area.is_blank() {
        return;
    }
    let bounds = canvas.bounds();
    let r = Rect::new(0.0, bounds.h - BANNER_HEIGHT, bounds.w, BANNER_HEIGHT);
    canvas.fill_rect(r, with_alpha(bg, 235));
    canvas.fill_rect(Rect::new(r.x, r.y, r.w, 2.0), with_alpha(WHITE, 60));

    let pad = 32.0;
    let col_w = (r.w - pad * 2.0) / 3.0;
    let small = TextStyle::new(22.0, WHITE);
    let row1 = r.y + 16.0;
    let row2 = row1 + small.line_height() + 6.0;

    draw_highlighted(canvas, fonts, &area.left1, &area.highlight_word, r.x + pad, row1, &small);
    draw_highlighted(canvas, fonts, &area.left2, area.second_highlight(), r.x + pad, row2, &small);

    let name = TextStyle::new(44.0, WHITE).bold().align(Align::Center);
    let name_top = r.y + (r.h - name.line_height()) / 2.0;
    fonts.draw_line(canvas, &area.center_name, r.x + pad + col_w, name_top, col_w, &name);

    let right = small.align(Align::Right);
    let right_x = r.x + pad + col_w * 2.0;
    fonts.draw_line(canvas, &area.right1, right_x, row1, col_w, &right);
    let bottom = [area.right2.as_str(), area.right3.as_str()]
        .iter()
        .filter(|s| !s.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    fonts.draw_line(canvas, &bottom, right_x, row2, col_w, &right.bold());
}
