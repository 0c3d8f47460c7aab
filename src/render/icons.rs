//! Icon badges drawn next to list items.
//!
//! Each tag of the icon catalogue is a small vector shape inside a circular
//! badge. `Number` draws the 1-based item number instead.

use image::Rgba;

use super::canvas::{Canvas, Clip, Rect};
use super::font::{Align, FontBook, TextStyle};
use crate::template::icons::FALLBACK_ICON;

/// Draw the badge for `tag` centered on `(cx, cy)` with diameter `d`.
pub fn draw_icon_badge(
    canvas: &mut Canvas,
    fonts: &FontBook,
    tag: &str,
    index: usize,
    (cx, cy): (f32, f32),
    d: f32,
    bg: Rgba<u8>,
    fg: Rgba<u8>,
) {
    canvas.fill_circle(cx, cy, d / 2.0, bg);
    let u = d * 0.28;
    let stroke = (d / 14.0).max(1.0);
    match tag {
        "Number" => {
            let style = TextStyle::new(d * 0.5, fg).bold().align(Align::Center);
            let top = cy - style.line_height() / 2.0;
            fonts.draw_line(canvas, &(index + 1).to_string(), cx - d / 2.0, top, d, &style);
        }
        "Heart" => {
            canvas.fill_circle(cx - u * 0.5, cy - u * 0.25, u * 0.55, fg);
            canvas.fill_circle(cx + u * 0.5, cy - u * 0.25, u * 0.55, fg);
            canvas.fill_polygon(
                &[(cx - u * 1.02, cy - u * 0.05), (cx + u * 1.02, cy - u * 0.05), (cx, cy + u)],
                fg,
            );
        }
        "Star" => {
            let points: Vec<(f32, f32)> = (0..10)
                .map(|i| {
                    let r = if i % 2 == 0 { u } else { u * 0.45 };
                    let a = -std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
                    (cx + r * a.cos(), cy + r * a.sin())
                })
                .collect();
            canvas.fill_polygon(&points, fg);
        }
        "Users" => {
            canvas.fill_circle(cx - u * 0.4, cy - u * 0.35, u * 0.35, fg);
            canvas.fill_circle(cx + u * 0.45, cy - u * 0.4, u * 0.3, fg);
            canvas.fill_clipped(Rect::new(cx - u, cy + u * 0.1, u * 1.2, u * 0.8), Clip::Rounded(u * 0.4), fg);
            canvas.fill_clipped(Rect::new(cx + u * 0.05, cy + u * 0.05, u, u * 0.7), Clip::Rounded(u * 0.35), fg);
        }
        "Target" => {
            canvas.fill_circle(cx, cy, u, fg);
            canvas.fill_circle(cx, cy, u * 0.7, bg);
            canvas.fill_circle(cx, cy, u * 0.4, fg);
        }
        "TrendingUp" => {
            let pts = [(cx - u, cy + u * 0.6), (cx - u * 0.2, cy - u * 0.1), (cx + u * 0.2, cy + u * 0.3), (cx + u, cy - u * 0.5)];
            for w in pts.windows(2) {
                canvas.draw_line(w[0], w[1], stroke * 1.5, fg);
            }
            canvas.fill_polygon(&[(cx + u * 1.1, cy - u * 0.6), (cx + u * 0.45, cy - u * 0.6), (cx + u * 1.1, cy + u * 0.05)], fg);
        }
        "Globe" => {
            canvas.fill_circle(cx, cy, u, fg);
            canvas.fill_circle(cx, cy, u - stroke, bg);
            canvas.draw_line((cx - u, cy), (cx + u, cy), stroke, fg);
            canvas.draw_line((cx, cy - u), (cx, cy + u), stroke, fg);
            canvas.fill_clipped(Rect::new(cx - u * 0.5, cy - u, u, u * 2.0), Clip::Rounded(u * 0.5), fg);
            canvas.fill_clipped(Rect::new(cx - u * 0.5 + stroke, cy - u + stroke, u - 2.0 * stroke, u * 2.0 - 2.0 * stroke), Clip::Rounded(u * 0.5), bg);
            canvas.draw_line((cx - u, cy), (cx + u, cy), stroke, fg);
        }
        "Sprout" => {
            canvas.draw_line((cx, cy + u), (cx, cy - u * 0.1), stroke * 1.5, fg);
            canvas.fill_polygon(&[(cx, cy - u * 0.1), (cx - u, cy - u * 0.5), (cx - u * 0.3, cy - u * 0.9)], fg);
            canvas.fill_polygon(&[(cx, cy + u * 0.1), (cx + u, cy - u * 0.3), (cx + u * 0.4, cy - u * 0.8)], fg);
        }
        "Lightbulb" => {
            canvas.fill_circle(cx, cy - u * 0.25, u * 0.7, fg);
            canvas.fill_rect(Rect::new(cx - u * 0.3, cy + u * 0.35, u * 0.6, u * 0.55), fg);
        }
        "Award" => {
            canvas.fill_polygon(&[(cx - u * 0.5, cy), (cx - u * 0.7, cy + u), (cx - u * 0.1, cy + u * 0.75)], fg);
            canvas.fill_polygon(&[(cx + u * 0.5, cy), (cx + u * 0.7, cy + u), (cx + u * 0.1, cy + u * 0.75)], fg);
            canvas.fill_circle(cx, cy - u * 0.25, u * 0.65, fg);
            canvas.fill_circle(cx, cy - u * 0.25, u * 0.35, bg);
        }
        "Zap" => draw_zap(canvas, cx, cy, u, fg),
        _ => {
            tracing::debug!(tag, fallback = FALLBACK_ICON, "unknown icon tag");
            draw_zap(canvas, cx, cy, u, fg);
        }
    }
}

fn draw_zap(canvas: &mut Canvas, cx: f32, cy: f32, u: f32, fg: Rgba<u8>) {
    canvas.fill_polygon(
        &[
            (cx + u * 0.2, cy - u),
            (cx - u * 0.7, cy + u * 0.15),
            (cx - u * 0.05, cy + u * 0.15),
            (cx - u * 0.2, cy + u),
            (cx + u * 0.7, cy - u * 0.15),
            (cx + u * 0.05, cy - u * 0.15),
        ],
        fg,
    );
}
