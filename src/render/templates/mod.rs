//! # Template Renderers
//!
//! One module per layout. Every renderer is a pure function of its typed
//! record: it paints the background, header, body and copyright banner onto
//! a canvas of the template's logical size.
//!
//! Shared pieces live here.

pub mod horizontal_card;
pub mod quad_layout;
pub mod square_layout;
pub mod vertical_card;
pub mod vertical_list_card;

use image::Rgba;

use super::RenderContext;
use super::canvas::{Canvas, Clip, Fit, Rect};
use super::color::{GRADIENT_END, color_or, with_alpha};
use super::fit::{FitBounds, fit_font_size};
use super::font::{Align, TextStyle};
use crate::template::defaults::DEFAULT_BG_COLOR;

/// Outer margin of every layout.
pub const MARGIN: f32 = 32.0;
/// Logo box in the top-left corner.
pub const LOGO_BOX: Rect = Rect::new(MARGIN, 28.0, 150.0, 48.0);

/// Background image (darkened for contrast), or the diagonal gradient from
/// `bg_color` when there is none. Returns the base color for panels.
pub(crate) fn draw_background(canvas: &mut Canvas, ctx: &RenderContext<'_>, bg_color: &str, image: Option<&str>) -> Rgba<u8> {
    let base = color_or(Some(bg_color), color_or(Some(DEFAULT_BG_COLOR), GRADIENT_END));
    let bounds = canvas.bounds();
    canvas.fill_gradient(bounds, base, GRADIENT_END);
    if let Some(reference) = image
        && ctx.images.draw(canvas, reference, None, bounds, Fit::Cover, Clip::Rect)
    {
        canvas.fill_rect(bounds, with_alpha(Rgba([0, 0, 0, 255]), 70));
    }
    base
}

pub(crate) fn draw_logo(canvas: &mut Canvas, ctx: &RenderContext<'_>, logo_url: &str) {
    ctx.images.draw(canvas, logo_url, None, LOGO_BOX, Fit::Contain, Clip::Rect);
}

/// Text images stacked inside `r`. Returns false (drawing nothing) when
/// there are none, so the caller renders text headlines instead.
pub(crate) fn draw_text_images(canvas: &mut Canvas, ctx: &RenderContext<'_>, urls: &[String], r: Rect) -> bool {
    let urls: Vec<&str> = urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()).collect();
    if urls.is_empty() {
        return false;
    }
    let gap = 8.0;
    let h = (r.h - gap * (urls.len() - 1) as f32) / urls.len() as f32;
    for (i, url) in urls.iter().enumerate() {
        let slot = Rect::new(r.x, r.y + i as f32 * (h + gap), r.w, h);
        ctx.images.draw(canvas, url, None, slot, Fit::Contain, Clip::Rect);
    }
    true
}

/// Draw `text` at the largest size `fit` allows within `width`; returns the
/// height used. An empty text takes no space.
pub(crate) fn draw_fitted(
    canvas: &mut Canvas,
    ctx: &RenderContext<'_>,
    text: &str,
    (x, y, width): (f32, f32, f32),
    fit: FitBounds,
    style: TextStyle,
) -> f32 {
    if text.trim().is_empty() {
        return 0.0;
    }
    let size = fit_font_size(ctx.fonts, text, style.bold, width, fit);
    ctx.fonts.draw_wrapped(canvas, text, x, y, width, &style.sized(size))
}

/// Rounded translucent panel.
pub(crate) fn panel(canvas: &mut Canvas, r: Rect, color: Rgba<u8>, alpha: u8) {
    canvas.fill_clipped(r, Clip::Rounded(20.0), with_alpha(color, alpha));
}

pub(crate) fn centered(size: f32, color: Rgba<u8>) -> TextStyle {
    TextStyle::new(size, color).align(Align::Center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::font::FontBook;
    use crate::render::images::ImageSet;

    #[test]
    fn test_background_uses_bg_color() {
        let fonts = FontBook::bitmap();
        let images = ImageSet::new();
        let ctx = RenderContext::new(&fonts, &images);
        let mut canvas = Canvas::new(100, 100, 1.0);
        let base = draw_background(&mut canvas, &ctx, "#FF0000", None);
        assert_eq!(base, Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.image().get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_invalid_bg_color_falls_back_to_default() {
        let fonts = FontBook::bitmap();
        let images = ImageSet::new();
        let ctx = RenderContext::new(&fonts, &images);
        let mut canvas = Canvas::new(10, 10, 1.0);
        let base = draw_background(&mut canvas, &ctx, "blue", Some(""));
        assert_eq!(base, Rgba([0x2A, 0x48, 0xA0, 255]));
    }

    #[test]
    fn test_empty_text_images_fall_through() {
        let fonts = FontBook::bitmap();
        let images = ImageSet::new();
        let ctx = RenderContext::new(&fonts, &images);
        let mut canvas = Canvas::new(10, 10, 1.0);
        let r = canvas.bounds();
        assert!(!draw_text_images(&mut canvas, &ctx, &[" ".into()], r));
        assert!(draw_text_images(&mut canvas, &ctx, &["gone.png".into()], r));
    }
}
