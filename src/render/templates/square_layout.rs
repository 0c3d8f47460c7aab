//! Square layout: headline pair and a body paragraph on top, two captioned
//! 4:3 photos side by side just above the copyright banner.

use image::Rgba;

use super::{MARGIN, draw_background, draw_fitted, draw_logo};
use crate::render::RenderContext;
use crate::render::banner::{BANNER_HEIGHT, draw_copyright_banner};
use crate::render::canvas::{Canvas, Clip, Fit, Rect};
use crate::render::color::{WHITE, color_or, with_alpha};
use crate::render::fit::FitBounds;
use crate::render::font::{LINE_HEIGHT, TextStyle};
use crate::template::SquareLayoutData;
use crate::template::defaults::DEFAULT_PROFILE_IMAGE;

const HEADLINE1_FIT: FitBounds = FitBounds::new(48.0, 28.0, 2.0, 1);
const HEADLINE2_FIT: FitBounds = FitBounds::new(56.0, 30.0, 2.0, 1);
const HEADLINE_TOP: f32 = 96.0;
const PHOTO_GAP: f32 = 16.0;
const BODY_START: f32 = 25.0;
const BODY_MIN: f32 = 14.0;
const CAPTION_SIZE: f32 = 14.0;

pub fn render(canvas: &mut Canvas, d: &SquareLayoutData, ctx: &RenderContext<'_>) {
    let base = draw_background(canvas, ctx, &d.bg_color, None);
    draw_logo(canvas, ctx, &d.logo_url);

    let b = canvas.bounds();
    let inner = b.w - MARGIN * 2.0;

    // photo row sits on the banner
    let photo_w = (inner - PHOTO_GAP) / 2.0;
    let photo_h = photo_w * 3.0 / 4.0;
    let photo_top = b.h - BANNER_HEIGHT - PHOTO_GAP - photo_h;

    let mut y = HEADLINE_TOP;
    let c1 = color_or(d.headline1_color.as_deref(), WHITE);
    let c2 = color_or(d.headline2_color.as_deref(), WHITE);
    y += draw_fitted(canvas, ctx, &d.headline1, (MARGIN, y, inner), HEADLINE1_FIT, TextStyle::new(48.0, c1).bold());
    y += draw_fitted(canvas, ctx, &d.headline2, (MARGIN, y, inner), HEADLINE2_FIT, TextStyle::new(56.0, c2).bold());

    let body = Rect::new(MARGIN, y + 8.0, inner, photo_top - PHOTO_GAP - (y + 8.0));
    if !d.body_text.trim().is_empty() && body.h > 0.0 {
        let mut size = BODY_START;
        while size > BODY_MIN {
            let lines = ctx.fonts.wrap(&d.body_text, size, true, body.w).len() as f32;
            if lines * size * LINE_HEIGHT <= body.h {
                break;
            }
            size -= 1.0;
        }
        let style = TextStyle::new(size, WHITE).bold();
        ctx.fonts.draw_wrapped(canvas, &d.body_text, body.x, body.y, body.w, &style);
    }

    let photos = [
        (&d.image1, d.image1_caption.as_deref(), Rect::new(MARGIN, photo_top, photo_w, photo_h)),
        (&d.image2, d.image2_caption.as_deref(), Rect::new(MARGIN + photo_w + PHOTO_GAP, photo_top, photo_w, photo_h)),
    ];
    for (image, caption, r) in photos {
        ctx.images.draw(canvas, image, Some(DEFAULT_PROFILE_IMAGE), r, Fit::Cover, Clip::Rounded(8.0));
        canvas.stroke_rect(r, 2.0, with_alpha(WHITE, 77));
        if let Some(caption) = caption.filter(|c| !c.trim().is_empty()) {
            draw_caption(canvas, ctx, caption, r);
        }
    }

    draw_copyright_banner(canvas, ctx.fonts, &d.copyright_area, base);
}

/// Dark label in the photo's bottom-right corner, at most 85% of its width.
fn draw_caption(canvas: &mut Canvas, ctx: &RenderContext<'_>, caption: &str, photo: Rect) {
    let pad = 8.0;
    let max_w = photo.w * 0.85 - pad * 2.0;
    let lines = ctx.fonts.wrap(caption, CAPTION_SIZE, false, max_w);
    let text_w = lines
        .iter()
        .map(|l| ctx.fonts.measure(l, CAPTION_SIZE, false))
        .fold(0.0_f32, f32::max);
    let style = TextStyle::new(CAPTION_SIZE, WHITE);
    let w = text_w + pad * 2.0;
    let h = lines.len() as f32 * style.line_height() + pad * 1.5;
    let label = Rect::new(photo.x + photo.w - w - 8.0, photo.y + photo.h - h - 8.0, w, h);
    canvas.fill_clipped(label, Clip::Rounded(4.0), with_alpha(Rgba([0, 0, 0, 255]), 230));
    ctx.fonts.draw_wrapped(canvas, caption, label.x + pad, label.y + pad * 0.75, text_w + 1.0, &style);
}
