//! Vertical card: headline pair over a large photo, a highlighted
//! subheadline and a checklist of body lines.

use super::{MARGIN, centered, draw_background, draw_fitted, draw_logo, draw_text_images, panel};
use crate::render::RenderContext;
use crate::render::banner::{BANNER_HEIGHT, draw_copyright_banner};
use crate::render::canvas::{Canvas, Clip, Fit, Rect};
use crate::render::color::{ACCENT, WHITE};
use crate::render::fit::FitBounds;
use crate::render::font::TextStyle;
use crate::template::VerticalCardData;
use crate::template::defaults::DEFAULT_PROFILE_IMAGE;

const HEADLINE_FIT: FitBounds = FitBounds::new(66.0, 36.0, 2.0, 1);
const SUBHEADLINE_FIT: FitBounds = FitBounds::new(30.0, 20.0, 1.0, 1);

pub fn render(canvas: &mut Canvas, d: &VerticalCardData, ctx: &RenderContext<'_>) {
    let base = draw_background(canvas, ctx, &d.bg_color, Some(d.background_image_url.as_str()));
    draw_logo(canvas, ctx, &d.logo_url);

    let b = canvas.bounds();
    let inner = b.w - MARGIN * 2.0;

    let header = Rect::new(MARGIN, 100.0, inner, 170.0);
    if !draw_text_images(canvas, ctx, &d.text_image_urls, header) {
        let mut y = header.y;
        y += draw_fitted(canvas, ctx, &d.headline1, (MARGIN, y, inner), HEADLINE_FIT, centered(66.0, WHITE).bold());
        draw_fitted(canvas, ctx, &d.headline2, (MARGIN, y, inner), HEADLINE_FIT, centered(66.0, ACCENT).bold());
    }

    let photo = Rect::new(MARGIN, 290.0, inner, 420.0);
    ctx.images.draw(canvas, &d.image_url, Some(DEFAULT_PROFILE_IMAGE), photo, Fit::Cover, Clip::Rounded(28.0));

    let mut y = photo.y + photo.h + 28.0;
    if !d.subheadline.trim().is_empty() {
        let pill = Rect::new(MARGIN + inner * 0.15, y, inner * 0.7, 52.0);
        canvas.fill_clipped(pill, Clip::Rounded(26.0), ACCENT);
        let style = centered(30.0, base).bold();
        let top = pill.y + (pill.h - style.line_height()) / 2.0;
        draw_fitted(canvas, ctx, &d.subheadline, (pill.x + 16.0, top, pill.w - 32.0), SUBHEADLINE_FIT, style);
        y += pill.h + 20.0;
    }

    let bottom = b.h - BANNER_HEIGHT - 20.0;
    let lines: Vec<&String> = d.body_texts.iter().filter(|s| !s.trim().is_empty()).collect();
    if !lines.is_empty() {
        let list = Rect::new(MARGIN, y, inner, (bottom - y).max(0.0));
        panel(canvas, list, WHITE, 30);
        let style = TextStyle::new(25.0, WHITE);
        let mut ty = list.y + 18.0;
        for line in lines {
            if ty + style.line_height() > list.y + list.h {
                break;
            }
            let cy = ty + style.line_height() / 2.0;
            canvas.draw_line((MARGIN + 24.0, cy), (MARGIN + 31.0, cy + 7.0), 4.0, ACCENT);
            canvas.draw_line((MARGIN + 31.0, cy + 7.0), (MARGIN + 44.0, cy - 8.0), 4.0, ACCENT);
            ty += ctx.fonts.draw_wrapped(canvas, line, MARGIN + 60.0, ty, inner - 80.0, &style) + 6.0;
        }
    }

    draw_copyright_banner(canvas, ctx.fonts, &d.copyright_area, base);
}
