//! Vertical list card: centered headlines, a tall portrait on the left and
//! the items listed top to bottom on the right.

use super::{MARGIN, centered, draw_background, draw_fitted, draw_logo, draw_text_images};
use crate::render::RenderContext;
use crate::render::banner::{BANNER_HEIGHT, draw_copyright_banner};
use crate::render::canvas::{Canvas, Clip, Fit, Rect};
use crate::render::color::{ACCENT, WHITE, color_or, with_alpha};
use crate::render::fit::FitBounds;
use crate::render::font::TextStyle;
use crate::render::icons::draw_icon_badge;
use crate::template::VerticalListCardData;
use crate::template::defaults::DEFAULT_PROFILE_IMAGE;
use crate::template::icons::resolve_icons;

const HEADLINE_FIT: FitBounds = FitBounds::new(60.0, 32.0, 2.0, 1);
const ITEM_FIT: FitBounds = FitBounds::new(26.0, 17.0, 1.0, 2);

pub fn render(canvas: &mut Canvas, d: &VerticalListCardData, ctx: &RenderContext<'_>) {
    let base = draw_background(canvas, ctx, &d.bg_color, Some(d.background_image_url.as_str()));
    draw_logo(canvas, ctx, &d.logo_url);

    let b = canvas.bounds();
    let inner = b.w - MARGIN * 2.0;

    let header = Rect::new(MARGIN, 96.0, inner, 180.0);
    if !draw_text_images(canvas, ctx, &d.text_image_urls, header) {
        let mut y = header.y;
        for (i, headline) in d.headlines.iter().enumerate() {
            let fallback = if i == 0 { WHITE } else { ACCENT };
            let style = centered(60.0, color_or(Some(headline.color.as_str()), fallback)).bold();
            y += draw_fitted(canvas, ctx, &headline.text, (MARGIN, y, inner), HEADLINE_FIT, style);
            if y > header.y + header.h {
                break;
            }
        }
    }

    let top = 296.0;
    let bottom = b.h - BANNER_HEIGHT - 24.0;
    let photo = Rect::new(MARGIN, top, 250.0, bottom - top);
    ctx.images.draw(canvas, &d.image_url, Some(DEFAULT_PROFILE_IMAGE), photo, Fit::Cover, Clip::Rounded(24.0));

    let items: Vec<&String> = d.items.iter().filter(|s| !s.trim().is_empty()).collect();
    if items.is_empty() {
        draw_copyright_banner(canvas, ctx.fonts, &d.copyright_area, base);
        return;
    }
    let icons = resolve_icons(&d.icon_names, items.len());
    let list_x = photo.x + photo.w + 24.0;
    let list_w = b.w - MARGIN - list_x;
    let row_h = (bottom - top) / items.len() as f32;
    let badge = 52.0_f32.min(row_h - 8.0).max(24.0);

    for (i, (item, icon)) in items.iter().zip(icons).enumerate() {
        let row = Rect::new(list_x, top + i as f32 * row_h, list_w, row_h);
        if i > 0 {
            canvas.fill_rect(Rect::new(row.x, row.y, row.w, 1.0), with_alpha(WHITE, 70));
        }
        let cy = row.y + row.h / 2.0;
        draw_icon_badge(canvas, ctx.fonts, icon, i, (row.x + badge / 2.0, cy), badge, ACCENT, base);

        let text_x = row.x + badge + 16.0;
        let text_w = row.w - badge - 16.0;
        let size = crate::render::fit::fit_font_size(ctx.fonts, item, true, text_w, ITEM_FIT);
        let style = TextStyle::new(size, WHITE).bold();
        let lines = ctx.fonts.wrap(item, size, true, text_w).len() as f32;
        let text_top = cy - lines * style.line_height() / 2.0;
        ctx.fonts.draw_wrapped(canvas, item, text_x, text_top, text_w, &style);
    }

    draw_copyright_banner(canvas, ctx.fonts, &d.copyright_area, base);
}
