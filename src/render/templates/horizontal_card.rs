//! Horizontal card: two-line headline, profile photo, and the items as a
//! row of side-by-side cards.

use super::{MARGIN, centered, draw_background, draw_fitted, draw_logo, draw_text_images, panel};
use crate::render::RenderContext;
use crate::render::banner::{BANNER_HEIGHT, draw_copyright_banner};
use crate::render::canvas::{Canvas, Clip, Fit, Rect};
use crate::render::color::{ACCENT, WHITE, color_or, with_alpha};
use crate::render::fit::FitBounds;
use crate::render::icons::draw_icon_badge;
use crate::template::HorizontalCardData;
use crate::template::defaults::DEFAULT_PROFILE_IMAGE;
use crate::template::icons::resolve_icons;

const HEADLINE_FIT: FitBounds = FitBounds::new(64.0, 36.0, 2.0, 1);
const ITEM_FIT: FitBounds = FitBounds::new(24.0, 16.0, 1.0, 4);

pub fn render(canvas: &mut Canvas, d: &HorizontalCardData, ctx: &RenderContext<'_>) {
    let base = draw_background(canvas, ctx, &d.bg_color, Some(d.background_image_url.as_str()));
    draw_logo(canvas, ctx, &d.logo_url);

    let (w, h) = {
        let b = canvas.bounds();
        (b.w, b.h)
    };
    let inner = w - MARGIN * 2.0;

    let header = Rect::new(MARGIN, 100.0, inner, 200.0);
    if !draw_text_images(canvas, ctx, &d.text_image_urls, header) {
        let mut y = header.y;
        let c1 = color_or(d.headline1_color.as_deref(), WHITE);
        let c2 = color_or(d.headline2_color.as_deref(), ACCENT);
        y += draw_fitted(canvas, ctx, &d.headline1, (MARGIN, y, inner), HEADLINE_FIT, centered(64.0, c1).bold());
        y += draw_fitted(canvas, ctx, &d.headline2, (MARGIN, y, inner), HEADLINE_FIT, centered(64.0, c2).bold());
        let sub = centered(26.0, with_alpha(WHITE, 225));
        ctx.fonts.draw_wrapped(canvas, &d.subheadline, MARGIN, y + 8.0, inner, &sub);
    }

    let photo = Rect::new(MARGIN, 320.0, inner, 310.0);
    ctx.images.draw(canvas, &d.image_url, Some(DEFAULT_PROFILE_IMAGE), photo, Fit::Cover, Clip::Rounded(24.0));

    let items: Vec<&String> = d.items.iter().filter(|s| !s.trim().is_empty()).collect();
    if !items.is_empty() {
        let icons = resolve_icons(&d.icon_names, items.len());
        let gap = 12.0;
        let top = photo.y + photo.h + 24.0;
        let card_h = h - BANNER_HEIGHT - 20.0 - top;
        let card_w = (inner - gap * (items.len() - 1) as f32) / items.len() as f32;
        for (i, (item, icon)) in items.iter().zip(icons).enumerate() {
            let card = Rect::new(MARGIN + i as f32 * (card_w + gap), top, card_w, card_h);
            panel(canvas, card, WHITE, 36);
            let badge = 56.0;
            draw_icon_badge(canvas, ctx.fonts, icon, i, (card.x + card.w / 2.0, card.y + 20.0 + badge / 2.0), badge, ACCENT, base);
            let text_box = card.inset(12.0);
            draw_fitted(
                canvas,
                ctx,
                item,
                (text_box.x, card.y + badge + 36.0, text_box.w),
                ITEM_FIT,
                centered(24.0, WHITE).bold(),
            );
        }
    }

    draw_copyright_banner(canvas, ctx.fonts, &d.copyright_area, base);
}
