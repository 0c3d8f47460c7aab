//! Quad layout: stacked colored headlines beside a round portrait, then a
//! 2×2 grid of pledge cards with detail bullets.

use image::Rgba;

use super::{MARGIN, draw_background, draw_fitted, draw_logo, draw_text_images, panel};
use crate::render::RenderContext;
use crate::render::banner::{BANNER_HEIGHT, draw_copyright_banner};
use crate::render::canvas::{Canvas, Clip, Fit, Rect};
use crate::render::color::{ACCENT, WHITE, color_or};
use crate::render::fit::FitBounds;
use crate::render::font::TextStyle;
use crate::render::icons::draw_icon_badge;
use crate::template::QuadLayoutData;
use crate::template::defaults::DEFAULT_PROFILE_IMAGE;
use crate::template::icons::resolve_icons;

const HEADLINE_FIT: FitBounds = FitBounds::new(56.0, 30.0, 2.0, 1);
const TITLE_FIT: FitBounds = FitBounds::new(24.0, 17.0, 1.0, 2);
const CARD_TEXT: Rgba<u8> = Rgba([0x1F, 0x29, 0x37, 255]);

pub fn render(canvas: &mut Canvas, d: &QuadLayoutData, ctx: &RenderContext<'_>) {
    let base = draw_background(canvas, ctx, &d.bg_color, Some(d.background_image_url.as_str()));
    draw_logo(canvas, ctx, &d.logo_url);

    let b = canvas.bounds();
    let inner = b.w - MARGIN * 2.0;
    let portrait = 190.0;
    let header_w = inner - portrait - 24.0;

    let header = Rect::new(MARGIN, 96.0, header_w, 200.0);
    if !draw_text_images(canvas, ctx, &d.text_image_urls, header) {
        let mut y = header.y;
        for (i, headline) in d.headlines.iter().enumerate() {
            let fallback = if i == 0 { WHITE } else { ACCENT };
            let style = TextStyle::new(56.0, color_or(Some(headline.color.as_str()), fallback)).bold();
            y += draw_fitted(canvas, ctx, &headline.text, (MARGIN, y, header_w), HEADLINE_FIT, style);
            if y > header.y + header.h {
                break;
            }
        }
    }

    let photo = Rect::new(b.w - MARGIN - portrait, 100.0, portrait, portrait);
    canvas.fill_circle(photo.x + portrait / 2.0, photo.y + portrait / 2.0, portrait / 2.0 + 4.0, ACCENT);
    ctx.images.draw(canvas, &d.image_url, Some(DEFAULT_PROFILE_IMAGE), photo, Fit::Cover, Clip::Circle);

    let grid_top = 320.0;
    let grid_bottom = b.h - BANNER_HEIGHT - 20.0;
    let gap = 16.0;
    let cell_w = (inner - gap) / 2.0;
    let cell_h = (grid_bottom - grid_top - gap) / 2.0;
    let icons = resolve_icons(&d.icon_names, d.items.len().min(4));

    for (i, (item, icon)) in d.items.iter().take(4).zip(icons).enumerate() {
        let cell = Rect::new(
            MARGIN + (i % 2) as f32 * (cell_w + gap),
            grid_top + (i / 2) as f32 * (cell_h + gap),
            cell_w,
            cell_h,
        );
        panel(canvas, cell, WHITE, 242);
        let badge = 48.0;
        draw_icon_badge(canvas, ctx.fonts, icon, i, (cell.x + 20.0 + badge / 2.0, cell.y + 20.0 + badge / 2.0), badge, base, WHITE);

        let text_x = cell.x + 20.0;
        let text_w = cell.w - 40.0;
        let mut y = cell.y + 20.0 + badge + 12.0;
        y += draw_fitted(canvas, ctx, item, (text_x, y, text_w), TITLE_FIT, TextStyle::new(24.0, CARD_TEXT).bold());
        y += 6.0;

        let detail = TextStyle::new(19.0, Rgba([0x4B, 0x55, 0x63, 255]));
        for line in d.item_details.get(i).into_iter().flatten() {
            if line.trim().is_empty() {
                continue;
            }
            if y + detail.line_height() > cell.y + cell.h - 12.0 {
                break;
            }
            canvas.fill_circle(text_x + 4.0, y + detail.line_height() / 2.0, 3.0, base);
            y += ctx.fonts.draw_wrapped(canvas, line, text_x + 14.0, y, text_w - 14.0, &detail);
        }
    }

    draw_copyright_banner(canvas, ctx.fonts, &d.copyright_area, base);
}
