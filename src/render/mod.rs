//! # Rendering Module
//!
//! Turns a validated template record into a PNG.
//!
//! ```text
//! TemplateData ──► templates::<layout>::render ──► Canvas (RGBA, ×pixel ratio) ──► PNG
//!                         │
//!                 FontBook + ImageSet
//! ```
//!
//! ## Modules
//!
//! - [`canvas`]: RGBA drawing surface in logical pixels
//! - [`font`]: TrueType or Spleen bitmap text, wrapping
//! - [`fit`]: shrink-to-fit heading sizes
//! - [`images`]: image reference resolution and fallbacks
//! - [`templates`]: one renderer per layout
//!
//! ## Usage Example
//!
//! ```
//! use cardnews::render::{RenderContext, export, font::FontBook, images::ImageSet};
//! use cardnews::template::{TemplateType, defaults::default_data};
//!
//! let fonts = FontBook::bitmap();
//! let images = ImageSet::new();
//! let ctx = RenderContext::new(&fonts, &images);
//! let out = export(&default_data(TemplateType::VerticalCard), &ctx, 1.0).unwrap();
//! assert_eq!((out.width, out.height), (720, 1200));
//! ```

pub mod banner;
pub mod canvas;
pub mod color;
pub mod fit;
pub mod font;
pub mod icons;
pub mod images;
pub mod templates;

use image::RgbaImage;
use std::io::Cursor;

use crate::error::{CardNewsError, Result};
use crate::template::{TemplateData, TemplateType};
use canvas::Canvas;
use font::FontBook;
use images::ImageSet;

/// Pixel ratio used for exported PNGs.
pub const EXPORT_PIXEL_RATIO: f32 = 2.0;

/// Largest accepted pixel ratio.
pub const MAX_PIXEL_RATIO: f32 = 4.0;

/// Reject ratios outside (0, [`MAX_PIXEL_RATIO`]].
pub fn check_pixel_ratio(pixel_ratio: f32) -> Result<f32> {
    if pixel_ratio > 0.0 && pixel_ratio <= MAX_PIXEL_RATIO {
        Ok(pixel_ratio)
    } else {
        Err(CardNewsError::Validation(format!(
            "pixelRatio must be in (0, {}], got {}",
            MAX_PIXEL_RATIO, pixel_ratio
        )))
    }
}

/// Resources shared by all renderers.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub fonts: &'a FontBook,
    pub images: &'a ImageSet,
}

impl<'a> RenderContext<'a> {
    pub fn new(fonts: &'a FontBook, images: &'a ImageSet) -> Self {
        Self { fonts, images }
    }
}

/// An encoded export.
#[derive(Debug, Clone)]
pub struct Export {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Render `data` onto a fresh canvas of its template's size.
pub fn render(data: &TemplateData, ctx: &RenderContext<'_>, pixel_ratio: f32) -> RgbaImage {
    let (w, h) = data.template_type().dimensions();
    let mut canvas = Canvas::new(w, h, pixel_ratio);
    match data {
        TemplateData::HorizontalCard(d) => templates::horizontal_card::render(&mut canvas, d, ctx),
        TemplateData::QuadLayout(d) => templates::quad_layout::render(&mut canvas, d, ctx),
        TemplateData::VerticalListCard(d) => templates::vertical_list_card::render(&mut canvas, d, ctx),
        TemplateData::VerticalCard(d) => templates::vertical_card::render(&mut canvas, d, ctx),
        TemplateData::SquareLayout(d) => templates::square_layout::render(&mut canvas, d, ctx),
    }
    canvas.into_image()
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| CardNewsError::Image(format!("PNG encoding failed: {}", e)))?;
    Ok(png)
}

/// `{templateId}-{timestampMillis}.png`
pub fn export_filename(kind: TemplateType, timestamp_millis: i64) -> String {
    format!("{}-{}.png", kind.id(), timestamp_millis)
}

/// Render and encode `data` at `pixel_ratio`, named after the current time.
pub fn export(data: &TemplateData, ctx: &RenderContext<'_>, pixel_ratio: f32) -> Result<Export> {
    let img = render(data, ctx, check_pixel_ratio(pixel_ratio)?);
    let (width, height) = img.dimensions();
    let png = encode_png(&img)?;
    let filename = export_filename(data.template_type(), chrono::Utc::now().timestamp_millis());
    tracing::info!(template = %data.template_type(), width, height, bytes = png.len(), "exported card");
    Ok(Export {
        filename,
        width,
        height,
        png,
    })
}
