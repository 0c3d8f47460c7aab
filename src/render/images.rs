//! # Image References
//!
//! Template image fields hold a reference string:
//!
//! | Form | Source |
//! |------|--------|
//! | `data:image/png;base64,...` | inline upload |
//! | `http://` / `https://` | fetched once before rendering |
//! | `builtin:profile`, `builtin:logo` | drawn procedurally |
//! | anything else | path on disk, relative to the base directory |
//!
//! Decoding happens before rendering; renderers only look references up in
//! an [`ImageSet`]. A reference that could not be loaded draws the
//! broken-image placeholder instead of failing the render.

use image::{DynamicImage, Rgba};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::canvas::{Canvas, Clip, Fit, Rect};
use super::color::{PLACEHOLDER_GRAY, with_alpha};
use crate::editor::upload::decode_data_url;
use crate::error::{CardNewsError, Result};
use crate::template::TemplateData;
use crate::template::defaults::{DEFAULT_LOGO_URL, DEFAULT_PROFILE_IMAGE};

/// Procedurally drawn images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Profile,
    Logo,
}

impl Builtin {
    pub fn parse(reference: &str) -> Option<Self> {
        match reference {
            DEFAULT_PROFILE_IMAGE => Some(Builtin::Profile),
            DEFAULT_LOGO_URL => Some(Builtin::Logo),
            _ => None,
        }
    }
}

/// What a reference resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    Empty,
    Builtin(Builtin),
    Image(&'a DynamicImage),
    Broken,
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Decoded images keyed by reference.
#[derive(Debug, Default)]
pub struct ImageSet {
    images: HashMap<String, DynamicImage>,
    failed: HashSet<String>,
    base_dir: Option<PathBuf>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative file references against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn insert(&mut self, reference: impl Into<String>, image: DynamicImage) {
        self.images.insert(reference.into(), image);
    }

    /// Decode every inline and on-disk reference of `data`.
    pub fn load_local(&mut self, data: &TemplateData) {
        self.load_where(data, |r| !is_remote(r));
    }

    /// Decode only `data:` references; everything else renders as broken.
    pub fn load_inline(&mut self, data: &TemplateData) {
        self.load_where(data, |r| r.starts_with("data:"));
        for reference in references(data) {
            if !self.is_known(&reference) {
                self.failed.insert(reference);
            }
        }
    }

    fn load_where(&mut self, data: &TemplateData, wanted: impl Fn(&str) -> bool) {
        for reference in references(data) {
            if !wanted(&reference) || self.is_known(&reference) {
                continue;
            }
            match load_local_reference(&reference, self.base_dir.as_deref()) {
                Ok(img) => {
                    self.images.insert(reference, img);
                }
                Err(e) => {
                    tracing::warn!(reference = %short(&reference), error = %e, "image unavailable");
                    self.failed.insert(reference);
                }
            }
        }
    }

    /// Download every `http(s)` reference of `data`, one at a time.
    pub async fn fetch_remote(&mut self, client: &reqwest::Client, data: &TemplateData) {
        for reference in references(data) {
            if !is_remote(&reference) || self.is_known(&reference) {
                continue;
            }
            match fetch(client, &reference).await {
                Ok(img) => {
                    self.images.insert(reference, img);
                }
                Err(e) => {
                    tracing::warn!(url = %reference, error = %e, "image download failed");
                    self.failed.insert(reference);
                }
            }
        }
    }

    fn is_known(&self, reference: &str) -> bool {
        self.images.contains_key(reference) || self.failed.contains(reference)
    }

    pub fn resolve(&self, reference: &str) -> Resolved<'_> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Resolved::Empty;
        }
        if let Some(builtin) = Builtin::parse(reference) {
            return Resolved::Builtin(builtin);
        }
        match self.images.get(reference) {
            Some(img) => Resolved::Image(img),
            None => Resolved::Broken,
        }
    }

    /// Draw `reference` into `r`; an empty reference draws `fallback`
    /// instead (or nothing). Returns whether anything was drawn.
    pub fn draw(&self, canvas: &mut Canvas, reference: &str, fallback: Option<&str>, r: Rect, fit: Fit, clip: Clip) -> bool {
        let resolved = match (self.resolve(reference), fallback) {
            (Resolved::Empty, Some(fb)) => self.resolve(fb),
            (resolved, _) => resolved,
        };
        match resolved {
            Resolved::Empty => return false,
            Resolved::Builtin(Builtin::Profile) => draw_builtin_profile(canvas, r, clip),
            Resolved::Builtin(Builtin::Logo) => draw_builtin_logo(canvas, r),
            Resolved::Image(img) => canvas.draw_image(img, r, fit, clip),
            Resolved::Broken => draw_broken_image(canvas, r, clip),
        }
        true
    }
}

/// Every image reference a record mentions.
pub fn references(data: &TemplateData) -> Vec<String> {
    let mut refs: Vec<&str> = Vec::new();
    match data {
        TemplateData::HorizontalCard(d) => {
            refs.extend([d.image_url.as_str(), d.background_image_url.as_str(), d.logo_url.as_str()]);
            refs.extend(d.text_image_urls.iter().map(String::as_str));
        }
        TemplateData::QuadLayout(d) => {
            refs.extend([d.image_url.as_str(), d.background_image_url.as_str(), d.logo_url.as_str()]);
            refs.extend(d.text_image_urls.iter().map(String::as_str));
        }
        TemplateData::VerticalListCard(d) => {
            refs.extend([d.image_url.as_str(), d.background_image_url.as_str(), d.logo_url.as_str()]);
            refs.extend(d.text_image_urls.iter().map(String::as_str));
        }
        TemplateData::VerticalCard(d) => {
            refs.extend([d.image_url.as_str(), d.background_image_url.as_str(), d.logo_url.as_str()]);
            refs.extend(d.text_image_urls.iter().map(String::as_str));
        }
        TemplateData::SquareLayout(d) => {
            refs.extend([d.image1.as_str(), d.image2.as_str(), d.logo_url.as_str()]);
        }
    }
    let mut out: Vec<String> = Vec::new();
    for r in refs.into_iter().map(str::trim) {
        if !r.is_empty() && Builtin::parse(r).is_none() && !out.iter().any(|o| o == r) {
            out.push(r.to_string());
        }
    }
    out
}

fn load_local_reference(reference: &str, base_dir: Option<&Path>) -> Result<DynamicImage> {
    if reference.starts_with("data:") {
        let (_, bytes) = decode_data_url(reference)?;
        return decode(&bytes);
    }
    let path = Path::new(reference.strip_prefix("file://").unwrap_or(reference));
    let path = match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    };
    let bytes = std::fs::read(&path)
        .map_err(|e| CardNewsError::Image(format!("{}: {}", path.display(), e)))?;
    decode(&bytes)
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<DynamicImage> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CardNewsError::Transport(e.to_string()))?;
    if !response.status().is_success() {
        return Err(CardNewsError::Image(format!("HTTP {}", response.status())));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| CardNewsError::Transport(e.to_string()))?;
    decode(&bytes)
}

fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| CardNewsError::Image(e.to_string()))
}

/// Data-URLs are long; log only their head.
fn short(reference: &str) -> &str {
    match reference.char_indices().nth(48) {
        Some((i, _)) => &reference[..i],
        None => reference,
    }
}

/// Neutral silhouette on a light background.
fn draw_builtin_profile(canvas: &mut Canvas, r: Rect, clip: Clip) {
    canvas.fill_clipped(r, clip, Rgba([0xCB, 0xD5, 0xE1, 255]));
    let (cx, _) = r.center();
    let unit = r.w.min(r.h);
    let body = Rgba([0x64, 0x74, 0x8B, 255]);
    canvas.fill_circle(cx, r.y + r.h * 0.38, unit * 0.2, body);
    // Shoulders: a wide circle cut off by the box bottom.
    let shoulders = Rect::new(cx - unit * 0.38, r.y + r.h * 0.64, unit * 0.76, unit * 0.76);
    let visible = Rect::new(shoulders.x, shoulders.y, shoulders.w, (r.y + r.h - shoulders.y).max(0.0));
    let row = 1.0 / canvas.scale();
    let rows = (visible.h / row).ceil() as usize;
    for i in 0..rows {
        let y = visible.y + i as f32 * row;
        let dy = y - (shoulders.y + shoulders.h / 2.0);
        let half = ((shoulders.w / 2.0).powi(2) - dy * dy).max(0.0).sqrt();
        if half > 0.0 {
            canvas.fill_rect(Rect::new(cx - half, y, half * 2.0, row), body);
        }
    }
}

/// Simple mark: a white rounded badge with a blue emblem.
fn draw_builtin_logo(canvas: &mut Canvas, r: Rect) {
    canvas.fill_clipped(r, Clip::Rounded(r.h * 0.3), with_alpha(Rgba([255, 255, 255, 255]), 230));
    let unit = r.h * 0.6;
    let (cx, cy) = (r.x + r.h * 0.5, r.y + r.h / 2.0);
    canvas.fill_circle(cx, cy, unit / 2.0, Rgba([0x00, 0x4E, 0xA2, 255]));
    canvas.fill_circle(cx, cy, unit / 4.0, Rgba([0x00, 0xA8, 0x5A, 255]));
    let bar = Rect::new(r.x + r.h, cy - r.h * 0.08, (r.w - r.h * 1.3).max(0.0), r.h * 0.16);
    canvas.fill_clipped(bar, Clip::Rounded(bar.h / 2.0), Rgba([0x00, 0x4E, 0xA2, 255]));
}

/// Gray box with a crossed-out frame.
pub fn draw_broken_image(canvas: &mut Canvas, r: Rect, clip: Clip) {
    canvas.fill_clipped(r, clip, PLACEHOLDER_GRAY);
    let gray = Rgba([0x9C, 0xA3, 0xAF, 255]);
    let unit = r.w.min(r.h) * 0.3;
    let (cx, cy) = r.center();
    let frame = Rect::new(cx - unit / 2.0, cy - unit / 2.0, unit, unit);
    let stroke = (unit / 16.0).max(1.0);
    canvas.stroke_rect(frame, stroke, gray);
    canvas.draw_line((frame.x, frame.y + frame.h), (frame.x + frame.w, frame.y), stroke, gray);
    canvas.fill_polygon(
        &[
            (frame.x + stroke, frame.y + frame.h - stroke),
            (frame.x + frame.w * 0.35, frame.y + frame.h * 0.5),
            (frame.x + frame.w * 0.6, frame.y + frame.h - stroke),
        ],
        gray,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Upload;
    use crate::template::defaults::default_data;
    use crate::template::TemplateType;
    use image::RgbaImage;
    use std::io::Cursor;

    fn png_data_url(color: [u8; 4]) -> String {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba(color)));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        Upload::new("x.png", "image/png", bytes).unwrap().to_data_url()
    }

    #[test]
    fn test_references_skip_builtins_and_duplicates() {
        let mut data = default_data(TemplateType::VerticalCard);
        if let TemplateData::VerticalCard(d) = &mut data {
            d.image_url = "a.png".into();
            d.background_image_url = "a.png".into();
            d.text_image_urls = vec!["https://x/t.png".into(), " ".into()];
        }
        assert_eq!(references(&data), vec!["a.png", "https://x/t.png"]);
    }

    #[test]
    fn test_resolve() {
        let mut set = ImageSet::new();
        let url = png_data_url([255, 0, 0, 255]);
        let mut data = default_data(TemplateType::SquareLayout);
        if let TemplateData::SquareLayout(d) = &mut data {
            d.image1 = url.clone();
            d.image2 = "missing/file.png".into();
        }
        set.load_local(&data);

        assert!(matches!(set.resolve(&url), Resolved::Image(_)));
        assert!(matches!(set.resolve("missing/file.png"), Resolved::Broken));
        assert!(matches!(set.resolve(""), Resolved::Empty));
        assert!(matches!(set.resolve(DEFAULT_LOGO_URL), Resolved::Builtin(Builtin::Logo)));
    }

    #[test]
    fn test_inline_only_ignores_files() {
        let dir = tempfile::tempdir().unwrap();
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 3, Rgba([0, 255, 0, 255])));
        let path = dir.path().join("green.png");
        img.save(&path).unwrap();

        let url = png_data_url([0, 0, 255, 255]);
        let mut data = default_data(TemplateType::SquareLayout);
        if let TemplateData::SquareLayout(d) = &mut data {
            d.image1 = url.clone();
            d.image2 = path.display().to_string();
        }
        let mut set = ImageSet::new();
        set.load_inline(&data);
        assert!(matches!(set.resolve(&url), Resolved::Image(_)));
        assert!(matches!(set.resolve(&path.display().to_string()), Resolved::Broken));
    }

    #[test]
    fn test_relative_path_uses_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 3, Rgba([0, 255, 0, 255])));
        img.save(dir.path().join("green.png")).unwrap();

        let mut set = ImageSet::new().with_base_dir(dir.path());
        let mut data = default_data(TemplateType::SquareLayout);
        if let TemplateData::SquareLayout(d) = &mut data {
            d.image1 = "green.png".into();
        }
        set.load_local(&data);
        assert!(matches!(set.resolve("green.png"), Resolved::Image(_)));
    }

    #[test]
    fn test_draw_fallback_and_broken() {
        let set = ImageSet::new();
        let mut canvas = Canvas::new(50, 50, 1.0);
        let r = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(!set.draw(&mut canvas, "", None, r, Fit::Cover, Clip::Rect));
        assert!(set.draw(&mut canvas, "", Some(DEFAULT_PROFILE_IMAGE), r, Fit::Cover, Clip::Rect));
        assert!(set.draw(&mut canvas, "nope.png", None, r, Fit::Cover, Clip::Rect));
        assert_eq!(*canvas.image().get_pixel(1, 1), PLACEHOLDER_GRAY);
    }
}
