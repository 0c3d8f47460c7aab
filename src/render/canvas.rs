//! # Drawing Surface
//!
//! An RGBA buffer addressed in logical (CSS-like) pixels. Every drawing call
//! takes logical coordinates and multiplies them by the pixel ratio, so a
//! 720×1200 layout at ratio 2 fills a 1440×2400 image.
//!
//! All primitives alpha-blend onto what is already there.

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};

/// Axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn inset(&self, d: f32) -> Rect {
        Rect::new(self.x + d, self.y + d, (self.w - 2.0 * d).max(0.0), (self.h - 2.0 * d).max(0.0))
    }
}

/// How an image fills its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Scale to cover the box, cropping the overflow.
    Cover,
    /// Scale to fit inside the box, centered.
    Contain,
}

/// Shape an image or fill is clipped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clip {
    Rect,
    Rounded(f32),
    Circle,
}

pub struct Canvas {
    image: RgbaImage,
    scale: f32,
    width: u32,
    height: u32,
}

impl Canvas {
    /// A canvas of `width`×`height` logical pixels at pixel ratio `scale`.
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let pw = ((width as f32) * scale).round().max(1.0) as u32;
        let ph = ((height as f32) * scale).round().max(1.0) as u32;
        Self {
            image: RgbaImage::from_pixel(pw, ph, Rgba([255, 255, 255, 255])),
            scale,
            width,
            height,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Logical size.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Device pixel range covered by a logical rectangle, clamped to the image.
    fn device_range(&self, r: Rect) -> (u32, u32, u32, u32) {
        let x0 = (r.x * self.scale).floor().max(0.0) as u32;
        let y0 = (r.y * self.scale).floor().max(0.0) as u32;
        let x1 = ((r.x + r.w) * self.scale).ceil().max(0.0) as u32;
        let y1 = ((r.y + r.h) * self.scale).ceil().max(0.0) as u32;
        (
            x0.min(self.image.width()),
            y0.min(self.image.height()),
            x1.min(self.image.width()),
            y1.min(self.image.height()),
        )
    }

    /// Blend `color` into one device pixel with extra `coverage` in [0, 1].
    pub fn blend_device(&mut self, px: i64, py: i64, color: Rgba<u8>, coverage: f32) {
        if px < 0 || py < 0 || px >= self.image.width() as i64 || py >= self.image.height() as i64 {
            return;
        }
        let a = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(px as u32, py as u32);
        let da = dst[3] as f32 / 255.0;
        let out_a = a + da * (1.0 - a);
        for c in 0..3 {
            let src = color[c] as f32;
            let d = dst[c] as f32;
            let v = if out_a > 0.0 {
                (src * a + d * da * (1.0 - a)) / out_a
            } else {
                0.0
            };
            dst[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Whether device pixel center `(px, py)` lies inside `clip` of `r`.
    fn inside(&self, r: Rect, clip: Clip, px: u32, py: u32) -> bool {
        let x = (px as f32 + 0.5) / self.scale;
        let y = (py as f32 + 0.5) / self.scale;
        match clip {
            Clip::Rect => true,
            Clip::Circle => {
                let (cx, cy) = r.center();
                let rad = r.w.min(r.h) / 2.0;
                (x - cx).powi(2) + (y - cy).powi(2) <= rad * rad
            }
            Clip::Rounded(radius) => {
                let radius = radius.min(r.w / 2.0).min(r.h / 2.0);
                let nx = x.clamp(r.x + radius, r.x + r.w - radius);
                let ny = y.clamp(r.y + radius, r.y + r.h - radius);
                (x - nx).powi(2) + (y - ny).powi(2) <= radius * radius
            }
        }
    }

    pub fn fill_rect(&mut self, r: Rect, color: Rgba<u8>) {
        self.fill_clipped(r, Clip::Rect, color);
    }

    pub fn fill_clipped(&mut self, r: Rect, clip: Clip, color: Rgba<u8>) {
        let (x0, y0, x1, y1) = self.device_range(r);
        for py in y0..y1 {
            for px in x0..x1 {
                if self.inside(r, clip, px, py) {
                    self.blend_device(px as i64, py as i64, color, 1.0);
                }
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
        let r = Rect::new(cx - radius, cy - radius, radius * 2.0, radius * 2.0);
        self.fill_clipped(r, Clip::Circle, color);
    }

    /// Stroke a rectangle outline `width` logical pixels thick.
    pub fn stroke_rect(&mut self, r: Rect, width: f32, color: Rgba<u8>) {
        self.fill_rect(Rect::new(r.x, r.y, r.w, width), color);
        self.fill_rect(Rect::new(r.x, r.y + r.h - width, r.w, width), color);
        self.fill_rect(Rect::new(r.x, r.y + width, width, r.h - 2.0 * width), color);
        self.fill_rect(Rect::new(r.x + r.w - width, r.y + width, width, r.h - 2.0 * width), color);
    }

    /// Diagonal (135°) linear gradient from `from` at top-left to `to` at
    /// bottom-right.
    pub fn fill_gradient(&mut self, r: Rect, from: Rgba<u8>, to: Rgba<u8>) {
        let (x0, y0, x1, y1) = self.device_range(r);
        let span = ((x1 - x0) + (y1 - y0)).max(1) as f32;
        for py in y0..y1 {
            for px in x0..x1 {
                let t = ((px - x0) + (py - y0)) as f32 / span;
                let mut c = [0u8; 4];
                for (i, slot) in c.iter_mut().enumerate() {
                    *slot = (from[i] as f32 + (to[i] as f32 - from[i] as f32) * t).round() as u8;
                }
                self.blend_device(px as i64, py as i64, Rgba(c), 1.0);
            }
        }
    }

    /// Draw a line with round caps.
    pub fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba<u8>) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len = (dx * dx + dy * dy).sqrt();
        let half = width / 2.0;
        let r = Rect::new(
            from.0.min(to.0) - half,
            from.1.min(to.1) - half,
            dx.abs() + width,
            dy.abs() + width,
        );
        let (x0, y0, x1, y1) = self.device_range(r);
        for py in y0..y1 {
            for px in x0..x1 {
                let x = (px as f32 + 0.5) / self.scale;
                let y = (py as f32 + 0.5) / self.scale;
                let t = if len > 0.0 {
                    (((x - from.0) * dx + (y - from.1) * dy) / (len * len)).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let (nx, ny) = (from.0 + dx * t, from.1 + dy * t);
                if (x - nx).powi(2) + (y - ny).powi(2) <= half * half {
                    self.blend_device(px as i64, py as i64, color, 1.0);
                }
            }
        }
    }

    /// Fill a polygon (even-odd rule).
    pub fn fill_polygon(&mut self, points: &[(f32, f32)], color: Rgba<u8>) {
        if points.len() < 3 {
            return;
        }
        let min_x = points.iter().map(|p| p.0).fold(f32::MAX, f32::min);
        let max_x = points.iter().map(|p| p.0).fold(f32::MIN, f32::max);
        let min_y = points.iter().map(|p| p.1).fold(f32::MAX, f32::min);
        let max_y = points.iter().map(|p| p.1).fold(f32::MIN, f32::max);
        let (x0, y0, x1, y1) = self.device_range(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y));
        for py in y0..y1 {
            for px in x0..x1 {
                let x = (px as f32 + 0.5) / self.scale;
                let y = (py as f32 + 0.5) / self.scale;
                let mut inside = false;
                let mut j = points.len() - 1;
                for i in 0..points.len() {
                    let (xi, yi) = points[i];
                    let (xj, yj) = points[j];
                    if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                        inside = !inside;
                    }
                    j = i;
                }
                if inside {
                    self.blend_device(px as i64, py as i64, color, 1.0);
                }
            }
        }
    }

    /// Draw `img` into `r`, scaled per `fit` and clipped to `clip`.
    pub fn draw_image(&mut self, img: &DynamicImage, r: Rect, fit: Fit, clip: Clip) {
        if img.width() == 0 || img.height() == 0 || r.w <= 0.0 || r.h <= 0.0 {
            return;
        }
        let box_w = r.w * self.scale;
        let box_h = r.h * self.scale;
        let sx = box_w / img.width() as f32;
        let sy = box_h / img.height() as f32;
        let s = match fit {
            Fit::Cover => sx.max(sy),
            Fit::Contain => sx.min(sy),
        };
        let tw = ((img.width() as f32 * s).round() as u32).max(1);
        let th = ((img.height() as f32 * s).round() as u32).max(1);
        let scaled = img.resize_exact(tw, th, FilterType::Triangle).to_rgba8();

        // Offset of the scaled image's top-left relative to the box, in device pixels.
        let ox = (r.x * self.scale + (box_w - tw as f32) / 2.0).round() as i64;
        let oy = (r.y * self.scale + (box_h - th as f32) / 2.0).round() as i64;

        let (x0, y0, x1, y1) = self.device_range(r);
        for py in y0..y1 {
            for px in x0..x1 {
                let ix = px as i64 - ox;
                let iy = py as i64 - oy;
                if ix < 0 || iy < 0 || ix >= tw as i64 || iy >= th as i64 {
                    continue;
                }
                if !self.inside(r, clip, px, py) {
                    continue;
                }
                let src = *scaled.get_pixel(ix as u32, iy as u32);
                self.blend_device(px as i64, py as i64, src, 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_device_size_follows_scale() {
        let canvas = Canvas::new(720, 1200, 2.0);
        assert_eq!(canvas.image().dimensions(), (1440, 2400));
        assert_eq!(canvas.size(), (720, 1200));
    }

    #[test]
    fn test_invalid_scale_falls_back_to_one() {
        let canvas = Canvas::new(10, 10, 0.0);
        assert_eq!(canvas.image().dimensions(), (10, 10));
    }

    #[test]
    fn test_fill_rect_is_scaled() {
        let mut canvas = Canvas::new(10, 10, 2.0);
        canvas.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0), RED);
        let img = canvas.into_image();
        assert_eq!(*img.get_pixel(2, 2), RED);
        assert_eq!(*img.get_pixel(5, 5), RED);
        assert_eq!(*img.get_pixel(6, 6), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_half_transparent_blend() {
        let mut canvas = Canvas::new(1, 1, 1.0);
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba([0, 0, 0, 128]));
        let px = canvas.into_image().get_pixel(0, 0).0;
        assert!((126..=129).contains(&px[0]));
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_circle_clip() {
        let mut canvas = Canvas::new(20, 20, 1.0);
        canvas.fill_circle(10.0, 10.0, 5.0, RED);
        let img = canvas.into_image();
        assert_eq!(*img.get_pixel(10, 10), RED);
        assert_ne!(*img.get_pixel(5, 5), RED);
    }

    #[test]
    fn test_gradient_endpoints() {
        let mut canvas = Canvas::new(100, 100, 1.0);
        canvas.fill_gradient(canvas.bounds(), RED, Rgba([0, 0, 255, 255]));
        let img = canvas.into_image();
        assert_eq!(img.get_pixel(0, 0)[0], 255);
        assert!(img.get_pixel(99, 99)[2] > 250);
    }

    #[test]
    fn test_cover_fills_box() {
        let src = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 2, RED));
        let mut canvas = Canvas::new(10, 10, 1.0);
        canvas.draw_image(&src, Rect::new(0.0, 0.0, 10.0, 10.0), Fit::Cover, Clip::Rect);
        let img = canvas.into_image();
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(9, 9), RED);
    }

    #[test]
    fn test_contain_letterboxes() {
        let src = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 2, RED));
        let mut canvas = Canvas::new(10, 10, 1.0);
        canvas.draw_image(&src, Rect::new(0.0, 0.0, 10.0, 10.0), Fit::Contain, Clip::Rect);
        let img = canvas.into_image();
        assert_eq!(*img.get_pixel(5, 5), RED);
        assert_eq!(*img.get_pixel(5, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_polygon() {
        let mut canvas = Canvas::new(10, 10, 1.0);
        canvas.fill_polygon(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)], RED);
        let img = canvas.into_image();
        assert_eq!(*img.get_pixel(1, 1), RED);
        assert_ne!(*img.get_pixel(8, 8), RED);
    }
}
