//! Logo sampling
//!
//! Rasterizes the logo into a small square over white, then keeps every
//! `stride`-th dark pixel as a target point, scaled up to canvas coordinates.

use image::RgbaImage;

use crate::config::SamplerConfig;
use crate::display::{PixelBuffer, Surface};
use crate::math::Vec2;

/// Canvas-space point a particle can converge to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPoint {
    pub x: f32,
    pub y: f32,
}

impl TargetPoint {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<TargetPoint> for Vec2 {
    #[inline]
    fn from(t: TargetPoint) -> Self {
        Vec2::new(t.x, t.y)
    }
}

/// Draw the logo centered in an `analysis_size` square, uniformly scaled to at
/// most `fill_ratio` of it, composited over white
pub fn rasterize(image: &RgbaImage, settings: &SamplerConfig) -> PixelBuffer {
    let size = settings.analysis_size;
    let mut surface = PixelBuffer::with_size(size, size);
    draw_logo(&mut surface, image, settings.fill_ratio);
    surface
}

/// Paint white, then draw `image` centered and aspect-fit to `fill_ratio` of
/// the surface through its image primitive
pub fn draw_logo(surface: &mut impl Surface, image: &RgbaImage, fill_ratio: f32) {
    surface.fill((255, 255, 255));

    let (img_w, img_h) = image.dimensions();
    if img_w == 0 || img_h == 0 {
        return;
    }

    let (side_w, side_h) = (surface.width() as f32, surface.height() as f32);
    let scale = (side_w / img_w as f32).min(side_h / img_h as f32) * fill_ratio;
    let w = img_w as f32 * scale;
    let h = img_h as f32 * scale;
    surface.draw_image(image, (side_w - w) / 2.0, (side_h - h) / 2.0, w, h);
}

/// Walk a rasterized logo and emit a target for every dark sampled pixel
///
/// Row-major order: the order of the returned points decides which particles
/// end up sharing a point.
pub fn collect_targets(
    surface: &PixelBuffer,
    settings: &SamplerConfig,
    canvas_width: u32,
    canvas_height: u32,
) -> Vec<TargetPoint> {
    let (w, h) = (surface.width(), surface.height());
    let stride = settings.stride.max(1) as usize;
    let sx = canvas_width as f32 / w as f32;
    let sy = canvas_height as f32 / h as f32;

    let mut targets = Vec::new();
    for y in (0..h).step_by(stride) {
        for x in (0..w).step_by(stride) {
            let Some((r, _, _)) = surface.get_pixel(x as i32, y as i32) else {
                continue;
            };
            if r < settings.threshold {
                targets.push(TargetPoint::new(x as f32 * sx, y as f32 * sy));
            }
        }
    }
    targets
}

/// Full sampling pass: rasterize then collect
pub fn sample_targets(
    image: &RgbaImage,
    settings: &SamplerConfig,
    canvas_width: u32,
    canvas_height: u32,
) -> Vec<TargetPoint> {
    let surface = rasterize(image, settings);
    collect_targets(&surface, settings, canvas_width, canvas_height)
}
