use image::RgbaImage;

// ============================================================================
// Utility Functions
// ============================================================================

/// Alpha blend a single color channel
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Write ABGR pixel to slice (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel(dest: &mut [u8], r: u8, g: u8, b: u8) {
    dest[0] = 255; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering
/// This is the canvas the particles are drawn on, and the analysis
/// surface the logo is rasterized into for sampling
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Byte length of a `width` x `height` buffer, `None` when it does not fit in `u32`
    ///
    /// Keeping the byte count within `u32` also keeps every row and column
    /// index within `i32`, which the clipping code relies on.
    pub fn byte_len(width: u32, height: u32) -> Option<usize> {
        width
            .checked_mul(height)?
            .checked_mul(4)
            .map(|n| n as usize)
    }

    /// Create a new pixel buffer (opaque black)
    pub fn with_size(width: u32, height: u32) -> Self {
        let mut buffer = Self {
            pixels: vec![0; width as usize * height as usize * 4],
            width,
            height,
        };
        buffer.clear(0, 0, 0);
        buffer
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Clear to a solid color
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        for px in self.pixels.chunks_exact_mut(4) {
            write_pixel(px, r, g, b);
        }
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + 4], r, g, b);
        }
    }

    /// Set pixel with alpha blending
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            let alpha = a as u16;
            self.pixels[idx] = 255; // A - always opaque
            self.pixels[idx + 1] = blend_channel(b, self.pixels[idx + 1], alpha);
            self.pixels[idx + 2] = blend_channel(g, self.pixels[idx + 2], alpha);
            self.pixels[idx + 3] = blend_channel(r, self.pixels[idx + 3], alpha);
        }
    }

    /// Read a pixel from the buffer (bounds checked)
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
            ))
        } else {
            None
        }
    }

    /// Draw a horizontal line
    /// Computes starting index once, then increments by 4
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, r: u8, g: u8, b: u8) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let mut idx = self.pixel_index(start as u32, y as u32);
        let count = (end - start + 1) as usize;
        for _ in 0..count {
            write_pixel(&mut self.pixels[idx..idx + 4], r, g, b);
            idx += 4;
        }
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, r: u8, g: u8, b: u8) {
        if w == 0 {
            return;
        }
        for row in 0..h as i32 {
            self.hline(x, x + w as i32 - 1, y + row, r, g, b);
        }
    }

    /// Fill a circle with sub-pixel center and radius
    ///
    /// A pixel is covered when its center lies inside the circle, so a
    /// particle drifting by a fraction of a pixel still moves on screen.
    pub fn fill_circle_f(&mut self, cx: f32, cy: f32, radius: f32, r: u8, g: u8, b: u8) {
        if radius <= 0.0 || !cx.is_finite() || !cy.is_finite() {
            return;
        }
        let r2 = radius * radius;
        let y_min = ((cy - radius - 0.5).ceil() as i32).max(0);
        let y_max = ((cy + radius - 0.5).floor() as i32).min(self.height as i32 - 1);

        for y in y_min..=y_max {
            let dy = y as f32 + 0.5 - cy;
            let span = r2 - dy * dy;
            if span < 0.0 {
                continue;
            }
            let half = span.sqrt();
            let x1 = (cx - half - 0.5).ceil() as i32;
            let x2 = (cx + half - 0.5).floor() as i32;
            if x1 <= x2 {
                self.hline(x1, x2, y, r, g, b);
            }
        }
    }

    /// Draw an RGBA image scaled into the rectangle (x, y, w, h)
    ///
    /// Nearest-neighbour sampling, source-over alpha compositing onto the
    /// existing contents. Parts of the rectangle outside the buffer are clipped.
    pub fn draw_image(&mut self, image: &RgbaImage, x: f32, y: f32, w: f32, h: f32) {
        let (src_w, src_h) = image.dimensions();
        if src_w == 0 || src_h == 0 || w <= 0.0 || h <= 0.0 {
            return;
        }

        let x_min = (x.floor() as i32).max(0);
        let y_min = (y.floor() as i32).max(0);
        let x_max = ((x + w).ceil() as i32).min(self.width as i32);
        let y_max = ((y + h).ceil() as i32).min(self.height as i32);

        for py in y_min..y_max {
            let v = (py as f32 + 0.5 - y) / h;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            let sy = ((v * src_h as f32) as u32).min(src_h - 1);
            for px in x_min..x_max {
                let u = (px as f32 + 0.5 - x) / w;
                if !(0.0..1.0).contains(&u) {
                    continue;
                }
                let sx = ((u * src_w as f32) as u32).min(src_w - 1);
                let [r, g, b, a] = image.get_pixel(sx, sy).0;
                match a {
                    0 => {},
                    255 => self.set_pixel(px, py, r, g, b),
                    _ => self.blend_pixel(px, py, r, g, b, a),
                }
            }
        }
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Copy out as a plain RGBA image (for writing snapshots)
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let (r, g, b) = self.get_pixel(x as i32, y as i32).unwrap_or((0, 0, 0));
            image::Rgba([r, g, b, 255])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_and_read_back() {
        let mut buf = PixelBuffer::with_size(8, 4);
        buf.clear(0xf1, 0x20, 0x03);
        assert_eq!(buf.get_pixel(0, 0), Some((0xf1, 0x20, 0x03)));
        assert_eq!(buf.get_pixel(7, 3), Some((0xf1, 0x20, 0x03)));
        assert_eq!(buf.get_pixel(8, 0), None);
        assert_eq!(buf.get_pixel(-1, 0), None);
    }

    #[test]
    fn test_byte_len_rejects_overflowing_sizes() {
        assert_eq!(PixelBuffer::byte_len(1350, 1920), Some(1350 * 1920 * 4));
        assert_eq!(PixelBuffer::byte_len(40_000, 40_000), None);
        assert_eq!(PixelBuffer::byte_len(u32::MAX, 1), None);
    }

    #[test]
    fn test_fill_circle_covers_center_only() {
        let mut buf = PixelBuffer::with_size(20, 20);
        buf.clear(255, 255, 255);
        buf.fill_circle_f(10.0, 10.0, 3.0, 255, 0, 0);
        assert_eq!(buf.get_pixel(10, 10), Some((255, 0, 0)));
        assert_eq!(buf.get_pixel(9, 9), Some((255, 0, 0)));
        assert_eq!(buf.get_pixel(10, 14), Some((255, 255, 255)));
        assert_eq!(buf.get_pixel(0, 0), Some((255, 255, 255)));
    }

    #[test]
    fn test_fill_circle_offscreen_is_clipped() {
        let mut buf = PixelBuffer::with_size(10, 10);
        buf.clear(0, 0, 0);
        buf.fill_circle_f(-3.0, -2.0, 5.0, 0, 0, 255);
        assert_eq!(buf.get_pixel(0, 0), Some((0, 0, 255)));
        assert_eq!(buf.get_pixel(5, 5), Some((0, 0, 0)));
        buf.fill_circle_f(f32::NAN, 1.0, 4.0, 255, 0, 0);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut buf = PixelBuffer::with_size(4, 4);
        buf.fill_rect(-2, -2, 100, 100, 9, 9, 9);
        assert_eq!(buf.get_pixel(3, 3), Some((9, 9, 9)));
    }

    #[test]
    fn test_draw_image_scales_and_composites() {
        // 2x1 source: opaque black, fully transparent
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 0, 0]));

        let mut buf = PixelBuffer::with_size(8, 4);
        buf.clear(255, 255, 255);
        buf.draw_image(&img, 0.0, 0.0, 8.0, 4.0);

        assert_eq!(buf.get_pixel(0, 0), Some((0, 0, 0)));
        assert_eq!(buf.get_pixel(3, 3), Some((0, 0, 0)));
        assert_eq!(buf.get_pixel(4, 0), Some((255, 255, 255)));
        assert_eq!(buf.get_pixel(7, 3), Some((255, 255, 255)));
    }

    #[test]
    fn test_draw_image_half_alpha_blends() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 128]));
        let mut buf = PixelBuffer::with_size(2, 2);
        buf.clear(255, 255, 255);
        buf.draw_image(&img, 0.0, 0.0, 2.0, 2.0);
        let (r, _, _) = buf.get_pixel(1, 1).unwrap();
        assert!((120..=135).contains(&r), "got {}", r);
    }

    #[test]
    fn test_to_rgba_image_matches_buffer() {
        let mut buf = PixelBuffer::with_size(3, 2);
        buf.clear(1, 2, 3);
        buf.set_pixel(2, 1, 200, 100, 50);
        let img = buf.to_rgba_image();
        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 255]);
        assert_eq!(img.get_pixel(2, 1).0, [200, 100, 50, 255]);
    }
}
