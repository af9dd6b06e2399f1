mod pixel_buffer;

pub use pixel_buffer::PixelBuffer;

use image::RgbaImage;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use crate::util::Rgb;

/// The 2D drawing primitives the animation consumes
///
/// Everything the sampler and the render loop draw goes through this trait,
/// so both can run against a plain `PixelBuffer` without a window.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Fill an axis-aligned rectangle
    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb);

    /// Fill a circle at a sub-pixel position
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb);

    /// Draw an image scaled into the sub-rectangle (x, y, w, h)
    fn draw_image(&mut self, image: &RgbaImage, x: f32, y: f32, w: f32, h: f32);

    /// Fill the whole surface
    fn fill(&mut self, color: Rgb) {
        let (w, h) = (self.width(), self.height());
        self.fill_rect(0, 0, w, h, color);
    }
}

impl Surface for PixelBuffer {
    fn width(&self) -> u32 {
        PixelBuffer::width(self)
    }

    fn height(&self) -> u32 {
        PixelBuffer::height(self)
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb) {
        PixelBuffer::fill_rect(self, x, y, w, h, color.0, color.1, color.2);
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb) {
        self.fill_circle_f(cx, cy, radius, color.0, color.1, color.2);
    }

    fn draw_image(&mut self, image: &RgbaImage, x: f32, y: f32, w: f32, h: f32) {
        PixelBuffer::draw_image(self, image, x, y, w, h);
    }

    fn fill(&mut self, color: Rgb) {
        self.clear(color.0, color.1, color.2);
    }
}

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
}

pub struct RenderTarget<'a> {
    texture: Texture<'a>,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
}

impl Display {
    /// Open a window of `window_width` x `window_height`
    ///
    /// The render target may be larger; SDL scales it into the window on present.
    /// vsync=true locks presents to the monitor refresh, which is what paces
    /// the render loop.
    pub fn with_options(
        title: &str,
        window_width: u32,
        window_height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, window_width, window_height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        Ok((Self { canvas, event_pump }, texture_creator))
    }

    pub fn present(
        &mut self,
        target: &mut RenderTarget,
        buffer: &PixelBuffer,
    ) -> Result<(), String> {
        target
            .texture
            .update(None, buffer.as_bytes(), (buffer.width() * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.copy(&target.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    /// Create a streaming render target matching the canvas resolution
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self { texture })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_fill_covers_everything() {
        let mut buf = PixelBuffer::with_size(5, 3);
        Surface::fill(&mut buf, (0xf1, 0xf1, 0xf1));
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(buf.get_pixel(x, y), Some((0xf1, 0xf1, 0xf1)));
            }
        }
    }

    #[test]
    fn test_surface_default_fill_uses_fill_rect() {
        struct Recorder(Vec<(i32, i32, u32, u32)>);
        impl Surface for Recorder {
            fn width(&self) -> u32 {
                40
            }
            fn height(&self) -> u32 {
                30
            }
            fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, _: Rgb) {
                self.0.push((x, y, w, h));
            }
            fn fill_circle(&mut self, _: f32, _: f32, _: f32, _: Rgb) {}
            fn draw_image(&mut self, _: &RgbaImage, _: f32, _: f32, _: f32, _: f32) {}
        }

        let mut rec = Recorder(Vec::new());
        rec.fill((1, 2, 3));
        assert_eq!(rec.0, vec![(0, 0, 40, 30)]);
    }
}
