//! 24bpp RGB888 buffer

use fbdev_color::Color;

use crate::pixel_buffer::Storage;
use crate::{BufferError, ColorMode, PixelBuffer};

/// Three bytes per pixel in `R, G, B` order. Alpha is dropped on write and
/// reads back as 255.
#[derive(Debug, Clone)]
pub struct BufferRgb888 {
    storage: Storage,
}

impl BufferRgb888 {
    /// Allocate a black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self { storage: Storage::new(width, height, ColorMode::Rgb888) }
    }

    /// Wrap existing pixel data.
    pub fn from_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, BufferError> {
        Ok(Self { storage: Storage::from_bytes(width, height, ColorMode::Rgb888, bytes)? })
    }
}

impl PixelBuffer for BufferRgb888 {
    fn width(&self) -> u32 {
        self.storage.width
    }

    fn height(&self) -> u32 {
        self.storage.height
    }

    fn color_mode(&self) -> ColorMode {
        ColorMode::Rgb888
    }

    fn buffer(&self) -> &[u8] {
        &self.storage.bytes
    }

    fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.storage.bytes
    }

    fn write_at(&mut self, index: usize, color: Color) {
        if let Some(px) = self.storage.pixel_mut(index, 3) {
            px.copy_from_slice(&[color.r(), color.g(), color.b()]);
        }
    }

    fn read_at(&self, index: usize) -> Color {
        match self.storage.pixel(index, 3) {
            Some(&[r, g, b]) => Color::rgb(r, g, b),
            _ => Color::DEFAULT,
        }
    }

    fn invert_at(&mut self, index: usize) {
        if let Some(px) = self.storage.pixel_mut(index, 3) {
            for channel in px {
                *channel = !*channel;
            }
        }
    }

    fn clear(&mut self) {
        self.storage.bytes.fill(0);
    }
}
