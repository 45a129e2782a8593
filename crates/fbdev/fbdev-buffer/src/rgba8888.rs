//! 32bpp RGBA8888 buffer

use fbdev_color::Color;

use crate::pixel_buffer::Storage;
use crate::{BufferError, ColorMode, PixelBuffer};

/// Four bytes per pixel in `R, G, B, A` order.
///
/// The all-zero state is exactly [`Color::DEFAULT`].
#[derive(Debug, Clone)]
pub struct BufferRgba8888 {
    storage: Storage,
}

impl BufferRgba8888 {
    /// Allocate a transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self { storage: Storage::new(width, height, ColorMode::Rgba8888) }
    }

    /// Wrap existing pixel data.
    pub fn from_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, BufferError> {
        Ok(Self { storage: Storage::from_bytes(width, height, ColorMode::Rgba8888, bytes)? })
    }
}

impl PixelBuffer for BufferRgba8888 {
    fn width(&self) -> u32 {
        self.storage.width
    }

    fn height(&self) -> u32 {
        self.storage.height
    }

    fn color_mode(&self) -> ColorMode {
        ColorMode::Rgba8888
    }

    fn buffer(&self) -> &[u8] {
        &self.storage.bytes
    }

    fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.storage.bytes
    }

    fn write_at(&mut self, index: usize, color: Color) {
        if let Some(px) = self.storage.pixel_mut(index, 4) {
            px.copy_from_slice(&[color.r(), color.g(), color.b(), color.a()]);
        }
    }

    fn read_at(&self, index: usize) -> Color {
        match self.storage.pixel(index, 4) {
            Some(&[r, g, b, a]) => Color::new(r, g, b, a),
            _ => Color::DEFAULT,
        }
    }

    fn invert_at(&mut self, index: usize) {
        let color = self.read_at(index);
        self.write_at(index, color.inverted());
    }

    fn clear(&mut self) {
        self.storage.bytes.fill(0);
    }
}
