//! 16bpp RGB565 buffer

use fbdev_color::Color;

use crate::pixel_buffer::Storage;
use crate::{BufferError, ColorMode, PixelBuffer};

/// RGB 5-6-5 pixels stored as little-endian `u16` words.
///
/// Encoding truncates the low bits of each channel; decoding shifts them back
/// up without rounding, so `0xFF` red reads back as `0xF8`.
#[derive(Debug, Clone)]
pub struct BufferRgb565 {
    storage: Storage,
}

impl BufferRgb565 {
    /// Allocate a black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self { storage: Storage::new(width, height, ColorMode::Rgb565) }
    }

    /// Wrap existing pixel data.
    pub fn from_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, BufferError> {
        Ok(Self { storage: Storage::from_bytes(width, height, ColorMode::Rgb565, bytes)? })
    }

    fn word(&self, index: usize) -> Option<u16> {
        match *self.storage.pixel(index, 2)? {
            [lo, hi] => Some(u16::from_le_bytes([lo, hi])),
            _ => None,
        }
    }

    fn put_word(&mut self, index: usize, word: u16) {
        if let Some(px) = self.storage.pixel_mut(index, 2) {
            px.copy_from_slice(&word.to_le_bytes());
        }
    }
}

impl PixelBuffer for BufferRgb565 {
    fn width(&self) -> u32 {
        self.storage.width
    }

    fn height(&self) -> u32 {
        self.storage.height
    }

    fn color_mode(&self) -> ColorMode {
        ColorMode::Rgb565
    }

    fn buffer(&self) -> &[u8] {
        &self.storage.bytes
    }

    fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.storage.bytes
    }

    fn write_at(&mut self, index: usize, color: Color) {
        self.put_word(index, color.rgb565());
    }

    // every channel is masked to <= 6 bits before the shift back up
    #[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)]
    fn read_at(&self, index: usize) -> Color {
        let Some(v) = self.word(index) else {
            return Color::DEFAULT;
        };
        let r = ((v >> 11) & 0x1F) as u8;
        let g = ((v >> 5) & 0x3F) as u8;
        let b = (v & 0x1F) as u8;
        Color::rgb(r << 3, g << 2, b << 3)
    }

    fn invert_at(&mut self, index: usize) {
        if let Some(v) = self.word(index) {
            self.put_word(index, !v);
        }
    }

    fn clear(&mut self) {
        self.storage.bytes.fill(0);
    }
}
