//! The pixel buffer contract shared by every encoding
//!
//! A buffer is a contiguous byte array of exactly
//! `width * height * bytes_per_pixel` bytes, rows top to bottom, pixels left
//! to right. Each encoding only has to say how one pixel is written, read and
//! inverted; fills, clears and compositing are built on top of that.

// Index math is done in usize on coordinates that have already been checked
// against (or clipped to) width and height, so every product stays below the
// buffer length and every slice range is in bounds.
#![allow(
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

use core::fmt;

use fbdev_color::Color;

use crate::{BufferError, BufferRgb565, BufferRgb888, BufferRgba8888, ColorMode};

/// A 2D array of pixels in one [`ColorMode`].
///
/// Out-of-range single-pixel access is rejected with
/// [`BufferError::OutOfRange`]; area operations ([`fill_rect`](Self::fill_rect),
/// [`write_buffer`](Self::write_buffer)) clip silently instead.
///
/// There is no internal synchronisation: a buffer has one writer at a time.
pub trait PixelBuffer: Send + Sync {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Pixel encoding
    fn color_mode(&self) -> ColorMode;

    /// Raw storage, exactly as it is pushed to the device.
    fn buffer(&self) -> &[u8];

    /// Mutable raw storage.
    fn buffer_mut(&mut self) -> &mut [u8];

    // Encoding hooks: linear indices are unchecked and out-of-range ones
    // are ignored.

    /// Encode `color` into the pixel at linear `index`.
    ///
    /// `index` has already been bounds-checked by the caller.
    #[doc(hidden)]
    fn write_at(&mut self, index: usize, color: Color);

    /// Decode the pixel at linear `index`.
    #[doc(hidden)]
    fn read_at(&self, index: usize) -> Color;

    /// Replace the pixel at linear `index` with its complement.
    #[doc(hidden)]
    fn invert_at(&mut self, index: usize);

    /// Length of [`buffer`](Self::buffer) in bytes.
    fn byte_count(&self) -> usize {
        self.buffer().len()
    }

    /// Bytes per pixel of the active encoding.
    fn bytes_per_pixel(&self) -> usize {
        self.color_mode().bytes_per_pixel()
    }

    /// Linear pixel index of `(x, y)`.
    #[doc(hidden)]
    fn pixel_index(&self, x: u32, y: u32) -> Result<usize, BufferError> {
        let (width, height) = (self.width(), self.height());
        if x < width && y < height {
            Ok(y as usize * width as usize + x as usize)
        } else {
            Err(BufferError::OutOfRange { x, y, width, height })
        }
    }

    /// Encode `color` at `(x, y)`.
    fn set_pixel(&mut self, x: u32, y: u32, color: Color) -> Result<(), BufferError> {
        let index = self.pixel_index(x, y)?;
        self.write_at(index, color);
        Ok(())
    }

    /// Decode the pixel at `(x, y)`.
    fn get_pixel(&self, x: u32, y: u32) -> Result<Color, BufferError> {
        let index = self.pixel_index(x, y)?;
        Ok(self.read_at(index))
    }

    /// Complement the pixel at `(x, y)`.
    fn invert_pixel(&mut self, x: u32, y: u32) -> Result<(), BufferError> {
        let index = self.pixel_index(x, y)?;
        self.invert_at(index);
        Ok(())
    }

    /// Fill the whole buffer with `color`.
    fn fill(&mut self, color: Color) {
        if self.byte_count() == 0 {
            return;
        }
        let bpp = self.bytes_per_pixel();
        self.write_at(0, color);
        let (template, rest) = self.buffer_mut().split_at_mut(bpp);
        for pixel in rest.chunks_exact_mut(bpp) {
            pixel.copy_from_slice(template);
        }
    }

    /// Fill a rectangle, clipped to the buffer.
    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Color) {
        let Some(area) = ClipRect::new(self.width(), self.height(), x, y, width, height) else {
            return;
        };
        let stride = self.width() as usize;
        let bpp = self.bytes_per_pixel();

        let first = area.top * stride + area.left;
        self.write_at(first, color);

        let buf = self.buffer_mut();
        let mut template = [0u8; 4];
        template[..bpp].copy_from_slice(&buf[first * bpp..(first + 1) * bpp]);

        for row in area.top..area.bottom {
            let start = (row * stride + area.left) * bpp;
            let end = (row * stride + area.right) * bpp;
            for pixel in buf[start..end].chunks_exact_mut(bpp) {
                pixel.copy_from_slice(&template[..bpp]);
            }
        }
    }

    /// Reset to the all-zero state (black, zero alpha).
    fn clear(&mut self) {
        self.fill(Color::DEFAULT);
    }

    /// Composite `source` with its top-left corner at `(x, y)`.
    ///
    /// The source is clipped to this buffer. Buffers sharing a color mode are
    /// copied row by row; otherwise every pixel goes through [`Color`].
    fn write_buffer(&mut self, x: i32, y: i32, source: &dyn PixelBuffer) {
        let Some(area) =
            ClipRect::new(self.width(), self.height(), x, y, source.width(), source.height())
        else {
            return;
        };
        let stride = self.width() as usize;
        let src_stride = source.width() as usize;
        // offset of the clipped area inside the source
        let src_left = (area.left as i64 - i64::from(x)) as usize;
        let src_top = (area.top as i64 - i64::from(y)) as usize;
        let span = area.right - area.left;

        if source.color_mode() == self.color_mode() {
            let bpp = self.bytes_per_pixel();
            let src = source.buffer();
            let dst = self.buffer_mut();
            for row in 0..area.bottom - area.top {
                let s = ((src_top + row) * src_stride + src_left) * bpp;
                let d = ((area.top + row) * stride + area.left) * bpp;
                dst[d..d + span * bpp].copy_from_slice(&src[s..s + span * bpp]);
            }
        } else {
            for row in 0..area.bottom - area.top {
                for col in 0..span {
                    let color = source.read_at((src_top + row) * src_stride + src_left + col);
                    self.write_at((area.top + row) * stride + area.left + col, color);
                }
            }
        }
    }
}

impl fmt::Debug for dyn PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("color_mode", &self.color_mode())
            .field("byte_count", &self.byte_count())
            .finish()
    }
}

/// Allocate an empty (all-zero) buffer for `mode`.
pub fn new_buffer(mode: ColorMode, width: u32, height: u32) -> Box<dyn PixelBuffer> {
    match mode {
        ColorMode::Rgb565 => Box::new(BufferRgb565::new(width, height)),
        ColorMode::Rgb888 => Box::new(BufferRgb888::new(width, height)),
        ColorMode::Rgba8888 => Box::new(BufferRgba8888::new(width, height)),
    }
}

/// Backing store shared by the concrete encodings.
#[derive(Clone)]
pub(crate) struct Storage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) bytes: Vec<u8>,
}

impl Storage {
    pub(crate) fn new(width: u32, height: u32, mode: ColorMode) -> Self {
        Self { width, height, bytes: vec![0; byte_len(width, height, mode)] }
    }

    pub(crate) fn from_bytes(
        width: u32,
        height: u32,
        mode: ColorMode,
        bytes: Vec<u8>,
    ) -> Result<Self, BufferError> {
        let expected = byte_len(width, height, mode);
        if bytes.len() != expected {
            return Err(BufferError::SizeMismatch {
                width,
                height,
                mode,
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { width, height, bytes })
    }

    /// Bytes of pixel `index`, or `None` past the end.
    pub(crate) fn pixel(&self, index: usize, bpp: usize) -> Option<&[u8]> {
        self.bytes.get(index * bpp..(index + 1) * bpp)
    }

    pub(crate) fn pixel_mut(&mut self, index: usize, bpp: usize) -> Option<&mut [u8]> {
        self.bytes.get_mut(index * bpp..(index + 1) * bpp)
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn byte_len(width: u32, height: u32, mode: ColorMode) -> usize {
    width as usize * height as usize * mode.bytes_per_pixel()
}

/// Half-open pixel rectangle already clipped to a buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct ClipRect {
    left: usize,
    top: usize,
    right: usize,
    bottom: usize,
}

impl ClipRect {
    fn new(bound_w: u32, bound_h: u32, x: i32, y: i32, width: u32, height: u32) -> Option<Self> {
        let left = i64::from(x).max(0);
        let top = i64::from(y).max(0);
        let right = (i64::from(x) + i64::from(width)).min(i64::from(bound_w));
        let bottom = (i64::from(y) + i64::from(height)).min(i64::from(bound_h));
        if left >= right || top >= bottom {
            return None;
        }
        Some(Self {
            left: left as usize,
            top: top as usize,
            right: right as usize,
            bottom: bottom as usize,
        })
    }
}
