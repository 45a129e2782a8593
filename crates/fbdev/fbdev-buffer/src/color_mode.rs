//! Supported pixel encodings

use core::fmt;

/// Pixel encoding of a [`PixelBuffer`](crate::PixelBuffer).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// 16 bits per pixel, 5-6-5, little-endian word
    Rgb565,
    /// 24 bits per pixel, bytes `R, G, B`
    Rgb888,
    /// 32 bits per pixel, bytes `R, G, B, A`
    Rgba8888,
}

impl ColorMode {
    /// Every mode a frame-buffer display can drive.
    pub const ALL: [ColorMode; 3] = [ColorMode::Rgb565, ColorMode::Rgb888, ColorMode::Rgba8888];

    /// Bits per pixel as reported by the kernel.
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Rgb565 => 16,
            Self::Rgb888 => 24,
            Self::Rgba8888 => 32,
        }
    }

    /// Bytes occupied by one pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb565 => 2,
            Self::Rgb888 => 3,
            Self::Rgba8888 => 4,
        }
    }

    /// Mode for a bits-per-pixel value, if supported.
    pub const fn from_bits_per_pixel(bpp: u32) -> Option<Self> {
        match bpp {
            16 => Some(Self::Rgb565),
            24 => Some(Self::Rgb888),
            32 => Some(Self::Rgba8888),
            _ => None,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rgb565 => "RGB565",
            Self::Rgb888 => "RGB888",
            Self::Rgba8888 => "RGBA8888",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bpp_round_trip() {
        for mode in ColorMode::ALL {
            assert_eq!(ColorMode::from_bits_per_pixel(mode.bits_per_pixel()), Some(mode));
            assert_eq!(mode.bits_per_pixel() as usize, mode.bytes_per_pixel() * 8);
        }
    }

    #[test]
    fn test_unsupported_depths() {
        for bpp in [0, 1, 8, 12, 15, 18, 64] {
            assert_eq!(ColorMode::from_bits_per_pixel(bpp), None);
        }
    }
}
