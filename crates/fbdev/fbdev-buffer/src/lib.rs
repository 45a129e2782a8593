//! Frame-Buffer Pixel Buffers
//!
//! Off-screen pixel storage in the three layouts Linux frame-buffer drivers
//! commonly expose.
//!
//! | Mode                      | Bytes | Layout                      |
//! |---------------------------|-------|-----------------------------|
//! | [`ColorMode::Rgb565`]     | 2     | little-endian `u16` 5-6-5   |
//! | [`ColorMode::Rgb888`]     | 3     | `R, G, B`                   |
//! | [`ColorMode::Rgba8888`]   | 4     | `R, G, B, A`                |
//!
//! Every buffer implements [`PixelBuffer`], so callers can hold a
//! `Box<dyn PixelBuffer>` chosen at runtime with [`new_buffer`] and composite
//! buffers of different modes into each other.
//!
//! # Example
//!
//! ```
//! use fbdev_buffer::{new_buffer, Color, ColorMode, PixelBuffer};
//!
//! let mut screen = new_buffer(ColorMode::Rgb565, 320, 240);
//! let mut sprite = new_buffer(ColorMode::Rgba8888, 16, 16);
//! sprite.fill(Color::ORANGE);
//!
//! // partially off-screen: clipped, not an error
//! screen.write_buffer(-8, 230, &*sprite);
//! assert_eq!(screen.get_pixel(0, 239).unwrap(), Color::rgb(0xF8, 0xA4, 0x00));
//! assert_eq!(screen.get_pixel(8, 239).unwrap(), Color::BLACK);
//! ```

mod color_mode;
mod error;
mod pixel_buffer;
mod rgb565;
mod rgb888;
mod rgba8888;

pub use color_mode::ColorMode;
pub use error::BufferError;
pub use fbdev_color::Color;
pub use pixel_buffer::{new_buffer, PixelBuffer};
pub use rgb565::BufferRgb565;
pub use rgb888::BufferRgb888;
pub use rgba8888::BufferRgba8888;
