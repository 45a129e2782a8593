//! Frame-Buffer Color Model
//!
//! A fixed-point RGBA color value with lossless channel storage and the
//! derived encodings a pixel pipeline needs.
//!
//! # Features
//!
//! - **no_std compatible** - pure value type, float math via `libm`
//! - **Constructors** - bytes, normalised floats, HSL (`from_hsb`), HSV
//!   (`from_ahsv`), hex strings and packed `0xAARRGGBB`
//! - **Encodings** - 8/4bpp grayscale, RGB332, RGB444, RGB565, 1bpp
//! - **Blending** - per-channel linear interpolation
//! - **Palette** - the 141 WPF/CSS named colors as constants
//! - **Serde support** - optional, behind the `serde` feature
//!
//! # Example
//!
//! ```
//! use fbdev_color::{Color, HexFormat};
//!
//! let accent = Color::from_hex("#6495ED");
//! assert_eq!(accent, Color::CORNFLOWER_BLUE);
//! assert_eq!(accent.rgb565(), 0x64BD);
//!
//! let dimmed = accent.with_brightness(0.25);
//! assert_eq!(dimmed.a(), 255);
//!
//! let halfway = Color::BLACK.blend(Color::WHITE, 0.5);
//! assert_eq!(halfway.to_hex(HexFormat::Rrggbb).as_str(), "#7F7F7F");
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod color;
pub mod hsx;
mod named;

pub use color::{Color, HexFormat};
pub use hsx::{hsl_to_rgb, hsv_to_rgb, rgb_to_hsb, Hsb};
