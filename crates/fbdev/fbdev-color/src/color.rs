//! 32-bit RGBA color value

// Channel math works on u8 values widened to u16/u32 or on floats in [0, 255];
// every narrowing cast is either masked first or saturates by definition of `as`.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::arithmetic_side_effects
)]

use core::fmt;
use core::hash::{Hash, Hasher};

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::RgbColor;

use crate::hsx::{hsl_to_rgb, hsv_to_rgb, rgb_to_hsb, Hsb};

/// Hex notation accepted by [`Color::from_hex`] and produced by [`Color::to_hex`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HexFormat {
    /// `#rgb`, one nibble per channel and alpha implied 255
    Rgb,
    /// `#argb`, one nibble per channel with alpha first
    Argb,
    /// `#rrggbb`, alpha implied 255
    Rrggbb,
    /// `#aarrggbb`
    Aarrggbb,
}

impl HexFormat {
    /// Number of hex digits (without `#`).
    pub const fn digits(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Argb => 4,
            Self::Rrggbb => 6,
            Self::Aarrggbb => 8,
        }
    }
}

/// Immutable RGBA color.
///
/// Equality and hashing only consider the four channels. Hue, saturation and
/// brightness are derived on demand; a color built from HSB keeps the values it
/// was built from so [`Color::with_hue`] and friends do not drift.
#[derive(Debug, Copy, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
    #[cfg_attr(feature = "serde", serde(skip))]
    hsb: Option<Hsb>,
}

impl Color {
    /// Black with zero alpha.
    pub const DEFAULT: Color = Color::new(0, 0, 0, 0);

    /// Create a color from explicit channel bytes.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a, hsb: None }
    }

    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color from normalised floats.
    ///
    /// Each channel is `(x * 255) as u8`: values outside `[0, 1]` saturate and
    /// NaN maps to 0.
    pub fn from_floats(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::new(unit_to_byte(r), unit_to_byte(g), unit_to_byte(b), unit_to_byte(a))
    }

    /// Create a color from hue (degrees), saturation and brightness using the
    /// HSL model.
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32, alpha: u8) -> Self {
        let (r, g, b) = hsl_to_rgb(hue, saturation, brightness);
        Self {
            r: unit_to_byte(r),
            g: unit_to_byte(g),
            b: unit_to_byte(b),
            a: alpha,
            hsb: Some(Hsb::new(hue, saturation, brightness)),
        }
    }

    /// Create a color from alpha (0-1), hue (degrees), saturation and value
    /// using the HSV model.
    pub fn from_ahsv(alpha: f32, hue: f32, saturation: f32, value: f32) -> Self {
        let (r, g, b) = hsv_to_rgb(hue, saturation, value);
        Self::from_floats(r, g, b, alpha)
    }

    /// Parse `#rgb`, `#argb`, `#rrggbb` or `#aarrggbb` (the `#` is optional).
    ///
    /// Short forms double each nibble (`#f80` → `#ff8800`). Any other length
    /// yields [`Color::DEFAULT`]; non-hex digits read as 0.
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.strip_prefix('#').unwrap_or(hex).as_bytes();

        match *digits {
            [r, g, b] => Self::rgb(doubled(r), doubled(g), doubled(b)),
            [a, r, g, b] => Self::new(doubled(r), doubled(g), doubled(b), doubled(a)),
            [r1, r2, g1, g2, b1, b2] => Self::rgb(pair(r1, r2), pair(g1, g2), pair(b1, b2)),
            [a1, a2, r1, r2, g1, g2, b1, b2] => {
                Self::new(pair(r1, r2), pair(g1, g2), pair(b1, b2), pair(a1, a2))
            }
            _ => Self::DEFAULT,
        }
    }

    /// Unpack `0xAARRGGBB`.
    pub const fn from_argb(argb: u32) -> Self {
        Self::new(
            ((argb & 0x00ff_0000) >> 16) as u8,
            ((argb & 0x0000_ff00) >> 8) as u8,
            (argb & 0x0000_00ff) as u8,
            ((argb & 0xff00_0000) >> 24) as u8,
        )
    }

    /// Pack into `0xAARRGGBB`.
    pub const fn to_argb(&self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Red channel
    pub const fn r(&self) -> u8 {
        self.r
    }

    /// Green channel
    pub const fn g(&self) -> u8 {
        self.g
    }

    /// Blue channel
    pub const fn b(&self) -> u8 {
        self.b
    }

    /// Alpha channel
    pub const fn a(&self) -> u8 {
        self.a
    }

    fn hsb(&self) -> Hsb {
        match self.hsb {
            Some(hsb) => hsb,
            None => rgb_to_hsb(
                f32::from(self.r) / 255.0,
                f32::from(self.g) / 255.0,
                f32::from(self.b) / 255.0,
            ),
        }
    }

    /// Hue in degrees `[0, 360)`.
    pub fn hue(&self) -> f32 {
        self.hsb().hue
    }

    /// Saturation `[0, 1]`.
    pub fn saturation(&self) -> f32 {
        self.hsb().saturation
    }

    /// Brightness (HSL lightness) `[0, 1]`.
    pub fn brightness(&self) -> f32 {
        self.hsb().brightness
    }

    /// Same saturation, brightness and alpha with a new hue (degrees).
    pub fn with_hue(&self, hue: f32) -> Self {
        let hsb = self.hsb();
        Self::from_hsb(hue, hsb.saturation, hsb.brightness, self.a)
    }

    /// Same hue, brightness and alpha with a new saturation.
    pub fn with_saturation(&self, saturation: f32) -> Self {
        let hsb = self.hsb();
        Self::from_hsb(hsb.hue, saturation, hsb.brightness, self.a)
    }

    /// Same hue, saturation and alpha with a new brightness.
    pub fn with_brightness(&self, brightness: f32) -> Self {
        let hsb = self.hsb();
        Self::from_hsb(hsb.hue, hsb.saturation, brightness, self.a)
    }

    /// 8bpp luminance: `0.2989 R + 0.5870 G + 0.114 B`, truncated.
    pub fn gray8(&self) -> u8 {
        (0.2989 * f64::from(self.r) + 0.5870 * f64::from(self.g) + 0.114 * f64::from(self.b)) as u8
    }

    /// 4bpp luminance (upper nibble of [`Color::gray8`]).
    pub fn gray4(&self) -> u8 {
        self.gray8() >> 4
    }

    /// 1bpp: lit when any color channel is non-zero.
    pub const fn is_lit(&self) -> bool {
        self.r > 0 || self.g > 0 || self.b > 0
    }

    /// Packed RGB 3-3-2.
    pub const fn rgb332(&self) -> u8 {
        (self.r & 0b1110_0000) | ((self.g & 0b1110_0000) >> 3) | (self.b >> 6)
    }

    /// Packed RGB 4-4-4 in the low 12 bits.
    pub const fn rgb444(&self) -> u16 {
        ((self.r as u16 & 0b1111_0000) << 4) | (self.g as u16 & 0b1111_0000) | (self.b as u16 >> 4)
    }

    /// Packed RGB 5-6-5.
    pub const fn rgb565(&self) -> u16 {
        ((self.r as u16 & 0b1111_1000) << 8) | ((self.g as u16 & 0b1111_1100) << 3) | (self.b as u16 >> 3)
    }

    /// Complement every color channel, keeping alpha.
    pub const fn inverted(&self) -> Self {
        Self::new(255 - self.r, 255 - self.g, 255 - self.b, self.a)
    }

    /// Linear interpolation towards `other`.
    ///
    /// `ratio == 0` returns `self` and `ratio == 1` returns `other` untouched;
    /// in between every channel, alpha included, is
    /// `self * (1 - ratio) + other * ratio`, truncated.
    #[allow(clippy::float_cmp)]
    pub fn blend(&self, other: Color, ratio: f32) -> Color {
        if ratio == 0.0 {
            return *self;
        }
        if ratio == 1.0 {
            return other;
        }

        let mix = |from: u8, to: u8| (f32::from(from) * (1.0 - ratio) + f32::from(to) * ratio) as u8;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Render as upper-case hex with a leading `#`.
    ///
    /// Short formats keep the high nibble of each channel.
    pub fn to_hex(&self, format: HexFormat) -> heapless::String<9> {
        use core::fmt::Write;

        let mut out = heapless::String::new();
        // 9 bytes is the longest form ("#AARRGGBB"); writes cannot overflow
        let _ = match format {
            HexFormat::Rgb => write!(out, "#{:X}{:X}{:X}", self.r >> 4, self.g >> 4, self.b >> 4),
            HexFormat::Argb => write!(
                out,
                "#{:X}{:X}{:X}{:X}",
                self.a >> 4,
                self.r >> 4,
                self.g >> 4,
                self.b >> 4
            ),
            HexFormat::Rrggbb => write!(out, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b),
            HexFormat::Aarrggbb => write!(
                out,
                "#{:02X}{:02X}{:02X}{:02X}",
                self.a, self.r, self.g, self.b
            ),
        };
        out
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b && self.a == other.a
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_argb().hash(state);
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex(HexFormat::Aarrggbb))
    }
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Self::from_argb(argb)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.to_argb()
    }
}

impl From<Rgb888> for Color {
    fn from(c: Rgb888) -> Self {
        Self::rgb(c.r(), c.g(), c.b())
    }
}

impl From<Color> for Rgb888 {
    fn from(c: Color) -> Self {
        Rgb888::new(c.r, c.g, c.b)
    }
}

impl From<Rgb565> for Color {
    fn from(c: Rgb565) -> Self {
        Self::rgb(c.r() << 3, c.g() << 2, c.b() << 3)
    }
}

impl From<Color> for Rgb565 {
    fn from(c: Color) -> Self {
        Rgb565::new(c.r >> 3, c.g >> 2, c.b >> 3)
    }
}

fn unit_to_byte(x: f32) -> u8 {
    (x * 255.0) as u8
}

fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

fn doubled(c: u8) -> u8 {
    let n = nibble(c);
    (n << 4) | n
}

fn pair(hi: u8, lo: u8) -> u8 {
    (nibble(hi) << 4) | nibble(lo)
}
