//! Hue-based color space conversions
//!
//! Two independent cylinder models are provided and they are **not**
//! interchangeable:
//!
//! - [`hsl_to_rgb`]: lightness-midpoint algorithm with sextant interpolation
//!   (backs [`Color::from_hsb`](crate::Color::from_hsb)).
//! - [`hsv_to_rgb`]: floor / fractional-sextant algorithm with `pv`/`qv`/`tv`
//!   intermediate terms (backs [`Color::from_ahsv`](crate::Color::from_ahsv)).

// Sextant indices are derived from hue / 60 with hue already reduced below 360,
// so the f32 → i32 casts cannot overflow. All outputs are clamped to [0, 1].
#![allow(
    clippy::cast_possible_truncation,
    clippy::arithmetic_side_effects,
    clippy::many_single_char_names
)]

/// Hue, saturation and brightness of a color.
///
/// `hue` is in degrees `[0, 360)`; `saturation` and `brightness` are in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hsb {
    /// Hue in degrees
    pub hue: f32,
    /// Saturation (0-1)
    pub saturation: f32,
    /// Brightness / lightness (0-1)
    pub brightness: f32,
}

impl Hsb {
    /// Build a normalised triple: hue wrapped into `[0, 360)`, the rest clamped.
    pub fn new(hue: f32, saturation: f32, brightness: f32) -> Self {
        Self {
            hue: wrap_degrees(hue),
            saturation: clamp_unit(saturation),
            brightness: clamp_unit(brightness),
        }
    }
}

/// HSL to RGB.
///
/// `hue` is in degrees; negative hues are treated as 0 and hues of 360 or more
/// wrap. Returns `(r, g, b)` each in `[0, 1]`.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> (f32, f32, f32) {
    let mut h = hue;
    if h < 0.0 {
        h = 0.0;
    } else if h >= 360.0 {
        h = libm::fmodf(h, 360.0);
    }

    // default to gray
    let (mut r, mut g, mut b) = (lightness, lightness, lightness);

    let v = if lightness <= 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };

    if v > 0.0 {
        let m = lightness + lightness - v;
        let sv = (v - m) / v;
        h /= 60.0;
        let sextant = h as i32;
        let fract = h - sextant as f32;
        let vsf = v * sv * fract;
        let mid1 = m + vsf;
        let mid2 = v - vsf;

        match sextant {
            0 => (r, g, b) = (v, mid1, m),
            1 => (r, g, b) = (mid2, v, m),
            2 => (r, g, b) = (m, v, mid1),
            3 => (r, g, b) = (m, mid2, v),
            4 => (r, g, b) = (mid1, m, v),
            5 => (r, g, b) = (v, m, mid2),
            _ => {}
        }
    }

    (clamp_unit(r), clamp_unit(g), clamp_unit(b))
}

/// HSV to RGB.
///
/// `hue` is in degrees; negative hues are treated as 0 and hues above 360
/// wrap. Returns `(r, g, b)` each in `[0, 1]`.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> (f32, f32, f32) {
    let mut h = hue;
    if h < 0.0 {
        h = 0.0;
    } else if h > 360.0 {
        h = libm::fmodf(h, 360.0);
    }

    let (r, g, b) = if value <= 0.0 {
        (0.0, 0.0, 0.0)
    } else if saturation <= 0.0 {
        // no saturation, no hue: grayscale
        (value, value, value)
    } else {
        let hf = h / 60.0;
        let i = libm::floorf(hf) as i32;
        let f = hf - i as f32;
        let pv = value * (1.0 - saturation);
        let qv = value * (1.0 - saturation * f);
        let tv = value * (1.0 - saturation * (1.0 - f));

        match i {
            // red dominant
            0 => (value, tv, pv),
            // green dominant
            1 => (qv, value, pv),
            2 => (pv, value, tv),
            // blue dominant
            3 => (pv, qv, value),
            4 => (tv, pv, value),
            // back to red
            5 => (value, pv, qv),
            // hue landed exactly on 360 or slipped below 0
            6 => (value, tv, pv),
            -1 => (value, pv, qv),
            _ => (value, value, value),
        }
    };

    (clamp_unit(r), clamp_unit(g), clamp_unit(b))
}

/// RGB (each `[0, 1]`) to hue/saturation/lightness.
pub fn rgb_to_hsb(r: f32, g: f32, b: f32) -> Hsb {
    let v = r.max(g).max(b);
    let m = r.min(g).min(b);

    let l = (m + v) / 2.0;
    if l <= 0.0 {
        return Hsb { hue: 0.0, saturation: 0.0, brightness: 0.0 };
    }

    let vm = v - m;
    if vm <= 0.0 {
        return Hsb { hue: 0.0, saturation: 0.0, brightness: l };
    }
    let s = vm / if l <= 0.5 { v + m } else { 2.0 - v - m };

    let r2 = (v - r) / vm;
    let g2 = (v - g) / vm;
    let b2 = (v - b) / vm;

    #[allow(clippy::float_cmp)] // v and m are copies of one of the inputs
    let h = if r == v {
        if g == m {
            5.0 + b2
        } else {
            1.0 - g2
        }
    } else if g == v {
        if b == m {
            1.0 + r2
        } else {
            3.0 - b2
        }
    } else if r == m {
        3.0 + g2
    } else {
        5.0 - r2
    };

    Hsb::new(h * 60.0, s, l)
}

/// Wrap an angle into `[0, 360)`.
pub(crate) fn wrap_degrees(deg: f32) -> f32 {
    if !deg.is_finite() {
        return 0.0;
    }
    let wrapped = libm::fmodf(deg, 360.0);
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // -1e-9 + 360.0 rounds back up to 360.0 in f32
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub(crate) fn clamp_unit(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}
