//! Property-based tests for pixel buffers.
//! Clipping and compositing must hold for every origin and size, including
//! rectangles hanging off any edge.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use fbdev_buffer::{new_buffer, BufferError, BufferRgb565, Color, ColorMode, PixelBuffer};
use proptest::prelude::*;

fn any_mode() -> impl Strategy<Value = ColorMode> {
    prop_oneof![Just(ColorMode::Rgb565), Just(ColorMode::Rgb888), Just(ColorMode::Rgba8888)]
}

/// What a mode stores for `c`.
fn stored(mode: ColorMode, c: Color) -> Color {
    match mode {
        ColorMode::Rgb565 => Color::rgb(c.r() & 0xF8, c.g() & 0xFC, c.b() & 0xF8),
        ColorMode::Rgb888 => Color::rgb(c.r(), c.g(), c.b()),
        ColorMode::Rgba8888 => c,
    }
}

fn inside(x: i64, y: i64, rx: i32, ry: i32, w: u32, h: u32) -> bool {
    x >= i64::from(rx) && x < i64::from(rx) + i64::from(w) && y >= i64::from(ry) && y < i64::from(ry) + i64::from(h)
}

proptest! {
    /// get_pixel returns what set_pixel stored, up to the mode's precision.
    #[test]
    fn set_then_get(mode in any_mode(), x in 0u32..16, y in 0u32..16, argb in any::<u32>()) {
        let mut buf = new_buffer(mode, 16, 16);
        let c = Color::from_argb(argb);
        buf.set_pixel(x, y, c).unwrap();
        prop_assert_eq!(buf.get_pixel(x, y).unwrap(), stored(mode, c));
    }

    /// fill_rect touches exactly the clipped rectangle.
    #[test]
    fn fill_rect_is_clipped(
        mode in any_mode(),
        rx in -20i32..30, ry in -20i32..30,
        w in 0u32..40, h in 0u32..40,
    ) {
        let mut buf = new_buffer(mode, 12, 10);
        buf.fill_rect(rx, ry, w, h, Color::WHITE);
        for y in 0..10u32 {
            for x in 0..12u32 {
                let expect = if inside(i64::from(x), i64::from(y), rx, ry, w, h) {
                    stored(mode, Color::WHITE)
                } else {
                    Color::DEFAULT
                };
                let got = buf.get_pixel(x, y).unwrap();
                prop_assert_eq!((got.r(), got.g(), got.b()), (expect.r(), expect.g(), expect.b()),
                    "pixel ({}, {})", x, y);
            }
        }
    }

    /// write_buffer places source pixels at the offset and clips the rest.
    #[test]
    fn write_buffer_offsets_and_clips(
        dst_mode in any_mode(), src_mode in any_mode(),
        ox in -10i32..14, oy in -10i32..14,
    ) {
        let mut src = new_buffer(src_mode, 6, 5);
        for y in 0..5u32 {
            for x in 0..6u32 {
                src.set_pixel(x, y, Color::rgb((x * 40) as u8, (y * 50) as u8, 200)).unwrap();
            }
        }
        let mut dst = new_buffer(dst_mode, 8, 8);
        dst.write_buffer(ox, oy, &*src);

        for y in 0..8u32 {
            for x in 0..8u32 {
                let sx = i64::from(x) - i64::from(ox);
                let sy = i64::from(y) - i64::from(oy);
                let got = dst.get_pixel(x, y).unwrap();
                if (0..6).contains(&sx) && (0..5).contains(&sy) {
                    let from_src = src.get_pixel(sx as u32, sy as u32).unwrap();
                    let expect = stored(dst_mode, from_src);
                    prop_assert_eq!((got.r(), got.g(), got.b()), (expect.r(), expect.g(), expect.b()));
                } else {
                    prop_assert_eq!((got.r(), got.g(), got.b()), (0, 0, 0));
                }
            }
        }
    }

    /// Inverting twice is the identity on stored data.
    #[test]
    fn invert_twice(mode in any_mode(), argb in any::<u32>()) {
        let mut buf = new_buffer(mode, 2, 2);
        buf.fill(Color::from_argb(argb));
        let before = buf.buffer().to_vec();
        buf.invert_pixel(1, 1).unwrap();
        buf.invert_pixel(1, 1).unwrap();
        prop_assert_eq!(buf.buffer(), &before[..]);
    }

    /// Anything outside the buffer is rejected, never wrapped.
    #[test]
    fn out_of_range_rejected(mode in any_mode(), x in 5u32..1000, y in 0u32..1000) {
        let mut buf = new_buffer(mode, 5, 5);
        let err = BufferError::OutOfRange { x, y, width: 5, height: 5 };
        prop_assert_eq!(buf.set_pixel(x, y, Color::WHITE), Err(err));
        prop_assert_eq!(buf.get_pixel(x, y), Err(err));
        prop_assert_eq!(buf.invert_pixel(x, y), Err(err));
        prop_assert!(buf.buffer().iter().all(|&b| b == 0));
    }
}

#[test]
fn same_mode_copy_is_byte_exact() {
    let mut src = BufferRgb565::new(3, 3);
    src.fill(Color::CORNFLOWER_BLUE);
    src.set_pixel(1, 1, Color::RED).unwrap();

    let mut dst = BufferRgb565::new(3, 3);
    dst.write_buffer(0, 0, &src);
    assert_eq!(dst.buffer(), src.buffer());
}

#[test]
fn rgba_source_alpha_is_copied_not_blended() {
    let mut src = new_buffer(ColorMode::Rgba8888, 1, 1);
    src.set_pixel(0, 0, Color::new(10, 20, 30, 0)).unwrap();
    let mut dst = new_buffer(ColorMode::Rgba8888, 1, 1);
    dst.fill(Color::WHITE);
    dst.write_buffer(0, 0, &*src);
    assert_eq!(dst.get_pixel(0, 0).unwrap(), Color::new(10, 20, 30, 0));
}

#[test]
fn from_bytes_rejects_wrong_length() {
    let err = BufferRgb565::from_bytes(4, 4, vec![0; 31]).unwrap_err();
    assert!(matches!(err, BufferError::SizeMismatch { expected: 32, actual: 31, .. }));
    assert_eq!(err.to_string(), "4x4 RGB565 needs 32 bytes, got 31");
}
