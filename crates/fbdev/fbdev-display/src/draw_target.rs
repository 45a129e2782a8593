//! `embedded-graphics` integration
//!
//! Lets primitives, text and images from the `embedded-graphics` ecosystem
//! render straight into the display's pixel buffer. Nothing reaches the
//! device until [`show`](crate::FrameBufferDisplay::show).

use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::device::FbBackend;
use crate::FrameBufferDisplay;

impl<B: FbBackend> DrawTarget for FrameBufferDisplay<B> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let buffer = self.pixel_buffer_mut();
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            // off-screen pixels are dropped, as DrawTarget requires
            let _ = buffer.set_pixel(x, y, color.into());
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(area.top_left.x, area.top_left.y, area.size.width, area.size.height, color.into());
        Ok(())
    }
}

impl<B: FbBackend> OriginDimensions for FrameBufferDisplay<B> {
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use embedded_graphics::primitives::{Line, PrimitiveStyle};
    use fbdev_buffer::Color;

    use super::*;
    use crate::mock::MockBackend;
    use crate::DisplayConfig;

    fn display(width: u32, height: u32) -> FrameBufferDisplay<MockBackend> {
        let config = DisplayConfig::autoprobe("/dev/fb0").with_settle_delay(Duration::ZERO);
        FrameBufferDisplay::with_backend(MockBackend::truecolor(width, height, 24), config).unwrap()
    }

    #[test]
    fn test_size_matches_buffer() {
        let display = display(320, 240);
        assert_eq!(display.size(), Size::new(320, 240));
        assert_eq!(display.bounding_box(), Rectangle::new(Point::zero(), Size::new(320, 240)));
    }

    #[test]
    fn test_rectangle_is_clipped() {
        let mut display = display(8, 8);
        Rectangle::new(Point::new(-4, 6), Size::new(6, 6))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::new(10, 20, 30)))
            .draw(&mut display)
            .unwrap();

        let buf = display.pixel_buffer();
        assert_eq!(buf.get_pixel(0, 7).unwrap(), Color::rgb(10, 20, 30));
        assert_eq!(buf.get_pixel(1, 6).unwrap(), Color::rgb(10, 20, 30));
        assert_eq!(buf.get_pixel(2, 6).unwrap(), Color::BLACK);
    }

    #[test]
    fn test_offscreen_pixels_are_ignored() {
        let mut display = display(4, 4);
        Line::new(Point::new(-2, 1), Point::new(6, 1))
            .into_styled(PrimitiveStyle::with_stroke(Rgb888::WHITE, 1))
            .draw(&mut display)
            .unwrap();

        for x in 0..4 {
            assert_eq!(display.pixel_buffer().get_pixel(x, 1).unwrap(), Color::WHITE);
        }
        assert_eq!(display.pixel_buffer().get_pixel(0, 0).unwrap(), Color::BLACK);
    }
}
