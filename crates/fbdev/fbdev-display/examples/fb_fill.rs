//! Frame-Buffer Color Bars
//!
//! Probes the frame buffer named by `FRAMEBUFFER` (default `/dev/fb0`),
//! paints eight vertical color bars with a gradient strip underneath, and
//! cycles the panel off and on.
//!
//! Run with: RUST_LOG=debug cargo run -p fbdev-display --example fb_fill

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle};
use fbdev_display::{Color, DisplayConfig, FrameBufferDisplay};
use tracing_subscriber::EnvFilter;

const BARS: [Color; 8] = [
    Color::WHITE,
    Color::YELLOW,
    Color::CYAN,
    Color::LIME,
    Color::MAGENTA,
    Color::RED,
    Color::BLUE,
    Color::BLACK,
];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DisplayConfig::from_env();
    let mut display = FrameBufferDisplay::open(config.clone())
        .with_context(|| format!("opening {}", config.device.display()))?;

    let (width, height) = (display.width(), display.height());
    println!(
        "{} {}x{} {} ({} bpp)",
        display.id().unwrap_or("<unnamed>"),
        width,
        height,
        display.color_mode(),
        display.depth()
    );

    let bar_width = (width / 8).max(1);
    let bar_height = height.saturating_mul(3) / 4;
    for (i, color) in (0u32..).zip(BARS) {
        let x = i32::try_from(i.saturating_mul(bar_width)).context("bar offset")?;
        display.fill_rect(x, 0, bar_width, bar_height, color);
    }

    // gray ramp across the bottom quarter
    for x in 0..width {
        let level = x as f32 / width.max(1) as f32;
        let gray = Color::BLACK.blend(Color::WHITE, level);
        let x = i32::try_from(x).context("column")?;
        let y = i32::try_from(bar_height).context("row")?;
        display.fill_rect(x, y, 1, height.saturating_sub(bar_height), gray);
    }

    // embedded-graphics draws straight into the same buffer
    let diameter = bar_height.min(width) / 3;
    Circle::with_center(display.bounding_box().center(), diameter)
        .into_styled(PrimitiveStyle::with_stroke(Rgb888::new(255, 128, 0), 4))
        .draw(&mut display)?;

    display.show().context("pushing frame")?;

    println!("Blanking for 2s");
    display.disable().context("powering down")?;
    thread::sleep(Duration::from_secs(2));
    display.enable().context("powering up")?;

    display.close();
    Ok(())
}
