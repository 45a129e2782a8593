//! Linux Frame-Buffer Display
//!
//! Drives a `/dev/fbN` device: probes its geometry and pixel format with
//! `FBIOGET_FSCREENINFO` / `FBIOGET_VSCREENINFO`, keeps an off-screen
//! [`PixelBuffer`](fbdev_buffer::PixelBuffer) in the matching encoding, and
//! pushes it into a memory mapping of device memory on
//! [`show`](FrameBufferDisplay::show).
//!
//! # Architecture
//!
//! ```text
//! DisplayConfig ──► FrameBufferDisplay ──► PixelBuffer (draw)
//!                        │
//!                        ├─ probe ──► FbBackend::open ─► FbDevice::read_info
//!                        └─ show  ──► FbDevice::map ──► MappedRegion (lazy, once)
//! ```
//!
//! Device access goes through the [`FbBackend`] / [`FbDevice`] /
//! [`MappedRegion`] traits. [`LinuxBackend`] talks to the kernel; the
//! `mock` feature adds a counting in-memory backend for tests.
//!
//! # Example
//!
//! ```no_run
//! use fbdev_display::{Color, DisplayConfig, FrameBufferDisplay};
//!
//! # fn main() -> Result<(), fbdev_display::DisplayError> {
//! let mut display = FrameBufferDisplay::open(DisplayConfig::from_env())?;
//! display.fill(Color::NAVY, false)?;
//! display.fill_rect(10, 10, 100, 50, Color::GOLD);
//! display.show()?;
//! display.close();
//! # Ok(())
//! # }
//! ```

pub mod config;
mod device;
mod display;
mod draw_target;
mod error;
pub mod ioctl;
pub mod mock;
pub mod probe;
pub mod screen_info;

pub use config::{DisplayConfig, Geometry};
pub use device::{FbBackend, FbDevice, LinuxBackend, LinuxDevice, LinuxRegion, MappedRegion};
pub use display::FrameBufferDisplay;
pub use error::DisplayError;
pub use fbdev_buffer::{Color, ColorMode, PixelBuffer};
