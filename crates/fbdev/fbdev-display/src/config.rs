//! Display configuration
//!
//! The device path is an explicit value handed to the display. The
//! `FRAMEBUFFER` environment variable is consulted only by
//! [`DisplayConfig::from_env`], once, by whoever builds the config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use fbdev_buffer::ColorMode;

/// Frame-buffer node used when nothing else is configured.
pub const DEFAULT_DEVICE: &str = "/dev/fb0";

/// Environment variable overriding [`DEFAULT_DEVICE`].
pub const DEVICE_ENV_VAR: &str = "FRAMEBUFFER";

/// How long [`enable`](crate::FrameBufferDisplay::enable) waits for the panel
/// to power up.
pub const ENABLE_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Where the display geometry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// Query the device for resolution and pixel format.
    Autoprobe,
    /// Trust the caller; no ioctl is issued at construction.
    Explicit {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
        /// Pixel encoding
        mode: ColorMode,
    },
}

/// Everything needed to construct a [`FrameBufferDisplay`](crate::FrameBufferDisplay).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Device node path
    pub device: PathBuf,
    /// Geometry source
    pub geometry: Geometry,
    /// Delay after unblanking
    pub settle_delay: Duration,
}

impl DisplayConfig {
    /// Autoprobe the device at `path`.
    pub fn autoprobe(path: impl AsRef<Path>) -> Self {
        Self {
            device: path.as_ref().to_path_buf(),
            geometry: Geometry::Autoprobe,
            settle_delay: ENABLE_SETTLE_DELAY,
        }
    }

    /// Use a fixed geometry for the device at `path`.
    pub fn explicit(path: impl AsRef<Path>, width: u32, height: u32, mode: ColorMode) -> Self {
        Self {
            geometry: Geometry::Explicit { width, height, mode },
            ..Self::autoprobe(path)
        }
    }

    /// Autoprobe the device named by `FRAMEBUFFER`, or `/dev/fb0`.
    pub fn from_env() -> Self {
        let device = std::env::var_os(DEVICE_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DEVICE), PathBuf::from);
        Self::autoprobe(device)
    }

    /// Override the post-unblank delay.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::autoprobe(DEFAULT_DEVICE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_autoprobe_fb0() {
        let config = DisplayConfig::default();
        assert_eq!(config.device, PathBuf::from("/dev/fb0"));
        assert_eq!(config.geometry, Geometry::Autoprobe);
        assert_eq!(config.settle_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_explicit_keeps_geometry() {
        let config = DisplayConfig::explicit("/dev/fb1", 320, 240, ColorMode::Rgb565)
            .with_settle_delay(Duration::ZERO);
        assert_eq!(config.device, PathBuf::from("/dev/fb1"));
        assert_eq!(
            config.geometry,
            Geometry::Explicit { width: 320, height: 240, mode: ColorMode::Rgb565 }
        );
        assert_eq!(config.settle_delay, Duration::ZERO);
    }

    // The only test in the crate touching the process environment.
    #[test]
    fn test_from_env_override_and_fallback() {
        std::env::set_var(DEVICE_ENV_VAR, "/dev/fb7");
        assert_eq!(DisplayConfig::from_env().device, PathBuf::from("/dev/fb7"));

        std::env::remove_var(DEVICE_ENV_VAR);
        assert_eq!(DisplayConfig::from_env().device, PathBuf::from(DEFAULT_DEVICE));
    }
}
