//! Display errors

use std::io;
use std::path::PathBuf;

use fbdev_buffer::BufferError;

use crate::screen_info::BitField;

/// Errors raised while probing, mapping or writing a frame-buffer device.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    /// The device node could not be opened
    #[error("failed to open {}", .path.display())]
    Open {
        /// Device path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The variable screen info could not be read
    #[error("failed to autoprobe the display")]
    Autoprobe {
        /// Device path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The device reports a depth with no matching buffer encoding
    #[error(
        "autoprobe could not identify color mode (bpp:{bpp}, r:{red}, g:{green}, b:{blue}, a:{transp})"
    )]
    UnsupportedMode {
        /// Reported bits per pixel
        bpp: u32,
        /// Red channel `length/offset`
        red: BitField,
        /// Green channel `length/offset`
        green: BitField,
        /// Blue channel `length/offset`
        blue: BitField,
        /// Transparency channel `length/offset`
        transp: BitField,
    },

    /// Device memory could not be mapped
    #[error("failed to map {len} bytes of {}", .path.display())]
    Map {
        /// Device path
        path: PathBuf,
        /// Requested length
        len: usize,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Written bytes could not be pushed to the device
    #[error("failed to flush the frame")]
    Flush(#[source] io::Error),

    /// The display was closed
    #[error("display is closed")]
    Closed,

    /// A drawing call was rejected by the pixel buffer
    #[error(transparent)]
    Buffer(#[from] BufferError),
}
