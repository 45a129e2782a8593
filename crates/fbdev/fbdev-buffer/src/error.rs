//! Pixel buffer errors

use crate::ColorMode;

/// Errors raised by [`PixelBuffer`](crate::PixelBuffer) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// Coordinates fall outside the buffer
    #[error("pixel ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfRange {
        /// Requested column
        x: u32,
        /// Requested row
        y: u32,
        /// Buffer width
        width: u32,
        /// Buffer height
        height: u32,
    },

    /// Supplied storage does not match the geometry
    #[error("{width}x{height} {mode} needs {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Buffer width
        width: u32,
        /// Buffer height
        height: u32,
        /// Encoding
        mode: ColorMode,
        /// `width * height * bytes_per_pixel`
        expected: usize,
        /// Length of the supplied storage
        actual: usize,
    },
}
