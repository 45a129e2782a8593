//! Frame-buffer ioctl request codes

use crate::screen_info::{FixedScreenInfo, ScreenInfo, VariableScreenInfo};

/// The frame-buffer ioctls this crate issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoctlRequest {
    /// `FBIOGET_VSCREENINFO`: read `struct fb_var_screeninfo`
    GetVariableScreenInfo,
    /// `FBIOGET_FSCREENINFO`: read `struct fb_fix_screeninfo`
    GetFixedScreenInfo,
    /// `FBIOBLANK`: set the panel power state, integer argument
    Blank,
}

impl IoctlRequest {
    /// Request number as defined in `<linux/fb.h>`.
    pub const fn code(self) -> u32 {
        match self {
            Self::GetVariableScreenInfo => 0x4600,
            Self::GetFixedScreenInfo => 0x4602,
            Self::Blank => 0x4611,
        }
    }

    /// Bytes the kernel writes for a read request, `None` for [`Blank`](Self::Blank).
    pub const fn payload_size(self) -> Option<usize> {
        match self {
            Self::GetVariableScreenInfo => Some(VariableScreenInfo::SIZE),
            Self::GetFixedScreenInfo => Some(FixedScreenInfo::SIZE),
            Self::Blank => None,
        }
    }
}

/// `FBIOBLANK` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum BlankLevel {
    /// `FB_BLANK_UNBLANK`: panel on
    Unblank = 0,
    /// `FB_BLANK_POWERDOWN`: panel off
    Powerdown = 4,
}

impl BlankLevel {
    /// Integer passed to the ioctl.
    pub const fn arg(self) -> i32 {
        self as i32
    }
}
