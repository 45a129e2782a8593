//! Device capability probe
//!
//! Opens the device, reads fixed and variable screen info, and picks the
//! buffer encoding from the reported depth. The device is closed again before
//! [`probe`] returns; mapping happens later and separately.
//!
//! Only the variable info is required. Without the fixed info the display
//! still works, it just has no identity ([`ProbeStatus::Degraded`]).

use std::io;
use std::path::Path;

use fbdev_buffer::ColorMode;

use crate::device::{FbBackend, FbDevice};
use crate::ioctl::IoctlRequest;
use crate::screen_info::{FixedScreenInfo, ScreenInfo, VariableScreenInfo};
use crate::DisplayError;

/// How much of the device could be identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Fixed and variable info were both read.
    Complete,
    /// Only the variable info was read; the device has no identity.
    Degraded,
}

/// Everything learned from one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Trimmed driver identification, when fixed info was available
    pub id: Option<String>,
    /// Fixed screen info, when the ioctl succeeded
    pub fixed: Option<FixedScreenInfo>,
    /// Variable screen info
    pub variable: VariableScreenInfo,
    /// Encoding chosen from `variable.bits_per_pixel`
    pub mode: ColorMode,
}

impl ProbeReport {
    /// Whether the fixed info was read.
    pub fn status(&self) -> ProbeStatus {
        if self.fixed.is_some() {
            ProbeStatus::Complete
        } else {
            ProbeStatus::Degraded
        }
    }

    /// Visible width in pixels
    pub fn width(&self) -> u32 {
        self.variable.xres
    }

    /// Visible height in pixels
    pub fn height(&self) -> u32 {
        self.variable.yres
    }

    /// Bits per pixel
    pub fn depth(&self) -> u32 {
        self.variable.bits_per_pixel
    }
}

/// Query the device at `path`.
pub fn probe<B: FbBackend>(backend: &B, path: &Path) -> Result<ProbeReport, DisplayError> {
    let mut device = backend
        .open(path)
        .map_err(|source| DisplayError::Open { path: path.to_path_buf(), source })?;

    let fixed = match read::<FixedScreenInfo, _>(&mut device, IoctlRequest::GetFixedScreenInfo) {
        Ok(info) => {
            tracing::debug!(
                id = %info.id_str(),
                smem_start = info.smem_start,
                smem_len = info.smem_len,
                "display memory region"
            );
            Some(info)
        }
        Err(err) => {
            tracing::warn!(device = %path.display(), error = %err, "fixed screen info unavailable");
            None
        }
    };

    let variable = read::<VariableScreenInfo, _>(&mut device, IoctlRequest::GetVariableScreenInfo)
        .map_err(|source| DisplayError::Autoprobe { path: path.to_path_buf(), source })?;
    tracing::debug!(
        width = variable.xres,
        height = variable.yres,
        bpp = variable.bits_per_pixel,
        "display geometry"
    );

    let mode = color_mode_for(&variable)?;

    Ok(ProbeReport { id: fixed.as_ref().map(FixedScreenInfo::id_str), fixed, variable, mode })
}

/// Pick the buffer encoding for a variable screen info.
///
/// Bits per pixel decide alone. The channel bit-layout is logged but never
/// overrides the choice.
pub fn color_mode_for(info: &VariableScreenInfo) -> Result<ColorMode, DisplayError> {
    let (red, green, blue, transp) = (info.red, info.green, info.blue, info.transp);
    tracing::debug!(
        bpp = info.bits_per_pixel,
        red = %red,
        green = %green,
        blue = %blue,
        transp = %transp,
        "channel layout"
    );
    ColorMode::from_bits_per_pixel(info.bits_per_pixel).ok_or(DisplayError::UnsupportedMode {
        bpp: info.bits_per_pixel,
        red,
        green,
        blue,
        transp,
    })
}

fn read<S: ScreenInfo, D: FbDevice>(device: &mut D, request: IoctlRequest) -> io::Result<S> {
    let mut raw = vec![0u8; S::SIZE];
    device.read_info(request, &mut raw)?;
    S::decode(&raw).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}
