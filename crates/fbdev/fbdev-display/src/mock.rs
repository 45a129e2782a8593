//! Counting test double for the device seam
//!
//! [`MockBackend`] serves encoded screen info from memory and counts every
//! open, mapping and release, so tests can assert on resource handling
//! without a frame-buffer device. Clones share their counters.

#![cfg(any(test, feature = "mock"))]

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::device::{FbBackend, FbDevice, MappedRegion};
use crate::ioctl::{BlankLevel, IoctlRequest};
use crate::screen_info::{FixedScreenInfo, ScreenInfo, VariableScreenInfo};

#[derive(Debug, Clone)]
struct MockConfig {
    fixed: Option<FixedScreenInfo>,
    variable: Option<VariableScreenInfo>,
    missing: bool,
    exclusive: bool,
    short_mapping: Option<usize>,
    fail_map: bool,
    fail_blank: bool,
    map_delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct Stats {
    opens: AtomicUsize,
    maps: AtomicUsize,
    region_releases: AtomicUsize,
    device_releases: AtomicUsize,
    blanks: Mutex<Vec<BlankLevel>>,
    frames: Mutex<Vec<Vec<u8>>>,
}

impl Stats {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory frame-buffer backend.
#[derive(Debug, Clone)]
pub struct MockBackend {
    config: MockConfig,
    stats: Arc<Stats>,
}

impl MockBackend {
    /// A device reporting `variable` and a default fixed info named `mockfb`.
    pub fn new(variable: VariableScreenInfo) -> Self {
        let fixed = FixedScreenInfo {
            id: FixedScreenInfo::id_from_str("mockfb"),
            smem_len: variable
                .xres
                .saturating_mul(variable.yres)
                .saturating_mul(variable.bits_per_pixel / 8),
            ..Default::default()
        };
        Self {
            config: MockConfig {
                fixed: Some(fixed),
                variable: Some(variable),
                missing: false,
                exclusive: false,
                short_mapping: None,
                fail_map: false,
                fail_blank: false,
                map_delay: None,
            },
            stats: Arc::default(),
        }
    }

    /// A device in a standard truecolor mode.
    pub fn truecolor(width: u32, height: u32, bits_per_pixel: u32) -> Self {
        Self::new(VariableScreenInfo::truecolor(width, height, bits_per_pixel))
    }

    /// Report `id` as the driver identification.
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        if let Some(fixed) = self.config.fixed.as_mut() {
            fixed.id = FixedScreenInfo::id_from_str(id);
        }
        self
    }

    /// Fail `FBIOGET_FSCREENINFO`.
    #[must_use]
    pub fn without_fixed_info(mut self) -> Self {
        self.config.fixed = None;
        self
    }

    /// Fail `FBIOGET_VSCREENINFO`.
    #[must_use]
    pub fn without_variable_info(mut self) -> Self {
        self.config.variable = None;
        self
    }

    /// Fail every open with `NotFound`.
    #[must_use]
    pub fn missing_device(mut self) -> Self {
        self.config.missing = true;
        self
    }

    /// Refuse to open while another device handle is alive, like the
    /// `flock` claim of the Linux backend.
    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.config.exclusive = true;
        self
    }

    /// Hand out mappings of at most `len` bytes.
    #[must_use]
    pub fn with_short_mapping(mut self, len: usize) -> Self {
        self.config.short_mapping = Some(len);
        self
    }

    /// Fail every mapping attempt.
    #[must_use]
    pub fn failing_map(mut self) -> Self {
        self.config.fail_map = true;
        self
    }

    /// Fail every blanking ioctl (the level is still recorded).
    #[must_use]
    pub fn failing_blank(mut self) -> Self {
        self.config.fail_blank = true;
        self
    }

    /// Sleep inside `map` to widen race windows.
    #[must_use]
    pub fn with_map_delay(mut self, delay: Duration) -> Self {
        self.config.map_delay = Some(delay);
        self
    }

    /// Devices opened so far
    pub fn opens(&self) -> usize {
        self.stats.opens.load(Ordering::SeqCst)
    }

    /// Mappings created so far
    pub fn maps(&self) -> usize {
        self.stats.maps.load(Ordering::SeqCst)
    }

    /// Mappings dropped so far
    pub fn region_releases(&self) -> usize {
        self.stats.region_releases.load(Ordering::SeqCst)
    }

    /// Devices dropped so far
    pub fn device_releases(&self) -> usize {
        self.stats.device_releases.load(Ordering::SeqCst)
    }

    /// Every blanking level requested, in order.
    pub fn blank_levels(&self) -> Vec<BlankLevel> {
        self.stats.blanks.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Snapshot of the mapped bytes at every flush.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.stats.frames.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The most recently flushed frame.
    pub fn last_frame(&self) -> Option<Vec<u8>> {
        self.stats.frames.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }
}

impl FbBackend for MockBackend {
    type Device = MockDevice;

    fn open(&self, path: &Path) -> io::Result<MockDevice> {
        if self.config.missing {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ));
        }
        if self.config.exclusive && self.opens() > self.device_releases() {
            return Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                format!("{} is held by another handle", path.display()),
            ));
        }
        Stats::bump(&self.stats.opens);
        Ok(MockDevice { config: self.config.clone(), stats: Arc::clone(&self.stats) })
    }
}

/// An open mock device.
#[derive(Debug)]
pub struct MockDevice {
    config: MockConfig,
    stats: Arc<Stats>,
}

fn not_a_framebuffer() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "inappropriate ioctl for device")
}

impl FbDevice for MockDevice {
    type Region = MockRegion;

    fn read_info(&mut self, request: IoctlRequest, out: &mut [u8]) -> io::Result<()> {
        let encoded = match request {
            IoctlRequest::GetFixedScreenInfo => {
                self.config.fixed.ok_or_else(not_a_framebuffer)?.encode_into(out)
            }
            IoctlRequest::GetVariableScreenInfo => {
                self.config.variable.ok_or_else(not_a_framebuffer)?.encode_into(out)
            }
            IoctlRequest::Blank => return Err(io::ErrorKind::InvalidInput.into()),
        };
        encoded.map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
    }

    fn blank(&mut self, level: BlankLevel) -> io::Result<()> {
        self.stats.blanks.lock().unwrap_or_else(PoisonError::into_inner).push(level);
        if self.config.fail_blank {
            return Err(not_a_framebuffer());
        }
        Ok(())
    }

    fn map(&mut self, len: usize) -> io::Result<MockRegion> {
        if let Some(delay) = self.config.map_delay {
            std::thread::sleep(delay);
        }
        if self.config.fail_map {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "mmap refused"));
        }
        Stats::bump(&self.stats.maps);
        let len = self.config.short_mapping.map_or(len, |short| short.min(len));
        Ok(MockRegion { bytes: vec![0; len], stats: Arc::clone(&self.stats) })
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        Stats::bump(&self.stats.device_releases);
    }
}

/// A mapping backed by a `Vec`.
#[derive(Debug)]
pub struct MockRegion {
    bytes: Vec<u8>,
    stats: Arc<Stats>,
}

impl MappedRegion for MockRegion {
    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stats.frames.lock().unwrap_or_else(PoisonError::into_inner).push(self.bytes.clone());
        Ok(())
    }
}

impl Drop for MockRegion {
    fn drop(&mut self) {
        Stats::bump(&self.stats.region_releases);
    }
}
