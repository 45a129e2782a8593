//! Device access seam
//!
//! [`FrameBufferDisplay`](crate::FrameBufferDisplay) never touches a file
//! descriptor directly. It opens devices through an [`FbBackend`], queries
//! and blanks them through [`FbDevice`], and writes frames into a
//! [`MappedRegion`]. [`LinuxBackend`] is the real thing; tests swap in the
//! counting double from [`mock`](crate::mock).

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;

use memmap2::{MmapMut, MmapOptions};

use crate::ioctl::{BlankLevel, IoctlRequest};

/// Opens frame-buffer devices.
pub trait FbBackend: Send + Sync {
    /// Open device handle
    type Device: FbDevice;

    /// Open `path` for exclusive reading and writing.
    fn open(&self, path: &Path) -> io::Result<Self::Device>;
}

/// An open frame-buffer device.
///
/// At most one handle per node is open at a time. Dropping the device closes
/// it and gives up that claim.
pub trait FbDevice: Send {
    /// Writable view of device memory
    type Region: MappedRegion;

    /// Issue a read request, filling `out` with the kernel struct.
    ///
    /// `out` must be exactly [`IoctlRequest::payload_size`] bytes.
    fn read_info(&mut self, request: IoctlRequest, out: &mut [u8]) -> io::Result<()>;

    /// Set the panel power state.
    fn blank(&mut self, level: BlankLevel) -> io::Result<()>;

    /// Map the first `len` bytes of device memory.
    fn map(&mut self, len: usize) -> io::Result<Self::Region>;
}

/// Device memory mapped into the process.
///
/// Dropping the region unmaps it.
pub trait MappedRegion: Send {
    /// Mutable view of the mapped bytes.
    fn bytes_mut(&mut self) -> &mut [u8];

    /// Push written bytes to the device.
    fn flush(&mut self) -> io::Result<()>;
}

/// `/dev/fbN` through `open(2)`, `ioctl(2)` and `mmap(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxBackend;

impl FbBackend for LinuxBackend {
    type Device = LinuxDevice;

    /// The node is locked with `flock(LOCK_EX | LOCK_NB)` for as long as the
    /// device is open; a second open fails with [`io::ErrorKind::WouldBlock`].
    fn open(&self, path: &Path) -> io::Result<LinuxDevice> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        // SAFETY: plain integer arguments on a descriptor owned by `file`.
        check(unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) }).map_err(
            |err| match err.kind() {
                io::ErrorKind::WouldBlock => io::Error::new(
                    io::ErrorKind::WouldBlock,
                    format!("{} is held by another handle", path.display()),
                ),
                _ => err,
            },
        )?;
        Ok(LinuxDevice { file })
    }
}

/// An open device node.
#[derive(Debug)]
pub struct LinuxDevice {
    file: File,
}

fn check(rc: libc::c_int) -> io::Result<()> {
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

impl FbDevice for LinuxDevice {
    type Region = LinuxRegion;

    fn read_info(&mut self, request: IoctlRequest, out: &mut [u8]) -> io::Result<()> {
        let Some(expected) = request.payload_size() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a read request"));
        };
        if out.len() != expected {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("ioctl {:#06x} needs {expected} bytes, got {}", request.code(), out.len()),
            ));
        }
        // SAFETY: the descriptor is open for the lifetime of `self.file` and
        // `out` is exactly the size of the struct the kernel writes back.
        check(unsafe {
            libc::ioctl(self.file.as_raw_fd(), request.code() as _, out.as_mut_ptr())
        })
    }

    fn blank(&mut self, level: BlankLevel) -> io::Result<()> {
        let arg: libc::c_int = level.arg();
        // SAFETY: FBIOBLANK takes its argument by value; no memory is shared.
        check(unsafe { libc::ioctl(self.file.as_raw_fd(), IoctlRequest::Blank.code() as _, arg) })
    }

    fn map(&mut self, len: usize) -> io::Result<LinuxRegion> {
        // SAFETY: the driver may change the memory underneath us; this
        // process only reaches it through the region's own borrow.
        let map = unsafe { MmapOptions::new().len(len).map_mut(&self.file)? };
        Ok(LinuxRegion { map })
    }
}

/// A shared, writable mapping of device memory.
#[derive(Debug)]
pub struct LinuxRegion {
    map: MmapMut,
}

impl MappedRegion for LinuxRegion {
    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.map
    }

    fn flush(&mut self) -> io::Result<()> {
        self.map.flush()
    }
}
