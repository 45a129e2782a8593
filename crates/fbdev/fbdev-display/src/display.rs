//! Frame-buffer display
//!
//! Owns one pixel buffer and, once the first frame is pushed, one mapping of
//! device memory sized to that buffer. Drawing touches only the buffer;
//! [`show`](FrameBufferDisplay::show) copies it into the mapping.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use fbdev_buffer::{new_buffer, Color, ColorMode, PixelBuffer};

use crate::config::{DisplayConfig, Geometry};
use crate::device::{FbBackend, FbDevice, LinuxBackend, MappedRegion};
use crate::ioctl::BlankLevel;
use crate::probe::probe;
use crate::DisplayError;

/// An open device and its memory mapping.
///
/// The region is released before the device.
struct Mapping<D: FbDevice> {
    region: D::Region,
    device: D,
}

impl<D: FbDevice> Mapping<D> {
    fn release(self) {
        let Self { region, device } = self;
        drop(region);
        drop(device);
    }
}

/// A Linux frame-buffer device driven through an in-memory pixel buffer.
///
/// Construct with [`open`](Self::open) for the real device or
/// [`with_backend`](Self::with_backend) for any other [`FbBackend`].
///
/// `show`, `enable`, `disable` and `close` take `&self` and may be called
/// from several threads; the mapping is created at most once. Drawing
/// methods take `&mut self`.
pub struct FrameBufferDisplay<B: FbBackend = LinuxBackend> {
    backend: B,
    device: PathBuf,
    id: Option<String>,
    depth: u32,
    settle_delay: Duration,
    buffer: Box<dyn PixelBuffer>,
    mapping: Mutex<Option<Mapping<B::Device>>>,
    closed: AtomicBool,
}

impl FrameBufferDisplay<LinuxBackend> {
    /// Open a Linux frame-buffer device.
    pub fn open(config: DisplayConfig) -> Result<Self, DisplayError> {
        Self::with_backend(LinuxBackend, config)
    }
}

impl<B: FbBackend> FrameBufferDisplay<B> {
    /// Construct on top of `backend`.
    ///
    /// With [`Geometry::Autoprobe`] the device is queried now and any probe
    /// failure is returned. With [`Geometry::Explicit`] nothing is touched
    /// until the first frame is pushed.
    pub fn with_backend(backend: B, config: DisplayConfig) -> Result<Self, DisplayError> {
        let DisplayConfig { device, geometry, settle_delay } = config;
        let mut this = Self {
            backend,
            device,
            id: None,
            depth: 0,
            settle_delay,
            buffer: new_buffer(ColorMode::Rgb565, 0, 0),
            mapping: Mutex::new(None),
            closed: AtomicBool::new(false),
        };
        match geometry {
            Geometry::Autoprobe => this.refresh_device_info()?,
            Geometry::Explicit { width, height, mode } => {
                this.depth = mode.bits_per_pixel();
                this.buffer = new_buffer(mode, width, height);
            }
        }
        tracing::debug!(
            device = %this.device.display(),
            width = this.width(),
            height = this.height(),
            mode = %this.color_mode(),
            "display ready"
        );
        Ok(this)
    }

    /// Re-probe the device and reallocate the pixel buffer to match.
    ///
    /// Any existing mapping is released; the next write maps the new size.
    pub fn refresh_device_info(&mut self) -> Result<(), DisplayError> {
        if self.is_closed() {
            return Err(DisplayError::Closed);
        }
        // the mapping keeps the node claimed; free it before probing
        self.release_mapping();
        let report = probe(&self.backend, &self.device)?;
        self.id = report.id.clone();
        self.depth = report.depth();
        self.buffer = new_buffer(report.mode, report.width(), report.height());
        Ok(())
    }

    /// Replace the pixel buffer with an empty one of the new size, keeping
    /// the color mode. Any existing mapping is released.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.buffer = new_buffer(self.color_mode(), width, height);
        self.release_mapping();
    }

    // -- properties ---------------------------------------------------------

    /// Device node path
    pub fn device(&self) -> &Path {
        &self.device
    }

    /// Driver identification from the last probe, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Bits per pixel
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Active pixel encoding
    pub fn color_mode(&self) -> ColorMode {
        self.buffer.color_mode()
    }

    /// Encodings this driver can run a device in.
    pub fn supported_color_modes(&self) -> &'static [ColorMode] {
        &ColorMode::ALL
    }

    /// The off-screen pixel buffer.
    pub fn pixel_buffer(&self) -> &dyn PixelBuffer {
        self.buffer.as_ref()
    }

    /// Mutable access to the off-screen pixel buffer.
    pub fn pixel_buffer_mut(&mut self) -> &mut dyn PixelBuffer {
        self.buffer.as_mut()
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    // -- drawing ------------------------------------------------------------

    /// Clear to the zero state, or fill with `color` when given. Pushes the
    /// frame when `update_display` is set.
    pub fn clear(&mut self, color: Option<Color>, update_display: bool) -> Result<(), DisplayError> {
        match color {
            Some(color) => self.buffer.fill(color),
            None => self.buffer.clear(),
        }
        if update_display {
            self.show()?;
        }
        Ok(())
    }

    /// Fill the whole buffer. Pushes the frame when `update_display` is set.
    pub fn fill(&mut self, color: Color, update_display: bool) -> Result<(), DisplayError> {
        self.clear(Some(color), update_display)
    }

    /// Fill a rectangle, clipped to the screen.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Color) {
        self.buffer.fill_rect(x, y, width, height, color);
    }

    /// Set one pixel.
    pub fn draw_pixel(&mut self, x: u32, y: u32, color: Color) -> Result<(), DisplayError> {
        Ok(self.buffer.set_pixel(x, y, color)?)
    }

    /// Complement one pixel.
    pub fn invert_pixel(&mut self, x: u32, y: u32) -> Result<(), DisplayError> {
        Ok(self.buffer.invert_pixel(x, y)?)
    }

    /// Composite `source` at `(x, y)`, clipped to the screen.
    pub fn write_buffer(&mut self, x: i32, y: i32, source: &dyn PixelBuffer) {
        self.buffer.write_buffer(x, y, source);
    }

    // -- device I/O ---------------------------------------------------------

    /// Copy the pixel buffer to device memory and flush.
    ///
    /// If the mapping turns out smaller than the buffer, only the bytes that
    /// fit are written. That is not an error.
    pub fn show(&self) -> Result<(), DisplayError> {
        let mut guard = self.lock_mapping();
        let mapping = self.ensure_mapping(&mut guard)?;

        let frame = self.buffer.buffer();
        let view = mapping.region.bytes_mut();
        let len = frame.len().min(view.len());
        if len < frame.len() {
            tracing::trace!(frame = frame.len(), mapped = len, "short frame write");
        }
        if let (Some(dst), Some(src)) = (view.get_mut(..len), frame.get(..len)) {
            dst.copy_from_slice(src);
        }
        mapping.region.flush().map_err(DisplayError::Flush)
    }

    /// Copy the inclusive rectangle `(left, top)..=(right, bottom)` to device
    /// memory and flush. The rectangle is clipped to the screen.
    pub fn show_region(&self, left: u32, top: u32, right: u32, bottom: u32) -> Result<(), DisplayError> {
        let (width, height) = (self.width(), self.height());
        if width == 0 || height == 0 || left > right || top > bottom || left >= width || top >= height {
            return Ok(());
        }
        let right = right.min(width.saturating_sub(1));
        let bottom = bottom.min(height.saturating_sub(1));

        let mut guard = self.lock_mapping();
        let mapping = self.ensure_mapping(&mut guard)?;

        let bpp = self.buffer.bytes_per_pixel();
        let stride = (width as usize).saturating_mul(bpp);
        let span = (left as usize).saturating_mul(bpp)
            ..(right as usize).saturating_add(1).saturating_mul(bpp);
        let frame = self.buffer.buffer();
        let view = mapping.region.bytes_mut();
        for row in top as usize..=bottom as usize {
            let base = row.saturating_mul(stride);
            let range = base.saturating_add(span.start)..base.saturating_add(span.end);
            let (Some(src), Some(dst)) = (frame.get(range.clone()), view.get_mut(range)) else {
                break;
            };
            dst.copy_from_slice(src);
        }
        mapping.region.flush().map_err(DisplayError::Flush)
    }

    /// Power the panel on and wait for it to settle.
    pub fn enable(&self) -> Result<(), DisplayError> {
        self.blank(BlankLevel::Unblank)?;
        thread::sleep(self.settle_delay);
        Ok(())
    }

    /// Power the panel off. The pixel buffer is kept.
    pub fn disable(&self) -> Result<(), DisplayError> {
        self.blank(BlankLevel::Powerdown)
    }

    /// Release the mapping and the device.
    ///
    /// Idempotent. Dropping the display calls this too, but only as a
    /// fallback; prefer closing explicitly. Afterwards every device call
    /// returns [`DisplayError::Closed`] while drawing keeps working on the
    /// buffer.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.release_mapping();
        tracing::debug!(device = %self.device.display(), "display closed");
    }

    fn blank(&self, level: BlankLevel) -> Result<(), DisplayError> {
        let mut guard = self.lock_mapping();
        let mapping = self.ensure_mapping(&mut guard)?;
        if let Err(err) = mapping.device.blank(level) {
            tracing::warn!(?level, error = %err, "blanking ioctl failed");
        }
        Ok(())
    }

    fn lock_mapping(&self) -> MutexGuard<'_, Option<Mapping<B::Device>>> {
        // a panic mid-write leaves at worst a torn frame; the mapping is intact
        self.mapping.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_mapping<'a>(
        &self,
        slot: &'a mut Option<Mapping<B::Device>>,
    ) -> Result<&'a mut Mapping<B::Device>, DisplayError> {
        if self.is_closed() {
            return Err(DisplayError::Closed);
        }
        let mapping = match slot.take() {
            Some(mapping) => mapping,
            None => self.open_mapping()?,
        };
        Ok(slot.insert(mapping))
    }

    fn open_mapping(&self) -> Result<Mapping<B::Device>, DisplayError> {
        let len = self.buffer.byte_count();
        let mut device = self.backend.open(&self.device).map_err(|source| {
            tracing::error!(device = %self.device.display(), error = %source, "cannot open display");
            DisplayError::Open { path: self.device.clone(), source }
        })?;
        let region = device.map(len).map_err(|source| {
            tracing::error!(device = %self.device.display(), len, error = %source, "cannot map display");
            DisplayError::Map { path: self.device.clone(), len, source }
        })?;
        tracing::debug!(device = %self.device.display(), len, "display memory mapped");

        Ok(Mapping { region, device })
    }

    fn release_mapping(&self) {
        if let Some(mapping) = self.lock_mapping().take() {
            mapping.release();
            tracing::debug!(device = %self.device.display(), "display memory released");
        }
    }
}

impl<B: FbBackend> Drop for FrameBufferDisplay<B> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<B: FbBackend + core::fmt::Debug> core::fmt::Debug for FrameBufferDisplay<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBufferDisplay")
            .field("backend", &self.backend)
            .field("device", &self.device)
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("buffer", &self.buffer)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use std::sync::{Arc, Barrier};

    use super::*;
    use crate::mock::MockBackend;

    fn explicit(width: u32, height: u32, mode: ColorMode) -> DisplayConfig {
        DisplayConfig::explicit("/dev/fb0", width, height, mode).with_settle_delay(Duration::ZERO)
    }

    fn autoprobe() -> DisplayConfig {
        DisplayConfig::autoprobe("/dev/fb0").with_settle_delay(Duration::ZERO)
    }

    #[test]
    fn test_explicit_geometry_skips_probe() {
        let backend = MockBackend::truecolor(1, 1, 8);
        let display =
            FrameBufferDisplay::with_backend(backend.clone(), explicit(64, 32, ColorMode::Rgb888))
                .unwrap();
        assert_eq!((display.width(), display.height()), (64, 32));
        assert_eq!(display.color_mode(), ColorMode::Rgb888);
        assert_eq!(display.depth(), 24);
        assert_eq!(display.id(), None);
        assert_eq!(backend.opens(), 0);
    }

    #[test]
    fn test_autoprobe_populates_geometry() {
        let backend = MockBackend::truecolor(800, 480, 32).with_id("mxsfb-drm");
        let display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        assert_eq!((display.width(), display.height(), display.depth()), (800, 480, 32));
        assert_eq!(display.color_mode(), ColorMode::Rgba8888);
        assert_eq!(display.id(), Some("mxsfb-drm"));
        assert_eq!(display.pixel_buffer().byte_count(), 800 * 480 * 4);
        // probe handle is already closed, nothing mapped yet
        assert_eq!(backend.device_releases(), 1);
        assert_eq!(backend.maps(), 0);
    }

    #[test]
    fn test_autoprobe_failure_aborts_construction() {
        let backend = MockBackend::truecolor(8, 8, 12);
        let err = FrameBufferDisplay::with_backend(backend, autoprobe()).unwrap_err();
        assert!(matches!(err, DisplayError::UnsupportedMode { bpp: 12, .. }));
    }

    #[test]
    fn test_show_maps_once_and_writes_frame() {
        let backend = MockBackend::truecolor(4, 2, 16);
        let mut display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        display.fill(Color::WHITE, false).unwrap();
        display.draw_pixel(0, 0, Color::BLACK).unwrap();

        display.show().unwrap();
        display.show().unwrap();

        assert_eq!(backend.maps(), 1);
        assert_eq!(backend.frames().len(), 2);
        let frame = backend.last_frame().unwrap();
        assert_eq!(frame.len(), 16);
        assert_eq!(&frame[..4], &[0x00, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_show_writes_short_frame_into_small_mapping() {
        let backend = MockBackend::truecolor(4, 4, 32).with_short_mapping(20);
        let mut display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        display.fill(Color::new(1, 2, 3, 4), false).unwrap();

        display.show().unwrap();

        let frame = backend.last_frame().unwrap();
        assert_eq!(frame, [1, 2, 3, 4].repeat(5));
    }

    #[test]
    fn test_concurrent_show_creates_one_mapping() {
        let backend = MockBackend::truecolor(16, 16, 16).with_map_delay(Duration::from_millis(50));
        let display = Arc::new(FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap());
        let barrier = Arc::new(Barrier::new(2));

        let workers: Vec<_> = (0..2)
            .map(|_| {
                let display = Arc::clone(&display);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    display.show()
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap().unwrap();
        }

        assert_eq!(backend.maps(), 1);
        assert_eq!(backend.frames().len(), 2);
    }

    #[test]
    fn test_map_failure_is_returned() {
        let backend = MockBackend::truecolor(8, 8, 16).failing_map();
        let display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        assert!(matches!(display.show(), Err(DisplayError::Map { len: 128, .. })));
        // the device opened for the mapping is dropped again
        assert_eq!(backend.opens(), 2);
        assert_eq!(backend.device_releases(), 2);
    }

    #[test]
    fn test_enable_and_disable_blank_the_panel() {
        let backend = MockBackend::truecolor(8, 8, 16);
        let display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        display.enable().unwrap();
        display.disable().unwrap();
        assert_eq!(backend.blank_levels(), vec![BlankLevel::Unblank, BlankLevel::Powerdown]);
        assert_eq!(backend.maps(), 1);
    }

    #[test]
    fn test_blank_failure_is_logged_not_returned() {
        let backend = MockBackend::truecolor(8, 8, 16).failing_blank();
        let display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        assert!(display.disable().is_ok());
        assert_eq!(backend.blank_levels(), vec![BlankLevel::Powerdown]);
    }

    #[test]
    fn test_close_is_idempotent() {
        let backend = MockBackend::truecolor(8, 8, 16);
        let display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        display.show().unwrap();

        display.close();
        display.close();
        drop(display);

        assert_eq!(backend.region_releases(), 1);
        // one for the probe, one for the mapping
        assert_eq!(backend.device_releases(), 2);
    }

    #[test]
    fn test_device_calls_after_close() {
        let backend = MockBackend::truecolor(8, 8, 16);
        let mut display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        display.close();

        assert!(matches!(display.show(), Err(DisplayError::Closed)));
        assert!(matches!(display.enable(), Err(DisplayError::Closed)));
        assert!(matches!(display.refresh_device_info(), Err(DisplayError::Closed)));
        display.draw_pixel(1, 1, Color::RED).unwrap();
        assert_eq!(backend.maps(), 0);
    }

    #[test]
    fn test_drop_releases_without_close() {
        let backend = MockBackend::truecolor(8, 8, 16);
        {
            let display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
            display.show().unwrap();
        }
        assert_eq!(backend.region_releases(), 1);
        assert_eq!(backend.device_releases(), 2);
    }

    #[test]
    fn test_resize_remaps_on_next_show() {
        let backend = MockBackend::truecolor(8, 8, 16);
        let mut display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        display.show().unwrap();

        display.resize(4, 4);
        assert_eq!(backend.region_releases(), 1);
        assert_eq!(display.pixel_buffer().byte_count(), 32);

        display.show().unwrap();
        assert_eq!(backend.maps(), 2);
        assert_eq!(backend.last_frame().unwrap().len(), 32);
    }

    #[test]
    fn test_refresh_device_info_reprobes() {
        let backend = MockBackend::truecolor(8, 8, 24);
        let mut display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        display.show().unwrap();
        display.refresh_device_info().unwrap();
        assert_eq!(backend.opens(), 3);
        assert_eq!(backend.region_releases(), 1);
        assert_eq!(display.color_mode(), ColorMode::Rgb888);
    }

    #[test]
    fn test_refresh_device_info_while_mapped_on_exclusive_device() {
        let backend = MockBackend::truecolor(8, 8, 16).exclusive();
        let mut display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        display.show().unwrap();
        display.refresh_device_info().unwrap();
        display.show().unwrap();
        assert_eq!(backend.maps(), 2);
        assert_eq!(backend.opens(), backend.device_releases() + 1);
    }

    #[test]
    fn test_second_display_cannot_claim_open_device() {
        let backend = MockBackend::truecolor(4, 4, 16).exclusive();
        let first =
            FrameBufferDisplay::with_backend(backend.clone(), explicit(4, 4, ColorMode::Rgb565))
                .unwrap();
        let second =
            FrameBufferDisplay::with_backend(backend.clone(), explicit(4, 4, ColorMode::Rgb565))
                .unwrap();
        first.show().unwrap();

        let err = second.show().unwrap_err();
        assert!(matches!(
            err,
            DisplayError::Open { ref source, .. } if source.kind() == std::io::ErrorKind::WouldBlock
        ));

        first.close();
        second.show().unwrap();
        assert_eq!(backend.maps(), 2);
    }

    #[test]
    fn test_construction_logs_geometry() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        let backend = MockBackend::truecolor(16, 8, 24);
        let display = tracing::subscriber::with_default(subscriber, || {
            FrameBufferDisplay::with_backend(backend, autoprobe())
        })
        .unwrap();
        assert_eq!((display.width(), display.height()), (16, 8));
        assert_eq!(display.color_mode(), ColorMode::Rgb888);
    }

    #[test]
    fn test_show_region_writes_only_the_rectangle() {
        let backend = MockBackend::truecolor(4, 3, 32);
        let mut display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        display.fill(Color::WHITE, false).unwrap();

        display.show_region(1, 1, 2, 9).unwrap();

        let frame = backend.last_frame().unwrap();
        let lit: Vec<bool> = frame.chunks_exact(4).map(|px| px == [255, 255, 255, 255]).collect();
        let expected = [
            false, false, false, false, //
            false, true, true, false, //
            false, true, true, false,
        ];
        assert_eq!(lit, expected);
    }

    #[test]
    fn test_show_region_outside_screen_is_noop() {
        let backend = MockBackend::truecolor(4, 4, 16);
        let display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();
        display.show_region(4, 0, 8, 2).unwrap();
        display.show_region(2, 2, 1, 1).unwrap();
        assert_eq!(backend.maps(), 0);
    }

    #[test]
    fn test_clear_variants() {
        let backend = MockBackend::truecolor(2, 2, 32);
        let mut display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();

        display.clear(Some(Color::RED), true).unwrap();
        assert_eq!(&backend.last_frame().unwrap()[..4], &[255, 0, 0, 255]);

        display.clear(None, true).unwrap();
        assert!(backend.last_frame().unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_drawing_delegates_to_buffer() {
        let backend = MockBackend::truecolor(4, 4, 24);
        let mut display = FrameBufferDisplay::with_backend(backend.clone(), autoprobe()).unwrap();

        display.fill_rect(-1, -1, 3, 3, Color::BLUE);
        display.invert_pixel(3, 3).unwrap();
        let mut sprite = new_buffer(ColorMode::Rgb565, 1, 1);
        sprite.fill(Color::LIME);
        display.write_buffer(2, 0, sprite.as_ref());

        let buf = display.pixel_buffer();
        assert_eq!(buf.get_pixel(1, 1).unwrap(), Color::BLUE);
        assert_eq!(buf.get_pixel(2, 2).unwrap(), Color::BLACK);
        assert_eq!(buf.get_pixel(3, 3).unwrap(), Color::WHITE);
        assert_eq!(buf.get_pixel(2, 0).unwrap(), Color::rgb(0, 252, 0));
        assert!(matches!(display.draw_pixel(4, 0, Color::RED), Err(DisplayError::Buffer(_))));
        assert_eq!(backend.maps(), 0);
    }

    #[test]
    fn test_supported_modes() {
        let backend = MockBackend::truecolor(1, 1, 16);
        let display = FrameBufferDisplay::with_backend(backend, autoprobe()).unwrap();
        assert_eq!(display.supported_color_modes(), &ColorMode::ALL);
    }
}
