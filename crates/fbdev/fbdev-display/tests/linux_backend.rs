//! Integration tests for the Linux backend against a regular file.
//!
//! A regular file can be opened and mapped like a frame-buffer node, but it
//! answers every frame-buffer ioctl with `ENOTTY`. That covers the write
//! path for real, the `flock` claim on the node, and the probe and blanking
//! failure paths.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]

use std::time::Duration;
use std::{fs, io};

use fbdev_display::{
    Color, ColorMode, DisplayConfig, DisplayError, FbBackend, FrameBufferDisplay, LinuxBackend,
};
use tempfile::NamedTempFile;

fn fake_device(len: u64) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    file.as_file().set_len(len).unwrap();
    file
}

fn explicit(file: &NamedTempFile, width: u32, height: u32, mode: ColorMode) -> DisplayConfig {
    DisplayConfig::explicit(file.path(), width, height, mode).with_settle_delay(Duration::ZERO)
}

#[test]
fn show_writes_frame_into_device_memory() {
    let file = fake_device(4 * 2 * 3);
    let mut display =
        FrameBufferDisplay::open(explicit(&file, 4, 2, ColorMode::Rgb888)).unwrap();

    display.fill(Color::rgb(1, 2, 3), false).unwrap();
    display.draw_pixel(3, 1, Color::WHITE).unwrap();
    display.show().unwrap();
    display.close();

    let bytes = fs::read(file.path()).unwrap();
    assert_eq!(bytes.len(), 24);
    assert_eq!(&bytes[..3], &[1, 2, 3]);
    assert_eq!(&bytes[21..], &[255, 255, 255]);
}

#[test]
fn show_region_leaves_other_rows_untouched() {
    let file = fake_device(4 * 4 * 2);
    let mut display =
        FrameBufferDisplay::open(explicit(&file, 4, 4, ColorMode::Rgb565)).unwrap();

    display.fill(Color::WHITE, false).unwrap();
    display.show_region(0, 2, 3, 2).unwrap();
    display.close();

    let bytes = fs::read(file.path()).unwrap();
    let row = |r: usize| &bytes[r * 8..(r + 1) * 8];
    assert!(row(0).iter().all(|&b| b == 0));
    assert!(row(1).iter().all(|&b| b == 0));
    assert!(row(2).iter().all(|&b| b == 0xFF));
    assert!(row(3).iter().all(|&b| b == 0));
}

#[test]
fn autoprobe_on_non_framebuffer_fails() {
    let file = fake_device(64);
    let config = DisplayConfig::autoprobe(file.path());
    match FrameBufferDisplay::open(config) {
        Err(err @ DisplayError::Autoprobe { .. }) => {
            assert_eq!(err.to_string(), "failed to autoprobe the display");
        }
        other => panic!("expected an autoprobe failure, got {other:?}"),
    }
}

#[test]
fn blanking_failure_is_not_an_error() {
    let file = fake_device(16 * 16 * 4);
    let display = FrameBufferDisplay::open(explicit(&file, 16, 16, ColorMode::Rgba8888)).unwrap();
    display.enable().unwrap();
    display.disable().unwrap();
}

#[test]
fn missing_device_fails_on_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fb9");
    let display = FrameBufferDisplay::open(
        DisplayConfig::explicit(&path, 8, 8, ColorMode::Rgb565),
    )
    .unwrap();
    assert!(matches!(display.show(), Err(DisplayError::Open { .. })));
}

#[test]
fn closed_display_rejects_writes() {
    let file = fake_device(8);
    let display = FrameBufferDisplay::open(explicit(&file, 2, 2, ColorMode::Rgb565)).unwrap();
    display.show().unwrap();
    display.close();
    display.close();
    assert!(matches!(display.show(), Err(DisplayError::Closed)));
}

#[test]
fn device_is_claimed_exclusively_while_open() {
    let file = fake_device(32);
    let held = LinuxBackend.open(file.path()).unwrap();
    let err = LinuxBackend.open(file.path()).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::WouldBlock);

    drop(held);
    LinuxBackend.open(file.path()).unwrap();
}

#[test]
fn second_display_on_same_node_fails_until_first_closes() {
    let file = fake_device(4 * 4 * 2);
    let first = FrameBufferDisplay::open(explicit(&file, 4, 4, ColorMode::Rgb565)).unwrap();
    let second = FrameBufferDisplay::open(explicit(&file, 4, 4, ColorMode::Rgb565)).unwrap();

    first.show().unwrap();
    assert!(matches!(second.show(), Err(DisplayError::Open { .. })));

    first.close();
    second.show().unwrap();
}
