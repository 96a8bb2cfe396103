//! Tests for the Direct3D 11 backend, these need a desktop session.
//!

#![cfg(windows)]

use std::{thread, time::Duration};

use capture_presenter::{
    BUFFER_COUNT, CaptureItem, GpuDevice, LiveCapture, LiveCaptureOptions, PixelFormat,
    PresentationSurface, Size,
    d3d11::{Direct3D11, WindowsCaptureItem},
};
use test_helper::logger::init_logger;

#[test]
fn create_device() {
    init_logger();

    let device = Direct3D11::new().unwrap();
    drop(device);
}

#[test]
fn wrap_existing_device() {
    init_logger();

    let device = Direct3D11::new().unwrap();
    let wrapped = Direct3D11::from_direct3d_device(&device.d3d_device).unwrap();

    assert_eq!(wrapped.d3d11_device, device.d3d11_device);
    assert_eq!(wrapped.dxgi_factory, device.dxgi_factory);
}

#[test]
#[ignore = "requires an interactive desktop"]
fn primary_monitor_item() {
    init_logger();

    let item = WindowsCaptureItem::primary_monitor().unwrap();
    let size = item.size().unwrap();
    assert!(!size.is_empty());
}

#[test]
#[ignore = "requires an interactive desktop"]
fn live_capture_presents() {
    init_logger();

    let device = Direct3D11::new().unwrap();
    let item = WindowsCaptureItem::primary_monitor().unwrap();

    let capture = LiveCapture::new(device, item, LiveCaptureOptions::default()).unwrap();
    capture.start_capture().unwrap();

    thread::sleep(Duration::from_millis(500));
    capture.dispose();

    let stats = capture.stats();
    assert_eq!(stats.dropped, 0);
    assert!(stats.presented > 0);
}

#[test]
#[ignore = "requires an interactive desktop"]
fn swap_chain_resizes_in_place() {
    init_logger();

    let device = Direct3D11::new().unwrap();
    let mut swap_chain = device
        .create_surface(PixelFormat::Bgra8Unorm, BUFFER_COUNT, Size::new(800, 600))
        .unwrap();
    let before = swap_chain.handle();

    swap_chain.resize(Size::new(1920, 1080)).unwrap();

    assert_eq!(swap_chain.size(), Size::new(1920, 1080));
    assert_eq!(before, swap_chain.handle());
}
