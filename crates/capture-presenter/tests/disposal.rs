//! Tests for starting and disposing a live capture
//!

use capture_presenter::{
    CreationError, FrameOutcome, LiveCapture, LiveCaptureOptions, SessionOptions, Size,
    StartError,
    software::{Delivery, Event, Resource, SoftwareCaptureItem, SoftwareDevice},
};
use test_helper::{
    fixtures::{Harness, solid},
    logger::init_logger,
};

const RELEASE_ORDER: [Resource; 5] = [
    Resource::Session,
    Resource::FramePool,
    Resource::Surface,
    Resource::Device,
    Resource::Pipeline,
];

#[test]
fn dispose_releases_in_order() {
    init_logger();

    let size = Size::new(16, 16);
    let harness = Harness::new(size);
    harness.push(size);

    harness.capture.dispose();

    assert!(harness.capture.is_disposed());
    assert_eq!(harness.journal.releases(), RELEASE_ORDER);
    assert_eq!(harness.capture.content_size(), None);
}

#[test]
fn dispose_is_idempotent() {
    init_logger();

    let harness = Harness::new(Size::new(16, 16));

    harness.capture.dispose();
    harness.capture.dispose();
    harness.capture.dispose();

    assert_eq!(harness.journal.releases(), RELEASE_ORDER);
}

#[test]
fn drop_disposes() {
    init_logger();

    let Harness {
        capture, journal, ..
    } = Harness::new(Size::new(16, 16));

    drop(capture);

    assert_eq!(journal.releases(), RELEASE_ORDER);
}

#[test]
fn notification_after_dispose_is_ignored() {
    init_logger();

    let size = Size::new(16, 16);
    let harness = Harness::new(size);

    let notification = harness.item.queue_frame(solid(size)).unwrap();
    harness.capture.dispose();
    notification.fire();

    assert_eq!(harness.journal.presents(), 0);
    assert_eq!(harness.journal.count(|e| matches!(e, Event::CreateRenderTarget { .. })), 0);
    assert!(matches!(
        harness.capture.handle_frame_arrived(),
        FrameOutcome::Disposed
    ));
    assert_eq!(harness.item.push_frame(solid(size)), Delivery::NotCapturing);
}

#[test]
fn start_is_idempotent() {
    init_logger();

    let harness = Harness::new(Size::new(16, 16));

    harness.capture.start_capture().unwrap();
    harness.capture.start_capture().unwrap();

    assert_eq!(harness.journal.count(|e| matches!(e, Event::StartSession)), 1);
}

#[test]
fn cursor_is_captured_by_default() {
    init_logger();

    let harness = Harness::new(Size::new(16, 16));

    let sessions: Vec<Event> = harness
        .journal
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::CreateSession { .. }))
        .collect();
    assert_eq!(sessions, [Event::CreateSession { capture_cursor: true }]);
}

#[test]
fn cursor_capture_can_be_disabled() {
    init_logger();

    let options = LiveCaptureOptions {
        session: SessionOptions {
            capture_cursor: false,
        },
        ..Default::default()
    };
    let harness = Harness::with_options(Size::new(16, 16), options);

    assert_eq!(
        harness.journal.count(|e| matches!(e, Event::CreateSession { capture_cursor: false })),
        1
    );
    assert_eq!(
        harness.journal.count(|e| matches!(e, Event::CreateSession { capture_cursor: true })),
        0
    );
}

#[test]
fn start_after_dispose_fails() {
    init_logger();

    let harness = Harness::new(Size::new(16, 16));
    harness.capture.dispose();

    let result = harness.capture.start_capture();
    assert!(matches!(result, Err(StartError::Disposed)));
}

#[test]
fn frames_wait_for_start() {
    init_logger();

    let size = Size::new(16, 16);
    let item = SoftwareCaptureItem::new(size);
    let device = SoftwareDevice::new();
    let journal = device.journal();

    let capture = LiveCapture::new(device, item.clone(), LiveCaptureOptions::default()).unwrap();
    assert_eq!(item.push_frame(solid(size)), Delivery::NotCapturing);

    capture.start_capture().unwrap();
    assert_eq!(item.push_frame(solid(size)), Delivery::Delivered);
    assert_eq!(journal.presents(), 1);
}

#[test]
fn empty_item_is_rejected() {
    init_logger();

    let device = SoftwareDevice::new();
    let journal = device.journal();
    let item = SoftwareCaptureItem::new(Size::new(0, 720));

    let result = LiveCapture::new(device, item, LiveCaptureOptions::default());
    assert!(matches!(result, Err(CreationError::EmptyCaptureItem(_))));

    assert_eq!(journal.count(|e| matches!(e, Event::CreateSurface(_))), 0);
    assert_eq!(journal.releases(), [Resource::Device]);
}
