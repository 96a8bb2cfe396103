//! Tests for following content size changes
//!

use capture_presenter::{
    FrameError, FrameOutcome, Size,
    software::{Event, FaultStage, SoftwareTexture},
};
use test_helper::{
    fixtures::{Harness, solid},
    logger::init_logger,
};

#[test]
fn resize_then_recreate_after_present() {
    init_logger();

    let small = Size::new(800, 600);
    let large = Size::new(1920, 1080);
    let harness = Harness::new(small);

    harness.push(small);
    harness.journal.clear();

    harness.push(large);

    assert_eq!(
        harness.journal.events(),
        vec![
            Event::ResizeSurface(large),
            Event::CreateRenderTarget { generation: 1 },
            Event::CreateShaderResource,
            Event::Draw {
                generation: 1,
                viewport: large
            },
            Event::ReleaseShaderResource,
            Event::ReleaseFrame,
            Event::Present(large),
            Event::RecreateFramePool(large),
        ]
    );

    let stats = harness.capture.stats();
    assert_eq!(stats.resizes, 1);
    assert_eq!(stats.pool_recreations, 1);
    assert_eq!(harness.capture.content_size(), Some(large));
}

#[test]
fn resize_outcome_is_reported() {
    init_logger();

    let harness = Harness::new(Size::new(32, 32));
    let larger = Size::new(64, 40);

    let notification = harness.item.queue_frame(solid(larger)).unwrap();
    drop(notification);

    let outcome = harness.capture.handle_frame_arrived();
    assert!(matches!(outcome, FrameOutcome::Presented { resized: true }));

    let notification = harness.item.queue_frame(solid(larger)).unwrap();
    drop(notification);

    let outcome = harness.capture.handle_frame_arrived();
    assert!(matches!(outcome, FrameOutcome::Presented { resized: false }));
}

#[test]
fn presented_image_matches_content_size() {
    init_logger();

    let harness = Harness::new(Size::new(16, 16));

    for size in [Size::new(16, 16), Size::new(24, 8), Size::new(8, 24)] {
        harness.push(size);

        let image = harness.capture.presentable().latest().unwrap();
        assert_eq!(image.size(), size);
    }

    assert_eq!(harness.capture.stats().resizes, 2);
    assert_eq!(harness.capture.stats().pool_recreations, 2);
}

#[test]
fn presentable_survives_resize() {
    init_logger();

    let harness = Harness::new(Size::new(16, 16));
    let before = harness.capture.presentable().clone();

    harness.push(Size::new(40, 30));
    harness.push(Size::new(10, 10));

    assert!(before.same_as(harness.capture.presentable()));
    assert_eq!(before.present_count(), 2);
}

#[test]
fn failed_resize_keeps_last_size() {
    init_logger();

    let original = Size::new(32, 32);
    let larger = Size::new(48, 48);
    let harness = Harness::new(original);

    harness.faults.inject(FaultStage::Resize, None);

    let notification = harness.item.queue_frame(solid(larger)).unwrap();
    drop(notification);

    let outcome = harness.capture.handle_frame_arrived();
    assert!(matches!(
        outcome,
        FrameOutcome::Dropped(FrameError::Resize { size, .. }) if size == larger
    ));
    assert_eq!(harness.capture.content_size(), Some(original));
    assert_eq!(harness.journal.presents(), 0);

    // The next frame tries again.
    harness.push(larger);
    assert_eq!(harness.capture.content_size(), Some(larger));
    assert_eq!(harness.journal.count(|e| matches!(e, Event::ResizeSurface(_))), 1);
    assert_eq!(harness.journal.presents(), 1);
}

#[test]
fn failed_recreate_retries_after_next_present() {
    init_logger();

    let original = Size::new(32, 32);
    let larger = Size::new(64, 64);
    let harness = Harness::new(original);

    harness.faults.inject(FaultStage::RecreatePool, None);

    // Presents even though the recreate fails.
    harness.push(larger);
    assert_eq!(harness.journal.presents(), 1);
    assert_eq!(harness.capture.stats().pool_recreations, 0);
    assert_eq!(harness.journal.count(|e| matches!(e, Event::Fault(FaultStage::RecreatePool))), 1);

    harness.journal.clear();
    harness.push(larger);

    let events = harness.journal.events();
    assert!(!events.contains(&Event::ResizeSurface(larger)));
    assert_eq!(events.last(), Some(&Event::RecreateFramePool(larger)));
    assert_eq!(harness.capture.stats().pool_recreations, 1);
    assert_eq!(harness.capture.stats().resizes, 1);
}

#[test]
fn render_targets_never_outlive_resize() {
    init_logger();

    let harness = Harness::new(Size::new(8, 8));

    for (width, height) in [(8, 8), (12, 8), (12, 8), (4, 16), (8, 8)] {
        harness.push_texture(SoftwareTexture::solid(Size::new(width, height), [1, 2, 3, 255]));
    }

    // Drawing through a stale render target fails.
    let stats = harness.capture.stats();
    assert_eq!(stats.presented, 5);
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.resizes, 3);
}
