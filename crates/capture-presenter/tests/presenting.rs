//! Tests for presenting frames
//!

use capture_presenter::{
    FrameOutcome, Size,
    software::{Event, SoftwareTexture},
};
use test_helper::{
    fixtures::{BLUE, GREEN, Harness, QUADRANT_COLOURS, RED, WHITE, close_to, quadrants},
    logger::init_logger,
};

#[test]
fn constant_size_never_resizes() {
    init_logger();

    let size = Size::new(64, 48);
    let harness = Harness::new(size);

    for _ in 0..5 {
        harness.push(size);
    }

    let stats = harness.capture.stats();
    assert_eq!(stats.presented, 5);
    assert_eq!(stats.resizes, 0);
    assert_eq!(stats.pool_recreations, 0);

    assert_eq!(harness.journal.count(|e| matches!(e, Event::ResizeSurface(_))), 0);
    assert_eq!(harness.journal.count(|e| matches!(e, Event::RecreateFramePool(_))), 0);
    assert_eq!(harness.journal.presents(), 5);
}

#[test]
fn one_present_per_frame() {
    init_logger();

    let size = Size::new(32, 32);
    let harness = Harness::new(size);

    harness.push(size);
    assert_eq!(harness.journal.presents(), 1);

    // The frame was already taken by the first notification.
    let outcome = harness.capture.handle_frame_arrived();
    assert!(matches!(outcome, FrameOutcome::NoFrame));
    assert_eq!(harness.journal.presents(), 1);

    harness.push(size);
    assert_eq!(harness.journal.presents(), 2);

    let stats = harness.capture.stats();
    assert_eq!(stats.presented, 2);
    assert_eq!(stats.no_frame, 1);
    assert_eq!(harness.capture.presentable().present_count(), 2);
}

#[test]
fn frame_pass_order() {
    init_logger();

    let size = Size::new(16, 16);
    let harness = Harness::new(size);
    harness.journal.clear();

    harness.push(size);

    assert_eq!(
        harness.journal.events(),
        vec![
            Event::CreateRenderTarget { generation: 0 },
            Event::CreateShaderResource,
            Event::Draw {
                generation: 0,
                viewport: size
            },
            Event::ReleaseShaderResource,
            Event::ReleaseFrame,
            Event::Present(size),
        ]
    );
    assert_eq!(harness.journal.live_shader_resources(), 0);
}

#[test]
fn empty_frame_is_not_presented() {
    init_logger();

    let size = Size::new(32, 32);
    let harness = Harness::new(size);

    let notification = harness
        .item
        .queue_frame(SoftwareTexture::new(Size::new(0, 0)))
        .unwrap();
    drop(notification);

    let outcome = harness.capture.handle_frame_arrived();
    assert!(matches!(outcome, FrameOutcome::Empty));

    assert_eq!(harness.journal.presents(), 0);
    assert_eq!(harness.journal.count(|e| matches!(e, Event::ResizeSurface(_))), 0);
    assert_eq!(harness.capture.content_size(), Some(size));
    assert_eq!(harness.capture.stats().empty, 1);

    // The frame went back to the pool.
    harness.push(size);
    assert_eq!(harness.journal.presents(), 1);
}

#[test]
fn quadrants_are_exact_at_source_size() {
    init_logger();

    let size = Size::new(2, 2);
    let harness = Harness::new(size);
    harness.push_texture(quadrants(size));

    let image = harness.capture.presentable().latest().unwrap();
    assert_eq!(image.size(), size);
    assert_eq!(image.texels(), &QUADRANT_COLOURS);
}

#[test]
fn quadrant_centres_at_larger_size() {
    init_logger();

    let size = Size::new(64, 64);
    let harness = Harness::new(size);
    harness.push_texture(quadrants(size));

    let image = harness.capture.presentable().latest().unwrap();
    for (x, y, expected) in [(16, 16, RED), (48, 16, GREEN), (16, 48, BLUE), (48, 48, WHITE)] {
        let actual = image.texel(x, y).unwrap();
        assert!(
            close_to(actual, expected, 10),
            "Texel ({x}, {y}) is {actual:?}, expected {expected:?}"
        );
    }
}

#[test]
fn non_square_frame_is_exact_at_source_size() {
    init_logger();

    let size = Size::new(4, 1);
    let texels = vec![RED, GREEN, BLUE, WHITE];
    let harness = Harness::new(size);
    harness.push_texture(SoftwareTexture::from_texels(size, texels.clone()).unwrap());

    let image = harness.capture.presentable().latest().unwrap();
    assert_eq!(image.texels(), texels.as_slice());
}

#[test]
fn mismatched_texel_count_is_rejected() {
    assert!(SoftwareTexture::from_texels(Size::new(2, 2), vec![RED; 3]).is_none());
}
