//! Tests for containing per-frame failures
//!

use capture_presenter::{
    FrameError, FrameOutcome, RemovalReason, Size,
    software::{Delivery, Event, FaultStage},
};
use test_helper::{
    fixtures::{Harness, solid},
    logger::init_logger,
};

fn queue_and_handle(harness: &Harness, size: Size) -> FrameOutcome {
    let notification = harness.item.queue_frame(solid(size)).unwrap();
    drop(notification);

    harness.capture.handle_frame_arrived()
}

#[test]
fn draw_failure_drops_one_frame() {
    init_logger();

    let size = Size::new(16, 16);
    let harness = Harness::new(size);
    harness.faults.inject(FaultStage::Draw, None);

    let outcome = queue_and_handle(&harness, size);
    assert!(matches!(outcome, FrameOutcome::Dropped(FrameError::Draw(_))));
    assert_eq!(harness.journal.presents(), 0);

    // The frame and its shader resource were still released.
    assert_eq!(harness.journal.live_shader_resources(), 0);
    assert_eq!(harness.journal.count(|e| matches!(e, Event::ReleaseFrame)), 1);

    let outcome = queue_and_handle(&harness, size);
    assert!(outcome.is_presented());

    let stats = harness.capture.stats();
    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.presented, 1);
}

#[test]
fn every_stage_is_contained() {
    init_logger();

    let size = Size::new(16, 16);
    let harness = Harness::new(size);

    for stage in [
        FaultStage::RenderTarget,
        FaultStage::ShaderResource,
        FaultStage::Draw,
        FaultStage::Present,
    ] {
        harness.faults.inject(stage, None);

        let outcome = queue_and_handle(&harness, size);
        match (stage, outcome) {
            (FaultStage::RenderTarget, FrameOutcome::Dropped(FrameError::RenderTarget(_)))
            | (FaultStage::ShaderResource, FrameOutcome::Dropped(FrameError::ShaderResource(_)))
            | (FaultStage::Draw, FrameOutcome::Dropped(FrameError::Draw(_)))
            | (FaultStage::Present, FrameOutcome::Dropped(FrameError::Present(_))) => {}
            (stage, outcome) => panic!("Fault at {stage:?} produced {outcome:?}"),
        }

        assert_eq!(harness.item.push_frame(solid(size)), Delivery::Delivered);
    }

    let stats = harness.capture.stats();
    assert_eq!(stats.dropped, 4);
    assert_eq!(stats.presented, 4);
    assert_eq!(harness.faults.pending(), 0);
    assert_eq!(harness.journal.live_shader_resources(), 0);
}

#[test]
fn device_loss_is_reported_and_does_not_latch() {
    init_logger();

    let size = Size::new(16, 16);
    let harness = Harness::new(size);
    harness
        .faults
        .inject(FaultStage::Draw, Some(RemovalReason::Removed));

    let outcome = queue_and_handle(&harness, size);
    let FrameOutcome::Dropped(error) = outcome else {
        panic!("Frame should have been dropped, got {outcome:?}");
    };
    assert!(error.is_device_lost());
    assert_eq!(error.gpu_error().call(), "SoftwareDevice::draw_quad");

    let outcome = queue_and_handle(&harness, size);
    assert!(outcome.is_presented());
}

#[test]
fn ordinary_failures_are_not_device_loss() {
    init_logger();

    let size = Size::new(16, 16);
    let harness = Harness::new(size);
    harness.faults.inject(FaultStage::Present, None);

    let FrameOutcome::Dropped(error) = queue_and_handle(&harness, size) else {
        panic!("Frame should have been dropped");
    };
    assert!(!error.is_device_lost());
}

#[test]
fn removal_reasons_decode() {
    let cases = [
        (0, None),
        (1, None),
        (0x887A_0005_u32 as i32, Some(RemovalReason::Removed)),
        (0x887A_0006_u32 as i32, Some(RemovalReason::Hung)),
        (0x887A_0007_u32 as i32, Some(RemovalReason::Reset)),
        (0x887A_0020_u32 as i32, Some(RemovalReason::DriverInternalError)),
        (0x887A_0001_u32 as i32, Some(RemovalReason::InvalidCall)),
        (0x8000_4005_u32 as i32, Some(RemovalReason::Other(0x8000_4005_u32 as i32))),
    ];

    for (code, expected) in cases {
        assert_eq!(RemovalReason::from_hresult(code), expected, "code 0x{code:08X}");
    }

    assert!(RemovalReason::is_device_lost_code(0x887A_0005_u32 as i32));
    assert!(!RemovalReason::is_device_lost_code(0x887A_0001_u32 as i32));
    assert_eq!(
        RemovalReason::Removed.to_string(),
        "device removed (0x887A0005)"
    );
}
