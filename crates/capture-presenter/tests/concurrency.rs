//! Tests for frame-arrived notifications from many threads
//!

use std::{sync::Barrier, thread};

use capture_presenter::{
    Size,
    software::{Delivery, SoftwareTexture},
};
use test_helper::{fixtures::Harness, logger::init_logger};

const THREADS: usize = 4;
const FRAMES_PER_THREAD: usize = 50;

#[test]
fn notifications_are_serialised() {
    init_logger();

    let harness = Harness::new(Size::new(16, 16));
    let barrier = Barrier::new(THREADS);
    let sizes = [Size::new(16, 16), Size::new(24, 12), Size::new(8, 32)];

    let delivered: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|index| {
                let item = harness.item.clone();
                let barrier = &barrier;

                scope.spawn(move || {
                    barrier.wait();

                    let mut delivered = 0;
                    for frame in 0..FRAMES_PER_THREAD {
                        let size = sizes[(index + frame) % sizes.len()];
                        let texture =
                            SoftwareTexture::solid(size, [index as u8, frame as u8, 0, 255]);

                        if item.push_frame(texture) == Delivery::Delivered {
                            delivered += 1;
                        }
                    }
                    delivered
                })
            })
            .collect();

        handles.into_iter().map(|handle| handle.join().unwrap()).sum()
    });

    assert!(delivered > 0);
    assert_eq!(harness.journal.reentrancy_violations(), 0);
    assert!(harness.journal.peak_shader_resources() <= 1);
    assert_eq!(harness.journal.live_shader_resources(), 0);

    // Recreating the pool discards buffered frames, so some notifications find nothing.
    let stats = harness.capture.stats();
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.presented + stats.no_frame, delivered as u64);
    assert_eq!(stats.presented as usize, harness.journal.presents());
}

#[test]
fn dispose_during_notifications() {
    init_logger();

    let size = Size::new(16, 16);
    let harness = Harness::new(size);
    let barrier = Barrier::new(THREADS + 1);

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let item = harness.item.clone();
            let barrier = &barrier;

            scope.spawn(move || {
                barrier.wait();
                for _ in 0..FRAMES_PER_THREAD {
                    let _ = item.push_frame(SoftwareTexture::solid(size, [0, 0, 0, 255]));
                }
            });
        }

        barrier.wait();
        harness.capture.dispose();
    });

    assert_eq!(harness.journal.reentrancy_violations(), 0);
    assert_eq!(harness.journal.releases().len(), 5);

    let presents = harness.journal.presents();
    harness.item.push_frame(SoftwareTexture::solid(size, [0, 0, 0, 255]));
    assert_eq!(harness.journal.presents(), presents);
}
