use core::sync::atomic::{AtomicU64, Ordering};

/// Counts of how arrived frames were handled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames drawn and presented.
    pub presented: u64,
    /// Frames dropped because a step failed.
    pub dropped: u64,
    /// Notifications where the pool had no frame ready.
    pub no_frame: u64,
    /// Frames skipped because their content was zero sized.
    pub empty: u64,
    /// Times the presentation surface was resized.
    pub resizes: u64,
    /// Times the frame pool was recreated.
    pub pool_recreations: u64,
}

#[derive(Debug, Default)]
pub(crate) struct FrameCounters {
    presented: AtomicU64,
    dropped: AtomicU64,
    no_frame: AtomicU64,
    empty: AtomicU64,
    resizes: AtomicU64,
    pool_recreations: AtomicU64,
}

impl FrameCounters {
    pub fn presented(&self) {
        self.presented.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn no_frame(&self) {
        self.no_frame.fetch_add(1, Ordering::Relaxed);
    }

    pub fn empty(&self) {
        self.empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn resized(&self) {
        self.resizes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pool_recreated(&self) {
        self.pool_recreations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FrameStats {
        FrameStats {
            presented: self.presented.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            no_frame: self.no_frame.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
            resizes: self.resizes.load(Ordering::Relaxed),
            pool_recreations: self.pool_recreations.load(Ordering::Relaxed),
        }
    }
}
