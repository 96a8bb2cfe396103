use alloc::{
    collections::VecDeque,
    sync::{Arc, Weak},
};

use parking_lot::Mutex;
use tracing::{instrument, trace};

use crate::{
    CaptureItem, CaptureSession, CapturedFrame, FrameArrivedHandler, FramePool, GpuError,
    SessionOptions, Size,
};

use super::{Context, Event, FaultStage, Resource, SoftwareError, SoftwareTexture};

#[derive(Default)]
struct PoolState {
    depth: usize,
    buffered: VecDeque<SoftwareTexture>,
    outstanding: usize,
    handler: Option<FrameArrivedHandler>,
    started: bool,
    closed: bool,
}

type PoolLink = Arc<Mutex<PoolState>>;

/// The result of pushing a frame into a capture item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The frame was buffered and the frame-arrived handler ran.
    Delivered,
    /// Every pool buffer is in use, the frame was discarded.
    PoolFull,
    /// No started session is capturing this item.
    NotCapturing,
}

#[derive(Default)]
struct ItemState {
    size: Mutex<Size>,
    pool: Mutex<Weak<Mutex<PoolState>>>,
}

/// A capture source driven by the host. Clones refer to the same source.
#[derive(Clone, Default)]
pub struct SoftwareCaptureItem {
    state: Arc<ItemState>,
}

impl SoftwareCaptureItem {
    /// A new source of the given size.
    pub fn new(size: Size) -> Self {
        let item = Self::default();
        item.set_size(size);
        item
    }

    /// Change the reported source size.
    pub fn set_size(&self, size: Size) {
        *self.state.size.lock() = size;
    }

    /// Buffer a frame into the capturing pool and run the frame-arrived handler on this thread.
    pub fn push_frame(&self, texture: SoftwareTexture) -> Delivery {
        match self.queue_frame(texture) {
            Ok(notification) => {
                notification.fire();
                Delivery::Delivered
            }
            Err(delivery) => delivery,
        }
    }

    /// Buffer a frame into the capturing pool without running the handler yet.
    pub fn queue_frame(&self, texture: SoftwareTexture) -> Result<PendingNotification, Delivery> {
        let Some(pool) = self.state.pool.lock().upgrade() else {
            return Err(Delivery::NotCapturing);
        };

        let mut pool = pool.lock();
        if !pool.started || pool.closed {
            return Err(Delivery::NotCapturing);
        }

        if pool.buffered.len() + pool.outstanding >= pool.depth {
            trace!("Discarding frame, all {} pool buffers are in use", pool.depth);
            return Err(Delivery::PoolFull);
        }

        pool.buffered.push_back(texture);

        Ok(PendingNotification {
            handler: pool.handler.clone(),
        })
    }
}

impl CaptureItem for SoftwareCaptureItem {
    fn size(&self) -> Result<Size, GpuError> {
        Ok(*self.state.size.lock())
    }
}

/// A frame-arrived notification that has not been delivered yet.
#[must_use]
pub struct PendingNotification {
    handler: Option<FrameArrivedHandler>,
}

impl PendingNotification {
    /// Run the frame-arrived handler on this thread.
    pub fn fire(self) {
        if let Some(handler) = self.handler {
            handler();
        }
    }
}

/// A depth limited frame pool.
pub struct SoftwareFramePool {
    context: Context,
    state: PoolLink,
}

impl SoftwareFramePool {
    #[instrument("SoftwareFramePool::new", skip_all, err)]
    pub(super) fn new(
        context: Context,
        buffer_count: u32,
        size: Size,
    ) -> Result<Self, GpuError> {
        if buffer_count == 0 {
            return Err(GpuError::new(
                "SoftwareFramePool::new",
                SoftwareError::BufferCount(buffer_count),
            ));
        }

        let state = PoolState {
            depth: buffer_count as usize,
            ..Default::default()
        };

        context.journal.record(Event::CreateFramePool(size));

        Ok(Self {
            context,
            state: Arc::new(Mutex::new(state)),
        })
    }

    pub(super) fn session(
        &self,
        item: &SoftwareCaptureItem,
        options: &SessionOptions,
    ) -> SoftwareSession {
        *item.state.pool.lock() = Arc::downgrade(&self.state);
        self.context.journal.record(Event::CreateSession {
            capture_cursor: options.capture_cursor,
        });

        SoftwareSession {
            context: self.context.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl FramePool for SoftwareFramePool {
    type Frame = SoftwareFrame;

    fn try_next_frame(&self) -> Result<Option<Self::Frame>, GpuError> {
        let _guard = self.context.enter();

        let mut state = self.state.lock();
        if state.closed {
            return Ok(None);
        }

        let Some(texture) = state.buffered.pop_front() else {
            return Ok(None);
        };
        state.outstanding += 1;

        Ok(Some(SoftwareFrame {
            context: self.context.clone(),
            content_size: texture.size(),
            texture: Arc::new(texture),
            pool: Arc::downgrade(&self.state),
        }))
    }

    fn recreate(&mut self, size: Size) -> Result<(), GpuError> {
        let _guard = self.context.enter();
        self.context
            .check(FaultStage::RecreatePool, "SoftwareFramePool::recreate")?;

        {
            self.state.lock().buffered.clear();
        }

        self.context.journal.record(Event::RecreateFramePool(size));
        Ok(())
    }

    fn set_frame_arrived(&mut self, handler: FrameArrivedHandler) -> Result<(), GpuError> {
        self.state.lock().handler = Some(handler);
        Ok(())
    }
}

impl Drop for SoftwareFramePool {
    fn drop(&mut self) {
        {
            let mut state = self.state.lock();
            state.closed = true;
            state.handler = None;
            state.buffered.clear();
        }

        self.context.journal.record(Event::Release(Resource::FramePool));
    }
}

/// A frame taken from a [`SoftwareFramePool`].
pub struct SoftwareFrame {
    context: Context,
    content_size: Size,
    texture: Arc<SoftwareTexture>,
    pool: Weak<Mutex<PoolState>>,
}

impl SoftwareFrame {
    pub(super) fn shared_texture(&self) -> Arc<SoftwareTexture> {
        Arc::clone(&self.texture)
    }
}

impl CapturedFrame for SoftwareFrame {
    fn content_size(&self) -> Result<Size, GpuError> {
        Ok(self.content_size)
    }
}

impl Drop for SoftwareFrame {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.upgrade() {
            let mut pool = pool.lock();
            pool.outstanding = pool.outstanding.saturating_sub(1);
        }

        self.context.journal.record(Event::ReleaseFrame);
    }
}

/// A session delivering an item's frames into a [`SoftwareFramePool`].
pub struct SoftwareSession {
    context: Context,
    state: PoolLink,
}

impl CaptureSession for SoftwareSession {
    fn start(&self) -> Result<(), GpuError> {
        self.state.lock().started = true;
        self.context.journal.record(Event::StartSession);
        Ok(())
    }
}

impl Drop for SoftwareSession {
    fn drop(&mut self) {
        self.state.lock().started = false;
        self.context.journal.record(Event::Release(Resource::Session));
    }
}
