use alloc::sync::Arc;
use core::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::Size;

/// The resources a software capture releases on dispose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The capture session.
    Session,
    /// The frame pool.
    FramePool,
    /// The presentation surface.
    Surface,
    /// The device.
    Device,
    /// The static pipeline state.
    Pipeline,
}

/// The steps a fault can be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultStage {
    /// Creating the render target.
    RenderTarget,
    /// Creating the frame shader resource.
    ShaderResource,
    /// Drawing the quad.
    Draw,
    /// Presenting the surface.
    Present,
    /// Resizing the surface.
    Resize,
    /// Recreating the frame pool.
    RecreatePool,
}

/// Something the software backend did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A surface was created.
    CreateSurface(Size),
    /// The surface buffers were replaced.
    ResizeSurface(Size),
    /// The pipeline was created.
    CreatePipeline,
    /// A frame pool was created.
    CreateFramePool(Size),
    /// The frame pool was recreated.
    RecreateFramePool(Size),
    /// A session was created.
    CreateSession {
        /// If the cursor is drawn into captured frames.
        capture_cursor: bool,
    },
    /// The session started.
    StartSession,
    /// A render target was created against the surface buffers of `generation`.
    CreateRenderTarget {
        /// The surface buffer generation.
        generation: u64,
    },
    /// A frame shader resource was created.
    CreateShaderResource,
    /// A frame shader resource was released.
    ReleaseShaderResource,
    /// The quad was drawn.
    Draw {
        /// The surface buffer generation drawn into.
        generation: u64,
        /// The bound viewport.
        viewport: Size,
    },
    /// A frame was returned to its pool.
    ReleaseFrame,
    /// The surface was presented at the given size.
    Present(Size),
    /// An injected fault fired.
    Fault(FaultStage),
    /// A resource was released.
    Release(Resource),
}

#[derive(Debug, Default)]
struct JournalState {
    events: Mutex<Vec<Event>>,
    live_shader_resources: AtomicUsize,
    peak_shader_resources: AtomicUsize,
    reentrancy_violations: AtomicUsize,
}

/// An ordered log of everything the software backend did, shared by every object it creates.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    state: Arc<JournalState>,
}

impl Journal {
    /// A copy of all recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.state.events.lock().clone()
    }

    /// The number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.state
            .events
            .lock()
            .iter()
            .filter(|event| predicate(event))
            .count()
    }

    /// The number of presents.
    pub fn presents(&self) -> usize {
        self.count(|event| matches!(event, Event::Present(_)))
    }

    /// The released resources in release order.
    pub fn releases(&self) -> Vec<Resource> {
        self.state
            .events
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Release(resource) => Some(*resource),
                _ => None,
            })
            .collect()
    }

    /// Frame shader resources currently alive.
    pub fn live_shader_resources(&self) -> usize {
        self.state.live_shader_resources.load(Ordering::Acquire)
    }

    /// The most frame shader resources that were ever alive at once.
    pub fn peak_shader_resources(&self) -> usize {
        self.state.peak_shader_resources.load(Ordering::Acquire)
    }

    /// Times a backend call started while another was still running.
    pub fn reentrancy_violations(&self) -> usize {
        self.state.reentrancy_violations.load(Ordering::Acquire)
    }

    /// Forget all recorded events, counters are kept.
    pub fn clear(&self) {
        self.state.events.lock().clear();
    }

    pub(crate) fn record(&self, event: Event) {
        self.state.events.lock().push(event);
    }

    pub(crate) fn shader_resource_created(&self) {
        let live = self
            .state
            .live_shader_resources
            .fetch_add(1, Ordering::AcqRel)
            + 1;
        self.state
            .peak_shader_resources
            .fetch_max(live, Ordering::AcqRel);
        self.record(Event::CreateShaderResource);
    }

    pub(crate) fn shader_resource_released(&self) {
        self.state
            .live_shader_resources
            .fetch_sub(1, Ordering::AcqRel);
        self.record(Event::ReleaseShaderResource);
    }

    pub(crate) fn reentered(&self) {
        self.state
            .reentrancy_violations
            .fetch_add(1, Ordering::AcqRel);
    }
}
