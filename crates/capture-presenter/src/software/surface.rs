use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::instrument;

use crate::{GpuError, PresentationSurface, Size};

use super::{Context, Event, FaultStage, Resource, SoftwareError, SoftwareTexture};

#[derive(Debug, Default)]
struct PresentedState {
    latest: Option<SoftwareTexture>,
    presents: u64,
}

/// The presentable handle of a [`SoftwareSurface`], holds the most recently presented image.
#[derive(Debug, Clone, Default)]
pub struct SoftwarePresentable {
    state: Arc<Mutex<PresentedState>>,
}

impl SoftwarePresentable {
    /// A copy of the most recently presented image.
    pub fn latest(&self) -> Option<SoftwareTexture> {
        self.state.lock().latest.clone()
    }

    /// The number of presents.
    pub fn present_count(&self) -> u64 {
        self.state.lock().presents
    }

    /// If both handles refer to the same surface.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

/// A two buffer surface that flips on present.
pub struct SoftwareSurface {
    context: Context,
    size: Size,

    buffers: [Arc<Mutex<SoftwareTexture>>; 2],
    back_buffer: usize,

    /// Bumped each time the buffers are replaced.
    generation: Arc<AtomicU64>,

    presentable: SoftwarePresentable,
}

impl SoftwareSurface {
    #[instrument("SoftwareSurface::new", skip_all, err)]
    pub(super) fn new(
        context: Context,
        buffer_count: u32,
        size: Size,
    ) -> Result<Self, GpuError> {
        const CALL: &str = "SoftwareSurface::new";

        if buffer_count != 2 {
            return Err(GpuError::new(CALL, SoftwareError::BufferCount(buffer_count)));
        }
        if size.is_empty() {
            return Err(GpuError::new(CALL, SoftwareError::EmptySize(size)));
        }

        context.journal.record(Event::CreateSurface(size));

        Ok(Self {
            context,
            size,
            buffers: Self::create_buffers(size),
            back_buffer: 0,
            generation: Arc::new(AtomicU64::new(0)),
            presentable: SoftwarePresentable::default(),
        })
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub(super) fn render_target(&self) -> SoftwareRenderTarget {
        SoftwareRenderTarget {
            buffer: Arc::clone(&self.buffers[self.back_buffer]),
            generation: self.generation(),
            surface_generation: Arc::clone(&self.generation),
        }
    }

    fn create_buffers(size: Size) -> [Arc<Mutex<SoftwareTexture>>; 2] {
        [
            Arc::new(Mutex::new(SoftwareTexture::new(size))),
            Arc::new(Mutex::new(SoftwareTexture::new(size))),
        ]
    }
}

impl PresentationSurface for SoftwareSurface {
    type Handle = SoftwarePresentable;

    fn handle(&self) -> Self::Handle {
        self.presentable.clone()
    }

    fn size(&self) -> Size {
        self.size
    }

    fn resize(&mut self, size: Size) -> Result<(), GpuError> {
        let _guard = self.context.enter();
        self.context
            .check(FaultStage::Resize, "SoftwareSurface::resize")?;

        if size.is_empty() {
            return Err(GpuError::new(
                "SoftwareSurface::resize",
                SoftwareError::EmptySize(size),
            ));
        }

        self.buffers = Self::create_buffers(size);
        self.back_buffer = 0;
        self.size = size;
        self.generation.fetch_add(1, Ordering::AcqRel);

        self.context.journal.record(Event::ResizeSurface(size));
        Ok(())
    }

    fn present(&mut self) -> Result<(), GpuError> {
        let _guard = self.context.enter();
        self.context
            .check(FaultStage::Present, "SoftwareSurface::present")?;

        let image = self.buffers[self.back_buffer].lock().clone();
        {
            let mut presented = self.presentable.state.lock();
            presented.latest = Some(image);
            presented.presents += 1;
        }

        self.back_buffer = (self.back_buffer + 1) % self.buffers.len();
        self.context.journal.record(Event::Present(self.size));
        Ok(())
    }
}

impl Drop for SoftwareSurface {
    fn drop(&mut self) {
        self.context.journal.record(Event::Release(Resource::Surface));
    }
}

/// A view over one surface back buffer.
pub struct SoftwareRenderTarget {
    pub(super) buffer: Arc<Mutex<SoftwareTexture>>,
    pub(super) generation: u64,
    surface_generation: Arc<AtomicU64>,
}

impl SoftwareRenderTarget {
    /// Error if the surface buffers were replaced after this view was created.
    pub(super) fn ensure_current(&self) -> Result<(), SoftwareError> {
        let surface = self.surface_generation.load(Ordering::Acquire);
        if surface != self.generation {
            return Err(SoftwareError::StaleRenderTarget {
                target: self.generation,
                surface,
            });
        }

        Ok(())
    }
}

/// A view over one captured frame.
pub struct SoftwareShaderResource {
    pub(super) context: Context,
    pub(super) texture: Arc<SoftwareTexture>,
}

impl Drop for SoftwareShaderResource {
    fn drop(&mut self) {
        self.context.journal.shader_resource_released();
    }
}
