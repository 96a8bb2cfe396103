//! The seams between the presenter and a graphics/capture backend.
//!

use alloc::sync::Arc;

use crate::{GpuError, PipelineError, PixelFormat, RemovalReason, ShaderPipelineDesc, Size};

/// Callback invoked by a frame pool each time a frame becomes available. May be called from any
/// thread.
pub type FrameArrivedHandler = Arc<dyn Fn() + Send + Sync>;

/// The source being captured, a window or a display.
pub trait CaptureItem: Send + 'static {
    /// The current size of the source.
    fn size(&self) -> Result<Size, GpuError>;
}

/// A single frame taken out of a frame pool. Dropping it returns its surface to the pool.
pub trait CapturedFrame: Send {
    /// The size of the captured content in this frame.
    fn content_size(&self) -> Result<Size, GpuError>;
}

/// A fixed-size, fixed-format pool of capture surfaces the OS writes frames into.
pub trait FramePool: Send + 'static {
    /// The frame type handed out by this pool.
    type Frame: CapturedFrame;

    /// Take the next available frame, `None` if no frame is ready.
    fn try_next_frame(&self) -> Result<Option<Self::Frame>, GpuError>;

    /// Rebuild the pool's buffers at a new size, keeping the format and buffer count.
    fn recreate(&mut self, size: Size) -> Result<(), GpuError>;

    /// Register the callback for frame arrival. Replaces any previous callback.
    fn set_frame_arrived(&mut self, handler: FrameArrivedHandler) -> Result<(), GpuError>;
}

/// An active binding between a capture item and a frame pool.
pub trait CaptureSession: Send + 'static {
    /// Begin delivering frames into the pool.
    fn start(&self) -> Result<(), GpuError>;
}

/// A double-buffered surface that can be handed to a compositor.
pub trait PresentationSurface: Send + 'static {
    /// The object the host attaches to its compositor.
    type Handle: Clone + 'static;

    /// The presentable handle. Identity is stable across resizes.
    fn handle(&self) -> Self::Handle;

    /// The current buffer size.
    fn size(&self) -> Size;

    /// Replace the buffers in place with buffers of a new size.
    fn resize(&mut self, size: Size) -> Result<(), GpuError>;

    /// Present the current back buffer with no vertical sync.
    fn present(&mut self) -> Result<(), GpuError>;
}

/// Options applied to a capture session on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// If the cursor should be drawn into captured frames.
    pub capture_cursor: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            capture_cursor: true,
        }
    }
}

/// Everything needed to draw one captured frame as a full surface quad.
pub struct QuadPass<'a, D: GpuDevice> {
    /// View over the current back buffer.
    pub render_target: &'a D::RenderTarget,
    /// The static pipeline state.
    pub pipeline: &'a D::Pipeline,
    /// View over the captured frame.
    pub shader_resource: &'a D::ShaderResource,
    /// The viewport to draw into.
    pub viewport: Size,
    /// Colour the render target is cleared to before drawing.
    pub clear_colour: [f32; 4],
}

/// A device able to create every resource of the live capture pipeline and draw with them.
///
/// All calls are made while holding the presenter lock so implementations only ever see one
/// caller at a time.
pub trait GpuDevice: Send + Sized + 'static {
    /// The capture source type.
    type Item: CaptureItem;
    /// The frame pool type.
    type FramePool: FramePool;
    /// The capture session type.
    type Session: CaptureSession;
    /// The presentation surface type.
    type Surface: PresentationSurface;
    /// The static shader pipeline state.
    type Pipeline: Send + 'static;
    /// A view over a surface back buffer.
    type RenderTarget;
    /// A view over a captured frame.
    type ShaderResource;

    /// Create a presentation surface.
    fn create_surface(
        &self,
        format: PixelFormat,
        buffer_count: u32,
        size: Size,
    ) -> Result<Self::Surface, GpuError>;

    /// Load the shaders and create the static pipeline state.
    fn create_pipeline(&self, desc: &ShaderPipelineDesc) -> Result<Self::Pipeline, PipelineError>;

    /// Create a free threaded frame pool.
    fn create_frame_pool(
        &self,
        format: PixelFormat,
        buffer_count: u32,
        size: Size,
    ) -> Result<Self::FramePool, GpuError>;

    /// Create a session that captures `item` into `pool`.
    fn create_session(
        &self,
        pool: &Self::FramePool,
        item: &Self::Item,
        options: &SessionOptions,
    ) -> Result<Self::Session, GpuError>;

    /// Create a view over the surface's current back buffer.
    fn create_render_target(&self, surface: &Self::Surface)
    -> Result<Self::RenderTarget, GpuError>;

    /// Create a view over a captured frame.
    fn create_shader_resource(
        &self,
        frame: &<Self::FramePool as FramePool>::Frame,
    ) -> Result<Self::ShaderResource, GpuError>;

    /// Bind the pass, clear the render target and draw the quad.
    fn draw_quad(&self, pass: &QuadPass<'_, Self>) -> Result<(), GpuError>;

    /// Why the device was removed, `None` if it is healthy or the reason cannot be queried.
    fn removal_reason(&self) -> Option<RemovalReason>;
}
