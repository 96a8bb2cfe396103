use thiserror::Error;

use crate::{GpuDevice, GpuError, Size};

mod frame;
mod new;

/// Owns every resource of one live capture and turns arrived frames into presented images.
///
/// Field order is the release order.
pub(crate) struct Presenter<D: GpuDevice> {
    session: D::Session,
    frame_pool: D::FramePool,
    surface: D::Surface,
    device: D,
    pipeline: D::Pipeline,
    _item: D::Item,

    clear_colour: [f32; 4],

    /// The content size of the most recently processed frame.
    last_size: Size,

    /// The surface was resized but recreating the frame pool to match has not succeeded yet.
    pool_stale: bool,
}

impl<D: GpuDevice> Presenter<D> {
    pub(crate) fn session(&self) -> &D::Session {
        &self.session
    }

    pub(crate) fn surface(&self) -> &D::Surface {
        &self.surface
    }

    pub(crate) fn last_size(&self) -> Size {
        self.last_size
    }
}

/// How a frame-arrived notification was handled.
#[derive(Debug)]
#[non_exhaustive]
pub enum FrameOutcome {
    /// The frame was drawn and presented.
    Presented {
        /// If the surface was resized to fit the frame.
        resized: bool,
    },

    /// The pool had no frame ready.
    NoFrame,

    /// The frame's content was zero sized and was released without drawing.
    Empty,

    /// A step failed, the frame was released and nothing was presented.
    Dropped(FrameError),

    /// The capture has been disposed.
    Disposed,
}

impl FrameOutcome {
    /// If a frame was presented.
    pub fn is_presented(&self) -> bool {
        matches!(self, Self::Presented { .. })
    }
}

/// Error variants from processing a single frame.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameError {
    /// Taking the frame from the pool failed.
    #[error("Failed to get the next frame:\n{0}")]
    Acquire(#[source] GpuError),

    /// The frame's content size could not be read.
    #[error("Failed to get the frame content size:\n{0}")]
    ContentSize(#[source] GpuError),

    /// The surface could not be resized.
    #[error("Failed to resize the surface to {size}:\n{source}")]
    Resize {
        /// The requested size.
        size: Size,
        /// The device error.
        #[source]
        source: GpuError,
    },

    /// The render target could not be created.
    #[error("Failed to create the render target:\n{0}")]
    RenderTarget(#[source] GpuError),

    /// The frame could not be wrapped as a shader resource.
    #[error("Failed to create the frame shader resource:\n{0}")]
    ShaderResource(#[source] GpuError),

    /// Drawing failed.
    #[error("Failed to draw the frame:\n{0}")]
    Draw(#[source] GpuError),

    /// Presenting failed.
    #[error("Failed to present the frame:\n{0}")]
    Present(#[source] GpuError),
}

impl FrameError {
    /// The underlying device error.
    pub fn gpu_error(&self) -> &GpuError {
        match self {
            Self::Acquire(source)
            | Self::ContentSize(source)
            | Self::Resize { source, .. }
            | Self::RenderTarget(source)
            | Self::ShaderResource(source)
            | Self::Draw(source)
            | Self::Present(source) => source,
        }
    }

    /// If the failure was caused by the device being lost.
    pub fn is_device_lost(&self) -> bool {
        self.gpu_error().is_device_lost()
    }
}
