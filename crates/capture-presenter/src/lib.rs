//! # Capture Presenter
//! Presents live capture frames onto a double-buffered surface through a textured-quad shader
//! pass, resizing the surface and recreating the frame pool when the captured content changes size.
//!

extern crate alloc;

pub use backend::{
    CaptureItem, CaptureSession, CapturedFrame, FrameArrivedHandler, FramePool, GpuDevice,
    PresentationSurface, QuadPass, SessionOptions,
};
pub use error::{GpuError, RemovalReason};
pub use live_capture::{CreationError, LiveCapture, LiveCaptureOptions, StartError};
pub use pipeline::{
    AddressMode, AttributeFormat, Filter, INPUT_LAYOUT, PipelineError, QUAD_VERTICES, SAMPLER,
    SamplerDesc, ShaderCode, ShaderPipelineDesc, ShaderProgram, ShaderSource, ShaderStage,
    VERTEX_STRIDE, Vertex, VertexAttribute,
};
pub use presenter::{FrameError, FrameOutcome};
pub use size::{PixelFormat, Size};
pub use stats::FrameStats;

#[cfg(windows)]
pub mod d3d11;
pub mod software;

mod backend;
mod error;
mod live_capture;
mod pipeline;
mod presenter;
mod size;
mod stats;

/// The number of buffers in both the frame pool and the presentation surface.
pub const BUFFER_COUNT: u32 = 2;
