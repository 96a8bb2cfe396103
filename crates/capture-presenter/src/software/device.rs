use tracing::instrument;

use crate::{
    GpuDevice, GpuError, PipelineError, PixelFormat, QuadPass, RemovalReason, SessionOptions,
    ShaderPipelineDesc, Size,
};

use super::{
    Context, Event, FaultInjector, FaultStage, Journal, Resource, SoftwareCaptureItem,
    SoftwareFrame, SoftwareFramePool, SoftwarePipeline, SoftwareRenderTarget, SoftwareSession,
    SoftwareShaderResource, SoftwareSurface, raster,
};

/// A CPU device. Every object it creates shares its [`Journal`] and [`FaultInjector`].
#[derive(Default)]
pub struct SoftwareDevice {
    context: Context,
}

impl SoftwareDevice {
    /// Create a new device with an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// The journal shared by this device and everything it creates.
    pub fn journal(&self) -> Journal {
        self.context.journal.clone()
    }

    /// The fault injector for this device.
    pub fn faults(&self) -> FaultInjector {
        self.context.faults.clone()
    }
}

impl GpuDevice for SoftwareDevice {
    type Item = SoftwareCaptureItem;
    type FramePool = SoftwareFramePool;
    type Session = SoftwareSession;
    type Surface = SoftwareSurface;
    type Pipeline = SoftwarePipeline;
    type RenderTarget = SoftwareRenderTarget;
    type ShaderResource = SoftwareShaderResource;

    fn create_surface(
        &self,
        _format: PixelFormat,
        buffer_count: u32,
        size: Size,
    ) -> Result<Self::Surface, GpuError> {
        SoftwareSurface::new(self.context.clone(), buffer_count, size)
    }

    fn create_pipeline(&self, desc: &ShaderPipelineDesc) -> Result<Self::Pipeline, PipelineError> {
        SoftwarePipeline::new(self.context.clone(), desc)
    }

    // Software textures are always BGRA8 so the format is not stored.
    fn create_frame_pool(
        &self,
        _format: PixelFormat,
        buffer_count: u32,
        size: Size,
    ) -> Result<Self::FramePool, GpuError> {
        SoftwareFramePool::new(self.context.clone(), buffer_count, size)
    }

    #[instrument("SoftwareDevice::create_session", skip_all, err)]
    fn create_session(
        &self,
        pool: &Self::FramePool,
        item: &Self::Item,
        options: &SessionOptions,
    ) -> Result<Self::Session, GpuError> {
        Ok(pool.session(item, options))
    }

    fn create_render_target(
        &self,
        surface: &Self::Surface,
    ) -> Result<Self::RenderTarget, GpuError> {
        let _guard = self.context.enter();
        self.context.check(
            FaultStage::RenderTarget,
            "SoftwareDevice::create_render_target",
        )?;

        let render_target = surface.render_target();
        self.context.journal.record(Event::CreateRenderTarget {
            generation: render_target.generation,
        });

        Ok(render_target)
    }

    fn create_shader_resource(
        &self,
        frame: &SoftwareFrame,
    ) -> Result<Self::ShaderResource, GpuError> {
        let _guard = self.context.enter();
        self.context.check(
            FaultStage::ShaderResource,
            "SoftwareDevice::create_shader_resource",
        )?;

        self.context.journal.shader_resource_created();

        Ok(SoftwareShaderResource {
            context: self.context.clone(),
            texture: frame.shared_texture(),
        })
    }

    fn draw_quad(&self, pass: &QuadPass<'_, Self>) -> Result<(), GpuError> {
        const CALL: &str = "SoftwareDevice::draw_quad";

        let _guard = self.context.enter();
        self.context.check(FaultStage::Draw, CALL)?;

        let render_target = pass.render_target;
        render_target
            .ensure_current()
            .map_err(|error| GpuError::new(CALL, error))?;

        {
            let mut target = render_target.buffer.lock();
            raster::clear(&mut target, pass.clear_colour);
            raster::draw_strip(
                &mut target,
                pass.viewport,
                &pass.pipeline.vertices,
                &pass.shader_resource.texture,
                pass.pipeline.sampler,
            );
        }

        self.context.journal.record(Event::Draw {
            generation: render_target.generation,
            viewport: pass.viewport,
        });

        Ok(())
    }

    fn removal_reason(&self) -> Option<RemovalReason> {
        self.context.faults.take_removal_reason()
    }
}

impl Drop for SoftwareDevice {
    fn drop(&mut self) {
        self.context.journal.record(Event::Release(Resource::Device));
    }
}
