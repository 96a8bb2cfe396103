use tracing::{debug, error, warn};

use crate::{
    CapturedFrame, FrameError, FrameOutcome, FramePool, GpuDevice, PresentationSurface, QuadPass,
    stats::FrameCounters,
};

use super::Presenter;

type Frame<D> = <<D as GpuDevice>::FramePool as FramePool>::Frame;

impl<D: GpuDevice> Presenter<D> {
    /// Take one frame from the pool and present it, resizing first if the content size changed.
    ///
    /// Never fails, a failing step drops the frame and the next notification starts afresh.
    pub(crate) fn process_frame(&mut self, counters: &FrameCounters) -> FrameOutcome {
        let frame = match self.frame_pool.try_next_frame() {
            Ok(Some(frame)) => frame,

            Ok(None) => {
                debug!("Frame arrived but the frame pool had no frame ready");
                counters.no_frame();
                return FrameOutcome::NoFrame;
            }

            Err(error) => return self.drop_frame(FrameError::Acquire(error), counters),
        };

        match self.render_frame(frame, counters) {
            Ok(outcome) => outcome,
            Err(error) => self.drop_frame(error, counters),
        }
    }

    fn render_frame(
        &mut self,
        frame: Frame<D>,
        counters: &FrameCounters,
    ) -> Result<FrameOutcome, FrameError> {
        let content_size = frame.content_size().map_err(FrameError::ContentSize)?;

        if content_size.is_empty() {
            debug!("Skipping frame with {content_size} content");
            counters.empty();
            return Ok(FrameOutcome::Empty);
        }

        let resized = content_size != self.last_size;
        if resized {
            debug!(
                "Content size changed from {} to {content_size}",
                self.last_size
            );

            self.surface
                .resize(content_size)
                .map_err(|source| FrameError::Resize {
                    size: content_size,
                    source,
                })?;

            self.last_size = content_size;
            self.pool_stale = true;
            counters.resized();
        }

        let render_target = self
            .device
            .create_render_target(&self.surface)
            .map_err(FrameError::RenderTarget)?;

        {
            let shader_resource = self
                .device
                .create_shader_resource(&frame)
                .map_err(FrameError::ShaderResource)?;

            let pass = QuadPass {
                render_target: &render_target,
                pipeline: &self.pipeline,
                shader_resource: &shader_resource,
                viewport: self.last_size,
                clear_colour: self.clear_colour,
            };

            self.device.draw_quad(&pass).map_err(FrameError::Draw)?;
        }

        drop(render_target);
        drop(frame);

        self.surface.present().map_err(FrameError::Present)?;
        counters.presented();

        // Only after the frame from the old pool has been presented.
        if self.pool_stale {
            self.recreate_frame_pool(counters);
        }

        Ok(FrameOutcome::Presented { resized })
    }

    fn recreate_frame_pool(&mut self, counters: &FrameCounters) {
        match self.frame_pool.recreate(self.last_size) {
            Ok(()) => {
                debug!("Recreated frame pool at {}", self.last_size);
                self.pool_stale = false;
                counters.pool_recreated();
            }

            Err(error) => {
                warn!(
                    "Failed to recreate the frame pool at {}, retrying after the next present:\n{error}",
                    self.last_size
                );
            }
        }
    }

    fn drop_frame(&self, error: FrameError, counters: &FrameCounters) -> FrameOutcome {
        error!("Failed to render frame:\n{error}");

        if let Some(reason) = self.device.removal_reason() {
            error!("Device removed reason: {reason}");
        }

        counters.dropped();
        FrameOutcome::Dropped(error)
    }
}
