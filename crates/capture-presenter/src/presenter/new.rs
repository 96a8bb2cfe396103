use tracing::{debug, instrument};

use crate::{
    BUFFER_COUNT, CaptureItem, CreationError, FrameArrivedHandler, FramePool, GpuDevice,
    LiveCaptureOptions, PixelFormat,
};

use super::Presenter;

impl<D: GpuDevice> Presenter<D> {
    /// Create every resource of the capture, then register `on_frame_arrived`.
    #[instrument("Presenter::new", skip_all, err)]
    pub(crate) fn new(
        device: D,
        item: D::Item,
        options: &LiveCaptureOptions,
        on_frame_arrived: FrameArrivedHandler,
    ) -> Result<Self, CreationError> {
        let format = PixelFormat::Bgra8Unorm;

        let size = item.size().map_err(CreationError::ItemSize)?;
        if size.is_empty() {
            return Err(CreationError::EmptyCaptureItem(size));
        }

        let surface = device
            .create_surface(format, BUFFER_COUNT, size)
            .map_err(CreationError::Surface)?;

        let mut frame_pool = device
            .create_frame_pool(format, BUFFER_COUNT, size)
            .map_err(CreationError::FramePool)?;

        let session = device
            .create_session(&frame_pool, &item, &options.session)
            .map_err(CreationError::Session)?;

        let pipeline = device.create_pipeline(&options.pipeline)?;

        frame_pool
            .set_frame_arrived(on_frame_arrived)
            .map_err(CreationError::FrameArrived)?;

        debug!("Created presenter for {size} capture");

        Ok(Self {
            session,
            frame_pool,
            surface,
            device,
            pipeline,
            _item: item,

            clear_colour: options.clear_colour,

            last_size: size,
            pool_stale: false,
        })
    }
}
