use alloc::sync::{Arc, Weak};
use core::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    CaptureSession, FrameArrivedHandler, FrameOutcome, FrameStats, GpuDevice, GpuError,
    PipelineError, PresentationSurface, SessionOptions, ShaderPipelineDesc, Size,
    presenter::Presenter, stats::FrameCounters,
};

/// Options for creating a [`LiveCapture`].
#[derive(Debug, Clone, PartialEq)]
pub struct LiveCaptureOptions {
    /// The shaders used to draw frames.
    pub pipeline: ShaderPipelineDesc,
    /// The background colour behind each frame.
    pub clear_colour: [f32; 4],
    /// Capture session options.
    pub session: SessionOptions,
}

impl Default for LiveCaptureOptions {
    fn default() -> Self {
        Self {
            pipeline: ShaderPipelineDesc::default(),
            clear_colour: [0.0, 0.0, 0.0, 1.0],
            session: SessionOptions::default(),
        }
    }
}

struct Shared<D: GpuDevice> {
    presenter: Mutex<Option<Presenter<D>>>,
    disposed: AtomicBool,
    counters: FrameCounters,
}

impl<D: GpuDevice> Shared<D> {
    fn on_frame_arrived(&self) -> FrameOutcome {
        if self.disposed.load(Ordering::Acquire) {
            return FrameOutcome::Disposed;
        }

        let mut presenter = self.presenter.lock();
        match presenter.as_mut() {
            Some(presenter) => presenter.process_frame(&self.counters),
            None => FrameOutcome::Disposed,
        }
    }
}

/// A live capture of one source, presented onto a surface the host attaches to its compositor.
///
/// Frame-arrived notifications may come from any thread, they are handled one at a time.
pub struct LiveCapture<D: GpuDevice> {
    shared: Arc<Shared<D>>,
    presentable: <D::Surface as PresentationSurface>::Handle,
    started: AtomicBool,
}

impl<D: GpuDevice> LiveCapture<D> {
    /// Create the surface, frame pool, session and pipeline for capturing `item`.
    ///
    /// Nothing is kept if any step fails.
    #[instrument("LiveCapture::new", skip_all, err)]
    pub fn new(
        device: D,
        item: D::Item,
        options: LiveCaptureOptions,
    ) -> Result<Self, CreationError> {
        let shared = Arc::new(Shared {
            presenter: Mutex::new(None),
            disposed: AtomicBool::new(false),
            counters: FrameCounters::default(),
        });

        let on_frame_arrived: FrameArrivedHandler = {
            let shared: Weak<Shared<D>> = Arc::downgrade(&shared);
            Arc::new(move || {
                if let Some(shared) = shared.upgrade() {
                    shared.on_frame_arrived();
                }
            })
        };

        let presenter = Presenter::new(device, item, &options, on_frame_arrived)?;
        let presentable = presenter.surface().handle();
        *shared.presenter.lock() = Some(presenter);

        Ok(Self {
            shared,
            presentable,
            started: AtomicBool::new(false),
        })
    }

    /// Start delivering frames. Calling this again after a successful start does nothing.
    pub fn start_capture(&self) -> Result<(), StartError> {
        if self.shared.disposed.load(Ordering::Acquire) {
            return Err(StartError::Disposed);
        }

        if self.started.swap(true, Ordering::AcqRel) {
            warn!("Capture has already been started");
            return Ok(());
        }

        let presenter = self.shared.presenter.lock();
        let Some(presenter) = presenter.as_ref() else {
            self.started.store(false, Ordering::Release);
            return Err(StartError::Disposed);
        };

        if let Err(error) = presenter.session().start() {
            self.started.store(false, Ordering::Release);
            return Err(StartError::Start(error));
        }

        info!("Started capture at {}", presenter.last_size());
        Ok(())
    }

    /// The surface to attach to the host compositor.
    pub fn presentable(&self) -> &<D::Surface as PresentationSurface>::Handle {
        &self.presentable
    }

    /// Handle a frame-arrived notification on the calling thread.
    pub fn handle_frame_arrived(&self) -> FrameOutcome {
        self.shared.on_frame_arrived()
    }

    /// The content size of the most recently processed frame, `None` once disposed.
    pub fn content_size(&self) -> Option<Size> {
        self.shared
            .presenter
            .lock()
            .as_ref()
            .map(|presenter| presenter.last_size())
    }

    /// Counts of how frames have been handled so far.
    pub fn stats(&self) -> FrameStats {
        self.shared.counters.snapshot()
    }

    /// If [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::Acquire)
    }

    /// Stop the capture and release the session, frame pool, surface, device and pipeline in that
    /// order. Calling this again does nothing.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Release outside of the lock so an in-flight notification can finish.
        let presenter = self.shared.presenter.lock().take();
        drop(presenter);

        let stats = self.stats();
        debug!(
            "Disposed capture after presenting {} frames, {} dropped",
            stats.presented, stats.dropped
        );
    }
}

impl<D: GpuDevice> Drop for LiveCapture<D> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Error variants from creating a live capture.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CreationError {
    /// The capture item has no area.
    #[error("The capture item is {0}, it must have a non-zero size")]
    EmptyCaptureItem(Size),

    /// The capture item size could not be read.
    #[error("Failed to get the capture item size:\n{0}")]
    ItemSize(#[source] GpuError),

    /// The presentation surface could not be created.
    #[error("Failed to create the presentation surface:\n{0}")]
    Surface(#[source] GpuError),

    /// The frame pool could not be created.
    #[error("Failed to create the frame pool:\n{0}")]
    FramePool(#[source] GpuError),

    /// The capture session could not be created.
    #[error("Failed to create the capture session:\n{0}")]
    Session(#[source] GpuError),

    /// The shader pipeline could not be created.
    #[error("Failed to create the shader pipeline:\n{0}")]
    Pipeline(#[from] PipelineError),

    /// The frame-arrived handler could not be registered.
    #[error("Failed to register the frame arrived handler:\n{0}")]
    FrameArrived(#[source] GpuError),
}

/// Error variants from starting a live capture.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StartError {
    /// The capture has been disposed.
    #[error("The capture has been disposed")]
    Disposed,

    /// The session failed to start.
    #[error("Failed to start the capture session:\n{0}")]
    Start(#[source] GpuError),
}
