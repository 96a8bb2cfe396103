use core::ffi::c_void;

use capture_presenter::{
    CreationError, GpuError, LiveCapture, StartError,
    d3d11::{Direct3D11, create_composition_surface},
};
use raw_window_handle::{HandleError, HasWindowHandle, RawWindowHandle};
use thiserror::Error;
use tracing::{info, info_span, instrument};
use windows::{
    System::DispatcherQueueController,
    UI::Composition::{CompositionStretch, Compositor, Desktop::DesktopWindowTarget, SpriteVisual},
    Win32::{
        Foundation::HWND,
        System::WinRT::{
            Composition::ICompositorDesktopInterop, CreateDispatcherQueueController,
            DQTAT_COM_NONE, DQTYPE_THREAD_CURRENT, DispatcherQueueOptions,
        },
    },
    core::Interface,
};
use windows_numerics::Vector2;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    error::OsError,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::{
    config::Config,
    target::{TargetError, resolve_target},
    utilities::failure::Failure,
};

pub struct App {
    config: Config,
    viewer: Option<Viewer>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            viewer: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }

        let viewer =
            Viewer::new(event_loop, &self.config).report_and_panic("Could not start the capture");
        self.viewer = Some(viewer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => event_loop.exit(),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = self.viewer.take() {
            viewer.close();
        }
    }
}

/// A window showing one live capture through a composition visual.
struct Viewer {
    capture: LiveCapture<Direct3D11>,

    _visual: SpriteVisual,
    _target: DesktopWindowTarget,
    _compositor: Compositor,
    _dispatcher: DispatcherQueueController,
    _window: Window,
}

impl Viewer {
    #[instrument("Viewer::new", skip_all, err)]
    fn new(event_loop: &ActiveEventLoop, config: &Config) -> Result<Self, ViewerError> {
        // Resolve before the viewer window exists so it can never be the target.
        let item = resolve_target(&config.target)?;

        let window = {
            let attributes = Window::default_attributes()
                .with_title("Capture Viewer")
                .with_inner_size(LogicalSize::new(1280.0, 720.0));

            event_loop.create_window(attributes)?
        };
        let hwnd = window_hwnd(&window)?;

        let dispatcher = {
            let options = DispatcherQueueOptions {
                dwSize: size_of::<DispatcherQueueOptions>() as u32,
                threadType: DQTYPE_THREAD_CURRENT,
                apartmentType: DQTAT_COM_NONE,
            };

            unsafe { CreateDispatcherQueueController(options) }
                .map_err(|e| GpuError::new("CreateDispatcherQueueController", e))?
        };

        let device = Direct3D11::new().map_err(ViewerError::Device)?;
        let capture = LiveCapture::new(device, item, config.live_capture_options())?;

        let compositor = Compositor::new().map_err(|e| GpuError::new("Compositor::new", e))?;

        let target = {
            let interop: ICompositorDesktopInterop = compositor
                .cast()
                .map_err(|e| GpuError::new("Compositor::cast", e))?;

            unsafe { interop.CreateDesktopWindowTarget(hwnd, true) }.map_err(|e| {
                GpuError::new("ICompositorDesktopInterop::CreateDesktopWindowTarget", e)
            })?
        };

        let visual = {
            let surface = create_composition_surface(&compositor, capture.presentable())?;

            let brush = compositor
                .CreateSurfaceBrushWithSurface(&surface)
                .map_err(|e| GpuError::new("Compositor::CreateSurfaceBrushWithSurface", e))?;
            brush
                .SetStretch(CompositionStretch::Uniform)
                .map_err(|e| GpuError::new("CompositionSurfaceBrush::SetStretch", e))?;

            let visual = compositor
                .CreateSpriteVisual()
                .map_err(|e| GpuError::new("Compositor::CreateSpriteVisual", e))?;
            visual
                .SetRelativeSizeAdjustment(Vector2 { X: 1.0, Y: 1.0 })
                .map_err(|e| GpuError::new("SpriteVisual::SetRelativeSizeAdjustment", e))?;
            visual
                .SetBrush(&brush)
                .map_err(|e| GpuError::new("SpriteVisual::SetBrush", e))?;

            target
                .SetRoot(&visual)
                .map_err(|e| GpuError::new("DesktopWindowTarget::SetRoot", e))?;

            visual
        };

        capture.start_capture()?;

        Ok(Self {
            capture,
            _visual: visual,
            _target: target,
            _compositor: compositor,
            _dispatcher: dispatcher,
            _window: window,
        })
    }

    fn close(self) {
        let _span = info_span!("Viewer::close").entered();

        self.capture.dispose();

        let stats = self.capture.stats();
        info!(
            "Presented {} frames, dropped {}, {} notifications without a frame, {} empty frames",
            stats.presented, stats.dropped, stats.no_frame, stats.empty
        );
        info!(
            "Resized {} times, recreated the frame pool {} times",
            stats.resizes, stats.pool_recreations
        );
    }
}

fn window_hwnd(window: &Window) -> Result<HWND, ViewerError> {
    match window.window_handle()?.as_raw() {
        RawWindowHandle::Win32(handle) => Ok(HWND(handle.hwnd.get() as *mut c_void)),
        _ => Err(ViewerError::UnsupportedWindow),
    }
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Failed to resolve the capture target:\n{0}")]
    Target(#[from] TargetError),

    #[error("Failed to create the window:\n{0}")]
    Window(#[from] OsError),

    #[error("Failed to get the window handle:\n{0}")]
    WindowHandle(#[from] HandleError),

    #[error("The window is not a Win32 window")]
    UnsupportedWindow,

    #[error("Failed to create the Direct3D device:\n{0}")]
    Device(#[source] GpuError),

    #[error("Failed to set up composition:\n{0}")]
    Composition(#[from] GpuError),

    #[error("Failed to create the live capture:\n{0}")]
    Capture(#[from] CreationError),

    #[error("Failed to start the live capture:\n{0}")]
    Start(#[from] StartError),
}
