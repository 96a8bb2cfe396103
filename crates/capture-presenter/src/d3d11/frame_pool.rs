use tracing::{error, instrument};
use windows::{
    Foundation::TypedEventHandler,
    Graphics::{
        Capture::{Direct3D11CaptureFrame, Direct3D11CaptureFramePool, GraphicsCaptureSession},
        DirectX::{Direct3D11::IDirect3DDevice, DirectXPixelFormat},
        SizeInt32,
    },
    Win32::{
        Graphics::Direct3D11::ID3D11Texture2D,
        System::WinRT::Direct3D11::IDirect3DDxgiInterfaceAccess,
    },
};
use windows_core::{IInspectable, Interface};

use crate::{
    CaptureSession, CapturedFrame, FrameArrivedHandler, FramePool, GpuError, PixelFormat,
    SessionOptions, Size,
};

use super::{Labelled, WindowsCaptureItem, error::label};

fn pixel_format(format: PixelFormat) -> DirectXPixelFormat {
    match format {
        PixelFormat::Bgra8Unorm => DirectXPixelFormat::B8G8R8A8UIntNormalized,
    }
}

fn size_int32(size: Size) -> SizeInt32 {
    SizeInt32 {
        Width: size.width as i32,
        Height: size.height as i32,
    }
}

/// A free threaded Windows Graphics Capture frame pool.
pub struct CaptureFramePool {
    frame_pool: Direct3D11CaptureFramePool,
    d3d_device: IDirect3DDevice,
    format: DirectXPixelFormat,
    buffer_count: i32,
    frame_arrived: Option<i64>,
}

// Only ever used while holding the presenter lock.
unsafe impl Send for CaptureFramePool {}

impl CaptureFramePool {
    #[instrument("CaptureFramePool::new", skip_all, err)]
    pub(super) fn new(
        d3d_device: &IDirect3DDevice,
        format: PixelFormat,
        buffer_count: u32,
        size: Size,
    ) -> Result<Self, GpuError> {
        let format = pixel_format(format);
        let buffer_count = buffer_count as i32;

        let frame_pool = Direct3D11CaptureFramePool::CreateFreeThreaded(
            d3d_device,
            format,
            buffer_count,
            size_int32(size),
        )
        .labelled("Direct3D11CaptureFramePool::CreateFreeThreaded")?;

        Ok(Self {
            frame_pool,
            d3d_device: d3d_device.clone(),
            format,
            buffer_count,
            frame_arrived: None,
        })
    }

    pub(super) fn create_session(
        &self,
        item: &WindowsCaptureItem,
        options: &SessionOptions,
    ) -> Result<WindowsCaptureSession, GpuError> {
        let session = self
            .frame_pool
            .CreateCaptureSession(item.item())
            .labelled("Direct3D11CaptureFramePool::CreateCaptureSession")?;

        // Wrap before configuring so the session is closed on failure.
        let session = WindowsCaptureSession { session };

        session
            .session
            .SetIsCursorCaptureEnabled(options.capture_cursor)
            .labelled("GraphicsCaptureSession::SetIsCursorCaptureEnabled")?;

        Ok(session)
    }

    fn remove_frame_arrived(&mut self) -> Result<(), GpuError> {
        if let Some(token) = self.frame_arrived.take() {
            self.frame_pool
                .RemoveFrameArrived(token)
                .labelled("Direct3D11CaptureFramePool::RemoveFrameArrived")?;
        }

        Ok(())
    }
}

impl FramePool for CaptureFramePool {
    type Frame = CaptureFrame;

    fn try_next_frame(&self) -> Result<Option<Self::Frame>, GpuError> {
        match self.frame_pool.TryGetNextFrame() {
            Ok(frame) => Ok(Some(CaptureFrame { frame })),

            // A null frame comes back as an error with a success code.
            Err(error) if error.code().is_ok() => Ok(None),

            Err(error) => Err(label(error, "Direct3D11CaptureFramePool::TryGetNextFrame")),
        }
    }

    fn recreate(&mut self, size: Size) -> Result<(), GpuError> {
        self.frame_pool
            .Recreate(
                &self.d3d_device,
                self.format,
                self.buffer_count,
                size_int32(size),
            )
            .labelled("Direct3D11CaptureFramePool::Recreate")
    }

    fn set_frame_arrived(&mut self, handler: FrameArrivedHandler) -> Result<(), GpuError> {
        self.remove_frame_arrived()?;

        let handler =
            TypedEventHandler::<Direct3D11CaptureFramePool, IInspectable>::new(move |_, _| {
                handler();
                Ok(())
            });

        let token = self
            .frame_pool
            .FrameArrived(&handler)
            .labelled("Direct3D11CaptureFramePool::FrameArrived")?;

        self.frame_arrived = Some(token);
        Ok(())
    }
}

impl Drop for CaptureFramePool {
    fn drop(&mut self) {
        if let Err(e) = self.remove_frame_arrived() {
            error!("Failed to remove frame arrived handler:\n{e}");
        }

        if let Err(e) = self.frame_pool.Close() {
            error!("Failed to close frame pool:\n{e}");
        }
    }
}

/// A frame taken from a [`CaptureFramePool`], closed on drop to return it to the pool.
pub struct CaptureFrame {
    frame: Direct3D11CaptureFrame,
}

unsafe impl Send for CaptureFrame {}

impl CaptureFrame {
    pub(super) fn texture(&self) -> Result<ID3D11Texture2D, GpuError> {
        let surface = self
            .frame
            .Surface()
            .labelled("Direct3D11CaptureFrame::Surface")?;

        let access: IDirect3DDxgiInterfaceAccess = surface
            .cast()
            .labelled("IDirect3DSurface::cast")?;

        unsafe { access.GetInterface() }.labelled("IDirect3DDxgiInterfaceAccess::GetInterface")
    }
}

impl CapturedFrame for CaptureFrame {
    fn content_size(&self) -> Result<Size, GpuError> {
        let size = self
            .frame
            .ContentSize()
            .labelled("Direct3D11CaptureFrame::ContentSize")?;

        Ok(Size::from_signed(size.Width, size.Height))
    }
}

impl Drop for CaptureFrame {
    fn drop(&mut self) {
        if let Err(e) = self.frame.Close() {
            error!("Failed to close capture frame:\n{e}");
        }
    }
}

/// A Windows Graphics Capture session, closed on drop.
pub struct WindowsCaptureSession {
    session: GraphicsCaptureSession,
}

unsafe impl Send for WindowsCaptureSession {}

impl CaptureSession for WindowsCaptureSession {
    fn start(&self) -> Result<(), GpuError> {
        self.session
            .StartCapture()
            .labelled("GraphicsCaptureSession::StartCapture")
    }
}

impl Drop for WindowsCaptureSession {
    fn drop(&mut self) {
        if let Err(e) = self.session.Close() {
            error!("Failed to close capture session:\n{e}");
        }
    }
}
