use windows::{
    Graphics::Capture::GraphicsCaptureItem,
    Win32::{
        Foundation::{HWND, POINT},
        Graphics::Gdi::{HMONITOR, MONITOR_DEFAULTTOPRIMARY, MonitorFromPoint},
        System::WinRT::Graphics::Capture::IGraphicsCaptureItemInterop,
    },
    core::factory,
};

use crate::{CaptureItem, GpuError, Size};

use super::Labelled;

/// A window or monitor that can be captured.
#[derive(Clone)]
pub struct WindowsCaptureItem {
    item: GraphicsCaptureItem,
}

// Only ever used while holding the presenter lock.
unsafe impl Send for WindowsCaptureItem {}

impl WindowsCaptureItem {
    /// Capture a top level window.
    pub fn for_window(hwnd: HWND) -> Result<Self, GpuError> {
        let interop = factory::<GraphicsCaptureItem, IGraphicsCaptureItemInterop>()
            .labelled("IGraphicsCaptureItemInterop::factory")?;

        let item: GraphicsCaptureItem = unsafe { interop.CreateForWindow(hwnd) }
            .labelled("IGraphicsCaptureItemInterop::CreateForWindow")?;

        Ok(Self { item })
    }

    /// Capture a monitor.
    pub fn for_monitor(hmonitor: HMONITOR) -> Result<Self, GpuError> {
        let interop = factory::<GraphicsCaptureItem, IGraphicsCaptureItemInterop>()
            .labelled("IGraphicsCaptureItemInterop::factory")?;

        let item: GraphicsCaptureItem = unsafe { interop.CreateForMonitor(hmonitor) }
            .labelled("IGraphicsCaptureItemInterop::CreateForMonitor")?;

        Ok(Self { item })
    }

    /// Capture the primary monitor.
    pub fn primary_monitor() -> Result<Self, GpuError> {
        let hmonitor = unsafe { MonitorFromPoint(POINT { x: 0, y: 0 }, MONITOR_DEFAULTTOPRIMARY) };
        Self::for_monitor(hmonitor)
    }

    /// The underlying item.
    pub fn item(&self) -> &GraphicsCaptureItem {
        &self.item
    }

    /// The name shown to the user for this item.
    pub fn display_name(&self) -> Result<String, GpuError> {
        let name = self
            .item
            .DisplayName()
            .labelled("GraphicsCaptureItem::DisplayName")?;

        Ok(name.to_string_lossy())
    }
}

impl CaptureItem for WindowsCaptureItem {
    fn size(&self) -> Result<Size, GpuError> {
        let size = self.item.Size().labelled("GraphicsCaptureItem::Size")?;
        Ok(Size::from_signed(size.Width, size.Height))
    }
}
