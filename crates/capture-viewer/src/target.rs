use capture_presenter::{GpuError, d3d11::WindowsCaptureItem};
use thiserror::Error;
use tracing::{debug, instrument};
use windows::{
    Win32::{
        Foundation::{HWND, LPARAM, RECT},
        Graphics::Gdi::{EnumDisplayMonitors, HDC, HMONITOR},
        UI::WindowsAndMessaging::{EnumWindows, GetWindowTextW, IsWindowVisible},
    },
    core::BOOL,
};

use crate::config::Target;

/// Create the capture item for the configured target.
#[instrument("resolve_target", skip_all, err)]
pub fn resolve_target(target: &Target) -> Result<WindowsCaptureItem, TargetError> {
    let item = match target {
        Target::PrimaryMonitor => WindowsCaptureItem::primary_monitor()?,

        Target::Monitor { index } => {
            let monitors = monitors()?;
            let monitor = monitors
                .get(*index)
                .copied()
                .ok_or(TargetError::NoMonitor {
                    index: *index,
                    count: monitors.len(),
                })?;

            WindowsCaptureItem::for_monitor(monitor)?
        }

        Target::Window { title } => {
            let window = find_window(title)?.ok_or_else(|| TargetError::NoWindow(title.clone()))?;
            WindowsCaptureItem::for_window(window)?
        }
    };

    if let Ok(name) = item.display_name() {
        debug!("Capturing '{name}'");
    }

    Ok(item)
}

fn monitors() -> Result<Vec<HMONITOR>, TargetError> {
    unsafe extern "system" fn callback(
        monitor: HMONITOR,
        _hdc: HDC,
        _rect: *mut RECT,
        data: LPARAM,
    ) -> BOOL {
        let monitors = unsafe { &mut *(data.0 as *mut Vec<HMONITOR>) };
        monitors.push(monitor);
        true.into()
    }

    let mut monitors: Vec<HMONITOR> = Vec::new();

    let result = unsafe {
        EnumDisplayMonitors(
            None,
            None,
            Some(callback),
            LPARAM(&raw mut monitors as isize),
        )
    };

    if !result.as_bool() {
        return Err(TargetError::EnumerateMonitors);
    }

    Ok(monitors)
}

fn find_window(title: &str) -> Result<Option<HWND>, TargetError> {
    struct Search<'a> {
        title: &'a str,
        found: Option<HWND>,
    }

    unsafe extern "system" fn callback(window: HWND, data: LPARAM) -> BOOL {
        let search = unsafe { &mut *(data.0 as *mut Search<'_>) };

        if !unsafe { IsWindowVisible(window) }.as_bool() {
            return true.into();
        }

        let mut buffer = [0u16; 512];
        let length = unsafe { GetWindowTextW(window, &mut buffer) };
        let Ok(length) = usize::try_from(length) else {
            return true.into();
        };

        let window_title = String::from_utf16_lossy(&buffer[..length]);
        if window_title.contains(search.title) {
            search.found = Some(window);
            return false.into();
        }

        true.into()
    }

    let mut search = Search { title, found: None };

    // Stopping the enumeration early is reported as a failure.
    let result = unsafe { EnumWindows(Some(callback), LPARAM(&raw mut search as isize)) };
    if let Err(error) = result {
        if search.found.is_none() {
            return Err(TargetError::EnumerateWindows(error));
        }
    }

    Ok(search.found)
}

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Monitor {index} does not exist, there are {count} monitors")]
    NoMonitor { index: usize, count: usize },

    #[error("No visible window has a title containing '{0}'")]
    NoWindow(String),

    #[error("Failed to enumerate monitors")]
    EnumerateMonitors,

    #[error("Failed to enumerate windows:\n{0}")]
    EnumerateWindows(#[source] windows::core::Error),

    #[error("Failed to create the capture item:\n{0}")]
    Item(#[from] GpuError),
}
