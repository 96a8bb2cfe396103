use alloc::boxed::Box;
use core::fmt::Display;

use thiserror::Error;

type BoxedSource = Box<dyn core::error::Error + Send + Sync + 'static>;

/// A failed GPU or capture call wrapped with a label for the call that triggered the error.
#[derive(Debug, Error)]
#[error("{call} failed:\n{source}")]
pub struct GpuError {
    call: &'static str,
    device_lost: bool,
    #[source]
    source: BoxedSource,
}

impl GpuError {
    /// Create a new GpuError from a source error and a label.
    pub fn new(call: &'static str, source: impl Into<BoxedSource>) -> Self {
        Self {
            call,
            device_lost: false,
            source: source.into(),
        }
    }

    /// Create a new GpuError for a call that failed because the device was lost.
    pub fn device_lost(call: &'static str, source: impl Into<BoxedSource>) -> Self {
        Self {
            call,
            device_lost: true,
            source: source.into(),
        }
    }

    /// The label of the call that failed.
    pub fn call(&self) -> &'static str {
        self.call
    }

    /// If the call failed because the device was removed, reset or hung.
    pub fn is_device_lost(&self) -> bool {
        self.device_lost
    }
}

const DXGI_ERROR_INVALID_CALL: u32 = 0x887A_0001;
const DXGI_ERROR_DEVICE_REMOVED: u32 = 0x887A_0005;
const DXGI_ERROR_DEVICE_HUNG: u32 = 0x887A_0006;
const DXGI_ERROR_DEVICE_RESET: u32 = 0x887A_0007;
const DXGI_ERROR_DRIVER_INTERNAL_ERROR: u32 = 0x887A_0020;

/// Why a device stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// The device took too long to execute commands.
    Hung,
    /// The device was physically removed or the driver was upgraded.
    Removed,
    /// The device was reset after a badly formed command.
    Reset,
    /// The driver encountered a problem.
    DriverInternalError,
    /// The application issued an invalid call.
    InvalidCall,
    /// Any other non-success code.
    Other(i32),
}

impl RemovalReason {
    /// Decode the result of a removed-reason query, `None` if the device is still healthy.
    pub fn from_hresult(code: i32) -> Option<Self> {
        if code >= 0 {
            return None;
        }

        let reason = match code as u32 {
            DXGI_ERROR_DEVICE_HUNG => Self::Hung,
            DXGI_ERROR_DEVICE_REMOVED => Self::Removed,
            DXGI_ERROR_DEVICE_RESET => Self::Reset,
            DXGI_ERROR_DRIVER_INTERNAL_ERROR => Self::DriverInternalError,
            DXGI_ERROR_INVALID_CALL => Self::InvalidCall,
            _ => Self::Other(code),
        };

        Some(reason)
    }

    /// If a failing call with this code indicates the device is gone.
    pub fn is_device_lost_code(code: i32) -> bool {
        matches!(
            code as u32,
            DXGI_ERROR_DEVICE_HUNG | DXGI_ERROR_DEVICE_REMOVED | DXGI_ERROR_DEVICE_RESET
        )
    }
}

impl Display for RemovalReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Hung => write!(f, "device hung (0x{DXGI_ERROR_DEVICE_HUNG:08X})"),
            Self::Removed => write!(f, "device removed (0x{DXGI_ERROR_DEVICE_REMOVED:08X})"),
            Self::Reset => write!(f, "device reset (0x{DXGI_ERROR_DEVICE_RESET:08X})"),
            Self::DriverInternalError => write!(
                f,
                "driver internal error (0x{DXGI_ERROR_DRIVER_INTERNAL_ERROR:08X})"
            ),
            Self::InvalidCall => write!(f, "invalid call (0x{DXGI_ERROR_INVALID_CALL:08X})"),
            Self::Other(code) => write!(f, "0x{:08X}", *code as u32),
        }
    }
}
