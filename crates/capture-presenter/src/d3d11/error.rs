use thiserror::Error;

use crate::{GpuError, RemovalReason};

/// Errors for calls that succeeded but did not return what was asked for.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum D3d11Error {
    /// A call returned success with no object.
    #[error("{0} returned no object")]
    NullResult(&'static str),
}

/// Attach a call label to a Windows result, flagging device loss.
pub(crate) trait Labelled<T> {
    fn labelled(self, call: &'static str) -> Result<T, GpuError>;
}

impl<T> Labelled<T> for windows_result::Result<T> {
    fn labelled(self, call: &'static str) -> Result<T, GpuError> {
        self.map_err(|error| label(error, call))
    }
}

pub(crate) fn label(error: windows_result::Error, call: &'static str) -> GpuError {
    if RemovalReason::is_device_lost_code(error.code().0) {
        GpuError::device_lost(call, error)
    } else {
        GpuError::new(call, error)
    }
}

/// Unwrap an out parameter that should have been written by a successful call.
pub(crate) fn written<T>(value: Option<T>, call: &'static str) -> Result<T, GpuError> {
    value.ok_or_else(|| GpuError::new(call, D3d11Error::NullResult(call)))
}
