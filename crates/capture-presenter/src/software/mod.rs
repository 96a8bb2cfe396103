//! # Software backend
//! A CPU implementation of every backend trait. Frames are pushed in by the host through a
//! [`SoftwareCaptureItem`] and everything the backend does is recorded in a [`Journal`].
//!

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use thiserror::Error;

use crate::{GpuError, RemovalReason};

pub use device::SoftwareDevice;
pub use frame_pool::{
    Delivery, PendingNotification, SoftwareCaptureItem, SoftwareFrame, SoftwareFramePool,
    SoftwareSession,
};
pub use journal::{Event, FaultStage, Journal, Resource};
pub use pipeline::SoftwarePipeline;
pub use surface::{
    SoftwarePresentable, SoftwareRenderTarget, SoftwareShaderResource, SoftwareSurface,
};
pub use texture::SoftwareTexture;

mod device;
mod frame_pool;
mod journal;
mod pipeline;
mod raster;
mod surface;
mod texture;

/// Errors raised by the software backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SoftwareError {
    /// A fault injected with [`FaultInjector::inject`] fired.
    #[error("Injected {0:?} fault")]
    Injected(FaultStage),

    /// A render target was used after the surface buffers it views were replaced.
    #[error("Render target views generation {target} buffers but the surface is at {surface}")]
    StaleRenderTarget {
        /// The generation the render target was created against.
        target: u64,
        /// The surface's current generation.
        surface: u64,
    },

    /// A requested size has no area.
    #[error("Size {0} has no area")]
    EmptySize(crate::Size),

    /// The requested buffer count is not supported.
    #[error("{0} buffers requested, the software backend only supports 2")]
    BufferCount(u32),
}

#[derive(Debug, Default)]
struct Faults {
    pending: Vec<(FaultStage, Option<RemovalReason>)>,
    removal_reason: Option<RemovalReason>,
}

/// Makes later backend calls fail. Each injected fault fires once.
#[derive(Debug, Clone, Default)]
pub struct FaultInjector {
    faults: Arc<Mutex<Faults>>,
}

impl FaultInjector {
    /// Fail the next call at `stage`. With a `removal_reason` the failure is reported as the device
    /// being lost and the reason is returned by the next removal reason query.
    pub fn inject(&self, stage: FaultStage, removal_reason: Option<RemovalReason>) {
        self.faults.lock().pending.push((stage, removal_reason));
    }

    /// The number of injected faults that have not fired yet.
    pub fn pending(&self) -> usize {
        self.faults.lock().pending.len()
    }

    fn take_removal_reason(&self) -> Option<RemovalReason> {
        self.faults.lock().removal_reason.take()
    }

    fn fire(&self, stage: FaultStage) -> Option<Option<RemovalReason>> {
        let mut faults = self.faults.lock();

        let index = faults
            .pending
            .iter()
            .position(|(pending, _)| *pending == stage)?;
        let (_, removal_reason) = faults.pending.remove(index);

        if removal_reason.is_some() {
            faults.removal_reason = removal_reason;
        }

        Some(removal_reason)
    }
}

/// State shared by the device and every object it creates.
#[derive(Debug, Clone, Default)]
struct Context {
    journal: Journal,
    faults: FaultInjector,
    busy: Arc<AtomicBool>,
}

impl Context {
    /// Mark a backend call as running until the guard is dropped.
    fn enter(&self) -> BusyGuard<'_> {
        let owned = !self.busy.swap(true, Ordering::AcqRel);
        if !owned {
            self.journal.reentered();
        }

        BusyGuard {
            context: self,
            owned,
        }
    }

    /// Return an error if a fault was injected for `stage`.
    fn check(&self, stage: FaultStage, call: &'static str) -> Result<(), GpuError> {
        let Some(removal_reason) = self.faults.fire(stage) else {
            return Ok(());
        };

        self.journal.record(Event::Fault(stage));

        let source = SoftwareError::Injected(stage);
        match removal_reason {
            Some(_) => Err(GpuError::device_lost(call, source)),
            None => Err(GpuError::new(call, source)),
        }
    }
}

struct BusyGuard<'a> {
    context: &'a Context,
    owned: bool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.owned {
            self.context.busy.store(false, Ordering::Release);
        }
    }
}
