use windows::{
    UI::Composition::{Compositor, ICompositionSurface},
    Win32::{Graphics::Dxgi::IDXGISwapChain1, System::WinRT::Composition::ICompositorInterop},
};
use windows_core::Interface;

use crate::GpuError;

use super::Labelled;

/// Wrap a presentable swap chain in a surface a composition brush can draw.
///
/// The surface follows the swap chain across resizes, so this only needs doing once per live
/// capture.
pub fn create_composition_surface(
    compositor: &Compositor,
    swap_chain: &IDXGISwapChain1,
) -> Result<ICompositionSurface, GpuError> {
    let interop: ICompositorInterop = compositor
        .cast()
        .labelled("Compositor::cast")?;

    unsafe { interop.CreateCompositionSurfaceForSwapChain(swap_chain) }
        .labelled("ICompositorInterop::CreateCompositionSurfaceForSwapChain")
}
