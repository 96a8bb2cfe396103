use tracing::{debug, instrument};
use windows::Win32::Graphics::{
    Direct3D11::{ID3D11DeviceContext, ID3D11Texture2D},
    Dxgi::{
        Common::{
            DXGI_ALPHA_MODE_PREMULTIPLIED, DXGI_FORMAT, DXGI_FORMAT_B8G8R8A8_UNORM,
            DXGI_SAMPLE_DESC,
        },
        DXGI_PRESENT, DXGI_SCALING_STRETCH, DXGI_SWAP_CHAIN_DESC1, DXGI_SWAP_CHAIN_FLAG,
        DXGI_SWAP_EFFECT_FLIP_SEQUENTIAL, DXGI_USAGE_RENDER_TARGET_OUTPUT, IDXGISwapChain1,
    },
};

use crate::{GpuError, PixelFormat, PresentationSurface, Size};

use super::{Direct3D11, Labelled};

fn dxgi_format(format: PixelFormat) -> DXGI_FORMAT {
    match format {
        PixelFormat::Bgra8Unorm => DXGI_FORMAT_B8G8R8A8_UNORM,
    }
}

/// A composition swap chain, flip sequential with premultiplied alpha.
pub struct SwapChain {
    swap_chain: IDXGISwapChain1,
    context: ID3D11DeviceContext,
    format: DXGI_FORMAT,
    buffer_count: u32,
    size: Size,
}

// Only ever used while holding the presenter lock.
unsafe impl Send for SwapChain {}

impl SwapChain {
    #[instrument("SwapChain::new", skip_all, err)]
    pub(super) fn new(
        device: &Direct3D11,
        format: PixelFormat,
        buffer_count: u32,
        size: Size,
    ) -> Result<Self, GpuError> {
        let format = dxgi_format(format);

        let desc = DXGI_SWAP_CHAIN_DESC1 {
            Width: size.width,
            Height: size.height,
            Format: format,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            BufferCount: buffer_count,
            Scaling: DXGI_SCALING_STRETCH,
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_SEQUENTIAL,
            AlphaMode: DXGI_ALPHA_MODE_PREMULTIPLIED,
            Flags: 0,
            ..Default::default()
        };

        let swap_chain = unsafe {
            device
                .dxgi_factory
                .CreateSwapChainForComposition(&device.d3d11_device, &desc, None)
        }
        .labelled("IDXGIFactory2::CreateSwapChainForComposition")?;

        Ok(Self {
            swap_chain,
            context: device.d3d11_context.clone(),
            format,
            buffer_count,
            size,
        })
    }

    pub(super) fn back_buffer(&self) -> Result<ID3D11Texture2D, GpuError> {
        unsafe { self.swap_chain.GetBuffer(0) }.labelled("IDXGISwapChain1::GetBuffer")
    }
}

impl PresentationSurface for SwapChain {
    type Handle = IDXGISwapChain1;

    fn handle(&self) -> Self::Handle {
        self.swap_chain.clone()
    }

    fn size(&self) -> Size {
        self.size
    }

    fn resize(&mut self, size: Size) -> Result<(), GpuError> {
        // Outstanding back buffer references make ResizeBuffers fail.
        unsafe {
            self.context.OMSetRenderTargets(None, None);
            self.context.Flush();
        }

        unsafe {
            self.swap_chain.ResizeBuffers(
                self.buffer_count,
                size.width,
                size.height,
                self.format,
                DXGI_SWAP_CHAIN_FLAG(0),
            )
        }
        .labelled("IDXGISwapChain1::ResizeBuffers")?;

        debug!("Resized swap chain from {} to {size}", self.size);
        self.size = size;
        Ok(())
    }

    fn present(&mut self) -> Result<(), GpuError> {
        unsafe { self.swap_chain.Present(0, DXGI_PRESENT(0)) }
            .ok()
            .labelled("IDXGISwapChain1::Present")
    }
}
