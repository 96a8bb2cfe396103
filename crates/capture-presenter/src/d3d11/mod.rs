//! # Direct3D 11 backend
//! Windows Graphics Capture frame pools presented through a Direct3D 11 composition swap chain.
//!

use tracing::{error, instrument};
use windows::{
    Graphics::DirectX::Direct3D11::IDirect3DDevice,
    Win32::{
        Foundation::HMODULE,
        Graphics::{
            Direct3D::{
                D3D_DRIVER_TYPE, D3D_DRIVER_TYPE_HARDWARE, D3D_DRIVER_TYPE_WARP,
                D3D11_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP,
            },
            Direct3D11::{
                D3D11_CREATE_DEVICE_BGRA_SUPPORT, D3D11_CREATE_DEVICE_FLAG, D3D11_SDK_VERSION,
                D3D11_VIEWPORT, D3D11CreateDevice, ID3D11Device, ID3D11DeviceContext,
                ID3D11RenderTargetView, ID3D11ShaderResourceView, ID3D11Texture2D,
            },
            Dxgi::{DXGI_ERROR_UNSUPPORTED, IDXGIAdapter, IDXGIDevice, IDXGIFactory2},
        },
        System::WinRT::Direct3D11::{
            CreateDirect3D11DeviceFromDXGIDevice, IDirect3DDxgiInterfaceAccess,
        },
    },
};
use windows_core::Interface;

use crate::{
    GpuDevice, GpuError, PipelineError, PixelFormat, QuadPass, RemovalReason, SessionOptions,
    ShaderPipelineDesc, Size, VERTEX_STRIDE,
};

pub use capture_item::WindowsCaptureItem;
pub use composition::create_composition_surface;
pub use error::D3d11Error;
pub use frame_pool::{CaptureFrame, CaptureFramePool, WindowsCaptureSession};
pub use pipeline::QuadPipeline;
pub use swap_chain::SwapChain;

use error::{Labelled, written};

mod capture_item;
mod composition;
mod error;
mod frame_pool;
mod pipeline;
mod swap_chain;

/// The Direct3D devices a live capture draws with.
pub struct Direct3D11 {
    /// Used to create resources.
    pub d3d11_device: ID3D11Device,

    /// Used to draw, all draws go through the immediate context.
    pub d3d11_context: ID3D11DeviceContext,

    /// Used to create frame pools.
    pub d3d_device: IDirect3DDevice,

    /// Used to create swap chains.
    pub dxgi_factory: IDXGIFactory2,
}

// Only ever used while holding the presenter lock.
unsafe impl Send for Direct3D11 {}

impl Direct3D11 {
    /// Create a hardware device with BGRA support, falling back to WARP if hardware is unsupported.
    #[instrument("Direct3D11::new", skip_all, err)]
    pub fn new() -> Result<Self, GpuError> {
        let mut device = None;
        let mut result = d3d11_device_with_type(
            D3D_DRIVER_TYPE_HARDWARE,
            D3D11_CREATE_DEVICE_BGRA_SUPPORT,
            &mut device,
        );

        if let Err(error) = &result {
            if error.code() == DXGI_ERROR_UNSUPPORTED {
                result = d3d11_device_with_type(
                    D3D_DRIVER_TYPE_WARP,
                    D3D11_CREATE_DEVICE_BGRA_SUPPORT,
                    &mut device,
                );
            }
        }
        result.labelled("D3D11CreateDevice")?;

        let d3d11_device = written(device, "D3D11CreateDevice")?;
        Self::from_d3d11_device(d3d11_device)
    }

    /// Wrap an existing WinRT Direct3D device.
    #[instrument("Direct3D11::from_direct3d_device", skip_all, err)]
    pub fn from_direct3d_device(d3d_device: &IDirect3DDevice) -> Result<Self, GpuError> {
        let access: IDirect3DDxgiInterfaceAccess = d3d_device
            .cast()
            .labelled("IDirect3DDevice::cast")?;

        let d3d11_device: ID3D11Device = unsafe { access.GetInterface() }
            .labelled("IDirect3DDxgiInterfaceAccess::GetInterface")?;

        Self::from_d3d11_device(d3d11_device)
    }

    /// Wrap an existing Direct3D 11 device.
    pub fn from_d3d11_device(d3d11_device: ID3D11Device) -> Result<Self, GpuError> {
        let d3d11_context = unsafe { d3d11_device.GetImmediateContext() }
            .labelled("ID3D11Device::GetImmediateContext")?;

        let dxgi_device: IDXGIDevice = d3d11_device
            .cast()
            .labelled("ID3D11Device::cast")?;

        let dxgi_factory = {
            let dxgi_adapter: IDXGIAdapter =
                unsafe { dxgi_device.GetAdapter() }.labelled("IDXGIDevice::GetAdapter")?;

            unsafe { dxgi_adapter.GetParent::<IDXGIFactory2>() }
                .labelled("IDXGIAdapter::GetParent")?
        };

        let d3d_device = {
            let inspectable = unsafe { CreateDirect3D11DeviceFromDXGIDevice(&dxgi_device) }
                .labelled("CreateDirect3D11DeviceFromDXGIDevice")?;

            inspectable
                .cast()
                .labelled("IInspectable::cast")?
        };

        Ok(Self {
            d3d11_device,
            d3d11_context,
            d3d_device,
            dxgi_factory,
        })
    }
}

impl GpuDevice for Direct3D11 {
    type Item = WindowsCaptureItem;
    type FramePool = CaptureFramePool;
    type Session = WindowsCaptureSession;
    type Surface = SwapChain;
    type Pipeline = QuadPipeline;
    type RenderTarget = ID3D11RenderTargetView;
    type ShaderResource = ID3D11ShaderResourceView;

    fn create_surface(
        &self,
        format: PixelFormat,
        buffer_count: u32,
        size: Size,
    ) -> Result<Self::Surface, GpuError> {
        SwapChain::new(self, format, buffer_count, size)
    }

    fn create_pipeline(&self, desc: &ShaderPipelineDesc) -> Result<Self::Pipeline, PipelineError> {
        QuadPipeline::new(&self.d3d11_device, desc)
    }

    fn create_frame_pool(
        &self,
        format: PixelFormat,
        buffer_count: u32,
        size: Size,
    ) -> Result<Self::FramePool, GpuError> {
        CaptureFramePool::new(&self.d3d_device, format, buffer_count, size)
    }

    fn create_session(
        &self,
        pool: &Self::FramePool,
        item: &Self::Item,
        options: &SessionOptions,
    ) -> Result<Self::Session, GpuError> {
        pool.create_session(item, options)
    }

    fn create_render_target(
        &self,
        surface: &Self::Surface,
    ) -> Result<Self::RenderTarget, GpuError> {
        let back_buffer = surface.back_buffer()?;

        let mut render_target = None;
        unsafe {
            self.d3d11_device
                .CreateRenderTargetView(&back_buffer, None, Some(&mut render_target))
        }
        .labelled("ID3D11Device::CreateRenderTargetView")?;

        written(render_target, "ID3D11Device::CreateRenderTargetView")
    }

    fn create_shader_resource(
        &self,
        frame: &CaptureFrame,
    ) -> Result<Self::ShaderResource, GpuError> {
        let texture: ID3D11Texture2D = frame.texture()?;

        let mut shader_resource = None;
        unsafe {
            self.d3d11_device
                .CreateShaderResourceView(&texture, None, Some(&mut shader_resource))
        }
        .labelled("ID3D11Device::CreateShaderResourceView")?;

        written(shader_resource, "ID3D11Device::CreateShaderResourceView")
    }

    fn draw_quad(&self, pass: &QuadPass<'_, Self>) -> Result<(), GpuError> {
        let context = &self.d3d11_context;
        let pipeline = pass.pipeline;

        let viewport = D3D11_VIEWPORT {
            TopLeftX: 0.0,
            TopLeftY: 0.0,
            Width: pass.viewport.width as f32,
            Height: pass.viewport.height as f32,
            MinDepth: 0.0,
            MaxDepth: 1.0,
        };
        let offset = 0u32;

        unsafe {
            context.OMSetRenderTargets(Some(&[Some(pass.render_target.clone())]), None);
            context.RSSetViewports(Some(&[viewport]));

            context.IASetVertexBuffers(
                0,
                1,
                Some(&Some(pipeline.vertex_buffer.clone())),
                Some(&VERTEX_STRIDE),
                Some(&offset),
            );
            context.IASetPrimitiveTopology(D3D11_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP);
            context.IASetInputLayout(&pipeline.input_layout);

            context.VSSetShader(&pipeline.vertex_shader, None);
            context.PSSetShader(&pipeline.pixel_shader, None);
            context.PSSetShaderResources(0, Some(&[Some(pass.shader_resource.clone())]));
            context.PSSetSamplers(0, Some(&[Some(pipeline.sampler.clone())]));

            context.ClearRenderTargetView(pass.render_target, &pass.clear_colour);
            context.Draw(4, 0);

            // Release the frame and back buffer bindings.
            context.PSSetShaderResources(0, Some(&[None]));
            context.OMSetRenderTargets(None, None);
        }

        unsafe { self.d3d11_device.GetDeviceRemovedReason() }.labelled("ID3D11DeviceContext::Draw")
    }

    fn removal_reason(&self) -> Option<RemovalReason> {
        match unsafe { self.d3d11_device.GetDeviceRemovedReason() } {
            Ok(()) => None,
            Err(error) => RemovalReason::from_hresult(error.code().0),
        }
    }
}

impl Drop for Direct3D11 {
    fn drop(&mut self) {
        unsafe { self.d3d11_context.ClearState() };

        if let Err(e) = self.d3d_device.Close() {
            error!("Failed to close D3D device:\n{e}");
        }
    }
}

fn d3d11_device_with_type(
    driver_type: D3D_DRIVER_TYPE,
    flags: D3D11_CREATE_DEVICE_FLAG,
    device: *mut Option<ID3D11Device>,
) -> windows_result::Result<()> {
    unsafe {
        D3D11CreateDevice(
            None,
            driver_type,
            HMODULE::default(),
            flags,
            None,
            D3D11_SDK_VERSION,
            Some(device),
            None,
            None,
        )
    }
}
