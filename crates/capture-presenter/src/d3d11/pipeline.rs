use alloc::ffi::CString;

use bytemuck::cast_slice;
use tracing::{debug, instrument};
use windows::{
    Win32::Graphics::{
        Direct3D::{
            Fxc::{D3DCOMPILE_ENABLE_STRICTNESS, D3DCompile},
            ID3DBlob,
        },
        Direct3D11::{
            D3D11_BIND_VERTEX_BUFFER, D3D11_BUFFER_DESC, D3D11_COMPARISON_NEVER, D3D11_FILTER,
            D3D11_FILTER_MIN_MAG_MIP_LINEAR, D3D11_INPUT_ELEMENT_DESC,
            D3D11_INPUT_PER_VERTEX_DATA, D3D11_SAMPLER_DESC, D3D11_SUBRESOURCE_DATA,
            D3D11_TEXTURE_ADDRESS_MODE, D3D11_TEXTURE_ADDRESS_WRAP, D3D11_USAGE_IMMUTABLE,
            ID3D11Buffer, ID3D11Device, ID3D11InputLayout, ID3D11PixelShader,
            ID3D11SamplerState, ID3D11VertexShader,
        },
        Dxgi::Common::{DXGI_FORMAT, DXGI_FORMAT_R32G32_FLOAT},
    },
    core::PCSTR,
};

use crate::{
    AddressMode, AttributeFormat, Filter, INPUT_LAYOUT, PipelineError, QUAD_VERTICES, SAMPLER,
    SamplerDesc, ShaderCode, ShaderPipelineDesc, ShaderProgram, ShaderStage,
};

use super::{Labelled, written};

/// The compiled shaders and static state for drawing a frame as a full surface quad.
pub struct QuadPipeline {
    pub(super) vertex_shader: ID3D11VertexShader,
    pub(super) pixel_shader: ID3D11PixelShader,
    pub(super) input_layout: ID3D11InputLayout,
    pub(super) vertex_buffer: ID3D11Buffer,
    pub(super) sampler: ID3D11SamplerState,
}

// Only ever used while holding the presenter lock.
unsafe impl Send for QuadPipeline {}

impl QuadPipeline {
    /// Compile the shaders and create the input layout, vertex buffer and sampler.
    #[instrument("QuadPipeline::new", skip_all, err)]
    pub fn new(device: &ID3D11Device, desc: &ShaderPipelineDesc) -> Result<Self, PipelineError> {
        let vertex_bytecode = compile(&desc.vertex)?;
        let pixel_bytecode = compile(&desc.pixel)?;

        let vertex_shader = {
            let mut shader = None;
            unsafe { device.CreateVertexShader(&vertex_bytecode, None, Some(&mut shader)) }
                .labelled("ID3D11Device::CreateVertexShader")
                .and_then(|()| written(shader, "ID3D11Device::CreateVertexShader"))
                .map_err(|source| PipelineError::CreateShader {
                    stage: ShaderStage::Vertex,
                    source,
                })?
        };

        let pixel_shader = {
            let mut shader = None;
            unsafe { device.CreatePixelShader(&pixel_bytecode, None, Some(&mut shader)) }
                .labelled("ID3D11Device::CreatePixelShader")
                .and_then(|()| written(shader, "ID3D11Device::CreatePixelShader"))
                .map_err(|source| PipelineError::CreateShader {
                    stage: ShaderStage::Pixel,
                    source,
                })?
        };

        let input_layout = {
            let elements = INPUT_LAYOUT.map(|attribute| D3D11_INPUT_ELEMENT_DESC {
                SemanticName: PCSTR(attribute.semantic.as_ptr().cast()),
                SemanticIndex: 0,
                Format: attribute_format(attribute.format),
                InputSlot: 0,
                AlignedByteOffset: attribute.offset,
                InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
                InstanceDataStepRate: 0,
            });

            let mut layout = None;
            unsafe { device.CreateInputLayout(&elements, &vertex_bytecode, Some(&mut layout)) }
                .labelled("ID3D11Device::CreateInputLayout")
                .and_then(|()| written(layout, "ID3D11Device::CreateInputLayout"))
                .map_err(PipelineError::InputLayout)?
        };

        let vertex_buffer = {
            let bytes: &[u8] = cast_slice(&QUAD_VERTICES);

            let buffer_desc = D3D11_BUFFER_DESC {
                ByteWidth: bytes.len() as u32,
                Usage: D3D11_USAGE_IMMUTABLE,
                BindFlags: D3D11_BIND_VERTEX_BUFFER.0 as u32,
                CPUAccessFlags: 0,
                MiscFlags: 0,
                StructureByteStride: 0,
            };

            let data = D3D11_SUBRESOURCE_DATA {
                pSysMem: bytes.as_ptr().cast(),
                SysMemPitch: 0,
                SysMemSlicePitch: 0,
            };

            let mut buffer = None;
            unsafe { device.CreateBuffer(&buffer_desc, Some(&data), Some(&mut buffer)) }
                .labelled("ID3D11Device::CreateBuffer")
                .and_then(|()| written(buffer, "ID3D11Device::CreateBuffer"))
                .map_err(PipelineError::VertexBuffer)?
        };

        let sampler = {
            let sampler_desc = sampler_desc(SAMPLER);

            let mut sampler = None;
            unsafe { device.CreateSamplerState(&sampler_desc, Some(&mut sampler)) }
                .labelled("ID3D11Device::CreateSamplerState")
                .and_then(|()| written(sampler, "ID3D11Device::CreateSamplerState"))
                .map_err(PipelineError::Sampler)?
        };

        Ok(Self {
            vertex_shader,
            pixel_shader,
            input_layout,
            vertex_buffer,
            sampler,
        })
    }
}

/// Load a program and compile it with FXC unless it is already bytecode.
fn compile(program: &ShaderProgram) -> Result<Vec<u8>, PipelineError> {
    let (name, source) = match program.load()? {
        ShaderCode::Bytecode { bytes, .. } => return Ok(bytes),
        ShaderCode::Hlsl { name, source } => (name, source),
    };

    let compile_error = |message: String| PipelineError::Compile {
        stage: program.stage,
        name: name.clone(),
        message,
    };

    let source_name = CString::new(name.as_str()).map_err(|e| compile_error(e.to_string()))?;
    let entry_point =
        CString::new(program.entry_point.as_str()).map_err(|e| compile_error(e.to_string()))?;
    let profile =
        CString::new(program.profile.as_str()).map_err(|e| compile_error(e.to_string()))?;

    let mut blob: Option<ID3DBlob> = None;
    let mut error_blob: Option<ID3DBlob> = None;

    let result = unsafe {
        D3DCompile(
            source.as_ptr().cast(),
            source.len(),
            PCSTR(source_name.as_ptr().cast()),
            None,
            None,
            PCSTR(entry_point.as_ptr().cast()),
            PCSTR(profile.as_ptr().cast()),
            D3DCOMPILE_ENABLE_STRICTNESS,
            0,
            &mut blob,
            Some(&mut error_blob),
        )
    };

    if let Err(error) = result {
        let message = error_blob
            .as_ref()
            .map(|blob| String::from_utf8_lossy(blob_bytes(blob)).into_owned())
            .unwrap_or_else(|| error.to_string());

        return Err(compile_error(message));
    }

    let blob = blob.ok_or_else(|| compile_error("D3DCompile returned no bytecode".into()))?;
    debug!("Compiled {} shader '{name}'", program.stage);

    Ok(blob_bytes(&blob).to_vec())
}

fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe {
        core::slice::from_raw_parts(blob.GetBufferPointer().cast::<u8>(), blob.GetBufferSize())
    }
}

fn attribute_format(format: AttributeFormat) -> DXGI_FORMAT {
    match format {
        AttributeFormat::Float2 => DXGI_FORMAT_R32G32_FLOAT,
    }
}

fn sampler_desc(sampler: SamplerDesc) -> D3D11_SAMPLER_DESC {
    let filter: D3D11_FILTER = match sampler.filter {
        Filter::Linear => D3D11_FILTER_MIN_MAG_MIP_LINEAR,
    };

    let address: D3D11_TEXTURE_ADDRESS_MODE = match sampler.address_mode {
        AddressMode::Wrap => D3D11_TEXTURE_ADDRESS_WRAP,
    };

    D3D11_SAMPLER_DESC {
        Filter: filter,
        AddressU: address,
        AddressV: address,
        AddressW: address,
        MipLODBias: 0.0,
        MaxAnisotropy: 1,
        ComparisonFunc: D3D11_COMPARISON_NEVER,
        BorderColor: [0.0; 4],
        MinLOD: 0.0,
        MaxLOD: f32::MAX,
    }
}
