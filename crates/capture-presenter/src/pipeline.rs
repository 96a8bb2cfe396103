//! The static textured-quad pipeline state shared by every backend.
//!

use core::{ffi::CStr, fmt::Display};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::GpuError;

/// A quad vertex, position in normalised device coordinates and the texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in normalised device coordinates.
    pub position: [f32; 2],
    /// Texture coordinate, top-left is zero.
    pub uv: [f32; 2],
}

/// The size of one [`Vertex`] in bytes.
pub const VERTEX_STRIDE: u32 = size_of::<Vertex>() as u32;

/// The verticies covering the whole viewport, triangle strip.
pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex {
        position: [-1.0, 1.0],
        uv: [0.0, 0.0],
    },
    Vertex {
        position: [1.0, 1.0],
        uv: [1.0, 0.0],
    },
    Vertex {
        position: [-1.0, -1.0],
        uv: [0.0, 1.0],
    },
    Vertex {
        position: [1.0, -1.0],
        uv: [1.0, 1.0],
    },
];

/// Formats a vertex attribute can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFormat {
    /// Two 32 bit floats.
    Float2,
}

/// One element of the vertex input layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// The HLSL semantic name.
    pub semantic: &'static CStr,
    /// The attribute format.
    pub format: AttributeFormat,
    /// Byte offset into the vertex.
    pub offset: u32,
}

/// The interleaved vertex input layout.
pub const INPUT_LAYOUT: [VertexAttribute; 2] = [
    VertexAttribute {
        semantic: c"POSITION",
        format: AttributeFormat::Float2,
        offset: 0,
    },
    VertexAttribute {
        semantic: c"TEXCOORD",
        format: AttributeFormat::Float2,
        offset: 8,
    },
];

/// Texture filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Linear min, mag and mip filtering.
    Linear,
}

/// Texture address mode for coordinates outside of `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    /// Tile the texture.
    Wrap,
}

/// Sampler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerDesc {
    /// Filtering.
    pub filter: Filter,
    /// Addressing in both U and V.
    pub address_mode: AddressMode,
}

/// The sampler the captured frame is read with.
pub const SAMPLER: SamplerDesc = SamplerDesc {
    filter: Filter::Linear,
    address_mode: AddressMode::Wrap,
};

/// The programmable stages of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Pixel shader.
    Pixel,
}

impl Display for ShaderStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Pixel => write!(f, "pixel"),
        }
    }
}

/// Where a shader is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSource {
    /// A file, `.cso` files are treated as compiled bytecode, anything else as HLSL source.
    Path(PathBuf),
    /// HLSL source held in memory.
    Hlsl {
        /// Name used in compiler diagnostics.
        name: String,
        /// The source text.
        source: String,
    },
    /// Compiled shader bytecode held in memory.
    Bytecode(Vec<u8>),
}

/// A shader stage, where to find it and how to compile it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    /// The stage this program runs in.
    pub stage: ShaderStage,
    /// Where the program is loaded from.
    pub source: ShaderSource,
    /// The entry point function.
    pub entry_point: String,
    /// The target profile, e.g. `vs_5_0`.
    pub profile: String,
}

impl ShaderProgram {
    /// A vertex shader with entry point `VS` and profile `vs_5_0`.
    pub fn vertex(source: ShaderSource) -> Self {
        Self {
            stage: ShaderStage::Vertex,
            source,
            entry_point: "VS".into(),
            profile: "vs_5_0".into(),
        }
    }

    /// A pixel shader with entry point `PS` and profile `ps_5_0`.
    pub fn pixel(source: ShaderSource) -> Self {
        Self {
            stage: ShaderStage::Pixel,
            source,
            entry_point: "PS".into(),
            profile: "ps_5_0".into(),
        }
    }

    /// Read the program and check it is usable.
    pub fn load(&self) -> Result<ShaderCode, PipelineError> {
        let code = match &self.source {
            ShaderSource::Path(path) => self.read(path)?,

            ShaderSource::Hlsl { name, source } => ShaderCode::Hlsl {
                name: name.clone(),
                source: source.clone(),
            },

            ShaderSource::Bytecode(bytes) => ShaderCode::Bytecode {
                name: format!("<{} bytecode>", self.stage),
                bytes: bytes.clone(),
            },
        };

        if code.is_empty() {
            return Err(PipelineError::EmptyShader {
                stage: self.stage,
                name: code.name().to_owned(),
            });
        }

        if let ShaderCode::Hlsl { name, source } = &code {
            if !declares_entry_point(source, &self.entry_point) {
                return Err(PipelineError::MissingEntryPoint {
                    stage: self.stage,
                    name: name.clone(),
                    entry_point: self.entry_point.clone(),
                });
            }
        }

        Ok(code)
    }

    fn read(&self, path: &Path) -> Result<ShaderCode, PipelineError> {
        let read_error = |source| PipelineError::ReadShader {
            stage: self.stage,
            path: path.to_path_buf(),
            source,
        };

        let bytes = fs::read(path).map_err(read_error)?;
        let name = path.display().to_string();

        let is_bytecode = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("cso"));

        if is_bytecode {
            return Ok(ShaderCode::Bytecode { name, bytes });
        }

        let source = String::from_utf8(bytes)
            .map_err(|error| read_error(io::Error::new(io::ErrorKind::InvalidData, error)))?;

        Ok(ShaderCode::Hlsl { name, source })
    }
}

/// A loaded shader ready to be handed to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderCode {
    /// HLSL source that still needs compiling.
    Hlsl {
        /// Name used in compiler diagnostics.
        name: String,
        /// The source text.
        source: String,
    },
    /// Compiled bytecode.
    Bytecode {
        /// Name used in diagnostics.
        name: String,
        /// The bytecode.
        bytes: Vec<u8>,
    },
}

impl ShaderCode {
    /// The name of the shader for diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Self::Hlsl { name, .. } | Self::Bytecode { name, .. } => name,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Hlsl { source, .. } => source.trim().is_empty(),
            Self::Bytecode { bytes, .. } => bytes.is_empty(),
        }
    }
}

/// The vertex and pixel programs of the quad pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPipelineDesc {
    /// The vertex shader.
    pub vertex: ShaderProgram,
    /// The pixel shader.
    pub pixel: ShaderProgram,
}

impl ShaderPipelineDesc {
    /// Load both shaders from files, using the default entry points and profiles.
    pub fn from_paths(vertex: impl Into<PathBuf>, pixel: impl Into<PathBuf>) -> Self {
        Self {
            vertex: ShaderProgram::vertex(ShaderSource::Path(vertex.into())),
            pixel: ShaderProgram::pixel(ShaderSource::Path(pixel.into())),
        }
    }
}

impl Default for ShaderPipelineDesc {
    /// The built in passthrough shaders.
    fn default() -> Self {
        Self {
            vertex: ShaderProgram::vertex(ShaderSource::Hlsl {
                name: "VertexShader.hlsl".into(),
                source: include_str!("../shaders/VertexShader.hlsl").into(),
            }),
            pixel: ShaderProgram::pixel(ShaderSource::Hlsl {
                name: "PixelShader.hlsl".into(),
                source: include_str!("../shaders/PixelShader.hlsl").into(),
            }),
        }
    }
}

/// If `source` contains a function named `entry_point`.
fn declares_entry_point(source: &str, entry_point: &str) -> bool {
    let is_identifier = |c: char| c.is_ascii_alphanumeric() || c == '_';

    source.match_indices(entry_point).any(|(index, _)| {
        let before = source[..index].chars().next_back();
        if before.is_some_and(is_identifier) {
            return false;
        }

        let after = source[index + entry_point.len()..].trim_start();
        after.starts_with('(')
    })
}

/// Error variants from loading shaders and creating the pipeline state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// A shader file could not be read.
    #[error("Failed to read {stage} shader '{}':\n{source}", .path.display())]
    ReadShader {
        /// The stage of the shader.
        stage: ShaderStage,
        /// The path that was read.
        path: PathBuf,
        /// The IO error.
        #[source]
        source: io::Error,
    },

    /// A shader contained nothing.
    #[error("The {stage} shader '{name}' is empty")]
    EmptyShader {
        /// The stage of the shader.
        stage: ShaderStage,
        /// The shader name.
        name: String,
    },

    /// The HLSL source has no function matching the entry point.
    #[error("The {stage} shader '{name}' has no entry point '{entry_point}'")]
    MissingEntryPoint {
        /// The stage of the shader.
        stage: ShaderStage,
        /// The shader name.
        name: String,
        /// The missing entry point.
        entry_point: String,
    },

    /// The shader compiler rejected the source.
    #[error("Failed to compile {stage} shader '{name}':\n{message}")]
    Compile {
        /// The stage of the shader.
        stage: ShaderStage,
        /// The shader name.
        name: String,
        /// The compiler diagnostics.
        message: String,
    },

    /// The device rejected the shader.
    #[error("Failed to create {stage} shader:\n{source}")]
    CreateShader {
        /// The stage of the shader.
        stage: ShaderStage,
        /// The device error.
        #[source]
        source: GpuError,
    },

    /// The input layout could not be created.
    #[error("Failed to create input layout:\n{0}")]
    InputLayout(#[source] GpuError),

    /// The vertex buffer could not be created.
    #[error("Failed to create vertex buffer:\n{0}")]
    VertexBuffer(#[source] GpuError),

    /// The sampler could not be created.
    #[error("Failed to create sampler:\n{0}")]
    Sampler(#[source] GpuError),
}
