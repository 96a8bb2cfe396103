//! Tests for loading the quad pipeline shaders
//!

use std::{fs, path::PathBuf};

use capture_presenter::{
    CreationError, INPUT_LAYOUT, LiveCapture, LiveCaptureOptions, PipelineError, QUAD_VERTICES,
    ShaderCode, ShaderPipelineDesc, ShaderProgram, ShaderSource, ShaderStage, Size, VERTEX_STRIDE,
    software::{Event, SoftwareCaptureItem, SoftwareDevice},
};
use test_helper::logger::init_logger;

fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
    let directory = std::env::temp_dir().join("capture-presenter-tests");
    fs::create_dir_all(&directory).unwrap();

    let path = directory.join(format!("{}-{name}", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

fn create(pipeline: ShaderPipelineDesc) -> Result<LiveCapture<SoftwareDevice>, CreationError> {
    let options = LiveCaptureOptions {
        pipeline,
        ..Default::default()
    };

    LiveCapture::new(
        SoftwareDevice::new(),
        SoftwareCaptureItem::new(Size::new(16, 16)),
        options,
    )
}

fn hlsl(name: &str, source: &str) -> ShaderSource {
    ShaderSource::Hlsl {
        name: name.into(),
        source: source.into(),
    }
}

#[test]
fn default_shaders_load() {
    init_logger();

    let desc = ShaderPipelineDesc::default();

    let vertex = desc.vertex.load().unwrap();
    assert_eq!(vertex.name(), "VertexShader.hlsl");
    assert!(matches!(vertex, ShaderCode::Hlsl { .. }));

    let pixel = desc.pixel.load().unwrap();
    assert_eq!(pixel.name(), "PixelShader.hlsl");

    let device = SoftwareDevice::new();
    let journal = device.journal();
    let _capture = LiveCapture::new(
        device,
        SoftwareCaptureItem::new(Size::new(16, 16)),
        LiveCaptureOptions::default(),
    )
    .unwrap();
    assert_eq!(journal.count(|e| matches!(e, Event::CreatePipeline)), 1);
}

#[test]
fn missing_shader_file() {
    init_logger();

    let desc =
        ShaderPipelineDesc::from_paths("does/not/exist/VertexShader.hlsl", "PixelShader.hlsl");

    let result = create(desc);
    assert!(matches!(
        result,
        Err(CreationError::Pipeline(PipelineError::ReadShader {
            stage: ShaderStage::Vertex,
            ..
        }))
    ));
}

#[test]
fn shaders_from_files() {
    init_logger();

    let vertex = temp_file(
        "VertexShader.hlsl",
        include_bytes!("../shaders/VertexShader.hlsl"),
    );
    let pixel = temp_file("PixelShader.hlsl", include_bytes!("../shaders/PixelShader.hlsl"));

    create(ShaderPipelineDesc::from_paths(&vertex, &pixel)).unwrap();
}

#[test]
fn compiled_shader_objects_are_bytecode() {
    let bytes = [0x44, 0x58, 0x42, 0x43, 0x01, 0x02];

    for name in ["shader.cso", "SHADER.CSO"] {
        let path = temp_file(name, &bytes);
        let code = ShaderProgram::pixel(ShaderSource::Path(path)).load().unwrap();

        let ShaderCode::Bytecode { bytes: loaded, .. } = code else {
            panic!("{name} should load as bytecode");
        };
        assert_eq!(loaded, bytes);
    }
}

#[test]
fn empty_shader() {
    let program = ShaderProgram::vertex(hlsl("empty.hlsl", "  \n\t"));
    assert!(matches!(
        program.load(),
        Err(PipelineError::EmptyShader { .. })
    ));

    let program = ShaderProgram::vertex(ShaderSource::Bytecode(Vec::new()));
    assert!(matches!(
        program.load(),
        Err(PipelineError::EmptyShader { .. })
    ));
}

#[test]
fn missing_entry_point() {
    init_logger();

    for source in [
        "float4 main(float4 p : POSITION) : SV_POSITION { return p; }",
        "float4 VSMain(float4 p : POSITION) : SV_POSITION { return p; }",
        "float4 MyVS(float4 p : POSITION) : SV_POSITION { return p; }",
        "// VS is not declared here",
    ] {
        let program = ShaderProgram::vertex(hlsl("vertex.hlsl", source));
        assert!(
            matches!(program.load(), Err(PipelineError::MissingEntryPoint { .. })),
            "'{source}' should have no VS entry point"
        );
    }

    let program = ShaderProgram::vertex(hlsl(
        "vertex.hlsl",
        "float4 VS (float4 p : POSITION) : SV_POSITION { return p; }",
    ));
    program.load().unwrap();

    let desc = ShaderPipelineDesc {
        pixel: ShaderProgram::pixel(hlsl("pixel.hlsl", "float4 main() : SV_TARGET { return 1; }")),
        ..Default::default()
    };
    assert!(matches!(
        create(desc),
        Err(CreationError::Pipeline(PipelineError::MissingEntryPoint {
            stage: ShaderStage::Pixel,
            ..
        }))
    ));
}

#[test]
fn profile_must_match_stage() {
    init_logger();

    let mut desc = ShaderPipelineDesc::default();
    desc.vertex.profile = "ps_5_0".into();

    assert!(matches!(
        create(desc),
        Err(CreationError::Pipeline(PipelineError::Compile {
            stage: ShaderStage::Vertex,
            ..
        }))
    ));
}

#[test]
fn quad_layout() {
    assert_eq!(VERTEX_STRIDE, 16);
    assert_eq!(INPUT_LAYOUT[0].semantic.to_str().unwrap(), "POSITION");
    assert_eq!(INPUT_LAYOUT[0].offset, 0);
    assert_eq!(INPUT_LAYOUT[1].semantic.to_str().unwrap(), "TEXCOORD");
    assert_eq!(INPUT_LAYOUT[1].offset, 8);

    let uvs = QUAD_VERTICES.map(|vertex| vertex.uv);
    assert_eq!(uvs, [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
}
