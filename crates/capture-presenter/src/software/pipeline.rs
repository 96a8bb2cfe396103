use tracing::{debug, instrument};

use crate::{
    PipelineError, QUAD_VERTICES, SAMPLER, SamplerDesc, ShaderPipelineDesc, ShaderProgram,
    ShaderStage, Vertex,
};

use super::{Context, Event, Resource};

/// The static quad pipeline state for the software backend.
pub struct SoftwarePipeline {
    context: Context,
    pub(super) vertices: [Vertex; 4],
    pub(super) sampler: SamplerDesc,
}

impl SoftwarePipeline {
    #[instrument("SoftwarePipeline::new", skip_all, err)]
    pub(super) fn new(context: Context, desc: &ShaderPipelineDesc) -> Result<Self, PipelineError> {
        for program in [&desc.vertex, &desc.pixel] {
            let code = program.load()?;
            check_profile(program, code.name())?;
            debug!("Loaded {} shader '{}'", program.stage, code.name());
        }

        context.journal.record(Event::CreatePipeline);

        Ok(Self {
            context,
            vertices: QUAD_VERTICES,
            sampler: SAMPLER,
        })
    }
}

impl Drop for SoftwarePipeline {
    fn drop(&mut self) {
        self.context.journal.record(Event::Release(Resource::Pipeline));
    }
}

/// Reject profiles that target a different stage, e.g. a `ps_5_0` vertex shader.
fn check_profile(program: &ShaderProgram, name: &str) -> Result<(), PipelineError> {
    let prefix = match program.stage {
        ShaderStage::Vertex => "vs_",
        ShaderStage::Pixel => "ps_",
    };

    if program.profile.starts_with(prefix) {
        return Ok(());
    }

    Err(PipelineError::Compile {
        stage: program.stage,
        name: name.to_owned(),
        message: format!(
            "profile '{}' does not target the {} stage",
            program.profile, program.stage
        ),
    })
}
