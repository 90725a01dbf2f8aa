// Graphics pipelines: program pipelines plus the fixed-function state to replay on bind

use super::call::GlCall;
use super::consts as gl;
use super::convert;
use super::shared::GlShared;
use crate::core::NativeHandle;
use crate::enums::PipelineBindPoint;
use crate::error::{Error, Result};
use crate::pipeline::{GraphicsPipelineCreateInfo, Pipeline, PipelineStates};
use crate::shader::log_lines;

pub struct GlPipeline<'d> {
    shared: &'d GlShared,
    name: u32,
    layout: NativeHandle,
    states: PipelineStates,
}

impl<'d> GlPipeline<'d> {
    pub fn new(shared: &'d GlShared, info: &GraphicsPipelineCreateInfo<'_>) -> Result<Self> {
        let layout = info.layout.native();
        layout.gl("pipeline layout")?;
        info.render_pass.native().gl("render pass")?;

        let mut stages = Vec::with_capacity(info.stages.len());
        for module in &info.stages {
            let program = module
                .native()
                .ok_or_else(|| Error::precondition("Shader module has no code loaded"))?
                .gl("shader module")?;
            let (_, stage_bit) = convert::shader_stage(module.stage())?;
            stages.push((stage_bit, program));
        }

        let _guard = shared.guard()?;
        let name = shared.create(GlCall::CreateProgramPipeline)?;
        let pipeline = Self {
            shared,
            name,
            layout,
            states: info.states.clone(),
        };
        for (stage_bit, program) in stages {
            shared.call(GlCall::UseProgramStages {
                pipeline: name,
                stages: stage_bit,
                program,
            })?;
        }
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// A pipeline failing validation is kept; its log is reported as warnings.
    fn validate(&self) -> Result<()> {
        self.shared.call(GlCall::ValidateProgramPipeline(self.name))?;
        let valid = self
            .shared
            .call(GlCall::GetProgramPipelineiv {
                pipeline: self.name,
                pname: gl::VALIDATE_STATUS,
            })?
            .int()
            .unwrap_or(0)
            != 0;
        if !valid {
            let log = self
                .shared
                .call(GlCall::GetProgramPipelineInfoLog(self.name))?
                .into_text();
            log::warn!("Program pipeline {} did not validate", self.name);
            for line in log_lines(&log) {
                log::warn!("  {line}");
            }
        }
        Ok(())
    }
}

impl Pipeline for GlPipeline<'_> {
    fn bind_point(&self) -> PipelineBindPoint {
        PipelineBindPoint::Graphics
    }

    fn states(&self) -> &PipelineStates {
        &self.states
    }

    fn layout(&self) -> NativeHandle {
        self.layout
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.name)
    }
}

impl Drop for GlPipeline<'_> {
    fn drop(&mut self) {
        self.shared.release(GlCall::DeleteProgramPipeline(self.name));
    }
}
