// Shader modules as separable single-stage programs

use super::call::GlCall;
use super::consts as gl;
use super::convert;
use super::shared::GlShared;
use crate::core::NativeHandle;
use crate::error::{Error, Result};
use crate::flags::ShaderStageFlags;
use crate::shader::{log_lines, ShaderModule};

pub struct GlShaderModule<'d> {
    shared: &'d GlShared,
    stage: ShaderStageFlags,
    shader_type: u32,
    program: Option<u32>,
}

impl<'d> GlShaderModule<'d> {
    pub fn new(shared: &'d GlShared, stage: ShaderStageFlags) -> Result<Self> {
        let (shader_type, _) = convert::shader_stage(stage)?;
        Ok(Self {
            shared,
            stage,
            shader_type,
            program: None,
        })
    }

    /// Builds a program from a shader `load` fills in, replacing any previous program.
    fn build(&mut self, load: impl FnOnce(&GlShared, u32) -> Result<()>) -> Result<()> {
        let shared = self.shared;
        let _guard = shared.guard()?;
        let shader = shared.create(GlCall::CreateShader(self.shader_type))?;
        let program = load(shared, shader).and_then(|()| link(shared, shader));
        shared.release(GlCall::DeleteShader(shader));
        let program = program?;

        if let Some(previous) = self.program.replace(program) {
            shared.release(GlCall::DeleteProgram(previous));
        }
        Ok(())
    }
}

fn report(what: &str, log: &str, failed: bool) {
    for line in log_lines(log) {
        if failed {
            log::error!("{what}: {line}");
        } else {
            log::info!("{what}: {line}");
        }
    }
}

fn compile_status(shared: &GlShared, shader: u32) -> Result<(bool, String)> {
    let ok = shared
        .call(GlCall::GetShaderiv {
            shader,
            pname: gl::COMPILE_STATUS,
        })?
        .int()
        .unwrap_or(0)
        != 0;
    let log = shared.call(GlCall::GetShaderInfoLog(shader))?.into_text();
    Ok((ok, log))
}

/// Links `shader` into a new separable program.
fn link(shared: &GlShared, shader: u32) -> Result<u32> {
    let program = shared.create(GlCall::CreateProgram)?;
    let linked = (|| {
        shared.call(GlCall::ProgramParameteri {
            program,
            pname: gl::PROGRAM_SEPARABLE,
            value: 1,
        })?;
        shared.call(GlCall::AttachShader { program, shader })?;
        shared.call(GlCall::LinkProgram(program))?;
        shared.call(GlCall::DetachShader { program, shader })?;
        let ok = shared
            .call(GlCall::GetProgramiv {
                program,
                pname: gl::LINK_STATUS,
            })?
            .int()
            .unwrap_or(0)
            != 0;
        let log = shared.call(GlCall::GetProgramInfoLog(program))?.into_text();
        Ok::<_, Error>((ok, log))
    })();

    match linked {
        Ok((true, log)) => {
            report("Program link", &log, false);
            Ok(program)
        }
        Ok((false, log)) => {
            report("Program link", &log, true);
            shared.release(GlCall::DeleteProgram(program));
            Err(Error::construction("Shader program", first_line(&log, "link failed")))
        }
        Err(e) => {
            shared.release(GlCall::DeleteProgram(program));
            Err(e)
        }
    }
}

fn first_line(log: &str, fallback: &str) -> String {
    log_lines(log).next().unwrap_or(fallback).to_string()
}

impl ShaderModule for GlShaderModule<'_> {
    fn stage(&self) -> ShaderStageFlags {
        self.stage
    }

    fn load_glsl(&mut self, source: &str) -> Result<()> {
        let stage = self.stage;
        self.build(|shared, shader| {
            shared.call(GlCall::ShaderSource {
                shader,
                source: source.to_string(),
            })?;
            shared.call(GlCall::CompileShader(shader))?;
            let (ok, log) = compile_status(shared, shader)?;
            report(&format!("{stage:?} shader compile"), &log, !ok);
            if ok {
                Ok(())
            } else {
                Err(Error::construction("Shader", first_line(&log, "compilation failed")))
            }
        })
    }

    fn load_spirv(&mut self, code: &[u32]) -> Result<()> {
        if !self.shared.caps().supports_spirv() {
            return Err(Error::Unsupported(
                "SPIR-V shaders need GL 4.6 or GL_ARB_gl_spirv".to_string(),
            ));
        }
        let stage = self.stage;
        self.build(|shared, shader| {
            shared.call(GlCall::ShaderBinary {
                shader,
                format: gl::SHADER_BINARY_FORMAT_SPIR_V,
                binary: bytemuck::cast_slice(code).to_vec(),
            })?;
            shared.call(GlCall::SpecializeShader {
                shader,
                entry_point: "main".to_string(),
            })?;
            let (ok, log) = compile_status(shared, shader)?;
            report(&format!("{stage:?} SPIR-V specialisation"), &log, !ok);
            if ok {
                Ok(())
            } else {
                Err(Error::construction("Shader", first_line(&log, "specialisation failed")))
            }
        })
    }

    fn native(&self) -> Option<NativeHandle> {
        self.program.map(NativeHandle::Gl)
    }
}

impl Drop for GlShaderModule<'_> {
    fn drop(&mut self) {
        if let Some(program) = self.program.take() {
            self.shared.release(GlCall::DeleteProgram(program));
        }
    }
}
