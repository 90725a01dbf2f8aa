// GL sampler objects

use super::call::GlCall;
use super::consts as gl;
use super::convert;
use super::shared::GlShared;
use crate::core::NativeHandle;
use crate::error::Result;
use crate::resource::{BorderColourValue, Sampler, SamplerCreateInfo};

pub struct GlSampler<'d> {
    shared: &'d GlShared,
    info: SamplerCreateInfo,
    name: u32,
}

/// Parameter calls programming `info` into `sampler`.
fn parameter_calls(sampler: u32, info: &SamplerCreateInfo, shared: &GlShared) -> Vec<GlCall> {
    let int = |pname, value| GlCall::SamplerParameteri {
        sampler,
        pname,
        value,
    };
    let float = |pname, value| GlCall::SamplerParameterf {
        sampler,
        pname,
        value,
    };

    let mut calls = vec![
        int(gl::TEXTURE_WRAP_S, convert::wrap_mode(info.wrap_s)),
        int(gl::TEXTURE_WRAP_T, convert::wrap_mode(info.wrap_t)),
        int(gl::TEXTURE_WRAP_R, convert::wrap_mode(info.wrap_r)),
        int(
            gl::TEXTURE_MIN_FILTER,
            convert::min_filter(info.min_filter, info.mip_filter),
        ),
        int(gl::TEXTURE_MAG_FILTER, convert::mag_filter(info.mag_filter)),
        float(gl::TEXTURE_MIN_LOD, info.min_lod),
        float(gl::TEXTURE_MAX_LOD, info.max_lod),
        float(gl::TEXTURE_LOD_BIAS, info.lod_bias),
    ];

    calls.push(match info.border_colour.value() {
        BorderColourValue::Float(value) => GlCall::SamplerParameterfv {
            sampler,
            pname: gl::TEXTURE_BORDER_COLOR,
            value,
        },
        BorderColourValue::Int(value) => GlCall::SamplerParameterIiv {
            sampler,
            pname: gl::TEXTURE_BORDER_COLOR,
            value,
        },
    });

    let device = shared.physical_device();
    if let Some(anisotropy) = info.anisotropy(&device.features, &device.limits) {
        calls.push(float(gl::TEXTURE_MAX_ANISOTROPY, anisotropy));
    }

    match info.compare() {
        Some(op) => {
            calls.push(int(gl::TEXTURE_COMPARE_MODE, gl::COMPARE_REF_TO_TEXTURE as i32));
            calls.push(int(gl::TEXTURE_COMPARE_FUNC, convert::compare_op(op) as i32));
        }
        None => calls.push(int(gl::TEXTURE_COMPARE_MODE, gl::NONE as i32)),
    }
    calls
}

impl<'d> GlSampler<'d> {
    pub fn new(shared: &'d GlShared, info: &SamplerCreateInfo) -> Result<Self> {
        let _guard = shared.guard()?;
        let name = shared.create(GlCall::CreateSampler)?;
        let sampler = Self {
            shared,
            info: *info,
            name,
        };
        for call in parameter_calls(name, info, shared) {
            shared.call(call)?;
        }
        Ok(sampler)
    }
}

impl Sampler for GlSampler<'_> {
    fn info(&self) -> &SamplerCreateInfo {
        &self.info
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.name)
    }
}

impl Drop for GlSampler<'_> {
    fn drop(&mut self) {
        self.shared.release(GlCall::DeleteSampler(self.name));
    }
}
