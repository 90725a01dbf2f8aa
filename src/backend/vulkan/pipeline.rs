// Vulkan graphics pipelines

use anyhow::Context;
use ash::vk;

use super::convert;
use super::shared::VulkanShared;
use super::state::BakedStates;
use crate::core::NativeHandle;
use crate::enums::PipelineBindPoint;
use crate::error::{Error, Result};
use crate::pipeline::{GraphicsPipelineCreateInfo, Pipeline, PipelineStates};

const ENTRY_POINT: &std::ffi::CStr = c"main";

pub struct VulkanPipeline<'d> {
    shared: &'d VulkanShared,
    pipeline: vk::Pipeline,
    layout: NativeHandle,
    states: PipelineStates,
}

impl<'d> VulkanPipeline<'d> {
    pub fn new(shared: &'d VulkanShared, info: &GraphicsPipelineCreateInfo<'_>) -> Result<Self> {
        let layout = info.layout.native();
        let stages = info
            .stages
            .iter()
            .map(|module| {
                let native = module
                    .native()
                    .ok_or_else(|| Error::precondition("Shader module has no code loaded"))?;
                Ok(vk::PipelineShaderStageCreateInfo::builder()
                    .stage(convert::shader_stages(module.stage()))
                    .module(convert::handle(native, "shader module")?)
                    .name(ENTRY_POINT)
                    .build())
            })
            .collect::<Result<Vec<_>>>()?;

        let baked = BakedStates::new(&info.states);
        let vertex_input = baked.vertex_input();
        let viewport = baked.viewport();
        let multisample = baked.multisample();
        let colour_blend = baked.colour_blend();
        let dynamic = baked.dynamic();

        let mut pipeline_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&baked.input_assembly)
            .viewport_state(&viewport)
            .rasterization_state(&baked.rasterisation)
            .multisample_state(&multisample)
            .depth_stencil_state(&baked.depth_stencil)
            .color_blend_state(&colour_blend)
            .dynamic_state(&dynamic)
            .layout(convert::handle(layout, "pipeline layout")?)
            .render_pass(convert::handle(info.render_pass.native(), "render pass")?)
            .subpass(info.subpass);
        if let Some(tessellation) = baked.tessellation.as_ref() {
            pipeline_info = pipeline_info.tessellation_state(tessellation);
        }

        let pipelines = unsafe {
            shared
                .device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info.build()], None)
                .map_err(|(_, e)| e)
                .context("Failed to create graphics pipeline")?
        };
        log::debug!(
            "Created graphics pipeline with {} stages, dynamic {:?}",
            stages.len(),
            baked.dynamic_states()
        );

        Ok(Self {
            shared,
            pipeline: pipelines[0],
            layout,
            states: info.states.clone(),
        })
    }
}

impl Pipeline for VulkanPipeline<'_> {
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
        convert::native(self.pipeline)
    }
}

impl Drop for VulkanPipeline<'_> {
    fn drop(&mut self) {
        unsafe { self.shared.device.destroy_pipeline(self.pipeline, None) };
    }
}
