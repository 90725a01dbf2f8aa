// GL device: one context, one queue, and the objects every command list relies on
//
// The vertex array and the push-constant buffer are created once and stay bound for the life
// of the device. Pipelines only change attribute formats; push constants land in a uniform
// block at the last binding the context offers.

use std::rc::Rc;

use glam::UVec2;

use super::buffer::{GlBuffer, GlBufferView};
use super::call::GlCall;
use super::command::{GlCommandPool, GlQueue};
use super::consts as gl;
use super::context::{GlCapabilities, GlContext};
use super::descriptor::{GlDescriptorSetLayout, GlPipelineLayout};
use super::image::GlTexture;
use super::pipeline::GlPipeline;
use super::query::GlQueryPool;
use super::render_pass::{GlFrameBuffer, GlRenderPass};
use super::sampler::GlSampler;
use super::shader::GlShaderModule;
use super::shared::GlShared;
use super::state;
use super::swapchain::GlSwapChain;
use super::sync::{GlFence, GlSemaphore};
use crate::command::{CommandPool, Queue};
use crate::core::{Device, PhysicalDevice, SwapChain};
use crate::descriptor::{DescriptorSetLayout, LayoutBindings};
use crate::enums::{ImageLayout, PixelFormat, QueryType};
use crate::error::{Error, Result};
use crate::flags::{
    BufferTargets, CommandPoolCreateFlags, FenceCreateFlags, MemoryPropertyFlags,
    QueryPipelineStatisticFlags, ShaderStageFlags,
};
use crate::pipeline::{
    GraphicsPipelineCreateInfo, Pipeline, PipelineLayout, PipelineLayoutDescription,
    PipelineStates,
};
use crate::projection::ClipDirection;
use crate::query::QueryPool;
use crate::render_pass::{FrameBuffer, RenderPass, RenderPassDescription};
use crate::resource::{check_buffer_view, Buffer, BufferView, Sampler, SamplerCreateInfo, Texture, TextureView};
use crate::shader::ShaderModule;
use crate::sync::{Fence, Semaphore};

/// Size of the uniform block backing push constants.
pub const PUSH_CONSTANT_BLOCK_SIZE: u64 = 128;

pub struct GlDevice {
    shared: Rc<GlShared>,
    queue: GlQueue,
    pool: GlCommandPool,
}

impl GlDevice {
    pub fn new(context: Rc<dyn GlContext>, caps: GlCapabilities) -> Result<Self> {
        if !caps.supports_direct_state_access() {
            return Err(Error::construction(
                "Device",
                format!(
                    "GL {}.{} without GL_ARB_direct_state_access",
                    caps.version.0, caps.version.1
                ),
            ));
        }

        let shared = Rc::new(GlShared::new(context, caps));
        {
            let _guard = shared.guard()?;
            let mut calls = Vec::new();
            state::apply_pipeline_states(
                &PipelineStates::default(),
                &shared.physical_device().features,
                &mut calls,
            );
            calls.push(GlCall::Enable(gl::TEXTURE_CUBE_MAP_SEAMLESS));
            calls.push(GlCall::Enable(gl::SCISSOR_TEST));
            if shared.caps().supports_clip_control() {
                calls.push(GlCall::ClipControl {
                    origin: gl::UPPER_LEFT,
                    depth: gl::ZERO_TO_ONE,
                });
            }
            for call in calls {
                shared.call(call)?;
            }

            let vao = shared.create(GlCall::CreateVertexArray)?;
            shared.call(GlCall::BindVertexArray(vao))?;
            let push_constants = shared.create(GlCall::CreateBuffer)?;
            shared.set_device_objects(vao, push_constants);
            shared.call(GlCall::NamedBufferStorage {
                buffer: push_constants,
                size: PUSH_CONSTANT_BLOCK_SIZE,
                flags: gl::DYNAMIC_STORAGE_BIT,
            })?;
            shared.call(GlCall::BindBufferRange {
                target: gl::UNIFORM_BUFFER,
                index: shared.push_constant_binding(),
                buffer: push_constants,
                offset: 0,
                size: PUSH_CONSTANT_BLOCK_SIZE,
            })?;
        }

        let caps = shared.caps();
        log::info!(
            "GL device: {} {}.{} ({}), clip {:?}",
            caps.renderer,
            caps.version.0,
            caps.version.1,
            caps.vendor,
            shared.clip_direction()
        );

        Ok(Self {
            queue: GlQueue::new(Rc::clone(&shared), 0),
            pool: GlCommandPool::new(
                Rc::clone(&shared),
                0,
                CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
            ),
            shared,
        })
    }

    pub fn shared(&self) -> &GlShared {
        &self.shared
    }
}

impl Device for GlDevice {
    fn renderer_name(&self) -> &str {
        "gl"
    }

    fn clip_direction(&self) -> ClipDirection {
        self.shared.clip_direction()
    }

    fn physical_device(&self) -> &PhysicalDevice {
        self.shared.physical_device()
    }

    fn graphics_queue(&self) -> &dyn Queue {
        &self.queue
    }

    fn compute_queue(&self) -> &dyn Queue {
        &self.queue
    }

    fn present_queue(&self) -> &dyn Queue {
        &self.queue
    }

    fn graphics_command_pool(&self) -> &dyn CommandPool {
        &self.pool
    }

    fn compute_command_pool(&self) -> &dyn CommandPool {
        &self.pool
    }

    fn present_command_pool(&self) -> &dyn CommandPool {
        &self.pool
    }

    fn enable(&self) -> Result<()> {
        self.shared.enable()
    }

    fn disable(&self) {
        self.shared.disable()
    }

    fn make_render_pass(
        &self,
        description: RenderPassDescription,
    ) -> Result<Box<dyn RenderPass + '_>> {
        Ok(Box::new(GlRenderPass::new(&self.shared, description)))
    }

    fn make_frame_buffer<'a>(
        &'a self,
        render_pass: &'a dyn RenderPass,
        views: &[&'a dyn TextureView],
        dimensions: UVec2,
    ) -> Result<Box<dyn FrameBuffer + 'a>> {
        Ok(Box::new(GlFrameBuffer::new(
            &self.shared,
            render_pass,
            views,
            dimensions,
        )?))
    }

    fn make_descriptor_set_layout(
        &self,
        bindings: LayoutBindings,
    ) -> Result<Box<dyn DescriptorSetLayout + '_>> {
        Ok(Box::new(GlDescriptorSetLayout::new(&self.shared, bindings)))
    }

    fn make_pipeline_layout(
        &self,
        description: PipelineLayoutDescription,
    ) -> Result<Box<dyn PipelineLayout + '_>> {
        Ok(Box::new(GlPipelineLayout::new(&self.shared, description)))
    }

    fn make_graphics_pipeline(
        &self,
        info: &GraphicsPipelineCreateInfo<'_>,
    ) -> Result<Box<dyn Pipeline + '_>> {
        Ok(Box::new(GlPipeline::new(&self.shared, info)?))
    }

    fn make_swap_chain(&self, size: UVec2) -> Result<Box<dyn SwapChain + '_>> {
        Ok(Box::new(GlSwapChain::new(&self.shared, size)?))
    }

    fn create_texture(&self, initial_layout: ImageLayout) -> Result<Box<dyn Texture + '_>> {
        Ok(Box::new(GlTexture::new(&self.shared, initial_layout)))
    }

    fn create_sampler(&self, info: &SamplerCreateInfo) -> Result<Box<dyn Sampler + '_>> {
        Ok(Box::new(GlSampler::new(&self.shared, info)?))
    }

    fn create_buffer(
        &self,
        size: u64,
        targets: BufferTargets,
        memory_flags: MemoryPropertyFlags,
    ) -> Result<Box<dyn Buffer + '_>> {
        Ok(Box::new(GlBuffer::new(&self.shared, size, targets, memory_flags)?))
    }

    fn create_buffer_view(
        &self,
        buffer: &dyn Buffer,
        format: PixelFormat,
        offset: u64,
        range: u64,
    ) -> Result<Box<dyn BufferView + '_>> {
        let alignment = self.physical_device().limits.min_texel_buffer_offset_alignment;
        check_buffer_view(buffer, format, offset, range, alignment)?;
        let name = buffer.native().gl("buffer")?;
        Ok(Box::new(GlBufferView::new(&self.shared, name, format, offset, range)?))
    }

    fn create_command_pool(
        &self,
        queue_family_index: u32,
        flags: CommandPoolCreateFlags,
    ) -> Result<Box<dyn CommandPool + '_>> {
        if queue_family_index != 0 {
            return Err(Error::precondition(format!(
                "GL has one queue family, {queue_family_index} was asked for"
            )));
        }
        Ok(Box::new(GlCommandPool::new(
            Rc::clone(&self.shared),
            queue_family_index,
            flags,
        )))
    }

    fn create_shader_module(&self, stage: ShaderStageFlags) -> Result<Box<dyn ShaderModule + '_>> {
        Ok(Box::new(GlShaderModule::new(&self.shared, stage)?))
    }

    /// Pipeline statistics queries are refused with `Error::Unsupported`, so the flags are never read.
    fn create_query_pool(
        &self,
        query_type: QueryType,
        query_count: u32,
        _pipeline_statistics: QueryPipelineStatisticFlags,
    ) -> Result<Box<dyn QueryPool + '_>> {
        Ok(Box::new(GlQueryPool::new(&self.shared, query_type, query_count)?))
    }

    fn create_fence(&self, flags: FenceCreateFlags) -> Result<Box<dyn Fence + '_>> {
        Ok(Box::new(GlFence::new(&self.shared, flags)))
    }

    fn create_semaphore(&self) -> Result<Box<dyn Semaphore + '_>> {
        Ok(Box::new(GlSemaphore::new(&self.shared)))
    }

    fn wait_idle(&self) -> Result<()> {
        self.queue.wait_idle()
    }
}

impl Drop for GlDevice {
    fn drop(&mut self) {
        if let Some((read, draw)) = self.shared.take_blit_framebuffers() {
            self.shared.release(GlCall::DeleteFramebuffer(read));
            self.shared.release(GlCall::DeleteFramebuffer(draw));
        }
        self.shared
            .release(GlCall::DeleteBuffer(self.shared.push_constant_buffer()));
        self.shared
            .release(GlCall::DeleteVertexArray(self.shared.vao()));
        log::debug!("GL device dropped");
    }
}
