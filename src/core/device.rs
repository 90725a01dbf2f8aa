// Device: the factory for every GPU object, plus the capability and projection surface
//
// Backends implement the `make_*` hooks; the public `create_*` entry points validate their
// arguments first, so both backends share one contract. Every object a device creates borrows
// it, which keeps the device alive for as long as any of its children.

use glam::{Mat4, UVec2};

use super::{PhysicalDevice, SwapChain};
use crate::command::{CommandPool, Queue};
use crate::descriptor::{DescriptorSetLayout, DescriptorSetLayoutBinding, LayoutBindings};
use crate::enums::{ImageLayout, PixelFormat, QueryType};
use crate::error::{Error, Result};
use crate::flags::{
    BufferTargets, CommandPoolCreateFlags, FenceCreateFlags, MemoryPropertyFlags,
    QueryPipelineStatisticFlags, ShaderStageFlags,
};
use crate::pipeline::{
    GraphicsPipelineCreateInfo, Pipeline, PipelineLayout, PipelineLayoutDescription,
    PushConstantRange,
};
use crate::projection::{self, ClipDirection};
use crate::query::QueryPool;
use crate::render_pass::{
    AttachmentDescription, FrameBuffer, RenderPass, RenderPassDescription, RenderPassState,
    RenderSubpass,
};
use crate::resource::{
    aligned_size, Buffer, BufferView, Sampler, SamplerCreateInfo, StagingBuffer, Texture,
    TextureView, UniformBuffer,
};
use crate::shader::ShaderModule;
use crate::sync::{Fence, Semaphore};

pub trait Device {
    /// Name of the backend that created this device.
    fn renderer_name(&self) -> &str;

    fn clip_direction(&self) -> ClipDirection;

    fn physical_device(&self) -> &PhysicalDevice;

    fn graphics_queue(&self) -> &dyn Queue;
    fn compute_queue(&self) -> &dyn Queue;
    fn present_queue(&self) -> &dyn Queue;

    fn graphics_command_pool(&self) -> &dyn CommandPool;
    fn compute_command_pool(&self) -> &dyn CommandPool;
    fn present_command_pool(&self) -> &dyn CommandPool;

    /// Makes the device's context current. Nested calls are counted.
    ///
    /// Backends without a current-context notion implement this as a no-op.
    fn enable(&self) -> Result<()>;

    /// Balances one `enable`. The context is released when the count drops back to 0.
    fn disable(&self);

    // Backend hooks. Arguments reaching them are already validated.

    fn make_render_pass(&self, description: RenderPassDescription)
        -> Result<Box<dyn RenderPass + '_>>;

    fn make_frame_buffer<'a>(
        &'a self,
        render_pass: &'a dyn RenderPass,
        views: &[&'a dyn TextureView],
        dimensions: UVec2,
    ) -> Result<Box<dyn FrameBuffer + 'a>>;

    fn make_descriptor_set_layout(
        &self,
        bindings: LayoutBindings,
    ) -> Result<Box<dyn DescriptorSetLayout + '_>>;

    fn make_pipeline_layout(
        &self,
        description: PipelineLayoutDescription,
    ) -> Result<Box<dyn PipelineLayout + '_>>;

    fn make_graphics_pipeline(
        &self,
        info: &GraphicsPipelineCreateInfo<'_>,
    ) -> Result<Box<dyn Pipeline + '_>>;

    fn make_swap_chain(&self, size: UVec2) -> Result<Box<dyn SwapChain + '_>>;

    // Plain factories.

    /// A texture without storage. It gets some on the first `set_image`.
    fn create_texture(&self, initial_layout: ImageLayout) -> Result<Box<dyn Texture + '_>>;

    fn create_sampler(&self, info: &SamplerCreateInfo) -> Result<Box<dyn Sampler + '_>>;

    fn create_buffer(
        &self,
        size: u64,
        targets: BufferTargets,
        memory_flags: MemoryPropertyFlags,
    ) -> Result<Box<dyn Buffer + '_>>;

    fn create_buffer_view(
        &self,
        buffer: &dyn Buffer,
        format: PixelFormat,
        offset: u64,
        range: u64,
    ) -> Result<Box<dyn BufferView + '_>>;

    fn create_command_pool(
        &self,
        queue_family_index: u32,
        flags: CommandPoolCreateFlags,
    ) -> Result<Box<dyn CommandPool + '_>>;

    fn create_shader_module(&self, stage: ShaderStageFlags) -> Result<Box<dyn ShaderModule + '_>>;

    fn create_query_pool(
        &self,
        query_type: QueryType,
        query_count: u32,
        pipeline_statistics: QueryPipelineStatisticFlags,
    ) -> Result<Box<dyn QueryPool + '_>>;

    fn create_fence(&self, flags: FenceCreateFlags) -> Result<Box<dyn Fence + '_>>;

    fn create_semaphore(&self) -> Result<Box<dyn Semaphore + '_>>;

    /// Blocks until every submitted piece of work has completed.
    fn wait_idle(&self) -> Result<()>;

    // Provided entry points.

    fn timestamp_period(&self) -> f32 {
        self.physical_device().limits.timestamp_period
    }

    /// Fails if `subpasses` is empty or a subpass references a missing attachment.
    fn create_render_pass(
        &self,
        attachments: Vec<AttachmentDescription>,
        subpasses: Vec<RenderSubpass>,
        initial_state: RenderPassState,
        final_state: RenderPassState,
    ) -> Result<Box<dyn RenderPass + '_>> {
        let description =
            RenderPassDescription::new(attachments, subpasses, initial_state, final_state)?;
        self.make_render_pass(description)
    }

    /// `views` are matched with the render pass attachments by position.
    fn create_frame_buffer<'a>(
        &'a self,
        render_pass: &'a dyn RenderPass,
        views: &[&'a dyn TextureView],
        dimensions: UVec2,
    ) -> Result<Box<dyn FrameBuffer + 'a>> {
        let expected = render_pass.description().attachments().len();
        if views.len() != expected {
            return Err(Error::precondition(format!(
                "Frame buffer needs {expected} views, got {}",
                views.len()
            )));
        }
        if dimensions.x == 0 || dimensions.y == 0 {
            return Err(Error::precondition("Frame buffer dimensions must be non-zero"));
        }
        self.make_frame_buffer(render_pass, views, dimensions)
    }

    /// Fails if two bindings share a binding point.
    fn create_descriptor_set_layout(
        &self,
        bindings: Vec<DescriptorSetLayoutBinding>,
    ) -> Result<Box<dyn DescriptorSetLayout + '_>> {
        self.make_descriptor_set_layout(LayoutBindings::new(bindings)?)
    }

    fn create_pipeline_layout(
        &self,
        set_layouts: &[&dyn DescriptorSetLayout],
        push_constant_ranges: &[PushConstantRange],
    ) -> Result<Box<dyn PipelineLayout + '_>> {
        let description = PipelineLayoutDescription::new(
            set_layouts,
            push_constant_ranges,
            self.physical_device().limits.max_push_constants_size,
        )?;
        self.make_pipeline_layout(description)
    }

    fn create_empty_pipeline_layout(&self) -> Result<Box<dyn PipelineLayout + '_>> {
        self.create_pipeline_layout(&[], &[])
    }

    fn create_pipeline_layout_with_set(
        &self,
        set_layout: &dyn DescriptorSetLayout,
    ) -> Result<Box<dyn PipelineLayout + '_>> {
        self.create_pipeline_layout(&[set_layout], &[])
    }

    fn create_pipeline_layout_with_push_constants(
        &self,
        push_constant_range: PushConstantRange,
    ) -> Result<Box<dyn PipelineLayout + '_>> {
        self.create_pipeline_layout(&[], &[push_constant_range])
    }

    fn create_pipeline_layout_with_set_and_push_constants(
        &self,
        set_layout: &dyn DescriptorSetLayout,
        push_constant_range: PushConstantRange,
    ) -> Result<Box<dyn PipelineLayout + '_>> {
        self.create_pipeline_layout(&[set_layout], &[push_constant_range])
    }

    fn create_graphics_pipeline(
        &self,
        info: &GraphicsPipelineCreateInfo<'_>,
    ) -> Result<Box<dyn Pipeline + '_>> {
        info.validate(&self.physical_device().features)?;
        self.make_graphics_pipeline(info)
    }

    /// A buffer holding `count` elements, each starting on a uniform offset boundary.
    fn create_uniform_buffer(
        &self,
        count: u32,
        element_size: u64,
        targets: BufferTargets,
        memory_flags: MemoryPropertyFlags,
    ) -> Result<UniformBuffer<'_>> {
        if count == 0 {
            return Err(Error::precondition("Uniform buffer needs at least one element"));
        }

        let alignment = self
            .physical_device()
            .limits
            .min_uniform_buffer_offset_alignment;
        let aligned = aligned_size(element_size, alignment)?;
        let total = aligned.checked_mul(u64::from(count)).ok_or_else(|| {
            Error::precondition(format!("Uniform buffer of {count} x {aligned} bytes overflows"))
        })?;

        let buffer =
            self.create_buffer(total, targets | BufferTargets::UNIFORM_BUFFER, memory_flags)?;
        Ok(UniformBuffer::new(buffer, count, element_size, aligned))
    }

    /// A host-visible buffer of `size` bytes for filling device-local resources.
    fn create_staging_buffer(&self, size: u64) -> Result<StagingBuffer<'_>> {
        let buffer = self.create_buffer(
            size,
            BufferTargets::TRANSFER_SRC,
            MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT,
        )?;
        StagingBuffer::new(buffer)
    }

    /// Never fails: backend errors are logged and turn into `None`.
    fn create_swap_chain(&self, size: UVec2) -> Option<Box<dyn SwapChain + '_>> {
        match self.make_swap_chain(size) {
            Ok(swap_chain) => Some(swap_chain),
            Err(e) => {
                log::error!("Failed to create swap chain ({}x{}): {}", size.x, size.y, e);
                None
            }
        }
    }

    fn frustum(&self, left: f32, right: f32, bottom: f32, top: f32, z_near: f32, z_far: f32) -> Mat4 {
        projection::frustum(self.clip_direction(), left, right, bottom, top, z_near, z_far)
    }

    fn perspective(&self, fovy: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
        projection::perspective(self.clip_direction(), fovy, aspect, z_near, z_far)
    }

    fn ortho(&self, left: f32, right: f32, bottom: f32, top: f32, z_near: f32, z_far: f32) -> Mat4 {
        projection::ortho(self.clip_direction(), left, right, bottom, top, z_near, z_far)
    }

    fn infinite_perspective(&self, fovy: f32, aspect: f32, z_near: f32) -> Mat4 {
        projection::infinite_perspective(fovy, aspect, z_near)
    }
}

/// Keeps a device enabled for its own lifetime.
#[must_use = "the context is released as soon as the guard is dropped"]
pub struct ContextGuard<'a> {
    device: &'a dyn Device,
}

impl<'a> ContextGuard<'a> {
    pub fn new(device: &'a dyn Device) -> Result<Self> {
        device.enable()?;
        Ok(Self { device })
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.device.disable();
    }
}

