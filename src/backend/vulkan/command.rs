// Vulkan command pools, command buffers and queues
//
// Recording goes straight into the Vulkan command buffer. Misuse the driver would not report is
// caught here and kept for `end()`, like on the GL backend.

use std::rc::Rc;

use anyhow::Context;
use ash::vk;

use super::convert;
use super::shared::VulkanShared;
use super::state;
use super::transfer as vk_transfer;
use crate::command::{
    ClearValue, CommandBuffer, CommandBufferState, CommandPool, Lifecycle, Queue, SemaphoreWait,
};
use crate::core::NativeHandle;
use crate::descriptor::{DescriptorSet, LayoutBindings};
use crate::enums::{
    AttachmentLoadOp, DescriptorType, Filter, ImageLayout, IndexType, QueryType, SubpassContents,
};
use crate::error::{Error, Result};
use crate::flags::{
    CommandBufferUsageFlags, CommandPoolCreateFlags, PipelineStageFlags, QueryControlFlags,
    ShaderStageFlags,
};
use crate::pipeline::{Pipeline, PipelineLayout, Scissor, Viewport};
use crate::query::{self, QueryPool};
use crate::render_pass::{FrameBuffer, RenderPass, RenderPassDescription};
use crate::resource::{Buffer, Texture};
use crate::sync::{Fence, Semaphore};
use crate::transfer::{
    self, BufferCopy, BufferImageCopy, BufferMemoryBarrier, ImageBlit, ImageMemoryBarrier,
    MemoryBarrier,
};

/// Number of dynamic offsets a set of `bindings` takes: one per array element of each dynamic
/// buffer binding.
pub fn dynamic_offset_count(bindings: &LayoutBindings) -> u32 {
    bindings
        .iter()
        .filter(|binding| {
            matches!(
                binding.descriptor_type,
                DescriptorType::UniformBufferDynamic | DescriptorType::StorageBufferDynamic
            )
        })
        .map(|binding| binding.descriptor_count)
        .sum()
}

/// One clear value per attachment. Attachments that are not cleared get a zero value.
pub fn clear_values(
    description: &RenderPassDescription,
    values: &[ClearValue],
) -> Result<Vec<vk::ClearValue>> {
    let mut cleared = Vec::with_capacity(description.attachments().len());
    for (index, attachment) in (0u32..).zip(description.attachments()) {
        let format = attachment.format;
        let has_depth = format.is_depth_format() || format.is_depth_stencil_format();
        let has_stencil = format.is_stencil_format() || format.is_depth_stencil_format();
        let clears_colour =
            !format.is_depth_or_stencil_format() && attachment.load_op == AttachmentLoadOp::Clear;
        let clears_depth_stencil = (has_depth && attachment.load_op == AttachmentLoadOp::Clear)
            || (has_stencil && attachment.stencil_load_op == AttachmentLoadOp::Clear);
        if !(clears_colour || clears_depth_stencil) {
            cleared.push(vk::ClearValue::default());
            continue;
        }

        let value = values.get(index as usize).ok_or_else(|| {
            Error::precondition(format!("Attachment {index} is cleared but has no clear value"))
        })?;
        cleared.push(match (*value, clears_colour) {
            (ClearValue::Colour(float32), true) => vk::ClearValue {
                color: vk::ClearColorValue { float32 },
            },
            (ClearValue::DepthStencil { depth, stencil }, false) => vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue { depth, stencil },
            },
            (value, _) => {
                return Err(Error::precondition(format!(
                    "Clear value {value:?} does not fit attachment {index} ({format:?})"
                )))
            }
        });
    }
    Ok(cleared)
}

pub struct VulkanCommandPool {
    shared: Rc<VulkanShared>,
    pool: vk::CommandPool,
    family_index: u32,
    flags: CommandPoolCreateFlags,
}

impl VulkanCommandPool {
    pub fn new(
        shared: Rc<VulkanShared>,
        family_index: u32,
        flags: CommandPoolCreateFlags,
    ) -> Result<Self> {
        let pool_info = vk::CommandPoolCreateInfo::builder()
            .queue_family_index(family_index)
            .flags(vk::CommandPoolCreateFlags::from_raw(flags.bits()));
        let pool = unsafe { shared.device.create_command_pool(&pool_info, None) }
            .context("Failed to create command pool")?;
        Ok(Self {
            shared,
            pool,
            family_index,
            flags,
        })
    }
}

impl CommandPool for VulkanCommandPool {
    fn queue_family_index(&self) -> u32 {
        self.family_index
    }

    fn flags(&self) -> CommandPoolCreateFlags {
        self.flags
    }

    fn create_command_buffer(&self, primary: bool) -> Result<Box<dyn CommandBuffer + '_>> {
        Ok(Box::new(VulkanCommandBuffer::new(self, primary)?))
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.pool)
    }
}

impl Drop for VulkanCommandPool {
    fn drop(&mut self) {
        unsafe { self.shared.device.destroy_command_pool(self.pool, None) };
    }
}

struct ActivePass {
    subpass: usize,
    subpass_count: usize,
}

pub struct VulkanCommandBuffer<'p> {
    shared: &'p VulkanShared,
    pool: vk::CommandPool,
    resettable: bool,
    command_buffer: vk::CommandBuffer,
    primary: bool,
    lifecycle: Lifecycle,
    bind_point: vk::PipelineBindPoint,
    pipeline_bound: bool,
    index_bound: bool,
    pass: Option<ActivePass>,
}

impl<'p> VulkanCommandBuffer<'p> {
    fn new(pool: &'p VulkanCommandPool, primary: bool) -> Result<Self> {
        let level = if primary {
            vk::CommandBufferLevel::PRIMARY
        } else {
            vk::CommandBufferLevel::SECONDARY
        };
        let allocate_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(pool.pool)
            .level(level)
            .command_buffer_count(1);
        let command_buffers = unsafe { pool.shared.device.allocate_command_buffers(&allocate_info) }
            .context("Failed to allocate command buffer")?;

        Ok(Self {
            shared: &pool.shared,
            pool: pool.pool,
            resettable: pool.flags.contains(CommandPoolCreateFlags::RESET_COMMAND_BUFFER),
            command_buffer: command_buffers[0],
            primary,
            lifecycle: Lifecycle::default(),
            bind_point: vk::PipelineBindPoint::GRAPHICS,
            pipeline_bound: false,
            index_bound: false,
            pass: None,
        })
    }

    fn clear_recording(&mut self) {
        self.bind_point = vk::PipelineBindPoint::GRAPHICS;
        self.pipeline_bound = false;
        self.index_bound = false;
        self.pass = None;
    }

    /// Runs a recording step, keeping its error for `end()`.
    fn record(&mut self, command: &str, step: impl FnOnce(&mut Self) -> Result<()>) {
        if !self.lifecycle.check_recording(command) {
            return;
        }
        if let Err(e) = step(self) {
            self.lifecycle.record_error(e);
        }
    }

    fn device(&self) -> &'p ash::Device {
        &self.shared.device
    }

    fn check_draw(&self) -> Result<()> {
        if !self.pipeline_bound {
            return Err(Error::precondition("Draw recorded without a bound pipeline"));
        }
        Ok(())
    }

    fn check_outside_pass(&self, command: &str) -> Result<()> {
        if self.pass.is_some() {
            return Err(Error::precondition(format!(
                "{command} cannot be recorded inside a render pass"
            )));
        }
        Ok(())
    }

    fn query(pool: &dyn QueryPool, query: u32) -> Result<vk::QueryPool> {
        query::check_range(pool.count(), query, 1)?;
        convert::handle(pool.native(), "query pool")
    }
}

impl CommandBuffer for VulkanCommandBuffer<'_> {
    fn is_primary(&self) -> bool {
        self.primary
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.command_buffer)
    }

    fn begin(&mut self, usage: CommandBufferUsageFlags) -> Result<()> {
        if !self.resettable && self.lifecycle.state() != CommandBufferState::Initial {
            return Err(Error::precondition(
                "Command buffers of this pool cannot be re-recorded individually",
            ));
        }
        self.lifecycle.begin(usage)?;
        self.clear_recording();

        let inheritance = vk::CommandBufferInheritanceInfo::default();
        let mut begin_info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::from_raw(usage.bits()));
        if !self.primary {
            begin_info = begin_info.inheritance_info(&inheritance);
        }
        if let Err(e) = unsafe { self.device().begin_command_buffer(self.command_buffer, &begin_info) } {
            self.lifecycle.reset();
            return Err(anyhow::Error::new(e)
                .context("Failed to begin command buffer")
                .into());
        }
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if self.pass.is_some() && self.lifecycle.check_recording("end") {
            self.lifecycle
                .record_error(Error::precondition("Recording ended inside a render pass"));
            unsafe { self.device().cmd_end_render_pass(self.command_buffer) };
            self.pass = None;
        }
        if self.lifecycle.state() == CommandBufferState::Recording {
            if let Err(e) = unsafe { self.device().end_command_buffer(self.command_buffer) } {
                self.lifecycle.record_error(
                    anyhow::Error::new(e)
                        .context("Failed to end command buffer")
                        .into(),
                );
            }
        }
        self.lifecycle.end()
    }

    fn reset(&mut self) -> Result<()> {
        if !self.resettable {
            return Err(Error::precondition(
                "Command buffers of this pool cannot be reset individually",
            ));
        }
        unsafe {
            self.device()
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
        }
        .context("Failed to reset command buffer")?;
        self.lifecycle.reset();
        self.clear_recording();
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        render_pass: &dyn RenderPass,
        frame_buffer: &dyn FrameBuffer,
        area: Scissor,
        clear_values: &[ClearValue],
        contents: SubpassContents,
    ) {
        self.record("begin_render_pass", |cb| {
            let pass = convert::handle(render_pass.native(), "render pass")?;
            let framebuffer = convert::handle(frame_buffer.native(), "frame buffer")?;
            if cb.pass.is_some() {
                return Err(Error::precondition("Render pass begun inside a render pass"));
            }
            let description = render_pass.description();
            let values = self::clear_values(description, clear_values)?;
            let begin_info = vk::RenderPassBeginInfo::builder()
                .render_pass(pass)
                .framebuffer(framebuffer)
                .render_area(state::scissor(&area))
                .clear_values(&values);
            unsafe {
                cb.device().cmd_begin_render_pass(
                    cb.command_buffer,
                    &begin_info,
                    convert::subpass_contents(contents),
                )
            };
            cb.pass = Some(ActivePass {
                subpass: 0,
                subpass_count: description.subpasses().len(),
            });
            Ok(())
        });
    }

    fn next_subpass(&mut self, contents: SubpassContents) {
        self.record("next_subpass", |cb| {
            let pass = cb
                .pass
                .as_mut()
                .ok_or_else(|| Error::precondition("next_subpass outside a render pass"))?;
            if pass.subpass + 1 >= pass.subpass_count {
                return Err(Error::precondition(format!(
                    "Render pass has only {} subpasses",
                    pass.subpass_count
                )));
            }
            pass.subpass += 1;
            unsafe {
                cb.device()
                    .cmd_next_subpass(cb.command_buffer, convert::subpass_contents(contents))
            };
            Ok(())
        });
    }

    fn end_render_pass(&mut self) {
        self.record("end_render_pass", |cb| {
            if cb.pass.take().is_none() {
                return Err(Error::precondition("end_render_pass outside a render pass"));
            }
            unsafe { cb.device().cmd_end_render_pass(cb.command_buffer) };
            Ok(())
        });
    }

    fn bind_pipeline(&mut self, pipeline: &dyn Pipeline) {
        self.record("bind_pipeline", |cb| {
            let handle = convert::handle(pipeline.native(), "pipeline")?;
            let bind_point = convert::bind_point(pipeline.bind_point());
            unsafe {
                cb.device()
                    .cmd_bind_pipeline(cb.command_buffer, bind_point, handle)
            };
            cb.bind_point = bind_point;
            cb.pipeline_bound = true;
            Ok(())
        });
    }

    fn bind_descriptor_set(
        &mut self,
        layout: &dyn PipelineLayout,
        set: &dyn DescriptorSet,
        dynamic_offsets: &[u32],
    ) {
        self.record("bind_descriptor_set", |cb| {
            let layout_handle = convert::handle(layout.native(), "pipeline layout")?;
            let set_handle = convert::handle(set.native(), "descriptor set")?;
            let description = layout.description();
            let set_index = set.binding_point();
            if set_index >= description.set_count() {
                return Err(Error::precondition(format!(
                    "Set {set_index} is outside a pipeline layout of {} sets",
                    description.set_count()
                )));
            }
            let expected = dynamic_offset_count(set.layout_bindings());
            if expected as usize != dynamic_offsets.len() {
                return Err(Error::precondition(format!(
                    "Set {set_index} has {expected} dynamic buffers, {} offsets were given",
                    dynamic_offsets.len()
                )));
            }
            unsafe {
                cb.device().cmd_bind_descriptor_sets(
                    cb.command_buffer,
                    cb.bind_point,
                    layout_handle,
                    set_index,
                    &[set_handle],
                    dynamic_offsets,
                )
            };
            Ok(())
        });
    }

    fn bind_vertex_buffers(&mut self, first_binding: u32, buffers: &[&dyn Buffer], offsets: &[u64]) {
        self.record("bind_vertex_buffers", |cb| {
            if buffers.len() != offsets.len() {
                return Err(Error::precondition(format!(
                    "{} vertex buffers with {} offsets",
                    buffers.len(),
                    offsets.len()
                )));
            }
            let handles = buffers
                .iter()
                .map(|buffer| convert::handle::<vk::Buffer>(buffer.native(), "buffer"))
                .collect::<Result<Vec<_>>>()?;
            unsafe {
                cb.device()
                    .cmd_bind_vertex_buffers(cb.command_buffer, first_binding, &handles, offsets)
            };
            Ok(())
        });
    }

    fn bind_index_buffer(&mut self, buffer: &dyn Buffer, offset: u64, index_type: IndexType) {
        self.record("bind_index_buffer", |cb| {
            let handle = convert::handle(buffer.native(), "buffer")?;
            unsafe {
                cb.device().cmd_bind_index_buffer(
                    cb.command_buffer,
                    handle,
                    offset,
                    convert::index_type(index_type),
                )
            };
            cb.index_bound = true;
            Ok(())
        });
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.record("set_viewport", |cb| {
            unsafe {
                cb.device()
                    .cmd_set_viewport(cb.command_buffer, 0, &[state::viewport(&viewport)])
            };
            Ok(())
        });
    }

    fn set_scissor(&mut self, scissor: Scissor) {
        self.record("set_scissor", |cb| {
            unsafe {
                cb.device()
                    .cmd_set_scissor(cb.command_buffer, 0, &[state::scissor(&scissor)])
            };
            Ok(())
        });
    }

    fn push_constants(
        &mut self,
        layout: &dyn PipelineLayout,
        stages: ShaderStageFlags,
        offset: u32,
        data: &[u8],
    ) {
        self.record("push_constants", |cb| {
            let handle = convert::handle(layout.native(), "pipeline layout")?;
            layout
                .description()
                .check_push_constants(stages, offset, data.len() as u32)?;
            unsafe {
                cb.device().cmd_push_constants(
                    cb.command_buffer,
                    handle,
                    convert::shader_stages(stages),
                    offset,
                    data,
                )
            };
            Ok(())
        });
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) {
        self.record("draw", |cb| {
            cb.check_draw()?;
            unsafe {
                cb.device().cmd_draw(
                    cb.command_buffer,
                    vertex_count,
                    instance_count,
                    first_vertex,
                    first_instance,
                )
            };
            Ok(())
        });
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) {
        self.record("draw_indexed", |cb| {
            cb.check_draw()?;
            if !cb.index_bound {
                return Err(Error::precondition("Indexed draw without an index buffer"));
            }
            unsafe {
                cb.device().cmd_draw_indexed(
                    cb.command_buffer,
                    index_count,
                    instance_count,
                    first_index,
                    vertex_offset,
                    first_instance,
                )
            };
            Ok(())
        });
    }

    fn reset_query_pool(&mut self, pool: &dyn QueryPool, first_query: u32, query_count: u32) {
        self.record("reset_query_pool", |cb| {
            let handle = convert::handle(pool.native(), "query pool")?;
            query::check_range(pool.count(), first_query, query_count)?;
            if cb.pass.is_some() {
                return Err(Error::precondition("Query pools are reset outside render passes"));
            }
            unsafe {
                cb.device()
                    .cmd_reset_query_pool(cb.command_buffer, handle, first_query, query_count)
            };
            Ok(())
        });
    }

    fn begin_query(&mut self, pool: &dyn QueryPool, query: u32, flags: QueryControlFlags) {
        self.record("begin_query", |cb| {
            let handle = Self::query(pool, query)?;
            unsafe {
                cb.device().cmd_begin_query(
                    cb.command_buffer,
                    handle,
                    query,
                    vk::QueryControlFlags::from_raw(flags.bits()),
                )
            };
            Ok(())
        });
    }

    fn end_query(&mut self, pool: &dyn QueryPool, query: u32) {
        self.record("end_query", |cb| {
            let handle = Self::query(pool, query)?;
            unsafe { cb.device().cmd_end_query(cb.command_buffer, handle, query) };
            Ok(())
        });
    }

    fn write_timestamp(&mut self, stage: PipelineStageFlags, pool: &dyn QueryPool, query: u32) {
        self.record("write_timestamp", |cb| {
            let handle = Self::query(pool, query)?;
            if pool.query_type() != QueryType::Timestamp {
                return Err(Error::precondition("Timestamps need a timestamp query pool"));
            }
            unsafe {
                cb.device().cmd_write_timestamp(
                    cb.command_buffer,
                    convert::stage_flags(stage),
                    handle,
                    query,
                )
            };
            Ok(())
        });
    }

    fn copy_buffer(&mut self, src: &dyn Buffer, dst: &dyn Buffer, regions: &[BufferCopy]) {
        self.record("copy_buffer", |cb| {
            let src_buffer = convert::handle(src.native(), "buffer")?;
            let dst_buffer = convert::handle(dst.native(), "buffer")?;
            cb.check_outside_pass("copy_buffer")?;
            transfer::check_buffer_copy(src, dst, regions)?;
            let regions = vk_transfer::buffer_copies(regions);
            unsafe {
                cb.device()
                    .cmd_copy_buffer(cb.command_buffer, src_buffer, dst_buffer, &regions)
            };
            Ok(())
        });
    }

    fn copy_buffer_to_image(
        &mut self,
        src: &dyn Buffer,
        dst: &dyn Texture,
        dst_layout: ImageLayout,
        regions: &[BufferImageCopy],
    ) {
        self.record("copy_buffer_to_image", |cb| {
            let buffer = convert::handle(src.native(), "buffer")?;
            let image = vk_transfer::image(dst)?;
            cb.check_outside_pass("copy_buffer_to_image")?;
            transfer::check_buffer_image_copy(src, transfer::texture_info(dst)?, dst_layout, regions)?;
            let regions = vk_transfer::buffer_image_copies(regions);
            unsafe {
                cb.device().cmd_copy_buffer_to_image(
                    cb.command_buffer,
                    buffer,
                    image,
                    convert::image_layout(dst_layout),
                    &regions,
                )
            };
            Ok(())
        });
    }

    fn blit_image(
        &mut self,
        src: &dyn Texture,
        src_layout: ImageLayout,
        dst: &dyn Texture,
        dst_layout: ImageLayout,
        regions: &[ImageBlit],
        filter: Filter,
    ) {
        self.record("blit_image", |cb| {
            let src_image = vk_transfer::image(src)?;
            let dst_image = vk_transfer::image(dst)?;
            cb.check_outside_pass("blit_image")?;
            transfer::check_blit(
                transfer::texture_info(src)?,
                src_layout,
                transfer::texture_info(dst)?,
                dst_layout,
                regions,
                filter,
            )?;
            let regions = vk_transfer::image_blits(regions);
            unsafe {
                cb.device().cmd_blit_image(
                    cb.command_buffer,
                    src_image,
                    convert::image_layout(src_layout),
                    dst_image,
                    convert::image_layout(dst_layout),
                    &regions,
                    convert::filter(filter),
                )
            };
            Ok(())
        });
    }

    fn pipeline_barrier(
        &mut self,
        src_stages: PipelineStageFlags,
        dst_stages: PipelineStageFlags,
        memory: &[MemoryBarrier],
        buffers: &[BufferMemoryBarrier<'_>],
        images: &[ImageMemoryBarrier<'_>],
    ) {
        self.record("pipeline_barrier", |cb| {
            transfer::check_barrier_stages(src_stages, dst_stages)?;
            cb.check_outside_pass("pipeline_barrier")?;
            let buffer_barriers = vk_transfer::buffer_barriers(buffers)?;
            let image_barriers = vk_transfer::image_barriers(images)?;
            for barrier in buffers {
                transfer::check_buffer_barrier(barrier)?;
            }
            for barrier in images {
                transfer::check_image_barrier(barrier)?;
            }
            unsafe {
                cb.device().cmd_pipeline_barrier(
                    cb.command_buffer,
                    convert::stage_flags(src_stages),
                    convert::stage_flags(dst_stages),
                    vk::DependencyFlags::empty(),
                    &vk_transfer::memory_barriers(memory),
                    &buffer_barriers,
                    &image_barriers,
                )
            };
            Ok(())
        });
    }
}

impl Drop for VulkanCommandBuffer<'_> {
    fn drop(&mut self) {
        unsafe {
            self.shared
                .device
                .free_command_buffers(self.pool, &[self.command_buffer])
        };
    }
}

/// Queue 0 of one family.
pub struct VulkanQueue {
    shared: Rc<VulkanShared>,
    queue: vk::Queue,
    family_index: u32,
}

impl VulkanQueue {
    pub fn new(shared: Rc<VulkanShared>, family_index: u32) -> Self {
        let queue = unsafe { shared.device.get_device_queue(family_index, 0) };
        Self {
            shared,
            queue,
            family_index,
        }
    }
}

impl Queue for VulkanQueue {
    fn family_index(&self) -> u32 {
        self.family_index
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.queue)
    }

    fn execute(
        &self,
        command_buffer: &dyn CommandBuffer,
        wait: &[SemaphoreWait<'_>],
        signal: &[&dyn Semaphore],
        fence: Option<&dyn Fence>,
    ) -> Result<()> {
        let command_buffers = [convert::handle::<vk::CommandBuffer>(
            command_buffer.native(),
            "command buffer",
        )?];
        let wait_semaphores = wait
            .iter()
            .map(|(semaphore, _)| convert::handle::<vk::Semaphore>(semaphore.native(), "semaphore"))
            .collect::<Result<Vec<_>>>()?;
        let wait_stages: Vec<_> = wait
            .iter()
            .map(|&(_, stages)| convert::stage_flags(stages))
            .collect();
        let signal_semaphores = signal
            .iter()
            .map(|semaphore| convert::handle::<vk::Semaphore>(semaphore.native(), "semaphore"))
            .collect::<Result<Vec<_>>>()?;
        let fence = match fence {
            Some(fence) => convert::handle(fence.native(), "fence")?,
            None => vk::Fence::null(),
        };

        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);
        unsafe {
            self.shared
                .device
                .queue_submit(self.queue, &[submit_info.build()], fence)
        }
        .context("Failed to submit command buffer")?;
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe { self.shared.device.queue_wait_idle(self.queue) }
            .context("Failed to wait for queue idle")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorSetLayoutBinding;
    use crate::enums::{AttachmentStoreOp, ImageLayout, PipelineBindPoint, PixelFormat};
    use crate::render_pass::{AttachmentDescription, AttachmentReference, RenderPassState, RenderSubpass};

    fn attachment(format: PixelFormat, load_op: AttachmentLoadOp) -> AttachmentDescription {
        AttachmentDescription::new(
            format,
            load_op,
            AttachmentStoreOp::Store,
            ImageLayout::Undefined,
            ImageLayout::ShaderReadOnlyOptimal,
        )
    }

    fn pass(attachments: Vec<AttachmentDescription>) -> RenderPassDescription {
        let subpass = RenderSubpass::new(PipelineBindPoint::Graphics, RenderPassState::default())
            .with_colours(vec![AttachmentReference::new(0, ImageLayout::ColourAttachmentOptimal)])
            .with_depth_stencil(AttachmentReference::new(1, ImageLayout::DepthStencilAttachmentOptimal));
        RenderPassDescription::new(
            attachments,
            vec![subpass],
            RenderPassState::default(),
            RenderPassState::bottom_of_pipe(),
        )
        .unwrap()
    }

    #[test]
    fn clear_values_follow_the_attachments() {
        let description = pass(vec![
            attachment(PixelFormat::R8G8B8A8, AttachmentLoadOp::Clear),
            attachment(PixelFormat::D32F, AttachmentLoadOp::Clear),
        ]);
        let values = clear_values(
            &description,
            &[
                ClearValue::colour([0.1, 0.2, 0.3, 1.0]),
                ClearValue::depth_stencil(1.0, 0),
            ],
        )
        .unwrap();
        assert_eq!(values.len(), 2);
        unsafe {
            assert_eq!(values[0].color.float32, [0.1, 0.2, 0.3, 1.0]);
            assert_eq!(values[1].depth_stencil.depth, 1.0);
        }
    }

    #[test]
    fn loaded_attachments_need_no_clear_value() {
        let description = pass(vec![
            attachment(PixelFormat::R8G8B8A8, AttachmentLoadOp::Load),
            attachment(PixelFormat::D24S8, AttachmentLoadOp::Clear),
        ]);
        let values = clear_values(&description, &[ClearValue::colour([0.0; 4])]);
        let Err(error) = values else {
            panic!("a cleared attachment without a clear value was accepted");
        };
        assert!(error.is_precondition());
        assert!(error.to_string().contains("Attachment 1"));

        let values = clear_values(
            &description,
            &[ClearValue::colour([0.0; 4]), ClearValue::depth_stencil(0.5, 3)],
        )
        .unwrap();
        unsafe { assert_eq!(values[1].depth_stencil.stencil, 3) };
    }

    #[test]
    fn mismatched_clear_values_are_refused() {
        let description = pass(vec![
            attachment(PixelFormat::R8G8B8A8, AttachmentLoadOp::Clear),
            attachment(PixelFormat::D32F, AttachmentLoadOp::DontCare),
        ]);
        let result = clear_values(&description, &[ClearValue::depth_stencil(1.0, 0)]);
        assert!(matches!(result, Err(ref e) if e.is_precondition()));
    }

    #[test]
    fn dynamic_offsets_count_array_elements() {
        let bindings = LayoutBindings::new(vec![
            DescriptorSetLayoutBinding::new(0, DescriptorType::UniformBuffer, ShaderStageFlags::VERTEX),
            DescriptorSetLayoutBinding::new(1, DescriptorType::UniformBufferDynamic, ShaderStageFlags::VERTEX)
                .with_count(3),
            DescriptorSetLayoutBinding::new(2, DescriptorType::StorageBufferDynamic, ShaderStageFlags::FRAGMENT),
        ])
        .unwrap();
        assert_eq!(dynamic_offset_count(&bindings), 4);
        assert_eq!(dynamic_offset_count(&LayoutBindings::default()), 0);
    }
}
