// Command recording and replay
//
// A GL command buffer is a list of `GlCall`s. `end()` publishes the list in the device registry
// under the buffer's id; queues replay it from there. Anything that depends on state known only
// at draw time (vertex buffer strides, index buffer offsets) is resolved when the draw is
// recorded.

use std::collections::BTreeMap;
use std::rc::Rc;

use super::call::GlCall;
use super::consts as gl;
use super::convert;
use super::descriptor::set_base;
use super::render_pass::{attachment_point, colour_slot};
use super::shared::GlShared;
use super::state;
use super::transfer as gl_transfer;
use crate::command::{
    ClearValue, CommandBuffer, CommandPool, Lifecycle, Queue, SemaphoreWait,
};
use crate::core::NativeHandle;
use crate::descriptor::{DescriptorResource, DescriptorSet};
use crate::enums::{
    AttachmentLoadOp, AttachmentStoreOp, Filter, ImageLayout, IndexType, SubpassContents,
    TextureType,
};
use crate::error::{Error, Result};
use crate::flags::{
    AccessFlags, CommandBufferUsageFlags, CommandPoolCreateFlags, PipelineStageFlags, QueryControlFlags,
    ShaderStageFlags,
};
use crate::pipeline::{Pipeline, PipelineLayout, PipelineStates, Scissor, Viewport};
use crate::query::{self, QueryPool};
use crate::render_pass::{FrameBuffer, RenderPass, RenderPassDescription};
use crate::resource::{Buffer, Texture};
use crate::sync::{Fence, Semaphore};
use crate::transfer::{
    self, BufferCopy, BufferImageCopy, BufferMemoryBarrier, ImageBlit, ImageMemoryBarrier,
    MemoryBarrier,
};

/// GL guarantees at least 16 vertex attributes.
const ATTRIBUTE_MASK: u32 = 0xFFFF;

pub struct GlCommandPool {
    shared: Rc<GlShared>,
    family_index: u32,
    flags: CommandPoolCreateFlags,
    id: u32,
}

impl GlCommandPool {
    pub fn new(shared: Rc<GlShared>, family_index: u32, flags: CommandPoolCreateFlags) -> Self {
        let id = shared.next_id();
        Self {
            shared,
            family_index,
            flags,
            id,
        }
    }
}

impl CommandPool for GlCommandPool {
    fn queue_family_index(&self) -> u32 {
        self.family_index
    }

    fn flags(&self) -> CommandPoolCreateFlags {
        self.flags
    }

    fn create_command_buffer(&self, primary: bool) -> Result<Box<dyn CommandBuffer + '_>> {
        Ok(Box::new(GlCommandBuffer::new(&self.shared, primary)))
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.id)
    }
}

struct ActivePass {
    description: RenderPassDescription,
    framebuffer: u32,
    dimensions: glam::UVec2,
    subpass: usize,
}

struct IndexBinding {
    offset: u64,
    index_type: IndexType,
}

pub struct GlCommandBuffer<'p> {
    shared: &'p GlShared,
    primary: bool,
    id: u32,
    lifecycle: Lifecycle,
    calls: Vec<GlCall>,
    pipeline: Option<PipelineStates>,
    attributes: u32,
    vertex_buffers: BTreeMap<u32, (u32, u64)>,
    vertex_buffers_dirty: bool,
    index_buffer: Option<IndexBinding>,
    scissor: Option<Scissor>,
    pass: Option<ActivePass>,
}

impl<'p> GlCommandBuffer<'p> {
    fn new(shared: &'p GlShared, primary: bool) -> Self {
        Self {
            id: shared.next_id(),
            shared,
            primary,
            lifecycle: Lifecycle::default(),
            calls: Vec::new(),
            pipeline: None,
            attributes: ATTRIBUTE_MASK,
            vertex_buffers: BTreeMap::new(),
            vertex_buffers_dirty: false,
            index_buffer: None,
            scissor: None,
            pass: None,
        }
    }

    /// The calls recorded so far.
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    fn clear_recording(&mut self) {
        self.calls.clear();
        self.pipeline = None;
        self.attributes = ATTRIBUTE_MASK;
        self.vertex_buffers.clear();
        self.vertex_buffers_dirty = false;
        self.index_buffer = None;
        self.scissor = None;
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

    fn check_outside_pass(&self, command: &str) -> Result<()> {
        if self.pass.is_some() {
            return Err(Error::precondition(format!(
                "{command} cannot be recorded inside a render pass"
            )));
        }
        Ok(())
    }

    fn features(&self) -> crate::core::PhysicalDeviceFeatures {
        self.shared.physical_device().features
    }

    fn apply_pipeline(&mut self) {
        if let Some(states) = &self.pipeline {
            state::apply_pipeline_states(states, &self.shared.physical_device().features, &mut self.calls);
        }
        if let Some(scissor) = self.scissor {
            state::apply_scissor(&scissor, &mut self.calls);
        }
    }

    fn set_draw_buffers(&mut self) {
        let Some(pass) = &self.pass else {
            return;
        };
        let buffers = if pass.framebuffer == 0 {
            vec![gl::BACK]
        } else {
            let subpass = &pass.description.subpasses()[pass.subpass];
            let buffers: Vec<u32> = subpass
                .colour_attachments
                .iter()
                .map(|r| gl::COLOR_ATTACHMENT0 + colour_slot(&pass.description, r.attachment))
                .collect();
            if buffers.is_empty() {
                vec![gl::NONE]
            } else {
                buffers
            }
        };
        self.calls.push(GlCall::NamedFramebufferDrawBuffers {
            framebuffer: pass.framebuffer,
            buffers,
        });
    }

    fn resolve_subpass(&mut self) -> Result<()> {
        let Some(pass) = &self.pass else {
            return Ok(());
        };
        let subpass = &pass.description.subpasses()[pass.subpass];
        if subpass.resolve_attachments.is_empty() {
            return Ok(());
        }
        if pass.framebuffer == 0 {
            return Err(Error::precondition("The default framebuffer cannot be resolved"));
        }

        let area = [0, 0, pass.dimensions.x as i32, pass.dimensions.y as i32];
        let mut calls = Vec::new();
        for (colour, resolve) in subpass
            .colour_attachments
            .iter()
            .zip(&subpass.resolve_attachments)
        {
            let target = self
                .shared
                .resolve_target(pass.framebuffer, resolve.attachment)
                .ok_or_else(|| {
                    Error::precondition(format!(
                        "Frame buffer has no resolve target for attachment {}",
                        resolve.attachment
                    ))
                })?;
            calls.push(GlCall::NamedFramebufferReadBuffer {
                framebuffer: pass.framebuffer,
                buffer: gl::COLOR_ATTACHMENT0 + colour_slot(&pass.description, colour.attachment),
            });
            calls.push(GlCall::BlitNamedFramebuffer {
                read: pass.framebuffer,
                draw: target,
                src: area,
                dst: area,
                mask: gl::COLOR_BUFFER_BIT,
                filter: gl::NEAREST,
            });
        }
        self.calls.extend(calls);
        Ok(())
    }

    fn clear_attachments(&mut self, clear_values: &[ClearValue]) -> Result<()> {
        let Some(pass) = &self.pass else {
            return Ok(());
        };
        let framebuffer = pass.framebuffer;
        let attachments = pass.description.attachments();

        let colour_count = attachments
            .iter()
            .filter(|a| !a.format.is_depth_or_stencil_format())
            .count() as u32;
        let mut calls = Vec::new();
        calls.push(GlCall::NamedFramebufferDrawBuffers {
            framebuffer,
            buffers: if framebuffer == 0 {
                vec![gl::BACK]
            } else {
                (0..colour_count).map(|i| gl::COLOR_ATTACHMENT0 + i).collect()
            },
        });
        for buffer in 0..colour_count.max(1) {
            calls.push(GlCall::ColorMaski {
                buffer,
                mask: [true; 4],
            });
        }
        calls.push(GlCall::DepthMask(true));
        calls.push(GlCall::StencilMaskSeparate {
            face: gl::FRONT_AND_BACK,
            mask: u32::MAX,
        });

        for (index, attachment) in (0u32..).zip(attachments) {
            let format = attachment.format;
            let has_depth = format.is_depth_format() || format.is_depth_stencil_format();
            let has_stencil = format.is_stencil_format() || format.is_depth_stencil_format();
            let clears_depth = has_depth && attachment.load_op == AttachmentLoadOp::Clear;
            let clears_stencil = has_stencil && attachment.stencil_load_op == AttachmentLoadOp::Clear;
            let clears_colour =
                !format.is_depth_or_stencil_format() && attachment.load_op == AttachmentLoadOp::Clear;
            if !(clears_depth || clears_stencil || clears_colour) {
                continue;
            }

            let value = clear_values.get(index as usize).ok_or_else(|| {
                Error::precondition(format!("Attachment {index} is cleared but has no clear value"))
            })?;
            match (*value, clears_colour) {
                (ClearValue::Colour(colour), true) => calls.push(GlCall::ClearNamedFramebufferfv {
                    framebuffer,
                    buffer: gl::COLOR,
                    draw_buffer: colour_slot(&pass.description, index) as i32,
                    value: colour,
                }),
                (ClearValue::DepthStencil { depth, stencil }, false) => {
                    calls.push(match (clears_depth, clears_stencil) {
                        (true, true) => GlCall::ClearNamedFramebufferfi {
                            framebuffer,
                            buffer: gl::DEPTH_STENCIL,
                            draw_buffer: 0,
                            depth,
                            stencil: stencil as i32,
                        },
                        (true, false) => GlCall::ClearNamedFramebufferfv {
                            framebuffer,
                            buffer: gl::DEPTH,
                            draw_buffer: 0,
                            value: [depth, 0.0, 0.0, 0.0],
                        },
                        _ => GlCall::ClearNamedFramebufferiv {
                            framebuffer,
                            buffer: gl::STENCIL,
                            draw_buffer: 0,
                            value: [stencil as i32, 0, 0, 0],
                        },
                    })
                }
                (value, _) => {
                    return Err(Error::precondition(format!(
                        "Clear value {value:?} does not fit attachment {index} ({format:?})"
                    )))
                }
            }
        }
        self.calls.extend(calls);
        Ok(())
    }

    fn flush_vertex_buffers(&mut self) -> Result<()> {
        if !self.vertex_buffers_dirty {
            return Ok(());
        }
        let Some(states) = &self.pipeline else {
            return Ok(());
        };
        let vao = self.shared.vao();
        for (&binding, &(buffer, offset)) in &self.vertex_buffers {
            let Some(description) = states.vertex_input.binding(binding) else {
                continue;
            };
            self.calls.push(GlCall::VertexArrayVertexBuffer {
                vao,
                binding,
                buffer,
                offset,
                stride: description.stride,
            });
        }
        self.vertex_buffers_dirty = false;
        Ok(())
    }

    fn draw_mode(&self) -> Result<u32> {
        self.pipeline
            .as_ref()
            .map(|states| convert::primitive_mode(states.input_assembly.topology))
            .ok_or_else(|| Error::precondition("Draw recorded without a bound pipeline"))
    }

    fn bind_set(
        &mut self,
        layout: &dyn PipelineLayout,
        set: &dyn DescriptorSet,
        dynamic_offsets: &[u32],
    ) -> Result<()> {
        layout.native().gl("pipeline layout")?;
        set.native().gl("descriptor set")?;
        let description = layout.description();
        let set_index = set.binding_point();
        if set_index >= description.set_count() {
            return Err(Error::precondition(format!(
                "Set {set_index} is outside a pipeline layout of {} sets",
                description.set_count()
            )));
        }

        let dynamic = set.writes().dynamic_writes();
        if dynamic.len() != dynamic_offsets.len() {
            return Err(Error::precondition(format!(
                "Set {set_index} has {} dynamic buffers, {} offsets were given",
                dynamic.len(),
                dynamic_offsets.len()
            )));
        }
        let dynamic_offset = |binding: u32, element: u32| {
            dynamic
                .iter()
                .position(|w| w.binding == binding && w.array_element == element)
                .map_or(0, |i| u64::from(dynamic_offsets[i]))
        };

        let base = set_base(description, set_index);
        let reserved = self.shared.push_constant_binding();
        let mut calls = Vec::new();
        for write in set.published() {
            let unit = base + write.binding + write.array_element;
            match write.resource {
                DescriptorResource::CombinedTextureSampler { view, sampler, .. } => {
                    calls.push(GlCall::BindTextureUnit {
                        unit,
                        texture: view.gl("texture view")?,
                    });
                    calls.push(GlCall::BindSampler {
                        unit,
                        sampler: sampler.gl("sampler")?,
                    });
                }
                DescriptorResource::Sampler { sampler } => calls.push(GlCall::BindSampler {
                    unit,
                    sampler: sampler.gl("sampler")?,
                }),
                DescriptorResource::SampledTexture { view, .. } => {
                    calls.push(GlCall::BindTextureUnit {
                        unit,
                        texture: view.gl("texture view")?,
                    })
                }
                DescriptorResource::StorageTexture {
                    view,
                    view_type,
                    format,
                    ..
                } => calls.push(GlCall::BindImageTexture {
                    unit,
                    texture: view.gl("texture view")?,
                    level: 0,
                    layered: view_type.is_array()
                        || matches!(view_type, TextureType::Cube | TextureType::E3D),
                    layer: 0,
                    access: gl::READ_WRITE,
                    format: convert::internal_format(format)?,
                }),
                DescriptorResource::UniformBuffer {
                    buffer,
                    offset,
                    range,
                    ..
                } => {
                    if unit == reserved {
                        return Err(Error::precondition(format!(
                            "Uniform unit {unit} is reserved for push constants"
                        )));
                    }
                    calls.push(GlCall::BindBufferRange {
                        target: gl::UNIFORM_BUFFER,
                        index: unit,
                        buffer: buffer.gl("buffer")?,
                        offset: offset + dynamic_offset(write.binding, write.array_element),
                        size: range,
                    });
                }
                DescriptorResource::StorageBuffer {
                    buffer,
                    offset,
                    range,
                    ..
                } => calls.push(GlCall::BindBufferRange {
                    target: gl::SHADER_STORAGE_BUFFER,
                    index: unit,
                    buffer: buffer.gl("buffer")?,
                    offset: offset + dynamic_offset(write.binding, write.array_element),
                    size: range,
                }),
                DescriptorResource::TexelBuffer {
                    view,
                    format,
                    storage,
                } => calls.push(if storage {
                    GlCall::BindImageTexture {
                        unit,
                        texture: view.gl("buffer view")?,
                        level: 0,
                        layered: false,
                        layer: 0,
                        access: gl::READ_WRITE,
                        format: convert::internal_format(format)?,
                    }
                } else {
                    GlCall::BindTextureUnit {
                        unit,
                        texture: view.gl("buffer view")?,
                    }
                }),
            }
        }
        self.calls.extend(calls);
        Ok(())
    }

    fn query(pool: &dyn QueryPool, query: u32) -> Result<(u32, u32)> {
        query::check_range(pool.count(), query, 1)?;
        let name = pool
            .query_handle(query)
            .ok_or_else(|| Error::precondition(format!("Query {query} has no handle")))?
            .gl("query pool")?;
        Ok((convert::query_target(pool.query_type())?, name))
    }
}

impl CommandBuffer for GlCommandBuffer<'_> {
    fn is_primary(&self) -> bool {
        self.primary
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.id)
    }

    fn begin(&mut self, usage: CommandBufferUsageFlags) -> Result<()> {
        self.lifecycle.begin(usage)?;
        self.shared.drop_command_list(self.id);
        self.clear_recording();
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if self.pass.is_some() && self.lifecycle.check_recording("end") {
            self.lifecycle
                .record_error(Error::precondition("Recording ended inside a render pass"));
        }
        match self.lifecycle.end() {
            Ok(()) => {
                log::debug!("Command buffer {}: {} calls", self.id, self.calls.len());
                self.shared
                    .store_command_list(self.id, std::mem::take(&mut self.calls));
                Ok(())
            }
            Err(e) => {
                self.calls.clear();
                Err(e)
            }
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.lifecycle.reset();
        self.shared.drop_command_list(self.id);
        self.clear_recording();
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        render_pass: &dyn RenderPass,
        frame_buffer: &dyn FrameBuffer,
        area: Scissor,
        clear_values: &[ClearValue],
        _contents: SubpassContents,
    ) {
        self.record("begin_render_pass", |cb| {
            render_pass.native().gl("render pass")?;
            let framebuffer = frame_buffer.native().gl("frame buffer")?;
            if cb.pass.is_some() {
                return Err(Error::precondition("Render pass begun inside a render pass"));
            }
            cb.pass = Some(ActivePass {
                description: render_pass.description().clone(),
                framebuffer,
                dimensions: frame_buffer.dimensions(),
                subpass: 0,
            });
            cb.calls.push(GlCall::BindFramebuffer {
                target: gl::DRAW_FRAMEBUFFER,
                framebuffer,
            });
            state::apply_scissor(&area, &mut cb.calls);
            cb.clear_attachments(clear_values)?;
            cb.set_draw_buffers();
            cb.apply_pipeline();
            Ok(())
        });
    }

    fn next_subpass(&mut self, _contents: SubpassContents) {
        self.record("next_subpass", |cb| {
            let count = match &cb.pass {
                Some(pass) => pass.description.subpasses().len(),
                None => return Err(Error::precondition("next_subpass outside a render pass")),
            };
            cb.resolve_subpass()?;
            if let Some(pass) = cb.pass.as_mut() {
                if pass.subpass + 1 >= count {
                    return Err(Error::precondition(format!(
                        "Render pass has only {count} subpasses"
                    )));
                }
                pass.subpass += 1;
            }
            cb.calls.push(GlCall::TextureBarrier);
            cb.set_draw_buffers();
            Ok(())
        });
    }

    fn end_render_pass(&mut self) {
        self.record("end_render_pass", |cb| {
            if cb.pass.is_none() {
                return Err(Error::precondition("end_render_pass outside a render pass"));
            }
            cb.resolve_subpass()?;
            if let Some(pass) = cb.pass.take() {
                if pass.framebuffer != 0 {
                    let discarded: Vec<u32> = (0u32..)
                        .zip(pass.description.attachments())
                        .filter(|(_, a)| a.store_op == AttachmentStoreOp::DontCare)
                        .map(|(i, _)| attachment_point(&pass.description, i))
                        .collect();
                    if !discarded.is_empty() {
                        cb.calls.push(GlCall::InvalidateNamedFramebufferData {
                            framebuffer: pass.framebuffer,
                            attachments: discarded,
                        });
                    }
                }
                cb.calls.push(GlCall::BindFramebuffer {
                    target: gl::DRAW_FRAMEBUFFER,
                    framebuffer: 0,
                });
            }
            Ok(())
        });
    }

    fn bind_pipeline(&mut self, pipeline: &dyn Pipeline) {
        self.record("bind_pipeline", |cb| {
            let name = pipeline.native().gl("pipeline")?;
            cb.calls.push(GlCall::BindProgramPipeline(name));
            let states = pipeline.states();
            state::apply_pipeline_states(states, &cb.features(), &mut cb.calls);
            cb.attributes = state::apply_vertex_input(
                &states.vertex_input,
                cb.shared.vao(),
                cb.attributes,
                &mut cb.calls,
            );
            cb.pipeline = Some(states.clone());
            cb.vertex_buffers_dirty = true;
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
            cb.bind_set(layout, set, dynamic_offsets)
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
            for ((binding, buffer), &offset) in (first_binding..).zip(buffers).zip(offsets) {
                let name = buffer.native().gl("buffer")?;
                cb.vertex_buffers.insert(binding, (name, offset));
            }
            cb.vertex_buffers_dirty = true;
            Ok(())
        });
    }

    fn bind_index_buffer(&mut self, buffer: &dyn Buffer, offset: u64, index_type: IndexType) {
        self.record("bind_index_buffer", |cb| {
            let name = buffer.native().gl("buffer")?;
            cb.calls.push(GlCall::VertexArrayElementBuffer {
                vao: cb.shared.vao(),
                buffer: name,
            });
            cb.index_buffer = Some(IndexBinding { offset, index_type });
            Ok(())
        });
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.record("set_viewport", |cb| {
            state::apply_viewport(&viewport, &mut cb.calls);
            Ok(())
        });
    }

    fn set_scissor(&mut self, scissor: Scissor) {
        self.record("set_scissor", |cb| {
            cb.scissor = Some(scissor);
            state::apply_scissor(&scissor, &mut cb.calls);
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
            layout.native().gl("pipeline layout")?;
            layout
                .description()
                .check_push_constants(stages, offset, data.len() as u32)?;
            cb.calls.push(GlCall::NamedBufferSubData {
                buffer: cb.shared.push_constant_buffer(),
                offset: u64::from(offset),
                data: data.to_vec(),
            });
            Ok(())
        });
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) {
        self.record("draw", |cb| {
            let mode = cb.draw_mode()?;
            cb.flush_vertex_buffers()?;
            cb.calls.push(GlCall::DrawArraysInstancedBaseInstance {
                mode,
                first: first_vertex as i32,
                count: vertex_count as i32,
                instances: instance_count as i32,
                base_instance: first_instance,
            });
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
            let mode = cb.draw_mode()?;
            let index = cb
                .index_buffer
                .as_ref()
                .ok_or_else(|| Error::precondition("Indexed draw without an index buffer"))?;
            let ty = convert::index_type(index.index_type);
            let offset = index.offset
                + u64::from(first_index) * u64::from(index.index_type.size_in_bytes());
            cb.flush_vertex_buffers()?;
            cb.calls.push(GlCall::DrawElementsInstancedBaseVertexBaseInstance {
                mode,
                count: index_count as i32,
                ty,
                offset,
                instances: instance_count as i32,
                base_vertex: vertex_offset,
                base_instance: first_instance,
            });
            Ok(())
        });
    }

    // GL queries need no reset.
    fn reset_query_pool(&mut self, pool: &dyn QueryPool, first_query: u32, query_count: u32) {
        self.record("reset_query_pool", |_| {
            pool.native().gl("query pool")?;
            query::check_range(pool.count(), first_query, query_count)
        });
    }

    fn begin_query(&mut self, pool: &dyn QueryPool, query: u32, _flags: QueryControlFlags) {
        self.record("begin_query", |cb| {
            let (target, name) = Self::query(pool, query)?;
            cb.calls.push(GlCall::BeginQuery { target, query: name });
            Ok(())
        });
    }

    fn end_query(&mut self, pool: &dyn QueryPool, query: u32) {
        self.record("end_query", |cb| {
            let (target, _) = Self::query(pool, query)?;
            cb.calls.push(GlCall::EndQuery(target));
            Ok(())
        });
    }

    // Timestamps are taken once the previous commands complete, whatever the stage.
    fn write_timestamp(&mut self, _stage: PipelineStageFlags, pool: &dyn QueryPool, query: u32) {
        self.record("write_timestamp", |cb| {
            let (target, name) = Self::query(pool, query)?;
            if target != gl::TIMESTAMP {
                return Err(Error::precondition("Timestamps need a timestamp query pool"));
            }
            cb.calls.push(GlCall::QueryCounter {
                query: name,
                target,
            });
            Ok(())
        });
    }

    fn copy_buffer(&mut self, src: &dyn Buffer, dst: &dyn Buffer, regions: &[BufferCopy]) {
        self.record("copy_buffer", |cb| {
            let read = src.native().gl("buffer")?;
            let write = dst.native().gl("buffer")?;
            cb.check_outside_pass("copy_buffer")?;
            transfer::check_buffer_copy(src, dst, regions)?;
            cb.calls.extend(gl_transfer::buffer_copies(read, write, regions));
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
            let buffer = src.native().gl("buffer")?;
            let texture = gl_transfer::texture_name(dst)?;
            cb.check_outside_pass("copy_buffer_to_image")?;
            let info = transfer::texture_info(dst)?;
            transfer::check_buffer_image_copy(src, info, dst_layout, regions)?;
            cb.calls
                .extend(gl_transfer::buffer_image_copies(buffer, texture, info, regions)?);
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
            let src_name = gl_transfer::texture_name(src)?;
            let dst_name = gl_transfer::texture_name(dst)?;
            cb.check_outside_pass("blit_image")?;
            let src_info = transfer::texture_info(src)?;
            let dst_info = transfer::texture_info(dst)?;
            transfer::check_blit(src_info, src_layout, dst_info, dst_layout, regions, filter)?;
            let framebuffers = cb.shared.blit_framebuffers()?;
            cb.calls.extend(gl_transfer::blits(
                framebuffers,
                (src_name, src_info),
                (dst_name, dst_info),
                regions,
                filter,
            )?);
            Ok(())
        });
    }

    // Layout changes have no GL counterpart; only the accesses matter.
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
            let mut src_access = AccessFlags::empty();
            let mut dst_access = AccessFlags::empty();
            for barrier in memory {
                src_access |= barrier.src_access;
                dst_access |= barrier.dst_access;
            }
            for barrier in buffers {
                barrier.buffer.native().gl("buffer")?;
                transfer::check_buffer_barrier(barrier)?;
                src_access |= barrier.src_access;
                dst_access |= barrier.dst_access;
            }
            for barrier in images {
                gl_transfer::texture_name(barrier.texture)?;
                transfer::check_image_barrier(barrier)?;
                src_access |= barrier.src_access;
                dst_access |= barrier.dst_access;
            }
            cb.calls.extend(gl_transfer::barrier(src_access, dst_access));
            Ok(())
        });
    }
}

impl Drop for GlCommandBuffer<'_> {
    fn drop(&mut self) {
        self.shared.drop_command_list(self.id);
    }
}

/// The single GL queue. Submissions replay command lists in order.
pub struct GlQueue {
    shared: Rc<GlShared>,
    family_index: u32,
    id: u32,
}

impl GlQueue {
    pub fn new(shared: Rc<GlShared>, family_index: u32) -> Self {
        let id = shared.next_id();
        Self {
            shared,
            family_index,
            id,
        }
    }
}

impl Queue for GlQueue {
    fn family_index(&self) -> u32 {
        self.family_index
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.id)
    }

    fn execute(
        &self,
        command_buffer: &dyn CommandBuffer,
        wait: &[SemaphoreWait<'_>],
        signal: &[&dyn Semaphore],
        fence: Option<&dyn Fence>,
    ) -> Result<()> {
        let id = command_buffer.native().gl("command buffer")?;
        for (semaphore, _) in wait {
            semaphore.native().gl("semaphore")?;
        }
        for semaphore in signal {
            semaphore.native().gl("semaphore")?;
        }
        let fence = fence.map(|fence| fence.native().gl("fence")).transpose()?;
        let calls = self
            .shared
            .command_list(id)
            .ok_or_else(|| Error::precondition(format!("Command buffer {id} has no recording")))?;

        let _guard = self.shared.guard()?;
        for call in calls.iter() {
            self.shared.replay(call)?;
        }
        if let Some(fence) = fence {
            let sync = self
                .shared
                .call(GlCall::FenceSync)?
                .uint64()
                .ok_or_else(|| Error::Backend(anyhow::anyhow!("glFenceSync returned no sync")))?;
            if let Some(previous) = self.shared.attach_sync(fence, sync)? {
                self.shared.call(GlCall::DeleteSync(previous))?;
            }
        }
        self.shared.call(GlCall::Flush)?;
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        let _guard = self.shared.guard()?;
        self.shared.call(GlCall::Finish)?;
        Ok(())
    }
}
