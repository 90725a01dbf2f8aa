// Command pools, command buffers and queues
//
// Recording calls never fail on the spot. The first error a recording call runs into is kept
// and reported by `end()`, which callers check before submitting.

use std::cell::{Cell, RefCell};

use crate::core::NativeHandle;
use crate::descriptor::DescriptorSet;
use crate::enums::{Filter, ImageLayout, IndexType, SubpassContents};
use crate::error::{Error, Result};
use crate::flags::{
    CommandBufferUsageFlags, CommandPoolCreateFlags, PipelineStageFlags, QueryControlFlags,
    ShaderStageFlags,
};
use crate::pipeline::{Pipeline, PipelineLayout, Scissor, Viewport};
use crate::query::QueryPool;
use crate::render_pass::{FrameBuffer, RenderPass};
use crate::resource::{Buffer, Texture};
use crate::sync::{Fence, Semaphore};
use crate::transfer::{
    BufferCopy, BufferImageCopy, BufferMemoryBarrier, ImageBlit, ImageMemoryBarrier, MemoryBarrier,
};

/// Value an attachment is cleared to when its load op is `Clear`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    Colour([f32; 4]),
    DepthStencil { depth: f32, stencil: u32 },
}

impl ClearValue {
    pub fn colour(colour: [f32; 4]) -> Self {
        Self::Colour(colour)
    }

    pub fn depth_stencil(depth: f32, stencil: u32) -> Self {
        Self::DepthStencil { depth, stencil }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandBufferState {
    Initial,
    Recording,
    Executable,
    /// Consumed by a one-time submission, or failed recording. Needs a reset.
    Invalid,
}

/// Recording state machine shared by both backends' command buffers.
#[derive(Debug)]
pub struct Lifecycle {
    state: Cell<CommandBufferState>,
    usage: Cell<CommandBufferUsageFlags>,
    error: RefCell<Option<Error>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: Cell::new(CommandBufferState::Initial),
            usage: Cell::new(CommandBufferUsageFlags::empty()),
            error: RefCell::new(None),
        }
    }
}

impl Lifecycle {
    pub fn state(&self) -> CommandBufferState {
        self.state.get()
    }

    pub fn usage(&self) -> CommandBufferUsageFlags {
        self.usage.get()
    }

    /// Starts a recording. An executable buffer is implicitly reset.
    pub fn begin(&self, usage: CommandBufferUsageFlags) -> Result<()> {
        if self.state.get() == CommandBufferState::Recording {
            return Err(Error::precondition("Command buffer is already recording"));
        }
        self.state.set(CommandBufferState::Recording);
        self.usage.set(usage);
        self.error.replace(None);
        Ok(())
    }

    /// Tells if a recording call may go ahead. Records a precondition error otherwise.
    pub fn check_recording(&self, command: &str) -> bool {
        if self.state.get() == CommandBufferState::Recording {
            return true;
        }
        self.record_error(Error::precondition(format!(
            "{command} recorded outside begin/end"
        )));
        false
    }

    /// Keeps the first error of the current recording.
    pub fn record_error(&self, error: Error) {
        log::error!("Command recording failed: {}", error);
        let mut slot = self.error.borrow_mut();
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.borrow().is_some()
    }

    /// Closes the recording and surfaces the first deferred error, if any.
    pub fn end(&self) -> Result<()> {
        if self.state.get() != CommandBufferState::Recording {
            return Err(Error::precondition("Command buffer is not recording"));
        }
        match self.error.borrow_mut().take() {
            Some(error) => {
                self.state.set(CommandBufferState::Invalid);
                Err(error)
            }
            None => {
                self.state.set(CommandBufferState::Executable);
                Ok(())
            }
        }
    }

    pub fn reset(&self) {
        self.state.set(CommandBufferState::Initial);
        self.usage.set(CommandBufferUsageFlags::empty());
        self.error.replace(None);
    }

    /// Tells if the buffer may be submitted now. Leaves the state alone.
    pub fn check_submittable(&self) -> Result<()> {
        match self.state.get() {
            CommandBufferState::Executable => Ok(()),
            CommandBufferState::Invalid => Err(Error::precondition(
                "Command buffer was already submitted once and must be reset",
            )),
            state => Err(Error::precondition(format!(
                "Command buffer in state {state:?} cannot be submitted"
            ))),
        }
    }

    /// Records one accepted submission. One-time-submit buffers become invalid.
    pub fn mark_submitted(&self) {
        if self.state.get() == CommandBufferState::Executable
            && self.usage.get().contains(CommandBufferUsageFlags::ONE_TIME_SUBMIT)
        {
            self.state.set(CommandBufferState::Invalid);
        }
    }
}

pub trait CommandPool {
    fn queue_family_index(&self) -> u32;

    fn flags(&self) -> CommandPoolCreateFlags;

    fn create_command_buffer(&self, primary: bool) -> Result<Box<dyn CommandBuffer + '_>>;

    fn native(&self) -> NativeHandle;
}

/// A recorded sequence of GPU commands.
///
/// Objects are referenced by native handle while recording. They must stay alive until every
/// submission of the buffer has completed.
pub trait CommandBuffer {
    fn is_primary(&self) -> bool;

    fn lifecycle(&self) -> &Lifecycle;

    fn native(&self) -> NativeHandle;

    fn begin(&mut self, usage: CommandBufferUsageFlags) -> Result<()>;

    /// Fails with the first error hit while recording.
    fn end(&mut self) -> Result<()>;

    fn reset(&mut self) -> Result<()>;

    /// `clear_values` are matched with the render pass attachments by position.
    fn begin_render_pass(
        &mut self,
        render_pass: &dyn RenderPass,
        frame_buffer: &dyn FrameBuffer,
        area: Scissor,
        clear_values: &[ClearValue],
        contents: SubpassContents,
    );

    fn next_subpass(&mut self, contents: SubpassContents);

    fn end_render_pass(&mut self);

    fn bind_pipeline(&mut self, pipeline: &dyn Pipeline);

    /// Binds `set` at its own binding point. `dynamic_offsets` apply to its dynamic buffers in
    /// binding order.
    fn bind_descriptor_set(
        &mut self,
        layout: &dyn PipelineLayout,
        set: &dyn DescriptorSet,
        dynamic_offsets: &[u32],
    );

    fn bind_vertex_buffers(&mut self, first_binding: u32, buffers: &[&dyn Buffer], offsets: &[u64]);

    fn bind_index_buffer(&mut self, buffer: &dyn Buffer, offset: u64, index_type: IndexType);

    fn set_viewport(&mut self, viewport: Viewport);

    fn set_scissor(&mut self, scissor: Scissor);

    fn push_constants(
        &mut self,
        layout: &dyn PipelineLayout,
        stages: ShaderStageFlags,
        offset: u32,
        data: &[u8],
    );

    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32);

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );

    fn reset_query_pool(&mut self, pool: &dyn QueryPool, first_query: u32, query_count: u32);

    fn begin_query(&mut self, pool: &dyn QueryPool, query: u32, flags: QueryControlFlags);

    fn end_query(&mut self, pool: &dyn QueryPool, query: u32);

    fn write_timestamp(&mut self, stage: PipelineStageFlags, pool: &dyn QueryPool, query: u32);

    /// Transfers run outside render passes.
    fn copy_buffer(&mut self, src: &dyn Buffer, dst: &dyn Buffer, regions: &[BufferCopy]);

    fn copy_buffer_to_image(
        &mut self,
        src: &dyn Buffer,
        dst: &dyn Texture,
        dst_layout: ImageLayout,
        regions: &[BufferImageCopy],
    );

    /// Scaled copy between textures. Depth and stencil regions need `Filter::Nearest`.
    fn blit_image(
        &mut self,
        src: &dyn Texture,
        src_layout: ImageLayout,
        dst: &dyn Texture,
        dst_layout: ImageLayout,
        regions: &[ImageBlit],
        filter: Filter,
    );

    /// Makes the accesses of `src_stages` visible to `dst_stages` and applies layout changes.
    fn pipeline_barrier(
        &mut self,
        src_stages: PipelineStageFlags,
        dst_stages: PipelineStageFlags,
        memory: &[MemoryBarrier],
        buffers: &[BufferMemoryBarrier<'_>],
        images: &[ImageMemoryBarrier<'_>],
    );

    fn memory_barrier(
        &mut self,
        src_stages: PipelineStageFlags,
        dst_stages: PipelineStageFlags,
        barrier: MemoryBarrier,
    ) {
        self.pipeline_barrier(src_stages, dst_stages, &[barrier], &[], &[]);
    }

    fn state(&self) -> CommandBufferState {
        self.lifecycle().state()
    }
}

/// A semaphore waited on before a submission runs, and the stages that wait for it.
pub type SemaphoreWait<'a> = (&'a dyn Semaphore, PipelineStageFlags);

/// An ordered submission point. Work runs in submission order within one queue.
pub trait Queue {
    fn family_index(&self) -> u32;

    fn native(&self) -> NativeHandle;

    /// Backend hook: `command_buffer` is already known to be submittable.
    fn execute(
        &self,
        command_buffer: &dyn CommandBuffer,
        wait: &[SemaphoreWait<'_>],
        signal: &[&dyn Semaphore],
        fence: Option<&dyn Fence>,
    ) -> Result<()>;

    /// Blocks until the queue has no pending work.
    fn wait_idle(&self) -> Result<()>;

    /// Returns as soon as the work is queued. `fence` is signaled once it completes.
    fn submit(
        &self,
        command_buffer: &dyn CommandBuffer,
        wait: &[SemaphoreWait<'_>],
        signal: &[&dyn Semaphore],
        fence: Option<&dyn Fence>,
    ) -> Result<()> {
        if !command_buffer.is_primary() {
            return Err(Error::precondition("Only primary command buffers are submitted"));
        }
        let lifecycle = command_buffer.lifecycle();
        lifecycle.check_submittable()?;
        self.execute(command_buffer, wait, signal, fence)?;
        lifecycle.mark_submitted();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_errors_surface_at_end() {
        let lifecycle = Lifecycle::default();
        lifecycle.begin(CommandBufferUsageFlags::empty()).unwrap();
        lifecycle.record_error(Error::precondition("first"));
        lifecycle.record_error(Error::precondition("second"));
        let error = lifecycle.end().unwrap_err();
        assert_eq!(error.to_string(), "Precondition violated: first");
        assert_eq!(lifecycle.state(), CommandBufferState::Invalid);
    }

    #[test]
    fn recording_calls_need_an_open_recording() {
        let lifecycle = Lifecycle::default();
        assert!(!lifecycle.check_recording("draw"));
        assert!(lifecycle.end().is_err());
        lifecycle.begin(CommandBufferUsageFlags::empty()).unwrap();
        assert!(lifecycle.check_recording("draw"));
        assert!(lifecycle.end().is_ok());
    }

    #[test]
    fn one_time_buffers_submit_once() {
        let lifecycle = Lifecycle::default();
        lifecycle.begin(CommandBufferUsageFlags::ONE_TIME_SUBMIT).unwrap();
        lifecycle.end().unwrap();
        assert!(lifecycle.check_submittable().is_ok());
        lifecycle.mark_submitted();
        assert!(lifecycle.check_submittable().unwrap_err().is_precondition());

        lifecycle.reset();
        lifecycle.begin(CommandBufferUsageFlags::empty()).unwrap();
        lifecycle.end().unwrap();
        lifecycle.mark_submitted();
        lifecycle.mark_submitted();
        assert!(lifecycle.check_submittable().is_ok());
    }

    #[test]
    fn checking_a_submission_keeps_the_state() {
        let lifecycle = Lifecycle::default();
        assert!(lifecycle.check_submittable().is_err());
        lifecycle.begin(CommandBufferUsageFlags::ONE_TIME_SUBMIT).unwrap();
        assert!(lifecycle.check_submittable().is_err());
        lifecycle.end().unwrap();
        assert!(lifecycle.check_submittable().is_ok());
        assert!(lifecycle.check_submittable().is_ok());
        assert_eq!(lifecycle.state(), CommandBufferState::Executable);
    }
}
