// Host-visible buffer for filling device-local buffers and textures
//
// Each copy records into the given command buffer, submits it once and waits for the queue, so
// the data can be overwritten as soon as a copy returns.

use super::{Buffer, Texture};
use crate::command::{CommandBuffer, Queue};
use crate::enums::ImageLayout;
use crate::error::{Error, Result};
use crate::flags::{
    AccessFlags, BufferTargets, CommandBufferUsageFlags, MemoryPropertyFlags, PipelineStageFlags,
};
use crate::transfer::{self, BufferCopy, BufferImageCopy, BufferMemoryBarrier, ImageMemoryBarrier};

pub struct StagingBuffer<'d> {
    buffer: Box<dyn Buffer + 'd>,
}

impl<'d> StagingBuffer<'d> {
    pub fn new(buffer: Box<dyn Buffer + 'd>) -> Result<Self> {
        if !buffer.targets().contains(BufferTargets::TRANSFER_SRC)
            || !buffer.memory_flags().contains(MemoryPropertyFlags::HOST_VISIBLE)
        {
            return Err(Error::precondition(
                "Staging buffers must be host-visible transfer sources",
            ));
        }
        Ok(Self { buffer })
    }

    pub fn buffer(&self) -> &(dyn Buffer + 'd) {
        self.buffer.as_ref()
    }

    pub fn size(&self) -> u64 {
        self.buffer.size()
    }

    fn stage(&self, data: &[u8]) -> Result<()> {
        if data.is_empty() || data.len() as u64 > self.size() {
            return Err(Error::precondition(format!(
                "{} bytes cannot be staged in a {} byte buffer",
                data.len(),
                self.size()
            )));
        }
        self.buffer.upload(0, data)
    }

    fn submit(command_buffer: &mut dyn CommandBuffer, queue: &dyn Queue) -> Result<()> {
        command_buffer.end()?;
        queue.submit(command_buffer, &[], &[], None)?;
        queue.wait_idle()
    }

    /// Copies `data` into `dst` at `offset`. `dst_access` and `dst_stages` name the first use of
    /// the copied range.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_buffer_data(
        &self,
        command_buffer: &mut dyn CommandBuffer,
        queue: &dyn Queue,
        data: &[u8],
        dst: &dyn Buffer,
        offset: u64,
        dst_access: AccessFlags,
        dst_stages: PipelineStageFlags,
    ) -> Result<()> {
        self.stage(data)?;
        let size = data.len() as u64;
        command_buffer.begin(CommandBufferUsageFlags::ONE_TIME_SUBMIT)?;
        command_buffer.copy_buffer(self.buffer(), dst, &[BufferCopy::new(0, offset, size)]);
        command_buffer.pipeline_barrier(
            PipelineStageFlags::TRANSFER,
            dst_stages,
            &[],
            &[BufferMemoryBarrier {
                src_access: AccessFlags::TRANSFER_WRITE,
                dst_access,
                buffer: dst,
                offset,
                size,
            }],
            &[],
        );
        Self::submit(command_buffer, queue)
    }

    /// Replaces mip level 0 of every layer of `texture` with `data`, tightly packed, and leaves
    /// the texture in `final_layout`. Earlier contents are discarded.
    pub fn copy_texture_data(
        &self,
        command_buffer: &mut dyn CommandBuffer,
        queue: &dyn Queue,
        data: &[u8],
        texture: &dyn Texture,
        final_layout: ImageLayout,
    ) -> Result<()> {
        let info = transfer::texture_info(texture)?;
        let region = BufferImageCopy::whole_level(info, 0, 0);
        let footprint = transfer::buffer_footprint(info.format, &region)?;
        if data.len() as u64 != footprint {
            return Err(Error::precondition(format!(
                "Level 0 of the texture takes {footprint} bytes, not {}",
                data.len()
            )));
        }
        self.stage(data)?;

        let to_transfer = ImageMemoryBarrier::transition(
            texture,
            ImageLayout::Undefined,
            ImageLayout::TransferDstOptimal,
        )?;
        let to_final =
            ImageMemoryBarrier::transition(texture, ImageLayout::TransferDstOptimal, final_layout)?;
        let (_, final_stages) = transfer::layout_access(final_layout);

        command_buffer.begin(CommandBufferUsageFlags::ONE_TIME_SUBMIT)?;
        command_buffer.pipeline_barrier(
            PipelineStageFlags::TOP_OF_PIPE,
            PipelineStageFlags::TRANSFER,
            &[],
            &[],
            &[to_transfer],
        );
        command_buffer.copy_buffer_to_image(
            self.buffer(),
            texture,
            ImageLayout::TransferDstOptimal,
            &[region],
        );
        command_buffer.pipeline_barrier(
            PipelineStageFlags::TRANSFER,
            final_stages,
            &[],
            &[],
            &[to_final],
        );
        Self::submit(command_buffer, queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NativeHandle;

    struct DeviceLocal;

    impl Buffer for DeviceLocal {
        fn size(&self) -> u64 {
            64
        }

        fn targets(&self) -> BufferTargets {
            BufferTargets::TRANSFER_SRC
        }

        fn memory_flags(&self) -> MemoryPropertyFlags {
            MemoryPropertyFlags::DEVICE_LOCAL
        }

        fn native(&self) -> NativeHandle {
            NativeHandle::Gl(1)
        }

        fn write(&self, _offset: u64, _data: &[u8]) -> Result<()> {
            Ok(())
        }

        fn read(&self, _offset: u64, _data: &mut [u8]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn staging_needs_host_visible_memory() {
        assert!(matches!(
            StagingBuffer::new(Box::new(DeviceLocal)),
            Err(ref e) if e.is_precondition()
        ));
    }
}
