// Vulkan buffers: one dedicated memory allocation each

use anyhow::Context;
use ash::vk;

use super::convert;
use super::shared::VulkanShared;
use crate::core::NativeHandle;
use crate::enums::PixelFormat;
use crate::error::{Error, Result};
use crate::flags::{BufferTargets, MemoryPropertyFlags};
use crate::resource::{Buffer, BufferView};

pub struct VulkanBuffer<'d> {
    shared: &'d VulkanShared,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    size: u64,
    targets: BufferTargets,
    memory_flags: MemoryPropertyFlags,
}

impl<'d> VulkanBuffer<'d> {
    pub fn new(
        shared: &'d VulkanShared,
        size: u64,
        targets: BufferTargets,
        memory_flags: MemoryPropertyFlags,
    ) -> Result<Self> {
        if size == 0 {
            return Err(Error::precondition("Buffers need a non-zero size"));
        }

        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(convert::buffer_usage(targets))
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        let buffer = unsafe { shared.device.create_buffer(&buffer_info, None) }
            .context("Failed to create buffer")?;

        let mut created = Self {
            shared,
            buffer,
            memory: vk::DeviceMemory::null(),
            size,
            targets,
            memory_flags,
        };

        // On failure `created` drops here and releases what exists so far.
        let requirements = unsafe { shared.device.get_buffer_memory_requirements(buffer) };
        created.memory = shared.allocate_memory(requirements, memory_flags)?;
        unsafe { shared.device.bind_buffer_memory(buffer, created.memory, 0) }
            .context("Failed to bind buffer memory")?;
        Ok(created)
    }

    fn coherent(&self) -> bool {
        self.memory_flags.contains(MemoryPropertyFlags::HOST_COHERENT)
    }

    fn whole_range(&self) -> vk::MappedMemoryRange {
        vk::MappedMemoryRange::builder()
            .memory(self.memory)
            .offset(0)
            .size(vk::WHOLE_SIZE)
            .build()
    }
}

impl Buffer for VulkanBuffer<'_> {
    fn size(&self) -> u64 {
        self.size
    }

    fn targets(&self) -> BufferTargets {
        self.targets
    }

    fn memory_flags(&self) -> MemoryPropertyFlags {
        self.memory_flags
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.buffer)
    }

    fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        let device = &self.shared.device;
        unsafe {
            let ptr = device
                .map_memory(self.memory, 0, vk::WHOLE_SIZE, vk::MemoryMapFlags::empty())
                .context("Failed to map buffer memory")? as *mut u8;
            ptr.add(offset as usize)
                .copy_from_nonoverlapping(data.as_ptr(), data.len());
            let flushed = if self.coherent() {
                Ok(())
            } else {
                device.flush_mapped_memory_ranges(&[self.whole_range()])
            };
            device.unmap_memory(self.memory);
            flushed.context("Failed to flush buffer memory")?;
        }
        Ok(())
    }

    fn read(&self, offset: u64, data: &mut [u8]) -> Result<()> {
        let device = &self.shared.device;
        unsafe {
            let ptr = device
                .map_memory(self.memory, 0, vk::WHOLE_SIZE, vk::MemoryMapFlags::empty())
                .context("Failed to map buffer memory")? as *const u8;
            let invalidated = if self.coherent() {
                Ok(())
            } else {
                device.invalidate_mapped_memory_ranges(&[self.whole_range()])
            };
            if invalidated.is_ok() {
                data.as_mut_ptr()
                    .copy_from_nonoverlapping(ptr.add(offset as usize), data.len());
            }
            device.unmap_memory(self.memory);
            invalidated.context("Failed to invalidate buffer memory")?;
        }
        Ok(())
    }
}

impl Drop for VulkanBuffer<'_> {
    fn drop(&mut self) {
        unsafe {
            self.shared.device.destroy_buffer(self.buffer, None);
            if self.memory != vk::DeviceMemory::null() {
                self.shared.device.free_memory(self.memory, None);
            }
        }
    }
}

/// A typed texel view over a range of a buffer.
pub struct VulkanBufferView<'d> {
    shared: &'d VulkanShared,
    view: vk::BufferView,
    buffer: vk::Buffer,
    format: PixelFormat,
    offset: u64,
    range: u64,
}

impl<'d> VulkanBufferView<'d> {
    /// The arguments are already checked against the buffer.
    pub fn new(
        shared: &'d VulkanShared,
        buffer: vk::Buffer,
        format: PixelFormat,
        offset: u64,
        range: u64,
    ) -> Result<Self> {
        let view_info = vk::BufferViewCreateInfo::builder()
            .buffer(buffer)
            .format(convert::format(format))
            .offset(offset)
            .range(range);
        let view = unsafe { shared.device.create_buffer_view(&view_info, None) }
            .context("Failed to create buffer view")?;
        Ok(Self {
            shared,
            view,
            buffer,
            format,
            offset,
            range,
        })
    }
}

impl BufferView for VulkanBufferView<'_> {
    fn buffer(&self) -> NativeHandle {
        convert::native(self.buffer)
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn offset(&self) -> u64 {
        self.offset
    }

    fn range(&self) -> u64 {
        self.range
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.view)
    }
}

impl Drop for VulkanBufferView<'_> {
    fn drop(&mut self) {
        unsafe { self.shared.device.destroy_buffer_view(self.view, None) };
    }
}
