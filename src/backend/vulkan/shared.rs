// State every object of one Vulkan device reaches: the logical device, the queue families and
// the loaders of the presentation extensions.

use anyhow::Context;
use ash::extensions::khr;
use ash::vk;

use crate::core::PhysicalDevice;
use crate::enums::PresentMode;
use crate::error::{Error, Result};
use crate::flags::MemoryPropertyFlags;

/// Queue family indices the device was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub compute: u32,
    pub present: u32,
}

impl QueueFamilies {
    /// Distinct families, each listed once.
    pub fn unique(&self) -> Vec<u32> {
        let mut families = vec![self.graphics];
        for family in [self.compute, self.present] {
            if !families.contains(&family) {
                families.push(family);
            }
        }
        families
    }
}

pub struct VulkanShared {
    pub instance: ash::Instance,
    pub device: ash::Device,
    pub physical: vk::PhysicalDevice,
    pub physical_device: PhysicalDevice,
    pub surface: Option<(khr::Surface, vk::SurfaceKHR)>,
    pub swapchain_loader: Option<khr::Swapchain>,
    pub present_mode: PresentMode,
    pub families: QueueFamilies,
    graphics_queue: vk::Queue,
    upload_pool: vk::CommandPool,
}

impl VulkanShared {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        instance: ash::Instance,
        device: ash::Device,
        physical: vk::PhysicalDevice,
        physical_device: PhysicalDevice,
        surface: Option<(khr::Surface, vk::SurfaceKHR)>,
        present_mode: PresentMode,
        families: QueueFamilies,
    ) -> Result<Self> {
        let pool_info = vk::CommandPoolCreateInfo::builder()
            .queue_family_index(families.graphics)
            .flags(vk::CommandPoolCreateFlags::TRANSIENT);
        let upload_pool = match unsafe { device.create_command_pool(&pool_info, None) } {
            Ok(pool) => pool,
            Err(e) => {
                unsafe { device.destroy_device(None) };
                return Err(anyhow::Error::new(e)
                    .context("Failed to create upload command pool")
                    .into());
            }
        };
        let graphics_queue = unsafe { device.get_device_queue(families.graphics, 0) };
        let swapchain_loader = surface
            .as_ref()
            .map(|_| khr::Swapchain::new(&instance, &device));

        Ok(Self {
            instance,
            device,
            physical,
            physical_device,
            surface,
            swapchain_loader,
            present_mode,
            families,
            graphics_queue,
            upload_pool,
        })
    }

    /// Records `record` into a throwaway command buffer, submits it on the graphics queue and
    /// waits for it to complete.
    pub fn one_time_submit<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let allocate_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(self.upload_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let command_buffers = unsafe { self.device.allocate_command_buffers(&allocate_info) }
            .context("Failed to allocate upload command buffer")?;

        let result = self.run_once(command_buffers[0], record);
        unsafe {
            self.device
                .free_command_buffers(self.upload_pool, &command_buffers)
        };
        result
    }

    fn run_once<F>(&self, command_buffer: vk::CommandBuffer, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let begin_info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe { self.device.begin_command_buffer(command_buffer, &begin_info) }
            .context("Failed to begin upload command buffer")?;
        record(&self.device, command_buffer);
        unsafe { self.device.end_command_buffer(command_buffer) }
            .context("Failed to end upload command buffer")?;

        let fence = unsafe {
            self.device
                .create_fence(&vk::FenceCreateInfo::default(), None)
        }
        .context("Failed to create upload fence")?;
        let buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::builder().command_buffers(&buffers);
        let submitted = unsafe {
            self.device
                .queue_submit(self.graphics_queue, &[submit_info.build()], fence)
                .and_then(|()| self.device.wait_for_fences(&[fence], true, u64::MAX))
        };
        unsafe { self.device.destroy_fence(fence, None) };
        submitted.context("Failed to submit upload command buffer")?;
        Ok(())
    }

    /// Allocates one block of memory matching `requirements`.
    pub fn allocate_memory(
        &self,
        requirements: vk::MemoryRequirements,
        flags: MemoryPropertyFlags,
    ) -> Result<vk::DeviceMemory> {
        let memory_type_index = self
            .physical_device
            .memory
            .find_memory_type(requirements.memory_type_bits, flags)
            .ok_or_else(|| {
                Error::construction(
                    "Memory",
                    format!("No memory type with {flags:?} among {:#b}", requirements.memory_type_bits),
                )
            })?;

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);
        let memory = unsafe { self.device.allocate_memory(&alloc_info, None) }
            .context("Failed to allocate device memory")?;
        Ok(memory)
    }

    pub fn surface_loader(&self) -> Option<&khr::Surface> {
        self.surface.as_ref().map(|(loader, _)| loader)
    }
}

impl Drop for VulkanShared {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan device {}", self.physical_device.name);
        unsafe {
            if let Err(e) = self.device.device_wait_idle() {
                log::warn!("Device did not reach idle before destruction: {e}");
            }
            self.device.destroy_command_pool(self.upload_pool, None);
            self.device.destroy_device(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_families_keep_graphics_first() {
        let shared = QueueFamilies {
            graphics: 0,
            compute: 0,
            present: 0,
        };
        assert_eq!(shared.unique(), vec![0]);

        let split = QueueFamilies {
            graphics: 2,
            compute: 1,
            present: 2,
        };
        assert_eq!(split.unique(), vec![2, 1]);
    }
}
