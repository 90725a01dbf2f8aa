// Vulkan device: logical device, its three queues and their command pools
//
// Graphics is the only queue family a device cannot go without. Compute falls back to the
// graphics family, and presentation picks the graphics family first when it can present.

use std::rc::Rc;

use anyhow::Context;
use ash::extensions::khr;
use ash::vk;
use glam::UVec2;

use super::buffer::{VulkanBuffer, VulkanBufferView};
use super::command::{VulkanCommandPool, VulkanQueue};
use super::convert;
use super::descriptor::{VulkanDescriptorSetLayout, VulkanPipelineLayout};
use super::image::VulkanTexture;
use super::pipeline::VulkanPipeline;
use super::query::VulkanQueryPool;
use super::render_pass::{VulkanFrameBuffer, VulkanRenderPass};
use super::renderer::VulkanConnection;
use super::sampler::VulkanSampler;
use super::shader::VulkanShaderModule;
use super::shared::{QueueFamilies, VulkanShared};
use super::swapchain::VulkanSwapChain;
use super::sync::{VulkanFence, VulkanSemaphore};
use crate::command::{CommandPool, Queue};
use crate::core::{Device, PhysicalDevice, SwapChain};
use crate::descriptor::{DescriptorSetLayout, LayoutBindings};
use crate::enums::{ImageLayout, PixelFormat, PresentMode, QueryType};
use crate::error::{Error, Result};
use crate::flags::{
    BufferTargets, CommandPoolCreateFlags, FenceCreateFlags, MemoryPropertyFlags,
    QueryPipelineStatisticFlags, QueueFlags, ShaderStageFlags,
};
use crate::pipeline::{GraphicsPipelineCreateInfo, Pipeline, PipelineLayout, PipelineLayoutDescription};
use crate::projection::ClipDirection;
use crate::query::QueryPool;
use crate::render_pass::{FrameBuffer, RenderPass, RenderPassDescription};
use crate::resource::{check_buffer_view, Buffer, BufferView, Sampler, SamplerCreateInfo, Texture, TextureView};
use crate::shader::ShaderModule;
use crate::sync::{Fence, Semaphore};

/// Picks the queue families of a device. `can_present` answers for one family index.
pub fn choose_queue_families(
    physical_device: &PhysicalDevice,
    can_present: impl Fn(u32) -> bool,
) -> Result<QueueFamilies> {
    let graphics = physical_device
        .find_queue_family(QueueFlags::GRAPHICS)
        .ok_or_else(|| Error::construction("Device", format!("{} has no graphics queue", physical_device.name)))?;
    let compute = physical_device
        .find_queue_family(QueueFlags::COMPUTE)
        .unwrap_or(graphics);
    let present = if can_present(graphics) {
        graphics
    } else {
        (0..physical_device.queue_families.len() as u32)
            .find(|&family| can_present(family))
            .unwrap_or(graphics)
    };
    Ok(QueueFamilies {
        graphics,
        compute,
        present,
    })
}

pub struct VulkanDevice {
    // Queues and pools go before the shared state, which destroys the device.
    graphics_queue: VulkanQueue,
    compute_queue: VulkanQueue,
    present_queue: VulkanQueue,
    graphics_pool: VulkanCommandPool,
    compute_pool: VulkanCommandPool,
    present_pool: VulkanCommandPool,
    shared: Rc<VulkanShared>,
}

impl VulkanDevice {
    pub fn new(
        instance: &ash::Instance,
        connection: &VulkanConnection,
        physical_device: PhysicalDevice,
        present_mode: PresentMode,
    ) -> Result<Self> {
        let physical = connection.physical;
        let surface = connection.surface.clone();

        let can_present = |family: u32| match &surface {
            Some((loader, surface)) => unsafe {
                loader
                    .get_physical_device_surface_support(physical, family, *surface)
                    .unwrap_or(false)
            },
            None => false,
        };
        let families = choose_queue_families(&physical_device, &can_present)?;
        if surface.is_some() && !can_present(families.present) {
            return Err(Error::construction(
                "Device",
                format!("{} cannot present to this surface", physical_device.name),
            ));
        }

        let queue_priorities = [1.0];
        let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = families
            .unique()
            .into_iter()
            .map(|family| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(family)
                    .queue_priorities(&queue_priorities)
                    .build()
            })
            .collect();

        let extensions = if surface.is_some() {
            vec![khr::Swapchain::name().as_ptr()]
        } else {
            vec![]
        };
        let features = convert::enabled_features(&physical_device.features);

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&extensions)
            .enabled_features(&features);

        let device = unsafe { instance.create_device(physical, &create_info, None) }
            .context("Failed to create logical device")?;

        log::info!(
            "Vulkan device: {} (graphics {}, compute {}, present {})",
            physical_device.name,
            families.graphics,
            families.compute,
            families.present
        );

        let shared = Rc::new(VulkanShared::new(
            instance.clone(),
            device,
            physical,
            physical_device,
            surface,
            present_mode,
            families,
        )?);

        let pool = |family| {
            VulkanCommandPool::new(
                Rc::clone(&shared),
                family,
                CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
            )
        };
        Ok(Self {
            graphics_queue: VulkanQueue::new(Rc::clone(&shared), families.graphics),
            compute_queue: VulkanQueue::new(Rc::clone(&shared), families.compute),
            present_queue: VulkanQueue::new(Rc::clone(&shared), families.present),
            graphics_pool: pool(families.graphics)?,
            compute_pool: pool(families.compute)?,
            present_pool: pool(families.present)?,
            shared,
        })
    }

    pub fn shared(&self) -> &VulkanShared {
        &self.shared
    }
}

impl Device for VulkanDevice {
    fn renderer_name(&self) -> &str {
        "vk"
    }

    fn clip_direction(&self) -> ClipDirection {
        ClipDirection::TOP_DOWN
    }

    fn physical_device(&self) -> &PhysicalDevice {
        &self.shared.physical_device
    }

    fn graphics_queue(&self) -> &dyn Queue {
        &self.graphics_queue
    }

    fn compute_queue(&self) -> &dyn Queue {
        &self.compute_queue
    }

    fn present_queue(&self) -> &dyn Queue {
        &self.present_queue
    }

    fn graphics_command_pool(&self) -> &dyn CommandPool {
        &self.graphics_pool
    }

    fn compute_command_pool(&self) -> &dyn CommandPool {
        &self.compute_pool
    }

    fn present_command_pool(&self) -> &dyn CommandPool {
        &self.present_pool
    }

    // No current-context notion.
    fn enable(&self) -> Result<()> {
        Ok(())
    }

    fn disable(&self) {}

    fn make_render_pass(
        &self,
        description: RenderPassDescription,
    ) -> Result<Box<dyn RenderPass + '_>> {
        Ok(Box::new(VulkanRenderPass::new(&self.shared, description)?))
    }

    fn make_frame_buffer<'a>(
        &'a self,
        render_pass: &'a dyn RenderPass,
        views: &[&'a dyn TextureView],
        dimensions: UVec2,
    ) -> Result<Box<dyn FrameBuffer + 'a>> {
        Ok(Box::new(VulkanFrameBuffer::new(
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
        Ok(Box::new(VulkanDescriptorSetLayout::new(&self.shared, bindings)?))
    }

    fn make_pipeline_layout(
        &self,
        description: PipelineLayoutDescription,
    ) -> Result<Box<dyn PipelineLayout + '_>> {
        Ok(Box::new(VulkanPipelineLayout::new(&self.shared, description)?))
    }

    fn make_graphics_pipeline(
        &self,
        info: &GraphicsPipelineCreateInfo<'_>,
    ) -> Result<Box<dyn Pipeline + '_>> {
        Ok(Box::new(VulkanPipeline::new(&self.shared, info)?))
    }

    fn make_swap_chain(&self, size: UVec2) -> Result<Box<dyn SwapChain + '_>> {
        Ok(Box::new(VulkanSwapChain::new(&self.shared, size)?))
    }

    fn create_texture(&self, initial_layout: ImageLayout) -> Result<Box<dyn Texture + '_>> {
        Ok(Box::new(VulkanTexture::new(&self.shared, initial_layout)))
    }

    fn create_sampler(&self, info: &SamplerCreateInfo) -> Result<Box<dyn Sampler + '_>> {
        Ok(Box::new(VulkanSampler::new(&self.shared, info)?))
    }

    fn create_buffer(
        &self,
        size: u64,
        targets: BufferTargets,
        memory_flags: MemoryPropertyFlags,
    ) -> Result<Box<dyn Buffer + '_>> {
        Ok(Box::new(VulkanBuffer::new(&self.shared, size, targets, memory_flags)?))
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
        let handle = convert::handle(buffer.native(), "buffer")?;
        Ok(Box::new(VulkanBufferView::new(
            &self.shared,
            handle,
            format,
            offset,
            range,
        )?))
    }

    fn create_command_pool(
        &self,
        queue_family_index: u32,
        flags: CommandPoolCreateFlags,
    ) -> Result<Box<dyn CommandPool + '_>> {
        let families = self.shared.physical_device.queue_families.len() as u32;
        if queue_family_index >= families {
            return Err(Error::precondition(format!(
                "Queue family {queue_family_index} does not exist ({families} families)"
            )));
        }
        Ok(Box::new(VulkanCommandPool::new(
            Rc::clone(&self.shared),
            queue_family_index,
            flags,
        )?))
    }

    fn create_shader_module(&self, stage: ShaderStageFlags) -> Result<Box<dyn ShaderModule + '_>> {
        Ok(Box::new(VulkanShaderModule::new(&self.shared, stage)?))
    }

    fn create_query_pool(
        &self,
        query_type: QueryType,
        query_count: u32,
        pipeline_statistics: QueryPipelineStatisticFlags,
    ) -> Result<Box<dyn QueryPool + '_>> {
        Ok(Box::new(VulkanQueryPool::new(
            &self.shared,
            query_type,
            query_count,
            pipeline_statistics,
        )?))
    }

    fn create_fence(&self, flags: FenceCreateFlags) -> Result<Box<dyn Fence + '_>> {
        Ok(Box::new(VulkanFence::new(&self.shared, flags)?))
    }

    fn create_semaphore(&self) -> Result<Box<dyn Semaphore + '_>> {
        Ok(Box::new(VulkanSemaphore::new(&self.shared)?))
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe { self.shared.device.device_wait_idle() }.context("Failed to wait for device idle")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        MemoryProperties, PhysicalDeviceFeatures, PhysicalDeviceLimits, QueueFamilyProperties,
    };
    use crate::enums::PhysicalDeviceType;

    fn gpu(families: &[QueueFlags]) -> PhysicalDevice {
        PhysicalDevice {
            index: 0,
            name: "Test GPU".to_string(),
            device_type: PhysicalDeviceType::DiscreteGpu,
            api_version: (1, 3, 0),
            driver_version: 0,
            vendor_id: 0,
            device_id: 0,
            limits: PhysicalDeviceLimits::default(),
            features: PhysicalDeviceFeatures::default(),
            queue_families: families
                .iter()
                .map(|&flags| QueueFamilyProperties {
                    flags,
                    queue_count: 1,
                    timestamp_valid_bits: 64,
                })
                .collect(),
            memory: MemoryProperties::default(),
        }
    }

    #[test]
    fn one_family_serves_everything() {
        let device = gpu(&[QueueFlags::GRAPHICS | QueueFlags::COMPUTE | QueueFlags::TRANSFER]);
        let families = choose_queue_families(&device, |_| true).unwrap();
        assert_eq!(families.unique(), vec![0]);
    }

    #[test]
    fn presentation_falls_back_to_another_family() {
        let device = gpu(&[QueueFlags::GRAPHICS, QueueFlags::COMPUTE, QueueFlags::TRANSFER]);
        let families = choose_queue_families(&device, |family| family == 2).unwrap();
        assert_eq!(families.graphics, 0);
        assert_eq!(families.compute, 1);
        assert_eq!(families.present, 2);
    }

    #[test]
    fn headless_presents_on_graphics() {
        let device = gpu(&[QueueFlags::COMPUTE, QueueFlags::GRAPHICS]);
        let families = choose_queue_families(&device, |_| false).unwrap();
        assert_eq!(families.graphics, 1);
        assert_eq!(families.compute, 0);
        assert_eq!(families.present, 1);
    }

    #[test]
    fn graphics_is_required() {
        let device = gpu(&[QueueFlags::COMPUTE]);
        let error = choose_queue_families(&device, |_| true).unwrap_err();
        assert!(matches!(error, Error::Construction { what: "Device", .. }));
    }
}
