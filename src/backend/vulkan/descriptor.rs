// Vulkan descriptor set layouts, pools, sets and pipeline layouts
//
// Each pool serves one layout, so its sizes are the layout's descriptor counts times the number
// of sets. Sets are freed individually when dropped.

use anyhow::Context;
use ash::vk;

use super::convert;
use super::shared::VulkanShared;
use crate::core::NativeHandle;
use crate::descriptor::{
    DescriptorResource, DescriptorSet, DescriptorSetLayout, DescriptorSetPool, DescriptorWrite,
    DescriptorWrites, LayoutBindings, PoolCounter, PoolSlot,
};
use crate::enums::ImageLayout;
use crate::error::Result;
use crate::pipeline::{PipelineLayout, PipelineLayoutDescription};

/// Descriptor counts a pool of `max_sets` sets of `bindings` needs, one entry per type.
pub fn pool_sizes(bindings: &LayoutBindings, max_sets: u32) -> Vec<vk::DescriptorPoolSize> {
    let mut sizes: Vec<vk::DescriptorPoolSize> = Vec::new();
    for binding in bindings.iter() {
        let ty = convert::descriptor_type(binding.descriptor_type);
        let count = binding.descriptor_count.saturating_mul(max_sets);
        match sizes.iter_mut().find(|size| size.ty == ty) {
            Some(size) => size.descriptor_count = size.descriptor_count.saturating_add(count),
            None => sizes.push(vk::DescriptorPoolSize {
                ty,
                descriptor_count: count,
            }),
        }
    }
    // Pools cannot be created without a single size.
    if sizes.is_empty() {
        sizes.push(vk::DescriptorPoolSize {
            ty: vk::DescriptorType::SAMPLER,
            descriptor_count: 1,
        });
    }
    sizes
}

/// What one write points the descriptor at.
#[derive(Debug, Clone, Copy)]
pub enum WriteInfo {
    Image(vk::DescriptorImageInfo),
    Buffer(vk::DescriptorBufferInfo),
    Texel(vk::BufferView),
}

pub fn write_info(resource: &DescriptorResource) -> Result<WriteInfo> {
    let image = |sampler: vk::Sampler, view: vk::ImageView, layout: ImageLayout| {
        WriteInfo::Image(vk::DescriptorImageInfo {
            sampler,
            image_view: view,
            image_layout: convert::image_layout(layout),
        })
    };
    let info = match *resource {
        DescriptorResource::CombinedTextureSampler {
            view,
            sampler,
            layout,
            ..
        } => image(
            convert::handle(sampler, "sampler")?,
            convert::handle(view, "texture view")?,
            layout,
        ),
        DescriptorResource::Sampler { sampler } => image(
            convert::handle(sampler, "sampler")?,
            vk::ImageView::null(),
            ImageLayout::Undefined,
        ),
        DescriptorResource::SampledTexture { view, layout, .. }
        | DescriptorResource::StorageTexture { view, layout, .. } => image(
            vk::Sampler::null(),
            convert::handle(view, "texture view")?,
            layout,
        ),
        DescriptorResource::UniformBuffer {
            buffer,
            offset,
            range,
            ..
        }
        | DescriptorResource::StorageBuffer {
            buffer,
            offset,
            range,
            ..
        } => WriteInfo::Buffer(vk::DescriptorBufferInfo {
            buffer: convert::handle(buffer, "buffer")?,
            offset,
            range,
        }),
        DescriptorResource::TexelBuffer { view, .. } => {
            WriteInfo::Texel(convert::handle(view, "buffer view")?)
        }
    };
    Ok(info)
}

pub struct VulkanDescriptorSetLayout<'d> {
    shared: &'d VulkanShared,
    layout: vk::DescriptorSetLayout,
    bindings: LayoutBindings,
}

impl<'d> VulkanDescriptorSetLayout<'d> {
    pub fn new(shared: &'d VulkanShared, bindings: LayoutBindings) -> Result<Self> {
        let vk_bindings: Vec<vk::DescriptorSetLayoutBinding> = bindings
            .iter()
            .map(|binding| {
                vk::DescriptorSetLayoutBinding::builder()
                    .binding(binding.binding)
                    .descriptor_type(convert::descriptor_type(binding.descriptor_type))
                    .descriptor_count(binding.descriptor_count)
                    .stage_flags(convert::shader_stages(binding.stages))
                    .build()
            })
            .collect();
        let create_info = vk::DescriptorSetLayoutCreateInfo::builder().bindings(&vk_bindings);
        let layout = unsafe { shared.device.create_descriptor_set_layout(&create_info, None) }
            .context("Failed to create descriptor set layout")?;
        Ok(Self {
            shared,
            layout,
            bindings,
        })
    }
}

impl DescriptorSetLayout for VulkanDescriptorSetLayout<'_> {
    fn bindings(&self) -> &LayoutBindings {
        &self.bindings
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.layout)
    }

    fn create_pool(&self, max_sets: u32) -> Result<Box<dyn DescriptorSetPool + '_>> {
        let sizes = pool_sizes(&self.bindings, max_sets.max(1));
        let create_info = vk::DescriptorPoolCreateInfo::builder()
            .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
            .max_sets(max_sets.max(1))
            .pool_sizes(&sizes);
        let pool = unsafe { self.shared.device.create_descriptor_pool(&create_info, None) }
            .context("Failed to create descriptor pool")?;
        Ok(Box::new(VulkanDescriptorSetPool {
            layout: self,
            pool,
            counter: PoolCounter::new(max_sets),
        }))
    }
}

impl Drop for VulkanDescriptorSetLayout<'_> {
    fn drop(&mut self) {
        unsafe {
            self.shared
                .device
                .destroy_descriptor_set_layout(self.layout, None)
        };
    }
}

pub struct VulkanDescriptorSetPool<'l> {
    layout: &'l VulkanDescriptorSetLayout<'l>,
    pool: vk::DescriptorPool,
    counter: PoolCounter,
}

impl DescriptorSetPool for VulkanDescriptorSetPool<'_> {
    fn counter(&self) -> &PoolCounter {
        &self.counter
    }

    fn layout(&self) -> &dyn DescriptorSetLayout {
        self.layout
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.pool)
    }

    fn make_descriptor_set<'p>(
        &'p self,
        binding_point: u32,
        slot: PoolSlot<'p>,
    ) -> Result<Box<dyn DescriptorSet + 'p>> {
        let set_layouts = [self.layout.layout];
        let allocate_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(self.pool)
            .set_layouts(&set_layouts);
        let sets = unsafe { self.layout.shared.device.allocate_descriptor_sets(&allocate_info) }
            .context("Failed to allocate descriptor set")?;
        Ok(Box::new(VulkanDescriptorSet {
            shared: self.layout.shared,
            pool: self.pool,
            set: sets[0],
            _slot: slot,
            binding_point,
            writes: DescriptorWrites::new(self.layout.bindings.clone()),
        }))
    }
}

impl Drop for VulkanDescriptorSetPool<'_> {
    fn drop(&mut self) {
        unsafe {
            self.layout
                .shared
                .device
                .destroy_descriptor_pool(self.pool, None)
        };
    }
}

pub struct VulkanDescriptorSet<'p> {
    shared: &'p VulkanShared,
    pool: vk::DescriptorPool,
    set: vk::DescriptorSet,
    _slot: PoolSlot<'p>,
    binding_point: u32,
    writes: DescriptorWrites,
}

impl DescriptorSet for VulkanDescriptorSet<'_> {
    fn binding_point(&self) -> u32 {
        self.binding_point
    }

    fn writes(&self) -> &DescriptorWrites {
        &self.writes
    }

    fn writes_mut(&mut self) -> &mut DescriptorWrites {
        &mut self.writes
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.set)
    }

    fn commit(&mut self, batch: &[DescriptorWrite]) -> Result<()> {
        let infos = batch
            .iter()
            .map(|write| write_info(&write.resource))
            .collect::<Result<Vec<_>>>()?;

        let mut vk_writes = Vec::with_capacity(batch.len());
        for (write, info) in batch.iter().zip(&infos) {
            let descriptor_type = self.writes.layout().binding(write.binding)?.descriptor_type;
            let builder = vk::WriteDescriptorSet::builder()
                .dst_set(self.set)
                .dst_binding(write.binding)
                .dst_array_element(write.array_element)
                .descriptor_type(convert::descriptor_type(descriptor_type));
            let vk_write = match info {
                WriteInfo::Image(image) => builder.image_info(std::slice::from_ref(image)),
                WriteInfo::Buffer(buffer) => builder.buffer_info(std::slice::from_ref(buffer)),
                WriteInfo::Texel(view) => builder.texel_buffer_view(std::slice::from_ref(view)),
            };
            vk_writes.push(vk_write.build());
        }

        unsafe { self.shared.device.update_descriptor_sets(&vk_writes, &[]) };
        Ok(())
    }
}

impl Drop for VulkanDescriptorSet<'_> {
    fn drop(&mut self) {
        if let Err(e) = unsafe { self.shared.device.free_descriptor_sets(self.pool, &[self.set]) } {
            log::warn!("Failed to free descriptor set: {e}");
        }
    }
}

pub struct VulkanPipelineLayout<'d> {
    shared: &'d VulkanShared,
    layout: vk::PipelineLayout,
    description: PipelineLayoutDescription,
}

impl<'d> VulkanPipelineLayout<'d> {
    pub fn new(shared: &'d VulkanShared, description: PipelineLayoutDescription) -> Result<Self> {
        let set_layouts = description
            .set_layout_handles()
            .map(|handle| convert::handle::<vk::DescriptorSetLayout>(handle, "descriptor set layout"))
            .collect::<Result<Vec<_>>>()?;
        let push_constant_ranges: Vec<vk::PushConstantRange> = description
            .push_constant_ranges()
            .iter()
            .map(|range| vk::PushConstantRange {
                stage_flags: convert::shader_stages(range.stages),
                offset: range.offset,
                size: range.size,
            })
            .collect();

        let create_info = vk::PipelineLayoutCreateInfo::builder()
            .set_layouts(&set_layouts)
            .push_constant_ranges(&push_constant_ranges);
        let layout = unsafe { shared.device.create_pipeline_layout(&create_info, None) }
            .context("Failed to create pipeline layout")?;
        Ok(Self {
            shared,
            layout,
            description,
        })
    }
}

impl PipelineLayout for VulkanPipelineLayout<'_> {
    fn description(&self) -> &PipelineLayoutDescription {
        &self.description
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.layout)
    }
}

impl Drop for VulkanPipelineLayout<'_> {
    fn drop(&mut self) {
        unsafe { self.shared.device.destroy_pipeline_layout(self.layout, None) };
    }
}

#[cfg(test)]
mod tests {
    use ash::vk::Handle;

    use super::*;
    use crate::descriptor::DescriptorSetLayoutBinding;
    use crate::enums::{DescriptorType, TextureType};
    use crate::flags::ShaderStageFlags;

    #[test]
    fn pool_sizes_aggregate_per_type() {
        let bindings = LayoutBindings::new(vec![
            DescriptorSetLayoutBinding::new(0, DescriptorType::UniformBuffer, ShaderStageFlags::VERTEX),
            DescriptorSetLayoutBinding::new(1, DescriptorType::CombinedImageSampler, ShaderStageFlags::FRAGMENT)
                .with_count(4),
            DescriptorSetLayoutBinding::new(2, DescriptorType::UniformBuffer, ShaderStageFlags::FRAGMENT),
        ])
        .unwrap();
        let sizes = pool_sizes(&bindings, 3);
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[0].ty, vk::DescriptorType::UNIFORM_BUFFER);
        assert_eq!(sizes[0].descriptor_count, 6);
        assert_eq!(sizes[1].ty, vk::DescriptorType::COMBINED_IMAGE_SAMPLER);
        assert_eq!(sizes[1].descriptor_count, 12);
    }

    #[test]
    fn empty_layouts_still_get_a_pool_size() {
        assert_eq!(pool_sizes(&LayoutBindings::default(), 8).len(), 1);
    }

    #[test]
    fn image_writes_carry_their_layout() {
        let resource = DescriptorResource::CombinedTextureSampler {
            view: NativeHandle::Vulkan(0x10),
            view_type: TextureType::E2D,
            sampler: NativeHandle::Vulkan(0x20),
            layout: ImageLayout::ShaderReadOnlyOptimal,
        };
        let WriteInfo::Image(info) = write_info(&resource).unwrap() else {
            panic!("combined samplers write image info");
        };
        assert_eq!(info.image_view.as_raw(), 0x10);
        assert_eq!(info.sampler.as_raw(), 0x20);
        assert_eq!(info.image_layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
    }

    #[test]
    fn buffer_writes_keep_their_range() {
        let resource = DescriptorResource::UniformBuffer {
            buffer: NativeHandle::Vulkan(0x30),
            offset: 256,
            range: 64,
            dynamic: true,
        };
        let WriteInfo::Buffer(info) = write_info(&resource).unwrap() else {
            panic!("uniform buffers write buffer info");
        };
        assert_eq!(info.buffer.as_raw(), 0x30);
        assert_eq!((info.offset, info.range), (256, 64));
    }

    #[test]
    fn foreign_handles_are_refused() {
        let resource = DescriptorResource::Sampler {
            sampler: NativeHandle::Gl(3),
        };
        assert!(write_info(&resource).unwrap_err().is_precondition());
    }
}
