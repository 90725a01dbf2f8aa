// Descriptor sets without descriptor objects
//
// GL binds resources to flat per-type units. Set `s` of a pipeline layout starts at the sum of
// the unit spans of sets `0..s`; a binding's elements follow its binding point.

use std::sync::atomic::{AtomicU32, Ordering};

use super::shared::GlShared;
use crate::core::NativeHandle;
use crate::descriptor::{
    DescriptorResource, DescriptorSet, DescriptorSetLayout, DescriptorSetPool, DescriptorWrite,
    DescriptorWrites, LayoutBindings, PoolCounter, PoolSlot,
};
use crate::error::Result;
use crate::pipeline::{PipelineLayout, PipelineLayoutDescription};

/// Units a set layout occupies: one past its highest binding element.
pub fn unit_span(bindings: &LayoutBindings) -> u32 {
    bindings
        .iter()
        .map(|binding| binding.binding + binding.descriptor_count)
        .max()
        .unwrap_or(0)
}

/// First unit of set `set` in a pipeline layout.
pub fn set_base(description: &PipelineLayoutDescription, set: u32) -> u32 {
    description
        .set_layouts()
        .take(set as usize)
        .map(unit_span)
        .sum()
}

pub struct GlDescriptorSetLayout<'d> {
    shared: &'d GlShared,
    bindings: LayoutBindings,
    id: u32,
}

impl<'d> GlDescriptorSetLayout<'d> {
    pub fn new(shared: &'d GlShared, bindings: LayoutBindings) -> Self {
        Self {
            id: shared.next_id(),
            shared,
            bindings,
        }
    }
}

impl DescriptorSetLayout for GlDescriptorSetLayout<'_> {
    fn bindings(&self) -> &LayoutBindings {
        &self.bindings
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.id)
    }

    fn create_pool(&self, max_sets: u32) -> Result<Box<dyn DescriptorSetPool + '_>> {
        Ok(Box::new(GlDescriptorSetPool {
            id: self.shared.next_id(),
            layout: self,
            counter: PoolCounter::new(max_sets),
            next_set: AtomicU32::new(1),
        }))
    }
}

pub struct GlDescriptorSetPool<'l> {
    layout: &'l GlDescriptorSetLayout<'l>,
    counter: PoolCounter,
    id: u32,
    next_set: AtomicU32,
}

impl DescriptorSetPool for GlDescriptorSetPool<'_> {
    fn counter(&self) -> &PoolCounter {
        &self.counter
    }

    fn layout(&self) -> &dyn DescriptorSetLayout {
        self.layout
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.id)
    }

    fn make_descriptor_set<'p>(
        &'p self,
        binding_point: u32,
        slot: PoolSlot<'p>,
    ) -> Result<Box<dyn DescriptorSet + 'p>> {
        Ok(Box::new(GlDescriptorSet {
            _slot: slot,
            binding_point,
            writes: DescriptorWrites::new(self.layout.bindings.clone()),
            id: self.next_set.fetch_add(1, Ordering::Relaxed),
        }))
    }
}

pub struct GlDescriptorSet<'p> {
    _slot: PoolSlot<'p>,
    binding_point: u32,
    writes: DescriptorWrites,
    id: u32,
}

/// Fails if a write carries an object of another backend.
fn check_handles(write: &DescriptorWrite) -> Result<()> {
    match write.resource {
        DescriptorResource::CombinedTextureSampler { view, sampler, .. } => {
            view.gl("texture view")?;
            sampler.gl("sampler")?;
        }
        DescriptorResource::Sampler { sampler } => {
            sampler.gl("sampler")?;
        }
        DescriptorResource::SampledTexture { view, .. }
        | DescriptorResource::StorageTexture { view, .. }
        | DescriptorResource::TexelBuffer { view, .. } => {
            view.gl("texture view")?;
        }
        DescriptorResource::UniformBuffer { buffer, .. }
        | DescriptorResource::StorageBuffer { buffer, .. } => {
            buffer.gl("buffer")?;
        }
    }
    Ok(())
}

impl DescriptorSet for GlDescriptorSet<'_> {
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
        NativeHandle::Gl(self.id)
    }

    // Units are bound when the set is; publishing is all there is to do.
    fn commit(&mut self, batch: &[DescriptorWrite]) -> Result<()> {
        batch.iter().try_for_each(check_handles)
    }
}

pub struct GlPipelineLayout {
    description: PipelineLayoutDescription,
    id: u32,
}

impl GlPipelineLayout {
    pub fn new(shared: &GlShared, description: PipelineLayoutDescription) -> Self {
        Self {
            description,
            id: shared.next_id(),
        }
    }
}

impl PipelineLayout for GlPipelineLayout {
    fn description(&self) -> &PipelineLayoutDescription {
        &self.description
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorSetLayoutBinding;
    use crate::enums::DescriptorType;
    use crate::flags::ShaderStageFlags;

    #[test]
    fn spans_cover_the_highest_element() {
        let bindings = LayoutBindings::new(vec![
            DescriptorSetLayoutBinding::new(0, DescriptorType::UniformBuffer, ShaderStageFlags::VERTEX),
            DescriptorSetLayoutBinding::new(2, DescriptorType::SampledImage, ShaderStageFlags::FRAGMENT)
                .with_count(3),
        ])
        .unwrap();
        assert_eq!(unit_span(&bindings), 5);
        assert_eq!(unit_span(&LayoutBindings::default()), 0);
    }

    #[test]
    fn foreign_handles_are_refused() {
        let write = DescriptorWrite {
            binding: 0,
            array_element: 0,
            resource: DescriptorResource::Sampler {
                sampler: NativeHandle::Vulkan(9),
            },
        };
        assert!(check_handles(&write).unwrap_err().is_precondition());
    }
}
