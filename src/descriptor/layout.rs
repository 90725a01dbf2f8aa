// Descriptor set layouts

use super::DescriptorSetPool;
use crate::core::NativeHandle;
use crate::enums::DescriptorType;
use crate::error::{Error, Result};
use crate::flags::ShaderStageFlags;

/// One binding slot of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorSetLayoutBinding {
    pub binding: u32,
    pub descriptor_type: DescriptorType,
    /// Array size of the slot.
    pub descriptor_count: u32,
    pub stages: ShaderStageFlags,
}

impl DescriptorSetLayoutBinding {
    pub fn new(binding: u32, descriptor_type: DescriptorType, stages: ShaderStageFlags) -> Self {
        Self {
            binding,
            descriptor_type,
            descriptor_count: 1,
            stages,
        }
    }

    pub fn with_count(mut self, descriptor_count: u32) -> Self {
        self.descriptor_count = descriptor_count;
        self
    }
}

/// An ordered set of bindings with unique binding points.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutBindings {
    bindings: Vec<DescriptorSetLayoutBinding>,
}

impl LayoutBindings {
    /// Rejects duplicated binding points and empty array slots.
    pub fn new(bindings: Vec<DescriptorSetLayoutBinding>) -> Result<Self> {
        for (i, binding) in bindings.iter().enumerate() {
            if binding.descriptor_count == 0 {
                return Err(Error::construction(
                    "Descriptor set layout",
                    format!("binding {} has a descriptor count of 0", binding.binding),
                ));
            }
            if bindings[..i].iter().any(|other| other.binding == binding.binding) {
                return Err(Error::construction(
                    "Descriptor set layout",
                    format!("binding point {} is declared twice", binding.binding),
                ));
            }
        }
        Ok(Self { bindings })
    }

    /// The binding declared at `binding_point`.
    pub fn binding(&self, binding_point: u32) -> Result<&DescriptorSetLayoutBinding> {
        self.bindings
            .iter()
            .find(|binding| binding.binding == binding_point)
            .ok_or(Error::BindingNotFound(binding_point))
    }

    pub fn as_slice(&self) -> &[DescriptorSetLayoutBinding] {
        &self.bindings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DescriptorSetLayoutBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'a> IntoIterator for &'a LayoutBindings {
    type Item = &'a DescriptorSetLayoutBinding;
    type IntoIter = std::slice::Iter<'a, DescriptorSetLayoutBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

pub trait DescriptorSetLayout {
    fn bindings(&self) -> &LayoutBindings;

    fn native(&self) -> NativeHandle;

    /// A pool able to hold `max_sets` sets of this layout at once.
    fn create_pool(&self, max_sets: u32) -> Result<Box<dyn DescriptorSetPool + '_>>;

    fn binding(&self, binding_point: u32) -> Result<&DescriptorSetLayoutBinding> {
        self.bindings().binding(binding_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings() -> LayoutBindings {
        LayoutBindings::new(vec![
            DescriptorSetLayoutBinding::new(0, DescriptorType::UniformBuffer, ShaderStageFlags::VERTEX),
            DescriptorSetLayoutBinding::new(
                3,
                DescriptorType::CombinedImageSampler,
                ShaderStageFlags::FRAGMENT,
            )
            .with_count(4),
        ])
        .unwrap()
    }

    #[test]
    fn lookup_by_binding_point() {
        let bindings = bindings();
        let first = *bindings.binding(3).unwrap();
        let second = *bindings.binding(3).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.binding, 3);
        assert_eq!(first.descriptor_count, 4);
    }

    #[test]
    fn unknown_binding_points_are_not_found() {
        let bindings = bindings();
        for missing in [1, 2, 4, u32::MAX] {
            assert!(matches!(
                bindings.binding(missing),
                Err(Error::BindingNotFound(point)) if point == missing
            ));
        }
    }

    #[test]
    fn duplicates_fail_construction() {
        let duplicated = LayoutBindings::new(vec![
            DescriptorSetLayoutBinding::new(1, DescriptorType::Sampler, ShaderStageFlags::FRAGMENT),
            DescriptorSetLayoutBinding::new(1, DescriptorType::UniformBuffer, ShaderStageFlags::VERTEX),
        ]);
        assert!(matches!(duplicated, Err(Error::Construction { .. })));
    }
}
