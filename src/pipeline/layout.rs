// Pipeline layouts: ordered descriptor set layouts plus push constant ranges

use crate::core::NativeHandle;
use crate::descriptor::{DescriptorSetLayout, LayoutBindings};
use crate::error::{Error, Result};
use crate::flags::ShaderStageFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PushConstantRange {
    pub stages: ShaderStageFlags,
    pub offset: u32,
    pub size: u32,
}

impl PushConstantRange {
    pub fn new(stages: ShaderStageFlags, offset: u32, size: u32) -> Self {
        Self {
            stages,
            offset,
            size,
        }
    }

    pub fn end(&self) -> u32 {
        self.offset.saturating_add(self.size)
    }
}

/// What a pipeline layout is made of. Set `i` of a pipeline binds `set_layouts[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineLayoutDescription {
    set_layouts: Vec<(NativeHandle, LayoutBindings)>,
    push_constant_ranges: Vec<PushConstantRange>,
}

impl PipelineLayoutDescription {
    pub fn new(
        set_layouts: &[&dyn DescriptorSetLayout],
        push_constant_ranges: &[PushConstantRange],
        max_push_constants_size: u32,
    ) -> Result<Self> {
        for range in push_constant_ranges {
            if range.stages.is_empty() || range.size == 0 {
                return Err(Error::precondition(format!(
                    "Push constant range {range:?} is empty"
                )));
            }
            if range.offset % 4 != 0 || range.size % 4 != 0 {
                return Err(Error::precondition(format!(
                    "Push constant range {range:?} is not 4-byte aligned"
                )));
            }
            if range.end() > max_push_constants_size {
                return Err(Error::precondition(format!(
                    "Push constant range {range:?} exceeds {max_push_constants_size} bytes"
                )));
            }
        }

        Ok(Self {
            set_layouts: set_layouts
                .iter()
                .map(|layout| (layout.native(), layout.bindings().clone()))
                .collect(),
            push_constant_ranges: push_constant_ranges.to_vec(),
        })
    }

    pub fn set_layouts(&self) -> impl Iterator<Item = &LayoutBindings> {
        self.set_layouts.iter().map(|(_, bindings)| bindings)
    }

    /// Native layout handles in set order.
    pub fn set_layout_handles(&self) -> impl Iterator<Item = NativeHandle> + '_ {
        self.set_layouts.iter().map(|(handle, _)| *handle)
    }

    pub fn set_count(&self) -> u32 {
        self.set_layouts.len() as u32
    }

    pub fn push_constant_ranges(&self) -> &[PushConstantRange] {
        &self.push_constant_ranges
    }

    /// Bytes needed to hold every push constant range.
    pub fn push_constants_size(&self) -> u32 {
        self.push_constant_ranges
            .iter()
            .map(PushConstantRange::end)
            .max()
            .unwrap_or(0)
    }

    /// Checks a `push_constants` call against the declared ranges.
    pub fn check_push_constants(&self, stages: ShaderStageFlags, offset: u32, size: u32) -> Result<()> {
        let end = offset.checked_add(size);
        let covered = self.push_constant_ranges.iter().any(|range| {
            range.stages.contains(stages)
                && offset >= range.offset
                && end.is_some_and(|end| end <= range.end())
        });
        if covered && size > 0 {
            Ok(())
        } else {
            Err(Error::precondition(format!(
                "Push constants {offset}+{size} for {stages:?} are outside the layout's ranges"
            )))
        }
    }
}

pub trait PipelineLayout {
    fn description(&self) -> &PipelineLayoutDescription;
    fn native(&self) -> NativeHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description(ranges: &[PushConstantRange]) -> Result<PipelineLayoutDescription> {
        PipelineLayoutDescription::new(&[], ranges, 128)
    }

    #[test]
    fn ranges_are_validated() {
        let vertex = ShaderStageFlags::VERTEX;
        assert!(description(&[PushConstantRange::new(vertex, 0, 64)]).is_ok());
        assert!(description(&[PushConstantRange::new(vertex, 2, 64)]).is_err());
        assert!(description(&[PushConstantRange::new(vertex, 0, 0)]).is_err());
        assert!(description(&[PushConstantRange::new(vertex, 64, 128)]).is_err());
    }

    #[test]
    fn push_constant_updates_must_fit_a_range() {
        let layout = description(&[
            PushConstantRange::new(ShaderStageFlags::VERTEX, 0, 64),
            PushConstantRange::new(ShaderStageFlags::FRAGMENT, 64, 16),
        ])
        .unwrap();
        assert_eq!(layout.push_constants_size(), 80);
        assert!(layout.check_push_constants(ShaderStageFlags::VERTEX, 0, 64).is_ok());
        assert!(layout.check_push_constants(ShaderStageFlags::FRAGMENT, 64, 16).is_ok());
        assert!(layout.check_push_constants(ShaderStageFlags::FRAGMENT, 0, 16).is_err());
        assert!(layout.check_push_constants(ShaderStageFlags::VERTEX, 60, 8).is_err());
    }
}
