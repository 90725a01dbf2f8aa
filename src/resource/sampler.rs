// Samplers

use crate::core::{NativeHandle, PhysicalDeviceFeatures, PhysicalDeviceLimits};
use crate::enums::{CompareOp, Filter, MipmapMode, WrapMode};

/// The canonical border colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderColour {
    FloatTransparentBlack,
    IntTransparentBlack,
    #[default]
    FloatOpaqueBlack,
    IntOpaqueBlack,
    FloatOpaqueWhite,
    IntOpaqueWhite,
}

/// Exact channel values a border colour programs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BorderColourValue {
    Float([f32; 4]),
    Int([i32; 4]),
}

impl BorderColour {
    pub fn value(self) -> BorderColourValue {
        match self {
            Self::FloatTransparentBlack => BorderColourValue::Float([0.0, 0.0, 0.0, 0.0]),
            Self::IntTransparentBlack => BorderColourValue::Int([0, 0, 0, 0]),
            Self::FloatOpaqueBlack => BorderColourValue::Float([0.0, 0.0, 0.0, 1.0]),
            Self::IntOpaqueBlack => BorderColourValue::Int([0, 0, 0, 255]),
            Self::FloatOpaqueWhite => BorderColourValue::Float([1.0, 1.0, 1.0, 1.0]),
            Self::IntOpaqueWhite => BorderColourValue::Int([255, 255, 255, 255]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerCreateInfo {
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub wrap_r: WrapMode,
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub mip_filter: MipmapMode,
    pub min_lod: f32,
    pub max_lod: f32,
    pub lod_bias: f32,
    pub border_colour: BorderColour,
    pub max_anisotropy: f32,
    pub compare_op: CompareOp,
}

impl SamplerCreateInfo {
    pub fn new(
        wrap_s: WrapMode,
        wrap_t: WrapMode,
        wrap_r: WrapMode,
        min_filter: Filter,
        mag_filter: Filter,
        mip_filter: MipmapMode,
    ) -> Self {
        Self {
            wrap_s,
            wrap_t,
            wrap_r,
            min_filter,
            mag_filter,
            mip_filter,
            min_lod: -1000.0,
            max_lod: 1000.0,
            lod_bias: 0.0,
            border_colour: BorderColour::FloatOpaqueBlack,
            max_anisotropy: 1.0,
            compare_op: CompareOp::Always,
        }
    }

    pub fn with_lod(mut self, min_lod: f32, max_lod: f32, lod_bias: f32) -> Self {
        self.min_lod = min_lod;
        self.max_lod = max_lod;
        self.lod_bias = lod_bias;
        self
    }

    pub fn with_border_colour(mut self, border_colour: BorderColour) -> Self {
        self.border_colour = border_colour;
        self
    }

    pub fn with_max_anisotropy(mut self, max_anisotropy: f32) -> Self {
        self.max_anisotropy = max_anisotropy;
        self
    }

    pub fn with_compare_op(mut self, compare_op: CompareOp) -> Self {
        self.compare_op = compare_op;
        self
    }

    /// Anisotropy to program, if the device supports it and more than 1 is asked for.
    pub fn anisotropy(
        &self,
        features: &PhysicalDeviceFeatures,
        limits: &PhysicalDeviceLimits,
    ) -> Option<f32> {
        (features.sampler_anisotropy && self.max_anisotropy > 1.0)
            .then(|| self.max_anisotropy.min(limits.max_sampler_anisotropy.max(1.0)))
    }

    /// Comparison to program. `Always` means no depth comparison.
    pub fn compare(&self) -> Option<CompareOp> {
        (self.compare_op != CompareOp::Always).then_some(self.compare_op)
    }
}

impl Default for SamplerCreateInfo {
    fn default() -> Self {
        Self::new(
            WrapMode::Repeat,
            WrapMode::Repeat,
            WrapMode::Repeat,
            Filter::Linear,
            Filter::Linear,
            MipmapMode::None,
        )
    }
}

pub trait Sampler {
    fn info(&self) -> &SamplerCreateInfo;
    fn native(&self) -> NativeHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_colour_presets() {
        assert_eq!(
            BorderColour::FloatOpaqueWhite.value(),
            BorderColourValue::Float([1.0, 1.0, 1.0, 1.0])
        );
        assert_eq!(
            BorderColour::IntOpaqueBlack.value(),
            BorderColourValue::Int([0, 0, 0, 255])
        );
        assert_eq!(
            BorderColour::FloatTransparentBlack.value(),
            BorderColourValue::Float([0.0; 4])
        );
        assert_eq!(
            BorderColour::IntOpaqueWhite.value(),
            BorderColourValue::Int([255; 4])
        );
    }

    #[test]
    fn anisotropy_needs_the_feature_and_more_than_one() {
        let limits = PhysicalDeviceLimits {
            max_sampler_anisotropy: 16.0,
            ..Default::default()
        };
        let supported = PhysicalDeviceFeatures {
            sampler_anisotropy: true,
            ..Default::default()
        };
        let info = SamplerCreateInfo::default();

        assert_eq!(info.anisotropy(&supported, &limits), None);
        assert_eq!(info.with_max_anisotropy(8.0).anisotropy(&supported, &limits), Some(8.0));
        assert_eq!(info.with_max_anisotropy(32.0).anisotropy(&supported, &limits), Some(16.0));
        assert_eq!(
            info.with_max_anisotropy(8.0)
                .anisotropy(&PhysicalDeviceFeatures::default(), &limits),
            None
        );
    }

    #[test]
    fn always_disables_comparison() {
        let info = SamplerCreateInfo::default();
        assert_eq!(info.compare(), None);
        assert_eq!(info.with_compare_op(CompareOp::Less).compare(), Some(CompareOp::Less));
    }
}
