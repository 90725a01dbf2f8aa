// Vulkan samplers

use anyhow::Context;
use ash::vk;

use super::convert;
use super::shared::VulkanShared;
use crate::core::{NativeHandle, PhysicalDeviceFeatures, PhysicalDeviceLimits};
use crate::enums::MipmapMode;
use crate::error::Result;
use crate::resource::{Sampler, SamplerCreateInfo};

/// Without mipmapping the LOD is clamped to the base level.
pub fn sampler_create_info(
    info: &SamplerCreateInfo,
    features: &PhysicalDeviceFeatures,
    limits: &PhysicalDeviceLimits,
) -> vk::SamplerCreateInfo {
    let (min_lod, max_lod) = if info.mip_filter == MipmapMode::None {
        (0.0, 0.25)
    } else {
        (info.min_lod, info.max_lod)
    };
    let anisotropy = info.anisotropy(features, limits);
    let compare = info.compare();

    vk::SamplerCreateInfo {
        mag_filter: convert::filter(info.mag_filter),
        min_filter: convert::filter(info.min_filter),
        mipmap_mode: convert::mipmap_mode(info.mip_filter),
        address_mode_u: convert::address_mode(info.wrap_s),
        address_mode_v: convert::address_mode(info.wrap_t),
        address_mode_w: convert::address_mode(info.wrap_r),
        mip_lod_bias: info.lod_bias,
        anisotropy_enable: if anisotropy.is_some() { vk::TRUE } else { vk::FALSE },
        max_anisotropy: anisotropy.unwrap_or(1.0),
        compare_enable: if compare.is_some() { vk::TRUE } else { vk::FALSE },
        compare_op: compare.map_or(vk::CompareOp::ALWAYS, convert::compare_op),
        min_lod,
        max_lod,
        border_color: convert::border_colour(info.border_colour),
        unnormalized_coordinates: vk::FALSE,
        ..Default::default()
    }
}

pub struct VulkanSampler<'d> {
    shared: &'d VulkanShared,
    sampler: vk::Sampler,
    info: SamplerCreateInfo,
}

impl<'d> VulkanSampler<'d> {
    pub fn new(shared: &'d VulkanShared, info: &SamplerCreateInfo) -> Result<Self> {
        let physical_device = &shared.physical_device;
        let create_info =
            sampler_create_info(info, &physical_device.features, &physical_device.limits);
        let sampler = unsafe { shared.device.create_sampler(&create_info, None) }
            .context("Failed to create sampler")?;
        Ok(Self {
            shared,
            sampler,
            info: *info,
        })
    }
}

impl Sampler for VulkanSampler<'_> {
    fn info(&self) -> &SamplerCreateInfo {
        &self.info
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.sampler)
    }
}

impl Drop for VulkanSampler<'_> {
    fn drop(&mut self) {
        unsafe { self.shared.device.destroy_sampler(self.sampler, None) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{CompareOp, Filter, WrapMode};
    use crate::resource::BorderColour;

    fn anisotropic_device() -> (PhysicalDeviceFeatures, PhysicalDeviceLimits) {
        let features = PhysicalDeviceFeatures {
            sampler_anisotropy: true,
            ..Default::default()
        };
        let limits = PhysicalDeviceLimits {
            max_sampler_anisotropy: 8.0,
            ..Default::default()
        };
        (features, limits)
    }

    #[test]
    fn no_mipmapping_clamps_the_lod() {
        let (features, limits) = anisotropic_device();
        let info = SamplerCreateInfo::default().with_lod(2.0, 6.0, 0.5);
        let baked = sampler_create_info(&info, &features, &limits);
        assert_eq!((baked.min_lod, baked.max_lod), (0.0, 0.25));
        assert_eq!(baked.mip_lod_bias, 0.5);

        let mipmapped = SamplerCreateInfo::new(
            WrapMode::ClampToEdge,
            WrapMode::MirroredRepeat,
            WrapMode::ClampToBorder,
            Filter::Nearest,
            Filter::Linear,
            MipmapMode::Linear,
        )
        .with_lod(2.0, 6.0, 0.0);
        let baked = sampler_create_info(&mipmapped, &features, &limits);
        assert_eq!((baked.min_lod, baked.max_lod), (2.0, 6.0));
        assert_eq!(baked.mipmap_mode, vk::SamplerMipmapMode::LINEAR);
        assert_eq!(baked.address_mode_u, vk::SamplerAddressMode::CLAMP_TO_EDGE);
        assert_eq!(baked.address_mode_v, vk::SamplerAddressMode::MIRRORED_REPEAT);
        assert_eq!(baked.address_mode_w, vk::SamplerAddressMode::CLAMP_TO_BORDER);
        assert_eq!(baked.min_filter, vk::Filter::NEAREST);
    }

    #[test]
    fn anisotropy_is_clamped_to_the_device() {
        let (features, limits) = anisotropic_device();
        let info = SamplerCreateInfo::default().with_max_anisotropy(16.0);
        let baked = sampler_create_info(&info, &features, &limits);
        assert_eq!(baked.anisotropy_enable, vk::TRUE);
        assert_eq!(baked.max_anisotropy, 8.0);

        let baked = sampler_create_info(&info, &PhysicalDeviceFeatures::default(), &limits);
        assert_eq!(baked.anisotropy_enable, vk::FALSE);
    }

    #[test]
    fn comparison_and_border() {
        let (features, limits) = anisotropic_device();
        let info = SamplerCreateInfo::default()
            .with_compare_op(CompareOp::LessEqual)
            .with_border_colour(BorderColour::IntOpaqueWhite);
        let baked = sampler_create_info(&info, &features, &limits);
        assert_eq!(baked.compare_enable, vk::TRUE);
        assert_eq!(baked.compare_op, vk::CompareOp::LESS_OR_EQUAL);
        assert_eq!(baked.border_color, vk::BorderColor::INT_OPAQUE_WHITE);

        let plain = sampler_create_info(&SamplerCreateInfo::default(), &features, &limits);
        assert_eq!(plain.compare_enable, vk::FALSE);
    }
}
