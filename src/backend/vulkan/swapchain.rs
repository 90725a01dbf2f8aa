// Vulkan swap chain over the connection's surface

use anyhow::Context;
use ash::vk;
use glam::UVec2;

use super::convert;
use super::image::VulkanTextureView;
use super::shared::VulkanShared;
use crate::command::Queue;
use crate::core::{NativeHandle, SwapChain};
use crate::enums::{PixelFormat, TextureType};
use crate::error::{Error, Result};
use crate::flags::ImageAspectFlags;
use crate::resource::{ImageSubresourceRange, TextureView, TextureViewInfo};
use crate::sync::{Fence, Semaphore};

/// sRGB BGRA when the surface offers it, otherwise its first format.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.first())
        .copied()
}

/// FIFO is always available.
pub fn choose_present_mode(
    preferred: vk::PresentModeKHR,
    available: &[vk::PresentModeKHR],
) -> vk::PresentModeKHR {
    if available.contains(&preferred) {
        preferred
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// The surface's own extent, or `size` clamped to what the surface allows.
pub fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, size: UVec2) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }
    vk::Extent2D {
        width: size
            .x
            .clamp(caps.min_image_extent.width, caps.max_image_extent.width),
        height: size
            .y
            .clamp(caps.min_image_extent.height, caps.max_image_extent.height),
    }
}

/// One image more than the minimum, within the maximum when there is one.
pub fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        count.min(caps.max_image_count)
    } else {
        count
    }
}

pub struct VulkanSwapChain<'d> {
    shared: &'d VulkanShared,
    swapchain: vk::SwapchainKHR,
    views: Vec<VulkanTextureView<'d>>,
    format: PixelFormat,
    extent: UVec2,
}

impl<'d> VulkanSwapChain<'d> {
    pub fn new(shared: &'d VulkanShared, size: UVec2) -> Result<Self> {
        let (Some((surface_loader, surface)), Some(swapchain_loader)) =
            (shared.surface.as_ref(), shared.swapchain_loader.as_ref())
        else {
            return Err(Error::Unsupported(
                "Headless devices have no surface to present to".to_string(),
            ));
        };
        if size.x == 0 || size.y == 0 {
            return Err(Error::precondition("Swap chain extent must be non-zero"));
        }
        log::info!("Creating swapchain: {}x{}", size.x, size.y);

        let physical = shared.physical;
        let (caps, formats, present_modes) = unsafe {
            (
                surface_loader
                    .get_physical_device_surface_capabilities(physical, *surface)
                    .context("Failed to query surface capabilities")?,
                surface_loader
                    .get_physical_device_surface_formats(physical, *surface)
                    .context("Failed to query surface formats")?,
                surface_loader
                    .get_physical_device_surface_present_modes(physical, *surface)
                    .context("Failed to query present modes")?,
            )
        };

        let surface_format = choose_surface_format(&formats)
            .ok_or_else(|| Error::construction("Swap chain", "the surface offers no format"))?;
        let format = convert::pixel_format(surface_format.format).ok_or_else(|| {
            Error::Unsupported(format!("Surface format {:?}", surface_format.format))
        })?;
        let present_mode =
            choose_present_mode(convert::present_mode(shared.present_mode), &present_modes);
        log::info!("Present mode: {:?}", present_mode);
        let extent = choose_extent(&caps, size);

        let families = [shared.families.graphics, shared.families.present];
        let mut create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(*surface)
            .min_image_count(choose_image_count(&caps))
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST)
            .pre_transform(caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true);
        create_info = if families[0] == families[1] {
            create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        } else {
            create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&families)
        };

        let swapchain = unsafe { swapchain_loader.create_swapchain(&create_info, None) }
            .context("Failed to create swapchain")?;
        let mut swap_chain = Self {
            shared,
            swapchain,
            views: Vec::new(),
            format,
            extent: UVec2::new(extent.width, extent.height),
        };

        let images = unsafe { swapchain_loader.get_swapchain_images(swapchain) }
            .context("Failed to get swapchain images")?;
        let info = TextureViewInfo {
            view_type: TextureType::E2D,
            format,
            subresource: ImageSubresourceRange {
                aspect_mask: ImageAspectFlags::COLOUR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            },
        };
        for image in images {
            swap_chain
                .views
                .push(VulkanTextureView::new(shared, image, info)?);
        }
        log::info!("Created swapchain with {} images", swap_chain.views.len());
        Ok(swap_chain)
    }

    fn loader(&self) -> Result<&ash::extensions::khr::Swapchain> {
        self.shared
            .swapchain_loader
            .as_ref()
            .ok_or_else(|| Error::Unsupported("Swap chains need a surface".to_string()))
    }
}

impl SwapChain for VulkanSwapChain<'_> {
    fn extent(&self) -> UVec2 {
        self.extent
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn views(&self) -> Vec<&dyn TextureView> {
        self.views.iter().map(|view| view as &dyn TextureView).collect()
    }

    fn acquire_next_image(
        &self,
        timeout_ns: u64,
        semaphore: Option<&dyn Semaphore>,
        fence: Option<&dyn Fence>,
    ) -> Result<u32> {
        let semaphore = match semaphore {
            Some(semaphore) => convert::handle(semaphore.native(), "semaphore")?,
            None => vk::Semaphore::null(),
        };
        let fence = match fence {
            Some(fence) => convert::handle(fence.native(), "fence")?,
            None => vk::Fence::null(),
        };
        let result = unsafe {
            self.loader()?
                .acquire_next_image(self.swapchain, timeout_ns, semaphore, fence)
        };
        match result {
            Ok((index, suboptimal)) => {
                if suboptimal {
                    log::debug!("Swapchain image {index} is suboptimal");
                }
                Ok(index)
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                Err(anyhow::anyhow!("Swapchain out of date").into())
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context("Failed to acquire swapchain image")
                .into()),
        }
    }

    fn present(&self, queue: &dyn Queue, image_index: u32, wait: &[&dyn Semaphore]) -> Result<bool> {
        let queue = convert::handle::<vk::Queue>(queue.native(), "queue")?;
        let wait_semaphores = wait
            .iter()
            .map(|semaphore| convert::handle::<vk::Semaphore>(semaphore.native(), "semaphore"))
            .collect::<Result<Vec<_>>>()?;
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        match unsafe { self.loader()?.queue_present(queue, &present_info) } {
            Ok(suboptimal) => Ok(suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(true),
            Err(e) => Err(anyhow::Error::new(e)
                .context("Failed to present swapchain image")
                .into()),
        }
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.swapchain)
    }
}

impl Drop for VulkanSwapChain<'_> {
    fn drop(&mut self) {
        self.views.clear();
        if let Some(loader) = self.shared.swapchain_loader.as_ref() {
            unsafe { loader.destroy_swapchain(self.swapchain, None) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(current: (u32, u32), min_count: u32, max_count: u32) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_count: min_count,
            max_image_count: max_count,
            current_extent: vk::Extent2D {
                width: current.0,
                height: current.1,
            },
            min_image_extent: vk::Extent2D {
                width: 16,
                height: 16,
            },
            max_image_extent: vk::Extent2D {
                width: 4096,
                height: 2048,
            },
            ..Default::default()
        }
    }

    #[test]
    fn srgb_bgra_is_preferred() {
        let unorm = vk::SurfaceFormatKHR {
            format: vk::Format::R8G8B8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        };
        let srgb = vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        };
        assert_eq!(choose_surface_format(&[unorm, srgb]), Some(srgb));
        assert_eq!(choose_surface_format(&[unorm]), Some(unorm));
        assert_eq!(choose_surface_format(&[]), None);
    }

    #[test]
    fn missing_present_modes_fall_back_to_fifo() {
        let available = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(
            choose_present_mode(vk::PresentModeKHR::MAILBOX, &available),
            vk::PresentModeKHR::MAILBOX
        );
        assert_eq!(
            choose_present_mode(vk::PresentModeKHR::IMMEDIATE, &available),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn extent_follows_the_surface_or_is_clamped() {
        let fixed = caps((800, 600), 2, 3);
        assert_eq!(choose_extent(&fixed, UVec2::new(1920, 1080)), vk::Extent2D { width: 800, height: 600 });

        let free = caps((u32::MAX, u32::MAX), 2, 3);
        assert_eq!(
            choose_extent(&free, UVec2::new(8000, 8)),
            vk::Extent2D {
                width: 4096,
                height: 16
            }
        );
    }

    #[test]
    fn image_count_respects_the_maximum() {
        assert_eq!(choose_image_count(&caps((1, 1), 2, 0)), 3);
        assert_eq!(choose_image_count(&caps((1, 1), 2, 3)), 3);
        assert_eq!(choose_image_count(&caps((1, 1), 3, 3)), 3);
    }
}
