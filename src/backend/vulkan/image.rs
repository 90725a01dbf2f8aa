// Vulkan textures and texture views
//
// Images start out UNDEFINED (or PREINITIALIZED). Any other initial layout is reached with a
// one-time barrier on the graphics queue right after the memory is bound.

use anyhow::Context;
use ash::vk;

use super::convert;
use super::shared::VulkanShared;
use crate::core::NativeHandle;
use crate::enums::{ImageLayout, TextureType};
use crate::error::{Error, Result};
use crate::resource::{Texture, TextureInfo, TextureView, TextureViewInfo};
use crate::transfer;

/// Access mask and pipeline stage that use an image in `layout`.
pub fn layout_access(layout: ImageLayout) -> (vk::AccessFlags, vk::PipelineStageFlags) {
    let (access, stages) = transfer::layout_access(layout);
    (convert::access_flags(access), convert::stage_flags(stages))
}

/// Layout the image is created in. Everything but PREINITIALIZED starts UNDEFINED.
fn creation_layout(initial_layout: ImageLayout) -> vk::ImageLayout {
    if initial_layout == ImageLayout::Preinitialised {
        vk::ImageLayout::PREINITIALIZED
    } else {
        vk::ImageLayout::UNDEFINED
    }
}

pub fn image_create_info(info: &TextureInfo, initial_layout: ImageLayout) -> vk::ImageCreateInfo {
    let flags = match info.texture_type {
        TextureType::Cube | TextureType::CubeArray => vk::ImageCreateFlags::CUBE_COMPATIBLE,
        _ => vk::ImageCreateFlags::empty(),
    };
    vk::ImageCreateInfo {
        flags,
        image_type: convert::image_type(info.texture_type),
        format: convert::format(info.format),
        extent: vk::Extent3D {
            width: info.extent.x,
            height: info.extent.y,
            depth: info.extent.z,
        },
        mip_levels: info.mip_levels,
        array_layers: info.layer_count,
        samples: convert::sample_count(info.samples),
        tiling: convert::image_tiling(info.tiling),
        usage: convert::image_usage(info.usage),
        sharing_mode: vk::SharingMode::EXCLUSIVE,
        initial_layout: creation_layout(initial_layout),
        ..Default::default()
    }
}

struct Image {
    image: vk::Image,
    memory: vk::DeviceMemory,
    info: TextureInfo,
}

pub struct VulkanTexture<'d> {
    shared: &'d VulkanShared,
    initial_layout: ImageLayout,
    image: Option<Image>,
}

impl<'d> VulkanTexture<'d> {
    pub fn new(shared: &'d VulkanShared, initial_layout: ImageLayout) -> Self {
        Self {
            shared,
            initial_layout,
            image: None,
        }
    }

    fn release_image(&mut self) {
        if let Some(image) = self.image.take() {
            destroy_image(self.shared, image.image, image.memory);
        }
    }

    fn create_image(&self, info: &TextureInfo) -> Result<(vk::Image, vk::DeviceMemory)> {
        let device = &self.shared.device;
        let create_info = image_create_info(info, self.initial_layout);
        let image = unsafe { device.create_image(&create_info, None) }
            .context("Failed to create image")?;

        let requirements = unsafe { device.get_image_memory_requirements(image) };
        let memory = match self.shared.allocate_memory(requirements, info.memory_flags) {
            Ok(memory) => memory,
            Err(e) => {
                destroy_image(self.shared, image, vk::DeviceMemory::null());
                return Err(e);
            }
        };

        let bound = unsafe { device.bind_image_memory(image, memory, 0) }
            .context("Failed to bind image memory")
            .map_err(Error::from)
            .and_then(|()| self.transition(image, info));
        match bound {
            Ok(()) => Ok((image, memory)),
            Err(e) => {
                destroy_image(self.shared, image, memory);
                Err(e)
            }
        }
    }

    /// Moves a fresh image into the texture's initial layout.
    fn transition(&self, image: vk::Image, info: &TextureInfo) -> Result<()> {
        if matches!(
            self.initial_layout,
            ImageLayout::Undefined | ImageLayout::Preinitialised
        ) {
            return Ok(());
        }

        let (src_access, src_stage) = layout_access(ImageLayout::Undefined);
        let (dst_access, dst_stage) = layout_access(self.initial_layout);
        let barrier = vk::ImageMemoryBarrier::builder()
            .src_access_mask(src_access)
            .dst_access_mask(dst_access)
            .old_layout(vk::ImageLayout::UNDEFINED)
            .new_layout(convert::image_layout(self.initial_layout))
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(image)
            .subresource_range(convert::subresource_range(&info.full_subresource_range()))
            .build();

        self.shared.one_time_submit(|device, command_buffer| unsafe {
            device.cmd_pipeline_barrier(
                command_buffer,
                src_stage,
                dst_stage,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        })
    }
}

fn destroy_image(shared: &VulkanShared, image: vk::Image, memory: vk::DeviceMemory) {
    unsafe {
        shared.device.destroy_image(image, None);
        if memory != vk::DeviceMemory::null() {
            shared.device.free_memory(memory, None);
        }
    }
}

impl Texture for VulkanTexture<'_> {
    fn info(&self) -> Option<&TextureInfo> {
        self.image.as_ref().map(|image| &image.info)
    }

    fn initial_layout(&self) -> ImageLayout {
        self.initial_layout
    }

    fn native(&self) -> Option<NativeHandle> {
        self.image.as_ref().map(|image| convert::native(image.image))
    }

    fn make_image(&mut self, info: TextureInfo) -> Result<()> {
        self.release_image();
        let (image, memory) = self.create_image(&info)?;
        log::debug!(
            "Image {:?} {:?} {} x{} layers x{} mips",
            info.texture_type,
            info.format,
            info.extent,
            info.layer_count,
            info.mip_levels
        );
        self.image = Some(Image {
            image,
            memory,
            info,
        });
        Ok(())
    }

    fn make_view(&self, info: TextureViewInfo) -> Result<Box<dyn TextureView + '_>> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| Error::precondition("Texture has no image yet"))?;
        Ok(Box::new(VulkanTextureView::new(self.shared, image.image, info)?))
    }
}

impl Drop for VulkanTexture<'_> {
    fn drop(&mut self) {
        self.release_image();
    }
}

pub struct VulkanTextureView<'t> {
    shared: &'t VulkanShared,
    view: vk::ImageView,
    image: vk::Image,
    info: TextureViewInfo,
}

impl<'t> VulkanTextureView<'t> {
    pub fn new(shared: &'t VulkanShared, image: vk::Image, info: TextureViewInfo) -> Result<Self> {
        let create_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(convert::view_type(info.view_type))
            .format(convert::format(info.format))
            .components(vk::ComponentMapping::default())
            .subresource_range(convert::subresource_range(&info.subresource));
        let view = unsafe { shared.device.create_image_view(&create_info, None) }
            .context("Failed to create image view")?;
        Ok(Self {
            shared,
            view,
            image,
            info,
        })
    }
}

impl TextureView for VulkanTextureView<'_> {
    fn info(&self) -> &TextureViewInfo {
        &self.info
    }

    fn texture(&self) -> NativeHandle {
        convert::native(self.image)
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.view)
    }
}

impl Drop for VulkanTextureView<'_> {
    fn drop(&mut self) {
        unsafe { self.shared.device.destroy_image_view(self.view, None) };
    }
}

#[cfg(test)]
mod tests {
    use glam::UVec2;

    use super::*;
    use crate::enums::PixelFormat;
    use crate::flags::{ImageUsageFlags, SampleCountFlag};

    #[test]
    fn cube_maps_are_cube_compatible() {
        let cube = TextureInfo::new_cube(PixelFormat::R8G8B8A8, 64);
        let create_info = image_create_info(&cube, ImageLayout::Undefined);
        assert_eq!(create_info.flags, vk::ImageCreateFlags::CUBE_COMPATIBLE);
        assert_eq!(create_info.image_type, vk::ImageType::TYPE_2D);
        assert_eq!(create_info.array_layers, 6);

        let flat = TextureInfo::new_2d(PixelFormat::R8G8B8A8, UVec2::new(64, 32));
        assert!(image_create_info(&flat, ImageLayout::Undefined).flags.is_empty());
    }

    #[test]
    fn only_preinitialised_images_keep_their_layout() {
        let info = TextureInfo::new_2d(PixelFormat::D32F, UVec2::new(8, 8))
            .with_samples(SampleCountFlag::E4);
        let create_info = image_create_info(&info, ImageLayout::DepthStencilAttachmentOptimal);
        assert_eq!(create_info.initial_layout, vk::ImageLayout::UNDEFINED);
        assert_eq!(create_info.samples, vk::SampleCountFlags::TYPE_4);
        assert!(create_info
            .usage
            .contains(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT));
        assert_eq!(
            image_create_info(&info, ImageLayout::Preinitialised).initial_layout,
            vk::ImageLayout::PREINITIALIZED
        );
    }

    #[test]
    fn usage_follows_the_texture_info() {
        let info = TextureInfo::new_2d(PixelFormat::R8G8B8A8, UVec2::ONE)
            .with_usage(ImageUsageFlags::STORAGE | ImageUsageFlags::TRANSFER_SRC);
        assert_eq!(
            image_create_info(&info, ImageLayout::General).usage,
            vk::ImageUsageFlags::STORAGE | vk::ImageUsageFlags::TRANSFER_SRC
        );
    }

    #[test]
    fn attachments_wait_on_their_stage() {
        let (access, stage) = layout_access(ImageLayout::ColourAttachmentOptimal);
        assert!(access.contains(vk::AccessFlags::COLOR_ATTACHMENT_WRITE));
        assert_eq!(stage, vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT);

        let (access, stage) = layout_access(ImageLayout::Undefined);
        assert!(access.is_empty());
        assert_eq!(stage, vk::PipelineStageFlags::TOP_OF_PIPE);

        let (access, _) = layout_access(ImageLayout::TransferDstOptimal);
        assert_eq!(access, vk::AccessFlags::TRANSFER_WRITE);
    }
}
