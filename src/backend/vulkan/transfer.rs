// Copy regions and barriers as Vulkan structures

use ash::vk;
use glam::{IVec3, UVec3};

use super::convert;
use crate::error::{Error, Result};
use crate::resource::Texture;
use crate::transfer::{
    BufferCopy, BufferImageCopy, BufferMemoryBarrier, ImageBlit, ImageMemoryBarrier,
    ImageSubresourceLayers, MemoryBarrier,
};

pub fn image(texture: &dyn Texture) -> Result<vk::Image> {
    let native = texture
        .native()
        .ok_or_else(|| Error::precondition("Texture has no image yet"))?;
    convert::handle(native, "texture")
}

fn subresource_layers(layers: &ImageSubresourceLayers) -> vk::ImageSubresourceLayers {
    vk::ImageSubresourceLayers {
        aspect_mask: convert::aspect_flags(layers.aspect_mask),
        mip_level: layers.mip_level,
        base_array_layer: layers.base_array_layer,
        layer_count: layers.layer_count,
    }
}

fn offset(offset: IVec3) -> vk::Offset3D {
    vk::Offset3D {
        x: offset.x,
        y: offset.y,
        z: offset.z,
    }
}

fn extent(extent: UVec3) -> vk::Extent3D {
    vk::Extent3D {
        width: extent.x,
        height: extent.y,
        depth: extent.z,
    }
}

pub fn buffer_copies(regions: &[BufferCopy]) -> Vec<vk::BufferCopy> {
    regions
        .iter()
        .map(|region| vk::BufferCopy {
            src_offset: region.src_offset,
            dst_offset: region.dst_offset,
            size: region.size,
        })
        .collect()
}

pub fn buffer_image_copies(regions: &[BufferImageCopy]) -> Vec<vk::BufferImageCopy> {
    regions
        .iter()
        .map(|region| vk::BufferImageCopy {
            buffer_offset: region.buffer_offset,
            buffer_row_length: region.buffer_row_length,
            buffer_image_height: region.buffer_image_height,
            image_subresource: subresource_layers(&region.subresource),
            image_offset: offset(region.image_offset),
            image_extent: extent(region.image_extent),
        })
        .collect()
}

/// Blits name two corners where the neutral regions hold an offset and an extent.
pub fn image_blits(regions: &[ImageBlit]) -> Vec<vk::ImageBlit> {
    regions
        .iter()
        .map(|region| vk::ImageBlit {
            src_subresource: subresource_layers(&region.src_subresource),
            src_offsets: region.src_corners().map(offset),
            dst_subresource: subresource_layers(&region.dst_subresource),
            dst_offsets: region.dst_corners().map(offset),
        })
        .collect()
}

pub fn memory_barriers(barriers: &[MemoryBarrier]) -> Vec<vk::MemoryBarrier> {
    barriers
        .iter()
        .map(|barrier| {
            vk::MemoryBarrier::builder()
                .src_access_mask(convert::access_flags(barrier.src_access))
                .dst_access_mask(convert::access_flags(barrier.dst_access))
                .build()
        })
        .collect()
}

pub fn buffer_barriers(barriers: &[BufferMemoryBarrier<'_>]) -> Result<Vec<vk::BufferMemoryBarrier>> {
    barriers
        .iter()
        .map(|barrier| {
            let buffer = convert::handle(barrier.buffer.native(), "buffer")?;
            Ok(vk::BufferMemoryBarrier::builder()
                .src_access_mask(convert::access_flags(barrier.src_access))
                .dst_access_mask(convert::access_flags(barrier.dst_access))
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .buffer(buffer)
                .offset(barrier.offset)
                .size(barrier.size)
                .build())
        })
        .collect()
}

pub fn image_barriers(barriers: &[ImageMemoryBarrier<'_>]) -> Result<Vec<vk::ImageMemoryBarrier>> {
    barriers
        .iter()
        .map(|barrier| {
            Ok(vk::ImageMemoryBarrier::builder()
                .src_access_mask(convert::access_flags(barrier.src_access))
                .dst_access_mask(convert::access_flags(barrier.dst_access))
                .old_layout(convert::image_layout(barrier.old_layout))
                .new_layout(convert::image_layout(barrier.new_layout))
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(image(barrier.texture)?)
                .subresource_range(convert::subresource_range(&barrier.subresource))
                .build())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use ash::vk::Handle;
    use glam::UVec2;

    use super::*;
    use crate::core::NativeHandle;
    use crate::enums::{ImageLayout, PixelFormat};
    use crate::flags::{AccessFlags, ImageUsageFlags};
    use crate::resource::{TextureInfo, TextureView, TextureViewInfo};

    struct FakeTexture {
        info: TextureInfo,
        native: NativeHandle,
    }

    impl Texture for FakeTexture {
        fn info(&self) -> Option<&TextureInfo> {
            Some(&self.info)
        }

        fn initial_layout(&self) -> ImageLayout {
            ImageLayout::Undefined
        }

        fn native(&self) -> Option<NativeHandle> {
            Some(self.native)
        }

        fn make_image(&mut self, info: TextureInfo) -> Result<()> {
            self.info = info;
            Ok(())
        }

        fn make_view(&self, _info: TextureViewInfo) -> Result<Box<dyn TextureView + '_>> {
            Err(Error::Unsupported("views".to_string()))
        }
    }

    fn texture(native: NativeHandle) -> FakeTexture {
        FakeTexture {
            info: TextureInfo::new_2d(PixelFormat::R8G8B8A8, UVec2::new(64, 32))
                .with_usage(ImageUsageFlags::TRANSFER_DST | ImageUsageFlags::SAMPLED)
                .with_full_mip_chain(),
            native,
        }
    }

    #[test]
    fn blits_name_both_corners() {
        let info = texture(NativeHandle::Vulkan(1)).info;
        let region = ImageBlit {
            src_subresource: ImageSubresourceLayers::all_layers(&info, 0),
            src_offset: IVec3::new(4, 4, 0),
            src_extent: UVec3::new(32, 16, 1),
            dst_subresource: ImageSubresourceLayers::all_layers(&info, 1),
            dst_offset: IVec3::ZERO,
            dst_extent: UVec3::new(16, 8, 1),
        };
        let blits = image_blits(&[region]);
        assert_eq!(blits[0].src_offsets[1].x, 36);
        assert_eq!(blits[0].src_offsets[1].y, 20);
        assert_eq!(blits[0].src_offsets[1].z, 1);
        assert_eq!(blits[0].dst_subresource.mip_level, 1);
        assert_eq!(blits[0].src_subresource.aspect_mask, vk::ImageAspectFlags::COLOR);
    }

    #[test]
    fn buffer_image_copies_keep_their_pitches() {
        let info = texture(NativeHandle::Vulkan(1)).info;
        let region = BufferImageCopy {
            buffer_row_length: 128,
            ..BufferImageCopy::whole_level(&info, 0, 512)
        };
        let copy = buffer_image_copies(&[region])[0];
        assert_eq!(copy.buffer_offset, 512);
        assert_eq!(copy.buffer_row_length, 128);
        assert_eq!(copy.buffer_image_height, 0);
        assert_eq!((copy.image_extent.width, copy.image_extent.height), (64, 32));
    }

    #[test]
    fn transitions_resolve_the_image() {
        let target = texture(NativeHandle::Vulkan(42));
        let barrier = ImageMemoryBarrier::transition(
            &target,
            ImageLayout::TransferDstOptimal,
            ImageLayout::ShaderReadOnlyOptimal,
        )
        .unwrap();
        let baked = image_barriers(&[barrier]).unwrap();
        assert_eq!(baked[0].image.as_raw(), 42);
        assert_eq!(baked[0].old_layout, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
        assert_eq!(baked[0].new_layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
        assert_eq!(baked[0].src_access_mask, vk::AccessFlags::TRANSFER_WRITE);
        assert_eq!(baked[0].dst_access_mask, vk::AccessFlags::SHADER_READ);
        assert_eq!(baked[0].subresource_range.level_count, 7);
        assert_eq!(baked[0].src_queue_family_index, vk::QUEUE_FAMILY_IGNORED);
    }

    #[test]
    fn gl_textures_are_foreign() {
        let target = texture(NativeHandle::Gl(3));
        let barrier = ImageMemoryBarrier {
            src_access: AccessFlags::empty(),
            dst_access: AccessFlags::TRANSFER_WRITE,
            old_layout: ImageLayout::Undefined,
            new_layout: ImageLayout::TransferDstOptimal,
            texture: &target,
            subresource: target.info.full_subresource_range(),
        };
        assert!(matches!(image_barriers(&[barrier]), Err(Error::ForeignObject(_))));
    }
}
