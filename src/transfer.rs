// Copy regions, blits and pipeline barriers
//
// Regions and barriers are checked here against the buffers and textures they touch, before
// either backend records anything, so both report the same precondition errors.

use glam::{IVec3, UVec3};

use crate::enums::{Filter, ImageLayout, PixelFormat};
use crate::error::{Error, Result};
use crate::flags::{
    AccessFlags, BufferTargets, ImageAspectFlags, ImageUsageFlags, PipelineStageFlags,
    SampleCountFlag,
};
use crate::resource::{Buffer, ImageSubresourceRange, Texture, TextureInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferCopy {
    pub src_offset: u64,
    pub dst_offset: u64,
    pub size: u64,
}

impl BufferCopy {
    pub fn new(src_offset: u64, dst_offset: u64, size: u64) -> Self {
        Self {
            src_offset,
            dst_offset,
            size,
        }
    }
}

/// One mip level and a run of layers of a texture, for one aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSubresourceLayers {
    pub aspect_mask: ImageAspectFlags,
    pub mip_level: u32,
    pub base_array_layer: u32,
    pub layer_count: u32,
}

impl ImageSubresourceLayers {
    /// Every layer of `mip_level`. Depth-stencil formats select their depth aspect.
    pub fn all_layers(info: &TextureInfo, mip_level: u32) -> Self {
        let aspect_mask = if info.format.is_depth_stencil_format() {
            ImageAspectFlags::DEPTH
        } else {
            info.format.aspect_mask()
        };
        Self {
            aspect_mask,
            mip_level,
            base_array_layer: 0,
            layer_count: info.layer_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferImageCopy {
    pub buffer_offset: u64,
    /// Texels per buffer row. 0 means rows are tightly packed.
    pub buffer_row_length: u32,
    /// Rows per buffer image. 0 means images are tightly packed.
    pub buffer_image_height: u32,
    pub subresource: ImageSubresourceLayers,
    pub image_offset: IVec3,
    pub image_extent: UVec3,
}

impl BufferImageCopy {
    /// A whole mip level with every layer, tightly packed from `buffer_offset`.
    pub fn whole_level(info: &TextureInfo, mip_level: u32, buffer_offset: u64) -> Self {
        Self {
            buffer_offset,
            buffer_row_length: 0,
            buffer_image_height: 0,
            subresource: ImageSubresourceLayers::all_layers(info, mip_level),
            image_offset: IVec3::ZERO,
            image_extent: info.mip_extent(mip_level),
        }
    }

    pub fn row_length(&self) -> u32 {
        if self.buffer_row_length == 0 {
            self.image_extent.x
        } else {
            self.buffer_row_length
        }
    }

    pub fn image_height(&self) -> u32 {
        if self.buffer_image_height == 0 {
            self.image_extent.y
        } else {
            self.buffer_image_height
        }
    }
}

/// A scaled copy between two textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageBlit {
    pub src_subresource: ImageSubresourceLayers,
    pub src_offset: IVec3,
    pub src_extent: UVec3,
    pub dst_subresource: ImageSubresourceLayers,
    pub dst_offset: IVec3,
    pub dst_extent: UVec3,
}

impl ImageBlit {
    pub fn src_corners(&self) -> [IVec3; 2] {
        [self.src_offset, self.src_offset + self.src_extent.as_ivec3()]
    }

    pub fn dst_corners(&self) -> [IVec3; 2] {
        [self.dst_offset, self.dst_offset + self.dst_extent.as_ivec3()]
    }
}

/// Orders every memory access of the given kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemoryBarrier {
    pub src_access: AccessFlags,
    pub dst_access: AccessFlags,
}

impl MemoryBarrier {
    pub fn new(src_access: AccessFlags, dst_access: AccessFlags) -> Self {
        Self {
            src_access,
            dst_access,
        }
    }
}

#[derive(Clone, Copy)]
pub struct BufferMemoryBarrier<'a> {
    pub src_access: AccessFlags,
    pub dst_access: AccessFlags,
    pub buffer: &'a dyn Buffer,
    pub offset: u64,
    pub size: u64,
}

impl<'a> BufferMemoryBarrier<'a> {
    pub fn whole(buffer: &'a dyn Buffer, src_access: AccessFlags, dst_access: AccessFlags) -> Self {
        Self {
            src_access,
            dst_access,
            buffer,
            offset: 0,
            size: buffer.size(),
        }
    }
}

/// Orders accesses to a texture and moves it from `old_layout` to `new_layout`.
#[derive(Clone, Copy)]
pub struct ImageMemoryBarrier<'a> {
    pub src_access: AccessFlags,
    pub dst_access: AccessFlags,
    pub old_layout: ImageLayout,
    pub new_layout: ImageLayout,
    pub texture: &'a dyn Texture,
    pub subresource: ImageSubresourceRange,
}

impl<'a> ImageMemoryBarrier<'a> {
    /// A layout change of the whole texture, with the accesses each layout implies.
    pub fn transition(
        texture: &'a dyn Texture,
        old_layout: ImageLayout,
        new_layout: ImageLayout,
    ) -> Result<Self> {
        let info = texture_info(texture)?;
        Ok(Self {
            src_access: layout_access(old_layout).0,
            dst_access: layout_access(new_layout).0,
            old_layout,
            new_layout,
            texture,
            subresource: info.full_subresource_range(),
        })
    }
}

/// Access mask and pipeline stages that use a texture in `layout`.
pub fn layout_access(layout: ImageLayout) -> (AccessFlags, PipelineStageFlags) {
    match layout {
        ImageLayout::Undefined => (AccessFlags::empty(), PipelineStageFlags::TOP_OF_PIPE),
        ImageLayout::General => (
            AccessFlags::SHADER_READ | AccessFlags::SHADER_WRITE,
            PipelineStageFlags::ALL_COMMANDS,
        ),
        ImageLayout::ColourAttachmentOptimal => (
            AccessFlags::COLOUR_ATTACHMENT_READ | AccessFlags::COLOUR_ATTACHMENT_WRITE,
            PipelineStageFlags::COLOUR_ATTACHMENT_OUTPUT,
        ),
        ImageLayout::DepthStencilAttachmentOptimal => (
            AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ | AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            PipelineStageFlags::EARLY_FRAGMENT_TESTS,
        ),
        ImageLayout::DepthStencilReadOnlyOptimal => (
            AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ | AccessFlags::SHADER_READ,
            PipelineStageFlags::EARLY_FRAGMENT_TESTS | PipelineStageFlags::FRAGMENT_SHADER,
        ),
        ImageLayout::ShaderReadOnlyOptimal => {
            (AccessFlags::SHADER_READ, PipelineStageFlags::FRAGMENT_SHADER)
        }
        ImageLayout::TransferSrcOptimal => (AccessFlags::TRANSFER_READ, PipelineStageFlags::TRANSFER),
        ImageLayout::TransferDstOptimal => {
            (AccessFlags::TRANSFER_WRITE, PipelineStageFlags::TRANSFER)
        }
        ImageLayout::Preinitialised => (AccessFlags::HOST_WRITE, PipelineStageFlags::HOST),
        ImageLayout::PresentSrc => (AccessFlags::empty(), PipelineStageFlags::BOTTOM_OF_PIPE),
    }
}

/// The storage description of a texture, which must have some.
pub fn texture_info(texture: &dyn Texture) -> Result<&TextureInfo> {
    texture
        .info()
        .ok_or_else(|| Error::precondition("Texture has no image yet"))
}

/// Block edge in texels and block size in bytes. Uncompressed formats have 1-texel blocks.
fn texel_block(format: PixelFormat) -> Option<(u32, u64)> {
    match format {
        PixelFormat::Bc1Rgb | PixelFormat::Bc1Rgba => Some((4, 8)),
        PixelFormat::Bc2Rgba | PixelFormat::Bc3Rgba => Some((4, 16)),
        format => format.size_in_bytes().map(|size| (1, u64::from(size))),
    }
}

/// Bytes a buffer-to-image region spans in the buffer, from its `buffer_offset`.
pub fn buffer_footprint(format: PixelFormat, region: &BufferImageCopy) -> Result<u64> {
    let (block, bytes) = texel_block(format)
        .ok_or_else(|| Error::precondition(format!("{format:?} cannot be copied")))?;
    let extent = region.image_extent;
    if extent.min_element() == 0 || region.subresource.layer_count == 0 {
        return Err(Error::precondition(format!("Copy region {extent} is empty")));
    }
    if region.row_length() < extent.x || region.image_height() < extent.y {
        return Err(Error::precondition(format!(
            "Buffer rows of {}x{} texels cannot hold a {extent} region",
            region.row_length(),
            region.image_height()
        )));
    }

    let blocks = |texels: u32| u64::from(texels.div_ceil(block));
    let row_pitch = blocks(region.row_length()) * bytes;
    let slices = u64::from(extent.z) * u64::from(region.subresource.layer_count);
    let footprint = row_pitch
        .checked_mul(blocks(region.image_height()))
        .and_then(|slice_pitch| slice_pitch.checked_mul(slices - 1))
        .and_then(|full_slices| {
            let last_slice = (blocks(extent.y) - 1) * row_pitch + blocks(extent.x) * bytes;
            full_slices.checked_add(last_slice)
        })
        .ok_or_else(|| Error::precondition(format!("Copy region {extent} overflows")))?;
    Ok(footprint)
}

fn check_range(what: &str, offset: u64, size: u64, limit: u64) -> Result<()> {
    match offset.checked_add(size) {
        Some(end) if size > 0 && end <= limit => Ok(()),
        _ => Err(Error::precondition(format!(
            "{what} range {offset}+{size} is outside 0..{limit}"
        ))),
    }
}

fn check_targets(buffer: &dyn Buffer, target: BufferTargets) -> Result<()> {
    if !buffer.targets().contains(target) {
        return Err(Error::precondition(format!(
            "Buffer targets {:?} lack {target:?}",
            buffer.targets()
        )));
    }
    Ok(())
}

fn check_usage(info: &TextureInfo, usage: ImageUsageFlags) -> Result<()> {
    if !info.usage.contains(usage) {
        return Err(Error::precondition(format!(
            "Texture usage {:?} lacks {usage:?}",
            info.usage
        )));
    }
    if info.samples != SampleCountFlag::E1 {
        return Err(Error::precondition("Multisampled textures cannot be copied or blitted"));
    }
    Ok(())
}

fn check_layout(layout: ImageLayout, expected: ImageLayout) -> Result<()> {
    if layout != expected && layout != ImageLayout::General {
        return Err(Error::precondition(format!(
            "Texture in {layout:?} where {expected:?} or General is required"
        )));
    }
    Ok(())
}

fn check_subresource(info: &TextureInfo, layers: &ImageSubresourceLayers) -> Result<()> {
    if layers.mip_level >= info.mip_levels {
        return Err(Error::precondition(format!(
            "Mip level {} is outside a texture of {} levels",
            layers.mip_level, info.mip_levels
        )));
    }
    check_range(
        "Layer",
        u64::from(layers.base_array_layer),
        u64::from(layers.layer_count),
        u64::from(info.layer_count),
    )?;
    let aspects = info.format.aspect_mask();
    if layers.aspect_mask.is_empty() || !aspects.contains(layers.aspect_mask) {
        return Err(Error::precondition(format!(
            "Aspects {:?} are not part of {:?}",
            layers.aspect_mask, info.format
        )));
    }
    Ok(())
}

/// Checks that `offset + extent` lies inside mip level `level`.
fn check_region(info: &TextureInfo, level: u32, offset: IVec3, extent: UVec3) -> Result<()> {
    let limit = info.mip_extent(level);
    let fits = (0..3).all(|axis| {
        offset[axis] >= 0 && u64::from(offset[axis] as u32) + u64::from(extent[axis]) <= u64::from(limit[axis])
    });
    if extent.min_element() == 0 || !fits {
        return Err(Error::precondition(format!(
            "Region {offset}+{extent} is outside mip level {level} ({limit})"
        )));
    }
    Ok(())
}

pub fn check_buffer_copy(src: &dyn Buffer, dst: &dyn Buffer, regions: &[BufferCopy]) -> Result<()> {
    check_targets(src, BufferTargets::TRANSFER_SRC)?;
    check_targets(dst, BufferTargets::TRANSFER_DST)?;
    if regions.is_empty() {
        return Err(Error::precondition("Buffer copy without regions"));
    }
    let same_buffer = src.native() == dst.native();
    for region in regions {
        check_range("Source", region.src_offset, region.size, src.size())?;
        check_range("Destination", region.dst_offset, region.size, dst.size())?;
        let overlaps = region.src_offset < region.dst_offset + region.size
            && region.dst_offset < region.src_offset + region.size;
        if same_buffer && overlaps {
            return Err(Error::precondition(format!(
                "Copy {}->{} of {} bytes overlaps itself",
                region.src_offset, region.dst_offset, region.size
            )));
        }
    }
    Ok(())
}

pub fn check_buffer_image_copy(
    src: &dyn Buffer,
    dst: &TextureInfo,
    dst_layout: ImageLayout,
    regions: &[BufferImageCopy],
) -> Result<()> {
    check_targets(src, BufferTargets::TRANSFER_SRC)?;
    check_usage(dst, ImageUsageFlags::TRANSFER_DST)?;
    check_layout(dst_layout, ImageLayout::TransferDstOptimal)?;
    if regions.is_empty() {
        return Err(Error::precondition("Buffer to image copy without regions"));
    }

    let (block, bytes) = texel_block(dst.format)
        .ok_or_else(|| Error::precondition(format!("{:?} cannot be copied", dst.format)))?;
    for region in regions {
        let layers = &region.subresource;
        check_subresource(dst, layers)?;
        if layers.aspect_mask.bits().count_ones() != 1 {
            return Err(Error::precondition(format!(
                "Buffer copies take one aspect, not {:?}",
                layers.aspect_mask
            )));
        }
        check_region(dst, layers.mip_level, region.image_offset, region.image_extent)?;
        if block > 1 {
            let limit = dst.mip_extent(layers.mip_level);
            let end = region.image_offset.as_uvec3() + region.image_extent;
            let aligned = (0..2).all(|axis| {
                region.image_offset[axis] as u32 % block == 0
                    && (end[axis] % block == 0 || end[axis] == limit[axis])
            });
            if !aligned {
                return Err(Error::precondition(format!(
                    "Compressed region {}+{} is not aligned on {block}x{block} blocks",
                    region.image_offset, region.image_extent
                )));
            }
        }
        if region.buffer_offset % bytes != 0 {
            return Err(Error::precondition(format!(
                "Buffer offset {} is not a multiple of the {bytes} byte texel block",
                region.buffer_offset
            )));
        }
        let footprint = buffer_footprint(dst.format, region)?;
        check_range("Source", region.buffer_offset, footprint, src.size())?;
    }
    Ok(())
}

pub fn check_blit(
    src: &TextureInfo,
    src_layout: ImageLayout,
    dst: &TextureInfo,
    dst_layout: ImageLayout,
    regions: &[ImageBlit],
    filter: Filter,
) -> Result<()> {
    check_usage(src, ImageUsageFlags::TRANSFER_SRC)?;
    check_usage(dst, ImageUsageFlags::TRANSFER_DST)?;
    check_layout(src_layout, ImageLayout::TransferSrcOptimal)?;
    check_layout(dst_layout, ImageLayout::TransferDstOptimal)?;
    if src.format.is_compressed_format() || dst.format.is_compressed_format() {
        return Err(Error::precondition("Compressed textures cannot be blitted"));
    }
    let depth_or_stencil =
        src.format.is_depth_or_stencil_format() || dst.format.is_depth_or_stencil_format();
    if depth_or_stencil && (src.format != dst.format || filter != Filter::Nearest) {
        return Err(Error::precondition(format!(
            "Depth or stencil blits need identical formats and nearest filtering, got {:?} to {:?}",
            src.format, dst.format
        )));
    }
    if regions.is_empty() {
        return Err(Error::precondition("Blit without regions"));
    }

    for region in regions {
        check_subresource(src, &region.src_subresource)?;
        check_subresource(dst, &region.dst_subresource)?;
        if region.src_subresource.aspect_mask != region.dst_subresource.aspect_mask
            || region.src_subresource.layer_count != region.dst_subresource.layer_count
        {
            return Err(Error::precondition(
                "Blit source and destination differ in aspects or layer count",
            ));
        }
        check_region(src, region.src_subresource.mip_level, region.src_offset, region.src_extent)?;
        check_region(dst, region.dst_subresource.mip_level, region.dst_offset, region.dst_extent)?;
    }
    Ok(())
}

pub fn check_barrier_stages(src_stages: PipelineStageFlags, dst_stages: PipelineStageFlags) -> Result<()> {
    if src_stages.is_empty() || dst_stages.is_empty() {
        return Err(Error::precondition("Pipeline barriers need source and destination stages"));
    }
    Ok(())
}

pub fn check_buffer_barrier(barrier: &BufferMemoryBarrier<'_>) -> Result<()> {
    check_range("Barrier", barrier.offset, barrier.size, barrier.buffer.size())
}

pub fn check_image_barrier(barrier: &ImageMemoryBarrier<'_>) -> Result<()> {
    let info = texture_info(barrier.texture)?;
    if matches!(barrier.new_layout, ImageLayout::Undefined | ImageLayout::Preinitialised) {
        return Err(Error::precondition(format!(
            "Textures cannot move to {:?}",
            barrier.new_layout
        )));
    }
    let range = &barrier.subresource;
    check_range(
        "Mip level",
        u64::from(range.base_mip_level),
        u64::from(range.level_count),
        u64::from(info.mip_levels),
    )?;
    check_range(
        "Layer",
        u64::from(range.base_array_layer),
        u64::from(range.layer_count),
        u64::from(info.layer_count),
    )
}

#[cfg(test)]
mod tests {
    use glam::UVec2;

    use super::*;
    use crate::core::NativeHandle;
    use crate::flags::MemoryPropertyFlags;

    struct HostBuffer {
        size: u64,
        targets: BufferTargets,
        name: u32,
    }

    impl Buffer for HostBuffer {
        fn size(&self) -> u64 {
            self.size
        }

        fn targets(&self) -> BufferTargets {
            self.targets
        }

        fn memory_flags(&self) -> MemoryPropertyFlags {
            MemoryPropertyFlags::HOST_VISIBLE
        }

        fn native(&self) -> NativeHandle {
            NativeHandle::Gl(self.name)
        }

        fn write(&self, _offset: u64, _data: &[u8]) -> Result<()> {
            Ok(())
        }

        fn read(&self, _offset: u64, _data: &mut [u8]) -> Result<()> {
            Ok(())
        }
    }

    fn staging(size: u64) -> HostBuffer {
        HostBuffer {
            size,
            targets: BufferTargets::TRANSFER_SRC | BufferTargets::TRANSFER_DST,
            name: 1,
        }
    }

    fn texture(format: PixelFormat, size: u32) -> TextureInfo {
        TextureInfo::new_2d(format, UVec2::splat(size))
            .with_usage(ImageUsageFlags::TRANSFER_SRC | ImageUsageFlags::TRANSFER_DST)
            .with_full_mip_chain()
    }

    #[test]
    fn buffer_copies_stay_inside_both_buffers() {
        let src = staging(64);
        let dst = HostBuffer {
            size: 32,
            targets: BufferTargets::TRANSFER_DST | BufferTargets::VERTEX_BUFFER,
            name: 2,
        };
        assert!(check_buffer_copy(&src, &dst, &[BufferCopy::new(32, 0, 32)]).is_ok());
        assert!(check_buffer_copy(&src, &dst, &[BufferCopy::new(0, 16, 32)]).is_err());
        assert!(check_buffer_copy(&src, &dst, &[BufferCopy::new(0, 0, 0)]).is_err());
        assert!(check_buffer_copy(&src, &dst, &[]).is_err());
        assert!(check_buffer_copy(&dst, &src, &[BufferCopy::new(0, 0, 4)]).is_err());
    }

    #[test]
    fn copies_inside_one_buffer_must_not_overlap() {
        let buffer = staging(64);
        assert!(check_buffer_copy(&buffer, &buffer, &[BufferCopy::new(0, 32, 32)]).is_ok());
        let error = check_buffer_copy(&buffer, &buffer, &[BufferCopy::new(0, 16, 32)]).unwrap_err();
        assert!(error.to_string().contains("overlaps"));
    }

    #[test]
    fn footprints_follow_pitches_and_blocks() {
        let info = texture(PixelFormat::R8G8B8A8, 16);
        let whole = BufferImageCopy::whole_level(&info, 0, 0);
        assert_eq!(buffer_footprint(info.format, &whole).unwrap(), 16 * 16 * 4);

        let padded = BufferImageCopy {
            buffer_row_length: 32,
            image_extent: UVec3::new(8, 2, 1),
            ..whole
        };
        assert_eq!(buffer_footprint(info.format, &padded).unwrap(), (32 + 8) * 4);

        let compressed = texture(PixelFormat::Bc1Rgba, 16);
        let region = BufferImageCopy::whole_level(&compressed, 0, 0);
        assert_eq!(buffer_footprint(compressed.format, &region).unwrap(), 4 * 4 * 8);
        let tail = BufferImageCopy::whole_level(&compressed, 4, 0);
        assert_eq!(tail.image_extent, UVec3::ONE);
        assert_eq!(buffer_footprint(compressed.format, &tail).unwrap(), 8);
    }

    #[test]
    fn layers_add_whole_slices() {
        let info = TextureInfo::new_2d_array(PixelFormat::R8, UVec2::new(4, 4), 3)
            .with_usage(ImageUsageFlags::TRANSFER_DST);
        let region = BufferImageCopy::whole_level(&info, 0, 0);
        assert_eq!(region.subresource.layer_count, 3);
        assert_eq!(buffer_footprint(info.format, &region).unwrap(), 48);
    }

    #[test]
    fn buffer_to_image_copies_are_checked() {
        let info = texture(PixelFormat::R8G8B8A8, 16);
        let region = BufferImageCopy::whole_level(&info, 1, 0);
        let layout = ImageLayout::TransferDstOptimal;

        assert!(check_buffer_image_copy(&staging(256), &info, layout, &[region]).is_ok());
        assert!(check_buffer_image_copy(&staging(255), &info, layout, &[region]).is_err());
        assert!(check_buffer_image_copy(
            &staging(256),
            &info,
            ImageLayout::ShaderReadOnlyOptimal,
            &[region]
        )
        .is_err());

        let outside = BufferImageCopy {
            image_offset: IVec3::new(4, 0, 0),
            ..region
        };
        assert!(check_buffer_image_copy(&staging(1024), &info, layout, &[outside]).is_err());

        let misaligned = BufferImageCopy {
            buffer_offset: 2,
            ..region
        };
        assert!(check_buffer_image_copy(&staging(1024), &info, layout, &[misaligned]).is_err());

        let sampled_only = info.clone().with_usage(ImageUsageFlags::SAMPLED);
        assert!(check_buffer_image_copy(&staging(256), &sampled_only, layout, &[region]).is_err());
    }

    #[test]
    fn depth_stencil_copies_take_one_aspect() {
        let info = texture(PixelFormat::D24S8, 8);
        let mut region = BufferImageCopy::whole_level(&info, 0, 0);
        let layout = ImageLayout::TransferDstOptimal;
        assert_eq!(region.subresource.aspect_mask, ImageAspectFlags::DEPTH);
        assert!(check_buffer_image_copy(&staging(256), &info, layout, &[region]).is_ok());

        region.subresource.aspect_mask = ImageAspectFlags::DEPTH | ImageAspectFlags::STENCIL;
        assert!(check_buffer_image_copy(&staging(256), &info, layout, &[region]).is_err());
        region.subresource.aspect_mask = ImageAspectFlags::COLOUR;
        assert!(check_buffer_image_copy(&staging(256), &info, layout, &[region]).is_err());
    }

    #[test]
    fn compressed_regions_sit_on_block_edges() {
        let info = texture(PixelFormat::Bc3Rgba, 16);
        let layout = ImageLayout::TransferDstOptimal;
        let whole = BufferImageCopy::whole_level(&info, 0, 0);
        let quarter = BufferImageCopy {
            image_offset: IVec3::new(8, 8, 0),
            image_extent: UVec3::new(8, 8, 1),
            ..whole
        };
        assert!(check_buffer_image_copy(&staging(4096), &info, layout, &[quarter]).is_ok());

        let unaligned = BufferImageCopy {
            image_offset: IVec3::new(2, 0, 0),
            image_extent: UVec3::new(4, 4, 1),
            ..whole
        };
        assert!(check_buffer_image_copy(&staging(4096), &info, layout, &[unaligned]).is_err());
    }

    #[test]
    fn blits_are_checked() {
        let src = texture(PixelFormat::R8G8B8A8, 16);
        let dst = texture(PixelFormat::R8G8B8A8Srgb, 16);
        let region = ImageBlit {
            src_subresource: ImageSubresourceLayers::all_layers(&src, 0),
            src_offset: IVec3::ZERO,
            src_extent: UVec3::new(16, 16, 1),
            dst_subresource: ImageSubresourceLayers::all_layers(&dst, 1),
            dst_offset: IVec3::ZERO,
            dst_extent: UVec3::new(8, 8, 1),
        };
        let (src_layout, dst_layout) = (ImageLayout::TransferSrcOptimal, ImageLayout::TransferDstOptimal);
        assert!(check_blit(&src, src_layout, &dst, dst_layout, &[region], Filter::Linear).is_ok());
        assert_eq!(region.dst_corners()[1], IVec3::new(8, 8, 1));

        let too_big = ImageBlit {
            dst_extent: UVec3::new(16, 16, 1),
            ..region
        };
        assert!(check_blit(&src, src_layout, &dst, dst_layout, &[too_big], Filter::Linear).is_err());
        assert!(check_blit(&src, dst_layout, &dst, dst_layout, &[region], Filter::Linear).is_err());

        let depth = texture(PixelFormat::D32F, 16);
        let depth_region = ImageBlit {
            src_subresource: ImageSubresourceLayers::all_layers(&depth, 0),
            dst_subresource: ImageSubresourceLayers::all_layers(&depth, 0),
            dst_extent: UVec3::new(16, 16, 1),
            ..region
        };
        assert!(check_blit(&depth, src_layout, &depth, dst_layout, &[depth_region], Filter::Linear).is_err());
        assert!(check_blit(&depth, src_layout, &depth, dst_layout, &[depth_region], Filter::Nearest).is_ok());
    }

    #[test]
    fn transitions_take_the_accesses_of_their_layouts() {
        assert_eq!(
            layout_access(ImageLayout::TransferDstOptimal),
            (AccessFlags::TRANSFER_WRITE, PipelineStageFlags::TRANSFER)
        );
        assert_eq!(layout_access(ImageLayout::Undefined).0, AccessFlags::empty());
        assert!(check_barrier_stages(PipelineStageFlags::TRANSFER, PipelineStageFlags::empty()).is_err());
    }
}
