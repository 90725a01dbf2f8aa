// Transfer commands as GL calls
//
// Uploads read from a buffer bound to GL_PIXEL_UNPACK_BUFFER. Blits attach one layer at a time to
// a pair of device-owned framebuffers. GL keeps commands of one context in order, so barriers
// only matter after shader writes and layout changes record nothing.

use glam::{IVec3, UVec3};

use super::call::GlCall;
use super::consts as gl;
use super::convert;
use crate::enums::{Filter, TextureType};
use crate::error::{Error, Result};
use crate::flags::{AccessFlags, ImageAspectFlags};
use crate::resource::{Texture, TextureInfo};
use crate::transfer::{self, BufferCopy, BufferImageCopy, ImageBlit, ImageSubresourceLayers};

/// GL name of a texture with storage.
pub fn texture_name(texture: &dyn Texture) -> Result<u32> {
    texture
        .native()
        .ok_or_else(|| Error::precondition("Texture has no image yet"))?
        .gl("texture")
}

pub fn buffer_copies(read: u32, write: u32, regions: &[BufferCopy]) -> Vec<GlCall> {
    regions
        .iter()
        .map(|region| GlCall::CopyNamedBufferSubData {
            read,
            write,
            read_offset: region.src_offset,
            write_offset: region.dst_offset,
            size: region.size,
        })
        .collect()
}

/// Origin and size of a region in the coordinates of the texture's GL target, where array layers
/// take the coordinate after the last texel axis.
fn target_box(
    texture_type: TextureType,
    layers: &ImageSubresourceLayers,
    offset: IVec3,
    extent: UVec3,
) -> ([i32; 3], [i32; 3]) {
    let base = layers.base_array_layer as i32;
    let count = layers.layer_count as i32;
    let size = extent.as_ivec3();
    match texture_type {
        TextureType::E1D => ([offset.x, 0, 0], [size.x, 1, 1]),
        TextureType::E1DArray => ([offset.x, base, 0], [size.x, count, 1]),
        TextureType::E2D => ([offset.x, offset.y, 0], [size.x, size.y, 1]),
        TextureType::E3D => (offset.to_array(), size.to_array()),
        TextureType::E2DArray | TextureType::Cube | TextureType::CubeArray => {
            ([offset.x, offset.y, base], [size.x, size.y, count])
        }
    }
}

fn dimensions(texture_type: TextureType) -> u32 {
    match texture_type {
        TextureType::E1D => 1,
        TextureType::E2D | TextureType::E1DArray => 2,
        TextureType::E3D | TextureType::E2DArray | TextureType::Cube | TextureType::CubeArray => 3,
    }
}

fn sub_image(
    texture: u32,
    info: &TextureInfo,
    region: &BufferImageCopy,
    format: u32,
    ty: u32,
) -> GlCall {
    let level = region.subresource.mip_level as i32;
    let offset = region.buffer_offset;
    let ([x, y, z], [width, height, depth]) = target_box(
        info.texture_type,
        &region.subresource,
        region.image_offset,
        region.image_extent,
    );
    match dimensions(info.texture_type) {
        1 => GlCall::TextureSubImage1D { texture, level, x, width, format, ty, offset },
        2 => GlCall::TextureSubImage2D { texture, level, x, y, width, height, format, ty, offset },
        _ => GlCall::TextureSubImage3D {
            texture,
            level,
            x,
            y,
            z,
            width,
            height,
            depth,
            format,
            ty,
            offset,
        },
    }
}

fn compressed_sub_image(texture: u32, info: &TextureInfo, region: &BufferImageCopy) -> Result<GlCall> {
    if region.buffer_row_length != 0 && region.buffer_row_length != region.image_extent.x
        || region.buffer_image_height != 0 && region.buffer_image_height != region.image_extent.y
    {
        return Err(Error::Unsupported(
            "GL reads compressed uploads tightly packed".to_string(),
        ));
    }
    let format = convert::internal_format(info.format)?;
    let size = transfer::buffer_footprint(info.format, region)?;
    let size = i32::try_from(size)
        .map_err(|_| Error::precondition(format!("Compressed upload of {size} bytes is too large")))?;
    let level = region.subresource.mip_level as i32;
    let offset = region.buffer_offset;
    let ([x, y, z], [width, height, depth]) = target_box(
        info.texture_type,
        &region.subresource,
        region.image_offset,
        region.image_extent,
    );
    match dimensions(info.texture_type) {
        1 => Err(Error::Unsupported(
            "Compressed one-dimensional textures".to_string(),
        )),
        2 => Ok(GlCall::CompressedTextureSubImage2D {
            texture,
            level,
            x,
            y,
            width,
            height,
            format,
            size,
            offset,
        }),
        _ => Ok(GlCall::CompressedTextureSubImage3D {
            texture,
            level,
            x,
            y,
            z,
            width,
            height,
            depth,
            format,
            size,
            offset,
        }),
    }
}

/// Calls uploading `regions` of `buffer` into `texture`. The unpack state is restored after.
pub fn buffer_image_copies(
    buffer: u32,
    texture: u32,
    info: &TextureInfo,
    regions: &[BufferImageCopy],
) -> Result<Vec<GlCall>> {
    if info.format.is_depth_stencil_format() {
        return Err(Error::Unsupported(format!(
            "GL uploads both aspects of {:?} together",
            info.format
        )));
    }
    let mut calls = vec![
        GlCall::BindBuffer { target: gl::PIXEL_UNPACK_BUFFER, buffer },
        GlCall::PixelStorei { pname: gl::UNPACK_ALIGNMENT, value: 1 },
    ];
    if info.format.is_compressed_format() {
        for region in regions {
            calls.push(compressed_sub_image(texture, info, region)?);
        }
    } else {
        let (format, ty) = convert::pixel_transfer(info.format)?;
        for region in regions {
            calls.push(GlCall::PixelStorei {
                pname: gl::UNPACK_ROW_LENGTH,
                value: region.buffer_row_length as i32,
            });
            calls.push(GlCall::PixelStorei {
                pname: gl::UNPACK_IMAGE_HEIGHT,
                value: region.buffer_image_height as i32,
            });
            calls.push(sub_image(texture, info, region, format, ty));
        }
        calls.push(GlCall::PixelStorei { pname: gl::UNPACK_ROW_LENGTH, value: 0 });
        calls.push(GlCall::PixelStorei { pname: gl::UNPACK_IMAGE_HEIGHT, value: 0 });
    }
    calls.push(GlCall::PixelStorei { pname: gl::UNPACK_ALIGNMENT, value: 4 });
    calls.push(GlCall::BindBuffer { target: gl::PIXEL_UNPACK_BUFFER, buffer: 0 });
    Ok(calls)
}

fn blit_mask(aspects: ImageAspectFlags) -> u32 {
    let mut mask = 0;
    if aspects.contains(ImageAspectFlags::COLOUR) {
        mask |= gl::COLOR_BUFFER_BIT;
    }
    if aspects.contains(ImageAspectFlags::DEPTH) {
        mask |= gl::DEPTH_BUFFER_BIT;
    }
    if aspects.contains(ImageAspectFlags::STENCIL) {
        mask |= gl::STENCIL_BUFFER_BIT;
    }
    mask
}

fn attach(framebuffer: u32, texture: u32, info: &TextureInfo, level: u32, layer: u32) -> GlCall {
    let attachment = convert::attachment_point(info.format, 0);
    let level = level as i32;
    match info.texture_type {
        TextureType::E1D | TextureType::E2D => GlCall::NamedFramebufferTexture {
            framebuffer,
            attachment,
            texture,
            level,
        },
        _ => GlCall::NamedFramebufferTextureLayer {
            framebuffer,
            attachment,
            texture,
            level,
            layer: layer as i32,
        },
    }
}

fn rectangle([start, end]: [IVec3; 2]) -> [i32; 4] {
    [start.x, start.y, end.x, end.y]
}

/// Slices a blit region walks: depth slices of 3D textures, array layers otherwise.
fn blit_slices(info: &TextureInfo, layers: &ImageSubresourceLayers, offset: IVec3, extent: UVec3) -> (u32, u32) {
    if info.texture_type == TextureType::E3D {
        (offset.z as u32, extent.z)
    } else {
        (layers.base_array_layer, layers.layer_count)
    }
}

/// A blit source or destination: GL name and storage.
pub type BlitTexture<'a> = (u32, &'a TextureInfo);

/// Calls blitting `regions` from `src` to `dst` through the `read` and `draw` framebuffers.
/// Scissoring is off for the blits and both framebuffers are left empty.
pub fn blits(
    (read, draw): (u32, u32),
    (src, src_info): BlitTexture<'_>,
    (dst, dst_info): BlitTexture<'_>,
    regions: &[ImageBlit],
    filter: Filter,
) -> Result<Vec<GlCall>> {
    let mut calls = vec![GlCall::Disable(gl::SCISSOR_TEST)];
    for region in regions {
        let (src_first, src_count) =
            blit_slices(src_info, &region.src_subresource, region.src_offset, region.src_extent);
        let (dst_first, dst_count) =
            blit_slices(dst_info, &region.dst_subresource, region.dst_offset, region.dst_extent);
        if src_count != dst_count {
            return Err(Error::Unsupported(
                "GL blits cannot scale along depth".to_string(),
            ));
        }
        let mask = blit_mask(region.src_subresource.aspect_mask);
        let gl_filter = if mask == gl::COLOR_BUFFER_BIT {
            convert::mag_filter(filter) as u32
        } else {
            gl::NEAREST
        };

        for slice in 0..src_count {
            calls.push(attach(read, src, src_info, region.src_subresource.mip_level, src_first + slice));
            calls.push(attach(draw, dst, dst_info, region.dst_subresource.mip_level, dst_first + slice));
            if mask == gl::COLOR_BUFFER_BIT {
                calls.push(GlCall::NamedFramebufferReadBuffer {
                    framebuffer: read,
                    buffer: gl::COLOR_ATTACHMENT0,
                });
                calls.push(GlCall::NamedFramebufferDrawBuffers {
                    framebuffer: draw,
                    buffers: vec![gl::COLOR_ATTACHMENT0],
                });
            }
            calls.push(GlCall::BlitNamedFramebuffer {
                read,
                draw,
                src: rectangle(region.src_corners()),
                dst: rectangle(region.dst_corners()),
                mask,
                filter: gl_filter,
            });
        }
    }

    for (framebuffer, info) in [(read, src_info), (draw, dst_info)] {
        calls.push(GlCall::NamedFramebufferTexture {
            framebuffer,
            attachment: convert::attachment_point(info.format, 0),
            texture: 0,
            level: 0,
        });
    }
    calls.push(GlCall::Enable(gl::SCISSOR_TEST));
    Ok(calls)
}

/// Orders `dst_access` after `src_access`. Only writes from shaders need a call.
pub fn barrier(src_access: AccessFlags, dst_access: AccessFlags) -> Option<GlCall> {
    if !src_access.intersects(AccessFlags::SHADER_WRITE | AccessFlags::MEMORY_WRITE) {
        return None;
    }
    let bits = convert::barrier_bits(dst_access);
    (bits != 0).then_some(GlCall::MemoryBarrier(bits))
}

#[cfg(test)]
mod tests {
    use glam::UVec2;

    use super::*;
    use crate::enums::PixelFormat;
    use crate::flags::ImageUsageFlags;

    fn names(calls: &[GlCall]) -> Vec<&'static str> {
        calls.iter().map(GlCall::name).collect()
    }

    #[test]
    fn uploads_bind_the_buffer_and_restore_unpacking() {
        let info = TextureInfo::new_2d(PixelFormat::R8G8B8A8, UVec2::new(32, 16))
            .with_usage(ImageUsageFlags::TRANSFER_DST);
        let region = BufferImageCopy {
            buffer_row_length: 64,
            ..BufferImageCopy::whole_level(&info, 0, 256)
        };
        let calls = buffer_image_copies(3, 9, &info, &[region]).unwrap();

        assert_eq!(calls[0], GlCall::BindBuffer { target: gl::PIXEL_UNPACK_BUFFER, buffer: 3 });
        assert!(calls.contains(&GlCall::PixelStorei { pname: gl::UNPACK_ROW_LENGTH, value: 64 }));
        assert!(calls.contains(&GlCall::TextureSubImage2D {
            texture: 9,
            level: 0,
            x: 0,
            y: 0,
            width: 32,
            height: 16,
            format: gl::RGBA,
            ty: gl::UNSIGNED_BYTE,
            offset: 256,
        }));
        assert_eq!(
            calls[calls.len() - 4..],
            [
                GlCall::PixelStorei { pname: gl::UNPACK_ROW_LENGTH, value: 0 },
                GlCall::PixelStorei { pname: gl::UNPACK_IMAGE_HEIGHT, value: 0 },
                GlCall::PixelStorei { pname: gl::UNPACK_ALIGNMENT, value: 4 },
                GlCall::BindBuffer { target: gl::PIXEL_UNPACK_BUFFER, buffer: 0 },
            ]
        );
    }

    #[test]
    fn array_layers_follow_the_texel_axes() {
        let info = TextureInfo::new_2d_array(PixelFormat::R8, UVec2::new(8, 8), 6)
            .with_usage(ImageUsageFlags::TRANSFER_DST);
        let mut region = BufferImageCopy::whole_level(&info, 0, 0);
        region.subresource.base_array_layer = 2;
        region.subresource.layer_count = 3;
        let calls = buffer_image_copies(1, 2, &info, &[region]).unwrap();
        let upload = calls
            .iter()
            .find(|call| matches!(call, GlCall::TextureSubImage3D { .. }))
            .unwrap();
        assert!(matches!(
            upload,
            GlCall::TextureSubImage3D { z: 2, depth: 3, width: 8, height: 8, .. }
        ));
    }

    #[test]
    fn compressed_uploads_carry_their_size() {
        let info = TextureInfo::new_2d(PixelFormat::Bc1Rgba, UVec2::splat(8))
            .with_usage(ImageUsageFlags::TRANSFER_DST);
        let region = BufferImageCopy::whole_level(&info, 0, 0);
        let calls = buffer_image_copies(1, 2, &info, &[region]).unwrap();
        assert!(calls
            .iter()
            .any(|call| matches!(call, GlCall::CompressedTextureSubImage2D { size: 32, .. })));
        assert!(!names(&calls).contains(&"glTextureSubImage2D"));

        let padded = BufferImageCopy {
            buffer_row_length: 16,
            ..region
        };
        assert!(matches!(
            buffer_image_copies(1, 2, &info, &[padded]),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn blits_attach_each_layer_and_leave_framebuffers_empty() {
        let info = TextureInfo::new_2d_array(PixelFormat::R8G8B8A8, UVec2::splat(16), 2)
            .with_usage(ImageUsageFlags::TRANSFER_SRC | ImageUsageFlags::TRANSFER_DST)
            .with_full_mip_chain();
        let region = ImageBlit {
            src_subresource: ImageSubresourceLayers::all_layers(&info, 0),
            src_offset: IVec3::ZERO,
            src_extent: UVec3::new(16, 16, 1),
            dst_subresource: ImageSubresourceLayers::all_layers(&info, 1),
            dst_offset: IVec3::ZERO,
            dst_extent: UVec3::new(8, 8, 1),
        };
        let calls = blits((10, 11), (4, &info), (4, &info), &[region], Filter::Linear).unwrap();

        let blit_calls: Vec<_> = calls
            .iter()
            .filter(|call| matches!(call, GlCall::BlitNamedFramebuffer { .. }))
            .collect();
        assert_eq!(blit_calls.len(), 2);
        assert_eq!(
            *blit_calls[0],
            GlCall::BlitNamedFramebuffer {
                read: 10,
                draw: 11,
                src: [0, 0, 16, 16],
                dst: [0, 0, 8, 8],
                mask: gl::COLOR_BUFFER_BIT,
                filter: gl::LINEAR,
            }
        );
        assert!(calls.contains(&GlCall::NamedFramebufferTextureLayer {
            framebuffer: 11,
            attachment: gl::COLOR_ATTACHMENT0,
            texture: 4,
            level: 1,
            layer: 1,
        }));
        assert_eq!(calls[0], GlCall::Disable(gl::SCISSOR_TEST));
        assert_eq!(calls[calls.len() - 1], GlCall::Enable(gl::SCISSOR_TEST));
        assert!(calls.contains(&GlCall::NamedFramebufferTexture {
            framebuffer: 10,
            attachment: gl::COLOR_ATTACHMENT0,
            texture: 0,
            level: 0,
        }));
    }

    #[test]
    fn depth_blits_filter_nearest() {
        let info = TextureInfo::new_2d(PixelFormat::D32F, UVec2::splat(8))
            .with_usage(ImageUsageFlags::TRANSFER_SRC | ImageUsageFlags::TRANSFER_DST);
        let layers = ImageSubresourceLayers::all_layers(&info, 0);
        let region = ImageBlit {
            src_subresource: layers,
            src_offset: IVec3::ZERO,
            src_extent: UVec3::new(8, 8, 1),
            dst_subresource: layers,
            dst_offset: IVec3::ZERO,
            dst_extent: UVec3::new(8, 8, 1),
        };
        let calls = blits((1, 2), (3, &info), (4, &info), &[region], Filter::Nearest).unwrap();
        assert!(calls.iter().any(|call| matches!(
            call,
            GlCall::BlitNamedFramebuffer { mask: gl::DEPTH_BUFFER_BIT, filter: gl::NEAREST, .. }
        )));
        assert!(!names(&calls).contains(&"glNamedFramebufferReadBuffer"));
    }

    #[test]
    fn only_shader_writes_need_a_barrier() {
        assert_eq!(barrier(AccessFlags::TRANSFER_WRITE, AccessFlags::SHADER_READ), None);
        assert_eq!(
            barrier(AccessFlags::SHADER_WRITE, AccessFlags::VERTEX_ATTRIBUTE_READ),
            Some(GlCall::MemoryBarrier(gl::VERTEX_ATTRIB_ARRAY_BARRIER_BIT))
        );
        assert_eq!(barrier(AccessFlags::SHADER_WRITE, AccessFlags::empty()), None);
    }
}
