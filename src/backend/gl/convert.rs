// Backend-neutral enums to GL enumerants

use super::consts as gl;
use crate::enums::{
    AttributeFormat, BlendFactor, BlendOp, CompareOp, Filter, FrontFace, IndexType, LogicOp,
    MipmapMode, PixelFormat, PolygonMode, PrimitiveTopology, QueryType, StencilOp, TextureType,
    WrapMode,
};
use crate::error::{Error, Result};
use crate::flags::{AccessFlags, CullModeFlags, SampleCountFlag, ShaderStageFlags};

pub fn compare_op(op: CompareOp) -> u32 {
    match op {
        CompareOp::Never => gl::NEVER,
        CompareOp::Less => gl::LESS,
        CompareOp::Equal => gl::EQUAL,
        CompareOp::LessEqual => gl::LEQUAL,
        CompareOp::Greater => gl::GREATER,
        CompareOp::NotEqual => gl::NOTEQUAL,
        CompareOp::GreaterEqual => gl::GEQUAL,
        CompareOp::Always => gl::ALWAYS,
    }
}

pub fn blend_factor(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => gl::ZERO,
        BlendFactor::One => gl::ONE,
        BlendFactor::SrcColour => gl::SRC_COLOR,
        BlendFactor::InvSrcColour => gl::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColour => gl::DST_COLOR,
        BlendFactor::InvDstColour => gl::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => gl::SRC_ALPHA,
        BlendFactor::InvSrcAlpha => gl::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => gl::DST_ALPHA,
        BlendFactor::InvDstAlpha => gl::ONE_MINUS_DST_ALPHA,
        BlendFactor::ConstantColour => gl::CONSTANT_COLOR,
        BlendFactor::InvConstantColour => gl::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::ConstantAlpha => gl::CONSTANT_ALPHA,
        BlendFactor::InvConstantAlpha => gl::ONE_MINUS_CONSTANT_ALPHA,
        BlendFactor::SrcAlphaSaturate => gl::SRC_ALPHA_SATURATE,
        BlendFactor::Src1Colour => gl::SRC1_COLOR,
        BlendFactor::InvSrc1Colour => gl::ONE_MINUS_SRC1_COLOR,
        BlendFactor::Src1Alpha => gl::SRC1_ALPHA,
        BlendFactor::InvSrc1Alpha => gl::ONE_MINUS_SRC1_ALPHA,
    }
}

pub fn blend_op(op: BlendOp) -> u32 {
    match op {
        BlendOp::Add => gl::FUNC_ADD,
        BlendOp::Subtract => gl::FUNC_SUBTRACT,
        BlendOp::ReverseSubtract => gl::FUNC_REVERSE_SUBTRACT,
        BlendOp::Min => gl::MIN,
        BlendOp::Max => gl::MAX,
    }
}

pub fn logic_op(op: LogicOp) -> u32 {
    match op {
        LogicOp::Clear => gl::CLEAR,
        LogicOp::And => gl::AND,
        LogicOp::AndReverse => gl::AND_REVERSE,
        LogicOp::Copy => gl::COPY,
        LogicOp::AndInverted => gl::AND_INVERTED,
        LogicOp::NoOp => gl::NOOP,
        LogicOp::Xor => gl::XOR,
        LogicOp::Or => gl::OR,
        LogicOp::Nor => gl::NOR,
        LogicOp::Equivalent => gl::EQUIV,
        LogicOp::Invert => gl::INVERT,
        LogicOp::OrReverse => gl::OR_REVERSE,
        LogicOp::CopyInverted => gl::COPY_INVERTED,
        LogicOp::OrInverted => gl::OR_INVERTED,
        LogicOp::Nand => gl::NAND,
        LogicOp::Set => gl::SET,
    }
}

pub fn stencil_op(op: StencilOp) -> u32 {
    match op {
        StencilOp::Keep => gl::KEEP,
        StencilOp::Zero => gl::ZERO,
        StencilOp::Replace => gl::REPLACE,
        StencilOp::IncrementAndClamp => gl::INCR,
        StencilOp::DecrementAndClamp => gl::DECR,
        StencilOp::Invert => gl::INVERT,
        StencilOp::IncrementAndWrap => gl::INCR_WRAP,
        StencilOp::DecrementAndWrap => gl::DECR_WRAP,
    }
}

pub fn polygon_mode(mode: PolygonMode) -> u32 {
    match mode {
        PolygonMode::Fill => gl::FILL,
        PolygonMode::Line => gl::LINE,
        PolygonMode::Point => gl::POINT,
    }
}

/// The face to cull, `None` when culling is off.
pub fn cull_face(mode: CullModeFlags) -> Option<u32> {
    if mode == CullModeFlags::FRONT_AND_BACK {
        Some(gl::FRONT_AND_BACK)
    } else if mode == CullModeFlags::FRONT {
        Some(gl::FRONT)
    } else if mode == CullModeFlags::BACK {
        Some(gl::BACK)
    } else {
        None
    }
}

pub fn front_face(face: FrontFace) -> u32 {
    match face {
        FrontFace::CounterClockwise => gl::CCW,
        FrontFace::Clockwise => gl::CW,
    }
}

pub fn primitive_mode(topology: PrimitiveTopology) -> u32 {
    match topology {
        PrimitiveTopology::PointList => gl::POINTS,
        PrimitiveTopology::LineList => gl::LINES,
        PrimitiveTopology::LineStrip => gl::LINE_STRIP,
        PrimitiveTopology::TriangleList => gl::TRIANGLES,
        PrimitiveTopology::TriangleStrip => gl::TRIANGLE_STRIP,
        PrimitiveTopology::TriangleFan => gl::TRIANGLE_FAN,
        PrimitiveTopology::LineListWithAdjacency => gl::LINES_ADJACENCY,
        PrimitiveTopology::LineStripWithAdjacency => gl::LINE_STRIP_ADJACENCY,
        PrimitiveTopology::TriangleListWithAdjacency => gl::TRIANGLES_ADJACENCY,
        PrimitiveTopology::TriangleStripWithAdjacency => gl::TRIANGLE_STRIP_ADJACENCY,
        PrimitiveTopology::PatchList => gl::PATCHES,
    }
}

pub fn wrap_mode(mode: WrapMode) -> i32 {
    let value = match mode {
        WrapMode::Repeat => gl::REPEAT,
        WrapMode::MirroredRepeat => gl::MIRRORED_REPEAT,
        WrapMode::ClampToEdge => gl::CLAMP_TO_EDGE,
        WrapMode::ClampToBorder => gl::CLAMP_TO_BORDER,
        WrapMode::MirrorClampToEdge => gl::MIRROR_CLAMP_TO_EDGE,
    };
    value as i32
}

pub fn mag_filter(filter: Filter) -> i32 {
    let value = match filter {
        Filter::Nearest => gl::NEAREST,
        Filter::Linear => gl::LINEAR,
    };
    value as i32
}

/// GL folds the mip mode into the minification filter.
pub fn min_filter(filter: Filter, mip: MipmapMode) -> i32 {
    let value = match (filter, mip) {
        (Filter::Nearest, MipmapMode::None) => gl::NEAREST,
        (Filter::Linear, MipmapMode::None) => gl::LINEAR,
        (Filter::Nearest, MipmapMode::Nearest) => gl::NEAREST_MIPMAP_NEAREST,
        (Filter::Linear, MipmapMode::Nearest) => gl::LINEAR_MIPMAP_NEAREST,
        (Filter::Nearest, MipmapMode::Linear) => gl::NEAREST_MIPMAP_LINEAR,
        (Filter::Linear, MipmapMode::Linear) => gl::LINEAR_MIPMAP_LINEAR,
    };
    value as i32
}

/// Sized internal format.
pub fn internal_format(format: PixelFormat) -> Result<u32> {
    let value = match format {
        PixelFormat::Undefined => {
            return Err(Error::precondition("Undefined pixel format has no GL equivalent"))
        }
        PixelFormat::R8 => gl::R8,
        PixelFormat::R8G8 => gl::RG8,
        PixelFormat::R8G8B8 => gl::RGB8,
        PixelFormat::R8G8B8A8 | PixelFormat::B8G8R8A8 => gl::RGBA8,
        PixelFormat::R8G8B8A8Srgb | PixelFormat::B8G8R8A8Srgb => gl::SRGB8_ALPHA8,
        PixelFormat::R16F => gl::R16F,
        PixelFormat::R16G16F => gl::RG16F,
        PixelFormat::R16G16B16A16F => gl::RGBA16F,
        PixelFormat::R32F => gl::R32F,
        PixelFormat::R32G32F => gl::RG32F,
        PixelFormat::R32G32B32F => gl::RGB32F,
        PixelFormat::R32G32B32A32F => gl::RGBA32F,
        PixelFormat::R32UI => gl::R32UI,
        PixelFormat::D16 => gl::DEPTH_COMPONENT16,
        PixelFormat::D24S8 => gl::DEPTH24_STENCIL8,
        PixelFormat::D32F => gl::DEPTH_COMPONENT32F,
        PixelFormat::D32FS8 => gl::DEPTH32F_STENCIL8,
        PixelFormat::S8 => gl::STENCIL_INDEX8,
        PixelFormat::Bc1Rgb => gl::COMPRESSED_RGB_S3TC_DXT1_EXT,
        PixelFormat::Bc1Rgba => gl::COMPRESSED_RGBA_S3TC_DXT1_EXT,
        PixelFormat::Bc2Rgba => gl::COMPRESSED_RGBA_S3TC_DXT3_EXT,
        PixelFormat::Bc3Rgba => gl::COMPRESSED_RGBA_S3TC_DXT5_EXT,
    };
    Ok(value)
}

/// Client format and component type of uploaded texel data. Compressed formats have none.
pub fn pixel_transfer(format: PixelFormat) -> Result<(u32, u32)> {
    let pair = match format {
        PixelFormat::R8 => (gl::RED, gl::UNSIGNED_BYTE),
        PixelFormat::R8G8 => (gl::RG, gl::UNSIGNED_BYTE),
        PixelFormat::R8G8B8 => (gl::RGB, gl::UNSIGNED_BYTE),
        PixelFormat::R8G8B8A8 | PixelFormat::R8G8B8A8Srgb => (gl::RGBA, gl::UNSIGNED_BYTE),
        PixelFormat::B8G8R8A8 | PixelFormat::B8G8R8A8Srgb => (gl::BGRA, gl::UNSIGNED_BYTE),
        PixelFormat::R16F => (gl::RED, gl::HALF_FLOAT),
        PixelFormat::R16G16F => (gl::RG, gl::HALF_FLOAT),
        PixelFormat::R16G16B16A16F => (gl::RGBA, gl::HALF_FLOAT),
        PixelFormat::R32F => (gl::RED, gl::FLOAT),
        PixelFormat::R32G32F => (gl::RG, gl::FLOAT),
        PixelFormat::R32G32B32F => (gl::RGB, gl::FLOAT),
        PixelFormat::R32G32B32A32F => (gl::RGBA, gl::FLOAT),
        PixelFormat::R32UI => (gl::RED_INTEGER, gl::UNSIGNED_INT),
        PixelFormat::D16 => (gl::DEPTH_COMPONENT, gl::UNSIGNED_SHORT),
        PixelFormat::D24S8 => (gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8),
        PixelFormat::D32F => (gl::DEPTH_COMPONENT, gl::FLOAT),
        PixelFormat::D32FS8 => (gl::DEPTH_STENCIL, gl::FLOAT_32_UNSIGNED_INT_24_8_REV),
        PixelFormat::S8 => (gl::STENCIL_INDEX, gl::UNSIGNED_BYTE),
        PixelFormat::Undefined
        | PixelFormat::Bc1Rgb
        | PixelFormat::Bc1Rgba
        | PixelFormat::Bc2Rgba
        | PixelFormat::Bc3Rgba => {
            return Err(Error::precondition(format!(
                "{format:?} has no uncompressed pixel transfer"
            )))
        }
    };
    Ok(pair)
}

/// `glMemoryBarrier` bits covering reads and writes of the `access` kinds.
pub fn barrier_bits(access: AccessFlags) -> u32 {
    if access.intersects(AccessFlags::MEMORY_READ | AccessFlags::MEMORY_WRITE) {
        return gl::ALL_BARRIER_BITS;
    }
    let table = [
        (AccessFlags::INDIRECT_COMMAND_READ, gl::COMMAND_BARRIER_BIT),
        (AccessFlags::INDEX_READ, gl::ELEMENT_ARRAY_BARRIER_BIT),
        (AccessFlags::VERTEX_ATTRIBUTE_READ, gl::VERTEX_ATTRIB_ARRAY_BARRIER_BIT),
        (AccessFlags::UNIFORM_READ, gl::UNIFORM_BARRIER_BIT),
        (
            AccessFlags::SHADER_READ,
            gl::TEXTURE_FETCH_BARRIER_BIT
                | gl::SHADER_IMAGE_ACCESS_BARRIER_BIT
                | gl::SHADER_STORAGE_BARRIER_BIT,
        ),
        (
            AccessFlags::SHADER_WRITE,
            gl::SHADER_IMAGE_ACCESS_BARRIER_BIT | gl::SHADER_STORAGE_BARRIER_BIT,
        ),
        (
            AccessFlags::INPUT_ATTACHMENT_READ
                | AccessFlags::COLOUR_ATTACHMENT_READ
                | AccessFlags::COLOUR_ATTACHMENT_WRITE
                | AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ
                | AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            gl::FRAMEBUFFER_BARRIER_BIT,
        ),
        (
            AccessFlags::TRANSFER_READ | AccessFlags::TRANSFER_WRITE,
            gl::BUFFER_UPDATE_BARRIER_BIT
                | gl::TEXTURE_UPDATE_BARRIER_BIT
                | gl::PIXEL_BUFFER_BARRIER_BIT,
        ),
        (
            AccessFlags::HOST_READ | AccessFlags::HOST_WRITE,
            gl::CLIENT_MAPPED_BUFFER_BARRIER_BIT,
        ),
    ];
    table
        .iter()
        .filter(|(flags, _)| access.intersects(*flags))
        .fold(0, |bits, (_, bit)| bits | bit)
}

pub fn texture_target(texture_type: TextureType, samples: SampleCountFlag) -> u32 {
    let multisampled = samples != SampleCountFlag::E1;
    match texture_type {
        TextureType::E1D => gl::TEXTURE_1D,
        TextureType::E2D if multisampled => gl::TEXTURE_2D_MULTISAMPLE,
        TextureType::E2D => gl::TEXTURE_2D,
        TextureType::E3D => gl::TEXTURE_3D,
        TextureType::Cube => gl::TEXTURE_CUBE_MAP,
        TextureType::E1DArray => gl::TEXTURE_1D_ARRAY,
        TextureType::E2DArray if multisampled => gl::TEXTURE_2D_MULTISAMPLE_ARRAY,
        TextureType::E2DArray => gl::TEXTURE_2D_ARRAY,
        TextureType::CubeArray => gl::TEXTURE_CUBE_MAP_ARRAY,
    }
}

/// Component count, component type and whether the attribute reads integers.
pub fn attribute_format(format: AttributeFormat) -> (i32, u32, bool) {
    let (components, integer) = format.components();
    let ty = match format {
        AttributeFormat::Int | AttributeFormat::Vec2i | AttributeFormat::Vec3i | AttributeFormat::Vec4i => gl::INT,
        AttributeFormat::UInt => gl::UNSIGNED_INT,
        AttributeFormat::Colour => gl::UNSIGNED_BYTE,
        _ => gl::FLOAT,
    };
    (components as i32, ty, integer)
}

pub fn index_type(ty: IndexType) -> u32 {
    match ty {
        IndexType::UInt16 => gl::UNSIGNED_SHORT,
        IndexType::UInt32 => gl::UNSIGNED_INT,
    }
}

/// Shader object type and program pipeline stage bit of a single stage.
pub fn shader_stage(stage: ShaderStageFlags) -> Result<(u32, u32)> {
    let pair = if stage == ShaderStageFlags::VERTEX {
        (gl::VERTEX_SHADER, gl::VERTEX_SHADER_BIT)
    } else if stage == ShaderStageFlags::TESSELLATION_CONTROL {
        (gl::TESS_CONTROL_SHADER, gl::TESS_CONTROL_SHADER_BIT)
    } else if stage == ShaderStageFlags::TESSELLATION_EVALUATION {
        (gl::TESS_EVALUATION_SHADER, gl::TESS_EVALUATION_SHADER_BIT)
    } else if stage == ShaderStageFlags::GEOMETRY {
        (gl::GEOMETRY_SHADER, gl::GEOMETRY_SHADER_BIT)
    } else if stage == ShaderStageFlags::FRAGMENT {
        (gl::FRAGMENT_SHADER, gl::FRAGMENT_SHADER_BIT)
    } else if stage == ShaderStageFlags::COMPUTE {
        (gl::COMPUTE_SHADER, gl::COMPUTE_SHADER_BIT)
    } else {
        return Err(Error::precondition(format!(
            "Shader module stage {stage:?} is not a single stage"
        )));
    };
    Ok(pair)
}

pub fn query_target(query_type: QueryType) -> Result<u32> {
    match query_type {
        QueryType::Occlusion => Ok(gl::SAMPLES_PASSED),
        QueryType::Timestamp => Ok(gl::TIMESTAMP),
        QueryType::PipelineStatistics => Err(Error::Unsupported(
            "Pipeline statistics queries have no GL equivalent".to_string(),
        )),
    }
}

/// Framebuffer attachment point of a format, `colour_index` counting colour attachments only.
pub fn attachment_point(format: PixelFormat, colour_index: u32) -> u32 {
    if format.is_depth_stencil_format() {
        gl::DEPTH_STENCIL_ATTACHMENT
    } else if format.is_depth_format() {
        gl::DEPTH_ATTACHMENT
    } else if format.is_stencil_format() {
        gl::STENCIL_ATTACHMENT
    } else {
        gl::COLOR_ATTACHMENT0 + colour_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_mode_folds_into_min_filter() {
        assert_eq!(min_filter(Filter::Linear, MipmapMode::None), gl::LINEAR as i32);
        assert_eq!(
            min_filter(Filter::Linear, MipmapMode::Linear),
            gl::LINEAR_MIPMAP_LINEAR as i32
        );
        assert_eq!(
            min_filter(Filter::Nearest, MipmapMode::Linear),
            gl::NEAREST_MIPMAP_LINEAR as i32
        );
    }

    #[test]
    fn multisampled_targets() {
        assert_eq!(
            texture_target(TextureType::E2D, SampleCountFlag::E4),
            gl::TEXTURE_2D_MULTISAMPLE
        );
        assert_eq!(texture_target(TextureType::E2D, SampleCountFlag::E1), gl::TEXTURE_2D);
    }

    #[test]
    fn uploads_name_client_formats() {
        assert_eq!(
            pixel_transfer(PixelFormat::B8G8R8A8Srgb).unwrap(),
            (gl::BGRA, gl::UNSIGNED_BYTE)
        );
        assert_eq!(
            pixel_transfer(PixelFormat::D24S8).unwrap(),
            (gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8)
        );
        assert!(pixel_transfer(PixelFormat::Bc1Rgb).is_err());
    }

    #[test]
    fn barrier_bits_cover_the_reading_stages() {
        assert_eq!(
            barrier_bits(AccessFlags::VERTEX_ATTRIBUTE_READ | AccessFlags::INDEX_READ),
            gl::VERTEX_ATTRIB_ARRAY_BARRIER_BIT | gl::ELEMENT_ARRAY_BARRIER_BIT
        );
        assert_eq!(barrier_bits(AccessFlags::empty()), 0);
        assert_eq!(barrier_bits(AccessFlags::MEMORY_READ), gl::ALL_BARRIER_BITS);
    }

    #[test]
    fn culling_off_has_no_face() {
        assert_eq!(cull_face(CullModeFlags::NONE), None);
        assert_eq!(cull_face(CullModeFlags::BACK), Some(gl::BACK));
    }

    #[test]
    fn stages_map_to_shader_types() {
        assert_eq!(
            shader_stage(ShaderStageFlags::FRAGMENT).unwrap(),
            (gl::FRAGMENT_SHADER, gl::FRAGMENT_SHADER_BIT)
        );
        assert!(shader_stage(ShaderStageFlags::ALL_GRAPHICS).is_err());
    }
}
