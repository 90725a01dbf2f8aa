// Backend-neutral values to Vulkan and back
//
// Flag types share their bit values with Vulkan, so they convert with `from_raw`.

use ash::vk::{self, Handle};

use crate::core::{
    MemoryHeap, MemoryProperties, MemoryType, NativeHandle, PhysicalDevice,
    PhysicalDeviceFeatures, PhysicalDeviceLimits, QueueFamilyProperties,
};
use crate::enums::{
    AttachmentLoadOp, AttachmentStoreOp, AttributeFormat, BlendFactor, BlendOp, CompareOp,
    DescriptorType, Filter, FrontFace, ImageLayout, ImageTiling, IndexType, LogicOp, MipmapMode,
    PhysicalDeviceType, PipelineBindPoint, PixelFormat, PolygonMode, PresentMode,
    PrimitiveTopology, QueryType, StencilOp, SubpassContents, TextureType, VertexInputRate,
    WrapMode,
};
use crate::error::Result;
use crate::flags::{
    AccessFlags, BufferTargets, ColourComponentFlags, CullModeFlags, ImageAspectFlags,
    ImageUsageFlags, MemoryHeapFlags, MemoryPropertyFlags, PipelineStageFlags, QueueFlags,
    SampleCountFlag, ShaderStageFlags,
};
use crate::resource::{BorderColour, ImageSubresourceRange};

pub fn native<T: Handle>(handle: T) -> NativeHandle {
    NativeHandle::Vulkan(handle.as_raw())
}

/// The typed Vulkan handle behind `native`, or a foreign-object error naming `what`.
pub fn handle<T: Handle>(native: NativeHandle, what: &'static str) -> Result<T> {
    Ok(T::from_raw(native.vulkan(what)?))
}

pub fn format(format: PixelFormat) -> vk::Format {
    match format {
        PixelFormat::Undefined => vk::Format::UNDEFINED,
        PixelFormat::R8 => vk::Format::R8_UNORM,
        PixelFormat::R8G8 => vk::Format::R8G8_UNORM,
        PixelFormat::R8G8B8 => vk::Format::R8G8B8_UNORM,
        PixelFormat::R8G8B8A8 => vk::Format::R8G8B8A8_UNORM,
        PixelFormat::B8G8R8A8 => vk::Format::B8G8R8A8_UNORM,
        PixelFormat::R8G8B8A8Srgb => vk::Format::R8G8B8A8_SRGB,
        PixelFormat::B8G8R8A8Srgb => vk::Format::B8G8R8A8_SRGB,
        PixelFormat::R16F => vk::Format::R16_SFLOAT,
        PixelFormat::R16G16F => vk::Format::R16G16_SFLOAT,
        PixelFormat::R16G16B16A16F => vk::Format::R16G16B16A16_SFLOAT,
        PixelFormat::R32F => vk::Format::R32_SFLOAT,
        PixelFormat::R32G32F => vk::Format::R32G32_SFLOAT,
        PixelFormat::R32G32B32F => vk::Format::R32G32B32_SFLOAT,
        PixelFormat::R32G32B32A32F => vk::Format::R32G32B32A32_SFLOAT,
        PixelFormat::R32UI => vk::Format::R32_UINT,
        PixelFormat::D16 => vk::Format::D16_UNORM,
        PixelFormat::D24S8 => vk::Format::D24_UNORM_S8_UINT,
        PixelFormat::D32F => vk::Format::D32_SFLOAT,
        PixelFormat::D32FS8 => vk::Format::D32_SFLOAT_S8_UINT,
        PixelFormat::S8 => vk::Format::S8_UINT,
        PixelFormat::Bc1Rgb => vk::Format::BC1_RGB_UNORM_BLOCK,
        PixelFormat::Bc1Rgba => vk::Format::BC1_RGBA_UNORM_BLOCK,
        PixelFormat::Bc2Rgba => vk::Format::BC2_UNORM_BLOCK,
        PixelFormat::Bc3Rgba => vk::Format::BC3_UNORM_BLOCK,
    }
}

/// The pixel format of a surface format, if it has one.
pub fn pixel_format(format: vk::Format) -> Option<PixelFormat> {
    Some(match format {
        vk::Format::R8G8B8A8_UNORM => PixelFormat::R8G8B8A8,
        vk::Format::B8G8R8A8_UNORM => PixelFormat::B8G8R8A8,
        vk::Format::R8G8B8A8_SRGB => PixelFormat::R8G8B8A8Srgb,
        vk::Format::B8G8R8A8_SRGB => PixelFormat::B8G8R8A8Srgb,
        vk::Format::R16G16B16A16_SFLOAT => PixelFormat::R16G16B16A16F,
        _ => return None,
    })
}

pub fn image_layout(layout: ImageLayout) -> vk::ImageLayout {
    match layout {
        ImageLayout::Undefined => vk::ImageLayout::UNDEFINED,
        ImageLayout::General => vk::ImageLayout::GENERAL,
        ImageLayout::ColourAttachmentOptimal => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthStencilAttachmentOptimal => {
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
        }
        ImageLayout::DepthStencilReadOnlyOptimal => vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
        ImageLayout::ShaderReadOnlyOptimal => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        ImageLayout::TransferSrcOptimal => vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
        ImageLayout::TransferDstOptimal => vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        ImageLayout::Preinitialised => vk::ImageLayout::PREINITIALIZED,
        ImageLayout::PresentSrc => vk::ImageLayout::PRESENT_SRC_KHR,
    }
}

pub fn image_tiling(tiling: ImageTiling) -> vk::ImageTiling {
    match tiling {
        ImageTiling::Optimal => vk::ImageTiling::OPTIMAL,
        ImageTiling::Linear => vk::ImageTiling::LINEAR,
    }
}

pub fn image_type(texture_type: TextureType) -> vk::ImageType {
    match texture_type {
        TextureType::E1D | TextureType::E1DArray => vk::ImageType::TYPE_1D,
        TextureType::E3D => vk::ImageType::TYPE_3D,
        TextureType::E2D | TextureType::E2DArray | TextureType::Cube | TextureType::CubeArray => {
            vk::ImageType::TYPE_2D
        }
    }
}

pub fn view_type(texture_type: TextureType) -> vk::ImageViewType {
    match texture_type {
        TextureType::E1D => vk::ImageViewType::TYPE_1D,
        TextureType::E2D => vk::ImageViewType::TYPE_2D,
        TextureType::E3D => vk::ImageViewType::TYPE_3D,
        TextureType::Cube => vk::ImageViewType::CUBE,
        TextureType::E1DArray => vk::ImageViewType::TYPE_1D_ARRAY,
        TextureType::E2DArray => vk::ImageViewType::TYPE_2D_ARRAY,
        TextureType::CubeArray => vk::ImageViewType::CUBE_ARRAY,
    }
}

pub fn subresource_range(range: &ImageSubresourceRange) -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask: aspect_flags(range.aspect_mask),
        base_mip_level: range.base_mip_level,
        level_count: range.level_count,
        base_array_layer: range.base_array_layer,
        layer_count: range.layer_count,
    }
}

pub fn address_mode(mode: WrapMode) -> vk::SamplerAddressMode {
    match mode {
        WrapMode::Repeat => vk::SamplerAddressMode::REPEAT,
        WrapMode::MirroredRepeat => vk::SamplerAddressMode::MIRRORED_REPEAT,
        WrapMode::ClampToEdge => vk::SamplerAddressMode::CLAMP_TO_EDGE,
        WrapMode::ClampToBorder => vk::SamplerAddressMode::CLAMP_TO_BORDER,
        WrapMode::MirrorClampToEdge => vk::SamplerAddressMode::MIRROR_CLAMP_TO_EDGE,
    }
}

pub fn filter(filter: Filter) -> vk::Filter {
    match filter {
        Filter::Nearest => vk::Filter::NEAREST,
        Filter::Linear => vk::Filter::LINEAR,
    }
}

/// `None` samples the base level only; the caller clamps the LOD range for it.
pub fn mipmap_mode(mode: MipmapMode) -> vk::SamplerMipmapMode {
    match mode {
        MipmapMode::None | MipmapMode::Nearest => vk::SamplerMipmapMode::NEAREST,
        MipmapMode::Linear => vk::SamplerMipmapMode::LINEAR,
    }
}

pub fn border_colour(colour: BorderColour) -> vk::BorderColor {
    match colour {
        BorderColour::FloatTransparentBlack => vk::BorderColor::FLOAT_TRANSPARENT_BLACK,
        BorderColour::IntTransparentBlack => vk::BorderColor::INT_TRANSPARENT_BLACK,
        BorderColour::FloatOpaqueBlack => vk::BorderColor::FLOAT_OPAQUE_BLACK,
        BorderColour::IntOpaqueBlack => vk::BorderColor::INT_OPAQUE_BLACK,
        BorderColour::FloatOpaqueWhite => vk::BorderColor::FLOAT_OPAQUE_WHITE,
        BorderColour::IntOpaqueWhite => vk::BorderColor::INT_OPAQUE_WHITE,
    }
}

pub fn compare_op(op: CompareOp) -> vk::CompareOp {
    match op {
        CompareOp::Never => vk::CompareOp::NEVER,
        CompareOp::Less => vk::CompareOp::LESS,
        CompareOp::Equal => vk::CompareOp::EQUAL,
        CompareOp::LessEqual => vk::CompareOp::LESS_OR_EQUAL,
        CompareOp::Greater => vk::CompareOp::GREATER,
        CompareOp::NotEqual => vk::CompareOp::NOT_EQUAL,
        CompareOp::GreaterEqual => vk::CompareOp::GREATER_OR_EQUAL,
        CompareOp::Always => vk::CompareOp::ALWAYS,
    }
}

pub fn blend_factor(factor: BlendFactor) -> vk::BlendFactor {
    match factor {
        BlendFactor::Zero => vk::BlendFactor::ZERO,
        BlendFactor::One => vk::BlendFactor::ONE,
        BlendFactor::SrcColour => vk::BlendFactor::SRC_COLOR,
        BlendFactor::InvSrcColour => vk::BlendFactor::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColour => vk::BlendFactor::DST_COLOR,
        BlendFactor::InvDstColour => vk::BlendFactor::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => vk::BlendFactor::SRC_ALPHA,
        BlendFactor::InvSrcAlpha => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => vk::BlendFactor::DST_ALPHA,
        BlendFactor::InvDstAlpha => vk::BlendFactor::ONE_MINUS_DST_ALPHA,
        BlendFactor::ConstantColour => vk::BlendFactor::CONSTANT_COLOR,
        BlendFactor::InvConstantColour => vk::BlendFactor::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::ConstantAlpha => vk::BlendFactor::CONSTANT_ALPHA,
        BlendFactor::InvConstantAlpha => vk::BlendFactor::ONE_MINUS_CONSTANT_ALPHA,
        BlendFactor::SrcAlphaSaturate => vk::BlendFactor::SRC_ALPHA_SATURATE,
        BlendFactor::Src1Colour => vk::BlendFactor::SRC1_COLOR,
        BlendFactor::InvSrc1Colour => vk::BlendFactor::ONE_MINUS_SRC1_COLOR,
        BlendFactor::Src1Alpha => vk::BlendFactor::SRC1_ALPHA,
        BlendFactor::InvSrc1Alpha => vk::BlendFactor::ONE_MINUS_SRC1_ALPHA,
    }
}

pub fn blend_op(op: BlendOp) -> vk::BlendOp {
    match op {
        BlendOp::Add => vk::BlendOp::ADD,
        BlendOp::Subtract => vk::BlendOp::SUBTRACT,
        BlendOp::ReverseSubtract => vk::BlendOp::REVERSE_SUBTRACT,
        BlendOp::Min => vk::BlendOp::MIN,
        BlendOp::Max => vk::BlendOp::MAX,
    }
}

pub fn logic_op(op: LogicOp) -> vk::LogicOp {
    match op {
        LogicOp::Clear => vk::LogicOp::CLEAR,
        LogicOp::And => vk::LogicOp::AND,
        LogicOp::AndReverse => vk::LogicOp::AND_REVERSE,
        LogicOp::Copy => vk::LogicOp::COPY,
        LogicOp::AndInverted => vk::LogicOp::AND_INVERTED,
        LogicOp::NoOp => vk::LogicOp::NO_OP,
        LogicOp::Xor => vk::LogicOp::XOR,
        LogicOp::Or => vk::LogicOp::OR,
        LogicOp::Nor => vk::LogicOp::NOR,
        LogicOp::Equivalent => vk::LogicOp::EQUIVALENT,
        LogicOp::Invert => vk::LogicOp::INVERT,
        LogicOp::OrReverse => vk::LogicOp::OR_REVERSE,
        LogicOp::CopyInverted => vk::LogicOp::COPY_INVERTED,
        LogicOp::OrInverted => vk::LogicOp::OR_INVERTED,
        LogicOp::Nand => vk::LogicOp::NAND,
        LogicOp::Set => vk::LogicOp::SET,
    }
}

pub fn polygon_mode(mode: PolygonMode) -> vk::PolygonMode {
    match mode {
        PolygonMode::Fill => vk::PolygonMode::FILL,
        PolygonMode::Line => vk::PolygonMode::LINE,
        PolygonMode::Point => vk::PolygonMode::POINT,
    }
}

pub fn front_face(face: FrontFace) -> vk::FrontFace {
    match face {
        FrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        FrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
    }
}

pub fn primitive_topology(topology: PrimitiveTopology) -> vk::PrimitiveTopology {
    match topology {
        PrimitiveTopology::PointList => vk::PrimitiveTopology::POINT_LIST,
        PrimitiveTopology::LineList => vk::PrimitiveTopology::LINE_LIST,
        PrimitiveTopology::LineStrip => vk::PrimitiveTopology::LINE_STRIP,
        PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
        PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
        PrimitiveTopology::TriangleFan => vk::PrimitiveTopology::TRIANGLE_FAN,
        PrimitiveTopology::LineListWithAdjacency => vk::PrimitiveTopology::LINE_LIST_WITH_ADJACENCY,
        PrimitiveTopology::LineStripWithAdjacency => {
            vk::PrimitiveTopology::LINE_STRIP_WITH_ADJACENCY
        }
        PrimitiveTopology::TriangleListWithAdjacency => {
            vk::PrimitiveTopology::TRIANGLE_LIST_WITH_ADJACENCY
        }
        PrimitiveTopology::TriangleStripWithAdjacency => {
            vk::PrimitiveTopology::TRIANGLE_STRIP_WITH_ADJACENCY
        }
        PrimitiveTopology::PatchList => vk::PrimitiveTopology::PATCH_LIST,
    }
}

pub fn stencil_op(op: StencilOp) -> vk::StencilOp {
    match op {
        StencilOp::Keep => vk::StencilOp::KEEP,
        StencilOp::Zero => vk::StencilOp::ZERO,
        StencilOp::Replace => vk::StencilOp::REPLACE,
        StencilOp::IncrementAndClamp => vk::StencilOp::INCREMENT_AND_CLAMP,
        StencilOp::DecrementAndClamp => vk::StencilOp::DECREMENT_AND_CLAMP,
        StencilOp::Invert => vk::StencilOp::INVERT,
        StencilOp::IncrementAndWrap => vk::StencilOp::INCREMENT_AND_WRAP,
        StencilOp::DecrementAndWrap => vk::StencilOp::DECREMENT_AND_WRAP,
    }
}

pub fn load_op(op: AttachmentLoadOp) -> vk::AttachmentLoadOp {
    match op {
        AttachmentLoadOp::Load => vk::AttachmentLoadOp::LOAD,
        AttachmentLoadOp::Clear => vk::AttachmentLoadOp::CLEAR,
        AttachmentLoadOp::DontCare => vk::AttachmentLoadOp::DONT_CARE,
    }
}

pub fn store_op(op: AttachmentStoreOp) -> vk::AttachmentStoreOp {
    match op {
        AttachmentStoreOp::Store => vk::AttachmentStoreOp::STORE,
        AttachmentStoreOp::DontCare => vk::AttachmentStoreOp::DONT_CARE,
    }
}

pub fn bind_point(bind_point: PipelineBindPoint) -> vk::PipelineBindPoint {
    match bind_point {
        PipelineBindPoint::Graphics => vk::PipelineBindPoint::GRAPHICS,
        PipelineBindPoint::Compute => vk::PipelineBindPoint::COMPUTE,
    }
}

pub fn descriptor_type(descriptor_type: DescriptorType) -> vk::DescriptorType {
    match descriptor_type {
        DescriptorType::Sampler => vk::DescriptorType::SAMPLER,
        DescriptorType::CombinedImageSampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
        DescriptorType::SampledImage => vk::DescriptorType::SAMPLED_IMAGE,
        DescriptorType::StorageImage => vk::DescriptorType::STORAGE_IMAGE,
        DescriptorType::UniformTexelBuffer => vk::DescriptorType::UNIFORM_TEXEL_BUFFER,
        DescriptorType::StorageTexelBuffer => vk::DescriptorType::STORAGE_TEXEL_BUFFER,
        DescriptorType::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
        DescriptorType::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
        DescriptorType::UniformBufferDynamic => vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC,
        DescriptorType::StorageBufferDynamic => vk::DescriptorType::STORAGE_BUFFER_DYNAMIC,
        DescriptorType::InputAttachment => vk::DescriptorType::INPUT_ATTACHMENT,
    }
}

pub fn query_type(query_type: QueryType) -> vk::QueryType {
    match query_type {
        QueryType::Occlusion => vk::QueryType::OCCLUSION,
        QueryType::PipelineStatistics => vk::QueryType::PIPELINE_STATISTICS,
        QueryType::Timestamp => vk::QueryType::TIMESTAMP,
    }
}

pub fn index_type(index_type: IndexType) -> vk::IndexType {
    match index_type {
        IndexType::UInt16 => vk::IndexType::UINT16,
        IndexType::UInt32 => vk::IndexType::UINT32,
    }
}

pub fn subpass_contents(contents: SubpassContents) -> vk::SubpassContents {
    match contents {
        SubpassContents::Inline => vk::SubpassContents::INLINE,
        SubpassContents::SecondaryCommandBuffers => vk::SubpassContents::SECONDARY_COMMAND_BUFFERS,
    }
}

pub fn input_rate(rate: VertexInputRate) -> vk::VertexInputRate {
    match rate {
        VertexInputRate::Vertex => vk::VertexInputRate::VERTEX,
        VertexInputRate::Instance => vk::VertexInputRate::INSTANCE,
    }
}

pub fn attribute_format(format: AttributeFormat) -> vk::Format {
    match format {
        AttributeFormat::Float => vk::Format::R32_SFLOAT,
        AttributeFormat::Vec2f => vk::Format::R32G32_SFLOAT,
        AttributeFormat::Vec3f => vk::Format::R32G32B32_SFLOAT,
        AttributeFormat::Vec4f => vk::Format::R32G32B32A32_SFLOAT,
        AttributeFormat::Int => vk::Format::R32_SINT,
        AttributeFormat::Vec2i => vk::Format::R32G32_SINT,
        AttributeFormat::Vec3i => vk::Format::R32G32B32_SINT,
        AttributeFormat::Vec4i => vk::Format::R32G32B32A32_SINT,
        AttributeFormat::UInt => vk::Format::R32_UINT,
        AttributeFormat::Colour => vk::Format::R8G8B8A8_UNORM,
    }
}

pub fn present_mode(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
    }
}

pub fn sample_count(samples: SampleCountFlag) -> vk::SampleCountFlags {
    vk::SampleCountFlags::from_raw(samples.count())
}

pub fn buffer_usage(targets: BufferTargets) -> vk::BufferUsageFlags {
    vk::BufferUsageFlags::from_raw(targets.bits())
}

pub fn image_usage(usage: ImageUsageFlags) -> vk::ImageUsageFlags {
    vk::ImageUsageFlags::from_raw(usage.bits())
}

pub fn aspect_flags(aspect: ImageAspectFlags) -> vk::ImageAspectFlags {
    vk::ImageAspectFlags::from_raw(aspect.bits())
}

pub fn access_flags(access: AccessFlags) -> vk::AccessFlags {
    vk::AccessFlags::from_raw(access.bits())
}

pub fn stage_flags(stages: PipelineStageFlags) -> vk::PipelineStageFlags {
    vk::PipelineStageFlags::from_raw(stages.bits())
}

pub fn shader_stages(stages: ShaderStageFlags) -> vk::ShaderStageFlags {
    vk::ShaderStageFlags::from_raw(stages.bits())
}

pub fn colour_components(mask: ColourComponentFlags) -> vk::ColorComponentFlags {
    vk::ColorComponentFlags::from_raw(mask.bits())
}

pub fn cull_mode(mode: CullModeFlags) -> vk::CullModeFlags {
    vk::CullModeFlags::from_raw(mode.bits())
}

pub fn device_type(device_type: vk::PhysicalDeviceType) -> PhysicalDeviceType {
    match device_type {
        vk::PhysicalDeviceType::INTEGRATED_GPU => PhysicalDeviceType::IntegratedGpu,
        vk::PhysicalDeviceType::DISCRETE_GPU => PhysicalDeviceType::DiscreteGpu,
        vk::PhysicalDeviceType::VIRTUAL_GPU => PhysicalDeviceType::VirtualGpu,
        vk::PhysicalDeviceType::CPU => PhysicalDeviceType::Cpu,
        _ => PhysicalDeviceType::Other,
    }
}

/// A fixed-size, NUL-terminated name from a properties struct.
pub fn c_name(name: &[std::os::raw::c_char]) -> String {
    let bytes: Vec<u8> = name
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn limits(limits: &vk::PhysicalDeviceLimits) -> PhysicalDeviceLimits {
    PhysicalDeviceLimits {
        max_image_dimension_1d: limits.max_image_dimension1_d,
        max_image_dimension_2d: limits.max_image_dimension2_d,
        max_image_dimension_3d: limits.max_image_dimension3_d,
        max_image_dimension_cube: limits.max_image_dimension_cube,
        max_image_array_layers: limits.max_image_array_layers,
        max_uniform_buffer_range: limits.max_uniform_buffer_range,
        max_storage_buffer_range: limits.max_storage_buffer_range,
        max_push_constants_size: limits.max_push_constants_size,
        max_bound_descriptor_sets: limits.max_bound_descriptor_sets,
        max_sampler_anisotropy: limits.max_sampler_anisotropy,
        min_uniform_buffer_offset_alignment: limits.min_uniform_buffer_offset_alignment,
        min_storage_buffer_offset_alignment: limits.min_storage_buffer_offset_alignment,
        min_texel_buffer_offset_alignment: limits.min_texel_buffer_offset_alignment,
        max_colour_attachments: limits.max_color_attachments,
        max_framebuffer_width: limits.max_framebuffer_width,
        max_framebuffer_height: limits.max_framebuffer_height,
        max_viewports: limits.max_viewports,
        timestamp_period: limits.timestamp_period,
    }
}

fn features(features: &vk::PhysicalDeviceFeatures) -> PhysicalDeviceFeatures {
    let on = |feature: vk::Bool32| feature == vk::TRUE;
    PhysicalDeviceFeatures {
        sampler_anisotropy: on(features.sampler_anisotropy),
        fill_mode_non_solid: on(features.fill_mode_non_solid),
        wide_lines: on(features.wide_lines),
        geometry_shader: on(features.geometry_shader),
        tessellation_shader: on(features.tessellation_shader),
        depth_clamp: on(features.depth_clamp),
        depth_bias_clamp: on(features.depth_bias_clamp),
        depth_bounds: on(features.depth_bounds),
        logic_op: on(features.logic_op),
        independent_blend: on(features.independent_blend),
        dual_src_blend: on(features.dual_src_blend),
        sample_rate_shading: on(features.sample_rate_shading),
        multi_viewport: on(features.multi_viewport),
        texture_compression_bc: on(features.texture_compression_bc),
        pipeline_statistics_query: on(features.pipeline_statistics_query),
    }
}

/// Device features to enable: every optional capability the device reports.
pub fn enabled_features(features: &PhysicalDeviceFeatures) -> vk::PhysicalDeviceFeatures {
    let bool32 = |on: bool| if on { vk::TRUE } else { vk::FALSE };
    vk::PhysicalDeviceFeatures {
        sampler_anisotropy: bool32(features.sampler_anisotropy),
        fill_mode_non_solid: bool32(features.fill_mode_non_solid),
        wide_lines: bool32(features.wide_lines),
        geometry_shader: bool32(features.geometry_shader),
        tessellation_shader: bool32(features.tessellation_shader),
        depth_clamp: bool32(features.depth_clamp),
        depth_bias_clamp: bool32(features.depth_bias_clamp),
        depth_bounds: bool32(features.depth_bounds),
        logic_op: bool32(features.logic_op),
        independent_blend: bool32(features.independent_blend),
        dual_src_blend: bool32(features.dual_src_blend),
        sample_rate_shading: bool32(features.sample_rate_shading),
        multi_viewport: bool32(features.multi_viewport),
        texture_compression_bc: bool32(features.texture_compression_bc),
        pipeline_statistics_query: bool32(features.pipeline_statistics_query),
        ..Default::default()
    }
}

fn memory(memory: &vk::PhysicalDeviceMemoryProperties) -> MemoryProperties {
    let types = memory.memory_types[..memory.memory_type_count as usize]
        .iter()
        .map(|memory_type| MemoryType {
            property_flags: MemoryPropertyFlags::from_bits_truncate(
                memory_type.property_flags.as_raw(),
            ),
            heap_index: memory_type.heap_index,
        })
        .collect();
    let heaps = memory.memory_heaps[..memory.memory_heap_count as usize]
        .iter()
        .map(|heap| MemoryHeap {
            size: heap.size,
            flags: MemoryHeapFlags::from_bits_truncate(heap.flags.as_raw()),
        })
        .collect();
    MemoryProperties { types, heaps }
}

/// Everything the device enumeration reports about one GPU.
pub fn physical_device(
    index: u32,
    properties: &vk::PhysicalDeviceProperties,
    device_features: &vk::PhysicalDeviceFeatures,
    queue_families: &[vk::QueueFamilyProperties],
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
) -> PhysicalDevice {
    PhysicalDevice {
        index,
        name: c_name(&properties.device_name),
        device_type: device_type(properties.device_type),
        api_version: (
            vk::api_version_major(properties.api_version),
            vk::api_version_minor(properties.api_version),
            vk::api_version_patch(properties.api_version),
        ),
        driver_version: properties.driver_version,
        vendor_id: properties.vendor_id,
        device_id: properties.device_id,
        limits: limits(&properties.limits),
        features: features(device_features),
        queue_families: queue_families
            .iter()
            .map(|family| QueueFamilyProperties {
                flags: QueueFlags::from_bits_truncate(family.queue_flags.as_raw()),
                queue_count: family.queue_count,
                timestamp_valid_bits: family.timestamp_valid_bits,
            })
            .collect(),
        memory: memory(memory_properties),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_keep_their_vulkan_bits() {
        assert_eq!(
            buffer_usage(BufferTargets::VERTEX_BUFFER | BufferTargets::TRANSFER_DST),
            vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST
        );
        assert_eq!(
            image_usage(ImageUsageFlags::COLOUR_ATTACHMENT),
            vk::ImageUsageFlags::COLOR_ATTACHMENT
        );
        assert_eq!(
            stage_flags(PipelineStageFlags::COLOUR_ATTACHMENT_OUTPUT),
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
        );
        assert_eq!(
            access_flags(AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE),
            vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE
        );
        assert_eq!(shader_stages(ShaderStageFlags::ALL_GRAPHICS), vk::ShaderStageFlags::ALL_GRAPHICS);
        assert_eq!(cull_mode(CullModeFlags::FRONT_AND_BACK), vk::CullModeFlags::FRONT_AND_BACK);
        assert_eq!(colour_components(ColourComponentFlags::RGBA), vk::ColorComponentFlags::RGBA);
        assert_eq!(sample_count(SampleCountFlag::E8), vk::SampleCountFlags::TYPE_8);
    }

    #[test]
    fn swap_chain_formats_map_back() {
        for format_ in [PixelFormat::B8G8R8A8Srgb, PixelFormat::R8G8B8A8] {
            assert_eq!(pixel_format(format(format_)), Some(format_));
        }
        assert_eq!(pixel_format(vk::Format::A2B10G10R10_UNORM_PACK32), None);
    }

    #[test]
    fn names_stop_at_the_terminator() {
        let mut raw = [0 as std::os::raw::c_char; 16];
        for (slot, byte) in raw.iter_mut().zip(b"Test GPU") {
            *slot = *byte as std::os::raw::c_char;
        }
        assert_eq!(c_name(&raw), "Test GPU");
    }

    #[test]
    fn enumeration_fills_a_physical_device() {
        let mut properties = vk::PhysicalDeviceProperties {
            device_type: vk::PhysicalDeviceType::DISCRETE_GPU,
            api_version: vk::make_api_version(0, 1, 3, 250),
            ..Default::default()
        };
        properties.limits.max_push_constants_size = 256;
        properties.limits.min_uniform_buffer_offset_alignment = 64;
        let device_features = vk::PhysicalDeviceFeatures {
            sampler_anisotropy: vk::TRUE,
            ..Default::default()
        };
        let families = [vk::QueueFamilyProperties {
            queue_flags: vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE,
            queue_count: 2,
            timestamp_valid_bits: 64,
            ..Default::default()
        }];
        let mut memory_properties = vk::PhysicalDeviceMemoryProperties {
            memory_type_count: 2,
            memory_heap_count: 1,
            ..Default::default()
        };
        memory_properties.memory_types[0].property_flags = vk::MemoryPropertyFlags::DEVICE_LOCAL;
        memory_properties.memory_types[1].property_flags =
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;
        memory_properties.memory_heaps[0].size = 1 << 30;

        let device = physical_device(3, &properties, &device_features, &families, &memory_properties);
        assert_eq!(device.index, 3);
        assert_eq!(device.device_type, PhysicalDeviceType::DiscreteGpu);
        assert_eq!(device.api_version, (1, 3, 250));
        assert_eq!(device.limits.max_push_constants_size, 256);
        assert_eq!(device.limits.min_uniform_buffer_offset_alignment, 64);
        assert!(device.features.sampler_anisotropy);
        assert!(!device.features.wide_lines);
        assert_eq!(device.find_queue_family(QueueFlags::COMPUTE), Some(0));
        assert_eq!(device.memory.types.len(), 2);
        assert_eq!(
            device
                .memory
                .find_memory_type(0b11, MemoryPropertyFlags::HOST_VISIBLE),
            Some(1)
        );
        assert_eq!(device.memory.heaps[0].size, 1 << 30);
    }
}
