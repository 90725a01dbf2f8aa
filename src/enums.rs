// Plain enumerations shared by both backends

use crate::flags::ImageAspectFlags;

/// Pixel formats understood by textures, views and texel buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    #[default]
    Undefined,
    R8,
    R8G8,
    R8G8B8,
    R8G8B8A8,
    B8G8R8A8,
    R8G8B8A8Srgb,
    B8G8R8A8Srgb,
    R16F,
    R16G16F,
    R16G16B16A16F,
    R32F,
    R32G32F,
    R32G32B32F,
    R32G32B32A32F,
    R32UI,
    D16,
    D24S8,
    D32F,
    D32FS8,
    S8,
    Bc1Rgb,
    Bc1Rgba,
    Bc2Rgba,
    Bc3Rgba,
}

impl PixelFormat {
    /// Tells if the format holds depth data.
    pub fn is_depth_format(self) -> bool {
        matches!(self, Self::D16 | Self::D32F)
    }

    /// Tells if the format holds stencil data only.
    pub fn is_stencil_format(self) -> bool {
        matches!(self, Self::S8)
    }

    /// Tells if the format holds both depth and stencil data.
    pub fn is_depth_stencil_format(self) -> bool {
        matches!(self, Self::D24S8 | Self::D32FS8)
    }

    /// Tells if the format is usable as any kind of depth and/or stencil buffer.
    pub fn is_depth_or_stencil_format(self) -> bool {
        self.is_depth_format() || self.is_stencil_format() || self.is_depth_stencil_format()
    }

    pub fn is_compressed_format(self) -> bool {
        matches!(
            self,
            Self::Bc1Rgb | Self::Bc1Rgba | Self::Bc2Rgba | Self::Bc3Rgba
        )
    }

    /// The aspects a view on this format covers.
    pub fn aspect_mask(self) -> ImageAspectFlags {
        if self.is_depth_stencil_format() {
            ImageAspectFlags::DEPTH | ImageAspectFlags::STENCIL
        } else if self.is_depth_format() {
            ImageAspectFlags::DEPTH
        } else if self.is_stencil_format() {
            ImageAspectFlags::STENCIL
        } else {
            ImageAspectFlags::COLOUR
        }
    }

    /// Size of one texel, `None` for block-compressed and undefined formats.
    pub fn size_in_bytes(self) -> Option<u32> {
        let size = match self {
            Self::Undefined | Self::Bc1Rgb | Self::Bc1Rgba | Self::Bc2Rgba | Self::Bc3Rgba => {
                return None
            }
            Self::R8 | Self::S8 => 1,
            Self::R8G8 | Self::R16F | Self::D16 => 2,
            Self::R8G8B8 => 3,
            Self::R8G8B8A8
            | Self::B8G8R8A8
            | Self::R8G8B8A8Srgb
            | Self::B8G8R8A8Srgb
            | Self::R16G16F
            | Self::R32F
            | Self::R32UI
            | Self::D24S8
            | Self::D32F => 4,
            Self::R16G16B16A16F | Self::R32G32F | Self::D32FS8 => 8,
            Self::R32G32B32F => 12,
            Self::R32G32B32A32F => 16,
        };
        Some(size)
    }
}

/// Layout of a texture's memory, as required by the operations using it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageLayout {
    #[default]
    Undefined,
    General,
    ColourAttachmentOptimal,
    DepthStencilAttachmentOptimal,
    DepthStencilReadOnlyOptimal,
    ShaderReadOnlyOptimal,
    TransferSrcOptimal,
    TransferDstOptimal,
    Preinitialised,
    PresentSrc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageTiling {
    #[default]
    Optimal,
    Linear,
}

/// Dimensionality of a texture or texture view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureType {
    E1D,
    #[default]
    E2D,
    E3D,
    Cube,
    E1DArray,
    E2DArray,
    CubeArray,
}

impl TextureType {
    pub fn is_array(self) -> bool {
        matches!(self, Self::E1DArray | Self::E2DArray | Self::CubeArray)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
    MirrorClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MipmapMode {
    #[default]
    None,
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    #[default]
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendFactor {
    Zero,
    #[default]
    One,
    SrcColour,
    InvSrcColour,
    DstColour,
    InvDstColour,
    SrcAlpha,
    InvSrcAlpha,
    DstAlpha,
    InvDstAlpha,
    ConstantColour,
    InvConstantColour,
    ConstantAlpha,
    InvConstantAlpha,
    SrcAlphaSaturate,
    Src1Colour,
    InvSrc1Colour,
    Src1Alpha,
    InvSrc1Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOp {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogicOp {
    Clear,
    And,
    AndReverse,
    #[default]
    Copy,
    AndInverted,
    NoOp,
    Xor,
    Or,
    Nor,
    Equivalent,
    Invert,
    OrReverse,
    CopyInverted,
    OrInverted,
    Nand,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    #[default]
    CounterClockwise,
    Clockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
    TriangleFan,
    LineListWithAdjacency,
    LineStripWithAdjacency,
    TriangleListWithAdjacency,
    TriangleStripWithAdjacency,
    PatchList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOp {
    #[default]
    Keep,
    Zero,
    Replace,
    IncrementAndClamp,
    DecrementAndClamp,
    Invert,
    IncrementAndWrap,
    DecrementAndWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachmentLoadOp {
    Load,
    Clear,
    #[default]
    DontCare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttachmentStoreOp {
    #[default]
    Store,
    DontCare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineBindPoint {
    #[default]
    Graphics,
    Compute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    Sampler,
    CombinedImageSampler,
    SampledImage,
    StorageImage,
    UniformTexelBuffer,
    StorageTexelBuffer,
    UniformBuffer,
    StorageBuffer,
    UniformBufferDynamic,
    StorageBufferDynamic,
    InputAttachment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Occlusion,
    PipelineStatistics,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexType {
    UInt16,
    #[default]
    UInt32,
}

impl IndexType {
    pub fn size_in_bytes(self) -> u32 {
        match self {
            Self::UInt16 => 2,
            Self::UInt32 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubpassContents {
    #[default]
    Inline,
    SecondaryCommandBuffers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexInputRate {
    #[default]
    Vertex,
    Instance,
}

/// Format of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeFormat {
    Float,
    Vec2f,
    Vec3f,
    Vec4f,
    Int,
    Vec2i,
    Vec3i,
    Vec4i,
    UInt,
    Colour,
}

impl AttributeFormat {
    /// Number of components, and whether they are integers.
    pub fn components(self) -> (u32, bool) {
        match self {
            Self::Float => (1, false),
            Self::Vec2f => (2, false),
            Self::Vec3f => (3, false),
            Self::Vec4f => (4, false),
            Self::Int | Self::UInt => (1, true),
            Self::Vec2i => (2, true),
            Self::Vec3i => (3, true),
            Self::Vec4i => (4, true),
            Self::Colour => (4, false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalDeviceType {
    Other,
    IntegratedGpu,
    DiscreteGpu,
    VirtualGpu,
    Cpu,
}

/// Presentation engine queueing behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresentMode {
    #[default]
    Immediate,
    Mailbox,
    Fifo,
    FifoRelaxed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_stencil_classification() {
        assert!(PixelFormat::D24S8.is_depth_stencil_format());
        assert!(!PixelFormat::D24S8.is_depth_format());
        assert!(PixelFormat::D32F.is_depth_format());
        assert!(PixelFormat::S8.is_stencil_format());
        assert!(PixelFormat::D16.is_depth_or_stencil_format());
        assert!(!PixelFormat::R8G8B8A8.is_depth_or_stencil_format());
    }

    #[test]
    fn aspect_mask_follows_the_format() {
        assert_eq!(
            PixelFormat::D32FS8.aspect_mask(),
            ImageAspectFlags::DEPTH | ImageAspectFlags::STENCIL
        );
        assert_eq!(PixelFormat::B8G8R8A8.aspect_mask(), ImageAspectFlags::COLOUR);
    }

    #[test]
    fn compressed_formats_have_no_texel_size() {
        assert!(PixelFormat::Bc3Rgba.is_compressed_format());
        assert_eq!(PixelFormat::Bc3Rgba.size_in_bytes(), None);
        assert_eq!(PixelFormat::R32G32B32A32F.size_in_bytes(), Some(16));
    }
}
