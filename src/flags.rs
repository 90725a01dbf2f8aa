// Bit-flag types shared by both backends
//
// Bit values match the explicit API's so the Vulkan backend converts with
// `from_raw(bits)`; the GL backend maps them one flag at a time.

use bitflags::bitflags;

bitflags! {
    /// Allowed usages of a buffer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferTargets: u32 {
        const TRANSFER_SRC = 0x0000_0001;
        const TRANSFER_DST = 0x0000_0002;
        const UNIFORM_TEXEL_BUFFER = 0x0000_0004;
        const STORAGE_TEXEL_BUFFER = 0x0000_0008;
        const UNIFORM_BUFFER = 0x0000_0010;
        const STORAGE_BUFFER = 0x0000_0020;
        const INDEX_BUFFER = 0x0000_0040;
        const VERTEX_BUFFER = 0x0000_0080;
        const INDIRECT_BUFFER = 0x0000_0100;
    }
}

bitflags! {
    /// Properties requested for the memory backing a resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryPropertyFlags: u32 {
        const DEVICE_LOCAL = 0x0000_0001;
        const HOST_VISIBLE = 0x0000_0002;
        const HOST_COHERENT = 0x0000_0004;
        const HOST_CACHED = 0x0000_0008;
        const LAZILY_ALLOCATED = 0x0000_0010;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryHeapFlags: u32 {
        const DEVICE_LOCAL = 0x0000_0001;
    }
}

bitflags! {
    /// Allowed usages of a texture.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsageFlags: u32 {
        const TRANSFER_SRC = 0x0000_0001;
        const TRANSFER_DST = 0x0000_0002;
        const SAMPLED = 0x0000_0004;
        const STORAGE = 0x0000_0008;
        const COLOUR_ATTACHMENT = 0x0000_0010;
        const DEPTH_STENCIL_ATTACHMENT = 0x0000_0020;
        const TRANSIENT_ATTACHMENT = 0x0000_0040;
        const INPUT_ATTACHMENT = 0x0000_0080;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageAspectFlags: u32 {
        const COLOUR = 0x0000_0001;
        const DEPTH = 0x0000_0002;
        const STENCIL = 0x0000_0004;
    }
}

bitflags! {
    /// Memory access types taking part in a dependency.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u32 {
        const INDIRECT_COMMAND_READ = 0x0000_0001;
        const INDEX_READ = 0x0000_0002;
        const VERTEX_ATTRIBUTE_READ = 0x0000_0004;
        const UNIFORM_READ = 0x0000_0008;
        const INPUT_ATTACHMENT_READ = 0x0000_0010;
        const SHADER_READ = 0x0000_0020;
        const SHADER_WRITE = 0x0000_0040;
        const COLOUR_ATTACHMENT_READ = 0x0000_0080;
        const COLOUR_ATTACHMENT_WRITE = 0x0000_0100;
        const DEPTH_STENCIL_ATTACHMENT_READ = 0x0000_0200;
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 0x0000_0400;
        const TRANSFER_READ = 0x0000_0800;
        const TRANSFER_WRITE = 0x0000_1000;
        const HOST_READ = 0x0000_2000;
        const HOST_WRITE = 0x0000_4000;
        const MEMORY_READ = 0x0000_8000;
        const MEMORY_WRITE = 0x0001_0000;
    }
}

bitflags! {
    /// Pipeline stages taking part in a dependency.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineStageFlags: u32 {
        const TOP_OF_PIPE = 0x0000_0001;
        const DRAW_INDIRECT = 0x0000_0002;
        const VERTEX_INPUT = 0x0000_0004;
        const VERTEX_SHADER = 0x0000_0008;
        const TESSELLATION_CONTROL_SHADER = 0x0000_0010;
        const TESSELLATION_EVALUATION_SHADER = 0x0000_0020;
        const GEOMETRY_SHADER = 0x0000_0040;
        const FRAGMENT_SHADER = 0x0000_0080;
        const EARLY_FRAGMENT_TESTS = 0x0000_0100;
        const LATE_FRAGMENT_TESTS = 0x0000_0200;
        const COLOUR_ATTACHMENT_OUTPUT = 0x0000_0400;
        const COMPUTE_SHADER = 0x0000_0800;
        const TRANSFER = 0x0000_1000;
        const BOTTOM_OF_PIPE = 0x0000_2000;
        const HOST = 0x0000_4000;
        const ALL_GRAPHICS = 0x0000_8000;
        const ALL_COMMANDS = 0x0001_0000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 0x0000_0001;
        const TESSELLATION_CONTROL = 0x0000_0002;
        const TESSELLATION_EVALUATION = 0x0000_0004;
        const GEOMETRY = 0x0000_0008;
        const FRAGMENT = 0x0000_0010;
        const COMPUTE = 0x0000_0020;
        const ALL_GRAPHICS = 0x0000_001F;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FenceCreateFlags: u32 {
        /// The fence starts in the signaled state.
        const SIGNALED = 0x0000_0001;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandPoolCreateFlags: u32 {
        const TRANSIENT = 0x0000_0001;
        const RESET_COMMAND_BUFFER = 0x0000_0002;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandBufferUsageFlags: u32 {
        const ONE_TIME_SUBMIT = 0x0000_0001;
        const RENDER_PASS_CONTINUE = 0x0000_0002;
        const SIMULTANEOUS_USE = 0x0000_0004;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct QueryControlFlags: u32 {
        const PRECISE = 0x0000_0001;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct QueryPipelineStatisticFlags: u32 {
        const INPUT_ASSEMBLY_VERTICES = 0x0000_0001;
        const INPUT_ASSEMBLY_PRIMITIVES = 0x0000_0002;
        const VERTEX_SHADER_INVOCATIONS = 0x0000_0004;
        const GEOMETRY_SHADER_INVOCATIONS = 0x0000_0008;
        const GEOMETRY_SHADER_PRIMITIVES = 0x0000_0010;
        const CLIPPING_INVOCATIONS = 0x0000_0020;
        const CLIPPING_PRIMITIVES = 0x0000_0040;
        const FRAGMENT_SHADER_INVOCATIONS = 0x0000_0080;
        const TESSELLATION_CONTROL_SHADER_PATCHES = 0x0000_0100;
        const TESSELLATION_EVALUATION_SHADER_INVOCATIONS = 0x0000_0200;
        const COMPUTE_SHADER_INVOCATIONS = 0x0000_0400;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColourComponentFlags: u32 {
        const R = 0x0000_0001;
        const G = 0x0000_0002;
        const B = 0x0000_0004;
        const A = 0x0000_0008;
        const RGBA = 0x0000_000F;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CullModeFlags: u32 {
        const NONE = 0x0000_0000;
        const FRONT = 0x0000_0001;
        const BACK = 0x0000_0002;
        const FRONT_AND_BACK = 0x0000_0003;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct QueueFlags: u32 {
        const GRAPHICS = 0x0000_0001;
        const COMPUTE = 0x0000_0002;
        const TRANSFER = 0x0000_0004;
        const SPARSE_BINDING = 0x0000_0008;
    }
}

/// Number of samples per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u32)]
pub enum SampleCountFlag {
    #[default]
    E1 = 0x01,
    E2 = 0x02,
    E4 = 0x04,
    E8 = 0x08,
    E16 = 0x10,
    E32 = 0x20,
    E64 = 0x40,
}

impl SampleCountFlag {
    pub fn count(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_components_rgba_is_the_union() {
        assert_eq!(
            ColourComponentFlags::R | ColourComponentFlags::G | ColourComponentFlags::B | ColourComponentFlags::A,
            ColourComponentFlags::RGBA
        );
    }

    #[test]
    fn sample_count_is_the_flag_value() {
        assert_eq!(SampleCountFlag::E1.count(), 1);
        assert_eq!(SampleCountFlag::E16.count(), 16);
    }
}
