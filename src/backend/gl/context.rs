// GL contexts, supplied by the windowing collaborator

use std::rc::Rc;

use super::call::{GlCall, GlValue};
use crate::core::{
    MemoryHeap, MemoryProperties, MemoryType, PhysicalDevice, PhysicalDeviceFeatures,
    PhysicalDeviceLimits, QueueFamilyProperties, WindowHandle,
};
use crate::enums::PhysicalDeviceType;
use crate::flags::{MemoryHeapFlags, MemoryPropertyFlags, QueueFlags};

/// A rendering context. All GL work of a device goes through `execute`.
pub trait GlContext {
    /// Makes the context current on the calling thread.
    fn make_current(&self) -> anyhow::Result<()>;

    fn done_current(&self);

    fn swap_buffers(&self) -> anyhow::Result<()>;

    /// Tells if the context renders to a window surface.
    fn has_surface(&self) -> bool;

    fn execute(&self, call: &GlCall) -> GlValue;

    /// Pops the pending error code, `NO_ERROR` when there is none.
    fn error(&self) -> u32;
}

/// Creates contexts for windows, and describes what they can do.
pub trait GlContextFactory {
    fn capabilities(&self) -> &GlCapabilities;

    /// `WindowHandle::Headless` asks for a context without a default framebuffer.
    fn create_context(&self, window: &WindowHandle) -> anyhow::Result<Rc<dyn GlContext>>;
}

/// Version, strings and implementation limits of a context.
#[derive(Debug, Clone, PartialEq)]
pub struct GlCapabilities {
    pub version: (u32, u32),
    pub vendor: String,
    pub renderer: String,
    pub extensions: Vec<String>,
    pub max_texture_size: u32,
    pub max_3d_texture_size: u32,
    pub max_cube_map_texture_size: u32,
    pub max_array_texture_layers: u32,
    pub max_uniform_block_size: u32,
    pub max_uniform_buffer_bindings: u32,
    pub max_shader_storage_block_size: u32,
    pub uniform_buffer_offset_alignment: u32,
    pub shader_storage_buffer_offset_alignment: u32,
    pub texture_buffer_offset_alignment: u32,
    pub max_texture_max_anisotropy: f32,
    pub max_colour_attachments: u32,
    pub max_framebuffer_width: u32,
    pub max_framebuffer_height: u32,
    pub max_viewports: u32,
    pub timestamp_bits: u32,
}

impl Default for GlCapabilities {
    fn default() -> Self {
        Self {
            version: (4, 5),
            vendor: String::new(),
            renderer: "OpenGL".to_string(),
            extensions: Vec::new(),
            max_texture_size: 16384,
            max_3d_texture_size: 2048,
            max_cube_map_texture_size: 16384,
            max_array_texture_layers: 2048,
            max_uniform_block_size: 65536,
            max_uniform_buffer_bindings: 84,
            max_shader_storage_block_size: 1 << 27,
            uniform_buffer_offset_alignment: 256,
            shader_storage_buffer_offset_alignment: 256,
            texture_buffer_offset_alignment: 256,
            max_texture_max_anisotropy: 16.0,
            max_colour_attachments: 8,
            max_framebuffer_width: 16384,
            max_framebuffer_height: 16384,
            max_viewports: 16,
            timestamp_bits: 64,
        }
    }
}

impl GlCapabilities {
    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        self.version >= (major, minor)
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|extension| extension == name)
    }

    /// Direct state access, which every call of the backend relies on.
    pub fn supports_direct_state_access(&self) -> bool {
        self.at_least(4, 5) || self.has_extension("GL_ARB_direct_state_access")
    }

    pub fn supports_clip_control(&self) -> bool {
        self.at_least(4, 5) || self.has_extension("GL_ARB_clip_control")
    }

    pub fn supports_spirv(&self) -> bool {
        self.at_least(4, 6) || self.has_extension("GL_ARB_gl_spirv")
    }

    pub fn supports_anisotropy(&self) -> bool {
        self.at_least(4, 6) || self.has_extension("GL_EXT_texture_filter_anisotropic")
    }

    pub fn features(&self) -> PhysicalDeviceFeatures {
        PhysicalDeviceFeatures {
            sampler_anisotropy: self.supports_anisotropy(),
            fill_mode_non_solid: true,
            wide_lines: true,
            geometry_shader: self.at_least(3, 2),
            tessellation_shader: self.at_least(4, 0),
            depth_clamp: self.at_least(3, 2),
            depth_bias_clamp: self.at_least(4, 6)
                || self.has_extension("GL_ARB_polygon_offset_clamp"),
            depth_bounds: self.has_extension("GL_EXT_depth_bounds_test"),
            logic_op: true,
            independent_blend: self.at_least(4, 0),
            dual_src_blend: self.at_least(3, 3),
            sample_rate_shading: self.at_least(4, 0),
            multi_viewport: self.at_least(4, 1),
            texture_compression_bc: self.has_extension("GL_EXT_texture_compression_s3tc"),
            pipeline_statistics_query: false,
        }
    }

    pub fn limits(&self) -> PhysicalDeviceLimits {
        PhysicalDeviceLimits {
            max_image_dimension_1d: self.max_texture_size,
            max_image_dimension_2d: self.max_texture_size,
            max_image_dimension_3d: self.max_3d_texture_size,
            max_image_dimension_cube: self.max_cube_map_texture_size,
            max_image_array_layers: self.max_array_texture_layers,
            max_uniform_buffer_range: self.max_uniform_block_size,
            max_storage_buffer_range: self.max_shader_storage_block_size,
            max_push_constants_size: 128,
            max_bound_descriptor_sets: 4,
            max_sampler_anisotropy: if self.supports_anisotropy() {
                self.max_texture_max_anisotropy
            } else {
                1.0
            },
            min_uniform_buffer_offset_alignment: u64::from(self.uniform_buffer_offset_alignment),
            min_storage_buffer_offset_alignment: u64::from(
                self.shader_storage_buffer_offset_alignment,
            ),
            min_texel_buffer_offset_alignment: u64::from(self.texture_buffer_offset_alignment),
            max_colour_attachments: self.max_colour_attachments,
            max_framebuffer_width: self.max_framebuffer_width,
            max_framebuffer_height: self.max_framebuffer_height,
            max_viewports: self.max_viewports,
            timestamp_period: 1.0,
        }
    }

    /// The single device a GL context exposes, with one queue family that does everything.
    pub fn physical_device(&self) -> PhysicalDevice {
        PhysicalDevice {
            index: 0,
            name: self.renderer.clone(),
            device_type: PhysicalDeviceType::Other,
            api_version: (self.version.0, self.version.1, 0),
            driver_version: 0,
            vendor_id: 0,
            device_id: 0,
            limits: self.limits(),
            features: self.features(),
            queue_families: vec![QueueFamilyProperties {
                flags: QueueFlags::GRAPHICS | QueueFlags::COMPUTE | QueueFlags::TRANSFER,
                queue_count: 1,
                timestamp_valid_bits: self.timestamp_bits,
            }],
            memory: MemoryProperties {
                types: vec![
                    MemoryType {
                        property_flags: MemoryPropertyFlags::DEVICE_LOCAL,
                        heap_index: 0,
                    },
                    MemoryType {
                        property_flags: MemoryPropertyFlags::HOST_VISIBLE
                            | MemoryPropertyFlags::HOST_COHERENT,
                        heap_index: 0,
                    },
                ],
                heaps: vec![MemoryHeap {
                    size: 0,
                    flags: MemoryHeapFlags::DEVICE_LOCAL,
                }],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_fill_in_for_old_versions() {
        let mut caps = GlCapabilities {
            version: (4, 3),
            ..Default::default()
        };
        assert!(!caps.supports_clip_control());
        assert!(!caps.supports_direct_state_access());
        caps.extensions = vec![
            "GL_ARB_clip_control".to_string(),
            "GL_ARB_direct_state_access".to_string(),
        ];
        assert!(caps.supports_clip_control());
        assert!(caps.supports_direct_state_access());
        assert!(!caps.supports_spirv());
    }

    #[test]
    fn the_physical_device_has_a_graphics_queue() {
        let device = GlCapabilities::default().physical_device();
        assert!(device.score() > 0);
        assert_eq!(device.limits.min_uniform_buffer_offset_alignment, 256);
    }
}
