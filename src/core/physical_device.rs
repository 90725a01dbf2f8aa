// Physical device description
//
// Queried once at enumeration time and read-only afterwards.

use crate::enums::PhysicalDeviceType;
use crate::flags::{MemoryHeapFlags, MemoryPropertyFlags, QueueFlags};

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalDeviceLimits {
    pub max_image_dimension_1d: u32,
    pub max_image_dimension_2d: u32,
    pub max_image_dimension_3d: u32,
    pub max_image_dimension_cube: u32,
    pub max_image_array_layers: u32,
    pub max_uniform_buffer_range: u32,
    pub max_storage_buffer_range: u32,
    pub max_push_constants_size: u32,
    pub max_bound_descriptor_sets: u32,
    pub max_sampler_anisotropy: f32,
    pub min_uniform_buffer_offset_alignment: u64,
    pub min_storage_buffer_offset_alignment: u64,
    pub min_texel_buffer_offset_alignment: u64,
    pub max_colour_attachments: u32,
    pub max_framebuffer_width: u32,
    pub max_framebuffer_height: u32,
    pub max_viewports: u32,
    /// Nanoseconds per timestamp tick.
    pub timestamp_period: f32,
}

impl Default for PhysicalDeviceLimits {
    fn default() -> Self {
        Self {
            max_image_dimension_1d: 4096,
            max_image_dimension_2d: 4096,
            max_image_dimension_3d: 256,
            max_image_dimension_cube: 4096,
            max_image_array_layers: 256,
            max_uniform_buffer_range: 16384,
            max_storage_buffer_range: 1 << 27,
            max_push_constants_size: 128,
            max_bound_descriptor_sets: 4,
            max_sampler_anisotropy: 1.0,
            min_uniform_buffer_offset_alignment: 256,
            min_storage_buffer_offset_alignment: 256,
            min_texel_buffer_offset_alignment: 256,
            max_colour_attachments: 4,
            max_framebuffer_width: 4096,
            max_framebuffer_height: 4096,
            max_viewports: 1,
            timestamp_period: 1.0,
        }
    }
}

/// Optional capabilities a device may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhysicalDeviceFeatures {
    pub sampler_anisotropy: bool,
    pub fill_mode_non_solid: bool,
    pub wide_lines: bool,
    pub geometry_shader: bool,
    pub tessellation_shader: bool,
    pub depth_clamp: bool,
    pub depth_bias_clamp: bool,
    pub depth_bounds: bool,
    pub logic_op: bool,
    pub independent_blend: bool,
    pub dual_src_blend: bool,
    pub sample_rate_shading: bool,
    pub multi_viewport: bool,
    pub texture_compression_bc: bool,
    pub pipeline_statistics_query: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyProperties {
    pub flags: QueueFlags,
    pub queue_count: u32,
    pub timestamp_valid_bits: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryType {
    pub property_flags: MemoryPropertyFlags,
    pub heap_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryHeap {
    pub size: u64,
    pub flags: MemoryHeapFlags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryProperties {
    pub types: Vec<MemoryType>,
    pub heaps: Vec<MemoryHeap>,
}

impl MemoryProperties {
    /// First memory type allowed by `type_bits` that has every requested property.
    pub fn find_memory_type(&self, type_bits: u32, properties: MemoryPropertyFlags) -> Option<u32> {
        self.types
            .iter()
            .enumerate()
            .find(|(i, memory_type)| {
                (type_bits & (1 << i)) != 0 && memory_type.property_flags.contains(properties)
            })
            .map(|(i, _)| i as u32)
    }
}

/// A selectable GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalDevice {
    /// Position in the renderer's enumeration order.
    pub index: u32,
    pub name: String,
    pub device_type: PhysicalDeviceType,
    /// `(major, minor, patch)` of the API the device implements.
    pub api_version: (u32, u32, u32),
    pub driver_version: u32,
    pub vendor_id: u32,
    pub device_id: u32,
    pub limits: PhysicalDeviceLimits,
    pub features: PhysicalDeviceFeatures,
    pub queue_families: Vec<QueueFamilyProperties>,
    pub memory: MemoryProperties,
}

impl PhysicalDevice {
    /// Preference score: discrete GPUs first, then integrated ones.
    ///
    /// A device without a graphics queue family scores 0 and is never picked.
    pub fn score(&self) -> u32 {
        if self.find_queue_family(QueueFlags::GRAPHICS).is_none() {
            return 0;
        }

        match self.device_type {
            PhysicalDeviceType::DiscreteGpu => 1000,
            PhysicalDeviceType::IntegratedGpu => 100,
            PhysicalDeviceType::VirtualGpu => 10,
            PhysicalDeviceType::Cpu | PhysicalDeviceType::Other => 1,
        }
    }

    /// Index of the first queue family supporting every flag in `flags`.
    pub fn find_queue_family(&self, flags: QueueFlags) -> Option<u32> {
        self.queue_families
            .iter()
            .position(|family| family.queue_count > 0 && family.flags.contains(flags))
            .map(|i| i as u32)
    }
}

/// The highest-scored usable device. Ties keep the earliest one.
pub fn select_physical_device(devices: &[PhysicalDevice]) -> Option<&PhysicalDevice> {
    let mut best: Option<&PhysicalDevice> = None;
    for device in devices {
        let score = device.score();
        if score > best.map_or(0, PhysicalDevice::score) {
            best = Some(device);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(index: u32, device_type: PhysicalDeviceType, graphics: bool) -> PhysicalDevice {
        let flags = if graphics {
            QueueFlags::GRAPHICS | QueueFlags::COMPUTE
        } else {
            QueueFlags::COMPUTE
        };
        PhysicalDevice {
            index,
            name: format!("GPU {index}"),
            device_type,
            api_version: (1, 3, 0),
            driver_version: 0,
            vendor_id: 0,
            device_id: index,
            limits: PhysicalDeviceLimits::default(),
            features: PhysicalDeviceFeatures::default(),
            queue_families: vec![QueueFamilyProperties {
                flags,
                queue_count: 1,
                timestamp_valid_bits: 64,
            }],
            memory: MemoryProperties::default(),
        }
    }

    #[test]
    fn discrete_gpus_win() {
        let devices = vec![
            device(0, PhysicalDeviceType::IntegratedGpu, true),
            device(1, PhysicalDeviceType::DiscreteGpu, true),
            device(2, PhysicalDeviceType::Cpu, true),
        ];
        assert_eq!(select_physical_device(&devices).map(|d| d.index), Some(1));
    }

    #[test]
    fn devices_without_graphics_are_skipped() {
        let devices = vec![device(0, PhysicalDeviceType::DiscreteGpu, false)];
        assert!(select_physical_device(&devices).is_none());
    }

    #[test]
    fn memory_type_search_honours_type_bits() {
        let memory = MemoryProperties {
            types: vec![
                MemoryType {
                    property_flags: MemoryPropertyFlags::DEVICE_LOCAL,
                    heap_index: 0,
                },
                MemoryType {
                    property_flags: MemoryPropertyFlags::HOST_VISIBLE
                        | MemoryPropertyFlags::HOST_COHERENT,
                    heap_index: 1,
                },
            ],
            heaps: Vec::new(),
        };
        assert_eq!(
            memory.find_memory_type(0b11, MemoryPropertyFlags::HOST_VISIBLE),
            Some(1)
        );
        assert_eq!(
            memory.find_memory_type(0b01, MemoryPropertyFlags::HOST_VISIBLE),
            None
        );
    }
}
