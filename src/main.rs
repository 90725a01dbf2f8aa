// =============================================================================
// hal-caps - prints what a renderer backend sees
// =============================================================================
//
// FLOW:
// 1. Load config.toml and set up logging
// 2. Create the configured renderer (Vulkan, or GL over a recording context)
// 3. List the physical devices
// 4. Open a headless device on the preferred one and print its projection setup
//
// =============================================================================

use anyhow::{Context, Result};

use renderer_hal::backend::gl::{GlCapabilities, GlRenderer, RecordingContextFactory};
use renderer_hal::backend::vulkan::VulkanRenderer;
use renderer_hal::config::{Backend, Config};
use renderer_hal::{logging, PhysicalDevice, Renderer, WindowHandle};

fn main() -> Result<()> {
    let config = Config::load();
    logging::init(&config.logging);
    log::info!("Starting hal-caps ({:?} backend)", config.renderer.backend);

    let renderer: Box<dyn Renderer> = match config.renderer.backend {
        Backend::Vulkan => Box::new(
            VulkanRenderer::new(config.renderer_configuration())
                .context("Failed to create Vulkan renderer")?
                .with_present_mode(config.present_mode()),
        ),
        Backend::Gl => Box::new(GlRenderer::new(
            config.renderer_configuration(),
            Box::new(RecordingContextFactory::new(GlCapabilities::default())),
        )),
    };

    for device in renderer.physical_devices() {
        print_device(device);
    }

    let index = match config.renderer.device_index.or_else(|| renderer.default_device_index()) {
        Some(index) => index,
        None => {
            println!("No usable device");
            return Ok(());
        }
    };
    let connection = renderer
        .create_connection(index, WindowHandle::Headless)
        .context("Failed to connect to device")?;
    let device = renderer
        .create_device(&connection)
        .context("Failed to create device")?;

    println!();
    println!("Device {index} opened on the {} backend", device.renderer_name());
    println!("  clip direction: {:?}", device.clip_direction());
    println!(
        "  perspective(60°, 16:9, 0.1, 100):\n{}",
        device.perspective(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0)
    );
    println!(
        "  infinite perspective(60°, 16:9, 0.1):\n{}",
        device.infinite_perspective(60f32.to_radians(), 16.0 / 9.0, 0.1)
    );
    println!("  timestamp period: {} ns", device.timestamp_period());

    device.wait_idle()?;
    log::info!("Done");
    Ok(())
}

fn print_device(device: &PhysicalDevice) {
    let (major, minor, patch) = device.api_version;
    println!(
        "[{}] {} ({:?}), API {major}.{minor}.{patch}, vendor {:#06x}, device {:#06x}",
        device.index, device.name, device.device_type, device.vendor_id, device.device_id
    );
    for (family, properties) in device.queue_families.iter().enumerate() {
        println!(
            "    queue family {family}: {:?} x{}",
            properties.flags, properties.queue_count
        );
    }
    let limits = &device.limits;
    println!(
        "    max 2D image {}, push constants {} B, anisotropy {}",
        limits.max_image_dimension_2d, limits.max_push_constants_size, limits.max_sampler_anisotropy
    );
    println!(
        "    uniform offset alignment {}, texel offset alignment {}",
        limits.min_uniform_buffer_offset_alignment, limits.min_texel_buffer_offset_alignment
    );
    for (heap, properties) in device.memory.heaps.iter().enumerate() {
        println!(
            "    memory heap {heap}: {} MiB {:?}",
            properties.size / (1024 * 1024),
            properties.flags
        );
    }
    println!("    {:?}", device.features);
}
