// Vulkan renderer instance
//
// Owns the loader entry, the instance and the debug messenger. Physical devices are enumerated
// once at construction.

use std::ffi::{CStr, CString};

use anyhow::Context;
use ash::extensions::{ext, khr};
use ash::{vk, Entry};

use super::convert;
use super::device::VulkanDevice;
use super::surface;
use crate::core::{Connection, Device, PhysicalDevice, Renderer, RendererConfiguration, WindowHandle};
use crate::enums::PresentMode;
use crate::error::{Error, Result};
use crate::projection::ClipDirection;

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Per-connection state: the chosen GPU and the window surface, if any.
pub struct VulkanConnection {
    pub physical: vk::PhysicalDevice,
    pub surface: Option<(khr::Surface, vk::SurfaceKHR)>,
}

impl Drop for VulkanConnection {
    fn drop(&mut self) {
        if let Some((loader, surface)) = self.surface.take() {
            unsafe { loader.destroy_surface(surface, None) };
        }
    }
}

pub struct VulkanRenderer {
    configuration: RendererConfiguration,
    present_mode: PresentMode,
    entry: Entry,
    instance: ash::Instance,
    debug_utils: Option<(ext::DebugUtils, vk::DebugUtilsMessengerEXT)>,
    handles: Vec<vk::PhysicalDevice>,
    devices: Vec<PhysicalDevice>,
}

impl VulkanRenderer {
    pub fn new(configuration: RendererConfiguration) -> Result<Self> {
        log::info!("Creating Vulkan renderer: {}", configuration.app_name);

        let entry = unsafe { Entry::load() }
            .context("Failed to load Vulkan library. Is Vulkan installed?")?;

        let validation = configuration.enable_validation && Self::has_validation_layer(&entry)?;
        let instance = Self::create_instance(&entry, &configuration, validation)?;

        let debug_utils = if validation {
            match Self::setup_debug_messenger(&entry, &instance) {
                Ok(messenger) => Some(messenger),
                Err(e) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(e);
                }
            }
        } else {
            None
        };

        let mut renderer = Self {
            configuration,
            present_mode: PresentMode::Fifo,
            entry,
            instance,
            debug_utils,
            handles: Vec::new(),
            devices: Vec::new(),
        };
        renderer.enumerate_devices()?;
        Ok(renderer)
    }

    /// The present mode swap chains prefer. FIFO is used when the surface lacks it.
    pub fn with_present_mode(mut self, present_mode: PresentMode) -> Self {
        self.present_mode = present_mode;
        self
    }

    fn has_validation_layer(entry: &Entry) -> Result<bool> {
        let layers = entry
            .enumerate_instance_layer_properties()
            .context("Failed to enumerate instance layers")?;
        let found = layers
            .iter()
            .any(|layer| convert::c_name(&layer.layer_name) == VALIDATION_LAYER.to_string_lossy());
        if !found {
            log::warn!("Validation requested but {VALIDATION_LAYER:?} is not installed");
        }
        Ok(found)
    }

    fn create_instance(
        entry: &Entry,
        configuration: &RendererConfiguration,
        validation: bool,
    ) -> Result<ash::Instance> {
        let app_name = CString::new(configuration.app_name.as_str())
            .context("Application name contains a NUL byte")?;
        let engine_name = CString::new(configuration.engine_name.as_str())
            .context("Engine name contains a NUL byte")?;

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(&engine_name)
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_3);

        let available: Vec<String> = entry
            .enumerate_instance_extension_properties(None)
            .context("Failed to enumerate instance extensions")?
            .iter()
            .map(|extension| convert::c_name(&extension.extension_name))
            .collect();
        let is_available =
            |name: &CStr| available.iter().any(|candidate| *candidate == name.to_string_lossy());

        let mut extensions: Vec<*const std::os::raw::c_char> = surface::surface_extensions()
            .into_iter()
            .filter(|name| is_available(*name))
            .map(CStr::as_ptr)
            .collect();
        if validation {
            extensions.push(ext::DebugUtils::name().as_ptr());
        }

        let layer_names = if validation {
            vec![VALIDATION_LAYER.as_ptr()]
        } else {
            vec![]
        };

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_names);

        let instance = unsafe { entry.create_instance(&create_info, None) }
            .context("Failed to create Vulkan instance")?;
        Ok(instance)
    }

    fn setup_debug_messenger(
        entry: &Entry,
        instance: &ash::Instance,
    ) -> Result<(ext::DebugUtils, vk::DebugUtilsMessengerEXT)> {
        let debug_utils = ext::DebugUtils::new(entry, instance);

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
            .context("Failed to create debug messenger")?;

        Ok((debug_utils, messenger))
    }

    fn enumerate_devices(&mut self) -> Result<()> {
        let handles = unsafe { self.instance.enumerate_physical_devices() }
            .context("Failed to enumerate physical devices")?;
        if handles.is_empty() {
            log::warn!("No Vulkan-capable GPU found");
        }

        for (index, &handle) in handles.iter().enumerate() {
            let device = unsafe {
                convert::physical_device(
                    index as u32,
                    &self.instance.get_physical_device_properties(handle),
                    &self.instance.get_physical_device_features(handle),
                    &self
                        .instance
                        .get_physical_device_queue_family_properties(handle),
                    &self.instance.get_physical_device_memory_properties(handle),
                )
            };
            log::info!(
                "GPU {}: {} ({:?}, API {}.{}.{})",
                index,
                device.name,
                device.device_type,
                device.api_version.0,
                device.api_version.1,
                device.api_version.2
            );
            self.devices.push(device);
        }
        self.handles = handles;
        Ok(())
    }
}

impl Renderer for VulkanRenderer {
    fn name(&self) -> &str {
        "vk"
    }

    fn configuration(&self) -> &RendererConfiguration {
        &self.configuration
    }

    fn clip_direction(&self) -> ClipDirection {
        ClipDirection::TOP_DOWN
    }

    fn physical_devices(&self) -> &[PhysicalDevice] {
        &self.devices
    }

    fn create_connection(&self, device_index: u32, window: WindowHandle) -> Result<Connection<'_>> {
        let physical = *self.handles.get(device_index as usize).ok_or_else(|| {
            Error::precondition(format!(
                "Physical device {device_index} does not exist ({} found)",
                self.handles.len()
            ))
        })?;

        let surface = unsafe { surface::create_surface(&self.entry, &self.instance, &window)? }
            .map(|surface| (khr::Surface::new(&self.entry, &self.instance), surface));
        let native = VulkanConnection { physical, surface };
        Ok(Connection::new(device_index, window, Box::new(native)))
    }

    fn create_device<'a>(&'a self, connection: &'a Connection<'a>) -> Result<Box<dyn Device + 'a>> {
        let native = connection
            .native::<VulkanConnection>()
            .ok_or(Error::ForeignObject("connection"))?;
        let physical_device = self
            .devices
            .get(connection.device_index() as usize)
            .cloned()
            .ok_or_else(|| {
                Error::precondition(format!(
                    "Physical device {} does not exist",
                    connection.device_index()
                ))
            })?;
        Ok(Box::new(VulkanDevice::new(
            &self.instance,
            native,
            physical_device,
            self.present_mode,
        )?))
    }
}

impl Drop for VulkanRenderer {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan renderer");
        unsafe {
            if let Some((debug_utils, messenger)) = self.debug_utils.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let message = CStr::from_ptr((*p_callback_data).p_message);

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            log::error!("[Vulkan] {}", message.to_string_lossy());
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            log::warn!("[Vulkan] {}", message.to_string_lossy());
        }
        _ => {
            log::debug!("[Vulkan] {}", message.to_string_lossy());
        }
    }

    vk::FALSE
}
