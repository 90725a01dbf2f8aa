// Renderer instance
//
// One per process: holds the immutable configuration, enumerates GPUs and hands out
// connections and devices. Which backend it is stays visible through `name` and
// `clip_direction`.

use super::{Connection, Device, PhysicalDevice, WindowHandle};
use crate::error::Result;
use crate::projection::ClipDirection;

/// Process-wide renderer settings, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfiguration {
    pub app_name: String,
    pub engine_name: String,
    pub enable_validation: bool,
}

impl Default for RendererConfiguration {
    fn default() -> Self {
        Self {
            app_name: "renderer-hal".to_string(),
            engine_name: "renderer-hal".to_string(),
            enable_validation: cfg!(debug_assertions),
        }
    }
}

pub trait Renderer {
    /// Short backend name, `"gl"` or `"vk"`.
    fn name(&self) -> &str;

    fn configuration(&self) -> &RendererConfiguration;

    /// The clip-space convention projection matrices must target.
    fn clip_direction(&self) -> ClipDirection;

    fn physical_devices(&self) -> &[PhysicalDevice];

    /// Binds the physical device at `device_index` to a window (or to nothing, headless).
    fn create_connection(&self, device_index: u32, window: WindowHandle) -> Result<Connection<'_>>;

    /// Creates the logical device for a connection.
    fn create_device<'a>(&'a self, connection: &'a Connection<'a>) -> Result<Box<dyn Device + 'a>>;

    /// Index of the preferred physical device, if any is usable.
    fn default_device_index(&self) -> Option<u32> {
        super::select_physical_device(self.physical_devices()).map(|device| device.index)
    }
}
