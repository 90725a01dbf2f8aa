// GL renderer instance

use std::rc::Rc;

use super::context::{GlContext, GlContextFactory};
use super::device::GlDevice;
use crate::core::{Connection, Device, PhysicalDevice, Renderer, RendererConfiguration, WindowHandle};
use crate::error::{Error, Result};
use crate::projection::ClipDirection;

/// Renderer over the contexts of a `GlContextFactory`. It exposes exactly one physical device.
pub struct GlRenderer {
    configuration: RendererConfiguration,
    factory: Box<dyn GlContextFactory>,
    devices: Vec<PhysicalDevice>,
}

impl GlRenderer {
    pub fn new(configuration: RendererConfiguration, factory: Box<dyn GlContextFactory>) -> Self {
        let devices = vec![factory.capabilities().physical_device()];
        log::info!(
            "GL renderer for {}: {}",
            configuration.app_name,
            factory.capabilities().renderer
        );
        Self {
            configuration,
            factory,
            devices,
        }
    }
}

impl Renderer for GlRenderer {
    fn name(&self) -> &str {
        "gl"
    }

    fn configuration(&self) -> &RendererConfiguration {
        &self.configuration
    }

    fn clip_direction(&self) -> ClipDirection {
        if self.factory.capabilities().supports_clip_control() {
            ClipDirection::TOP_DOWN
        } else {
            ClipDirection::BOTTOM_UP
        }
    }

    fn physical_devices(&self) -> &[PhysicalDevice] {
        &self.devices
    }

    fn create_connection(&self, device_index: u32, window: WindowHandle) -> Result<Connection<'_>> {
        if device_index as usize >= self.devices.len() {
            return Err(Error::precondition(format!(
                "GL exposes one physical device, {device_index} was asked for"
            )));
        }
        let context = self.factory.create_context(&window)?;
        Ok(Connection::new(device_index, window, Box::new(context)))
    }

    fn create_device<'a>(&'a self, connection: &'a Connection<'a>) -> Result<Box<dyn Device + 'a>> {
        let context = connection
            .native::<Rc<dyn GlContext>>()
            .ok_or(Error::ForeignObject("connection"))?;
        let caps = self.factory.capabilities().clone();
        Ok(Box::new(GlDevice::new(Rc::clone(context), caps)?))
    }
}
