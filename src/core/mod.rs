// Backend-neutral device model: renderer instances, physical devices, connections and the
// device factory.

mod connection;
mod device;
mod handle;
mod physical_device;
mod renderer;
mod swapchain;

pub use connection::{Connection, WindowHandle};
pub use device::{ContextGuard, Device};
pub use handle::NativeHandle;
pub use physical_device::{
    select_physical_device, MemoryHeap, MemoryProperties, MemoryType, PhysicalDevice,
    PhysicalDeviceFeatures, PhysicalDeviceLimits, QueueFamilyProperties,
};
pub use renderer::{Renderer, RendererConfiguration};
pub use swapchain::SwapChain;
