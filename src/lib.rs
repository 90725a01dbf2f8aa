// renderer-hal: one GPU object model, two backends
//
// The backend-neutral contract lives at the crate root. `backend::gl` replays it on an
// immediate-mode context, `backend::vulkan` translates it to explicit Vulkan objects.

pub mod backend;
pub mod command;
pub mod config;
pub mod core;
pub mod descriptor;
pub mod enums;
pub mod error;
pub mod flags;
pub mod logging;
pub mod pipeline;
pub mod projection;
pub mod query;
pub mod render_pass;
pub mod resource;
pub mod shader;
pub mod sync;
pub mod transfer;

pub use crate::core::{
    Connection, ContextGuard, Device, NativeHandle, PhysicalDevice, Renderer,
    RendererConfiguration, SwapChain, WindowHandle,
};
pub use crate::error::{Error, Result};
pub use crate::projection::{ClipDirection, ClipOrigin, DepthRange};
