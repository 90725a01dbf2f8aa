// Backends
//
// `gl` drives an immediate-mode context through recorded call lists. `vulkan` maps every object
// one-to-one onto ash handles.

pub mod gl;
pub mod vulkan;
