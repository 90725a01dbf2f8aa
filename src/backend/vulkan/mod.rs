// Vulkan backend
//
// Every object holds the device's shared state. Calls that only record or bind go straight to
// the driver; misuse Vulkan leaves undefined is checked here first, with the same errors as GL.

mod buffer;
mod command;
mod convert;
mod descriptor;
mod device;
mod image;
mod pipeline;
mod query;
mod render_pass;
mod renderer;
mod sampler;
mod shader;
mod shared;
mod state;
mod surface;
mod swapchain;
mod sync;
mod transfer;

pub use buffer::{VulkanBuffer, VulkanBufferView};
pub use command::{VulkanCommandBuffer, VulkanCommandPool, VulkanQueue};
pub use descriptor::{
    VulkanDescriptorSet, VulkanDescriptorSetLayout, VulkanDescriptorSetPool, VulkanPipelineLayout,
};
pub use device::{choose_queue_families, VulkanDevice};
pub use image::{VulkanTexture, VulkanTextureView};
pub use pipeline::VulkanPipeline;
pub use query::VulkanQueryPool;
pub use render_pass::{VulkanFrameBuffer, VulkanRenderPass};
pub use renderer::{VulkanConnection, VulkanRenderer};
pub use sampler::VulkanSampler;
pub use shader::VulkanShaderModule;
pub use shared::{QueueFamilies, VulkanShared};
pub use swapchain::VulkanSwapChain;
pub use sync::{VulkanFence, VulkanSemaphore};
