// GL backend
//
// GL calls are values (`GlCall`) executed through a `GlContext`. Object creation runs them right
// away; command buffers record them and queues replay them. Everything relies on direct state
// access (GL 4.5 or GL_ARB_direct_state_access).

mod buffer;
pub mod call;
mod command;
pub mod consts;
pub mod context;
mod convert;
mod descriptor;
mod device;
mod image;
mod pipeline;
mod query;
pub mod recording;
mod render_pass;
mod renderer;
mod sampler;
mod shader;
mod shared;
mod state;
mod swapchain;
mod sync;
mod transfer;

pub use buffer::{GlBuffer, GlBufferView};
pub use call::{GlCall, GlValue};
pub use command::{GlCommandBuffer, GlCommandPool, GlQueue};
pub use context::{GlCapabilities, GlContext, GlContextFactory};
pub use descriptor::{GlDescriptorSet, GlDescriptorSetLayout, GlDescriptorSetPool, GlPipelineLayout};
pub use device::{GlDevice, PUSH_CONSTANT_BLOCK_SIZE};
pub use image::{GlDefaultView, GlTexture, GlTextureView};
pub use pipeline::GlPipeline;
pub use query::GlQueryPool;
pub use recording::{RecordingContext, RecordingContextFactory};
pub use render_pass::{GlFrameBuffer, GlRenderPass};
pub use renderer::GlRenderer;
pub use sampler::GlSampler;
pub use shader::GlShaderModule;
pub use shared::GlShared;
pub use swapchain::GlSwapChain;
pub use sync::{GlFence, GlSemaphore};
