// Memory-backed GPU resources.

mod buffer;
mod sampler;
mod staging_buffer;
mod texture;
mod uniform_buffer;

pub use buffer::{check_buffer_view, Buffer, BufferView};
pub use sampler::{BorderColour, BorderColourValue, Sampler, SamplerCreateInfo};
pub use staging_buffer::StagingBuffer;
pub use texture::{ImageSubresourceRange, Texture, TextureInfo, TextureView, TextureViewInfo};
pub use uniform_buffer::{aligned_size, UniformBuffer};
