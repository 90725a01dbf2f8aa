// Pipelines: fixed-function state values, layouts and graphics pipeline objects.

mod graphics;
mod layout;
mod state;

pub use graphics::{
    GraphicsPipelineCreateInfo, Pipeline, PipelineStates, Scissor, VertexInputAttribute,
    VertexInputBinding, VertexInputState, Viewport,
};
pub use layout::{PipelineLayout, PipelineLayoutDescription, PushConstantRange};
pub use state::{
    state_hash, ColourBlendAttachment, ColourBlendState, DepthStencilState, InputAssemblyState,
    MultisampleState, RasterisationState, StencilOpState, TessellationState,
};
