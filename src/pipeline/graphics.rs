// Graphics pipelines

use glam::{IVec2, UVec2};

use super::{
    ColourBlendState, DepthStencilState, InputAssemblyState, MultisampleState, PipelineLayout,
    RasterisationState, TessellationState,
};
use crate::core::{NativeHandle, PhysicalDeviceFeatures};
use crate::enums::{AttributeFormat, PipelineBindPoint, PolygonMode, PrimitiveTopology, VertexInputRate};
use crate::error::{Error, Result};
use crate::flags::ShaderStageFlags;
use crate::render_pass::RenderPass;
use crate::shader::ShaderModule;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    pub fn from_extent(extent: UVec2) -> Self {
        Self::new(0.0, 0.0, extent.x as f32, extent.y as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scissor {
    pub offset: IVec2,
    pub extent: UVec2,
}

impl Scissor {
    pub fn new(offset: IVec2, extent: UVec2) -> Self {
        Self { offset, extent }
    }

    pub fn from_extent(extent: UVec2) -> Self {
        Self::new(IVec2::ZERO, extent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexInputBinding {
    pub binding: u32,
    pub stride: u32,
    pub input_rate: VertexInputRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexInputAttribute {
    pub location: u32,
    pub binding: u32,
    pub format: AttributeFormat,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexInputState {
    pub bindings: Vec<VertexInputBinding>,
    pub attributes: Vec<VertexInputAttribute>,
}

impl VertexInputState {
    pub fn binding(&self, binding: u32) -> Option<&VertexInputBinding> {
        self.bindings.iter().find(|candidate| candidate.binding == binding)
    }

    /// Attributes fed by `binding`.
    pub fn attributes_of(&self, binding: u32) -> impl Iterator<Item = &VertexInputAttribute> {
        self.attributes
            .iter()
            .filter(move |attribute| attribute.binding == binding)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, binding) in self.bindings.iter().enumerate() {
            if self.bindings[..i].iter().any(|other| other.binding == binding.binding) {
                return Err(Error::precondition(format!(
                    "Vertex binding {} is declared twice",
                    binding.binding
                )));
            }
        }
        for (i, attribute) in self.attributes.iter().enumerate() {
            if self.binding(attribute.binding).is_none() {
                return Err(Error::precondition(format!(
                    "Vertex attribute {} reads undeclared binding {}",
                    attribute.location, attribute.binding
                )));
            }
            if self.attributes[..i]
                .iter()
                .any(|other| other.location == attribute.location)
            {
                return Err(Error::precondition(format!(
                    "Vertex attribute location {} is declared twice",
                    attribute.location
                )));
            }
        }
        Ok(())
    }
}

/// Everything fixed at pipeline creation besides shaders, layout and render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStates {
    pub vertex_input: VertexInputState,
    pub input_assembly: InputAssemblyState,
    pub tessellation: TessellationState,
    /// `None` makes the viewport dynamic: command buffers set it.
    pub viewport: Option<Viewport>,
    /// `None` makes the scissor dynamic: command buffers set it.
    pub scissor: Option<Scissor>,
    pub rasterisation: RasterisationState,
    pub multisample: MultisampleState,
    pub depth_stencil: DepthStencilState,
    pub colour_blend: ColourBlendState,
}

pub struct GraphicsPipelineCreateInfo<'a> {
    pub layout: &'a dyn PipelineLayout,
    pub render_pass: &'a dyn RenderPass,
    pub subpass: u32,
    /// At most one module per stage; a vertex stage is required.
    pub stages: Vec<&'a dyn ShaderModule>,
    pub states: PipelineStates,
}

impl<'a> GraphicsPipelineCreateInfo<'a> {
    pub fn new(
        layout: &'a dyn PipelineLayout,
        render_pass: &'a dyn RenderPass,
        subpass: u32,
        stages: Vec<&'a dyn ShaderModule>,
    ) -> Self {
        Self {
            layout,
            render_pass,
            subpass,
            stages,
            states: PipelineStates::default(),
        }
    }

    pub fn with_states(mut self, states: PipelineStates) -> Self {
        self.states = states;
        self
    }

    pub fn validate(&self, features: &PhysicalDeviceFeatures) -> Result<()> {
        let mut seen = ShaderStageFlags::empty();
        for module in &self.stages {
            let stage = module.stage();
            if stage.bits().count_ones() != 1 || seen.intersects(stage) {
                return Err(Error::precondition(format!(
                    "Shader stage {stage:?} is not a single new stage"
                )));
            }
            if module.native().is_none() {
                return Err(Error::precondition(format!(
                    "Shader module for {stage:?} has no code loaded"
                )));
            }
            seen |= stage;
        }
        if !seen.contains(ShaderStageFlags::VERTEX) {
            return Err(Error::precondition("Graphics pipeline needs a vertex stage"));
        }
        if seen.contains(ShaderStageFlags::COMPUTE) {
            return Err(Error::precondition("Graphics pipeline cannot hold a compute stage"));
        }

        let subpasses = self.render_pass.description().subpasses();
        let subpass = subpasses.get(self.subpass as usize).ok_or_else(|| {
            Error::precondition(format!(
                "Subpass {} does not exist ({} subpasses)",
                self.subpass,
                subpasses.len()
            ))
        })?;
        let states = &self.states;
        if subpass.colour_attachments.len() != states.colour_blend.attachments.len() {
            return Err(Error::precondition(format!(
                "Subpass {} writes {} colour attachments, blend state describes {}",
                self.subpass,
                subpass.colour_attachments.len(),
                states.colour_blend.attachments.len()
            )));
        }

        let tessellated = seen.intersects(
            ShaderStageFlags::TESSELLATION_CONTROL | ShaderStageFlags::TESSELLATION_EVALUATION,
        );
        let patches = states.input_assembly.topology == PrimitiveTopology::PatchList;
        if tessellated != patches || (patches && states.tessellation.patch_control_points == 0) {
            return Err(Error::precondition(
                "Tessellation stages need a patch list topology with control points",
            ));
        }

        states.vertex_input.validate()?;

        let unsupported = |what: &str| Err(Error::Unsupported(format!("{what} is not supported by this device")));
        let raster = &states.rasterisation;
        if raster.polygon_mode != PolygonMode::Fill && !features.fill_mode_non_solid {
            return unsupported("Non-solid fill mode");
        }
        if raster.line_width != 1.0 && !features.wide_lines {
            return unsupported("Wide lines");
        }
        if raster.depth_clamp_enable && !features.depth_clamp {
            return unsupported("Depth clamp");
        }
        if states.colour_blend.logic_op_enable && !features.logic_op {
            return unsupported("Logic op");
        }
        if states.depth_stencil.depth_bounds_test_enable && !features.depth_bounds {
            return unsupported("Depth bounds test");
        }
        if states.multisample.sample_shading_enable && !features.sample_rate_shading {
            return unsupported("Sample rate shading");
        }

        Ok(())
    }
}

pub trait Pipeline {
    fn bind_point(&self) -> PipelineBindPoint;

    fn states(&self) -> &PipelineStates;

    /// Native handle of the layout the pipeline was created with.
    fn layout(&self) -> NativeHandle;

    fn native(&self) -> NativeHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_attributes_need_declared_bindings() {
        let binding = VertexInputBinding {
            binding: 0,
            stride: 24,
            input_rate: VertexInputRate::Vertex,
        };
        let attribute = |location, binding| VertexInputAttribute {
            location,
            binding,
            format: AttributeFormat::Vec3f,
            offset: 0,
        };

        let valid = VertexInputState {
            bindings: vec![binding],
            attributes: vec![attribute(0, 0), attribute(1, 0)],
        };
        assert!(valid.validate().is_ok());
        assert_eq!(valid.attributes_of(0).count(), 2);

        let dangling = VertexInputState {
            bindings: vec![binding],
            attributes: vec![attribute(0, 1)],
        };
        assert!(dangling.validate().is_err());

        let clashing = VertexInputState {
            bindings: vec![binding],
            attributes: vec![attribute(0, 0), attribute(0, 0)],
        };
        assert!(clashing.validate().is_err());
    }
}
