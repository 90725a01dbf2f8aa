// Fixed-function states baked into Vulkan create-info structs
//
// Baking happens once per pipeline. `BakedStates` owns every array a create-info points into,
// so the builders it hands out borrow it and cannot outlive the data.

use ash::vk;

use super::convert;
use crate::pipeline::{
    ColourBlendAttachment, ColourBlendState, DepthStencilState, InputAssemblyState,
    MultisampleState, PipelineStates, RasterisationState, Scissor, StencilOpState,
    TessellationState, VertexInputState, Viewport,
};

fn bool32(value: bool) -> vk::Bool32 {
    if value {
        vk::TRUE
    } else {
        vk::FALSE
    }
}

pub fn colour_blend_attachment(attachment: &ColourBlendAttachment) -> vk::PipelineColorBlendAttachmentState {
    vk::PipelineColorBlendAttachmentState {
        blend_enable: bool32(attachment.blend_enable),
        src_color_blend_factor: convert::blend_factor(attachment.src_colour_blend_factor),
        dst_color_blend_factor: convert::blend_factor(attachment.dst_colour_blend_factor),
        color_blend_op: convert::blend_op(attachment.colour_blend_op),
        src_alpha_blend_factor: convert::blend_factor(attachment.src_alpha_blend_factor),
        dst_alpha_blend_factor: convert::blend_factor(attachment.dst_alpha_blend_factor),
        alpha_blend_op: convert::blend_op(attachment.alpha_blend_op),
        color_write_mask: convert::colour_components(attachment.colour_write_mask),
    }
}

pub fn rasterisation(state: &RasterisationState) -> vk::PipelineRasterizationStateCreateInfo {
    vk::PipelineRasterizationStateCreateInfo {
        depth_clamp_enable: bool32(state.depth_clamp_enable),
        rasterizer_discard_enable: bool32(state.rasteriser_discard_enable),
        polygon_mode: convert::polygon_mode(state.polygon_mode),
        cull_mode: convert::cull_mode(state.cull_mode),
        front_face: convert::front_face(state.front_face),
        depth_bias_enable: bool32(state.depth_bias_enable),
        depth_bias_constant_factor: state.depth_bias_constant_factor,
        depth_bias_clamp: state.depth_bias_clamp,
        depth_bias_slope_factor: state.depth_bias_slope_factor,
        line_width: state.line_width,
        ..Default::default()
    }
}

pub fn stencil_op_state(state: &StencilOpState) -> vk::StencilOpState {
    vk::StencilOpState {
        fail_op: convert::stencil_op(state.fail_op),
        pass_op: convert::stencil_op(state.pass_op),
        depth_fail_op: convert::stencil_op(state.depth_fail_op),
        compare_op: convert::compare_op(state.compare_op),
        compare_mask: state.compare_mask,
        write_mask: state.write_mask,
        reference: state.reference,
    }
}

pub fn depth_stencil(state: &DepthStencilState) -> vk::PipelineDepthStencilStateCreateInfo {
    vk::PipelineDepthStencilStateCreateInfo {
        depth_test_enable: bool32(state.depth_test_enable),
        depth_write_enable: bool32(state.depth_write_enable),
        depth_compare_op: convert::compare_op(state.depth_compare_op),
        depth_bounds_test_enable: bool32(state.depth_bounds_test_enable),
        stencil_test_enable: bool32(state.stencil_test_enable),
        front: stencil_op_state(&state.front),
        back: stencil_op_state(&state.back),
        min_depth_bounds: state.min_depth_bounds,
        max_depth_bounds: state.max_depth_bounds,
        ..Default::default()
    }
}

pub fn input_assembly(state: &InputAssemblyState) -> vk::PipelineInputAssemblyStateCreateInfo {
    vk::PipelineInputAssemblyStateCreateInfo {
        topology: convert::primitive_topology(state.topology),
        primitive_restart_enable: bool32(state.primitive_restart_enable),
        ..Default::default()
    }
}

/// `None` when the pipeline has no tessellation stages.
pub fn tessellation(state: &TessellationState) -> Option<vk::PipelineTessellationStateCreateInfo> {
    (state.patch_control_points > 0).then(|| vk::PipelineTessellationStateCreateInfo {
        patch_control_points: state.patch_control_points,
        ..Default::default()
    })
}

pub fn viewport(viewport: &Viewport) -> vk::Viewport {
    vk::Viewport {
        x: viewport.x,
        y: viewport.y,
        width: viewport.width,
        height: viewport.height,
        min_depth: viewport.min_depth,
        max_depth: viewport.max_depth,
    }
}

pub fn scissor(scissor: &Scissor) -> vk::Rect2D {
    vk::Rect2D {
        offset: vk::Offset2D {
            x: scissor.offset.x,
            y: scissor.offset.y,
        },
        extent: vk::Extent2D {
            width: scissor.extent.x,
            height: scissor.extent.y,
        },
    }
}

pub fn vertex_bindings(state: &VertexInputState) -> Vec<vk::VertexInputBindingDescription> {
    state
        .bindings
        .iter()
        .map(|binding| vk::VertexInputBindingDescription {
            binding: binding.binding,
            stride: binding.stride,
            input_rate: convert::input_rate(binding.input_rate),
        })
        .collect()
}

pub fn vertex_attributes(state: &VertexInputState) -> Vec<vk::VertexInputAttributeDescription> {
    state
        .attributes
        .iter()
        .map(|attribute| vk::VertexInputAttributeDescription {
            location: attribute.location,
            binding: attribute.binding,
            format: convert::attribute_format(attribute.format),
            offset: attribute.offset,
        })
        .collect()
}

/// 32-bit words of sample mask a sample count needs.
fn sample_mask(state: &MultisampleState) -> Vec<vk::SampleMask> {
    let words = state.rasterisation_samples.count().div_ceil(32) as usize;
    let mut mask = vec![u32::MAX; words];
    mask[0] = state.sample_mask;
    mask
}

/// Every fixed-function state of one pipeline, in Vulkan form.
pub struct BakedStates {
    bindings: Vec<vk::VertexInputBindingDescription>,
    attributes: Vec<vk::VertexInputAttributeDescription>,
    viewports: Vec<vk::Viewport>,
    scissors: Vec<vk::Rect2D>,
    dynamic: Vec<vk::DynamicState>,
    sample_mask: Vec<vk::SampleMask>,
    multisample: MultisampleState,
    blend_attachments: Vec<vk::PipelineColorBlendAttachmentState>,
    colour_blend: ColourBlendState,
    pub input_assembly: vk::PipelineInputAssemblyStateCreateInfo,
    pub tessellation: Option<vk::PipelineTessellationStateCreateInfo>,
    pub rasterisation: vk::PipelineRasterizationStateCreateInfo,
    pub depth_stencil: vk::PipelineDepthStencilStateCreateInfo,
}

impl BakedStates {
    pub fn new(states: &PipelineStates) -> Self {
        let mut dynamic = Vec::new();
        if states.viewport.is_none() {
            dynamic.push(vk::DynamicState::VIEWPORT);
        }
        if states.scissor.is_none() {
            dynamic.push(vk::DynamicState::SCISSOR);
        }

        Self {
            bindings: vertex_bindings(&states.vertex_input),
            attributes: vertex_attributes(&states.vertex_input),
            viewports: states.viewport.iter().map(viewport).collect(),
            scissors: states.scissor.iter().map(scissor).collect(),
            dynamic,
            sample_mask: sample_mask(&states.multisample),
            multisample: states.multisample,
            blend_attachments: states
                .colour_blend
                .attachments
                .iter()
                .map(colour_blend_attachment)
                .collect(),
            colour_blend: states.colour_blend.clone(),
            input_assembly: input_assembly(&states.input_assembly),
            tessellation: tessellation(&states.tessellation),
            rasterisation: rasterisation(&states.rasterisation),
            depth_stencil: depth_stencil(&states.depth_stencil),
        }
    }

    pub fn dynamic_states(&self) -> &[vk::DynamicState] {
        &self.dynamic
    }

    pub fn vertex_input(&self) -> vk::PipelineVertexInputStateCreateInfoBuilder<'_> {
        vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&self.bindings)
            .vertex_attribute_descriptions(&self.attributes)
    }

    /// One viewport and one scissor, each either fixed or dynamic.
    pub fn viewport(&self) -> vk::PipelineViewportStateCreateInfoBuilder<'_> {
        let mut builder = vk::PipelineViewportStateCreateInfo::builder();
        builder = if self.viewports.is_empty() {
            builder.viewport_count(1)
        } else {
            builder.viewports(&self.viewports)
        };
        if self.scissors.is_empty() {
            builder.scissor_count(1)
        } else {
            builder.scissors(&self.scissors)
        }
    }

    pub fn multisample(&self) -> vk::PipelineMultisampleStateCreateInfoBuilder<'_> {
        vk::PipelineMultisampleStateCreateInfo::builder()
            .rasterization_samples(convert::sample_count(self.multisample.rasterisation_samples))
            .sample_shading_enable(self.multisample.sample_shading_enable)
            .min_sample_shading(self.multisample.min_sample_shading)
            .sample_mask(&self.sample_mask)
            .alpha_to_coverage_enable(self.multisample.alpha_to_coverage_enable)
            .alpha_to_one_enable(self.multisample.alpha_to_one_enable)
    }

    pub fn colour_blend(&self) -> vk::PipelineColorBlendStateCreateInfoBuilder<'_> {
        vk::PipelineColorBlendStateCreateInfo::builder()
            .logic_op_enable(self.colour_blend.logic_op_enable)
            .logic_op(convert::logic_op(self.colour_blend.logic_op))
            .attachments(&self.blend_attachments)
            .blend_constants(self.colour_blend.blend_constants)
    }

    pub fn dynamic(&self) -> vk::PipelineDynamicStateCreateInfoBuilder<'_> {
        vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(&self.dynamic)
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec2, UVec2};

    use super::*;
    use crate::enums::{
        AttributeFormat, BlendFactor, CompareOp, FrontFace, PolygonMode, PrimitiveTopology,
        StencilOp, VertexInputRate,
    };
    use crate::flags::{ColourComponentFlags, CullModeFlags, SampleCountFlag};
    use crate::pipeline::{VertexInputAttribute, VertexInputBinding};

    #[test]
    fn alpha_blending_bakes_its_factors() {
        let attachment = ColourBlendAttachment {
            colour_write_mask: ColourComponentFlags::R | ColourComponentFlags::A,
            ..ColourBlendAttachment::alpha_blending()
        };
        let baked = colour_blend_attachment(&attachment);
        assert_eq!(baked.blend_enable, vk::TRUE);
        assert_eq!(baked.src_color_blend_factor, vk::BlendFactor::SRC_ALPHA);
        assert_eq!(baked.dst_color_blend_factor, vk::BlendFactor::ONE_MINUS_SRC_ALPHA);
        assert_eq!(baked.src_alpha_blend_factor, vk::BlendFactor::ONE);
        assert_eq!(
            baked.color_write_mask,
            vk::ColorComponentFlags::R | vk::ColorComponentFlags::A
        );
        assert_eq!(
            colour_blend_attachment(&ColourBlendAttachment {
                dst_alpha_blend_factor: BlendFactor::InvSrc1Alpha,
                ..Default::default()
            })
            .dst_alpha_blend_factor,
            vk::BlendFactor::ONE_MINUS_SRC1_ALPHA
        );
    }

    #[test]
    fn rasterisation_keeps_every_field() {
        let state = RasterisationState {
            polygon_mode: PolygonMode::Line,
            cull_mode: CullModeFlags::BACK,
            front_face: FrontFace::Clockwise,
            depth_bias_enable: true,
            depth_bias_slope_factor: 1.5,
            line_width: 2.0,
            ..Default::default()
        };
        let baked = rasterisation(&state);
        assert_eq!(baked.polygon_mode, vk::PolygonMode::LINE);
        assert_eq!(baked.cull_mode, vk::CullModeFlags::BACK);
        assert_eq!(baked.front_face, vk::FrontFace::CLOCKWISE);
        assert_eq!(baked.depth_bias_enable, vk::TRUE);
        assert_eq!(baked.depth_bias_slope_factor, 1.5);
        assert_eq!(baked.line_width, 2.0);
        assert_eq!(baked.depth_clamp_enable, vk::FALSE);
    }

    #[test]
    fn stencil_faces_bake_separately() {
        let state = DepthStencilState {
            depth_test_enable: true,
            depth_compare_op: CompareOp::LessEqual,
            stencil_test_enable: true,
            front: StencilOpState {
                pass_op: StencilOp::Replace,
                reference: 7,
                ..Default::default()
            },
            back: StencilOpState {
                fail_op: StencilOp::DecrementAndWrap,
                compare_op: CompareOp::Never,
                ..Default::default()
            },
            ..Default::default()
        };
        let baked = depth_stencil(&state);
        assert_eq!(baked.depth_compare_op, vk::CompareOp::LESS_OR_EQUAL);
        assert_eq!(baked.front.pass_op, vk::StencilOp::REPLACE);
        assert_eq!(baked.front.reference, 7);
        assert_eq!(baked.back.fail_op, vk::StencilOp::DECREMENT_AND_WRAP);
        assert_eq!(baked.back.compare_op, vk::CompareOp::NEVER);
    }

    #[test]
    fn missing_viewport_and_scissor_become_dynamic() {
        let baked = BakedStates::new(&PipelineStates::default());
        assert_eq!(
            baked.dynamic_states(),
            &[vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR]
        );
        let viewport_state = baked.viewport();
        assert_eq!(viewport_state.viewport_count, 1);
        assert!(viewport_state.p_viewports.is_null());

        let fixed = BakedStates::new(&PipelineStates {
            viewport: Some(Viewport::new(0.0, 0.0, 640.0, 480.0)),
            scissor: Some(Scissor::new(IVec2::ZERO, UVec2::new(640, 480))),
            ..Default::default()
        });
        assert!(fixed.dynamic_states().is_empty());
        assert_eq!(fixed.viewport().scissor_count, 1);
        assert!(!fixed.viewport().p_scissors.is_null());
    }

    #[test]
    fn wide_sample_counts_get_two_mask_words() {
        let mut multisample = MultisampleState {
            sample_mask: 0x0F,
            ..Default::default()
        };
        assert_eq!(sample_mask(&multisample), vec![0x0F]);
        multisample.rasterisation_samples = SampleCountFlag::E64;
        assert_eq!(sample_mask(&multisample), vec![0x0F, u32::MAX]);
    }

    #[test]
    fn tessellation_only_with_patches() {
        assert!(tessellation(&TessellationState::default()).is_none());
        let baked = tessellation(&TessellationState {
            patch_control_points: 3,
        });
        assert_eq!(baked.map(|t| t.patch_control_points), Some(3));
        assert_eq!(
            input_assembly(&InputAssemblyState {
                topology: PrimitiveTopology::PatchList,
                primitive_restart_enable: false,
            })
            .topology,
            vk::PrimitiveTopology::PATCH_LIST
        );
    }

    #[test]
    fn vertex_input_keeps_locations() {
        let state = VertexInputState {
            bindings: vec![VertexInputBinding {
                binding: 1,
                stride: 20,
                input_rate: VertexInputRate::Instance,
            }],
            attributes: vec![VertexInputAttribute {
                location: 4,
                binding: 1,
                format: AttributeFormat::Colour,
                offset: 16,
            }],
        };
        let bindings = vertex_bindings(&state);
        assert_eq!(bindings[0].input_rate, vk::VertexInputRate::INSTANCE);
        assert_eq!(bindings[0].stride, 20);
        let attributes = vertex_attributes(&state);
        assert_eq!(attributes[0].location, 4);
        assert_eq!(attributes[0].format, vk::Format::R8G8B8A8_UNORM);
    }
}
