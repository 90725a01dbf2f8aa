// Replays fixed-function pipeline state as GL state calls
//
// GL has no pipeline objects for fixed-function state, so binding a pipeline re-emits all of
// it. Every translator writes a complete state for its block: nothing depends on what was bound
// before, except vertex attributes, whose previous enable mask is passed in.

use super::call::GlCall;
use super::consts as gl;
use super::convert;
use crate::core::PhysicalDeviceFeatures;
use crate::enums::VertexInputRate;
use crate::flags::ColourComponentFlags;
use crate::pipeline::{
    ColourBlendState, DepthStencilState, InputAssemblyState, MultisampleState, PipelineStates,
    RasterisationState, Scissor, StencilOpState, TessellationState, VertexInputState, Viewport,
};

fn toggle(cap: u32, on: bool, calls: &mut Vec<GlCall>) {
    calls.push(if on {
        GlCall::Enable(cap)
    } else {
        GlCall::Disable(cap)
    });
}

pub fn apply_colour_blend(state: &ColourBlendState, calls: &mut Vec<GlCall>) {
    toggle(gl::COLOR_LOGIC_OP, state.logic_op_enable, calls);
    if state.logic_op_enable {
        calls.push(GlCall::LogicOp(convert::logic_op(state.logic_op)));
    }
    calls.push(GlCall::BlendColor(state.blend_constants));

    for (buffer, attachment) in (0u32..).zip(&state.attachments) {
        if attachment.blend_enable {
            calls.push(GlCall::BlendEquationSeparatei {
                buffer,
                rgb: convert::blend_op(attachment.colour_blend_op),
                alpha: convert::blend_op(attachment.alpha_blend_op),
            });
            calls.push(GlCall::BlendFuncSeparatei {
                buffer,
                src_rgb: convert::blend_factor(attachment.src_colour_blend_factor),
                dst_rgb: convert::blend_factor(attachment.dst_colour_blend_factor),
                src_alpha: convert::blend_factor(attachment.src_alpha_blend_factor),
                dst_alpha: convert::blend_factor(attachment.dst_alpha_blend_factor),
            });
        }
        calls.push(GlCall::ColorMaski {
            buffer,
            mask: colour_mask(attachment.colour_write_mask),
        });
    }

    // GL_BLEND is global: one blending attachment turns it on for all of them.
    toggle(gl::BLEND, state.blending(), calls);
}

pub fn colour_mask(mask: ColourComponentFlags) -> [bool; 4] {
    [
        mask.contains(ColourComponentFlags::R),
        mask.contains(ColourComponentFlags::G),
        mask.contains(ColourComponentFlags::B),
        mask.contains(ColourComponentFlags::A),
    ]
}

pub fn apply_rasterisation(
    state: &RasterisationState,
    features: &PhysicalDeviceFeatures,
    calls: &mut Vec<GlCall>,
) {
    toggle(gl::DEPTH_CLAMP, state.depth_clamp_enable, calls);
    toggle(gl::RASTERIZER_DISCARD, state.rasteriser_discard_enable, calls);
    calls.push(GlCall::PolygonMode {
        face: gl::FRONT_AND_BACK,
        mode: convert::polygon_mode(state.polygon_mode),
    });

    match convert::cull_face(state.cull_mode) {
        Some(face) => {
            calls.push(GlCall::Enable(gl::CULL_FACE));
            calls.push(GlCall::CullFace(face));
        }
        None => calls.push(GlCall::Disable(gl::CULL_FACE)),
    }
    calls.push(GlCall::FrontFace(convert::front_face(state.front_face)));

    for cap in [
        gl::POLYGON_OFFSET_FILL,
        gl::POLYGON_OFFSET_LINE,
        gl::POLYGON_OFFSET_POINT,
    ] {
        toggle(cap, state.depth_bias_enable, calls);
    }
    if state.depth_bias_enable {
        if features.depth_bias_clamp {
            calls.push(GlCall::PolygonOffsetClamp {
                factor: state.depth_bias_slope_factor,
                units: state.depth_bias_constant_factor,
                clamp: state.depth_bias_clamp,
            });
        } else {
            calls.push(GlCall::PolygonOffset {
                factor: state.depth_bias_slope_factor,
                units: state.depth_bias_constant_factor,
            });
        }
    }
    calls.push(GlCall::LineWidth(state.line_width));
}

pub fn apply_multisample(state: &MultisampleState, calls: &mut Vec<GlCall>) {
    toggle(gl::SAMPLE_SHADING, state.sample_shading_enable, calls);
    if state.sample_shading_enable {
        calls.push(GlCall::MinSampleShading(state.min_sample_shading));
    }

    let masked = state.sample_mask != u32::MAX;
    toggle(gl::SAMPLE_MASK, masked, calls);
    if masked {
        calls.push(GlCall::SampleMaski {
            index: 0,
            mask: state.sample_mask,
        });
    }

    toggle(gl::SAMPLE_ALPHA_TO_COVERAGE, state.alpha_to_coverage_enable, calls);
    toggle(gl::SAMPLE_ALPHA_TO_ONE, state.alpha_to_one_enable, calls);
}

fn apply_stencil_face(face: u32, state: &StencilOpState, calls: &mut Vec<GlCall>) {
    calls.push(GlCall::StencilFuncSeparate {
        face,
        func: convert::compare_op(state.compare_op),
        reference: state.reference as i32,
        mask: state.compare_mask,
    });
    calls.push(GlCall::StencilOpSeparate {
        face,
        sfail: convert::stencil_op(state.fail_op),
        dpfail: convert::stencil_op(state.depth_fail_op),
        dppass: convert::stencil_op(state.pass_op),
    });
    calls.push(GlCall::StencilMaskSeparate {
        face,
        mask: state.write_mask,
    });
}

pub fn apply_depth_stencil(
    state: &DepthStencilState,
    features: &PhysicalDeviceFeatures,
    calls: &mut Vec<GlCall>,
) {
    toggle(gl::DEPTH_TEST, state.depth_test_enable, calls);
    calls.push(GlCall::DepthMask(state.depth_write_enable));
    calls.push(GlCall::DepthFunc(convert::compare_op(state.depth_compare_op)));

    if features.depth_bounds {
        toggle(gl::DEPTH_BOUNDS_TEST_EXT, state.depth_bounds_test_enable, calls);
        if state.depth_bounds_test_enable {
            calls.push(GlCall::DepthBounds {
                min: f64::from(state.min_depth_bounds),
                max: f64::from(state.max_depth_bounds),
            });
        }
    } else if state.depth_bounds_test_enable {
        log::warn!("Depth bounds test requested without driver support; ignored");
    }

    toggle(gl::STENCIL_TEST, state.stencil_test_enable, calls);
    if state.stencil_test_enable {
        apply_stencil_face(gl::FRONT, &state.front, calls);
        apply_stencil_face(gl::BACK, &state.back, calls);
    }
}

pub fn apply_tessellation(state: &TessellationState, calls: &mut Vec<GlCall>) {
    if state.patch_control_points > 0 {
        calls.push(GlCall::PatchParameteri {
            pname: gl::PATCH_VERTICES,
            value: state.patch_control_points as i32,
        });
    }
}

pub fn apply_input_assembly(state: &InputAssemblyState, calls: &mut Vec<GlCall>) {
    toggle(
        gl::PRIMITIVE_RESTART_FIXED_INDEX,
        state.primitive_restart_enable,
        calls,
    );
}

pub fn apply_viewport(viewport: &Viewport, calls: &mut Vec<GlCall>) {
    calls.push(GlCall::ViewportIndexedf {
        index: 0,
        x: viewport.x,
        y: viewport.y,
        width: viewport.width,
        height: viewport.height,
    });
    calls.push(GlCall::DepthRangeIndexed {
        index: 0,
        near: f64::from(viewport.min_depth),
        far: f64::from(viewport.max_depth),
    });
}

pub fn apply_scissor(scissor: &Scissor, calls: &mut Vec<GlCall>) {
    calls.push(GlCall::ScissorIndexed {
        index: 0,
        x: scissor.offset.x,
        y: scissor.offset.y,
        width: scissor.extent.x as i32,
        height: scissor.extent.y as i32,
    });
}

/// Sets attribute formats on `vao` and returns the new mask of enabled attributes.
/// Attributes enabled in `previous` but unused now are disabled.
pub fn apply_vertex_input(
    state: &VertexInputState,
    vao: u32,
    previous: u32,
    calls: &mut Vec<GlCall>,
) -> u32 {
    let mut enabled = 0u32;
    for attribute in &state.attributes {
        let attrib = attribute.location;
        let (size, ty, integer) = convert::attribute_format(attribute.format);
        calls.push(GlCall::EnableVertexArrayAttrib { vao, attrib });
        calls.push(if integer {
            GlCall::VertexArrayAttribIFormat {
                vao,
                attrib,
                size,
                ty,
                offset: attribute.offset,
            }
        } else {
            GlCall::VertexArrayAttribFormat {
                vao,
                attrib,
                size,
                ty,
                normalized: ty == gl::UNSIGNED_BYTE,
                offset: attribute.offset,
            }
        });
        calls.push(GlCall::VertexArrayAttribBinding {
            vao,
            attrib,
            binding: attribute.binding,
        });
        if attrib < 32 {
            enabled |= 1 << attrib;
        }
    }

    for binding in &state.bindings {
        calls.push(GlCall::VertexArrayBindingDivisor {
            vao,
            binding: binding.binding,
            divisor: match binding.input_rate {
                VertexInputRate::Vertex => 0,
                VertexInputRate::Instance => 1,
            },
        });
    }

    let stale = previous & !enabled;
    for attrib in (0..32).filter(|bit| stale & (1 << bit) != 0) {
        calls.push(GlCall::DisableVertexArrayAttrib { vao, attrib });
    }
    enabled
}

/// Everything a pipeline bind sets besides programs and vertex buffers.
pub fn apply_pipeline_states(
    states: &PipelineStates,
    features: &PhysicalDeviceFeatures,
    calls: &mut Vec<GlCall>,
) {
    apply_input_assembly(&states.input_assembly, calls);
    apply_tessellation(&states.tessellation, calls);
    if let Some(viewport) = &states.viewport {
        apply_viewport(viewport, calls);
    }
    if let Some(scissor) = &states.scissor {
        apply_scissor(scissor, calls);
    }
    apply_rasterisation(&states.rasterisation, features, calls);
    apply_multisample(&states.multisample, calls);
    apply_depth_stencil(&states.depth_stencil, features, calls);
    apply_colour_blend(&states.colour_blend, calls);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::AttributeFormat;
    use crate::pipeline::{ColourBlendAttachment, VertexInputAttribute, VertexInputBinding};

    #[test]
    fn one_blending_attachment_enables_blending() {
        let state = ColourBlendState {
            attachments: vec![
                ColourBlendAttachment::default(),
                ColourBlendAttachment::alpha_blending(),
            ],
            ..Default::default()
        };
        let mut calls = Vec::new();
        apply_colour_blend(&state, &mut calls);

        assert_eq!(calls.last(), Some(&GlCall::Enable(gl::BLEND)));
        let equations: Vec<_> = calls
            .iter()
            .filter_map(|call| match call {
                GlCall::BlendEquationSeparatei { buffer, .. } => Some(*buffer),
                _ => None,
            })
            .collect();
        assert_eq!(equations, vec![1]);
        assert_eq!(
            calls
                .iter()
                .filter(|call| matches!(call, GlCall::ColorMaski { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn no_blending_attachment_disables_blending() {
        let mut calls = Vec::new();
        apply_colour_blend(&ColourBlendState::default(), &mut calls);
        assert_eq!(calls.last(), Some(&GlCall::Disable(gl::BLEND)));
        assert!(calls.contains(&GlCall::Disable(gl::COLOR_LOGIC_OP)));
    }

    #[test]
    fn depth_bias_clamp_needs_the_feature() {
        let state = RasterisationState {
            depth_bias_enable: true,
            depth_bias_constant_factor: 2.0,
            depth_bias_slope_factor: 1.5,
            depth_bias_clamp: 0.25,
            ..Default::default()
        };
        let mut features = PhysicalDeviceFeatures::default();
        let mut calls = Vec::new();
        apply_rasterisation(&state, &features, &mut calls);
        assert!(calls.contains(&GlCall::PolygonOffset {
            factor: 1.5,
            units: 2.0
        }));

        features.depth_bias_clamp = true;
        calls.clear();
        apply_rasterisation(&state, &features, &mut calls);
        assert!(calls.contains(&GlCall::PolygonOffsetClamp {
            factor: 1.5,
            units: 2.0,
            clamp: 0.25
        }));
    }

    #[test]
    fn full_sample_mask_leaves_masking_off() {
        let mut calls = Vec::new();
        apply_multisample(&MultisampleState::default(), &mut calls);
        assert!(calls.contains(&GlCall::Disable(gl::SAMPLE_MASK)));
        assert!(!calls.iter().any(|call| matches!(call, GlCall::SampleMaski { .. })));
    }

    #[test]
    fn unused_attributes_are_disabled() {
        let state = VertexInputState {
            bindings: vec![VertexInputBinding {
                binding: 0,
                stride: 12,
                input_rate: VertexInputRate::Vertex,
            }],
            attributes: vec![VertexInputAttribute {
                location: 0,
                binding: 0,
                format: AttributeFormat::Vec3f,
                offset: 0,
            }],
        };
        let mut calls = Vec::new();
        let mask = apply_vertex_input(&state, 7, 0b101, &mut calls);
        assert_eq!(mask, 0b1);
        assert!(calls.contains(&GlCall::DisableVertexArrayAttrib { vao: 7, attrib: 2 }));
        assert!(!calls.contains(&GlCall::DisableVertexArrayAttrib { vao: 7, attrib: 0 }));
    }
}
