// Fixed-function pipeline state
//
// Plain immutable values. The explicit backend bakes them into native create-info structs once;
// the immediate-mode backend replays them as state calls every time a pipeline is bound. Each
// state hashes stably so it can key a pipeline cache.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::enums::{
    BlendFactor, BlendOp, CompareOp, FrontFace, LogicOp, PolygonMode, PrimitiveTopology, StencilOp,
};
use crate::flags::{ColourComponentFlags, CullModeFlags, SampleCountFlag};

/// Stable 64-bit hash of any state value.
pub fn state_hash<T: Hash>(state: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    state.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColourBlendAttachment {
    pub blend_enable: bool,
    pub src_colour_blend_factor: BlendFactor,
    pub dst_colour_blend_factor: BlendFactor,
    pub colour_blend_op: BlendOp,
    pub src_alpha_blend_factor: BlendFactor,
    pub dst_alpha_blend_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
    pub colour_write_mask: ColourComponentFlags,
}

impl Default for ColourBlendAttachment {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_colour_blend_factor: BlendFactor::One,
            dst_colour_blend_factor: BlendFactor::Zero,
            colour_blend_op: BlendOp::Add,
            src_alpha_blend_factor: BlendFactor::One,
            dst_alpha_blend_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
            colour_write_mask: ColourComponentFlags::RGBA,
        }
    }
}

impl ColourBlendAttachment {
    /// Classic `src * a + dst * (1 - a)` blending.
    pub fn alpha_blending() -> Self {
        Self {
            blend_enable: true,
            src_colour_blend_factor: BlendFactor::SrcAlpha,
            dst_colour_blend_factor: BlendFactor::InvSrcAlpha,
            src_alpha_blend_factor: BlendFactor::One,
            dst_alpha_blend_factor: BlendFactor::InvSrcAlpha,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColourBlendState {
    pub logic_op_enable: bool,
    pub logic_op: LogicOp,
    /// One entry per colour attachment of the subpass.
    pub attachments: Vec<ColourBlendAttachment>,
    pub blend_constants: [f32; 4],
}

impl Default for ColourBlendState {
    fn default() -> Self {
        Self {
            logic_op_enable: false,
            logic_op: LogicOp::Copy,
            attachments: vec![ColourBlendAttachment::default()],
            blend_constants: [0.0; 4],
        }
    }
}

impl ColourBlendState {
    /// True if any attachment blends.
    pub fn blending(&self) -> bool {
        self.attachments.iter().any(|attachment| attachment.blend_enable)
    }
}

impl Hash for ColourBlendState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.logic_op_enable.hash(state);
        self.logic_op.hash(state);
        self.attachments.hash(state);
        for constant in self.blend_constants {
            constant.to_bits().hash(state);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterisationState {
    pub depth_clamp_enable: bool,
    pub rasteriser_discard_enable: bool,
    pub polygon_mode: PolygonMode,
    pub cull_mode: CullModeFlags,
    pub front_face: FrontFace,
    pub depth_bias_enable: bool,
    pub depth_bias_constant_factor: f32,
    pub depth_bias_clamp: f32,
    pub depth_bias_slope_factor: f32,
    pub line_width: f32,
}

impl Default for RasterisationState {
    fn default() -> Self {
        Self {
            depth_clamp_enable: false,
            rasteriser_discard_enable: false,
            polygon_mode: PolygonMode::Fill,
            cull_mode: CullModeFlags::NONE,
            front_face: FrontFace::CounterClockwise,
            depth_bias_enable: false,
            depth_bias_constant_factor: 0.0,
            depth_bias_clamp: 0.0,
            depth_bias_slope_factor: 0.0,
            line_width: 1.0,
        }
    }
}

impl Hash for RasterisationState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.depth_clamp_enable.hash(state);
        self.rasteriser_discard_enable.hash(state);
        self.polygon_mode.hash(state);
        self.cull_mode.hash(state);
        self.front_face.hash(state);
        self.depth_bias_enable.hash(state);
        self.depth_bias_constant_factor.to_bits().hash(state);
        self.depth_bias_clamp.to_bits().hash(state);
        self.depth_bias_slope_factor.to_bits().hash(state);
        self.line_width.to_bits().hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilOpState {
    pub fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub compare_op: CompareOp,
    pub compare_mask: u32,
    pub write_mask: u32,
    pub reference: u32,
}

impl Default for StencilOpState {
    fn default() -> Self {
        Self {
            fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            compare_op: CompareOp::Always,
            compare_mask: 0xFFFF_FFFF,
            write_mask: 0xFFFF_FFFF,
            reference: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthStencilState {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: CompareOp,
    pub depth_bounds_test_enable: bool,
    pub stencil_test_enable: bool,
    pub front: StencilOpState,
    pub back: StencilOpState,
    pub min_depth_bounds: f32,
    pub max_depth_bounds: f32,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test_enable: false,
            depth_write_enable: true,
            depth_compare_op: CompareOp::Less,
            depth_bounds_test_enable: false,
            stencil_test_enable: false,
            front: StencilOpState::default(),
            back: StencilOpState::default(),
            min_depth_bounds: 0.0,
            max_depth_bounds: 1.0,
        }
    }
}

impl Hash for DepthStencilState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.depth_test_enable.hash(state);
        self.depth_write_enable.hash(state);
        self.depth_compare_op.hash(state);
        self.depth_bounds_test_enable.hash(state);
        self.stencil_test_enable.hash(state);
        self.front.hash(state);
        self.back.hash(state);
        self.min_depth_bounds.to_bits().hash(state);
        self.max_depth_bounds.to_bits().hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultisampleState {
    pub rasterisation_samples: SampleCountFlag,
    pub sample_shading_enable: bool,
    pub min_sample_shading: f32,
    pub sample_mask: u32,
    pub alpha_to_coverage_enable: bool,
    pub alpha_to_one_enable: bool,
}

impl Default for MultisampleState {
    fn default() -> Self {
        Self {
            rasterisation_samples: SampleCountFlag::E1,
            sample_shading_enable: false,
            min_sample_shading: 1.0,
            sample_mask: 0xFFFF_FFFF,
            alpha_to_coverage_enable: false,
            alpha_to_one_enable: false,
        }
    }
}

impl MultisampleState {
    /// Bit-packed key of the fields both backends consult:
    ///
    /// | bits  | field                     |
    /// |-------|---------------------------|
    /// | 63    | sample shading enable     |
    /// | 30-61 | sample mask               |
    /// | 29    | alpha to coverage enable  |
    /// | 28    | alpha to one enable       |
    /// | 21-27 | rasterisation sample flag |
    pub fn hash_value(&self) -> u64 {
        (u64::from(self.sample_shading_enable) << 63)
            | (u64::from(self.sample_mask) << 30)
            | (u64::from(self.alpha_to_coverage_enable) << 29)
            | (u64::from(self.alpha_to_one_enable) << 28)
            | (u64::from(self.rasterisation_samples.count()) << 21)
    }
}

impl Hash for MultisampleState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TessellationState {
    /// 0 when the pipeline has no tessellation stages.
    pub patch_control_points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputAssemblyState {
    pub topology: PrimitiveTopology,
    pub primitive_restart_enable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_multisample_states_hash_equal() {
        let a = MultisampleState {
            rasterisation_samples: SampleCountFlag::E4,
            sample_shading_enable: true,
            sample_mask: 0x0F,
            ..Default::default()
        };
        let b = a;
        assert_eq!(a.hash_value(), b.hash_value());
        assert_eq!(state_hash(&a), state_hash(&b));
    }

    #[test]
    fn each_multisample_field_changes_the_hash() {
        let base = MultisampleState::default();
        let variants = [
            MultisampleState {
                sample_shading_enable: true,
                ..base
            },
            MultisampleState {
                sample_mask: 0x7FFF_FFFF,
                ..base
            },
            MultisampleState {
                alpha_to_coverage_enable: true,
                ..base
            },
            MultisampleState {
                alpha_to_one_enable: true,
                ..base
            },
            MultisampleState {
                rasterisation_samples: SampleCountFlag::E8,
                ..base
            },
        ];
        for variant in variants {
            assert_ne!(variant.hash_value(), base.hash_value(), "{variant:?}");
        }
    }

    #[test]
    fn multisample_bit_layout() {
        let state = MultisampleState {
            rasterisation_samples: SampleCountFlag::E2,
            sample_shading_enable: true,
            min_sample_shading: 0.5,
            sample_mask: 1,
            alpha_to_coverage_enable: true,
            alpha_to_one_enable: false,
        };
        assert_eq!(state.hash_value(), (1 << 63) | (1 << 30) | (1 << 29) | (2 << 21));
    }

    #[test]
    fn float_fields_take_part_in_hashes() {
        let a = RasterisationState::default();
        let b = RasterisationState {
            line_width: 2.0,
            ..a
        };
        assert_ne!(state_hash(&a), state_hash(&b));

        let c = ColourBlendState::default();
        let d = ColourBlendState {
            blend_constants: [0.5, 0.0, 0.0, 0.0],
            ..ColourBlendState::default()
        };
        assert_ne!(state_hash(&c), state_hash(&d));
    }

    #[test]
    fn blending_is_an_or_over_attachments() {
        let mut state = ColourBlendState {
            attachments: vec![ColourBlendAttachment::default(); 3],
            ..Default::default()
        };
        assert!(!state.blending());
        state.attachments[2] = ColourBlendAttachment::alpha_blending();
        assert!(state.blending());
    }
}
