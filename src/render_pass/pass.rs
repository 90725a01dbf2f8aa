// Render passes and frame buffers

use glam::UVec2;

use super::{RenderPassState, RenderSubpass};
use crate::core::NativeHandle;
use crate::enums::{AttachmentLoadOp, AttachmentStoreOp, ImageLayout, PixelFormat};
use crate::error::{Error, Result};
use crate::flags::SampleCountFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentDescription {
    pub format: PixelFormat,
    pub samples: SampleCountFlag,
    pub load_op: AttachmentLoadOp,
    pub store_op: AttachmentStoreOp,
    pub stencil_load_op: AttachmentLoadOp,
    pub stencil_store_op: AttachmentStoreOp,
    pub initial_layout: ImageLayout,
    pub final_layout: ImageLayout,
}

impl AttachmentDescription {
    pub fn new(
        format: PixelFormat,
        load_op: AttachmentLoadOp,
        store_op: AttachmentStoreOp,
        initial_layout: ImageLayout,
        final_layout: ImageLayout,
    ) -> Self {
        Self {
            format,
            samples: SampleCountFlag::E1,
            load_op,
            store_op,
            stencil_load_op: AttachmentLoadOp::DontCare,
            stencil_store_op: AttachmentStoreOp::DontCare,
            initial_layout,
            final_layout,
        }
    }

    pub fn with_samples(mut self, samples: SampleCountFlag) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_stencil_ops(mut self, load_op: AttachmentLoadOp, store_op: AttachmentStoreOp) -> Self {
        self.stencil_load_op = load_op;
        self.stencil_store_op = store_op;
        self
    }
}

/// A validated render pass: attachments, at least one subpass, and the synchronisation
/// states at the pass boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderPassDescription {
    attachments: Vec<AttachmentDescription>,
    subpasses: Vec<RenderSubpass>,
    initial_state: RenderPassState,
    final_state: RenderPassState,
}

impl RenderPassDescription {
    pub fn new(
        attachments: Vec<AttachmentDescription>,
        subpasses: Vec<RenderSubpass>,
        initial_state: RenderPassState,
        final_state: RenderPassState,
    ) -> Result<Self> {
        let fail = |reason: String| Err(Error::construction("Render pass", reason));

        if subpasses.is_empty() {
            return fail("at least one subpass is required".to_string());
        }

        let count = attachments.len() as u32;
        for (index, subpass) in subpasses.iter().enumerate() {
            if let Some(reference) = subpass.references().find(|r| r.attachment >= count) {
                return fail(format!(
                    "subpass {index} references attachment {} of {count}",
                    reference.attachment
                ));
            }
            if let Some(preserved) = subpass.preserve_attachments.iter().find(|&&a| a >= count) {
                return fail(format!(
                    "subpass {index} preserves attachment {preserved} of {count}"
                ));
            }
            if let Some(preserved) = subpass.preserve_attachments.iter().find(|&&a| subpass.uses(a)) {
                return fail(format!(
                    "subpass {index} both uses and preserves attachment {preserved}"
                ));
            }
            if !subpass.resolve_attachments.is_empty()
                && subpass.resolve_attachments.len() != subpass.colour_attachments.len()
            {
                return fail(format!(
                    "subpass {index} has {} resolve attachments for {} colour attachments",
                    subpass.resolve_attachments.len(),
                    subpass.colour_attachments.len()
                ));
            }
            let format_of = |a: u32| attachments[a as usize].format;
            if let Some(colour) = subpass
                .colour_attachments
                .iter()
                .find(|r| format_of(r.attachment).is_depth_or_stencil_format())
            {
                return fail(format!(
                    "subpass {index} uses depth/stencil attachment {} as a colour target",
                    colour.attachment
                ));
            }
            if let Some(depth) = subpass.depth_stencil_attachment {
                if !format_of(depth.attachment).is_depth_or_stencil_format() {
                    return fail(format!(
                        "subpass {index} uses colour attachment {} as depth/stencil target",
                        depth.attachment
                    ));
                }
            }
        }

        Ok(Self {
            attachments,
            subpasses,
            initial_state,
            final_state,
        })
    }

    pub fn attachments(&self) -> &[AttachmentDescription] {
        &self.attachments
    }

    pub fn subpasses(&self) -> &[RenderSubpass] {
        &self.subpasses
    }

    pub fn initial_state(&self) -> RenderPassState {
        self.initial_state
    }

    pub fn final_state(&self) -> RenderPassState {
        self.final_state
    }
}

pub trait RenderPass {
    fn description(&self) -> &RenderPassDescription;
    fn native(&self) -> NativeHandle;
}

/// Texture views bound to the attachments of a render pass.
pub trait FrameBuffer {
    fn dimensions(&self) -> UVec2;
    fn native(&self) -> NativeHandle;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::PipelineBindPoint;
    use crate::render_pass::AttachmentReference;

    fn colour() -> AttachmentDescription {
        AttachmentDescription::new(
            PixelFormat::B8G8R8A8,
            AttachmentLoadOp::Clear,
            AttachmentStoreOp::Store,
            ImageLayout::Undefined,
            ImageLayout::PresentSrc,
        )
    }

    fn depth() -> AttachmentDescription {
        AttachmentDescription::new(
            PixelFormat::D32F,
            AttachmentLoadOp::Clear,
            AttachmentStoreOp::DontCare,
            ImageLayout::Undefined,
            ImageLayout::DepthStencilAttachmentOptimal,
        )
    }

    fn subpass() -> RenderSubpass {
        RenderSubpass::new(PipelineBindPoint::Graphics, RenderPassState::colour_output())
            .with_colours(vec![AttachmentReference::new(0, ImageLayout::ColourAttachmentOptimal)])
            .with_depth_stencil(AttachmentReference::new(
                1,
                ImageLayout::DepthStencilAttachmentOptimal,
            ))
    }

    fn describe(attachments: Vec<AttachmentDescription>, subpasses: Vec<RenderSubpass>) -> Result<RenderPassDescription> {
        RenderPassDescription::new(
            attachments,
            subpasses,
            RenderPassState::bottom_of_pipe(),
            RenderPassState::bottom_of_pipe(),
        )
    }

    #[test]
    fn a_valid_pass() {
        let description = describe(vec![colour(), depth()], vec![subpass()]).unwrap();
        assert_eq!(description.subpasses().len(), 1);
        assert_eq!(description.attachments().len(), 2);
    }

    #[test]
    fn subpasses_are_required() {
        assert!(matches!(
            describe(vec![colour()], vec![]),
            Err(Error::Construction { .. })
        ));
    }

    #[test]
    fn attachment_indices_are_bounded() {
        assert!(describe(vec![colour()], vec![subpass()]).is_err());
        let preserving = subpass().with_preserves(vec![2]);
        assert!(describe(vec![colour(), depth()], vec![preserving]).is_err());
    }

    #[test]
    fn roles_must_match_formats() {
        assert!(describe(vec![depth(), colour()], vec![subpass()]).is_err());
    }

    #[test]
    fn preserved_attachments_are_not_used() {
        let preserving = subpass().with_preserves(vec![0]);
        assert!(describe(vec![colour(), depth()], vec![preserving]).is_err());
    }
}
