// Render subpasses

use crate::enums::{ImageLayout, PipelineBindPoint};
use crate::flags::{AccessFlags, PipelineStageFlags};

/// Pipeline stages and memory accesses at a synchronisation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderPassState {
    pub stage_mask: PipelineStageFlags,
    pub access_mask: AccessFlags,
}

impl RenderPassState {
    pub fn new(stage_mask: PipelineStageFlags, access_mask: AccessFlags) -> Self {
        Self {
            stage_mask,
            access_mask,
        }
    }

    /// Colour attachment output, with no access to wait for.
    pub fn colour_output() -> Self {
        Self::new(PipelineStageFlags::COLOUR_ATTACHMENT_OUTPUT, AccessFlags::empty())
    }

    /// Colour attachment writes.
    pub fn colour_write() -> Self {
        Self::new(
            PipelineStageFlags::COLOUR_ATTACHMENT_OUTPUT,
            AccessFlags::COLOUR_ATTACHMENT_READ | AccessFlags::COLOUR_ATTACHMENT_WRITE,
        )
    }

    /// Everything done before, nothing specific.
    pub fn bottom_of_pipe() -> Self {
        Self::new(PipelineStageFlags::BOTTOM_OF_PIPE, AccessFlags::MEMORY_READ)
    }
}

impl Default for RenderPassState {
    fn default() -> Self {
        Self::colour_output()
    }
}

/// An attachment index with the layout the subpass needs it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentReference {
    pub attachment: u32,
    pub layout: ImageLayout,
}

impl AttachmentReference {
    pub fn new(attachment: u32, layout: ImageLayout) -> Self {
        Self { attachment, layout }
    }
}

/// One phase of a render pass and the role each attachment plays in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderSubpass {
    pub bind_point: PipelineBindPoint,
    /// Stages and accesses this subpass waits for on entry.
    pub state: RenderPassState,
    pub input_attachments: Vec<AttachmentReference>,
    pub colour_attachments: Vec<AttachmentReference>,
    /// Empty, or one per colour attachment.
    pub resolve_attachments: Vec<AttachmentReference>,
    pub depth_stencil_attachment: Option<AttachmentReference>,
    /// Attachments this subpass leaves alone but whose contents must survive it.
    pub preserve_attachments: Vec<u32>,
}

impl RenderSubpass {
    pub fn new(bind_point: PipelineBindPoint, state: RenderPassState) -> Self {
        Self {
            bind_point,
            state,
            input_attachments: Vec::new(),
            colour_attachments: Vec::new(),
            resolve_attachments: Vec::new(),
            depth_stencil_attachment: None,
            preserve_attachments: Vec::new(),
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<AttachmentReference>) -> Self {
        self.input_attachments = inputs;
        self
    }

    pub fn with_colours(mut self, colours: Vec<AttachmentReference>) -> Self {
        self.colour_attachments = colours;
        self
    }

    pub fn with_resolves(mut self, resolves: Vec<AttachmentReference>) -> Self {
        self.resolve_attachments = resolves;
        self
    }

    pub fn with_depth_stencil(mut self, depth_stencil: AttachmentReference) -> Self {
        self.depth_stencil_attachment = Some(depth_stencil);
        self
    }

    pub fn with_preserves(mut self, preserves: Vec<u32>) -> Self {
        self.preserve_attachments = preserves;
        self
    }

    /// Every attachment reference, whatever its role.
    pub fn references(&self) -> impl Iterator<Item = &AttachmentReference> {
        self.input_attachments
            .iter()
            .chain(&self.colour_attachments)
            .chain(&self.resolve_attachments)
            .chain(self.depth_stencil_attachment.as_ref())
    }

    /// Tells if the subpass uses `attachment` in any role other than preserve.
    pub fn uses(&self, attachment: u32) -> bool {
        self.references().any(|reference| reference.attachment == attachment)
    }
}
