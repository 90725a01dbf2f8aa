// Render passes: attachments, ordered subpasses and the frame buffers they render into.

mod pass;
mod subpass;

pub use pass::{AttachmentDescription, FrameBuffer, RenderPass, RenderPassDescription};
pub use subpass::{AttachmentReference, RenderPassState, RenderSubpass};
