// Render passes and frame buffers
//
// A GL render pass is only its description; command buffers turn load/store ops, subpass draw
// buffers and resolves into framebuffer calls. Frame buffers are framebuffer objects, except
// over the window's default framebuffer.

use glam::UVec2;

use super::call::GlCall;
use super::consts as gl;
use super::convert;
use super::shared::GlShared;
use crate::core::NativeHandle;
use crate::error::{Error, Result};
use crate::render_pass::{FrameBuffer, RenderPass, RenderPassDescription};
use crate::resource::TextureView;

/// Colour attachment index of attachment `attachment`: colour attachments are numbered in
/// declaration order, skipping depth and stencil ones.
pub fn colour_slot(description: &RenderPassDescription, attachment: u32) -> u32 {
    description
        .attachments()
        .iter()
        .take(attachment as usize)
        .filter(|a| !a.format.is_depth_or_stencil_format())
        .count() as u32
}

/// Framebuffer attachment point of attachment `attachment`.
pub fn attachment_point(description: &RenderPassDescription, attachment: u32) -> u32 {
    let format = description.attachments()[attachment as usize].format;
    convert::attachment_point(format, colour_slot(description, attachment))
}

/// Attachments some subpass resolves into.
fn resolve_attachments(description: &RenderPassDescription) -> Vec<u32> {
    let mut targets: Vec<u32> = description
        .subpasses()
        .iter()
        .flat_map(|subpass| subpass.resolve_attachments.iter().map(|r| r.attachment))
        .collect();
    targets.sort_unstable();
    targets.dedup();
    targets
}

pub struct GlRenderPass {
    description: RenderPassDescription,
    id: u32,
}

impl GlRenderPass {
    pub fn new(shared: &GlShared, description: RenderPassDescription) -> Self {
        Self {
            description,
            id: shared.next_id(),
        }
    }
}

impl RenderPass for GlRenderPass {
    fn description(&self) -> &RenderPassDescription {
        &self.description
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.id)
    }
}

pub struct GlFrameBuffer<'d> {
    shared: &'d GlShared,
    name: u32,
    resolve_targets: Vec<u32>,
    dimensions: UVec2,
}

impl<'d> GlFrameBuffer<'d> {
    pub fn new(
        shared: &'d GlShared,
        render_pass: &dyn RenderPass,
        views: &[&dyn TextureView],
        dimensions: UVec2,
    ) -> Result<Self> {
        let names = views
            .iter()
            .map(|view| view.native().gl("texture view"))
            .collect::<Result<Vec<_>>>()?;

        let defaults = names.iter().filter(|&&name| name == 0).count();
        if defaults == names.len() {
            return Ok(Self {
                shared,
                name: 0,
                resolve_targets: Vec::new(),
                dimensions,
            });
        }
        if defaults > 0 {
            return Err(Error::construction(
                "Frame buffer",
                "the default framebuffer cannot be mixed with texture attachments",
            ));
        }

        let description = render_pass.description();
        let _guard = shared.guard()?;
        let name = shared.create(GlCall::CreateFramebuffer)?;
        let mut frame_buffer = Self {
            shared,
            name,
            resolve_targets: Vec::new(),
            dimensions,
        };

        for (attachment, &texture) in (0u32..).zip(&names) {
            shared.call(GlCall::NamedFramebufferTexture {
                framebuffer: name,
                attachment: attachment_point(description, attachment),
                texture,
                level: 0,
            })?;
        }
        check_complete(shared, name)?;

        let mut targets = Vec::new();
        for attachment in resolve_attachments(description) {
            let target = shared.create(GlCall::CreateFramebuffer)?;
            frame_buffer.resolve_targets.push(target);
            shared.call(GlCall::NamedFramebufferTexture {
                framebuffer: target,
                attachment: gl::COLOR_ATTACHMENT0,
                texture: names[attachment as usize],
                level: 0,
            })?;
            check_complete(shared, target)?;
            targets.push((attachment, target));
        }
        shared.register_resolve_targets(name, targets);
        Ok(frame_buffer)
    }
}

fn check_complete(shared: &GlShared, framebuffer: u32) -> Result<()> {
    let status = shared
        .call(GlCall::CheckNamedFramebufferStatus {
            framebuffer,
            target: gl::DRAW_FRAMEBUFFER,
        })?
        .int()
        .unwrap_or(0) as u32;
    if status != gl::FRAMEBUFFER_COMPLETE {
        return Err(Error::construction(
            "Frame buffer",
            format!("framebuffer {framebuffer} is incomplete (status {status:#06x})"),
        ));
    }
    Ok(())
}

impl FrameBuffer for GlFrameBuffer<'_> {
    fn dimensions(&self) -> UVec2 {
        self.dimensions
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.name)
    }
}

impl Drop for GlFrameBuffer<'_> {
    fn drop(&mut self) {
        if self.name == 0 {
            return;
        }
        self.shared.unregister_resolve_targets(self.name);
        for &target in &self.resolve_targets {
            self.shared.release(GlCall::DeleteFramebuffer(target));
        }
        self.shared.release(GlCall::DeleteFramebuffer(self.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{AttachmentLoadOp, AttachmentStoreOp, ImageLayout, PipelineBindPoint, PixelFormat};
    use crate::render_pass::{AttachmentDescription, AttachmentReference, RenderPassState, RenderSubpass};

    fn attachment(format: PixelFormat) -> AttachmentDescription {
        AttachmentDescription::new(
            format,
            AttachmentLoadOp::Clear,
            AttachmentStoreOp::Store,
            ImageLayout::Undefined,
            ImageLayout::ShaderReadOnlyOptimal,
        )
    }

    #[test]
    fn depth_attachments_do_not_take_colour_slots() {
        let description = RenderPassDescription::new(
            vec![
                attachment(PixelFormat::R8G8B8A8),
                attachment(PixelFormat::D24S8),
                attachment(PixelFormat::R16G16B16A16F),
            ],
            vec![RenderSubpass::new(PipelineBindPoint::Graphics, RenderPassState::default())
                .with_colours(vec![
                    AttachmentReference::new(0, ImageLayout::ColourAttachmentOptimal),
                    AttachmentReference::new(2, ImageLayout::ColourAttachmentOptimal),
                ])
                .with_depth_stencil(AttachmentReference::new(
                    1,
                    ImageLayout::DepthStencilAttachmentOptimal,
                ))],
            RenderPassState::default(),
            RenderPassState::default(),
        )
        .unwrap();

        assert_eq!(attachment_point(&description, 0), gl::COLOR_ATTACHMENT0);
        assert_eq!(attachment_point(&description, 1), gl::DEPTH_STENCIL_ATTACHMENT);
        assert_eq!(attachment_point(&description, 2), gl::COLOR_ATTACHMENT0 + 1);
    }
}
