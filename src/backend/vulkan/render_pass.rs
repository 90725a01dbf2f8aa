// Vulkan render passes and frame buffers

use anyhow::Context;
use ash::vk;
use glam::UVec2;

use super::convert;
use super::shared::VulkanShared;
use crate::core::NativeHandle;
use crate::error::{Error, Result};
use crate::render_pass::{
    AttachmentDescription, AttachmentReference, FrameBuffer, RenderPass, RenderPassDescription,
    RenderPassState,
};
use crate::resource::TextureView;

fn dependency(
    src_subpass: u32,
    src: RenderPassState,
    dst_subpass: u32,
    dst: RenderPassState,
) -> vk::SubpassDependency {
    let internal = src_subpass != vk::SUBPASS_EXTERNAL && dst_subpass != vk::SUBPASS_EXTERNAL;
    vk::SubpassDependency {
        src_subpass,
        dst_subpass,
        src_stage_mask: convert::stage_flags(src.stage_mask),
        dst_stage_mask: convert::stage_flags(dst.stage_mask),
        src_access_mask: convert::access_flags(src.access_mask),
        dst_access_mask: convert::access_flags(dst.access_mask),
        dependency_flags: if internal {
            vk::DependencyFlags::BY_REGION
        } else {
            vk::DependencyFlags::empty()
        },
    }
}

/// Chains the subpasses: the pass entry into the first one, each subpass into the next, and
/// the last one out to the pass exit.
pub fn dependencies(description: &RenderPassDescription) -> Vec<vk::SubpassDependency> {
    let subpasses = description.subpasses();
    let mut dependencies = Vec::with_capacity(subpasses.len() + 1);
    dependencies.push(dependency(
        vk::SUBPASS_EXTERNAL,
        description.initial_state(),
        0,
        subpasses[0].state,
    ));
    for (index, pair) in (1u32..).zip(subpasses.windows(2)) {
        dependencies.push(dependency(index - 1, pair[0].state, index, pair[1].state));
    }
    let last = subpasses.len() as u32 - 1;
    dependencies.push(dependency(
        last,
        subpasses[last as usize].state,
        vk::SUBPASS_EXTERNAL,
        description.final_state(),
    ));
    dependencies
}

fn attachment_description(attachment: &AttachmentDescription) -> vk::AttachmentDescription {
    vk::AttachmentDescription {
        format: convert::format(attachment.format),
        samples: convert::sample_count(attachment.samples),
        load_op: convert::load_op(attachment.load_op),
        store_op: convert::store_op(attachment.store_op),
        stencil_load_op: convert::load_op(attachment.stencil_load_op),
        stencil_store_op: convert::store_op(attachment.stencil_store_op),
        initial_layout: convert::image_layout(attachment.initial_layout),
        final_layout: convert::image_layout(attachment.final_layout),
        ..Default::default()
    }
}

fn references(references: &[AttachmentReference]) -> Vec<vk::AttachmentReference> {
    references.iter().map(reference).collect()
}

fn reference(reference: &AttachmentReference) -> vk::AttachmentReference {
    vk::AttachmentReference {
        attachment: reference.attachment,
        layout: convert::image_layout(reference.layout),
    }
}

/// Per-subpass reference arrays, kept alive while the create info points into them.
struct SubpassReferences {
    inputs: Vec<vk::AttachmentReference>,
    colours: Vec<vk::AttachmentReference>,
    resolves: Vec<vk::AttachmentReference>,
    depth_stencil: Option<vk::AttachmentReference>,
}

pub struct VulkanRenderPass<'d> {
    shared: &'d VulkanShared,
    render_pass: vk::RenderPass,
    description: RenderPassDescription,
}

impl<'d> VulkanRenderPass<'d> {
    pub fn new(shared: &'d VulkanShared, description: RenderPassDescription) -> Result<Self> {
        let attachments: Vec<_> = description
            .attachments()
            .iter()
            .map(attachment_description)
            .collect();

        let subpass_references: Vec<_> = description
            .subpasses()
            .iter()
            .map(|subpass| SubpassReferences {
                inputs: references(&subpass.input_attachments),
                colours: references(&subpass.colour_attachments),
                resolves: references(&subpass.resolve_attachments),
                depth_stencil: subpass.depth_stencil_attachment.as_ref().map(reference),
            })
            .collect();

        let subpasses: Vec<_> = description
            .subpasses()
            .iter()
            .zip(&subpass_references)
            .map(|(subpass, refs)| {
                let mut builder = vk::SubpassDescription::builder()
                    .pipeline_bind_point(convert::bind_point(subpass.bind_point))
                    .input_attachments(&refs.inputs)
                    .color_attachments(&refs.colours)
                    .preserve_attachments(&subpass.preserve_attachments);
                if !refs.resolves.is_empty() {
                    builder = builder.resolve_attachments(&refs.resolves);
                }
                if let Some(depth_stencil) = refs.depth_stencil.as_ref() {
                    builder = builder.depth_stencil_attachment(depth_stencil);
                }
                builder.build()
            })
            .collect();

        let dependencies = dependencies(&description);
        let render_pass_info = vk::RenderPassCreateInfo::builder()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        let render_pass = unsafe { shared.device.create_render_pass(&render_pass_info, None) }
            .context("Failed to create render pass")?;
        Ok(Self {
            shared,
            render_pass,
            description,
        })
    }
}

impl RenderPass for VulkanRenderPass<'_> {
    fn description(&self) -> &RenderPassDescription {
        &self.description
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.render_pass)
    }
}

impl Drop for VulkanRenderPass<'_> {
    fn drop(&mut self) {
        unsafe { self.shared.device.destroy_render_pass(self.render_pass, None) };
    }
}

pub struct VulkanFrameBuffer<'d> {
    shared: &'d VulkanShared,
    framebuffer: vk::Framebuffer,
    dimensions: UVec2,
}

impl<'d> VulkanFrameBuffer<'d> {
    pub fn new(
        shared: &'d VulkanShared,
        render_pass: &dyn RenderPass,
        views: &[&dyn TextureView],
        dimensions: UVec2,
    ) -> Result<Self> {
        let expected = render_pass.description().attachments().len();
        if views.len() != expected {
            return Err(Error::construction(
                "Frame buffer",
                format!("{} views for a render pass of {expected} attachments", views.len()),
            ));
        }

        let attachments = views
            .iter()
            .map(|view| convert::handle::<vk::ImageView>(view.native(), "texture view"))
            .collect::<Result<Vec<_>>>()?;
        let framebuffer_info = vk::FramebufferCreateInfo::builder()
            .render_pass(convert::handle(render_pass.native(), "render pass")?)
            .attachments(&attachments)
            .width(dimensions.x)
            .height(dimensions.y)
            .layers(1);

        let framebuffer = unsafe { shared.device.create_framebuffer(&framebuffer_info, None) }
            .context("Failed to create framebuffer")?;
        Ok(Self {
            shared,
            framebuffer,
            dimensions,
        })
    }
}

impl FrameBuffer for VulkanFrameBuffer<'_> {
    fn dimensions(&self) -> UVec2 {
        self.dimensions
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.framebuffer)
    }
}

impl Drop for VulkanFrameBuffer<'_> {
    fn drop(&mut self) {
        unsafe { self.shared.device.destroy_framebuffer(self.framebuffer, None) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{AttachmentLoadOp, AttachmentStoreOp, ImageLayout, PipelineBindPoint, PixelFormat};
    use crate::flags::{AccessFlags, PipelineStageFlags};
    use crate::render_pass::RenderSubpass;

    fn colour_pass(subpass_count: usize) -> RenderPassDescription {
        let attachment = AttachmentDescription::new(
            PixelFormat::B8G8R8A8,
            AttachmentLoadOp::Clear,
            AttachmentStoreOp::Store,
            ImageLayout::Undefined,
            ImageLayout::PresentSrc,
        );
        let subpasses = (0..subpass_count)
            .map(|_| {
                RenderSubpass::new(PipelineBindPoint::Graphics, RenderPassState::colour_write())
                    .with_colours(vec![AttachmentReference::new(0, ImageLayout::ColourAttachmentOptimal)])
            })
            .collect();
        RenderPassDescription::new(
            vec![attachment],
            subpasses,
            RenderPassState::colour_output(),
            RenderPassState::bottom_of_pipe(),
        )
        .unwrap()
    }

    #[test]
    fn single_subpass_has_entry_and_exit() {
        let deps = dependencies(&colour_pass(1));
        assert_eq!(deps.len(), 2);

        assert_eq!(deps[0].src_subpass, vk::SUBPASS_EXTERNAL);
        assert_eq!(deps[0].dst_subpass, 0);
        assert_eq!(deps[0].src_stage_mask, vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT);
        assert_eq!(deps[0].src_access_mask, vk::AccessFlags::empty());
        assert_eq!(
            deps[0].dst_access_mask,
            vk::AccessFlags::COLOR_ATTACHMENT_READ | vk::AccessFlags::COLOR_ATTACHMENT_WRITE
        );

        assert_eq!(deps[1].src_subpass, 0);
        assert_eq!(deps[1].dst_subpass, vk::SUBPASS_EXTERNAL);
        assert_eq!(deps[1].dst_stage_mask, vk::PipelineStageFlags::BOTTOM_OF_PIPE);
        assert_eq!(deps[1].dst_access_mask, vk::AccessFlags::MEMORY_READ);
        assert!(deps[1].dependency_flags.is_empty());
    }

    #[test]
    fn subpasses_are_chained_in_order() {
        let deps = dependencies(&colour_pass(3));
        let edges: Vec<_> = deps.iter().map(|d| (d.src_subpass, d.dst_subpass)).collect();
        assert_eq!(
            edges,
            vec![
                (vk::SUBPASS_EXTERNAL, 0),
                (0, 1),
                (1, 2),
                (2, vk::SUBPASS_EXTERNAL)
            ]
        );
        assert_eq!(deps[1].dependency_flags, vk::DependencyFlags::BY_REGION);
        assert_eq!(deps[2].dependency_flags, vk::DependencyFlags::BY_REGION);
    }

    #[test]
    fn attachment_flags_follow_the_description() {
        let state = RenderPassState::new(
            PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        );
        let dep = dependency(0, state, 1, state);
        assert_eq!(dep.src_stage_mask, vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS);
        assert_eq!(dep.dst_access_mask, vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE);

        let depth = AttachmentDescription::new(
            PixelFormat::D24S8,
            AttachmentLoadOp::Clear,
            AttachmentStoreOp::DontCare,
            ImageLayout::Undefined,
            ImageLayout::DepthStencilAttachmentOptimal,
        )
        .with_stencil_ops(AttachmentLoadOp::Load, AttachmentStoreOp::Store);
        let baked = attachment_description(&depth);
        assert_eq!(baked.format, vk::Format::D24_UNORM_S8_UINT);
        assert_eq!(baked.stencil_load_op, vk::AttachmentLoadOp::LOAD);
        assert_eq!(baked.store_op, vk::AttachmentStoreOp::DONT_CARE);
        assert_eq!(baked.final_layout, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);
    }
}
