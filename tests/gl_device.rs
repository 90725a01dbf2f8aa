// Device-level behaviour of the GL backend, observed through a recording context

use std::rc::Rc;

use approx::assert_relative_eq;
use glam::{IVec3, UVec2, UVec3};

use renderer_hal::backend::gl::consts::{
    self as gl, OUT_OF_MEMORY as GL_OUT_OF_MEMORY,
};
use renderer_hal::backend::gl::{
    GlCall, GlCapabilities, GlRenderer, RecordingContext, RecordingContextFactory,
};
use renderer_hal::command::CommandBufferState;
use renderer_hal::core::NativeHandle;
use renderer_hal::descriptor::{DescriptorResource, DescriptorSetLayoutBinding};
use renderer_hal::enums::{
    AttachmentLoadOp, AttachmentStoreOp, DescriptorType, Filter, ImageLayout, PipelineBindPoint,
    PixelFormat, QueryType, TextureType,
};
use renderer_hal::flags::{
    AccessFlags, BufferTargets, CommandBufferUsageFlags, FenceCreateFlags, ImageUsageFlags,
    MemoryPropertyFlags, PipelineStageFlags, QueryPipelineStatisticFlags, ShaderStageFlags,
};
use renderer_hal::pipeline::Viewport;
use renderer_hal::sync::Fence;
use renderer_hal::render_pass::{
    AttachmentDescription, AttachmentReference, RenderPassState, RenderSubpass,
};
use renderer_hal::transfer::{
    BufferCopy, BufferMemoryBarrier, ImageBlit, ImageSubresourceLayers, MemoryBarrier,
};
use renderer_hal::{ContextGuard, Error, Renderer, RendererConfiguration, WindowHandle};

fn renderer(caps: GlCapabilities) -> (GlRenderer, Rc<RecordingContext>) {
    let factory = RecordingContextFactory::new(caps);
    let context = factory.context();
    let renderer = GlRenderer::new(RendererConfiguration::default(), Box::new(factory));
    (renderer, context)
}

fn host_visible() -> MemoryPropertyFlags {
    MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT
}

fn colour_attachment() -> AttachmentDescription {
    AttachmentDescription::new(
        PixelFormat::R8G8B8A8,
        AttachmentLoadOp::Clear,
        AttachmentStoreOp::Store,
        ImageLayout::Undefined,
        ImageLayout::ColourAttachmentOptimal,
    )
}

fn colour_subpass() -> RenderSubpass {
    RenderSubpass::new(PipelineBindPoint::Graphics, RenderPassState::colour_write())
        .with_colours(vec![AttachmentReference::new(0, ImageLayout::ColourAttachmentOptimal)])
}

#[test]
fn enable_nests_and_releases_once() {
    let (renderer, context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let (made, done) = (context.make_current_calls(), context.done_current_calls());
    assert_eq!(made, done);
    {
        let _outer = ContextGuard::new(device.as_ref()).unwrap();
        let _inner = ContextGuard::new(device.as_ref()).unwrap();
        device.enable().unwrap();
        device.disable();
        assert_eq!(context.make_current_calls(), made + 1);
        assert_eq!(context.done_current_calls(), done);
    }
    assert_eq!(context.make_current_calls(), made + 1);
    assert_eq!(context.done_current_calls(), done + 1);
}

#[test]
fn only_one_physical_device_is_exposed() {
    let (renderer, _context) = renderer(GlCapabilities::default());
    assert_eq!(renderer.physical_devices().len(), 1);
    assert_eq!(renderer.default_device_index(), Some(0));
    let connection = renderer.create_connection(1, WindowHandle::Headless);
    assert!(matches!(connection, Err(ref e) if e.is_precondition()));
}

#[test]
fn old_contexts_without_direct_state_access_are_refused() {
    let caps = GlCapabilities {
        version: (3, 3),
        ..GlCapabilities::default()
    };
    let (renderer, _context) = renderer(caps);
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    assert!(matches!(
        renderer.create_device(&connection),
        Err(Error::Construction { .. })
    ));
}

#[test]
fn host_visible_buffers_round_trip() {
    let (renderer, context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let buffer = device
        .create_buffer(16, BufferTargets::VERTEX_BUFFER, host_visible())
        .unwrap();
    let values = [1.0f32, 2.0, 3.0, 4.0];
    buffer.upload_pod(0, &values).unwrap();

    let mut read = [0u8; 16];
    buffer.download(0, &mut read).unwrap();
    assert_eq!(&read[..], bytemuck::cast_slice::<f32, u8>(&values));

    let name = buffer.native().gl("buffer").unwrap();
    assert_eq!(context.buffer_contents(name), Some(read.to_vec()));

    assert!(buffer.upload(12, &[0; 8]).unwrap_err().is_precondition());
    drop(buffer);
    assert_eq!(context.buffer_contents(name), None);
}

#[test]
fn device_local_buffers_refuse_host_access() {
    let (renderer, _context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let buffer = device
        .create_buffer(16, BufferTargets::VERTEX_BUFFER, MemoryPropertyFlags::DEVICE_LOCAL)
        .unwrap();
    assert!(buffer.upload(0, &[0; 4]).unwrap_err().is_precondition());
}

#[test]
fn uniform_elements_start_on_the_offset_alignment() {
    let caps = GlCapabilities {
        uniform_buffer_offset_alignment: 64,
        ..GlCapabilities::default()
    };
    let (renderer, _context) = renderer(caps);
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    for (element_size, aligned) in [(48, 64), (64, 64), (65, 128)] {
        let uniforms = device
            .create_uniform_buffer(4, element_size, BufferTargets::empty(), host_visible())
            .unwrap();
        assert_eq!(uniforms.aligned_size(), aligned);
        assert_eq!(uniforms.buffer().size(), 4 * aligned);
        assert!(uniforms.buffer().targets().contains(BufferTargets::UNIFORM_BUFFER));
        assert_eq!(uniforms.offset(3).unwrap(), 3 * aligned);
        assert!(uniforms.offset(4).unwrap_err().is_precondition());
    }

    assert!(device
        .create_uniform_buffer(0, 16, BufferTargets::empty(), host_visible())
        .is_err());
}

#[test]
fn descriptor_writes_publish_on_update() {
    let (renderer, _context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let layout = device
        .create_descriptor_set_layout(vec![
            DescriptorSetLayoutBinding::new(0, DescriptorType::UniformBuffer, ShaderStageFlags::VERTEX),
            DescriptorSetLayoutBinding::new(
                1,
                DescriptorType::UniformBufferDynamic,
                ShaderStageFlags::FRAGMENT,
            ),
        ])
        .unwrap();
    assert_eq!(
        layout.binding(1).unwrap().descriptor_type,
        DescriptorType::UniformBufferDynamic
    );
    assert!(layout.binding(2).is_err());

    let buffer = device
        .create_buffer(256, BufferTargets::UNIFORM_BUFFER, host_visible())
        .unwrap();
    let pool = layout.create_pool(1).unwrap();
    let mut set = pool.create_descriptor_set(0).unwrap();

    set.write_uniform_buffer(0, buffer.as_ref(), 0, 64).unwrap();
    set.write_dynamic_uniform_buffer(1, buffer.as_ref(), 0, 64).unwrap();
    assert!(set.published().is_empty());
    assert!(set.write_uniform_buffer(1, buffer.as_ref(), 0, 64).is_err());
    assert!(set.write_uniform_buffer(0, buffer.as_ref(), 224, 64).is_err());

    set.update().unwrap();
    assert_eq!(set.published().len(), 2);

    // A batch the backend refuses stays pending and leaves the published writes alone.
    set.write(
        0,
        0,
        DescriptorResource::UniformBuffer {
            buffer: NativeHandle::Vulkan(7),
            offset: 0,
            range: 64,
            dynamic: false,
        },
    )
    .unwrap();
    assert!(matches!(set.update(), Err(Error::ForeignObject(_))));
    assert_eq!(set.published().len(), 2);
    assert_eq!(set.writes().pending().len(), 1);
    assert!(set.update().is_err());
}

#[test]
fn descriptor_pools_count_their_sets() {
    let (renderer, _context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let layout = device
        .create_descriptor_set_layout(vec![DescriptorSetLayoutBinding::new(
            0,
            DescriptorType::UniformBuffer,
            ShaderStageFlags::VERTEX,
        )])
        .unwrap();
    let pool = layout.create_pool(2).unwrap();

    let first = pool.create_descriptor_set(0).unwrap();
    let second = pool.create_descriptor_set(0).unwrap();
    assert_eq!(pool.allocated(), 2);
    assert!(matches!(pool.create_descriptor_set(0), Err(ref e) if e.is_precondition()));

    drop(first);
    assert_eq!(pool.allocated(), 1);
    let _third = pool.create_descriptor_set(0).unwrap();
    assert_eq!(pool.allocated(), 2);
    drop(second);
    assert_eq!(pool.allocated(), 1);
}

#[test]
fn duplicate_layout_bindings_are_refused() {
    let (renderer, _context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let binding = DescriptorSetLayoutBinding::new(0, DescriptorType::UniformBuffer, ShaderStageFlags::VERTEX);
    assert!(device.create_descriptor_set_layout(vec![binding, binding]).is_err());
}

#[test]
fn submissions_replay_and_signal_the_fence() {
    let (renderer, context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();
    let queue = device.graphics_queue();

    let mut command_buffer = device
        .graphics_command_pool()
        .create_command_buffer(true)
        .unwrap();
    command_buffer.begin(CommandBufferUsageFlags::ONE_TIME_SUBMIT).unwrap();
    command_buffer.set_viewport(Viewport::new(0.0, 0.0, 640.0, 480.0));
    command_buffer.end().unwrap();
    assert_eq!(command_buffer.state(), CommandBufferState::Executable);

    let fence = device.create_fence(FenceCreateFlags::empty()).unwrap();
    assert!(!fence.status().unwrap());

    context.clear();
    queue
        .submit(command_buffer.as_ref(), &[], &[], Some(fence.as_ref()))
        .unwrap();
    assert_eq!(
        context.call_names(),
        vec![
            "glViewportIndexedf",
            "glDepthRangeIndexed",
            "glFenceSync",
            "glFlush"
        ]
    );
    assert!(fence.wait(u64::MAX).unwrap());
    assert_eq!(context.count("glClientWaitSync"), 1);
    assert!(fence.status().unwrap());

    // One-time buffers need a reset before they run again.
    let error = queue
        .submit(command_buffer.as_ref(), &[], &[], None)
        .unwrap_err();
    assert!(error.is_precondition());
    assert_eq!(command_buffer.state(), CommandBufferState::Invalid);

    command_buffer.reset().unwrap();
    command_buffer.begin(CommandBufferUsageFlags::empty()).unwrap();
    command_buffer.end().unwrap();
    queue.submit(command_buffer.as_ref(), &[], &[], None).unwrap();
    queue.submit(command_buffer.as_ref(), &[], &[], None).unwrap();

    fence.reset().unwrap();
    assert!(!fence.status().unwrap());
}

/// A fence owned by the other backend.
struct VulkanFence;

impl Fence for VulkanFence {
    fn wait(&self, _timeout_ns: u64) -> renderer_hal::Result<bool> {
        Ok(true)
    }

    fn reset(&self) -> renderer_hal::Result<()> {
        Ok(())
    }

    fn status(&self) -> renderer_hal::Result<bool> {
        Ok(true)
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Vulkan(1)
    }
}

#[test]
fn refused_submissions_leave_one_time_buffers_executable() {
    let (renderer, context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();
    let queue = device.graphics_queue();

    let mut command_buffer = device
        .graphics_command_pool()
        .create_command_buffer(true)
        .unwrap();
    command_buffer.begin(CommandBufferUsageFlags::ONE_TIME_SUBMIT).unwrap();
    command_buffer.set_viewport(Viewport::new(0.0, 0.0, 640.0, 480.0));
    command_buffer.end().unwrap();

    context.clear();
    let result = queue.submit(command_buffer.as_ref(), &[], &[], Some(&VulkanFence));
    assert!(matches!(result, Err(Error::ForeignObject(_))));
    assert_eq!(command_buffer.state(), CommandBufferState::Executable);
    assert!(context.calls().is_empty());

    context.fail_on("glFlush", GL_OUT_OF_MEMORY);
    assert!(queue.submit(command_buffer.as_ref(), &[], &[], None).is_err());
    assert_eq!(command_buffer.state(), CommandBufferState::Executable);

    context.clear_failures();
    queue.submit(command_buffer.as_ref(), &[], &[], None).unwrap();
    assert_eq!(command_buffer.state(), CommandBufferState::Invalid);
}

#[test]
fn signaled_fences_start_signaled() {
    let (renderer, context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let fence = device.create_fence(FenceCreateFlags::SIGNALED).unwrap();
    assert!(fence.wait(0).unwrap());
    assert_eq!(context.count("glClientWaitSync"), 0);
}

#[test]
fn recording_errors_surface_at_end() {
    let (renderer, _context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let mut command_buffer = device
        .graphics_command_pool()
        .create_command_buffer(true)
        .unwrap();
    command_buffer.draw(3, 1, 0, 0);
    command_buffer.begin(CommandBufferUsageFlags::empty()).unwrap();
    command_buffer.draw(3, 1, 0, 0);
    let error = command_buffer.end().unwrap_err();
    assert!(error.is_precondition());
    assert_eq!(command_buffer.state(), CommandBufferState::Invalid);

    let secondary = device
        .graphics_command_pool()
        .create_command_buffer(false)
        .unwrap();
    let error = device
        .graphics_queue()
        .submit(secondary.as_ref(), &[], &[], None)
        .unwrap_err();
    assert!(error.is_precondition());
}

#[test]
fn failed_frame_buffers_release_what_they_created() {
    let (renderer, context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let render_pass = device
        .create_render_pass(
            vec![colour_attachment()],
            vec![colour_subpass()],
            RenderPassState::colour_output(),
            RenderPassState::bottom_of_pipe(),
        )
        .unwrap();
    let mut texture = device.create_texture(ImageLayout::Undefined).unwrap();
    texture
        .set_image_2d(
            PixelFormat::R8G8B8A8,
            UVec2::new(64, 64),
            ImageUsageFlags::COLOUR_ATTACHMENT | ImageUsageFlags::SAMPLED,
        )
        .unwrap();
    let view = texture
        .create_view(TextureType::E2D, PixelFormat::R8G8B8A8, 0, 1, 0, 1)
        .unwrap();

    let wrong_count = device.create_frame_buffer(render_pass.as_ref(), &[], UVec2::new(64, 64));
    assert!(matches!(wrong_count, Err(ref e) if e.is_precondition()));
    drop(wrong_count);

    context.set_framebuffer_status(0);
    let incomplete =
        device.create_frame_buffer(render_pass.as_ref(), &[view.as_ref()], UVec2::new(64, 64));
    assert!(matches!(incomplete, Err(Error::Construction { .. })));
    drop(incomplete);
    assert_eq!(context.count("glCreateFramebuffers"), 1);
    assert_eq!(context.count("glDeleteFramebuffers"), 1);

    drop(view);
    drop(texture);
    assert_eq!(
        context.count("glCreateTextures") + context.count("glGenTextures"),
        context.count("glDeleteTextures")
    );
}

#[test]
fn render_passes_need_a_subpass() {
    let (renderer, _context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let result = device.create_render_pass(
        vec![colour_attachment()],
        Vec::new(),
        RenderPassState::colour_output(),
        RenderPassState::bottom_of_pipe(),
    );
    assert!(matches!(result, Err(Error::Construction { .. })));
}

#[test]
fn headless_devices_have_no_swap_chain() {
    let (renderer, _context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    assert!(device.create_swap_chain(UVec2::new(640, 480)).is_none());
}

#[test]
fn timestamp_queries_read_back_results() {
    let (renderer, context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let pool = device
        .create_query_pool(QueryType::Timestamp, 2, QueryPipelineStatisticFlags::empty())
        .unwrap();
    assert!(pool.query_handle(1).is_some());
    assert!(pool.query_handle(2).is_none());

    context.set_query_result(42);
    assert_eq!(pool.results(0, 2).unwrap(), vec![42, 42]);
    assert!(pool.results(1, 2).is_err());

    let statistics = device.create_query_pool(
        QueryType::PipelineStatistics,
        1,
        QueryPipelineStatisticFlags::all(),
    );
    assert!(matches!(statistics, Err(Error::Unsupported(_))));
}

#[test]
fn infinite_perspective_has_no_far_plane() {
    let (renderer, _context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let z_near = 0.1;
    let m = device
        .infinite_perspective(60f32.to_radians(), 16.0 / 9.0, z_near)
        .to_cols_array_2d();
    assert_relative_eq!(m[2][2], -1.0);
    assert_relative_eq!(m[2][3], -1.0);
    assert_relative_eq!(m[3][2], -2.0 * z_near);
    assert_relative_eq!(m[3][3], 0.0);
}

#[test]
fn staging_copies_fill_device_local_buffers() {
    let (renderer, context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let staging = device.create_staging_buffer(64).unwrap();
    let vertices = device
        .create_buffer(
            32,
            BufferTargets::VERTEX_BUFFER | BufferTargets::TRANSFER_DST,
            MemoryPropertyFlags::DEVICE_LOCAL,
        )
        .unwrap();
    let mut command_buffer = device
        .graphics_command_pool()
        .create_command_buffer(true)
        .unwrap();

    let data: Vec<u8> = (1..=16).collect();
    staging
        .copy_buffer_data(
            command_buffer.as_mut(),
            device.graphics_queue(),
            &data,
            vertices.as_ref(),
            8,
            AccessFlags::VERTEX_ATTRIBUTE_READ,
            PipelineStageFlags::VERTEX_INPUT,
        )
        .unwrap();

    let name = vertices.native().gl("buffer").unwrap();
    let contents = context.buffer_contents(name).unwrap();
    assert_eq!(&contents[..8], &[0; 8]);
    assert_eq!(&contents[8..24], &data[..]);
    assert_eq!(context.count("glCopyNamedBufferSubData"), 1);
    assert_eq!(context.count("glMemoryBarrier"), 0);
    assert_eq!(command_buffer.state(), CommandBufferState::Invalid);

    // The second range runs past the end of the destination.
    let overflow = staging.copy_buffer_data(
        command_buffer.as_mut(),
        device.graphics_queue(),
        &data,
        vertices.as_ref(),
        24,
        AccessFlags::VERTEX_ATTRIBUTE_READ,
        PipelineStageFlags::VERTEX_INPUT,
    );
    assert!(matches!(overflow, Err(ref e) if e.is_precondition()));
    assert_eq!(context.count("glCopyNamedBufferSubData"), 1);
}

#[test]
fn copies_need_transfer_targets() {
    let (renderer, _context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let src = device
        .create_buffer(16, BufferTargets::VERTEX_BUFFER, host_visible())
        .unwrap();
    let dst = device
        .create_buffer(16, BufferTargets::TRANSFER_DST, MemoryPropertyFlags::DEVICE_LOCAL)
        .unwrap();
    let mut command_buffer = device
        .graphics_command_pool()
        .create_command_buffer(true)
        .unwrap();
    command_buffer.begin(CommandBufferUsageFlags::empty()).unwrap();
    command_buffer.copy_buffer(src.as_ref(), dst.as_ref(), &[BufferCopy::new(0, 0, 16)]);
    assert!(command_buffer.end().unwrap_err().is_precondition());
}

#[test]
fn texture_uploads_read_from_the_unpack_buffer() {
    let (renderer, context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();
    let queue = device.graphics_queue();

    let mut texture = device.create_texture(ImageLayout::Undefined).unwrap();
    texture
        .set_image_2d(
            PixelFormat::R8G8B8A8,
            UVec2::new(8, 4),
            ImageUsageFlags::SAMPLED | ImageUsageFlags::TRANSFER_DST,
        )
        .unwrap();
    let staging = device.create_staging_buffer(256).unwrap();
    let staging_name = staging.buffer().native().gl("buffer").unwrap();
    let mut command_buffer = device
        .graphics_command_pool()
        .create_command_buffer(true)
        .unwrap();

    context.clear();
    staging
        .copy_texture_data(
            command_buffer.as_mut(),
            queue,
            &[0x7f; 128],
            texture.as_ref(),
            ImageLayout::ShaderReadOnlyOptimal,
        )
        .unwrap();
    let calls = context.calls();
    assert!(calls.contains(&GlCall::BindBuffer {
        target: gl::PIXEL_UNPACK_BUFFER,
        buffer: staging_name,
    }));
    assert!(calls.iter().any(|call| matches!(
        call,
        GlCall::TextureSubImage2D { width: 8, height: 4, offset: 0, .. }
    )));
    assert_eq!(context.count("glMemoryBarrier"), 0);

    let short = staging.copy_texture_data(
        command_buffer.as_mut(),
        queue,
        &[0; 64],
        texture.as_ref(),
        ImageLayout::ShaderReadOnlyOptimal,
    );
    assert!(matches!(short, Err(ref e) if e.is_precondition()));
}

#[test]
fn blits_share_two_framebuffers_for_the_device() {
    let (renderer, context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let mut src = device.create_texture(ImageLayout::Undefined).unwrap();
    src.set_image_2d(
        PixelFormat::R8G8B8A8,
        UVec2::new(64, 64),
        ImageUsageFlags::COLOUR_ATTACHMENT | ImageUsageFlags::TRANSFER_SRC,
    )
    .unwrap();
    let mut dst = device.create_texture(ImageLayout::Undefined).unwrap();
    dst.set_image_2d(
        PixelFormat::R8G8B8A8,
        UVec2::new(32, 32),
        ImageUsageFlags::SAMPLED | ImageUsageFlags::TRANSFER_DST,
    )
    .unwrap();
    let region = ImageBlit {
        src_subresource: ImageSubresourceLayers::all_layers(src.info().unwrap(), 0),
        src_offset: IVec3::ZERO,
        src_extent: UVec3::new(64, 64, 1),
        dst_subresource: ImageSubresourceLayers::all_layers(dst.info().unwrap(), 0),
        dst_offset: IVec3::ZERO,
        dst_extent: UVec3::new(32, 32, 1),
    };

    let mut command_buffer = device
        .graphics_command_pool()
        .create_command_buffer(true)
        .unwrap();
    command_buffer.begin(CommandBufferUsageFlags::empty()).unwrap();
    for _ in 0..2 {
        command_buffer.blit_image(
            src.as_ref(),
            ImageLayout::TransferSrcOptimal,
            dst.as_ref(),
            ImageLayout::TransferDstOptimal,
            &[region],
            Filter::Linear,
        );
    }
    command_buffer.end().unwrap();
    assert_eq!(context.count("glCreateFramebuffers"), 2);

    device
        .graphics_queue()
        .submit(command_buffer.as_ref(), &[], &[], None)
        .unwrap();
    assert_eq!(context.count("glBlitNamedFramebuffer"), 2);

    drop(command_buffer);
    drop(src);
    drop(dst);
    assert_eq!(context.count("glDeleteFramebuffers"), 0);
    drop(device);
    assert_eq!(context.count("glDeleteFramebuffers"), 2);
}

#[test]
fn barriers_only_follow_shader_writes() {
    let (renderer, context) = renderer(GlCapabilities::default());
    let connection = renderer.create_connection(0, WindowHandle::Headless).unwrap();
    let device = renderer.create_device(&connection).unwrap();

    let particles = device
        .create_buffer(
            64,
            BufferTargets::STORAGE_BUFFER | BufferTargets::VERTEX_BUFFER,
            MemoryPropertyFlags::DEVICE_LOCAL,
        )
        .unwrap();
    let mut command_buffer = device
        .graphics_command_pool()
        .create_command_buffer(true)
        .unwrap();
    command_buffer.begin(CommandBufferUsageFlags::empty()).unwrap();
    command_buffer.memory_barrier(
        PipelineStageFlags::TRANSFER,
        PipelineStageFlags::VERTEX_INPUT,
        MemoryBarrier::new(AccessFlags::TRANSFER_WRITE, AccessFlags::VERTEX_ATTRIBUTE_READ),
    );
    command_buffer.pipeline_barrier(
        PipelineStageFlags::FRAGMENT_SHADER,
        PipelineStageFlags::VERTEX_INPUT,
        &[],
        &[BufferMemoryBarrier::whole(
            particles.as_ref(),
            AccessFlags::SHADER_WRITE,
            AccessFlags::VERTEX_ATTRIBUTE_READ,
        )],
        &[],
    );
    command_buffer.end().unwrap();

    context.clear();
    device
        .graphics_queue()
        .submit(command_buffer.as_ref(), &[], &[], None)
        .unwrap();
    assert_eq!(context.count("glMemoryBarrier"), 1);
    assert!(context
        .calls()
        .contains(&GlCall::MemoryBarrier(gl::VERTEX_ATTRIB_ARRAY_BARRIER_BIT)));

    command_buffer.begin(CommandBufferUsageFlags::empty()).unwrap();
    command_buffer.memory_barrier(
        PipelineStageFlags::empty(),
        PipelineStageFlags::VERTEX_INPUT,
        MemoryBarrier::default(),
    );
    assert!(command_buffer.end().unwrap_err().is_precondition());
}
