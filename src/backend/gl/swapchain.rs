// The window's default framebuffer as a one-image swap chain

use glam::UVec2;

use super::call::GlCall;
use super::image::GlDefaultView;
use super::shared::GlShared;
use crate::command::Queue;
use crate::core::{NativeHandle, SwapChain};
use crate::enums::{PixelFormat, TextureType};
use crate::error::{Error, Result};
use crate::flags::ImageAspectFlags;
use crate::resource::{ImageSubresourceRange, TextureView, TextureViewInfo};
use crate::sync::{Fence, Semaphore};

pub struct GlSwapChain<'d> {
    shared: &'d GlShared,
    extent: UVec2,
    view: GlDefaultView,
}

impl<'d> GlSwapChain<'d> {
    pub fn new(shared: &'d GlShared, extent: UVec2) -> Result<Self> {
        if !shared.context().has_surface() {
            return Err(Error::Unsupported(
                "Headless GL contexts have no default framebuffer".to_string(),
            ));
        }
        if extent.x == 0 || extent.y == 0 {
            return Err(Error::precondition("Swap chain extent must be non-zero"));
        }
        let view = GlDefaultView::new(TextureViewInfo {
            view_type: TextureType::E2D,
            format: PixelFormat::R8G8B8A8,
            subresource: ImageSubresourceRange {
                aspect_mask: ImageAspectFlags::COLOUR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            },
        });
        log::info!("GL swap chain: {}x{} default framebuffer", extent.x, extent.y);
        Ok(Self {
            shared,
            extent,
            view,
        })
    }
}

impl SwapChain for GlSwapChain<'_> {
    fn extent(&self) -> UVec2 {
        self.extent
    }

    fn format(&self) -> PixelFormat {
        PixelFormat::R8G8B8A8
    }

    fn views(&self) -> Vec<&dyn TextureView> {
        vec![&self.view]
    }

    /// The default framebuffer is always writable: `fence` is signaled right away.
    fn acquire_next_image(
        &self,
        _timeout_ns: u64,
        semaphore: Option<&dyn Semaphore>,
        fence: Option<&dyn Fence>,
    ) -> Result<u32> {
        if let Some(semaphore) = semaphore {
            semaphore.native().gl("semaphore")?;
        }
        if let Some(fence) = fence {
            let id = fence.native().gl("fence")?;
            if let Some(sync) = self.shared.signal_fence(id)? {
                self.shared.release(GlCall::DeleteSync(sync));
            }
        }
        Ok(0)
    }

    fn present(&self, queue: &dyn Queue, image_index: u32, wait: &[&dyn Semaphore]) -> Result<bool> {
        queue.native().gl("queue")?;
        for semaphore in wait {
            semaphore.native().gl("semaphore")?;
        }
        if image_index != 0 {
            return Err(Error::precondition(format!(
                "GL swap chains have one image, {image_index} was presented"
            )));
        }
        let _guard = self.shared.guard()?;
        self.shared.context().swap_buffers()?;
        Ok(false)
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(0)
    }
}
