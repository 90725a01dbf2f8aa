// Presentation surface images

use glam::UVec2;

use super::NativeHandle;
use crate::command::Queue;
use crate::enums::PixelFormat;
use crate::error::Result;
use crate::resource::TextureView;
use crate::sync::{Fence, Semaphore};

pub trait SwapChain {
    fn extent(&self) -> UVec2;

    fn format(&self) -> PixelFormat;

    /// One view per presentable image, in image index order.
    fn views(&self) -> Vec<&dyn TextureView>;

    fn image_count(&self) -> u32 {
        self.views().len() as u32
    }

    /// Index of the next image to render into. `semaphore` and `fence` are signaled once the
    /// image can be written.
    fn acquire_next_image(
        &self,
        timeout_ns: u64,
        semaphore: Option<&dyn Semaphore>,
        fence: Option<&dyn Fence>,
    ) -> Result<u32>;

    /// Queues the image for presentation after every `wait` semaphore is signaled.
    ///
    /// Returns `true` when the swap chain no longer matches the surface and should be recreated.
    fn present(&self, queue: &dyn Queue, image_index: u32, wait: &[&dyn Semaphore]) -> Result<bool>;

    fn native(&self) -> NativeHandle;
}
