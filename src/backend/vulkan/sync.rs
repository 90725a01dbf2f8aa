// Vulkan fences and semaphores

use anyhow::Context;
use ash::vk;

use super::convert;
use super::shared::VulkanShared;
use crate::core::NativeHandle;
use crate::error::Result;
use crate::flags::FenceCreateFlags;
use crate::sync::{Fence, Semaphore};

pub struct VulkanFence<'d> {
    shared: &'d VulkanShared,
    fence: vk::Fence,
}

impl<'d> VulkanFence<'d> {
    pub fn new(shared: &'d VulkanShared, flags: FenceCreateFlags) -> Result<Self> {
        let fence_info =
            vk::FenceCreateInfo::builder().flags(vk::FenceCreateFlags::from_raw(flags.bits()));
        let fence = unsafe { shared.device.create_fence(&fence_info, None) }
            .context("Failed to create fence")?;
        Ok(Self { shared, fence })
    }
}

impl Fence for VulkanFence<'_> {
    fn wait(&self, timeout_ns: u64) -> Result<bool> {
        match unsafe { self.shared.device.wait_for_fences(&[self.fence], true, timeout_ns) } {
            Ok(()) => Ok(true),
            Err(vk::Result::TIMEOUT) => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to wait for fence").into()),
        }
    }

    fn reset(&self) -> Result<()> {
        unsafe { self.shared.device.reset_fences(&[self.fence]) }
            .context("Failed to reset fence")?;
        Ok(())
    }

    fn status(&self) -> Result<bool> {
        let signaled = unsafe { self.shared.device.get_fence_status(self.fence) }
            .context("Failed to query fence status")?;
        Ok(signaled)
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.fence)
    }
}

impl Drop for VulkanFence<'_> {
    fn drop(&mut self) {
        unsafe { self.shared.device.destroy_fence(self.fence, None) };
    }
}

pub struct VulkanSemaphore<'d> {
    shared: &'d VulkanShared,
    semaphore: vk::Semaphore,
}

impl<'d> VulkanSemaphore<'d> {
    pub fn new(shared: &'d VulkanShared) -> Result<Self> {
        let semaphore = unsafe {
            shared
                .device
                .create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
        }
        .context("Failed to create semaphore")?;
        Ok(Self { shared, semaphore })
    }
}

impl Semaphore for VulkanSemaphore<'_> {
    fn native(&self) -> NativeHandle {
        convert::native(self.semaphore)
    }
}

impl Drop for VulkanSemaphore<'_> {
    fn drop(&mut self) {
        unsafe { self.shared.device.destroy_semaphore(self.semaphore, None) };
    }
}
