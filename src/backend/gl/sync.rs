// Fences over GL sync objects. Semaphores order nothing: there is a single GL queue.

use super::call::GlCall;
use super::consts as gl;
use super::shared::GlShared;
use crate::core::NativeHandle;
use crate::error::{Error, Result};
use crate::flags::FenceCreateFlags;
use crate::sync::{Fence, Semaphore};

pub struct GlFence<'d> {
    shared: &'d GlShared,
    id: u32,
}

impl<'d> GlFence<'d> {
    pub fn new(shared: &'d GlShared, flags: FenceCreateFlags) -> Self {
        let id = shared.next_id();
        shared.register_fence(id, flags.contains(FenceCreateFlags::SIGNALED));
        Self { shared, id }
    }

    fn delete_sync(&self, sync: Option<u64>) {
        if let Some(sync) = sync {
            self.shared.release(GlCall::DeleteSync(sync));
        }
    }
}

impl Fence for GlFence<'_> {
    fn wait(&self, timeout_ns: u64) -> Result<bool> {
        let (sync, signaled) = self.shared.fence_sync(self.id)?;
        if signaled {
            return Ok(true);
        }
        // Never submitted: nothing will ever signal it.
        let Some(sync) = sync else {
            return Ok(false);
        };

        let status = {
            let _guard = self.shared.guard()?;
            self.shared
                .call(GlCall::ClientWaitSync {
                    sync,
                    flags: gl::SYNC_FLUSH_COMMANDS_BIT,
                    timeout_ns,
                })?
                .int()
                .unwrap_or(gl::WAIT_FAILED as i32) as u32
        };
        match status {
            gl::ALREADY_SIGNALED | gl::CONDITION_SATISFIED => {
                let sync = self.shared.signal_fence(self.id)?;
                self.delete_sync(sync);
                Ok(true)
            }
            gl::TIMEOUT_EXPIRED => Ok(false),
            _ => Err(Error::Backend(anyhow::anyhow!(
                "glClientWaitSync failed on fence {}",
                self.id
            ))),
        }
    }

    fn reset(&self) -> Result<()> {
        let sync = self.shared.unsignal_fence(self.id)?;
        self.delete_sync(sync);
        Ok(())
    }

    fn status(&self) -> Result<bool> {
        self.wait(0)
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.id)
    }
}

impl Drop for GlFence<'_> {
    fn drop(&mut self) {
        let sync = self.shared.unregister_fence(self.id);
        self.delete_sync(sync);
    }
}

pub struct GlSemaphore {
    id: u32,
}

impl GlSemaphore {
    pub fn new(shared: &GlShared) -> Self {
        Self {
            id: shared.next_id(),
        }
    }
}

impl Semaphore for GlSemaphore {
    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.id)
    }
}
