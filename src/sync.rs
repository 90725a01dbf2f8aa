// Fences and semaphores

use crate::core::NativeHandle;
use crate::error::Result;

/// CPU-observable completion signal of a queue submission.
pub trait Fence {
    /// Waits up to `timeout_ns` for the fence. Returns `false` on timeout.
    fn wait(&self, timeout_ns: u64) -> Result<bool>;

    /// Returns the fence to the unsignaled state.
    fn reset(&self) -> Result<()>;

    /// Tells if the fence is signaled, without blocking.
    fn status(&self) -> Result<bool>;

    fn native(&self) -> NativeHandle;
}

/// GPU-side ordering between queue submissions.
pub trait Semaphore {
    fn native(&self) -> NativeHandle;
}
