// Connection between a physical device and a window
//
// The windowing collaborator owns the window; this only carries its raw handles.

use std::any::Any;
use std::marker::PhantomData;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};

use crate::error::{Error, Result};

/// Raw handles of the window a device presents to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowHandle {
    /// No presentation surface. Swap chain creation soft-fails.
    Headless,
    Window {
        window: RawWindowHandle,
        display: RawDisplayHandle,
    },
}

impl WindowHandle {
    pub fn from_window<W: HasWindowHandle + HasDisplayHandle>(window: &W) -> Result<Self> {
        let raw_window = window
            .window_handle()
            .map_err(|e| Error::Unsupported(format!("Window handle unavailable: {e}")))?
            .as_raw();
        let raw_display = window
            .display_handle()
            .map_err(|e| Error::Unsupported(format!("Display handle unavailable: {e}")))?
            .as_raw();
        Ok(Self::Window {
            window: raw_window,
            display: raw_display,
        })
    }

    pub fn is_headless(&self) -> bool {
        matches!(self, Self::Headless)
    }
}

/// A physical device index bound to a window, plus the backend's per-connection state.
///
/// The connection borrows the renderer that made it and must not outlive it.
pub struct Connection<'r> {
    device_index: u32,
    window: WindowHandle,
    native: Box<dyn Any>,
    _renderer: PhantomData<&'r ()>,
}

impl<'r> Connection<'r> {
    pub fn new(device_index: u32, window: WindowHandle, native: Box<dyn Any>) -> Self {
        Self {
            device_index,
            window,
            native,
            _renderer: PhantomData,
        }
    }

    pub fn device_index(&self) -> u32 {
        self.device_index
    }

    pub fn window(&self) -> &WindowHandle {
        &self.window
    }

    /// The backend state attached at creation, if it is a `T`.
    pub fn native<T: 'static>(&self) -> Option<&T> {
        self.native.downcast_ref::<T>()
    }
}

impl std::fmt::Debug for Connection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("device_index", &self.device_index)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
