// Presentation surfaces from raw window handles

use std::ffi::{c_void, CStr};

use anyhow::Context;
use ash::extensions::khr;
use ash::vk;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use crate::core::WindowHandle;
use crate::error::{Error, Result};

/// Instance extensions a surface may need. Only those the loader reports get enabled.
pub fn surface_extensions() -> [&'static CStr; 5] {
    [
        khr::Surface::name(),
        khr::Win32Surface::name(),
        khr::XlibSurface::name(),
        khr::WaylandSurface::name(),
        khr::XcbSurface::name(),
    ]
}

/// Creates the surface for `window`, or `None` when headless.
///
/// # Safety
/// The window behind the handles must outlive the surface.
pub unsafe fn create_surface(
    entry: &ash::Entry,
    instance: &ash::Instance,
    window: &WindowHandle,
) -> Result<Option<vk::SurfaceKHR>> {
    let (window, display) = match window {
        WindowHandle::Headless => return Ok(None),
        WindowHandle::Window { window, display } => (window, display),
    };

    let surface = match (display, window) {
        (RawDisplayHandle::Windows(_), RawWindowHandle::Win32(handle)) => {
            let hinstance = handle.hinstance.map(|h| h.get()).unwrap_or(0) as *const c_void;
            let hwnd = handle.hwnd.get() as *const c_void;
            let create_info = vk::Win32SurfaceCreateInfoKHR::builder()
                .hinstance(hinstance)
                .hwnd(hwnd);
            khr::Win32Surface::new(entry, instance)
                .create_win32_surface(&create_info, None)
                .context("Failed to create Win32 surface")?
        }
        (RawDisplayHandle::Xlib(display), RawWindowHandle::Xlib(handle)) => {
            let dpy = display
                .display
                .map_or(std::ptr::null_mut(), |d| d.as_ptr());
            let create_info = vk::XlibSurfaceCreateInfoKHR::builder()
                .dpy(dpy.cast())
                .window(handle.window);
            khr::XlibSurface::new(entry, instance)
                .create_xlib_surface(&create_info, None)
                .context("Failed to create Xlib surface")?
        }
        (RawDisplayHandle::Wayland(display), RawWindowHandle::Wayland(handle)) => {
            let create_info = vk::WaylandSurfaceCreateInfoKHR::builder()
                .display(display.display.as_ptr())
                .surface(handle.surface.as_ptr());
            khr::WaylandSurface::new(entry, instance)
                .create_wayland_surface(&create_info, None)
                .context("Failed to create Wayland surface")?
        }
        (RawDisplayHandle::Xcb(display), RawWindowHandle::Xcb(handle)) => {
            let connection = display
                .connection
                .map_or(std::ptr::null_mut(), |c| c.as_ptr());
            let create_info = vk::XcbSurfaceCreateInfoKHR::builder()
                .connection(connection)
                .window(handle.window.get());
            khr::XcbSurface::new(entry, instance)
                .create_xcb_surface(&create_info, None)
                .context("Failed to create XCB surface")?
        }
        _ => {
            return Err(Error::Unsupported(format!(
                "Window handle {window:?} on display {display:?}"
            )))
        }
    };

    Ok(Some(surface))
}
