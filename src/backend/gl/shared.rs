// State every object of one GL device reaches: the context, enable counting and the
// registries linking command buffers, fences and frame buffers by name.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::anyhow;

use super::call::{GlCall, GlValue};
use super::consts as gl;
use super::context::{GlCapabilities, GlContext};
use crate::core::PhysicalDevice;
use crate::error::{Error, Result};
use crate::projection::ClipDirection;

#[derive(Debug, Default, Clone, Copy)]
struct FenceSlot {
    sync: Option<u64>,
    signaled: bool,
}

pub struct GlShared {
    context: Rc<dyn GlContext>,
    caps: GlCapabilities,
    physical_device: PhysicalDevice,
    clip_direction: ClipDirection,
    enabled: Cell<u32>,
    next_id: Cell<u32>,
    command_lists: RefCell<HashMap<u32, Rc<[GlCall]>>>,
    fences: RefCell<HashMap<u32, FenceSlot>>,
    resolve_targets: RefCell<HashMap<u32, Vec<(u32, u32)>>>,
    vao: Cell<u32>,
    push_constant_buffer: Cell<u32>,
    blit_framebuffers: Cell<Option<(u32, u32)>>,
}

impl GlShared {
    pub fn new(context: Rc<dyn GlContext>, caps: GlCapabilities) -> Self {
        let clip_direction = if caps.supports_clip_control() {
            ClipDirection::TOP_DOWN
        } else {
            ClipDirection::BOTTOM_UP
        };
        Self {
            context,
            physical_device: caps.physical_device(),
            caps,
            clip_direction,
            enabled: Cell::new(0),
            next_id: Cell::new(1),
            command_lists: RefCell::new(HashMap::new()),
            fences: RefCell::new(HashMap::new()),
            resolve_targets: RefCell::new(HashMap::new()),
            vao: Cell::new(0),
            push_constant_buffer: Cell::new(0),
            blit_framebuffers: Cell::new(None),
        }
    }

    pub fn context(&self) -> &dyn GlContext {
        self.context.as_ref()
    }

    pub fn caps(&self) -> &GlCapabilities {
        &self.caps
    }

    pub fn physical_device(&self) -> &PhysicalDevice {
        &self.physical_device
    }

    pub fn clip_direction(&self) -> ClipDirection {
        self.clip_direction
    }

    /// Uniform buffer binding reserved for push constants: the last one.
    pub fn push_constant_binding(&self) -> u32 {
        self.caps.max_uniform_buffer_bindings.saturating_sub(1)
    }

    pub fn vao(&self) -> u32 {
        self.vao.get()
    }

    pub fn push_constant_buffer(&self) -> u32 {
        self.push_constant_buffer.get()
    }

    pub(super) fn set_device_objects(&self, vao: u32, push_constant_buffer: u32) {
        self.vao.set(vao);
        self.push_constant_buffer.set(push_constant_buffer);
    }

    /// Read and draw framebuffers that blits attach textures to, made on first use.
    pub fn blit_framebuffers(&self) -> Result<(u32, u32)> {
        if let Some(pair) = self.blit_framebuffers.get() {
            return Ok(pair);
        }
        let _guard = self.guard()?;
        let read = self.create(GlCall::CreateFramebuffer)?;
        let draw = match self.create(GlCall::CreateFramebuffer) {
            Ok(draw) => draw,
            Err(e) => {
                self.release(GlCall::DeleteFramebuffer(read));
                return Err(e);
            }
        };
        log::debug!("Created blit framebuffers {} and {}", read, draw);
        self.blit_framebuffers.set(Some((read, draw)));
        Ok((read, draw))
    }

    pub(super) fn take_blit_framebuffers(&self) -> Option<(u32, u32)> {
        self.blit_framebuffers.take()
    }

    /// Handle for objects GL has no name for (layouts, pools, command buffers, fences).
    pub fn next_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1).max(1));
        id
    }

    pub fn enable(&self) -> Result<()> {
        let count = self.enabled.get();
        if count == 0 {
            self.context.make_current()?;
        }
        self.enabled.set(count + 1);
        Ok(())
    }

    pub fn disable(&self) {
        match self.enabled.get() {
            0 => log::warn!("GL context disabled more often than enabled"),
            1 => {
                self.enabled.set(0);
                self.context.done_current();
            }
            count => self.enabled.set(count - 1),
        }
    }

    pub fn enable_count(&self) -> u32 {
        self.enabled.get()
    }

    pub fn guard(&self) -> Result<SharedGuard<'_>> {
        self.enable()?;
        Ok(SharedGuard { shared: self })
    }

    pub fn call(&self, call: GlCall) -> Result<GlValue> {
        self.replay(&call)
    }

    /// Executes one call and checks the error flag right after it.
    pub fn replay(&self, call: &GlCall) -> Result<GlValue> {
        log::trace!("{}", call.name());
        let value = self.context.execute(call);
        let code = self.context.error();
        if code != gl::NO_ERROR {
            log::error!("{} failed: {}", call.name(), gl::error_name(code));
            return Err(Error::Backend(anyhow!(
                "{} failed with {}",
                call.name(),
                gl::error_name(code)
            )));
        }
        Ok(value)
    }

    /// Executes a call that returns a new object name.
    pub fn create(&self, call: GlCall) -> Result<u32> {
        let what = call.name();
        self.call(call)?
            .name()
            .ok_or_else(|| Error::Backend(anyhow!("{what} returned no object name")))
    }

    /// Deletes an object from a destructor, where failures can only be logged.
    pub fn release(&self, call: GlCall) {
        let result = self.guard().and_then(|_guard| self.call(call));
        if let Err(e) = result {
            log::error!("Failed to release GL object: {}", e);
        }
    }

    pub fn store_command_list(&self, id: u32, calls: Vec<GlCall>) {
        self.command_lists.borrow_mut().insert(id, Rc::from(calls));
    }

    pub fn command_list(&self, id: u32) -> Option<Rc<[GlCall]>> {
        self.command_lists.borrow().get(&id).cloned()
    }

    pub fn drop_command_list(&self, id: u32) {
        self.command_lists.borrow_mut().remove(&id);
    }

    pub fn register_fence(&self, id: u32, signaled: bool) {
        self.fences.borrow_mut().insert(
            id,
            FenceSlot {
                sync: None,
                signaled,
            },
        );
    }

    /// Puts a new sync object behind a fence, returning the one it replaces.
    pub fn attach_sync(&self, id: u32, sync: u64) -> Result<Option<u64>> {
        let mut fences = self.fences.borrow_mut();
        let slot = fences
            .get_mut(&id)
            .ok_or_else(|| Error::precondition(format!("Fence {id} is not known to this device")))?;
        slot.signaled = false;
        Ok(slot.sync.replace(sync))
    }

    pub fn fence_sync(&self, id: u32) -> Result<(Option<u64>, bool)> {
        self.fences
            .borrow()
            .get(&id)
            .map(|slot| (slot.sync, slot.signaled))
            .ok_or_else(|| Error::precondition(format!("Fence {id} is not known to this device")))
    }

    /// Marks a fence signaled and returns its sync object, which the caller deletes.
    pub fn signal_fence(&self, id: u32) -> Result<Option<u64>> {
        let mut fences = self.fences.borrow_mut();
        let slot = fences
            .get_mut(&id)
            .ok_or_else(|| Error::precondition(format!("Fence {id} is not known to this device")))?;
        slot.signaled = true;
        Ok(slot.sync.take())
    }

    /// Unsignals a fence and returns its sync object, which the caller deletes.
    pub fn unsignal_fence(&self, id: u32) -> Result<Option<u64>> {
        let mut fences = self.fences.borrow_mut();
        let slot = fences
            .get_mut(&id)
            .ok_or_else(|| Error::precondition(format!("Fence {id} is not known to this device")))?;
        slot.signaled = false;
        Ok(slot.sync.take())
    }

    pub fn unregister_fence(&self, id: u32) -> Option<u64> {
        self.fences.borrow_mut().remove(&id).and_then(|slot| slot.sync)
    }

    /// Frame buffers resolving into attachment `a` blit into a single-attachment frame buffer.
    pub fn register_resolve_targets(&self, framebuffer: u32, targets: Vec<(u32, u32)>) {
        if !targets.is_empty() {
            self.resolve_targets.borrow_mut().insert(framebuffer, targets);
        }
    }

    pub fn resolve_target(&self, framebuffer: u32, attachment: u32) -> Option<u32> {
        self.resolve_targets
            .borrow()
            .get(&framebuffer)
            .and_then(|targets| targets.iter().find(|(a, _)| *a == attachment))
            .map(|(_, target)| *target)
    }

    pub fn unregister_resolve_targets(&self, framebuffer: u32) {
        self.resolve_targets.borrow_mut().remove(&framebuffer);
    }
}

/// Enables the context for its own lifetime.
pub struct SharedGuard<'a> {
    shared: &'a GlShared,
}

impl Drop for SharedGuard<'_> {
    fn drop(&mut self) {
        self.shared.disable();
    }
}
