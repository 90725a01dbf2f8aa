// A GL context that records calls instead of drawing
//
// Used for headless runs and tests. Object names are handed out in creation order, buffer
// storage is kept in memory, and status queries answer whatever was configured.

use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{anyhow, bail};
use parking_lot::Mutex;

use super::call::{GlCall, GlValue};
use super::consts as gl;
use super::context::{GlCapabilities, GlContext, GlContextFactory};
use crate::core::WindowHandle;

#[derive(Debug)]
struct State {
    calls: Vec<GlCall>,
    next_name: u32,
    next_sync: u64,
    pending_error: u32,
    failures: HashMap<&'static str, u32>,
    buffers: HashMap<u32, Vec<u8>>,
    compile_status: bool,
    link_status: bool,
    validate_status: bool,
    framebuffer_status: u32,
    info_log: String,
    query_result: u64,
    surface: bool,
    lost: bool,
    make_current_calls: u32,
    done_current_calls: u32,
    swaps: u32,
}

impl Default for State {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            next_name: 1,
            next_sync: 1,
            pending_error: gl::NO_ERROR,
            failures: HashMap::new(),
            buffers: HashMap::new(),
            compile_status: true,
            link_status: true,
            validate_status: true,
            framebuffer_status: gl::FRAMEBUFFER_COMPLETE,
            info_log: String::new(),
            query_result: 0,
            surface: false,
            lost: false,
            make_current_calls: 0,
            done_current_calls: 0,
            swaps: 0,
        }
    }
}

impl State {
    fn name(&mut self) -> GlValue {
        let name = self.next_name;
        self.next_name += 1;
        GlValue::Name(name)
    }
}

#[derive(Debug, Default)]
pub struct RecordingContext {
    state: Mutex<State>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call executed so far, in order.
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.state.lock().calls.iter().map(GlCall::name).collect()
    }

    /// How many times the entry point `name` (e.g. `"glDeleteTexture"`) was called.
    pub fn count(&self, name: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.name() == name)
            .count()
    }

    pub fn clear(&self) {
        self.state.lock().calls.clear();
    }

    /// Makes every later call to `name` raise `code`.
    pub fn fail_on(&self, name: &'static str, code: u32) {
        self.state.lock().failures.insert(name, code);
    }

    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    pub fn set_compile_status(&self, ok: bool) {
        self.state.lock().compile_status = ok;
    }

    pub fn set_link_status(&self, ok: bool) {
        self.state.lock().link_status = ok;
    }

    pub fn set_validate_status(&self, ok: bool) {
        self.state.lock().validate_status = ok;
    }

    pub fn set_framebuffer_status(&self, status: u32) {
        self.state.lock().framebuffer_status = status;
    }

    /// Log returned by every info-log query.
    pub fn set_info_log(&self, log: &str) {
        self.state.lock().info_log = log.to_string();
    }

    pub fn set_query_result(&self, result: u64) {
        self.state.lock().query_result = result;
    }

    pub fn set_surface(&self, surface: bool) {
        self.state.lock().surface = surface;
    }

    /// A lost context refuses to become current.
    pub fn set_lost(&self, lost: bool) {
        self.state.lock().lost = lost;
    }

    pub fn make_current_calls(&self) -> u32 {
        self.state.lock().make_current_calls
    }

    pub fn done_current_calls(&self) -> u32 {
        self.state.lock().done_current_calls
    }

    pub fn swaps(&self) -> u32 {
        self.state.lock().swaps
    }

    /// Contents of a buffer that has storage.
    pub fn buffer_contents(&self, buffer: u32) -> Option<Vec<u8>> {
        self.state.lock().buffers.get(&buffer).cloned()
    }
}

impl GlContext for RecordingContext {
    fn make_current(&self) -> anyhow::Result<()> {
        let mut state = self.state.lock();
        if state.lost {
            bail!("GL context lost");
        }
        state.make_current_calls += 1;
        Ok(())
    }

    fn done_current(&self) {
        self.state.lock().done_current_calls += 1;
    }

    fn swap_buffers(&self) -> anyhow::Result<()> {
        let mut state = self.state.lock();
        if !state.surface {
            return Err(anyhow!("Context has no surface to swap"));
        }
        state.swaps += 1;
        Ok(())
    }

    fn has_surface(&self) -> bool {
        self.state.lock().surface
    }

    fn execute(&self, call: &GlCall) -> GlValue {
        let mut state = self.state.lock();
        state.calls.push(call.clone());
        if let Some(&code) = state.failures.get(call.name()) {
            state.pending_error = code;
            return GlValue::None;
        }

        match call {
            GlCall::CreateBuffer
            | GlCall::CreateVertexArray
            | GlCall::CreateTexture { .. }
            | GlCall::GenTexture
            | GlCall::CreateSampler
            | GlCall::CreateFramebuffer
            | GlCall::CreateShader(_)
            | GlCall::CreateProgram
            | GlCall::CreateProgramPipeline
            | GlCall::CreateQuery { .. } => state.name(),
            GlCall::NamedBufferStorage { buffer, size, .. } => {
                state.buffers.insert(*buffer, vec![0; *size as usize]);
                GlValue::None
            }
            GlCall::NamedBufferSubData { buffer, offset, data } => {
                let start = *offset as usize;
                match state.buffers.get_mut(buffer) {
                    Some(storage) if start + data.len() <= storage.len() => {
                        storage[start..start + data.len()].copy_from_slice(data);
                    }
                    _ => state.pending_error = gl::INVALID_VALUE,
                }
                GlValue::None
            }
            GlCall::GetNamedBufferSubData { buffer, offset, size } => {
                let (start, end) = (*offset as usize, (*offset + *size) as usize);
                match state.buffers.get(buffer) {
                    Some(storage) if end <= storage.len() => {
                        GlValue::Bytes(storage[start..end].to_vec())
                    }
                    _ => {
                        state.pending_error = gl::INVALID_VALUE;
                        GlValue::None
                    }
                }
            }
            GlCall::CopyNamedBufferSubData { read, write, read_offset, write_offset, size } => {
                let (from, to) = (*read_offset as usize, *write_offset as usize);
                let len = *size as usize;
                let source = state
                    .buffers
                    .get(read)
                    .filter(|storage| from + len <= storage.len())
                    .map(|storage| storage[from..from + len].to_vec());
                let copied = match (source, state.buffers.get_mut(write)) {
                    (Some(bytes), Some(storage)) if to + len <= storage.len() => {
                        storage[to..to + len].copy_from_slice(&bytes);
                        true
                    }
                    _ => false,
                };
                if !copied {
                    state.pending_error = gl::INVALID_VALUE;
                }
                GlValue::None
            }
            GlCall::DeleteBuffer(buffer) => {
                state.buffers.remove(buffer);
                GlValue::None
            }
            GlCall::GetShaderiv { .. } => GlValue::Int(i32::from(state.compile_status)),
            GlCall::GetProgramiv { .. } => GlValue::Int(i32::from(state.link_status)),
            GlCall::GetProgramPipelineiv { .. } => GlValue::Int(i32::from(state.validate_status)),
            GlCall::GetShaderInfoLog(_)
            | GlCall::GetProgramInfoLog(_)
            | GlCall::GetProgramPipelineInfoLog(_) => GlValue::Text(state.info_log.clone()),
            GlCall::CheckNamedFramebufferStatus { .. } => {
                GlValue::Int(state.framebuffer_status as i32)
            }
            GlCall::FenceSync => {
                let sync = state.next_sync;
                state.next_sync += 1;
                GlValue::UInt64(sync)
            }
            GlCall::ClientWaitSync { .. } => GlValue::Int(gl::ALREADY_SIGNALED as i32),
            GlCall::GetQueryObjectui64v { .. } => GlValue::UInt64(state.query_result),
            _ => GlValue::None,
        }
    }

    fn error(&self) -> u32 {
        std::mem::replace(&mut self.state.lock().pending_error, gl::NO_ERROR)
    }
}

/// Hands out one shared `RecordingContext` for every window.
pub struct RecordingContextFactory {
    caps: GlCapabilities,
    context: Rc<RecordingContext>,
}

impl RecordingContextFactory {
    pub fn new(caps: GlCapabilities) -> Self {
        Self {
            caps,
            context: Rc::new(RecordingContext::new()),
        }
    }

    pub fn context(&self) -> Rc<RecordingContext> {
        Rc::clone(&self.context)
    }
}

impl GlContextFactory for RecordingContextFactory {
    fn capabilities(&self) -> &GlCapabilities {
        &self.caps
    }

    /// Windows get a surface, headless connections do not.
    fn create_context(&self, window: &WindowHandle) -> anyhow::Result<Rc<dyn GlContext>> {
        self.context.set_surface(!window.is_headless());
        let context: Rc<dyn GlContext> = self.context.clone();
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_handed_out_in_order() {
        let context = RecordingContext::new();
        assert_eq!(context.execute(&GlCall::CreateBuffer), GlValue::Name(1));
        assert_eq!(
            context.execute(&GlCall::CreateTexture { target: gl::TEXTURE_2D }),
            GlValue::Name(2)
        );
        assert_eq!(context.count("glCreateBuffers"), 1);
    }

    #[test]
    fn injected_failures_raise_once_per_call() {
        let context = RecordingContext::new();
        context.fail_on("glCreateBuffers", gl::OUT_OF_MEMORY);
        assert_eq!(context.execute(&GlCall::CreateBuffer), GlValue::None);
        assert_eq!(context.error(), gl::OUT_OF_MEMORY);
        assert_eq!(context.error(), gl::NO_ERROR);
    }

    #[test]
    fn buffer_storage_round_trips() {
        let context = RecordingContext::new();
        context.execute(&GlCall::NamedBufferStorage {
            buffer: 7,
            size: 8,
            flags: 0,
        });
        context.execute(&GlCall::NamedBufferSubData {
            buffer: 7,
            offset: 4,
            data: vec![1, 2, 3, 4],
        });
        let read = context.execute(&GlCall::GetNamedBufferSubData {
            buffer: 7,
            offset: 2,
            size: 4,
        });
        assert_eq!(read, GlValue::Bytes(vec![0, 0, 1, 2]));

        context.execute(&GlCall::GetNamedBufferSubData {
            buffer: 7,
            offset: 6,
            size: 4,
        });
        assert_eq!(context.error(), gl::INVALID_VALUE);
    }
}
