// GL buffers: immutable storage, written with sub-data updates

use anyhow::anyhow;

use super::call::GlCall;
use super::consts as gl;
use super::convert;
use super::shared::GlShared;
use crate::core::NativeHandle;
use crate::enums::PixelFormat;
use crate::error::{Error, Result};
use crate::flags::{BufferTargets, MemoryPropertyFlags};
use crate::resource::{Buffer, BufferView};

pub struct GlBuffer<'d> {
    shared: &'d GlShared,
    name: u32,
    size: u64,
    targets: BufferTargets,
    memory_flags: MemoryPropertyFlags,
}

impl<'d> GlBuffer<'d> {
    pub fn new(
        shared: &'d GlShared,
        size: u64,
        targets: BufferTargets,
        memory_flags: MemoryPropertyFlags,
    ) -> Result<Self> {
        if size == 0 {
            return Err(Error::precondition("Buffers need a non-zero size"));
        }
        let _guard = shared.guard()?;
        let name = shared.create(GlCall::CreateBuffer)?;
        let buffer = Self {
            shared,
            name,
            size,
            targets,
            memory_flags,
        };

        let mut flags = gl::DYNAMIC_STORAGE_BIT;
        if memory_flags.contains(MemoryPropertyFlags::HOST_VISIBLE) {
            flags |= gl::MAP_READ_BIT | gl::MAP_WRITE_BIT;
        }
        if !memory_flags.contains(MemoryPropertyFlags::DEVICE_LOCAL) {
            flags |= gl::CLIENT_STORAGE_BIT;
        }
        // On failure `buffer` drops here and deletes the name.
        shared.call(GlCall::NamedBufferStorage { buffer: name, size, flags })?;
        Ok(buffer)
    }
}

impl Buffer for GlBuffer<'_> {
    fn size(&self) -> u64 {
        self.size
    }

    fn targets(&self) -> BufferTargets {
        self.targets
    }

    fn memory_flags(&self) -> MemoryPropertyFlags {
        self.memory_flags
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.name)
    }

    fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        let _guard = self.shared.guard()?;
        self.shared.call(GlCall::NamedBufferSubData {
            buffer: self.name,
            offset,
            data: data.to_vec(),
        })?;
        Ok(())
    }

    fn read(&self, offset: u64, data: &mut [u8]) -> Result<()> {
        let _guard = self.shared.guard()?;
        let bytes = self
            .shared
            .call(GlCall::GetNamedBufferSubData {
                buffer: self.name,
                offset,
                size: data.len() as u64,
            })?
            .into_bytes()
            .filter(|bytes| bytes.len() == data.len())
            .ok_or_else(|| Error::Backend(anyhow!("Buffer {} read back short", self.name)))?;
        data.copy_from_slice(&bytes);
        Ok(())
    }
}

impl Drop for GlBuffer<'_> {
    fn drop(&mut self) {
        self.shared.release(GlCall::DeleteBuffer(self.name));
    }
}

/// A buffer texture over a range of a buffer.
pub struct GlBufferView<'d> {
    shared: &'d GlShared,
    name: u32,
    buffer: u32,
    format: PixelFormat,
    offset: u64,
    range: u64,
}

impl<'d> GlBufferView<'d> {
    /// The arguments are already checked against the buffer.
    pub fn new(
        shared: &'d GlShared,
        buffer: u32,
        format: PixelFormat,
        offset: u64,
        range: u64,
    ) -> Result<Self> {
        let internal_format = convert::internal_format(format)?;
        let _guard = shared.guard()?;
        let name = shared.create(GlCall::CreateTexture {
            target: gl::TEXTURE_BUFFER,
        })?;
        let view = Self {
            shared,
            name,
            buffer,
            format,
            offset,
            range,
        };
        shared.call(GlCall::TextureBufferRange {
            texture: name,
            format: internal_format,
            buffer,
            offset,
            size: range,
        })?;
        Ok(view)
    }
}

impl BufferView for GlBufferView<'_> {
    fn buffer(&self) -> NativeHandle {
        NativeHandle::Gl(self.buffer)
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn offset(&self) -> u64 {
        self.offset
    }

    fn range(&self) -> u64 {
        self.range
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.name)
    }
}

impl Drop for GlBufferView<'_> {
    fn drop(&mut self) {
        self.shared.release(GlCall::DeleteTexture(self.name));
    }
}
