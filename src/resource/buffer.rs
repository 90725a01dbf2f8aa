// Buffers and texel-buffer views

use bytemuck::Pod;

use crate::core::NativeHandle;
use crate::enums::PixelFormat;
use crate::error::{Error, Result};
use crate::flags::{BufferTargets, MemoryPropertyFlags};

pub trait Buffer {
    fn size(&self) -> u64;

    fn targets(&self) -> BufferTargets;

    fn memory_flags(&self) -> MemoryPropertyFlags;

    fn native(&self) -> NativeHandle;

    /// Backend copy into the buffer. The range is already checked.
    fn write(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Backend copy out of the buffer. The range is already checked.
    fn read(&self, offset: u64, data: &mut [u8]) -> Result<()>;

    /// Copies `data` into host-visible memory at `offset`.
    fn upload(&self, offset: u64, data: &[u8]) -> Result<()> {
        check_host_range(self.size(), self.memory_flags(), offset, data.len())?;
        self.write(offset, data)
    }

    /// Fills `data` from host-visible memory at `offset`.
    fn download(&self, offset: u64, data: &mut [u8]) -> Result<()> {
        check_host_range(self.size(), self.memory_flags(), offset, data.len())?;
        self.read(offset, data)
    }
}

impl<'a> dyn Buffer + 'a {
    /// Uploads plain-old-data values.
    pub fn upload_pod<T: Pod>(&self, offset: u64, values: &[T]) -> Result<()> {
        self.upload(offset, bytemuck::cast_slice(values))
    }
}

fn check_host_range(size: u64, flags: MemoryPropertyFlags, offset: u64, len: usize) -> Result<()> {
    if !flags.contains(MemoryPropertyFlags::HOST_VISIBLE) {
        return Err(Error::precondition("Buffer memory is not host visible"));
    }
    let end = offset.checked_add(len as u64);
    match end {
        Some(end) if end <= size => Ok(()),
        _ => Err(Error::precondition(format!(
            "Range {offset}+{len} is outside a buffer of {size} bytes"
        ))),
    }
}

/// Checks the arguments of `Device::create_buffer_view` against the buffer.
pub fn check_buffer_view(
    buffer: &dyn Buffer,
    format: PixelFormat,
    offset: u64,
    range: u64,
    alignment: u64,
) -> Result<()> {
    if !buffer
        .targets()
        .intersects(BufferTargets::UNIFORM_TEXEL_BUFFER | BufferTargets::STORAGE_TEXEL_BUFFER)
    {
        return Err(Error::precondition("Buffer views need a texel buffer target"));
    }
    let Some(texel) = format.size_in_bytes() else {
        return Err(Error::precondition(format!("{format:?} cannot back a texel buffer")));
    };
    if format.is_depth_or_stencil_format() {
        return Err(Error::precondition(format!("{format:?} cannot back a texel buffer")));
    }
    if range == 0 || range % u64::from(texel) != 0 {
        return Err(Error::precondition(format!(
            "Buffer view range {range} is not a multiple of {texel} byte texels"
        )));
    }
    if alignment > 1 && offset % alignment != 0 {
        return Err(Error::precondition(format!(
            "Buffer view offset {offset} is not aligned to {alignment}"
        )));
    }
    match offset.checked_add(range) {
        Some(end) if end <= buffer.size() => Ok(()),
        _ => Err(Error::precondition(format!(
            "Buffer view {offset}+{range} is outside a buffer of {} bytes",
            buffer.size()
        ))),
    }
}

/// A formatted window over a buffer, bound as a texel buffer.
pub trait BufferView {
    fn buffer(&self) -> NativeHandle;
    fn format(&self) -> PixelFormat;
    fn offset(&self) -> u64;
    fn range(&self) -> u64;
    fn native(&self) -> NativeHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_range_checks() {
        let visible = MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT;
        assert!(check_host_range(64, visible, 0, 64).is_ok());
        assert!(check_host_range(64, visible, 60, 4).is_ok());
        assert!(check_host_range(64, visible, 61, 4).unwrap_err().is_precondition());
        assert!(check_host_range(64, visible, u64::MAX, 1).is_err());
        assert!(check_host_range(64, MemoryPropertyFlags::DEVICE_LOCAL, 0, 4).is_err());
    }
}
