// Arrays of uniform blocks in one buffer
//
// Every element starts on a multiple of the device's minimum uniform-buffer offset alignment, so
// each one can be bound on its own (or through a dynamic offset).

use bytemuck::Pod;

use super::Buffer;
use crate::error::{Error, Result};

/// `size` rounded up to the next multiple of `alignment`.
///
/// An alignment of 0 means no constraint.
pub fn aligned_size(size: u64, alignment: u64) -> Result<u64> {
    if size == 0 {
        return Err(Error::precondition("Uniform element size must be non-zero"));
    }
    let alignment = alignment.max(1);
    size.div_ceil(alignment)
        .checked_mul(alignment)
        .ok_or_else(|| Error::precondition(format!("Aligning {size} to {alignment} overflows")))
}

pub struct UniformBuffer<'d> {
    buffer: Box<dyn Buffer + 'd>,
    count: u32,
    element_size: u64,
    aligned_size: u64,
}

impl<'d> UniformBuffer<'d> {
    pub fn new(buffer: Box<dyn Buffer + 'd>, count: u32, element_size: u64, aligned_size: u64) -> Self {
        Self {
            buffer,
            count,
            element_size,
            aligned_size,
        }
    }

    pub fn buffer(&self) -> &(dyn Buffer + 'd) {
        self.buffer.as_ref()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn element_size(&self) -> u64 {
        self.element_size
    }

    /// Stride between two consecutive elements.
    pub fn aligned_size(&self) -> u64 {
        self.aligned_size
    }

    /// Byte offset of element `index`, usable as a dynamic offset.
    pub fn offset(&self, index: u32) -> Result<u64> {
        if index >= self.count {
            return Err(Error::precondition(format!(
                "Uniform element {index} is out of range (count {})",
                self.count
            )));
        }
        Ok(u64::from(index) * self.aligned_size)
    }

    pub fn upload(&self, index: u32, data: &[u8]) -> Result<()> {
        if data.len() as u64 > self.element_size {
            return Err(Error::precondition(format!(
                "{} bytes do not fit a {} byte uniform element",
                data.len(),
                self.element_size
            )));
        }
        let offset = self.offset(index)?;
        self.buffer.upload(offset, data)
    }

    pub fn upload_pod<T: Pod>(&self, index: u32, value: &T) -> Result<()> {
        self.upload(index, bytemuck::bytes_of(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_round_up_to_the_alignment() {
        assert_eq!(aligned_size(48, 64).unwrap(), 64);
        assert_eq!(aligned_size(64, 64).unwrap(), 64);
        assert_eq!(aligned_size(65, 64).unwrap(), 128);
        assert_eq!(aligned_size(1, 256).unwrap(), 256);
    }

    #[test]
    fn zero_alignment_is_no_constraint() {
        assert_eq!(aligned_size(13, 0).unwrap(), 13);
        assert_eq!(aligned_size(13, 1).unwrap(), 13);
    }

    #[test]
    fn empty_elements_are_rejected() {
        assert!(aligned_size(0, 64).unwrap_err().is_precondition());
    }

    #[test]
    fn overflow_is_reported() {
        assert!(aligned_size(u64::MAX, 64).is_err());
    }
}
