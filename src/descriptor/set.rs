// Descriptor sets
//
// Writes accumulate as pending until `update` publishes them as one batch. Writes made after an
// update stay pending until the next one.

use super::LayoutBindings;
use crate::core::NativeHandle;
use crate::enums::{DescriptorType, ImageLayout, PixelFormat, TextureType};
use crate::error::{Error, Result};
use crate::resource::{Buffer, BufferView, Sampler, TextureView};

/// A resource bound to one array element of a binding slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DescriptorResource {
    CombinedTextureSampler {
        view: NativeHandle,
        view_type: TextureType,
        sampler: NativeHandle,
        layout: ImageLayout,
    },
    Sampler {
        sampler: NativeHandle,
    },
    SampledTexture {
        view: NativeHandle,
        view_type: TextureType,
        layout: ImageLayout,
    },
    StorageTexture {
        view: NativeHandle,
        view_type: TextureType,
        format: PixelFormat,
        layout: ImageLayout,
    },
    /// `dynamic` ranges move by the offset given when the set is bound.
    UniformBuffer {
        buffer: NativeHandle,
        offset: u64,
        range: u64,
        dynamic: bool,
    },
    StorageBuffer {
        buffer: NativeHandle,
        offset: u64,
        range: u64,
        dynamic: bool,
    },
    TexelBuffer {
        view: NativeHandle,
        format: PixelFormat,
        storage: bool,
    },
}

impl DescriptorResource {
    /// Tells if this resource may be written to a slot of `descriptor_type`.
    pub fn accepts(&self, descriptor_type: DescriptorType) -> bool {
        use DescriptorType as T;
        match *self {
            Self::CombinedTextureSampler { .. } => descriptor_type == T::CombinedImageSampler,
            Self::Sampler { .. } => descriptor_type == T::Sampler,
            Self::SampledTexture { .. } => {
                matches!(descriptor_type, T::SampledImage | T::InputAttachment)
            }
            Self::StorageTexture { .. } => descriptor_type == T::StorageImage,
            Self::UniformBuffer { dynamic, .. } => {
                descriptor_type == if dynamic { T::UniformBufferDynamic } else { T::UniformBuffer }
            }
            Self::StorageBuffer { dynamic, .. } => {
                descriptor_type == if dynamic { T::StorageBufferDynamic } else { T::StorageBuffer }
            }
            Self::TexelBuffer { storage, .. } => {
                descriptor_type
                    == if storage {
                        T::StorageTexelBuffer
                    } else {
                        T::UniformTexelBuffer
                    }
            }
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            Self::UniformBuffer { dynamic: true, .. } | Self::StorageBuffer { dynamic: true, .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptorWrite {
    pub binding: u32,
    pub array_element: u32,
    pub resource: DescriptorResource,
}

/// Pending and published writes of one set, checked against its layout.
#[derive(Debug, Clone)]
pub struct DescriptorWrites {
    layout: LayoutBindings,
    pending: Vec<DescriptorWrite>,
    published: Vec<DescriptorWrite>,
}

impl DescriptorWrites {
    pub fn new(layout: LayoutBindings) -> Self {
        Self {
            layout,
            pending: Vec::new(),
            published: Vec::new(),
        }
    }

    pub fn layout(&self) -> &LayoutBindings {
        &self.layout
    }

    pub fn push(&mut self, write: DescriptorWrite) -> Result<()> {
        let binding = self.layout.binding(write.binding)?;
        if !write.resource.accepts(binding.descriptor_type) {
            return Err(Error::precondition(format!(
                "Binding {} holds {:?} descriptors, not {:?}",
                write.binding, binding.descriptor_type, write.resource
            )));
        }
        if write.array_element >= binding.descriptor_count {
            return Err(Error::precondition(format!(
                "Binding {} has {} elements, element {} was written",
                write.binding, binding.descriptor_count, write.array_element
            )));
        }
        self.pending.push(write);
        Ok(())
    }

    pub fn pending(&self) -> &[DescriptorWrite] {
        &self.pending
    }

    /// Writes visible to the backend, at most one per array element.
    pub fn published(&self) -> &[DescriptorWrite] {
        &self.published
    }

    pub fn take_pending(&mut self) -> Vec<DescriptorWrite> {
        std::mem::take(&mut self.pending)
    }

    /// Puts a batch back in front of writes made since it was taken.
    pub fn restore(&mut self, mut batch: Vec<DescriptorWrite>) {
        batch.append(&mut self.pending);
        self.pending = batch;
    }

    pub fn publish(&mut self, batch: Vec<DescriptorWrite>) {
        for write in batch {
            let slot = self.published.iter_mut().find(|published| {
                published.binding == write.binding && published.array_element == write.array_element
            });
            match slot {
                Some(published) => *published = write,
                None => self.published.push(write),
            }
        }
    }

    /// Published dynamic buffers in the order dynamic offsets apply to them: by binding point,
    /// then by array element.
    pub fn dynamic_writes(&self) -> Vec<&DescriptorWrite> {
        let mut dynamic: Vec<_> = self
            .published
            .iter()
            .filter(|write| write.resource.is_dynamic())
            .collect();
        dynamic.sort_by_key(|write| (write.binding, write.array_element));
        dynamic
    }
}

pub trait DescriptorSet {
    /// Set index this set binds to in a pipeline layout.
    fn binding_point(&self) -> u32;

    fn writes(&self) -> &DescriptorWrites;

    fn writes_mut(&mut self) -> &mut DescriptorWrites;

    fn native(&self) -> NativeHandle;

    /// Backend hook: makes `batch` visible to the GPU.
    fn commit(&mut self, batch: &[DescriptorWrite]) -> Result<()>;

    /// Publishes every pending write as one batch.
    fn update(&mut self) -> Result<()> {
        let batch = self.writes_mut().take_pending();
        if batch.is_empty() {
            return Ok(());
        }
        match self.commit(&batch) {
            Ok(()) => {
                self.writes_mut().publish(batch);
                Ok(())
            }
            Err(e) => {
                self.writes_mut().restore(batch);
                Err(e)
            }
        }
    }

    fn layout_bindings(&self) -> &LayoutBindings {
        self.writes().layout()
    }

    fn published(&self) -> &[DescriptorWrite] {
        self.writes().published()
    }

    fn write(&mut self, binding: u32, array_element: u32, resource: DescriptorResource) -> Result<()> {
        self.writes_mut().push(DescriptorWrite {
            binding,
            array_element,
            resource,
        })
    }

    fn write_combined_texture_sampler(
        &mut self,
        binding: u32,
        view: &dyn TextureView,
        sampler: &dyn Sampler,
        layout: ImageLayout,
    ) -> Result<()> {
        let resource = DescriptorResource::CombinedTextureSampler {
            view: view.native(),
            view_type: view.info().view_type,
            sampler: sampler.native(),
            layout,
        };
        self.write(binding, 0, resource)
    }

    fn write_sampler(&mut self, binding: u32, sampler: &dyn Sampler) -> Result<()> {
        let resource = DescriptorResource::Sampler {
            sampler: sampler.native(),
        };
        self.write(binding, 0, resource)
    }

    fn write_sampled_texture(
        &mut self,
        binding: u32,
        view: &dyn TextureView,
        layout: ImageLayout,
    ) -> Result<()> {
        let resource = DescriptorResource::SampledTexture {
            view: view.native(),
            view_type: view.info().view_type,
            layout,
        };
        self.write(binding, 0, resource)
    }

    fn write_storage_texture(
        &mut self,
        binding: u32,
        view: &dyn TextureView,
        layout: ImageLayout,
    ) -> Result<()> {
        let resource = DescriptorResource::StorageTexture {
            view: view.native(),
            view_type: view.info().view_type,
            format: view.info().format,
            layout,
        };
        self.write(binding, 0, resource)
    }

    fn write_uniform_buffer(&mut self, binding: u32, buffer: &dyn Buffer, offset: u64, range: u64) -> Result<()> {
        check_buffer_range(buffer, offset, range)?;
        let resource = DescriptorResource::UniformBuffer {
            buffer: buffer.native(),
            offset,
            range,
            dynamic: false,
        };
        self.write(binding, 0, resource)
    }

    fn write_dynamic_uniform_buffer(
        &mut self,
        binding: u32,
        buffer: &dyn Buffer,
        offset: u64,
        range: u64,
    ) -> Result<()> {
        check_buffer_range(buffer, offset, range)?;
        let resource = DescriptorResource::UniformBuffer {
            buffer: buffer.native(),
            offset,
            range,
            dynamic: true,
        };
        self.write(binding, 0, resource)
    }

    fn write_storage_buffer(&mut self, binding: u32, buffer: &dyn Buffer, offset: u64, range: u64) -> Result<()> {
        check_buffer_range(buffer, offset, range)?;
        let resource = DescriptorResource::StorageBuffer {
            buffer: buffer.native(),
            offset,
            range,
            dynamic: false,
        };
        self.write(binding, 0, resource)
    }

    fn write_dynamic_storage_buffer(
        &mut self,
        binding: u32,
        buffer: &dyn Buffer,
        offset: u64,
        range: u64,
    ) -> Result<()> {
        check_buffer_range(buffer, offset, range)?;
        let resource = DescriptorResource::StorageBuffer {
            buffer: buffer.native(),
            offset,
            range,
            dynamic: true,
        };
        self.write(binding, 0, resource)
    }

    /// Uniform or storage texel buffer, whichever the slot declares.
    fn write_texel_buffer(&mut self, binding: u32, view: &dyn BufferView) -> Result<()> {
        let storage =
            self.layout_bindings().binding(binding)?.descriptor_type == DescriptorType::StorageTexelBuffer;
        let resource = DescriptorResource::TexelBuffer {
            view: view.native(),
            format: view.format(),
            storage,
        };
        self.write(binding, 0, resource)
    }
}

fn check_buffer_range(buffer: &dyn Buffer, offset: u64, range: u64) -> Result<()> {
    match offset.checked_add(range) {
        Some(end) if range > 0 && end <= buffer.size() => Ok(()),
        _ => Err(Error::precondition(format!(
            "Range {offset}+{range} is outside a buffer of {} bytes",
            buffer.size()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorSetLayoutBinding;
    use crate::flags::ShaderStageFlags;

    fn uniform(buffer: u32, offset: u64, dynamic: bool) -> DescriptorResource {
        DescriptorResource::UniformBuffer {
            buffer: NativeHandle::Gl(buffer),
            offset,
            range: 16,
            dynamic,
        }
    }

    fn writes() -> DescriptorWrites {
        let layout = LayoutBindings::new(vec![
            DescriptorSetLayoutBinding::new(0, DescriptorType::UniformBuffer, ShaderStageFlags::VERTEX),
            DescriptorSetLayoutBinding::new(
                2,
                DescriptorType::UniformBufferDynamic,
                ShaderStageFlags::VERTEX,
            )
            .with_count(2),
        ])
        .unwrap();
        DescriptorWrites::new(layout)
    }

    #[test]
    fn writes_are_checked_against_the_layout() {
        let mut writes = writes();
        let write = |binding, array_element, resource| DescriptorWrite {
            binding,
            array_element,
            resource,
        };

        assert!(writes.push(write(0, 0, uniform(1, 0, false))).is_ok());
        assert!(writes.push(write(0, 0, uniform(1, 0, true))).unwrap_err().is_precondition());
        assert!(writes.push(write(2, 2, uniform(1, 0, true))).is_err());
        assert!(matches!(
            writes.push(write(1, 0, uniform(1, 0, false))),
            Err(Error::BindingNotFound(1))
        ));
        assert_eq!(writes.pending().len(), 1);
    }

    #[test]
    fn publishing_replaces_per_element() {
        let mut writes = writes();
        let write = |resource| DescriptorWrite {
            binding: 0,
            array_element: 0,
            resource,
        };
        writes.publish(vec![write(uniform(1, 0, false))]);
        writes.publish(vec![write(uniform(2, 0, false))]);
        assert_eq!(writes.published().len(), 1);
        assert_eq!(writes.published()[0].resource, uniform(2, 0, false));
    }

    #[test]
    fn dynamic_writes_are_ordered_by_binding_and_element() {
        let mut writes = writes();
        writes.publish(vec![
            DescriptorWrite {
                binding: 2,
                array_element: 1,
                resource: uniform(5, 0, true),
            },
            DescriptorWrite {
                binding: 0,
                array_element: 0,
                resource: uniform(4, 0, false),
            },
            DescriptorWrite {
                binding: 2,
                array_element: 0,
                resource: uniform(6, 0, true),
            },
        ]);
        let order: Vec<_> = writes
            .dynamic_writes()
            .iter()
            .map(|write| write.array_element)
            .collect();
        assert_eq!(order, vec![0, 1]);
    }
}
