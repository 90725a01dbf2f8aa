// Descriptor sets: layouts declare binding slots, pools count allocations, sets collect the
// resources bound to each slot.

mod layout;
mod pool;
mod set;

pub use layout::{DescriptorSetLayout, DescriptorSetLayoutBinding, LayoutBindings};
pub use pool::{DescriptorSetPool, PoolCounter, PoolSlot};
pub use set::{DescriptorResource, DescriptorSet, DescriptorWrite, DescriptorWrites};
