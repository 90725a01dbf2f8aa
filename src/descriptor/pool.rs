// Descriptor set pools
//
// A pool is a counting semaphore over descriptor set slots. The backend owns the memory; the
// counter only tracks how many sets are live.

use std::sync::atomic::{AtomicU32, Ordering};

use super::{DescriptorSet, DescriptorSetLayout};
use crate::core::NativeHandle;
use crate::error::{Error, Result};

/// Live-set bookkeeping of a pool. `allocated <= max_sets` always holds.
#[derive(Debug)]
pub struct PoolCounter {
    max_sets: u32,
    allocated: AtomicU32,
}

impl PoolCounter {
    pub fn new(max_sets: u32) -> Self {
        Self {
            max_sets,
            allocated: AtomicU32::new(0),
        }
    }

    pub fn max_sets(&self) -> u32 {
        self.max_sets
    }

    pub fn allocated(&self) -> u32 {
        self.allocated.load(Ordering::Acquire)
    }

    /// Counts `count` more sets, saturating at `max_sets`.
    ///
    /// # Panics
    ///
    /// In debug builds, after saturating, if the pool did not have room for `count` sets.
    pub fn allocate(&self, count: u32) {
        let max_sets = self.max_sets;
        let previous = self
            .allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |allocated| {
                Some(allocated.saturating_add(count).min(max_sets))
            })
            .unwrap_or_else(|allocated| allocated);

        let fits = previous.saturating_add(count) <= max_sets;
        if !fits {
            log::error!(
                "Descriptor pool over-allocation: {} + {} > {}",
                previous,
                count,
                max_sets
            );
        }
        debug_assert!(fits, "descriptor pool over-allocation");
    }

    /// Releases `count` sets, saturating at 0.
    ///
    /// # Panics
    ///
    /// In debug builds, after saturating, if fewer than `count` sets were allocated.
    pub fn deallocate(&self, count: u32) {
        let previous = self
            .allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |allocated| {
                Some(allocated.saturating_sub(count))
            })
            .unwrap_or_else(|allocated| allocated);

        let held = previous >= count;
        if !held {
            log::error!(
                "Descriptor pool over-deallocation: {} - {} < 0",
                previous,
                count
            );
        }
        debug_assert!(held, "descriptor pool over-deallocation");
    }
}

/// One allocated slot, given back when dropped.
#[derive(Debug)]
pub struct PoolSlot<'p> {
    counter: &'p PoolCounter,
}

impl<'p> PoolSlot<'p> {
    /// Fails with a precondition error when the pool is full.
    pub fn reserve(counter: &'p PoolCounter) -> Result<Self> {
        if counter.allocated() >= counter.max_sets() {
            return Err(Error::precondition(format!(
                "Descriptor pool is exhausted ({} sets)",
                counter.max_sets()
            )));
        }
        counter.allocate(1);
        Ok(Self { counter })
    }
}

impl Drop for PoolSlot<'_> {
    fn drop(&mut self) {
        self.counter.deallocate(1);
    }
}

pub trait DescriptorSetPool {
    fn counter(&self) -> &PoolCounter;

    fn layout(&self) -> &dyn DescriptorSetLayout;

    fn native(&self) -> NativeHandle;

    /// Backend hook. The set keeps `slot` for its whole life.
    fn make_descriptor_set<'p>(
        &'p self,
        binding_point: u32,
        slot: PoolSlot<'p>,
    ) -> Result<Box<dyn DescriptorSet + 'p>>;

    fn max_sets(&self) -> u32 {
        self.counter().max_sets()
    }

    fn allocated(&self) -> u32 {
        self.counter().allocated()
    }

    fn allocate(&self, count: u32) {
        self.counter().allocate(count);
    }

    fn deallocate(&self, count: u32) {
        self.counter().deallocate(count);
    }

    /// A set bound at `binding_point`, counted against this pool until dropped.
    fn create_descriptor_set(&self, binding_point: u32) -> Result<Box<dyn DescriptorSet + '_>> {
        let slot = PoolSlot::reserve(self.counter())?;
        self.make_descriptor_set(binding_point, slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn allocations_add_up() {
        for (first, second) in [(0, 0), (3, 5), (8, 0), (1, 6)] {
            let counter = PoolCounter::new(8);
            counter.allocate(first);
            counter.allocate(second);
            assert_eq!(counter.allocated(), first + second);
        }
    }

    #[test]
    fn over_allocation_saturates_and_fires_in_debug() {
        let counter = PoolCounter::new(4);
        let result = catch_unwind(AssertUnwindSafe(|| counter.allocate(5)));
        assert_eq!(result.is_err(), cfg!(debug_assertions));
        assert_eq!(counter.allocated(), 4);
    }

    #[test]
    fn deallocation_subtracts_exactly() {
        let counter = PoolCounter::new(10);
        counter.allocate(7);
        counter.deallocate(3);
        assert_eq!(counter.allocated(), 4);
        counter.deallocate(4);
        assert_eq!(counter.allocated(), 0);
    }

    #[test]
    fn over_deallocation_fires_in_debug() {
        let counter = PoolCounter::new(10);
        counter.allocate(2);
        let result = catch_unwind(AssertUnwindSafe(|| counter.deallocate(3)));
        assert_eq!(result.is_err(), cfg!(debug_assertions));
        assert_eq!(counter.allocated(), 0);
    }

    #[test]
    fn slots_are_given_back() {
        let counter = PoolCounter::new(1);
        {
            let _slot = PoolSlot::reserve(&counter).unwrap();
            assert_eq!(counter.allocated(), 1);
            assert!(PoolSlot::reserve(&counter).unwrap_err().is_precondition());
        }
        assert_eq!(counter.allocated(), 0);
    }
}
