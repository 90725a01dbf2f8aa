// Query pools

use crate::core::NativeHandle;
use crate::enums::QueryType;
use crate::error::{Error, Result};
use crate::flags::QueryPipelineStatisticFlags;

pub trait QueryPool {
    fn query_type(&self) -> QueryType;

    fn count(&self) -> u32;

    fn pipeline_statistics(&self) -> QueryPipelineStatisticFlags;

    /// Backend hook: `first..first + count` is already known to be in range.
    fn read_results(&self, first: u32, count: u32) -> Result<Vec<u64>>;

    /// Handle of one query, for backends that have one object per query.
    fn query_handle(&self, index: u32) -> Option<NativeHandle>;

    fn native(&self) -> NativeHandle;

    /// Waits for and returns the 64-bit results of `count` queries starting at `first`.
    ///
    /// Timestamps are in ticks of `Device::timestamp_period` nanoseconds.
    fn results(&self, first: u32, count: u32) -> Result<Vec<u64>> {
        check_range(self.count(), first, count)?;
        self.read_results(first, count)
    }
}

pub(crate) fn check_range(pool_count: u32, first: u32, count: u32) -> Result<()> {
    match first.checked_add(count) {
        Some(end) if end <= pool_count => Ok(()),
        _ => Err(Error::precondition(format!(
            "Queries {first}+{count} are outside a pool of {pool_count}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_ranges_are_bounded() {
        assert!(check_range(4, 0, 4).is_ok());
        assert!(check_range(4, 3, 2).is_err());
        assert!(check_range(4, u32::MAX, 2).is_err());
    }
}
