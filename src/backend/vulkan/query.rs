// Vulkan query pools

use anyhow::Context;
use ash::vk;

use super::convert;
use super::shared::VulkanShared;
use crate::core::NativeHandle;
use crate::enums::QueryType;
use crate::error::{Error, Result};
use crate::flags::QueryPipelineStatisticFlags;
use crate::query::QueryPool;

/// Number of 64-bit values one query writes.
pub fn values_per_query(query_type: QueryType, statistics: QueryPipelineStatisticFlags) -> u32 {
    match query_type {
        QueryType::PipelineStatistics => statistics.bits().count_ones(),
        QueryType::Occlusion | QueryType::Timestamp => 1,
    }
}

pub struct VulkanQueryPool<'d> {
    shared: &'d VulkanShared,
    pool: vk::QueryPool,
    query_type: QueryType,
    count: u32,
    statistics: QueryPipelineStatisticFlags,
}

impl<'d> VulkanQueryPool<'d> {
    pub fn new(
        shared: &'d VulkanShared,
        query_type: QueryType,
        count: u32,
        statistics: QueryPipelineStatisticFlags,
    ) -> Result<Self> {
        if count == 0 {
            return Err(Error::precondition("Query pools need at least one query"));
        }
        let statistics = if query_type == QueryType::PipelineStatistics {
            if !shared.physical_device.features.pipeline_statistics_query {
                return Err(Error::Unsupported(format!(
                    "{} has no pipeline statistics queries",
                    shared.physical_device.name
                )));
            }
            if statistics.is_empty() {
                return Err(Error::precondition(
                    "Pipeline statistics pools need at least one statistic",
                ));
            }
            statistics
        } else {
            QueryPipelineStatisticFlags::empty()
        };

        let pool_info = vk::QueryPoolCreateInfo::builder()
            .query_type(convert::query_type(query_type))
            .query_count(count)
            .pipeline_statistics(vk::QueryPipelineStatisticFlags::from_raw(statistics.bits()));
        let pool = unsafe { shared.device.create_query_pool(&pool_info, None) }
            .context("Failed to create query pool")?;
        Ok(Self {
            shared,
            pool,
            query_type,
            count,
            statistics,
        })
    }
}

impl QueryPool for VulkanQueryPool<'_> {
    fn query_type(&self) -> QueryType {
        self.query_type
    }

    fn count(&self) -> u32 {
        self.count
    }

    fn pipeline_statistics(&self) -> QueryPipelineStatisticFlags {
        self.statistics
    }

    /// Pipeline statistics queries return one value per enabled statistic, in bit order.
    fn read_results(&self, first: u32, count: u32) -> Result<Vec<u64>> {
        let per_query = values_per_query(self.query_type, self.statistics) as usize;
        let stride = (per_query * std::mem::size_of::<u64>()) as vk::DeviceSize;
        let mut results = vec![0u64; count as usize * per_query];
        let device = &self.shared.device;
        unsafe {
            (device.fp_v1_0().get_query_pool_results)(
                device.handle(),
                self.pool,
                first,
                count,
                std::mem::size_of_val(results.as_slice()),
                results.as_mut_ptr().cast(),
                stride,
                vk::QueryResultFlags::TYPE_64 | vk::QueryResultFlags::WAIT,
            )
        }
        .result()
        .context("Failed to read query results")?;
        Ok(results)
    }

    fn query_handle(&self, _index: u32) -> Option<NativeHandle> {
        None
    }

    fn native(&self) -> NativeHandle {
        convert::native(self.pool)
    }
}

impl Drop for VulkanQueryPool<'_> {
    fn drop(&mut self) {
        unsafe { self.shared.device.destroy_query_pool(self.pool, None) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics_queries_write_one_value_per_statistic() {
        let statistics = QueryPipelineStatisticFlags::INPUT_ASSEMBLY_VERTICES
            | QueryPipelineStatisticFlags::FRAGMENT_SHADER_INVOCATIONS;
        assert_eq!(values_per_query(QueryType::PipelineStatistics, statistics), 2);
        assert_eq!(values_per_query(QueryType::Occlusion, statistics), 1);
        assert_eq!(values_per_query(QueryType::Timestamp, QueryPipelineStatisticFlags::empty()), 1);
    }
}
