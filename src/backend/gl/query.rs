// Query pools: one GL query object per query

use anyhow::anyhow;

use super::call::GlCall;
use super::consts as gl;
use super::convert;
use super::shared::GlShared;
use crate::core::NativeHandle;
use crate::enums::QueryType;
use crate::error::{Error, Result};
use crate::flags::QueryPipelineStatisticFlags;
use crate::query::QueryPool;

pub struct GlQueryPool<'d> {
    shared: &'d GlShared,
    query_type: QueryType,
    names: Vec<u32>,
    id: u32,
}

impl<'d> GlQueryPool<'d> {
    pub fn new(shared: &'d GlShared, query_type: QueryType, count: u32) -> Result<Self> {
        let target = convert::query_target(query_type)?;
        if count == 0 {
            return Err(Error::precondition("Query pools need at least one query"));
        }
        let _guard = shared.guard()?;
        let mut pool = Self {
            shared,
            query_type,
            names: Vec::with_capacity(count as usize),
            id: shared.next_id(),
        };
        for _ in 0..count {
            let name = shared.create(GlCall::CreateQuery { target })?;
            pool.names.push(name);
        }
        Ok(pool)
    }
}

impl QueryPool for GlQueryPool<'_> {
    fn query_type(&self) -> QueryType {
        self.query_type
    }

    fn count(&self) -> u32 {
        self.names.len() as u32
    }

    fn pipeline_statistics(&self) -> QueryPipelineStatisticFlags {
        QueryPipelineStatisticFlags::empty()
    }

    fn read_results(&self, first: u32, count: u32) -> Result<Vec<u64>> {
        let _guard = self.shared.guard()?;
        self.names[first as usize..(first + count) as usize]
            .iter()
            .map(|&query| {
                self.shared
                    .call(GlCall::GetQueryObjectui64v {
                        query,
                        pname: gl::QUERY_RESULT,
                    })?
                    .uint64()
                    .ok_or_else(|| Error::Backend(anyhow!("Query {query} returned no result")))
            })
            .collect()
    }

    fn query_handle(&self, index: u32) -> Option<NativeHandle> {
        self.names.get(index as usize).copied().map(NativeHandle::Gl)
    }

    fn native(&self) -> NativeHandle {
        NativeHandle::Gl(self.id)
    }
}

impl Drop for GlQueryPool<'_> {
    fn drop(&mut self) {
        for &name in &self.names {
            self.shared.release(GlCall::DeleteQuery(name));
        }
    }
}
