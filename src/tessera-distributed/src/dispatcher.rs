//! Turns partition plans into block handles.
//!
//! Small in-memory sources are built on the calling thread and stored with
//! the runtime's `put`. Everything else becomes one [`BlockTask`] per
//! partition, submitted without waiting. Either way the returned handles are
//! in partition order, whatever order the work completes in.

use std::sync::Arc;

use log::debug;

use common_error::{TesseraError, TesseraResult};
use tessera_core::{BlockBuilder, SequenceBlockBuilder, Value};
use tessera_io::{ColumnarFragment, FileSystem};

use crate::partitioning::{PartitionPlan, PartitionUnits};
use crate::runtime::{BlockRef, ExecutionRuntime};
use crate::worker::BlockTask;

/// Dispatches block construction onto an [`ExecutionRuntime`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    runtime: Arc<dyn ExecutionRuntime>,
}

impl Dispatcher {
    /// Create a dispatcher over a runtime.
    pub fn new(runtime: Arc<dyn ExecutionRuntime>) -> Self {
        Self { runtime }
    }

    /// The runtime blocks are dispatched to.
    pub fn runtime(&self) -> &Arc<dyn ExecutionRuntime> {
        &self.runtime
    }

    /// Build one sequence block per partition and store each immediately.
    ///
    /// The plan must be contiguous over exactly `items.len()` units.
    pub fn put_items(
        &self,
        items: Vec<Value>,
        plan: &PartitionPlan,
    ) -> TesseraResult<Vec<BlockRef>> {
        if plan.num_units() != items.len() {
            return Err(TesseraError::internal(format!(
                "plan covers {} units but {} items were given",
                plan.num_units(),
                items.len()
            )));
        }

        let mut items = items.into_iter();
        let mut refs = Vec::with_capacity(plan.num_partitions());
        for partition in plan.partitions() {
            let PartitionUnits::Range { count, .. } = partition.units else {
                return Err(TesseraError::internal(
                    "in-memory items require a contiguous partition plan",
                ));
            };
            let mut builder = SequenceBlockBuilder::with_capacity(count);
            builder.extend(items.by_ref().take(count))?;
            refs.push(self.runtime.put(builder.build()?)?);
        }

        debug!("Stored {} item blocks", refs.len());
        Ok(refs)
    }

    /// Submit one range task per partition.
    ///
    /// With `columnar` set, blocks carry a single `value` column instead of
    /// bare integers.
    pub fn submit_range(
        &self,
        plan: &PartitionPlan,
        columnar: bool,
    ) -> TesseraResult<Vec<BlockRef>> {
        let tasks = plan
            .partitions()
            .iter()
            .map(|partition| match partition.units {
                PartitionUnits::Range { start, count } if columnar => {
                    Ok(BlockTask::ColumnarRange { start, count })
                }
                PartitionUnits::Range { start, count } => Ok(BlockTask::Range { start, count }),
                PartitionUnits::Indices(_) => Err(TesseraError::internal(
                    "integer ranges require a contiguous partition plan",
                )),
            })
            .collect::<TesseraResult<Vec<_>>>()?;
        self.submit_all(tasks)
    }

    /// Submit one fragment-reading task per partition.
    ///
    /// Each task reads its fragments in plan order.
    pub fn submit_fragments(
        &self,
        filesystem: &FileSystem,
        fragments: &[ColumnarFragment],
        columns: Option<&[String]>,
        plan: &PartitionPlan,
    ) -> TesseraResult<Vec<BlockRef>> {
        if plan.num_units() != fragments.len() {
            return Err(TesseraError::internal(format!(
                "plan covers {} units but {} fragments were given",
                plan.num_units(),
                fragments.len()
            )));
        }

        let tasks = plan
            .partitions()
            .iter()
            .map(|partition| BlockTask::ReadFragments {
                filesystem: filesystem.clone(),
                fragments: partition.units.iter().map(|i| fragments[i].clone()).collect(),
                columns: columns.map(<[String]>::to_vec),
            })
            .collect();
        self.submit_all(tasks)
    }

    /// Submit tasks in order, returning their handles in the same order.
    pub fn submit_all(&self, tasks: Vec<BlockTask>) -> TesseraResult<Vec<BlockRef>> {
        let refs = tasks
            .into_iter()
            .map(|task| self.runtime.submit(task))
            .collect::<TesseraResult<Vec<_>>>()?;
        debug!("Submitted {} block tasks", refs.len());
        Ok(refs)
    }
}
