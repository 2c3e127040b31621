//! The dataset session.

use std::sync::Arc;

use log::debug;

use common_config::TesseraConfig;
use common_error::{TesseraError, TesseraResult, ensure, type_err};
use tessera_core::{Block, BlockKind, Row, Value};
use tessera_distributed::{Dispatcher, ExecutionRuntime, LocalRuntime, PartitionPlan};

use crate::dataset::Dataset;

/// Entry point for building datasets.
///
/// A context owns the configuration and the execution runtime that builds
/// and stores blocks. Construction functions validate their arguments, plan
/// partitions, and dispatch work; they never wait for deferred work. The
/// resolution helpers (`get_blocks`, `count`, ...) are where waiting, and
/// deferred failures, happen.
///
/// The `_sync` helpers, and `read_columnar_files`, block the calling thread
/// and must not be called from async code.
#[derive(Debug, Clone)]
pub struct DataContext {
    config: TesseraConfig,
    dispatcher: Dispatcher,
}

impl DataContext {
    /// Create a context backed by a [`LocalRuntime`].
    pub fn new(config: TesseraConfig) -> TesseraResult<Self> {
        let runtime = LocalRuntime::new(&config.execution)?;
        Ok(Self::with_runtime(config, Arc::new(runtime)))
    }

    /// Create a context over an existing runtime.
    pub fn with_runtime(config: TesseraConfig, runtime: Arc<dyn ExecutionRuntime>) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(runtime),
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &TesseraConfig {
        &self.config
    }

    /// The execution runtime.
    pub fn runtime(&self) -> &Arc<dyn ExecutionRuntime> {
        self.dispatcher.runtime()
    }

    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The requested parallelism, or the configured default.
    pub(crate) fn parallelism(&self, requested: Option<usize>) -> TesseraResult<usize> {
        let parallelism = requested.unwrap_or(self.config.execution.default_parallelism);
        ensure!(parallelism > 0, ConfigurationError: "parallelism must be a positive integer, got 0");
        Ok(parallelism)
    }

    // ========================================================================
    // Sources
    // ========================================================================

    /// Build a dataset from in-memory items.
    ///
    /// Items are split into contiguous chunks; each chunk is built and
    /// stored on the calling thread.
    pub fn from_items<V: Into<Value>>(
        &self,
        items: Vec<V>,
        parallelism: Option<usize>,
    ) -> TesseraResult<Dataset> {
        let parallelism = self.parallelism(parallelism)?;
        let plan = PartitionPlan::contiguous(items.len(), parallelism)?;
        let values = items.into_iter().map(Into::into).collect();

        let blocks = self.dispatcher.put_items(values, &plan)?;
        debug!("from_items: {plan} -> {} blocks", blocks.len());
        Ok(Dataset::new(blocks, BlockKind::Sequence))
    }

    /// Build a dataset of the integers `0..n` as sequence blocks.
    pub fn range(&self, n: usize, parallelism: Option<usize>) -> TesseraResult<Dataset> {
        self.range_impl(n, parallelism, false)
    }

    /// Build a dataset of the integers `0..n` as columnar blocks with one
    /// `value` column.
    pub fn range_columnar(&self, n: usize, parallelism: Option<usize>) -> TesseraResult<Dataset> {
        self.range_impl(n, parallelism, true)
    }

    fn range_impl(
        &self,
        n: usize,
        parallelism: Option<usize>,
        columnar: bool,
    ) -> TesseraResult<Dataset> {
        let parallelism = self.parallelism(parallelism)?;
        let plan = PartitionPlan::contiguous(n, parallelism)?;
        let blocks = self.dispatcher.submit_range(&plan, columnar)?;

        let kind = if columnar {
            BlockKind::Columnar
        } else {
            BlockKind::Sequence
        };
        debug!("range({n}): {plan} -> {} {kind} blocks", blocks.len());
        Ok(Dataset::new(blocks, kind))
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve every block of a dataset, in order.
    ///
    /// Fails with the first deferred failure, or with an `InternalError`
    /// when a block's variant differs from the dataset's.
    pub async fn get_blocks(&self, dataset: &Dataset) -> TesseraResult<Vec<Block>> {
        let mut blocks = Vec::with_capacity(dataset.num_blocks());
        for block_ref in dataset.blocks() {
            blocks.push(self.resolve_block(dataset, block_ref).await?);
        }
        Ok(blocks)
    }

    /// Blocking form of [`get_blocks`](Self::get_blocks).
    pub fn get_blocks_sync(&self, dataset: &Dataset) -> TesseraResult<Vec<Block>> {
        common_runtime::block_on(self.get_blocks(dataset))?
    }

    /// Number of records in each block, in order.
    pub async fn block_sizes(&self, dataset: &Dataset) -> TesseraResult<Vec<usize>> {
        let blocks = self.get_blocks(dataset).await?;
        Ok(blocks.iter().map(Block::num_rows).collect())
    }

    /// Blocking form of [`block_sizes`](Self::block_sizes).
    pub fn block_sizes_sync(&self, dataset: &Dataset) -> TesseraResult<Vec<usize>> {
        common_runtime::block_on(self.block_sizes(dataset))?
    }

    /// Total number of records.
    pub async fn count(&self, dataset: &Dataset) -> TesseraResult<usize> {
        Ok(self.block_sizes(dataset).await?.into_iter().sum())
    }

    /// Blocking form of [`count`](Self::count).
    pub fn count_sync(&self, dataset: &Dataset) -> TesseraResult<usize> {
        common_runtime::block_on(self.count(dataset))?
    }

    /// Up to `limit` records of a sequence dataset, in order.
    ///
    /// Blocks are resolved only until the limit is reached.
    pub async fn take_values(&self, dataset: &Dataset, limit: usize) -> TesseraResult<Vec<Value>> {
        expect_kind(dataset, BlockKind::Sequence, "take_rows")?;

        let mut values = Vec::new();
        for block_ref in dataset.blocks() {
            if values.len() >= limit {
                break;
            }
            let block = self.resolve_block(dataset, block_ref).await?;
            if let Block::Sequence(block) = block {
                let remaining = limit - values.len();
                values.extend(block.into_values().into_iter().take(remaining));
            }
        }
        Ok(values)
    }

    /// Blocking form of [`take_values`](Self::take_values).
    pub fn take_values_sync(&self, dataset: &Dataset, limit: usize) -> TesseraResult<Vec<Value>> {
        common_runtime::block_on(self.take_values(dataset, limit))?
    }

    /// Up to `limit` rows of a columnar dataset, in order.
    pub async fn take_rows(&self, dataset: &Dataset, limit: usize) -> TesseraResult<Vec<Row>> {
        expect_kind(dataset, BlockKind::Columnar, "take_values")?;

        let mut rows = Vec::new();
        for block_ref in dataset.blocks() {
            if rows.len() >= limit {
                break;
            }
            let block = self.resolve_block(dataset, block_ref).await?;
            if let Block::Columnar(block) = block {
                let remaining = limit - rows.len();
                for index in 0..block.num_rows().min(remaining) {
                    rows.push(block.row(index)?);
                }
            }
        }
        Ok(rows)
    }

    /// Blocking form of [`take_rows`](Self::take_rows).
    pub fn take_rows_sync(&self, dataset: &Dataset, limit: usize) -> TesseraResult<Vec<Row>> {
        common_runtime::block_on(self.take_rows(dataset, limit))?
    }

    /// Drop every block of a dataset from the object store.
    ///
    /// Returns the number of blocks released. Clones of the dataset can no
    /// longer be resolved afterwards.
    pub fn release(&self, dataset: Dataset) -> TesseraResult<usize> {
        let mut released = 0;
        for block_ref in dataset.blocks() {
            if self.runtime().release(block_ref)? {
                released += 1;
            }
        }
        debug!("Released {released} of {} blocks", dataset.num_blocks());
        Ok(released)
    }

    async fn resolve_block(
        &self,
        dataset: &Dataset,
        block_ref: &tessera_distributed::BlockRef,
    ) -> TesseraResult<Block> {
        let block = self.runtime().get(block_ref).await?;
        if block.kind() != dataset.kind() {
            return Err(TesseraError::internal(format!(
                "{block_ref} holds a {} block in a {} dataset",
                block.kind(),
                dataset.kind()
            )));
        }
        Ok(block)
    }
}

fn expect_kind(dataset: &Dataset, kind: BlockKind, instead: &str) -> TesseraResult<()> {
    if dataset.kind() != kind {
        type_err!("dataset holds {} blocks; use {instead}", dataset.kind());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> DataContext {
        DataContext::new(TesseraConfig::default().with_num_workers(2)).unwrap()
    }

    #[test]
    fn test_from_items_chunks() {
        let ctx = context();
        let dataset = ctx.from_items(vec![1i64, 2, 3, 4, 5], Some(2)).unwrap();
        assert_eq!(dataset.num_blocks(), 3);
        assert_eq!(dataset.kind(), BlockKind::Sequence);
        assert_eq!(ctx.block_sizes_sync(&dataset).unwrap(), vec![2, 2, 1]);
    }

    #[test]
    fn test_from_items_empty() {
        let ctx = context();
        let dataset = ctx.from_items(Vec::<Value>::new(), None).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(ctx.count_sync(&dataset).unwrap(), 0);
    }

    #[test]
    fn test_default_parallelism() {
        let ctx = context();
        let dataset = ctx.range(1000, None).unwrap();
        // chunk_size = 1000 / 200 = 5
        assert_eq!(dataset.num_blocks(), 200);
    }

    #[test]
    fn test_zero_parallelism_dispatches_nothing() {
        let ctx = context();
        assert!(ctx.range(10, Some(0)).unwrap_err().is_configuration());
        assert!(ctx.from_items(vec![1i64], Some(0)).unwrap_err().is_configuration());
        assert_eq!(ctx.runtime().num_objects(), 0);
    }

    #[test]
    fn test_take_respects_kind() {
        let ctx = context();
        let dataset = ctx.range(4, Some(2)).unwrap();
        assert_eq!(
            ctx.take_values_sync(&dataset, 3).unwrap(),
            vec![Value::Int64(0), Value::Int64(1), Value::Int64(2)]
        );
        let err = ctx.take_rows_sync(&dataset, 1).unwrap_err();
        assert!(matches!(err, TesseraError::TypeError(_)));
    }

    #[test]
    fn test_release_frees_blocks() {
        let ctx = context();
        let kept = ctx.range(6, Some(3)).unwrap();
        let dropped = ctx.from_items(vec![1i64, 2, 3, 4], Some(2)).unwrap();
        assert_eq!(ctx.runtime().num_objects(), 5);

        let alias = dropped.clone();
        assert_eq!(ctx.release(dropped).unwrap(), 2);
        assert_eq!(ctx.runtime().num_objects(), 3);
        assert!(ctx.count_sync(&alias).is_err());
        assert_eq!(ctx.release(alias).unwrap(), 0);

        assert_eq!(ctx.count_sync(&kept).unwrap(), 6);
    }

    #[test]
    fn test_mismatched_block_kind_detected() {
        let ctx = context();
        let sequence = ctx.range(4, Some(2)).unwrap();
        let mislabeled = Dataset::new(sequence.into_blocks(), BlockKind::Columnar);

        let err = ctx.get_blocks_sync(&mislabeled).unwrap_err();
        assert!(matches!(err, TesseraError::InternalError(_)));
    }
}
