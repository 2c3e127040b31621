//! Worker that turns block tasks into blocks.

mod task;

pub use task::BlockTask;

use log::info;

use common_error::{TesseraError, TesseraResult};
use tessera_core::{
    Block, BlockBuilder, ColumnarBlock, ColumnarBlockBuilder, Row, SequenceBlockBuilder, Value,
};

/// Name of the single column produced by columnar ranges.
pub const RANGE_COLUMN: &str = "value";

/// Executes [`BlockTask`]s.
#[derive(Debug, Clone, Default)]
pub struct Worker;

impl Worker {
    /// Create a new worker.
    pub fn new() -> Self {
        Self
    }

    /// Build the block a task describes.
    pub async fn execute(&self, task: BlockTask) -> TesseraResult<Block> {
        match task {
            BlockTask::Range { start, count } => {
                let mut builder = SequenceBlockBuilder::with_capacity(count);
                builder.extend(range_values(start, count)?)?;
                builder.build()
            }
            BlockTask::ColumnarRange { start, count } => {
                let mut builder = ColumnarBlockBuilder::new();
                builder.extend(
                    range_values(start, count)?.map(|value| Row::new().with(RANGE_COLUMN, value)),
                )?;
                builder.build()
            }
            BlockTask::ReadFragments {
                filesystem,
                fragments,
                columns,
            } => {
                info!("Reading {} columnar fragments", fragments.len());
                let mut tables = Vec::with_capacity(fragments.len());
                for fragment in &fragments {
                    tables.push(fragment.read(&filesystem, columns.as_deref()).await?);
                }
                Ok(Block::Columnar(ColumnarBlock::concat(tables)?))
            }
        }
    }
}

fn range_values(start: usize, count: usize) -> TesseraResult<impl Iterator<Item = Value>> {
    let end = start
        .checked_add(count)
        .and_then(|end| i64::try_from(end).ok())
        .ok_or_else(|| {
            TesseraError::value_error(format!("range [{start}, {start} + {count}) overflows i64"))
        })?;
    // `end` fits in i64, so `start` does too.
    let start = start as i64;
    Ok((start..end).map(Value::Int64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_range_task() {
        let block = Worker::new()
            .execute(BlockTask::Range { start: 4, count: 3 })
            .await
            .unwrap();
        let values = block.as_sequence().unwrap().values();
        assert_eq!(values, &[Value::Int64(4), Value::Int64(5), Value::Int64(6)]);
    }

    #[tokio::test]
    async fn test_columnar_range_task() {
        let task = BlockTask::ColumnarRange { start: 0, count: 2 };
        assert_eq!(task.output_kind(), tessera_core::BlockKind::Columnar);

        let block = Worker::new().execute(task).await.unwrap();
        let columnar = block.as_columnar().unwrap();
        assert_eq!(columnar.column_names(), vec![RANGE_COLUMN.to_string()]);
        let rows = columnar.rows().unwrap();
        assert_eq!(rows[1].get(RANGE_COLUMN), Some(&Value::Int64(1)));
    }

    #[tokio::test]
    async fn test_read_without_fragments_fails() {
        let task = BlockTask::ReadFragments {
            filesystem: tessera_io::FileSystem::local(),
            fragments: vec![],
            columns: None,
        };
        assert!(Worker::new().execute(task).await.is_err());
    }

    #[test]
    fn test_range_overflow() {
        assert!(range_values(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_task_display() {
        let task = BlockTask::Range { start: 0, count: 5 };
        assert_eq!(task.to_string(), "Range(start=0, count=5)");
        assert_eq!(task.num_units(), 5);
    }
}
