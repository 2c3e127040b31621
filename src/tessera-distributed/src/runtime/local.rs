//! Single-process runtime: a tokio worker pool plus an in-process store.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use log::debug;
use tokio::runtime::{Handle, Runtime};

use common_config::ExecutionConfig;
use common_error::{TesseraError, TesseraResult};
use tessera_core::Block;

use super::{BlockRef, BlockStore, ExecutionRuntime};
use crate::transport::BlockCodec;
use crate::worker::{BlockTask, Worker};

/// Runs block tasks on a local tokio worker pool.
///
/// `submit` spawns the task immediately and records a shared future over
/// its encoded output. Resolving a handle more than once yields the same
/// block (or the same failure) without re-running the task.
pub struct LocalRuntime {
    /// Owned pool; `None` when running on a borrowed handle.
    runtime: Option<Runtime>,
    handle: Handle,
    store: Arc<BlockStore>,
    worker: Arc<Worker>,
}

impl LocalRuntime {
    /// Create a runtime with its own worker pool.
    pub fn new(config: &ExecutionConfig) -> TesseraResult<Self> {
        let runtime = common_runtime::worker_runtime(config.num_workers)?;
        let handle = runtime.handle().clone();
        Ok(Self {
            runtime: Some(runtime),
            handle,
            store: Arc::new(BlockStore::new()),
            worker: Arc::new(Worker::new()),
        })
    }

    /// Create a runtime that spawns tasks onto an existing tokio runtime.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            runtime: None,
            handle,
            store: Arc::new(BlockStore::new()),
            worker: Arc::new(Worker::new()),
        }
    }

    /// The object store backing this runtime.
    pub fn store(&self) -> &BlockStore {
        &self.store
    }
}

#[async_trait]
impl ExecutionRuntime for LocalRuntime {
    fn submit(&self, task: BlockTask) -> TesseraResult<BlockRef> {
        let id = self.store.reserve();
        debug!("Submitting {task} as {id}");

        let worker = self.worker.clone();
        let join = self.handle.spawn(async move {
            let block = worker.execute(task).await?;
            BlockCodec::encode(&block)
        });
        let entry = async move {
            match join.await {
                Ok(result) => result.map_err(Arc::new),
                Err(e) => Err(Arc::new(TesseraError::execution(format!(
                    "task for {id} did not complete: {e}"
                )))),
            }
        }
        .boxed()
        .shared();

        self.store.insert(id, entry)?;
        Ok(BlockRef::new(id))
    }

    fn put(&self, block: Block) -> TesseraResult<BlockRef> {
        let id = self.store.reserve();
        let bytes = BlockCodec::encode(&block)?;
        debug!("Storing {} block of {} rows as {id}", block.kind(), block.num_rows());

        self.store
            .insert(id, futures::future::ready(Ok(bytes)).boxed().shared())?;
        Ok(BlockRef::new(id))
    }

    async fn get(&self, block_ref: &BlockRef) -> TesseraResult<Block> {
        let entry = self.store.get(block_ref.id())?;
        let bytes = entry.await.map_err(|e| e.replicate())?;
        BlockCodec::decode(&bytes)
    }

    fn release(&self, block_ref: &BlockRef) -> TesseraResult<bool> {
        let released = self.store.remove(block_ref.id())?;
        if released {
            debug!("Released {block_ref}");
        }
        Ok(released)
    }

    fn num_objects(&self) -> usize {
        self.store.len()
    }
}

impl std::fmt::Debug for LocalRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalRuntime")
            .field("owns_pool", &self.runtime.is_some())
            .field("store", &self.store)
            .finish()
    }
}

impl Drop for LocalRuntime {
    fn drop(&mut self) {
        // A blocking shutdown would panic when dropped from async code.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
