//! Execution runtime seam.
//!
//! The pipeline consumes a runtime through two primitives: "submit deferred
//! work, get a handle" and "store a value, get a handle". Resolving a handle
//! is the runtime's business and is the only operation that may wait on, or
//! surface the failure of, deferred work.

mod local;
mod store;

pub use local::LocalRuntime;
pub use store::{BlockStore, StoredBlock};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use common_error::TesseraResult;
use tessera_core::Block;

use crate::worker::BlockTask;

/// Identifier of one object-store entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Wrap a raw id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj-{}", self.0)
    }
}

/// A handle, possibly unresolved, to a block held by a runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRef {
    id: ObjectId,
}

impl BlockRef {
    /// Create a handle for an object id.
    pub const fn new(id: ObjectId) -> Self {
        Self { id }
    }

    /// The object id.
    pub const fn id(&self) -> ObjectId {
        self.id
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockRef({})", self.id)
    }
}

/// A runtime that builds and stores blocks.
#[async_trait]
pub trait ExecutionRuntime: Send + Sync + fmt::Debug {
    /// Schedule a task and return a handle to its block without waiting.
    ///
    /// Task failures surface only when the handle is resolved.
    fn submit(&self, task: BlockTask) -> TesseraResult<BlockRef>;

    /// Store an already-built block.
    fn put(&self, block: Block) -> TesseraResult<BlockRef>;

    /// Resolve a handle, waiting for its task if needed.
    async fn get(&self, block_ref: &BlockRef) -> TesseraResult<Block>;

    /// Drop a block from the object store, returning whether it was held.
    ///
    /// Resolving a released handle fails.
    fn release(&self, block_ref: &BlockRef) -> TesseraResult<bool>;

    /// Number of entries held by the object store.
    fn num_objects(&self) -> usize;
}
