//! In-process object store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use futures::future::{BoxFuture, Shared};

use common_error::{TesseraError, TesseraResult};

use super::ObjectId;

/// An encoded block, or the pending task that will produce it.
///
/// Shared so that every resolution observes the same single result.
pub type StoredBlock = Shared<BoxFuture<'static, Result<Bytes, Arc<TesseraError>>>>;

/// Write-once map from object ids to stored blocks. Entries live until
/// they are removed.
#[derive(Default)]
pub struct BlockStore {
    next_id: AtomicU64,
    entries: RwLock<HashMap<ObjectId, StoredBlock>>,
}

impl BlockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id.
    pub fn reserve(&self) -> ObjectId {
        ObjectId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Write the entry for `id`. Each id is written at most once.
    pub fn insert(&self, id: ObjectId, entry: StoredBlock) -> TesseraResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| TesseraError::internal("block store lock poisoned"))?;
        if entries.contains_key(&id) {
            return Err(TesseraError::internal(format!(
                "object {id} has already been written"
            )));
        }
        entries.insert(id, entry);
        Ok(())
    }

    /// Look up the entry for `id`.
    pub fn get(&self, id: ObjectId) -> TesseraResult<StoredBlock> {
        let entries = self
            .entries
            .read()
            .map_err(|_| TesseraError::internal("block store lock poisoned"))?;
        entries
            .get(&id)
            .cloned()
            .ok_or_else(|| TesseraError::internal(format!("unknown object {id}")))
    }

    /// Drop the entry for `id`, returning whether it was present.
    ///
    /// A pending task keeps running but its output is discarded. Ids are
    /// never reused, so a released id stays unresolvable.
    pub fn remove(&self, id: ObjectId) -> TesseraResult<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| TesseraError::internal("block store lock poisoned"))?;
        Ok(entries.remove(&id).is_some())
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for BlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockStore")
            .field("len", &self.len())
            .finish()
    }
}
