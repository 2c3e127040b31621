//! The dataset value handed back to callers.

use std::fmt;

use serde::{Deserialize, Serialize};

use tessera_core::BlockKind;
use tessera_distributed::BlockRef;

/// An immutable, ordered sequence of block handles.
///
/// Concatenating the blocks in order gives the dataset's logical record
/// order. Every block shares the variant reported by [`kind`](Self::kind).
/// Building a dataset performs no computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    blocks: Vec<BlockRef>,
    kind: BlockKind,
}

impl Dataset {
    /// Wrap ordered block handles.
    pub fn new(blocks: Vec<BlockRef>, kind: BlockKind) -> Self {
        Self { blocks, kind }
    }

    /// The block handles, in order.
    pub fn blocks(&self) -> &[BlockRef] {
        &self.blocks
    }

    /// Number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the dataset has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The variant shared by every block.
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Consume the dataset, yielding its handles.
    pub fn into_blocks(self) -> Vec<BlockRef> {
        self.blocks
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset(kind={}, num_blocks={})", self.kind, self.blocks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_distributed::ObjectId;

    #[test]
    fn test_dataset_accessors() {
        let refs = vec![BlockRef::new(ObjectId::new(3)), BlockRef::new(ObjectId::new(1))];
        let dataset = Dataset::new(refs.clone(), BlockKind::Sequence);

        assert_eq!(dataset.num_blocks(), 2);
        assert!(!dataset.is_empty());
        assert_eq!(dataset.blocks(), refs.as_slice());
        assert_eq!(dataset.to_string(), "Dataset(kind=Sequence, num_blocks=2)");
        assert_eq!(dataset.into_blocks(), refs);
    }

    #[test]
    fn test_dataset_serde() {
        let dataset = Dataset::new(vec![BlockRef::new(ObjectId::new(7))], BlockKind::Columnar);
        let json = serde_json::to_string(&dataset).unwrap();
        let back: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dataset);
    }
}
