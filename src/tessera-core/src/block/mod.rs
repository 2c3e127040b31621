//! Immutable per-partition record containers.
//!
//! A [`Block`] holds the records of exactly one partition. It is a tagged
//! variant: a [`SequenceBlock`] holds ordered arbitrary [`Value`]s, a
//! [`ColumnarBlock`] holds named, typed Arrow columns with rows aligned
//! across columns. All blocks of one dataset share the same variant.
//!
//! Blocks are produced through the [`BlockBuilder`] capability, or, for
//! already-parsed columnar fragments, by concatenating Arrow tables directly
//! with [`ColumnarBlock::concat`].
//!
//! [`Value`]: crate::types::Value

mod builder;
mod columnar;
mod sequence;

pub use builder::BlockBuilder;
pub use columnar::{ColumnarBlock, ColumnarBlockBuilder};
pub use sequence::{SequenceBlock, SequenceBlockBuilder};

use serde::{Deserialize, Serialize};

/// The variant tag of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Ordered arbitrary-typed records.
    Sequence,
    /// Named typed columns.
    Columnar,
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequence => write!(f, "Sequence"),
            Self::Columnar => write!(f, "Columnar"),
        }
    }
}

/// An immutable container holding one partition's records.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Ordered arbitrary-typed records.
    Sequence(SequenceBlock),
    /// Named typed columns.
    Columnar(ColumnarBlock),
}

impl Block {
    /// The variant tag of this block.
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Sequence(_) => BlockKind::Sequence,
            Self::Columnar(_) => BlockKind::Columnar,
        }
    }

    /// Number of records in the block.
    pub fn num_rows(&self) -> usize {
        match self {
            Self::Sequence(block) => block.len(),
            Self::Columnar(block) => block.num_rows(),
        }
    }

    /// Whether the block has no records.
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Approximate in-memory footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Sequence(block) => block.size_bytes(),
            Self::Columnar(block) => block.size_bytes(),
        }
    }

    /// Borrow as a sequence block.
    pub fn as_sequence(&self) -> Option<&SequenceBlock> {
        match self {
            Self::Sequence(block) => Some(block),
            Self::Columnar(_) => None,
        }
    }

    /// Borrow as a columnar block.
    pub fn as_columnar(&self) -> Option<&ColumnarBlock> {
        match self {
            Self::Columnar(block) => Some(block),
            Self::Sequence(_) => None,
        }
    }
}

impl From<SequenceBlock> for Block {
    fn from(block: SequenceBlock) -> Self {
        Self::Sequence(block)
    }
}

impl From<ColumnarBlock> for Block {
    fn from(block: ColumnarBlock) -> Self {
        Self::Columnar(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Row, Value};

    #[test]
    fn test_block_kind_dispatch() {
        let mut builder = SequenceBlock::builder();
        builder.add(Value::Int64(1)).unwrap();
        let block = builder.build().unwrap();

        assert_eq!(block.kind(), BlockKind::Sequence);
        assert_eq!(block.num_rows(), 1);
        assert!(block.as_sequence().is_some());
        assert!(block.as_columnar().is_none());

        let mut builder = ColumnarBlock::builder();
        builder.add(Row::new().with("value", 1i64)).unwrap();
        let block = builder.build().unwrap();

        assert_eq!(block.kind(), BlockKind::Columnar);
        assert_eq!(block.num_rows(), 1);
        assert!(block.as_columnar().is_some());
    }

    #[test]
    fn test_block_kind_display() {
        assert_eq!(BlockKind::Sequence.to_string(), "Sequence");
        assert_eq!(BlockKind::Columnar.to_string(), "Columnar");
    }
}
