//! The deferred unit of work.

use std::fmt;

use serde::{Deserialize, Serialize};

use tessera_core::BlockKind;
use tessera_io::{ColumnarFragment, FileSystem};

/// A task that builds exactly one block.
///
/// This is the only task type a runtime has to know about. It is plain data,
/// so it can be shipped to a remote worker as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockTask {
    /// Integers `[start, start + count)` as a sequence block.
    Range {
        /// First value.
        start: usize,
        /// Number of values.
        count: usize,
    },
    /// Integers `[start, start + count)` as a columnar block with a single
    /// `value` column.
    ColumnarRange {
        /// First value.
        start: usize,
        /// Number of values.
        count: usize,
    },
    /// Read and concatenate columnar fragments, in order.
    ReadFragments {
        /// Filesystem the fragments live on.
        filesystem: FileSystem,
        /// Fragments, in submission order.
        fragments: Vec<ColumnarFragment>,
        /// Optional column projection.
        columns: Option<Vec<String>>,
    },
}

impl BlockTask {
    /// Variant of the block this task produces.
    pub fn output_kind(&self) -> BlockKind {
        match self {
            Self::Range { .. } => BlockKind::Sequence,
            Self::ColumnarRange { .. } | Self::ReadFragments { .. } => BlockKind::Columnar,
        }
    }

    /// Number of input units the task consumes.
    pub fn num_units(&self) -> usize {
        match self {
            Self::Range { count, .. } | Self::ColumnarRange { count, .. } => *count,
            Self::ReadFragments { fragments, .. } => fragments.len(),
        }
    }
}

impl fmt::Display for BlockTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { start, count } => write!(f, "Range(start={start}, count={count})"),
            Self::ColumnarRange { start, count } => {
                write!(f, "ColumnarRange(start={start}, count={count})")
            }
            Self::ReadFragments { fragments, .. } => {
                write!(f, "ReadFragments(fragments={})", fragments.len())
            }
        }
    }
}
