//! Core data model for Tessera datasets.
//!
//! This crate provides the record and block types shared by every stage of
//! the pipeline:
//! - `Value` and `Row` for records
//! - `Block`, the immutable per-partition container, in its sequence and
//!   columnar variants
//! - `BlockBuilder`, the shared accumulate-then-finalize capability

pub mod block;
pub mod types;

// Re-export commonly used types
pub use block::{
    Block, BlockBuilder, BlockKind, ColumnarBlock, ColumnarBlockBuilder, SequenceBlock,
    SequenceBlockBuilder,
};
pub use types::{Row, Value};
