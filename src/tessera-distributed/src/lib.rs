//! Partitioning and block dispatch for Tessera.
//!
//! The pipeline from a source description to an ordered list of block
//! handles:
//!
//! ```text
//! input units ──▶ PartitionPlan ──▶ Dispatcher ──▶ ExecutionRuntime ──▶ [BlockRef]
//!                 (contiguous /       (put or        (worker pool +
//!                  round-robin)        submit)         object store)
//! ```
//!
//! # Key Components
//!
//! - [`PartitionPlan`]: deterministic unit-to-task mapping
//! - [`BlockTask`] and [`Worker`]: the single deferred unit of work and its executor
//! - [`ExecutionRuntime`]: the "submit" / "put" / "get" seam
//! - [`LocalRuntime`]: tokio worker pool plus in-process [`BlockStore`]
//! - [`BlockCodec`]: block encoding for the store
//! - [`Dispatcher`]: plan to ordered handles

#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_wrap)] // Range bounds are checked before the cast

pub mod dispatcher;
pub mod partitioning;
pub mod runtime;
pub mod transport;
pub mod worker;

pub use dispatcher::Dispatcher;
pub use partitioning::{Partition, PartitionPlan, PartitionUnits, PartitioningScheme};
pub use runtime::{BlockRef, BlockStore, ExecutionRuntime, LocalRuntime, ObjectId, StoredBlock};
pub use transport::BlockCodec;
pub use worker::{BlockTask, RANGE_COLUMN, Worker};
