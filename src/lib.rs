//! Tessera - partitioned, lazily-materialized datasets
//!
//! Tessera turns in-memory collections, integer ranges, and columnar files
//! into datasets: ordered lists of handles to immutable blocks that are
//! built by a pool of workers.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export member crates
pub use common_config as config;
pub use common_error as error;
pub use common_runtime as runtime;
pub use tessera_core as core;
pub use tessera_data as data;
pub use tessera_distributed as distributed;
pub use tessera_io as io;

pub use common_config::TesseraConfig;
pub use common_error::{TesseraError, TesseraResult};
pub use tessera_data::{ColumnarReadOptions, DataContext, Dataset};

/// Tessera version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
