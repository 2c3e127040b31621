//! Dataset construction for Tessera.
//!
//! [`DataContext`] is the entry point. It turns a source (in-memory items,
//! an integer range, or columnar files) into a [`Dataset`]: an ordered list
//! of handles to blocks that are built by the execution runtime.
//!
//! ```no_run
//! use common_config::TesseraConfig;
//! use tessera_data::DataContext;
//!
//! # fn main() -> common_error::TesseraResult<()> {
//! let ctx = DataContext::new(TesseraConfig::default())?;
//! let dataset = ctx.range(20, Some(10))?;
//! assert_eq!(ctx.block_sizes_sync(&dataset)?, vec![2; 10]);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::return_self_not_must_use)]

mod context;
mod dataset;
mod read_api;

pub use context::DataContext;
pub use dataset::Dataset;
pub use read_api::{ColumnarReadOptions, ExternalFrameRef, FileReadOptions};
