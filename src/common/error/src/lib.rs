//! Error types and result aliases for Tessera.
//!
//! Every crate in the workspace reports failures through [`TesseraError`].
//! Validation failures are `ConfigurationError`; declared-but-unimplemented
//! entry points are `NotSupported`.

mod error;

pub use error::{TesseraError, TesseraResult};
