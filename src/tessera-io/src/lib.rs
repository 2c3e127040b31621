//! File-based inputs for Tessera datasets.
//!
//! - [`PathResolver`] binds path strings to one consistent [`FileSystem`]
//! - [`FileSystem`] selects an object store by kind (local disk, S3, GCS,
//!   Azure, HTTP)
//! - [`ColumnarFragment`] is one Arrow IPC file of a columnar source;
//!   [`discover_fragments`] expands files and directories into fragments

mod filesystem;
mod fragment;
mod paths;

pub use filesystem::{FileSystem, FileSystemKind};
pub use fragment::{ColumnarFragment, DiscoveryOptions, discover_fragments};
pub use paths::{PathResolver, PathsArg, ResolvedPaths};
