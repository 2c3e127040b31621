//! File and external-frame sources.
//!
//! Only columnar files are read. The other entry points are declared so
//! callers can be written against them, and fail with `NotSupported`
//! before touching the filesystem or the runtime.

use std::collections::BTreeMap;

use log::debug;

use common_error::{TesseraError, TesseraResult, config_err};
use tessera_core::BlockKind;
use tessera_distributed::{BlockRef, PartitionPlan};
use tessera_io::{DiscoveryOptions, FileSystem, PathResolver, PathsArg, discover_fragments};

use crate::context::DataContext;
use crate::dataset::Dataset;

// ============================================================================
// Options
// ============================================================================

/// Options for [`DataContext::read_columnar_files`].
#[derive(Debug, Clone, Default)]
pub struct ColumnarReadOptions {
    /// Filesystem to read from. When set, paths are used as given instead of
    /// being resolved.
    pub filesystem: Option<FileSystem>,
    /// Columns to keep, in this order. `None` keeps all columns.
    pub columns: Option<Vec<String>>,
    /// Target number of blocks. `None` uses the configured default.
    pub parallelism: Option<usize>,
    /// Only read files with this extension when listing directories.
    pub file_extension: Option<String>,
}

impl ColumnarReadOptions {
    /// Read from an explicit filesystem.
    pub fn with_filesystem(mut self, filesystem: FileSystem) -> Self {
        self.filesystem = Some(filesystem);
        self
    }

    /// Project to the given columns.
    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the target parallelism.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    /// Filter listed files by extension.
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = Some(extension.into());
        self
    }
}

/// Options for the row-oriented file readers.
#[derive(Debug, Clone, Default)]
pub struct FileReadOptions {
    /// Filesystem to read from.
    pub filesystem: Option<FileSystem>,
    /// Target number of blocks.
    pub parallelism: Option<usize>,
    /// Reader-specific options passed through untouched.
    pub format_options: BTreeMap<String, String>,
}

/// Opaque reference to a dataframe owned by an external engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalFrameRef(String);

impl ExternalFrameRef {
    /// Refer to a frame by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The frame name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Readers
// ============================================================================

impl DataContext {
    /// Read columnar (Arrow IPC) files into a dataset.
    ///
    /// Each path may be a file or a directory. Directories are listed
    /// recursively; files under a name with an ignored prefix are skipped.
    /// Fragments are spread round-robin over at most `parallelism` blocks,
    /// each read by one deferred task.
    ///
    /// Fails with `ConfigurationError` for bad paths, zero parallelism, or
    /// when no fragments are found. Listing blocks the calling thread; use
    /// [`read_columnar_files_async`](Self::read_columnar_files_async) from
    /// async code.
    pub fn read_columnar_files(
        &self,
        paths: impl Into<PathsArg>,
        options: ColumnarReadOptions,
    ) -> TesseraResult<Dataset> {
        common_runtime::block_on(self.read_columnar_files_async(paths, options))?
    }

    /// Async form of [`read_columnar_files`](Self::read_columnar_files).
    pub async fn read_columnar_files_async(
        &self,
        paths: impl Into<PathsArg>,
        options: ColumnarReadOptions,
    ) -> TesseraResult<Dataset> {
        let parallelism = self.parallelism(options.parallelism)?;

        let (filesystem, paths) = match options.filesystem {
            Some(filesystem) => {
                let paths = match paths.into() {
                    PathsArg::Single(path) => vec![path],
                    PathsArg::Many(paths) if paths.is_empty() => {
                        config_err!("no data provided: empty path list");
                    }
                    PathsArg::Many(paths) => paths,
                };
                (filesystem, paths)
            }
            None => {
                let (filesystem, paths) = PathResolver::resolve(paths)?;
                (filesystem, paths.into_vec())
            }
        };
        debug!("Reading {} paths from {filesystem}", paths.len());

        let discovery = DiscoveryOptions {
            io: self.config().io.clone(),
            file_extension: options.file_extension,
        };
        let fragments = discover_fragments(&filesystem, &paths, &discovery).await?;

        let plan = PartitionPlan::round_robin(fragments.len(), parallelism)?;
        let blocks = self.dispatcher().submit_fragments(
            &filesystem,
            &fragments,
            options.columns.as_deref(),
            &plan,
        )?;
        debug!(
            "read_columnar_files: {} fragments, {plan} -> {} blocks",
            fragments.len(),
            blocks.len()
        );
        Ok(Dataset::new(blocks, BlockKind::Columnar))
    }

    /// Read JSON files. Not implemented.
    pub fn read_json(
        &self,
        _paths: impl Into<PathsArg>,
        _options: FileReadOptions,
    ) -> TesseraResult<Dataset> {
        Err(not_implemented("read_json"))
    }

    /// Read CSV files. Not implemented.
    pub fn read_csv(
        &self,
        _paths: impl Into<PathsArg>,
        _options: FileReadOptions,
    ) -> TesseraResult<Dataset> {
        Err(not_implemented("read_csv"))
    }

    /// Read whole files as binary records. Not implemented.
    pub fn read_binary_files(
        &self,
        _paths: impl Into<PathsArg>,
        _include_paths: bool,
        _options: FileReadOptions,
    ) -> TesseraResult<Dataset> {
        Err(not_implemented("read_binary_files"))
    }

    /// Convert a Dask dataframe. Not implemented.
    pub fn from_dask(
        &self,
        _frame: ExternalFrameRef,
        _parallelism: Option<usize>,
    ) -> TesseraResult<Dataset> {
        Err(not_implemented("from_dask"))
    }

    /// Convert a Modin dataframe. Not implemented.
    pub fn from_modin(
        &self,
        _frame: ExternalFrameRef,
        _parallelism: Option<usize>,
    ) -> TesseraResult<Dataset> {
        Err(not_implemented("from_modin"))
    }

    /// Convert a Spark dataframe. Not implemented.
    pub fn from_spark(
        &self,
        _frame: ExternalFrameRef,
        _parallelism: Option<usize>,
    ) -> TesseraResult<Dataset> {
        Err(not_implemented("from_spark"))
    }

    /// Build a dataset from stored pandas frames. Not implemented.
    pub fn from_pandas(
        &self,
        _frames: Vec<BlockRef>,
        _parallelism: Option<usize>,
    ) -> TesseraResult<Dataset> {
        Err(not_implemented("from_pandas"))
    }
}

fn not_implemented(entry_point: &str) -> TesseraError {
    TesseraError::not_supported(format!("{entry_point} is not implemented"))
}
