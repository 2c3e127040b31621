//! Columnar file fragments.
//!
//! A fragment is one Arrow IPC file. Discovery expands each input path into
//! fragments: a file is one fragment, a directory contributes every file
//! beneath it (sorted by location, hidden names skipped). Reading a fragment
//! yields one Arrow table, optionally projected to a subset of columns.

use std::io::Cursor;

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use arrow_ipc::reader::FileReader;
use futures::TryStreamExt;
use log::{debug, warn};
use object_store::ObjectMeta;
use object_store::path::Path as ObjectPath;
use serde::{Deserialize, Serialize};

use common_config::IoConfig;
use common_error::{TesseraError, TesseraResult};

use crate::filesystem::FileSystem;

// ============================================================================
// ColumnarFragment
// ============================================================================

/// One file-level unit of a columnar source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnarFragment {
    /// Store root (bucket or host); empty for local files.
    root: String,
    /// Object location inside the root.
    location: String,
    /// File size in bytes.
    size: u64,
}

impl ColumnarFragment {
    /// Create a fragment descriptor.
    pub fn new(root: impl Into<String>, location: impl Into<String>, size: u64) -> Self {
        Self {
            root: root.into(),
            location: location.into(),
            size,
        }
    }

    /// The store root.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The object location inside the root.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// File size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The fragment's normalized path on `filesystem`.
    pub fn path(&self, filesystem: &FileSystem) -> String {
        filesystem.display_path(&self.root, &self.location)
    }

    /// Read the fragment into one table.
    ///
    /// When `columns` is given, the table is projected to those columns in
    /// that order; a missing column is a `SchemaError`.
    pub async fn read(
        &self,
        filesystem: &FileSystem,
        columns: Option<&[String]>,
    ) -> TesseraResult<RecordBatch> {
        let store = filesystem.store(&self.root)?;
        let location = ObjectPath::parse(&self.location).map_err(|e| {
            TesseraError::storage(format!("invalid fragment location '{}': {e}", self.location))
        })?;
        let bytes = store.get(&location).await?.bytes().await?;

        let reader = FileReader::try_new(Cursor::new(bytes), None)?;
        let schema = reader.schema();
        let batches = reader.collect::<Result<Vec<_>, _>>()?;
        let table = concat_batches(&schema, &batches)?;
        debug!(
            "Read fragment {} ({} rows)",
            self.path(filesystem),
            table.num_rows()
        );

        match columns {
            None => Ok(table),
            Some(columns) => {
                let indices = columns
                    .iter()
                    .map(|name| {
                        schema.index_of(name).map_err(|_| {
                            TesseraError::schema_error(format!(
                                "column '{name}' not found in fragment {}",
                                self.path(filesystem)
                            ))
                        })
                    })
                    .collect::<TesseraResult<Vec<_>>>()?;
                Ok(table.project(&indices)?)
            }
        }
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Rules for expanding directories into fragments.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Hidden-name rules.
    pub io: IoConfig,
    /// Keep only files with this extension (without the dot).
    pub file_extension: Option<String>,
}

impl DiscoveryOptions {
    /// Whether a listed object is a data file. Every path segment below the
    /// listed prefix is checked, so files inside hidden or temporary
    /// directories (`.staging/`, `_temporary/`) are skipped too.
    fn keeps(&self, listed_under: &ObjectPath, meta: &ObjectMeta) -> bool {
        let Some(mut segments) = meta.location.prefix_match(listed_under) else {
            return false;
        };
        if segments.any(|segment| self.io.is_ignored(segment.as_ref())) {
            return false;
        }
        match &self.file_extension {
            Some(ext) => meta.location.extension() == Some(ext.trim_start_matches('.')),
            None => true,
        }
    }
}

/// Expand paths into fragments, in path order then location order.
pub async fn discover_fragments(
    filesystem: &FileSystem,
    paths: &[String],
    options: &DiscoveryOptions,
) -> TesseraResult<Vec<ColumnarFragment>> {
    let mut fragments = Vec::new();

    for path in paths {
        let (root, location) = filesystem.locate(path)?;
        let store = filesystem.store(&root)?;

        match store.head(&location).await {
            Ok(meta) => {
                fragments.push(ColumnarFragment::new(
                    root.clone(),
                    meta.location.to_string(),
                    meta.size as u64,
                ));
            }
            Err(object_store::Error::NotFound { .. }) => {
                let mut listed: Vec<ObjectMeta> = store.list(Some(&location)).try_collect().await?;
                listed.retain(|meta| options.keeps(&location, meta));
                listed.sort_by(|a, b| a.location.cmp(&b.location));

                if listed.is_empty() {
                    warn!("No fragments found under '{path}'");
                }
                debug!("Discovered {} fragments under '{path}'", listed.len());

                fragments.extend(listed.into_iter().map(|meta| {
                    ColumnarFragment::new(root.clone(), meta.location.to_string(), meta.size as u64)
                }));
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(fragments)
}
