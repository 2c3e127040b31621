//! Filesystem handles backed by `object_store`.
//!
//! A [`FileSystem`] names a kind of storage, not a particular bucket. Paths
//! handed to it are normalized the same way for every remote kind:
//! `bucket/key/...`, with the URI scheme removed. The first path segment is
//! the store root (bucket, container, or host); the rest is the object
//! location inside it. Local paths are plain filesystem paths.
//!
//! Stores are built lazily, per root, only when bytes are actually read.

use std::fmt;
use std::sync::Arc;

use object_store::ObjectStore;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use serde::{Deserialize, Serialize};
use url::Url;

use common_error::{TesseraError, TesseraResult};

// ============================================================================
// FileSystemKind
// ============================================================================

/// The kind of storage a path lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileSystemKind {
    /// Local disk.
    Local,
    /// Amazon S3 or an S3-compatible store.
    S3,
    /// Google Cloud Storage.
    Gcs,
    /// Azure Blob Storage / ADLS.
    Azure,
    /// Plain HTTP(S) / WebDAV.
    Http,
}

impl FileSystemKind {
    /// Short lowercase name, e.g. `local` or `s3`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::S3 => "s3",
            Self::Gcs => "gcs",
            Self::Azure => "azure",
            Self::Http => "http",
        }
    }

    /// URI scheme used to rebuild a store URL for this kind.
    fn default_scheme(&self) -> &'static str {
        match self {
            Self::Local => "file",
            Self::S3 => "s3",
            Self::Gcs => "gs",
            Self::Azure => "az",
            Self::Http => "https",
        }
    }
}

impl fmt::Display for FileSystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

// ============================================================================
// FileSystem
// ============================================================================

/// A handle to one kind of storage, plus options for building its stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystem {
    kind: FileSystemKind,
    /// Scheme the paths were given with (`s3`, `s3a`, `https`, ...).
    scheme: String,
    /// Extra `object_store` builder options (region, endpoint, ...).
    options: Vec<(String, String)>,
}

impl FileSystem {
    /// The local filesystem.
    pub fn local() -> Self {
        Self {
            kind: FileSystemKind::Local,
            scheme: "file".to_string(),
            options: Vec::new(),
        }
    }

    /// A remote filesystem of the given kind, using its default scheme.
    pub fn remote(kind: FileSystemKind) -> Self {
        Self::with_scheme(kind, kind.default_scheme())
    }

    /// A filesystem of the given kind, addressed with an explicit scheme.
    pub fn with_scheme(kind: FileSystemKind, scheme: impl Into<String>) -> Self {
        Self {
            kind,
            scheme: scheme.into(),
            options: Vec::new(),
        }
    }

    /// Add an `object_store` builder option, e.g. `("aws_region", "us-west-2")`.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }

    /// The storage kind.
    pub fn kind(&self) -> FileSystemKind {
        self.kind
    }

    /// Short lowercase kind name.
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// The URI scheme paths were given with.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Builder options passed to remote stores.
    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }

    /// Whether this is the local filesystem.
    pub fn is_local(&self) -> bool {
        self.kind == FileSystemKind::Local
    }

    /// Split a normalized path into its store root and object location.
    pub fn locate(&self, path: &str) -> TesseraResult<(String, ObjectPath)> {
        if self.is_local() {
            let location = ObjectPath::from_filesystem_path(path).map_err(|e| {
                TesseraError::storage(format!("cannot open local path '{path}': {e}"))
            })?;
            return Ok((String::new(), location));
        }

        let trimmed = path.trim_start_matches('/');
        let (root, key) = trimmed.split_once('/').unwrap_or((trimmed, ""));
        if root.is_empty() {
            return Err(TesseraError::configuration(format!(
                "path '{path}' has no bucket or host for {} storage",
                self.kind
            )));
        }
        Ok((root.to_string(), ObjectPath::from(key)))
    }

    /// Build the object store serving a root returned by [`locate`](Self::locate).
    pub fn store(&self, root: &str) -> TesseraResult<Arc<dyn ObjectStore>> {
        if self.is_local() {
            return Ok(Arc::new(LocalFileSystem::new()));
        }

        let url = Url::parse(&format!("{}://{}", self.scheme, root))?;
        let (store, _) = object_store::parse_url_opts(&url, self.options.iter().cloned())?;
        Ok(Arc::from(store))
    }

    /// Render a root and location as a normalized path.
    pub fn display_path(&self, root: &str, location: &str) -> String {
        if self.is_local() {
            format!("/{location}")
        } else if location.is_empty() {
            root.to_string()
        } else {
            format!("{root}/{location}")
        }
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::local()
    }
}

impl fmt::Display for FileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileSystem({}, scheme={})", self.kind, self.scheme)
    }
}
