//! Path argument parsing and filesystem resolution.

use std::path::Path;

use log::debug;
use object_store::ObjectStoreScheme;
use url::Url;

use common_error::{TesseraError, TesseraResult};

use crate::filesystem::{FileSystem, FileSystemKind};

const PATHS_TYPE_MESSAGE: &str = "paths must be a path string or a list of path strings";

// ============================================================================
// Path arguments
// ============================================================================

/// A path argument: one path string or a list of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathsArg {
    /// A single path.
    Single(String),
    /// A list of paths; must be non-empty to resolve.
    Many(Vec<String>),
}

impl PathsArg {
    /// Parse an untyped JSON argument.
    ///
    /// Accepts a string or an array of strings. Anything else, an array
    /// holding a non-string element, or an empty array is a
    /// `ConfigurationError`.
    pub fn from_json(value: &serde_json::Value) -> TesseraResult<Self> {
        match value {
            serde_json::Value::String(path) => Ok(Self::Single(path.clone())),
            serde_json::Value::Array(items) => {
                let paths = items
                    .iter()
                    .map(|item| item.as_str().map(String::from))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| TesseraError::configuration(PATHS_TYPE_MESSAGE))?;
                if paths.is_empty() {
                    return Err(TesseraError::configuration("no data provided: empty path list"));
                }
                Ok(Self::Many(paths))
            }
            _ => Err(TesseraError::configuration(PATHS_TYPE_MESSAGE)),
        }
    }
}

impl From<&str> for PathsArg {
    fn from(path: &str) -> Self {
        Self::Single(path.to_string())
    }
}

impl From<String> for PathsArg {
    fn from(path: String) -> Self {
        Self::Single(path)
    }
}

impl From<Vec<String>> for PathsArg {
    fn from(paths: Vec<String>) -> Self {
        Self::Many(paths)
    }
}

impl From<Vec<&str>> for PathsArg {
    fn from(paths: Vec<&str>) -> Self {
        Self::Many(paths.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for PathsArg {
    fn from(paths: &[&str]) -> Self {
        Self::Many(paths.iter().map(|p| (*p).to_string()).collect())
    }
}

/// Normalized paths, in the same shape as the argument they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPaths {
    /// A single normalized path.
    Single(String),
    /// A normalized path list, in argument order.
    Many(Vec<String>),
}

impl ResolvedPaths {
    /// Borrow the paths as a slice.
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Single(path) => std::slice::from_ref(path),
            Self::Many(paths) => paths,
        }
    }

    /// Consume into a list.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(path) => vec![path],
            Self::Many(paths) => paths,
        }
    }

    /// Number of paths.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether there are no paths.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

// ============================================================================
// PathResolver
// ============================================================================

/// Binds path strings to a single consistent [`FileSystem`].
///
/// Resolution is pure apart from probing whether each path exists locally.
pub struct PathResolver;

impl PathResolver {
    /// Resolve one path or a list of paths.
    ///
    /// Fails with `ConfigurationError` for an empty list, or when the paths
    /// resolve to different filesystem kinds.
    pub fn resolve(paths: impl Into<PathsArg>) -> TesseraResult<(FileSystem, ResolvedPaths)> {
        match paths.into() {
            PathsArg::Single(path) => {
                let (filesystem, path) = Self::resolve_single(&path)?;
                Ok((filesystem, ResolvedPaths::Single(path)))
            }
            PathsArg::Many(paths) => {
                if paths.is_empty() {
                    return Err(TesseraError::configuration("no data provided: empty path list"));
                }

                let resolved = paths
                    .iter()
                    .map(|path| Self::resolve_single(path))
                    .collect::<TesseraResult<Vec<_>>>()?;

                let first_kind = resolved[0].0.kind();
                if resolved.iter().any(|(fs, _)| fs.kind() != first_kind) {
                    let mut kinds: Vec<&str> = resolved.iter().map(|(fs, _)| fs.type_name()).collect();
                    kinds.sort_unstable();
                    kinds.dedup();
                    return Err(TesseraError::configuration(format!(
                        "when specifying multiple paths, each path must have the same filesystem, but found: [{}]",
                        kinds.join(", ")
                    )));
                }

                let mut resolved = resolved.into_iter();
                let (filesystem, first) = resolved
                    .next()
                    .ok_or_else(|| TesseraError::internal("resolved path list is empty"))?;
                let mut normalized = vec![first];
                normalized.extend(resolved.map(|(_, path)| path));
                Ok((filesystem, ResolvedPaths::Many(normalized)))
            }
        }
    }

    /// Resolve one path string.
    ///
    /// An existing local path binds to the local filesystem unchanged.
    /// Otherwise the path is parsed as a URI and the filesystem is chosen by
    /// scheme; the returned path drops the scheme (`s3://b/k` → `b/k`).
    pub fn resolve_single(path: &str) -> TesseraResult<(FileSystem, String)> {
        if Path::new(path).exists() {
            debug!("Resolved '{path}' to an existing local path");
            return Ok((FileSystem::local(), path.to_string()));
        }

        match Url::parse(path) {
            Ok(url) => Self::resolve_url(path, &url),
            Err(url::ParseError::RelativeUrlWithoutBase) if Path::new(path).is_absolute() => {
                Ok((FileSystem::local(), path.to_string()))
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => Err(TesseraError::configuration(
                format!("path '{path}' does not exist locally and has no URI scheme"),
            )),
            Err(e) => Err(TesseraError::configuration(format!(
                "cannot parse path '{path}' as a URI: {e}"
            ))),
        }
    }

    fn resolve_url(path: &str, url: &Url) -> TesseraResult<(FileSystem, String)> {
        let (scheme, _) = ObjectStoreScheme::parse(url).map_err(|e| {
            TesseraError::configuration(format!("unrecognized filesystem for '{path}': {e}"))
        })?;

        let kind = match scheme {
            ObjectStoreScheme::Local => {
                let local = url.to_file_path().map_err(|()| {
                    TesseraError::configuration(format!("'{path}' is not a valid file URI"))
                })?;
                return Ok((FileSystem::local(), local.to_string_lossy().into_owned()));
            }
            ObjectStoreScheme::AmazonS3 => FileSystemKind::S3,
            ObjectStoreScheme::GoogleCloudStorage => FileSystemKind::Gcs,
            ObjectStoreScheme::MicrosoftAzure => FileSystemKind::Azure,
            ObjectStoreScheme::Http => FileSystemKind::Http,
            other => {
                return Err(TesseraError::configuration(format!(
                    "'{path}' uses unsupported storage {other:?}"
                )));
            }
        };

        let host = url.host_str().unwrap_or_default();
        let normalized = format!("{host}{}", url.path())
            .trim_matches('/')
            .to_string();
        debug!("Resolved '{path}' to {kind} path '{normalized}'");
        Ok((FileSystem::with_scheme(kind, url.scheme()), normalized))
    }
}
