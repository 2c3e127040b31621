//! Core error types for Tessera.

use thiserror::Error;

/// Result type alias using `TesseraError`.
pub type TesseraResult<T> = std::result::Result<T, TesseraError>;

/// Core error type for Tessera operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TesseraError {
    /// Malformed arguments: bad paths, mismatched filesystems, zero
    /// parallelism, or an input with no data units.
    #[error("ConfigurationError: {0}")]
    ConfigurationError(String),

    /// Entry point that is declared but not implemented.
    #[error("NotSupported: {0}")]
    NotSupported(String),

    /// Type mismatch or invalid type operation.
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Invalid value provided.
    #[error("ValueError: {0}")]
    ValueError(String),

    /// Schema-related error (column mismatch, missing column).
    #[error("SchemaError: {0}")]
    SchemaError(String),

    /// A deferred unit of work failed.
    #[error("ExecutionError: {0}")]
    ExecutionError(String),

    /// Object store or filesystem error.
    #[error("StorageError: {0}")]
    StorageError(String),

    /// Internal error (bug in Tessera).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// IO error.
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    /// Arrow error.
    #[error("ArrowError: {0}")]
    ArrowError(#[from] arrow_schema::ArrowError),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Object store error.
    #[error("ObjectStoreError: {0}")]
    ObjectStoreError(#[from] object_store::Error),

    /// URI parse error.
    #[error("UrlParseError: {0}")]
    UrlParseError(#[from] url::ParseError),
}

impl TesseraError {
    /// Create a new `ConfigurationError`.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a new `NotSupported` error.
    pub fn not_supported<S: Into<String>>(msg: S) -> Self {
        Self::NotSupported(msg.into())
    }

    /// Create a new `TypeError`.
    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a new `ValueError`.
    pub fn value_error<S: Into<String>>(msg: S) -> Self {
        Self::ValueError(msg.into())
    }

    /// Create a new `SchemaError`.
    pub fn schema_error<S: Into<String>>(msg: S) -> Self {
        Self::SchemaError(msg.into())
    }

    /// Create a new `ExecutionError`.
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        Self::ExecutionError(msg.into())
    }

    /// Create a new `StorageError`.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::StorageError(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }

    /// Whether this is a `ConfigurationError`.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationError(_))
    }

    /// Whether this is a `NotSupported` error.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }

    /// A copy of this error for handing out to more than one waiter.
    ///
    /// Message variants keep their kind. Variants wrapping a foreign error
    /// are flattened into an `ExecutionError` carrying the rendered message.
    pub fn replicate(&self) -> Self {
        match self {
            Self::ConfigurationError(msg) => Self::ConfigurationError(msg.clone()),
            Self::NotSupported(msg) => Self::NotSupported(msg.clone()),
            Self::TypeError(msg) => Self::TypeError(msg.clone()),
            Self::ValueError(msg) => Self::ValueError(msg.clone()),
            Self::SchemaError(msg) => Self::SchemaError(msg.clone()),
            Self::ExecutionError(msg) => Self::ExecutionError(msg.clone()),
            Self::StorageError(msg) => Self::StorageError(msg.clone()),
            Self::InternalError(msg) => Self::InternalError(msg.clone()),
            other => Self::ExecutionError(other.to_string()),
        }
    }
}

/// Ensure a condition holds, returning an `ExecutionError` if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::TesseraError::ExecutionError($msg.to_string()));
        }
    };
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::TesseraError::$variant(format!($($msg)*)));
        }
    };
}

/// Return early with a `ConfigurationError`.
#[macro_export]
macro_rules! config_err {
    ($($arg:tt)*) => {
        return Err($crate::TesseraError::ConfigurationError(format!($($arg)*)))
    };
}

/// Return early with a `TypeError`.
#[macro_export]
macro_rules! type_err {
    ($($arg:tt)*) => {
        return Err($crate::TesseraError::TypeError(format!($($arg)*)))
    };
}
