//! Error types for PatchKit
//!
//! Two layers: [`ViewError`] is returned by the byte view core and never
//! carries context beyond the failed bounds, while [`PatchKitError`] is used
//! by the snapshot, path and CLI layers built on top of it.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a [`ByteView`](crate::memory::ByteView) operation
///
/// Every check runs before the first byte is touched, so receiving one of
/// these means the view was left unmodified.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    /// A required source/destination is missing, or the view itself is empty
    #[error("null argument: source, destination or view is empty")]
    NullArgument,

    /// The requested range does not fit inside the addressable bytes
    #[error("out of range: {len} bytes at offset {offset} exceed size {size}")]
    OutOfRange {
        /// Requested start offset
        offset: usize,
        /// Requested number of bytes
        len: usize,
        /// Number of bytes actually addressable
        size: usize,
    },

    /// A length-prefixed string payload is not valid UTF-8
    #[error("invalid text: string payload at offset {offset} is not UTF-8")]
    InvalidText {
        /// Offset of the payload's first byte
        offset: usize,
    },
}

impl ViewError {
    /// Create an out-of-range error
    pub fn out_of_range(offset: usize, len: usize, size: usize) -> Self {
        Self::OutOfRange { offset, len, size }
    }

    /// Check whether this error is a bounds violation
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

/// Main error type for PatchKit operations
#[derive(Error, Debug)]
pub enum PatchKitError {
    /// I/O error during file operations
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File or directory not found
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Byte view access failed
    #[error("Buffer access error: {0}")]
    View(#[from] ViewError),

    /// Snapshot data is malformed or unsupported
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Snapshot JSON parsing/writing error
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PatchKitError>,
    },
}

impl PatchKitError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a snapshot format error
    pub fn snapshot(message: impl Into<String>) -> Self {
        Self::Snapshot(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } | Self::NotFound(path) => Some(path),
            Self::WithContext { source, .. } => source.path(),
            _ => None,
        }
    }
}

/// Result type alias for PatchKit operations
pub type Result<T> = std::result::Result<T, PatchKitError>;

impl From<std::io::Error> for PatchKitError {
    fn from(err: std::io::Error) -> Self {
        PatchKitError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for PatchKitError {
    fn from(err: serde_json::Error) -> Self {
        PatchKitError::Manifest(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| PatchKitError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = PatchKitError::io("/test/path", io_err);
        assert_eq!(err.path().unwrap(), &PathBuf::from("/test/path"));
    }

    #[test]
    fn test_view_error_display() {
        let err = ViewError::out_of_range(4, 8, 10);
        let msg = err.to_string();
        assert!(msg.contains("offset 4"));
        assert!(msg.contains("size 10"));
        assert!(err.is_out_of_range());
        assert!(!ViewError::NullArgument.is_out_of_range());
    }

    #[test]
    fn test_view_error_converts() {
        let err: PatchKitError = ViewError::NullArgument.into();
        assert!(matches!(err, PatchKitError::View(ViewError::NullArgument)));
        assert!(err.path().is_none());
    }

    #[test]
    fn test_context_keeps_path() {
        let err = PatchKitError::NotFound(PathBuf::from("/missing"))
            .with_context("capturing snapshot");
        assert!(err.to_string().starts_with("capturing snapshot"));
        assert_eq!(err.path().unwrap(), &PathBuf::from("/missing"));
    }

    #[test]
    fn test_with_path() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let err = result.with_path("/a/b").unwrap_err();
        assert!(err.to_string().contains("/a/b"));
    }
}
