//! Centralized error types for mboxfreq.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::toc::TocEntry;

/// All errors produced by the mboxfreq library.
#[derive(Error, Debug)]
pub enum MboxError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("MBOX file not found: {0}")]
    FileNotFound(PathBuf),

    /// The path exists but is not a regular file.
    #[error("path '{0}' is not a file")]
    NotAFile(PathBuf),

    /// The bytes of one TOC entry could not be read back.
    #[error(
        "Cannot read message #{ordinal} at offset {offset}: {source}",
        ordinal = .entry.ordinal,
        offset = .entry.start
    )]
    MessageRead {
        entry: TocEntry,
        source: std::io::Error,
    },

    /// A header value could not be interpreted.
    #[error("Invalid '{name}' header: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// No sender exceeded the reporting threshold.
    #[error("no matches! no single sender sent you over {threshold}")]
    NoQualifyingSenders { threshold: u64 },

    /// An error record could not be written to the error log.
    #[error("Cannot append to error log '{path}': {source}")]
    ErrorLog {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias for `Result<T, MboxError>`.
pub type Result<T> = std::result::Result<T, MboxError>;

impl MboxError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Map an `open`/`metadata` failure, singling out a missing file.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::io(path, source)
        }
    }
}

/// Allow `?` on `std::io::Error` inside functions returning `MboxError`
/// when no path context is available (rare, prefer `MboxError::io`).
impl From<std::io::Error> for MboxError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_maps_not_found() {
        let err = MboxError::open(
            "/nope.mbox",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, MboxError::FileNotFound(_)));
    }

    #[test]
    fn test_open_keeps_other_io_errors() {
        let err = MboxError::open(
            "/locked.mbox",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, MboxError::Io { .. }));
        assert!(err.to_string().contains("/locked.mbox"));
    }
}
