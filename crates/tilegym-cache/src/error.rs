//! Error types for the level cache.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors from cache storage and bookkeeping.
#[derive(Debug)]
pub enum CacheError {
    /// A file operation failed.
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// A slot file could not be decoded.
    Corrupt {
        /// The offending file.
        path: PathBuf,
        /// What is wrong with it.
        detail: String,
    },
    /// The slot holds no level.
    MissingSlot {
        /// The empty slot.
        slot: usize,
    },
    /// A builder parameter is out of range.
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error on {}: {source}", path.display()),
            Self::Corrupt { path, detail } => {
                write!(f, "corrupt level file {}: {detail}", path.display())
            }
            Self::MissingSlot { slot } => write!(f, "cache slot {slot} is empty"),
            Self::InvalidConfig { reason } => write!(f, "invalid cache config: {reason}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
