//! Error types for log parsing and querying.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors are `Clone` so a failed lazy parse can be handed out again on
/// every later access to the same client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("Invalid line pattern `{pattern}`: {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Line pattern `{pattern}` has {groups} capture groups, expected at least 6")]
    PatternSlots { pattern: String, groups: usize },

    #[error("Log source not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Log source unreadable: {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("Invalid timestamp `{value}`: {source}")]
    TimestampParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Classify an I/O failure on a log source
    pub(crate) fn source_io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::SourceNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::SourceUnreadable {
                path: path.to_path_buf(),
                source: Arc::new(err),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
