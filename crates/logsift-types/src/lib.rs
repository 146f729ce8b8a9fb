//! Shared types for logsift
//!
//! This crate contains the record model produced by the line parser and
//! consumed by the query layer.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Record Types
// ============================================================================

/// Labels produced by the built-in line patterns
pub mod kind {
    pub const ERROR: &str = "ERROR";
    pub const WARNING: &str = "WARNING";
    pub const INFO: &str = "INFO";
}

/// A single parsed log line
///
/// Only built from a line that matched the active line pattern, so the
/// timestamp and message are always present. Equality covers all four
/// fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRecord {
    /// Timestamp text exactly as captured (ISO-8601 style)
    timestamp: String,

    /// Severity label such as `ERROR`, if the line carried one
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,

    /// Context label such as an entity identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,

    /// Remaining line content
    message: String,
}

impl LineRecord {
    pub fn new(
        timestamp: impl Into<String>,
        kind: Option<String>,
        prefix: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            kind,
            prefix,
            message: message.into(),
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The severity label (`type` in the rendered form)
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prefix-qualified message, `[prefix] message` or just `message`
    ///
    /// Used as the key when deduplicating records.
    pub fn full_message(&self) -> Cow<'_, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("[{}] {}", prefix, self.message)),
            None => Cow::Borrowed(&self.message),
        }
    }
}

impl fmt::Display for LineRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.timestamp)?;
        if let Some(kind) = &self.kind {
            write!(f, "{}: ", kind)?;
        }
        if let Some(prefix) = &self.prefix {
            write!(f, "[{}] ", prefix)?;
        }
        f.write_str(&self.message)
    }
}
