//! Log parsing and querying for logsift
//!
//! This crate provides line patterns, the parse pass, configuration and the
//! chainable query client.

mod client;
mod config;
mod error;
mod filter;
pub mod global;
mod pattern;
mod scan;
mod source;
mod timestamp;

pub use client::QueryClient;
pub use config::{Config, LOG_DIR_ENV};
pub use error::{Error, Result};
pub use filter::MessageMatcher;
pub use pattern::{LinePattern, PatternPreset};
pub use scan::{scan_file, scan_reader};
pub use source::LogSource;
pub use timestamp::{parse_timestamp, sort_records};

// Re-export types used in our public API
pub use logsift_types::{LineRecord, kind};
