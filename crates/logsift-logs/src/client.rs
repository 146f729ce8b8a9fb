//! Chainable queries over the records of one log file.
//!
//! ```ignore
//! let config = Config::default();
//! let recent_failures = QueryClient::new("production.log", &config)
//!     .errors()?
//!     .by_message("authentication failed")?
//!     .since(&(Utc::now() - Duration::days(1)))?;
//! ```

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use logsift_types::{LineRecord, kind};

use crate::config::Config;
use crate::error::Result;
use crate::filter::MessageMatcher;
use crate::pattern::LinePattern;
use crate::scan;
use crate::source::LogSource;
use crate::timestamp::{parse_timestamp, sort_records};

/// Immutable query over the records of a log file
///
/// Records are read on first use and cached, including a failed read.
/// Every filter returns a new client that owns its own subset and never
/// touches the file again.
#[derive(Clone)]
pub struct QueryClient {
    /// Resolved log file path
    path: PathBuf,

    /// Pattern used for the parse pass
    pattern: LinePattern,

    /// Unset until the first parse; set at construction for derived clients
    records: OnceLock<Result<Vec<LineRecord>>>,
}

impl QueryClient {
    /// Create a client using the config's line pattern
    ///
    /// Does not touch the file.
    pub fn new(source: impl Into<LogSource>, config: &Config) -> Self {
        Self {
            path: config.resolve(source),
            pattern: config.current_line_pattern(),
            records: OnceLock::new(),
        }
    }

    /// Create a client with its own line pattern, overriding the config's
    pub fn with_pattern(source: impl Into<LogSource>, config: &Config, pattern: LinePattern) -> Self {
        Self {
            path: config.resolve(source),
            pattern: config.select_pattern(None, Some(&pattern)),
            records: OnceLock::new(),
        }
    }

    /// Create an already-parsed client over the given records
    pub fn from_records(path: impl Into<PathBuf>, pattern: LinePattern, records: Vec<LineRecord>) -> Self {
        Self {
            path: path.into(),
            pattern,
            records: OnceLock::from(Ok(records)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn line_pattern(&self) -> &LinePattern {
        &self.pattern
    }

    /// Whether records have been loaded (or the load has failed)
    pub fn is_parsed(&self) -> bool {
        self.records.get().is_some()
    }

    /// Get the records, parsing the file on first call
    pub fn records(&self) -> Result<&[LineRecord]> {
        self.records
            .get_or_init(|| scan::scan_file(&self.path, &self.pattern))
            .as_deref()
            .map_err(Clone::clone)
    }

    /// Parse the file again with an explicit pattern, bypassing the cache
    pub fn scan_with(&self, pattern: &LinePattern) -> Result<Vec<LineRecord>> {
        scan::scan_file(&self.path, pattern)
    }

    // ------------------------------------------------------------------
    // Chainable
    // ------------------------------------------------------------------

    pub fn errors(&self) -> Result<Self> {
        self.by_type(kind::ERROR)
    }

    pub fn warnings(&self) -> Result<Self> {
        self.by_type(kind::WARNING)
    }

    pub fn infos(&self) -> Result<Self> {
        self.by_type(kind::INFO)
    }

    /// Keep records whose type is exactly `name`
    pub fn by_type(&self, name: &str) -> Result<Self> {
        self.filtered(|r| r.kind() == Some(name))
    }

    /// Keep records whose prefix is exactly `name`
    pub fn by_prefix(&self, name: &str) -> Result<Self> {
        self.filtered(|r| r.prefix() == Some(name))
    }

    /// Keep records whose message matches
    ///
    /// Plain strings match as case-insensitive substrings; a `Regex` is
    /// used as-is.
    pub fn by_message(&self, matcher: impl Into<MessageMatcher>) -> Result<Self> {
        let matcher = matcher.into();
        self.filtered(|r| matcher.matches(r.message()))
    }

    /// Keep records strictly later than `reference`
    ///
    /// Fails if any record's timestamp cannot be parsed.
    pub fn since<Tz: TimeZone>(&self, reference: &DateTime<Tz>) -> Result<Self> {
        let reference = reference.with_timezone(&Utc);
        let mut kept = Vec::new();
        for record in self.records()? {
            if parse_timestamp(record.timestamp())? > reference {
                kept.push(record.clone());
            }
        }
        Ok(self.derive(kept))
    }

    /// Keep records matching an arbitrary predicate
    pub fn filtered<F>(&self, predicate: F) -> Result<Self>
    where
        F: Fn(&LineRecord) -> bool,
    {
        let kept = self
            .records()?
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        Ok(self.derive(kept))
    }

    /// New client over `records`, keeping this client's path and pattern
    fn derive(&self, records: Vec<LineRecord>) -> Self {
        Self::from_records(self.path.clone(), self.pattern.clone(), records)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Distinct prefixes in order of first appearance
    pub fn prefixes(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        Ok(self
            .records()?
            .iter()
            .filter_map(LineRecord::prefix)
            .filter(|p| seen.insert(*p))
            .map(str::to_string)
            .collect())
    }

    /// Records with duplicate full messages removed, first one kept
    pub fn uniq(&self) -> Result<Vec<LineRecord>> {
        let mut seen = HashSet::new();
        Ok(self
            .records()?
            .iter()
            .filter(|r| seen.insert(r.full_message()))
            .cloned()
            .collect())
    }

    pub fn timestamps(&self) -> Result<Vec<String>> {
        Ok(self.records()?.iter().map(|r| r.timestamp().to_string()).collect())
    }

    pub fn messages(&self) -> Result<Vec<String>> {
        Ok(self.records()?.iter().map(|r| r.message().to_string()).collect())
    }

    /// Rendered form of every record
    pub fn strings(&self) -> Result<Vec<String>> {
        Ok(self.records()?.iter().map(ToString::to_string).collect())
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.records()?.len())
    }

    /// Alias of [`QueryClient::count`]
    pub fn len(&self) -> Result<usize> {
        self.count()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.records()?.is_empty())
    }

    /// Records in ascending time order, ties kept in file order
    pub fn sort(&self) -> Result<Vec<LineRecord>> {
        let mut sorted = self.to_vec()?;
        sort_records(&mut sorted);
        Ok(sorted)
    }

    pub fn to_vec(&self) -> Result<Vec<LineRecord>> {
        Ok(self.records()?.to_vec())
    }
}

/// Lists the rendered records already loaded; never reads the file, so an
/// unparsed or failed client renders as `[]`.
impl fmt::Display for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaded: &[LineRecord] = match self.records.get() {
            Some(Ok(records)) => records.as_slice(),
            _ => &[],
        };
        f.debug_list()
            .entries(loaded.iter().map(ToString::to_string))
            .finish()
    }
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.records.get() {
            None => "unparsed".to_string(),
            Some(Ok(records)) => format!("{} records", records.len()),
            Some(Err(e)) => format!("failed: {}", e),
        };
        f.debug_struct("QueryClient")
            .field("path", &self.path)
            .field("pattern", &self.pattern.as_str())
            .field("records", &state)
            .finish()
    }
}
