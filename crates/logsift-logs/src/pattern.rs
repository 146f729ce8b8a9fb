use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use logsift_types::LineRecord;

use crate::error::{Error, Result};

/// Capture group holding the timestamp
const TIMESTAMP_SLOT: usize = 1;
/// Capture group holding the severity label
const KIND_SLOT: usize = 3;
/// Capture group holding the prefix
const PREFIX_SLOT: usize = 5;
/// Capture group holding the message
const MESSAGE_SLOT: usize = 6;

/// `[2014-11-13T23:12:18-07:00] ERROR: [page_id 95239] Failed to save`
const GENERIC: &str = concat!(
    r"^\[(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?)\]",
    r"(\s(\w+):)?",
    r"(\s\[(.+?)\])?",
    r"\s(.+)$",
);

/// `E, [2014-11-13T23:12:18.123456 #4211] ERROR -- page_id 95239: Failed to save`
///
/// The layout of Ruby's `Logger` default formatter. An empty progname
/// (`-- : message`) leaves the prefix absent.
const SEVERITY_CHAR: &str = concat!(
    r"^[A-Z], \[(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?) #\d+\]\s+",
    r"((\w+) -- )?",
    r"(([^:]*?): )?",
    r"(.+)$",
);

static GENERIC_PATTERN: LazyLock<LinePattern> = LazyLock::new(|| {
    LinePattern::new(GENERIC).expect("built-in generic line pattern compiles")
});

static SEVERITY_CHAR_PATTERN: LazyLock<LinePattern> = LazyLock::new(|| {
    LinePattern::new(SEVERITY_CHAR).expect("built-in severity-char line pattern compiles")
});

/// Compiled line matcher with a fixed capture layout
///
/// Group 1 is the timestamp, 3 the type, 5 the prefix and 6 the message.
/// Groups 2 and 4 wrap the optional segments together with their
/// punctuation, so only the inner values end up on the record.
#[derive(Clone)]
pub struct LinePattern {
    regex: Regex,
}

impl LinePattern {
    /// Compile a custom pattern
    ///
    /// Fails if the pattern is not a valid regex or does not expose all
    /// six capture groups.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| Error::PatternCompile {
            pattern: pattern.to_string(),
            source,
        })?;

        // captures_len counts the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if groups < MESSAGE_SLOT {
            return Err(Error::PatternSlots {
                pattern: pattern.to_string(),
                groups,
            });
        }

        Ok(Self { regex })
    }

    /// `[timestamp] TYPE: [prefix] message`
    pub fn generic() -> Self {
        GENERIC_PATTERN.clone()
    }

    /// `S, [timestamp #pid] TYPE -- prefix: message`
    pub fn severity_char() -> Self {
        SEVERITY_CHAR_PATTERN.clone()
    }

    pub fn preset(preset: PatternPreset) -> Self {
        match preset {
            PatternPreset::Generic => Self::generic(),
            PatternPreset::SeverityChar => Self::severity_char(),
        }
    }

    /// Decompose one line, or `None` if it does not match
    ///
    /// A line where the timestamp or message group did not participate is
    /// treated as a non-match. Empty type or prefix captures count as absent.
    pub fn parse_line(&self, line: &str) -> Option<LineRecord> {
        let caps = self.regex.captures(line)?;
        let timestamp = caps.get(TIMESTAMP_SLOT)?.as_str();
        let message = caps.get(MESSAGE_SLOT)?.as_str();

        let optional = |slot: usize| {
            caps.get(slot)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(LineRecord::new(
            timestamp,
            optional(KIND_SLOT),
            optional(PREFIX_SLOT),
            message,
        ))
    }

    /// Get the pattern source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for LinePattern {
    fn default() -> Self {
        Self::generic()
    }
}

impl FromStr for LinePattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl PartialEq for LinePattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for LinePattern {}

impl fmt::Debug for LinePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LinePattern").field(&self.as_str()).finish()
    }
}

/// Built-in line layouts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternPreset {
    #[default]
    Generic,
    SeverityChar,
}

impl PatternPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::SeverityChar => "severity_char",
        }
    }
}

impl FromStr for PatternPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "generic" => Ok(Self::Generic),
            "severity_char" => Ok(Self::SeverityChar),
            other => Err(Error::Config(format!("unknown pattern preset: {}", other))),
        }
    }
}

impl fmt::Display for PatternPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
