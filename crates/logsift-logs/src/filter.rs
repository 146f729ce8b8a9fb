use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};

/// How `by_message` decides whether a message matches
#[derive(Clone)]
pub enum MessageMatcher {
    /// Case-insensitive substring
    Text {
        /// Original text
        text: String,
        /// Lowercased `text`, compared against the lowercased message
        needle: String,
    },

    /// Regex used exactly as supplied
    Pattern(Regex),
}

impl MessageMatcher {
    /// Case-insensitive literal substring match
    pub fn text(text: &str) -> Self {
        Self::Text {
            text: text.to_string(),
            needle: text.to_lowercase(),
        }
    }

    /// Compile `pattern` as a case-insensitive regex
    pub fn regex_ignore_case(pattern: &str) -> Result<Self> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self::Pattern)
            .map_err(|source| Error::PatternCompile {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Compile `pattern` with case sensitivity as written in it
    pub fn regex(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|source| Error::PatternCompile {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Check if a message matches
    pub fn matches(&self, message: &str) -> bool {
        match self {
            Self::Text { needle, .. } => message.to_lowercase().contains(needle.as_str()),
            Self::Pattern(regex) => regex.is_match(message),
        }
    }
}

impl From<&str> for MessageMatcher {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for MessageMatcher {
    fn from(text: String) -> Self {
        Self::text(&text)
    }
}

impl From<Regex> for MessageMatcher {
    fn from(regex: Regex) -> Self {
        Self::Pattern(regex)
    }
}

impl From<&Regex> for MessageMatcher {
    fn from(regex: &Regex) -> Self {
        Self::Pattern(regex.clone())
    }
}

impl std::fmt::Debug for MessageMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text { text, .. } => f.debug_tuple("Text").field(text).finish(),
            Self::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
        }
    }
}
