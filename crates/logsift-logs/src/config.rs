//! Configuration for logsift.
//!
//! Log directory resolution order:
//! 1. Explicit directory set on the config (or `log_dir` in a config file)
//! 2. `LOGSIFT_LOG_DIR` environment variable
//! 3. Default: `<current dir>/log`
//!
//! Line pattern resolution order is described on [`Config::select_pattern`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::client::QueryClient;
use crate::error::{Error, Result};
use crate::pattern::{LinePattern, PatternPreset};
use crate::source::LogSource;

/// Environment variable overriding the default log directory
pub const LOG_DIR_ENV: &str = "LOGSIFT_LOG_DIR";

/// Parser configuration passed to each query client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Pattern override; `None` means the built-in default
    line_pattern: Option<LinePattern>,

    /// Directory bare log names are resolved against
    log_dir: PathBuf,
}

/// On-disk shape of a config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    log_dir: Option<PathBuf>,
    preset: Option<PatternPreset>,
    line_pattern: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_pattern: None,
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config resolving bare names against `log_dir`.
    pub fn with_log_dir(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            line_pattern: None,
            log_dir: log_dir.into(),
        }
    }

    /// Load a TOML config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse config from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        let mut config = match file.log_dir {
            Some(dir) => Self::with_log_dir(dir),
            None => Self::default(),
        };

        match (file.line_pattern, file.preset) {
            (Some(pattern), preset) => {
                if let Some(preset) = preset {
                    tracing::warn!(%preset, "config sets both line_pattern and preset, using line_pattern");
                }
                config.set_line_pattern(&pattern)?;
            }
            (None, Some(preset)) => config.set_line_pattern_preset(preset),
            (None, None) => {}
        }

        Ok(config)
    }

    /// Apply a mutation and hand back whatever it returns.
    ///
    /// ```ignore
    /// config.configure(|c| c.set_line_pattern(r"..."))?;
    /// ```
    pub fn configure<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        f(self)
    }

    /// Compile and install a custom line pattern.
    ///
    /// On failure the previous pattern stays active.
    pub fn set_line_pattern(&mut self, pattern: &str) -> Result<()> {
        self.line_pattern = Some(LinePattern::new(pattern)?);
        Ok(())
    }

    pub fn set_line_pattern_preset(&mut self, preset: PatternPreset) {
        self.line_pattern = Some(LinePattern::preset(preset));
    }

    pub fn with_line_pattern(mut self, pattern: LinePattern) -> Self {
        self.line_pattern = Some(pattern);
        self
    }

    /// The explicitly configured pattern, if any
    pub fn line_pattern_override(&self) -> Option<&LinePattern> {
        self.line_pattern.as_ref()
    }

    /// The configured pattern, or the built-in default
    pub fn current_line_pattern(&self) -> LinePattern {
        self.line_pattern.clone().unwrap_or_default()
    }

    /// Pick the pattern for a parse.
    ///
    /// An explicit per-call pattern wins over an instance override, which
    /// wins over this config's override, which wins over the default.
    pub fn select_pattern(
        &self,
        per_call: Option<&LinePattern>,
        instance: Option<&LinePattern>,
    ) -> LinePattern {
        per_call
            .or(instance)
            .cloned()
            .unwrap_or_else(|| self.current_line_pattern())
    }

    /// Drop every override and return to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn set_log_dir(&mut self, log_dir: impl Into<PathBuf>) {
        self.log_dir = log_dir.into();
    }

    /// Resolve a log source to a concrete path.
    pub fn resolve(&self, source: impl Into<LogSource>) -> PathBuf {
        source.into().resolve(&self.log_dir)
    }

    /// Create a query client for `source` with this config's pattern.
    pub fn open(&self, source: impl Into<LogSource>) -> QueryClient {
        QueryClient::new(source, self)
    }
}

/// Resolve the default log directory.
fn default_log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(LOG_DIR_ENV) {
        return PathBuf::from(dir);
    }

    std::env::current_dir()
        .map(|cwd| cwd.join("log"))
        .unwrap_or_else(|_| PathBuf::from("log"))
}
