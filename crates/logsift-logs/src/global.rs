//! Process-wide default configuration.
//!
//! Convenience for applications that want one shared [`Config`]. Nothing
//! else in this crate reads it; clients built elsewhere take their config
//! explicitly. Writes are last-writer-wins.

use parking_lot::RwLock;
use std::sync::LazyLock;

use crate::client::QueryClient;
use crate::config::Config;
use crate::pattern::LinePattern;
use crate::source::LogSource;

static GLOBAL: LazyLock<RwLock<Config>> = LazyLock::new(|| RwLock::new(Config::default()));

/// Mutate the shared config
pub fn configure<R>(f: impl FnOnce(&mut Config) -> R) -> R {
    f(&mut GLOBAL.write())
}

/// The shared config's pattern, or the built-in default
pub fn current_line_pattern() -> LinePattern {
    GLOBAL.read().current_line_pattern()
}

/// Clear every override on the shared config
pub fn reset() {
    GLOBAL.write().reset();
}

/// Copy of the shared config
pub fn snapshot() -> Config {
    GLOBAL.read().clone()
}

/// Create a query client using the shared config
pub fn open(source: impl Into<LogSource>) -> QueryClient {
    QueryClient::new(source, &GLOBAL.read())
}
