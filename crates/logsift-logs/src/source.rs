use std::path::{Path, PathBuf};

/// Where a query client reads its lines from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogSource {
    /// Bare file name, looked up in the configured log directory
    Name(String),

    /// Already-resolved path, used unchanged
    Path(PathBuf),
}

impl LogSource {
    /// Resolve against a log directory
    pub fn resolve(&self, log_dir: &Path) -> PathBuf {
        match self {
            Self::Name(name) => log_dir.join(name),
            Self::Path(path) => path.clone(),
        }
    }
}

impl From<&str> for LogSource {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for LogSource {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&Path> for LogSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for LogSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&PathBuf> for LogSource {
    fn from(path: &PathBuf) -> Self {
        Self::Path(path.clone())
    }
}
