use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where a [`crate::repository::Repository`] keeps its files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the working files live in.
    pub working_root: PathBuf,
    /// Name of the archive directory, relative to `working_root`.
    pub archive_dir: String,
    /// Leave the archive on disk when the repository is closed.
    pub keep_archive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_root: PathBuf::from("."),
            archive_dir: String::from(".vcs"),
            keep_archive: false,
        }
    }
}

impl Config {
    pub fn with_working_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.working_root = root.into();
        self
    }

    pub fn with_archive_dir(mut self, dir: impl Into<String>) -> Self {
        self.archive_dir = dir.into();
        self
    }

    pub fn with_keep_archive(mut self, keep: bool) -> Self {
        self.keep_archive = keep;
        self
    }

    pub fn archive_root(&self) -> PathBuf {
        self.working_root.join(&self.archive_dir)
    }
}

#[test]
fn test_archive_root() {
    let config = Config::default().with_working_root("/tmp/work");
    assert_eq!(config.archive_root(), PathBuf::from("/tmp/work/.vcs"));
    let config = config.with_archive_dir("history");
    assert_eq!(config.archive_root(), PathBuf::from("/tmp/work/history"));
}

#[test]
fn test_partial_json() {
    let config: Config = serde_json::from_str(r#"{ "keep_archive": true }"#).unwrap();
    assert!(config.keep_archive);
    assert_eq!(config.archive_dir, ".vcs");
}
