use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::constants::{DATA_DIR_NAME, RESULT_DIR_NAME};

/// Input and output directories of one run, rooted at a base directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub base_dir: PathBuf,
    pub data_dir: PathBuf,
    pub result_dir: PathBuf,
}

impl Workspace {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        Self {
            data_dir: base_dir.join(DATA_DIR_NAME),
            result_dir: base_dir.join(RESULT_DIR_NAME),
            base_dir,
        }
    }

    /// Creates the data and result directories if they are missing.
    pub fn setup(base_dir: impl AsRef<Path>) -> io::Result<Self> {
        let workspace = Self::new(base_dir);
        for dir in [&workspace.data_dir, &workspace.result_dir] {
            fs::create_dir_all(dir)?;
            debug!(dir = %dir.display(), "directory ready");
        }
        Ok(workspace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn setup_creates_directories_idempotently() {
        let tmp = TempDir::new().unwrap();
        let workspace = Workspace::setup(tmp.path()).unwrap();
        assert!(workspace.data_dir.is_dir());
        assert!(workspace.result_dir.is_dir());
        assert_eq!(workspace.data_dir, tmp.path().join("data"));
        assert_eq!(Workspace::setup(tmp.path()).unwrap(), workspace);
    }
}
