//! Canonical `.foreman/` path layout for a project root.

use std::path::{Path, PathBuf};

/// All foreman-owned paths under a project root.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub foreman_dir: PathBuf,
    pub state_path: PathBuf,
    pub config_path: PathBuf,
    pub runs_dir: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let foreman_dir = root.join(".foreman");
        Self {
            state_path: foreman_dir.join("state.yaml"),
            config_path: foreman_dir.join("config.toml"),
            runs_dir: foreman_dir.join("runs"),
            foreman_dir,
            root,
        }
    }

    /// Directory holding a single run's artifacts.
    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.runs_dir.join(run_id)
    }

    /// The human-readable run log for a run.
    pub fn run_log_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id).join("RUN.md")
    }
}
