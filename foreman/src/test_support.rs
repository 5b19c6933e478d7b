//! Test-only helpers for constructing projects and bolts.

use std::path::Path;

use anyhow::Result;

use crate::core::bolt::{Bolt, BoltStatus};
use crate::error;
use crate::io::init::{InitOptions, init_project};
use crate::io::paths::ProjectPaths;
use crate::io::state_store::{load_state, write_state};
use crate::model::StateDocument;
use crate::start::WorkItemSpec;

/// A scaffolded project in a temporary directory.
pub struct TestProject {
    temp: tempfile::TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        init_project(temp.path(), &InitOptions { force: false })?;
        Ok(Self { temp })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths::new(self.root())
    }

    pub fn state(&self) -> error::Result<StateDocument> {
        load_state(&self.paths().state_path)
    }

    pub fn write_state(&self, doc: &StateDocument) -> error::Result<()> {
        write_state(&self.paths().state_path, doc)
    }
}

/// Create a work-item spec with the default autopilot mode.
pub fn item_spec(id: &str, intent: &str) -> WorkItemSpec {
    WorkItemSpec {
        id: id.to_string(),
        intent: intent.to_string(),
        mode: "autopilot".to_string(),
    }
}

/// Create a bolt with explicit status and requirement edges.
pub fn bolt(id: &str, status: BoltStatus, requires: &[&str]) -> Bolt {
    Bolt {
        id: id.to_string(),
        status,
        requires: requires.iter().map(|req| (*req).to_string()).collect(),
    }
}
