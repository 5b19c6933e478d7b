//! Project scaffolding for `.foreman/`.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{ForemanError, Result, codes};
use crate::io::config::{ForemanConfig, write_config};
use crate::io::paths::ProjectPaths;
use crate::io::state_store::write_state;
use crate::model::StateDocument;

/// Options for `init_project`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite existing foreman-owned files.
    pub force: bool,
}

/// Create `.foreman/` scaffolding in `root`: an empty state document, default
/// config, and the runs directory.
///
/// Fails if `.foreman/` already exists unless `options.force` is set.
pub fn init_project(root: &Path, options: &InitOptions) -> Result<ProjectPaths> {
    let paths = ProjectPaths::new(root);
    if paths.foreman_dir.exists() && !options.force {
        return Err(ForemanError::new(
            codes::STATE_005,
            format!("{} already exists", paths.foreman_dir.display()),
            "pass --force to overwrite the existing scaffolding",
        ));
    }

    create_dir(&paths.foreman_dir)?;
    create_dir(&paths.runs_dir)?;
    write_state(&paths.state_path, &StateDocument::default())?;
    write_config(&paths.config_path, &ForemanConfig::default())?;

    info!(root = %root.display(), "project initialized");
    Ok(paths)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|err| {
        ForemanError::new(
            codes::STATE_003,
            format!("create directory {}: {err}", path.display()),
            "check permissions on the project root",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::state_store::load_state;

    #[test]
    fn init_creates_expected_layout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = init_project(temp.path(), &InitOptions { force: false }).expect("init");

        assert!(paths.foreman_dir.is_dir());
        assert!(paths.runs_dir.is_dir());
        assert!(paths.state_path.is_file());
        assert!(paths.config_path.is_file());

        let doc = load_state(&paths.state_path).expect("load");
        assert!(doc.intents.is_empty());
        assert!(doc.active_run.is_none());
        assert!(doc.runs.completed.is_empty());
    }

    #[test]
    fn init_without_force_refuses_existing_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        init_project(temp.path(), &InitOptions { force: false }).expect("init");
        let err = init_project(temp.path(), &InitOptions { force: false }).unwrap_err();
        assert_eq!(err.code, codes::STATE_005);
        assert!(err.message.contains("already exists"));
    }

    #[test]
    fn init_with_force_resets_state() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = init_project(temp.path(), &InitOptions { force: false }).expect("init");
        fs::write(&paths.state_path, "intents: [{id: custom}]\n").expect("write custom");

        init_project(temp.path(), &InitOptions { force: true }).expect("re-init");
        let doc = load_state(&paths.state_path).expect("load");
        assert!(doc.intents.is_empty());
    }
}
