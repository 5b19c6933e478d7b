//! Checkpoint updates for items in the active run.
//!
//! A checkpoint is a named approval gate inside a work item's execution.
//! Updating one mutates only the addressed item; run-level cursor and
//! completion state are never touched here.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::core::checkpoint::{CheckpointState, parse_checkpoint_state};
use crate::error::{ForemanError, Result, codes};
use crate::io::config::load_config;
use crate::io::paths::ProjectPaths;
use crate::io::run_log::write_run_log;
use crate::io::state_store::{load_state, write_state};

/// Optional addressing and naming for a checkpoint update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointOptions {
    /// Item to address; defaults to the run's current item.
    pub item_id: Option<String>,
    /// Gate name to stamp on the item.
    pub checkpoint: Option<String>,
}

/// Outcome of a checkpoint update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointOutcome {
    pub item_id: String,
    pub state: CheckpointState,
    pub previous_state: CheckpointState,
    /// Gate name in effect after the update, if any.
    pub checkpoint: Option<String>,
}

/// Set the checkpoint state on an item in the active run.
///
/// The raw state string is normalized against the fixed enumeration;
/// unrecognized input is a validation failure, never a silent default. When
/// no gate name is supplied and none is set yet, entering
/// `awaiting_approval` or `approved` stamps the configured baseline, and
/// entering `awaiting_approval` with no phase set stamps the baseline phase.
pub fn update_checkpoint(
    root: &Path,
    run_id: &str,
    raw_state: &str,
    options: &CheckpointOptions,
) -> Result<CheckpointOutcome> {
    debug!(root = %root.display(), run_id, raw_state, "updating checkpoint");
    if root.as_os_str().is_empty() {
        return Err(ForemanError::new(
            codes::CHECKPOINT_001,
            "root path must not be blank",
            "pass the project root directory",
        ));
    }
    if !root.is_dir() {
        return Err(ForemanError::new(
            codes::CHECKPOINT_001,
            format!("root {} does not exist", root.display()),
            "pass an existing project root directory",
        ));
    }
    if run_id.trim().is_empty() {
        return Err(ForemanError::new(
            codes::CHECKPOINT_002,
            "run id must not be blank",
            "pass the id of the active run",
        ));
    }
    let state = parse_checkpoint_state(raw_state).ok_or_else(|| {
        ForemanError::new(
            codes::CHECKPOINT_003,
            format!("unrecognized checkpoint state '{raw_state}'"),
            "use one of awaiting_approval, approved, none, not_required",
        )
    })?;

    let paths = ProjectPaths::new(root);
    let config = load_config(&paths.config_path)?;
    let mut doc = load_state(&paths.state_path)?;
    let run = match doc.active_run.as_mut() {
        Some(run) => run,
        None => {
            return Err(ForemanError::new(
                codes::RUN_001,
                "no run is active",
                "start one with `foreman start`",
            ));
        }
    };
    if run.id != run_id {
        return Err(ForemanError::new(
            codes::RUN_002,
            format!("active run is {}, not {run_id}", run.id),
            format!("address the active run {}", run.id),
        ));
    }

    let target = match options.item_id.clone().or_else(|| run.current_item.clone()) {
        Some(id) => id,
        None => {
            return Err(ForemanError::new(
                codes::CHECKPOINT_004,
                format!("run {run_id} has no current item to address"),
                "pass an explicit item id",
            ));
        }
    };
    let item = run
        .work_items
        .iter_mut()
        .find(|item| item.id == target)
        .ok_or_else(|| {
            ForemanError::new(
                codes::CHECKPOINT_005,
                format!("item {target} not found in run {run_id}"),
                "address an item that belongs to the active run",
            )
        })?;

    let previous_state = item.checkpoint_state.unwrap_or(CheckpointState::None);
    item.checkpoint_state = Some(state);
    if let Some(name) = &options.checkpoint {
        item.current_checkpoint = Some(name.clone());
    } else if item.current_checkpoint.is_none()
        && matches!(
            state,
            CheckpointState::AwaitingApproval | CheckpointState::Approved
        )
    {
        item.current_checkpoint = Some(config.baseline_checkpoint.clone());
    }
    if state == CheckpointState::AwaitingApproval && item.current_phase.is_none() {
        item.current_phase = Some(config.baseline_phase.clone());
    }
    let checkpoint = item.current_checkpoint.clone();

    let run_snapshot = run.clone();
    write_state(&paths.state_path, &doc)?;
    write_run_log(&paths.run_log_path(run_id), &run_snapshot, None)?;

    info!(run_id, item = %target, state = state.as_str(), "checkpoint updated");
    Ok(CheckpointOutcome {
        item_id: target,
        state,
        previous_state,
        checkpoint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::start::init_run;
    use crate::test_support::{TestProject, item_spec};

    fn project_with_run() -> TestProject {
        let project = TestProject::new().expect("project");
        init_run(
            project.root(),
            &[item_spec("WI-001", "auth"), item_spec("WI-002", "auth")],
            None,
        )
        .expect("init run");
        project
    }

    #[test]
    fn sets_state_on_current_item_with_baseline_defaults() {
        let project = project_with_run();
        let outcome = update_checkpoint(
            project.root(),
            "run-001",
            "awaiting_approval",
            &CheckpointOptions::default(),
        )
        .expect("update");

        assert_eq!(outcome.item_id, "WI-001");
        assert_eq!(outcome.state, CheckpointState::AwaitingApproval);
        assert_eq!(outcome.previous_state, CheckpointState::None);
        assert_eq!(outcome.checkpoint.as_deref(), Some("plan"));

        let doc = project.state().expect("state");
        let run = doc.active_run.expect("active");
        let item = &run.work_items[0];
        assert_eq!(item.checkpoint_state, Some(CheckpointState::AwaitingApproval));
        assert_eq!(item.current_checkpoint.as_deref(), Some("plan"));
        assert_eq!(item.current_phase.as_deref(), Some("planning"));
        // The second item and the run cursor are untouched.
        assert!(run.work_items[1].checkpoint_state.is_none());
        assert_eq!(run.current_item.as_deref(), Some("WI-001"));
    }

    #[test]
    fn accepts_synonyms_after_normalization() {
        let project = project_with_run();
        let outcome = update_checkpoint(
            project.root(),
            "run-001",
            "waiting",
            &CheckpointOptions::default(),
        )
        .expect("update");
        assert_eq!(outcome.state, CheckpointState::AwaitingApproval);

        let outcome = update_checkpoint(
            project.root(),
            "run-001",
            "Pending-Approval",
            &CheckpointOptions::default(),
        )
        .expect("update");
        assert_eq!(outcome.state, CheckpointState::AwaitingApproval);
        assert_eq!(outcome.previous_state, CheckpointState::AwaitingApproval);
    }

    #[test]
    fn rejects_unrecognized_state() {
        let project = project_with_run();
        let err = update_checkpoint(
            project.root(),
            "run-001",
            "perhaps",
            &CheckpointOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, codes::CHECKPOINT_003);
        assert!(err.suggestion.contains("awaiting_approval"));
    }

    #[test]
    fn explicit_item_and_gate_name_override_defaults() {
        let project = project_with_run();
        let outcome = update_checkpoint(
            project.root(),
            "run-001",
            "approved",
            &CheckpointOptions {
                item_id: Some("WI-002".to_string()),
                checkpoint: Some("rollout".to_string()),
            },
        )
        .expect("update");

        assert_eq!(outcome.item_id, "WI-002");
        assert_eq!(outcome.checkpoint.as_deref(), Some("rollout"));

        let doc = project.state().expect("state");
        let run = doc.active_run.expect("active");
        assert_eq!(
            run.work_items[1].current_checkpoint.as_deref(),
            Some("rollout")
        );
        // Approval alone does not stamp a phase.
        assert!(run.work_items[1].current_phase.is_none());
    }

    #[test]
    fn existing_gate_name_is_kept_when_none_supplied() {
        let project = project_with_run();
        update_checkpoint(
            project.root(),
            "run-001",
            "awaiting_approval",
            &CheckpointOptions {
                item_id: None,
                checkpoint: Some("design".to_string()),
            },
        )
        .expect("first update");

        let outcome = update_checkpoint(
            project.root(),
            "run-001",
            "approved",
            &CheckpointOptions::default(),
        )
        .expect("second update");
        assert_eq!(outcome.checkpoint.as_deref(), Some("design"));
        assert_eq!(outcome.previous_state, CheckpointState::AwaitingApproval);
    }

    #[test]
    fn clearing_to_none_does_not_stamp_names() {
        let project = project_with_run();
        let outcome = update_checkpoint(
            project.root(),
            "run-001",
            "none",
            &CheckpointOptions::default(),
        )
        .expect("update");
        assert_eq!(outcome.state, CheckpointState::None);
        assert_eq!(outcome.checkpoint, None);

        let doc = project.state().expect("state");
        let item = &doc.active_run.expect("active").work_items[0];
        assert!(item.current_checkpoint.is_none());
        assert!(item.current_phase.is_none());
    }

    #[test]
    fn fails_without_current_item_or_override() {
        let project = project_with_run();
        let mut doc = project.state().expect("state");
        if let Some(run) = doc.active_run.as_mut() {
            run.current_item = None;
        }
        project.write_state(&doc).expect("rewrite");

        let err = update_checkpoint(
            project.root(),
            "run-001",
            "approved",
            &CheckpointOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, codes::CHECKPOINT_004);
    }

    #[test]
    fn fails_on_unknown_item() {
        let project = project_with_run();
        let err = update_checkpoint(
            project.root(),
            "run-001",
            "approved",
            &CheckpointOptions {
                item_id: Some("WI-404".to_string()),
                checkpoint: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.code, codes::CHECKPOINT_005);
    }

    #[test]
    fn fails_without_active_run() {
        let project = TestProject::new().expect("project");
        let err = update_checkpoint(
            project.root(),
            "run-001",
            "approved",
            &CheckpointOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, codes::RUN_001);
    }
}
