//! Batch-incremental completion of the current work item.
//!
//! Completing the current item advances the run cursor to the next pending
//! item. The run itself stays active until it is explicitly finalized, even
//! when every item has been completed.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ForemanError, Result, codes};
use crate::io::paths::ProjectPaths;
use crate::io::run_log::write_run_log;
use crate::io::state_store::{load_state, write_state};
use crate::model::ItemStatus;

/// Outcome of completing the current item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvanceOutcome {
    pub completed_item: String,
    pub next_item: Option<String>,
    /// Items not yet completed after this call.
    pub remaining: usize,
    pub all_items_completed: bool,
}

/// Mark the active run's current item completed and advance the cursor.
///
/// Does not clear the active run and does not touch history; the run remains
/// open until finalized.
pub fn complete_current_item(root: &Path, run_id: &str) -> Result<AdvanceOutcome> {
    debug!(root = %root.display(), run_id, "completing current item");
    validate_target(root, run_id)?;

    let paths = ProjectPaths::new(root);
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
    let current = match run.current_item.clone() {
        Some(id) => id,
        None => {
            return Err(ForemanError::new(
                codes::RUN_003,
                format!("run {run_id} has no current item"),
                "every item is already completed; finalize with `foreman complete-run`",
            ));
        }
    };

    let index = run
        .work_items
        .iter()
        .position(|item| item.id == current)
        .ok_or_else(|| {
            ForemanError::new(
                codes::RUN_004,
                format!("current item {current} not found in run {run_id}"),
                "the state document is inconsistent; inspect .foreman/state.yaml",
            )
        })?;
    run.work_items[index].status = ItemStatus::Completed;

    let next_item = run
        .work_items
        .iter_mut()
        .find(|item| item.status == ItemStatus::Pending)
        .map(|item| {
            item.status = ItemStatus::InProgress;
            item.id.clone()
        });
    run.current_item = next_item.clone();

    let remaining = run
        .work_items
        .iter()
        .filter(|item| item.status != ItemStatus::Completed)
        .count();
    let run_snapshot = run.clone();
    write_state(&paths.state_path, &doc)?;
    write_run_log(&paths.run_log_path(run_id), &run_snapshot, None)?;

    info!(run_id, completed = %current, next = ?next_item, "item completed");
    Ok(AdvanceOutcome {
        completed_item: current,
        all_items_completed: next_item.is_none(),
        next_item,
        remaining,
    })
}

pub(crate) fn validate_target(root: &Path, run_id: &str) -> Result<()> {
    if root.as_os_str().is_empty() {
        return Err(ForemanError::new(
            codes::COMPLETE_001,
            "root path must not be blank",
            "pass the project root directory",
        ));
    }
    if !root.is_dir() {
        return Err(ForemanError::new(
            codes::COMPLETE_002,
            format!("root {} does not exist", root.display()),
            "pass an existing project root directory",
        ));
    }
    if run_id.trim().is_empty() {
        return Err(ForemanError::new(
            codes::COMPLETE_003,
            "run id must not be blank",
            "pass the id of the active run",
        ));
    }
    Ok(())
}
