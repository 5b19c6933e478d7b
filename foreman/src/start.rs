//! Orchestration for creating a new run.
//!
//! A run is a single execution session over an ordered list of work items.
//! Creation validates its inputs before touching storage, derives the next
//! run id from every known numbering source, persists the active run, and
//! writes the companion run log.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ForemanError, Result, codes};
use crate::io::config::load_config;
use crate::io::now_rfc3339;
use crate::io::paths::ProjectPaths;
use crate::io::run_log::write_run_log;
use crate::io::state_store::{load_state, write_state};
use crate::model::{ItemStatus, Mode, Run, RunHistoryEntry, Scope, WorkItem};

/// Caller-supplied description of one work item. The mode arrives as a raw
/// string and is validated here, not at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItemSpec {
    pub id: String,
    pub intent: String,
    pub mode: String,
}

/// Outcome of run creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitRunOutcome {
    pub run_id: String,
    pub run_dir: PathBuf,
    pub scope: Scope,
    pub work_items: Vec<WorkItem>,
    pub current_item: String,
    pub started: String,
}

/// Create a new run over `items`.
///
/// Rejects, in order: blank or nonexistent root, an empty item list, items
/// missing id or intent, invalid modes, and an already-active run. The first
/// item starts `in_progress`, the rest `pending`.
pub fn init_run(
    root: &Path,
    items: &[WorkItemSpec],
    scope_override: Option<Scope>,
) -> Result<InitRunOutcome> {
    debug!(root = %root.display(), items = items.len(), "creating run");
    if root.as_os_str().is_empty() {
        return Err(ForemanError::new(
            codes::INIT_001,
            "root path must not be blank",
            "pass the project root directory",
        ));
    }
    if !root.is_dir() {
        return Err(ForemanError::new(
            codes::INIT_002,
            format!("root {} does not exist", root.display()),
            "pass an existing project root directory",
        ));
    }
    if items.is_empty() {
        return Err(ForemanError::new(
            codes::INIT_003,
            "a run needs at least one work item",
            "pass one or more work items",
        ));
    }
    let modes = validate_items(items)?;

    let paths = ProjectPaths::new(root);
    let config = load_config(&paths.config_path)?;
    let mut doc = load_state(&paths.state_path)?;
    if let Some(active) = &doc.active_run {
        return Err(ForemanError::new(
            codes::INIT_007,
            format!("run {} is already active", active.id),
            format!("complete run {} before starting another", active.id),
        ));
    }

    let scope = scope_override.unwrap_or(if items.len() == 1 {
        Scope::Single
    } else {
        Scope::Batch
    });
    let run_id = next_run_id(&paths.runs_dir, &doc.runs.completed, config.run_id_width)?;
    let started = now_rfc3339();

    let work_items: Vec<WorkItem> = items
        .iter()
        .zip(modes)
        .enumerate()
        .map(|(index, (spec, mode))| WorkItem {
            id: spec.id.clone(),
            intent: spec.intent.clone(),
            mode,
            status: if index == 0 {
                ItemStatus::InProgress
            } else {
                ItemStatus::Pending
            },
            checkpoint_state: None,
            current_checkpoint: None,
            current_phase: None,
            run_id: None,
        })
        .collect();
    let current_item = work_items[0].id.clone();

    let run = Run {
        id: run_id.clone(),
        scope,
        work_items: work_items.clone(),
        current_item: Some(current_item.clone()),
        started: started.clone(),
        completed: None,
    };
    doc.active_run = Some(run.clone());
    write_state(&paths.state_path, &doc)?;
    write_run_log(&paths.run_log_path(&run_id), &run, None)?;

    info!(run_id = %run_id, scope = scope.as_str(), "run created");
    Ok(InitRunOutcome {
        run_dir: paths.run_dir(&run_id),
        run_id,
        scope,
        work_items,
        current_item,
        started,
    })
}

fn validate_items(items: &[WorkItemSpec]) -> Result<Vec<Mode>> {
    items
        .iter()
        .map(|spec| {
            if spec.id.trim().is_empty() {
                return Err(ForemanError::new(
                    codes::INIT_004,
                    "work item is missing an id",
                    "give every work item a non-blank id",
                ));
            }
            if spec.intent.trim().is_empty() {
                return Err(ForemanError::new(
                    codes::INIT_005,
                    format!("work item {} is missing an intent", spec.id),
                    "give every work item the intent it belongs to",
                ));
            }
            Mode::parse(&spec.mode).ok_or_else(|| {
                ForemanError::new(
                    codes::INIT_006,
                    format!("work item {} has invalid mode '{}'", spec.id, spec.mode),
                    "use one of autopilot, confirm, validate",
                )
            })
        })
        .collect()
}

/// Derive the next run id from the maximum numeric suffix across run
/// directories on disk and completed-run history, plus one.
///
/// Numbering tolerates gaps and must never collide, so neither source is
/// trusted alone.
fn next_run_id(runs_dir: &Path, history: &[RunHistoryEntry], width: usize) -> Result<String> {
    let mut max = 0u32;
    if runs_dir.is_dir() {
        let entries = fs::read_dir(runs_dir).map_err(|err| {
            ForemanError::new(
                codes::STATE_003,
                format!("read runs directory {}: {err}", runs_dir.display()),
                "check permissions under .foreman/",
            )
        })?;
        for entry in entries {
            let entry = entry.map_err(|err| {
                ForemanError::new(
                    codes::STATE_003,
                    format!("read runs directory {}: {err}", runs_dir.display()),
                    "check permissions under .foreman/",
                )
            })?;
            if let Some(number) = run_number(&entry.file_name().to_string_lossy()) {
                max = max.max(number);
            }
        }
    }
    for entry in history {
        if let Some(number) = run_number(&entry.id) {
            max = max.max(number);
        }
    }
    Ok(format!("run-{:0width$}", max + 1))
}

fn run_number(id: &str) -> Option<u32> {
    id.strip_prefix("run-")?.parse().ok()
}
