//! Run finalization.
//!
//! Finalization is the only operation that closes a run: it completes every
//! work item, mirrors the durable status into the owning intents, appends the
//! immutable history entry, and clears the active run, all inside one atomic
//! state-document write. The run log is rewritten afterwards with the
//! finalization sections and summary.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::advance::validate_target;
use crate::error::{ForemanError, Result, codes};
use crate::io::now_rfc3339;
use crate::io::paths::ProjectPaths;
use crate::io::run_log::{CompletionReport, write_run_log};
use crate::io::state_store::{load_state, write_state};
use crate::model::{
    HistoryItem, Intent, IntentItem, ItemStatus, RunHistoryEntry, Scope, StateDocument, WorkItem,
};

/// Optional finalization details. Everything defaults to zero or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompleteRunParams {
    pub files_created: Vec<String>,
    pub files_modified: Vec<String>,
    pub decisions: Vec<String>,
    pub tests_added: u32,
    pub coverage_percent: u32,
}

/// Outcome of run finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompleteRunOutcome {
    pub success: bool,
    pub run_id: String,
    pub scope: Scope,
    pub items_completed: usize,
    pub completed: String,
    pub files_created: usize,
    pub files_modified: usize,
    pub tests_added: u32,
    pub coverage_percent: u32,
}

/// Finalize the active run.
///
/// Every work item is marked completed and stamped with the finalizing run
/// id, regardless of prior partial progress. History gains at most one entry
/// per run id.
pub fn complete_run(
    root: &Path,
    run_id: &str,
    params: &CompleteRunParams,
) -> Result<CompleteRunOutcome> {
    debug!(root = %root.display(), run_id, "finalizing run");
    validate_target(root, run_id)?;

    let paths = ProjectPaths::new(root);
    let mut doc = load_state(&paths.state_path)?;
    // Taking the run clears `active_run`; the mirror, history append, and
    // clear all land in the single write below. Nothing is written on the
    // error paths, so a mismatch leaves the document untouched.
    let mut run = match doc.active_run.take() {
        None => {
            return Err(ForemanError::new(
                codes::RUN_001,
                "no run is active",
                "start one with `foreman start`",
            ));
        }
        Some(run) if run.id != run_id => {
            return Err(ForemanError::new(
                codes::RUN_002,
                format!("active run is {}, not {run_id}", run.id),
                format!("address the active run {}", run.id),
            ));
        }
        Some(run) => run,
    };
    let completed_at = now_rfc3339();
    for item in &mut run.work_items {
        item.status = ItemStatus::Completed;
        item.run_id = Some(run_id.to_string());
    }
    run.current_item = None;
    run.completed = Some(completed_at.clone());

    mirror_into_intents(&mut doc, &run.work_items, run_id);

    let already_recorded = doc.runs.completed.iter().any(|entry| entry.id == run_id);
    if !already_recorded {
        doc.runs.completed.push(RunHistoryEntry {
            id: run.id.clone(),
            scope: run.scope,
            work_items: run
                .work_items
                .iter()
                .map(|item| HistoryItem {
                    id: item.id.clone(),
                    intent: item.intent.clone(),
                    mode: item.mode,
                })
                .collect(),
            completed: completed_at.clone(),
        });
    }
    write_state(&paths.state_path, &doc)?;

    let report = CompletionReport {
        files_created: params.files_created.clone(),
        files_modified: params.files_modified.clone(),
        decisions: params.decisions.clone(),
        tests_added: params.tests_added,
        coverage_percent: params.coverage_percent,
    };
    write_run_log(&paths.run_log_path(run_id), &run, Some(&report))?;

    info!(run_id, items = run.work_items.len(), "run finalized");
    Ok(CompleteRunOutcome {
        success: true,
        run_id: run.id,
        scope: run.scope,
        items_completed: run.work_items.len(),
        completed: completed_at,
        files_created: params.files_created.len(),
        files_modified: params.files_modified.len(),
        tests_added: params.tests_added,
        coverage_percent: params.coverage_percent,
    })
}

/// Mirror completed statuses into the durable intent tracking, creating the
/// intent or its entry when absent so the mirror is complete afterwards.
fn mirror_into_intents(doc: &mut StateDocument, items: &[WorkItem], run_id: &str) {
    for item in items {
        let position = match doc.intents.iter().position(|i| i.id == item.intent) {
            Some(position) => position,
            None => {
                doc.intents.push(Intent {
                    id: item.intent.clone(),
                    work_items: Vec::new(),
                });
                doc.intents.len() - 1
            }
        };
        let intent = &mut doc.intents[position];
        match intent.work_items.iter_mut().find(|i| i.id == item.id) {
            Some(tracked) => {
                tracked.status = ItemStatus::Completed;
                tracked.run_id = Some(run_id.to_string());
            }
            None => intent.work_items.push(IntentItem {
                id: item.id.clone(),
                status: ItemStatus::Completed,
                run_id: Some(run_id.to_string()),
                requires: Vec::new(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advance::complete_current_item;
    use crate::start::init_run;
    use crate::test_support::{TestProject, item_spec};

    #[test]
    fn finalizing_single_item_run_clears_it_and_records_history() {
        let project = TestProject::new().expect("project");
        init_run(project.root(), &[item_spec("WI-001", "auth")], None).expect("init run");

        let outcome = complete_run(project.root(), "run-001", &CompleteRunParams::default())
            .expect("complete run");
        assert!(outcome.success);
        assert_eq!(outcome.run_id, "run-001");
        assert_eq!(outcome.scope, Scope::Single);
        assert_eq!(outcome.items_completed, 1);
        assert_eq!(outcome.files_created, 0);
        assert_eq!(outcome.coverage_percent, 0);

        let doc = project.state().expect("state");
        assert!(doc.active_run.is_none());
        assert_eq!(doc.runs.completed.len(), 1);
        assert_eq!(doc.runs.completed[0].id, "run-001");
        assert_eq!(doc.runs.completed[0].work_items.len(), 1);

        let log = std::fs::read_to_string(project.paths().run_log_path("run-001")).expect("log");
        assert!(log.contains("status: completed"));
    }

    /// Finalization completes every item even when the run never advanced.
    #[test]
    fn completes_all_items_regardless_of_progress() {
        let project = TestProject::new().expect("project");
        init_run(
            project.root(),
            &[
                item_spec("WI-001", "auth"),
                item_spec("WI-002", "auth"),
                item_spec("WI-003", "billing"),
            ],
            None,
        )
        .expect("init run");
        complete_current_item(project.root(), "run-001").expect("advance once");

        complete_run(project.root(), "run-001", &CompleteRunParams::default())
            .expect("complete run");

        let doc = project.state().expect("state");
        let entry = &doc.runs.completed[0];
        assert_eq!(entry.work_items.len(), 3);

        for intent_id in ["auth", "billing"] {
            let intent = doc
                .intents
                .iter()
                .find(|intent| intent.id == intent_id)
                .expect("intent mirrored");
            for tracked in &intent.work_items {
                assert_eq!(tracked.status, ItemStatus::Completed);
                assert_eq!(tracked.run_id.as_deref(), Some("run-001"));
            }
        }
    }

    #[test]
    fn mirrors_into_existing_intent_entries() {
        let project = TestProject::new().expect("project");
        let mut doc = project.state().expect("state");
        doc.intents.push(Intent {
            id: "auth".to_string(),
            work_items: vec![IntentItem {
                id: "WI-001".to_string(),
                status: ItemStatus::Pending,
                run_id: None,
                requires: vec!["WI-000".to_string()],
            }],
        });
        project.write_state(&doc).expect("seed");

        init_run(project.root(), &[item_spec("WI-001", "auth")], None).expect("init run");
        complete_run(project.root(), "run-001", &CompleteRunParams::default())
            .expect("complete run");

        let doc = project.state().expect("state");
        let tracked = &doc.intents[0].work_items[0];
        assert_eq!(tracked.status, ItemStatus::Completed);
        assert_eq!(tracked.run_id.as_deref(), Some("run-001"));
        // Dependency edges on the durable entry are untouched.
        assert_eq!(tracked.requires, vec!["WI-000".to_string()]);
    }

    #[test]
    fn history_is_idempotent_per_run_id() {
        let project = TestProject::new().expect("project");
        let mut doc = project.state().expect("state");
        doc.runs.completed.push(RunHistoryEntry {
            id: "run-001".to_string(),
            scope: Scope::Single,
            work_items: Vec::new(),
            completed: "2026-08-01T00:00:00Z".to_string(),
        });
        project.write_state(&doc).expect("seed");

        // The numbering authority skips the recorded id, so force a run with
        // the same id to exercise the duplicate guard.
        init_run(project.root(), &[item_spec("WI-001", "auth")], None).expect("init run");
        let mut doc = project.state().expect("state");
        if let Some(run) = doc.active_run.as_mut() {
            run.id = "run-001".to_string();
        }
        project.write_state(&doc).expect("rewrite");

        complete_run(project.root(), "run-001", &CompleteRunParams::default())
            .expect("complete run");
        let doc = project.state().expect("state");
        let matching = doc
            .runs
            .completed
            .iter()
            .filter(|entry| entry.id == "run-001")
            .count();
        assert_eq!(matching, 1);
    }

    #[test]
    fn second_finalization_fails_without_touching_history() {
        let project = TestProject::new().expect("project");
        init_run(project.root(), &[item_spec("WI-001", "auth")], None).expect("init run");
        complete_run(project.root(), "run-001", &CompleteRunParams::default()).expect("first");

        let err =
            complete_run(project.root(), "run-001", &CompleteRunParams::default()).unwrap_err();
        assert_eq!(err.code, codes::RUN_001);

        let doc = project.state().expect("state");
        assert_eq!(doc.runs.completed.len(), 1);
    }

    #[test]
    fn run_log_gains_sections_and_summary() {
        let project = TestProject::new().expect("project");
        init_run(project.root(), &[item_spec("WI-001", "auth")], None).expect("init run");
        let params = CompleteRunParams {
            files_created: vec!["src/token.rs".to_string()],
            files_modified: vec!["src/lib.rs".to_string(), "src/api.rs".to_string()],
            decisions: vec!["tokens expire after one hour".to_string()],
            tests_added: 4,
            coverage_percent: 91,
        };
        let outcome = complete_run(project.root(), "run-001", &params).expect("complete run");
        assert_eq!(outcome.files_modified, 2);

        let log = std::fs::read_to_string(project.paths().run_log_path("run-001")).expect("log");
        assert!(log.contains("- src/token.rs"));
        assert!(log.contains("- tokens expire after one hour"));
        assert!(log.contains("- tests added: 4"));
        assert!(log.contains("- coverage: 91%"));
    }

    #[test]
    fn errors_on_run_id_mismatch() {
        let project = TestProject::new().expect("project");
        init_run(project.root(), &[item_spec("WI-001", "auth")], None).expect("init run");
        let err =
            complete_run(project.root(), "run-042", &CompleteRunParams::default()).unwrap_err();
        assert_eq!(err.code, codes::RUN_002);

        let doc = project.state().expect("state");
        assert!(doc.active_run.is_some());
    }

    /// Unrelated top-level fields survive the full lifecycle.
    #[test]
    fn preserves_foreign_document_fields_across_lifecycle() {
        let project = TestProject::new().expect("project");
        let raw = std::fs::read_to_string(&project.paths().state_path).expect("read");
        std::fs::write(
            &project.paths().state_path,
            format!("project_name: skunkworks\n{raw}"),
        )
        .expect("seed");

        init_run(project.root(), &[item_spec("WI-001", "auth")], None).expect("init run");
        complete_run(project.root(), "run-001", &CompleteRunParams::default())
            .expect("complete run");

        let raw = std::fs::read_to_string(&project.paths().state_path).expect("read");
        assert!(raw.contains("project_name: skunkworks"));
    }
}
