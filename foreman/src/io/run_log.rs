//! Run log rendering for `.foreman/runs/<run-id>/RUN.md`.
//!
//! The run log is a human-readable projection of the state document: a YAML
//! frontmatter metadata block followed by prose sections. It is rewritten in
//! full on every lifecycle mutation and never parsed back; if it diverges
//! from the state document, the state document wins.

use std::path::Path;

use crate::error::Result;
use crate::io::state_store::write_atomic;
use crate::model::{ItemStatus, Run};

/// Finalization details rendered into the files/decisions/summary sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionReport {
    pub files_created: Vec<String>,
    pub files_modified: Vec<String>,
    pub decisions: Vec<String>,
    pub tests_added: u32,
    pub coverage_percent: u32,
}

/// Render the full run log. `report` is present once the run is finalized.
pub fn render_run_log(run: &Run, report: Option<&CompletionReport>) -> String {
    let mut out = String::new();
    render_frontmatter(&mut out, run);

    out.push_str(&format!("# Run {}\n\n", run.id));

    out.push_str("## Scope\n\n");
    out.push_str(run.scope.as_str());
    out.push_str("\n\n");

    out.push_str("## Work Items\n\n");
    for item in &run.work_items {
        let mark = if item.status == ItemStatus::Completed {
            'x'
        } else {
            ' '
        };
        out.push_str(&format!(
            "- [{mark}] {} (intent: {}, mode: {})\n",
            item.id,
            item.intent,
            item.mode.as_str()
        ));
    }
    out.push('\n');

    out.push_str("## Current Item\n\n");
    out.push_str(run.current_item.as_deref().unwrap_or("none"));
    out.push_str("\n\n");

    let empty = CompletionReport::default();
    let sections = report.unwrap_or(&empty);
    render_list_section(&mut out, "Files Created", &sections.files_created);
    render_list_section(&mut out, "Files Modified", &sections.files_modified);
    render_list_section(&mut out, "Decisions", &sections.decisions);

    if let Some(report) = report {
        out.push_str("## Summary\n\n");
        out.push_str(&format!("- items completed: {}\n", run.work_items.len()));
        out.push_str(&format!("- files created: {}\n", report.files_created.len()));
        out.push_str(&format!(
            "- files modified: {}\n",
            report.files_modified.len()
        ));
        out.push_str(&format!("- tests added: {}\n", report.tests_added));
        out.push_str(&format!("- coverage: {}%\n", report.coverage_percent));
    }

    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Render and atomically write the run log.
pub fn write_run_log(path: &Path, run: &Run, report: Option<&CompletionReport>) -> Result<()> {
    write_atomic(path, &render_run_log(run, report))
}

fn render_frontmatter(out: &mut String, run: &Run) {
    let status = if run.completed.is_some() {
        "completed"
    } else {
        "active"
    };
    out.push_str("---\n");
    out.push_str(&format!("id: {}\n", run.id));
    out.push_str(&format!("scope: {}\n", run.scope.as_str()));
    out.push_str(&format!("status: {status}\n"));
    out.push_str(&format!("started: {}\n", run.started));
    out.push_str(&format!(
        "completed: {}\n",
        run.completed.as_deref().unwrap_or("null")
    ));
    out.push_str(&format!(
        "current_item: {}\n",
        run.current_item.as_deref().unwrap_or("null")
    ));
    let ids: Vec<&str> = run.work_items.iter().map(|item| item.id.as_str()).collect();
    out.push_str(&format!("work_items: [{}]\n", ids.join(", ")));
    out.push_str("---\n\n");
}

/// Empty lists render an explicit none marker, never a blank section.
fn render_list_section(out: &mut String, title: &str, entries: &[String]) {
    out.push_str(&format!("## {title}\n\n"));
    if entries.is_empty() {
        out.push_str("- none\n");
    } else {
        for entry in entries {
            out.push_str(&format!("- {entry}\n"));
        }
    }
    out.push('\n');
}
