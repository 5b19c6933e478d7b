//! Persisted shapes for the state document.
//!
//! The state document (`.foreman/state.yaml`) holds three top-level sections:
//! `intents` (durable work-item tracking), `active_run` (the single run in
//! flight, or null), and `runs.completed` (append-only history). Unknown
//! top-level fields are captured verbatim so hand-maintained project metadata
//! survives every write.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::checkpoint::CheckpointState;

/// Run-scoped work-item status. Monotonic: pending, then in_progress, then
/// completed, with no regression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Execution mode declared per work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Autopilot,
    Confirm,
    Validate,
}

impl Mode {
    /// Parse a mode string. Returns `None` for anything outside the three
    /// enumerated values.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "autopilot" => Some(Self::Autopilot),
            "confirm" => Some(Self::Confirm),
            "validate" => Some(Self::Validate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Autopilot => "autopilot",
            Self::Confirm => "confirm",
            Self::Validate => "validate",
        }
    }
}

/// How much of the backlog a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Single,
    Batch,
    Wide,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Batch => "batch",
            Self::Wide => "wide",
        }
    }
}

/// A work item inside an active run (transient execution state).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub intent: String,
    pub mode: Mode,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_state: Option<CheckpointState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_checkpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,
    /// Stamped with the finalizing run id by run completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

/// One run in flight. `completed` stays null until finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub scope: Scope,
    pub work_items: Vec<WorkItem>,
    pub current_item: Option<String>,
    pub started: String,
    #[serde(default)]
    pub completed: Option<String>,
}

/// Durable per-intent tracking entry for a work item.
///
/// `requires` edges make the intent collection double as the dependency
/// universe for scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentItem {
    pub id: String,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

/// A higher-level intent grouping work items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub id: String,
    #[serde(default)]
    pub work_items: Vec<IntentItem>,
}

/// Work-item snapshot kept in run history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub intent: String,
    pub mode: Mode,
}

/// Immutable record of a fully completed run. One entry per run id, ever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHistoryEntry {
    pub id: String,
    pub scope: Scope,
    pub work_items: Vec<HistoryItem>,
    pub completed: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHistory {
    #[serde(default)]
    pub completed: Vec<RunHistoryEntry>,
}

/// The whole persisted state document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub intents: Vec<Intent>,
    #[serde(default)]
    pub active_run: Option<Run>,
    #[serde(default)]
    pub runs: RunHistory,
    /// Top-level fields foreman does not own, preserved across writes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl StateDocument {
    /// Find a durable tracking entry by item id, searching every intent.
    pub fn find_intent_item_mut(&mut self, item_id: &str) -> Option<&mut IntentItem> {
        self.intents
            .iter_mut()
            .flat_map(|intent| intent.work_items.iter_mut())
            .find(|item| item.id == item_id)
    }
}
