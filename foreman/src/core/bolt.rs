//! Graph-context work units ("bolts") and their derived dependency state.
//!
//! A bolt and a run-scoped work item are the same shape seen from two
//! contexts; the status vocabularies map one-to-one and the conversion lives
//! here so callers never hand-translate.

use serde::{Deserialize, Serialize};

use crate::model::ItemStatus;

/// Graph-context status of a bolt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoltStatus {
    Draft,
    Blocked,
    InProgress,
    Complete,
}

impl From<ItemStatus> for BoltStatus {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Pending => Self::Draft,
            ItemStatus::InProgress => Self::InProgress,
            ItemStatus::Completed => Self::Complete,
        }
    }
}

/// A schedulable unit of work with dependency edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bolt {
    pub id: String,
    pub status: BoltStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

/// A bolt with derived dependency state. Derived fields are recomputed from
/// the current universe on every resolution and are never a source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBolt {
    pub id: String,
    /// Reported status: a blocked `Draft` is upgraded to `Blocked`, nothing
    /// else is altered.
    pub status: BoltStatus,
    pub is_blocked: bool,
    /// Unmet requirement ids, in the order they appear in `requires`.
    pub blocked_by: Vec<String>,
    /// How many other bolts list this one in `requires`.
    pub unblocks_count: usize,
}
