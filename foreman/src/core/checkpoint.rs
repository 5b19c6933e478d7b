//! Checkpoint approval states and input normalization.
//!
//! Checkpoint state is an orthogonal sub-machine per work item:
//! `none`, `awaiting_approval`, and `approved` cycle freely, while
//! `not_required` is an absorbing bypass settable at any time.

use serde::{Deserialize, Serialize};

/// Approval state attached to a work item inside an active run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointState {
    None,
    AwaitingApproval,
    Approved,
    NotRequired,
}

impl CheckpointState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Approved => "approved",
            Self::NotRequired => "not_required",
        }
    }
}

/// Normalize a free-form checkpoint-state string against the fixed
/// enumeration.
///
/// Matching is case-insensitive and treats `-` and spaces as `_`. Recognized
/// synonyms map onto the canonical states; anything else returns `None` so
/// the caller can reject it instead of silently defaulting.
pub fn parse_checkpoint_state(raw: &str) -> Option<CheckpointState> {
    let folded = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    match folded.as_str() {
        "awaiting_approval" | "awaiting" | "waiting" | "waiting_approval" | "pending"
        | "pending_approval" => Some(CheckpointState::AwaitingApproval),
        "approved" | "approve" | "accepted" => Some(CheckpointState::Approved),
        "none" | "clear" => Some(CheckpointState::None),
        "not_required" | "notrequired" | "skip" | "skipped" | "bypass" => {
            Some(CheckpointState::NotRequired)
        }
        _ => None,
    }
}
