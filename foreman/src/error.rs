//! Structured errors for lifecycle operations.
//!
//! Every failure carries a machine-readable code (namespaced by operation
//! family), a human-readable message, and an actionable suggestion. Callers
//! are expected to surface the message/suggestion pair directly to a human
//! operator; nothing is retried automatically.

use thiserror::Error;

/// Error raised by any lifecycle or storage operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ForemanError {
    /// Machine-readable code, e.g. `INIT_003` or `CHECKPOINT_003`.
    pub code: &'static str,
    /// Human-readable description of what went wrong.
    pub message: String,
    /// What the operator should do about it.
    pub suggestion: String,
}

impl ForemanError {
    pub fn new(
        code: &'static str,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForemanError>;

/// Error codes, grouped by operation family.
///
/// Codes are stable: scripts may match on them, so existing codes must never
/// be renumbered.
pub mod codes {
    // Run creation input validation.
    pub const INIT_001: &str = "INIT_001";
    pub const INIT_002: &str = "INIT_002";
    pub const INIT_003: &str = "INIT_003";
    pub const INIT_004: &str = "INIT_004";
    pub const INIT_005: &str = "INIT_005";
    pub const INIT_006: &str = "INIT_006";
    pub const INIT_007: &str = "INIT_007";

    // Completion input validation.
    pub const COMPLETE_001: &str = "COMPLETE_001";
    pub const COMPLETE_002: &str = "COMPLETE_002";
    pub const COMPLETE_003: &str = "COMPLETE_003";

    // Checkpoint updates.
    pub const CHECKPOINT_001: &str = "CHECKPOINT_001";
    pub const CHECKPOINT_002: &str = "CHECKPOINT_002";
    pub const CHECKPOINT_003: &str = "CHECKPOINT_003";
    pub const CHECKPOINT_004: &str = "CHECKPOINT_004";
    pub const CHECKPOINT_005: &str = "CHECKPOINT_005";

    // Active-run consistency, shared by every operation that addresses a run.
    pub const RUN_001: &str = "RUN_001";
    pub const RUN_002: &str = "RUN_002";
    pub const RUN_003: &str = "RUN_003";
    pub const RUN_004: &str = "RUN_004";

    // State document and project structure.
    pub const STATE_001: &str = "STATE_001";
    pub const STATE_002: &str = "STATE_002";
    pub const STATE_003: &str = "STATE_003";
    pub const STATE_004: &str = "STATE_004";
    pub const STATE_005: &str = "STATE_005";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let err = ForemanError::new(codes::RUN_001, "no active run", "start one first");
        assert_eq!(err.to_string(), "RUN_001: no active run");
        assert_eq!(err.suggestion, "start one first");
    }
}
