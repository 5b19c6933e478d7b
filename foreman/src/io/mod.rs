//! I/O helpers for foreman commands.

pub mod config;
pub mod init;
pub mod paths;
pub mod run_log;
pub mod state_store;

/// Current wall-clock time as an RFC 3339 UTC string.
///
/// Timestamps are stored as strings so hand-edited documents with unusual
/// precision round-trip unchanged.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
