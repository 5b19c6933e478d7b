//! Stable exit codes for foreman CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed validation or I/O; details on stderr.
pub const INVALID: i32 = 1;
/// `foreman up-next` found no schedulable work (everything complete or absent).
pub const ALL_CLEAR: i32 = 2;
