//! Unified exit codes for every tenet subcommand.
//! These codes are part of the public contract.

pub const SUCCESS: i32 = 0;
/// Diagnostics at error severity were reported (warnings alone stay 0).
pub const CHECK_FAILED: i32 = 1;
/// Unusable input: bad config, unreadable data directory, or caller error.
pub const CONFIG_ERROR: i32 = 2;
