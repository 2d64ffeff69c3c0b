//! Stable exit codes for the hivebuild CLI.

/// Every listed directory existed and every item was packaged.
pub const OK: i32 = 0;
/// A directory was missing, an item failed, or provisioning/setup failed.
pub const FAILURE: i32 = 1;
