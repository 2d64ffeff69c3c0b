//! Batch builder for puzzle directories.
//!
//! Given a list of target directories, every immediate subdirectory (an
//! item) is integrity-checked, tested and packaged by an external toolchain.
//! Artifacts of each target are bundled into `<output>/<target>.tar`, and a
//! run fails if any directory was missing or any item failed.
//!
//! - **[`core`]**: Pure logic (target parsing, version selection, outcomes,
//!   report aggregation and rendering).
//! - **[`io`]**: Side-effecting operations (provisioning, stage commands,
//!   filesystem moves, archives).
//!
//! [`orchestrate`] ties the two together for the CLI.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod orchestrate;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
