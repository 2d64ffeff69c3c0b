//! Side-effecting operations: processes, filesystem, archives.

pub mod archive;
pub mod batch;
pub mod config;
pub mod pipeline;
pub mod process;
pub mod provision;
pub mod toolchain;
