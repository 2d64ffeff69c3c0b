//! Pure logic: input parsing, outcome types, and report aggregation.
//!
//! Nothing in here touches the filesystem or spawns processes.

pub mod outcome;
pub mod report;
pub mod targets;
pub mod version;
