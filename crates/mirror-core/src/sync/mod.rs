//! Mirror synchronization and drift detection
//!
//! - **plan**: render the expected mirror in memory
//! - **engine**: write it (sync) or diff it against disk (check)
//! - **check**: drift report types

mod check;
mod engine;
mod plan;

pub use check::{DriftKind, DriftRecord, DriftReport};
pub use engine::{SyncEngine, SyncOptions, SyncResult};
pub use plan::{MirrorPlan, PlannedFile, build_plan};
