//! Command implementations for mirror-cli

pub mod corpus;
pub mod map;
pub mod sync;

pub use corpus::run_corpus;
pub use map::{run_map, run_packages};
pub use sync::{run_check, run_sync};
