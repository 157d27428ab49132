//! Filesystem primitives for docmirror
//!
//! Provides forward-slash path normalization with lexical containment checks,
//! atomic writes, directory scanning and format-agnostic config loading.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::MirrorPath;
pub use error::{Error, Result};
pub use path::{NormalizedPath, relative_path};
