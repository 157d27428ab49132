//! Shared test utilities for the docmirror workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`workspace`]: [`TestWorkspace`] builder for multi-package fixtures
//!
//! [`TestWorkspace`]: workspace::TestWorkspace

pub mod workspace;

pub use workspace::TestWorkspace;
