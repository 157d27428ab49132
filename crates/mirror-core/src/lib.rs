//! Core engine for docmirror
//!
//! Maintains a derived mirror of per-package documentation under a central
//! output root and keeps it convergent with its sources:
//!
//! - **Package discovery**: publishable packages under the packages root
//! - **Docs map**: deterministic source → output mapping with collision detection
//! - **Link rewriting**: relative links re-pointed after relocation
//! - **SyncEngine**: write the mirror and prune stale files, or check for drift
//! - **Corpus**: one concatenated text artifact for retrieval tooling
//!
//! # Architecture
//!
//! ```text
//!            package discovery
//!                    |
//!              docs map generator
//!          +---------+---------+
//!          |         |         |
//!        sync      check     corpus
//!          +----+----+
//!               |
//!         link rewriter
//! ```
//!
//! # Example
//!
//! ```no_run
//! use mirror_core::{ConfigOverrides, ConfigResolver, SyncEngine};
//! use mirror_fs::NormalizedPath;
//!
//! fn example() -> mirror_core::Result<()> {
//!     let config = ConfigResolver::new(NormalizedPath::new("."))
//!         .resolve(&ConfigOverrides::default())?;
//!     let result = SyncEngine::new(config).sync()?;
//!     println!("removed {} stale files", result.removed_files.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod corpus;
pub mod docs_map;
pub mod error;
pub mod layout;
pub mod links;
pub mod package;
pub mod sync;

pub use config::{
    ConfigFile, ConfigOverrides, ConfigResolver, FixedMirror, MarkdownMode, MirrorConfig,
    RootFilePolicy,
};
pub use corpus::{CORPUS_HEADER, render_corpus};
pub use docs_map::{DocKind, DocsMap, DocsMapEntry, GeneratedDocs, generate, generate_docs_map};
pub use error::{Error, Result};
pub use layout::MirrorLayout;
pub use links::{LinkIndex, rewrite};
pub use package::{PackageDescriptor, PackageManifest, discover_packages, scan_packages};
pub use sync::{
    DriftKind, DriftRecord, DriftReport, MirrorPlan, PlannedFile, SyncEngine, SyncOptions,
    SyncResult, build_plan,
};
