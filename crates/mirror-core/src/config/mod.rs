//! Configuration for a docmirror run
//!
//! Configuration is resolved in layers, later layers winning:
//!
//! 1. **Built-in defaults** - `packages/` → `docs/`, strict markdown mode
//! 2. **Workspace config** - optional `docmirror.toml` at the workspace root
//! 3. **Overrides** - values supplied by the caller (CLI flags)
//!
//! # Example
//!
//! ```ignore
//! use mirror_core::config::{ConfigOverrides, ConfigResolver};
//! use mirror_fs::NormalizedPath;
//!
//! let resolver = ConfigResolver::new(NormalizedPath::new("/path/to/workspace"));
//! let config = resolver.resolve(&ConfigOverrides::default())?;
//! ```

mod resolver;
mod settings;

pub use resolver::{ConfigFile, ConfigOverrides, ConfigResolver};
pub use settings::{FixedMirror, MarkdownMode, MirrorConfig, RootFilePolicy};
