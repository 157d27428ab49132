//! Workspace context detection
//!
//! Commands work from any directory inside a workspace, the way git does:
//! the root is the nearest ancestor holding `docmirror.toml`.

use std::path::{Path, PathBuf};

use mirror_core::{ConfigOverrides, ConfigResolver, MirrorConfig};
use mirror_fs::{MirrorPath, NormalizedPath};

use crate::error::Result;

/// Locate the workspace root for a command.
///
/// An explicit root wins. Otherwise walks up from `cwd` to the nearest
/// directory containing `docmirror.toml`, falling back to `cwd` itself.
pub fn workspace_root(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(root) = explicit {
        return if root.is_absolute() {
            root.to_path_buf()
        } else {
            cwd.join(root)
        };
    }

    cwd.ancestors()
        .find(|dir| dir.join(MirrorPath::ConfigFile.as_str()).is_file())
        .unwrap_or(cwd)
        .to_path_buf()
}

/// Resolve the effective configuration for a command.
pub fn load_config(root: &Path, overrides: &ConfigOverrides) -> Result<MirrorConfig> {
    tracing::debug!(root = %root.display(), "resolving workspace configuration");
    Ok(ConfigResolver::new(NormalizedPath::new(root)).resolve(overrides)?)
}
