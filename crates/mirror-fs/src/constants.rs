//! Well-known names in a mirrored workspace.

use std::path::Path;

/// Standard directory and file names used by docmirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPath {
    /// Default packages root, relative to the workspace root
    PackagesRoot,
    /// Default output root, relative to the workspace root
    OutputRoot,
    /// Subdirectory of the output root holding generated package mirrors
    GeneratedDir,
    /// Per-package documentation directory
    PackageDocsDir,
    /// Default per-package manifest file
    PackageManifest,
    /// Workspace-level configuration file
    ConfigFile,
}

impl MirrorPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PackagesRoot => "packages",
            Self::OutputRoot => "docs",
            Self::GeneratedDir => "packages",
            Self::PackageDocsDir => "docs",
            Self::PackageManifest => "package.json",
            Self::ConfigFile => "docmirror.toml",
        }
    }
}

impl AsRef<Path> for MirrorPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for MirrorPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for MirrorPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
