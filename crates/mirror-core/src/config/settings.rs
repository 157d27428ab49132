//! Resolved settings for a single docmirror run

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use mirror_fs::{MirrorPath, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::Error;

/// How source documents that are not valid UTF-8 are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownMode {
    /// Reject non-UTF-8 sources with [`Error::Encoding`]
    #[default]
    Strict,
    /// Decode with replacement characters and log a warning
    Lossy,
}

impl fmt::Display for MarkdownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lossy => write!(f, "lossy"),
        }
    }
}

impl FromStr for MarkdownMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lossy" => Ok(Self::Lossy),
            _ => Err(Error::configuration(
                s,
                "markdown mode must be `strict` or `lossy`",
            )),
        }
    }
}

fn default_deny() -> Vec<String> {
    vec!["CHANGELOG".into(), "HISTORY".into(), "RELEASES".into()]
}

/// Allow/deny list for markdown files at a package root other than the README.
///
/// Names are matched case-insensitively against the file stem. An empty
/// allow list admits every stem that is not denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFilePolicy {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default = "default_deny")]
    pub deny: Vec<String>,
}

impl Default for RootFilePolicy {
    fn default() -> Self {
        Self {
            allow: Vec::new(),
            deny: default_deny(),
        }
    }
}

impl RootFilePolicy {
    /// Whether a root-level file with this stem is mirrored.
    pub fn permits(&self, stem: &str) -> bool {
        let listed = |names: &[String]| names.iter().any(|n| n.eq_ignore_ascii_case(stem));
        (self.allow.is_empty() || listed(&self.allow)) && !listed(&self.deny)
    }
}

/// A workspace directory whose contents have a fixed 1:1 counterpart
/// elsewhere, used when rewriting links that point into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedMirror {
    /// Workspace-relative directory links point into
    pub source: String,
    /// Workspace-relative directory holding the mirrored copy
    pub target: String,
}

/// Effective configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Absolute workspace root
    pub workspace_root: NormalizedPath,
    /// Packages root, relative to the workspace root
    pub packages_root: String,
    /// Output root, relative to the workspace root
    pub output_root: String,
    pub markdown_mode: MarkdownMode,
    /// Manifest file name looked up in each package directory
    pub manifest_file: String,
    pub root_files: RootFilePolicy,
    pub mirrors: Vec<FixedMirror>,
}

impl MirrorConfig {
    /// Default configuration for the given workspace root.
    ///
    /// The root is used as given; [`ConfigResolver`](super::ConfigResolver)
    /// canonicalizes it.
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self {
            workspace_root: NormalizedPath::new(workspace_root),
            packages_root: MirrorPath::PackagesRoot.as_str().to_string(),
            output_root: MirrorPath::OutputRoot.as_str().to_string(),
            markdown_mode: MarkdownMode::default(),
            manifest_file: MirrorPath::PackageManifest.as_str().to_string(),
            root_files: RootFilePolicy::default(),
            mirrors: Vec::new(),
        }
    }

    pub fn with_packages_root(mut self, packages_root: impl Into<String>) -> Self {
        self.packages_root = packages_root.into();
        self
    }

    pub fn with_output_root(mut self, output_root: impl Into<String>) -> Self {
        self.output_root = output_root.into();
        self
    }

    pub fn with_markdown_mode(mut self, mode: MarkdownMode) -> Self {
        self.markdown_mode = mode;
        self
    }

    pub fn with_manifest_file(mut self, manifest_file: impl Into<String>) -> Self {
        self.manifest_file = manifest_file.into();
        self
    }

    pub fn with_root_files(mut self, policy: RootFilePolicy) -> Self {
        self.root_files = policy;
        self
    }

    pub fn with_mirror(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.mirrors.push(FixedMirror {
            source: source.into(),
            target: target.into(),
        });
        self
    }
}
