//! Configuration resolution with layered overrides

use mirror_fs::{ConfigStore, MirrorPath, NormalizedPath};
use serde::{Deserialize, Serialize};

use super::settings::{FixedMirror, MarkdownMode, MirrorConfig, RootFilePolicy};
use crate::Result;

/// Contents of `docmirror.toml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub packages_root: Option<String>,
    pub output_root: Option<String>,
    pub markdown_mode: Option<MarkdownMode>,
    pub manifest_file: Option<String>,
    pub root_files: Option<RootFilePolicy>,
    #[serde(default)]
    pub mirrors: Vec<FixedMirror>,
}

/// Caller-supplied values that win over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub packages_root: Option<String>,
    pub output_root: Option<String>,
    pub markdown_mode: Option<MarkdownMode>,
}

/// Resolves the effective [`MirrorConfig`] for a workspace root
pub struct ConfigResolver {
    /// Workspace root directory
    root: NormalizedPath,
}

impl ConfigResolver {
    pub fn new(root: NormalizedPath) -> Self {
        Self { root }
    }

    /// Path of the workspace config file
    pub fn config_path(&self) -> NormalizedPath {
        self.root.join(MirrorPath::ConfigFile.as_str())
    }

    /// Check if the workspace has a config file
    pub fn has_config(&self) -> bool {
        self.config_path().is_file()
    }

    /// Load the workspace config file, or defaults if there is none.
    pub fn load_file(&self) -> Result<ConfigFile> {
        if !self.has_config() {
            return Ok(ConfigFile::default());
        }
        Ok(ConfigStore::new().load(&self.config_path())?)
    }

    /// Resolve defaults, the config file and `overrides` into one config.
    ///
    /// The workspace root is canonicalized, so it must exist.
    pub fn resolve(&self, overrides: &ConfigOverrides) -> Result<MirrorConfig> {
        let native_root = self.root.to_native();
        let canonical = dunce::canonicalize(&native_root)
            .map_err(|e| mirror_fs::Error::io(&native_root, e))?;

        let file = self.load_file()?;
        let mut config = MirrorConfig::new(&canonical);

        if let Some(packages_root) = file.packages_root {
            config.packages_root = packages_root;
        }
        if let Some(output_root) = file.output_root {
            config.output_root = output_root;
        }
        if let Some(mode) = file.markdown_mode {
            config.markdown_mode = mode;
        }
        if let Some(manifest_file) = file.manifest_file {
            config.manifest_file = manifest_file;
        }
        if let Some(policy) = file.root_files {
            config.root_files = policy;
        }
        config.mirrors = file.mirrors;

        if let Some(packages_root) = &overrides.packages_root {
            config.packages_root = packages_root.clone();
        }
        if let Some(output_root) = &overrides.output_root {
            config.output_root = output_root.clone();
        }
        if let Some(mode) = overrides.markdown_mode {
            config.markdown_mode = mode;
        }

        tracing::debug!(
            root = %config.workspace_root,
            packages_root = %config.packages_root,
            output_root = %config.output_root,
            mode = %config.markdown_mode,
            "resolved configuration"
        );
        Ok(config)
    }
}
