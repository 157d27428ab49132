//! Package discovery
//!
//! Scans the immediate subdirectories of the packages root. A directory is a
//! publishable package when it carries a manifest that is not marked
//! private.

use std::fs;

use mirror_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::config::MirrorConfig;
use crate::layout::MirrorLayout;

/// The manifest fields docmirror reads. Everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub private: bool,
}

/// A package directory found under the packages root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescriptor {
    /// Manifest name, or the directory name when the manifest has none
    pub name: String,
    /// `name` without any `@scope/` prefix; names the mirror directory
    pub short_name: String,
    /// Workspace-relative package directory
    #[serde(serialize_with = "serialize_path")]
    pub root_path: NormalizedPath,
    pub publishable: bool,
}

fn serialize_path<S: serde::Serializer>(
    path: &NormalizedPath,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(path.as_str())
}

/// Strip an npm-style `@scope/` prefix.
pub fn short_name(name: &str) -> &str {
    match name.strip_prefix('@').and_then(|rest| rest.split_once('/')) {
        Some((_, short)) if !short.is_empty() => short,
        _ => name,
    }
}

/// Every immediate subdirectory of the packages root, sorted by directory
/// name, with its publishability decided.
///
/// Directories without a manifest are reported with `publishable = false`.
/// A manifest that fails to parse is logged and treated the same way. A
/// missing packages root yields an empty list; an unreadable one is an error.
pub fn scan_packages(config: &MirrorConfig, layout: &MirrorLayout) -> Result<Vec<PackageDescriptor>> {
    let packages_dir = layout.workspace_root().join(layout.packages_root().as_str());
    let native = packages_dir.to_native();

    let entries = match fs::read_dir(&native) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %packages_dir, "packages root does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(mirror_fs::Error::io(&native, e).into()),
    };

    let mut dir_names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| mirror_fs::Error::io(&native, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| mirror_fs::Error::io(entry.path(), e))?;
        // Symlinked package directories are not followed
        if file_type.is_dir() {
            dir_names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    dir_names.sort();

    let store = ConfigStore::new();
    let mut packages = Vec::with_capacity(dir_names.len());
    for dir_name in dir_names {
        let root_path = layout.packages_root().join(&dir_name);
        let manifest_path = packages_dir.join(&dir_name).join(&config.manifest_file);

        let manifest = if manifest_path.is_file() {
            match store.load::<PackageManifest>(&manifest_path) {
                Ok(manifest) => Some(manifest),
                Err(e) => {
                    tracing::warn!(path = %manifest_path, error = %e, "skipping package with unreadable manifest");
                    None
                }
            }
        } else {
            tracing::debug!(package = %dir_name, "no manifest, not a package");
            None
        };

        let publishable = manifest.as_ref().is_some_and(|m| !m.private);
        let name = manifest
            .and_then(|m| m.name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| dir_name.clone());

        packages.push(PackageDescriptor {
            short_name: short_name(&name).to_string(),
            name,
            root_path,
            publishable,
        });
    }
    Ok(packages)
}

/// Publishable packages only, in directory-name order.
pub fn discover_packages(config: &MirrorConfig, layout: &MirrorLayout) -> Result<Vec<PackageDescriptor>> {
    let packages: Vec<_> = scan_packages(config, layout)?
        .into_iter()
        .filter(|package| {
            if !package.publishable {
                tracing::debug!(package = %package.name, "excluded from mirror");
            }
            package.publishable
        })
        .collect();
    tracing::debug!(count = packages.len(), "discovered publishable packages");
    Ok(packages)
}
