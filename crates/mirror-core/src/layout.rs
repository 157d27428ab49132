//! Validated workspace layout
//!
//! A [`MirrorLayout`] is the only way the rest of the crate turns
//! workspace-relative paths into filesystem paths. Building one performs all
//! root checks, so holding a layout means the output root is strictly inside
//! the workspace and disjoint from the packages root.

use mirror_fs::{MirrorPath, NormalizedPath};

use crate::config::{FixedMirror, MirrorConfig};
use crate::{Error, Result};

/// Workspace roots after validation. All stored paths except
/// `workspace_root` are workspace-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorLayout {
    workspace_root: NormalizedPath,
    packages_root: NormalizedPath,
    output_root: NormalizedPath,
    mirrors: Vec<(NormalizedPath, NormalizedPath)>,
}

impl MirrorLayout {
    /// Validate the roots named by `config`.
    ///
    /// Fails with [`Error::Configuration`] naming the offending configured
    /// value when:
    /// - the output or packages root does not resolve strictly inside the
    ///   workspace root;
    /// - the output root equals, contains or is contained by the packages root;
    /// - the existing output root is reached through a symlink;
    /// - a fixed mirror directory resolves outside the workspace root.
    pub fn from_config(config: &MirrorConfig) -> Result<Self> {
        let workspace_root = config.workspace_root.clone();

        let packages_root = workspace_relative(&workspace_root, &config.packages_root)?;
        let output_root = workspace_relative(&workspace_root, &config.output_root)?;

        if output_root == packages_root {
            return Err(Error::configuration(
                &config.output_root,
                format!("output root must not equal the packages root `{packages_root}`"),
            ));
        }
        if output_root.is_inside(&packages_root) {
            return Err(Error::configuration(
                &config.output_root,
                format!("output root must not be inside the packages root `{packages_root}`"),
            ));
        }
        if packages_root.is_inside(&output_root) {
            return Err(Error::configuration(
                &config.output_root,
                format!("output root must not contain the packages root `{packages_root}`"),
            ));
        }

        let mirrors = config
            .mirrors
            .iter()
            .map(|mirror| fixed_mirror(&workspace_root, mirror))
            .collect::<Result<Vec<_>>>()?;

        let layout = Self {
            workspace_root,
            packages_root,
            output_root,
            mirrors,
        };
        layout.check_output_root_on_disk(&config.output_root)?;
        Ok(layout)
    }

    /// Absolute workspace root
    pub fn workspace_root(&self) -> &NormalizedPath {
        &self.workspace_root
    }

    /// Workspace-relative packages root
    pub fn packages_root(&self) -> &NormalizedPath {
        &self.packages_root
    }

    /// Workspace-relative output root
    pub fn output_root(&self) -> &NormalizedPath {
        &self.output_root
    }

    /// Workspace-relative generated subtree, `<output_root>/packages`
    pub fn generated_root(&self) -> NormalizedPath {
        self.output_root.join(MirrorPath::GeneratedDir.as_str())
    }

    /// Workspace-relative mirror directory of one package
    pub fn package_output_dir(&self, short_name: &str) -> NormalizedPath {
        self.generated_root().join(short_name)
    }

    /// Directory pairs with a fixed 1:1 mirrored counterpart.
    ///
    /// The output root outside the generated subtree always maps to itself
    /// and comes last; configured pairs precede it.
    pub fn fixed_mirrors(&self) -> Vec<(NormalizedPath, NormalizedPath)> {
        let mut pairs = self.mirrors.clone();
        pairs.push((self.output_root.clone(), self.output_root.clone()));
        pairs
    }

    /// Absolute path of a workspace-relative path, required to stay
    /// strictly inside the workspace root.
    pub fn resolve_inside(&self, relative: &NormalizedPath) -> Result<NormalizedPath> {
        if relative.is_absolute() || relative.escapes_root() {
            return Err(Error::escape(relative, &self.workspace_root));
        }
        let absolute = self.workspace_root.join(relative.as_str());
        if !absolute.is_inside(&self.workspace_root) {
            return Err(Error::escape(relative, &self.workspace_root));
        }
        Ok(absolute)
    }

    /// Workspace-relative form of an absolute path inside the workspace.
    pub fn to_relative(&self, absolute: &NormalizedPath) -> Result<NormalizedPath> {
        absolute
            .relative_to(&self.workspace_root)
            .ok_or_else(|| Error::escape(absolute, &self.workspace_root))
    }

    fn check_output_root_on_disk(&self, configured: &str) -> Result<()> {
        let absolute = self.workspace_root.join(self.output_root.as_str());
        if std::fs::symlink_metadata(absolute.to_native()).is_err() {
            return Ok(());
        }

        let canonical = |path: &NormalizedPath| {
            dunce::canonicalize(path.to_native())
                .map(NormalizedPath::new)
                .map_err(|e| mirror_fs::Error::io(path.to_native(), e))
        };
        let canonical_root = canonical(&self.workspace_root)?;
        let canonical_output = canonical(&absolute)?;

        if canonical_output != canonical_root.join(self.output_root.as_str()) {
            return Err(Error::configuration(
                configured,
                format!("output root must not be reached through a symlink (resolves to `{canonical_output}`)"),
            ));
        }
        Ok(())
    }
}

/// Interpret a configured root as a path strictly inside the workspace.
fn workspace_relative(workspace_root: &NormalizedPath, configured: &str) -> Result<NormalizedPath> {
    let path = NormalizedPath::new(configured);
    let relative = if path.is_absolute() {
        path.relative_to(workspace_root).ok_or_else(|| {
            Error::configuration(configured, "resolves outside the workspace root")
        })?
    } else {
        path
    };

    if relative.escapes_root() {
        return Err(Error::configuration(
            configured,
            "resolves outside the workspace root",
        ));
    }
    if relative.as_str() == "." {
        return Err(Error::configuration(
            configured,
            "must resolve strictly inside the workspace root, not to the root itself",
        ));
    }
    Ok(relative)
}

fn fixed_mirror(
    workspace_root: &NormalizedPath,
    mirror: &FixedMirror,
) -> Result<(NormalizedPath, NormalizedPath)> {
    Ok((
        workspace_relative(workspace_root, &mirror.source)?,
        workspace_relative(workspace_root, &mirror.target)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(output_root: &str) -> Result<MirrorLayout> {
        MirrorLayout::from_config(
            &MirrorConfig::new("/nonexistent/workspace").with_output_root(output_root),
        )
    }

    #[test]
    fn default_layout_is_valid() {
        let layout = layout("docs").unwrap();
        assert_eq!(layout.output_root().as_str(), "docs");
        assert_eq!(layout.packages_root().as_str(), "packages");
        assert_eq!(layout.generated_root().as_str(), "docs/packages");
        assert_eq!(
            layout.package_output_dir("alpha").as_str(),
            "docs/packages/alpha"
        );
    }

    #[test]
    fn absolute_output_root_inside_workspace_is_accepted() {
        let layout = layout("/nonexistent/workspace/site/docs").unwrap();
        assert_eq!(layout.output_root().as_str(), "site/docs");
    }

    #[test]
    fn output_root_containing_packages_root_is_rejected() {
        let config = MirrorConfig::new("/nonexistent/workspace")
            .with_packages_root("docs/packages-src")
            .with_output_root("docs");
        let err = MirrorLayout::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::Configuration { ref path, .. } if path == "docs"));
    }

    #[test]
    fn output_root_inside_packages_root_is_rejected() {
        let err = layout("packages/alpha/docs").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn resolve_inside_rejects_escapes() {
        let layout = layout("docs").unwrap();
        assert!(layout.resolve_inside(&NormalizedPath::new("../x")).is_err());
        assert!(layout.resolve_inside(&NormalizedPath::new("/etc/passwd")).is_err());
        assert_eq!(
            layout
                .resolve_inside(&NormalizedPath::new("docs/a.md"))
                .unwrap()
                .as_str(),
            "/nonexistent/workspace/docs/a.md"
        );
    }

    #[test]
    fn output_root_mirrors_itself_last() {
        let config = MirrorConfig::new("/nonexistent/workspace").with_mirror("guides", "docs/guides");
        let layout = MirrorLayout::from_config(&config).unwrap();
        let mirrors = layout.fixed_mirrors();

        assert_eq!(mirrors.len(), 2);
        assert_eq!(mirrors[0].0.as_str(), "guides");
        assert_eq!(mirrors[1].0.as_str(), "docs");
        assert_eq!(mirrors[1].1.as_str(), "docs");
    }

    #[test]
    fn mirror_escaping_workspace_is_rejected() {
        let config = MirrorConfig::new("/nonexistent/workspace").with_mirror("../shared", "docs/shared");
        assert!(MirrorLayout::from_config(&config).is_err());
    }
}
