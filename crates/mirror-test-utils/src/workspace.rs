//! [`TestWorkspace`] builder for docmirror test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary multi-package workspace with helpers for setup and assertion.
///
/// All paths taken by helpers are relative to the workspace root and use
/// forward slashes.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new();
/// ws.add_package("alpha", "@acme/alpha")
///     .write("packages/alpha/README.md", "# Alpha\n");
/// ws.assert_file_exists("packages/alpha/package.json");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create an empty temporary workspace.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// The sample workspace most suites start from:
    ///
    /// - `alpha` (`@acme/alpha`): README linking to the shared patterns doc
    ///   and to `beta`, a guide, a reference page and a denied CHANGELOG
    /// - `beta` (`@acme/beta`): README with a `HARVEST_MAP.md` root file
    /// - `internal`: private package
    /// - `scratch`: directory without a manifest
    /// - `docs/PATTERNS.md`: hand-written doc outside the generated subtree
    pub fn sample() -> Self {
        let ws = Self::new();
        ws.add_package("alpha", "@acme/alpha")
            .write(
                "packages/alpha/README.md",
                "# Alpha\n\nSee [patterns](../../docs/PATTERNS.md) and [beta](../beta/README.md).\n",
            )
            .write(
                "packages/alpha/docs/guide.md",
                "---\ntitle: Alpha Guide\ntags: [intro]\n---\n\nBack to [the package](..).\n",
            )
            .write(
                "packages/alpha/docs/api/client.md",
                "# Client API\n\nSee the [guide](../guide.md#setup).\n",
            )
            .write("packages/alpha/CHANGELOG.md", "# Changelog\n")
            .write("packages/alpha/src/index.ts", "export {};\n");
        ws.add_package("beta", "@acme/beta")
            .write("packages/beta/README.md", "# Beta\n")
            .write("packages/beta/HARVEST_MAP.md", "# Harvest map\n");
        ws.add_private_package("internal")
            .write("packages/internal/README.md", "# Internal\n");
        ws.add_bare_dir("scratch")
            .write("packages/scratch/README.md", "# Scratch\n");
        ws.write("docs/PATTERNS.md", "# Patterns\n");
        ws
    }

    /// Return the root path of the temporary workspace.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a workspace-relative path.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Create `packages/<dir>` with a manifest naming it `name`.
    pub fn add_package(&self, dir: &str, name: &str) -> &Self {
        self.write_manifest(dir, serde_json::json!({ "name": name, "version": "1.0.0" }))
    }

    /// Create `packages/<dir>` with a manifest marked private.
    pub fn add_private_package(&self, dir: &str) -> &Self {
        self.write_manifest(dir, serde_json::json!({ "name": dir, "private": true }))
    }

    /// Create `packages/<dir>` without any manifest.
    pub fn add_bare_dir(&self, dir: &str) -> &Self {
        fs::create_dir_all(self.path(&format!("packages/{dir}"))).unwrap();
        self
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) -> &Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestWorkspace::write: failed to write {relative}: {e}"));
        self
    }

    /// Read a file as UTF-8.
    ///
    /// # Panics
    /// Panics if the file does not exist or is not UTF-8.
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("TestWorkspace::read: failed to read {relative}: {e}"))
    }

    /// Remove a file.
    pub fn remove(&self, relative: &str) -> &Self {
        fs::remove_file(self.path(relative))
            .unwrap_or_else(|e| panic!("TestWorkspace::remove: failed to remove {relative}: {e}"));
        self
    }

    /// Every file under `relative`, as sorted workspace-relative paths.
    pub fn files_under(&self, relative: &str) -> Vec<String> {
        let mut files = Vec::new();
        collect_files(&self.path(relative), &mut files);
        let mut relative_files: Vec<String> = files
            .into_iter()
            .filter_map(|path| {
                path.strip_prefix(self.root())
                    .ok()
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
            })
            .collect();
        relative_files.sort();
        relative_files
    }

    /// Assert that `path` (relative to the workspace root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        assert!(
            self.path(path).exists(),
            "Expected file to exist: {path}"
        );
    }

    /// Assert that `path` (relative to the workspace root) does not exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        assert!(
            !self.path(path).exists(),
            "Expected file to not exist: {path}"
        );
    }

    /// Assert that the file at `path` contains `expected`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `expected`.
    pub fn assert_file_contains(&self, path: &str, expected: &str) {
        let content = self.read(path);
        assert!(
            content.contains(expected),
            "Expected {path} to contain {expected:?}, got:\n{content}"
        );
    }

    fn write_manifest(&self, dir: &str, manifest: serde_json::Value) -> &Self {
        let body = serde_json::to_string_pretty(&manifest).unwrap();
        self.write(&format!("packages/{dir}/package.json"), body)
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out);
        } else {
            out.push(path);
        }
    }
}
