//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to forward slashes with dot segments resolved.
///
/// Normalization is purely lexical: `.` segments and empty segments are
/// dropped, `..` pops the previous segment. A `..` that cannot be popped is
/// kept on relative paths (so an escape stays visible to [`is_inside`]) and
/// clamped at the root of absolute paths.
///
/// [`is_inside`]: NormalizedPath::is_inside
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes and resolves dot segments.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment, resolving dot segments.
    ///
    /// The segment is always treated as relative to `self`.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        if segment_normalized.is_empty() {
            return self.clone();
        }
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self {
            inner: clean(&joined),
        }
    }

    /// Get the parent directory.
    ///
    /// A single relative segment has `.` as its parent; `.` and filesystem
    /// roots have none.
    pub fn parent(&self) -> Option<Self> {
        if self.components().is_empty() {
            None
        } else {
            Some(self.join(".."))
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.components()
            .last()
            .copied()
            .filter(|name| *name != "..")
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }

    /// Get the file name without its extension.
    pub fn file_stem(&self) -> Option<&str> {
        self.file_name().map(|name| match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        })
    }

    /// Whether the path is anchored at a root (`/`, `C:/` or `//server`).
    pub fn is_absolute(&self) -> bool {
        root_prefix_len(&self.inner) > 0
    }

    /// Whether a relative path climbs above its starting directory.
    pub fn escapes_root(&self) -> bool {
        !self.is_absolute() && self.components().first() == Some(&"..")
    }

    /// Path segments after the root prefix. `.` has no segments.
    pub fn components(&self) -> Vec<&str> {
        let body = &self.inner[root_prefix_len(&self.inner)..];
        body.split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .collect()
    }

    /// Whether `self` equals `root` or lies beneath it.
    ///
    /// Comparison is per segment, so `/docs-extra` is not within `/docs`.
    pub fn is_within(&self, root: &NormalizedPath) -> bool {
        if self.prefix() != root.prefix() {
            return false;
        }
        let root_parts = root.components();
        let parts = self.components();
        parts.len() >= root_parts.len()
            && parts[..root_parts.len()] == root_parts[..]
            && !parts[root_parts.len()..].contains(&"..")
    }

    /// Whether `self` lies strictly beneath `root`.
    pub fn is_inside(&self, root: &NormalizedPath) -> bool {
        self != root && self.is_within(root)
    }

    /// The path of `self` relative to `base`, if `self` is within `base`.
    pub fn relative_to(&self, base: &NormalizedPath) -> Option<NormalizedPath> {
        if !self.is_within(base) {
            return None;
        }
        let skip = base.components().len();
        let rest = self.components()[skip..].join("/");
        Some(Self::new(rest))
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    fn prefix(&self) -> &str {
        &self.inner[..root_prefix_len(&self.inner)]
    }
}

/// Relative path from directory `from_dir` to `to`.
///
/// Both paths must share the same anchor (both relative to one root, or both
/// absolute). Returns `.` when they are the same location.
pub fn relative_path(from_dir: &NormalizedPath, to: &NormalizedPath) -> String {
    let from = from_dir.components();
    let target = to.components();
    let common = from
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend_from_slice(&target[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Length of the root prefix: `//` for network paths, `C:/` for drive
/// paths, `/` for unix roots, nothing for relative paths.
fn root_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    if s.starts_with("//") && !s.starts_with("///") {
        2
    } else if bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && bytes[2] == b'/'
    {
        3
    } else if s.starts_with('/') {
        1
    } else {
        0
    }
}

fn clean(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let prefix_len = root_prefix_len(&unified);
    let (prefix, body) = unified.split_at(prefix_len);

    let mut parts: Vec<&str> = Vec::new();
    for part in body.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                _ if prefix.is_empty() => parts.push(".."),
                // Clamp at the filesystem root
                _ => {}
            },
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if prefix.is_empty() && body.is_empty() {
        ".".to_string()
    } else {
        format!("{prefix}{body}")
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
