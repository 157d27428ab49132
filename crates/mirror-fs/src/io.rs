//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};

use fs2::FileExt;
use walkdir::WalkDir;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file in the same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    let written = temp_file
        .write_all(content)
        .and_then(|_| temp_file.sync_all())
        .map_err(|e| Error::io(&temp_path, e));

    // Unlocked on drop as well; released before the rename either way
    let _ = temp_file.unlock();
    drop(temp_file);

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, &native_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(&native_path, e)
    })
}

/// Write content atomically after verifying that no existing component
/// between `root` and `path` is a symlink.
pub fn write_atomic_within(
    root: &NormalizedPath,
    path: &NormalizedPath,
    content: &[u8],
) -> Result<()> {
    ensure_no_symlinks(root, path)?;
    write_atomic(path, content)
}

/// Reject `path` if it is outside `root` or if any existing component below
/// `root` (including `path` itself) is a symlink.
pub fn ensure_no_symlinks(root: &NormalizedPath, path: &NormalizedPath) -> Result<()> {
    let relative = path.relative_to(root).ok_or_else(|| Error::OutsideRoot {
        path: path.to_native(),
        root: root.to_native(),
    })?;

    let mut current = root.clone();
    for component in relative.components() {
        current = current.join(component);
        match fs::symlink_metadata(current.to_native()) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(Error::SymlinkInPath {
                    path: current.to_native(),
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => break,
            Err(e) => return Err(Error::io(current.to_native(), e)),
        }
    }
    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read raw bytes from a file.
pub fn read_bytes(path: &NormalizedPath) -> Result<Vec<u8>> {
    let native_path = path.to_native();
    fs::read(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read raw bytes, returning `None` when the file does not exist.
pub fn read_bytes_if_exists(path: &NormalizedPath) -> Result<Option<Vec<u8>>> {
    match read_bytes(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Remove a single file.
pub fn remove_file(path: &NormalizedPath) -> Result<()> {
    let native_path = path.to_native();
    fs::remove_file(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// List every non-directory entry beneath `root`, sorted by path.
///
/// Symlinks are reported as entries and never followed. A missing `root`
/// yields an empty list.
pub fn list_files(root: &NormalizedPath) -> Result<Vec<NormalizedPath>> {
    if fs::symlink_metadata(root.to_native()).is_err() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root.to_native())
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_dir() {
            files.push(NormalizedPath::new(entry.path()));
        }
    }
    files.sort();
    Ok(files)
}

/// Remove empty directories beneath `root`, deepest first.
///
/// `root` itself is kept. Returns the number of directories removed.
pub fn prune_empty_dirs(root: &NormalizedPath) -> Result<usize> {
    if !root.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in WalkDir::new(root.to_native())
        .min_depth(1)
        .follow_links(false)
        .contents_first(true)
    {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let is_empty = fs::read_dir(entry.path())
            .map_err(|e| Error::io(entry.path(), e))?
            .next()
            .is_none();
        if is_empty {
            fs::remove_dir(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            tracing::debug!(path = %entry.path().display(), "removed empty directory");
            removed += 1;
        }
    }
    Ok(removed)
}

fn walk_error(root: &NormalizedPath, err: walkdir::Error) -> Error {
    let path = err
        .path()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| root.to_native());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    Error::io(path, source)
}
