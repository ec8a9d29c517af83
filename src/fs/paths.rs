//! Path utilities for atomicfile.

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolve `path` to an absolute form and split it into `(absolute, parent, file_name)`.
///
/// The path is made absolute lexically (no symlink resolution), so a symlink at
/// the target is replaced by the install rather than followed.
///
/// # Errors
///
/// Returns `InvalidInput` when the path has no final file-name component
/// (e.g. `/`, `dir/..`), or an error from resolving the current directory.
pub fn split_target(path: &Path) -> io::Result<(PathBuf, PathBuf, OsString)> {
    if matches!(path.components().next_back(), Some(Component::ParentDir) | None) {
        return Err(invalid(path));
    }
    let abs = std::path::absolute(path)?;
    let name = abs.file_name().ok_or_else(|| invalid(path))?.to_os_string();
    let parent = abs
        .parent()
        .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
    Ok((abs, parent, name))
}

fn invalid(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("path has no file name: {}", path.display()),
    )
}
