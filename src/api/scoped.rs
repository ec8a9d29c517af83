//! Scoped use: commit when the body succeeds, abort when it fails.
use std::path::Path;

use super::AtomicFile;
use crate::types::{AtomicFileError, Options};

pub(crate) fn run<T, E, F>(path: &Path, opts: &Options, body: F) -> Result<T, E>
where
    F: FnOnce(&mut AtomicFile) -> Result<T, E>,
    E: From<AtomicFileError>,
{
    let mut file = AtomicFile::with_options(path, opts)?;
    match body(&mut file) {
        Ok(value) => {
            file.commit()?;
            Ok(value)
        }
        Err(err) => {
            // The body's error wins; a failed cleanup is only logged.
            if let Err(cleanup) = file.abort() {
                log::warn!("{cleanup}");
            }
            Err(err)
        }
    }
}

/// Replace `path` through a scoped [`AtomicFile`] opened with default [`Options`].
///
/// The body receives the handle itself, so it may call [`AtomicFile::abort`] or
/// [`AtomicFile::commit`] early; the closing commit is then a no-op. If the body
/// returns `Err` (or panics), the temp file is discarded and the target is left
/// as it was; the body's error is returned unchanged.
///
/// # Errors
///
/// Returns the body's error, or a construction or commit error converted into `E`.
///
/// ```no_run
/// use std::io::Write;
///
/// atomicfile::scoped("/etc/app.conf", |f| -> std::io::Result<()> {
///     f.set_len(0)?;
///     f.write_all(b"listen = 8080\n")
/// })?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn scoped<T, E, F>(path: impl AsRef<Path>, body: F) -> Result<T, E>
where
    F: FnOnce(&mut AtomicFile) -> Result<T, E>,
    E: From<AtomicFileError>,
{
    run(path.as_ref(), &Options::default(), body)
}

/// Replace the content of `path` with `contents`, atomically and durably.
///
/// The existing target is not read; the new file gets mode `0o600` (before umask).
///
/// # Errors
///
/// Returns an [`AtomicFileError`] if the temp file cannot be prepared or written,
/// or the commit fails. The target is unchanged on error.
pub fn write_atomic(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> crate::Result<()> {
    use std::io::Write as _;
    let opts = Options::new().copy_existing(false);
    run(path.as_ref(), &opts, |f| {
        let tmp = f.temp_path().to_path_buf();
        f.write_all(contents.as_ref())
            .map_err(|e| AtomicFileError::io(tmp, e))
    })
}
