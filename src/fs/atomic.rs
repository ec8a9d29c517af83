//! Directory-handle primitives behind the atomic replace sequence.
//!
//! Every mutation is performed relative to an open directory handle:
//! `open_parent_dir(parent) -> openat(tmp, O_EXCL) -> renameat(tmp, final) -> fsync(dirfd)`.
//! Holding the handle keeps the temp file and the final rename in the same
//! directory even if the parent path is renamed underneath us.
use std::ffi::{OsStr, OsString};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rustix::fd::OwnedFd;
use rustix::fs::{openat, renameat, unlinkat, AtFlags, Mode, OFlags, CWD};
use rustix::io::Errno;

use crate::constants::{NAME_MAX, TMP_FILE_MODE, TMP_NAME_ATTEMPTS, TMP_SUFFIX};

pub(crate) fn errno_to_io(e: Errno) -> io::Error {
    io::Error::from_raw_os_error(e.raw_os_error())
}

// Global counter to produce unique temporary names within a process.
static NEXT_TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Open a directory with `O_DIRECTORY` for `*at` operations.
///
/// # Errors
///
/// Returns an IO error if the directory cannot be opened.
pub fn open_parent_dir(dir: &Path) -> io::Result<OwnedFd> {
    openat(
        CWD,
        dir,
        OFlags::RDONLY | OFlags::DIRECTORY | OFlags::CLOEXEC,
        Mode::empty(),
    )
    .map_err(errno_to_io)
}

/// Fsync a directory using an already-open directory file descriptor.
///
/// # Errors
///
/// Returns an IO error if the fsync fails.
pub fn fsync_dirfd(dirfd: &OwnedFd) -> io::Result<()> {
    rustix::fs::fsync(dirfd).map_err(errno_to_io)
}

/// Build a candidate temp name for `base`: `.{base}.{pid}.{ctr}.{nonce}{TMP_SUFFIX}`.
///
/// `base` is cut on a byte boundary so the whole name fits in `NAME_MAX`.
#[must_use]
pub fn tmp_name_for(base: &OsStr) -> OsString {
    let pid = std::process::id();
    let ctr = NEXT_TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    let suffix = format!(".{pid}.{ctr}.{nonce:08x}{TMP_SUFFIX}");
    let room = NAME_MAX.saturating_sub(1 + suffix.len());
    let bytes = base.as_bytes();
    let mut name = OsString::from(".");
    name.push(OsStr::from_bytes(&bytes[..bytes.len().min(room)]));
    name.push(suffix);
    name
}

/// Create a fresh temp file next to `base` inside `dirfd`.
///
/// The file is opened with `O_CREAT | O_EXCL`, so an existing entry is never
/// reused; on `EEXIST` a new name is drawn, up to `TMP_NAME_ATTEMPTS` times.
///
/// # Errors
///
/// Returns an IO error if creation fails or no free name was found.
pub fn create_unique_tmp(
    dirfd: &OwnedFd,
    base: &OsStr,
    access: OFlags,
) -> io::Result<(OsString, OwnedFd)> {
    let flags = access | OFlags::CREATE | OFlags::EXCL | OFlags::CLOEXEC;
    for _ in 0..TMP_NAME_ATTEMPTS {
        let name = tmp_name_for(base);
        match openat(
            dirfd,
            name.as_os_str(),
            flags,
            Mode::from_bits_truncate(TMP_FILE_MODE),
        ) {
            Ok(fd) => return Ok((name, fd)),
            Err(e) if e == Errno::EXIST => continue,
            Err(e) => return Err(errno_to_io(e)),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "no free temporary file name",
    ))
}

/// Open an existing entry of `dirfd` read-only. `Ok(None)` when it does not exist.
///
/// `O_NONBLOCK` keeps a FIFO at `name` from blocking the open; it has no effect
/// on regular files.
///
/// # Errors
///
/// Returns an IO error for any failure other than `ENOENT`.
pub fn open_existing(dirfd: &OwnedFd, name: &OsStr) -> io::Result<Option<OwnedFd>> {
    match openat(
        dirfd,
        name,
        OFlags::RDONLY | OFlags::NONBLOCK | OFlags::CLOEXEC,
        Mode::empty(),
    ) {
        Ok(fd) => Ok(Some(fd)),
        Err(e) if e == Errno::NOENT => Ok(None),
        Err(e) => Err(errno_to_io(e)),
    }
}

/// Atomically rename `from` onto `to`, both relative to `dirfd`.
///
/// # Errors
///
/// Returns the rename error unchanged (e.g. `EISDIR`, `EACCES`).
pub fn rename_in_dir(dirfd: &OwnedFd, from: &OsStr, to: &OsStr) -> io::Result<()> {
    renameat(dirfd, from, dirfd, to).map_err(errno_to_io)
}

/// Remove `name` from `dirfd`. A missing entry counts as removed.
///
/// # Errors
///
/// Returns an IO error for any failure other than `ENOENT`.
pub fn unlink_in_dir(dirfd: &OwnedFd, name: &OsStr) -> io::Result<()> {
    match unlinkat(dirfd, name, AtFlags::empty()) {
        Ok(()) => Ok(()),
        Err(e) if e == Errno::NOENT => Ok(()),
        Err(e) => Err(errno_to_io(e)),
    }
}
