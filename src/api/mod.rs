//! The atomic replacement handle.
//!
//! An [`AtomicFile`] owns a temp file in the target's directory. Writes go to the
//! temp file; [`AtomicFile::commit`] renames it over the target in one step and
//! [`AtomicFile::abort`] removes it. Dropping an open handle aborts it.
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use rustix::fd::OwnedFd;

use crate::fs::atomic::{
    create_unique_tmp, fsync_dirfd, open_existing, open_parent_dir, rename_in_dir, unlink_in_dir,
};
use crate::fs::meta::{apply_mode, copy_contents, copy_owner_and_mode};
use crate::fs::paths::split_target;
use crate::types::{AtomicFileError, CommitStage, Options, Result, State};

mod io_impls;
pub mod scoped;

/// A temp file that replaces its target atomically on [`commit`](Self::commit).
pub struct AtomicFile {
    target: PathBuf,
    tmp_path: PathBuf,
    target_name: OsString,
    tmp_name: OsString,
    dir: OwnedFd,
    file: Option<File>,
    state: State,
    durable: bool,
}

impl AtomicFile {
    /// Create a handle for `path` with default [`Options`].
    ///
    /// # Errors
    ///
    /// See [`AtomicFile::with_options`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, &Options::default())
    }

    /// Create a handle for `path`.
    ///
    /// A uniquely named temp file is created next to the target. With
    /// `copy_existing`, an existing target's ownership, mode and content are copied
    /// in and the cursor is rewound to the start.
    ///
    /// # Errors
    ///
    /// Returns [`AtomicFileError::Resource`] if the temp file cannot be created or
    /// seeded. No temp file is left behind in that case.
    pub fn with_options(path: impl AsRef<Path>, opts: &Options) -> Result<Self> {
        let path = path.as_ref();
        let (target, parent, target_name) =
            split_target(path).map_err(|e| AtomicFileError::resource(path, e))?;
        let dir = open_parent_dir(&parent).map_err(|e| AtomicFileError::resource(&target, e))?;
        let (tmp_name, fd) = create_unique_tmp(&dir, &target_name, opts.access.oflags())
            .map_err(|e| AtomicFileError::resource(&target, e))?;
        let tmp_path = parent.join(&tmp_name);
        log::debug!("created {} for {}", tmp_path.display(), target.display());

        let mut af = Self {
            target,
            tmp_path,
            target_name,
            tmp_name,
            dir,
            file: Some(File::from(fd)),
            state: State::Open,
            durable: opts.durable,
        };
        if let Err(e) = af.prepare(opts) {
            if let Err(cleanup) = af.discard() {
                log::warn!(
                    "failed to remove {} after setup error: {cleanup}",
                    af.tmp_path.display()
                );
            }
            return Err(AtomicFileError::resource(&af.target, e));
        }
        Ok(af)
    }

    fn prepare(&mut self, opts: &Options) -> io::Result<()> {
        let existing = if opts.copy_existing {
            open_existing(&self.dir, &self.target_name)?.map(File::from)
        } else {
            None
        };
        let tmp = self.file_mut()?;
        if let Some(mut src) = existing {
            if !src.metadata()?.is_file() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "existing target is not a regular file",
                ));
            }
            copy_owner_and_mode(&src, tmp)?;
            copy_contents(&mut src, tmp)?;
            tmp.seek(SeekFrom::Start(0))?;
        }
        if let Some(mode) = opts.permissions {
            apply_mode(tmp, mode)?;
        }
        Ok(())
    }

    /// Absolute path of the target.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.target
    }

    /// Absolute path of the temp file (gone once the handle is terminal).
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.tmp_path
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == State::Open
    }

    /// Borrow the underlying temp file while the handle is open.
    #[must_use]
    pub fn get_ref(&self) -> Option<&File> {
        self.file.as_ref()
    }

    /// Truncate the temp file at the current position.
    ///
    /// # Errors
    ///
    /// Returns the OS error, or an error if the handle is no longer open.
    pub fn truncate(&mut self) -> io::Result<()> {
        let pos = self.stream_position()?;
        self.set_len(pos)
    }

    /// Set the temp file's length to `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns the OS error, or an error if the handle is no longer open.
    pub fn set_len(&mut self, size: u64) -> io::Result<()> {
        self.file_mut()?.set_len(size)
    }

    /// Install the temp file at the target.
    ///
    /// With `durable`, the temp file is flushed and fsynced before the rename and the
    /// directory is fsynced after it. The temp file is closed before the rename in
    /// every case. A no-op once the handle is terminal.
    ///
    /// # Errors
    ///
    /// Returns [`AtomicFileError::Commit`] if the sync or the rename fails. The temp
    /// file is removed, the handle becomes [`State::Aborted`] and the target is
    /// unchanged.
    pub fn commit(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Ok(());
        }
        if let Some(file) = self.file.take() {
            let synced = if self.durable { sync_file(file) } else { Ok(()) };
            if let Err(e) = synced {
                return Err(self.fail_commit(CommitStage::Sync, e));
            }
        }
        if let Err(e) = rename_in_dir(&self.dir, &self.tmp_name, &self.target_name) {
            return Err(self.fail_commit(CommitStage::Rename, e));
        }
        self.state = State::Closed;
        if self.durable {
            if let Err(e) = fsync_dirfd(&self.dir) {
                log::warn!(
                    "directory fsync after installing {} failed: {e}",
                    self.target.display()
                );
            }
        }
        log::debug!("installed {}", self.target.display());
        Ok(())
    }

    /// Discard the temp file without touching the target. A no-op once terminal.
    ///
    /// # Errors
    ///
    /// Returns [`AtomicFileError::Io`] if the temp file could not be removed. The
    /// handle is [`State::Aborted`] regardless.
    pub fn abort(&mut self) -> Result<()> {
        if self.state.is_terminal() {
            return Ok(());
        }
        self.discard()
            .map_err(|e| AtomicFileError::io(&self.tmp_path, e))?;
        log::debug!("aborted replacement of {}", self.target.display());
        Ok(())
    }

    fn discard(&mut self) -> io::Result<()> {
        drop(self.file.take());
        self.state = State::Aborted;
        unlink_in_dir(&self.dir, &self.tmp_name)
    }

    fn fail_commit(&mut self, stage: CommitStage, source: io::Error) -> AtomicFileError {
        let cleanup = self.discard().err();
        log::debug!(
            "commit to {} failed during {stage}: {source}",
            self.target.display()
        );
        AtomicFileError::Commit {
            target: self.target.clone(),
            stage,
            source,
            cleanup,
        }
    }

    fn file_mut(&mut self) -> io::Result<&mut File> {
        self.file.as_mut().ok_or_else(not_open)
    }
}

fn sync_file(mut file: File) -> io::Result<()> {
    file.flush()?;
    file.sync_all()
}

fn not_open() -> io::Error {
    io::Error::other("atomic file is no longer open")
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        if let Err(e) = self.discard() {
            log::warn!(
                "failed to remove abandoned temp file {}: {e}",
                self.tmp_path.display()
            );
        }
    }
}

impl std::fmt::Debug for AtomicFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicFile")
            .field("target", &self.target)
            .field("tmp_path", &self.tmp_path)
            .field("state", &self.state)
            .field("durable", &self.durable)
            .finish_non_exhaustive()
    }
}
