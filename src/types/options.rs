use std::path::Path;

use rustix::fs::OFlags;

use crate::api::AtomicFile;
use crate::types::errors::{AtomicFileError, Result};

/// How the temp file is opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessMode {
    /// Read and write, positioned at the start (update in place).
    #[default]
    ReadWrite,
    /// Write only; reads fail with the OS error.
    WriteOnly,
    /// Read and write; every write lands at the end of the file.
    Append,
}

impl AccessMode {
    pub(crate) fn oflags(self) -> OFlags {
        match self {
            AccessMode::ReadWrite => OFlags::RDWR,
            AccessMode::WriteOnly => OFlags::WRONLY,
            AccessMode::Append => OFlags::RDWR | OFlags::APPEND,
        }
    }
}

/// Options governing how an [`AtomicFile`] is created and installed.
///
/// Defaults: read/write access, seeded from the existing target, durable commit,
/// no explicit permissions.
#[derive(Clone, Debug)]
pub struct Options {
    /// How the temp file is opened.
    pub access: AccessMode,
    /// Copy the existing target's content, ownership and mode into the temp file.
    pub copy_existing: bool,
    /// Fsync the temp file before the rename and the directory after it.
    pub durable: bool,
    /// Permission bits for the temp file; overrides those copied from the target.
    pub permissions: Option<u32>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            access: AccessMode::ReadWrite,
            copy_existing: true,
            durable: true,
            permissions: None,
        }
    }
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn access(mut self, access: AccessMode) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn copy_existing(mut self, yes: bool) -> Self {
        self.copy_existing = yes;
        self
    }

    #[must_use]
    pub fn durable(mut self, yes: bool) -> Self {
        self.durable = yes;
        self
    }

    #[must_use]
    pub fn permissions(mut self, mode: u32) -> Self {
        self.permissions = Some(mode);
        self
    }

    /// Create an [`AtomicFile`] for `path` with these options.
    ///
    /// # Errors
    ///
    /// See [`AtomicFile::with_options`].
    pub fn open(&self, path: impl AsRef<Path>) -> Result<AtomicFile> {
        AtomicFile::with_options(path, self)
    }

    /// Scoped use with these options; see [`crate::scoped`].
    ///
    /// # Errors
    ///
    /// Returns the body's error unchanged, or a construction/commit error.
    pub fn scoped<T, E, F>(&self, path: impl AsRef<Path>, body: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut AtomicFile) -> std::result::Result<T, E>,
        E: From<AtomicFileError>,
    {
        crate::api::scoped::run(path.as_ref(), self, body)
    }
}
