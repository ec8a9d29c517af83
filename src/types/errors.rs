//! Error types used across atomicfile.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Step of `commit()` that failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommitStage {
    /// Flushing or fsyncing the temp file.
    Sync,
    /// Renaming the temp file over the target.
    Rename,
}

impl std::fmt::Display for CommitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CommitStage::Sync => "sync",
            CommitStage::Rename => "rename",
        })
    }
}

#[derive(Debug, Error)]
pub enum AtomicFileError {
    /// The temp file could not be created or seeded. Nothing is left on disk.
    #[error("cannot prepare atomic replacement of {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A handle-level I/O operation failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Installing the temp file failed. The handle is aborted and the target unchanged.
    /// `cleanup` is set when removing the temp file afterwards failed as well.
    #[error("commit to {} failed during {stage}: {source}", target.display())]
    Commit {
        target: PathBuf,
        stage: CommitStage,
        #[source]
        source: io::Error,
        cleanup: Option<io::Error>,
    },
}

impl AtomicFileError {
    pub(crate) fn resource(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Resource {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ErrorId {
        match self {
            Self::Resource { .. } => ErrorId::E_RESOURCE,
            Self::Io { .. } => ErrorId::E_IO,
            Self::Commit { .. } => ErrorId::E_COMMIT,
        }
    }

    /// The underlying OS error.
    #[must_use]
    pub fn io_error(&self) -> &io::Error {
        match self {
            Self::Resource { source, .. } | Self::Io { source, .. } | Self::Commit { source, .. } => {
                source
            }
        }
    }
}

impl From<AtomicFileError> for io::Error {
    fn from(e: AtomicFileError) -> Self {
        io::Error::new(e.io_error().kind(), e)
    }
}

/// Convenient alias for results returning an `AtomicFileError`.
pub type Result<T> = std::result::Result<T, AtomicFileError>;

// Stable identifiers for log routing and exit codes.
// We intentionally keep SCREAMING_SNAKE_CASE to match emitted IDs.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorId {
    E_RESOURCE,
    E_IO,
    E_COMMIT,
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_RESOURCE => "E_RESOURCE",
        ErrorId::E_IO => "E_IO",
        ErrorId::E_COMMIT => "E_COMMIT",
    }
}

#[must_use]
pub const fn exit_code_for(id: ErrorId) -> i32 {
    match id {
        ErrorId::E_RESOURCE => 10,
        ErrorId::E_IO => 20,
        ErrorId::E_COMMIT => 30,
    }
}
