#![forbid(unsafe_code)]
//! atomicfile: replace a file's content in one atomic rename.
//!
//! An [`AtomicFile`] stages writes in a uniquely named temp file in the target's
//! directory and installs it with `renameat`, so readers of the target see either
//! the old content or the new content, never a mix.
//!
//! Lifecycle:
//! - [`AtomicFile::commit`]: fsync (when durable), close, rename over the target.
//! - [`AtomicFile::abort`]: close and remove the temp file.
//! - `Drop` of an open handle: same as abort.
//! - [`scoped`]: commit on `Ok`, abort on `Err`, the body's error is returned as-is.
//!
//! ```no_run
//! use std::io::Write;
//! use atomicfile::Options;
//!
//! let mut f = Options::new().copy_existing(false).open("state.json")?;
//! f.write_all(b"{}")?;
//! f.commit()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! This crate forbids `unsafe` and uses `rustix` for the `*at` syscalls.

pub mod api;
pub mod constants;
pub(crate) mod fs;
pub mod types;

pub use api::scoped::{scoped, write_atomic};
pub use api::AtomicFile;
pub use types::{
    exit_code_for, id_str, AccessMode, AtomicFileError, CommitStage, ErrorId, Options, Result,
    State,
};
