//! Shared crate-wide constants for atomicfile.
//!
//! Centralizes magic values used across modules.

/// Temporary filename suffix used for staging next to the target.
/// The temporary name is constructed as `.{fname}.{pid}.{ctr}.{nonce}{TMP_SUFFIX}`;
/// e.g., `.config.toml.4211.0.1f3a9c2e.atomicfile.tmp`.
pub const TMP_SUFFIX: &str = ".atomicfile.tmp";

/// Longest single path component accepted by Linux filesystems (`NAME_MAX`).
/// Temp names truncate the target's base name to stay within it.
pub const NAME_MAX: usize = 255;

/// Mode requested when creating the temporary file (before umask), matching `mkstemp`.
pub const TMP_FILE_MODE: u32 = 0o600;

/// Number of candidate names tried before giving up on temp-file creation.
pub const TMP_NAME_ATTEMPTS: usize = 16;

/// Chunk size used when seeding the temporary file from an existing target.
pub const COPY_CHUNK_BYTES: usize = 16 * 1024;
