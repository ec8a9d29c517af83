//! Seeding helpers: metadata copy and bounded content copy from an existing target.
//!
//! - `copy_owner_and_mode(src, dst)`: carry uid/gid (best effort) and permission bits over.
//! - `apply_mode(dst, bits)`: set explicit permission bits on the temp file.
//! - `copy_contents(src, dst)`: stream bytes in `COPY_CHUNK_BYTES` chunks.
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::unix::fs::MetadataExt;

use rustix::fs::{fchmod, Mode};

use super::atomic::errno_to_io;
use crate::constants::COPY_CHUNK_BYTES;

/// Permission bits (including setuid/setgid/sticky) of a raw `st_mode`.
const PERM_MASK: u32 = 0o7777;

/// Copy ownership and permission bits from `src` onto `dst`.
///
/// Ownership is only changed when it differs; `EPERM` from `fchown` is ignored
/// since unprivileged callers cannot give files away. Mode is applied after
/// ownership so a chown cannot clear freshly copied setuid/setgid bits.
///
/// # Errors
///
/// Returns an IO error if metadata cannot be read or `fchmod` fails.
pub fn copy_owner_and_mode(src: &File, dst: &File) -> io::Result<()> {
    let want = src.metadata()?;
    let have = dst.metadata()?;
    if want.uid() != have.uid() || want.gid() != have.gid() {
        match std::os::unix::fs::fchown(dst, Some(want.uid()), Some(want.gid())) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                log::debug!("ownership not copied to temp file: {e}");
            }
            Err(e) => return Err(e),
        }
    }
    apply_mode(dst, want.mode())
}

/// Apply permission bits to `dst`; file-type bits in `bits` are ignored.
///
/// # Errors
///
/// Returns an IO error if `fchmod` fails.
pub fn apply_mode(dst: &File, bits: u32) -> io::Result<()> {
    fchmod(dst, Mode::from_bits_truncate(bits & PERM_MASK)).map_err(errno_to_io)
}

/// Stream all remaining bytes of `src` into `dst` in bounded chunks.
/// Returns the number of bytes copied.
///
/// # Errors
///
/// Returns the first read or write error encountered.
pub fn copy_contents(src: &mut File, dst: &mut File) -> io::Result<u64> {
    let mut buf = vec![0u8; COPY_CHUNK_BYTES];
    let mut total: u64 = 0;
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        dst.write_all(&buf[..n])?;
        total += n as u64;
    }
}
