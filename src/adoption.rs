//! Descriptor hand-off through `/proc/self/fd/<N>` paths.
//!
//! Archive libraries that only accept filenames have no way to be handed an
//! already-open descriptor. The convention used here is to disguise the
//! descriptor as a path under the process's own descriptor directory: a fixed
//! prefix followed immediately by the decimal descriptor number. No other
//! filename form triggers adoption.
//!
//! # Example
//!
//! ```rust
//! use zipfd::adoption::{adoption_path, parse_adoption_path, PROC_SELF_FD_PREFIX};
//!
//! let path = adoption_path(PROC_SELF_FD_PREFIX, 7);
//! assert_eq!(path, "/proc/self/fd/7");
//! assert_eq!(parse_adoption_path(&path, PROC_SELF_FD_PREFIX).unwrap().unwrap(), 7);
//!
//! // Not an adoption path at all
//! assert!(parse_adoption_path("archive.zip", PROC_SELF_FD_PREFIX).is_none());
//!
//! // Adoption path with trailing garbage
//! assert!(parse_adoption_path("/proc/self/fd/7x", PROC_SELF_FD_PREFIX).unwrap().is_err());
//! ```

use std::ffi::OsStr;
use std::os::fd::RawFd;
use std::os::unix::ffi::OsStrExt;

use nix::errno::Errno;
use nix::fcntl::{FcntlArg, fcntl};

use crate::{Error, Result};

/// Directory through which a process sees its own open descriptors.
pub const PROC_SELF_FD_PREFIX: &str = "/proc/self/fd/";

/// Builds the path that hands `fd` over under `prefix`.
pub fn adoption_path(prefix: &str, fd: RawFd) -> String {
    format!("{}{}", prefix, fd)
}

/// Parses an adoption path.
///
/// Returns `None` if `path` does not start with `prefix`, so it should be
/// opened as an ordinary file. The prefix is matched on the raw bytes of the
/// path. Otherwise the whole remainder must be a base-10 integer that fits a
/// [`RawFd`]; partial parses, surrounding whitespace, trailing characters and
/// non-UTF-8 bytes are rejected with [`Error::MalformedAdoptionPath`].
pub fn parse_adoption_path(path: impl AsRef<OsStr>, prefix: &str) -> Option<Result<RawFd>> {
    let path = path.as_ref();
    let digits = path.as_bytes().strip_prefix(prefix.as_bytes())?;
    Some(
        parse_descriptor(digits).ok_or_else(|| Error::MalformedAdoptionPath {
            path: path.to_string_lossy().into_owned(),
        }),
    )
}

fn parse_descriptor(digits: &[u8]) -> Option<RawFd> {
    if digits.is_empty() {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse::<RawFd>().ok()
}

/// Returns true if `fd` refers to an open descriptor in this process.
///
/// Only `EBADF` counts as closed; any other `fcntl` failure leaves the
/// descriptor presumed open.
pub fn is_open(fd: RawFd) -> bool {
    match fcntl(fd, FcntlArg::F_GETFD) {
        Ok(_) => true,
        Err(Errno::EBADF) => false,
        Err(_) => true,
    }
}
