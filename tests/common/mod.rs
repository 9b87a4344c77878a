//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::os::fd::{AsRawFd, RawFd};
use std::path::Path;

use zipfd::OpenMode;
use zipfd::adoption::{PROC_SELF_FD_PREFIX, adoption_path};

/// Mode used by the archive library when creating a new archive.
pub const CREATE: OpenMode = OpenMode::READ.union(OpenMode::WRITE).union(OpenMode::CREATE);

/// Mode used when updating an existing archive in place.
pub const EXISTING: OpenMode = OpenMode::READ.union(OpenMode::WRITE).union(OpenMode::EXISTING);

/// Writes `data` to `path`, creating or truncating the file.
pub fn write_file(path: &Path, data: &[u8]) {
    let mut file = File::create(path).unwrap();
    file.write_all(data).unwrap();
}

/// Returns the adoption path for an open file.
pub fn adoption_path_of(file: &File) -> String {
    adoption_path(PROC_SELF_FD_PREFIX, file.as_raw_fd())
}

/// Duplicates `fd` onto `target`, returning `target`.
///
/// Tests that check whether a descriptor was closed use a fixed high
/// number so that a concurrently running test cannot reuse it.
pub fn dup_to(fd: RawFd, target: RawFd) -> RawFd {
    nix::unistd::dup2(fd, target).unwrap()
}

/// Returns true if `fd` is an open descriptor.
pub fn fd_is_open(fd: RawFd) -> bool {
    zipfd::adoption::is_open(fd)
}

/// Returns the device and inode `fd` refers to, or `None` if it is closed.
pub fn file_identity(fd: RawFd) -> Option<(u64, u64)> {
    nix::sys::stat::fstat(fd)
        .ok()
        .map(|stat| (stat.st_dev as u64, stat.st_ino as u64))
}
