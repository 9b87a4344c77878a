//! Per-stream file handles.
//!
//! A [`FileHandle`] binds one OS descriptor to the filename it was opened
//! under and records who is responsible for closing it. Handles opened by
//! the adapter own their descriptor; adopted handles borrow a descriptor the
//! caller still owns and only hold its registry entry.

use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::mem::ManuallyDrop;
use std::os::fd::{AsRawFd, FromRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::Result;
use crate::registry::SharedRegistry;

/// Who closes a handle's descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// The adapter opened the descriptor and closes it on [`FileHandle::close`].
    OwnedByAdapter,
    /// The caller handed the descriptor over; closing the handle only
    /// releases its registry entry.
    AdoptedExternal,
}

/// An open stream.
///
/// The descriptor and filename never change after creation. The filename
/// is kept as raw OS bytes, so names that are not UTF-8 survive unchanged. A handle is
/// consumed by [`close`](Self::close); dropping it without closing performs
/// the same release but discards the status.
pub struct FileHandle {
    fd: RawFd,
    filename: Box<OsStr>,
    ownership: Ownership,
    /// Registry holding the adoption entry. `Some` only for adopted handles.
    registry: Option<SharedRegistry>,
    released: bool,
}

impl FileHandle {
    /// Wraps a descriptor the adapter just opened.
    pub(crate) fn owned(fd: RawFd, filename: &OsStr) -> Self {
        Self {
            fd,
            filename: filename.into(),
            ownership: Ownership::OwnedByAdapter,
            registry: None,
            released: false,
        }
    }

    /// Wraps a descriptor already recorded in `registry`.
    pub(crate) fn adopted(fd: RawFd, filename: &OsStr, registry: SharedRegistry) -> Self {
        Self {
            fd,
            filename: filename.into(),
            ownership: Ownership::AdoptedExternal,
            registry: Some(registry),
            released: false,
        }
    }

    /// Returns the OS descriptor.
    pub fn fd(&self) -> RawFd {
        self.fd
    }

    /// Returns the filename the handle was opened under.
    pub fn filename(&self) -> &OsStr {
        &self.filename
    }

    /// Returns the filename length including a terminating NUL.
    pub fn filename_len(&self) -> usize {
        self.filename.as_bytes().len() + 1
    }

    /// Returns who closes the descriptor.
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Returns true if the descriptor was adopted from the caller.
    pub fn is_adopted(&self) -> bool {
        self.ownership == Ownership::AdoptedExternal
    }

    /// Closes the stream.
    ///
    /// An owned descriptor is closed and the OS status returned. An adopted
    /// descriptor is left open and removed from the registry; this always
    /// succeeds.
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        match self.ownership {
            Ownership::OwnedByAdapter => {
                log::debug!("closing fd {} ({})", self.fd, self.display_name());
                nix::unistd::close(self.fd)?;
            }
            Ownership::AdoptedExternal => {
                if let Some(registry) = self.registry.take() {
                    match registry.try_borrow_mut() {
                        Ok(mut registry) => {
                            registry.remove(self.fd);
                            log::debug!(
                                "released adopted fd {} ({})",
                                self.fd,
                                self.display_name()
                            );
                        }
                        Err(_) => log::warn!(
                            "registry busy, adopted fd {} stays registered",
                            self.fd
                        ),
                    }
                }
            }
        }
        Ok(())
    }

    fn display_name(&self) -> std::path::Display<'_> {
        Path::new(&*self.filename).display()
    }

    /// Borrows the descriptor as a [`File`] that is never dropped.
    fn file(&self) -> ManuallyDrop<File> {
        // SAFETY: `fd` stays open for the lifetime of the handle, and the
        // `File` is wrapped in `ManuallyDrop` so it never closes it.
        ManuallyDrop::new(unsafe { File::from_raw_fd(self.fd) })
    }
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.release() {
                log::warn!("closing fd {} on drop failed: {}", self.fd, e);
            }
        }
    }
}

impl AsRawFd for FileHandle {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file().read(buf)
    }
}

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file().seek(pos)
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("fd", &self.fd)
            .field("filename", &self.filename)
            .field("ownership", &self.ownership)
            .finish()
    }
}
