//! Open modes and seek origins.
//!
//! The numeric values match the file function table of the zip archive
//! library, so raw codes coming across the callback boundary can be converted
//! without a lookup table.

use std::io::SeekFrom;

use bitflags::bitflags;
use nix::fcntl::OFlag;

use crate::{Error, Result};

bitflags! {
    /// Open mode requested by the archive library.
    ///
    /// The bits combine, but only one intent wins, in priority order:
    /// read-only, then read-write on an existing file, then create.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenMode: u32 {
        /// Read access.
        const READ = 1;
        /// Write access.
        const WRITE = 2;
        /// Mask isolating the read/write intent bits.
        const READ_WRITE_FILTER = Self::READ.bits() | Self::WRITE.bits();
        /// Open a file that must already exist.
        const EXISTING = 4;
        /// Create the file, truncating any previous contents.
        const CREATE = 8;
    }
}

impl OpenMode {
    /// Translates the mode into OS open flags.
    ///
    /// | Mode | Flags |
    /// |------|-------|
    /// | intent bits exactly `READ` | `O_RDONLY` |
    /// | `EXISTING` | `O_RDWR` |
    /// | `CREATE` | `O_WRONLY \| O_CREAT \| O_TRUNC` |
    ///
    /// `O_LARGEFILE` is added where the platform defines it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMode`] when none of the rows apply.
    pub fn to_oflags(self) -> Result<OFlag> {
        let access = if self & Self::READ_WRITE_FILTER == Self::READ {
            OFlag::O_RDONLY
        } else if self.contains(Self::EXISTING) {
            OFlag::O_RDWR
        } else if self.contains(Self::CREATE) {
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC
        } else {
            return Err(Error::InvalidMode { bits: self.bits() });
        };

        Ok(access | large_file())
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn large_file() -> OFlag {
    OFlag::O_LARGEFILE
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn large_file() -> OFlag {
    OFlag::empty()
}

/// Reference point for a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SeekOrigin {
    /// Offset is relative to the start of the file.
    Start = 0,
    /// Offset is relative to the current position.
    Current = 1,
    /// Offset is relative to the end of the file.
    End = 2,
}

impl SeekOrigin {
    /// Builds the [`SeekFrom`] for a 64-bit unsigned offset.
    ///
    /// Relative origins reinterpret the offset as signed, so a caller can
    /// pass `(-n) as u64` to move backwards.
    pub fn seek_from(self, offset: u64) -> SeekFrom {
        match self {
            SeekOrigin::Start => SeekFrom::Start(offset),
            SeekOrigin::Current => SeekFrom::Current(offset as i64),
            SeekOrigin::End => SeekFrom::End(offset as i64),
        }
    }
}

impl TryFrom<i32> for SeekOrigin {
    type Error = Error;

    fn try_from(origin: i32) -> Result<Self> {
        match origin {
            0 => Ok(SeekOrigin::Start),
            1 => Ok(SeekOrigin::Current),
            2 => Ok(SeekOrigin::End),
            _ => Err(Error::UnknownSeekOrigin { origin }),
        }
    }
}
