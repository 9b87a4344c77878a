//! The file function interface consumed by an archive library.
//!
//! An archive library reads and writes its container through a fixed set of
//! callbacks: open, open a split-archive disk, read, write, tell, seek, close
//! and error. [`FileFunctions`] is that set as a trait. The library side only
//! depends on the trait; [`FdFileFunctions`](crate::FdFileFunctions) is the
//! implementation backed by OS descriptors.

use std::ffi::OsStr;

use crate::Result;
use crate::mode::{OpenMode, SeekOrigin};

/// Callback set used by an archive library to access its files.
pub trait FileFunctions {
    /// Per-stream state returned by [`open`](Self::open).
    type Stream;

    /// Opens `filename` with the given mode.
    ///
    /// The name is an OS string: any byte sequence without NUL is accepted.
    fn open(&self, filename: impl AsRef<OsStr>, mode: OpenMode) -> Result<Self::Stream>;

    /// Opens disk `disk` of the split archive that `stream` belongs to.
    fn open_disk(&self, stream: &Self::Stream, disk: u32, mode: OpenMode) -> Result<Self::Stream>;

    /// Reads up to `buf.len()` bytes, returning the count the OS reported.
    fn read(&self, stream: &mut Self::Stream, buf: &mut [u8]) -> Result<usize>;

    /// Writes up to `buf.len()` bytes, returning the count the OS reported.
    fn write(&self, stream: &mut Self::Stream, buf: &[u8]) -> Result<usize>;

    /// Returns the current 64-bit offset.
    fn tell(&self, stream: &mut Self::Stream) -> Result<u64>;

    /// Moves the offset relative to `origin`.
    fn seek(&self, stream: &mut Self::Stream, offset: u64, origin: SeekOrigin) -> Result<()>;

    /// Closes the stream, consuming it.
    fn close(&self, stream: Self::Stream) -> Result<()>;

    /// Reports a sticky error for `stream`, or 0 for none.
    ///
    /// `None` stands for a null stream at the callback boundary.
    fn error(&self, stream: Option<&Self::Stream>) -> i32;
}
