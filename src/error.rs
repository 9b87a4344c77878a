//! Error types for descriptor-aware file access.
//!
//! This module provides the [`Error`] enum, which represents every way an
//! open, read, write, seek or close through the adapter can fail, along with
//! a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! Every fallible operation in the safe API returns `Result<T, Error>`. Null
//! and negative sentinels only appear at the C callback boundary
//! (see [`crate::ffi`]), where each `Error` collapses to the sentinel the
//! archive library expects.
//!
//! ```rust,no_run
//! use zipfd::{Error, FdFileFunctions, FileFunctions, OpenMode};
//!
//! let functions = FdFileFunctions::new();
//! match functions.open("/proc/self/fd/7", OpenMode::READ) {
//!     Ok(handle) => println!("opened {:?}", handle.filename()),
//!     Err(Error::DuplicateAdoption { fd }) => eprintln!("fd {} is already in use", fd),
//!     Err(Error::InvalidDescriptor { fd }) => eprintln!("fd {} is not open", fd),
//!     Err(e) => eprintln!("open failed: {}", e),
//! }
//! ```

use std::io;
use std::os::fd::RawFd;

/// The main error type for adapter operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Resources | [`AllocationFailure`][Self::AllocationFailure] | Registry could not grow |
/// | Caller input | [`InvalidMode`][Self::InvalidMode], [`UnknownSeekOrigin`][Self::UnknownSeekOrigin] | Unrecognized flags or codes |
/// | Adoption | [`MalformedAdoptionPath`][Self::MalformedAdoptionPath], [`InvalidDescriptor`][Self::InvalidDescriptor], [`DuplicateAdoption`][Self::DuplicateAdoption] | Descriptor hand-off problems |
/// | I/O | [`Io`][Self::Io] | The OS open/read/write/seek/close call failed |
/// | Volumes | [`NoExtensionFound`][Self::NoExtensionFound] | Split-archive name cannot be derived |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The descriptor registry could not obtain memory to grow.
    ///
    /// The registry is left exactly as it was before the failed insert.
    #[error("Allocation failure: could not grow registry to {requested} entries")]
    AllocationFailure {
        /// The capacity that was requested.
        requested: usize,
    },

    /// No recognized mode bit translated to OS open flags.
    #[error("Invalid open mode: {bits:#x}")]
    InvalidMode {
        /// The raw mode bits supplied by the caller.
        bits: u32,
    },

    /// The path carries the adoption prefix but the remainder is not a clean
    /// base-10 integer that fits a descriptor.
    #[error("Malformed adoption path: {path}")]
    MalformedAdoptionPath {
        /// The full path that was rejected.
        path: String,
    },

    /// The parsed descriptor is not currently open in this process.
    #[error("Descriptor {fd} is not open")]
    InvalidDescriptor {
        /// The parsed descriptor value.
        fd: RawFd,
    },

    /// The descriptor is already adopted by a live handle.
    #[error("Descriptor {fd} is already adopted")]
    DuplicateAdoption {
        /// The parsed descriptor value.
        fd: RawFd,
    },

    /// An OS-level open, read, write, seek or close call failed.
    ///
    /// The wrapped error is the OS's own failure indicator, unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A seek origin code outside {SET, CUR, END}.
    #[error("Unknown seek origin: {origin}")]
    UnknownSeekOrigin {
        /// The raw origin code.
        origin: i32,
    },

    /// Multi-volume resolution could not find a `.` to rewrite.
    #[error("No extension found in '{filename}'")]
    NoExtensionFound {
        /// The filename that was scanned.
        filename: String,
    },
}

impl Error {
    /// Returns true if the error came from the descriptor hand-off path.
    pub fn is_adoption_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedAdoptionPath { .. }
                | Error::InvalidDescriptor { .. }
                | Error::DuplicateAdoption { .. }
        )
    }

    /// Returns the raw OS error code for [`Error::Io`] errors.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

impl From<nix::errno::Errno> for Error {
    fn from(errno: nix::errno::Errno) -> Self {
        Error::Io(io::Error::from_raw_os_error(errno as i32))
    }
}

/// A specialized Result type for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;
