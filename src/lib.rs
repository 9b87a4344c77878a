//! # zipfd
//!
//! File access callbacks for zip archive libraries that work on both plain
//! paths and file descriptors the calling process already holds.
//!
//! Archive libraries in the minizip family open their files by name through
//! a table of callbacks. This crate implements that table over OS
//! descriptors and adds two things the stock implementation lacks:
//!
//! - **Descriptor adoption**: a path of the form `/proc/self/fd/<N>` hands
//!   descriptor `N` to the adapter without reopening it. Adopted descriptors
//!   are tracked in a [`DescriptorRegistry`] so they are never closed by the
//!   adapter and never adopted twice at the same time.
//! - **Split archives**: disk 0 of `backup.zip` is resolved to
//!   `backup.z01`, disk 1 to `backup.z02`, and so on, and opened through
//!   the same rules.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::os::fd::AsRawFd;
//! use zipfd::{FdFileFunctions, FileFunctions, OpenMode, Result, adoption};
//!
//! fn main() -> Result<()> {
//!     let functions = FdFileFunctions::new();
//!
//!     // A descriptor received from elsewhere, e.g. over a socket
//!     let file = std::fs::File::open("backup.zip")?;
//!     let path = adoption::adoption_path(adoption::PROC_SELF_FD_PREFIX, file.as_raw_fd());
//!
//!     let mut handle = functions.open(&path, OpenMode::READ)?;
//!     let mut signature = [0u8; 4];
//!     functions.read(&mut handle, &mut signature)?;
//!     functions.close(handle)?;
//!
//!     // `file` is still open and owned by us
//!     drop(file);
//!     Ok(())
//! }
//! ```
//!
//! ## Passing the Callbacks to C
//!
//! With the default `ffi` feature, [`ffi::ZlibFileFunc64Def`] is a
//! layout-compatible `zlib_filefunc64_def`:
//!
//! ```rust
//! use zipfd::FdFileFunctions;
//! use zipfd::ffi::ZlibFileFunc64Def;
//!
//! let functions = FdFileFunctions::new();
//! let def = ZlibFileFunc64Def::for_adapter(&functions);
//! // unzOpen2_64(path, &def) ...
//! # let _ = def;
//! ```
//!
//! ## Threading
//!
//! All calls block in the OS and nothing is buffered. Adapters and their
//! registries are single-threaded (`!Send`); share a registry between
//! adapters on one thread with [`SharedRegistry`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `ffi` | Yes | C callback table and `extern "C"` entry points |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod adapter;
pub mod adoption;
pub mod error;
pub mod functions;
pub mod handle;
pub mod mode;
pub mod options;
pub mod registry;
pub mod volume;

#[cfg(feature = "ffi")]
#[cfg_attr(docsrs, doc(cfg(feature = "ffi")))]
pub mod ffi;

pub use adapter::FdFileFunctions;
pub use error::{Error, Result};
pub use functions::FileFunctions;
pub use handle::{FileHandle, Ownership};
pub use mode::{OpenMode, SeekOrigin};
pub use options::AdapterOptions;
pub use registry::{DescriptorRegistry, RemoveOutcome, SharedRegistry};
pub use volume::disk_filename;
