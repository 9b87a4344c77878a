//! Descriptor-backed implementation of [`FileFunctions`].
//!
//! [`FdFileFunctions`] opens ordinary paths with the OS `open` call and
//! adopts descriptors handed over as `/proc/self/fd/<N>` paths. Every
//! adopted descriptor is recorded in the adapter's registry for as long as
//! its handle lives, so it can be neither adopted twice nor closed by the
//! adapter.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::io::Write;
//! use std::os::fd::AsRawFd;
//! use zipfd::{FdFileFunctions, FileFunctions, OpenMode, adoption};
//!
//! let functions = FdFileFunctions::new();
//!
//! // Regular file: opened and later closed by the adapter
//! let mut handle = functions.open("out.zip", OpenMode::READ | OpenMode::WRITE | OpenMode::CREATE)?;
//! functions.write(&mut handle, b"PK")?;
//! functions.close(handle)?;
//!
//! // Caller-owned descriptor: adopted, never closed by the adapter
//! let file = std::fs::File::open("in.zip")?;
//! let path = adoption::adoption_path(adoption::PROC_SELF_FD_PREFIX, file.as_raw_fd());
//! let handle = functions.open(&path, OpenMode::READ)?;
//! functions.close(handle)?;
//! // `file` is still open here
//! # Ok::<(), zipfd::Error>(())
//! ```

use std::ffi::OsStr;
use std::io::{Read, Seek, Write};
use std::os::fd::RawFd;
use std::path::Path;
use std::rc::Rc;

use nix::fcntl::OFlag;
use nix::sys::stat::Mode;

use crate::adoption::{is_open, parse_adoption_path};
use crate::functions::FileFunctions;
use crate::handle::FileHandle;
use crate::mode::{OpenMode, SeekOrigin};
use crate::options::AdapterOptions;
use crate::registry::{DescriptorRegistry, SharedRegistry};
use crate::volume;
use crate::{Error, Result};

/// File functions backed by OS descriptors.
///
/// Each adapter owns (or shares) exactly one [`DescriptorRegistry`]. Adapters
/// built with [`with_registry`](Self::with_registry) on the same
/// [`SharedRegistry`] refuse to adopt a descriptor that any of them already
/// holds.
#[derive(Debug)]
pub struct FdFileFunctions {
    options: AdapterOptions,
    registry: SharedRegistry,
}

impl FdFileFunctions {
    /// Creates an adapter with default options and a private registry.
    pub fn new() -> Self {
        Self::with_options(AdapterOptions::default())
    }

    /// Creates an adapter with the given options and a private registry.
    pub fn with_options(options: AdapterOptions) -> Self {
        Self::with_registry(options, DescriptorRegistry::shared())
    }

    /// Creates an adapter that records adoptions in `registry`.
    pub fn with_registry(options: AdapterOptions, registry: SharedRegistry) -> Self {
        Self { options, registry }
    }

    /// Returns the adapter's options.
    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }

    /// Returns the registry of adopted descriptors.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Seeks using a raw origin code.
    ///
    /// An unknown code fails with [`Error::UnknownSeekOrigin`] before the
    /// descriptor is touched.
    pub fn seek_code(&self, stream: &mut FileHandle, offset: u64, origin: i32) -> Result<()> {
        let origin = SeekOrigin::try_from(origin)?;
        self.seek(stream, offset, origin)
    }

    fn adopt(&self, filename: &OsStr, fd: RawFd) -> Result<FileHandle> {
        if !is_open(fd) {
            return Err(Error::InvalidDescriptor { fd });
        }

        self.registry.borrow_mut().add(fd)?;
        log::debug!("adopted fd {} from '{}'", fd, Path::new(filename).display());
        Ok(FileHandle::adopted(fd, filename, Rc::clone(&self.registry)))
    }

    fn open_path(&self, filename: &OsStr, flags: OFlag) -> Result<FileHandle> {
        let permissions = Mode::from_bits_truncate(self.options.permissions() as nix::libc::mode_t);
        let fd = nix::fcntl::open(filename, flags, permissions)?;
        log::debug!("opened '{}' as fd {}", Path::new(filename).display(), fd);
        Ok(FileHandle::owned(fd, filename))
    }
}

impl Default for FdFileFunctions {
    fn default() -> Self {
        Self::new()
    }
}

impl FileFunctions for FdFileFunctions {
    type Stream = FileHandle;

    fn open(&self, filename: impl AsRef<OsStr>, mode: OpenMode) -> Result<FileHandle> {
        let filename = filename.as_ref();
        // Mode is validated before any adoption side effect
        let flags = mode.to_oflags()?;

        let adoption = if self.options.adopts_descriptors() {
            parse_adoption_path(filename, self.options.prefix())
        } else {
            None
        };

        let result = match adoption {
            Some(fd) => fd.and_then(|fd| self.adopt(filename, fd)),
            None => self.open_path(filename, flags),
        };
        if let Err(ref e) = result {
            log::debug!("open '{}' rejected: {}", Path::new(filename).display(), e);
        }
        result
    }

    fn open_disk(&self, stream: &FileHandle, disk: u32, mode: OpenMode) -> Result<FileHandle> {
        volume::open_disk(self, stream.filename(), disk, mode)
    }

    fn read(&self, stream: &mut FileHandle, buf: &mut [u8]) -> Result<usize> {
        Ok(stream.read(buf)?)
    }

    fn write(&self, stream: &mut FileHandle, buf: &[u8]) -> Result<usize> {
        Ok(stream.write(buf)?)
    }

    fn tell(&self, stream: &mut FileHandle) -> Result<u64> {
        Ok(stream.stream_position()?)
    }

    fn seek(&self, stream: &mut FileHandle, offset: u64, origin: SeekOrigin) -> Result<()> {
        stream.seek(origin.seek_from(offset))?;
        Ok(())
    }

    fn close(&self, stream: FileHandle) -> Result<()> {
        stream.close()
    }

    // Never reports an error, whatever the stream state.
    fn error(&self, _stream: Option<&FileHandle>) -> i32 {
        0
    }
}
