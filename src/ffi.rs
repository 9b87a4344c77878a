//! C callback table for zip archive libraries.
//!
//! Archive libraries in the minizip family take a table of eight function
//! pointers plus an opaque pointer and call back into it for all file
//! access. This module provides that table, filled with callbacks that
//! dispatch to an [`FdFileFunctions`] passed as the opaque pointer.
//!
//! Failures collapse to the sentinels the library expects:
//!
//! | Callback | Failure value |
//! |----------|---------------|
//! | open / opendisk | null |
//! | read / write | `(uLong)-1` |
//! | tell | `(ZPOS64_T)-1` |
//! | seek / close | `-1` |
//! | error | never fails, always `0` |
//!
//! Streams cross the boundary as `Box<FileHandle>` pointers. The library
//! must hand every stream back to `zclose_file` exactly once.
//!
//! # Example
//!
//! ```rust
//! use zipfd::FdFileFunctions;
//! use zipfd::ffi::ZlibFileFunc64Def;
//!
//! let functions = FdFileFunctions::new();
//! let def = ZlibFileFunc64Def::for_adapter(&functions);
//! assert!(def.zopen64_file.is_some());
//! // `def` may now be passed to the archive library, as long as
//! // `functions` outlives every call through it.
//! ```

use std::ffi::{CStr, OsStr, c_int, c_long, c_ulong, c_void};
use std::os::unix::ffi::OsStrExt;
use std::ptr;

use crate::adapter::FdFileFunctions;
use crate::functions::FileFunctions;
use crate::handle::FileHandle;
use crate::mode::OpenMode;
use crate::Result;

/// `open64_file_func`
pub type Open64FileFunc =
    unsafe extern "C" fn(opaque: *mut c_void, filename: *const c_void, mode: c_int) -> *mut c_void;
/// `opendisk64_file_func`
pub type OpenDisk64FileFunc = unsafe extern "C" fn(
    opaque: *mut c_void,
    stream: *mut c_void,
    number_disk: c_int,
    mode: c_int,
) -> *mut c_void;
/// `read_file_func`
pub type ReadFileFunc = unsafe extern "C" fn(
    opaque: *mut c_void,
    stream: *mut c_void,
    buf: *mut c_void,
    size: c_ulong,
) -> c_ulong;
/// `write_file_func`
pub type WriteFileFunc = unsafe extern "C" fn(
    opaque: *mut c_void,
    stream: *mut c_void,
    buf: *const c_void,
    size: c_ulong,
) -> c_ulong;
/// `tell64_file_func`
pub type Tell64FileFunc = unsafe extern "C" fn(opaque: *mut c_void, stream: *mut c_void) -> u64;
/// `seek64_file_func`
pub type Seek64FileFunc = unsafe extern "C" fn(
    opaque: *mut c_void,
    stream: *mut c_void,
    offset: u64,
    origin: c_int,
) -> c_long;
/// `close_file_func`
pub type CloseFileFunc = unsafe extern "C" fn(opaque: *mut c_void, stream: *mut c_void) -> c_int;
/// `testerror_file_func`
pub type ErrorFileFunc = unsafe extern "C" fn(opaque: *mut c_void, stream: *mut c_void) -> c_int;

/// Layout-compatible `zlib_filefunc64_def`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ZlibFileFunc64Def {
    /// Opens a file or adopts a descriptor.
    pub zopen64_file: Option<Open64FileFunc>,
    /// Opens another disk of a split archive.
    pub zopendisk64_file: Option<OpenDisk64FileFunc>,
    /// Reads from a stream.
    pub zread_file: Option<ReadFileFunc>,
    /// Writes to a stream.
    pub zwrite_file: Option<WriteFileFunc>,
    /// Reports the stream offset.
    pub ztell64_file: Option<Tell64FileFunc>,
    /// Moves the stream offset.
    pub zseek64_file: Option<Seek64FileFunc>,
    /// Closes a stream.
    pub zclose_file: Option<CloseFileFunc>,
    /// Reports a sticky stream error.
    pub zerror_file: Option<ErrorFileFunc>,
    /// Passed back as the first argument of every callback.
    pub opaque: *mut c_void,
}

impl ZlibFileFunc64Def {
    /// Builds a table that dispatches to `functions`.
    ///
    /// The table stores a raw pointer to `functions`; the adapter must
    /// outlive every call made through the table.
    pub fn for_adapter(functions: &FdFileFunctions) -> Self {
        let mut def = Self::default();
        fill_fd_filefunc64(&mut def, functions);
        def
    }
}

impl Default for ZlibFileFunc64Def {
    fn default() -> Self {
        Self {
            zopen64_file: None,
            zopendisk64_file: None,
            zread_file: None,
            zwrite_file: None,
            ztell64_file: None,
            zseek64_file: None,
            zclose_file: None,
            zerror_file: None,
            opaque: ptr::null_mut(),
        }
    }
}

/// Fills `def` with the descriptor-backed callbacks.
pub fn fill_fd_filefunc64(def: &mut ZlibFileFunc64Def, functions: &FdFileFunctions) {
    def.zopen64_file = Some(fd_open64_file);
    def.zopendisk64_file = Some(fd_opendisk64_file);
    def.zread_file = Some(fd_read_file);
    def.zwrite_file = Some(fd_write_file);
    def.ztell64_file = Some(fd_tell64_file);
    def.zseek64_file = Some(fd_seek64_file);
    def.zclose_file = Some(fd_close_file);
    def.zerror_file = Some(fd_error_file);
    def.opaque = functions as *const FdFileFunctions as *mut c_void;
}

/// Allocates an adapter with default options for C callers.
///
/// Release it with [`zipfd_functions_free`].
#[unsafe(no_mangle)]
pub extern "C" fn zipfd_functions_new() -> *mut FdFileFunctions {
    Box::into_raw(Box::new(FdFileFunctions::new()))
}

/// Frees an adapter from [`zipfd_functions_new`].
///
/// # Safety
///
/// `functions` must come from [`zipfd_functions_new`], must not be freed
/// twice, and no table filled from it may be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn zipfd_functions_free(functions: *mut FdFileFunctions) {
    if !functions.is_null() {
        // SAFETY: the pointer came from `Box::into_raw` per the contract.
        drop(unsafe { Box::from_raw(functions) });
    }
}

/// Fills a C-owned table with the descriptor-backed callbacks.
///
/// # Safety
///
/// `def` must point to a writable `zlib_filefunc64_def` and `functions`
/// must be a live adapter from [`zipfd_functions_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn zipfd_fill_filefunc64(
    def: *mut ZlibFileFunc64Def,
    functions: *mut FdFileFunctions,
) {
    // SAFETY: both pointers are valid per the contract, or null.
    let (Some(def), Some(functions)) = (unsafe { def.as_mut() }, unsafe { functions.as_ref() })
    else {
        return;
    };
    fill_fd_filefunc64(def, functions);
}

const READ_WRITE_ERROR: c_ulong = c_ulong::MAX;
const TELL_ERROR: u64 = u64::MAX;

/// # Safety
///
/// `opaque` is null or the pointer stored by [`fill_fd_filefunc64`].
unsafe fn adapter<'a>(opaque: *mut c_void) -> Option<&'a FdFileFunctions> {
    unsafe { (opaque as *const FdFileFunctions).as_ref() }
}

/// # Safety
///
/// `stream` is null or a live pointer returned by an open callback.
unsafe fn stream<'a>(stream: *mut c_void) -> Option<&'a mut FileHandle> {
    unsafe { (stream as *mut FileHandle).as_mut() }
}

fn into_stream(result: Result<FileHandle>) -> *mut c_void {
    match result {
        Ok(handle) => Box::into_raw(Box::new(handle)).cast(),
        Err(_) => ptr::null_mut(),
    }
}

unsafe extern "C" fn fd_open64_file(
    opaque: *mut c_void,
    filename: *const c_void,
    mode: c_int,
) -> *mut c_void {
    let Some(functions) = (unsafe { adapter(opaque) }) else {
        return ptr::null_mut();
    };
    if filename.is_null() {
        return ptr::null_mut();
    }
    // SAFETY: the library passes a NUL-terminated path.
    let filename = OsStr::from_bytes(unsafe { CStr::from_ptr(filename.cast()) }.to_bytes());

    into_stream(functions.open(filename, OpenMode::from_bits_retain(mode as u32)))
}

unsafe extern "C" fn fd_opendisk64_file(
    opaque: *mut c_void,
    stream_ptr: *mut c_void,
    number_disk: c_int,
    mode: c_int,
) -> *mut c_void {
    let (Some(functions), Some(handle)) = (unsafe { adapter(opaque) }, unsafe { stream(stream_ptr) })
    else {
        return ptr::null_mut();
    };
    let Ok(disk) = u32::try_from(number_disk) else {
        return ptr::null_mut();
    };

    into_stream(functions.open_disk(handle, disk, OpenMode::from_bits_retain(mode as u32)))
}

unsafe extern "C" fn fd_read_file(
    opaque: *mut c_void,
    stream_ptr: *mut c_void,
    buf: *mut c_void,
    size: c_ulong,
) -> c_ulong {
    let (Some(functions), Some(handle)) = (unsafe { adapter(opaque) }, unsafe { stream(stream_ptr) })
    else {
        return READ_WRITE_ERROR;
    };
    let buf: &mut [u8] = if size == 0 {
        &mut []
    } else if buf.is_null() {
        return READ_WRITE_ERROR;
    } else {
        // SAFETY: the library passes a buffer of at least `size` bytes.
        unsafe { std::slice::from_raw_parts_mut(buf.cast(), size as usize) }
    };

    match functions.read(handle, buf) {
        Ok(n) => n as c_ulong,
        Err(_) => READ_WRITE_ERROR,
    }
}

unsafe extern "C" fn fd_write_file(
    opaque: *mut c_void,
    stream_ptr: *mut c_void,
    buf: *const c_void,
    size: c_ulong,
) -> c_ulong {
    let (Some(functions), Some(handle)) = (unsafe { adapter(opaque) }, unsafe { stream(stream_ptr) })
    else {
        return READ_WRITE_ERROR;
    };
    let buf: &[u8] = if size == 0 {
        &[]
    } else if buf.is_null() {
        return READ_WRITE_ERROR;
    } else {
        // SAFETY: the library passes `size` readable bytes.
        unsafe { std::slice::from_raw_parts(buf.cast(), size as usize) }
    };

    match functions.write(handle, buf) {
        Ok(n) => n as c_ulong,
        Err(_) => READ_WRITE_ERROR,
    }
}

unsafe extern "C" fn fd_tell64_file(opaque: *mut c_void, stream_ptr: *mut c_void) -> u64 {
    let (Some(functions), Some(handle)) = (unsafe { adapter(opaque) }, unsafe { stream(stream_ptr) })
    else {
        return TELL_ERROR;
    };
    functions.tell(handle).unwrap_or(TELL_ERROR)
}

unsafe extern "C" fn fd_seek64_file(
    opaque: *mut c_void,
    stream_ptr: *mut c_void,
    offset: u64,
    origin: c_int,
) -> c_long {
    let (Some(functions), Some(handle)) = (unsafe { adapter(opaque) }, unsafe { stream(stream_ptr) })
    else {
        return -1;
    };
    match functions.seek_code(handle, offset, origin) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

unsafe extern "C" fn fd_close_file(_opaque: *mut c_void, stream_ptr: *mut c_void) -> c_int {
    if stream_ptr.is_null() {
        return -1;
    }
    // SAFETY: streams are boxed by `into_stream` and closed exactly once.
    let handle = unsafe { Box::from_raw(stream_ptr as *mut FileHandle) };
    match handle.close() {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

unsafe extern "C" fn fd_error_file(_opaque: *mut c_void, _stream_ptr: *mut c_void) -> c_int {
    0
}
