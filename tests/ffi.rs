//! C callback table integration tests.
//!
//! These tests drive the adapter the way an archive library does: through
//! the function pointers and opaque value of a filled `zlib_filefunc64_def`.

#![cfg(feature = "ffi")]

mod common;

use std::ffi::{CString, OsStr, c_int, c_ulong, c_void};
use std::fs::File;
use std::os::unix::ffi::OsStrExt;
use std::ptr;

use common::{CREATE, adoption_path_of, fd_is_open, write_file};
use tempfile::tempdir;
use zipfd::ffi::{
    ZlibFileFunc64Def, zipfd_fill_filefunc64, zipfd_functions_free, zipfd_functions_new,
};
use zipfd::{FdFileFunctions, OpenMode};

const SEEK_SET: c_int = 0;
const SEEK_CUR: c_int = 1;
const SEEK_END: c_int = 2;

/// Thin wrapper that calls through a filled table.
struct Table {
    def: ZlibFileFunc64Def,
}

impl Table {
    fn new(functions: &FdFileFunctions) -> Self {
        Self {
            def: ZlibFileFunc64Def::for_adapter(functions),
        }
    }

    fn open(&self, path: &str, mode: OpenMode) -> *mut c_void {
        self.open_bytes(path.as_bytes(), mode)
    }

    fn open_bytes(&self, path: &[u8], mode: OpenMode) -> *mut c_void {
        let path = CString::new(path).unwrap();
        unsafe {
            (self.def.zopen64_file.unwrap())(self.def.opaque, path.as_ptr().cast(), mode.bits() as c_int)
        }
    }

    fn open_disk(&self, stream: *mut c_void, disk: c_int, mode: OpenMode) -> *mut c_void {
        unsafe {
            (self.def.zopendisk64_file.unwrap())(self.def.opaque, stream, disk, mode.bits() as c_int)
        }
    }

    fn read(&self, stream: *mut c_void, buf: &mut [u8]) -> c_ulong {
        unsafe {
            (self.def.zread_file.unwrap())(
                self.def.opaque,
                stream,
                buf.as_mut_ptr().cast(),
                buf.len() as c_ulong,
            )
        }
    }

    fn write(&self, stream: *mut c_void, buf: &[u8]) -> c_ulong {
        unsafe {
            (self.def.zwrite_file.unwrap())(
                self.def.opaque,
                stream,
                buf.as_ptr().cast(),
                buf.len() as c_ulong,
            )
        }
    }

    fn tell(&self, stream: *mut c_void) -> u64 {
        unsafe { (self.def.ztell64_file.unwrap())(self.def.opaque, stream) }
    }

    fn seek(&self, stream: *mut c_void, offset: u64, origin: c_int) -> i64 {
        unsafe { (self.def.zseek64_file.unwrap())(self.def.opaque, stream, offset, origin) as i64 }
    }

    fn close(&self, stream: *mut c_void) -> c_int {
        unsafe { (self.def.zclose_file.unwrap())(self.def.opaque, stream) }
    }

    fn error(&self, stream: *mut c_void) -> c_int {
        unsafe { (self.def.zerror_file.unwrap())(self.def.opaque, stream) }
    }
}

#[test]
fn test_write_then_read_through_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("table.zip");
    let path = path.to_str().unwrap();
    let functions = FdFileFunctions::new();
    let table = Table::new(&functions);

    let stream = table.open(path, CREATE);
    assert!(!stream.is_null());
    assert_eq!(table.write(stream, b"PK\x03\x04 local header"), 17);
    assert_eq!(table.tell(stream), 17);
    assert_eq!(table.close(stream), 0);

    let stream = table.open(path, OpenMode::READ);
    assert!(!stream.is_null());
    let mut buf = [0u8; 4];
    assert_eq!(table.read(stream, &mut buf), 4);
    assert_eq!(&buf, b"PK\x03\x04");
    assert_eq!(table.read(stream, &mut []), 0);
    assert_eq!(table.close(stream), 0);
}

#[test]
fn test_seek_origins_through_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seek.zip");
    write_file(&path, b"0123456789");
    let functions = FdFileFunctions::new();
    let table = Table::new(&functions);

    let stream = table.open(path.to_str().unwrap(), OpenMode::READ);
    assert_eq!(table.seek(stream, 3, SEEK_SET), 0);
    assert_eq!(table.tell(stream), 3);
    assert_eq!(table.seek(stream, 2, SEEK_CUR), 0);
    assert_eq!(table.tell(stream), 5);
    // Relative offsets are two's complement
    assert_eq!(table.seek(stream, (-4i64) as u64, SEEK_CUR), 0);
    assert_eq!(table.tell(stream), 1);
    assert_eq!(table.seek(stream, (-2i64) as u64, SEEK_END), 0);
    assert_eq!(table.tell(stream), 8);

    let mut buf = [0u8; 8];
    assert_eq!(table.read(stream, &mut buf), 2);
    assert_eq!(&buf[..2], b"89");
    assert_eq!(table.close(stream), 0);
}

#[test]
fn test_unknown_origin_keeps_position() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("origin.zip");
    write_file(&path, b"0123456789");
    let functions = FdFileFunctions::new();
    let table = Table::new(&functions);

    let stream = table.open(path.to_str().unwrap(), OpenMode::READ);
    assert_eq!(table.seek(stream, 4, SEEK_SET), 0);
    assert_eq!(table.seek(stream, 1, 7), -1);
    assert_eq!(table.tell(stream), 4);
    assert_eq!(table.close(stream), 0);
}

#[test]
fn test_open_failures_return_null() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.zip");
    let functions = FdFileFunctions::new();
    let table = Table::new(&functions);

    assert!(table.open(missing.to_str().unwrap(), OpenMode::READ).is_null());
    assert!(table.open("/proc/self/fd/nope", OpenMode::READ).is_null());
    assert!(
        table
            .open(&format!("/proc/self/fd/{}", 1 << 30), OpenMode::READ)
            .is_null()
    );
    assert!(table.open(dir.path().join("x.zip").to_str().unwrap(), OpenMode::WRITE).is_null());

    let open = table.def.zopen64_file.unwrap();
    let stream = unsafe { open(table.def.opaque, ptr::null(), OpenMode::READ.bits() as c_int) };
    assert!(stream.is_null());
}

#[test]
fn test_non_utf8_path_through_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(OsStr::from_bytes(b"caf\xe9.zip"));
    write_file(&path, b"PK\x05\x06");
    let functions = FdFileFunctions::new();
    let table = Table::new(&functions);

    let stream = table.open_bytes(path.as_os_str().as_bytes(), OpenMode::READ);
    assert!(!stream.is_null());
    let mut buf = [0u8; 4];
    assert_eq!(table.read(stream, &mut buf), 4);
    assert_eq!(&buf, b"PK\x05\x06");
    assert_eq!(table.close(stream), 0);
}

#[test]
fn test_adopted_descriptor_through_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("adopt.zip");
    write_file(&path, b"PK");
    let file = File::open(&path).unwrap();
    let functions = FdFileFunctions::new();
    let table = Table::new(&functions);

    let adoption = adoption_path_of(&file);
    let stream = table.open(&adoption, OpenMode::READ);
    assert!(!stream.is_null());
    assert!(table.open(&adoption, OpenMode::READ).is_null());
    assert_eq!(table.close(stream), 0);

    assert!(functions.registry().borrow().is_empty());
    assert!(fd_is_open(std::os::fd::AsRawFd::as_raw_fd(&file)));
}

#[test]
fn test_open_disk_through_table() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("split.z01"), b"first");
    write_file(&dir.path().join("split.zip"), b"last");
    let functions = FdFileFunctions::new();
    let table = Table::new(&functions);

    let last = table.open(dir.path().join("split.zip").to_str().unwrap(), OpenMode::READ);
    let first = table.open_disk(last, 0, OpenMode::READ);
    assert!(!first.is_null());
    let mut buf = [0u8; 5];
    assert_eq!(table.read(first, &mut buf), 5);
    assert_eq!(&buf, b"first");

    assert!(table.open_disk(last, -1, OpenMode::READ).is_null());
    assert!(table.open_disk(last, 3, OpenMode::READ).is_null());

    assert_eq!(table.close(first), 0);
    assert_eq!(table.close(last), 0);
}

#[test]
fn test_error_is_always_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("error.zip");
    write_file(&path, b"x");
    let functions = FdFileFunctions::new();
    let table = Table::new(&functions);

    let stream = table.open(path.to_str().unwrap(), OpenMode::READ);
    assert_eq!(table.error(stream), 0);
    assert_eq!(table.error(ptr::null_mut()), 0);
    assert_eq!(table.close(stream), 0);
}

#[test]
fn test_null_streams_report_failure() {
    let functions = FdFileFunctions::new();
    let table = Table::new(&functions);
    let mut buf = [0u8; 4];

    assert_eq!(table.read(ptr::null_mut(), &mut buf), c_ulong::MAX);
    assert_eq!(table.write(ptr::null_mut(), &buf), c_ulong::MAX);
    assert_eq!(table.tell(ptr::null_mut()), u64::MAX);
    assert_eq!(table.seek(ptr::null_mut(), 0, SEEK_SET), -1);
    assert_eq!(table.close(ptr::null_mut()), -1);
    assert!(table.open_disk(ptr::null_mut(), 0, OpenMode::READ).is_null());
}

#[test]
fn test_c_allocated_adapter() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("c.zip");
    write_file(&path, b"from c");

    let functions = zipfd_functions_new();
    assert!(!functions.is_null());
    let mut def = ZlibFileFunc64Def::default();
    unsafe { zipfd_fill_filefunc64(&mut def, functions) };
    assert!(def.zopen64_file.is_some());
    assert_eq!(def.opaque, functions.cast::<c_void>());

    let table = Table { def };
    let stream = table.open(path.to_str().unwrap(), OpenMode::READ);
    let mut buf = [0u8; 6];
    assert_eq!(table.read(stream, &mut buf), 6);
    assert_eq!(&buf, b"from c");
    assert_eq!(table.close(stream), 0);

    unsafe { zipfd_functions_free(functions) };
}
