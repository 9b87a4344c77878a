//! Split-archive disk resolution.
//!
//! A split zip archive is stored as a sequence of sibling files. The last
//! disk keeps the archive's own name (`backup.zip`), and the earlier disks
//! replace its extension with a sequential `.zNN` suffix:
//!
//! - `backup.z01` - disk index 0
//! - `backup.z02` - disk index 1
//! - ...
//! - `backup.zip` - final disk
//!
//! The number is the disk index plus one, at least two digits wide.
//!
//! # Example
//!
//! ```rust
//! use zipfd::volume::disk_filename;
//!
//! assert_eq!(disk_filename("backup.zip", 0)?, "backup.z01");
//! assert_eq!(disk_filename("/data/backup.zip", 9)?, "/data/backup.z10");
//! assert!(disk_filename("backupzip", 0).is_err());
//! # Ok::<(), zipfd::Error>(())
//! ```

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::Path;

use crate::functions::FileFunctions;
use crate::mode::OpenMode;
use crate::{Error, Result};

/// Derives the filename of disk `disk` from the name of an open disk.
///
/// The last `.` byte in `filename` and everything after it are replaced by
/// `.z` and the two-digit disk number. The scan covers the whole name, so a
/// dot in a directory component is used when the file name itself has none.
/// Bytes before the dot are kept as they are, UTF-8 or not.
///
/// # Errors
///
/// Returns [`Error::NoExtensionFound`] if `filename` contains no `.`; no
/// suffix is ever appended to an extensionless name.
pub fn disk_filename(filename: impl AsRef<OsStr>, disk: u32) -> Result<OsString> {
    let filename = filename.as_ref();
    let bytes = filename.as_bytes();
    let dot = bytes
        .iter()
        .rposition(|&b| b == b'.')
        .ok_or_else(|| Error::NoExtensionFound {
            filename: filename.to_string_lossy().into_owned(),
        })?;

    let mut name = bytes[..dot].to_vec();
    name.extend_from_slice(format!(".z{:02}", u64::from(disk) + 1).as_bytes());
    Ok(OsString::from_vec(name))
}

/// Opens disk `disk` of the split archive whose open disk is `filename`.
///
/// The derived name goes through `functions.open`, so it is subject to the
/// same mode handling (and adoption rules) as any other open.
pub fn open_disk<F>(functions: &F, filename: &OsStr, disk: u32, mode: OpenMode) -> Result<F::Stream>
where
    F: FileFunctions + ?Sized,
{
    let disk_name = disk_filename(filename, disk)?;
    log::debug!(
        "disk {} of '{}' resolves to '{}'",
        disk,
        Path::new(filename).display(),
        Path::new(&disk_name).display()
    );
    functions.open(&disk_name, mode)
}
