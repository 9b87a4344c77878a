//! Fuzz target for split-archive disk name derivation.
//!
//! Run with: cargo +nightly fuzz run disk_filename

#![no_main]

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

use libfuzzer_sys::fuzz_target;
use zipfd::disk_filename;

fuzz_target!(|input: (&[u8], u32)| {
    let (filename, disk) = input;

    match disk_filename(OsStr::from_bytes(filename), disk) {
        Ok(name) => {
            let dot = filename
                .iter()
                .rposition(|&b| b == b'.')
                .expect("derived a name without a dot");
            let name = name.as_bytes();
            assert_eq!(&name[..dot], &filename[..dot]);
            assert_eq!(&name[dot..], format!(".z{:02}", u64::from(disk) + 1).as_bytes());
        }
        Err(_) => assert!(!filename.contains(&b'.')),
    }
});
