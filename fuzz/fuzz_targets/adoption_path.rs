//! Fuzz target for the `/proc/self/fd/<N>` adoption path parser.
//!
//! Run with: cargo +nightly fuzz run adoption_path
//!
//! Properties checked:
//! - A path is only accepted if the remainder is exactly the decimal
//!   rendering of the descriptor (modulo a leading `+` or zeros)
//! - Paths outside the prefix are never adoptions

#![no_main]

use libfuzzer_sys::fuzz_target;
use zipfd::adoption::{PROC_SELF_FD_PREFIX, parse_adoption_path};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let path = format!("{PROC_SELF_FD_PREFIX}{input}");
    match parse_adoption_path(&path, PROC_SELF_FD_PREFIX) {
        Some(Ok(fd)) => {
            let canonical: i64 = input.parse().expect("accepted remainder must be numeric");
            assert_eq!(canonical, i64::from(fd), "accepted {:?} as {}", input, fd);
        }
        Some(Err(e)) => assert!(e.is_adoption_error()),
        None => panic!("prefixed path treated as ordinary: {:?}", path),
    }

    if !input.starts_with(PROC_SELF_FD_PREFIX) {
        assert!(parse_adoption_path(input, PROC_SELF_FD_PREFIX).is_none());
    }
});
