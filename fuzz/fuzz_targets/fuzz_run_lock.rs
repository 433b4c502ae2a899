//! Fuzz target: run lock listing
//!
//! Drops a lock file with an arbitrary body next to the real lock and
//! verifies the listing never panics and always finds both.
//!
//! cargo fuzz run fuzz_run_lock

#![no_main]

use libfuzzer_sys::fuzz_target;
use sprinkler::lease::RunLockDir;

fuzz_target!(|data: &[u8]| {
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let locks = RunLockDir::new(dir.path());
    if locks.create(1, 1).is_err() || std::fs::write(locks.path_for(2), data).is_err() {
        return;
    }

    match locks.list() {
        Ok(found) => {
            assert_eq!(found.len(), 2);
            assert_eq!(found[0].station, Some(1));
        }
        Err(e) => panic!("listing failed: {e}"),
    }
});
