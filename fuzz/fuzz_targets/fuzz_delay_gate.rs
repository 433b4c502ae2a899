//! Fuzz target: `DelayGate::check_and_consume`
//!
//! Writes arbitrary bytes as the gate body and verifies:
//! - No panics on any body
//! - An inactive gate never leaves the file behind
//! - An active gate always expires in the future
//!
//! cargo fuzz run fuzz_delay_gate

#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use sprinkler::lease::{DelayGate, GateStatus};

fuzz_target!(|data: &[u8]| {
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let gate = DelayGate::in_dir(dir.path());
    if std::fs::write(gate.path(), data).is_err() {
        return;
    }
    let now = NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid date");

    match gate.check_and_consume(now) {
        Ok(GateStatus::Active { until, .. }) => {
            assert!(until > now, "active gate expired at {until}");
            assert!(gate.exists(), "active gate file vanished");
        }
        Ok(GateStatus::Inactive) => {
            assert!(!gate.exists(), "inactive gate left on disk");
        }
        Err(e) => panic!("gate check failed on readable file: {e}"),
    }
});
