//! Watchdog sweep against real lock files with backdated mtimes.

use std::cell::Cell;

use sprinkler::adapters::time::SystemClock;
use sprinkler::config::StationConfig;
use sprinkler::error::{Error, HardwareError};
use sprinkler::lease::RunLockDir;
use sprinkler::station::StationVector;
use sprinkler::sweep::WatchdogSweep;

use crate::mock_hw::{CallLog, MockOutputs, OutputCall, age_file};

// PIDs far above any default pid_max so no live process owns them.
const OLD_PID: u32 = 900_000_001;
const YOUNG_PID: u32 = 900_000_002;

fn sweep(dir: &std::path::Path) -> WatchdogSweep<SystemClock> {
    WatchdogSweep::new(StationConfig::default(), dir, SystemClock::new())
}

#[test]
fn no_locks_means_no_hardware() {
    let dir = tempfile::tempdir().unwrap();
    let opened = Cell::new(false);

    let report = sweep(dir.path())
        .run(|| {
            opened.set(true);
            Ok(MockOutputs::new(8).0)
        })
        .unwrap();

    assert!(!opened.get());
    assert_eq!(report.locks_found, 0);
    assert!(!report.reset_performed);
}

#[test]
fn young_lock_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let locks = RunLockDir::new(dir.path());
    locks.create(YOUNG_PID, 4).unwrap();
    age_file(&locks.path_for(YOUNG_PID), 34);
    let opened = Cell::new(false);

    let report = sweep(dir.path())
        .run(|| {
            opened.set(true);
            Ok(MockOutputs::new(8).0)
        })
        .unwrap();

    assert!(!opened.get());
    assert_eq!(report.locks_found, 1);
    assert!(report.stale.is_empty());
    assert!(locks.exists(YOUNG_PID));
}

#[test]
fn stale_lock_forces_one_reset_and_is_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let locks = RunLockDir::new(dir.path());
    locks.create(OLD_PID, 3).unwrap();
    locks.create(YOUNG_PID, 5).unwrap();
    age_file(&locks.path_for(OLD_PID), 36);
    age_file(&locks.path_for(YOUNG_PID), 2);

    let calls = CallLog::default();
    let opens = Cell::new(0);

    let report = sweep(dir.path())
        .run(|| {
            opens.set(opens.get() + 1);
            Ok(MockOutputs::sharing(8, &calls))
        })
        .unwrap();

    assert_eq!(opens.get(), 1);
    assert!(report.reset_performed);
    assert_eq!(report.locks_found, 2);
    assert_eq!(report.stale.len(), 1);
    assert_eq!(report.stale[0].station, Some(3));
    assert_eq!(report.deleted, vec![locks.path_for(OLD_PID)]);
    assert_eq!(
        *calls.borrow(),
        vec![
            OutputCall::Write(StationVector::all_off(8)),
            OutputCall::Release
        ]
    );
    assert!(!locks.exists(OLD_PID));
    assert!(locks.exists(YOUNG_PID));
}

#[test]
fn every_stale_lock_is_deleted_after_a_single_reset() {
    let dir = tempfile::tempdir().unwrap();
    let locks = RunLockDir::new(dir.path());
    for pid in [OLD_PID, YOUNG_PID] {
        locks.create(pid, 1).unwrap();
        age_file(&locks.path_for(pid), 120);
    }
    let opens = Cell::new(0);

    let report = sweep(dir.path())
        .run(|| {
            opens.set(opens.get() + 1);
            Ok(MockOutputs::new(8).0)
        })
        .unwrap();

    assert_eq!(opens.get(), 1);
    assert_eq!(report.deleted.len(), 2);
    assert!(locks.list().unwrap().is_empty());
}

#[test]
fn failed_reset_keeps_stale_lock() {
    let dir = tempfile::tempdir().unwrap();
    let locks = RunLockDir::new(dir.path());
    locks.create(OLD_PID, 2).unwrap();
    age_file(&locks.path_for(OLD_PID), 60);

    let result = sweep(dir.path()).run(|| -> sprinkler::Result<MockOutputs> {
        Err(Error::Hardware(HardwareError::PinSetup {
            pin: 4,
            reason: "busy".into(),
        }))
    });

    assert!(result.is_err());
    assert!(locks.exists(OLD_PID));
}

#[test]
fn unrelated_files_do_not_trigger_a_reset() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("log.txt"), "old log").unwrap();
    std::fs::write(dir.path().join("DELAY"), "2024-06-01 06:00").unwrap();
    age_file(&dir.path().join("log.txt"), 600);
    age_file(&dir.path().join("DELAY"), 600);
    let opened = Cell::new(false);

    let report = sweep(dir.path())
        .run(|| {
            opened.set(true);
            Ok(MockOutputs::new(8).0)
        })
        .unwrap();

    assert!(!opened.get());
    assert_eq!(report.locks_found, 0);
    assert!(dir.path().join("DELAY").exists());
}
