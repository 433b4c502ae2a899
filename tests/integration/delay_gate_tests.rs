//! Delay gate file behaviour as other processes see it.

use std::fs;

use chrono::{Local, TimeDelta};
use sprinkler::lease::delay_gate::{DELAY_FILE_NAME, describe_remaining};
use sprinkler::lease::{DelayGate, GateStatus};

use crate::mock_hw::morning;

#[test]
fn gate_ten_minutes_ahead_vetoes_and_survives() {
    let dir = tempfile::tempdir().unwrap();
    let now = morning().naive_local();
    fs::write(
        dir.path().join(DELAY_FILE_NAME),
        (now + TimeDelta::minutes(10))
            .format("%Y-%m-%d %H:%M")
            .to_string(),
    )
    .unwrap();
    let gate = DelayGate::in_dir(dir.path());

    let status = gate.check_and_consume(now).unwrap();

    let GateStatus::Active { remaining, .. } = status else {
        panic!("expected an active gate, got {status:?}");
    };
    assert_eq!(describe_remaining(remaining), "10 more minutes");
    assert!(gate.check_and_consume(now).unwrap().is_active());
}

#[test]
fn gate_ten_minutes_past_is_deleted_on_first_read() {
    let dir = tempfile::tempdir().unwrap();
    let now = morning().naive_local();
    let gate = DelayGate::in_dir(dir.path());
    gate.set_until(now - TimeDelta::minutes(10)).unwrap();

    assert_eq!(gate.check_and_consume(now).unwrap(), GateStatus::Inactive);
    assert!(!dir.path().join(DELAY_FILE_NAME).exists());
}

#[test]
fn binary_garbage_is_treated_as_unparsable() {
    let dir = tempfile::tempdir().unwrap();
    let gate = DelayGate::in_dir(dir.path());
    fs::write(gate.path(), [0xff, 0xfe, 0x00, 0x80]).unwrap();

    assert_eq!(
        gate.check_and_consume(Local::now().naive_local()).unwrap(),
        GateStatus::Inactive
    );
    assert!(!gate.exists());
}

#[test]
fn hours_delay_reports_in_hours() {
    let dir = tempfile::tempdir().unwrap();
    let now = morning().naive_local();
    let gate = DelayGate::in_dir(dir.path());

    let until = gate.set_for_hours(now, 24).unwrap();
    let status = gate.check_and_consume(now).unwrap();

    assert_eq!(until, now + TimeDelta::hours(24));
    let GateStatus::Active { remaining, .. } = status else {
        panic!("expected an active gate, got {status:?}");
    };
    assert_eq!(describe_remaining(remaining), "24.0 more hours");
}

#[test]
fn clear_reports_absent_gate() {
    let dir = tempfile::tempdir().unwrap();
    let gate = DelayGate::in_dir(dir.path());
    assert!(!gate.clear().unwrap());
    gate.set_for_hours(morning().naive_local(), 1).unwrap();
    assert!(gate.clear().unwrap());
    assert!(!gate.exists());
}
