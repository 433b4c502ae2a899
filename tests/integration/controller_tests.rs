//! Station controller against mock outputs and a temporary state directory.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::TimeDelta;
use sprinkler::app::commands::RunRequest;
use sprinkler::app::controller::StationController;
use sprinkler::app::events::{ControllerState, RunOutcome};
use sprinkler::app::ports::Clock;
use sprinkler::config::StationConfig;
use sprinkler::error::{ConfigError, Error};
use sprinkler::lease::{DelayGate, RunLockDir};
use sprinkler::station::StationVector;

use crate::mock_hw::{FakeClock, MockOutputs, OutputCall, morning, writes};

const PID: u32 = 40_001;

fn pid_files(dir: &Path) -> usize {
    RunLockDir::new(dir).list().unwrap().len()
}

#[test]
fn every_station_energises_exactly_its_own_bit() {
    let config = StationConfig::default();
    let stop = AtomicBool::new(false);

    for station in 1..=config.number_of_stations {
        let dir = tempfile::tempdir().unwrap();
        let (outputs, calls) = MockOutputs::new(config.number_of_stations);
        let clock = FakeClock::at(morning());
        let mut c = StationController::new(config.clone(), outputs, &clock, dir.path())
            .with_pid(PID);

        let outcome = c
            .execute(RunRequest::Run { station, minutes: 1 }, &stop)
            .unwrap();
        c.shutdown().unwrap();

        assert_eq!(outcome, RunOutcome::Completed { station, minutes: 1 });
        let written = writes(&calls);
        assert_eq!(written[0].active_stations(), vec![station]);
        assert_eq!(written[0], StationVector::single(8, station));
        assert!(written[1..].iter().all(StationVector::is_all_off));
        assert_eq!(calls.borrow().last(), Some(&OutputCall::Release));
    }
}

#[test]
fn run_lasts_requested_minutes() {
    let dir = tempfile::tempdir().unwrap();
    let (outputs, _calls) = MockOutputs::new(8);
    let clock = FakeClock::at(morning());
    let mut c = StationController::new(StationConfig::default(), outputs, &clock, dir.path());

    c.execute(
        RunRequest::Run {
            station: 5,
            minutes: 12,
        },
        &AtomicBool::new(false),
    )
    .unwrap();

    assert_eq!(clock.slept(), Duration::from_secs(12 * 60));
    assert_eq!(clock.now() - morning(), TimeDelta::minutes(12));
}

#[test]
fn lock_exists_during_run_and_not_after() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = RunLockDir::new(dir.path()).path_for(PID);
    let seen: Rc<RefCell<Vec<bool>>> = Rc::default();

    let probe_seen = Rc::clone(&seen);
    let probe_path = lock_path.clone();
    let clock = FakeClock::at(morning())
        .with_probe(move |_| probe_seen.borrow_mut().push(probe_path.is_file()));

    let (outputs, _calls) = MockOutputs::new(8);
    let mut c = StationController::new(StationConfig::default(), outputs, &clock, dir.path())
        .with_pid(PID);
    assert!(!lock_path.exists());

    c.execute(
        RunRequest::Run {
            station: 2,
            minutes: 3,
        },
        &AtomicBool::new(false),
    )
    .unwrap();

    let seen = seen.borrow();
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|present| *present));
    assert!(!lock_path.exists());
}

#[test]
fn station_zero_turns_all_off_without_a_lock() {
    let dir = tempfile::tempdir().unwrap();
    let (outputs, calls) = MockOutputs::new(8);
    let clock = FakeClock::at(morning());
    let mut c = StationController::new(StationConfig::default(), outputs, &clock, dir.path())
        .with_pid(PID);

    let outcome = c
        .execute(RunRequest::AllOff, &AtomicBool::new(false))
        .unwrap();

    assert_eq!(outcome, RunOutcome::AllOff);
    assert_eq!(
        *calls.borrow(),
        vec![
            OutputCall::Write(StationVector::all_off(8)),
            OutputCall::Release
        ]
    );
    assert_eq!(pid_files(dir.path()), 0);
}

#[test]
fn over_max_minutes_rejected_before_any_write() {
    let config = StationConfig::default();
    assert_eq!(
        RunRequest::validate(&config, 1, Some(31)),
        Err(ConfigError::MinutesOutOfRange {
            minutes: 31,
            max: 30
        })
    );

    let dir = tempfile::tempdir().unwrap();
    let (outputs, calls) = MockOutputs::new(8);
    let clock = FakeClock::at(morning());
    let mut c = StationController::new(config, outputs, &clock, dir.path()).with_pid(PID);

    let err = c
        .operate_station(1, 31, &AtomicBool::new(false))
        .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(calls.borrow().is_empty());
    assert_eq!(pid_files(dir.path()), 0);
}

#[test]
fn out_of_range_station_names_the_limit() {
    let err = RunRequest::validate(&StationConfig::default(), 9, Some(5)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "station number must be 1-8, use 0 to turn everything off"
    );
}

#[test]
fn active_gate_blocks_run_and_leaves_outputs_off() {
    let dir = tempfile::tempdir().unwrap();
    let gate = DelayGate::in_dir(dir.path());
    let until = morning().naive_local() + TimeDelta::minutes(10);
    gate.set_until(until).unwrap();

    let (outputs, calls) = MockOutputs::new(8);
    let clock = FakeClock::at(morning());
    let mut c = StationController::new(StationConfig::default(), outputs, &clock, dir.path())
        .with_pid(PID);

    let outcome = c
        .execute(
            RunRequest::Run {
                station: 3,
                minutes: 10,
            },
            &AtomicBool::new(false),
        )
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Gated {
            until,
            remaining: TimeDelta::minutes(10)
        }
    );
    assert_eq!(c.state(), ControllerState::Gated);
    assert!(writes(&calls).iter().all(StationVector::is_all_off));
    assert!(c.status().is_all_off());
    assert_eq!(pid_files(dir.path()), 0);
    assert!(gate.exists());
}

#[test]
fn expired_gate_is_removed_and_run_proceeds() {
    let dir = tempfile::tempdir().unwrap();
    let gate = DelayGate::in_dir(dir.path());
    gate.set_until(morning().naive_local() - TimeDelta::minutes(10))
        .unwrap();

    let (outputs, calls) = MockOutputs::new(8);
    let clock = FakeClock::at(morning());
    let mut c = StationController::new(StationConfig::default(), outputs, &clock, dir.path());

    let outcome = c
        .execute(
            RunRequest::Run {
                station: 3,
                minutes: 1,
            },
            &AtomicBool::new(false),
        )
        .unwrap();

    assert_eq!(outcome, RunOutcome::Completed { station: 3, minutes: 1 });
    assert!(!gate.exists());
    assert_eq!(writes(&calls)[0].active_stations(), vec![3]);
}

#[test]
fn exit_hook_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let (outputs, calls) = MockOutputs::new(8);
    let clock = FakeClock::at(morning());
    let mut c = StationController::new(StationConfig::default(), outputs, &clock, dir.path())
        .with_pid(PID);

    c.shutdown().unwrap();
    c.shutdown().unwrap();
    drop(c);

    assert_eq!(
        *calls.borrow(),
        vec![
            OutputCall::Write(StationVector::all_off(8)),
            OutputCall::Release
        ]
    );
}

#[test]
fn stop_raised_before_start_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (outputs, calls) = MockOutputs::new(8);
    let clock = FakeClock::at(morning());
    let mut c = StationController::new(StationConfig::default(), outputs, &clock, dir.path())
        .with_pid(PID);

    let outcome = c
        .execute(
            RunRequest::Run {
                station: 3,
                minutes: 10,
            },
            &AtomicBool::new(true),
        )
        .unwrap();

    assert_eq!(outcome, RunOutcome::Interrupted { station: 3 });
    assert!(calls.borrow().is_empty());
    assert!(c.status().is_all_off());
    assert_eq!(pid_files(dir.path()), 0);
}

#[test]
fn drop_after_interrupt_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let stop = Rc::new(AtomicBool::new(false));
    let raise = Rc::clone(&stop);
    let clock = FakeClock::at(morning()).with_probe(move |now| {
        if now - morning() >= TimeDelta::minutes(5) {
            raise.store(true, Ordering::Relaxed);
        }
    });
    let (outputs, calls) = MockOutputs::new(8);
    let mut c = StationController::new(StationConfig::default(), outputs, &clock, dir.path())
        .with_pid(PID);

    let outcome = c
        .execute(
            RunRequest::Run {
                station: 6,
                minutes: 20,
            },
            &stop,
        )
        .unwrap();
    assert_eq!(outcome, RunOutcome::Interrupted { station: 6 });
    assert_eq!(c.status().active_stations(), vec![6]);
    assert_eq!(pid_files(dir.path()), 1);

    drop(c);

    assert_eq!(pid_files(dir.path()), 0);
    let written = writes(&calls);
    assert_eq!(written.last(), Some(&StationVector::all_off(8)));
    assert_eq!(calls.borrow().last(), Some(&OutputCall::Release));
}
