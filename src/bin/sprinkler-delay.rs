//! Rain delay: set, inspect or clear the `DELAY` gate.
//!
//! ```text
//! sprinkler-delay --hours 24     skip watering for a day
//! sprinkler-delay --check        report whether a delay is in effect
//! sprinkler-delay --clear        water again on the next run
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use log::error;

use sprinkler::adapters::log_sink::FileLogger;
use sprinkler::config::{StationConfig, default_state_dir};
use sprinkler::lease::delay_gate::{DELAY_FORMAT, describe_remaining};
use sprinkler::lease::{DelayGate, GateStatus};

enum Action {
    Set { hours: u32 },
    Check,
    Clear,
}

struct Args {
    action: Action,
    dir: Option<PathBuf>,
    debug: bool,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let mut args = std::env::args().skip(1);
        let mut action = None;
        let mut dir = None;
        let mut debug = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--hours" => {
                    let val = args.next().ok_or("--hours needs a value")?;
                    let hours: u32 = val.parse().map_err(|_| "Invalid number of hours")?;
                    if hours == 0 {
                        return Err("--hours must be at least 1".to_string());
                    }
                    action = Some(Action::Set { hours });
                }
                "--check" => {
                    action = Some(Action::Check);
                }
                "--clear" => {
                    action = Some(Action::Clear);
                }
                "--dir" | "-d" => {
                    dir = Some(PathBuf::from(args.next().ok_or("--dir needs a value")?));
                }
                "--debug" => {
                    debug = true;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {
                    return Err(format!("Unknown argument: {}", arg));
                }
            }
        }

        let action = action.ok_or("one of --hours, --check or --clear is required")?;
        Ok(Self { action, dir, debug })
    }
}

fn print_help() {
    println!(
        r#"Sprinkler rain delay

USAGE:
    sprinkler-delay (--hours <N> | --check | --clear) [OPTIONS]

OPTIONS:
        --hours <N>     Block runs for N hours from now
        --check         Report the current delay (an expired delay is removed)
        --clear         Remove any delay
    -d, --dir <PATH>    State directory (default: $SPRINKLER_DIR or
                        the executable's directory)
        --debug         Print log lines to the console
    -h, --help          Print this help message
"#
    );
}

fn run(args: Args) -> Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => default_state_dir().context("resolving state directory")?,
    };
    let config = StationConfig::load(&dir)
        .with_context(|| format!("loading config from {}", dir.display()))?;
    if let Err(e) = FileLogger::new(&dir, config.debug || args.debug).install() {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    let gate = DelayGate::in_dir(&dir);
    let now = Local::now().naive_local();

    match args.action {
        Action::Set { hours } => {
            let until = gate.set_for_hours(now, hours)?;
            println!("Delay set until {}.", until.format(DELAY_FORMAT));
        }
        Action::Check => match gate.check_and_consume(now)? {
            GateStatus::Active { until, remaining } => {
                println!(
                    "Delay in effect until {} for {}.",
                    until.format(DELAY_FORMAT),
                    describe_remaining(remaining)
                );
            }
            GateStatus::Inactive => println!("No delay in effect."),
        },
        Action::Clear => {
            if gate.clear()? {
                println!("Delay removed.");
            } else {
                println!("No delay in effect.");
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
