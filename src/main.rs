//! Sprinkler: run one station for a bounded time.
//!
//! Invoked once per watering slot by an external scheduler (cron):
//!
//! ```text
//! sprinkler --station 3 --minutes 10      run station 3 for 10 minutes
//! sprinkler --station 0                   turn everything off
//! ```
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  args ─▶ config ─▶ validate ─▶ log ─▶ signals ─▶ pins     │
//! │                                                   │       │
//! │          StationController (gate · lock · wait) ◀─┘       │
//! │                          │                                │
//! │              shutdown(): all-off · unlock · release       │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Bad arguments exit with status 2 before any pin is touched.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::{error, info};

use sprinkler::adapters::gpio::open_shift_register;
use sprinkler::adapters::log_sink::FileLogger;
use sprinkler::adapters::time::SystemClock;
use sprinkler::app::commands::RunRequest;
use sprinkler::app::controller::StationController;
use sprinkler::app::events::RunOutcome;
use sprinkler::config::{StationConfig, default_state_dir};
use sprinkler::lease::delay_gate::{DELAY_FORMAT, describe_remaining};
use sprinkler::signals;

/// Command line arguments
struct Args {
    /// Station to run, 0 for all off
    station: u32,
    /// Run time in minutes
    minutes: Option<u32>,
    /// Echo log output to the console
    debug: bool,
    /// State directory override
    dir: Option<PathBuf>,
    /// Board revision override for the data pin
    board_revision: Option<u8>,
}

impl Args {
    fn parse() -> Result<Self, String> {
        Self::from_args(std::env::args().skip(1))
    }

    fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut station = None;
        let mut minutes = None;
        let mut debug = false;
        let mut dir = None;
        let mut board_revision = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--station" | "-s" => {
                    let val = args.next().ok_or("--station needs a value")?;
                    station = Some(val.parse().map_err(|_| "Invalid station number")?);
                }
                "--minutes" | "-m" => {
                    let val = args.next().ok_or("--minutes needs a value")?;
                    minutes = Some(val.parse().map_err(|_| "Invalid number of minutes")?);
                }
                "--dir" | "-d" => {
                    dir = Some(PathBuf::from(args.next().ok_or("--dir needs a value")?));
                }
                "--board-revision" => {
                    let val = args.next().ok_or("--board-revision needs a value")?;
                    board_revision = Some(val.parse().map_err(|_| "Invalid board revision")?);
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

        let station = station.ok_or("--station is required")?;

        Ok(Self {
            station,
            minutes,
            debug,
            dir,
            board_revision,
        })
    }
}

fn print_help() {
    println!(
        r#"Sprinkler - run one irrigation station

USAGE:
    sprinkler --station <N> --minutes <M> [OPTIONS]

OPTIONS:
    -s, --station <N>          Station to run (1-8), 0 turns everything off
    -m, --minutes <M>          Minutes to run the station (1-30)
    -d, --dir <PATH>           State directory (default: $SPRINKLER_DIR or
                               the executable's directory)
        --board-revision <R>   Use the data pin of board revision R
        --debug                Print log lines to the console
    -h, --help                 Print this help message

A DELAY file in the state directory blocks runs until it expires.
"#
    );
}

fn load_config(args: &Args, dir: &std::path::Path) -> Result<StationConfig> {
    let mut config = StationConfig::load(dir)
        .with_context(|| format!("loading config from {}", dir.display()))?;
    if args.debug {
        config.debug = true;
    }
    if let Some(rev) = args.board_revision {
        config.pins.set_board_revision(rev);
    }
    config.validate()?;
    Ok(config)
}

fn run(config: StationConfig, request: RunRequest, dir: &std::path::Path) -> Result<()> {
    // ── 1. Hardware ───────────────────────────────────────────
    signals::install().context("installing signal handlers")?;
    let outputs = open_shift_register(&config).context("initialising shift register")?;

    // ── 2. Run ────────────────────────────────────────────────
    let mut controller = StationController::new(config, outputs, SystemClock::new(), dir);
    let outcome = controller.execute(request, signals::stop_flag());

    // ── 3. Exit hook (also runs on drop) ──────────────────────
    let cleanup = controller.shutdown();

    match outcome? {
        RunOutcome::Gated { until, remaining } => {
            println!(
                "Delay in effect until {} ({}).",
                until.format(DELAY_FORMAT),
                describe_remaining(remaining)
            );
        }
        RunOutcome::Interrupted { station } => {
            info!("Station {} stopped by signal.", station);
        }
        RunOutcome::Completed { .. } | RunOutcome::AllOff => {}
    }
    cleanup?;
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

    let dir = match args.dir.clone().map_or_else(default_state_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: cannot determine state directory: {}", e);
            return ExitCode::from(2);
        }
    };

    let config = match load_config(&args, &dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    // Bounds are checked before logging or hardware are touched.
    let request = match RunRequest::validate(&config, args.station, args.minutes) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let debug = config.debug;
    if let Err(e) = FileLogger::new(&dir, debug).install() {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    match run(config, request, &dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
