//! Watchdog sweep: force all stations off when a controller died mid-run.
//!
//! Meant to run from cron every few minutes:
//!
//! ```text
//! */5 * * * *  /opt/sprinkler/sprinkler-sweep
//! ```
//!
//! Exits 0 whether or not anything was stale; non-zero only when the
//! reset or a lock deletion failed.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::error;

use sprinkler::adapters::gpio::open_shift_register;
use sprinkler::adapters::log_sink::FileLogger;
use sprinkler::adapters::time::SystemClock;
use sprinkler::config::{StationConfig, default_state_dir};
use sprinkler::sweep::WatchdogSweep;

struct Args {
    dir: Option<PathBuf>,
    debug: bool,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let mut args = std::env::args().skip(1);
        let mut dir = None;
        let mut debug = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
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

        Ok(Self { dir, debug })
    }
}

fn print_help() {
    println!(
        r#"Sprinkler watchdog sweep

USAGE:
    sprinkler-sweep [OPTIONS]

OPTIONS:
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
    let mut config = StationConfig::load(&dir)
        .with_context(|| format!("loading config from {}", dir.display()))?;
    config.debug |= args.debug;

    if let Err(e) = FileLogger::new(&dir, config.debug).install() {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    let sweep = WatchdogSweep::new(config.clone(), &dir, SystemClock::new());
    let report = sweep
        .run(|| open_shift_register(&config).map_err(Into::into))
        .context("watchdog sweep")?;

    if report.stale.is_empty() {
        println!("No old PID files found.");
    }
    for path in &report.deleted {
        println!("Deleting File: {}", path.display());
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
