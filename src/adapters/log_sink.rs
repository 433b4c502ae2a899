//! File log sink.
//!
//! Backend for the `log` facade.  Each record becomes one line appended to
//! `log.txt` in the state directory:
//!
//! ```text
//! 2024-06-01 06:00:00\t4242\tOperating station 3 for 10 minutes.
//! ```
//!
//! In debug mode lines are echoed to stdout and debug records are kept.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Log file name inside the state directory.
pub const LOG_FILE_NAME: &str = "log.txt";

pub struct FileLogger {
    path: PathBuf,
    pid: u32,
    echo: bool,
    level: LevelFilter,
}

impl FileLogger {
    pub fn new(state_dir: &Path, debug: bool) -> Self {
        Self {
            path: state_dir.join(LOG_FILE_NAME),
            pid: std::process::id(),
            echo: debug,
            level: if debug {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        }
    }

    /// Make this the global logger.
    pub fn install(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One log line, newline included.  Info records carry the bare message;
/// other levels are prefixed with the level name.
pub fn format_line(at: &DateTime<Local>, pid: u32, level: Level, message: &str) -> String {
    let stamp = at.format("%Y-%m-%d %H:%M:%S");
    if level == Level::Info {
        format!("{stamp}\t{pid}\t{message}\n")
    } else {
        format!("{stamp}\t{pid}\t{level}: {message}\n")
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            &Local::now(),
            self.pid,
            record.level(),
            &record.args().to_string(),
        );
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = f.write_all(line.as_bytes());
        }
        if self.echo {
            print!("{line}");
        }
    }

    fn flush(&self) {}
}
