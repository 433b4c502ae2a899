//! Run locks: `<pid>.pid` files asserting "this process is running station N".
//!
//! One file per controller process, named after its process id, holding
//! the 1-based station number as decimal text.  The file's modification
//! time is the lock's creation time, which is what the watchdog sweep ages.
//!
//! There is no atomic test-and-set here.  Two controllers can both hold a
//! lock; the sweep cleans up after either one if it dies.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeDelta};
use log::{debug, warn};

use crate::error::{Error, Result};

/// File extension marking a run lock.
pub const LOCK_EXTENSION: &str = "pid";

/// A run lock as found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLock {
    pub pid: u32,
    /// `None` when the file body is not a station number.
    pub station: Option<u8>,
    pub created_at: DateTime<Local>,
    pub path: PathBuf,
}

impl RunLock {
    pub fn age(&self, now: DateTime<Local>) -> TimeDelta {
        now - self.created_at
    }

    /// Strictly older than `threshold_minutes`.
    pub fn is_stale(&self, now: DateTime<Local>, threshold_minutes: u32) -> bool {
        self.age(now) > TimeDelta::minutes(i64::from(threshold_minutes))
    }
}

/// The directory holding every controller's run lock.
#[derive(Debug, Clone)]
pub struct RunLockDir {
    dir: PathBuf,
}

impl RunLockDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, pid: u32) -> PathBuf {
        self.dir.join(format!("{pid}.{LOCK_EXTENSION}"))
    }

    pub fn exists(&self, pid: u32) -> bool {
        self.path_for(pid).is_file()
    }

    /// Write the lock for `pid`, replacing any previous one.
    pub fn create(&self, pid: u32, station: u8) -> Result<RunLock> {
        let path = self.path_for(pid);
        fs::write(&path, station.to_string()).map_err(|e| Error::io(&path, e))?;
        debug!("run lock: created {} (station {})", path.display(), station);
        self.read(&path, pid)
    }

    /// Delete the lock for `pid`.  Returns `false` if there was none.
    pub fn remove(&self, pid: u32) -> Result<bool> {
        remove_lock_file(&self.path_for(pid))
    }

    /// Every run lock currently in the directory, ordered by pid.
    ///
    /// Entries that are not `<number>.pid` files are ignored.  A lock that
    /// disappears while being read was released by its owner and is skipped.
    pub fn list(&self) -> Result<Vec<RunLock>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let mut locks = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&self.dir, e))?;
            let path = entry.path();
            let Some(pid) = lock_pid(&path) else {
                continue;
            };
            match self.read(&path, pid) {
                Ok(lock) => locks.push(lock),
                Err(Error::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        locks.sort_by_key(|l| l.pid);
        Ok(locks)
    }

    fn read(&self, path: &Path, pid: u32) -> Result<RunLock> {
        let meta = fs::metadata(path).map_err(|e| Error::io(path, e))?;
        if !meta.is_file() {
            return Err(Error::io(path, io::Error::other("not a regular file")));
        }
        let modified = meta.modified().map_err(|e| Error::io(path, e))?;
        let raw = fs::read(path).map_err(|e| Error::io(path, e))?;
        let body = String::from_utf8_lossy(&raw);
        let station = body.trim().parse::<u8>().ok();
        if station.is_none() {
            warn!("run lock: {} has unreadable body {:?}", path.display(), body);
        }
        Ok(RunLock {
            pid,
            station,
            created_at: DateTime::<Local>::from(modified),
            path: path.to_path_buf(),
        })
    }
}

/// Delete a lock file by path.  Returns `false` if it was already gone.
pub fn remove_lock_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("run lock: removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn lock_pid(path: &Path) -> Option<u32> {
    if path.extension()? != LOCK_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}
