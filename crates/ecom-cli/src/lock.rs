//! Advisory run marker.
//!
//! A full pipeline run holds a marker file containing the owner's PID. A
//! second run that finds the marker is skipped. The marker is removed when
//! the [`RunLock`] is dropped; a marker left by a crashed run stays until an
//! operator removes it.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Marker held for the duration of a run.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

#[derive(Debug)]
pub enum LockAttempt {
    Acquired(RunLock),
    /// Another run holds the marker. `pid` is `None` when the file does not
    /// hold a readable PID.
    Held { pid: Option<u32> },
}

impl RunLock {
    pub fn acquire(path: &Path) -> io::Result<LockAttempt> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                let lock = Self {
                    path: path.to_path_buf(),
                };
                writeln!(file, "{}", std::process::id())?;
                debug!(path = %path.display(), "run lock acquired");
                Ok(LockAttempt::Acquired(lock))
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(LockAttempt::Held {
                pid: read_pid(path),
            }),
            Err(err) => Err(err),
        }
    }

    /// Remove a marker regardless of who wrote it. Returns whether one existed.
    pub fn break_lock(path: &Path) -> io::Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => {
                warn!(path = %path.display(), "removed existing run lock");
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %err, "failed to remove run lock");
        }
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}
