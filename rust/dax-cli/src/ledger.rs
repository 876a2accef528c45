use std::{
    ffi::OsString,
    io::Write,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use dax_registry::{RegistryEvent, RegistryState};
use parking_lot::{Mutex, MutexGuard};
use pidlock::Pidlock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long a command waits for another writer to finish with a ledger.
pub const LOCK_WAIT: Duration = Duration::from_secs(10);

const LOCK_RETRY: Duration = Duration::from_millis(5);

// Pid locks cannot tell threads of one process apart, so writers within
// a process queue here first.
static PROCESS_WRITER: Mutex<()> = parking_lot::const_mutex(());

/// The contents of a ledger file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// The registry as of the last committed command.
    pub registry: RegistryState,

    /// Every event emitted so far, oldest first.
    #[serde(default)]
    pub events: Vec<RegistryEvent>,
}

/// Errors that can occur while reading or writing a ledger file.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// There is no ledger at the path.
    #[error("No ledger at '{}'; run `dax init` first", path.display())]
    Missing {
        /// Path that was read.
        path: PathBuf,
    },

    /// A ledger already exists where a new one would be created.
    #[error("A ledger already exists at '{}'; pass --force to replace it", path.display())]
    Exists {
        /// Path of the existing ledger.
        path: PathBuf,
    },

    /// Reading or writing the file failed.
    #[error("Ledger I/O failed at '{}': {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Another writer held the ledger for longer than we were willing to
    /// wait.
    #[error("Ledger '{}' is locked by another writer; try again", path.display())]
    Locked {
        /// Path of the lock file.
        path: PathBuf,
    },

    /// The lock file could not be taken for a reason other than contention.
    #[error("Failed to lock '{}': {reason}", path.display())]
    Lock {
        /// Path of the lock file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The file is not a valid ledger.
    #[error("Ledger is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl Ledger {
    /// A ledger with no events yet.
    pub fn new(registry: RegistryState) -> Self {
        Self {
            registry,
            events: Vec::new(),
        }
    }

    /// Reads the ledger at `path`.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let json = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LedgerError::Missing {
                    path: path.to_owned(),
                }
            } else {
                LedgerError::Io {
                    path: path.to_owned(),
                    source,
                }
            }
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Writes the ledger to `path`, replacing any previous file in one
    /// step so readers never see a partial ledger.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let io_error = |source: std::io::Error| LedgerError::Io {
            path: path.to_owned(),
            source,
        };

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(directory).map_err(io_error)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        file.write_all(b"\n").map_err(io_error)?;
        file.persist(path).map_err(|error| io_error(error.error))?;

        tracing::debug!(path = %path.display(), events = self.events.len(), "Saved ledger");
        Ok(())
    }

    /// Writes a fresh ledger, refusing to clobber an existing one unless
    /// `force` is set.
    pub fn create(&self, path: &Path, force: bool) -> Result<(), LedgerError> {
        let _lock = LedgerLock::acquire(path, LOCK_WAIT)?;
        if !force && path.exists() {
            return Err(LedgerError::Exists {
                path: path.to_owned(),
            });
        }
        self.save(path)
    }
}

/// Exclusive write access to a ledger, released when dropped.
///
/// Hold one from before [`Ledger::load`] until after [`Ledger::save`] so
/// that concurrent commands apply their changes one after another instead
/// of overwriting each other. The lock is a `<ledger>.lock` file holding
/// the owner's pid; a lock left behind by a dead process is cleared.
pub struct LedgerLock {
    lock: Pidlock,
    path: PathBuf,
    _process: MutexGuard<'static, ()>,
}

impl LedgerLock {
    /// Locks the ledger at `path`, waiting up to `wait` for a current
    /// holder to let go.
    pub fn acquire(path: &Path, wait: Duration) -> Result<Self, LedgerError> {
        let deadline = Instant::now() + wait;
        let path = lock_path(path);

        let process = PROCESS_WRITER
            .try_lock_for(wait)
            .ok_or_else(|| LedgerError::Locked { path: path.clone() })?;

        let path_str = path.to_str().ok_or_else(|| LedgerError::Lock {
            path: path.clone(),
            reason: "Lock path is not valid UTF-8".to_string(),
        })?;
        let mut lock = Pidlock::new(path_str);

        loop {
            match lock.acquire() {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Locked ledger");
                    return Ok(Self {
                        lock,
                        path,
                        _process: process,
                    });
                }
                Err(pidlock::PidlockError::LockExists) => match lock.get_owner() {
                    Some(pid) if Instant::now() >= deadline => {
                        tracing::warn!(path = %path.display(), pid, "Ledger lock is held");
                        return Err(LedgerError::Locked { path });
                    }
                    Some(_) => std::thread::sleep(LOCK_RETRY),
                    // Stale lock, cleared by `get_owner`.
                    None => {}
                },
                Err(error) => {
                    return Err(LedgerError::Lock {
                        path,
                        reason: format!("{error:?}"),
                    });
                }
            }
        }
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if self.lock.release().is_err() {
            tracing::warn!(path = %self.path.display(), "Failed to release ledger lock");
        }
    }
}

fn lock_path(ledger: &Path) -> PathBuf {
    let mut path = OsString::from(ledger.as_os_str());
    path.push(".lock");
    PathBuf::from(path)
}
