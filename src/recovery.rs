//! Reading data files with automatic recovery from backups.
//!
//! A file that exists but does not decode is replaced by its most recent
//! backup. When no usable backup exists the caller's default is returned and
//! the damaged file is left in place for inspection.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::atomic;
use crate::backup::{BackupRotator, logical_stem};
use crate::codec;
use crate::error::{StorageError, StorageResult};

/// How a value was obtained from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The primary file decoded cleanly.
    Loaded,
    /// The primary file does not exist yet.
    Missing,
    /// The primary file was corrupt and was restored from this backup.
    Restored(PathBuf),
    /// The primary file was corrupt and no usable backup existed.
    Defaulted,
}

impl LoadOutcome {
    /// Informational message for the user, when there is something to report.
    pub fn message(&self, path: &Path) -> Option<String> {
        match self {
            LoadOutcome::Loaded | LoadOutcome::Missing => None,
            LoadOutcome::Restored(backup) => Some(format!(
                "{} was corrupted and has been restored from backup {}",
                path.display(),
                backup
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            )),
            LoadOutcome::Defaulted => Some(format!(
                "{} was corrupted and no backup was available; empty data was substituted",
                path.display()
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub outcome: LoadOutcome,
}

/// Decode `path`, recovering from the latest backup of its logical identity on corruption.
///
/// Only I/O failures surface as errors; corruption never does.
pub fn read_or_recover<T, F>(
    path: &Path,
    backups: &BackupRotator,
    default: F,
) -> StorageResult<Loaded<T>>
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(Loaded {
                value: default(),
                outcome: LoadOutcome::Missing,
            });
        }
        Err(e) => return Err(StorageError::io(path, e)),
    };

    let err = match codec::decode(&bytes) {
        Ok(value) => {
            return Ok(Loaded {
                value,
                outcome: LoadOutcome::Loaded,
            });
        }
        Err(err) => err,
    };
    warn!(path = %path.display(), error = %err, "data file is corrupted, looking for a backup");

    let Some(backup) = backups.latest(&logical_stem(path))? else {
        warn!(path = %path.display(), "no backup available, substituting default data");
        return Ok(Loaded {
            value: default(),
            outcome: LoadOutcome::Defaulted,
        });
    };

    let backup_bytes = fs::read(&backup).map_err(|e| StorageError::io(&backup, e))?;
    match codec::decode(&backup_bytes) {
        Ok(value) => {
            atomic::write(path, &backup_bytes)?;
            info!(path = %path.display(), backup = %backup.display(), "restored data file from backup");
            Ok(Loaded {
                value,
                outcome: LoadOutcome::Restored(backup),
            })
        }
        Err(err) => {
            warn!(backup = %backup.display(), error = %err, "latest backup is corrupted too, substituting default data");
            Ok(Loaded {
                value: default(),
                outcome: LoadOutcome::Defaulted,
            })
        }
    }
}
