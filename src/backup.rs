//! Timestamped backups of data files with bounded retention.
//!
//! Backups live in one directory and are grouped by the logical identity
//! (file stem) of the data file they copy:
//! `backup_<stem>_<YYYYMMDD_HHMMSS>[_NN].json`.

use std::cmp::Reverse;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::codec::{self, Timestamp};
use crate::error::{StorageError, StorageResult};

pub const DEFAULT_RETENTION: usize = 7;

const BACKUP_PREFIX: &str = "backup_";
const BACKUP_EXT: &str = ".json";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const STAMP_LEN: usize = 15;

/// A backup file belonging to one logical identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub stamp: NaiveDateTime,
    pub seq: u32,
}

#[derive(Debug, Clone)]
pub struct BackupRotator {
    dir: PathBuf,
    retention: usize,
}

/// Logical identity of a data file: its name without extension.
pub fn logical_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// "<stamp>" or "<stamp>_<seq>" after "backup_<stem>_", before ".json"
fn parse_backup_name(file_name: &str, stem: &str) -> Option<(NaiveDateTime, u32)> {
    let rest = file_name
        .strip_prefix(BACKUP_PREFIX)?
        .strip_prefix(stem)?
        .strip_prefix('_')?
        .strip_suffix(BACKUP_EXT)?;
    let stamp = NaiveDateTime::parse_from_str(rest.get(..STAMP_LEN)?, STAMP_FORMAT).ok()?;
    let seq = match rest.get(STAMP_LEN..)? {
        "" => 0,
        tail => {
            let digits = tail.strip_prefix('_')?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok()?
        }
    };
    Some((stamp, seq))
}

impl BackupRotator {
    pub fn new(dir: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            dir: dir.into(),
            retention,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Copy `source` into the backup directory and prune old backups of the same stem.
    ///
    /// Returns `None` when `source` does not exist yet.
    pub fn snapshot(&self, source: &Path) -> StorageResult<Option<PathBuf>> {
        self.snapshot_at(source, codec::now())
    }

    pub(crate) fn snapshot_at(&self, source: &Path, at: Timestamp) -> StorageResult<Option<PathBuf>> {
        match fs::metadata(source) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(source, e)),
        }

        let stem = logical_stem(source);
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        let dest = self.next_backup_path(&stem, at)?;
        fs::copy(source, &dest).map_err(|e| StorageError::io(&dest, e))?;
        info!(source = %source.display(), backup = %dest.display(), "created backup");

        self.prune(&stem)?;
        Ok(Some(dest))
    }

    // Same-second snapshots continue after the highest sequence in use for
    // that stamp; a pruned slot is never handed out again.
    fn next_backup_path(&self, stem: &str, at: Timestamp) -> StorageResult<PathBuf> {
        let stamp = at.format(STAMP_FORMAT).to_string();
        let base = format!("{BACKUP_PREFIX}{stem}_{stamp}");
        let highest = self
            .list(stem)?
            .into_iter()
            .filter(|b| b.stamp.format(STAMP_FORMAT).to_string() == stamp)
            .map(|b| b.seq)
            .max();
        let mut seq = match highest {
            None => return Ok(self.dir.join(format!("{base}{BACKUP_EXT}"))),
            Some(seq) => seq + 1,
        };
        let mut candidate = self.dir.join(format!("{base}_{seq:02}{BACKUP_EXT}"));
        while candidate.exists() {
            seq += 1;
            candidate = self.dir.join(format!("{base}_{seq:02}{BACKUP_EXT}"));
        }
        Ok(candidate)
    }

    /// Backups for `stem`, newest first (modification time, then name stamp).
    pub fn list(&self, stem: &str) -> StorageResult<Vec<BackupEntry>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.dir, e)),
        };

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.dir, e))?;
            let name = entry.file_name();
            let Some((stamp, seq)) = parse_backup_name(&name.to_string_lossy(), stem) else {
                continue;
            };
            let path = entry.path();
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .map_err(|e| StorageError::io(&path, e))?;
            backups.push(BackupEntry {
                path,
                modified,
                stamp,
                seq,
            });
        }

        backups.sort_by_key(|b| Reverse((b.modified, b.stamp, b.seq)));
        Ok(backups)
    }

    pub fn latest(&self, stem: &str) -> StorageResult<Option<PathBuf>> {
        Ok(self.list(stem)?.into_iter().next().map(|b| b.path))
    }

    /// Delete backups of `stem` beyond the retention count. Returns how many were removed.
    pub fn prune(&self, stem: &str) -> StorageResult<usize> {
        let backups = self.list(stem)?;
        let mut removed = 0;
        for stale in backups.iter().skip(self.retention) {
            match fs::remove_file(&stale.path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %stale.path.display(), error = %e, "failed to prune backup");
                    return Err(StorageError::io(&stale.path, e));
                }
            }
        }
        if removed > 0 {
            debug!(stem, removed, kept = self.retention, "pruned old backups");
        }
        Ok(removed)
    }
}
