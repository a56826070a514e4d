//! Atomic file replacement.
//!
//! Bytes are written to a scratch file in the target's directory, fsynced, and
//! renamed over the target. A reader sees either the old or the new file,
//! never a prefix of the new one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};

pub const SCRATCH_PREFIX: &str = ".tmp_";
pub const SCRATCH_SUFFIX: &str = ".json";

/// New content fully written to a scratch file but not yet visible at the target.
///
/// Dropping it without [`StagedWrite::commit`] removes the scratch file and
/// leaves the target untouched.
#[derive(Debug)]
pub struct StagedWrite {
    scratch: NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the scratch file onto the target.
    pub fn commit(self) -> StorageResult<()> {
        let StagedWrite { scratch, target } = self;
        // on failure the PersistError drops and deletes the scratch file
        scratch
            .persist(&target)
            .map_err(|e| StorageError::io(&target, e.error))?;
        sync_parent(&target);
        debug!(path = %target.display(), "committed atomic write");
        Ok(())
    }
}

fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Write `bytes` to a scratch file next to `target`, creating parent directories.
pub fn stage(target: &Path, bytes: &[u8]) -> StorageResult<StagedWrite> {
    let dir = parent_dir(target);
    fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

    let mut scratch = Builder::new()
        .prefix(SCRATCH_PREFIX)
        .suffix(SCRATCH_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| StorageError::io(dir, e))?;

    scratch
        .write_all(bytes)
        .and_then(|()| scratch.flush())
        .map_err(|e| StorageError::io(scratch.path(), e))?;
    scratch
        .as_file()
        .sync_all()
        .map_err(|e| StorageError::io(scratch.path(), e))?;

    Ok(StagedWrite {
        scratch,
        target: target.to_path_buf(),
    })
}

/// Replace `target` with `bytes` atomically.
pub fn write(target: &Path, bytes: &[u8]) -> StorageResult<()> {
    stage(target, bytes)?.commit()
}

// fsync the directory so the rename itself is durable
#[cfg(unix)]
fn sync_parent(target: &Path) {
    let dir = parent_dir(target);
    if let Err(e) = fs::File::open(dir).and_then(|handle| handle.sync_all()) {
        warn!(path = %dir.display(), error = %e, "failed to fsync directory after rename");
    }
}

#[cfg(not(unix))]
fn sync_parent(_target: &Path) {}

fn is_scratch_name(name: &str) -> bool {
    name.starts_with(SCRATCH_PREFIX) && name.ends_with(SCRATCH_SUFFIX)
}

/// Remove scratch files abandoned by an interrupted write. Returns how many were removed.
pub fn sweep_scratch(dir: &Path) -> StorageResult<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(StorageError::io(dir, e)),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| StorageError::io(dir, e))?;
        let name = entry.file_name();
        if !is_scratch_name(&name.to_string_lossy()) {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %entry.path().display(), error = %e, "failed to remove stale scratch file"),
        }
    }
    if removed > 0 {
        warn!(dir = %dir.display(), removed, "removed scratch files left by an interrupted write");
    }
    Ok(removed)
}
