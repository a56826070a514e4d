//! Whole-file stores over JSON data files.
//!
//! Every mutation reads the full file (recovering it if needed), applies the
//! change in memory, snapshots the current file, and rewrites it atomically.
//! There is no locking across processes; the last writer wins.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::atomic;
use crate::backup::BackupRotator;
use crate::codec::{self, Record};
use crate::error::StorageResult;
use crate::recovery::{self, Loaded};

/// A JSON array of homogeneous records keyed by id.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    path: PathBuf,
    backups: BackupRotator,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    pub fn new(path: impl Into<PathBuf>, backups: BackupRotator) -> Self {
        Self {
            path: path.into(),
            backups,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records plus how they were obtained.
    pub fn load(&self) -> StorageResult<Loaded<Vec<T>>> {
        recovery::read_or_recover(&self.path, &self.backups, Vec::new)
    }

    /// All records in stored order.
    pub fn list(&self) -> StorageResult<Vec<T>> {
        Ok(self.load()?.value)
    }

    pub fn get(&self, id: &str) -> StorageResult<Option<T>> {
        Ok(self.list()?.into_iter().find(|r| r.id() == id))
    }

    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> StorageResult<Vec<T>> {
        Ok(self.list()?.into_iter().filter(|r| predicate(r)).collect())
    }

    /// Upsert by id: replace in place, or append.
    pub fn save(&self, record: &T) -> StorageResult<()> {
        let mut records = self.list()?;
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record.clone(),
            None => records.push(record.clone()),
        }
        self.backups.snapshot(&self.path)?;
        self.write(records)?;
        debug!(kind = T::KIND, id = record.id(), "saved record");
        Ok(())
    }

    /// Remove by id. Returns `false` (and writes nothing) when absent.
    pub fn delete(&self, id: &str) -> StorageResult<bool> {
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Ok(false);
        }
        self.backups.snapshot(&self.path)?;
        self.write(records)?;
        debug!(kind = T::KIND, id, "deleted record");
        Ok(true)
    }

    /// Overwrite the whole collection.
    pub fn replace_all(&self, records: Vec<T>) -> StorageResult<()> {
        self.backups.snapshot(&self.path)?;
        self.write(records)
    }

    fn write(&self, mut records: Vec<T>) -> StorageResult<()> {
        for record in &mut records {
            record.normalize();
        }
        let bytes = codec::encode(&records)?;
        atomic::write(&self.path, &bytes)
    }
}

/// A single JSON object file, such as the settings singleton.
#[derive(Debug, Clone)]
pub struct Document<T> {
    path: PathBuf,
    backups: BackupRotator,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Document<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>, backups: BackupRotator) -> Self {
        Self {
            path: path.into(),
            backups,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> StorageResult<Loaded<T>> {
        recovery::read_or_recover(&self.path, &self.backups, T::default)
    }

    pub fn get(&self) -> StorageResult<T> {
        Ok(self.load()?.value)
    }

    /// Replace the document. Returns the backup taken of the previous version, if any.
    pub fn save(&self, value: &T) -> StorageResult<Option<PathBuf>> {
        let bytes = codec::encode(value)?;
        let backup = self.backups.snapshot(&self.path)?;
        atomic::write(&self.path, &bytes)?;
        Ok(backup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::DEFAULT_RETENTION;
    use crate::models::{Milestone, Project, Settings, Theme};
    use crate::recovery::LoadOutcome;
    use std::fs;
    use tempfile::TempDir;

    fn projects(tmp: &TempDir) -> Collection<Project> {
        let backups = BackupRotator::new(tmp.path().join("backups"), DEFAULT_RETENTION);
        Collection::new(tmp.path().join("data").join("projects.json"), backups)
    }

    fn project(name: &str) -> Project {
        Project::new(name, codec::parse_timestamp("2024-01-01T09:00:00+00:00").unwrap())
    }

    #[test]
    fn empty_collection_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = projects(&tmp);
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn save_appends_then_replaces_in_place() {
        let tmp = TempDir::new().unwrap();
        let store = projects(&tmp);
        let mut alpha = project("Alpha");
        let beta = project("Beta");
        store.save(&alpha).unwrap();
        store.save(&beta).unwrap();

        alpha.name = "Alpha v2".to_string();
        store.save(&alpha).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Alpha v2".to_string(), "Beta".to_string()]);
    }

    #[test]
    fn saving_the_same_record_twice_is_byte_stable() {
        let tmp = TempDir::new().unwrap();
        let store = projects(&tmp);
        let alpha = project("Alpha");

        store.save(&alpha).unwrap();
        let first = fs::read(store.path()).unwrap();
        store.save(&alpha).unwrap();
        let second = fs::read(store.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn save_snapshots_the_previous_file() {
        let tmp = TempDir::new().unwrap();
        let store = projects(&tmp);
        store.save(&project("Alpha")).unwrap();
        let before = fs::read(store.path()).unwrap();

        store.save(&project("Beta")).unwrap();

        let backups = BackupRotator::new(tmp.path().join("backups"), DEFAULT_RETENTION);
        let latest = backups.latest("projects").unwrap().unwrap();
        assert_eq!(fs::read(latest).unwrap(), before);
    }

    #[test]
    fn delete_missing_id_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = projects(&tmp);
        let alpha = project("Alpha");
        store.save(&alpha).unwrap();

        assert!(!store.delete("missing").unwrap());
        assert!(store.delete(&alpha.id).unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn derived_progress_is_recomputed_on_write() {
        let tmp = TempDir::new().unwrap();
        let store = projects(&tmp);
        let mut alpha = project("Alpha");
        alpha.milestones = vec![Milestone::new("a"), Milestone::new("b")];
        alpha.milestones[1].completed = true;
        alpha.progress_percentage = 99.0;

        store.save(&alpha).unwrap();

        assert_eq!(store.get(&alpha.id).unwrap().unwrap().progress_percentage, 50.0);
    }

    #[test]
    fn corrupted_collection_recovers_before_mutating() {
        let tmp = TempDir::new().unwrap();
        let store = projects(&tmp);
        let alpha = project("Alpha");
        store.save(&alpha).unwrap();
        store.save(&project("Beta")).unwrap();

        fs::write(store.path(), b"{ truncated").unwrap();
        let loaded = store.load().unwrap();
        assert!(matches!(loaded.outcome, LoadOutcome::Restored(_)));
        // backup taken before "Beta" was added
        assert_eq!(loaded.value.len(), 1);

        store.save(&project("Gamma")).unwrap();
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn document_defaults_and_round_trips() {
        let tmp = TempDir::new().unwrap();
        let backups = BackupRotator::new(tmp.path().join("backups"), DEFAULT_RETENTION);
        let doc: Document<Settings> = Document::new(tmp.path().join("data/settings.json"), backups);

        let mut settings = doc.get().unwrap();
        assert_eq!(settings, Settings::default());

        settings.theme = Theme::Dark;
        doc.save(&settings).unwrap();
        assert_eq!(doc.get().unwrap().theme, Theme::Dark);
    }
}
