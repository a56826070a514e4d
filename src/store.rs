use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::atomic;
use crate::backup::BackupRotator;
use crate::codec;
use crate::collection::{Collection, Document};
use crate::config::DataLayout;
use crate::error::{StorageError, StorageResult};
use crate::models::{DailyPlan, Project, Settings, Task};

/// All persisted state under one data root.
#[derive(Debug, Clone)]
pub struct Storage {
    layout: DataLayout,
    backups: BackupRotator,
    pub projects: Collection<Project>,
    pub tasks: Collection<Task>,
    pub daily_plans: Collection<DailyPlan>,
    pub settings: Document<Settings>,
}

impl Storage {
    /// Create the directory tree and clear scratch files left by an interrupted write.
    pub fn open(layout: DataLayout, max_backups: usize) -> StorageResult<Self> {
        for dir in [layout.data_dir(), layout.backup_dir(), layout.logs_dir()] {
            fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        }
        atomic::sweep_scratch(&layout.data_dir())?;

        let backups = BackupRotator::new(layout.backup_dir(), max_backups);
        let storage = Self {
            projects: Collection::new(layout.projects_file(), backups.clone()),
            tasks: Collection::new(layout.tasks_file(), backups.clone()),
            daily_plans: Collection::new(layout.daily_plans_file(), backups.clone()),
            settings: Document::new(layout.settings_file(), backups.clone()),
            backups,
            layout,
        };
        storage.report_recoveries()?;
        info!(root = %storage.layout.root().display(), "storage opened");
        Ok(storage)
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn backups(&self) -> &BackupRotator {
        &self.backups
    }

    // load every file once so corruption is repaired and reported at startup
    fn report_recoveries(&self) -> StorageResult<()> {
        let outcomes = [
            (self.projects.path().to_path_buf(), self.projects.load()?.outcome),
            (self.tasks.path().to_path_buf(), self.tasks.load()?.outcome),
            (self.daily_plans.path().to_path_buf(), self.daily_plans.load()?.outcome),
            (self.settings.path().to_path_buf(), self.settings.load()?.outcome),
        ];
        for (path, outcome) in outcomes {
            if let Some(message) = outcome.message(&path) {
                warn!("{message}");
            }
        }
        Ok(())
    }

    /// Manual backup of every existing data file; records `last_backup` in settings.
    pub fn backup_all(&self) -> StorageResult<Vec<PathBuf>> {
        let mut created = Vec::new();

        // saving settings snapshots the previous settings file
        let mut settings = self.settings.get()?;
        settings.last_backup = Some(codec::now());
        if let Some(backup) = self.settings.save(&settings)? {
            created.push(backup);
        }

        for path in [self.projects.path(), self.tasks.path(), self.daily_plans.path()] {
            if let Some(backup) = self.backups.snapshot(path)? {
                created.push(backup);
            }
        }
        info!(count = created.len(), "manual backup complete");
        Ok(created)
    }

    /// Back everything up, then empty the project, task and plan collections.
    pub fn clear_all(&self) -> StorageResult<()> {
        self.backup_all()?;
        self.projects.replace_all(Vec::new())?;
        self.tasks.replace_all(Vec::new())?;
        self.daily_plans.replace_all(Vec::new())?;
        warn!("all project, task and daily plan data cleared");
        Ok(())
    }
}
