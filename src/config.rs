//! Runtime configuration and on-disk layout.
//!
//! ```text
//! <root>/data/{projects,tasks,daily_plans,settings}.json
//! <root>/backups/backup_<stem>_<YYYYMMDD_HHMMSS>.json
//! <root>/logs/error.log
//! ```

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::backup::DEFAULT_RETENTION;

#[derive(Debug, Clone, Parser)]
#[command(name = "desk-flow")]
#[command(version, about = "Local-first project and task tracker", long_about = None)]
pub struct Config {
    /// Application data root (defaults to ~/.deskflow)
    #[arg(long, env = "DESK_FLOW_HOME")]
    pub data_dir: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3000)]
    pub port: u16,

    /// Backups kept per data file
    #[arg(long, default_value_t = DEFAULT_RETENTION, value_parser = parse_retention)]
    pub max_backups: usize,

    /// Seconds between due-date reminder scans
    #[arg(long, default_value_t = 300)]
    pub reminder_interval_secs: u64,

    /// Disable the background reminder scan
    #[arg(long)]
    pub no_reminders: bool,
}

fn parse_retention(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("at least one backup must be kept".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Config {
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(self.data_dir.clone().unwrap_or_else(default_root))
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_secs.max(1))
    }
}

/// `~/.deskflow`, or `./.deskflow` when no home directory is known.
pub fn default_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".deskflow")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.root.join("backups")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn projects_file(&self) -> PathBuf {
        self.data_dir().join("projects.json")
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.data_dir().join("tasks.json")
    }

    pub fn daily_plans_file(&self) -> PathBuf {
        self.data_dir().join("daily_plans.json")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir().join("settings.json")
    }

    pub fn error_log(&self) -> PathBuf {
        self.logs_dir().join("error.log")
    }
}
