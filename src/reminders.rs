/*
Due-date reminders.
The scan itself is pure and independent of the runtime loop for testing;
what was already announced lives only in memory and is never persisted.
*/

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::codec::{self, Timestamp};
use crate::error::TrackerResult;
use crate::models::{NotificationSettings, Task, TaskStatus, parse_hhmm};
use crate::tracker::Tracker;

const DAY_SECS: i64 = 24 * 60 * 60;
// the daily summary fires when a scan lands this close to the configured time
const SUMMARY_WINDOW_SECS: i64 = 5 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReminderKind {
    DueSoon { hours_left: i64 },
    Overdue { days_overdue: i64 },
    DailySummary { due_today: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub task_id: Option<String>,
    pub title: String,
    #[serde(flatten)]
    pub kind: ReminderKind,
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

impl Reminder {
    pub fn message(&self) -> String {
        match &self.kind {
            ReminderKind::DueSoon { hours_left } => {
                format!("'{}' is due in {}", self.title, plural(*hours_left, "hour"))
            }
            ReminderKind::Overdue { days_overdue } => {
                format!("'{}' is {} overdue", self.title, plural(*days_overdue, "day"))
            }
            ReminderKind::DailySummary { due_today } => {
                format!("You have {} due today", plural(*due_today as i64, "task"))
            }
        }
    }
}

// Combine a date and a wall-clock time in the given offset.
fn at_time_on(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    offset.from_local_datetime(&date.and_time(time)).single()
}

/// A task falls due at the start of its due date.
pub fn due_at(task: &Task, offset: FixedOffset) -> Option<Timestamp> {
    at_time_on(task.due_date?, NaiveTime::MIN, offset)
}

/// Remembers which reminders were already raised.
#[derive(Debug, Default)]
pub struct ReminderTracker {
    due_soon: HashSet<String>,
    overdue: HashMap<String, Timestamp>,
    summary_shown: Option<NaiveDate>,
}

impl ReminderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reminders that became due since the previous scan.
    ///
    /// - due soon: due within the next 24 hours, once per task
    /// - overdue: past due, at most once per 24 hours per task
    /// - daily summary: once per day, near `daily_summary_time`, when anything is due today
    pub fn scan(
        &mut self,
        tasks: &[Task],
        prefs: &NotificationSettings,
        now: Timestamp,
    ) -> Vec<Reminder> {
        let open: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.status != TaskStatus::Completed)
            .collect();
        self.forget_missing(&open);

        let mut reminders = Vec::new();
        if !prefs.enabled {
            return reminders;
        }

        if prefs.daily_summary {
            reminders.extend(self.daily_summary(&open, prefs, now));
        }

        let offset = *now.offset();
        for task in open {
            let Some(due) = due_at(task, offset) else {
                continue;
            };
            let secs = (due - now).num_seconds();

            if prefs.task_due_soon && secs > 0 && secs < DAY_SECS && self.due_soon.insert(task.id.clone()) {
                reminders.push(Reminder {
                    task_id: Some(task.id.clone()),
                    title: task.title.clone(),
                    kind: ReminderKind::DueSoon {
                        hours_left: secs / 3600,
                    },
                });
            }

            if prefs.task_overdue && secs < 0 {
                let notify = self
                    .overdue
                    .get(&task.id)
                    .is_none_or(|last| (now - *last).num_seconds() > DAY_SECS);
                if notify {
                    self.overdue.insert(task.id.clone(), now);
                    reminders.push(Reminder {
                        task_id: Some(task.id.clone()),
                        title: task.title.clone(),
                        kind: ReminderKind::Overdue {
                            days_overdue: (now - due).num_days(),
                        },
                    });
                }
            }
        }
        reminders
    }

    fn daily_summary(
        &mut self,
        open: &[&Task],
        prefs: &NotificationSettings,
        now: Timestamp,
    ) -> Option<Reminder> {
        let today = now.date_naive();
        if self.summary_shown == Some(today) {
            return None;
        }
        let time = parse_hhmm(&prefs.daily_summary_time)?;
        let target = at_time_on(today, time, *now.offset())?;
        if (now - target).num_seconds().abs() >= SUMMARY_WINDOW_SECS {
            return None;
        }

        let due_today = open.iter().filter(|t| t.due_date == Some(today)).count();
        if due_today == 0 {
            return None;
        }
        self.summary_shown = Some(today);
        Some(Reminder {
            task_id: None,
            title: "Daily Summary".to_string(),
            kind: ReminderKind::DailySummary { due_today },
        })
    }

    // completed or deleted tasks start over if they come back
    fn forget_missing(&mut self, open: &[&Task]) {
        let ids: HashSet<&str> = open.iter().map(|t| t.id.as_str()).collect();
        self.due_soon.retain(|id| ids.contains(id.as_str()));
        self.overdue.retain(|id, _| ids.contains(id.as_str()));
    }
}

fn load_inputs(tracker: &Mutex<Tracker>) -> TrackerResult<(Vec<Task>, NotificationSettings)> {
    let tracker = tracker.lock().unwrap_or_else(PoisonError::into_inner);
    let settings = tracker.settings()?;
    let mut prefs = settings.notification_settings;
    prefs.enabled &= settings.notifications_enabled;
    Ok((tracker.tasks(None)?, prefs))
}

/// Run the scan every `every` until `shutdown` flips to `true` or its sender is dropped.
pub fn spawn(
    tracker: Arc<Mutex<Tracker>>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reminders = ReminderTracker::new();
        let mut ticker = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match load_inputs(&tracker) {
                        Ok((tasks, prefs)) => {
                            for reminder in reminders.scan(&tasks, &prefs, codec::now()) {
                                info!(task_id = ?reminder.task_id, "{}", reminder.message());
                            }
                        }
                        Err(e) => warn!(error = %e, "reminder scan failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("reminder scan stopped");
    })
}
