use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::codec::{self, Record, Timestamp};
use crate::error::ValidationError;

pub const DEFAULT_PROJECT_COLOR: &str = "#E07B53";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    Paused,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Blocked,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Excellent,
    Good,
    Neutral,
    Tired,
    Stressed,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

fn default_color() -> String {
    DEFAULT_PROJECT_COLOR.to_string()
}

/// "#RRGGBB"
pub fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

// Parse a "HH:MM" string
pub fn parse_hhmm(hhmm: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(hhmm.trim(), "%H:%M").ok()
}

fn require_text(field: &'static str, value: &str, message: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, message));
    }
    Ok(())
}

fn require_hours(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(h) if !h.is_finite() || h < 0.0 => Err(ValidationError::new(
            field,
            "Hours must be a non-negative number",
        )),
        _ => Ok(()),
    }
}

// -----------------------------
// Project
// -----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "codec::date_opt")]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, with = "codec::timestamp_opt")]
    pub completed_at: Option<Timestamp>,
}

impl Milestone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: codec::new_id(),
            name: name.into(),
            description: String::new(),
            target_date: None,
            completed: false,
            completed_at: None,
        }
    }

    pub fn set_completed(&mut self, completed: bool, now: Timestamp) {
        self.completed = completed;
        self.completed_at = completed.then_some(now);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "codec::now", with = "codec::timestamp")]
    pub created_at: Timestamp,
    #[serde(default = "codec::now", with = "codec::timestamp")]
    pub updated_at: Timestamp,
    #[serde(default, with = "codec::date_opt")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "codec::date_opt")]
    pub target_date: Option<NaiveDate>,
    #[serde(default, with = "codec::date_opt")]
    pub completion_date: Option<NaiveDate>,
    // derived from milestones, rewritten on every save
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub team_members: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Project {
    pub fn new(name: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: codec::new_id(),
            name: name.into(),
            description: String::new(),
            status: ProjectStatus::default(),
            priority: Priority::default(),
            color: default_color(),
            created_at: now,
            updated_at: now,
            start_date: None,
            target_date: None,
            completion_date: None,
            progress_percentage: 0.0,
            repository_url: None,
            tech_stack: Vec::new(),
            team_members: Vec::new(),
            milestones: Vec::new(),
            notes: String::new(),
            tags: Vec::new(),
        }
    }

    /// Completed milestones over total, as a percentage (0 without milestones).
    pub fn progress(&self) -> f64 {
        if self.milestones.is_empty() {
            return 0.0;
        }
        let done = self.milestones.iter().filter(|m| m.completed).count();
        done as f64 / self.milestones.len() as f64 * 100.0
    }

    pub fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
        self.progress_percentage = self.progress();
    }

    pub fn apply(&mut self, patch: ProjectPatch, now: Timestamp) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(target_date) = patch.target_date {
            self.target_date = target_date;
        }
        if let Some(completion_date) = patch.completion_date {
            self.completion_date = completion_date;
        }
        if let Some(repository_url) = patch.repository_url {
            self.repository_url = repository_url;
        }
        if let Some(tech_stack) = patch.tech_stack {
            self.tech_stack = tech_stack;
        }
        if let Some(team_members) = patch.team_members {
            self.team_members = team_members;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        self.touch(now);
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, "Project name is required")?;
        if !is_hex_color(&self.color) {
            return Err(ValidationError::new(
                "color",
                format!("Invalid color '{}', expected #RRGGBB", self.color),
            ));
        }
        for milestone in &self.milestones {
            require_text("milestones.name", &milestone.name, "Milestone name is required")?;
        }
        Ok(())
    }
}

impl Record for Project {
    const KIND: &'static str = "Project";

    fn id(&self) -> &str {
        &self.id
    }

    fn normalize(&mut self) {
        self.progress_percentage = self.progress();
    }
}

/// Mutable project fields. `Option<Option<_>>` fields distinguish "leave" from "clear".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "codec::double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "codec::double_option")]
    pub target_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "codec::double_option")]
    pub completion_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "codec::double_option")]
    pub repository_url: Option<Option<String>>,
    pub tech_stack: Option<Vec<String>>,
    pub team_members: Option<Vec<String>>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MilestoneInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

// -----------------------------
// Task
// -----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: codec::new_id(),
            text: text.into(),
            completed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    // weak reference, never validated against projects.json
    #[serde(default)]
    pub project_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "codec::now", with = "codec::timestamp")]
    pub created_at: Timestamp,
    #[serde(default = "codec::now", with = "codec::timestamp")]
    pub updated_at: Timestamp,
    #[serde(default, with = "codec::date_opt")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, with = "codec::timestamp_opt")]
    pub completed_at: Option<Timestamp>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub actual_hours: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub blocked_reason: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub timer_running: bool,
    #[serde(default, with = "codec::timestamp_opt")]
    pub timer_start_time: Option<Timestamp>,
    #[serde(default)]
    pub timer_elapsed_seconds: u64,
}

impl Task {
    pub fn new(title: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: codec::new_id(),
            project_id: None,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: Priority::default(),
            created_at: now,
            updated_at: now,
            due_date: None,
            completed_at: None,
            estimated_hours: None,
            actual_hours: None,
            tags: Vec::new(),
            checklist: Vec::new(),
            blocked_reason: None,
            dependencies: Vec::new(),
            timer_running: false,
            timer_start_time: None,
            timer_elapsed_seconds: 0,
        }
    }

    /// Change status, keeping `completed_at` set exactly while completed.
    pub fn set_status(&mut self, status: TaskStatus, now: Timestamp) {
        self.status = status;
        if status == TaskStatus::Completed {
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }
        self.updated_at = now;
    }

    pub fn apply(&mut self, patch: TaskPatch, now: Timestamp) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(estimated_hours) = patch.estimated_hours {
            self.estimated_hours = estimated_hours;
        }
        if let Some(actual_hours) = patch.actual_hours {
            self.actual_hours = actual_hours;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(blocked_reason) = patch.blocked_reason {
            self.blocked_reason = blocked_reason;
        }
        if let Some(dependencies) = patch.dependencies {
            let mut unique: Vec<String> = Vec::with_capacity(dependencies.len());
            for id in dependencies {
                if !unique.contains(&id) {
                    unique.push(id);
                }
            }
            self.dependencies = unique;
        }
        match patch.status {
            Some(status) => self.set_status(status, now),
            None => self.updated_at = now,
        }
    }

    /// (completed, total)
    pub fn checklist_progress(&self) -> (usize, usize) {
        let done = self.checklist.iter().filter(|item| item.completed).count();
        (done, self.checklist.len())
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Completed && self.due_date.is_some_and(|due| due < today)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title, "Task title is required")?;
        if self.status == TaskStatus::Blocked
            && self
                .blocked_reason
                .as_deref()
                .is_none_or(|reason| reason.trim().is_empty())
        {
            return Err(ValidationError::new(
                "blocked_reason",
                "Blocked reason is required when status is 'blocked'",
            ));
        }
        require_hours("estimated_hours", self.estimated_hours)?;
        require_hours("actual_hours", self.actual_hours)?;
        for item in &self.checklist {
            require_text("checklist.text", &item.text, "Checklist item text is required")?;
        }
        Ok(())
    }
}

impl Record for Task {
    const KIND: &'static str = "Task";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Mutable task fields; `status` goes through [`Task::set_status`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "codec::double_option")]
    pub project_id: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "codec::double_option")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "codec::double_option")]
    pub estimated_hours: Option<Option<f64>>,
    #[serde(default, deserialize_with = "codec::double_option")]
    pub actual_hours: Option<Option<f64>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "codec::double_option")]
    pub blocked_reason: Option<Option<String>>,
    pub dependencies: Option<Vec<String>>,
}

// -----------------------------
// Daily plan
// -----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeBlock {
    pub id: String,
    pub start_time: String, // "HH:MM"
    pub end_time: String,   // "HH:MM"
    pub activity: String,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeBlockInput {
    pub start_time: String,
    pub end_time: String,
    pub activity: String,
    #[serde(default)]
    pub task_id: Option<String>,
}

impl From<TimeBlockInput> for TimeBlock {
    fn from(input: TimeBlockInput) -> Self {
        Self {
            id: codec::new_id(),
            start_time: input.start_time,
            end_time: input.end_time,
            activity: input.activity,
            task_id: input.task_id,
            completed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyPlan {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub focus_goal: String,
    // task ids, references only
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub time_blocks: Vec<TimeBlock>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub completed: bool,
}

impl DailyPlan {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: codec::new_id(),
            date,
            focus_goal: String::new(),
            tasks: Vec::new(),
            time_blocks: Vec::new(),
            notes: String::new(),
            mood: None,
            completed: false,
        }
    }

    pub fn add_task(&mut self, task_id: &str) {
        if !self.tasks.iter().any(|id| id == task_id) {
            self.tasks.push(task_id.to_string());
        }
    }

    pub fn remove_task(&mut self, task_id: &str) {
        self.tasks.retain(|id| id != task_id);
    }

    /// (completed, total)
    pub fn time_blocks_progress(&self) -> (usize, usize) {
        let done = self.time_blocks.iter().filter(|b| b.completed).count();
        (done, self.time_blocks.len())
    }

    pub fn apply(&mut self, patch: DailyPlanPatch) {
        if let Some(focus_goal) = patch.focus_goal {
            self.focus_goal = focus_goal;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(mood) = patch.mood {
            self.mood = mood;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(tasks) = patch.tasks {
            self.tasks.clear();
            for id in &tasks {
                self.add_task(id);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for block in &self.time_blocks {
            if parse_hhmm(&block.start_time).is_none() || parse_hhmm(&block.end_time).is_none() {
                return Err(ValidationError::new(
                    "time_blocks",
                    format!("Invalid time format in time block: {}", block.activity),
                ));
            }
            require_text("time_blocks.activity", &block.activity, "Activity is required")?;
        }
        Ok(())
    }
}

impl Record for DailyPlan {
    const KIND: &'static str = "Daily plan";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyPlanPatch {
    pub focus_goal: Option<String>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "codec::double_option")]
    pub mood: Option<Option<Mood>>,
    pub completed: Option<bool>,
    pub tasks: Option<Vec<String>>,
}

// -----------------------------
// Settings (singleton document)
// -----------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub task_due_soon: bool,
    pub task_overdue: bool,
    pub daily_summary: bool,
    pub daily_summary_time: String, // "HH:MM"
    pub notification_duration: u64, // milliseconds
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            task_due_soon: true,
            task_overdue: true,
            daily_summary: true,
            daily_summary_time: "09:00".to_string(),
            notification_duration: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub window_size: WindowSize,
    pub window_position: WindowPosition,
    pub default_project_color: String,
    pub work_hours_start: String,
    pub work_hours_end: String,
    pub notifications_enabled: bool,
    pub auto_backup: bool,
    pub backup_frequency_days: u32,
    pub show_completed_tasks: bool,
    pub task_sort_order: String,
    pub first_launch: bool,
    #[serde(with = "codec::timestamp_opt")]
    pub last_backup: Option<Timestamp>,
    pub notification_settings: NotificationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            window_size: WindowSize {
                width: 1280,
                height: 800,
            },
            window_position: WindowPosition { x: 100, y: 100 },
            default_project_color: default_color(),
            work_hours_start: "09:00".to_string(),
            work_hours_end: "17:00".to_string(),
            notifications_enabled: true,
            auto_backup: true,
            backup_frequency_days: 1,
            show_completed_tasks: true,
            task_sort_order: "priority".to_string(),
            first_launch: true,
            last_backup: None,
            notification_settings: NotificationSettings::default(),
        }
    }
}

impl Settings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(window_size) = patch.window_size {
            self.window_size = window_size;
        }
        if let Some(window_position) = patch.window_position {
            self.window_position = window_position;
        }
        if let Some(color) = patch.default_project_color {
            self.default_project_color = color;
        }
        if let Some(start) = patch.work_hours_start {
            self.work_hours_start = start;
        }
        if let Some(end) = patch.work_hours_end {
            self.work_hours_end = end;
        }
        if let Some(enabled) = patch.notifications_enabled {
            self.notifications_enabled = enabled;
        }
        if let Some(auto_backup) = patch.auto_backup {
            self.auto_backup = auto_backup;
        }
        if let Some(days) = patch.backup_frequency_days {
            self.backup_frequency_days = days;
        }
        if let Some(show) = patch.show_completed_tasks {
            self.show_completed_tasks = show;
        }
        if let Some(order) = patch.task_sort_order {
            self.task_sort_order = order;
        }
        if let Some(first_launch) = patch.first_launch {
            self.first_launch = first_launch;
        }
        if let Some(notifications) = patch.notification_settings {
            self.notification_settings = notifications;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_hex_color(&self.default_project_color) {
            return Err(ValidationError::new(
                "default_project_color",
                format!("Invalid color '{}'", self.default_project_color),
            ));
        }
        let start = parse_hhmm(&self.work_hours_start)
            .ok_or_else(|| ValidationError::new("work_hours_start", "Expected HH:MM"))?;
        let end = parse_hhmm(&self.work_hours_end)
            .ok_or_else(|| ValidationError::new("work_hours_end", "Expected HH:MM"))?;
        if end <= start {
            return Err(ValidationError::new(
                "work_hours_end",
                "Work hours must end after they start",
            ));
        }
        if parse_hhmm(&self.notification_settings.daily_summary_time).is_none() {
            return Err(ValidationError::new(
                "notification_settings.daily_summary_time",
                "Expected HH:MM",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub window_size: Option<WindowSize>,
    pub window_position: Option<WindowPosition>,
    pub default_project_color: Option<String>,
    pub work_hours_start: Option<String>,
    pub work_hours_end: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub auto_backup: Option<bool>,
    pub backup_frequency_days: Option<u32>,
    pub show_completed_tasks: Option<bool>,
    pub task_sort_order: Option<String>,
    pub first_launch: Option<bool>,
    pub notification_settings: Option<NotificationSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> Timestamp {
        codec::parse_timestamp(raw).unwrap()
    }

    #[test]
    fn progress_counts_completed_milestones() {
        let mut project = Project::new("Alpha", ts("2024-01-01T00:00:00+00:00"));
        assert_eq!(project.progress(), 0.0);

        project.milestones = vec![Milestone::new("a"), Milestone::new("b"), Milestone::new("c"), Milestone::new("d")];
        project.milestones[0].set_completed(true, ts("2024-01-02T00:00:00+00:00"));
        assert_eq!(project.progress(), 25.0);

        project.normalize();
        assert_eq!(project.progress_percentage, 25.0);
    }

    #[test]
    fn project_patch_touches_updated_at_and_clears_nullable_fields() {
        let created = ts("2024-01-01T00:00:00+00:00");
        let later = ts("2024-01-05T00:00:00+00:00");
        let mut project = Project::new("Alpha", created);
        project.repository_url = Some("https://example.com/alpha".to_string());

        project.apply(
            ProjectPatch {
                status: Some(ProjectStatus::Active),
                repository_url: Some(None),
                ..Default::default()
            },
            later,
        );

        assert_eq!(project.status, ProjectStatus::Active);
        assert_eq!(project.repository_url, None);
        assert_eq!(project.created_at, created);
        assert_eq!(project.updated_at, later);
    }

    #[test]
    fn project_requires_name_and_hex_color() {
        let now = codec::now();
        let mut project = Project::new("   ", now);
        assert_eq!(project.validate().unwrap_err().field, "name");

        project.name = "Alpha".to_string();
        project.color = "orange".to_string();
        assert_eq!(project.validate().unwrap_err().field, "color");

        project.color = "#00bcd4".to_string();
        assert!(project.validate().is_ok());
    }

    #[test]
    fn completed_at_follows_status() {
        let t0 = ts("2024-01-01T00:00:00+00:00");
        let t1 = ts("2024-01-02T00:00:00+00:00");
        let mut task = Task::new("Design", t0);

        task.set_status(TaskStatus::Completed, t0);
        assert_eq!(task.completed_at, Some(t0));

        // re-entering completed keeps the original completion time
        task.set_status(TaskStatus::Completed, t1);
        assert_eq!(task.completed_at, Some(t0));

        task.set_status(TaskStatus::InProgress, t1);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn blocked_task_needs_a_reason() {
        let mut task = Task::new("Build", codec::now());
        task.status = TaskStatus::Blocked;
        assert_eq!(task.validate().unwrap_err().field, "blocked_reason");

        task.blocked_reason = Some("  ".to_string());
        assert!(task.validate().is_err());

        task.blocked_reason = Some("waiting on API keys".to_string());
        assert!(task.validate().is_ok());
    }

    #[test]
    fn negative_hours_are_rejected() {
        let mut task = Task::new("Build", codec::now());
        task.actual_hours = Some(-1.0);
        assert_eq!(task.validate().unwrap_err().field, "actual_hours");
    }

    #[test]
    fn task_patch_dedupes_dependencies() {
        let mut task = Task::new("Build", codec::now());
        task.apply(
            TaskPatch {
                dependencies: Some(vec!["a".into(), "b".into(), "a".into()]),
                ..Default::default()
            },
            codec::now(),
        );
        assert_eq!(task.dependencies, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn task_decodes_with_missing_optional_fields() {
        let json = r#"{"id":"t1","title":"Legacy","created_at":"2024-01-01T10:00:00.5","due_date":"2024-02-01"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.dependencies.is_empty());
        assert!(!task.timer_running);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn unknown_status_fails_to_decode() {
        let json = r#"{"id":"t1","title":"Bad","status":"done"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn overdue_ignores_completed_tasks() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut task = Task::new("Ship", codec::now());
        task.due_date = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert!(task.is_overdue(today));
        task.set_status(TaskStatus::Completed, codec::now());
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn plan_tasks_are_unique_references() {
        let mut plan = DailyPlan::new(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        plan.add_task("t1");
        plan.add_task("t1");
        plan.add_task("t2");
        assert_eq!(plan.tasks.len(), 2);
        plan.remove_task("t1");
        assert_eq!(plan.tasks, vec!["t2".to_string()]);
    }

    #[test]
    fn time_blocks_require_hhmm() {
        let mut plan = DailyPlan::new(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        plan.time_blocks.push(TimeBlock::from(TimeBlockInput {
            start_time: "9am".to_string(),
            end_time: "10:00".to_string(),
            activity: "Standup".to_string(),
            task_id: None,
        }));
        assert_eq!(plan.validate().unwrap_err().field, "time_blocks");

        plan.time_blocks[0].start_time = "09:00".to_string();
        assert!(plan.validate().is_ok());
        assert_eq!(plan.time_blocks_progress(), (0, 1));
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"theme":"dark","first_launch":false}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert!(!settings.first_launch);
        assert_eq!(settings.work_hours_start, "09:00");
        assert_eq!(settings.notification_settings, NotificationSettings::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn settings_reject_inverted_work_hours() {
        let mut settings = Settings::default();
        settings.apply(SettingsPatch {
            work_hours_start: Some("18:00".to_string()),
            ..Default::default()
        });
        assert_eq!(settings.validate().unwrap_err().field, "work_hours_end");
    }
}
