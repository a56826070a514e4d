//! Entity operations on top of [`Storage`].
//!
//! Each operation loads what it needs, applies the change in memory, checks
//! field rules and dependency rules, and only then writes. A rejected change
//! leaves every file as it was.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::codec::{self, Record};
use crate::error::{TrackerError, TrackerResult};
use crate::graph;
use crate::models::{
    ChecklistItem, DailyPlan, DailyPlanPatch, Milestone, MilestoneInput, Project, ProjectPatch,
    Settings, SettingsPatch, Task, TaskPatch, TaskStatus, TimeBlock, TimeBlockInput,
};
use crate::store::Storage;

pub struct Tracker {
    storage: Storage,
}

fn round_hours(seconds: u64) -> f64 {
    (seconds as f64 / 3600.0 * 100.0).round() / 100.0
}

impl Tracker {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    // -----------------------------
    // Projects
    // -----------------------------

    pub fn projects(&self) -> TrackerResult<Vec<Project>> {
        Ok(self.storage.projects.list()?)
    }

    pub fn project(&self, id: &str) -> TrackerResult<Project> {
        self.storage
            .projects
            .get(id)?
            .ok_or_else(|| TrackerError::not_found(Project::KIND, id))
    }

    /// New project; the colour falls back to the configured default.
    pub fn create_project(&self, patch: ProjectPatch) -> TrackerResult<Project> {
        let now = codec::now();
        let mut project = Project::new(String::new(), now);
        project.color = self.storage.settings.get()?.default_project_color;
        project.apply(patch, now);
        project.validate()?;
        self.storage.projects.save(&project)?;
        info!(id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    pub fn update_project(&self, id: &str, patch: ProjectPatch) -> TrackerResult<Project> {
        let mut project = self.project(id)?;
        project.apply(patch, codec::now());
        self.save_project(project)
    }

    /// Tasks that referenced the project keep their (now dangling) `project_id`.
    pub fn delete_project(&self, id: &str) -> TrackerResult<()> {
        if !self.storage.projects.delete(id)? {
            return Err(TrackerError::not_found(Project::KIND, id));
        }
        info!(id, "project deleted");
        Ok(())
    }

    pub fn add_milestone(&self, project_id: &str, input: MilestoneInput) -> TrackerResult<Project> {
        let mut project = self.project(project_id)?;
        let mut milestone = Milestone::new(input.name);
        milestone.description = input.description;
        milestone.target_date = input.target_date;
        project.milestones.push(milestone);
        project.touch(codec::now());
        self.save_project(project)
    }

    pub fn toggle_milestone(&self, project_id: &str, milestone_id: &str) -> TrackerResult<Project> {
        let now = codec::now();
        let mut project = self.project(project_id)?;
        let milestone = project
            .milestones
            .iter_mut()
            .find(|m| m.id == milestone_id)
            .ok_or_else(|| TrackerError::not_found("Milestone", milestone_id))?;
        let completed = !milestone.completed;
        milestone.set_completed(completed, now);
        project.touch(now);
        self.save_project(project)
    }

    pub fn remove_milestone(&self, project_id: &str, milestone_id: &str) -> TrackerResult<Project> {
        let mut project = self.project(project_id)?;
        let before = project.milestones.len();
        project.milestones.retain(|m| m.id != milestone_id);
        if project.milestones.len() == before {
            return Err(TrackerError::not_found("Milestone", milestone_id));
        }
        project.touch(codec::now());
        self.save_project(project)
    }

    fn save_project(&self, project: Project) -> TrackerResult<Project> {
        project.validate()?;
        self.storage.projects.save(&project)?;
        Ok(project)
    }

    // -----------------------------
    // Tasks
    // -----------------------------

    /// All tasks, or only those of one project.
    pub fn tasks(&self, project_id: Option<&str>) -> TrackerResult<Vec<Task>> {
        let tasks = match project_id {
            Some(pid) => self
                .storage
                .tasks
                .find(|t| t.project_id.as_deref() == Some(pid))?,
            None => self.storage.tasks.list()?,
        };
        Ok(tasks)
    }

    pub fn task(&self, id: &str) -> TrackerResult<Task> {
        self.storage
            .tasks
            .get(id)?
            .ok_or_else(|| TrackerError::not_found(Task::KIND, id))
    }

    pub fn create_task(&self, patch: TaskPatch) -> TrackerResult<Task> {
        let now = codec::now();
        let mut task = Task::new(String::new(), now);
        task.apply(patch, now);
        let task = self.commit_task(None, task)?;
        info!(id = %task.id, title = %task.title, "task created");
        Ok(task)
    }

    pub fn update_task(&self, id: &str, patch: TaskPatch) -> TrackerResult<Task> {
        let previous = self.task(id)?;
        let mut task = previous.clone();
        task.apply(patch, codec::now());
        self.commit_task(Some(&previous), task)
    }

    /// Status change; `blocked_reason` replaces the stored reason when given.
    pub fn set_task_status(
        &self,
        id: &str,
        status: TaskStatus,
        blocked_reason: Option<String>,
    ) -> TrackerResult<Task> {
        let previous = self.task(id)?;
        let mut task = previous.clone();
        if blocked_reason.is_some() {
            task.blocked_reason = blocked_reason;
        }
        task.set_status(status, codec::now());
        self.commit_task(Some(&previous), task)
    }

    /// Other tasks that depended on this one keep the id as a dangling reference.
    pub fn delete_task(&self, id: &str) -> TrackerResult<()> {
        if !self.storage.tasks.delete(id)? {
            return Err(TrackerError::not_found(Task::KIND, id));
        }
        info!(id, "task deleted");
        Ok(())
    }

    pub fn add_checklist_item(&self, task_id: &str, text: impl Into<String>) -> TrackerResult<Task> {
        self.edit_task(task_id, |task| {
            task.checklist.push(ChecklistItem::new(text));
            Ok(())
        })
    }

    pub fn toggle_checklist_item(&self, task_id: &str, item_id: &str) -> TrackerResult<Task> {
        self.edit_task(task_id, |task| {
            let item = task
                .checklist
                .iter_mut()
                .find(|item| item.id == item_id)
                .ok_or_else(|| TrackerError::not_found("Checklist item", item_id))?;
            item.completed = !item.completed;
            Ok(())
        })
    }

    pub fn remove_checklist_item(&self, task_id: &str, item_id: &str) -> TrackerResult<Task> {
        self.edit_task(task_id, |task| {
            let before = task.checklist.len();
            task.checklist.retain(|item| item.id != item_id);
            if task.checklist.len() == before {
                return Err(TrackerError::not_found("Checklist item", item_id));
            }
            Ok(())
        })
    }

    /// Starting a running timer is a no-op.
    pub fn start_timer(&self, task_id: &str) -> TrackerResult<Task> {
        let now = codec::now();
        self.edit_task(task_id, |task| {
            if !task.timer_running {
                task.timer_running = true;
                task.timer_start_time = Some(now);
            }
            Ok(())
        })
    }

    /// Adds the running interval to `timer_elapsed_seconds`.
    pub fn stop_timer(&self, task_id: &str) -> TrackerResult<Task> {
        let now = codec::now();
        self.edit_task(task_id, |task| {
            stop_running_timer(task, now);
            Ok(())
        })
    }

    /// Moves the accumulated timer seconds into `actual_hours` (2 decimals).
    pub fn commit_timer(&self, task_id: &str) -> TrackerResult<Task> {
        let now = codec::now();
        self.edit_task(task_id, |task| {
            stop_running_timer(task, now);
            if task.timer_elapsed_seconds > 0 {
                let logged = round_hours(task.timer_elapsed_seconds);
                let total = task.actual_hours.unwrap_or(0.0) + logged;
                task.actual_hours = Some((total * 100.0).round() / 100.0);
                task.timer_elapsed_seconds = 0;
            }
            Ok(())
        })
    }

    fn edit_task(
        &self,
        task_id: &str,
        edit: impl FnOnce(&mut Task) -> TrackerResult<()>,
    ) -> TrackerResult<Task> {
        let previous = self.task(task_id)?;
        let mut task = previous.clone();
        edit(&mut task)?;
        task.updated_at = codec::now();
        self.commit_task(Some(&previous), task)
    }

    // Field rules, then cycle check on newly added dependencies, then the
    // completion gate when the task is entering `completed`.
    fn commit_task(&self, previous: Option<&Task>, task: Task) -> TrackerResult<Task> {
        task.validate()?;

        let all = self.storage.tasks.list()?;
        let added: Vec<String> = task
            .dependencies
            .iter()
            .filter(|id| previous.is_none_or(|p| !p.dependencies.contains(*id)))
            .cloned()
            .collect();
        let entering_completed = task.status == TaskStatus::Completed
            && previous.is_none_or(|p| p.status != TaskStatus::Completed);

        let checked = graph::would_create_cycle(&task.id, &added, &all).and_then(|()| {
            if entering_completed {
                graph::check_completion(&task, &all)
            } else {
                Ok(())
            }
        });
        if let Err(err) = checked {
            warn!(id = %task.id, error = %err, "task change rejected");
            return Err(err.into());
        }

        self.storage.tasks.save(&task)?;
        Ok(task)
    }

    // -----------------------------
    // Daily plans
    // -----------------------------

    /// First stored plan for `date`, if any.
    pub fn plan_for(&self, date: NaiveDate) -> TrackerResult<Option<DailyPlan>> {
        Ok(self
            .storage
            .daily_plans
            .list()?
            .into_iter()
            .find(|p| p.date == date))
    }

    /// Plans dated within `[start, end]`, ordered by date.
    pub fn plans_between(&self, start: NaiveDate, end: NaiveDate) -> TrackerResult<Vec<DailyPlan>> {
        let mut plans = self
            .storage
            .daily_plans
            .find(|p| p.date >= start && p.date <= end)?;
        plans.sort_by_key(|p| p.date);
        Ok(plans)
    }

    pub fn upsert_plan(&self, date: NaiveDate, patch: DailyPlanPatch) -> TrackerResult<DailyPlan> {
        self.edit_plan(date, |plan| {
            plan.apply(patch);
            Ok(())
        })
    }

    pub fn add_plan_task(&self, date: NaiveDate, task_id: &str) -> TrackerResult<DailyPlan> {
        self.edit_plan(date, |plan| {
            plan.add_task(task_id);
            Ok(())
        })
    }

    pub fn remove_plan_task(&self, date: NaiveDate, task_id: &str) -> TrackerResult<DailyPlan> {
        self.edit_plan(date, |plan| {
            plan.remove_task(task_id);
            Ok(())
        })
    }

    pub fn add_time_block(&self, date: NaiveDate, input: TimeBlockInput) -> TrackerResult<DailyPlan> {
        self.edit_plan(date, |plan| {
            plan.time_blocks.push(TimeBlock::from(input));
            Ok(())
        })
    }

    pub fn toggle_time_block(&self, date: NaiveDate, block_id: &str) -> TrackerResult<DailyPlan> {
        self.edit_plan(date, |plan| {
            let block = plan
                .time_blocks
                .iter_mut()
                .find(|b| b.id == block_id)
                .ok_or_else(|| TrackerError::not_found("Time block", block_id))?;
            block.completed = !block.completed;
            Ok(())
        })
    }

    pub fn remove_time_block(&self, date: NaiveDate, block_id: &str) -> TrackerResult<DailyPlan> {
        self.edit_plan(date, |plan| {
            let before = plan.time_blocks.len();
            plan.time_blocks.retain(|b| b.id != block_id);
            if plan.time_blocks.len() == before {
                return Err(TrackerError::not_found("Time block", block_id));
            }
            Ok(())
        })
    }

    // plans are created on first edit
    fn edit_plan(
        &self,
        date: NaiveDate,
        edit: impl FnOnce(&mut DailyPlan) -> TrackerResult<()>,
    ) -> TrackerResult<DailyPlan> {
        let mut plan = self.plan_for(date)?.unwrap_or_else(|| DailyPlan::new(date));
        edit(&mut plan)?;
        plan.validate()?;
        self.storage.daily_plans.save(&plan)?;
        Ok(plan)
    }

    // -----------------------------
    // Settings & maintenance
    // -----------------------------

    pub fn settings(&self) -> TrackerResult<Settings> {
        Ok(self.storage.settings.get()?)
    }

    pub fn update_settings(&self, patch: SettingsPatch) -> TrackerResult<Settings> {
        let mut settings = self.storage.settings.get()?;
        settings.apply(patch);
        settings.validate()?;
        self.storage.settings.save(&settings)?;
        Ok(settings)
    }

    pub fn complete_first_launch(&self) -> TrackerResult<Settings> {
        self.update_settings(SettingsPatch {
            first_launch: Some(false),
            ..Default::default()
        })
    }

    pub fn backup_now(&self) -> TrackerResult<Vec<PathBuf>> {
        Ok(self.storage.backup_all()?)
    }

    pub fn clear_all_data(&self) -> TrackerResult<()> {
        Ok(self.storage.clear_all()?)
    }
}

fn stop_running_timer(task: &mut Task, now: codec::Timestamp) {
    if !task.timer_running {
        return;
    }
    if let Some(start) = task.timer_start_time.take() {
        let elapsed = (now - start).num_seconds().max(0) as u64;
        task.timer_elapsed_seconds += elapsed;
    }
    task.timer_running = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::DEFAULT_RETENTION;
    use crate::config::DataLayout;
    use crate::error::DependencyError;
    use crate::models::{ProjectStatus, Theme};
    use chrono::Duration;
    use std::fs;
    use tempfile::TempDir;

    fn tracker(tmp: &TempDir) -> Tracker {
        Tracker::new(Storage::open(DataLayout::new(tmp.path()), DEFAULT_RETENTION).unwrap())
    }

    fn named(title: &str) -> TaskPatch {
        TaskPatch {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn project_defaults_come_from_settings() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        tracker
            .update_settings(SettingsPatch {
                default_project_color: Some("#336699".to_string()),
                ..Default::default()
            })
            .unwrap();

        let project = tracker
            .create_project(ProjectPatch {
                name: Some("Alpha".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(project.status, ProjectStatus::Planning);
        assert_eq!(project.color, "#336699");
        assert_eq!(tracker.project(&project.id).unwrap(), project);
    }

    #[test]
    fn project_without_name_is_not_written() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        let err = tracker.create_project(ProjectPatch::default()).unwrap_err();
        assert!(matches!(err, TrackerError::Validation(ref v) if v.field == "name"));
        assert!(!tracker.storage().projects.path().exists());
    }

    #[test]
    fn deleting_a_project_orphans_its_tasks() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        let project = tracker
            .create_project(ProjectPatch {
                name: Some("Alpha".to_string()),
                ..Default::default()
            })
            .unwrap();
        let task = tracker
            .create_task(TaskPatch {
                project_id: Some(Some(project.id.clone())),
                ..named("Design")
            })
            .unwrap();

        tracker.delete_project(&project.id).unwrap();

        assert!(matches!(
            tracker.project(&project.id),
            Err(TrackerError::NotFound { .. })
        ));
        assert_eq!(tracker.task(&task.id).unwrap().project_id, Some(project.id.clone()));
        assert!(matches!(
            tracker.delete_project(&project.id),
            Err(TrackerError::NotFound { .. })
        ));
    }

    #[test]
    fn milestones_drive_project_progress() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        let project = tracker
            .create_project(ProjectPatch {
                name: Some("Alpha".to_string()),
                ..Default::default()
            })
            .unwrap();
        let project = tracker
            .add_milestone(&project.id, MilestoneInput { name: "MVP".into(), ..Default::default() })
            .unwrap();
        let project = tracker
            .add_milestone(&project.id, MilestoneInput { name: "Beta".into(), ..Default::default() })
            .unwrap();

        let mvp = project.milestones[0].id.clone();
        let project = tracker.toggle_milestone(&project.id, &mvp).unwrap();
        assert_eq!(project.progress_percentage, 50.0);
        assert!(project.milestones[0].completed_at.is_some());

        let project = tracker.toggle_milestone(&project.id, &mvp).unwrap();
        assert_eq!(project.progress_percentage, 0.0);
        assert!(project.milestones[0].completed_at.is_none());

        let project = tracker.remove_milestone(&project.id, &mvp).unwrap();
        assert_eq!(project.milestones.len(), 1);
        assert!(tracker.remove_milestone(&project.id, &mvp).is_err());
    }

    #[test]
    fn tasks_filter_by_project() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        tracker
            .create_task(TaskPatch {
                project_id: Some(Some("p1".to_string())),
                ..named("In project")
            })
            .unwrap();
        tracker.create_task(named("Loose")).unwrap();

        assert_eq!(tracker.tasks(None).unwrap().len(), 2);
        let scoped = tracker.tasks(Some("p1")).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].title, "In project");
    }

    #[test]
    fn cyclic_dependency_is_rejected_without_writing() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        let design = tracker.create_task(named("Design")).unwrap();
        let build = tracker
            .create_task(TaskPatch {
                dependencies: Some(vec![design.id.clone()]),
                ..named("Build")
            })
            .unwrap();
        let before = fs::read(tracker.storage().tasks.path()).unwrap();

        let err = tracker
            .update_task(
                &design.id,
                TaskPatch {
                    dependencies: Some(vec![build.id.clone()]),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(
            err,
            TrackerError::Dependency(DependencyError::Cycle { ref dependency }) if dependency == "Build"
        ));
        assert_eq!(fs::read(tracker.storage().tasks.path()).unwrap(), before);
    }

    #[test]
    fn completion_gate_applies_only_when_entering_completed() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        let design = tracker.create_task(named("Design")).unwrap();
        let build = tracker
            .create_task(TaskPatch {
                dependencies: Some(vec![design.id.clone()]),
                ..named("Build")
            })
            .unwrap();

        tracker.set_task_status(&design.id, TaskStatus::Completed, None).unwrap();
        tracker.set_task_status(&build.id, TaskStatus::Completed, None).unwrap();

        // reopening the dependency does not retroactively block edits to Build
        tracker.set_task_status(&design.id, TaskStatus::InProgress, None).unwrap();
        let renamed = tracker
            .update_task(&build.id, named("Build v2"))
            .unwrap();
        assert_eq!(renamed.status, TaskStatus::Completed);
        assert_eq!(renamed.title, "Build v2");
    }

    #[test]
    fn blocked_status_needs_a_reason() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        let task = tracker.create_task(named("Deploy")).unwrap();

        let err = tracker
            .set_task_status(&task.id, TaskStatus::Blocked, None)
            .unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
        assert_eq!(tracker.task(&task.id).unwrap().status, TaskStatus::Todo);

        let blocked = tracker
            .set_task_status(&task.id, TaskStatus::Blocked, Some("waiting on review".into()))
            .unwrap();
        assert_eq!(blocked.blocked_reason.as_deref(), Some("waiting on review"));
    }

    #[test]
    fn checklist_items_toggle_and_remove() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        let task = tracker.create_task(named("Release")).unwrap();

        let task = tracker.add_checklist_item(&task.id, "Tag").unwrap();
        let task = tracker.add_checklist_item(&task.id, "Publish").unwrap();
        let tag = task.checklist[0].id.clone();
        let task = tracker.toggle_checklist_item(&task.id, &tag).unwrap();
        assert_eq!(task.checklist_progress(), (1, 2));

        let task = tracker.remove_checklist_item(&task.id, &tag).unwrap();
        assert_eq!(task.checklist_progress(), (0, 1));
        assert!(matches!(
            tracker.toggle_checklist_item(&task.id, &tag),
            Err(TrackerError::NotFound { .. })
        ));
        assert!(tracker.add_checklist_item(&task.id, "  ").is_err());
    }

    #[test]
    fn timer_accumulates_and_commits_to_actual_hours() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        let task = tracker.create_task(named("Write docs")).unwrap();

        let mut running = tracker.start_timer(&task.id).unwrap();
        assert!(running.timer_running);
        // pretend the timer was started 90 minutes ago
        running.timer_start_time = Some(codec::now() - Duration::minutes(90));
        tracker.storage().tasks.save(&running).unwrap();

        let stopped = tracker.stop_timer(&task.id).unwrap();
        assert!(!stopped.timer_running);
        assert!(stopped.timer_start_time.is_none());
        assert!(stopped.timer_elapsed_seconds >= 5400);

        let committed = tracker.commit_timer(&task.id).unwrap();
        assert_eq!(committed.actual_hours, Some(1.5));
        assert_eq!(committed.timer_elapsed_seconds, 0);
    }

    #[test]
    fn plans_are_created_on_demand_and_keep_unique_task_refs() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        let day = date("2024-03-10");
        assert!(tracker.plan_for(day).unwrap().is_none());

        tracker.add_plan_task(day, "t1").unwrap();
        let plan = tracker.add_plan_task(day, "t1").unwrap();
        assert_eq!(plan.tasks, vec!["t1".to_string()]);

        let plan = tracker
            .upsert_plan(
                day,
                DailyPlanPatch {
                    focus_goal: Some("Ship the beta".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(tracker.storage().daily_plans.list().unwrap().len(), 1);
        assert_eq!(plan.tasks, vec!["t1".to_string()]);
        assert_eq!(plan.focus_goal, "Ship the beta");

        let plan = tracker.remove_plan_task(day, "t1").unwrap();
        assert!(plan.tasks.is_empty());
    }

    #[test]
    fn time_blocks_validate_before_saving() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        let day = date("2024-03-10");

        let bad = tracker.add_time_block(
            day,
            TimeBlockInput {
                start_time: "25:00".to_string(),
                end_time: "26:00".to_string(),
                activity: "Focus".to_string(),
                task_id: None,
            },
        );
        assert!(matches!(bad, Err(TrackerError::Validation(_))));
        assert!(tracker.plan_for(day).unwrap().is_none());

        let plan = tracker
            .add_time_block(
                day,
                TimeBlockInput {
                    start_time: "09:00".to_string(),
                    end_time: "10:30".to_string(),
                    activity: "Focus".to_string(),
                    task_id: None,
                },
            )
            .unwrap();
        let block = plan.time_blocks[0].id.clone();
        let plan = tracker.toggle_time_block(day, &block).unwrap();
        assert_eq!(plan.time_blocks_progress(), (1, 1));
        let plan = tracker.remove_time_block(day, &block).unwrap();
        assert!(plan.time_blocks.is_empty());
    }

    #[test]
    fn plans_between_orders_by_date() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        tracker.add_plan_task(date("2024-03-12"), "a").unwrap();
        tracker.add_plan_task(date("2024-03-10"), "b").unwrap();
        tracker.add_plan_task(date("2024-04-01"), "c").unwrap();

        let dates: Vec<NaiveDate> = tracker
            .plans_between(date("2024-03-01"), date("2024-03-31"))
            .unwrap()
            .into_iter()
            .map(|p| p.date)
            .collect();
        assert_eq!(dates, vec![date("2024-03-10"), date("2024-03-12")]);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        let err = tracker
            .update_settings(SettingsPatch {
                default_project_color: Some("blue".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));

        let settings = tracker
            .update_settings(SettingsPatch {
                theme: Some(Theme::Light),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert!(!tracker.complete_first_launch().unwrap().first_launch);
    }

    #[test]
    fn clear_all_data_empties_collections() {
        let tmp = TempDir::new().unwrap();
        let tracker = tracker(&tmp);
        tracker.create_task(named("Design")).unwrap();
        assert!(!tracker.backup_now().unwrap().is_empty());

        tracker.clear_all_data().unwrap();

        assert!(tracker.tasks(None).unwrap().is_empty());
        assert!(tracker.settings().unwrap().last_backup.is_some());
    }
}
