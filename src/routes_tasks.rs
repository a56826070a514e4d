// --------------------------------------------------
// Handles API endpoints related to task CRUD operations.
//
// Responsibilities:
// - Create / read / update / delete tasks
// - Status changes (dependency gate applies here)
// - Checklist items and the work timer
// --------------------------------------------------

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::app::{ApiError, AppState};
use crate::models::{Task, TaskPatch, TaskStatus};

#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    pub project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: TaskStatus,
    pub blocked_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChecklistInput {
    pub text: String,
}

// -----------------------------
// GET /api/tasks
// Optional ?project_id= narrows to one project
// -----------------------------
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(q): Query<TasksQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.with_tracker(|t| t.tasks(q.project_id.as_deref()))?;
    Ok(Json(tasks))
}

// -----------------------------
// POST /api/tasks
// -----------------------------
pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<TaskPatch>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state.with_tracker(|t| t.create_task(input))?;
    Ok((StatusCode::CREATED, Json(task)))
}

// -----------------------------
// GET /api/tasks/:id
// -----------------------------
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = state.with_tracker(|t| t.task(&id))?;
    Ok(Json(task))
}

// -----------------------------
// PUT /api/tasks/:id
// Partial update
// -----------------------------
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let task = state.with_tracker(|t| t.update_task(&id, patch))?;
    Ok(Json(task))
}

// -----------------------------
// DELETE /api/tasks/:id
// -----------------------------
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.with_tracker(|t| t.delete_task(&id))?;
    Ok(StatusCode::NO_CONTENT)
}

// -----------------------------
// POST /api/tasks/:id/status
// 409 when completing a task whose dependencies are open
// -----------------------------
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<StatusInput>,
) -> Result<Json<Task>, ApiError> {
    let task = state.with_tracker(|t| t.set_task_status(&id, input.status, input.blocked_reason))?;
    Ok(Json(task))
}

// -----------------------------
// POST /api/tasks/:id/checklist
// -----------------------------
pub async fn add_checklist_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ChecklistInput>,
) -> Result<Json<Task>, ApiError> {
    let task = state.with_tracker(|t| t.add_checklist_item(&id, input.text))?;
    Ok(Json(task))
}

// -----------------------------
// POST /api/tasks/:id/checklist/:item/toggle
// -----------------------------
pub async fn toggle_checklist_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<Task>, ApiError> {
    let task = state.with_tracker(|t| t.toggle_checklist_item(&id, &item_id))?;
    Ok(Json(task))
}

// -----------------------------
// DELETE /api/tasks/:id/checklist/:item
// -----------------------------
pub async fn remove_checklist_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<Task>, ApiError> {
    let task = state.with_tracker(|t| t.remove_checklist_item(&id, &item_id))?;
    Ok(Json(task))
}

// -----------------------------
// POST /api/tasks/:id/timer/{start,stop,commit}
// -----------------------------
pub async fn start_timer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = state.with_tracker(|t| t.start_timer(&id))?;
    Ok(Json(task))
}

pub async fn stop_timer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = state.with_tracker(|t| t.stop_timer(&id))?;
    Ok(Json(task))
}

pub async fn commit_timer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = state.with_tracker(|t| t.commit_timer(&id))?;
    Ok(Json(task))
}
