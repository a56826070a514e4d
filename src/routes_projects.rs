// --------------------------------------------------
// Handles API endpoints for projects and their milestones.
//
// Responsibilities:
// - Create / read / update / delete projects
// - Add / toggle / remove milestones
// --------------------------------------------------

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::app::{ApiError, AppState};
use crate::models::{MilestoneInput, Project, ProjectPatch};

// -----------------------------
// GET /api/projects
// -----------------------------
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state.with_tracker(|t| t.projects())?;
    Ok(Json(projects))
}

// -----------------------------
// POST /api/projects
// Name is required; everything else has a default
// -----------------------------
pub async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<ProjectPatch>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let project = state.with_tracker(|t| t.create_project(input))?;
    Ok((StatusCode::CREATED, Json(project)))
}

// -----------------------------
// GET /api/projects/:id
// -----------------------------
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let project = state.with_tracker(|t| t.project(&id))?;
    Ok(Json(project))
}

// -----------------------------
// PUT /api/projects/:id
// Partial update; `null` clears nullable fields
// -----------------------------
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, ApiError> {
    let project = state.with_tracker(|t| t.update_project(&id, patch))?;
    Ok(Json(project))
}

// -----------------------------
// DELETE /api/projects/:id
// Tasks of the project are kept
// -----------------------------
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.with_tracker(|t| t.delete_project(&id))?;
    Ok(StatusCode::NO_CONTENT)
}

// -----------------------------
// POST /api/projects/:id/milestones
// -----------------------------
pub async fn add_milestone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MilestoneInput>,
) -> Result<Json<Project>, ApiError> {
    let project = state.with_tracker(|t| t.add_milestone(&id, input))?;
    Ok(Json(project))
}

// -----------------------------
// POST /api/projects/:id/milestones/:mid/toggle
// -----------------------------
pub async fn toggle_milestone(
    State(state): State<AppState>,
    Path((id, milestone_id)): Path<(String, String)>,
) -> Result<Json<Project>, ApiError> {
    let project = state.with_tracker(|t| t.toggle_milestone(&id, &milestone_id))?;
    Ok(Json(project))
}

// -----------------------------
// DELETE /api/projects/:id/milestones/:mid
// -----------------------------
pub async fn remove_milestone(
    State(state): State<AppState>,
    Path((id, milestone_id)): Path<(String, String)>,
) -> Result<Json<Project>, ApiError> {
    let project = state.with_tracker(|t| t.remove_milestone(&id, &milestone_id))?;
    Ok(Json(project))
}
