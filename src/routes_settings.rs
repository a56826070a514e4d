// --------------------------------------------------
// Handles API endpoints for global settings and data maintenance.
//
// Responsibilities:
// - Get / update settings
// - Manual backup of every data file
// - Clear all data (a backup is taken first)
// --------------------------------------------------

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::app::{ApiError, AppState};
use crate::models::{Settings, SettingsPatch};

#[derive(Debug, Serialize)]
pub struct BackupResponse {
    pub backups: Vec<String>,
}

// -----------------------------
// GET /api/settings
// -----------------------------
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, ApiError> {
    let settings = state.with_tracker(|t| t.settings())?;
    Ok(Json(settings))
}

// -----------------------------
// PUT /api/settings
// -----------------------------
pub async fn put_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Settings>, ApiError> {
    let settings = state.with_tracker(|t| t.update_settings(patch))?;
    Ok(Json(settings))
}

// -----------------------------
// POST /api/settings/first-launch
// -----------------------------
pub async fn complete_first_launch(
    State(state): State<AppState>,
) -> Result<Json<Settings>, ApiError> {
    let settings = state.with_tracker(|t| t.complete_first_launch())?;
    Ok(Json(settings))
}

// -----------------------------
// POST /api/maintenance/backup
// Returns the file names of the backups just created
// -----------------------------
pub async fn backup_now(State(state): State<AppState>) -> Result<Json<BackupResponse>, ApiError> {
    let paths = state.with_tracker(|t| t.backup_now())?;
    let backups = paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    Ok(Json(BackupResponse { backups }))
}

// -----------------------------
// POST /api/maintenance/clear
// -----------------------------
pub async fn clear_all_data(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.with_tracker(|t| t.clear_all_data())?;
    Ok(StatusCode::NO_CONTENT)
}
