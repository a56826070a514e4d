// --------------------------------------------------
// Handles API endpoints for daily plans.
//
// A plan is addressed by its date ("YYYY-MM-DD") and is created
// the first time anything is written to it.
// --------------------------------------------------

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::app::{ApiError, AppState};
use crate::models::{DailyPlan, DailyPlanPatch, TimeBlockInput};

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest("invalid date".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: String, // "YYYY-MM-DD"
    pub end: String,   // "YYYY-MM-DD"
}

// -----------------------------
// GET /api/plans?start=&end=
// Plans in the inclusive range, oldest first
// -----------------------------
pub async fn list_plans(
    State(state): State<AppState>,
    Query(q): Query<RangeQuery>,
) -> Result<Json<Vec<DailyPlan>>, ApiError> {
    let start = parse_date(&q.start)?;
    let end = parse_date(&q.end)?;
    let plans = state.with_tracker(|t| t.plans_between(start, end))?;
    Ok(Json(plans))
}

// -----------------------------
// GET /api/plans/:date
// `null` when no plan exists for the date
// -----------------------------
pub async fn get_plan(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Option<DailyPlan>>, ApiError> {
    let date = parse_date(&date)?;
    let plan = state.with_tracker(|t| t.plan_for(date))?;
    Ok(Json(plan))
}

// -----------------------------
// PUT /api/plans/:date
// -----------------------------
pub async fn put_plan(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(patch): Json<DailyPlanPatch>,
) -> Result<Json<DailyPlan>, ApiError> {
    let date = parse_date(&date)?;
    let plan = state.with_tracker(|t| t.upsert_plan(date, patch))?;
    Ok(Json(plan))
}

// -----------------------------
// POST / DELETE /api/plans/:date/tasks/:task_id
// -----------------------------
pub async fn add_plan_task(
    State(state): State<AppState>,
    Path((date, task_id)): Path<(String, String)>,
) -> Result<Json<DailyPlan>, ApiError> {
    let date = parse_date(&date)?;
    let plan = state.with_tracker(|t| t.add_plan_task(date, &task_id))?;
    Ok(Json(plan))
}

pub async fn remove_plan_task(
    State(state): State<AppState>,
    Path((date, task_id)): Path<(String, String)>,
) -> Result<Json<DailyPlan>, ApiError> {
    let date = parse_date(&date)?;
    let plan = state.with_tracker(|t| t.remove_plan_task(date, &task_id))?;
    Ok(Json(plan))
}

// -----------------------------
// POST /api/plans/:date/blocks
// -----------------------------
pub async fn add_time_block(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(input): Json<TimeBlockInput>,
) -> Result<Json<DailyPlan>, ApiError> {
    let date = parse_date(&date)?;
    let plan = state.with_tracker(|t| t.add_time_block(date, input))?;
    Ok(Json(plan))
}

// -----------------------------
// POST /api/plans/:date/blocks/:block/toggle
// -----------------------------
pub async fn toggle_time_block(
    State(state): State<AppState>,
    Path((date, block_id)): Path<(String, String)>,
) -> Result<Json<DailyPlan>, ApiError> {
    let date = parse_date(&date)?;
    let plan = state.with_tracker(|t| t.toggle_time_block(date, &block_id))?;
    Ok(Json(plan))
}

// -----------------------------
// DELETE /api/plans/:date/blocks/:block
// -----------------------------
pub async fn remove_time_block(
    State(state): State<AppState>,
    Path((date, block_id)): Path<(String, String)>,
) -> Result<Json<DailyPlan>, ApiError> {
    let date = parse_date(&date)?;
    let plan = state.with_tracker(|t| t.remove_time_block(date, &block_id))?;
    Ok(Json(plan))
}
