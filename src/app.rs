//! Shared HTTP state, error mapping and the API router.

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use tracing::error;

use crate::error::{TrackerError, TrackerResult};
use crate::tracker::Tracker;
use crate::{routes_plan, routes_projects, routes_settings, routes_tasks};

/// One tracker behind one lock: every request is a single writer.
#[derive(Clone)]
pub struct AppState {
    tracker: Arc<Mutex<Tracker>>,
}

impl AppState {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }

    pub fn tracker(&self) -> Arc<Mutex<Tracker>> {
        Arc::clone(&self.tracker)
    }

    /// Run `op` with the tracker locked, recovering a poisoned lock.
    pub(crate) fn with_tracker<T>(
        &self,
        op: impl FnOnce(&Tracker) -> TrackerResult<T>,
    ) -> Result<T, ApiError> {
        let tracker = self.tracker.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(op(&tracker)?)
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Tracker(TrackerError),
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        ApiError::Tracker(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Tracker(TrackerError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Tracker(TrackerError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Tracker(TrackerError::Dependency(_)) => StatusCode::CONFLICT,
            ApiError::Tracker(TrackerError::Storage(e)) => {
                error!(error = %e, "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Tracker(err) => err.to_string(),
        };
        (status, message).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // projects
        .route(
            "/projects",
            get(routes_projects::list_projects).post(routes_projects::create_project),
        )
        .route(
            "/projects/:id",
            get(routes_projects::get_project)
                .put(routes_projects::update_project)
                .delete(routes_projects::delete_project),
        )
        .route("/projects/:id/milestones", post(routes_projects::add_milestone))
        .route(
            "/projects/:id/milestones/:mid",
            delete(routes_projects::remove_milestone),
        )
        .route(
            "/projects/:id/milestones/:mid/toggle",
            post(routes_projects::toggle_milestone),
        )
        // tasks
        .route(
            "/tasks",
            get(routes_tasks::list_tasks).post(routes_tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes_tasks::get_task)
                .put(routes_tasks::update_task)
                .delete(routes_tasks::delete_task),
        )
        .route("/tasks/:id/status", post(routes_tasks::set_status))
        .route("/tasks/:id/checklist", post(routes_tasks::add_checklist_item))
        .route(
            "/tasks/:id/checklist/:item",
            delete(routes_tasks::remove_checklist_item),
        )
        .route(
            "/tasks/:id/checklist/:item/toggle",
            post(routes_tasks::toggle_checklist_item),
        )
        .route("/tasks/:id/timer/start", post(routes_tasks::start_timer))
        .route("/tasks/:id/timer/stop", post(routes_tasks::stop_timer))
        .route("/tasks/:id/timer/commit", post(routes_tasks::commit_timer))
        // daily plans
        .route("/plans", get(routes_plan::list_plans))
        .route(
            "/plans/:date",
            get(routes_plan::get_plan).put(routes_plan::put_plan),
        )
        .route(
            "/plans/:date/tasks/:task_id",
            post(routes_plan::add_plan_task).delete(routes_plan::remove_plan_task),
        )
        .route("/plans/:date/blocks", post(routes_plan::add_time_block))
        .route(
            "/plans/:date/blocks/:block",
            delete(routes_plan::remove_time_block),
        )
        .route(
            "/plans/:date/blocks/:block/toggle",
            post(routes_plan::toggle_time_block),
        )
        // settings & maintenance
        .route(
            "/settings",
            get(routes_settings::get_settings).put(routes_settings::put_settings),
        )
        .route(
            "/settings/first-launch",
            post(routes_settings::complete_first_launch),
        )
        .route("/maintenance/backup", post(routes_settings::backup_now))
        .route("/maintenance/clear", post(routes_settings::clear_all_data))
        .with_state(state);

    Router::new().nest("/api", api)
}
