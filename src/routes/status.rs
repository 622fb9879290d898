//! Endpoint di polling dello stato dei job

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::models::{ErrorResponse, JobId, JobState};
use crate::services::scheduler::SharedScheduler;

#[derive(Clone)]
pub struct StatusState {
    pub scheduler: SharedScheduler,
}

pub fn router(scheduler: SharedScheduler) -> Router {
    Router::new()
        .route("/status/:id", get(job_status))
        .with_state(StatusState { scheduler })
}

/// Stato corrente di un job
#[utoipa::path(
    get,
    path = "/status/{id}",
    params(
        ("id" = String, Path, description = "Identificatore del job"),
    ),
    responses(
        (status = 200, description = "Stato del job", body = JobState),
        (status = 404, description = "Job sconosciuto", body = ErrorResponse),
    ),
    tag = "Conversione"
)]
pub async fn job_status(
    State(state): State<StatusState>,
    Path(id): Path<String>,
) -> Result<Json<JobState>> {
    let job = state
        .scheduler
        .registry()
        .get(&JobId::from(id))
        .await
        .ok_or(AppError::NotFound)?;

    Ok(Json(job.state))
}
