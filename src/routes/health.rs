use axum::{extract::State, routing::get, Json, Router};

use crate::models::HealthResponse;
use crate::utils::check_ytdlp_available;

#[derive(Clone)]
pub struct HealthState {
    pub ytdlp_bin: String,
}

pub fn router(ytdlp_bin: String) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(HealthState { ytdlp_bin })
}

/// Health check dell'API
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API funzionante", body = HealthResponse),
    ),
    tag = "Sistema"
)]
pub async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ytdlp_available: check_ytdlp_available(&state.ytdlp_bin),
    })
}
