//! Endpoint di accodamento delle conversioni

use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};

use crate::error::Result;
use crate::models::{ConvertAccepted, ConvertRequest, ErrorResponse, JobId, QueueEntry};
use crate::services::scheduler::{self, SharedScheduler};
use crate::utils::{parse_output_format, validate_source_url};

#[derive(Clone)]
pub struct ConvertState {
    pub scheduler: SharedScheduler,
}

pub fn router(scheduler: SharedScheduler) -> Router {
    Router::new()
        .route("/convert", post(convert))
        .with_state(ConvertState { scheduler })
}

/// Accoda una nuova conversione
#[utoipa::path(
    post,
    path = "/convert",
    request_body = ConvertRequest,
    responses(
        (status = 200, description = "Job accodato", body = ConvertAccepted),
        (status = 400, description = "URL o formato non validi", body = ErrorResponse),
    ),
    tag = "Conversione"
)]
pub async fn convert(
    State(state): State<ConvertState>,
    headers: HeaderMap,
    Json(req): Json<ConvertRequest>,
) -> Result<Json<ConvertAccepted>> {
    validate_source_url(&req.url)?;
    let format = parse_output_format(&req.format)?;

    let id = JobId::generate();
    let base_url = base_url_from_headers(&headers);

    scheduler::enqueue(
        &state.scheduler,
        QueueEntry {
            id: id.clone(),
            url: req.url,
            format,
            base_url,
        },
    )
    .await?;

    Ok(Json(ConvertAccepted::new(id)))
}

/// Ricava l'URL base per il downloadUrl onorando gli header
/// impostati dal reverse proxy, con fallback sulla connessione diretta.
fn base_url_from_headers(headers: &HeaderMap) -> String {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");

    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(axum::http::header::HOST))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{}://{}", proto, host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_base_url_from_direct_connection() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("localhost:3000"));

        assert_eq!(base_url_from_headers(&headers), "http://localhost:3000");
    }

    #[test]
    fn test_base_url_honors_forwarding_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("127.0.0.1:3000"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert(
            "x-forwarded-host",
            HeaderValue::from_static("media.example.com"),
        );

        assert_eq!(
            base_url_from_headers(&headers),
            "https://media.example.com"
        );
    }

    #[test]
    fn test_base_url_without_headers() {
        assert_eq!(base_url_from_headers(&HeaderMap::new()), "http://localhost");
    }
}
