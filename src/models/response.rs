use serde::Serialize;
use utoipa::ToSchema;

use super::JobId;

#[derive(Debug, Serialize, ToSchema)]
pub struct ConvertAccepted {
    /// Sempre "processing": il job e' stato accettato ed e' in lavorazione
    pub status: String,
    #[schema(value_type = String)]
    pub id: JobId,
}

impl ConvertAccepted {
    pub fn new(id: JobId) -> Self {
        Self {
            status: "processing".to_string(),
            id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Stato dell'API
    pub status: String,
    /// Versione dell'API
    pub version: String,
    /// yt-dlp disponibile sul sistema
    pub ytdlp_available: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Sempre "error"
    pub status: String,
    pub message: String,
}
