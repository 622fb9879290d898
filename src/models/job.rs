use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::OutputFormat;

/// Identificatore univoco di un job: 12 caratteri esadecimali
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[schema(value_type = String)]
pub struct JobId(String);

impl JobId {
    pub fn generate() -> Self {
        let bytes: [u8; 6] = rand::random();
        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stato corrente di un job. Serializzato cosi' come viene restituito
/// da `GET /status/:id`, con `status` come discriminante.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Processing,
    Done {
        #[serde(rename = "downloadUrl")]
        download_url: String,
    },
    Error {
        message: String,
    },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done { .. } | JobState::Error { .. })
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Queued => write!(f, "queued"),
            JobState::Processing => write!(f, "processing"),
            JobState::Done { .. } => write!(f, "done"),
            JobState::Error { .. } => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub url: String,
    pub format: OutputFormat,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: JobId, url: String, format: OutputFormat) -> Self {
        Self {
            id,
            url,
            format,
            state: JobState::Queued,
            created_at: Utc::now(),
        }
    }
}

/// Parametri di esecuzione di un job accodato. Creata alla validazione
/// della richiesta e consumata una sola volta dallo scheduler.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub id: JobId,
    pub url: String,
    pub format: OutputFormat,
    /// URL base del chiamante, usato per comporre il downloadUrl
    pub base_url: String,
}
