//! Registro thread-safe dei job

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::{Job, JobId, JobState, OutputFormat};

/// Mappa id -> job condivisa tra gateway e scheduler.
/// Le voci restano in memoria per tutta la vita del processo.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserisce un nuovo job in stato `Queued`.
    ///
    /// Un id duplicato non puo' verificarsi con lo schema di generazione
    /// casuale: se accade e' una violazione di invariante, non un errore
    /// del client.
    pub async fn create(&self, id: JobId, url: String, format: OutputFormat) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&id) {
            return Err(AppError::Internal(format!("id duplicato: {}", id)));
        }
        jobs.insert(id.clone(), Job::new(id, url, format));
        Ok(())
    }

    /// Ritorna uno snapshot del job, o None se l'id e' sconosciuto
    pub async fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Sostituisce atomicamente lo stato del job
    pub async fn update(&self, id: &JobId, state: JobState) {
        if let Some(job) = self.jobs.write().await.get_mut(id) {
            job.state = state;
        }
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
