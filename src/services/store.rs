//! Pubblicazione e scadenza degli artefatti prodotti

use std::path::PathBuf;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Gestisce la vita dei file nella directory dei download
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    downloads_dir: PathBuf,
    retention: Duration,
}

impl ArtifactStore {
    pub fn new(downloads_dir: PathBuf, retention: Duration) -> Self {
        Self {
            downloads_dir,
            retention,
        }
    }

    /// Compone l'URL di download raggiungibile dal client
    pub fn publish(&self, base_url: &str, filename: &str) -> String {
        format!("{}/download/{}", base_url, urlencoding::encode(filename))
    }

    /// Programma l'eliminazione dell'artefatto al termine della retention.
    ///
    /// Best effort: un file gia' assente non e' un errore e nessun esito
    /// viene riportato al client. Non e' prevista la cancellazione
    /// anticipata del timer.
    pub fn schedule_expiry(&self, filename: &str) -> JoinHandle<()> {
        let path = self.downloads_dir.join(filename);
        let retention = self.retention;
        tokio::spawn(async move {
            tokio::time::sleep(retention).await;
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!("artefatto scaduto rimosso: {}", path.display()),
                Err(e) => {
                    tracing::debug!("rimozione di {} saltata: {}", path.display(), e)
                }
            }
        })
    }
}
