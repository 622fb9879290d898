//! Esecuzione di yt-dlp con timeout e verifica dell'output

use std::path::PathBuf;
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::process::Command;

use crate::models::{OutputFormat, QueueEntry};
use crate::utils::find_artifact;

/// Esito negativo di una conversione
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Il tool non e' partito, e' uscito con errore o ha superato il timeout
    #[error("conversione fallita: {0}")]
    ToolFailed(String),

    /// Il tool ha riportato successo ma nessun file corrisponde al job
    #[error("nessun file prodotto")]
    OutputMissing,
}

/// File prodotto da una conversione completata, identificato dal nome
/// all'interno della directory dei download
#[derive(Debug, Clone)]
pub struct Artifact {
    pub filename: String,
}

/// Punto di estensione dello scheduler: i test iniettano esecutori simulati
/// al posto dell'invocazione reale di yt-dlp.
pub trait Convert: Send + Sync + 'static {
    fn run(&self, entry: &QueueEntry) -> BoxFuture<'static, Result<Artifact, DownloadError>>;
}

pub struct YtDlpDownloader {
    bin: String,
    downloads_dir: PathBuf,
    timeout: Duration,
}

impl YtDlpDownloader {
    pub fn new(bin: String, downloads_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            bin,
            downloads_dir,
            timeout,
        }
    }

    /// Argomenti costruiti in modo deterministico dal formato richiesto
    fn build_args(&self, entry: &QueueEntry) -> Vec<String> {
        let template = self
            .downloads_dir
            .join(format!("{}.%(ext)s", entry.id))
            .to_string_lossy()
            .into_owned();

        let mut args: Vec<String> = match entry.format {
            OutputFormat::Mp3 => vec![
                "-x".to_string(),
                "--audio-format".to_string(),
                "mp3".to_string(),
            ],
            OutputFormat::Mp4 => vec![
                "-f".to_string(),
                "bestvideo[ext=mp4]+bestaudio[ext=m4a]/mp4".to_string(),
            ],
        };

        args.push("--no-playlist".to_string());
        args.push("-o".to_string());
        args.push(template);
        args.push(entry.url.clone());

        args
    }
}

impl Convert for YtDlpDownloader {
    fn run(&self, entry: &QueueEntry) -> BoxFuture<'static, Result<Artifact, DownloadError>> {
        let bin = self.bin.clone();
        let args = self.build_args(entry);
        let downloads_dir = self.downloads_dir.clone();
        let id = entry.id.clone();
        let timeout = self.timeout;

        Box::pin(async move {
            let mut cmd = Command::new(&bin);
            cmd.args(&args).kill_on_drop(true);

            let output = match tokio::time::timeout(timeout, cmd.output()).await {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    return Err(DownloadError::ToolFailed(format!(
                        "avvio di {} fallito: {}",
                        bin, e
                    )))
                }
                // Il timeout e' trattato come un fallimento del tool;
                // kill_on_drop termina il processo rimasto appeso
                Err(_) => {
                    return Err(DownloadError::ToolFailed(format!(
                        "timeout dopo {}s",
                        timeout.as_secs()
                    )))
                }
            };

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(DownloadError::ToolFailed(stderr.trim().to_string()));
            }

            // L'exit code da solo non basta: il file deve esistere davvero
            match find_artifact(&downloads_dir, id.as_str()) {
                Ok(Some(path)) => {
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    Ok(Artifact { filename })
                }
                _ => Err(DownloadError::OutputMissing),
            }
        })
    }
}
