//! Coda FIFO dei job con esecuzione a concorrenza singola
//!
//! Un solo job alla volta occupa lo slot di lavoro: il drain e' idempotente,
//! viene rilanciato a ogni completamento e si esaurisce da solo quando la
//! coda e' vuota. L'ordine di esecuzione e' quello di accodamento.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::{JobState, QueueEntry};
use crate::services::downloader::Convert;
use crate::services::registry::JobRegistry;
use crate::services::store::ArtifactStore;

/// Messaggio generico mostrato al client per ogni conversione fallita.
/// La causa precisa (tool o file mancante) resta solo nei log.
const CONVERSION_FAILED_MESSAGE: &str = "conversion failed";

pub type SharedScheduler = Arc<Scheduler>;

pub struct Scheduler {
    registry: JobRegistry,
    store: ArtifactStore,
    executor: Arc<dyn Convert>,
    state: Mutex<QueueState>,
}

#[derive(Default)]
struct QueueState {
    queue: VecDeque<QueueEntry>,
    working: bool,
}

impl Scheduler {
    pub fn new(
        registry: JobRegistry,
        store: ArtifactStore,
        executor: Arc<dyn Convert>,
    ) -> SharedScheduler {
        Arc::new(Self {
            registry,
            store,
            executor,
            state: Mutex::new(QueueState::default()),
        })
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }
}

/// Registra il job come `Queued`, lo accoda e tenta subito il drain.
/// Ritorna senza attendere l'esecuzione.
pub async fn enqueue(scheduler: &SharedScheduler, entry: QueueEntry) -> Result<()> {
    scheduler
        .registry
        .create(entry.id.clone(), entry.url.clone(), entry.format)
        .await?;

    {
        let mut state = scheduler.state.lock().await;
        state.queue.push_back(entry);
    }

    drain(scheduler).await;
    Ok(())
}

/// Avvia il prossimo job se lo slot di lavoro e' libero.
///
/// Idempotente: con un job gia' in corso o con la coda vuota non fa nulla.
/// Pop della coda e occupazione dello slot avvengono nella stessa sezione
/// critica.
pub fn drain(scheduler: &SharedScheduler) -> BoxFuture<'static, ()> {
    let scheduler = Arc::clone(scheduler);
    Box::pin(async move {
        let entry = {
            let mut state = scheduler.state.lock().await;
            if state.working {
                return;
            }
            let Some(entry) = state.queue.pop_front() else {
                return;
            };
            state.working = true;
            entry
        };

        scheduler
            .registry
            .update(&entry.id, JobState::Processing)
            .await;
        tracing::info!("job {} in elaborazione ({})", entry.id, entry.format);

        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move {
            execute(scheduler, entry).await;
        });
    })
}

/// Esegue la conversione, pubblica l'esito, libera lo slot e riparte
/// con il drain
async fn execute(scheduler: SharedScheduler, entry: QueueEntry) {
    match scheduler.executor.run(&entry).await {
        Ok(artifact) => {
            let download_url = scheduler.store.publish(&entry.base_url, &artifact.filename);
            scheduler
                .registry
                .update(&entry.id, JobState::Done { download_url })
                .await;
            scheduler.store.schedule_expiry(&artifact.filename);
            tracing::info!("job {} completato: {}", entry.id, artifact.filename);
        }
        Err(e) => {
            tracing::warn!("job {} fallito: {}", entry.id, e);
            scheduler
                .registry
                .update(
                    &entry.id,
                    JobState::Error {
                        message: CONVERSION_FAILED_MESSAGE.to_string(),
                    },
                )
                .await;
        }
    }

    {
        let mut state = scheduler.state.lock().await;
        state.working = false;
    }

    drain(&scheduler).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use futures::future::BoxFuture;
    use tokio::sync::{mpsc, oneshot};

    use crate::models::{JobId, OutputFormat};
    use crate::services::downloader::{Artifact, DownloadError};

    type Outcome = std::result::Result<Artifact, DownloadError>;

    /// Esecutore pilotato dai test: annuncia ogni avvio e resta in attesa
    /// dell'esito deciso dal test.
    struct ScriptedExecutor {
        started_tx: mpsc::UnboundedSender<JobId>,
        outcomes: StdMutex<VecDeque<oneshot::Receiver<Outcome>>>,
    }

    impl Convert for ScriptedExecutor {
        fn run(&self, entry: &QueueEntry) -> BoxFuture<'static, Outcome> {
            let _ = self.started_tx.send(entry.id.clone());
            let rx = self.outcomes.lock().unwrap().pop_front();
            Box::pin(async move {
                match rx {
                    Some(rx) => rx
                        .await
                        .unwrap_or_else(|_| Err(DownloadError::ToolFailed("annullato".into()))),
                    None => Err(DownloadError::ToolFailed("nessun esito previsto".into())),
                }
            })
        }
    }

    struct Harness {
        scheduler: SharedScheduler,
        started_rx: mpsc::UnboundedReceiver<JobId>,
        outcome_txs: Vec<oneshot::Sender<Outcome>>,
    }

    fn harness(scripted_jobs: usize) -> Harness {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let mut outcome_txs = Vec::new();
        let mut outcome_rxs = VecDeque::new();
        for _ in 0..scripted_jobs {
            let (tx, rx) = oneshot::channel();
            outcome_txs.push(tx);
            outcome_rxs.push_back(rx);
        }

        let executor = Arc::new(ScriptedExecutor {
            started_tx,
            outcomes: StdMutex::new(outcome_rxs),
        });

        let scheduler = Scheduler::new(
            JobRegistry::new(),
            ArtifactStore::new(PathBuf::from("downloads"), Duration::from_secs(600)),
            executor,
        );

        Harness {
            scheduler,
            started_rx,
            outcome_txs,
        }
    }

    fn entry(id: &JobId, format: OutputFormat) -> QueueEntry {
        QueueEntry {
            id: id.clone(),
            url: "https://youtu.be/abc123".to_string(),
            format,
            base_url: "http://localhost:3000".to_string(),
        }
    }

    fn artifact(id: &JobId, ext: &str) -> Artifact {
        Artifact {
            filename: format!("{}.{}", id, ext),
        }
    }

    async fn wait_for_terminal(scheduler: &SharedScheduler, id: &JobId) -> JobState {
        for _ in 0..100 {
            if let Some(job) = scheduler.registry().get(id).await {
                if job.state.is_terminal() {
                    return job.state;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("il job {} non ha raggiunto uno stato terminale", id);
    }

    #[tokio::test]
    async fn test_second_job_waits_for_first() {
        let mut h = harness(2);
        let a = JobId::generate();
        let b = JobId::generate();

        enqueue(&h.scheduler, entry(&a, OutputFormat::Mp3)).await.unwrap();
        enqueue(&h.scheduler, entry(&b, OutputFormat::Mp4)).await.unwrap();

        // A occupa lo slot, B resta in coda
        assert_eq!(h.started_rx.recv().await.unwrap(), a);
        assert_eq!(
            h.scheduler.registry().get(&a).await.unwrap().state,
            JobState::Processing
        );
        assert_eq!(
            h.scheduler.registry().get(&b).await.unwrap().state,
            JobState::Queued
        );
        assert!(h.started_rx.try_recv().is_err());

        // Il completamento di A libera lo slot e avvia B
        let mut txs = h.outcome_txs.drain(..);
        txs.next().unwrap().send(Ok(artifact(&a, "mp3"))).unwrap();

        assert_eq!(h.started_rx.recv().await.unwrap(), b);
        let a_state = wait_for_terminal(&h.scheduler, &a).await;
        assert_eq!(
            a_state,
            JobState::Done {
                download_url: format!("http://localhost:3000/download/{}.mp3", a)
            }
        );
        assert_eq!(
            h.scheduler.registry().get(&b).await.unwrap().state,
            JobState::Processing
        );

        txs.next()
            .unwrap()
            .send(Err(DownloadError::ToolFailed("exit 1".into())))
            .unwrap();
        let b_state = wait_for_terminal(&h.scheduler, &b).await;
        assert_eq!(
            b_state,
            JobState::Error {
                message: "conversion failed".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_jobs_complete_in_fifo_order() {
        let mut h = harness(3);
        let ids: Vec<JobId> = (0..3).map(|_| JobId::generate()).collect();

        for id in &ids {
            enqueue(&h.scheduler, entry(id, OutputFormat::Mp3)).await.unwrap();
        }

        let mut started = Vec::new();
        for tx in h.outcome_txs.drain(..) {
            started.push(h.started_rx.recv().await.unwrap());
            tx.send(Err(DownloadError::ToolFailed("exit 1".into())))
                .unwrap();
        }

        assert_eq!(started, ids);
        for id in &ids {
            assert!(wait_for_terminal(&h.scheduler, id).await.is_terminal());
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_stall_queue() {
        let mut h = harness(2);
        let a = JobId::generate();
        let b = JobId::generate();

        enqueue(&h.scheduler, entry(&a, OutputFormat::Mp4)).await.unwrap();
        enqueue(&h.scheduler, entry(&b, OutputFormat::Mp3)).await.unwrap();

        assert_eq!(h.started_rx.recv().await.unwrap(), a);

        let mut txs = h.outcome_txs.drain(..);
        txs.next()
            .unwrap()
            .send(Err(DownloadError::ToolFailed("timeout dopo 180s".into())))
            .unwrap();

        // La coda prosegue subito dopo il fallimento
        assert_eq!(h.started_rx.recv().await.unwrap(), b);
        assert_eq!(
            wait_for_terminal(&h.scheduler, &a).await,
            JobState::Error {
                message: "conversion failed".to_string()
            }
        );

        txs.next().unwrap().send(Ok(artifact(&b, "mp3"))).unwrap();
        assert!(wait_for_terminal(&h.scheduler, &b).await.is_terminal());
    }

    #[tokio::test]
    async fn test_output_missing_has_same_client_message_as_tool_failure() {
        let mut h = harness(2);
        let a = JobId::generate();
        let b = JobId::generate();

        enqueue(&h.scheduler, entry(&a, OutputFormat::Mp3)).await.unwrap();
        let mut txs = h.outcome_txs.drain(..);
        txs.next()
            .unwrap()
            .send(Err(DownloadError::OutputMissing))
            .unwrap();
        let a_state = wait_for_terminal(&h.scheduler, &a).await;

        enqueue(&h.scheduler, entry(&b, OutputFormat::Mp3)).await.unwrap();
        txs.next()
            .unwrap()
            .send(Err(DownloadError::ToolFailed("exit 1".into())))
            .unwrap();
        let b_state = wait_for_terminal(&h.scheduler, &b).await;

        // Cause interne diverse, stesso messaggio per il client
        assert_eq!(a_state, b_state);
    }

    #[tokio::test]
    async fn test_drain_is_idempotent() {
        let mut h = harness(1);

        // Coda vuota: nessun effetto
        drain(&h.scheduler).await;
        drain(&h.scheduler).await;
        assert!(h.scheduler.registry().is_empty().await);

        // Job in corso: il drain ripetuto non avvia nulla
        let a = JobId::generate();
        enqueue(&h.scheduler, entry(&a, OutputFormat::Mp3)).await.unwrap();
        assert_eq!(h.started_rx.recv().await.unwrap(), a);

        drain(&h.scheduler).await;
        drain(&h.scheduler).await;
        assert!(h.started_rx.try_recv().is_err());

        h.outcome_txs
            .remove(0)
            .send(Ok(artifact(&a, "mp3")))
            .unwrap();
        assert!(wait_for_terminal(&h.scheduler, &a).await.is_terminal());
    }
}
