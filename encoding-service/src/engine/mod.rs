//moteur d'encodage: registre, file bornée, workers et persistance des jobs terminés
pub mod registry;
pub mod watcher;

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::config::EncodingConfig;
use crate::ffmpeg::pipeline;
use crate::jobs::{Job, JobStatus};
use registry::JobRegistry;

pub struct EncodingEngine {
    pub registry: JobRegistry,
    pub config: Arc<EncodingConfig>,
    queue_tx: mpsc::Sender<Job>,
}

impl EncodingEngine {
    //création du moteur et de sa file d'attente bornée
    pub fn new(config: EncodingConfig) -> (Arc<Self>, mpsc::Receiver<Job>) {
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_depth);
        let engine = Arc::new(Self {
            registry: JobRegistry::new(),
            config: Arc::new(config),
            queue_tx,
        });
        (engine, queue_rx)
    }

    //démarrage des workers et de la surveillance du dossier média
    pub fn start(self: &Arc<Self>, queue_rx: mpsc::Receiver<Job>) {
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        for worker in 0..self.config.workers {
            tokio::spawn(worker_loop(self.clone(), queue_rx.clone(), worker));
        }
        tokio::spawn(watcher::watch(self.clone()));
    }

    //création d'un job et mise en file; bloque tant que la file est pleine
    pub async fn submit(&self, source_file: &str) -> Job {
        let job = self.registry.create(source_file).await;
        //l'envoi n'échoue qu'à l'arrêt du processus, quand les workers ont disparu
        if let Err(err) = self.queue_tx.send(job.clone()).await {
            tracing::error!(job = %job.id, %err, "job queue closed");
        }
        job
    }

    //rechargement des jobs terminés depuis encoded/<id>/job.json
    pub async fn restore_from_disk(&self) -> usize {
        let mut restored = 0;
        let entries = match std::fs::read_dir(&self.config.encoded_dir) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };
        for entry in entries.flatten() {
            let record_path = entry.path().join("job.json");
            let Ok(data) = std::fs::read(&record_path) else {
                continue;
            };
            match serde_json::from_slice::<Job>(&data) {
                Ok(job) if job.status == JobStatus::Completed => {
                    if self.registry.restore_completed(job).await {
                        restored += 1;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(path = %record_path.display(), %err, "ignoring unreadable job record");
                }
            }
        }
        restored
    }

    //écriture de l'enregistrement terminé à côté de ses sorties
    async fn persist_record(&self, job: &Job) {
        let path = self.config.encoded_dir.join(&job.id).join("job.json");
        match serde_json::to_vec_pretty(job) {
            Ok(data) => {
                if let Err(err) = tokio::fs::write(&path, data).await {
                    tracing::warn!(job = %job.id, %err, "failed to persist job record");
                }
            }
            Err(err) => {
                tracing::warn!(job = %job.id, %err, "failed to serialize job record");
            }
        }
    }
}

//boucle d'un exécuteur: un job à la fois, du début à la transition terminale
async fn worker_loop(
    engine: Arc<EncodingEngine>,
    queue_rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    worker: usize,
) {
    loop {
        //le verrou n'est tenu que le temps du dequeue
        let job = queue_rx.lock().await.recv().await;
        let Some(job) = job else { break };

        if let Err(err) = engine.registry.begin(&job.id).await {
            tracing::warn!(job = %job.id, %err, "job vanished before processing");
            continue;
        }
        tracing::info!(worker, job = %job.id, source = %job.source_file, "processing job");

        match pipeline::process_video(&engine.config, &engine.registry, &job).await {
            Ok(output) => match engine.registry.finish(&job.id, Ok(output)).await {
                Ok(finished) => {
                    engine.persist_record(&finished).await;
                    tracing::info!(worker, job = %job.id, "job completed");
                }
                Err(err) => {
                    tracing::warn!(job = %job.id, %err, "completion lost");
                }
            },
            Err(err) => {
                tracing::error!(worker, job = %job.id, %err, "job failed");
                if let Err(err) = engine.registry.finish(&job.id, Err(err.to_string())).await {
                    tracing::warn!(job = %job.id, %err, "failure lost");
                }
            }
        }
    }
}
