//registre des jobs, partitionné par état de cycle de vie
use std::collections::{HashMap, HashSet};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::ffmpeg::pipeline::EncodeOutput;
use crate::jobs::{Job, JobStatus};

//filtre de listing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobFilter {
    All,
    Active,
    Completed,
    Failed,
}

impl JobFilter {
    //filtre vide ou "all": toutes les partitions
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "" | "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("job {0} not found")]
    NotFound(String),
}

//les trois partitions, gardées par un unique verrou lecteurs/rédacteur
#[derive(Default)]
struct Partitions {
    active: HashMap<String, Job>,
    completed: HashMap<String, Job>,
    failed: HashMap<String, Job>,
}

pub struct JobRegistry {
    inner: RwLock<Partitions>,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Partitions::default()),
        }
    }

    //création d'un job pending dans la partition active
    pub async fn create(&self, source_file: &str) -> Job {
        let job = Job {
            id: format!("job_{}", Utc::now().timestamp_nanos_opt().unwrap_or_default()),
            source_file: source_file.to_string(),
            status: JobStatus::Pending,
            progress: 0,
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            dash_manifest: None,
            hls_manifest: None,
            duration: None,
        };
        let mut inner = self.inner.write().await;
        inner.active.insert(job.id.clone(), job.clone());
        job
    }

    //passage en processing par le worker propriétaire
    pub async fn begin(&self, id: &str) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().await;
        let job = inner
            .active
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        job.status = JobStatus::Processing;
        job.started_at = Some(Utc::now());
        Ok(())
    }

    //mise à jour de la progression d'un job en cours
    pub async fn progress(&self, id: &str, percent: u8) {
        let mut inner = self.inner.write().await;
        if let Some(job) = inner.active.get_mut(id) {
            job.progress = percent.min(100);
        }
    }

    //transition terminale: retrait d'active, insertion en completed ou failed
    pub async fn finish(
        &self,
        id: &str,
        outcome: Result<EncodeOutput, String>,
    ) -> Result<Job, RegistryError> {
        let mut inner = self.inner.write().await;
        let mut job = inner
            .active
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        match outcome {
            Ok(output) => {
                job.status = JobStatus::Completed;
                job.progress = 100;
                job.completed_at = Some(Utc::now());
                job.dash_manifest = Some(output.dash_manifest);
                job.hls_manifest = Some(output.hls_manifest);
                job.duration = Some(output.duration);
                inner.completed.insert(job.id.clone(), job.clone());
            }
            Err(message) => {
                job.status = JobStatus::Failed;
                job.error_message = Some(message);
                inner.failed.insert(job.id.clone(), job.clone());
            }
        }
        Ok(job)
    }

    //rechargement d'un enregistrement terminé depuis l'arborescence de sortie
    pub async fn restore_completed(&self, job: Job) -> bool {
        if job.status != JobStatus::Completed {
            return false;
        }
        let mut inner = self.inner.write().await;
        if inner.completed.contains_key(&job.id) {
            return false;
        }
        inner.completed.insert(job.id.clone(), job);
        true
    }

    //recherche dans les trois partitions
    pub async fn get(&self, id: &str) -> Option<Job> {
        let inner = self.inner.read().await;
        inner
            .active
            .get(id)
            .or_else(|| inner.completed.get(id))
            .or_else(|| inner.failed.get(id))
            .cloned()
    }

    pub async fn list(&self, filter: JobFilter) -> Vec<Job> {
        let inner = self.inner.read().await;
        let mut jobs = Vec::new();
        if matches!(filter, JobFilter::All | JobFilter::Active) {
            jobs.extend(inner.active.values().cloned());
        }
        if matches!(filter, JobFilter::All | JobFilter::Completed) {
            jobs.extend(inner.completed.values().cloned());
        }
        if matches!(filter, JobFilter::All | JobFilter::Failed) {
            jobs.extend(inner.failed.values().cloned());
        }
        jobs
    }

    //fichiers sources déjà représentés par un job, toutes partitions confondues
    pub async fn seen_sources(&self) -> HashSet<String> {
        let inner = self.inner.read().await;
        inner
            .active
            .values()
            .chain(inner.completed.values())
            .chain(inner.failed.values())
            .map(|job| job.source_file.clone())
            .collect()
    }
}
