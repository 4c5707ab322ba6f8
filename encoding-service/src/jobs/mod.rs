//structures de jobs et de flux exposées par l'API
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//état d'un job d'encodage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

//job d'encodage
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub source_file: String, //chemin relatif à la racine média
    pub status: JobStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_manifest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hls_manifest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>, //durée sondée de la source, en secondes
}

//flux prêt à la lecture, dérivé d'un job terminé
#[derive(Clone, Debug, Serialize)]
pub struct Stream {
    pub id: String,
    pub original_file: String,
    pub title: String,
    pub dash_url: String,
    pub hls_url: String,
    pub thumbnail: String,
    pub duration: i64,
    pub created_at: DateTime<Utc>,
}
