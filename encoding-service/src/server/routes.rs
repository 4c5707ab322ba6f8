//gestion des routes HTTP du service d'encodage
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::engine::registry::JobFilter;
use crate::engine::EncodingEngine;
use crate::jobs::{Job, Stream};

//probe de santé
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

#[derive(Deserialize)]
pub struct JobsQuery {
    status: Option<String>,
}

//liste des jobs, filtrée par partition
pub async fn list_jobs(
    State(engine): State<Arc<EncodingEngine>>,
    Query(query): Query<JobsQuery>,
) -> impl IntoResponse {
    let status = query.status.unwrap_or_default();
    let jobs = match JobFilter::parse(&status) {
        Some(filter) => engine.registry.list(filter).await,
        //filtre inconnu: aucune partition ne correspond
        None => Vec::new(),
    };
    Json(jobs)
}

//détail d'un job
pub async fn get_job(
    State(engine): State<Arc<EncodingEngine>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match engine.registry.get(&id).await {
        Some(job) => Json(job).into_response(),
        None => (StatusCode::NOT_FOUND, "Job not found").into_response(),
    }
}

//liste des flux lisibles, dérivée des jobs terminés
pub async fn list_streams(State(engine): State<Arc<EncodingEngine>>) -> impl IntoResponse {
    let completed = engine.registry.list(JobFilter::Completed).await;
    let streams: Vec<Stream> = completed
        .into_iter()
        .filter(|job| job.dash_manifest.is_some() || job.hls_manifest.is_some())
        .map(stream_from_job)
        .collect();
    Json(streams)
}

//projection d'un job terminé en flux
fn stream_from_job(job: Job) -> Stream {
    Stream {
        id: job.id.clone(),
        title: title_from_source(&job.source_file),
        original_file: job.source_file.clone(),
        dash_url: job.dash_manifest.clone().unwrap_or_default(),
        hls_url: job.hls_manifest.clone().unwrap_or_default(),
        thumbnail: format!("/encoded/{}/thumbnail.jpg", job.id),
        duration: job.duration.unwrap_or(0),
        created_at: job.completed_at.unwrap_or(job.created_at),
    }
}

//titre: partie du nom de fichier après le premier tiret bas
fn title_from_source(source_file: &str) -> String {
    source_file
        .splitn(2, '_')
        .nth(1)
        .unwrap_or(source_file)
        .to_string()
}

#[derive(Deserialize)]
pub struct EncodeRequest {
    source_file: String,
}

//soumission explicite d'un job d'encodage
pub async fn submit_job(
    State(engine): State<Arc<EncodingEngine>>,
    Json(body): Json<EncodeRequest>,
) -> impl IntoResponse {
    if body.source_file.is_empty() {
        return (StatusCode::BAD_REQUEST, "Source file is required").into_response();
    }
    let source_path = engine.config.media_dir.join(&body.source_file);
    if !source_path.is_file() {
        return (StatusCode::NOT_FOUND, "Source file not found").into_response();
    }
    let job = engine.submit(&body.source_file).await;
    (StatusCode::CREATED, Json(job)).into_response()
}
