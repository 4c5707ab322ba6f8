//gestion des routes HTTP du service d'upload
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::UploadConfig;

//types MIME vidéo acceptés
const VIDEO_CONTENT_TYPES: [&str; 8] = [
    "video/mp4",
    "video/mpeg",
    "video/ogg",
    "video/webm",
    "video/quicktime",
    "video/x-matroska",
    "video/x-flv",
    "video/x-ms-wmv",
];

//réponse renvoyée après un dépôt réussi
#[derive(Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

//probe de santé
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

//réception d'un fichier vidéo en multipart/form-data, champ "file"
pub async fn upload(
    State(config): State<Arc<UploadConfig>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    "File too large or invalid multipart form",
                )
                    .into_response()
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let mime_type = field.content_type().unwrap_or_default().to_string();
        if !is_video_content_type(&mime_type) {
            return (StatusCode::BAD_REQUEST, "Only video files are allowed").into_response();
        }

        let original = field.file_name().map(sanitize_filename).unwrap_or_default();
        if original.is_empty() {
            return (StatusCode::BAD_REQUEST, "Error retrieving file from form").into_response();
        }

        //nommage <nanosecondes>_<nom original> dans le dossier média
        let file_id = format!(
            "{}_{}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            original
        );
        let final_path = config.media_dir.join(&file_id);
        let part_path = config.media_dir.join(format!("{file_id}.part"));

        //écriture en .part puis renommage: jamais de fichier partiel visible
        let mut file = match File::create(&part_path).await {
            Ok(file) => file,
            Err(err) => {
                tracing::error!(%err, "failed to create destination file");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error creating destination file",
                )
                    .into_response();
            }
        };
        let mut size: u64 = 0;
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    if let Err(err) = file.write_all(&chunk).await {
                        tracing::error!(%err, "failed to write upload");
                        return (StatusCode::INTERNAL_SERVER_ERROR, "Error saving file")
                            .into_response();
                    }
                    size += chunk.len() as u64;
                }
                Ok(None) => break,
                Err(_) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        "File too large or invalid multipart form",
                    )
                        .into_response()
                }
            }
        }
        if let Err(err) = tokio::fs::rename(&part_path, &final_path).await {
            tracing::error!(%err, "failed to finalize upload");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error saving file").into_response();
        }

        tracing::info!(file_id = %file_id, size, mime_type = %mime_type, "file uploaded");
        return (
            StatusCode::CREATED,
            Json(UploadResponse {
                file_id,
                filename: original,
                size,
                mime_type,
                uploaded_at: Utc::now(),
            }),
        )
            .into_response();
    }

    (StatusCode::BAD_REQUEST, "Error retrieving file from form").into_response()
}

//validation du type MIME annoncé par la partie
fn is_video_content_type(content_type: &str) -> bool {
    VIDEO_CONTENT_TYPES.contains(&content_type)
}

//seul le nom de base du fichier client est conservé
fn sanitize_filename(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
