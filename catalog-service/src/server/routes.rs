//gestion des routes HTTP du service catalogue
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::body::StreamBody;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use walkdir::WalkDir;

use crate::config::CatalogConfig;

//métadonnées d'un fichier du dossier média
#[derive(Clone, Debug, Serialize)]
pub struct FileInfo {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub url: String,
}

//probe de santé
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

//liste des fichiers suivant la convention de nommage <horodatage>_<nom>
pub async fn list_files(State(config): State<Arc<CatalogConfig>>) -> impl IntoResponse {
    match collect_files(&config.media_dir) {
        Ok(files) => Json(files).into_response(),
        Err(err) => {
            tracing::error!(%err, "failed to list media files");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving files").into_response()
        }
    }
}

//énumération du dossier média
fn collect_files(media_dir: &FsPath) -> std::io::Result<Vec<FileInfo>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(media_dir) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_dir() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();
        //dépôts en cours d'écriture par le service d'upload
        if filename.ends_with(".part") {
            continue;
        }
        //les fichiers hors convention de nommage sont ignorés
        let Some((_, original)) = filename.split_once('_') else {
            continue;
        };
        let metadata = entry.metadata().map_err(std::io::Error::from)?;
        let created_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        files.push(FileInfo {
            id: filename.clone(),
            name: original.to_string(),
            size: metadata.len(),
            mime_type: content_type_for(&filename).to_string(),
            created_at,
            url: format!("/download/{filename}"),
        });
    }
    Ok(files)
}

//téléchargement d'un original, servi en pièce jointe
pub async fn download(
    State(config): State<Arc<CatalogConfig>>,
    Path(file_id): Path<String>,
) -> impl IntoResponse {
    if file_id.is_empty() || file_id.contains('/') || file_id.contains('\\') {
        return (StatusCode::BAD_REQUEST, "File ID is required").into_response();
    }
    let path = config.media_dir.join(&file_id);
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return (StatusCode::NOT_FOUND, "File not found").into_response(),
    };
    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(err) => {
            tracing::error!(%err, file_id = %file_id, "failed to open media file");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error retrieving file").into_response();
        }
    };

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&file_id).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", original_name(&file_id)),
        ),
        (header::CONTENT_LENGTH, metadata.len().to_string()),
    ];
    (headers, StreamBody::new(ReaderStream::new(file))).into_response()
}

//type de contenu déduit de l'extension
fn content_type_for(filename: &str) -> &'static str {
    let extension = FsPath::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" => "video/ogg",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "flv" => "video/x-flv",
        "wmv" => "video/x-ms-wmv",
        _ => "application/octet-stream",
    }
}

//nom original: partie après le premier tiret bas
fn original_name(file_id: &str) -> &str {
    file_id.split_once('_').map(|(_, name)| name).unwrap_or(file_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn content_types_follow_the_extension_table() {
        assert_eq!(content_type_for("1_a.mp4"), "video/mp4");
        assert_eq!(content_type_for("1_a.MKV"), "video/x-matroska");
        assert_eq!(content_type_for("1_a.wmv"), "video/x-ms-wmv");
        assert_eq!(content_type_for("1_a.bin"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn original_name_drops_the_timestamp_prefix() {
        assert_eq!(original_name("1712_sample.mp4"), "sample.mp4");
        assert_eq!(original_name("1712_a_b.mp4"), "a_b.mp4");
        assert_eq!(original_name("plain.mp4"), "plain.mp4");
    }

    #[test]
    fn listing_skips_files_outside_the_naming_convention() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("1712_sample.mp4"), b"data").unwrap();
        std::fs::write(dir.path().join("stray.mp4"), b"data").unwrap();
        std::fs::write(dir.path().join("1712_pending.mp4.part"), b"data").unwrap();
        std::fs::create_dir(dir.path().join("1712_subdir")).unwrap();

        let files = collect_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        let file = &files[0];
        assert_eq!(file.id, "1712_sample.mp4");
        assert_eq!(file.name, "sample.mp4");
        assert_eq!(file.size, 4);
        assert_eq!(file.mime_type, "video/mp4");
        assert_eq!(file.url, "/download/1712_sample.mp4");
    }
}
