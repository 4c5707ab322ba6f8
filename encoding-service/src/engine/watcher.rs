//surveillance du dossier média et promotion des nouveaux fichiers en jobs
use std::path::Path;
use std::sync::Arc;

use walkdir::WalkDir;

use super::EncodingEngine;

//extensions vidéo reconnues
const VIDEO_EXTENSIONS: [&str; 10] = [
    "mp4", "webm", "mov", "avi", "mkv", "flv", "wmv", "mpeg", "mpg", "m4v",
];

//boucle de surveillance, premier passage immédiat au démarrage
pub async fn watch(engine: Arc<EncodingEngine>) {
    let mut ticker = tokio::time::interval(engine.config.scan_interval);
    loop {
        ticker.tick().await;
        scan_media_store(&engine).await;
    }
}

//un passage de scan: tout fichier vidéo non encore représenté devient un job
pub async fn scan_media_store(engine: &EncodingEngine) {
    let seen = engine.registry.seen_sources().await;
    for entry in WalkDir::new(&engine.config.media_dir) {
        let entry = match entry {
            Ok(entry) => entry,
            //entrée illisible: abandon de ce passage, le prochain tick réessaie
            Err(err) => {
                tracing::warn!(%err, "media scan aborted");
                return;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        if !is_video_file(entry.path()) {
            continue;
        }
        let relative = match entry.path().strip_prefix(&engine.config.media_dir) {
            Ok(relative) => relative.to_string_lossy().into_owned(),
            Err(_) => continue,
        };
        if seen.contains(&relative) {
            continue;
        }
        let job = engine.submit(&relative).await;
        tracing::info!(job = %job.id, source = %relative, "new encoding job");
    }
}

//filtre par extension, comparée en minuscules
fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
