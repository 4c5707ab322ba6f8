//serveur principal du service d'encodage
use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use encoding_service::config::EncodingConfig;
use encoding_service::engine::EncodingEngine;
use encoding_service::server;

//point d'entrée asynchrone
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    //initialisation du logging (tracing)
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter_layer).init();

    //configuration par défaut + surcharges d'environnement
    let mut config = EncodingConfig::default();
    if let Ok(host) = std::env::var("HOST") {
        config.host = host;
    }
    if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
        config.port = port;
    }
    if let Ok(path) = std::env::var("FFMPEG_PATH") {
        config.ffmpeg_path = path;
    }
    if let Ok(path) = std::env::var("FFPROBE_PATH") {
        config.ffprobe_path = path;
    }

    //création des répertoires racine, fatale en cas d'échec
    for dir in [
        config.media_dir.clone(),
        config.encoded_dir.clone(),
        config.dash_dir(),
        config.hls_dir(),
    ] {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }

    //moteur: reconstruction depuis l'arborescence de sortie puis workers + watcher
    let (engine, queue_rx) = EncodingEngine::new(config.clone());
    let restored = engine.restore_from_disk().await;
    if restored > 0 {
        tracing::info!(restored, "restored completed jobs from output tree");
    }
    engine.start(queue_rx);

    //construction du routeur HTTP
    let app = server::build_router(engine);

    //démarrage du serveur
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!(%addr, "encoding service listening");
    axum::Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
