//serveur principal du service d'upload
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod cors;
mod server;

use config::UploadConfig;

//point d'entrée asynchrone
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    //initialisation du logging (tracing)
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter_layer).init();

    //configuration par défaut + surcharges d'environnement
    let mut config = UploadConfig::default();
    if let Ok(host) = std::env::var("HOST") {
        config.host = host;
    }
    if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
        config.port = port;
    }

    //création du dossier média, fatale en cas d'échec
    std::fs::create_dir_all(&config.media_dir)
        .with_context(|| format!("failed to create directory {}", config.media_dir.display()))?;

    //construction du routeur HTTP
    let config = Arc::new(config);
    let app = server::build_router(config.clone());

    //démarrage du serveur
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!(%addr, "upload service listening");
    axum::Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
