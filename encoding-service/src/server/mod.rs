//construction du routeur HTTP du service d'encodage
use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::services::ServeDir;

use crate::cors;
use crate::engine::EncodingEngine;

mod routes;

//exposition du routeur: API des jobs + montages statiques des sorties
pub fn build_router(engine: Arc<EncodingEngine>) -> Router {
    let config = engine.config.clone();
    Router::new()
        .route("/jobs", get(routes::list_jobs))
        .route("/jobs/:id", get(routes::get_job))
        .route("/streams", get(routes::list_streams))
        .route("/encode", post(routes::submit_job))
        .route("/health", get(routes::health))
        .nest_service("/dash", ServeDir::new(config.dash_dir()))
        .nest_service("/hls", ServeDir::new(config.hls_dir()))
        .nest_service("/encoded", ServeDir::new(config.encoded_dir.clone()))
        .with_state(engine)
        .layer(middleware::from_fn_with_state(config, cors::apply))
}
