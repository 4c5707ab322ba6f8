//construction du routeur HTTP du service d'upload
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};

use crate::config::UploadConfig;
use crate::cors;

mod routes;

//exposition du routeur
pub fn build_router(config: Arc<UploadConfig>) -> Router {
    Router::new()
        .route("/upload", post(routes::upload))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .with_state(config.clone())
        .layer(middleware::from_fn_with_state(config, cors::apply))
}
