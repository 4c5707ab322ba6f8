//construction du routeur HTTP du service catalogue
use std::sync::Arc;

use axum::routing::get;
use axum::{middleware, Router};

use crate::config::CatalogConfig;
use crate::cors;

mod routes;

//exposition du routeur
pub fn build_router(config: Arc<CatalogConfig>) -> Router {
    Router::new()
        .route("/files", get(routes::list_files))
        .route("/download/:id", get(routes::download))
        .route("/health", get(routes::health))
        .with_state(config.clone())
        .layer(middleware::from_fn_with_state(config, cors::apply))
}
