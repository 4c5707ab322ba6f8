//entêtes CORS appliqués à toutes les réponses
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::UploadConfig;

//écho de l'origine autorisée + réponse directe aux préflights OPTIONS
pub async fn apply<B>(
    State(config): State<Arc<UploadConfig>>,
    req: Request<B>,
    next: Next<B>,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    //origine inconnue ou absente: retomber sur la première entrée de la liste
    let allow = if config.allowed_origins.iter().any(|o| o == &origin) {
        origin
    } else {
        config.allowed_origins.first().cloned().unwrap_or_default()
    };

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&allow) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Content-Length, Accept-Encoding"),
    );
    response
}
