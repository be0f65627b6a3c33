use axum::http::StatusCode;

/// `GET /health`
///
/// Fixed liveness response, independent of upstream reachability: this
/// reports that the exporter process is serving, nothing more.
pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
