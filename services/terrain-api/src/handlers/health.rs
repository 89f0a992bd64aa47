//! Health check handler.

/// GET /health
pub async fn health_handler() -> &'static str {
    "ok"
}
