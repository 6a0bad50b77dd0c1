use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

/// GET /health
/// Liveness of the local surface only; the remote backend is not contacted.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "snapgram",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().timestamp()
    }))
}
