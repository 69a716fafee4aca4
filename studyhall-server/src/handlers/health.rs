use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::warn;

use crate::infra::app_state::AppState;

/// Liveness plus a storage check. PostgreSQL is pinged; the in-memory store
/// is always reachable.
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<Value>) {
    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    let mut is_unhealthy = false;

    match state.postgres() {
        Some(db) => match db.ping().await {
            Ok(()) => {
                let stats = db.stats();
                health_status["checks"]["database"] = json!({
                    "status": "healthy",
                    "backend": "postgres",
                    "pool_size": stats.size,
                    "idle_connections": stats.idle,
                });
            }
            Err(e) => {
                warn!(error = %e, "database health check failed");
                health_status["checks"]["database"] = json!({
                    "status": "unhealthy",
                    "backend": "postgres",
                    "error": e.to_string()
                });
                is_unhealthy = true;
            }
        },
        None => {
            health_status["checks"]["database"] = json!({
                "status": "healthy",
                "backend": "memory"
            });
        }
    }

    if is_unhealthy {
        health_status["status"] = json!("unhealthy");
        (StatusCode::SERVICE_UNAVAILABLE, Json(health_status))
    } else {
        (StatusCode::OK, Json(health_status))
    }
}
