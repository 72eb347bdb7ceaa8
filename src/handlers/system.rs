use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service information
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "LinkedList API",
        "version": version,
        "description": "Job board API for companies, users, jobs, and job applications",
        "endpoints": {
            "auth": "/user-auth, /company-auth (public - token acquisition)",
            "companies": "/companies[/:handle] (writes require the company's token)",
            "users": "/users[/:username] (writes require the user's token)",
            "jobs": "/jobs[/:id] (writes require the posting company's token)",
            "applications": "/jobs/:id/applications[/:application_id] (authenticated)",
            "health": "/health (public)",
        }
    }))
}

/// GET /health - database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
