// src/routes/health.rs
//! Liveness endpoint.
//!
//! `GET /health` answers without touching the database or the cloud gateway,
//! so orchestrators can check it cheaply.

use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Subrouter with the `/health` route, generic over the application state so
/// it merges into any gateway router.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
