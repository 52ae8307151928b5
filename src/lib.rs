//! AquaPulse backend: harmful algae bloom monitoring API.
//!
//! The crate is split along the Explicit Module Boundary Pattern (EMBP):
//! - `config` parses the environment once into a [`Config`] snapshot
//! - `gateway` wraps every cloud capability behind one [`CloudGateway`]
//! - `store` and `schema` own the PostgreSQL document collections
//! - `simulate` and `insights` hold the pure data generation and derivations
//! - `routes` maps HTTP endpoints onto the layers above
//!
//! [`app`] assembles the router with its middleware so the binary and the
//! integration tests serve the same stack.

pub mod config;
pub mod error;
pub mod gateway;
pub mod insights;
pub mod models;
pub mod routes;
pub mod schema;
pub mod simulate;
pub mod state;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use gateway::CloudGateway;
pub use state::AppState;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ---

/// Full application router with request tracing, permissive CORS and the
/// configured upload limit.
pub fn app(state: AppState) -> Router {
    // ---
    let body_limit = state.config.max_upload_bytes;
    routes::router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
