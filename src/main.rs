//! Application entry point for the `aquapulse` backend service.
//!
//! Startup sequence:
//! - Load configuration from environment variables or `.env`
//! - Initialize structured logging/tracing
//! - Establish a PostgreSQL connection pool
//! - Create the database schema if it does not exist
//! - Seed the collections when the sensor collection is empty
//! - Recreate the demo cloud services on a background task
//! - Mount all API routes and serve requests
//!
//! # Environment Variables
//! - `DATABASE_URL` (**required**) – PostgreSQL connection string
//! - `DB_POOL_MAX` (optional) – maximum number of DB connections (default: 5)
//! - `PORT` (optional) – listen port (default: 5000)
//! - `LOG_LEVEL` (optional) – log verbosity (default: `info`)
//! - `DEBUG` (optional) – `True` makes `debug` the default verbosity
//! - `SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! See `config` for the full list.
use std::net::SocketAddr;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;

use aquapulse::{app, config, schema, store, telemetry, AppState};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    telemetry::init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_pool_max)
        .connect(&cfg.db_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Successfully connected to database");

    schema::create_schema(&pool).await?;

    if cfg.seed_on_startup {
        match store::seed_if_empty(&pool).await {
            Ok(true) => tracing::info!("Seeded empty database with demo data"),
            Ok(false) => tracing::debug!("Database already populated, skipping seed"),
            Err(e) => tracing::error!("Seeding failed: {:#}", e),
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let recreate = cfg.recreate_demo_services;
    let state = AppState::new(pool, cfg)?;

    if recreate {
        let gateway = state.gateway.clone();
        tokio::spawn(async move {
            let demo = gateway.recreate_demo_services().await;
            tracing::debug!("Demo service recreation finished: recreated={}", demo.recreated);
        });
    }

    let app = app(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
