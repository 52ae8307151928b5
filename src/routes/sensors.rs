//! Sensor readings, predictions and the combined dashboard payload.

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rand::thread_rng;
use serde::{Deserialize, Serialize};

use super::{cleanup_summary, list_or_empty, recent_readings};
use crate::error::{ApiError, ApiResult};
use crate::insights;
use crate::models::{CleanupSummary, Prediction, RawSensorReading, SensorReading};
use crate::simulate;
use crate::store::{self, PollutionStatistics};
use crate::AppState;

// ---

const LIST_LIMIT: i64 = 200;

#[derive(Serialize)]
struct DashboardData {
    sensors: Vec<SensorReading>,
    predictions: Vec<Prediction>,
    cleanup: CleanupSummary,
    statistics: PollutionStatistics,
    timestamp: DateTime<Utc>,
}

/// Ingestion accepts one reading or a batch.
#[derive(Deserialize)]
#[serde(untagged)]
enum IngestBody {
    Batch(Vec<RawSensorReading>),
    Single(RawSensorReading),
}

#[derive(Serialize)]
struct IngestResponse {
    received: usize,
    inserted: u64,
    readings: Vec<SensorReading>,
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/dashboard-data", get(dashboard_data))
        .route("/api/sensor-data", get(list_sensor_data).post(ingest_sensor_data))
        .route("/api/sensor-data/simulate", post(simulate_sensor_data))
        .route("/api/predictions", get(list_predictions))
        .route("/api/predictions/generate", post(generate_predictions))
}

async fn dashboard_data(State(state): State<AppState>) -> Json<DashboardData> {
    // ---
    let sensors = recent_readings(&state).await;
    let cleanup = cleanup_summary(&state).await;
    let statistics = store::pollution_statistics(&state.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to compute pollution statistics: {}", e);
            PollutionStatistics::default()
        });

    Json(DashboardData {
        predictions: insights::echo_predictions(&sensors),
        sensors,
        cleanup,
        statistics,
        timestamp: Utc::now(),
    })
}

async fn list_sensor_data(State(state): State<AppState>) -> Json<Vec<SensorReading>> {
    // ---
    let readings = store::list_sensor_readings(&state.pool, LIST_LIMIT).await;
    Json(list_or_empty(readings, "sensor readings"))
}

/// Store posted readings. Status is always derived from the pollution level
/// and ids that already exist are skipped.
async fn ingest_sensor_data(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<IngestResponse>> {
    // ---
    let raw = match serde_json::from_slice::<IngestBody>(&body) {
        Ok(IngestBody::Batch(raw)) => raw,
        Ok(IngestBody::Single(raw)) => vec![raw],
        Err(e) => {
            tracing::debug!("Rejected sensor payload: {}", e);
            return Err(ApiError::bad_request("Invalid sensor reading payload"));
        }
    };

    let readings: Vec<SensorReading> = raw.iter().map(RawSensorReading::to_reading).collect();
    let inserted = store::insert_sensor_readings(&state.pool, &readings)
        .await
        .map_err(|e| ApiError::store(e, "Failed to store sensor readings"))?;

    tracing::info!("Ingested {} of {} sensor readings", inserted, readings.len());
    Ok(Json(IngestResponse {
        received: readings.len(),
        inserted,
        readings,
    }))
}

async fn simulate_sensor_data(State(state): State<AppState>) -> ApiResult<Json<IngestResponse>> {
    // ---
    let readings = simulate::live_sensor_readings(&mut thread_rng());
    let inserted = store::insert_sensor_readings(&state.pool, &readings)
        .await
        .map_err(|e| ApiError::store(e, "Failed to store simulated readings"))?;

    Ok(Json(IngestResponse {
        received: readings.len(),
        inserted,
        readings,
    }))
}

async fn list_predictions(State(state): State<AppState>) -> Json<Vec<Prediction>> {
    // ---
    let predictions = store::list_predictions(&state.pool, LIST_LIMIT).await;
    Json(list_or_empty(predictions, "predictions"))
}

/// PREDICTION STUB: random-walk forecasts, stored before they are returned.
async fn generate_predictions(State(state): State<AppState>) -> ApiResult<Json<Vec<Prediction>>> {
    // ---
    let predictions = simulate::random_walk_predictions(&mut thread_rng());
    store::insert_predictions(&state.pool, &predictions)
        .await
        .map_err(|e| ApiError::store(e, "Failed to store predictions"))?;

    tracing::info!("Generated {} simulated predictions", predictions.len());
    Ok(Json(predictions))
}
