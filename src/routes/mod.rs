//! HTTP routes gateway.
//!
//! Each sibling module exports a subrouter over [`AppState`]; this module
//! merges them and attaches the state, so `lib.rs` never sees individual
//! endpoints. Helpers shared by several handlers live here too.

use std::collections::HashMap;

use axum::{body::Bytes, extract::Multipart, Router};
use rand::thread_rng;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};
use crate::insights;
use crate::models::{CleanupSummary, SensorReading};
use crate::simulate;
use crate::store::{self, ReportAnalytics};
use crate::AppState;

mod ai;
mod cleanup;
mod cloud;
mod engagement;
mod health;
mod reports;
mod sensors;
mod transcribe;

// ---

/// Readings the dashboard views derive their data from.
const RECENT_READINGS: i64 = 10;

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(sensors::router())
        .merge(cleanup::router())
        .merge(ai::router())
        .merge(reports::router())
        .merge(cloud::router())
        .merge(transcribe::router())
        .merge(engagement::router())
        .merge(health::router::<AppState>())
        .with_state(state)
}

// ---

/// Decode an optional JSON request body. An empty body yields `T::default()`.
fn json_body<T>(body: &Bytes) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    // ---
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        ApiError::bad_request("Invalid JSON body")
    })
}

/// Most recent readings, or none when the store fails.
async fn recent_readings(state: &AppState) -> Vec<SensorReading> {
    // ---
    store::recent_sensor_readings(&state.pool, RECENT_READINGS)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to load recent sensor readings: {}", e);
            Vec::new()
        })
}

/// Totals over the stored missions, or a random snapshot when none are
/// stored or the store fails.
async fn cleanup_summary(state: &AppState) -> CleanupSummary {
    // ---
    match store::all_missions(&state.pool).await {
        Ok(missions) if !missions.is_empty() => insights::summarize_missions(&missions),
        Ok(_) => simulate::random_cleanup_summary(&mut thread_rng()),
        Err(e) => {
            tracing::error!("Failed to load cleanup missions: {}", e);
            simulate::random_cleanup_summary(&mut thread_rng())
        }
    }
}

/// Report analytics, or zeroed counts when the store fails.
async fn analytics_or_default(state: &AppState) -> ReportAnalytics {
    // ---
    store::report_analytics(&state.pool).await.unwrap_or_else(|e| {
        tracing::error!("Failed to compute report analytics: {}", e);
        ReportAnalytics::default()
    })
}

/// Unwrap a store listing, logging and substituting `[]` on failure.
fn list_or_empty<T>(result: Result<Vec<T>, sqlx::Error>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!("Failed to load {}: {}", what, e);
        Vec::new()
    })
}

/// File part of a multipart form.
struct Upload {
    file_name: String,
    bytes: Bytes,
}

/// Text fields and file parts of a multipart form, keyed by field name.
#[derive(Default)]
struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl FormData {
    // ---
    fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }
}

/// Drain a multipart body. Parts with a filename (even an empty one) are
/// files, everything else is text.
async fn read_form(mut multipart: Multipart) -> ApiResult<FormData> {
    // ---
    let mut form = FormData::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!("Malformed multipart body: {}", e);
        ApiError::bad_request("Malformed multipart body")
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            tracing::debug!("Failed to read multipart field {}: {}", name, e);
            ApiError::bad_request("Malformed multipart body")
        })?;

        match file_name {
            Some(file_name) => {
                form.files.insert(name, Upload { file_name, bytes });
            }
            None => {
                form.fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }
    Ok(form)
}

/// Seconds since the epoch, for default resource names.
fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
