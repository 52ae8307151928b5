//! Cleanup mission listings.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::{cleanup_summary, list_or_empty};
use crate::models::{CleanupMission, RobotCounts};
use crate::store;
use crate::AppState;

// ---

const LIST_LIMIT: i64 = 50;

#[derive(Serialize)]
struct DailyStats {
    waste_collected_today: i64,
    hotspots_addressed: i64,
}

#[derive(Serialize)]
struct CleanupMissions {
    active_missions: i64,
    missions: Vec<CleanupMission>,
    total_resources: RobotCounts,
    daily_stats: DailyStats,
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/cleanup-status", get(cleanup_status))
        .route("/api/cleanup-missions", get(cleanup_missions))
}

async fn cleanup_status(State(state): State<AppState>) -> Json<Vec<CleanupMission>> {
    // ---
    let missions = store::list_missions(&state.pool, LIST_LIMIT).await;
    Json(list_or_empty(missions, "cleanup missions"))
}

/// Fleet totals plus the missions currently marked active.
async fn cleanup_missions(State(state): State<AppState>) -> Json<CleanupMissions> {
    // ---
    let summary = cleanup_summary(&state).await;
    let missions = store::missions_by_status(&state.pool, "active").await;

    Json(CleanupMissions {
        active_missions: summary.active_missions,
        missions: list_or_empty(missions, "active missions"),
        total_resources: summary.cleanup_robots,
        daily_stats: DailyStats {
            waste_collected_today: summary.waste_collected_today,
            hotspots_addressed: summary.hotspots_addressed,
        },
    })
}
