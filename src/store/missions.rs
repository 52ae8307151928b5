use sqlx::PgPool;

use crate::models::CleanupMission;

// ---

const MISSION_COLUMNS: &str = "doc_id, mission_id, region, start_time, status, ocean_drones, \
                               surface_vessels, underwater_units, waste_collected, next_deployment";

pub async fn list_missions(pool: &PgPool, limit: i64) -> Result<Vec<CleanupMission>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, CleanupMission>(&format!(
        "SELECT {MISSION_COLUMNS} FROM cleanup_logs ORDER BY stored_at, mission_id LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Every stored mission, in insertion order.
pub async fn all_missions(pool: &PgPool) -> Result<Vec<CleanupMission>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, CleanupMission>(&format!(
        "SELECT {MISSION_COLUMNS} FROM cleanup_logs ORDER BY stored_at, mission_id"
    ))
    .fetch_all(pool)
    .await
}

pub async fn missions_by_status(
    pool: &PgPool,
    status: &str,
) -> Result<Vec<CleanupMission>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, CleanupMission>(&format!(
        "SELECT {MISSION_COLUMNS} FROM cleanup_logs WHERE status = $1 ORDER BY stored_at, mission_id"
    ))
    .bind(status)
    .fetch_all(pool)
    .await
}

pub async fn insert_missions(
    pool: &PgPool,
    missions: &[CleanupMission],
) -> Result<(), sqlx::Error> {
    // ---
    for mission in missions {
        sqlx::query(
            r#"
            INSERT INTO cleanup_logs (
                doc_id, mission_id, region, start_time, status, ocean_drones,
                surface_vessels, underwater_units, waste_collected, next_deployment
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(mission.doc_id)
        .bind(&mission.mission_id)
        .bind(&mission.region)
        .bind(mission.start_time)
        .bind(&mission.status)
        .bind(mission.robots.ocean_drones)
        .bind(mission.robots.surface_vessels)
        .bind(mission.robots.underwater_units)
        .bind(mission.waste_collected)
        .bind(&mission.next_deployment)
        .execute(pool)
        .await?;
    }

    Ok(())
}
