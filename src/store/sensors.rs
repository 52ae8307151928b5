use serde::Serialize;
use sqlx::PgPool;

use super::start_of_day;
use crate::models::SensorReading;

// ---

const SENSOR_COLUMNS: &str = "doc_id, id, location, lat, lng, pollution_level, status, \
                              recorded_at, microalgae, temperature, turbidity, stored_at";

/// Average pollution for one location.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RegionStat {
    pub location: String,
    pub avg_pollution: f64,
    pub count: i64,
}

/// Dashboard statistics over reports and sensors.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollutionStatistics {
    pub total_reports: i64,
    pub reports_today: i64,
    pub region_statistics: Vec<RegionStat>,
}

/// Store sensor readings, silently skipping ids that already exist.
///
/// Returns the number of rows actually inserted.
pub async fn insert_sensor_readings(
    pool: &PgPool,
    readings: &[SensorReading],
) -> Result<u64, sqlx::Error> {
    // ---
    let mut inserted = 0;
    for reading in readings {
        let result = sqlx::query(
            r#"
            INSERT INTO sensors (
                doc_id, id, location, lat, lng, pollution_level, status,
                recorded_at, microalgae, temperature, turbidity, stored_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(reading.doc_id)
        .bind(&reading.id)
        .bind(&reading.location)
        .bind(reading.lat)
        .bind(reading.lng)
        .bind(reading.pollution_level)
        .bind(&reading.status)
        .bind(reading.timestamp)
        .bind(reading.microalgae)
        .bind(reading.temperature)
        .bind(reading.turbidity)
        .bind(reading.stored_at)
        .execute(pool)
        .await?;

        inserted += result.rows_affected();
    }

    tracing::debug!(
        "Stored {} of {} sensor readings ({} duplicates ignored)",
        inserted,
        readings.len(),
        readings.len() as u64 - inserted
    );
    Ok(inserted)
}

/// Most recently stored readings first.
pub async fn recent_sensor_readings(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<SensorReading>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, SensorReading>(&format!(
        "SELECT {SENSOR_COLUMNS} FROM sensors ORDER BY stored_at DESC, id LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Readings in sensor id order, for the map view.
pub async fn list_sensor_readings(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<SensorReading>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, SensorReading>(&format!(
        "SELECT {SENSOR_COLUMNS} FROM sensors ORDER BY id LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn count_sensor_readings(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sensors")
        .fetch_one(pool)
        .await
}

/// Report counts plus average pollution per sensor location, highest first.
pub async fn pollution_statistics(pool: &PgPool) -> Result<PollutionStatistics, sqlx::Error> {
    // ---
    let total_reports = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pollution_reports")
        .fetch_one(pool)
        .await?;

    let reports_today = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM pollution_reports WHERE stored_at >= $1",
    )
    .bind(start_of_day(0))
    .fetch_one(pool)
    .await?;

    let region_statistics = sqlx::query_as::<_, RegionStat>(
        r#"
        SELECT
            location,
            AVG(pollution_level) AS avg_pollution,
            COUNT(*)             AS count
        FROM sensors
        GROUP BY location
        ORDER BY avg_pollution DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(PollutionStatistics {
        total_reports,
        reports_today,
        region_statistics,
    })
}
