use anyhow::{Context, Result};
use sqlx::PgPool;

use super::{count_sensor_readings, insert_campaign, insert_missions, insert_report, insert_sensor_readings};
use crate::simulate;

// ---

/// Replace the sensors, cleanup, report and campaign collections with a fresh
/// demo dataset.
pub async fn seed(pool: &PgPool) -> Result<()> {
    // ---
    // ThreadRng is not Send; draw everything before the first await
    let data = simulate::seed_data(&mut rand::thread_rng());

    for table in ["sensors", "cleanup_logs", "pollution_reports", "campaigns"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(pool)
            .await
            .with_context(|| format!("Failed to clear {table}"))?;
    }

    insert_sensor_readings(pool, &data.sensors)
        .await
        .context("Failed to seed sensors")?;
    insert_missions(pool, &data.missions)
        .await
        .context("Failed to seed cleanup missions")?;
    for report in &data.reports {
        insert_report(pool, report)
            .await
            .context("Failed to seed citizen reports")?;
    }
    for campaign in &data.campaigns {
        insert_campaign(pool, campaign)
            .await
            .context("Failed to seed campaigns")?;
    }

    tracing::info!(
        "Seeded {} sensors, {} cleanup missions, {} citizen reports, {} campaigns",
        data.sensors.len(),
        data.missions.len(),
        data.reports.len(),
        data.campaigns.len()
    );
    Ok(())
}

/// Seed only when the sensors collection is empty. Returns whether it seeded.
pub async fn seed_if_empty(pool: &PgPool) -> Result<bool> {
    // ---
    let existing = count_sensor_readings(pool).await?;
    if existing > 0 {
        tracing::debug!("Store already holds {} sensor readings, skipping seed", existing);
        return Ok(false);
    }

    seed(pool).await?;
    Ok(true)
}
