//! Database schema management for `aquapulse`.
//!
//! Ensures one table per document collection exists before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `sensors`, `pollution_reports`, `predictions`, `cleanup_logs`,
/// `campaigns` and `chat_sessions` tables. Safe to call on every startup;
/// no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // Sensor readings; `id` is the uniqueness constraint behind idempotent inserts
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sensors (
            doc_id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            id               TEXT             NOT NULL UNIQUE,
            location         TEXT             NOT NULL,
            lat              DOUBLE PRECISION NOT NULL,
            lng              DOUBLE PRECISION NOT NULL,
            pollution_level  DOUBLE PRECISION NOT NULL,
            status           TEXT             NOT NULL,
            recorded_at      TIMESTAMPTZ      NOT NULL,
            microalgae       BIGINT           NOT NULL,
            temperature      DOUBLE PRECISION NOT NULL,
            turbidity        DOUBLE PRECISION NOT NULL,
            stored_at        TIMESTAMPTZ      NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Citizen reports, both seeded and submitted through the form
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pollution_reports (
            doc_id             UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            report_id          TEXT        NOT NULL,
            location_name      TEXT,
            description        TEXT,
            pollution_level    DOUBLE PRECISION,
            lat                DOUBLE PRECISION,
            lng                DOUBLE PRECISION,
            reporter_name      TEXT,
            contact            TEXT,
            severity           TEXT        NOT NULL,
            status             TEXT        NOT NULL DEFAULT 'pending',
            reporter_type      TEXT,
            pollution_type     TEXT,
            image_path         TEXT,
            image_analysis     JSONB,
            status_notes       TEXT,
            status_updated_at  TIMESTAMPTZ,
            reported_at        TIMESTAMPTZ NOT NULL,
            stored_at          TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS predictions (
            doc_id            UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            region            TEXT             NOT NULL,
            current_level     DOUBLE PRECISION NOT NULL,
            predicted_7days   DOUBLE PRECISION NOT NULL,
            predicted_30days  DOUBLE PRECISION NOT NULL,
            trend             TEXT             NOT NULL,
            confidence        DOUBLE PRECISION NOT NULL,
            created_at        TIMESTAMPTZ      NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cleanup_logs (
            doc_id            UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            mission_id        TEXT        NOT NULL,
            region            TEXT        NOT NULL,
            start_time        TIMESTAMPTZ NOT NULL,
            status            TEXT        NOT NULL,
            ocean_drones      BIGINT      NOT NULL DEFAULT 0,
            surface_vessels   BIGINT      NOT NULL DEFAULT 0,
            underwater_units  BIGINT      NOT NULL DEFAULT 0,
            waste_collected   BIGINT      NOT NULL DEFAULT 0,
            next_deployment   TEXT        NOT NULL DEFAULT '',
            stored_at         TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS campaigns (
            doc_id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            campaign_id      TEXT        NOT NULL,
            title            TEXT        NOT NULL,
            description      TEXT        NOT NULL,
            status           TEXT        NOT NULL,
            participants     BIGINT,
            duration         TEXT        NOT NULL,
            activities       JSONB       NOT NULL DEFAULT '[]'::jsonb,
            target_audience  TEXT,
            created_at       TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chat_sessions (
            doc_id      UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            session_id  TEXT        NOT NULL,
            user_id     TEXT,
            payload     JSONB       NOT NULL,
            stored_at   TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Indexes for the common lookups
    for ddl in [
        "CREATE INDEX IF NOT EXISTS idx_sensors_stored_at ON sensors (stored_at DESC);",
        "CREATE INDEX IF NOT EXISTS idx_sensors_location ON sensors (location);",
        "CREATE INDEX IF NOT EXISTS idx_reports_report_id ON pollution_reports (report_id);",
        "CREATE INDEX IF NOT EXISTS idx_reports_location_name ON pollution_reports (location_name);",
        "CREATE INDEX IF NOT EXISTS idx_reports_reported_at ON pollution_reports (reported_at);",
        "CREATE INDEX IF NOT EXISTS idx_cleanup_logs_status ON cleanup_logs (status);",
    ] {
        sqlx::query(ddl).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(())
}
