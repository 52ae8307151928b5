use sqlx::PgPool;

use crate::models::Prediction;

// ---

/// Stored predictions, newest first.
pub async fn list_predictions(pool: &PgPool, limit: i64) -> Result<Vec<Prediction>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, Prediction>(
        r#"
        SELECT doc_id, region, current_level, predicted_7days, predicted_30days, trend, confidence
        FROM predictions
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn insert_predictions(
    pool: &PgPool,
    predictions: &[Prediction],
) -> Result<(), sqlx::Error> {
    // ---
    for prediction in predictions {
        sqlx::query(
            r#"
            INSERT INTO predictions (
                region, current_level, predicted_7days, predicted_30days, trend, confidence
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&prediction.region)
        .bind(prediction.current_level)
        .bind(prediction.predicted_7days)
        .bind(prediction.predicted_30days)
        .bind(&prediction.trend)
        .bind(prediction.confidence)
        .execute(pool)
        .await?;
    }

    Ok(())
}
