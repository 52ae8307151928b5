use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Campaign;

// ---

/// Campaigns, most recently created first.
pub async fn list_campaigns(pool: &PgPool, limit: i64) -> Result<Vec<Campaign>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, Campaign>(
        r#"
        SELECT doc_id, campaign_id, title, description, status, participants,
               duration, activities, target_audience, created_at
        FROM campaigns
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Insert a campaign and return its store-generated id.
pub async fn insert_campaign(pool: &PgPool, campaign: &Campaign) -> Result<Uuid, sqlx::Error> {
    // ---
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO campaigns (
            campaign_id, title, description, status, participants,
            duration, activities, target_audience, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING doc_id
        "#,
    )
    .bind(&campaign.campaign_id)
    .bind(&campaign.title)
    .bind(&campaign.description)
    .bind(&campaign.status)
    .bind(campaign.participants)
    .bind(&campaign.duration)
    .bind(&campaign.activities)
    .bind(&campaign.target_audience)
    .bind(campaign.created_at)
    .fetch_one(pool)
    .await
}
