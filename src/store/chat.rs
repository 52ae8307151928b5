use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

// ---

/// Persist a processed chat exchange as a JSON document.
pub async fn insert_chat_session(
    pool: &PgPool,
    session_id: &str,
    user_id: Option<&str>,
    payload: &Value,
) -> Result<Uuid, sqlx::Error> {
    // ---
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO chat_sessions (session_id, user_id, payload)
        VALUES ($1, $2, $3)
        RETURNING doc_id
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .bind(Json(payload))
    .fetch_one(pool)
    .await
}
